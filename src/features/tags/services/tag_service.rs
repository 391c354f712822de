use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::tags::dtos::{CreateTagDto, TagResponseDto, UpdateTagDto};
use crate::features::tags::models::Tag;
use crate::shared::types::ImportResultDto;

const TAG_UNIQUE_MESSAGES: &[(&str, &str)] = &[
    ("tags_name_key", "A tag with this name already exists"),
    ("tags_color_key", "A tag with this color already exists"),
    ("tags_slug_key", "A tag with this slug already exists"),
];

/// Service for tag operations
pub struct TagService {
    pool: PgPool,
}

impl TagService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all tags ordered by name
    pub async fn list(&self) -> Result<Vec<TagResponseDto>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list tags: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(tags.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: i64) -> Result<TagResponseDto> {
        sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get tag {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Tag with id {} not found", id)))
    }

    pub async fn create(&self, dto: CreateTagDto) -> Result<TagResponseDto> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, color, slug) VALUES ($1, $2, $3) RETURNING id, name, color, slug",
        )
        .bind(&dto.name)
        .bind(dto.color.to_uppercase())
        .bind(&dto.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, TAG_UNIQUE_MESSAGES))?;

        tracing::info!("Created tag {} ({})", tag.id, tag.slug);
        Ok(tag.into())
    }

    pub async fn update(&self, id: i64, dto: UpdateTagDto) -> Result<TagResponseDto> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags
            SET name = COALESCE($2, name),
                color = COALESCE($3, color),
                slug = COALESCE($4, slug)
            WHERE id = $1
            RETURNING id, name, color, slug
            "#,
        )
        .bind(id)
        .bind(dto.name.as_deref())
        .bind(dto.color.as_deref().map(str::to_uppercase))
        .bind(dto.slug.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, TAG_UNIQUE_MESSAGES))?
        .ok_or_else(|| AppError::NotFound(format!("Tag with id {} not found", id)))?;

        tracing::info!("Updated tag {}", id);
        Ok(tag.into())
    }

    /// Delete a tag; recipes simply lose it
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete tag {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tag with id {} not found", id)));
        }

        tracing::info!("Deleted tag {}", id);
        Ok(())
    }

    /// Insert many tags in one transaction.
    ///
    /// A tag clashing with an existing name, color or slug is skipped.
    pub async fn import(&self, items: Vec<CreateTagDto>) -> Result<ImportResultDto> {
        let total = items.len() as u64;
        if items.is_empty() {
            return Ok(ImportResultDto {
                created: 0,
                skipped: 0,
            });
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO tags (name, color, slug) ");
        builder.push_values(&items, |mut row, item| {
            row.push_bind(item.name.trim())
                .push_bind(item.color.to_uppercase())
                .push_bind(item.slug.trim());
        });
        builder.push(" ON CONFLICT DO NOTHING");

        let mut tx = self.pool.begin().await?;
        let result = builder.build().execute(&mut *tx).await.map_err(|e| {
            tracing::error!("Failed to import tags: {:?}", e);
            AppError::Database(e)
        })?;
        tx.commit().await?;

        let created = result.rows_affected();
        tracing::info!("Imported tags: {} created, {} skipped", created, total - created);
        Ok(ImportResultDto {
            created,
            skipped: total - created,
        })
    }
}
