use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::ingredients::dtos::{CreateIngredientDto, IngredientResponseDto};
use crate::features::ingredients::models::Ingredient;
use crate::shared::types::{escape_like, ImportResultDto};

const INGREDIENT_UNIQUE_MESSAGES: &[(&str, &str)] = &[(
    "ingredients_unique_name_measurement_unit",
    "This ingredient with this measurement unit already exists",
)];

/// Rows per INSERT during bulk import
const IMPORT_CHUNK_SIZE: usize = 1000;

/// Service for ingredient operations
pub struct IngredientService {
    pool: PgPool,
}

impl IngredientService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All ingredients, or those whose name starts with `prefix` (case-insensitive)
    pub async fn search(&self, prefix: Option<&str>) -> Result<Vec<IngredientResponseDto>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id, name, measurement_unit FROM ingredients");

        if let Some(prefix) = prefix.map(str::trim).filter(|p| !p.is_empty()) {
            builder
                .push(" WHERE name ILIKE ")
                .push_bind(format!("{}%", escape_like(prefix)));
        }
        builder.push(" ORDER BY name, measurement_unit");

        let ingredients = builder
            .build_query_as::<Ingredient>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search ingredients: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(ingredients.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: i64) -> Result<IngredientResponseDto> {
        sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get ingredient {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .map(Into::into)
        .ok_or_else(|| AppError::NotFound(format!("Ingredient with id {} not found", id)))
    }

    pub async fn create(&self, dto: CreateIngredientDto) -> Result<IngredientResponseDto> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            RETURNING id, name, measurement_unit
            "#,
        )
        .bind(dto.name.trim())
        .bind(dto.measurement_unit.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, INGREDIENT_UNIQUE_MESSAGES))?;

        tracing::info!("Created ingredient {} ({})", ingredient.id, ingredient.name);
        Ok(ingredient.into())
    }

    /// Delete an ingredient; recipe amount rows referencing it cascade
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete ingredient {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Ingredient with id {} not found",
                id
            )));
        }

        tracing::info!("Deleted ingredient {}", id);
        Ok(())
    }

    /// Insert many ingredients in one transaction, skipping existing pairs
    pub async fn import(&self, items: Vec<CreateIngredientDto>) -> Result<ImportResultDto> {
        let total = items.len() as u64;
        let mut created = 0u64;

        let mut tx = self.pool.begin().await?;
        for chunk in items.chunks(IMPORT_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO ingredients (name, measurement_unit) ");
            builder.push_values(chunk, |mut row, item| {
                row.push_bind(item.name.trim())
                    .push_bind(item.measurement_unit.trim());
            });
            builder.push(" ON CONFLICT (name, measurement_unit) DO NOTHING");

            let result = builder.build().execute(&mut *tx).await.map_err(|e| {
                tracing::error!("Failed to import ingredients: {:?}", e);
                AppError::Database(e)
            })?;
            created += result.rows_affected();
        }
        tx.commit().await?;

        tracing::info!("Imported ingredients: {} created, {} skipped", created, total - created);
        Ok(ImportResultDto {
            created,
            skipped: total - created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::seed_ingredient;

    fn names(found: Vec<IngredientResponseDto>) -> Vec<String> {
        let mut names: Vec<String> = found.into_iter().map(|i| i.name).collect();
        names.sort();
        names
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_search_matches_name_prefix_only(pool: PgPool) {
        seed_ingredient(&pool, "Milk", "ml").await;
        seed_ingredient(&pool, "millet", "g").await;
        seed_ingredient(&pool, "Almond milk", "ml").await;
        let service = IngredientService::new(pool);

        let found = service.search(Some("mil")).await.unwrap();
        assert_eq!(names(found), vec!["Milk", "millet"]);

        let all = service.search(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_search_treats_wildcards_literally(pool: PgPool) {
        seed_ingredient(&pool, "50% cream", "ml").await;
        seed_ingredient(&pool, "sugar", "g").await;
        let service = IngredientService::new(pool);

        assert!(service.search(Some("%")).await.unwrap().is_empty());
        assert!(service.search(Some("_")).await.unwrap().is_empty());
        assert_eq!(
            names(service.search(Some("50%")).await.unwrap()),
            vec!["50% cream"]
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_import_skips_existing_pairs(pool: PgPool) {
        seed_ingredient(&pool, "salt", "g").await;
        let service = IngredientService::new(pool);

        let result = service
            .import(vec![
                CreateIngredientDto {
                    name: "salt".to_string(),
                    measurement_unit: "g".to_string(),
                },
                CreateIngredientDto {
                    name: "salt".to_string(),
                    measurement_unit: "pinch".to_string(),
                },
            ])
            .await
            .unwrap();

        assert_eq!(result.created, 1);
        assert_eq!(result.skipped, 1);
    }
}
