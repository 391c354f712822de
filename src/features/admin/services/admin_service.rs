use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::*;
use crate::features::ingredients::dtos::{CreateIngredientDto, IngredientResponseDto};
use crate::features::ingredients::IngredientService;
use crate::features::tags::dtos::{CreateTagDto, TagResponseDto, UpdateTagDto};
use crate::features::tags::TagService;
use crate::modules::storage::ObjectStorage;
use crate::shared::types::{escape_like, ImportResultDto};

/// Append `AND (col ILIKE %term% OR ...)` when `term` is non-blank
fn push_search(builder: &mut QueryBuilder<'_, Postgres>, columns: &[&str], term: Option<&str>) {
    let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
        return;
    };
    let pattern = format!("%{}%", escape_like(term));

    builder.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder
            .push(*column)
            .push(" ILIKE ")
            .push_bind(pattern.clone());
    }
    builder.push(")");
}

const USER_SELECT: &str = r#"
    SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.is_admin, u.is_active,
           (SELECT COUNT(*) FROM recipes r WHERE r.author_id = u.id) AS recipes_count,
           (SELECT COUNT(*) FROM subscriptions s WHERE s.user_id = u.id) AS subscriptions_count,
           (SELECT COUNT(*) FROM subscriptions s WHERE s.author_id = u.id) AS subscribers_count,
           u.created_at
    FROM users u
    WHERE TRUE"#;

const RECIPE_SELECT: &str = r#"
    SELECT r.id, r.name, r.author_id, u.username AS author_username, r.cooking_time, r.image,
           ARRAY(
               SELECT t.name FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id
               WHERE rt.recipe_id = r.id ORDER BY t.name
           ) AS tags,
           ARRAY(
               SELECT i.name || ' ' || ri.amount || ' ' || i.measurement_unit
               FROM recipe_ingredients ri JOIN ingredients i ON i.id = ri.ingredient_id
               WHERE ri.recipe_id = r.id ORDER BY ri.id
           ) AS ingredients,
           (SELECT COUNT(*) FROM favorites f WHERE f.recipe_id = r.id) AS favorites_count,
           r.pub_date
    FROM recipes r
    JOIN users u ON u.id = r.author_id
    WHERE TRUE"#;

/// Service for the admin console
pub struct AdminService {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
    tags: Arc<TagService>,
    ingredients: Arc<IngredientService>,
}

impl AdminService {
    pub fn new(
        pool: PgPool,
        storage: Arc<dyn ObjectStorage>,
        tags: Arc<TagService>,
        ingredients: Arc<IngredientService>,
    ) -> Self {
        Self {
            pool,
            storage,
            tags,
            ingredients,
        }
    }

    // =========================================================================
    // USERS
    // =========================================================================

    pub async fn list_users(&self, params: &UserQueryParams) -> Result<(Vec<AdminUserDto>, i64)> {
        let push_filters = |builder: &mut QueryBuilder<'_, Postgres>| {
            push_search(
                builder,
                &["u.username", "u.email"],
                params.search.as_deref(),
            );
            if let Some(filter) = params.subscriptions {
                builder.push(" AND ").push(filter.as_sql());
            }
        };

        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users u WHERE TRUE");
        push_filters(&mut count);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(USER_SELECT);
        push_filters(&mut select);
        select
            .push(" ORDER BY u.id LIMIT ")
            .push_bind(params.pagination().limit())
            .push(" OFFSET ")
            .push_bind(params.pagination().offset());

        let users = select
            .build_query_as::<AdminUserDto>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((users, total))
    }

    async fn get_user(&self, id: i64) -> Result<AdminUserDto> {
        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(USER_SELECT);
        select.push(" AND u.id = ").push_bind(id);

        select
            .build_query_as::<AdminUserDto>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn update_user(&self, id: i64, dto: UpdateUserFlagsDto) -> Result<AdminUserDto> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_admin = COALESCE($2, is_admin),
                is_active = COALESCE($3, is_active)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(dto.is_admin)
        .bind(dto.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update user {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        if dto.is_active == Some(false) {
            sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        }

        tracing::info!(
            "Admin updated user {} (is_admin={:?}, is_active={:?})",
            id,
            dto.is_admin,
            dto.is_active
        );
        self.get_user(id).await
    }

    /// Delete a user with everything they own; recipe images are removed best-effort
    pub async fn delete_user(&self, id: i64) -> Result<()> {
        let images = sqlx::query_scalar::<_, String>("SELECT image FROM recipes WHERE author_id = $1")
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete user {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        for image in images {
            if let Err(e) = self.storage.delete_by_url(&image).await {
                tracing::warn!("Failed to remove image {}: {}", image, e);
            }
        }

        tracing::info!("Admin deleted user {}", id);
        Ok(())
    }

    // =========================================================================
    // RECIPES
    // =========================================================================

    pub async fn list_recipes(
        &self,
        params: &RecipeQueryParams,
    ) -> Result<(Vec<AdminRecipeDto>, i64)> {
        let push_filters = |builder: &mut QueryBuilder<'_, Postgres>| {
            push_search(builder, &["r.name", "u.username"], params.search.as_deref());

            if let Some(tag) = params.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                builder
                    .push(
                        " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
                         WHERE rt.recipe_id = r.id AND t.slug = ",
                    )
                    .push_bind(tag.to_string())
                    .push(")");
            }

            if let Some(bucket) = params.cooking_time {
                let (min, max) = bucket.bounds();
                if let Some(min) = min {
                    builder.push(" AND r.cooking_time >= ").push_bind(min);
                }
                if let Some(max) = max {
                    builder.push(" AND r.cooking_time <= ").push_bind(max);
                }
            }
        };

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM recipes r JOIN users u ON u.id = r.author_id WHERE TRUE",
        );
        push_filters(&mut count);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count recipes: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(RECIPE_SELECT);
        push_filters(&mut select);
        select
            .push(" ORDER BY r.pub_date DESC, r.id DESC LIMIT ")
            .push_bind(params.pagination().limit())
            .push(" OFFSET ")
            .push_bind(params.pagination().offset());

        let recipes = select
            .build_query_as::<AdminRecipeDto>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list recipes: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((recipes, total))
    }

    // =========================================================================
    // TAGS
    // =========================================================================

    pub async fn create_tag(&self, dto: CreateTagDto) -> Result<TagResponseDto> {
        self.tags.create(dto).await
    }

    pub async fn update_tag(&self, id: i64, dto: UpdateTagDto) -> Result<TagResponseDto> {
        self.tags.update(id, dto).await
    }

    pub async fn delete_tag(&self, id: i64) -> Result<()> {
        self.tags.delete(id).await
    }

    pub async fn import_tags(&self, items: Vec<CreateTagDto>) -> Result<ImportResultDto> {
        self.tags.import(items).await
    }

    // =========================================================================
    // INGREDIENTS
    // =========================================================================

    pub async fn list_ingredients(
        &self,
        params: &IngredientQueryParams,
    ) -> Result<(Vec<AdminIngredientDto>, i64)> {
        let push_filters = |builder: &mut QueryBuilder<'_, Postgres>| {
            push_search(
                builder,
                &["i.name", "i.measurement_unit"],
                params.search.as_deref(),
            );
            if let Some(unit) = params
                .measurement_unit
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
            {
                builder
                    .push(" AND i.measurement_unit = ")
                    .push_bind(unit.to_string());
            }
        };

        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM ingredients i WHERE TRUE");
        push_filters(&mut count);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count ingredients: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT i.id, i.name, i.measurement_unit,
                   (SELECT COUNT(DISTINCT ri.recipe_id) FROM recipe_ingredients ri
                    WHERE ri.ingredient_id = i.id) AS recipes_count
            FROM ingredients i
            WHERE TRUE"#,
        );
        push_filters(&mut select);
        select
            .push(" ORDER BY i.name, i.measurement_unit LIMIT ")
            .push_bind(params.pagination().limit())
            .push(" OFFSET ")
            .push_bind(params.pagination().offset());

        let ingredients = select
            .build_query_as::<AdminIngredientDto>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list ingredients: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((ingredients, total))
    }

    pub async fn create_ingredient(&self, dto: CreateIngredientDto) -> Result<IngredientResponseDto> {
        self.ingredients.create(dto).await
    }

    pub async fn delete_ingredient(&self, id: i64) -> Result<()> {
        self.ingredients.delete(id).await
    }

    pub async fn import_ingredients(
        &self,
        items: Vec<CreateIngredientDto>,
    ) -> Result<ImportResultDto> {
        self.ingredients.import(items).await
    }

    // =========================================================================
    // RELATIONS
    // =========================================================================

    /// Favorites (`favorites`) or cart entries (`shopping_carts`)
    async fn list_recipe_relations(
        &self,
        table: &'static str,
        params: &RelationQueryParams,
    ) -> Result<(Vec<AdminRecipeRelationDto>, i64)> {
        let from = format!(
            " FROM {} x JOIN users u ON u.id = x.user_id JOIN recipes r ON r.id = x.recipe_id WHERE TRUE",
            table
        );

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*)");
        count.push(&from);
        push_search(&mut count, &["u.username", "r.name"], params.search.as_deref());
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count {}: {:?}", table, e);
                AppError::Database(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT x.id, x.user_id, u.username, x.recipe_id, r.name AS recipe_name, x.created_at",
        );
        select.push(&from);
        push_search(&mut select, &["u.username", "r.name"], params.search.as_deref());
        select
            .push(" ORDER BY x.created_at DESC, x.id DESC LIMIT ")
            .push_bind(params.pagination().limit())
            .push(" OFFSET ")
            .push_bind(params.pagination().offset());

        let rows = select
            .build_query_as::<AdminRecipeRelationDto>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list {}: {:?}", table, e);
                AppError::Database(e)
            })?;

        Ok((rows, total))
    }

    pub async fn list_favorites(
        &self,
        params: &RelationQueryParams,
    ) -> Result<(Vec<AdminRecipeRelationDto>, i64)> {
        self.list_recipe_relations("favorites", params).await
    }

    pub async fn list_shopping_carts(
        &self,
        params: &RelationQueryParams,
    ) -> Result<(Vec<AdminRecipeRelationDto>, i64)> {
        self.list_recipe_relations("shopping_carts", params).await
    }

    pub async fn list_subscriptions(
        &self,
        params: &RelationQueryParams,
    ) -> Result<(Vec<AdminSubscriptionDto>, i64)> {
        const FROM: &str = " FROM subscriptions s \
                            JOIN users u ON u.id = s.user_id \
                            JOIN users a ON a.id = s.author_id WHERE TRUE";

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*)");
        count.push(FROM);
        push_search(&mut count, &["u.username", "a.username"], params.search.as_deref());
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count subscriptions: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT s.id, s.user_id, u.username, s.author_id, a.username AS author_username, s.created_at",
        );
        select.push(FROM);
        push_search(&mut select, &["u.username", "a.username"], params.search.as_deref());
        select
            .push(" ORDER BY s.created_at DESC, s.id DESC LIMIT ")
            .push_bind(params.pagination().limit())
            .push(" OFFSET ")
            .push_bind(params.pagination().offset());

        let rows = select
            .build_query_as::<AdminSubscriptionDto>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list subscriptions: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows, total))
    }
}
