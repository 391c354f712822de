use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::recipes::dtos::{
    CreateRecipeDto, IngredientAmountDto, RecipeIngredientDto, RecipeListQuery, RecipeRefs,
    RecipeResponseDto, UpdateRecipeDto,
};
use crate::features::recipes::image::{self, RecipeImage};
use crate::features::recipes::models::{
    Recipe, RecipeIngredientRow, RecipeListRow, RecipeTagRow,
};
use crate::features::tags::dtos::TagResponseDto;
use crate::features::users::dtos::UserResponseDto;
use crate::features::users::models::UserWithSubscription;
use crate::modules::storage::ObjectStorage;

const RECIPE_UNIQUE_MESSAGES: &[(&str, &str)] = &[(
    "recipes_unique_name_author",
    "You already have a recipe with this name",
)];

const RECIPE_COLUMNS: &str = "id, author_id, name, text, image, cooking_time, pub_date";

/// Ids that occur more than once, ascending
pub fn duplicate_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for id in ids {
        if !seen.insert(*id) {
            duplicates.insert(*id);
        }
    }
    duplicates.into_iter().collect()
}

/// Reject repeated tag or ingredient ids before anything touches storage
pub fn check_duplicate_refs(dto: &impl RecipeRefs) -> Result<()> {
    for ids in [dto.tag_ids(), dto.ingredient_ids()] {
        let duplicates = duplicate_ids(&ids);
        if !duplicates.is_empty() {
            return Err(AppError::Validation(format!(
                "Duplicate ids are not allowed: id={:?}",
                duplicates
            )));
        }
    }
    Ok(())
}

/// Ids of `requested` that are absent from `found`, ascending
pub fn missing_ids(requested: &[i64], found: &[i64]) -> Vec<i64> {
    let found: BTreeSet<i64> = found.iter().copied().collect();
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Build response DTOs from recipe rows and their batch-loaded relations
pub fn assemble(
    rows: Vec<RecipeListRow>,
    tags: Vec<RecipeTagRow>,
    ingredients: Vec<RecipeIngredientRow>,
    authors: Vec<UserWithSubscription>,
) -> Result<Vec<RecipeResponseDto>> {
    let mut tags_by_recipe: HashMap<i64, Vec<TagResponseDto>> = HashMap::new();
    for tag in tags {
        tags_by_recipe
            .entry(tag.recipe_id)
            .or_default()
            .push(TagResponseDto {
                id: tag.id,
                name: tag.name,
                color: tag.color,
                slug: tag.slug,
            });
    }

    let mut ingredients_by_recipe: HashMap<i64, Vec<RecipeIngredientDto>> = HashMap::new();
    for ingredient in ingredients {
        ingredients_by_recipe
            .entry(ingredient.recipe_id)
            .or_default()
            .push(ingredient.into());
    }

    let authors: HashMap<i64, UserResponseDto> = authors
        .into_iter()
        .map(|a| (a.id, UserResponseDto::from(a)))
        .collect();

    rows.into_iter()
        .map(|row| {
            let author = authors.get(&row.author_id).cloned().ok_or_else(|| {
                AppError::Internal(format!("Author {} of recipe {} missing", row.author_id, row.id))
            })?;

            Ok(RecipeResponseDto {
                id: row.id,
                tags: tags_by_recipe.remove(&row.id).unwrap_or_default(),
                author,
                ingredients: ingredients_by_recipe.remove(&row.id).unwrap_or_default(),
                is_favorited: row.is_favorited,
                is_in_shopping_cart: row.is_in_shopping_cart,
                name: row.name,
                image: row.image,
                text: row.text,
                cooking_time: row.cooking_time,
            })
        })
        .collect()
}

/// Service for recipe CRUD and listing
pub struct RecipeService {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
}

impl RecipeService {
    pub fn new(pool: PgPool, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { pool, storage }
    }

    /// Paginated, filtered recipe list
    pub async fn list(
        &self,
        query: &RecipeListQuery,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<(Vec<RecipeResponseDto>, i64)> {
        let caller_id = caller.map(|u| u.id);
        if caller_id.is_none() && (query.only_favorited() || query.only_in_shopping_cart()) {
            return Ok((Vec::new(), 0));
        }

        let pagination = query.pagination();

        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM recipes r WHERE TRUE");
        push_filters(&mut count, query, caller_id);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count recipes: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select = select_rows(caller_id);
        select.push(" WHERE TRUE");
        push_filters(&mut select, query, caller_id);
        select
            .push(" ORDER BY r.pub_date, r.id LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = select
            .build_query_as::<RecipeListRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list recipes: {:?}", e);
                AppError::Database(e)
            })?;

        let recipes = self.hydrate(rows, caller_id).await?;
        Ok((recipes, total))
    }

    /// Single recipe as seen by the caller
    pub async fn get(
        &self,
        id: i64,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<RecipeResponseDto> {
        let caller_id = caller.map(|u| u.id);

        let mut select = select_rows(caller_id);
        select.push(" WHERE r.id = ").push_bind(id);

        let row = select
            .build_query_as::<RecipeListRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get recipe {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Recipe with id {} not found", id)))?;

        self.hydrate(vec![row], caller_id)
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Recipe with id {} not found", id)))
    }

    /// Create a recipe owned by the caller
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateRecipeDto,
        upload: Option<RecipeImage>,
    ) -> Result<RecipeResponseDto> {
        check_duplicate_refs(&dto)?;
        let image = match (upload, dto.image.as_deref()) {
            (Some(upload), _) => upload,
            (None, Some(uri)) => image::decode_data_uri(uri)?,
            (None, None) => return Err(AppError::Validation("Image is required".to_string())),
        };
        self.check_refs_exist(&dto).await?;

        let image_url = self
            .storage
            .put_public(&image.object_path(), image.bytes, image.content_type)
            .await?;

        let result = self.insert_recipe(user, &dto, &image_url).await;
        let recipe_id = match result {
            Ok(id) => id,
            Err(e) => {
                self.remove_image(&image_url).await;
                return Err(e);
            }
        };

        tracing::info!("User {} created recipe {}", user.id, recipe_id);
        self.get(recipe_id, Some(user)).await
    }

    /// Update a recipe; ingredients and tags are replaced wholesale
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: i64,
        dto: UpdateRecipeDto,
        upload: Option<RecipeImage>,
    ) -> Result<RecipeResponseDto> {
        check_duplicate_refs(&dto)?;
        let new_image = match (upload, dto.image.as_deref()) {
            (Some(upload), _) => Some(upload),
            (None, Some(uri)) => Some(image::decode_data_uri(uri)?),
            (None, None) => None,
        };

        let recipe = self.find(id).await?;
        if !user.can_modify(recipe.author_id) {
            return Err(AppError::Forbidden(
                "Only the author can change this recipe".to_string(),
            ));
        }
        self.check_refs_exist(&dto).await?;

        let new_image_url = match new_image {
            Some(image) => Some(
                self.storage
                    .put_public(&image.object_path(), image.bytes, image.content_type)
                    .await?,
            ),
            None => None,
        };

        if let Err(e) = self.update_recipe(id, &dto, new_image_url.as_deref()).await {
            if let Some(url) = &new_image_url {
                self.remove_image(url).await;
            }
            return Err(e);
        }

        if new_image_url.is_some() {
            self.remove_image(&recipe.image).await;
        }

        tracing::info!("User {} updated recipe {}", user.id, id);
        self.get(id, Some(user)).await
    }

    /// Delete a recipe; amounts, tag links, favorites and cart rows cascade
    pub async fn delete(&self, user: &AuthenticatedUser, id: i64) -> Result<()> {
        let recipe = self.find(id).await?;
        if !user.can_modify(recipe.author_id) {
            return Err(AppError::Forbidden(
                "Only the author can delete this recipe".to_string(),
            ));
        }

        sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete recipe {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        self.remove_image(&recipe.image).await;
        tracing::info!("User {} deleted recipe {}", user.id, id);
        Ok(())
    }

    async fn find(&self, id: i64) -> Result<Recipe> {
        let sql = format!("SELECT {} FROM recipes WHERE id = $1", RECIPE_COLUMNS);
        sqlx::query_as::<_, Recipe>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load recipe {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Recipe with id {} not found", id)))
    }

    async fn check_refs_exist(&self, dto: &impl RecipeRefs) -> Result<()> {
        for (table, ids) in [("tags", dto.tag_ids()), ("ingredients", dto.ingredient_ids())] {
            let sql = format!("SELECT id FROM {} WHERE id = ANY($1)", table);
            let found = sqlx::query_scalar::<_, i64>(&sql)
                .bind(&ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to check {} ids: {:?}", table, e);
                    AppError::Database(e)
                })?;

            let missing = missing_ids(&ids, &found);
            if !missing.is_empty() {
                return Err(AppError::Validation(format!(
                    "Objects with id = {:?} not found",
                    missing
                )));
            }
        }
        Ok(())
    }

    async fn insert_recipe(
        &self,
        user: &AuthenticatedUser,
        dto: &CreateRecipeDto,
        image_url: &str,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let recipe_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO recipes (author_id, name, text, image, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user.id)
        .bind(&dto.name)
        .bind(&dto.text)
        .bind(image_url)
        .bind(dto.cooking_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, RECIPE_UNIQUE_MESSAGES))?;

        insert_links(&mut tx, recipe_id, &dto.tags, &dto.ingredients).await?;
        tx.commit().await?;

        Ok(recipe_id)
    }

    async fn update_recipe(
        &self,
        id: i64,
        dto: &UpdateRecipeDto,
        image_url: Option<&str>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE recipes
            SET name = COALESCE($2, name),
                text = COALESCE($3, text),
                image = COALESCE($4, image),
                cooking_time = COALESCE($5, cooking_time)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(dto.name.as_deref())
        .bind(dto.text.as_deref())
        .bind(image_url)
        .bind(dto.cooking_time)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, RECIPE_UNIQUE_MESSAGES))?;

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_links(&mut tx, id, &dto.tags, &dto.ingredients).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Load tags, ingredient lines and authors for a page of rows
    async fn hydrate(
        &self,
        rows: Vec<RecipeListRow>,
        caller_id: Option<i64>,
    ) -> Result<Vec<RecipeResponseDto>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let recipe_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let author_ids: Vec<i64> = rows
            .iter()
            .map(|r| r.author_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let tags = sqlx::query_as::<_, RecipeTagRow>(
            r#"
            SELECT rt.recipe_id, t.id, t.name, t.color, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(&recipe_ids)
        .fetch_all(&self.pool)
        .await?;

        let ingredients = sqlx::query_as::<_, RecipeIngredientRow>(
            r#"
            SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY ri.id
            "#,
        )
        .bind(&recipe_ids)
        .fetch_all(&self.pool)
        .await?;

        let authors = sqlx::query_as::<_, UserWithSubscription>(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name,
                   EXISTS (
                       SELECT 1 FROM subscriptions s WHERE s.user_id = $1 AND s.author_id = u.id
                   ) AS is_subscribed
            FROM users u
            WHERE u.id = ANY($2)
            "#,
        )
        .bind(caller_id)
        .bind(&author_ids)
        .fetch_all(&self.pool)
        .await?;

        assemble(rows, tags, ingredients, authors)
    }

    async fn remove_image(&self, url: &str) {
        if let Err(e) = self.storage.delete_by_url(url).await {
            tracing::warn!("Failed to remove image {}: {}", url, e);
        }
    }
}

/// `SELECT` of recipe rows with the caller's flags; `FROM recipes r`
fn select_rows(caller_id: Option<i64>) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT r.id, r.author_id, r.name, r.text, r.image, r.cooking_time, \
         EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ",
    );
    builder
        .push_bind(caller_id)
        .push(") AS is_favorited, EXISTS (SELECT 1 FROM shopping_carts c WHERE c.recipe_id = r.id AND c.user_id = ")
        .push_bind(caller_id)
        .push(") AS is_in_shopping_cart FROM recipes r");
    builder
}

fn push_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    query: &RecipeListQuery,
    caller_id: Option<i64>,
) {
    if let Some(author) = query.author {
        builder.push(" AND r.author_id = ").push_bind(author);
    }

    if !query.tags.is_empty() {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
                 WHERE rt.recipe_id = r.id AND t.slug = ANY(",
            )
            .push_bind(query.tags.clone())
            .push("))");
    }

    if let Some(caller_id) = caller_id {
        if query.only_favorited() {
            builder
                .push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
                .push_bind(caller_id)
                .push(")");
        }
        if query.only_in_shopping_cart() {
            builder
                .push(" AND EXISTS (SELECT 1 FROM shopping_carts c WHERE c.recipe_id = r.id AND c.user_id = ")
                .push_bind(caller_id)
                .push(")");
        }
    }
}

async fn insert_links(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i64,
    tag_ids: &[i64],
    ingredients: &[IngredientAmountDto],
) -> Result<()> {
    let mut tags: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
    tags.push_values(tag_ids, |mut row, tag_id| {
        row.push_bind(recipe_id).push_bind(*tag_id);
    });
    tags.build()
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::from_db(e, &[]))?;

    let mut amounts: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");
    amounts.push_values(ingredients, |mut row, ingredient| {
        row.push_bind(recipe_id)
            .push_bind(ingredient.id)
            .push_bind(ingredient.amount);
    });
    amounts
        .build()
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::from_db(e, &[]))?;

    Ok(())
}
