use chrono::Utc;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::recipes::dtos::ShortRecipeDto;
use crate::features::recipes::models::{CartIngredientRow, RecipeSummary};
use crate::features::recipes::services::shopping_list;

/// Per-user recipe collections keyed by `(user_id, recipe_id)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Favorites,
    ShoppingCart,
}

impl Collection {
    fn table(self) -> &'static str {
        match self {
            Collection::Favorites => "favorites",
            Collection::ShoppingCart => "shopping_carts",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Collection::Favorites => "favorites",
            Collection::ShoppingCart => "the shopping cart",
        }
    }

    pub fn already_present(self, recipe_name: &str) -> String {
        format!("Recipe \"{}\" is already in {}", recipe_name, self.label())
    }

    pub fn not_present(self) -> String {
        format!("Recipe is not in {}", self.label())
    }
}

/// Service for favorites, shopping carts and the shopping list download
pub struct CollectionService {
    pool: PgPool,
}

impl CollectionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn add(
        &self,
        collection: Collection,
        user: &AuthenticatedUser,
        recipe_id: i64,
    ) -> Result<ShortRecipeDto> {
        let recipe = sqlx::query_as::<_, RecipeSummary>(
            "SELECT id, author_id, name, image, cooking_time FROM recipes WHERE id = $1",
        )
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load recipe {}: {:?}", recipe_id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Recipe with id {} not found", recipe_id)))?;

        let sql = format!(
            "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, recipe_id) DO NOTHING RETURNING id",
            collection.table()
        );
        let inserted = sqlx::query_scalar::<_, i64>(&sql)
            .bind(user.id)
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_db(e, &[]))?;

        if inserted.is_none() {
            return Err(AppError::Duplicate(collection.already_present(&recipe.name)));
        }

        tracing::info!(
            "User {} added recipe {} to {}",
            user.id,
            recipe_id,
            collection.table()
        );
        Ok(recipe.into())
    }

    pub async fn remove(
        &self,
        collection: Collection,
        user: &AuthenticatedUser,
        recipe_id: i64,
    ) -> Result<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM recipes WHERE id = $1)",
        )
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await?;
        if !exists {
            return Err(AppError::NotFound(format!(
                "Recipe with id {} not found",
                recipe_id
            )));
        }

        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            collection.table()
        );
        let result = sqlx::query(&sql)
            .bind(user.id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to remove from {}: {:?}", collection.table(), e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(collection.not_present()));
        }
        Ok(())
    }

    /// Render the caller's shopping list
    pub async fn shopping_list(&self, user: &AuthenticatedUser) -> Result<String> {
        let recipe_names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM shopping_carts c
            JOIN recipes r ON r.id = c.recipe_id
            WHERE c.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, CartIngredientRow>(
            r#"
            SELECT i.name, i.measurement_unit, ri.amount
            FROM shopping_carts c
            JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE c.user_id = $1
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        let products = shopping_list::aggregate(rows);
        tracing::debug!(
            "Shopping list for user {}: {} recipes, {} products",
            user.id,
            recipe_names.len(),
            products.len()
        );
        shopping_list::render(&recipe_names, &products, Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{seed_ingredient, seed_recipe, seed_user};

    #[test]
    fn test_collection_messages() {
        assert_eq!(
            Collection::Favorites.already_present("Borscht"),
            "Recipe \"Borscht\" is already in favorites"
        );
        assert_eq!(
            Collection::ShoppingCart.already_present("Borscht"),
            "Recipe \"Borscht\" is already in the shopping cart"
        );
        assert_eq!(Collection::ShoppingCart.not_present(), "Recipe is not in the shopping cart");
    }

    async fn favorite_rows(pool: &PgPool, user_id: i64, recipe_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_favorite_twice_keeps_one_row(pool: PgPool) {
        let user = seed_user(&pool, "ann").await;
        let recipe_id = seed_recipe(&pool, user.id, "Borscht", &[]).await;
        let service = CollectionService::new(pool.clone());

        let added = service
            .add(Collection::Favorites, &user, recipe_id)
            .await
            .unwrap();
        assert_eq!(added.id, recipe_id);
        assert_eq!(added.name, "Borscht");

        match service.add(Collection::Favorites, &user, recipe_id).await {
            Err(AppError::Duplicate(message)) => {
                assert_eq!(message, "Recipe \"Borscht\" is already in favorites")
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
        assert_eq!(favorite_rows(&pool, user.id, recipe_id).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_remove_absent_favorite_is_not_found(pool: PgPool) {
        let user = seed_user(&pool, "ann").await;
        let recipe_id = seed_recipe(&pool, user.id, "Borscht", &[]).await;
        let service = CollectionService::new(pool.clone());

        match service.remove(Collection::Favorites, &user, recipe_id).await {
            Err(AppError::NotFound(message)) => assert_eq!(message, "Recipe is not in favorites"),
            other => panic!("expected not found, got {:?}", other),
        }

        service
            .add(Collection::Favorites, &user, recipe_id)
            .await
            .unwrap();
        service
            .remove(Collection::Favorites, &user, recipe_id)
            .await
            .unwrap();
        assert_eq!(favorite_rows(&pool, user.id, recipe_id).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_missing_recipe_is_not_found(pool: PgPool) {
        let user = seed_user(&pool, "ann").await;
        let service = CollectionService::new(pool);

        assert!(matches!(
            service.add(Collection::ShoppingCart, &user, 999).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.remove(Collection::ShoppingCart, &user, 999).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_shopping_list_sums_cart_recipes(pool: PgPool) {
        let user = seed_user(&pool, "ann").await;
        let salt = seed_ingredient(&pool, "salt", "g").await;
        let milk = seed_ingredient(&pool, "milk", "ml").await;
        let pancakes = seed_recipe(&pool, user.id, "pancakes", &[(salt, 2), (milk, 250)]).await;
        let borscht = seed_recipe(&pool, user.id, "borscht", &[(salt, 3)]).await;
        let skipped = seed_recipe(&pool, user.id, "soup", &[(salt, 40)]).await;

        let service = CollectionService::new(pool.clone());
        for recipe_id in [pancakes, borscht] {
            service
                .add(Collection::ShoppingCart, &user, recipe_id)
                .await
                .unwrap();
        }
        service
            .add(Collection::Favorites, &user, skipped)
            .await
            .unwrap();

        let report = service.shopping_list(&user).await.unwrap();

        assert!(report.starts_with("SHOPPING LIST\n"));
        assert!(report.contains(" - Borscht\n - Pancakes\n"));
        assert!(report.contains("1. Milk (ml) 250\n"));
        assert!(report.contains("2. Salt (g) 5\n"));
        assert!(!report.contains("Soup"));
        assert_eq!(report.matches("Salt").count(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_empty_cart_renders_empty_list(pool: PgPool) {
        let user = seed_user(&pool, "ann").await;
        let report = CollectionService::new(pool)
            .shopping_list(&user)
            .await
            .unwrap();

        assert!(report.contains("PRODUCTS:\n"));
        assert!(!report.contains("1. "));
    }
}
