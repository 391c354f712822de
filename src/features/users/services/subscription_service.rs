use std::collections::HashMap;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::recipes::dtos::ShortRecipeDto;
use crate::features::recipes::models::RecipeSummary;
use crate::features::users::dtos::{SubscriptionQuery, SubscriptionResponseDto};
use crate::features::users::models::SubscribedAuthor;
use crate::shared::types::{parse_recipes_limit, PaginationQuery};

const SELF_SUBSCRIPTION: &str = "You cannot subscribe to yourself";

const AUTHOR_COLUMNS: &str = r#"
    u.id, u.email, u.username, u.first_name, u.last_name,
    (SELECT COUNT(*) FROM recipes r WHERE r.author_id = u.id) AS recipes_count
"#;

/// Service for following authors
pub struct SubscriptionService {
    pool: PgPool,
}

impl SubscriptionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Follow an author
    pub async fn subscribe(
        &self,
        user: &AuthenticatedUser,
        author_id: i64,
        recipes_limit: Option<usize>,
    ) -> Result<SubscriptionResponseDto> {
        if user.id == author_id {
            return Err(AppError::Validation(SELF_SUBSCRIPTION.to_string()));
        }

        let author = self.get_author(author_id).await?;

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO subscriptions (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, author_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(user.id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, &[]))?;

        if inserted.is_none() {
            return Err(AppError::Duplicate(format!(
                "You are already subscribed to {}",
                author.username
            )));
        }

        tracing::info!("User {} subscribed to {}", user.id, author_id);

        let recipes = self.recipes_of(&[author.id]).await?;
        build_subscriptions(vec![author], recipes, recipes_limit)
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Subscription row vanished".to_string()))
    }

    /// Stop following an author
    pub async fn unsubscribe(&self, user: &AuthenticatedUser, author_id: i64) -> Result<()> {
        if user.id == author_id {
            return Err(AppError::Validation(SELF_SUBSCRIPTION.to_string()));
        }

        self.get_author(author_id).await?;

        let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2")
            .bind(user.id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete subscription: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "You are not subscribed to this user".to_string(),
            ));
        }

        tracing::info!("User {} unsubscribed from {}", user.id, author_id);
        Ok(())
    }

    /// Authors the caller follows, most recent subscription first
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        query: &SubscriptionQuery,
    ) -> Result<(Vec<SubscriptionResponseDto>, i64)> {
        let pagination = PaginationQuery::new(query.page, query.limit);

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
                .bind(user.id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count subscriptions: {:?}", e);
                    AppError::Database(e)
                })?;

        let sql = format!(
            r#"
            SELECT {}
            FROM subscriptions s
            JOIN users u ON u.id = s.author_id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT $2 OFFSET $3
            "#,
            AUTHOR_COLUMNS
        );
        let authors = sqlx::query_as::<_, SubscribedAuthor>(&sql)
            .bind(user.id)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list subscriptions: {:?}", e);
                AppError::Database(e)
            })?;

        let author_ids: Vec<i64> = authors.iter().map(|a| a.id).collect();
        let recipes = self.recipes_of(&author_ids).await?;
        let limit = parse_recipes_limit(query.recipes_limit.as_deref());

        Ok((build_subscriptions(authors, recipes, limit), total))
    }

    async fn get_author(&self, author_id: i64) -> Result<SubscribedAuthor> {
        let sql = format!("SELECT {} FROM users u WHERE u.id = $1", AUTHOR_COLUMNS);
        sqlx::query_as::<_, SubscribedAuthor>(&sql)
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get author {}: {:?}", author_id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", author_id)))
    }

    async fn recipes_of(&self, author_ids: &[i64]) -> Result<Vec<RecipeSummary>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, RecipeSummary>(
            r#"
            SELECT id, author_id, name, image, cooking_time
            FROM recipes
            WHERE author_id = ANY($1)
            ORDER BY pub_date, id
            "#,
        )
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load author recipes: {:?}", e);
            AppError::Database(e)
        })
    }
}

/// Attach each author's recipes (in order, optionally truncated)
fn build_subscriptions(
    authors: Vec<SubscribedAuthor>,
    recipes: Vec<RecipeSummary>,
    recipes_limit: Option<usize>,
) -> Vec<SubscriptionResponseDto> {
    let mut by_author: HashMap<i64, Vec<ShortRecipeDto>> = HashMap::new();
    for recipe in recipes {
        by_author
            .entry(recipe.author_id)
            .or_default()
            .push(recipe.into());
    }

    authors
        .into_iter()
        .map(|author| {
            let mut recipes = by_author.remove(&author.id).unwrap_or_default();
            if let Some(limit) = recipes_limit {
                recipes.truncate(limit);
            }

            SubscriptionResponseDto {
                id: author.id,
                email: author.email,
                username: author.username,
                first_name: author.first_name,
                last_name: author.last_name,
                is_subscribed: true,
                recipes,
                recipes_count: author.recipes_count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(id: i64, recipes_count: i64) -> SubscribedAuthor {
        SubscribedAuthor {
            id,
            email: format!("author{}@example.com", id),
            username: format!("author{}", id),
            first_name: "Ann".to_string(),
            last_name: "Cook".to_string(),
            recipes_count,
        }
    }

    fn recipe(id: i64, author_id: i64) -> RecipeSummary {
        RecipeSummary {
            id,
            author_id,
            name: format!("Recipe {}", id),
            image: format!("memory://public/recipes/{}.png", id),
            cooking_time: 10,
        }
    }

    #[test]
    fn test_recipes_grouped_per_author_in_order() {
        let result = build_subscriptions(
            vec![author(1, 2), author(2, 1)],
            vec![recipe(10, 1), recipe(11, 2), recipe(12, 1)],
            None,
        );

        assert_eq!(result.len(), 2);
        let ids: Vec<i64> = result[0].recipes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 12]);
        assert_eq!(result[1].recipes.len(), 1);
        assert!(result.iter().all(|s| s.is_subscribed));
    }

    #[test]
    fn test_recipes_limit_truncates_but_keeps_count() {
        let result = build_subscriptions(
            vec![author(1, 3)],
            vec![recipe(10, 1), recipe(11, 1), recipe(12, 1)],
            Some(1),
        );

        assert_eq!(result[0].recipes.len(), 1);
        assert_eq!(result[0].recipes[0].id, 10);
        assert_eq!(result[0].recipes_count, 3);
    }

    #[test]
    fn test_author_without_recipes() {
        let result = build_subscriptions(vec![author(5, 0)], vec![], Some(3));
        assert!(result[0].recipes.is_empty());
        assert_eq!(result[0].recipes_count, 0);
    }
}
