use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::shared::types::{default_limit, default_page, PaginationQuery};

// =============================================================================
// USER DTOs
// =============================================================================

/// Subscription relation filter for the user list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionFilter {
    /// Users following at least one author
    WithSubscribing,
    /// Users followed by at least one user
    WithSubscribers,
}

impl SubscriptionFilter {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SubscriptionFilter::WithSubscribing => {
                "EXISTS (SELECT 1 FROM subscriptions s WHERE s.user_id = u.id)"
            }
            SubscriptionFilter::WithSubscribers => {
                "EXISTS (SELECT 1 FROM subscriptions s WHERE s.author_id = u.id)"
            }
        }
    }
}

/// Query params for listing users
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UserQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
    /// Search in username or email
    pub search: Option<String>,
    /// `with-subscribing` or `with-subscribers`
    pub subscriptions: Option<SubscriptionFilter>,
}

impl UserQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(Some(self.page), Some(self.limit))
    }
}

/// Admin view of a user
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AdminUserDto {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub recipes_count: i64,
    pub subscriptions_count: i64,
    pub subscribers_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Role and status switches; omitted fields stay unchanged
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserFlagsDto {
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
}

// =============================================================================
// RECIPE DTOs
// =============================================================================

/// Cooking time bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CookingTimeBucket {
    /// Up to 30 minutes
    Fast,
    /// 31 to 60 minutes
    Medium,
    /// Over 60 minutes
    Long,
}

impl CookingTimeBucket {
    /// Inclusive `(min, max)` minutes
    pub fn bounds(&self) -> (Option<i32>, Option<i32>) {
        match self {
            CookingTimeBucket::Fast => (None, Some(30)),
            CookingTimeBucket::Medium => (Some(31), Some(60)),
            CookingTimeBucket::Long => (Some(61), None),
        }
    }
}

/// Query params for listing recipes
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RecipeQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
    /// Search in recipe name or author username
    pub search: Option<String>,
    /// Tag slug
    pub tag: Option<String>,
    /// `fast`, `medium` or `long`
    pub cooking_time: Option<CookingTimeBucket>,
}

impl RecipeQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(Some(self.page), Some(self.limit))
    }
}

/// Admin view of a recipe
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AdminRecipeDto {
    pub id: i64,
    pub name: String,
    pub author_id: i64,
    pub author_username: String,
    pub cooking_time: i32,
    pub image: String,
    /// Tag names
    pub tags: Vec<String>,
    /// `Name amount unit` lines
    pub ingredients: Vec<String>,
    pub favorites_count: i64,
    pub pub_date: DateTime<Utc>,
}

// =============================================================================
// INGREDIENT DTOs
// =============================================================================

/// Query params for listing ingredients
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct IngredientQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
    /// Search in name or measurement unit
    pub search: Option<String>,
    /// Exact measurement unit
    pub measurement_unit: Option<String>,
}

impl IngredientQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(Some(self.page), Some(self.limit))
    }
}

/// Admin view of an ingredient
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AdminIngredientDto {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    /// Recipes using this ingredient
    pub recipes_count: i64,
}

// =============================================================================
// RELATION DTOs
// =============================================================================

/// Query params for favorites, shopping carts and subscriptions
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RelationQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
    /// Search in usernames or recipe names
    pub search: Option<String>,
}

impl RelationQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(Some(self.page), Some(self.limit))
    }
}

/// A favorite or shopping cart entry
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AdminRecipeRelationDto {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub recipe_id: i64,
    pub recipe_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AdminSubscriptionDto {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub author_id: i64,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
    use axum::{extract::Query, http::Uri};

    fn parse<T: serde::de::DeserializeOwned>(query: &str) -> Option<T> {
        let uri: Uri = format!("/api/admin?{}", query).parse().unwrap();
        Query::<T>::try_from_uri(&uri).ok().map(|Query(params)| params)
    }

    #[test]
    fn test_cooking_time_bounds() {
        assert_eq!(CookingTimeBucket::Fast.bounds(), (None, Some(30)));
        assert_eq!(CookingTimeBucket::Medium.bounds(), (Some(31), Some(60)));
        assert_eq!(CookingTimeBucket::Long.bounds(), (Some(61), None));
    }

    #[test]
    fn test_user_query_params_from_query_string() {
        let params: UserQueryParams =
            parse("page=3&limit=500&subscriptions=with-subscribers").unwrap();

        assert_eq!(params.subscriptions, Some(SubscriptionFilter::WithSubscribers));
        assert_eq!(params.pagination().limit(), MAX_PAGE_SIZE);
        assert_eq!(params.pagination().offset(), 2 * MAX_PAGE_SIZE);
    }

    #[test]
    fn test_recipe_query_defaults() {
        let params: RecipeQueryParams = parse("cooking_time=long").unwrap();
        assert_eq!(params.cooking_time, Some(CookingTimeBucket::Long));
        assert_eq!(params.pagination().limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.pagination().offset(), 0);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let params: RelationQueryParams = parse("page=922337203685477580&limit=100").unwrap();
        assert_eq!(params.pagination().offset(), i64::MAX);
    }

    #[test]
    fn test_unknown_bucket_rejected() {
        assert!(parse::<RecipeQueryParams>("cooking_time=slow").is_none());
    }
}
