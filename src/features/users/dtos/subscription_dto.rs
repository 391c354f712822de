use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::recipes::dtos::ShortRecipeDto;

/// An author the caller follows, with a preview of their recipes
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponseDto {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<ShortRecipeDto>,
    pub recipes_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SubscriptionQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Truncates each author's `recipes`; ignored unless made of digits
    pub recipes_limit: Option<String>,
}
