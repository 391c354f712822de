use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{SubscriptionQuery, SubscriptionResponseDto};
use crate::features::users::services::SubscriptionService;
use crate::shared::types::{parse_recipes_limit, ApiResponse};

/// Authors the caller is subscribed to
#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    params(SubscriptionQuery),
    responses(
        (status = 200, description = "Page of followed authors", body = ApiResponse<Vec<SubscriptionResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_subscriptions(
    user: AuthenticatedUser,
    State(service): State<Arc<SubscriptionService>>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<Json<ApiResponse<Vec<SubscriptionResponseDto>>>> {
    let (authors, total) = service.list(&user, &query).await?;
    Ok(Json(ApiResponse::paginated(authors, total)))
}

/// Subscribe to an author
#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    params(
        ("id" = i64, Path, description = "Author ID"),
        SubscriptionQuery
    ),
    responses(
        (status = 201, description = "Subscribed", body = ApiResponse<SubscriptionResponseDto>),
        (status = 400, description = "Self-subscription or already subscribed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Author not found")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn subscribe(
    user: AuthenticatedUser,
    State(service): State<Arc<SubscriptionService>>,
    Path(author_id): Path<i64>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<(StatusCode, Json<ApiResponse<SubscriptionResponseDto>>)> {
    let limit = parse_recipes_limit(query.recipes_limit.as_deref());
    let subscription = service.subscribe(&user, author_id, limit).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(subscription), None, None)),
    ))
}

/// Unsubscribe from an author
#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    params(
        ("id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Self-subscription"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Author or subscription not found")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unsubscribe(
    user: AuthenticatedUser,
    State(service): State<Arc<SubscriptionService>>,
    Path(author_id): Path<i64>,
) -> Result<StatusCode> {
    service.unsubscribe(&user, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
