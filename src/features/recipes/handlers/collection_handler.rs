use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::IntoResponse,
    Json,
};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::recipes::dtos::ShortRecipeDto;
use crate::features::recipes::services::{Collection, CollectionService};
use crate::shared::types::ApiResponse;

async fn add(
    collection: Collection,
    service: &CollectionService,
    user: &AuthenticatedUser,
    recipe_id: i64,
) -> Result<(StatusCode, Json<ApiResponse<ShortRecipeDto>>)> {
    let recipe = service.add(collection, user, recipe_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(recipe), None, None)),
    ))
}

/// Add a recipe to favorites
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Added to favorites", body = ApiResponse<ShortRecipeDto>),
        (status = 400, description = "Already in favorites"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found")
    ),
    tag = "recipes",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_favorite(
    user: AuthenticatedUser,
    State(service): State<Arc<CollectionService>>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ApiResponse<ShortRecipeDto>>)> {
    add(Collection::Favorites, &service, &user, id).await
}

/// Remove a recipe from favorites
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Removed from favorites"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found or not in favorites")
    ),
    tag = "recipes",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_favorite(
    user: AuthenticatedUser,
    State(service): State<Arc<CollectionService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.remove(Collection::Favorites, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a recipe to the shopping cart
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Added to the shopping cart", body = ApiResponse<ShortRecipeDto>),
        (status = 400, description = "Already in the shopping cart"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found")
    ),
    tag = "recipes",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_to_cart(
    user: AuthenticatedUser,
    State(service): State<Arc<CollectionService>>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ApiResponse<ShortRecipeDto>>)> {
    add(Collection::ShoppingCart, &service, &user, id).await
}

/// Remove a recipe from the shopping cart
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Removed from the shopping cart"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found or not in the shopping cart")
    ),
    tag = "recipes",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_from_cart(
    user: AuthenticatedUser,
    State(service): State<Arc<CollectionService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.remove(Collection::ShoppingCart, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Download the aggregated shopping list as a text file
#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    responses(
        (status = 200, description = "Shopping list", content_type = "text/plain", body = String),
        (status = 401, description = "Unauthorized")
    ),
    tag = "recipes",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_shopping_cart(
    user: AuthenticatedUser,
    State(service): State<Arc<CollectionService>>,
) -> Result<impl IntoResponse> {
    let report = service.shopping_list(&user).await?;
    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_list.txt\"",
            ),
        ],
        report,
    ))
}
