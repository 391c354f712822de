use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::ingredients::dtos::{IngredientResponseDto, IngredientSearchQuery};
use crate::features::ingredients::services::IngredientService;
use crate::shared::types::ApiResponse;

/// List ingredients, optionally by name prefix
///
/// Not paginated.
#[utoipa::path(
    get,
    path = "/api/ingredients",
    params(IngredientSearchQuery),
    responses(
        (status = 200, description = "Matching ingredients", body = ApiResponse<Vec<IngredientResponseDto>>),
    ),
    tag = "ingredients"
)]
pub async fn list_ingredients(
    State(service): State<Arc<IngredientService>>,
    Query(query): Query<IngredientSearchQuery>,
) -> Result<Json<ApiResponse<Vec<IngredientResponseDto>>>> {
    let ingredients = service.search(query.name.as_deref()).await?;
    Ok(Json(ApiResponse::success(Some(ingredients), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    params(
        ("id" = i64, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 200, description = "Ingredient found", body = ApiResponse<IngredientResponseDto>),
        (status = 404, description = "Ingredient not found")
    ),
    tag = "ingredients"
)]
pub async fn get_ingredient(
    State(service): State<Arc<IngredientService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<IngredientResponseDto>>> {
    let ingredient = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(ingredient), None, None)))
}
