use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Query;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::MaybeUser;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::recipes::dtos::{
    CreateRecipeDto, RecipeListQuery, RecipeResponseDto, UpdateRecipeDto,
};
use crate::features::recipes::form::RecipeForm;
use crate::features::recipes::services::RecipeService;
use crate::shared::types::ApiResponse;

/// List recipes
#[utoipa::path(
    get,
    path = "/api/recipes",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Page of recipes", body = ApiResponse<Vec<RecipeResponseDto>>),
        (status = 400, description = "Invalid filter value")
    ),
    tag = "recipes"
)]
pub async fn list_recipes(
    caller: MaybeUser,
    State(service): State<Arc<RecipeService>>,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<ApiResponse<Vec<RecipeResponseDto>>>> {
    let (recipes, total) = service.list(&query, caller.0.as_ref()).await?;
    Ok(Json(ApiResponse::paginated(recipes, total)))
}

/// Get recipe by id
#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe found", body = ApiResponse<RecipeResponseDto>),
        (status = 404, description = "Recipe not found")
    ),
    tag = "recipes"
)]
pub async fn get_recipe(
    caller: MaybeUser,
    State(service): State<Arc<RecipeService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RecipeResponseDto>>> {
    let recipe = service.get(id, caller.0.as_ref()).await?;
    Ok(Json(ApiResponse::success(Some(recipe), None, None)))
}

/// Create a recipe
///
/// Accepts JSON with `image` as a base64 data URI, or `multipart/form-data`
/// with an `image` file part.
#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = CreateRecipeDto,
    responses(
        (status = 201, description = "Recipe created", body = ApiResponse<RecipeResponseDto>),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "recipes",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    user: AuthenticatedUser,
    State(service): State<Arc<RecipeService>>,
    form: RecipeForm<CreateRecipeDto>,
) -> Result<(StatusCode, Json<ApiResponse<RecipeResponseDto>>)> {
    form.dto
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let recipe = service.create(&user, form.dto, form.upload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(recipe),
            Some("Recipe created".to_string()),
            None,
        )),
    ))
}

/// Update a recipe
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeDto,
    responses(
        (status = 200, description = "Recipe updated", body = ApiResponse<RecipeResponseDto>),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found")
    ),
    tag = "recipes",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    user: AuthenticatedUser,
    State(service): State<Arc<RecipeService>>,
    Path(id): Path<i64>,
    form: RecipeForm<UpdateRecipeDto>,
) -> Result<Json<ApiResponse<RecipeResponseDto>>> {
    form.dto
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let recipe = service.update(&user, id, form.dto, form.upload).await?;
    Ok(Json(ApiResponse::success(
        Some(recipe),
        Some("Recipe updated".to_string()),
        None,
    )))
}

/// Delete a recipe
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found")
    ),
    tag = "recipes",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_recipe(
    user: AuthenticatedUser,
    State(service): State<Arc<RecipeService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
