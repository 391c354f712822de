use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::admin::dtos::*;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::features::ingredients::dtos::{CreateIngredientDto, IngredientResponseDto};
use crate::features::tags::dtos::{CreateTagDto, TagResponseDto, UpdateTagDto};
use crate::shared::types::{ApiResponse, ImportResultDto, Meta};

// =============================================================================
// USERS
// =============================================================================

/// List users with relation counts (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserQueryParams),
    responses(
        (status = 200, description = "List of users", body = ApiResponse<Vec<AdminUserDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<UserQueryParams>,
) -> Result<Json<ApiResponse<Vec<AdminUserDto>>>> {
    let (items, total) = service.list_users(&params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Grant or revoke admin rights, activate or deactivate a user
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserFlagsDto,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<AdminUserDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateUserFlagsDto>,
) -> Result<Json<ApiResponse<AdminUserDto>>> {
    let user = service.update_user(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(user),
        Some("User updated".to_string()),
        None,
    )))
}

/// Delete a user and everything they own
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    if admin.id == id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }
    service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// RECIPES
// =============================================================================

/// List recipes with tags, ingredient lines and favorite counts (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/recipes",
    params(RecipeQueryParams),
    responses(
        (status = 200, description = "List of recipes", body = ApiResponse<Vec<AdminRecipeDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipes(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<RecipeQueryParams>,
) -> Result<Json<ApiResponse<Vec<AdminRecipeDto>>>> {
    let (items, total) = service.list_recipes(&params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

// =============================================================================
// TAGS
// =============================================================================

/// Create a tag
#[utoipa::path(
    post,
    path = "/api/admin/tags",
    request_body = CreateTagDto,
    responses(
        (status = 201, description = "Tag created", body = ApiResponse<TagResponseDto>),
        (status = 400, description = "Invalid input or duplicate name/color/slug"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_tag(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<CreateTagDto>,
) -> Result<(StatusCode, Json<ApiResponse<TagResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tag = service.create_tag(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(tag),
            Some("Tag created".to_string()),
            None,
        )),
    ))
}

/// Update a tag
#[utoipa::path(
    patch,
    path = "/api/admin/tags/{id}",
    params(
        ("id" = i64, Path, description = "Tag ID")
    ),
    request_body = UpdateTagDto,
    responses(
        (status = 200, description = "Tag updated", body = ApiResponse<TagResponseDto>),
        (status = 400, description = "Invalid input or duplicate name/color/slug"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Tag not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_tag(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateTagDto>,
) -> Result<Json<ApiResponse<TagResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tag = service.update_tag(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(tag),
        Some("Tag updated".to_string()),
        None,
    )))
}

/// Delete a tag
#[utoipa::path(
    delete,
    path = "/api/admin/tags/{id}",
    params(
        ("id" = i64, Path, description = "Tag ID")
    ),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Tag not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_tag(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.delete_tag(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk import tags; tags clashing on name, color or slug are skipped
#[utoipa::path(
    post,
    path = "/api/admin/tags/import",
    request_body = Vec<CreateTagDto>,
    responses(
        (status = 200, description = "Import summary", body = ApiResponse<ImportResultDto>),
        (status = 400, description = "Invalid item"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn import_tags(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(items): AppJson<Vec<CreateTagDto>>,
) -> Result<Json<ApiResponse<ImportResultDto>>> {
    for (index, item) in items.iter().enumerate() {
        item.validate()
            .map_err(|e| AppError::Validation(format!("Item {}: {}", index, e)))?;
    }

    let result = service.import_tags(items).await?;
    Ok(Json(ApiResponse::success(
        Some(result),
        Some("Tags imported".to_string()),
        None,
    )))
}

// =============================================================================
// INGREDIENTS
// =============================================================================

/// List ingredients with usage counts (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/ingredients",
    params(IngredientQueryParams),
    responses(
        (status = 200, description = "List of ingredients", body = ApiResponse<Vec<AdminIngredientDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_ingredients(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<IngredientQueryParams>,
) -> Result<Json<ApiResponse<Vec<AdminIngredientDto>>>> {
    let (items, total) = service.list_ingredients(&params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Create an ingredient
#[utoipa::path(
    post,
    path = "/api/admin/ingredients",
    request_body = CreateIngredientDto,
    responses(
        (status = 201, description = "Ingredient created", body = ApiResponse<IngredientResponseDto>),
        (status = 400, description = "Invalid input or duplicate name/unit pair"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_ingredient(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<CreateIngredientDto>,
) -> Result<(StatusCode, Json<ApiResponse<IngredientResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let ingredient = service.create_ingredient(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(ingredient),
            Some("Ingredient created".to_string()),
            None,
        )),
    ))
}

/// Delete an ingredient
#[utoipa::path(
    delete,
    path = "/api/admin/ingredients/{id}",
    params(
        ("id" = i64, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 204, description = "Ingredient deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Ingredient not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_ingredient(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.delete_ingredient(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk import ingredients; existing name/unit pairs are skipped
#[utoipa::path(
    post,
    path = "/api/admin/ingredients/import",
    request_body = Vec<CreateIngredientDto>,
    responses(
        (status = 200, description = "Import summary", body = ApiResponse<ImportResultDto>),
        (status = 400, description = "Invalid item"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn import_ingredients(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(items): AppJson<Vec<CreateIngredientDto>>,
) -> Result<Json<ApiResponse<ImportResultDto>>> {
    for (index, item) in items.iter().enumerate() {
        item.validate()
            .map_err(|e| AppError::Validation(format!("Item {}: {}", index, e)))?;
    }

    let result = service.import_ingredients(items).await?;
    Ok(Json(ApiResponse::success(
        Some(result),
        Some("Ingredients imported".to_string()),
        None,
    )))
}

// =============================================================================
// RELATIONS
// =============================================================================

/// List favorites (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/favorites",
    params(RelationQueryParams),
    responses(
        (status = 200, description = "List of favorites", body = ApiResponse<Vec<AdminRecipeRelationDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_favorites(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<RelationQueryParams>,
) -> Result<Json<ApiResponse<Vec<AdminRecipeRelationDto>>>> {
    let (items, total) = service.list_favorites(&params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// List shopping cart entries (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/shopping-carts",
    params(RelationQueryParams),
    responses(
        (status = 200, description = "List of shopping cart entries", body = ApiResponse<Vec<AdminRecipeRelationDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_shopping_carts(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<RelationQueryParams>,
) -> Result<Json<ApiResponse<Vec<AdminRecipeRelationDto>>>> {
    let (items, total) = service.list_shopping_carts(&params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// List subscriptions (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/subscriptions",
    params(RelationQueryParams),
    responses(
        (status = 200, description = "List of subscriptions", body = ApiResponse<Vec<AdminSubscriptionDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_subscriptions(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<RelationQueryParams>,
) -> Result<Json<ApiResponse<Vec<AdminSubscriptionDto>>>> {
    let (items, total) = service.list_subscriptions(&params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}
