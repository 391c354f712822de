use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::features::tags::dtos::TagResponseDto;
use crate::features::tags::services::TagService;
use crate::shared::types::ApiResponse;

/// List all tags
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "List of tags", body = ApiResponse<Vec<TagResponseDto>>),
    ),
    tag = "tags"
)]
pub async fn list_tags(
    State(service): State<Arc<TagService>>,
) -> Result<Json<ApiResponse<Vec<TagResponseDto>>>> {
    let tags = service.list().await?;
    Ok(Json(ApiResponse::success(Some(tags), None, None)))
}

/// Get tag by id
#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    params(
        ("id" = i64, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Tag found", body = ApiResponse<TagResponseDto>),
        (status = 404, description = "Tag not found")
    ),
    tag = "tags"
)]
pub async fn get_tag(
    State(service): State<Arc<TagService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TagResponseDto>>> {
    let tag = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(tag), None, None)))
}
