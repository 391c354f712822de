use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{LoginRequestDto, TokenResponseDto};
use crate::features::auth::model::{AuthenticatedUser, TokenId};
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;

/// Obtain an API token
#[utoipa::path(
    post,
    path = "/api/auth/token/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<TokenResponseDto>),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<TokenResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let token = service.login(dto).await?;
    Ok(Json(ApiResponse::success(Some(token), None, None)))
}

/// Revoke the presented token
#[utoipa::path(
    post,
    path = "/api/auth/token/logout",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(
    State(service): State<Arc<AuthService>>,
    _user: AuthenticatedUser,
    Extension(jti): Extension<TokenId>,
) -> Result<StatusCode> {
    service.logout(jti).await?;
    Ok(StatusCode::NO_CONTENT)
}
