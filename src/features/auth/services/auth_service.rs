use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginRequestDto, TokenResponseDto};
use crate::features::auth::model::TokenId;
use crate::features::auth::password::verify_password;
use crate::features::auth::services::TokenService;

const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

#[derive(sqlx::FromRow)]
struct Credentials {
    id: i64,
    password_hash: String,
    is_active: bool,
}

pub struct AuthService {
    pool: PgPool,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(pool: PgPool, tokens: Arc<TokenService>) -> Self {
        Self { pool, tokens }
    }

    /// Exchange email and password for a fresh token
    pub async fn login(&self, dto: LoginRequestDto) -> Result<TokenResponseDto> {
        let credentials = sqlx::query_as::<_, Credentials>(
            "SELECT id, password_hash, is_active FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(&dto.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load credentials: {:?}", e);
            AppError::Database(e)
        })?;

        let Some(credentials) = credentials else {
            return Err(AppError::Validation(INVALID_CREDENTIALS.to_string()));
        };

        if !credentials.is_active
            || !verify_password(&dto.password, &credentials.password_hash).await?
        {
            return Err(AppError::Validation(INVALID_CREDENTIALS.to_string()));
        }

        let auth_token = self.tokens.issue(credentials.id).await?;
        tracing::info!("User {} logged in", credentials.id);

        Ok(TokenResponseDto { auth_token })
    }

    /// Revoke the token that authenticated the current request
    pub async fn logout(&self, jti: TokenId) -> Result<()> {
        self.tokens.revoke(jti).await
    }
}
