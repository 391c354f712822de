use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, TokenClaims, TokenId};

/// Issues, validates and revokes API tokens.
///
/// A token is a signed JWT; it is only honoured while its `jti` row exists in
/// `auth_tokens` and has not expired.
pub struct TokenService {
    pool: PgPool,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(pool: PgPool, config: &AuthConfig) -> Self {
        Self {
            pool,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: config.token_ttl,
        }
    }

    /// Persist a new token for the user and return its encoded form
    pub async fn issue(&self, user_id: i64) -> Result<String> {
        let jti = Uuid::new_v4();
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let issued_at = Utc::now();
        let expires_at = issued_at + chrono::Duration::seconds(ttl_secs);

        sqlx::query("INSERT INTO auth_tokens (jti, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(jti)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store token: {:?}", e);
                AppError::Database(e)
            })?;

        let claims = TokenClaims {
            sub: user_id.to_string(),
            jti: jti.to_string(),
            iat: issued_at.timestamp().max(0) as u64,
            exp: expires_at.timestamp().max(0) as u64,
        };

        self.encode(&claims)
    }

    /// Resolve a presented token to its user
    pub async fn authenticate(&self, token: &str) -> Result<(AuthenticatedUser, TokenId)> {
        let claims = self.decode(token)?;
        let jti = Uuid::parse_str(&claims.jti)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        let user = sqlx::query_as::<_, AuthenticatedUser>(
            r#"
            SELECT u.id, u.username, u.email, u.is_admin
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.jti = $1 AND t.expires_at > NOW() AND u.is_active
            "#,
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up token: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

        Ok((user, TokenId(jti)))
    }

    /// Delete a token so it can no longer be used
    pub async fn revoke(&self, jti: TokenId) -> Result<()> {
        sqlx::query("DELETE FROM auth_tokens WHERE jti = $1")
            .bind(jti.0)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to revoke token: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }

    fn encode(&self, claims: &TokenClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    fn decode(&self, token: &str) -> Result<TokenClaims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected token: {}", e);
                AppError::Unauthorized("Invalid token".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::lazy_pool;

    fn service(secret: &str) -> TokenService {
        TokenService::new(
            lazy_pool(),
            &AuthConfig {
                jwt_secret: secret.to_string(),
                token_ttl: Duration::from_secs(3600),
            },
        )
    }

    fn claims(exp_offset: i64) -> TokenClaims {
        let now = Utc::now().timestamp();
        TokenClaims {
            sub: "7".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now as u64,
            exp: (now + exp_offset) as u64,
        }
    }

    #[tokio::test]
    async fn test_encoded_claims_decode_with_same_secret() {
        let svc = service("0123456789abcdef0123456789abcdef");
        let original = claims(3600);
        let token = svc.encode(&original).unwrap();

        let decoded = svc.decode(&token).unwrap();
        assert_eq!(decoded.sub, "7");
        assert_eq!(decoded.jti, original.jti);
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let signer = service("0123456789abcdef0123456789abcdef");
        let verifier = service("fedcba9876543210fedcba9876543210");
        let token = signer.encode(&claims(3600)).unwrap();

        assert!(matches!(
            verifier.decode(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let svc = service("0123456789abcdef0123456789abcdef");
        let token = svc.encode(&claims(-3600)).unwrap();

        assert!(matches!(svc.decode(&token), Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let svc = service("0123456789abcdef0123456789abcdef");
        assert!(svc.decode("not.a.jwt").is_err());
    }
}
