use sqlx::PgPool;

use crate::core::config::AdminBootstrapConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::password::{hash_password, verify_password};
use crate::features::users::dtos::{
    RegisterUserDto, RegisteredUserDto, SetPasswordDto, UserResponseDto,
};
use crate::features::users::models::{User, UserWithSubscription};
use crate::shared::types::PaginationQuery;

const USER_UNIQUE_MESSAGES: &[(&str, &str)] = &[
    ("users_email_key", "A user with this email already exists"),
    ("users_email_lower_key", "A user with this email already exists"),
    ("users_username_key", "A user with this username already exists"),
];

/// `$1` is the caller id (NULL for anonymous callers)
const USER_WITH_SUBSCRIPTION_COLUMNS: &str = r#"
    u.id, u.email, u.username, u.first_name, u.last_name,
    EXISTS (
        SELECT 1 FROM subscriptions s WHERE s.user_id = $1 AND s.author_id = u.id
    ) AS is_subscribed
"#;

/// Service for user accounts
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new regular user
    pub async fn register(&self, dto: RegisterUserDto) -> Result<RegisteredUserDto> {
        let password_hash = hash_password(&dto.password).await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, username, first_name, last_name, password_hash,
                      is_admin, is_active, created_at
            "#,
        )
        .bind(dto.email.trim())
        .bind(&dto.username)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, USER_UNIQUE_MESSAGES))?;

        tracing::info!("Registered user {} ({})", user.id, user.username);
        Ok(user.into())
    }

    /// List users ordered by email, with `is_subscribed` relative to the caller
    pub async fn list(
        &self,
        caller_id: Option<i64>,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<UserResponseDto>, i64)> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        let sql = format!(
            "SELECT {} FROM users u ORDER BY u.email, u.id LIMIT $2 OFFSET $3",
            USER_WITH_SUBSCRIPTION_COLUMNS
        );
        let users = sqlx::query_as::<_, UserWithSubscription>(&sql)
            .bind(caller_id)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((users.into_iter().map(Into::into).collect(), total))
    }

    /// Get a single user
    pub async fn get(&self, id: i64, caller_id: Option<i64>) -> Result<UserResponseDto> {
        let sql = format!(
            "SELECT {} FROM users u WHERE u.id = $2",
            USER_WITH_SUBSCRIPTION_COLUMNS
        );
        sqlx::query_as::<_, UserWithSubscription>(&sql)
            .bind(caller_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get user {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// The caller's own profile
    pub async fn me(&self, user: &AuthenticatedUser) -> Result<UserResponseDto> {
        self.get(user.id, Some(user.id)).await
    }

    /// Change the caller's password after checking the current one
    pub async fn set_password(&self, user: &AuthenticatedUser, dto: SetPasswordDto) -> Result<()> {
        let current_hash =
            sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
                .bind(user.id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to load password hash: {:?}", e);
                    AppError::Database(e)
                })?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !verify_password(&dto.current_password, &current_hash).await? {
            return Err(AppError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        let new_hash = hash_password(&dto.new_password).await?;
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&new_hash)
            .bind(user.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update password: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("User {} changed password", user.id);
        Ok(())
    }

    /// Create the configured superuser unless a user with that email exists
    pub async fn ensure_admin(&self, config: &AdminBootstrapConfig) -> Result<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
        .bind(&config.email)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            tracing::debug!("Admin user {} already exists", config.email);
            return Ok(());
        }

        let password_hash = hash_password(&config.password).await?;
        sqlx::query(
            r#"
            INSERT INTO users (email, username, first_name, last_name, password_hash, is_admin)
            VALUES ($1, $2, '', '', $3, TRUE)
            "#,
        )
        .bind(&config.email)
        .bind(&config.username)
        .bind(&password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, USER_UNIQUE_MESSAGES))?;

        tracing::info!("Created admin user {}", config.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::fake_user;

    fn register_dto(email: &str, username: &str) -> RegisterUserDto {
        RegisterUserDto {
            email: email.to_string(),
            username: username.to_string(),
            first_name: "Vasya".to_string(),
            last_name: "Ivanov".to_string(),
            password: "Qwerty123".to_string(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_email_is_unique_ignoring_case(pool: PgPool) {
        let service = UserService::new(pool);
        service
            .register(register_dto("vivanov@yandex.ru", "vasya"))
            .await
            .unwrap();

        match service
            .register(register_dto("VIvanov@Yandex.ru", "vasya2"))
            .await
        {
            Err(AppError::Duplicate(message)) => {
                assert_eq!(message, "A user with this email already exists")
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_set_password_checks_current_password(pool: PgPool) {
        let service = UserService::new(pool);
        let registered = service
            .register(register_dto("vivanov@yandex.ru", "vasya"))
            .await
            .unwrap();
        let caller = fake_user(registered.id, false);

        let wrong = SetPasswordDto {
            new_password: "NewSecret456".to_string(),
            current_password: "nope".to_string(),
        };
        assert!(matches!(
            service.set_password(&caller, wrong).await,
            Err(AppError::Validation(_))
        ));

        let right = SetPasswordDto {
            new_password: "NewSecret456".to_string(),
            current_password: "Qwerty123".to_string(),
        };
        service.set_password(&caller, right).await.unwrap();
    }
}
