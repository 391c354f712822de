use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::models::{User, UserWithSubscription};
use crate::shared::validation::validate_username;

/// Request DTO for registration
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserDto {
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: String,

    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,

    #[validate(length(min = 1, max = 150, message = "First name must be 1-150 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 150, message = "Last name must be 1-150 characters"))]
    pub last_name: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Response DTO after registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUserDto {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for RegisteredUserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
        }
    }
}

/// Public user shape
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the caller follows this user (false for anonymous callers)
    pub is_subscribed: bool,
}

impl From<UserWithSubscription> for UserResponseDto {
    fn from(u: UserWithSubscription) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            is_subscribed: u.is_subscribed,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetPasswordDto {
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,

    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_dto() -> RegisterUserDto {
        RegisterUserDto {
            email: "vivanov@yandex.ru".to_string(),
            username: "vasya.ivanov".to_string(),
            first_name: "Вася".to_string(),
            last_name: "Иванов".to_string(),
            password: "Qwerty123".to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(register_dto().validate().is_ok());
    }

    #[test]
    fn test_registration_rejects_bad_username() {
        let dto = RegisterUserDto {
            username: "vasya ivanov!".to_string(),
            ..register_dto()
        };
        let err = dto.validate().unwrap_err();
        assert!(err.field_errors().contains_key("username"));
    }

    #[test]
    fn test_registration_rejects_long_username() {
        let dto = RegisterUserDto {
            username: "a".repeat(151),
            ..register_dto()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_registration_rejects_bad_email() {
        let dto = RegisterUserDto {
            email: "vivanov".to_string(),
            ..register_dto()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_short_new_password_rejected() {
        let dto = SetPasswordDto {
            new_password: "short".to_string(),
            current_password: "Qwerty123".to_string(),
        };
        assert!(dto.validate().is_err());
    }
}
