use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Credentials exchanged for an API token
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponseDto {
    pub auth_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_valid_email() {
        let dto = LoginRequestDto {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_login_requires_password() {
        let dto = LoginRequestDto {
            email: "cook@example.com".to_string(),
            password: String::new(),
        };
        assert!(dto.validate().is_err());
    }
}
