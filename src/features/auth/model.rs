use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// The caller behind a validated token
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

impl AuthenticatedUser {
    /// Owner-or-admin rule for mutating an object owned by `owner_id`
    pub fn can_modify(&self, owner_id: i64) -> bool {
        self.is_admin || self.id == owner_id
    }
}

/// `jti` of the token that authenticated the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenId(pub Uuid);

/// JWT claims carried by API tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id
    pub sub: String,
    pub jti: String,
    pub iat: u64,
    pub exp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, is_admin: bool) -> AuthenticatedUser {
        AuthenticatedUser {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            is_admin,
        }
    }

    #[test]
    fn test_owner_can_modify() {
        assert!(user(1, false).can_modify(1));
    }

    #[test]
    fn test_stranger_cannot_modify() {
        assert!(!user(2, false).can_modify(1));
    }

    #[test]
    fn test_admin_can_modify_anything() {
        assert!(user(2, true).can_modify(1));
    }
}
