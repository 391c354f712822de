//! Token authentication.
//!
//! Users log in with email and password and receive a bearer token. Tokens are
//! signed JWTs whose `jti` is stored in `auth_tokens`, so logging out simply
//! deletes the row.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/auth/token/login` | No | Exchange credentials for a token |
//! | POST | `/api/auth/token/logout` | Yes | Revoke the presented token |

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod password;
pub mod routes;
pub mod services;

pub use services::{AuthService, TokenService};
