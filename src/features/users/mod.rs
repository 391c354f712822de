//! Users and subscriptions.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/users` | Optional | Paginated users with `is_subscribed` |
//! | POST | `/api/users` | No | Register |
//! | GET | `/api/users/{id}` | Optional | User profile |
//! | GET | `/api/users/me` | Yes | Caller's profile |
//! | POST | `/api/users/set_password` | Yes | Change password |
//! | POST/DELETE | `/api/users/{id}/subscribe` | Yes | Follow / unfollow an author |
//! | GET | `/api/users/subscriptions` | Yes | Followed authors with recipe previews |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{SubscriptionService, UserService};
