//! Recipe tags (breakfast, lunch, ...). Read-only for the public API; managed
//! through the admin console.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/tags` | All tags ordered by name |
//! | GET | `/api/tags/{id}` | Single tag |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::TagService;
