//! Recipes with their ingredient amounts and tags, plus the per-user
//! favorites, shopping cart and shopping list download.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/recipes` | optional | Filtered, paginated list |
//! | POST | `/api/recipes` | required | Create (JSON or multipart) |
//! | GET | `/api/recipes/{id}` | optional | Single recipe |
//! | PATCH | `/api/recipes/{id}` | author/admin | Update |
//! | DELETE | `/api/recipes/{id}` | author/admin | Delete |
//! | POST/DELETE | `/api/recipes/{id}/favorite` | required | Favorites toggle |
//! | POST/DELETE | `/api/recipes/{id}/shopping_cart` | required | Cart toggle |
//! | GET | `/api/recipes/download_shopping_cart` | required | Shopping list as text |

pub mod dtos;
pub mod form;
pub mod handlers;
pub mod image;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{CollectionService, RecipeService};
