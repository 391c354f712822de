//! Admin console: moderation of users, recipes, tags, ingredients and the
//! favorite/cart/subscription relations. Every endpoint requires an admin.
//!
//! ## Endpoints (under `/api/admin`)
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/users` | Users with recipe and subscription counts |
//! | PATCH/DELETE | `/users/{id}` | Set `is_admin`/`is_active`, delete |
//! | GET | `/recipes` | Recipes with tags, ingredient lines, favorite counts |
//! | POST | `/tags` | Create tag |
//! | PATCH/DELETE | `/tags/{id}` | Update, delete tag |
//! | GET/POST | `/ingredients` | List with usage counts, create |
//! | POST | `/ingredients/import` | Bulk import |
//! | DELETE | `/ingredients/{id}` | Delete ingredient |
//! | GET | `/favorites`, `/shopping-carts`, `/subscriptions` | Relation listings |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::AdminService;
