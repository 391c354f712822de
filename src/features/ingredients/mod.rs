//! Ingredient catalogue.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/ingredients?name=` | Ingredients whose name starts with `name` |
//! | GET | `/api/ingredients/{id}` | Single ingredient |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::IngredientService;
