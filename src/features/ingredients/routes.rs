use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::ingredients::handlers;
use crate::features::ingredients::services::IngredientService;

pub fn routes(service: Arc<IngredientService>) -> Router {
    Router::new()
        .route("/api/ingredients", get(handlers::list_ingredients))
        .route("/api/ingredients/{id}", get(handlers::get_ingredient))
        .with_state(service)
}
