use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;

pub fn routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/token/login", post(handlers::login))
        .route("/api/auth/token/logout", post(handlers::logout))
        .with_state(service)
}
