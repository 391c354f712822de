use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::users::handlers;
use crate::features::users::services::{SubscriptionService, UserService};

/// Create routes for the users feature
///
/// Static segments (`me`, `set_password`, `subscriptions`) take precedence
/// over the `{id}` capture.
pub fn routes(users: Arc<UserService>, subscriptions: Arc<SubscriptionService>) -> Router {
    let user_routes = Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::register_user),
        )
        .route("/api/users/me", get(handlers::get_me))
        .route("/api/users/set_password", post(handlers::set_password))
        .route("/api/users/{id}", get(handlers::get_user))
        .with_state(users);

    let subscription_routes = Router::new()
        .route(
            "/api/users/subscriptions",
            get(handlers::list_subscriptions),
        )
        .route(
            "/api/users/{id}/subscribe",
            post(handlers::subscribe).delete(handlers::unsubscribe),
        )
        .with_state(subscriptions);

    user_routes.merge(subscription_routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{fake_user, lazy_pool, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn router() -> Router {
        let pool = lazy_pool();
        routes(
            Arc::new(UserService::new(pool.clone())),
            Arc::new(SubscriptionService::new(pool)),
        )
    }

    #[tokio::test]
    async fn test_me_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        let response = server.get("/api/users/me").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_anonymous_cannot_subscribe() {
        let server = TestServer::new(router()).unwrap();
        let response = server.post("/api/users/2/subscribe").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_self_subscription_is_rejected() {
        let user = fake_user(7, false);
        let server = TestServer::new(with_user(router(), user)).unwrap();

        let response = server.post("/api/users/7/subscribe").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "You cannot subscribe to yourself");

        let response = server.delete("/api/users/7/subscribe").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_registration_validates_username() {
        let server = TestServer::new(router()).unwrap();
        let response = server
            .post("/api/users")
            .json(&json!({
                "email": "cook@example.com",
                "username": "bad name",
                "first_name": "Ann",
                "last_name": "Cook",
                "password": "Qwerty123"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_set_password_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        let response = server
            .post("/api/users/set_password")
            .json(&json!({"new_password": "Qwerty1234", "current_password": "Qwerty123"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
