use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create admin routes (all require admin access); nested under `/api/admin`
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route(
            "/users/{id}",
            patch(handlers::update_user).delete(handlers::delete_user),
        )
        .route("/recipes", get(handlers::list_recipes))
        .route("/tags", post(handlers::create_tag))
        .route("/tags/import", post(handlers::import_tags))
        .route(
            "/tags/{id}",
            patch(handlers::update_tag).delete(handlers::delete_tag),
        )
        .route(
            "/ingredients",
            get(handlers::list_ingredients).post(handlers::create_ingredient),
        )
        .route("/ingredients/import", post(handlers::import_ingredients))
        .route("/ingredients/{id}", delete(handlers::delete_ingredient))
        .route("/favorites", get(handlers::list_favorites))
        .route("/shopping-carts", get(handlers::list_shopping_carts))
        .route("/subscriptions", get(handlers::list_subscriptions))
        .with_state(admin_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ingredients::IngredientService;
    use crate::features::tags::TagService;
    use crate::shared::test_helpers::{fake_user, lazy_pool, with_user, InMemoryStorage};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn router() -> Router {
        let pool = lazy_pool();
        let service = AdminService::new(
            pool.clone(),
            InMemoryStorage::new(),
            Arc::new(TagService::new(pool.clone())),
            Arc::new(IngredientService::new(pool)),
        );
        Router::new().nest("/api/admin", routes(Arc::new(service)))
    }

    #[tokio::test]
    async fn test_anonymous_is_unauthorized() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/admin/users")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_regular_user_is_forbidden() {
        let server = TestServer::new(with_user(router(), fake_user(3, false))).unwrap();

        let response = server.get("/api/admin/recipes").await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["message"], "Admin access required");

        server
            .post("/api/admin/tags")
            .json(&json!({"name": "Dinner", "color": "#49B64E", "slug": "dinner"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let server = TestServer::new(with_user(router(), fake_user(1, true))).unwrap();
        server
            .delete("/api/admin/users/1")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tag_payload_is_validated() {
        let server = TestServer::new(with_user(router(), fake_user(1, true))).unwrap();
        let response = server
            .post("/api/admin/tags")
            .json(&json!({"name": "Dinner", "color": "green", "slug": "dinner"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_import_rejects_blank_item() {
        let server = TestServer::new(with_user(router(), fake_user(1, true))).unwrap();
        let response = server
            .post("/api/admin/ingredients/import")
            .json(&json!([
                {"name": "salt", "measurement_unit": "g"},
                {"name": "", "measurement_unit": "g"}
            ]))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().starts_with("Item 1:"));
    }

    #[tokio::test]
    async fn test_tag_import_rejects_bad_color() {
        let server = TestServer::new(with_user(router(), fake_user(1, true))).unwrap();
        let response = server
            .post("/api/admin/tags/import")
            .json(&json!([
                {"name": "Breakfast", "color": "#E26C2D", "slug": "breakfast"},
                {"name": "Lunch", "color": "49B64E", "slug": "lunch"}
            ]))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().starts_with("Item 1:"));
    }
}
