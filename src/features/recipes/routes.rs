use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::recipes::handlers;
use crate::features::recipes::services::{CollectionService, RecipeService};

/// Create routes for the recipes feature
///
/// Reads are public; writes, favorites, the cart and the shopping list
/// require authentication (enforced by the `AuthenticatedUser` extractor).
pub fn routes(recipes: Arc<RecipeService>, collections: Arc<CollectionService>) -> Router {
    let recipe_routes = Router::new()
        .route(
            "/api/recipes",
            get(handlers::list_recipes).post(handlers::create_recipe),
        )
        .route(
            "/api/recipes/{id}",
            get(handlers::get_recipe)
                .patch(handlers::update_recipe)
                .delete(handlers::delete_recipe),
        )
        .with_state(recipes);

    let collection_routes = Router::new()
        .route(
            "/api/recipes/download_shopping_cart",
            get(handlers::download_shopping_cart),
        )
        .route(
            "/api/recipes/{id}/favorite",
            post(handlers::add_favorite).delete(handlers::remove_favorite),
        )
        .route(
            "/api/recipes/{id}/shopping_cart",
            post(handlers::add_to_cart).delete(handlers::remove_from_cart),
        )
        .with_state(collections);

    recipe_routes.merge(collection_routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{fake_user, lazy_pool, with_user, InMemoryStorage};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn router() -> Router {
        let pool = lazy_pool();
        routes(
            Arc::new(RecipeService::new(pool.clone(), InMemoryStorage::new())),
            Arc::new(CollectionService::new(pool)),
        )
    }

    fn recipe_payload() -> Value {
        json!({
            "ingredients": [{"id": 1, "amount": 10}],
            "tags": [1],
            "image": "data:image/png;base64,iVBORw0KGgo=",
            "name": "Omelette",
            "text": "Beat the eggs",
            "cooking_time": 5
        })
    }

    #[tokio::test]
    async fn test_anonymous_cannot_create_recipe() {
        let server = TestServer::new(router()).unwrap();
        let response = server.post("/api/recipes").json(&recipe_payload()).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_duplicate_tag_ids_rejected() {
        let server = TestServer::new(with_user(router(), fake_user(1, false))).unwrap();

        let mut payload = recipe_payload();
        payload["tags"] = json!([2, 2]);
        let response = server.post("/api/recipes").json(&payload).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Duplicate ids are not allowed: id=[2]");
    }

    #[tokio::test]
    async fn test_missing_image_rejected() {
        let server = TestServer::new(with_user(router(), fake_user(1, false))).unwrap();

        let mut payload = recipe_payload();
        payload["image"] = Value::Null;
        let response = server.post("/api/recipes").json(&payload).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "Image is required");
    }

    #[tokio::test]
    async fn test_invalid_recipe_rejected_before_storage() {
        let server = TestServer::new(with_user(router(), fake_user(1, false))).unwrap();

        let mut payload = recipe_payload();
        payload["cooking_time"] = json!(0);
        let response = server.post("/api/recipes").json(&payload).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_anonymous_favorite_filter_yields_empty_page() {
        let server = TestServer::new(router()).unwrap();
        let response = server
            .get("/api/recipes")
            .add_query_param("is_favorited", "1")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["meta"]["total"], 0);
    }

    #[tokio::test]
    async fn test_invalid_flag_value_rejected() {
        let server = TestServer::new(router()).unwrap();
        let response = server
            .get("/api/recipes")
            .add_query_param("is_in_shopping_cart", "maybe")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_collections_require_authentication() {
        let server = TestServer::new(router()).unwrap();

        server
            .get("/api/recipes/download_shopping_cart")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/api/recipes/1/favorite")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .delete("/api/recipes/1/shopping_cart")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .delete("/api/recipes/1")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
