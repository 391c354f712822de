use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth;
use crate::features::ingredients::{dtos as ingredients_dtos, handlers as ingredients_handlers};
use crate::features::recipes::{dtos as recipes_dtos, handlers as recipes_handlers};
use crate::features::tags::{dtos as tags_dtos, handlers as tags_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{ApiResponse, ImportResultDto, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::logout,
        // Users
        users_handlers::list_users,
        users_handlers::register_user,
        users_handlers::get_user,
        users_handlers::get_me,
        users_handlers::set_password,
        users_handlers::list_subscriptions,
        users_handlers::subscribe,
        users_handlers::unsubscribe,
        // Tags
        tags_handlers::list_tags,
        tags_handlers::get_tag,
        // Ingredients
        ingredients_handlers::list_ingredients,
        ingredients_handlers::get_ingredient,
        // Recipes
        recipes_handlers::list_recipes,
        recipes_handlers::create_recipe,
        recipes_handlers::get_recipe,
        recipes_handlers::update_recipe,
        recipes_handlers::delete_recipe,
        recipes_handlers::add_favorite,
        recipes_handlers::remove_favorite,
        recipes_handlers::add_to_cart,
        recipes_handlers::remove_from_cart,
        recipes_handlers::download_shopping_cart,
        // Admin
        admin_handlers::list_users,
        admin_handlers::update_user,
        admin_handlers::delete_user,
        admin_handlers::list_recipes,
        admin_handlers::create_tag,
        admin_handlers::update_tag,
        admin_handlers::delete_tag,
        admin_handlers::import_tags,
        admin_handlers::list_ingredients,
        admin_handlers::create_ingredient,
        admin_handlers::delete_ingredient,
        admin_handlers::import_ingredients,
        admin_handlers::list_favorites,
        admin_handlers::list_shopping_carts,
        admin_handlers::list_subscriptions,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth::dtos::LoginRequestDto,
            auth::dtos::TokenResponseDto,
            ApiResponse<auth::dtos::TokenResponseDto>,
            // Users
            users_dtos::RegisterUserDto,
            users_dtos::RegisteredUserDto,
            users_dtos::UserResponseDto,
            users_dtos::SetPasswordDto,
            users_dtos::SubscriptionResponseDto,
            ApiResponse<users_dtos::RegisteredUserDto>,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            ApiResponse<users_dtos::SubscriptionResponseDto>,
            ApiResponse<Vec<users_dtos::SubscriptionResponseDto>>,
            // Tags
            tags_dtos::TagResponseDto,
            tags_dtos::CreateTagDto,
            tags_dtos::UpdateTagDto,
            ApiResponse<tags_dtos::TagResponseDto>,
            ApiResponse<Vec<tags_dtos::TagResponseDto>>,
            // Ingredients
            ingredients_dtos::IngredientResponseDto,
            ingredients_dtos::CreateIngredientDto,
            ApiResponse<ingredients_dtos::IngredientResponseDto>,
            ApiResponse<Vec<ingredients_dtos::IngredientResponseDto>>,
            ImportResultDto,
            ApiResponse<ImportResultDto>,
            // Recipes
            recipes_dtos::RecipeResponseDto,
            recipes_dtos::RecipeIngredientDto,
            recipes_dtos::ShortRecipeDto,
            recipes_dtos::IngredientAmountDto,
            recipes_dtos::CreateRecipeDto,
            recipes_dtos::UpdateRecipeDto,
            ApiResponse<recipes_dtos::RecipeResponseDto>,
            ApiResponse<Vec<recipes_dtos::RecipeResponseDto>>,
            ApiResponse<recipes_dtos::ShortRecipeDto>,
            // Admin
            admin_dtos::SubscriptionFilter,
            admin_dtos::CookingTimeBucket,
            admin_dtos::AdminUserDto,
            admin_dtos::UpdateUserFlagsDto,
            admin_dtos::AdminRecipeDto,
            admin_dtos::AdminIngredientDto,
            admin_dtos::AdminRecipeRelationDto,
            admin_dtos::AdminSubscriptionDto,
            ApiResponse<Vec<admin_dtos::AdminUserDto>>,
            ApiResponse<admin_dtos::AdminUserDto>,
            ApiResponse<Vec<admin_dtos::AdminRecipeDto>>,
            ApiResponse<Vec<admin_dtos::AdminIngredientDto>>,
            ApiResponse<Vec<admin_dtos::AdminRecipeRelationDto>>,
            ApiResponse<Vec<admin_dtos::AdminSubscriptionDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Token login and logout"),
        (name = "users", description = "Registration, profiles and subscriptions"),
        (name = "tags", description = "Recipe tags (public)"),
        (name = "ingredients", description = "Ingredient catalogue (public)"),
        (name = "recipes", description = "Recipes, favorites, shopping cart and shopping list"),
        (name = "admin", description = "Admin console (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Foodgram API",
        version = "0.1.0",
        description = "API documentation for Foodgram",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer JWT security scheme to the document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_feature() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/token/login",
            "/api/users/{id}/subscribe",
            "/api/recipes/download_shopping_cart",
            "/api/admin/ingredients/import",
            "/api/admin/tags/import",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
