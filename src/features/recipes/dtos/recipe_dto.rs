use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::recipes::models::{RecipeIngredientRow, RecipeSummary};
use crate::features::tags::dtos::TagResponseDto;
use crate::features::users::dtos::UserResponseDto;
use crate::shared::types::{deserialize_flag, PaginationQuery};

// =============================================================================
// READ SHAPES
// =============================================================================

/// Ingredient line of a recipe
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeIngredientDto {
    /// Ingredient ID
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredientRow> for RecipeIngredientDto {
    fn from(r: RecipeIngredientRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            measurement_unit: r.measurement_unit,
            amount: r.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponseDto {
    pub id: i64,
    pub tags: Vec<TagResponseDto>,
    pub author: UserResponseDto,
    pub ingredients: Vec<RecipeIngredientDto>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    /// Public image URL
    pub image: String,
    pub text: String,
    /// Minutes
    pub cooking_time: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShortRecipeDto {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<RecipeSummary> for ShortRecipeDto {
    fn from(r: RecipeSummary) -> Self {
        Self {
            id: r.id,
            name: r.name,
            image: r.image,
            cooking_time: r.cooking_time,
        }
    }
}

// =============================================================================
// WRITE SHAPES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct IngredientAmountDto {
    /// Ingredient ID
    pub id: i64,

    #[validate(range(min = 1, message = "Amount must be at least 1"))]
    pub amount: i32,
}

/// Request DTO for creating a recipe.
///
/// `image` is a `data:image/<ext>;base64,...` URI; multipart requests send
/// the file as an `image` part instead.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRecipeDto {
    #[validate(
        length(min = 1, message = "At least one ingredient is required"),
        nested
    )]
    pub ingredients: Vec<IngredientAmountDto>,

    #[validate(length(min = 1, message = "At least one tag is required"))]
    pub tags: Vec<i64>,

    pub image: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,

    #[validate(range(min = 1, message = "Cooking time must be at least 1 minute"))]
    pub cooking_time: i32,
}

/// Request DTO for updating a recipe.
///
/// Ingredients and tags are always replaced wholesale, so both are required.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRecipeDto {
    #[validate(
        length(min = 1, message = "At least one ingredient is required"),
        nested
    )]
    pub ingredients: Vec<IngredientAmountDto>,

    #[validate(length(min = 1, message = "At least one tag is required"))]
    pub tags: Vec<i64>,

    pub image: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: Option<String>,

    #[validate(range(min = 1, message = "Cooking time must be at least 1 minute"))]
    pub cooking_time: Option<i32>,
}

/// Tag and ingredient references of a write request
pub trait RecipeRefs {
    fn tag_ids(&self) -> Vec<i64>;
    fn ingredient_ids(&self) -> Vec<i64>;
}

impl RecipeRefs for CreateRecipeDto {
    fn tag_ids(&self) -> Vec<i64> {
        self.tags.clone()
    }

    fn ingredient_ids(&self) -> Vec<i64> {
        self.ingredients.iter().map(|i| i.id).collect()
    }
}

impl RecipeRefs for UpdateRecipeDto {
    fn tag_ids(&self) -> Vec<i64> {
        self.tags.clone()
    }

    fn ingredient_ids(&self) -> Vec<i64> {
        self.ingredients.iter().map(|i| i.id).collect()
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// Filters for the recipe list; all given filters must match
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RecipeListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,

    /// Tag slug; repeat to match any of several tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Author ID
    pub author: Option<i64>,

    /// `1`/`true` for the caller's favorites only
    #[serde(default, deserialize_with = "deserialize_flag")]
    #[param(value_type = Option<String>)]
    pub is_favorited: Option<bool>,

    /// `1`/`true` for the caller's shopping cart only
    #[serde(default, deserialize_with = "deserialize_flag")]
    #[param(value_type = Option<String>)]
    pub is_in_shopping_cart: Option<bool>,
}

impl RecipeListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.limit)
    }

    pub fn only_favorited(&self) -> bool {
        self.is_favorited == Some(true)
    }

    pub fn only_in_shopping_cart(&self) -> bool {
        self.is_in_shopping_cart == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_payload() -> serde_json::Value {
        json!({
            "ingredients": [{"id": 1123, "amount": 10}],
            "tags": [1, 2],
            "image": "data:image/png;base64,iVBORw0KGgo=",
            "name": "Omelette",
            "text": "Beat the eggs",
            "cooking_time": 5
        })
    }

    #[test]
    fn test_valid_create_payload() {
        let dto: CreateRecipeDto = serde_json::from_value(create_payload()).unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.ingredient_ids(), vec![1123]);
        assert_eq!(dto.tag_ids(), vec![1, 2]);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut payload = create_payload();
        payload["ingredients"] = json!([{"id": 1, "amount": 0}]);
        let dto: CreateRecipeDto = serde_json::from_value(payload).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_empty_ingredients_and_tags_rejected() {
        let mut payload = create_payload();
        payload["ingredients"] = json!([]);
        let dto: CreateRecipeDto = serde_json::from_value(payload).unwrap();
        assert!(dto.validate().is_err());

        let mut payload = create_payload();
        payload["tags"] = json!([]);
        let dto: CreateRecipeDto = serde_json::from_value(payload).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_zero_cooking_time_rejected() {
        let mut payload = create_payload();
        payload["cooking_time"] = json!(0);
        let dto: CreateRecipeDto = serde_json::from_value(payload).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_requires_ingredients_and_tags() {
        let result = serde_json::from_value::<UpdateRecipeDto>(json!({"name": "New name"}));
        assert!(result.is_err());

        let dto: UpdateRecipeDto = serde_json::from_value(json!({
            "ingredients": [{"id": 1, "amount": 2}],
            "tags": [3]
        }))
        .unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.name.is_none());
    }

    #[test]
    fn test_list_query_flags() {
        let query: RecipeListQuery =
            serde_json::from_value(json!({"is_favorited": "1", "is_in_shopping_cart": "0"}))
                .unwrap();
        assert!(query.only_favorited());
        assert!(!query.only_in_shopping_cart());
        assert_eq!(query.pagination().limit(), 6);
    }
}
