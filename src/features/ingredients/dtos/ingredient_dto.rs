use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::ingredients::models::Ingredient;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientResponseDto {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponseDto {
    fn from(i: Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
            measurement_unit: i.measurement_unit,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct IngredientSearchQuery {
    /// Case-insensitive name prefix
    pub name: Option<String>,
}

/// Request DTO for creating an ingredient (admin); also the bulk import item
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateIngredientDto {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 200, message = "Measurement unit must be 1-200 characters"))]
    pub measurement_unit: String,
}
