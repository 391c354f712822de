mod ingredient_service;

pub use ingredient_service::IngredientService;
