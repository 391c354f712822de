mod recipe_dto;
mod shopping_list_dto;

pub use recipe_dto::*;
pub use shopping_list_dto::*;
