mod collection_service;
mod recipe_service;
pub mod shopping_list;

pub use collection_service::{Collection, CollectionService};
pub use recipe_service::*;
