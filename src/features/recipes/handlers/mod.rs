mod collection_handler;
mod recipe_handler;

pub use collection_handler::*;
pub use recipe_handler::*;
