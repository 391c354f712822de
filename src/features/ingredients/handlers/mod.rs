mod ingredient_handler;

pub use ingredient_handler::*;
