mod ingredient;

pub use ingredient::*;
