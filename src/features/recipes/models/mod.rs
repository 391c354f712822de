mod recipe;

pub use recipe::*;
