mod subscription_handler;
mod user_handler;

pub use subscription_handler::*;
pub use user_handler::*;
