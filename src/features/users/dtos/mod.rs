mod subscription_dto;
mod user_dto;

pub use subscription_dto::*;
pub use user_dto::*;
