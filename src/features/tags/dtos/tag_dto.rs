use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::tags::models::Tag;
use crate::shared::validation::{validate_hex_color, SLUG_REGEX};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagResponseDto {
    pub id: i64,
    pub name: String,
    /// `#RRGGBB`
    pub color: String,
    pub slug: String,
}

impl From<Tag> for TagResponseDto {
    fn from(t: Tag) -> Self {
        Self {
            id: t.id,
            name: t.name,
            color: t.color,
            slug: t.slug,
        }
    }
}

/// Request DTO for creating a tag (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTagDto {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: String,

    #[validate(
        length(min = 1, max = 200, message = "Slug must be 1-200 characters"),
        regex(path = *SLUG_REGEX, message = "Slug may contain only letters, digits, '-' and '_'")
    )]
    pub slug: String,
}

/// Request DTO for updating a tag (admin); absent fields keep their value
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTagDto {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,

    #[validate(
        length(min = 1, max = 200, message = "Slug must be 1-200 characters"),
        regex(path = *SLUG_REGEX, message = "Slug may contain only letters, digits, '-' and '_'")
    )]
    pub slug: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto(color: &str, slug: &str) -> CreateTagDto {
        CreateTagDto {
            name: "Breakfast".to_string(),
            color: color.to_string(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn test_valid_tag() {
        assert!(create_dto("#E26C2D", "breakfast").validate().is_ok());
    }

    #[test]
    fn test_color_must_be_hex() {
        assert!(create_dto("E26C2D", "breakfast").validate().is_err());
        assert!(create_dto("#E26C2", "breakfast").validate().is_err());
    }

    #[test]
    fn test_slug_pattern() {
        assert!(create_dto("#E26C2D", "early breakfast").validate().is_err());
    }

    #[test]
    fn test_update_skips_absent_fields() {
        let dto = UpdateTagDto {
            name: None,
            color: Some("#00FF74".to_string()),
            slug: None,
        };
        assert!(dto.validate().is_ok());

        let dto = UpdateTagDto {
            name: None,
            color: Some("green".to_string()),
            slug: None,
        };
        assert!(dto.validate().is_err());
    }
}
