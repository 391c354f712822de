use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    /// Successful page of a list with its unpaginated total
    pub fn paginated(data: T, total: i64) -> Self {
        Self::success(Some(data), None, Some(Meta { total }))
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

/// Outcome of a bulk import; `skipped` rows already existed
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportResultDto {
    pub created: u64,
    pub skipped: u64,
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Page-number pagination shared by all list endpoints
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 6, max: 100)
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
}

pub fn default_page() -> i64 {
    1
}

pub fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// SQL OFFSET for the requested page, saturating for huge page numbers
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit())
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

// =============================================================================
// QUERY HELPERS
// =============================================================================

/// Deserialize a `1/0/true/false` query flag
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("1") | Some("true") | Some("True") => Ok(Some(true)),
        Some("0") | Some("false") | Some("False") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid flag value '{}', expected 1, 0, true or false",
            other
        ))),
    }
}

/// `recipes_limit` only applies when it is made of ASCII digits
pub fn parse_recipes_limit(raw: Option<&str>) -> Option<usize> {
    raw.filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
}

/// Escape `%`, `_` and `\` so user input matches literally inside LIKE
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("mil"), "mil");
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }

    #[derive(Debug, Deserialize)]
    struct FlagQuery {
        #[serde(default, deserialize_with = "deserialize_flag")]
        is_favorited: Option<bool>,
    }

    fn parse_flag(query: &str) -> Option<bool> {
        serde_json::from_value::<FlagQuery>(serde_json::json!({ "is_favorited": query }))
            .unwrap()
            .is_favorited
    }

    #[test]
    fn test_pagination_offsets() {
        let query = PaginationQuery::new(Some(3), Some(6));
        assert_eq!(query.offset(), 12);
        assert_eq!(query.limit(), 6);
    }

    #[test]
    fn test_pagination_clamps_limit_and_page() {
        let query = PaginationQuery::new(Some(0), Some(1000));
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
        assert_eq!(query.offset(), 0);

        let query = PaginationQuery::new(None, Some(0));
        assert_eq!(query.limit(), 1);
    }

    #[test]
    fn test_pagination_offset_saturates() {
        let query = PaginationQuery::new(Some(i64::MAX / 10), Some(100));
        assert_eq!(query.offset(), i64::MAX);

        let query = PaginationQuery::new(Some(i64::MAX), Some(MAX_PAGE_SIZE));
        assert_eq!(query.offset(), i64::MAX);
    }

    #[test]
    fn test_pagination_defaults() {
        let query = PaginationQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit(), 6);
    }

    #[test]
    fn test_flag_values() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_flag_rejects_garbage() {
        let result =
            serde_json::from_value::<FlagQuery>(serde_json::json!({ "is_favorited": "yes" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_flag_is_none() {
        let query: FlagQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(query.is_favorited, None);
    }

    #[test]
    fn test_recipes_limit_requires_digits() {
        assert_eq!(parse_recipes_limit(Some("3")), Some(3));
        assert_eq!(parse_recipes_limit(Some("-1")), None);
        assert_eq!(parse_recipes_limit(Some("abc")), None);
        assert_eq!(parse_recipes_limit(Some("")), None);
        assert_eq!(parse_recipes_limit(None), None);
    }
}
