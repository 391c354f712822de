/// Default page size for paginated lists
pub const DEFAULT_PAGE_SIZE: i64 = 6;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Upper bound for decoded recipe images
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Image formats accepted for recipe pictures, as `(extension, content type)`
pub const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];
