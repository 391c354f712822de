use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Strict `#RRGGBB` color
    /// - Valid: "#00FF74", "#abcdef"
    /// - Invalid: "00FF74", "#00FF7", "#GGGGGG"
    pub static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#[A-Fa-f0-9]{6}$").unwrap();

    /// Letters, digits and `.@+-_`
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();

    /// A single character allowed in a username
    static ref USERNAME_CHAR_REGEX: Regex = Regex::new(r"^[\w.@+-]$").unwrap();

    /// Tag slug
    /// - Valid: "breakfast", "low-carb", "main_course"
    /// - Invalid: "low carb", "ужин!"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap();
}

/// Reject usernames with characters outside `[\w.@+-]`, naming the offenders
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let mut bad: Vec<char> = Vec::new();
    let mut buf = [0u8; 4];
    for c in username.chars() {
        if !USERNAME_CHAR_REGEX.is_match(c.encode_utf8(&mut buf)) && !bad.contains(&c) {
            bad.push(c);
        }
    }

    if bad.is_empty() {
        return Ok(());
    }

    let characters: String = bad.into_iter().collect();
    Err(ValidationError::new("username").with_message(Cow::Owned(format!(
        "Invalid username. Forbidden characters: {}",
        characters
    ))))
}

pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR_REGEX.is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::new("color").with_message(Cow::Owned(format!(
            "'{}' is not a hex color, expected #RRGGBB",
            color
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_regex_valid() {
        assert!(HEX_COLOR_REGEX.is_match("#00FF74"));
        assert!(HEX_COLOR_REGEX.is_match("#abcdef"));
        assert!(HEX_COLOR_REGEX.is_match("#E26C2D"));
    }

    #[test]
    fn test_hex_color_regex_invalid() {
        assert!(!HEX_COLOR_REGEX.is_match("00FF74")); // no hash
        assert!(!HEX_COLOR_REGEX.is_match("#00FF7")); // too short
        assert!(!HEX_COLOR_REGEX.is_match("#00FF744")); // too long
        assert!(!HEX_COLOR_REGEX.is_match("#GGGGGG"));
        assert!(!HEX_COLOR_REGEX.is_match(""));
    }

    #[test]
    fn test_username_regex() {
        assert!(USERNAME_REGEX.is_match("john.doe@mail+x-y_z"));
        assert!(USERNAME_REGEX.is_match("повар"));
        assert!(!USERNAME_REGEX.is_match("john doe"));
        assert!(!USERNAME_REGEX.is_match("john!"));
        assert!(!USERNAME_REGEX.is_match(""));
    }

    #[test]
    fn test_validate_username_names_bad_characters() {
        assert!(validate_username("chef_42").is_ok());

        let err = validate_username("bad name!!").unwrap_err();
        let message = err.message.unwrap();
        assert!(message.ends_with("characters:  !"));
    }

    #[test]
    fn test_slug_regex() {
        assert!(SLUG_REGEX.is_match("low-carb"));
        assert!(SLUG_REGEX.is_match("main_course"));
        assert!(!SLUG_REGEX.is_match("low carb"));
        assert!(!SLUG_REGEX.is_match(""));
    }

    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("#00FF74").is_ok());
        assert!(validate_hex_color("00FF74").is_err());
        assert!(validate_hex_color("#00FF7").is_err());
    }
}
