use crate::error::{Error, Result};

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_SHADER_NAME_LEN: usize = 100;
const MAX_TAG_LEN: usize = 32;
const MAX_TAGS_PER_SHADER: usize = 16;

fn is_valid_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

pub fn validate_username(name: &str) -> Result<()> {
    let len = name.chars().count();
    if len < MIN_USERNAME_LEN || len > MAX_USERNAME_LEN {
        return Err(Error::Validation(format!(
            "Username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"
        )));
    }
    if !name.chars().all(is_valid_username_char) {
        return Err(Error::Validation(
            "Username can only contain alphanumeric characters, hyphens, underscores, and periods"
                .to_string(),
        ));
    }
    if name.starts_with(|c| matches!(c, '-' | '_' | '.')) {
        return Err(Error::Validation(
            "Username cannot start with a hyphen, underscore, or period".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_shader_name(name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Shader name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_SHADER_NAME_LEN {
        return Err(Error::Validation(format!(
            "Shader name cannot exceed {MAX_SHADER_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_tags(tags: &[String]) -> Result<()> {
    if tags.len() > MAX_TAGS_PER_SHADER {
        return Err(Error::Validation(format!(
            "A shader can carry at most {MAX_TAGS_PER_SHADER} tags"
        )));
    }
    if tags.iter().any(|t| t.trim().chars().count() > MAX_TAG_LEN) {
        return Err(Error::Validation(format!(
            "Tag names cannot exceed {MAX_TAG_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("ada.lovelace").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("_hidden").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_shader_name_and_tags() {
        assert!(validate_shader_name("  ").is_err());
        assert!(validate_shader_name(&"n".repeat(101)).is_err());
        assert!(validate_shader_name("Plasma").is_ok());

        let many: Vec<String> = (0..17).map(|i| format!("t{i}")).collect();
        assert!(validate_tags(&many).is_err());
        assert!(validate_tags(&["x".repeat(33)]).is_err());
        assert!(validate_tags(&["fragment".to_string(), "  ".to_string()]).is_ok());
    }
}
