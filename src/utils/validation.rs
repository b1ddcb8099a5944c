use crate::utils::error::{BridgeError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_existing_file(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    if !Path::new(path).is_file() {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "File does not exist".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// DOM id 不可為空白，也不可含有空白字元
pub fn validate_element_id(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    if value.chars().any(char::is_whitespace) {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Element id cannot contain whitespace".to_string(),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| BridgeError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_element_id() {
        assert!(validate_element_id("bridge.style_target_id", "generated-styles").is_ok());
        assert!(validate_element_id("bridge.style_target_id", "").is_err());
        assert!(validate_element_id("bridge.style_target_id", "generated styles").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("audio.fade_steps", 5, 1).is_ok());
        assert!(validate_positive_number("audio.fade_steps", 0, 1).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("intro.ogg".to_string());
        assert_eq!(
            validate_required_field("audio.intro_track", &present).unwrap(),
            "intro.ogg"
        );

        let absent: Option<String> = None;
        assert!(matches!(
            validate_required_field("audio.intro_track", &absent),
            Err(BridgeError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert!(validate_existing_file("audio.intro_track", path).is_ok());
        assert!(validate_existing_file("audio.intro_track", "/no/such/track.ogg").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("audio.fade_steps", 10u32, 1, 100).is_ok());
        assert!(validate_range("audio.fade_steps", 0u32, 1, 100).is_err());
    }
}
