use crate::utils::error::{EtlError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_existing_dir(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;
    if !Path::new(path).is_dir() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Directory does not exist".to_string(),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EtlError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_port(field_name: &str, value: u16) -> Result<()> {
    if value == 0 {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Port must be between 1 and 65535".to_string(),
        });
    }
    Ok(())
}

/// 分隔符必須是單一 ASCII 字元，且不能是引號或換行
pub fn validate_delimiter(field_name: &str, value: &str) -> Result<u8> {
    let bytes = value.as_bytes();
    let reject = |reason: &str| EtlError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if bytes.len() != 1 || !bytes[0].is_ascii() {
        return Err(reject("Delimiter must be a single ASCII character"));
    }
    match bytes[0] {
        b'"' | b'\'' | b'\n' | b'\r' => Err(reject("Delimiter cannot be a quote or newline")),
        b => Ok(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("input_dir", "./data").is_ok());
        assert!(validate_path("input_dir", "").is_err());
        assert!(validate_path("input_dir", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_existing_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(validate_existing_dir("input_dir", dir.path().to_str().unwrap()).is_ok());
        assert!(validate_existing_dir("input_dir", "/definitely/not/here").is_err());
    }

    #[test]
    fn test_validate_delimiter() {
        assert_eq!(validate_delimiter("delimiter", "|").unwrap(), b'|');
        assert_eq!(validate_delimiter("delimiter", ",").unwrap(), b',');
        assert!(validate_delimiter("delimiter", "||").is_err());
        assert!(validate_delimiter("delimiter", "\"").is_err());
        assert!(validate_delimiter("delimiter", "").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("loader".to_string());
        let missing: Option<String> = None;
        assert_eq!(validate_required_field("target.user", &present).unwrap(), "loader");
        assert!(matches!(
            validate_required_field("target.user", &missing),
            Err(EtlError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_port() {
        assert!(validate_port("target.port", 5432).is_ok());
        assert!(validate_port("target.port", 0).is_err());
    }
}
