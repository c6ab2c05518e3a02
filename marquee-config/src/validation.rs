// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Configuration validator with rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate that a number is within range
    pub fn in_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<()> {
        if value < min || value > max {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between {} and {}",
                field, min, max
            )));
        }
        Ok(())
    }

    /// Validate URL format
    pub fn is_url(value: &str, field: &str) -> Result<()> {
        match url::Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "{} must be a valid http(s) URL",
                field
            ))),
        }
    }

    /// Validate port number
    pub fn is_port(value: u16, field: &str) -> Result<()> {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a valid port number",
                field
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty() {
        assert!(ConfigValidator::not_empty("value", "field").is_ok());
        assert!(ConfigValidator::not_empty("  ", "field").is_err());
    }

    #[test]
    fn test_in_range() {
        assert!(ConfigValidator::in_range(10, 1, 120, "timeout").is_ok());
        assert!(ConfigValidator::in_range(0, 1, 120, "timeout").is_err());
        assert!(ConfigValidator::in_range(121, 1, 120, "timeout").is_err());
    }

    #[test]
    fn test_is_url() {
        assert!(ConfigValidator::is_url("https://api.razorpay.com/v1", "api").is_ok());
        assert!(ConfigValidator::is_url("http://127.0.0.1:9000", "api").is_ok());
        assert!(ConfigValidator::is_url("ftp://example.com", "api").is_err());
        assert!(ConfigValidator::is_url("not a url", "api").is_err());
    }

    #[test]
    fn test_is_port() {
        assert!(ConfigValidator::is_port(3000, "port").is_ok());
        assert!(ConfigValidator::is_port(0, "port").is_err());
    }
}
