//! Custom validation functions for configuration.

use validator::ValidationError;

/// Validate that a given value is a power of two.
pub fn validate_power_of_two(value: usize) -> Result<(), ValidationError> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_power_of_two"))
    }
}

/// Validate that a log level names a known tracing level.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["trace", "debug", "info", "warn", "error"]
        .contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_of_two() {
        assert!(validate_power_of_two(256).is_ok());
        assert!(validate_power_of_two(100).is_err());
        assert!(validate_power_of_two(0).is_err());
    }

    #[test]
    fn log_levels() {
        assert!(validate_log_level("info").is_ok());
        assert!(validate_log_level("WARN").is_ok());
        assert!(validate_log_level("loud").is_err());
    }
}
