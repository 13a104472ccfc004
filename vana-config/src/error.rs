//! Configuration failure modes.

use std::path::PathBuf;

use thiserror::Error;
use validator::ValidationErrors;

/// Everything that can go wrong between reading the layered sources and
/// handing a validated [`VanaConfig`](crate::VanaConfig) to the caller.
///
/// There is no I/O variant: missing optional files are skipped, an
/// explicitly requested file that does not exist is
/// [`FileNotFound`](ConfigError::FileNotFound), and read failures surface
/// through figment as [`Parsing`](ConfigError::Parsing).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    /// The merged configuration failed a validation rule.
    #[error("invalid configuration:\n{}", render_field_errors(.0))]
    Validation(#[from] ValidationErrors),

    /// Figment could not merge or deserialize the layered sources.
    #[error("config parsing failed: {0}")]
    Parsing(#[from] figment::Error),
}

/// One line per failed rule, keyed by field name.
fn render_field_errors(errors: &ValidationErrors) -> String {
    let mut lines = Vec::new();
    for (field, failures) in errors.field_errors() {
        for failure in failures {
            let reason = failure
                .message
                .as_ref()
                .map(|message| message.to_string())
                .unwrap_or_else(|| failure.code.to_string());
            lines.push(format!("  {}: {}", field, reason));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn validation_display_names_each_failed_field() {
        let mut capacity = ValidationError::new("range");
        capacity.message = Some("outside the supported arena range".into());
        let mut errors = ValidationErrors::new();
        errors.add("capacity", capacity);
        errors.add("buckets", ValidationError::new("must_be_power_of_two"));

        let text = ConfigError::from(errors).to_string();
        assert!(text.contains("capacity: outside the supported arena range"));
        // Falls back to the error code when no message is set.
        assert!(text.contains("buckets: must_be_power_of_two"));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = ConfigError::FileNotFound(PathBuf::from("config/missing.yaml"));
        assert_eq!(err.to_string(), "config file not found: config/missing.yaml");
    }
}
