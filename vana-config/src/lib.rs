//! # Vana Configuration System
//!
//! Hierarchical configuration for the habit index: defaults, then YAML
//! files, then environment variables, validated before use. The arena and
//! the bucket array cannot be resized at runtime, so sizing lives here and
//! is fixed at startup.

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod core;
mod error;
mod telemetry;
mod validation;

pub use crate::core::ArenaConfig;
pub use crate::core::CoreConfig;
pub use crate::core::IndexConfig;
pub use error::ConfigError;
pub use telemetry::TelemetryConfig;

/// Top-level configuration container for all Vana components.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct VanaConfig {
    /// Core sizing (arena capacity, bucket count).
    #[validate(nested)]
    pub core: CoreConfig,

    /// Logging and metrics configuration.
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl VanaConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/vana.yaml` - base settings; defaults are used if missing.
    /// 3. `config/<environment>.yaml` - environment-specific overrides.
    /// 4. `VANA_*` environment variables with `__` nesting.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(VanaConfig::default()));

        if Path::new("config/vana.yaml").exists() {
            figment = figment.merge(Yaml::file("config/vana.yaml"));
        }

        let env = std::env::var("VANA_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        figment
            .merge(Env::prefixed("VANA_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path for testing/validation.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(
                path.to_string_lossy().to_string(),
            )));
        }

        Figment::from(Serialized::defaults(VanaConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("VANA_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_validation() {
        let config = VanaConfig::default();
        config.validate().expect("Default config should validate");
    }

    #[test]
    fn environment_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("VANA_CORE__INDEX__BUCKETS", "512");
            let config = VanaConfig::load().expect("config should load");
            assert_eq!(config.core.index.buckets, 512);
            Ok(())
        });
    }

    #[test]
    fn yaml_file_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "vana.yaml",
                r#"
core:
  arena:
    capacity: 1048576
"#,
            )?;
            let config = VanaConfig::load_from_path("vana.yaml").expect("config should load");
            assert_eq!(config.core.arena.capacity, 1048576);
            // Untouched fields keep their defaults.
            assert_eq!(config.core.index.buckets, 256);
            Ok(())
        });
    }

    #[test]
    fn invalid_bucket_count_is_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("VANA_CORE__INDEX__BUCKETS", "100");
            assert!(matches!(
                VanaConfig::load(),
                Err(ConfigError::Validation(_))
            ));
            Ok(())
        });
    }
}
