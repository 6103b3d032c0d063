//! Configuration schemas.
//!
//! All configuration structs are deserialized through the `config` crate.
//! Each sub-module represents a logical configuration section.

pub mod logging;
pub mod policy;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::policy::PolicyConfig;

use crate::error::HookyError;

/// Environment variable prefix for overrides (`HOOKY__POLICY__CHECK_SIGNATURES=false`).
pub const ENV_PREFIX: &str = "HOOKY";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookyConfig {
    /// Default registration policy for hookable types.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HookyConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default` with an environment-specific overlay and
    /// environment variables prefixed with `HOOKY__`. Missing files are
    /// skipped; every field has a default.
    pub fn load(env: &str) -> Result<Self, HookyError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("policy.accessibility")
                    .with_list_parse_key("policy.hookable_operations")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| HookyError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| HookyError::configuration(format!("Failed to deserialize config: {e}")))?;

        tracing::debug!(env, policy = ?parsed.policy, "Configuration loaded");
        Ok(parsed)
    }

    /// Parse configuration from an inline TOML document.
    pub fn from_toml(source: &str) -> Result<Self, HookyError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = HookyConfig::from_toml("").expect("empty config parses");
        assert_eq!(config.policy.accessibility, vec!["public", "abstract"]);
        assert!(config.policy.hookable_operations.is_empty());
        assert!(config.policy.check_signatures);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_policy_section() {
        let config = HookyConfig::from_toml(
            r#"
            [policy]
            accessibility = ["public", "protected"]
            hookable_operations = ["save", "fetch"]
            check_signatures = false

            [logging]
            format = "json"
            "#,
        )
        .expect("config parses");

        assert_eq!(config.policy.accessibility, vec!["public", "protected"]);
        assert_eq!(config.policy.hookable_operations, vec!["save", "fetch"]);
        assert!(!config.policy.check_signatures);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }
}
