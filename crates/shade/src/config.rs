//! Controller configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Storage key for the persisted preference.
pub const DEFAULT_STORAGE_KEY: &str = "theme";
/// Element id of the toggle control.
pub const DEFAULT_TOGGLE_ID: &str = "theme-toggle";
/// How long the transition marker stays on the root.
pub const DEFAULT_TRANSITION_DELAY_MS: u64 = 340;
/// Window property used as the init coordination flag in browsers.
pub const DEFAULT_INIT_FLAG_NAME: &str = "__shadeThemeInitialized";
/// Window property the browser handle is published under.
pub const DEFAULT_GLOBAL_NAME: &str = "ThemeController";

/// Error returned when a configuration cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("configuration field '{0}' must not be empty")]
    Empty(&'static str),
}

/// Settings for a [`ThemeController`](crate::ThemeController).
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```rust
/// use shade::ControllerConfig;
///
/// let config = ControllerConfig::from_json(r#"{ "storage_key": "site-theme" }"#).unwrap();
/// assert_eq!(config.storage_key, "site-theme");
/// assert_eq!(config.toggle_id, "theme-toggle");
/// assert!(config.observe_system_preference);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub storage_key: String,
    pub toggle_id: String,
    pub transition_delay_ms: u64,
    /// Follow OS preference changes while the user has no saved choice.
    pub observe_system_preference: bool,
    pub init_flag_name: String,
    pub global_name: String,
}

impl ControllerConfig {
    /// The default configuration.
    pub fn new() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            toggle_id: DEFAULT_TOGGLE_ID.to_string(),
            transition_delay_ms: DEFAULT_TRANSITION_DELAY_MS,
            observe_system_preference: true,
            init_flag_name: DEFAULT_INIT_FLAG_NAME.to_string(),
            global_name: DEFAULT_GLOBAL_NAME.to_string(),
        }
    }

    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects empty keys and ids.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("storage_key", &self.storage_key),
            ("toggle_id", &self.toggle_id),
            ("init_flag_name", &self.init_flag_name),
            ("global_name", &self.global_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(field));
            }
        }
        Ok(())
    }

    /// The transition delay as a [`Duration`].
    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_delay_ms)
    }

    /// Sets the preference store key.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Sets the id of the toggle control.
    pub fn toggle_id(mut self, id: impl Into<String>) -> Self {
        self.toggle_id = id.into();
        self
    }

    /// Sets how long transition markers stay on the root.
    pub fn with_transition_delay(mut self, delay: Duration) -> Self {
        self.transition_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Follows OS preference changes while nothing is saved.
    pub fn observe_system_preference(mut self, observe: bool) -> Self {
        self.observe_system_preference = observe;
        self
    }

    /// Sets the name of the global init flag.
    pub fn init_flag_name(mut self, name: impl Into<String>) -> Self {
        self.init_flag_name = name.into();
        self
    }

    /// Sets the name the controller handle is published under.
    pub fn global_name(mut self, name: impl Into<String>) -> Self {
        self.global_name = name.into();
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.storage_key, "theme");
        assert_eq!(config.toggle_id, "theme-toggle");
        assert_eq!(config.transition_delay(), Duration::from_millis(340));
        assert!(config.observe_system_preference);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = ControllerConfig::new()
            .storage_key("site-theme")
            .toggle_id("mode-switch")
            .with_transition_delay(Duration::from_millis(120))
            .observe_system_preference(false);

        assert_eq!(config.storage_key, "site-theme");
        assert_eq!(config.toggle_id, "mode-switch");
        assert_eq!(config.transition_delay_ms, 120);
        assert!(!config.observe_system_preference);
    }

    #[test]
    fn test_from_json_empty_object_is_default() {
        let config = ControllerConfig::from_json("{}").unwrap();
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn test_from_json_rejects_empty_key() {
        let err = ControllerConfig::from_json(r#"{ "storage_key": "  " }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Empty("storage_key")));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = ControllerConfig::from_json("{ storage_key").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid configuration"));
    }

    #[test]
    fn test_from_json_rejects_wrong_type() {
        let err = ControllerConfig::from_json(r#"{ "transition_delay_ms": "slow" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
