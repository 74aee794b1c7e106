//! The two-valued color mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The user's preferred color mode.
///
/// Only `light` and `dark` exist. Anything else a host hands over is either
/// rejected ([`ColorMode::parse`]) or coerced to [`ColorMode::Light`]
/// ([`ColorMode::normalize`]), depending on whether the caller needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    /// Returns the literal name written to storage and the DOM.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }

    /// Parses an exact `"light"` or `"dark"`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shade::ColorMode;
    ///
    /// assert_eq!(ColorMode::parse("dark"), Some(ColorMode::Dark));
    /// assert_eq!(ColorMode::parse("Dark"), None);
    /// assert_eq!(ColorMode::parse(""), None);
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ColorMode::Light),
            "dark" => Some(ColorMode::Dark),
            _ => None,
        }
    }

    /// Coerces any name to a mode: `"dark"` is dark, everything else is light.
    ///
    /// ```rust
    /// use shade::ColorMode;
    ///
    /// assert_eq!(ColorMode::normalize("dark"), ColorMode::Dark);
    /// assert_eq!(ColorMode::normalize("sepia"), ColorMode::Light);
    /// ```
    pub fn normalize(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            ColorMode::Dark
        } else {
            ColorMode::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == ColorMode::Dark
    }

    /// Returns the opposite mode.
    pub fn inverted(self) -> Self {
        match self {
            ColorMode::Light => ColorMode::Dark,
            ColorMode::Dark => ColorMode::Light,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is neither `light` nor `dark`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color mode '{0}', expected 'light' or 'dark'")]
pub struct ParseColorModeError(pub String);

impl FromStr for ColorMode {
    type Err = ParseColorModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseColorModeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(ColorMode::parse("light"), Some(ColorMode::Light));
        assert_eq!(ColorMode::parse("dark"), Some(ColorMode::Dark));
        assert_eq!(ColorMode::parse(" dark"), None);
        assert_eq!(ColorMode::parse("DARK"), None);
        assert_eq!(ColorMode::parse("auto"), None);
    }

    #[test]
    fn test_normalize_falls_back_to_light() {
        assert_eq!(ColorMode::normalize("dark"), ColorMode::Dark);
        assert_eq!(ColorMode::normalize("light"), ColorMode::Light);
        assert_eq!(ColorMode::normalize("null"), ColorMode::Light);
        assert_eq!(ColorMode::normalize(""), ColorMode::Light);
    }

    #[test]
    fn test_inverted() {
        assert_eq!(ColorMode::Light.inverted(), ColorMode::Dark);
        assert_eq!(ColorMode::Dark.inverted(), ColorMode::Light);
    }

    #[test]
    fn test_default_is_light() {
        assert_eq!(ColorMode::default(), ColorMode::Light);
    }

    #[test]
    fn test_from_str_error_names_value() {
        let err = "purple".parse::<ColorMode>().unwrap_err();
        assert!(err.to_string().contains("purple"));
        assert_eq!("dark".parse::<ColorMode>(), Ok(ColorMode::Dark));
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ColorMode::Dark).unwrap();
        assert_eq!(json, "\"dark\"");
        let mode: ColorMode = serde_json::from_str("\"light\"").unwrap();
        assert_eq!(mode, ColorMode::Light);
    }
}
