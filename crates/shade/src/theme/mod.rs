//! Color modes and initial theme selection.
//!
//! This module provides:
//!
//! - [`ColorMode`]: Light or dark color mode enum
//! - [`ThemeChoice`]: Which preference source decided the initial theme
//! - [`OsColorScheme`]: OS detection for native hosts (feature `os-detect`)

mod choice;
#[cfg(feature = "os-detect")]
mod detect;
mod mode;

pub use choice::ThemeChoice;
#[cfg(feature = "os-detect")]
pub use detect::{detect_color_mode, set_theme_detector, OsColorScheme};
pub use mode::{ColorMode, ParseColorModeError};
