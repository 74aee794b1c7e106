//! OS color-scheme detection for native hosts.

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};
use once_cell::sync::Lazy;
use std::sync::{Mutex, PoisonError};

use super::mode::ColorMode;
use crate::host::ColorSchemeQuery;

type ThemeDetector = fn() -> ColorMode;

static THEME_DETECTOR: Lazy<Mutex<ThemeDetector>> = Lazy::new(|| Mutex::new(os_theme_detector));

/// Replaces the function [`OsColorScheme`] consults for the OS preference.
///
/// CLI runs and tests use it to pin the OS preference to a fixed mode.
pub fn set_theme_detector(detector: ThemeDetector) {
    let mut guard = THEME_DETECTOR
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    *guard = detector;
}

/// Runs the current detector.
pub fn detect_color_mode() -> ColorMode {
    let detector = THEME_DETECTOR
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    (*detector)()
}

fn os_theme_detector() -> ColorMode {
    match detect_os_theme() {
        OsThemeMode::Dark => ColorMode::Dark,
        _ => ColorMode::Light,
    }
}

/// A [`ColorSchemeQuery`] backed by the process-wide detector.
///
/// Desktop platforms give no change notifications through `dark-light`, so
/// neither subscription mechanism is supported and the controller reads the
/// OS preference once at initialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsColorScheme;

impl ColorSchemeQuery for OsColorScheme {
    fn matches_dark(&self) -> bool {
        detect_color_mode().is_dark()
    }
}
