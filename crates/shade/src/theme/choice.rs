//! Initial theme selection.

use super::mode::ColorMode;

/// Where the initial theme came from.
///
/// Only one source is active per initialization. An explicit saved choice
/// wins over the OS preference, which wins over the built-in default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    /// A persisted user choice.
    Saved(ColorMode),
    /// The OS-reported preference.
    System(ColorMode),
    /// Neither was available.
    Fallback,
}

impl ThemeChoice {
    /// Picks the highest-priority source that has a value.
    ///
    /// `system` is only called when nothing is saved, and returns `None` when
    /// the platform exposes no color-scheme query.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shade::{ColorMode, ThemeChoice};
    ///
    /// let choice = ThemeChoice::resolve(Some(ColorMode::Light), || Some(ColorMode::Dark));
    /// assert_eq!(choice, ThemeChoice::Saved(ColorMode::Light));
    /// assert_eq!(ThemeChoice::resolve(None, || None).mode(), ColorMode::Light);
    /// ```
    pub fn resolve<F>(saved: Option<ColorMode>, system: F) -> Self
    where
        F: FnOnce() -> Option<ColorMode>,
    {
        if let Some(mode) = saved {
            return ThemeChoice::Saved(mode);
        }
        match system() {
            Some(mode) => ThemeChoice::System(mode),
            None => ThemeChoice::Fallback,
        }
    }

    /// Resolves to a concrete mode.
    pub fn mode(self) -> ColorMode {
        match self {
            ThemeChoice::Saved(mode) | ThemeChoice::System(mode) => mode,
            ThemeChoice::Fallback => ColorMode::default(),
        }
    }

    /// Short label used in log lines and CLI output.
    pub fn source(self) -> &'static str {
        match self {
            ThemeChoice::Saved(_) => "saved",
            ThemeChoice::System(_) => "system",
            ThemeChoice::Fallback => "default",
        }
    }
}
