//! # shade
//!
//! Light/dark theme control for documents: pick the initial theme from a
//! saved user choice or the OS preference, mirror it onto the document root
//! and an accessible toggle control, and keep it in sync as the user toggles
//! or the OS preference changes.
//!
//! ## Quick start
//!
//! ```rust
//! use shade::memory::{MemoryColorScheme, MemoryPage, MemoryStore};
//! use shade::{ColorMode, ThemeController};
//! use std::rc::Rc;
//!
//! let page = Rc::new(MemoryPage::with_toggle("theme-toggle"));
//! let system = Rc::new(MemoryColorScheme::new(true));
//! let controller = ThemeController::builder(page.clone())
//!     .store(Rc::new(MemoryStore::new()))
//!     .system(system.clone())
//!     .build();
//!
//! controller.initialize();
//! assert_eq!(controller.current_theme(), ColorMode::Dark);
//!
//! // No saved choice yet, so OS changes are followed.
//! system.set_dark(false);
//! assert_eq!(controller.current_theme(), ColorMode::Light);
//! ```
//!
//! ## What gets written
//!
//! On the root: the `dark` class, `data-theme`, the `color-scheme` style, and
//! the transient `theme-animating` / `theme-switching-to-dark` classes during
//! animated switches. On the toggle: `aria-checked` and `data-theme`. In the
//! store: `"light"` or `"dark"` under the configured key, only when the user
//! chooses.
//!
//! ## Hosts
//!
//! The controller talks to the page through the traits in [`host`]. The
//! `shade-web` crate implements them on `web-sys`; [`memory`] implements
//! them in-process.

pub mod config;
pub mod controller;
pub mod host;
pub mod memory;
pub mod theme;

pub use config::{ConfigError, ControllerConfig};
pub use controller::{ApplyOptions, Init, ThemeController, ThemeControllerBuilder};
pub use host::{
    ColorSchemeQuery, EventResponse, InitFlag, LocalInitFlag, Page, PreferenceStore, Scheduler,
    StorageError, Subscription, ThemeRoot, ToggleControl, ToggleEvent,
};
#[cfg(feature = "os-detect")]
pub use theme::{detect_color_mode, set_theme_detector, OsColorScheme};
pub use theme::{ColorMode, ParseColorModeError, ThemeChoice};
