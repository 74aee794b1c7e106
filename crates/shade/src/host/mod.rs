//! Host abstractions the controller is written against.
//!
//! A host supplies the document root, an optional toggle control, a
//! key-value preference store, an optional OS color-scheme query, a timer,
//! and the init coordination flag. The browser host lives in `shade-web`;
//! [`crate::memory`] provides in-process implementations.
//!
//! Everything here is single-threaded: handlers are `Rc<dyn Fn>` and hosts
//! call them from their event loop.

mod error;
mod query;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

pub use error::{StorageError, Unsupported};
pub use query::{subscribe, ColorSchemeQuery, SchemeListener, Subscription};

/// The element whose presentation state reflects the theme (`<html>`).
pub trait ThemeRoot {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;
    /// Sets a `data-*` attribute. `key` is given without the `data-` prefix.
    fn set_data(&self, key: &str, value: &str);
    /// Sets the `color-scheme` style property.
    fn set_color_scheme(&self, scheme: &str);
}

/// An interaction the toggle control forwards to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleEvent {
    Click,
    /// A keydown, carrying `KeyboardEvent.key` (`"Enter"`, `" "`, ...).
    KeyDown(String),
}

/// What the controller did with a [`ToggleEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Ignored,
    Toggled {
        /// The host should suppress the event's default action.
        prevent_default: bool,
    },
}

impl EventResponse {
    pub fn prevent_default(self) -> bool {
        matches!(
            self,
            EventResponse::Toggled {
                prevent_default: true
            }
        )
    }
}

pub type ToggleHandler = Rc<dyn Fn(&ToggleEvent) -> EventResponse>;

/// The interactive control that switches themes.
pub trait ToggleControl {
    fn set_attribute(&self, name: &str, value: &str);
    /// Sets a `data-*` attribute. `key` is given without the `data-` prefix.
    fn set_data(&self, key: &str, value: &str);
    /// Starts forwarding click and keydown events to `handler`.
    fn attach(&self, handler: ToggleHandler);
    /// Stops forwarding events. Detaching an unbound control is a no-op.
    fn detach(&self);
}

/// Access to the document.
pub trait Page {
    fn root(&self) -> Rc<dyn ThemeRoot>;
    fn find_toggle(&self, id: &str) -> Option<Rc<dyn ToggleControl>>;
}

/// Durable string key-value storage (`localStorage`, a file, ...).
pub trait PreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Runs a task once after a delay. Tasks cannot be cancelled.
pub trait Scheduler {
    fn defer(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

/// Process-wide "already initialized" flag.
pub trait InitFlag {
    /// Claims the flag. Returns `true` only for the first claim.
    fn claim(&self) -> bool;
}

/// A store with no backing storage; every access fails as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStore;

impl PreferenceStore for DisabledStore {
    fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

/// Runs deferred tasks immediately, for hosts without visual transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineScheduler;

impl Scheduler for InlineScheduler {
    fn defer(&self, _delay: Duration, task: Box<dyn FnOnce()>) {
        task();
    }
}

/// An [`InitFlag`] owned by whoever constructs it.
///
/// Share one instance (behind `Rc`) between every controller that must not
/// initialize twice.
#[derive(Debug, Default)]
pub struct LocalInitFlag(Cell<bool>);

impl LocalInitFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_claimed(&self) -> bool {
        self.0.get()
    }
}

impl InitFlag for LocalInitFlag {
    fn claim(&self) -> bool {
        !self.0.replace(true)
    }
}
