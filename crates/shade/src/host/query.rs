//! OS color-scheme change subscription.

use std::rc::Rc;

use super::error::Unsupported;

/// Callback invoked with `true` when the OS now prefers dark.
pub type SchemeListener = Rc<dyn Fn(bool)>;

/// The OS dark-preference query, i.e. `(prefers-color-scheme: dark)`.
///
/// Browsers expose two ways to observe changes: the modern
/// `addEventListener("change", ..)` and the older `addListener(..)`. Hosts
/// implement whichever they have; both default to [`Unsupported`].
pub trait ColorSchemeQuery {
    /// Whether the OS currently prefers dark.
    fn matches_dark(&self) -> bool;

    /// Registers through the modern event-listener mechanism.
    fn add_change_listener(&self, _listener: SchemeListener) -> Result<(), Unsupported> {
        Err(Unsupported)
    }

    /// Registers through the legacy listener mechanism.
    fn add_legacy_listener(&self, _listener: SchemeListener) -> Result<(), Unsupported> {
        Err(Unsupported)
    }
}

/// Which mechanism [`subscribe`] ended up using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    Modern,
    Legacy,
}

/// Registers `listener` on `query`, preferring the modern mechanism.
///
/// Returns `None` if the query supports neither.
pub fn subscribe(query: &dyn ColorSchemeQuery, listener: SchemeListener) -> Option<Subscription> {
    if query.add_change_listener(Rc::clone(&listener)).is_ok() {
        return Some(Subscription::Modern);
    }
    if query.add_legacy_listener(listener).is_ok() {
        return Some(Subscription::Legacy);
    }
    None
}
