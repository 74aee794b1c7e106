//! In-process host implementations.
//!
//! These back the controller with plain data structures. Native hosts use
//! them as the document model; tests use them to drive clicks, key presses,
//! OS preference changes and timer expiry by hand.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;
use std::time::Duration;

use crate::host::{
    ColorSchemeQuery, EventResponse, Page, PreferenceStore, SchemeListener, Scheduler,
    StorageError, Subscription, ThemeRoot, ToggleControl, ToggleEvent, ToggleHandler,
    Unsupported,
};

/// A root element holding classes, data attributes and a color scheme.
#[derive(Debug, Default)]
pub struct MemoryRoot {
    classes: RefCell<BTreeSet<String>>,
    data: RefCell<BTreeMap<String, String>>,
    color_scheme: RefCell<Option<String>>,
}

impl MemoryRoot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Class names in sorted order.
    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().iter().cloned().collect()
    }

    pub fn data(&self, key: &str) -> Option<String> {
        self.data.borrow().get(key).cloned()
    }

    pub fn color_scheme(&self) -> Option<String> {
        self.color_scheme.borrow().clone()
    }
}

impl ThemeRoot for MemoryRoot {
    fn add_class(&self, class: &str) {
        self.classes.borrow_mut().insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        self.classes.borrow_mut().remove(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }

    fn set_data(&self, key: &str, value: &str) {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn set_color_scheme(&self, scheme: &str) {
        *self.color_scheme.borrow_mut() = Some(scheme.to_string());
    }
}

/// A toggle control that records attributes and dispatches events to the
/// attached handler.
#[derive(Default)]
pub struct MemoryToggle {
    attributes: RefCell<BTreeMap<String, String>>,
    data: RefCell<BTreeMap<String, String>>,
    handler: RefCell<Option<ToggleHandler>>,
    attach_count: Cell<usize>,
}

impl MemoryToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    pub fn data(&self, key: &str) -> Option<String> {
        self.data.borrow().get(key).cloned()
    }

    pub fn is_bound(&self) -> bool {
        self.handler.borrow().is_some()
    }

    /// How many times a handler has been attached over the toggle's life.
    pub fn attach_count(&self) -> usize {
        self.attach_count.get()
    }

    pub fn click(&self) -> EventResponse {
        self.dispatch(&ToggleEvent::Click)
    }

    pub fn key_down(&self, key: &str) -> EventResponse {
        self.dispatch(&ToggleEvent::KeyDown(key.to_string()))
    }

    /// Forwards `event` to the attached handler, if any.
    pub fn dispatch(&self, event: &ToggleEvent) -> EventResponse {
        // Released before the call so the handler can touch this toggle.
        let handler = self.handler.borrow().clone();
        match handler {
            Some(handler) => handler(event),
            None => EventResponse::Ignored,
        }
    }
}

impl ToggleControl for MemoryToggle {
    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    fn set_data(&self, key: &str, value: &str) {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn attach(&self, handler: ToggleHandler) {
        *self.handler.borrow_mut() = Some(handler);
        self.attach_count.set(self.attach_count.get() + 1);
    }

    fn detach(&self) {
        self.handler.borrow_mut().take();
    }
}

/// A document with one root and at most one toggle.
pub struct MemoryPage {
    root: Rc<MemoryRoot>,
    toggle: Option<(String, Rc<MemoryToggle>)>,
}

impl MemoryPage {
    /// A page without a toggle control.
    pub fn new() -> Self {
        Self {
            root: Rc::new(MemoryRoot::new()),
            toggle: None,
        }
    }

    /// A page whose toggle is found under `id`.
    pub fn with_toggle(id: &str) -> Self {
        Self {
            root: Rc::new(MemoryRoot::new()),
            toggle: Some((id.to_string(), Rc::new(MemoryToggle::new()))),
        }
    }

    pub fn root_element(&self) -> Rc<MemoryRoot> {
        Rc::clone(&self.root)
    }

    pub fn toggle_element(&self) -> Option<Rc<MemoryToggle>> {
        self.toggle.as_ref().map(|(_, toggle)| Rc::clone(toggle))
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for MemoryPage {
    fn root(&self) -> Rc<dyn ThemeRoot> {
        self.root.clone()
    }

    fn find_toggle(&self, id: &str) -> Option<Rc<dyn ToggleControl>> {
        match &self.toggle {
            Some((toggle_id, toggle)) if toggle_id == id => {
                Some(Rc::clone(toggle) as Rc<dyn ToggleControl>)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Failure {
    #[default]
    None,
    Writes,
    All,
}

/// A map-backed store that can be told to fail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    failure: Cell<Failure>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, returning the store for chaining.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// A store where every access fails, like disabled `localStorage`.
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.failure.set(Failure::All);
        store
    }

    /// Makes subsequent writes fail, like an exceeded quota.
    pub fn fail_writes(&self) {
        self.failure.set(Failure::Writes);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.failure.get() == Failure::All {
            return Err(StorageError::Unavailable);
        }
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self.failure.get() {
            Failure::All => Err(StorageError::Unavailable),
            Failure::Writes => Err(StorageError::Write {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            }),
            Failure::None => {
                self.entries
                    .borrow_mut()
                    .insert(key.to_string(), value.to_string());
                self.writes.set(self.writes.get() + 1);
                Ok(())
            }
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.failure.get() == Failure::All {
            return Err(StorageError::Unavailable);
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// An OS color-scheme query whose answer and change mechanisms are set by hand.
pub struct MemoryColorScheme {
    dark: Cell<bool>,
    modern: bool,
    legacy: bool,
    listeners: RefCell<Vec<SchemeListener>>,
    subscription: Cell<Option<Subscription>>,
}

impl MemoryColorScheme {
    /// A query supporting both mechanisms.
    pub fn new(dark: bool) -> Self {
        Self::with_mechanisms(dark, true, true)
    }

    /// A query that only has the legacy `addListener` mechanism.
    pub fn legacy_only(dark: bool) -> Self {
        Self::with_mechanisms(dark, false, true)
    }

    /// A query that can be read but not observed.
    pub fn without_events(dark: bool) -> Self {
        Self::with_mechanisms(dark, false, false)
    }

    fn with_mechanisms(dark: bool, modern: bool, legacy: bool) -> Self {
        Self {
            dark: Cell::new(dark),
            modern,
            legacy,
            listeners: RefCell::new(Vec::new()),
            subscription: Cell::new(None),
        }
    }

    /// Changes the OS preference and notifies listeners.
    pub fn set_dark(&self, dark: bool) {
        self.dark.set(dark);
        let listeners: Vec<SchemeListener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(dark);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// The mechanism used by the most recent registration.
    pub fn subscription(&self) -> Option<Subscription> {
        self.subscription.get()
    }

    fn register(&self, listener: SchemeListener, kind: Subscription) {
        self.listeners.borrow_mut().push(listener);
        self.subscription.set(Some(kind));
    }
}

impl ColorSchemeQuery for MemoryColorScheme {
    fn matches_dark(&self) -> bool {
        self.dark.get()
    }

    fn add_change_listener(&self, listener: SchemeListener) -> Result<(), Unsupported> {
        if !self.modern {
            return Err(Unsupported);
        }
        self.register(listener, Subscription::Modern);
        Ok(())
    }

    fn add_legacy_listener(&self, listener: SchemeListener) -> Result<(), Unsupported> {
        if !self.legacy {
            return Err(Unsupported);
        }
        self.register(listener, Subscription::Legacy);
        Ok(())
    }
}

/// A scheduler driven by an explicit clock.
///
/// Nothing runs until [`advance`](ManualScheduler::advance) moves the clock
/// past a task's due time.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    pending: RefCell<Vec<(Duration, Box<dyn FnOnce()>)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Moves the clock forward and runs every task that has come due, in
    /// due-time order.
    pub fn advance(&self, by: Duration) {
        let now = self.now.get() + by;
        self.now.set(now);
        loop {
            let next = {
                let mut pending = self.pending.borrow_mut();
                let due = pending
                    .iter()
                    .enumerate()
                    .filter(|(_, (at, _))| *at <= now)
                    .min_by_key(|(_, (at, _))| *at)
                    .map(|(index, _)| index);
                due.map(|index| pending.remove(index))
            };
            match next {
                Some((_, task)) => task(),
                None => break,
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn defer(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let at = self.now.get() + delay;
        self.pending.borrow_mut().push((at, task));
    }
}
