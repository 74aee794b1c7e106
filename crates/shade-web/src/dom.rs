//! `web-sys` implementations of the shade host traits.

use js_sys::Reflect;
use log::debug;
use gloo_timers::callback::Timeout;
use shade::host::{
    ColorSchemeQuery, InitFlag, Page, PreferenceStore, SchemeListener, Scheduler, StorageError,
    ThemeRoot, ToggleControl, ToggleEvent, ToggleHandler, Unsupported,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Event, HtmlElement, KeyboardEvent, MediaQueryList, MediaQueryListEvent, Storage,
    Window,
};

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

/// The `<html>` element.
pub struct WebRoot {
    element: HtmlElement,
}

impl ThemeRoot for WebRoot {
    fn add_class(&self, class: &str) {
        let _ = self.element.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.element.class_list().remove_1(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.element.class_list().contains(class)
    }

    fn set_data(&self, key: &str, value: &str) {
        let _ = self.element.dataset().set(key, value);
    }

    fn set_color_scheme(&self, scheme: &str) {
        let _ = self.element.style().set_property("color-scheme", scheme);
    }
}

struct Listeners {
    click: Closure<dyn FnMut(Event)>,
    keydown: Closure<dyn FnMut(KeyboardEvent)>,
}

/// The toggle control element.
pub struct WebToggle {
    element: HtmlElement,
    listeners: RefCell<Option<Listeners>>,
}

impl WebToggle {
    pub(crate) fn new(element: HtmlElement) -> Self {
        Self {
            element,
            listeners: RefCell::new(None),
        }
    }
}

impl ToggleControl for WebToggle {
    fn set_attribute(&self, name: &str, value: &str) {
        let _ = self.element.set_attribute(name, value);
    }

    fn set_data(&self, key: &str, value: &str) {
        let _ = self.element.dataset().set(key, value);
    }

    fn attach(&self, handler: ToggleHandler) {
        self.detach();

        let on_click = Rc::clone(&handler);
        let click = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            on_click(&ToggleEvent::Click);
        });
        let keydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let response = handler(&ToggleEvent::KeyDown(event.key()));
            if response.prevent_default() {
                event.prevent_default();
            }
        });

        let target = &self.element;
        if target
            .add_event_listener_with_callback("click", click.as_ref().unchecked_ref())
            .is_err()
        {
            debug!("could not attach click listener to theme toggle");
        }
        if target
            .add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())
            .is_err()
        {
            debug!("could not attach keydown listener to theme toggle");
        }
        *self.listeners.borrow_mut() = Some(Listeners { click, keydown });
    }

    fn detach(&self) {
        let Some(listeners) = self.listeners.borrow_mut().take() else {
            return;
        };
        let target = &self.element;
        let _ = target
            .remove_event_listener_with_callback("click", listeners.click.as_ref().unchecked_ref());
        let _ = target.remove_event_listener_with_callback(
            "keydown",
            listeners.keydown.as_ref().unchecked_ref(),
        );
    }
}

/// The document, with its root resolved up front.
pub struct WebPage {
    document: Document,
    root: Rc<WebRoot>,
}

impl WebPage {
    /// Returns `None` when the document has no HTML root element.
    pub fn new(document: Document) -> Option<Self> {
        let element = document
            .document_element()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        Some(Self {
            document,
            root: Rc::new(WebRoot { element }),
        })
    }
}

impl Page for WebPage {
    fn root(&self) -> Rc<dyn ThemeRoot> {
        self.root.clone()
    }

    fn find_toggle(&self, id: &str) -> Option<Rc<dyn ToggleControl>> {
        let element = self
            .document
            .get_element_by_id(id)?
            .dyn_into::<HtmlElement>()
            .ok()?;
        Some(Rc::new(WebToggle::new(element)))
    }
}

/// `window.localStorage`.
///
/// Looked up on every access: browsers throw when storage is disabled or the
/// page is sandboxed, and that surfaces as [`StorageError::Unavailable`].
pub struct WebStorage {
    window: Window,
}

impl WebStorage {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    fn storage(&self) -> Result<Storage, StorageError> {
        self.window
            .local_storage()
            .ok()
            .flatten()
            .ok_or(StorageError::Unavailable)
    }
}

impl PreferenceStore for WebStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|err| StorageError::Read {
                key: key.to_string(),
                reason: describe(&err),
            })
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| StorageError::Write {
                key: key.to_string(),
                reason: describe(&err),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|err| StorageError::Write {
                key: key.to_string(),
                reason: describe(&err),
            })
    }
}

/// `matchMedia("(prefers-color-scheme: dark)")`.
pub struct WebColorScheme {
    list: MediaQueryList,
    listeners: RefCell<Vec<Closure<dyn FnMut(MediaQueryListEvent)>>>,
}

impl WebColorScheme {
    /// Returns `None` when the browser has no `matchMedia`.
    pub fn new(window: &Window) -> Option<Self> {
        if !has_method(window, "matchMedia") {
            return None;
        }
        let list = window.match_media(DARK_QUERY).ok().flatten()?;
        Some(Self::from_list(list))
    }

    pub(crate) fn from_list(list: MediaQueryList) -> Self {
        Self {
            list,
            listeners: RefCell::new(Vec::new()),
        }
    }

    fn closure(listener: SchemeListener) -> Closure<dyn FnMut(MediaQueryListEvent)> {
        Closure::<dyn FnMut(MediaQueryListEvent)>::new(move |event: MediaQueryListEvent| {
            listener(event.matches());
        })
    }
}

impl ColorSchemeQuery for WebColorScheme {
    fn matches_dark(&self) -> bool {
        self.list.matches()
    }

    fn add_change_listener(&self, listener: SchemeListener) -> Result<(), Unsupported> {
        if !has_method(&self.list, "addEventListener") {
            return Err(Unsupported);
        }
        let closure = Self::closure(listener);
        self.list
            .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
            .map_err(|_| Unsupported)?;
        self.listeners.borrow_mut().push(closure);
        Ok(())
    }

    fn add_legacy_listener(&self, listener: SchemeListener) -> Result<(), Unsupported> {
        if !has_method(&self.list, "addListener") {
            return Err(Unsupported);
        }
        let closure = Self::closure(listener);
        self.list
            .add_listener_with_opt_callback(Some(closure.as_ref().unchecked_ref()))
            .map_err(|_| Unsupported)?;
        self.listeners.borrow_mut().push(closure);
        Ok(())
    }
}

/// Browser timers through `gloo-timers`.
///
/// Timeouts are never cancelled, so each one is forgotten once scheduled.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebScheduler;

impl Scheduler for WebScheduler {
    fn defer(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, task).forget();
    }
}

/// A property on `window` shared by every copy of the script on the page.
pub struct WindowInitFlag {
    window: Window,
    name: JsValue,
}

impl WindowInitFlag {
    pub fn new(window: Window, name: &str) -> Self {
        Self {
            window,
            name: JsValue::from_str(name),
        }
    }
}

impl InitFlag for WindowInitFlag {
    fn claim(&self) -> bool {
        let claimed = Reflect::get(&self.window, &self.name)
            .map(|value| value.is_truthy())
            .unwrap_or(false);
        if claimed {
            return false;
        }
        let _ = Reflect::set(&self.window, &self.name, &JsValue::TRUE);
        true
    }
}

fn has_method(target: &JsValue, name: &str) -> bool {
    Reflect::get(target, &JsValue::from_str(name))
        .map(|value| value.is_function())
        .unwrap_or(false)
}

fn describe(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
