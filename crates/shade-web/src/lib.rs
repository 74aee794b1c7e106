//! Browser host for the shade theme controller.
//!
//! Wires [`shade::ThemeController`] to the live page: `<html>` as the root,
//! the element with the configured id as the toggle, `localStorage` for the
//! saved preference, `matchMedia` for the OS preference, and `setTimeout`
//! for the end of transitions.
//!
//! From JavaScript:
//!
//! ```js
//! import init, { start } from "./shade_web.js";
//! await init();
//! start();
//! window.ThemeController.toggle();
//! ```

mod dom;

use js_sys::Reflect;
use log::debug;
use shade::{ApplyOptions, ControllerConfig, ThemeController};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, EventTarget};

pub use dom::{
    WebColorScheme, WebPage, WebRoot, WebScheduler, WebStorage, WebToggle, WindowInitFlag,
};

/// Error returned when the page cannot host a controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebHostError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("document has no HTML root element")]
    NoRoot,
    #[error("{0}")]
    Config(String),
    #[error("browser call failed: {0}")]
    Js(String),
}

impl From<WebHostError> for JsValue {
    fn from(err: WebHostError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Script-facing handle published on `window`.
#[wasm_bindgen]
pub struct ThemeHandle {
    controller: Rc<ThemeController>,
}

#[wasm_bindgen]
impl ThemeHandle {
    /// The theme currently shown.
    pub fn theme(&self) -> String {
        self.controller.current_theme().to_string()
    }

    /// Flips and saves the theme, returning the new one.
    pub fn toggle(&self) -> String {
        self.controller.toggle_theme().to_string()
    }

    /// Applies a theme by name. `persist` and `animate` default to `true`.
    pub fn apply(&self, name: &str, persist: Option<bool>, animate: Option<bool>) -> String {
        let options = ApplyOptions {
            persist: persist.unwrap_or(true),
            animate: animate.unwrap_or(true),
        };
        self.controller.apply_theme_str(name, options).to_string()
    }

    #[wasm_bindgen(js_name = savedTheme)]
    pub fn saved_theme(&self) -> Option<String> {
        self.controller.saved_theme().map(|mode| mode.to_string())
    }

    #[wasm_bindgen(js_name = systemTheme)]
    pub fn system_theme(&self) -> String {
        self.controller.system_theme().to_string()
    }

    /// Forgets the saved choice and returns to the OS preference.
    #[wasm_bindgen(js_name = clearSavedTheme)]
    pub fn clear_saved_theme(&self) -> String {
        self.controller.clear_saved_theme().to_string()
    }
}

/// Starts the controller with the default configuration.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    install(ControllerConfig::default())?;
    Ok(())
}

/// Starts the controller with a JSON configuration, e.g.
/// `{"storage_key": "site-theme", "toggle_id": "mode-switch"}`.
#[wasm_bindgen(js_name = startWithConfig)]
pub fn start_with_config(json: &str) -> Result<(), JsValue> {
    let config =
        ControllerConfig::from_json(json).map_err(|err| WebHostError::Config(err.to_string()))?;
    install(config)?;
    Ok(())
}

/// Builds the controller for the current page, publishes its handle and
/// initializes it once the DOM is ready.
pub fn install(config: ControllerConfig) -> Result<Rc<ThemeController>, WebHostError> {
    let window = web_sys::window().ok_or(WebHostError::NoWindow)?;
    let document = window.document().ok_or(WebHostError::NoDocument)?;
    let page = WebPage::new(document.clone()).ok_or(WebHostError::NoRoot)?;

    let mut builder = ThemeController::builder(Rc::new(page))
        .config(config.clone())
        .store(Rc::new(WebStorage::new(window.clone())))
        .scheduler(Rc::new(WebScheduler))
        .init_flag(Rc::new(WindowInitFlag::new(
            window.clone(),
            &config.init_flag_name,
        )));
    if let Some(query) = WebColorScheme::new(&window) {
        builder = builder.system(Rc::new(query));
    }
    let controller = builder.build();

    publish(&window, &config.global_name, &controller)?;

    let loading = document.ready_state() == "loading";
    initialize_when_loaded(&document, loading, &controller)?;
    Ok(controller)
}

/// Initializes now, or on the first `DOMContentLoaded` from `target` while
/// the document is still `loading`.
fn initialize_when_loaded(
    target: &EventTarget,
    loading: bool,
    controller: &Rc<ThemeController>,
) -> Result<(), WebHostError> {
    if !loading {
        controller.initialize();
        return Ok(());
    }
    let pending = Rc::clone(controller);
    let on_ready = Closure::once_into_js(move || {
        pending.initialize();
    });
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            "DOMContentLoaded",
            on_ready.unchecked_ref(),
            &options,
        )
        .map_err(|err| WebHostError::Js(format!("{err:?}")))
}

/// Sets `window[name]` to a handle unless a copy of the script got there first.
fn publish(
    window: &web_sys::Window,
    name: &str,
    controller: &Rc<ThemeController>,
) -> Result<(), WebHostError> {
    let key = JsValue::from_str(name);
    let taken = Reflect::has(window, &key).map_err(|err| WebHostError::Js(format!("{err:?}")))?;
    if taken {
        debug!("window.{name} already set, keeping the existing theme handle");
        return Ok(());
    }
    let handle = ThemeHandle {
        controller: Rc::clone(controller),
    };
    Reflect::set(window, &key, &JsValue::from(handle))
        .map_err(|err| WebHostError::Js(format!("{err:?}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(WebHostError::NoWindow.to_string(), "no global window");
        assert_eq!(
            WebHostError::Config("configuration field 'toggle_id' must not be empty".into())
                .to_string(),
            "configuration field 'toggle_id' must not be empty"
        );
        assert!(WebHostError::Js("TypeError".into())
            .to_string()
            .contains("TypeError"));
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use shade::memory::MemoryPage;
    use wasm_bindgen_test::*;
    use web_sys::Event;

    wasm_bindgen_test_configure!(run_in_browser);

    fn controller_for(page: &Rc<MemoryPage>) -> Rc<ThemeController> {
        ThemeController::builder(page.clone()).build()
    }

    #[wasm_bindgen_test]
    fn test_publish_sets_handle() {
        let window = web_sys::window().unwrap();
        let controller = controller_for(&Rc::new(MemoryPage::new()));

        publish(&window, "__shadeTestHandle", &controller).unwrap();
        let handle = Reflect::get(&window, &"__shadeTestHandle".into()).unwrap();
        assert!(handle.is_object());
    }

    #[wasm_bindgen_test]
    fn test_publish_keeps_existing_global() {
        let window = web_sys::window().unwrap();
        let key = JsValue::from_str("__shadeTestTaken");
        Reflect::set(&window, &key, &"first copy".into()).unwrap();
        let controller = controller_for(&Rc::new(MemoryPage::new()));

        publish(&window, "__shadeTestTaken", &controller).unwrap();
        assert_eq!(
            Reflect::get(&window, &key).unwrap().as_string().as_deref(),
            Some("first copy")
        );
    }

    #[wasm_bindgen_test]
    fn test_loading_document_waits_for_content_loaded() {
        let page = Rc::new(MemoryPage::with_toggle("theme-toggle"));
        let controller = controller_for(&page);
        let target = EventTarget::new().unwrap();

        initialize_when_loaded(&target, true, &controller).unwrap();
        assert!(!page.toggle_element().unwrap().is_bound());

        target
            .dispatch_event(&Event::new("DOMContentLoaded").unwrap())
            .unwrap();
        assert!(page.toggle_element().unwrap().is_bound());
    }

    #[wasm_bindgen_test]
    fn test_loaded_document_initializes_immediately() {
        let page = Rc::new(MemoryPage::with_toggle("theme-toggle"));
        let controller = controller_for(&page);
        let target = EventTarget::new().unwrap();

        initialize_when_loaded(&target, false, &controller).unwrap();
        assert!(page.toggle_element().unwrap().is_bound());
    }
}
