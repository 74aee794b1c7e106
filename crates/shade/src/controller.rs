//! The theme controller.
//!
//! [`ThemeController`] decides the initial theme, mirrors the current theme
//! onto the document root and the toggle control, and reacts to user toggles
//! and OS preference changes.
//!
//! The root's `dark` class is the only record of the current theme. Every
//! read ([`ThemeController::current_theme`], [`ThemeController::toggle_theme`])
//! goes back to it, so external scripts that flip the class are respected.

use log::{debug, info, trace};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::ControllerConfig;
use crate::host::{
    subscribe, ColorSchemeQuery, DisabledStore, EventResponse, InitFlag, InlineScheduler,
    LocalInitFlag, Page, PreferenceStore, SchemeListener, Scheduler, Subscription, ThemeRoot,
    ToggleControl, ToggleEvent,
};
use crate::theme::{ColorMode, ThemeChoice};

/// Root class present while the dark theme is active.
pub const DARK_CLASS: &str = "dark";
/// Root class present during an animated theme transition.
pub const ANIMATING_CLASS: &str = "theme-animating";
/// Root class present during an animated transition towards dark.
pub const SWITCHING_TO_DARK_CLASS: &str = "theme-switching-to-dark";
/// `data-*` key naming the active theme, on the root and the toggle.
pub const THEME_DATA_KEY: &str = "theme";
/// Toggle attribute mirroring whether dark is active.
pub const ARIA_CHECKED: &str = "aria-checked";

/// Flags for [`ThemeController::apply_theme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Write the theme to the preference store.
    pub persist: bool,
    /// Run the transition animation.
    pub animate: bool,
}

impl ApplyOptions {
    /// Neither persisted nor animated: initial paint and OS changes.
    pub const SILENT: Self = Self {
        persist: false,
        animate: false,
    };
    /// Persisted and animated: explicit user choice.
    pub const USER: Self = Self {
        persist: true,
        animate: true,
    };
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self::USER
    }
}

/// Outcome of [`ThemeController::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Init {
    /// This call initialized the page with the given choice.
    Performed(ThemeChoice),
    /// The init flag was already claimed; nothing changed.
    Skipped,
}

/// Keeps the page's light/dark theme in sync with the user and the OS.
///
/// Built with [`ThemeController::builder`]; always lives in an `Rc` so event
/// handlers can hold weak references back to it.
///
/// # Example
///
/// ```rust
/// use shade::memory::{MemoryPage, MemoryStore};
/// use shade::{ColorMode, ThemeController};
/// use std::rc::Rc;
///
/// let page = Rc::new(MemoryPage::with_toggle("theme-toggle"));
/// let store = Rc::new(MemoryStore::new());
/// let controller = ThemeController::builder(page.clone())
///     .store(store.clone())
///     .build();
///
/// controller.initialize();
/// assert_eq!(controller.current_theme(), ColorMode::Light);
///
/// page.toggle_element().unwrap().click();
/// assert_eq!(controller.current_theme(), ColorMode::Dark);
/// assert_eq!(store.get("theme").as_deref(), Some("dark"));
/// ```
pub struct ThemeController {
    config: ControllerConfig,
    page: Rc<dyn Page>,
    root: Rc<dyn ThemeRoot>,
    toggle: RefCell<Option<Rc<dyn ToggleControl>>>,
    store: Rc<dyn PreferenceStore>,
    system: Option<Rc<dyn ColorSchemeQuery>>,
    scheduler: Rc<dyn Scheduler>,
    init_flag: Rc<dyn InitFlag>,
    this: Weak<ThemeController>,
}

impl ThemeController {
    /// Starts building a controller for `page`.
    pub fn builder(page: Rc<dyn Page>) -> ThemeControllerBuilder {
        ThemeControllerBuilder::new(page)
    }

    /// The configuration this controller was built with.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Initializes the page once.
    ///
    /// Claims the init flag, looks up the toggle, applies the initial theme
    /// without persisting or animating, then binds the toggle and (when
    /// configured and supported) the OS preference listener. Later calls,
    /// from this or any controller sharing the flag, return [`Init::Skipped`].
    pub fn initialize(&self) -> Init {
        if !self.init_flag.claim() {
            debug!("theme controller already initialized, skipping");
            return Init::Skipped;
        }

        let toggle = self.page.find_toggle(&self.config.toggle_id);
        if toggle.is_none() {
            debug!("no toggle control with id '{}'", self.config.toggle_id);
        }
        *self.toggle.borrow_mut() = toggle;

        let choice = self.initial_choice();
        self.apply_theme(choice.mode(), ApplyOptions::SILENT);
        self.bind_toggle();
        if self.config.observe_system_preference {
            self.bind_system_preference();
        }

        info!(
            "theme initialized to {} from {} preference",
            choice.mode(),
            choice.source()
        );
        Init::Performed(choice)
    }

    /// Reads the persisted preference.
    ///
    /// Returns `None` when storage fails or holds anything other than
    /// `light`/`dark`.
    pub fn saved_theme(&self) -> Option<ColorMode> {
        match self.store.load(&self.config.storage_key) {
            Ok(value) => value.as_deref().and_then(ColorMode::parse),
            Err(err) => {
                debug!("ignoring unreadable theme preference: {err}");
                None
            }
        }
    }

    /// The OS preference, or light when the platform has no query.
    pub fn system_theme(&self) -> ColorMode {
        self.system_preference().unwrap_or_default()
    }

    fn system_preference(&self) -> Option<ColorMode> {
        self.system
            .as_ref()
            .map(|query| ColorMode::from_dark(query.matches_dark()))
    }

    /// Decides the initial theme: saved, then system, then light.
    pub fn initial_choice(&self) -> ThemeChoice {
        ThemeChoice::resolve(self.saved_theme(), || self.system_preference())
    }

    /// The mode of [`initial_choice`](Self::initial_choice).
    pub fn initial_theme(&self) -> ColorMode {
        self.initial_choice().mode()
    }

    /// The theme currently shown, read from the root's dark class.
    pub fn current_theme(&self) -> ColorMode {
        ColorMode::from_dark(self.root.has_class(DARK_CLASS))
    }

    /// Applies `theme` to the root and the toggle.
    ///
    /// The dark class, `data-theme` and `color-scheme` always agree after
    /// this returns. Animated calls set the transition markers and schedule
    /// their removal; non-animated calls clear any markers left by an
    /// earlier animated call. Store failures are dropped.
    pub fn apply_theme(&self, theme: ColorMode, options: ApplyOptions) {
        if options.animate {
            self.root.add_class(ANIMATING_CLASS);
            if theme.is_dark() {
                self.root.add_class(SWITCHING_TO_DARK_CLASS);
            } else {
                self.root.remove_class(SWITCHING_TO_DARK_CLASS);
            }
            let root = Rc::clone(&self.root);
            self.scheduler.defer(
                self.config.transition_delay(),
                Box::new(move || clear_transition(root.as_ref())),
            );
        } else {
            clear_transition(self.root.as_ref());
        }

        if theme.is_dark() {
            self.root.add_class(DARK_CLASS);
        } else {
            self.root.remove_class(DARK_CLASS);
        }
        self.root.set_data(THEME_DATA_KEY, theme.as_str());
        self.root.set_color_scheme(theme.as_str());

        if options.persist {
            if let Err(err) = self.store.save(&self.config.storage_key, theme.as_str()) {
                debug!("theme preference not saved: {err}");
            }
        }

        self.sync_toggle(theme);
        trace!(
            "applied {theme} theme (persist: {}, animate: {})",
            options.persist,
            options.animate
        );
    }

    /// Applies a theme given by name. Unknown names become light.
    pub fn apply_theme_str(&self, name: &str, options: ApplyOptions) -> ColorMode {
        let theme = ColorMode::normalize(name);
        self.apply_theme(theme, options);
        theme
    }

    /// Flips the current theme and saves the result. Returns the new theme.
    pub fn toggle_theme(&self) -> ColorMode {
        let next = self.current_theme().inverted();
        self.apply_theme(next, ApplyOptions::USER);
        next
    }

    /// Forgets the saved preference and falls back to the system theme.
    ///
    /// OS preference changes are followed again afterwards. Returns the
    /// theme now applied.
    pub fn clear_saved_theme(&self) -> ColorMode {
        if let Err(err) = self.store.remove(&self.config.storage_key) {
            debug!("theme preference not cleared: {err}");
        }
        let theme = self.initial_theme();
        self.apply_theme(theme, ApplyOptions::SILENT);
        theme
    }

    /// Mirrors `theme` onto the toggle's `aria-checked` and `data-theme`.
    pub fn sync_toggle(&self, theme: ColorMode) {
        let toggle = self.toggle.borrow();
        let Some(toggle) = toggle.as_ref() else {
            return;
        };
        let checked = if theme.is_dark() { "true" } else { "false" };
        toggle.set_attribute(ARIA_CHECKED, checked);
        toggle.set_data(THEME_DATA_KEY, theme.as_str());
    }

    /// Attaches the click/keydown handler to the toggle, replacing any
    /// handler attached before. Returns `false` when there is no toggle.
    pub fn bind_toggle(&self) -> bool {
        let Some(toggle) = self.toggle.borrow().clone() else {
            return false;
        };
        toggle.detach();
        let controller = self.this.clone();
        toggle.attach(Rc::new(move |event: &ToggleEvent| {
            match controller.upgrade() {
                Some(controller) => controller.handle_toggle_event(event),
                None => EventResponse::Ignored,
            }
        }));
        true
    }

    /// Handles an event forwarded by the toggle.
    ///
    /// Clicks toggle. Enter and Space toggle and ask the host to suppress
    /// the default action (page scroll for Space). Other keys are ignored.
    pub fn handle_toggle_event(&self, event: &ToggleEvent) -> EventResponse {
        match event {
            ToggleEvent::Click => {
                self.toggle_theme();
                EventResponse::Toggled {
                    prevent_default: false,
                }
            }
            ToggleEvent::KeyDown(key) if is_activation_key(key) => {
                self.toggle_theme();
                EventResponse::Toggled {
                    prevent_default: true,
                }
            }
            ToggleEvent::KeyDown(_) => EventResponse::Ignored,
        }
    }

    /// Subscribes to OS preference changes.
    ///
    /// Returns the mechanism used, or `None` when the platform has no query
    /// or the query cannot be observed.
    pub fn bind_system_preference(&self) -> Option<Subscription> {
        let query = self.system.as_ref()?;
        let controller = self.this.clone();
        let listener: SchemeListener = Rc::new(move |prefers_dark| {
            if let Some(controller) = controller.upgrade() {
                controller.handle_system_theme_change(prefers_dark);
            }
        });
        let subscription = subscribe(query.as_ref(), listener);
        if subscription.is_none() {
            debug!("color scheme query cannot be observed");
        }
        subscription
    }

    /// Follows an OS preference change unless the user has a saved choice.
    ///
    /// Returns whether the theme was applied.
    pub fn handle_system_theme_change(&self, prefers_dark: bool) -> bool {
        if self.saved_theme().is_some() {
            trace!("ignoring system theme change, user preference is saved");
            return false;
        }
        self.apply_theme(ColorMode::from_dark(prefers_dark), ApplyOptions::SILENT);
        true
    }
}

fn clear_transition(root: &dyn ThemeRoot) {
    root.remove_class(ANIMATING_CLASS);
    root.remove_class(SWITCHING_TO_DARK_CLASS);
}

fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

/// Builder for [`ThemeController`].
///
/// Only the page is required. Without a store the controller behaves as if
/// storage were disabled; without a system query OS preference reads as
/// light; without a scheduler transition markers are removed immediately;
/// without an init flag the controller gets a private one.
pub struct ThemeControllerBuilder {
    page: Rc<dyn Page>,
    config: ControllerConfig,
    store: Option<Rc<dyn PreferenceStore>>,
    system: Option<Rc<dyn ColorSchemeQuery>>,
    scheduler: Option<Rc<dyn Scheduler>>,
    init_flag: Option<Rc<dyn InitFlag>>,
}

impl ThemeControllerBuilder {
    fn new(page: Rc<dyn Page>) -> Self {
        Self {
            page,
            config: ControllerConfig::default(),
            store: None,
            system: None,
            scheduler: None,
            init_flag: None,
        }
    }

    /// Replaces the default configuration.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the preference store.
    pub fn store(mut self, store: Rc<dyn PreferenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the OS color-scheme query.
    pub fn system(mut self, query: Rc<dyn ColorSchemeQuery>) -> Self {
        self.system = Some(query);
        self
    }

    /// Sets the timer used for transition cleanup.
    pub fn scheduler(mut self, scheduler: Rc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Shares an init flag with other controllers.
    pub fn init_flag(mut self, flag: Rc<dyn InitFlag>) -> Self {
        self.init_flag = Some(flag);
        self
    }

    /// Creates the controller.
    pub fn build(self) -> Rc<ThemeController> {
        let root = self.page.root();
        Rc::new_cyclic(|this| ThemeController {
            config: self.config,
            page: self.page,
            root,
            toggle: RefCell::new(None),
            store: self.store.unwrap_or_else(|| Rc::new(DisabledStore)),
            system: self.system,
            scheduler: self.scheduler.unwrap_or_else(|| Rc::new(InlineScheduler)),
            init_flag: self
                .init_flag
                .unwrap_or_else(|| Rc::new(LocalInitFlag::new())),
            this: this.clone(),
        })
    }
}
