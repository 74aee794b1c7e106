//! Property tests: the root's theme signals never disagree.

use proptest::prelude::*;
use shade::memory::{ManualScheduler, MemoryColorScheme, MemoryPage, MemoryRoot, MemoryStore};
use shade::{ApplyOptions, ColorMode, ThemeController, ThemeRoot};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Step {
    Click,
    Key(&'static str),
    Apply(ColorMode, bool, bool),
    System(bool),
    Tick(u64),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Click),
        prop::sample::select(vec!["Enter", " ", "a", "Escape"]).prop_map(Step::Key),
        (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(dark, persist, animate)| {
            Step::Apply(ColorMode::from_dark(dark), persist, animate)
        }),
        any::<bool>().prop_map(Step::System),
        (0u64..500).prop_map(Step::Tick),
    ]
}

fn signals(root: &MemoryRoot) -> (bool, Option<String>, Option<String>) {
    (root.has_class("dark"), root.data("theme"), root.color_scheme())
}

fn assert_consistent(root: &MemoryRoot) -> Result<(), TestCaseError> {
    let (dark, data, scheme) = signals(root);
    let name = ColorMode::from_dark(dark).as_str();
    prop_assert_eq!(data.as_deref(), Some(name));
    prop_assert_eq!(scheme.as_deref(), Some(name));
    Ok(())
}

proptest! {
    #[test]
    fn signals_agree_after_every_step(
        saved in prop::option::of(prop::sample::select(vec!["light", "dark", "bogus"])),
        system_dark in any::<bool>(),
        steps in prop::collection::vec(step_strategy(), 0..40),
    ) {
        let page = Rc::new(MemoryPage::with_toggle("theme-toggle"));
        let store = match saved {
            Some(value) => MemoryStore::new().with_entry("theme", value),
            None => MemoryStore::new(),
        };
        let system = Rc::new(MemoryColorScheme::new(system_dark));
        let scheduler = Rc::new(ManualScheduler::new());
        let controller = ThemeController::builder(page.clone())
            .store(Rc::new(store))
            .system(system.clone())
            .scheduler(scheduler.clone())
            .build();

        controller.initialize();
        let root = page.root_element();
        let toggle = page.toggle_element().unwrap();
        assert_consistent(&root)?;

        for step in steps {
            match step {
                Step::Click => {
                    toggle.click();
                }
                Step::Key(key) => {
                    toggle.key_down(key);
                }
                Step::Apply(mode, persist, animate) => {
                    controller.apply_theme(mode, ApplyOptions { persist, animate });
                }
                Step::System(dark) => system.set_dark(dark),
                Step::Tick(ms) => scheduler.advance(Duration::from_millis(ms)),
            }
            assert_consistent(&root)?;

            let expected = if controller.current_theme().is_dark() { "true" } else { "false" };
            let aria_checked = toggle.attribute("aria-checked");
            prop_assert_eq!(aria_checked.as_deref(), Some(expected));
        }

        // Every deferred clear eventually runs.
        scheduler.advance(Duration::from_millis(340));
        prop_assert!(!root.has_class("theme-animating"));
        prop_assert!(!root.has_class("theme-switching-to-dark"));
    }

    #[test]
    fn applying_twice_equals_applying_once(dark in any::<bool>(), persist in any::<bool>()) {
        let mode = ColorMode::from_dark(dark);
        let options = ApplyOptions { persist, animate: false };

        let once = Rc::new(MemoryPage::with_toggle("theme-toggle"));
        let controller = ThemeController::builder(once.clone()).build();
        controller.initialize();
        controller.apply_theme(mode, options);

        let twice = Rc::new(MemoryPage::with_toggle("theme-toggle"));
        let controller = ThemeController::builder(twice.clone()).build();
        controller.initialize();
        controller.apply_theme(mode, options);
        controller.apply_theme(mode, options);

        let a = once.root_element();
        let b = twice.root_element();
        prop_assert_eq!(a.classes(), b.classes());
        prop_assert_eq!(signals(&a), signals(&b));
        prop_assert_eq!(
            once.toggle_element().unwrap().attribute("aria-checked"),
            twice.toggle_element().unwrap().attribute("aria-checked")
        );
    }
}
