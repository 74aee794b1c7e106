//! Terminal host for the shade theme controller.
//!
//! Runs the same [`ThemeController`] the browser uses, with a JSON file as
//! the preference store and the OS preference from `dark-light`. There is no
//! toggle control; commands call the controller directly.

mod store;

pub use store::JsonFileStore;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use serde::Serialize;
use shade::host::PreferenceStore;
use shade::memory::MemoryPage;
use shade::{ApplyOptions, ColorMode, ControllerConfig, Init, OsColorScheme, ThemeController};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Parser)]
#[command(name = "shade", version, about = "Inspect and change the saved light/dark preference")]
pub struct Cli {
    /// JSON file holding the saved preference
    #[arg(long, global = true, value_name = "PATH", default_value = ".shade-theme.json")]
    pub store: PathBuf,

    /// JSON controller configuration
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print a JSON report instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the saved, system and effective theme
    Show,
    /// Switch to the other theme and save it
    Toggle,
    /// Save a theme
    Set {
        /// `light` or `dark`
        theme: ColorMode,
    },
    /// Forget the saved theme and follow the system again
    Reset,
}

/// What a command did, as printed to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub action: &'static str,
    pub theme: ColorMode,
    pub source: &'static str,
    pub saved: Option<ColorMode>,
    pub system: ColorMode,
}

/// Executes `cli`, writing the report to `out`.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let store = JsonFileStore::new(&cli.store);
    let controller = ThemeController::builder(Rc::new(MemoryPage::new()))
        .config(config)
        .store(Rc::new(store.clone()))
        .system(Rc::new(OsColorScheme))
        .build();

    let initial = match controller.initialize() {
        Init::Performed(choice) => choice,
        Init::Skipped => controller.initial_choice(),
    };

    let (action, source) = match &cli.command {
        Command::Show => ("show", initial.source()),
        Command::Toggle => {
            let theme = controller.toggle_theme();
            ensure_saved(&controller, &store, Some(theme))?;
            ("toggle", "saved")
        }
        Command::Set { theme } => {
            controller.apply_theme(
                *theme,
                ApplyOptions {
                    persist: true,
                    animate: false,
                },
            );
            ensure_saved(&controller, &store, Some(*theme))?;
            ("set", "saved")
        }
        Command::Reset => {
            controller.clear_saved_theme();
            ensure_saved(&controller, &store, None)?;
            ("reset", controller.initial_choice().source())
        }
    };

    let report = Report {
        action,
        theme: controller.current_theme(),
        source,
        saved: controller.saved_theme(),
        system: controller.system_theme(),
    };
    write_report(out, &report, cli.json)
}

fn load_config(path: Option<&Path>) -> Result<ControllerConfig> {
    let Some(path) = path else {
        return Ok(ControllerConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    ControllerConfig::from_json(&text)
        .with_context(|| format!("failed to load config {}", path.display()))
}

// The controller swallows store failures; the CLI reads back to report them.
fn ensure_saved(
    controller: &ThemeController,
    store: &JsonFileStore,
    expected: Option<ColorMode>,
) -> Result<()> {
    let key = &controller.config().storage_key;
    let stored = store
        .load(key)
        .with_context(|| format!("could not read the saved theme in {}", store.path().display()))?;
    ensure!(
        stored.as_deref() == expected.map(ColorMode::as_str),
        "could not update the saved theme in {}",
        store.path().display()
    );
    Ok(())
}

fn write_report<W: Write>(out: &mut W, report: &Report, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        return Ok(());
    }

    let saved = report.saved.map_or("none", ColorMode::as_str);
    writeln!(
        out,
        "{:<8}{} {}",
        "theme",
        styled_mode(report.theme),
        style(format!("({})", report.source)).dim()
    )?;
    writeln!(out, "{:<8}{}", "saved", saved)?;
    writeln!(out, "{:<8}{}", "system", report.system)?;
    Ok(())
}

fn styled_mode(mode: ColorMode) -> console::StyledObject<&'static str> {
    match mode {
        ColorMode::Light => style(mode.as_str()).yellow().bold(),
        ColorMode::Dark => style(mode.as_str()).blue().bold(),
    }
}

