// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Tripline report agent.
//!
//! TOML files merge across the XDG hierarchy with `TRIPLINE_*` environment
//! overrides on top. Schemas are strict: unknown keys are rejected rather
//! than ignored, and load failures render as miette diagnostics that point
//! at the offending line and suggest the key that was probably meant.
//!
//! ```no_run
//! use tripline_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("timezone: {}", config.report.timezone);
//! ```

use std::path::{Path, PathBuf};

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::TriplineConfig;

/// Load from the file hierarchy plus environment and validate the result.
///
/// Parse failures come back as diagnostics with spans into whichever TOML
/// file supplied the bad key; a clean parse still has to pass the semantic
/// checks in [`validation`].
pub fn load_and_validate() -> Result<TriplineConfig, Vec<ConfigError>> {
    validated(loader::load_config(), collect_toml_sources)
}

/// Load one explicit config file, as given with `--config`, and validate
/// it. Environment overrides still apply.
pub fn load_and_validate_path(path: &Path) -> Result<TriplineConfig, Vec<ConfigError>> {
    validated(loader::load_config_from_path(path), || {
        let shown = std::env::current_dir()
            .map(|d| d.join(path))
            .unwrap_or_else(|_| path.to_path_buf());
        read_source(&shown).into_iter().collect()
    })
}

/// Parse and validate an inline TOML string.
///
/// Spans resolve against the string itself under the `<inline>` name.
pub fn load_and_validate_str(toml_content: &str) -> Result<TriplineConfig, Vec<ConfigError>> {
    validated(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Run semantic checks on a parsed config; translate figment failures into
/// diagnostics. Sources are gathered lazily, only on the error path.
fn validated(
    loaded: Result<TriplineConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<TriplineConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Contents of whichever hierarchy files exist, keyed by the absolute path
/// figment reports in its error metadata.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join("tripline.toml"))
        .unwrap_or_else(|_| PathBuf::from("tripline.toml"));
    let user = dirs::config_dir().map(|d| d.join("tripline/tripline.toml"));
    let system = PathBuf::from("/etc/tripline/tripline.toml");

    [Some(local), user, Some(system)]
        .into_iter()
        .flatten()
        .filter_map(|path| read_source(&path))
        .collect()
}

fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    Some((path.display().to_string(), content))
}
