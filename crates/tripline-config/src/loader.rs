// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading through figment.
//!
//! Sources merge lowest to highest: compiled defaults, the system file at
//! `/etc/tripline/tripline.toml`, the user XDG file, `./tripline.toml` in
//! the working directory, then `TRIPLINE_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and sized by its chain

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TriplineConfig;

/// Config sections an environment key may open with.
const SECTIONS: [&str; 5] = ["agent", "telegram", "extractor", "store", "report"];

/// Load configuration from the standard file hierarchy plus environment
/// overrides, later sources winning.
pub fn load_config() -> Result<TriplineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TriplineConfig::default()))
        .merge(Toml::file("/etc/tripline/tripline.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tripline/tripline.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tripline.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string over the compiled defaults, with
/// no file lookup and no environment overrides.
pub fn load_config_from_str(toml_content: &str) -> Result<TriplineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TriplineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, still honoring `TRIPLINE_*`
/// environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<TriplineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TriplineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment provider mapping `TRIPLINE_STORE_MAX_WORKERS` to
/// `store.max_workers`.
fn env_provider() -> Env {
    Env::prefixed("TRIPLINE_").map(|key| env_key_to_path(key.as_str()).into())
}

/// Rewrite a prefix-stripped, lowercased env key into a dotted config path.
///
/// Splitting on every underscore would mangle field names that contain one,
/// so only a leading section name is peeled off; keys that open with no
/// known section pass through untouched.
fn env_key_to_path(key: &str) -> String {
    for section in SECTIONS {
        let Some(rest) = key.strip_prefix(section) else {
            continue;
        };
        if let Some(field) = rest.strip_prefix('_') {
            return format!("{section}.{field}");
        }
    }
    key.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_not_every_underscore() {
        assert_eq!(
            env_key_to_path("store_connection_string"),
            "store.connection_string"
        );
        assert_eq!(env_key_to_path("agent_log_level"), "agent.log_level");
        assert_eq!(env_key_to_path("log_level"), "log_level");
    }

    #[test]
    fn env_overrides_map_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TRIPLINE_TELEGRAM_BOT_TOKEN", "999:xyz");
            jail.set_env("TRIPLINE_STORE_MAX_WORKERS", "64");
            jail.set_env("TRIPLINE_EXTRACTOR_MODEL", "gpt-4o-mini");

            let config: TriplineConfig = Figment::new()
                .merge(Serialized::defaults(TriplineConfig::default()))
                .merge(env_provider())
                .extract()?;

            assert_eq!(config.telegram.bot_token.as_deref(), Some("999:xyz"));
            assert_eq!(config.store.max_workers, 64);
            assert_eq!(config.extractor.model, "gpt-4o-mini");
            Ok(())
        });
    }

    #[test]
    fn toml_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "tripline.toml",
                r#"
[store]
connection_string = "mongodb://db.internal:27017"
idle_timeout_secs = 120
"#,
            )?;

            let config: TriplineConfig = Figment::new()
                .merge(Serialized::defaults(TriplineConfig::default()))
                .merge(Toml::file("tripline.toml"))
                .extract()?;

            assert_eq!(
                config.store.connection_string.as_deref(),
                Some("mongodb://db.internal:27017")
            );
            assert_eq!(config.store.idle_timeout_secs, 120);
            // Defaults survive for keys the file does not mention.
            assert_eq!(config.store.max_workers, 500);
            Ok(())
        });
    }
}
