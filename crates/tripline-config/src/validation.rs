// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks applied after deserialization.
//!
//! Serde attributes can enforce shape but not meaning. The agent talks to
//! paid external services and an internal database, so missing credentials
//! fail the process closed at startup rather than surfacing mid-conversation.

use std::str::FromStr;

use crate::diagnostic::ConfigError;
use crate::model::TriplineConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Check a parsed configuration for problems serde cannot see.
///
/// Every failed check lands in the returned `Vec`, so one run reports all
/// problems instead of stopping at the first.
pub fn validate_config(config: &TriplineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.agent.log_level
            ),
        });
    }

    if config.agent.dialogue_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "agent.dialogue_timeout_secs must be at least 1".to_string(),
        });
    }

    if config
        .telegram
        .bot_token
        .as_deref()
        .is_none_or(|t| t.trim().is_empty())
    {
        errors.push(ConfigError::MissingKey {
            key: "telegram.bot_token".to_string(),
        });
    }

    if config.telegram.allowed_chats.is_empty() {
        errors.push(ConfigError::Validation {
            message: "telegram.allowed_chats must list at least one chat id".to_string(),
        });
    }

    if config
        .extractor
        .api_key
        .as_deref()
        .is_none_or(|k| k.trim().is_empty())
    {
        errors.push(ConfigError::MissingKey {
            key: "extractor.api_key".to_string(),
        });
    }

    let base_url = config.extractor.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("extractor.base_url `{base_url}` must be an http(s) URL"),
        });
    }

    if config.extractor.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "extractor.model must not be empty".to_string(),
        });
    }

    if config
        .store
        .connection_string
        .as_deref()
        .is_none_or(|c| c.trim().is_empty())
    {
        errors.push(ConfigError::MissingKey {
            key: "store.connection_string".to_string(),
        });
    }

    if config.store.max_workers == 0 {
        errors.push(ConfigError::Validation {
            message: "store.max_workers must be at least 1".to_string(),
        });
    }

    if config.store.idle_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "store.idle_timeout_secs must be at least 1".to_string(),
        });
    }

    if chrono_tz::Tz::from_str(config.report.timezone.trim()).is_err() {
        errors.push(ConfigError::Validation {
            message: format!(
                "report.timezone `{}` is not a recognized IANA timezone",
                config.report.timezone
            ),
        });
    }

    if config.report.categories.is_empty() {
        errors.push(ConfigError::Validation {
            message: "report.categories must list at least one category code".to_string(),
        });
    }

    if config.report.areas.is_empty() {
        errors.push(ConfigError::Validation {
            message: "report.areas must list at least one area label".to_string(),
        });
    }

    if config.report.output_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "report.output_dir must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
