// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed configuration schema.
//!
//! Every struct carries `#[serde(deny_unknown_fields)]`: a misspelled key
//! fails the load instead of being silently dropped, which is what feeds
//! the typo suggestions in [`crate::diagnostic`].

use serde::{Deserialize, Serialize};

/// Root of the configuration tree.
///
/// Every section may be absent at parse time; required credentials are
/// enforced by the validation pass, which fails the process closed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TriplineConfig {
    /// Agent behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram channel settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Extraction backend (LLM API) settings.
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Trip store (MongoDB) settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Report vocabulary and output settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Agent behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds an unanswered slot-filling conversation survives before eviction.
    #[serde(default = "default_dialogue_timeout_secs")]
    pub dialogue_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dialogue_timeout_secs: default_dialogue_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dialogue_timeout_secs() -> u64 {
    600
}

/// Telegram channel configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required; validation fails without it.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Chat ids (groups or DMs) allowed to use the bot. Messages from any
    /// other chat are dropped silently. Required non-empty.
    #[serde(default)]
    pub allowed_chats: Vec<i64>,
}

/// Extraction backend configuration (OpenAI-compatible chat completions API).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractorConfig {
    /// API key. Required; validation fails without it.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the completions API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for both intent extraction and period resolution.
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.llm7.io/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

/// Trip store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// MongoDB connection string. Required; validation fails without it.
    #[serde(default)]
    pub connection_string: Option<String>,

    /// Single concurrency knob: caps both the driver connection pool and the
    /// number of day windows queried per batch.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Seconds of store inactivity before the idle watcher closes the client.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            max_workers: default_max_workers(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

fn default_max_workers() -> usize {
    500
}

fn default_idle_timeout_secs() -> u64 {
    300
}

/// Report vocabulary and output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// IANA timezone name anchoring period bounds and rendered trip times.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Recognized trip category codes.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Recognized area labels, in match-priority order.
    #[serde(default = "default_areas")]
    pub areas: Vec<String>,

    /// Directory spreadsheets are written to before upload.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            categories: default_categories(),
            areas: default_areas(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_categories() -> Vec<String> {
    ["MC", "JR", "PS", "DFW"].map(String::from).to_vec()
}

fn default_areas() -> Vec<String> {
    [
        "01-Thiruvottiyur(Area-1)",
        "02-Manali(Area-2)",
        "03-Madhavaram(Area-3)",
        "04-Tondiarpet(Area-4)",
        "05-Royapuram(Area-5)",
        "06-Thiru-Vi-Ka-Nagar(Area-6)",
        "07-Ambattur(Area-7)",
        "08-Anna Nagar(Area-8)",
        "09-Teynampet(Area-9)",
        "10-Kodambakkam(Area-10)",
        "11-Valasaravakkam(Area-11)",
        "12-Alandur(Area-12)",
        "13-Adyar(Area-13)",
        "14-Perungudi(Area-14)",
        "15-Sholinganallur(Area-15)",
    ]
    .map(String::from)
    .to_vec()
}

fn default_output_dir() -> String {
    dirs::cache_dir()
        .map(|p| p.join("tripline").join("reports"))
        .unwrap_or_else(|| std::path::PathBuf::from("reports"))
        .to_string_lossy()
        .into_owned()
}
