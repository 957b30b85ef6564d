// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rich diagnostics for configuration failures.
//!
//! Figment reports deserialization problems as flat messages. This module
//! lifts them into miette diagnostics: an unknown key gets a span into the
//! TOML file it came from, the list of keys its section accepts, and a
//! Jaro-Winkler suggestion when a valid key is close enough to be a typo.

#![allow(unused_assignments)] // the Diagnostic derive expands to code that trips this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a valid key must beat before it is offered as a
/// correction. 0.75 accepts slips like `bot_tokn` for `bot_token` and
/// `max_wokers` for `max_workers` without matching unrelated keys.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, carrying whatever context miette needs to
/// point at the offending line.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key no section of the schema accepts.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(tripline::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The key as written in the source.
        key: String,
        /// Closest valid key, when one clears the similarity threshold.
        suggestion: Option<String>,
        /// Comma-separated keys the section accepts.
        valid_keys: String,
        /// Position of the key in the TOML source.
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        /// Content of the file the span points into.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that deserialized to the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(
        code(tripline::config::invalid_type),
        help("expected {expected}")
    )]
    InvalidType {
        /// Dotted path of the offending key.
        key: String,
        /// What was found versus what was wanted.
        detail: String,
        /// The type the schema wants.
        expected: String,
        /// Position of the value in the TOML source.
        #[label("mismatched value type")]
        span: Option<SourceSpan>,
        /// Content of the file the span points into.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key the schema requires but no source provided.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(tripline::config::missing_key),
        help("add `{key} = <value>` to tripline.toml or export the matching TRIPLINE_* variable")
    )]
    MissingKey {
        /// The missing key name.
        key: String,
    },

    /// A value that parsed fine but failed a semantic check.
    #[error("validation error: {message}")]
    #[diagnostic(code(tripline::config::validation))]
    Validation {
        /// What the check rejected.
        message: String,
    },

    /// Anything figment reports that has no richer mapping.
    #[error("configuration error: {0}")]
    #[diagnostic(code(tripline::config::other))]
    Other(String),
}

/// Help text for an unknown key: the suggestion first when there is one,
/// the accepted keys either way.
fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(best) => format!("did you mean `{best}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Expand a `figment::Error` into one diagnostic per underlying failure.
///
/// Figment chains every problem it found behind a single error value;
/// iterating it walks the chain. Unknown keys are additionally resolved
/// against `toml_sources` (path and content pairs of the loaded files) so
/// miette can underline the offending line.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| classify(error, toml_sources))
        .collect()
}

fn classify(error: figment::Error, toml_sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    match &error.kind {
        Kind::UnknownField(field, accepted) => {
            unknown_field(&error, field, accepted, toml_sources)
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.to_string(),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: error.path.join("."),
            detail: format!("found {actual}, expected {expected}"),
            expected: expected.clone(),
            span: None,
            src: None,
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

fn unknown_field(
    error: &figment::Error,
    field: &str,
    accepted: &[&str],
    toml_sources: &[(String, String)],
) -> ConfigError {
    let (span, src) = locate_key(error, field, toml_sources).unzip();

    ConfigError::UnknownKey {
        key: field.to_string(),
        suggestion: suggest_key(field, accepted),
        valid_keys: accepted.join(", "),
        span,
        src,
    }
}

/// Resolve an unknown key to a span inside one of the loaded TOML files.
///
/// Needs figment's metadata to name a file and that file to be present in
/// `toml_sources`; errors from env vars or defaults have neither.
fn locate_key(
    error: &figment::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let source = error.metadata.as_ref()?.source.as_ref()?;
    let figment::Source::File(path) = source else {
        return None;
    };
    let path = path.display().to_string();

    let (name, content) = toml_sources.iter().find(|(p, _)| *p == path)?;
    let offset = find_key_offset(content, &error.path, field)?;

    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `field` in `content`, scoped to the section `path` names.
///
/// With `path = ["telegram"]` the scan starts after the `[telegram]`
/// header; with an empty path it starts at the top of the file. Only a
/// line that opens with the field name followed by `=` or whitespace
/// counts, so values that merely contain the name are skipped.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut cursor = start;
    for line in content[start..].lines() {
        let key = line.trim_start();
        let indent = line.len() - key.len();
        if let Some(rest) = key.strip_prefix(field) {
            if rest.starts_with(['=', ' ', '\t']) {
                return Some(cursor + indent);
            }
        }
        cursor += line.len() + 1;
    }

    None
}

/// Pick the valid key closest to `unknown` by Jaro-Winkler similarity.
///
/// Returns `None` when nothing clears [`SUGGESTION_THRESHOLD`].
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Print every diagnostic to stderr through miette's graphical renderer.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("{error}"),
        }
    }
}
