// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem-safe report filenames with collision handling.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use tripline_core::types::ResolvedPeriod;

static INDEX_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\s*-\s*").unwrap());
static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());
static SPECIAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static UNDERSCORE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

/// Rewrites one filename component: drops a leading `NN-` index, removes
/// parenthesized segments, and replaces characters filesystems reject
/// (plus whitespace) with underscores.
///
/// `"01-Thiruvottiyur(Area-1)"` becomes `"Thiruvottiyur"`.
pub fn sanitize_component(text: &str) -> String {
    let text = INDEX_PREFIX.replace(text, "");
    let text = PARENTHESIZED.replace_all(&text, "");
    let text = SPECIAL.replace_all(&text, "_");
    let text = WHITESPACE.replace_all(&text, "_");
    let text = UNDERSCORE_RUNS.replace_all(&text, "_");
    text.trim_matches('_').to_string()
}

/// The report filename for one (area, category) pair:
/// `{area}_{category}_{period label}.xlsx`.
pub fn report_filename(area: &str, category: &str, period: &ResolvedPeriod) -> String {
    format!(
        "{}_{}_{}.xlsx",
        sanitize_component(area),
        sanitize_component(category),
        period.label()
    )
}

/// First free path for `filename` inside `dir`, suffixing `-1`, `-2`, …
/// before the extension until no file is in the way.
pub fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let extension = Path::new(filename).extension().and_then(|s| s.to_str());

    let mut counter = 1u32;
    loop {
        let next = match extension {
            Some(ext) => format!("{stem}-{counter}.{ext}"),
            None => format!("{stem}-{counter}"),
        };
        let candidate = dir.join(next);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
