// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Natural-language period resolution.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use regex::Regex;
use serde::Deserialize;
use tripline_core::error::TriplineError;
use tripline_core::traits::ExtractionBackend;
use tripline_core::types::ResolvedPeriod;

use crate::strip_code_fences;

/// Token ceiling for period extraction responses.
const PERIOD_MAX_TOKENS: u32 = 150;

/// Prompt for the general rule. `{today}` is replaced per call so the
/// backend can resolve relative phrases.
const PERIOD_PROMPT: &str = r#"You resolve reporting period phrases into calendar date ranges. Today's date is {today} ({today_month}).

Return a JSON object with exactly these fields:
{"start_date": "YYYY-MM-DD", "end_date": "YYYY-MM-DD"}

Rules:
- "last month" is the full previous calendar month relative to today.
- A bare year like "2024" spans January 1 through December 31 of that year.
- A month with a year like "June 2024" spans that full calendar month.
- A range like "June 2024 to August 2024" spans the first day of the first month through the last day of the last month.
- Relative phrases like "past 30 days" count back from today.

Output the JSON object only."#;

static MONTH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\b",
    )
    .unwrap()
});

static YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

/// Last instant of a local day at microsecond resolution, matching the
/// precision of stored trip timestamps.
static DAY_END: LazyLock<NaiveTime> =
    LazyLock::new(|| NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap());

/// Wire shape of the backend's period JSON.
#[derive(Debug, Deserialize)]
struct PeriodPayload {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

/// Resolves free-text period phrases to timezone-anchored bounds.
///
/// A month named without a year ("June", "trips in August") resolves
/// locally to the most recent past-or-current occurrence of that month.
/// Everything else goes through the extraction backend with today's date
/// in the prompt, so relative phrases like "last month" land correctly.
pub struct PeriodResolver {
    backend: Arc<dyn ExtractionBackend>,
    tz: Tz,
}

impl PeriodResolver {
    pub fn new(backend: Arc<dyn ExtractionBackend>, tz: Tz) -> Self {
        Self { backend, tz }
    }

    /// Resolves `text` against `reference_now`.
    pub async fn resolve(
        &self,
        text: &str,
        reference_now: DateTime<Tz>,
    ) -> Result<ResolvedPeriod, TriplineError> {
        if let Some(month) = named_month(text) {
            if !YEAR_PATTERN.is_match(text) {
                return self.resolve_month_only(month, reference_now);
            }
        }
        self.resolve_via_backend(text, reference_now).await
    }

    fn resolve_month_only(
        &self,
        month: u32,
        reference_now: DateTime<Tz>,
    ) -> Result<ResolvedPeriod, TriplineError> {
        let year = if reference_now.month() < month {
            reference_now.year() - 1
        } else {
            reference_now.year()
        };
        let (first, last) = month_bounds(year, month).ok_or_else(|| TriplineError::Period {
            message: format!("no calendar bounds for {year}-{month:02}"),
        })?;
        let start = at_local(self.tz, first, NaiveTime::MIN)?;
        let end = at_local(self.tz, last, *DAY_END)?;
        ResolvedPeriod::new(start, end)
    }

    async fn resolve_via_backend(
        &self,
        text: &str,
        reference_now: DateTime<Tz>,
    ) -> Result<ResolvedPeriod, TriplineError> {
        let system = PERIOD_PROMPT
            .replace("{today}", &reference_now.format("%Y-%m-%d").to_string())
            .replace("{today_month}", &reference_now.format("%B %Y").to_string());
        let raw = self
            .backend
            .extract_json(&system, text, PERIOD_MAX_TOKENS)
            .await
            .map_err(|err| TriplineError::Period {
                message: format!("period extraction failed for '{text}': {err}"),
            })?;
        let payload: PeriodPayload =
            serde_json::from_str(strip_code_fences(&raw)).map_err(|e| TriplineError::Period {
                message: format!("period extractor returned unparseable JSON: {e}"),
            })?;

        let start_date = parse_date(payload.start_date.as_deref(), "start_date")?;
        let end_date = parse_date(payload.end_date.as_deref(), "end_date")?;
        let start = at_local(self.tz, start_date, NaiveTime::MIN)?;
        let end = at_local(self.tz, end_date, *DAY_END)?;
        ResolvedPeriod::new(start, end)
    }
}

/// Finds the first month name or abbreviation in `text`.
fn named_month(text: &str) -> Option<u32> {
    let token = MONTH_PATTERN.find(text)?.as_str().to_ascii_lowercase();
    let number = match &token[..3] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(number)
}

/// First and last calendar day of a month.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, TriplineError> {
    let value = value.ok_or_else(|| TriplineError::Period {
        message: format!("period extractor omitted {field}"),
    })?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| TriplineError::Period {
        message: format!("period extractor returned invalid {field} '{value}': {e}"),
    })
}

/// Localizes a naive date and time, taking the earlier side of DST folds.
fn at_local(tz: Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Tz>, TriplineError> {
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(dt, _) => Ok(dt),
        LocalResult::None => Err(TriplineError::Period {
            message: format!("{date} {time} does not exist in {tz}"),
        }),
    }
}
