// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out of a complete request into per-(area, category) reports.
//!
//! Category and area selections expand against the configured lists,
//! then every pair is fetched, written to a workbook, and delivered in
//! sequence. A failing pair is logged and skipped; the run closes with
//! a summary (or no-data) message either way.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use tripline_core::error::TriplineError;
use tripline_core::traits::ReportChannel;
use tripline_core::types::{ALL_SENTINEL, Intent, ResolvedPeriod, RunSummary};
use tripline_report::ReportEngine;
use tripline_report::filename::{report_filename, unique_path};
use tripline_report::workbook::write_workbook;
use tripline_resilience::RetryPolicy;

/// Generates and delivers every report a request asks for.
pub struct ReportOrchestrator {
    engine: ReportEngine,
    channel: Arc<dyn ReportChannel>,
    delivery_retry: RetryPolicy,
    report_retry: RetryPolicy,
    categories: Vec<String>,
    areas: Vec<String>,
    output_dir: PathBuf,
}

impl ReportOrchestrator {
    pub fn new(
        engine: ReportEngine,
        channel: Arc<dyn ReportChannel>,
        categories: Vec<String>,
        areas: Vec<String>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            engine,
            channel,
            delivery_retry: RetryPolicy::delivery(),
            report_retry: RetryPolicy::report_io(),
            categories,
            areas,
            output_dir,
        }
    }

    /// Runs one complete request against the report pipeline.
    ///
    /// Returns the delivered totals. `Err` means the request could not
    /// even be announced; individual pair failures only log and skip.
    pub async fn run(
        &self,
        chat_id: i64,
        intent: &Intent,
        period: &ResolvedPeriod,
    ) -> Result<RunSummary, TriplineError> {
        let requested_areas = display_list(&intent.areas);
        let requested_categories = display_list(&intent.categories);
        info!(
            chat_id,
            areas = %requested_areas,
            categories = %requested_categories,
            start = %period.start.format("%Y-%m-%d"),
            end = %period.end.format("%Y-%m-%d"),
            "starting report run"
        );

        let Some(categories) = expand_selection(&intent.categories, &self.categories) else {
            warn!(chat_id, requested = %requested_categories, "no requested category is configured");
            let message = format!(
                "No valid categories found. Available categories: {}",
                self.categories.join(", ")
            );
            self.channel.send_text(chat_id, &message).await?;
            return Ok(RunSummary::default());
        };
        let Some(areas) = expand_selection(&intent.areas, &self.areas) else {
            warn!(chat_id, requested = %requested_areas, "no requested area is configured");
            let message = format!(
                "No valid areas found. Available areas: {} areas",
                self.areas.len()
            );
            self.channel.send_text(chat_id, &message).await?;
            return Ok(RunSummary::default());
        };

        let label = period.label();
        let mut summary = RunSummary::default();
        for area in &areas {
            for category in &categories {
                if let Err(err) = self
                    .deliver_pair(chat_id, area, category, period, &label, &mut summary)
                    .await
                {
                    error!(
                        chat_id,
                        area = %area,
                        category = %category,
                        error = %err,
                        "failed to process report pair"
                    );
                }
            }
        }

        let closing = if summary.files == 0 {
            format!(
                "No trip data found for areas {requested_areas}, categories {requested_categories} for the specified period."
            )
        } else {
            format!(
                "✅ Processed {files} file(s) with total {trips} trips\nAreas: {requested_areas}\nCategories: {requested_categories}",
                files = summary.files,
                trips = summary.trips,
            )
        };
        if let Err(err) = self.channel.send_text(chat_id, &closing).await {
            warn!(chat_id, error = %err, "failed to send run summary");
        }

        info!(chat_id, files = summary.files, trips = summary.trips, "report run finished");
        Ok(summary)
    }

    /// Fetches, writes, and delivers one (area, category) report.
    ///
    /// Empty pairs deliver nothing and succeed. The workbook is removed
    /// after a successful hand-off to the channel.
    async fn deliver_pair(
        &self,
        chat_id: i64,
        area: &str,
        category: &str,
        period: &ResolvedPeriod,
        label: &str,
        summary: &mut RunSummary,
    ) -> Result<(), TriplineError> {
        let table = self.engine.fetch(area, category, period).await?;
        if table.is_empty() {
            debug!(area, category, "no trips for pair");
            return Ok(());
        }
        let trips = table.trip_count();

        let path = unique_path(&self.output_dir, &report_filename(area, category, period));
        self.report_retry
            .run(|| std::future::ready(write_workbook(&table, &path)))
            .await?;

        let title = format!("{area} - {category} Trip Details for {label}");
        let message = format!("{title}\nTotal Trips: {trips}");
        self.delivery_retry
            .run(|| self.channel.send_text(chat_id, &message))
            .await?;
        self.delivery_retry
            .run(|| self.channel.send_document(chat_id, &path, &title))
            .await?;

        summary.files += 1;
        summary.trips += trips;
        info!(chat_id, area, category, trips, "report delivered");

        if let Err(err) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %err, "failed to remove delivered report");
        }
        Ok(())
    }
}

/// Maps a requested selection onto the configured list.
///
/// Empty and all-sentinel requests select everything. Otherwise names
/// match case-insensitively, come back in configured casing without
/// duplicates, and unknown names drop with a warning. `None` means
/// nothing requested survived.
fn expand_selection(requested: &[String], configured: &[String]) -> Option<Vec<String>> {
    let wants_all = requested.is_empty()
        || requested.iter().any(|r| r.eq_ignore_ascii_case(ALL_SENTINEL));
    if wants_all {
        return Some(configured.to_vec());
    }

    let mut selected: Vec<String> = Vec::new();
    for request in requested {
        let Some(canonical) = configured.iter().find(|c| c.eq_ignore_ascii_case(request)) else {
            warn!(requested = %request, "requested name is not configured, skipping");
            continue;
        };
        if !selected.contains(canonical) {
            selected.push(canonical.clone());
        }
    }
    if selected.is_empty() { None } else { Some(selected) }
}

/// Joined display of a requested list; an empty list reads as "all".
fn display_list(values: &[String]) -> String {
    if values.is_empty() {
        ALL_SENTINEL.to_string()
    } else {
        values.join(", ")
    }
}
