// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the trait seams and the Tripline pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::TriplineError;

/// Sentinel value meaning "every configured category" or "every configured area".
pub const ALL_SENTINEL: &str = "all";

/// One normalized inbound chat message.
///
/// Produced by a channel adapter after authorization and mention stripping;
/// everything past this point assumes an allowed chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Chat the message arrived in (group or DM).
    pub chat_id: i64,
    /// Sender account, when the platform exposes one.
    pub sender_id: Option<i64>,
    pub text: String,
}

/// Structured request extracted from a free-text query.
///
/// `categories`/`areas` hold either explicit values or the single
/// [`ALL_SENTINEL`] entry. `has_period`/`has_area` record whether the user
/// actually supplied those slots; the dialogue layer asks for whatever is
/// missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub categories: Vec<String>,
    pub areas: Vec<String>,
    pub period_text: Option<String>,
    pub has_period: bool,
    pub has_area: bool,
    pub all_categories: bool,
    pub all_areas: bool,
}

impl Intent {
    /// Enforces the cross-field invariants, returning the cleaned-up intent.
    ///
    /// - `categories`/`areas` behave as ordered sets: duplicates drop,
    ///   first occurrence wins.
    /// - "all" collapse: an all-flag or a literal `"all"` entry forces the
    ///   flag true and the list to exactly `["all"]`.
    /// - `has_period` false clears `period_text`; a missing or blank
    ///   `period_text` clears `has_period`.
    /// - `has_area` cannot hold without areas (or the all flag).
    ///
    /// Idempotent: normalizing a normalized intent is a no-op.
    pub fn normalized(mut self) -> Self {
        dedup_in_order(&mut self.categories);
        dedup_in_order(&mut self.areas);
        if self.all_categories
            || self.categories.iter().any(|c| c.eq_ignore_ascii_case(ALL_SENTINEL))
        {
            self.all_categories = true;
            self.categories = vec![ALL_SENTINEL.to_string()];
        }
        if self.all_areas || self.areas.iter().any(|a| a.eq_ignore_ascii_case(ALL_SENTINEL)) {
            self.all_areas = true;
            self.areas = vec![ALL_SENTINEL.to_string()];
        }
        if !self.has_period {
            self.period_text = None;
        } else if self.period_text.as_deref().is_none_or(|p| p.trim().is_empty()) {
            self.period_text = None;
            self.has_period = false;
        }
        if !self.all_areas && self.areas.is_empty() {
            self.has_area = false;
        }
        self
    }
}

/// Drops duplicate entries, keeping the first occurrence of each.
fn dedup_in_order(values: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    values.retain(|v| seen.insert(v.clone()));
}

/// A period resolved to concrete timezone-anchored bounds.
///
/// `start` is the first instant of the range (00:00:00), `end` the last
/// (23:59:59.999999, matching the store's sub-second precision ceiling).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl ResolvedPeriod {
    /// Builds a period, rejecting inverted bounds.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self, TriplineError> {
        if start > end {
            return Err(TriplineError::Period {
                message: format!("period start {start} is after end {end}"),
            });
        }
        Ok(Self { start, end })
    }

    /// Filename / caption segment: `Jun_2024`, or `Jun_2024_to_Aug_2024`
    /// when the bounds fall in different months.
    pub fn label(&self) -> String {
        let start = self.start.format("%b_%Y").to_string();
        let end = self.end.format("%b_%Y").to_string();
        if start == end {
            start
        } else {
            format!("{start}_to_{end}")
        }
    }
}

/// One half-open `[start, end)` day-length query window in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One spreadsheet cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// The canonical report columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    TripId,
    VehicleNumber,
    TripCategory,
    TripStatus,
    TripStartTime,
    TripEndTime,
    Area,
    DispensedQuantity,
    FillingStationName,
    FillingStationId,
    FillingQuantity,
    CardQuantity,
    CmcNumber,
    CustomerName,
    CustomerAddress,
}

impl Column {
    /// Every column, in the order reports emit them.
    pub const ALL: [Column; 15] = [
        Column::TripId,
        Column::VehicleNumber,
        Column::TripCategory,
        Column::TripStatus,
        Column::TripStartTime,
        Column::TripEndTime,
        Column::Area,
        Column::DispensedQuantity,
        Column::FillingStationName,
        Column::FillingStationId,
        Column::FillingQuantity,
        Column::CardQuantity,
        Column::CmcNumber,
        Column::CustomerName,
        Column::CustomerAddress,
    ];

    /// The spreadsheet header for this column.
    pub fn header(&self) -> &'static str {
        match self {
            Column::TripId => "Trip_Id",
            Column::VehicleNumber => "Vehicle_Number",
            Column::TripCategory => "Trip_Category",
            Column::TripStatus => "Trip_Status",
            Column::TripStartTime => "Trip_Start_Time",
            Column::TripEndTime => "Trip_End_Time",
            Column::Area => "Area",
            Column::DispensedQuantity => "Dispensed_Quantity",
            Column::FillingStationName => "Filling_Station_Name",
            Column::FillingStationId => "Filling_Station_Id",
            Column::FillingQuantity => "Filling_Quantity",
            Column::CardQuantity => "Card_Quantity",
            Column::CmcNumber => "CMC_Number",
            Column::CustomerName => "Customer_Name",
            Column::CustomerAddress => "Customer_Address",
        }
    }
}

/// One completed-trip fact row as fetched from the store.
///
/// Every field is optional: source documents are uneven, and absent fields
/// become blank cells. Start/end times arrive pre-rendered in the report
/// timezone. The `Area` column is not part of the fact; it joins in from the
/// station dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactRecord {
    pub trip_id: Option<String>,
    pub vehicle_number: Option<String>,
    pub trip_category: Option<String>,
    pub trip_status: Option<String>,
    pub trip_start_time: Option<String>,
    pub trip_end_time: Option<String>,
    pub dispensed_quantity: Option<f64>,
    pub filling_station_name: Option<String>,
    pub filling_station_id: Option<String>,
    pub filling_quantity: Option<f64>,
    pub card_quantity: Option<f64>,
    pub cmc_number: Option<String>,
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
}

impl FactRecord {
    /// The cell this fact contributes to `column`, if any.
    pub fn cell(&self, column: Column) -> Option<CellValue> {
        match column {
            Column::TripId => self.trip_id.clone().map(CellValue::Text),
            Column::VehicleNumber => self.vehicle_number.clone().map(CellValue::Text),
            Column::TripCategory => self.trip_category.clone().map(CellValue::Text),
            Column::TripStatus => self.trip_status.clone().map(CellValue::Text),
            Column::TripStartTime => self.trip_start_time.clone().map(CellValue::Text),
            Column::TripEndTime => self.trip_end_time.clone().map(CellValue::Text),
            Column::DispensedQuantity => self.dispensed_quantity.map(CellValue::Number),
            Column::Area => None,
            Column::FillingStationName => {
                self.filling_station_name.clone().map(CellValue::Text)
            }
            Column::FillingStationId => self.filling_station_id.clone().map(CellValue::Text),
            Column::FillingQuantity => self.filling_quantity.map(CellValue::Number),
            Column::CardQuantity => self.card_quantity.map(CellValue::Number),
            Column::CmcNumber => self.cmc_number.clone().map(CellValue::Text),
            Column::CustomerName => self.customer_name.clone().map(CellValue::Text),
            Column::CustomerAddress => self.customer_address.clone().map(CellValue::Text),
        }
    }
}

/// One station row from the area dimension table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionRecord {
    pub station_id: String,
    pub area: Option<String>,
}

/// Outcome of one orchestrator run, for the trailing summary message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: usize,
    pub trips: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Kolkata;

    fn period(
        (y1, m1, d1): (i32, u32, u32),
        (y2, m2, d2): (i32, u32, u32),
    ) -> ResolvedPeriod {
        let start = Kolkata.with_ymd_and_hms(y1, m1, d1, 0, 0, 0).unwrap();
        let end = Kolkata.with_ymd_and_hms(y2, m2, d2, 23, 59, 59).unwrap();
        ResolvedPeriod::new(start, end).unwrap()
    }

    #[test]
    fn normalize_collapses_all_sentinel_in_list() {
        let intent = Intent {
            categories: vec!["MC".into(), "all".into()],
            areas: vec!["ALL".into()],
            has_area: true,
            ..Intent::default()
        }
        .normalized();

        assert!(intent.all_categories);
        assert_eq!(intent.categories, vec!["all"]);
        assert!(intent.all_areas);
        assert_eq!(intent.areas, vec!["all"]);
        assert!(intent.has_area);
    }

    #[test]
    fn normalize_collapses_all_flag_without_sentinel() {
        let intent = Intent {
            categories: vec!["MC".into(), "JR".into()],
            all_categories: true,
            ..Intent::default()
        }
        .normalized();

        assert_eq!(intent.categories, vec!["all"]);
    }

    #[test]
    fn normalize_dedups_preserving_order() {
        let intent = Intent {
            categories: vec!["MC".into(), "JR".into(), "MC".into()],
            areas: vec!["A".into(), "A".into(), "B".into()],
            has_area: true,
            ..Intent::default()
        }
        .normalized();

        assert_eq!(intent.categories, vec!["MC", "JR"]);
        assert_eq!(intent.areas, vec!["A", "B"]);
    }

    #[test]
    fn normalize_clears_period_text_when_flag_unset() {
        let intent = Intent {
            period_text: Some("June 2024".into()),
            has_period: false,
            ..Intent::default()
        }
        .normalized();

        assert!(intent.period_text.is_none());
        assert!(!intent.has_period);
    }

    #[test]
    fn normalize_clears_flag_when_period_text_blank() {
        let intent = Intent {
            period_text: Some("   ".into()),
            has_period: true,
            ..Intent::default()
        }
        .normalized();

        assert!(intent.period_text.is_none());
        assert!(!intent.has_period);
    }

    #[test]
    fn normalize_clears_has_area_without_areas() {
        let intent = Intent {
            has_area: true,
            ..Intent::default()
        }
        .normalized();

        assert!(!intent.has_area);
    }

    #[test]
    fn normalize_is_idempotent() {
        let intent = Intent {
            categories: vec!["all".into(), "MC".into()],
            areas: vec!["01-Thiruvottiyur(Area-1)".into()],
            period_text: Some("last month".into()),
            has_period: true,
            has_area: true,
            all_categories: false,
            all_areas: false,
        };
        let once = intent.normalized();
        let twice = once.clone().normalized();
        assert_eq!(once, twice);
    }

    #[test]
    fn resolved_period_rejects_inverted_bounds() {
        let start = Kolkata.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let end = Kolkata.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap();
        assert!(matches!(
            ResolvedPeriod::new(start, end),
            Err(TriplineError::Period { .. })
        ));
    }

    #[test]
    fn label_single_month() {
        assert_eq!(period((2024, 6, 1), (2024, 6, 30)).label(), "Jun_2024");
    }

    #[test]
    fn label_spanning_months() {
        assert_eq!(
            period((2024, 6, 1), (2024, 8, 31)).label(),
            "Jun_2024_to_Aug_2024"
        );
    }

    #[test]
    fn label_same_month_different_year() {
        assert_eq!(
            period((2023, 6, 1), (2024, 6, 30)).label(),
            "Jun_2023_to_Jun_2024"
        );
    }

    #[test]
    fn fact_cell_covers_every_column() {
        let fact = FactRecord {
            trip_id: Some("T-1".into()),
            vehicle_number: Some("TN01AB1234".into()),
            trip_category: Some("MC".into()),
            trip_status: Some("COMPLETED".into()),
            trip_start_time: Some("2024-06-01 08:00:00".into()),
            trip_end_time: Some("2024-06-01 09:30:00".into()),
            dispensed_quantity: Some(120.5),
            filling_station_name: Some("Station A".into()),
            filling_station_id: Some("FS-01".into()),
            filling_quantity: Some(118.0),
            card_quantity: Some(2.0),
            cmc_number: Some("CMC-9".into()),
            customer_name: Some("Acme".into()),
            customer_address: Some("12 Main St".into()),
        };

        for column in Column::ALL {
            if column == Column::Area {
                assert_eq!(fact.cell(column), None, "Area joins in from the dimension");
            } else {
                assert!(fact.cell(column).is_some(), "missing cell for {column:?}");
            }
        }
    }

    #[test]
    fn quantity_cells_are_numbers() {
        let fact = FactRecord {
            dispensed_quantity: Some(42.0),
            ..FactRecord::default()
        };
        assert_eq!(
            fact.cell(Column::DispensedQuantity),
            Some(CellValue::Number(42.0))
        );
    }

    #[test]
    fn column_headers_match_report_contract() {
        let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
        assert_eq!(
            headers,
            vec![
                "Trip_Id",
                "Vehicle_Number",
                "Trip_Category",
                "Trip_Status",
                "Trip_Start_Time",
                "Trip_End_Time",
                "Area",
                "Dispensed_Quantity",
                "Filling_Station_Name",
                "Filling_Station_Id",
                "Filling_Quantity",
                "Card_Quantity",
                "CMC_Number",
                "Customer_Name",
                "Customer_Address",
            ]
        );
    }
}
