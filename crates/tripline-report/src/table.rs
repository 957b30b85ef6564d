// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The in-memory report table: joined facts projected onto the canonical
//! column order.

use tripline_core::types::{CellValue, Column, FactRecord};

/// One fact paired with its joined area, if any.
#[derive(Debug, Clone)]
pub(crate) struct JoinedFact {
    pub fact: FactRecord,
    pub area: Option<String>,
}

impl JoinedFact {
    /// The cell this row contributes to `column`. The area comes from the
    /// dimension join; everything else from the fact.
    fn cell(&self, column: Column) -> Option<CellValue> {
        match column {
            Column::Area => self.area.clone().map(CellValue::Text),
            other => self.fact.cell(other),
        }
    }
}

/// A rectangular report ready for the workbook writer.
///
/// Columns keep the canonical order but only appear when at least one row
/// has a value for them, so sparse sources produce narrow sheets instead
/// of blank columns.
#[derive(Debug, Clone)]
pub struct ReportTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Option<CellValue>>>,
}

impl ReportTable {
    /// A table with no rows and no columns.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Projects joined rows onto the canonical column order, dropping
    /// columns where every cell is absent.
    pub(crate) fn from_joined(rows: &[JoinedFact]) -> Self {
        let columns: Vec<Column> = Column::ALL
            .into_iter()
            .filter(|column| rows.iter().any(|row| row.cell(*column).is_some()))
            .collect();
        let rows = rows
            .iter()
            .map(|row| columns.iter().map(|column| row.cell(*column)).collect())
            .collect();
        Self { columns, rows }
    }

    /// Number of trips (data rows) in the table.
    pub fn trip_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
