// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Styled xlsx rendering of a report table.

use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use tracing::debug;

use tripline_core::error::TriplineError;
use tripline_core::types::CellValue;

use crate::table::ReportTable;

const SHEET_NAME: &str = "Trip_Details";

/// Minimum column width in character units.
const MIN_COLUMN_WIDTH: f64 = 8.0;

/// Writes `table` to `path` as a single-sheet workbook.
///
/// Every cell, header and data alike, carries thin borders and centered
/// alignment; the header row is frozen; column widths track the longest
/// rendered value. Absent cells are written as formatted blanks so the
/// border grid stays unbroken.
pub fn write_workbook(table: &ReportTable, path: &Path) -> Result<(), TriplineError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(report_error)?;

    let format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    for (col, column) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, column.header(), &format)
            .map_err(report_error)?;
    }

    for (row, cells) in table.rows.iter().enumerate() {
        let row = row as u32 + 1;
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                Some(CellValue::Text(text)) => {
                    worksheet
                        .write_string_with_format(row, col, text, &format)
                        .map_err(report_error)?;
                }
                Some(CellValue::Number(value)) => {
                    worksheet
                        .write_number_with_format(row, col, *value, &format)
                        .map_err(report_error)?;
                }
                None => {
                    worksheet.write_blank(row, col, &format).map_err(report_error)?;
                }
            }
        }
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        worksheet
            .set_column_width(col as u16, width)
            .map_err(report_error)?;
    }
    worksheet.set_freeze_panes(1, 0).map_err(report_error)?;

    workbook.save(path).map_err(report_error)?;
    debug!(path = %path.display(), rows = table.trip_count(), "workbook written");
    Ok(())
}

/// Width per column: 1.2 times the longest rendered cell (header included),
/// floored at [`MIN_COLUMN_WIDTH`].
fn column_widths(table: &ReportTable) -> Vec<f64> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let mut longest = column.header().len();
            for row in &table.rows {
                if let Some(cell) = &row[index] {
                    longest = longest.max(cell.to_string().len());
                }
            }
            (longest as f64 * 1.2).max(MIN_COLUMN_WIDTH)
        })
        .collect()
}

fn report_error(err: XlsxError) -> TriplineError {
    TriplineError::Report {
        message: "workbook write failed".into(),
        source: Some(Box::new(err)),
    }
}
