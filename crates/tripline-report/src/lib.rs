// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report generation for the Tripline agent: windowed trip fetch with
//! bounded concurrency, station-area dimension join, and styled xlsx
//! output.
//!
//! [`ReportEngine`] turns one (area, category, period) request into a
//! [`ReportTable`]; [`workbook::write_workbook`] renders the table to disk
//! under a name from [`filename::report_filename`].

pub mod filename;
pub mod pipeline;
pub mod table;
pub mod window;
pub mod workbook;

pub use pipeline::ReportEngine;
pub use table::ReportTable;
