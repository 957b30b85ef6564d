// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Period partitioning into day-length query windows.

use chrono::{Duration, Utc};

use tripline_core::types::{FetchWindow, ResolvedPeriod};

/// Splits a resolved period into contiguous half-open UTC windows of at
/// most one day.
///
/// The period's end is inclusive at microsecond precision, so the exclusive
/// bound sits 1 µs past it. With the store's millisecond timestamps this
/// admits exactly the instants up to the period's last microsecond and
/// never the following midnight. Windows are disjoint and exhaustive; the
/// final one is truncated to the bound.
pub fn partition_windows(period: &ResolvedPeriod) -> Vec<FetchWindow> {
    let start = period.start.with_timezone(&Utc);
    let bound = period.end.with_timezone(&Utc) + Duration::microseconds(1);

    let mut windows = Vec::new();
    let mut current = start;
    while current < bound {
        let next = (current + Duration::days(1)).min(bound);
        windows.push(FetchWindow {
            start: current,
            end: next,
        });
        current = next;
    }
    windows
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
        let end = Kolkata.with_ymd_and_hms(y2, m2, d2, 23, 59, 59).unwrap()
            + Duration::microseconds(999_999);
        ResolvedPeriod::new(start, end).unwrap()
    }

    #[test]
    fn single_day_period_yields_one_full_day_window() {
        let windows = partition_windows(&period((2024, 6, 1), (2024, 6, 1)));
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].end - windows[0].start, Duration::days(1));
    }

    #[test]
    fn bound_lands_exactly_on_the_next_local_midnight() {
        let windows = partition_windows(&period((2024, 6, 1), (2024, 6, 1)));
        let next_midnight = Kolkata
            .with_ymd_and_hms(2024, 6, 2, 0, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(windows[0].end, next_midnight);
    }

    #[test]
    fn month_partitions_into_contiguous_day_windows() {
        let june = period((2024, 6, 1), (2024, 6, 30));
        let windows = partition_windows(&june);
        assert_eq!(windows.len(), 30);
        assert_eq!(windows[0].start, june.start.with_timezone(&Utc));
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        let last = windows.last().unwrap();
        assert_eq!(
            last.end,
            june.end.with_timezone(&Utc) + Duration::microseconds(1)
        );
    }

    #[test]
    fn partial_final_day_is_truncated() {
        let start = Kolkata.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let end = Kolkata.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        let short = ResolvedPeriod::new(start, end).unwrap();

        let windows = partition_windows(&short);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].end - windows[0].start, Duration::days(1));
        assert_eq!(
            windows[1].end - windows[1].start,
            Duration::hours(12) + Duration::microseconds(1)
        );
    }

    #[test]
    fn cross_month_period_covers_every_day() {
        let windows = partition_windows(&period((2024, 6, 15), (2024, 8, 14)));
        // 16 June days + 31 July days + 14 August days.
        assert_eq!(windows.len(), 61);
    }
}
