//! `DayCounter` trait and the actual-day conventions.
//!
//! A day counter computes the fraction of a year between two dates; the
//! process parameters use it to turn valuation and maturity dates into the
//! lattice horizon.

use bt_core::{Real, Time};
use chrono::NaiveDate;

/// A convention for counting the fraction of a year between two dates.
pub trait DayCounter: std::fmt::Debug + Send + Sync {
    /// Human-readable name of this convention (e.g. `"Actual/365 (Fixed)"`).
    fn name(&self) -> &str;

    /// Number of days between `d1` and `d2` according to this convention.
    fn day_count(&self, d1: NaiveDate, d2: NaiveDate) -> i64 {
        (d2 - d1).num_days()
    }

    /// Fraction of a year between `d1` and `d2`.
    fn year_fraction(&self, d1: NaiveDate, d2: NaiveDate) -> Time;
}

/// Actual/365 (Fixed) day counter.
///
/// `year_fraction = actual_days / 365`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actual365Fixed;

impl DayCounter for Actual365Fixed {
    fn name(&self) -> &str {
        "Actual/365 (Fixed)"
    }

    fn year_fraction(&self, d1: NaiveDate, d2: NaiveDate) -> Time {
        self.day_count(d1, d2) as Real / 365.0
    }
}

/// Actual/360 day counter.
///
/// `year_fraction = actual_days / 360`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actual360;

impl DayCounter for Actual360 {
    fn name(&self) -> &str {
        "Actual/360"
    }

    fn year_fraction(&self, d1: NaiveDate, d2: NaiveDate) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn actual365_fixed() {
        let dc = Actual365Fixed;
        assert_eq!(dc.day_count(date(2023, 1, 1), date(2024, 1, 1)), 365);
        assert_abs_diff_eq!(
            dc.year_fraction(date(2023, 1, 1), date(2024, 1, 1)),
            1.0,
            epsilon = 1e-15
        );
    }

    #[test]
    fn actual365_fixed_over_leap_year() {
        let dc = Actual365Fixed;
        // 2017-01-08 → 2018-02-05 is 393 days.
        let t = dc.year_fraction(date(2017, 1, 8), date(2018, 2, 5));
        assert_abs_diff_eq!(t, 393.0 / 365.0, epsilon = 1e-15);
    }

    #[test]
    fn actual360() {
        let dc = Actual360;
        let t = dc.year_fraction(date(2023, 1, 1), date(2023, 7, 1));
        assert_abs_diff_eq!(t, 181.0 / 360.0, epsilon = 1e-15);
        assert_eq!(dc.name(), "Actual/360");
    }

    #[test]
    fn negative_interval() {
        let dc = Actual365Fixed;
        assert_eq!(dc.day_count(date(2024, 1, 10), date(2024, 1, 1)), -9);
    }
}
