//! Calendar-month billing periods.
//!
//! Usage counters are keyed by period, so a new month starts from zero
//! without anything having to reset them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::MeiError;

/// A billing period: one calendar month (UTC).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BillingPeriod {
    // Always the first day of the month.
    start: NaiveDate,
}

impl BillingPeriod {
    /// Create the period for `year`/`month`.
    ///
    /// # Errors
    ///
    /// Returns `MeiError::InvalidArgument` if the month is not in `1..=12` or the
    /// year is outside the supported calendar range.
    pub fn new(year: i32, month: u32) -> crate::Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|start| Self { start })
            .ok_or_else(|| {
                MeiError::invalid_argument("period", format!("no such month: {year}-{month:02}"))
            })
    }

    /// The period containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            start: date.with_day0(0).unwrap_or(date),
        }
    }

    /// The period containing the instant `at`.
    #[must_use]
    pub fn at(at: DateTime<Utc>) -> Self {
        Self::containing(at.date_naive())
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Calendar month, `1..=12`.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// First day of the period.
    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.start
    }

    /// First day of the following period.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    /// The following period.
    #[must_use]
    pub fn next(&self) -> Self {
        Self { start: self.end() }
    }

    /// Whether `date` falls inside this period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end()
    }

    /// Days left in the period after `today`. The last day of the month has 0.
    #[must_use]
    pub fn days_remaining(&self, today: NaiveDate) -> u32 {
        let days = (self.end() - today).num_days() - 1;
        u32::try_from(days.max(0)).unwrap_or(u32::MAX)
    }
}

impl fmt::Debug for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BillingPeriod({self})")
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for BillingPeriod {
    type Err = MeiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MeiError::invalid_argument("period", format!("expected YYYY-MM, got {s:?}"));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for BillingPeriod {
    type Error = MeiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BillingPeriod> for String {
    fn from(period: BillingPeriod) -> Self {
        period.to_string()
    }
}
