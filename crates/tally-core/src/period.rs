//! Calendar-month bucketing shared by the time-based analyzers
//!
//! Two month-counting conventions exist and are kept separate on purpose:
//! - [`distinct_months`] counts months that actually contain data
//!   (savings planning, trends)
//! - [`inclusive_month_span`] counts every calendar month between the first
//!   and last date (loan capacity)
//!
//! They disagree on sparse ledgers (data in Jan and Mar only: 2 vs 3).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// A calendar month key, serialized as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of this month
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Index counting months since year 0, used for span arithmetic
    fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month key: {}", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in month key: {}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month in month key: {}", s))?;
        YearMonth::new(year, month).ok_or_else(|| format!("Month out of range: {}", s))
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Distinct months that contain at least one dated transaction
pub fn distinct_months<'a, I>(transactions: I) -> BTreeSet<YearMonth>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter_map(|tx| tx.date)
        .map(YearMonth::from_date)
        .collect()
}

/// Earliest and latest valid dates, `None` when no transaction is dated
pub fn date_bounds<'a, I>(transactions: I) -> Option<(NaiveDate, NaiveDate)>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter_map(|tx| tx.date)
        .fold(None, |bounds, date| match bounds {
            None => Some((date, date)),
            Some((lo, hi)) => Some((lo.min(date), hi.max(date))),
        })
}

/// Calendar months from `first` to `last` inclusive: `year_diff * 12 + month_diff + 1`
///
/// Returns at least 1, even when `last` precedes `first`.
pub fn inclusive_month_span(first: NaiveDate, last: NaiveDate) -> u32 {
    let span = YearMonth::from_date(last).ordinal() - YearMonth::from_date(first).ordinal() + 1;
    span.max(1) as u32
}

/// `date` shifted back by `months` calendar months, clamping the day to the
/// target month's length (31 March minus one month is 28/29 February)
pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}
