pub mod loans;
pub mod portfolio;
pub mod risk;
pub mod stress;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// `--as-of` dates pin the evaluation clock to 00:00 UTC on that day.
pub fn as_of_instant(date: Option<NaiveDate>) -> Option<DateTime<Utc>> {
    date.map(|d| d.and_time(NaiveTime::MIN).and_utc())
}
