use chrono::{Datelike, Days, NaiveDate};

use crate::scan_types::CheckError;

/// Date format of check request payloads: non-padded month and day, e.g. `2024-3-5`
pub const REQUEST_DATE_FORMAT: &str = "%Y-%-m-%-d";

/// Date format used in notifications, e.g. `Tue Mar 5`
pub const NOTICE_DATE_FORMAT: &str = "%a %b %-d";

/// Requested reservation window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stay {
    /// First night of the stay
    pub arrival: NaiveDate,
    /// Check-out day; not a night of the stay
    pub departure: NaiveDate,
}

impl Stay {
    /// Create a stay. A departure on or before arrival is kept as-is and yields no nights.
    pub fn new(arrival: NaiveDate, departure: NaiveDate) -> Self {
        Self {
            arrival,
            departure,
        }
    }

    /// Nights that must be available, arrival through departure - 1
    pub fn nights(&self) -> Vec<NaiveDate> {
        build_nights(self.arrival, self.departure)
    }

    /// First day of the arrival month; the provider is queried one month at a time
    pub fn month_anchor(&self) -> NaiveDate {
        month_anchor(self.arrival)
    }
}

/// Expand a stay into the ordered nights to check.
///
/// Returns one date per day from `arrival` up to but excluding `departure`.
/// When `departure <= arrival` the result is empty.
pub fn build_nights(arrival: NaiveDate, departure: NaiveDate) -> Vec<NaiveDate> {
    arrival
        .iter_days()
        .take_while(|night| *night < departure)
        .collect()
}

/// First day of the month containing `date`
pub fn month_anchor(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Parse a `YYYY-M-D` request date, naming the field on failure
pub(crate) fn parse_request_date(field: &str, value: &str) -> Result<NaiveDate, CheckError> {
    NaiveDate::parse_from_str(value.trim(), REQUEST_DATE_FORMAT).map_err(|e| {
        CheckError::MalformedRequest(format!("Invalid {} date '{}': {}", field, value, e))
    })
}
