use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::Availability;

/// Calendar dates travel as ISO `YYYY-MM-DD`.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

/// English long-form weekday name, independent of locale.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// True iff the weekday of `date` and the `time` label are both declared.
/// An unparseable date is never available.
pub fn is_available(availability: &Availability, date: &str, time: &str) -> bool {
    match parse_date(date) {
        Some(date) => availability.accepts(date, time),
        None => false,
    }
}

impl Availability {
    pub fn accepts(&self, date: NaiveDate, time: &str) -> bool {
        self.days.contains(weekday_name(date)) && self.time_slots.contains(time)
    }
}
