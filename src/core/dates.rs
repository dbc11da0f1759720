// src/core/dates.rs
// Date resolution and display formatting for chart entries.
//
// The display format mirrors the summary page convention: day without a
// leading zero, full month name, e.g. "4. Januar".

use chrono::{Datelike, NaiveDate, Weekday};

/// Month-name locale for the entered-display field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Locale {
    De,
    En,
}

const MONTHS_DE: [&str; 12] = [
    "Januar", "Februar", "März", "April", "Mai", "Juni",
    "Juli", "August", "September", "Oktober", "November", "Dezember",
];

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

impl Locale {
    pub fn month_name(&self, month: u32) -> &'static str {
        let table = match self {
            Locale::De => &MONTHS_DE,
            Locale::En => &MONTHS_EN,
        };
        table[(month - 1) as usize]
    }
}

/// Monday of ISO week `week` of `year`. None for week numbers the ISO
/// calendar does not assign to that year (e.g. week 53 of a 52-week year).
pub fn iso_week_monday(year: i32, week: u32) -> Option<NaiveDate> {
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
}

/// Strict `YYYY-MM-DD`.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// "4. Januar" — no leading zero on the day.
pub fn format_display(date: NaiveDate, locale: Locale) -> String {
    format!("{}. {}", date.day(), locale.month_name(date.month()))
}
