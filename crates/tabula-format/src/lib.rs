//! Locale-aware rendering and parsing of spreadsheet cell values.
//!
//! The crate has two layers:
//! - [`NumberPattern`], a `DecimalFormat`-style numeric display pattern
//!   (`0`, `#`, grouping, percent, literal prefix/suffix).
//! - Date/date-time rendering on top of `chrono` strftime patterns, with
//!   per-locale defaults when a style carries no explicit data format.
//!
//! Both layers are driven through a small [`Locale`] definition so the same
//! pattern renders `42.5` as `42.5` in `en-US` and `42,5` in `de-DE`.

mod datetime;
mod number;

pub use datetime::{format_date, format_datetime, parse_date, parse_datetime};
pub use number::{format_number, parse_number, NumberPattern, PatternError};

/// A locale definition: number separators plus default date patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    /// Decimal separator (e.g. `.` in `en-US`, `,` in many EU locales).
    pub decimal_sep: char,
    /// Thousands separator (e.g. `,` in `en-US`, `.` in `de-DE`).
    pub thousands_sep: char,
    /// strftime pattern for short dates; used when coercing field text.
    pub date_short: &'static str,
    /// strftime pattern for medium dates; used when a style has no data format.
    pub date_medium: &'static str,
    /// strftime pattern for medium date-times.
    pub datetime_medium: &'static str,
}

impl Locale {
    pub const fn en_us() -> Self {
        Self {
            decimal_sep: '.',
            thousands_sep: ',',
            date_short: "%m/%d/%y",
            date_medium: "%b %-d, %Y",
            datetime_medium: "%b %-d, %Y %H:%M:%S",
        }
    }

    pub const fn de_de() -> Self {
        Self {
            decimal_sep: ',',
            thousands_sep: '.',
            date_short: "%d.%m.%y",
            date_medium: "%d.%m.%Y",
            datetime_medium: "%d.%m.%Y %H:%M:%S",
        }
    }

    // Month names are not localized here, so the French medium pattern is the
    // all-numeric form rather than "1 janv. 2023".
    pub const fn fr_fr() -> Self {
        Self {
            decimal_sep: ',',
            thousands_sep: '\u{00A0}',
            date_short: "%d/%m/%y",
            date_medium: "%d/%m/%Y",
            datetime_medium: "%d/%m/%Y %H:%M:%S",
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en_us()
    }
}
