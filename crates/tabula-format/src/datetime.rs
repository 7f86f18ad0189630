use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};

use crate::Locale;

/// Render a date with an optional strftime pattern.
///
/// Falls back to the locale's medium date pattern when the pattern is absent,
/// empty, or invalid (including patterns that reference time-of-day fields a
/// plain date cannot supply).
pub fn format_date(date: NaiveDate, pattern: Option<&str>, locale: &Locale) -> String {
    if let Some(items) = compile(pattern) {
        if let Some(out) = render(|buf| write!(buf, "{}", date.format_with_items(items.iter()))) {
            return out;
        }
    }
    date.format(locale.date_medium).to_string()
}

/// Render a date-time with an optional strftime pattern.
///
/// Falls back to the locale's medium date-time pattern when the pattern is
/// absent, empty, or invalid.
pub fn format_datetime(datetime: NaiveDateTime, pattern: Option<&str>, locale: &Locale) -> String {
    if let Some(items) = compile(pattern) {
        if let Some(out) = render(|buf| write!(buf, "{}", datetime.format_with_items(items.iter())))
        {
            return out;
        }
    }
    datetime.format(locale.datetime_medium).to_string()
}

/// Parse a date the way it would be typed in `locale`: the locale's short
/// pattern first, then the ISO form.
pub fn parse_date(text: &str, locale: &Locale) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, locale.date_short)
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
}

/// Parse a date-time: locale short date plus wall time, then the ISO forms.
pub fn parse_datetime(text: &str, locale: &Locale) -> Option<NaiveDateTime> {
    let text = text.trim();
    let with_time = format!("{} %H:%M", locale.date_short);
    NaiveDateTime::parse_from_str(text, &with_time)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

fn compile(pattern: Option<&str>) -> Option<Vec<Item<'_>>> {
    let pattern = pattern.filter(|p| !p.is_empty())?;
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(items)
}

// `DelayedFormat` reports missing fields through `fmt::Error`; capture that
// instead of letting `to_string` panic.
fn render(f: impl FnOnce(&mut String) -> std::fmt::Result) -> Option<String> {
    let mut buf = String::new();
    f(&mut buf).ok().map(|_| buf)
}
