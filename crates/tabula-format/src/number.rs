use core::fmt;

use crate::Locale;

/// A compiled numeric display pattern.
///
/// Supported pattern syntax is the commonly used subset of
/// `DecimalFormat`-style codes:
/// - `0` — required digit (zero-padded)
/// - `#` — optional digit
/// - `,` — thousands grouping (position inside the integer part is not
///   significant; groups are always three digits)
/// - `.` — decimal point (at most one)
/// - `%` — render the value multiplied by 100, keeping the sign
/// - `"…"` quoted literals, plus any unquoted characters before the first and
///   after the last placeholder, are emitted verbatim as prefix/suffix
///
/// The default pattern is `0.##########`: no grouping, at least one integer
/// digit, and up to ten fraction digits with trailing zeros trimmed, so `42.5`
/// renders as `42.5` and `3.0` as `3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberPattern {
    prefix: String,
    suffix: String,
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    grouping: bool,
    percent: bool,
}

impl Default for NumberPattern {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            min_int: 1,
            min_frac: 0,
            max_frac: 10,
            grouping: false,
            percent: false,
        }
    }
}

/// Errors raised when compiling a numeric display pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternError {
    Empty,
    NoDigitPlaceholder,
    MultipleDecimalPoints,
    UnterminatedQuote,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PatternError::Empty => "empty number pattern",
            PatternError::NoDigitPlaceholder => "number pattern has no digit placeholder",
            PatternError::MultipleDecimalPoints => "number pattern has multiple decimal points",
            PatternError::UnterminatedQuote => "unterminated quote in number pattern",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for PatternError {}

impl NumberPattern {
    /// Compile a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut min_int = 0usize;
        let mut int_placeholders = 0usize;
        let mut min_frac = 0usize;
        let mut max_frac = 0usize;
        let mut grouping = false;
        let mut percent = false;

        // 0 = prefix, 1 = integer part, 2 = fraction part, 3 = suffix
        let mut section = 0u8;
        let mut chars = pattern.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '0' | '#' => {
                    match section {
                        0 => section = 1,
                        3 => {
                            // Placeholder after suffix text started; treat it
                            // as a literal suffix character.
                            suffix.push(ch);
                            continue;
                        }
                        _ => {}
                    }
                    if section == 1 {
                        int_placeholders += 1;
                        if ch == '0' {
                            min_int += 1;
                        }
                    } else {
                        max_frac += 1;
                        if ch == '0' {
                            min_frac += 1;
                        }
                    }
                }
                ',' if section == 1 => grouping = true,
                '.' => match section {
                    0 | 1 => section = 2,
                    2 => return Err(PatternError::MultipleDecimalPoints),
                    _ => suffix.push('.'),
                },
                '%' => {
                    percent = true;
                    if section == 0 {
                        prefix.push('%');
                    } else {
                        section = 3;
                        suffix.push('%');
                    }
                }
                '"' => {
                    let mut closed = false;
                    let out = if section == 0 { &mut prefix } else { &mut suffix };
                    for q in chars.by_ref() {
                        if q == '"' {
                            closed = true;
                            break;
                        }
                        out.push(q);
                    }
                    if !closed {
                        return Err(PatternError::UnterminatedQuote);
                    }
                    if section != 0 {
                        section = 3;
                    }
                }
                other => {
                    if section == 0 {
                        prefix.push(other);
                    } else {
                        section = 3;
                        suffix.push(other);
                    }
                }
            }
        }

        if int_placeholders == 0 && max_frac == 0 {
            return Err(PatternError::NoDigitPlaceholder);
        }

        Ok(Self {
            prefix,
            suffix,
            min_int,
            min_frac,
            max_frac,
            grouping,
            percent,
        })
    }

    /// Render `value` according to this pattern and `locale`.
    pub fn format(&self, value: f64, locale: &Locale) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value < 0.0 { "-\u{221E}" } else { "\u{221E}" }.to_string();
        }

        let mut v = value.abs();
        if self.percent {
            v *= 100.0;
        }

        let (mut int_part, mut frac_part) = if self.max_frac == 0 {
            (format!("{:.0}", v), String::new())
        } else {
            let s = format!("{:.*}", self.max_frac, v);
            match s.split_once('.') {
                Some((i, f)) => (i.to_string(), f.to_string()),
                None => (s, String::new()),
            }
        };

        // Optional integer digits: "#" style patterns suppress a lone zero.
        if self.min_int == 0 && int_part == "0" {
            int_part.clear();
        }
        while int_part.len() < self.min_int {
            int_part.insert(0, '0');
        }

        while frac_part.len() > self.min_frac && frac_part.ends_with('0') {
            frac_part.pop();
        }

        if self.grouping && !int_part.is_empty() {
            int_part = group_thousands(&int_part, locale.thousands_sep);
        }

        let mut out = String::new();
        if value.is_sign_negative() && (v != 0.0 || int_part.contains(|c: char| c != '0')) {
            out.push('-');
        }
        out.push_str(&self.prefix);
        out.push_str(&int_part);
        if !frac_part.is_empty() {
            out.push(locale.decimal_sep);
            out.push_str(&frac_part);
        }
        out.push_str(&self.suffix);
        out
    }
}

/// Render `value` with an optional pattern, falling back to the default
/// pattern when `pattern` is `None`, empty, or does not compile.
pub fn format_number(value: f64, pattern: Option<&str>, locale: &Locale) -> String {
    let compiled = pattern
        .filter(|p| !p.is_empty())
        .and_then(|p| NumberPattern::parse(p).ok())
        .unwrap_or_default();
    compiled.format(value, locale)
}

/// Parse a number the way it would be typed in `locale`.
///
/// The whole string must be consumed. Grouping separators must form proper
/// groups (1-3 leading digits, then groups of exactly three), so a German
/// short date like `31.01.23` is not mistaken for `310123`. Exponent notation
/// and non-finite spellings are rejected so that e.g. `1e5` coerces to text,
/// not a number.
pub fn parse_number(text: &str, locale: &Locale) -> Option<f64> {
    let text = text.trim();

    let (negative, rest) = match text.strip_prefix(['-', '+']) {
        Some(rest) => (text.starts_with('-'), rest),
        None => (false, text),
    };

    let (int_part, frac_part) = match rest.split_once(locale.decimal_sep) {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rest, None),
    };

    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    let mut normalized = String::with_capacity(rest.len());
    if int_part.is_empty() {
        // A bare fraction like ".5" is fine; an empty string is not.
        frac_part?;
    } else if int_part.contains(locale.thousands_sep) {
        let mut groups = int_part.split(locale.thousands_sep);
        let first = groups.next()?;
        if first.is_empty() || first.len() > 3 || !first.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        normalized.push_str(first);
        for group in groups {
            if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            normalized.push_str(group);
        }
    } else {
        if !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        normalized.push_str(int_part);
    }

    if let Some(frac) = frac_part {
        normalized.push('.');
        normalized.push_str(frac);
    }

    let value: f64 = normalized.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn group_thousands(int_part: &str, sep: char) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        let pos_from_end = len - i;
        out.push(ch);
        if pos_from_end > 1 && pos_from_end % 3 == 1 {
            out.push(sep);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EN: Locale = Locale::en_us();
    const DE: Locale = Locale::de_de();

    #[test]
    fn default_pattern_trims_trailing_zeros() {
        let p = NumberPattern::default();
        assert_eq!(p.format(42.5, &EN), "42.5");
        assert_eq!(p.format(3.0, &EN), "3");
        assert_eq!(p.format(0.0, &EN), "0");
        assert_eq!(p.format(-1.25, &EN), "-1.25");
        assert_eq!(p.format(42.5, &DE), "42,5");
    }

    #[test]
    fn fixed_patterns() {
        let p = NumberPattern::parse("0.00").unwrap();
        assert_eq!(p.format(1.5, &EN), "1.50");
        assert_eq!(p.format(2.346, &EN), "2.35"); // rounds

        let p = NumberPattern::parse("#,##0.##").unwrap();
        assert_eq!(p.format(1234567.891, &EN), "1,234,567.89");
        assert_eq!(p.format(1234567.891, &DE), "1.234.567,89");
        assert_eq!(p.format(12.0, &EN), "12");
    }

    #[test]
    fn percent_and_literals() {
        let p = NumberPattern::parse("0%").unwrap();
        assert_eq!(p.format(0.25, &EN), "25%");

        let p = NumberPattern::parse("0.0\" kg\"").unwrap();
        assert_eq!(p.format(2.5, &EN), "2.5 kg");

        let p = NumberPattern::parse("$#,##0.00").unwrap();
        assert_eq!(p.format(1999.5, &EN), "$1,999.50");
        assert_eq!(p.format(-1999.5, &EN), "-$1,999.50");
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert_eq!(NumberPattern::parse(""), Err(PatternError::Empty));
        assert_eq!(
            NumberPattern::parse("abc"),
            Err(PatternError::NoDigitPlaceholder)
        );
        assert_eq!(
            NumberPattern::parse("0.0.0"),
            Err(PatternError::MultipleDecimalPoints)
        );
        assert_eq!(
            NumberPattern::parse("0\" kg"),
            Err(PatternError::UnterminatedQuote)
        );
    }

    #[test]
    fn format_number_falls_back_on_bad_pattern() {
        assert_eq!(format_number(42.5, Some("abc"), &EN), "42.5");
        assert_eq!(format_number(42.5, None, &EN), "42.5");
    }

    #[test]
    fn parse_accepts_locale_separators() {
        assert_eq!(parse_number("42.5", &EN), Some(42.5));
        assert_eq!(parse_number("123,5", &DE), Some(123.5));
        assert_eq!(parse_number("1,234.5", &EN), Some(1234.5));
        assert_eq!(parse_number("1.234.567", &DE), Some(1234567.0));
        assert_eq!(parse_number(".5", &EN), Some(0.5));
        assert_eq!(parse_number("-17", &EN), Some(-17.0));
        assert_eq!(parse_number("+3", &EN), Some(3.0));
    }

    #[test]
    fn parse_rejects_partial_matches() {
        assert_eq!(parse_number("1e5", &EN), None);
        assert_eq!(parse_number("NaN", &EN), None);
        assert_eq!(parse_number("12 apples", &EN), None);
        assert_eq!(parse_number("", &EN), None);
        assert_eq!(parse_number(",5", &EN), None);
    }

    #[test]
    fn parse_requires_well_formed_grouping() {
        // German short dates must not read as grouped numbers.
        assert_eq!(parse_number("31.01.23", &DE), None);
        assert_eq!(parse_number("1,2", &EN), None);
        assert_eq!(parse_number("12,3456", &EN), None);
    }
}
