use core::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use crate::rich_text::RichText;

/// Discriminant for the kind of value stored in a cell.
///
/// The ordinal doubles as the type tag in the packed cell metadata word, so
/// variant order is part of the storage layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    Blank,
    Boolean,
    Numeric,
    Text,
    Date,
    DateTime,
    Formula,
    Error,
}

impl CellType {
    pub(crate) const fn ordinal(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(CellType::Blank),
            1 => Some(CellType::Boolean),
            2 => Some(CellType::Numeric),
            3 => Some(CellType::Text),
            4 => Some(CellType::Date),
            5 => Some(CellType::DateTime),
            6 => Some(CellType::Formula),
            7 => Some(CellType::Error),
            _ => None,
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellType::Blank => "blank",
            CellType::Boolean => "boolean",
            CellType::Numeric => "numeric",
            CellType::Text => "text",
            CellType::Date => "date",
            CellType::DateTime => "date-time",
            CellType::Formula => "formula",
            CellType::Error => "error",
        };
        f.write_str(name)
    }
}

/// A typed cell value.
///
/// The value is [`CellValue::Blank`] if and only if the cell's type tag is
/// [`CellType::Blank`]. Text and formula payloads are reference-counted so
/// that the workbook's interning cache can share one allocation between many
/// cells holding the same content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// Empty / unset cell value.
    Blank,
    /// Boolean.
    Boolean(bool),
    /// IEEE-754 double precision number.
    Number(f64),
    /// Plain string.
    Text(Arc<str>),
    /// Rich (multi-style) text; shares the `Text` type tag.
    RichText(Arc<RichText>),
    /// Calendar date without time-of-day.
    Date(NaiveDate),
    /// Calendar date with wall-clock time.
    DateTime(NaiveDateTime),
    /// Formula source text (without a leading `=`).
    Formula(Arc<str>),
    /// Error value with Excel spelling.
    Error(ErrorValue),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Blank
    }
}

impl CellValue {
    /// The type tag for this value.
    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Blank => CellType::Blank,
            CellValue::Boolean(_) => CellType::Boolean,
            CellValue::Number(_) => CellType::Numeric,
            CellValue::Text(_) | CellValue::RichText(_) => CellType::Text,
            CellValue::Date(_) => CellType::Date,
            CellValue::DateTime(_) => CellType::DateTime,
            CellValue::Formula(_) => CellType::Formula,
            CellValue::Error(_) => CellType::Error,
        }
    }

    /// Returns true if the value is [`CellValue::Blank`].
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(Arc::from(value))
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(Arc::from(value.as_str()))
    }
}

impl From<RichText> for CellValue {
    fn from(value: RichText) -> Self {
        CellValue::RichText(Arc::new(value))
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl From<ErrorValue> for CellValue {
    fn from(value: ErrorValue) -> Self {
        CellValue::Error(value)
    }
}

/// Spreadsheet error values, serialized with their Excel spellings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorValue {
    Div0,
    Na,
    Name,
    Null,
    Num,
    Ref,
    Value,
}

impl ErrorValue {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorValue::Div0 => "#DIV/0!",
            ErrorValue::Na => "#N/A",
            ErrorValue::Name => "#NAME?",
            ErrorValue::Null => "#NULL!",
            ErrorValue::Num => "#NUM!",
            ErrorValue::Ref => "#REF!",
            ErrorValue::Value => "#VALUE!",
        }
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown error-value spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValueParseError(pub String);

impl fmt::Display for ErrorValueParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown error value: {}", self.0)
    }
}

impl std::error::Error for ErrorValueParseError {}

impl FromStr for ErrorValue {
    type Err = ErrorValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "#DIV/0!" => Ok(ErrorValue::Div0),
            "#N/A" => Ok(ErrorValue::Na),
            "#NAME?" => Ok(ErrorValue::Name),
            "#NULL!" => Ok(ErrorValue::Null),
            "#NUM!" => Ok(ErrorValue::Num),
            "#REF!" => Ok(ErrorValue::Ref),
            "#VALUE!" => Ok(ErrorValue::Value),
            other => Err(ErrorValueParseError(other.to_string())),
        }
    }
}

impl Serialize for ErrorValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
