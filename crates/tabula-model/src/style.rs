use core::fmt;
use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tabula_format::{format_date, format_datetime, Locale, NumberPattern};
use thiserror::Error;

use crate::workbook::WorkbookId;

/// An ARGB color.
///
/// Serialized as a `#AARRGGBB` hex string.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub argb: u32,
}

impl Color {
    pub const fn new_argb(argb: u32) -> Self {
        Self { argb }
    }

    pub const fn black() -> Self {
        Self { argb: 0xFF000000 }
    }

    pub const fn white() -> Self {
        Self { argb: 0xFFFFFFFF }
    }

    fn to_hex(self) -> String {
        format!("#{:08X}", self.argb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let s = s.trim();
        let hex = s.strip_prefix('#').ok_or_else(|| {
            D::Error::custom("color must be a #AARRGGBB hex string (missing '#')")
        })?;
        if hex.len() != 8 {
            return Err(D::Error::custom(
                "color must be a #AARRGGBB hex string (8 hex digits)",
            ));
        }
        let argb = u32::from_str_radix(hex, 16).map_err(|_| D::Error::custom("invalid hex"))?;
        Ok(Color { argb })
    }
}

/// Font attributes used for cell rendering and column auto-sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub name: String,
    /// Font size in points.
    pub size_pt: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub color: Color,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            size_pt: 11.0,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            color: Color::black(),
        }
    }
}

/// A border line: width in points plus color. Width `0.0` means no line.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BorderStyle {
    pub width: f32,
    pub color: Color,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            width: 0.0,
            color: Color::black(),
        }
    }
}

/// Border direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Cell fill pattern.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPattern {
    #[default]
    None,
    Solid,
}

/// Horizontal alignment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    /// Alignment determined by cell type (numbers right, text left).
    #[default]
    Automatic,
    Left,
    Center,
    Right,
    Justify,
}

/// Vertical alignment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Errors raised by style operations.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StyleError {
    #[error("rotation must be in range [-90, 90]: {0}")]
    RotationOutOfRange(i16),
    #[error("cell style does not belong to this workbook")]
    ForeignWorkbook,
}

/// A complete cell style.
///
/// Styles are mutable, named, and shared: many cells reference the same style
/// through the workbook's style registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    pub font: Font,
    pub fill_fg_color: Color,
    pub fill_bg_color: Color,
    pub fill_pattern: FillPattern,
    pub h_align: HAlign,
    pub v_align: VAlign,
    borders: [BorderStyle; 4],
    pub wrap: bool,
    data_format: String,
    rotation: i16,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            font: Font::default(),
            fill_fg_color: Color::white(),
            fill_bg_color: Color::white(),
            fill_pattern: FillPattern::None,
            h_align: HAlign::Automatic,
            v_align: VAlign::Middle,
            borders: [BorderStyle::default(); 4],
            wrap: false,
            data_format: String::new(),
            rotation: 0,
        }
    }
}

impl CellStyle {
    pub fn border_style(&self, direction: Direction) -> BorderStyle {
        self.borders[direction.index()]
    }

    pub fn set_border_style(&mut self, direction: Direction, border: BorderStyle) {
        self.borders[direction.index()] = border;
    }

    /// The data format pattern; empty means "use the default format".
    ///
    /// Numeric cells interpret it as a [`NumberPattern`], date/date-time cells
    /// as a chrono strftime pattern.
    pub fn data_format(&self) -> &str {
        &self.data_format
    }

    pub fn set_data_format(&mut self, format: impl Into<String>) {
        self.data_format = format.into();
    }

    /// Text rotation in degrees, in `[-90, 90]`.
    pub fn rotation(&self) -> i16 {
        self.rotation
    }

    pub fn set_rotation(&mut self, angle: i16) -> Result<(), StyleError> {
        if !(-90..=90).contains(&angle) {
            return Err(StyleError::RotationOutOfRange(angle));
        }
        self.rotation = angle;
        Ok(())
    }

    /// Format a number for display under this style.
    pub fn format_number(&self, n: f64, locale: &Locale) -> String {
        if self.data_format.is_empty() {
            return NumberPattern::default().format(n, locale);
        }
        match NumberPattern::parse(&self.data_format) {
            Ok(pattern) => pattern.format(n, locale),
            Err(err) => {
                tracing::warn!(pattern = %self.data_format, %err, "not a number pattern");
                NumberPattern::default().format(n, locale)
            }
        }
    }

    /// Format a date for display under this style.
    pub fn format_date(&self, date: NaiveDate, locale: &Locale) -> String {
        format_date(date, self.data_format_opt(), locale)
    }

    /// Format a date-time for display under this style.
    pub fn format_datetime(&self, datetime: NaiveDateTime, locale: &Locale) -> String {
        format_datetime(datetime, self.data_format_opt(), locale)
    }

    fn data_format_opt(&self) -> Option<&str> {
        if self.data_format.is_empty() {
            None
        } else {
            Some(self.data_format.as_str())
        }
    }
}

/// A workbook-scoped handle to a registered style.
///
/// The handle records which workbook minted it so that passing a style into a
/// different workbook's cells is rejected instead of silently resolving to an
/// unrelated style.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StyleRef {
    pub(crate) workbook: WorkbookId,
    pub(crate) id: u32,
}

impl StyleRef {
    /// The workbook this style belongs to.
    pub fn workbook_id(&self) -> WorkbookId {
        self.workbook
    }
}

/// The name under which the default style is always registered.
pub const DEFAULT_STYLE_NAME: &str = "";

#[derive(Debug)]
pub(crate) struct StyleRegistry {
    styles: Vec<NamedStyle>,
    by_name: HashMap<String, u32>,
}

#[derive(Debug)]
struct NamedStyle {
    name: String,
    style: CellStyle,
}

impl StyleRegistry {
    pub(crate) fn new() -> Self {
        let mut registry = Self {
            styles: Vec::new(),
            by_name: HashMap::new(),
        };
        registry.ensure(DEFAULT_STYLE_NAME);
        registry
    }

    /// Look up a style id by name, registering a default-valued style for a
    /// previously unseen name.
    pub(crate) fn ensure(&mut self, name: &str) -> u32 {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = self.styles.len() as u32;
        self.styles.push(NamedStyle {
            name: name.to_string(),
            style: CellStyle::default(),
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub(crate) fn get(&self, id: u32) -> &CellStyle {
        &self.styles[id as usize].style
    }

    pub(crate) fn get_mut(&mut self, id: u32) -> &mut CellStyle {
        &mut self.styles[id as usize].style
    }

    pub(crate) fn name_of(&self, id: u32) -> &str {
        &self.styles[id as usize].name
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.styles.iter().map(|s| s.name.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.styles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_reuses_ids_per_name() {
        let mut registry = StyleRegistry::new();
        assert_eq!(registry.ensure(DEFAULT_STYLE_NAME), 0);

        let a = registry.ensure("A");
        let b = registry.ensure("B");
        assert_ne!(a, b);
        assert_eq!(registry.ensure("A"), a);
        assert_eq!(registry.name_of(a), "A");
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(a), &CellStyle::default());
    }

    #[test]
    fn rotation_is_validated() {
        let mut style = CellStyle::default();
        assert!(style.set_rotation(45).is_ok());
        assert_eq!(style.rotation(), 45);
        assert_eq!(
            style.set_rotation(91),
            Err(StyleError::RotationOutOfRange(91))
        );
        assert_eq!(style.rotation(), 45);
    }

    #[test]
    fn data_format_drives_number_rendering() {
        let mut style = CellStyle::default();
        let locale = Locale::en_us();
        assert_eq!(style.format_number(42.5, &locale), "42.5");

        style.set_data_format("0.00");
        assert_eq!(style.format_number(42.5, &locale), "42.50");

        // Broken pattern falls back to the default rendering.
        style.set_data_format("0.0.0");
        assert_eq!(style.format_number(42.5, &locale), "42.5");
    }

    #[test]
    fn color_serializes_as_hex() {
        let json = serde_json::to_string(&Color::black()).unwrap();
        assert_eq!(json, "\"#FF000000\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::black());
        assert!(serde_json::from_str::<Color>("\"FF000000\"").is_err());
    }
}
