use chrono::{NaiveDate, NaiveDateTime};
use tabula_format::Locale;
use thiserror::Error;

use crate::address::RowCol;
use crate::rich_text::RichText;
use crate::style::CellStyle;
use crate::value::{CellType, CellValue, ErrorValue};

/// Maximum 0-indexed column number a cell can carry.
///
/// The packed metadata word stores the column in a 16-bit field; the limit is
/// capped to what the field can round-trip.
pub const MAX_COLUMN: u32 = 0xEFFF;

/// Maximum horizontal span of a merged region.
pub const MAX_HORIZONTAL_SPAN: u32 = 0xEFFF;

/// Maximum vertical span of a merged region.
pub const MAX_VERTICAL_SPAN: u32 = 0xEF_FFFF;

/// Packed cell metadata.
///
/// A single `u64` storing, in fixed non-overlapping fields:
///
/// ```text
/// byte layout: CCXXYYYT
///
/// C - column number   (2 bytes, bits 48-63)
/// X - horizontal span (2 bytes, bits 32-47)
/// Y - vertical span   (3 bytes, bits  8-31)
/// T - cell type       (1 byte,  bits  0-7)
/// ```
///
/// The packing is a memory-density optimization; the public contract is the
/// decoded getters on [`Cell`], not the bit layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct CellData(u64);

/// Spans 1x1, blank type tag; the column field is or-ed in by `new`.
const INITIAL_DATA: u64 = (1 << 32) | (1 << 8);

impl CellData {
    fn new(col: u32) -> Self {
        debug_assert!(col <= MAX_COLUMN, "column number out of range: {col}");
        Self(((col as u64) << 48) | INITIAL_DATA)
    }

    fn column(self) -> u32 {
        ((self.0 & 0xFFFF_0000_0000_0000) >> 48) as u32
    }

    fn horizontal_span(self) -> u32 {
        ((self.0 & 0x0000_FFFF_0000_0000) >> 32) as u32
    }

    fn vertical_span(self) -> u32 {
        ((self.0 & 0x0000_0000_FFFF_FF00) >> 8) as u32
    }

    fn cell_type(self) -> CellType {
        CellType::from_ordinal((self.0 & 0xFF) as u8).expect("stored cell type tag is valid")
    }

    fn set_horizontal_span(&mut self, span: u32) {
        debug_assert!(span <= MAX_HORIZONTAL_SPAN, "invalid horizontal span: {span}");
        self.0 = (self.0 & 0xFFFF_0000_FFFF_FFFF) | ((span as u64) << 32);
    }

    fn set_vertical_span(&mut self, span: u32) {
        debug_assert!(span <= MAX_VERTICAL_SPAN, "invalid vertical span: {span}");
        self.0 = (self.0 & 0xFFFF_FFFF_0000_00FF) | ((span as u64) << 8);
    }

    fn set_cell_type(&mut self, cell_type: CellType) {
        self.0 = (self.0 & 0xFFFF_FFFF_FFFF_FF00) | cell_type.ordinal() as u64;
    }
}

/// Error raised when a typed accessor is invoked against a mismatched cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot read a {expected} value from a {actual} cell")]
pub struct CellTypeError {
    pub expected: CellType,
    pub actual: CellType,
}

/// A single cell.
///
/// Cells are created by their row when a column slot materializes and live as
/// long as the row does; clearing resets them to blank rather than removing
/// them. Mutation goes through [`CellMut`](crate::sheet::CellMut) so that the
/// owning sheet can intern values and notify subscribers.
#[derive(Clone, Debug)]
pub struct Cell {
    data: CellData,
    value: CellValue,
    style: u32,
    /// Anchor of the merged region this cell is absorbed into; `None` means
    /// the cell stands for itself.
    anchor: Option<RowCol>,
    extras: Option<Box<CellExtras>>,
}

#[derive(Clone, Debug, Default)]
struct CellExtras {
    hyperlink: Option<String>,
}

impl Cell {
    pub(crate) fn new(col: u32, style: u32) -> Self {
        Self {
            data: CellData::new(col),
            value: CellValue::Blank,
            style,
            anchor: None,
            extras: None,
        }
    }

    /// The current type tag.
    pub fn cell_type(&self) -> CellType {
        self.data.cell_type()
    }

    /// The stored value.
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// 0-indexed column number; always equals the cell's index in its row.
    pub fn column(&self) -> u32 {
        self.data.column()
    }

    /// Horizontal span: 1 for plain cells, the region width for a merge
    /// anchor, 0 for absorbed cells.
    pub fn horizontal_span(&self) -> u32 {
        self.data.horizontal_span()
    }

    /// Vertical span: 1 for plain cells, the region height for a merge
    /// anchor, 0 for absorbed cells.
    pub fn vertical_span(&self) -> u32 {
        self.data.vertical_span()
    }

    /// Returns true if the cell is blank.
    pub fn is_empty(&self) -> bool {
        self.cell_type() == CellType::Blank
    }

    /// Returns true if the cell belongs to a merged region (anchor or not).
    pub fn is_merged(&self) -> bool {
        self.horizontal_span() != 1 || self.vertical_span() != 1
    }

    /// Returns true for a non-anchor member of a merged region.
    pub fn is_absorbed(&self) -> bool {
        self.horizontal_span() == 0 || self.vertical_span() == 0
    }

    /// The anchor this cell defers to, if absorbed into a merged region.
    pub fn merge_anchor(&self) -> Option<RowCol> {
        self.anchor
    }

    /// Index of this cell's style in the workbook registry.
    pub fn style_id(&self) -> u32 {
        self.style
    }

    /// Hyperlink target, if one is attached.
    pub fn hyperlink(&self) -> Option<&str> {
        self.extras.as_ref()?.hyperlink.as_deref()
    }

    pub fn boolean(&self) -> Result<bool, CellTypeError> {
        match &self.value {
            CellValue::Boolean(b) => Ok(*b),
            _ => Err(self.type_error(CellType::Boolean)),
        }
    }

    pub fn number(&self) -> Result<f64, CellTypeError> {
        match &self.value {
            CellValue::Number(n) => Ok(*n),
            _ => Err(self.type_error(CellType::Numeric)),
        }
    }

    /// Plain text content of a text cell (rich text loses its styling).
    pub fn text(&self) -> Result<&str, CellTypeError> {
        match &self.value {
            CellValue::Text(s) => Ok(s),
            CellValue::RichText(rt) => Ok(rt.plain_text()),
            _ => Err(self.type_error(CellType::Text)),
        }
    }

    /// The rich text value, if this is a text cell holding one.
    pub fn rich_text(&self) -> Option<&RichText> {
        match &self.value {
            CellValue::RichText(rt) => Some(rt),
            _ => None,
        }
    }

    /// Returns true if the cell holds styled text.
    pub fn is_rich_text(&self) -> bool {
        matches!(self.value, CellValue::RichText(_))
    }

    pub fn date(&self) -> Result<NaiveDate, CellTypeError> {
        match &self.value {
            CellValue::Date(d) => Ok(*d),
            _ => Err(self.type_error(CellType::Date)),
        }
    }

    pub fn date_time(&self) -> Result<NaiveDateTime, CellTypeError> {
        match &self.value {
            CellValue::DateTime(dt) => Ok(*dt),
            _ => Err(self.type_error(CellType::DateTime)),
        }
    }

    /// Formula source text, without a leading `=`.
    pub fn formula(&self) -> Result<&str, CellTypeError> {
        match &self.value {
            CellValue::Formula(f) => Ok(f),
            _ => Err(self.type_error(CellType::Formula)),
        }
    }

    pub fn error_value(&self) -> Result<ErrorValue, CellTypeError> {
        match &self.value {
            CellValue::Error(e) => Ok(*e),
            _ => Err(self.type_error(CellType::Error)),
        }
    }

    /// Render the value as display text under `style` and `locale`.
    ///
    /// Blank cells render as the empty string.
    pub fn display_text(&self, style: &CellStyle, locale: &Locale) -> String {
        match &self.value {
            CellValue::Blank => String::new(),
            CellValue::Boolean(true) => "true".to_string(),
            CellValue::Boolean(false) => "false".to_string(),
            CellValue::Number(n) => style.format_number(*n, locale),
            CellValue::Text(s) => s.to_string(),
            CellValue::RichText(rt) => rt.plain_text().to_string(),
            CellValue::Date(d) => style.format_date(*d, locale),
            CellValue::DateTime(dt) => style.format_datetime(*dt, locale),
            CellValue::Formula(f) => f.to_string(),
            CellValue::Error(e) => e.as_str().to_string(),
        }
    }

    fn type_error(&self, expected: CellType) -> CellTypeError {
        CellTypeError {
            expected,
            actual: self.cell_type(),
        }
    }

    pub(crate) fn set_value_internal(&mut self, value: CellValue) {
        self.data.set_cell_type(value.cell_type());
        self.value = value;
    }

    /// Reset to blank, returning the previous value.
    pub(crate) fn clear_internal(&mut self) -> CellValue {
        self.data.set_cell_type(CellType::Blank);
        std::mem::take(&mut self.value)
    }

    pub(crate) fn set_style_internal(&mut self, style: u32) {
        self.style = style;
    }

    pub(crate) fn set_hyperlink_internal(&mut self, target: Option<&str>) {
        match target {
            Some(target) => {
                self.extras.get_or_insert_with(Default::default).hyperlink =
                    Some(target.to_string());
            }
            None => {
                self.extras = None;
            }
        }
    }

    /// Make this cell the anchor of a merged region with the given spans.
    pub(crate) fn anchor_merge(&mut self, width: u32, height: u32) {
        self.data.set_horizontal_span(width);
        self.data.set_vertical_span(height);
        self.anchor = None;
    }

    /// Absorb this cell into the merged region anchored at `anchor`.
    pub(crate) fn absorb_into(&mut self, anchor: RowCol) {
        self.data.set_horizontal_span(0);
        self.data.set_vertical_span(0);
        self.anchor = Some(anchor);
    }

    /// Restore a 1x1 standalone cell after its merged region is removed.
    pub(crate) fn release_merge(&mut self) {
        self.data.set_horizontal_span(1);
        self.data.set_vertical_span(1);
        self.anchor = None;
    }
}
