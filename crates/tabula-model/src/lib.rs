//! `tabula-model` defines the core in-memory spreadsheet data structures.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - format readers, which populate sheets through the [`RowBuilder`]
//!   protocol without direct cell API knowledge
//! - format writers, which iterate `Workbook → Sheet → Row → Cell` read-only
//! - UI layers, which subscribe to [`SheetEvent`]/[`WorkbookEvent`] streams
//!   and coordinate shared access through [`SharedWorkbook`]
//!
//! Rows and cells materialize lazily on first access and grow monotonically;
//! cell metadata (column, merge spans, type tag) is packed into a single
//! 64-bit word behind plain getters; text and formula payloads are interned
//! through a per-workbook weak cache so repeated values share one
//! allocation.

mod address;
mod builder;
mod cache;
mod cell;
mod events;
mod measure;
mod region;
mod rich_text;
mod row;
mod sheet;
mod style;
mod sync;
mod value;
mod workbook;

pub use address::{A1ParseError, RowCol};
pub use builder::{RowBuilder, SheetRowBuilder};
pub use cache::ValueCache;
pub use cell::{Cell, CellTypeError, MAX_COLUMN, MAX_HORIZONTAL_SPAN, MAX_VERTICAL_SPAN};
pub use events::{SheetEvent, WorkbookEvent};
pub use measure::{AspectRatioMeasurer, TextMeasurer};
pub use region::{MergeError, Region};
pub use rich_text::{RichText, RichTextRun, RichTextRunStyle};
pub use row::Row;
pub use sheet::{
    CellMut, RowMut, Sheet, SheetError, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT,
};
pub use style::{
    BorderStyle, CellStyle, Color, Direction, FillPattern, Font, HAlign, StyleError, StyleRef,
    VAlign, DEFAULT_STYLE_NAME,
};
pub use sync::{share, SharedWorkbook};
pub use value::{CellType, CellValue, ErrorValue, ErrorValueParseError};
pub use workbook::{Workbook, WorkbookId};

pub use tabula_format::Locale;
