use std::ops::Deref;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tabula_format::Locale;
use thiserror::Error;

use crate::address::{A1ParseError, RowCol};
use crate::cell::{Cell, MAX_COLUMN, MAX_HORIZONTAL_SPAN, MAX_VERTICAL_SPAN};
use crate::events::{EventBus, SheetEvent};
use crate::measure::TextMeasurer;
use crate::region::{MergeError, Region};
use crate::rich_text::RichText;
use crate::row::Row;
use crate::style::{StyleError, StyleRef};
use crate::value::{CellValue, ErrorValue};
use crate::workbook::{WorkbookId, WorkbookShared};

/// Width used for columns without an explicit override.
pub const DEFAULT_COLUMN_WIDTH: f32 = 80.0;

/// Height used for rows without an explicit override.
pub const DEFAULT_ROW_HEIGHT: f32 = 12.0;

/// Errors raised by sheet-level operations.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SheetError {
    #[error("invalid zoom factor: {0}")]
    InvalidZoom(f32),
    #[error("cell {0} does not belong to this sheet")]
    CellOutsideSheet(RowCol),
    #[error("invalid sheet index: {0}")]
    InvalidSheetIndex(usize),
}

/// A sheet: a lazily growing grid of rows and cells with merged-region
/// bookkeeping, layout overrides, and change notifications.
///
/// Rows and cells materialize on first access to a coordinate, whether the
/// access reads or writes; a single out-of-range read grows the sheet exactly
/// like a write would.
#[derive(Debug)]
pub struct Sheet {
    shared: Arc<WorkbookShared>,
    name: String,
    rows: Vec<Row>,
    column_count: u32,
    col_widths: Vec<Option<f32>>,
    row_heights: Vec<Option<f32>>,
    merged_regions: Vec<Region>,
    split: (u32, u32),
    zoom: f32,
    current: RowCol,
    events: EventBus<SheetEvent>,
}

impl Sheet {
    pub(crate) fn new(shared: Arc<WorkbookShared>, name: impl Into<String>) -> Self {
        Self {
            shared,
            name: name.into(),
            rows: Vec::new(),
            column_count: 0,
            col_widths: Vec::new(),
            row_heights: Vec::new(),
            merged_regions: Vec::new(),
            split: (0, 0),
            zoom: 1.0,
            current: RowCol::new(0, 0),
            events: EventBus::new(),
        }
    }

    /// The sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the owning workbook.
    pub fn workbook_id(&self) -> WorkbookId {
        self.shared.id
    }

    /// Number of materialized rows.
    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    /// One past the highest column ever touched by any row.
    pub fn column_count(&self) -> u32 {
        self.column_count
    }

    pub fn first_row_num(&self) -> u32 {
        0
    }

    /// Highest materialized row number; `None` for an empty sheet.
    pub fn last_row_num(&self) -> Option<u32> {
        (self.rows.len() as u32).checked_sub(1)
    }

    pub fn first_col_num(&self) -> u32 {
        0
    }

    /// Highest column number ever touched; `None` before any cell access.
    pub fn last_col_num(&self) -> Option<u32> {
        self.column_count.checked_sub(1)
    }

    /// Iterate over the materialized rows.
    pub fn rows(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// The row at `row`, if already materialized. Never grows the sheet.
    pub fn row_if_exists(&self, row: u32) -> Option<&Row> {
        self.rows.get(row as usize)
    }

    /// The row at `row`, materializing it (and every row before it) if
    /// needed. Emits one rows-added event covering the newly created range.
    pub fn row(&mut self, row: u32) -> &Row {
        self.reserve_rows(row);
        &self.rows[row as usize]
    }

    /// Mutable access to the row at `row`, materializing it if needed.
    pub fn row_mut(&mut self, row: u32) -> RowMut<'_> {
        self.reserve_rows(row);
        RowMut { sheet: self, row }
    }

    /// The cell at `(row, col)`, materializing rows and cells as needed.
    ///
    /// # Panics
    /// Panics if `col` exceeds [`MAX_COLUMN`].
    pub fn cell(&mut self, row: u32, col: u32) -> &Cell {
        let rc = RowCol::new(row, col);
        self.reserve_cell(rc);
        &self.rows[row as usize].cells[col as usize]
    }

    /// The cell at `(row, col)`, if materialized. Never grows the sheet.
    pub fn cell_if_exists(&self, row: u32, col: u32) -> Option<&Cell> {
        self.rows.get(row as usize)?.cell_if_exists(col)
    }

    /// Mutable access to the cell at `(row, col)`, materializing as needed.
    ///
    /// # Panics
    /// Panics if `col` exceeds [`MAX_COLUMN`].
    pub fn cell_mut(&mut self, row: u32, col: u32) -> CellMut<'_> {
        let rc = RowCol::new(row, col);
        self.reserve_cell(rc);
        CellMut { sheet: self, rc }
    }

    /// The cell at an A1-style reference, materializing as needed.
    pub fn cell_a1(&mut self, a1: &str) -> Result<&Cell, A1ParseError> {
        let rc = RowCol::from_a1(a1)?;
        Ok(self.cell(rc.row, rc.col))
    }

    /// Mutable access to the cell at an A1-style reference.
    pub fn cell_mut_a1(&mut self, a1: &str) -> Result<CellMut<'_>, A1ParseError> {
        let rc = RowCol::from_a1(a1)?;
        Ok(self.cell_mut(rc.row, rc.col))
    }

    /// Resolve the logical cell for a coordinate: the anchor of its merged
    /// region for absorbed cells, the coordinate itself otherwise.
    pub fn logical_cell(&self, rc: RowCol) -> RowCol {
        self.cell_if_exists(rc.row, rc.col)
            .and_then(Cell::merge_anchor)
            .unwrap_or(rc)
    }

    /// Effective width of column `col`.
    pub fn column_width(&self, col: u32) -> f32 {
        self.col_widths
            .get(col as usize)
            .copied()
            .flatten()
            .unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    /// Set the width of column `col`. Emits a layout-changed event only when
    /// the effective width actually changes.
    pub fn set_column_width(&mut self, col: u32, width: f32) {
        if self.column_width(col) == width {
            return;
        }
        let idx = col as usize;
        if self.col_widths.len() <= idx {
            self.col_widths.resize(idx + 1, None);
        }
        self.col_widths[idx] = Some(width);
        self.events.submit(SheetEvent::LayoutChanged);
    }

    /// Effective height of row `row`.
    pub fn row_height(&self, row: u32) -> f32 {
        self.row_heights
            .get(row as usize)
            .copied()
            .flatten()
            .unwrap_or(DEFAULT_ROW_HEIGHT)
    }

    /// Set the height of row `row`. Emits a layout-changed event only when
    /// the effective height actually changes.
    pub fn set_row_height(&mut self, row: u32, height: f32) {
        if self.row_height(row) == height {
            return;
        }
        let idx = row as usize;
        if self.row_heights.len() <= idx {
            self.row_heights.resize(idx + 1, None);
        }
        self.row_heights[idx] = Some(height);
        self.events.submit(SheetEvent::LayoutChanged);
    }

    /// Size column `col` to its widest non-blank cell: measured text width
    /// plus half the font's point size as side padding.
    pub fn auto_size_column(&mut self, col: u32, measurer: &dyn TextMeasurer, locale: &Locale) {
        let width = {
            let styles = self.shared.styles.read();
            let mut width = 0.0f32;
            for row in &self.rows {
                let Some(cell) = row.cell_if_exists(col) else {
                    continue;
                };
                if cell.is_empty() {
                    continue;
                }
                let style = styles.get(cell.style_id());
                let text = cell.display_text(style, locale);
                width = width.max(measurer.text_width(&text, &style.font) + style.font.size_pt / 2.0);
            }
            width
        };
        self.set_column_width(col, width);
    }

    /// Auto-size every column in one pass over the rows.
    pub fn auto_size_columns(&mut self, measurer: &dyn TextMeasurer, locale: &Locale) {
        let mut widths = vec![0.0f32; self.column_count as usize];
        {
            let styles = self.shared.styles.read();
            for row in &self.rows {
                for cell in row.cells() {
                    if cell.is_empty() {
                        continue;
                    }
                    let style = styles.get(cell.style_id());
                    let text = cell.display_text(style, locale);
                    let width = measurer.text_width(&text, &style.font) + style.font.size_pt / 2.0;
                    let slot = &mut widths[cell.column() as usize];
                    *slot = slot.max(width);
                }
            }
        }
        for (col, width) in widths.into_iter().enumerate() {
            self.set_column_width(col as u32, width);
        }
    }

    /// The freeze position as `(row, column)`.
    pub fn split(&self) -> (u32, u32) {
        self.split
    }

    /// Freeze rows above `row` and columns left of `col`. A split beyond the
    /// current bounds is permitted; it only affects display scrolling.
    pub fn split_at(&mut self, row: u32, col: u32) {
        let old = self.split;
        self.split = (row, col);
        self.events.submit(SheetEvent::SplitChanged {
            old,
            new: self.split,
        });
    }

    /// The zoom factor.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom factor; must be finite and positive.
    pub fn set_zoom(&mut self, zoom: f32) -> Result<(), SheetError> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(SheetError::InvalidZoom(zoom));
        }
        if zoom != self.zoom {
            let old = self.zoom;
            self.zoom = zoom;
            self.events.submit(SheetEvent::ZoomChanged { old, new: zoom });
        }
        Ok(())
    }

    /// The current-cell cursor.
    pub fn current_cell(&self) -> RowCol {
        self.current
    }

    /// Move the current-cell cursor. The coordinate must lie within the
    /// materialized bounds of this sheet; absorbed cells resolve to their
    /// merge anchor. Returns whether the cursor moved.
    pub fn set_current_cell(&mut self, rc: RowCol) -> Result<bool, SheetError> {
        if rc.row >= self.row_count() || rc.col >= self.column_count() {
            return Err(SheetError::CellOutsideSheet(rc));
        }
        let rc = self.logical_cell(rc);
        if rc == self.current {
            return Ok(false);
        }
        let old = std::mem::replace(&mut self.current, rc);
        self.events
            .submit(SheetEvent::ActiveCellChanged { old, new: rc });
        Ok(true)
    }

    /// The merged regions, in insertion order.
    pub fn merged_regions(&self) -> &[Region] {
        &self.merged_regions
    }

    /// The merged region covering `rc`, if any.
    pub fn merged_region_at(&self, rc: RowCol) -> Option<Region> {
        self.merged_regions.iter().find(|r| r.contains(rc)).copied()
    }

    /// Merge a region of cells.
    ///
    /// Fails without touching the sheet when the region intersects an
    /// existing merged region or exceeds the span/column limits. On success
    /// the top-left cell becomes the anchor carrying the region's full span;
    /// every other covered cell is cleared, marked absorbed (span 0), and
    /// linked to the anchor.
    pub fn add_merged_region(&mut self, region: Region) -> Result<(), MergeError> {
        if region.width() > MAX_HORIZONTAL_SPAN || region.height() > MAX_VERTICAL_SPAN {
            return Err(MergeError::SpanTooLarge { region });
        }
        if region.last_col > MAX_COLUMN {
            return Err(MergeError::ColumnOutOfRange { region });
        }
        for existing in &self.merged_regions {
            if existing.intersects(&region) {
                return Err(MergeError::Overlap {
                    region,
                    existing: *existing,
                });
            }
        }

        let anchor = region.top_left();
        for rc in region.cells() {
            self.reserve_cell(rc);
            let cell = &mut self.rows[rc.row as usize].cells[rc.col as usize];
            if rc == anchor {
                cell.anchor_merge(region.width(), region.height());
            } else {
                let old = (!cell.is_empty()).then(|| cell.clear_internal());
                cell.absorb_into(anchor);
                if let Some(old) = old {
                    self.events.submit(SheetEvent::CellValueChanged {
                        cell: rc,
                        old,
                        new: CellValue::Blank,
                    });
                }
            }
        }
        self.merged_regions.push(region);
        tracing::debug!(%region, "added merged region");
        Ok(())
    }

    /// Remove the merged region anchored at `rc`, resetting every covered
    /// cell to a standalone 1x1 cell.
    pub fn unmerge(&mut self, rc: RowCol) -> Result<Region, MergeError> {
        let index = self
            .merged_regions
            .iter()
            .position(|r| r.top_left() == rc)
            .ok_or(MergeError::NotAnchor(rc))?;
        let region = self.merged_regions.remove(index);
        for covered in region.cells() {
            if let Some(cell) = self
                .rows
                .get_mut(covered.row as usize)
                .and_then(|row| row.cells.get_mut(covered.col as usize))
            {
                cell.release_merge();
            }
        }
        tracing::debug!(%region, "removed merged region");
        Ok(region)
    }

    /// Copy every cell present in `src` into the corresponding columns of
    /// row `row`, creating rows/columns as needed.
    ///
    /// `src` must come from the same workbook: style ids transfer as-is.
    pub fn copy_row(&mut self, row: u32, src: &Row) {
        self.row_mut(row).copy_from(src);
    }

    /// Append a row holding `values`, returning its row number.
    pub fn append_row(&mut self, values: impl IntoIterator<Item = CellValue>) -> u32 {
        let row = self.row_count();
        self.reserve_rows(row);
        for (col, value) in values.into_iter().enumerate() {
            self.cell_mut(row, col as u32).set_value(value);
        }
        row
    }

    /// Display text for the cell at `(row, col)`; empty for blank or
    /// never-materialized cells. Never grows the sheet.
    pub fn cell_text(&self, row: u32, col: u32, locale: &Locale) -> String {
        match self.cell_if_exists(row, col) {
            Some(cell) => {
                let styles = self.shared.styles.read();
                cell.display_text(styles.get(cell.style_id()), locale)
            }
            None => String::new(),
        }
    }

    /// Subscribe to this sheet's change notifications.
    pub fn subscribe(&mut self) -> Receiver<SheetEvent> {
        self.events.subscribe()
    }

    fn reserve_rows(&mut self, row: u32) {
        let first = self.rows.len() as u32;
        if row < first {
            return;
        }
        for row_num in first..=row {
            self.rows.push(Row::new(row_num));
        }
        let last = self.rows.len() as u32;
        tracing::trace!(first, last, "materialized rows");
        self.events.submit(SheetEvent::RowsAdded { first, last });
    }

    fn reserve_cell(&mut self, rc: RowCol) {
        assert!(
            rc.col <= MAX_COLUMN,
            "column number out of range: {}",
            rc.col
        );
        self.reserve_rows(rc.row);
        let added = self.rows[rc.row as usize].reserve(rc.col);
        if added > 0 {
            self.reserve_column(rc.col);
        }
    }

    fn reserve_column(&mut self, col: u32) {
        let old = self.column_count;
        self.column_count = self.column_count.max(col + 1);
        if self.column_count != old {
            tracing::trace!(first = old, last = self.column_count, "columns added");
            self.events.submit(SheetEvent::ColumnsAdded {
                first: old,
                last: self.column_count,
            });
        }
    }

    fn intern_value(&self, value: CellValue) -> CellValue {
        match value {
            CellValue::Text(s) => CellValue::Text(self.shared.cache.lock().intern(&s)),
            CellValue::Formula(s) => CellValue::Formula(self.shared.cache.lock().intern(&s)),
            other => other,
        }
    }
}

/// Mutable view of a row, borrowed from its sheet so that cell growth can
/// update the sheet's column bookkeeping.
///
/// Dereferences to [`Row`] for read access.
#[derive(Debug)]
pub struct RowMut<'a> {
    sheet: &'a mut Sheet,
    row: u32,
}

impl Deref for RowMut<'_> {
    type Target = Row;

    fn deref(&self) -> &Row {
        &self.sheet.rows[self.row as usize]
    }
}

impl RowMut<'_> {
    /// The cell at `col`, materializing blank cells (with the workbook's
    /// default style) for every column up to and including `col`.
    ///
    /// # Panics
    /// Panics if `col` exceeds [`MAX_COLUMN`].
    pub fn cell(&mut self, col: u32) -> &Cell {
        let rc = RowCol::new(self.row, col);
        self.sheet.reserve_cell(rc);
        &self.sheet.rows[self.row as usize].cells[col as usize]
    }

    /// Mutable access to the cell at `col`, materializing as needed.
    pub fn cell_mut(&mut self, col: u32) -> CellMut<'_> {
        let rc = RowCol::new(self.row, col);
        self.sheet.reserve_cell(rc);
        CellMut {
            sheet: self.sheet,
            rc,
        }
    }

    /// Copy value, type, and style of every cell present in `src` into the
    /// corresponding columns of this row.
    pub fn copy_from(&mut self, src: &Row) {
        for cell in src.cells() {
            self.cell_mut(cell.column()).copy_from(cell);
        }
    }
}

/// Mutable view of a single cell, borrowed from its sheet so that typed
/// setters can intern values through the workbook cache and emit change
/// notifications.
///
/// Value edits addressed at an absorbed cell of a merged region land on the
/// region's anchor cell. Dereferences to [`Cell`] (the addressed cell) for
/// read access.
#[derive(Debug)]
pub struct CellMut<'a> {
    sheet: &'a mut Sheet,
    rc: RowCol,
}

impl Deref for CellMut<'_> {
    type Target = Cell;

    fn deref(&self) -> &Cell {
        &self.sheet.rows[self.rc.row as usize].cells[self.rc.col as usize]
    }
}

impl CellMut<'_> {
    /// The coordinate this view addresses.
    pub fn row_col(&self) -> RowCol {
        self.rc
    }

    /// Set the cell value. Text and formula payloads are interned through
    /// the workbook cache; storing an identical value is a no-op that emits
    /// no notification. A blank value clears the cell.
    pub fn set_value(&mut self, value: CellValue) -> &mut Self {
        if value.is_blank() {
            return self.clear();
        }
        let value = self.sheet.intern_value(value);
        let rc = self.target();
        let cell = &mut self.sheet.rows[rc.row as usize].cells[rc.col as usize];
        if *cell.value() == value {
            return self;
        }
        let old = cell.value().clone();
        cell.set_value_internal(value.clone());
        self.sheet.events.submit(SheetEvent::CellValueChanged {
            cell: rc,
            old,
            new: value,
        });
        self
    }

    pub fn set_boolean(&mut self, value: bool) -> &mut Self {
        self.set_value(CellValue::Boolean(value))
    }

    pub fn set_number(&mut self, value: f64) -> &mut Self {
        self.set_value(CellValue::Number(value))
    }

    /// Set a text value; the empty string clears the cell.
    pub fn set_text(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            return self.clear();
        }
        self.set_value(CellValue::Text(Arc::from(text)))
    }

    /// Set a rich text value; empty rich text clears the cell.
    pub fn set_rich_text(&mut self, text: RichText) -> &mut Self {
        if text.is_empty() {
            return self.clear();
        }
        self.set_value(CellValue::RichText(Arc::new(text)))
    }

    pub fn set_date(&mut self, date: NaiveDate) -> &mut Self {
        self.set_value(CellValue::Date(date))
    }

    pub fn set_date_time(&mut self, datetime: NaiveDateTime) -> &mut Self {
        self.set_value(CellValue::DateTime(datetime))
    }

    /// Set formula source text (without a leading `=`); the empty string
    /// clears the cell.
    pub fn set_formula(&mut self, source: &str) -> &mut Self {
        if source.is_empty() {
            return self.clear();
        }
        self.set_value(CellValue::Formula(Arc::from(source)))
    }

    pub fn set_error(&mut self, error: ErrorValue) -> &mut Self {
        self.set_value(CellValue::Error(error))
    }

    /// Transition the cell to blank. A second clear on an already-blank cell
    /// emits no notification.
    pub fn clear(&mut self) -> &mut Self {
        let rc = self.target();
        let cell = &mut self.sheet.rows[rc.row as usize].cells[rc.col as usize];
        if cell.is_empty() {
            return self;
        }
        let old = cell.clear_internal();
        self.sheet.events.submit(SheetEvent::CellValueChanged {
            cell: rc,
            old,
            new: CellValue::Blank,
        });
        self
    }

    /// Swap the cell's style reference. Fails if `style` was minted by a
    /// different workbook; setting the current style again is a no-op.
    pub fn set_style(&mut self, style: StyleRef) -> Result<&mut Self, StyleError> {
        if style.workbook != self.sheet.shared.id {
            return Err(StyleError::ForeignWorkbook);
        }
        let workbook = self.sheet.shared.id;
        let cell = &mut self.sheet.rows[self.rc.row as usize].cells[self.rc.col as usize];
        let old = cell.style_id();
        if old != style.id {
            cell.set_style_internal(style.id);
            self.sheet.events.submit(SheetEvent::CellStyleChanged {
                cell: self.rc,
                old: StyleRef { workbook, id: old },
                new: style,
            });
        }
        Ok(self)
    }

    /// Assign the style registered under `name` in the owning workbook,
    /// registering a default style for a previously unseen name.
    pub fn set_style_by_name(&mut self, name: &str) -> &mut Self {
        let id = self.sheet.shared.styles.write().ensure(name);
        let workbook = self.sheet.shared.id;
        let style = StyleRef { workbook, id };
        self.set_style(style)
            .expect("style was minted by the owning workbook");
        self
    }

    /// Attach or remove a hyperlink target.
    pub fn set_hyperlink(&mut self, target: Option<&str>) -> &mut Self {
        let cell = &mut self.sheet.rows[self.rc.row as usize].cells[self.rc.col as usize];
        cell.set_hyperlink_internal(target);
        self
    }

    /// Copy value, type, style, and hyperlink from `src`.
    ///
    /// `src` must come from the same workbook: its style id transfers as-is.
    pub fn copy_from(&mut self, src: &Cell) -> &mut Self {
        let workbook = self.sheet.shared.id;
        let cell = &mut self.sheet.rows[self.rc.row as usize].cells[self.rc.col as usize];
        let old = cell.style_id();
        if old != src.style_id() {
            cell.set_style_internal(src.style_id());
            self.sheet.events.submit(SheetEvent::CellStyleChanged {
                cell: self.rc,
                old: StyleRef { workbook, id: old },
                new: StyleRef {
                    workbook,
                    id: src.style_id(),
                },
            });
        }
        self.set_value(src.value().clone());
        self.set_hyperlink(src.hyperlink());
        self
    }

    /// Remove the merged region this cell anchors.
    pub fn unmerge(&mut self) -> Result<Region, MergeError> {
        self.sheet.unmerge(self.rc)
    }

    fn target(&self) -> RowCol {
        self.sheet.rows[self.rc.row as usize].cells[self.rc.col as usize]
            .merge_anchor()
            .unwrap_or(self.rc)
    }
}
