use tabula_format::{parse_date, parse_datetime, parse_number, Locale};

use crate::sheet::{CellMut, Sheet};

/// Row-building protocol driven by format readers.
///
/// Readers call `start_row`, then `add_value` once per field, then `end_row`,
/// and repeat; they never need direct row/cell API knowledge. Calling the
/// methods out of order is a programming error and panics.
pub trait RowBuilder {
    fn start_row(&mut self);
    fn add_value(&mut self, value: &str);
    fn end_row(&mut self);
}

/// A [`RowBuilder`] that appends rows to an existing sheet, coercing each
/// field locale-aware before storage.
pub struct SheetRowBuilder<'a> {
    sheet: &'a mut Sheet,
    locale: Locale,
    current_row: Option<u32>,
    col: u32,
}

impl<'a> SheetRowBuilder<'a> {
    pub fn new(sheet: &'a mut Sheet, locale: Locale) -> Self {
        Self {
            sheet,
            locale,
            current_row: None,
            col: 0,
        }
    }
}

impl RowBuilder for SheetRowBuilder<'_> {
    fn start_row(&mut self) {
        assert!(self.current_row.is_none(), "unexpected call to start_row()");
        self.current_row = Some(self.sheet.row_count());
        self.col = 0;
    }

    fn add_value(&mut self, value: &str) {
        let row = self.current_row.expect("missing call to start_row()");
        let col = self.col;
        self.col += 1;
        self.sheet
            .cell_mut(row, col)
            .set_from_text(value, &self.locale);
    }

    fn end_row(&mut self) {
        assert!(self.current_row.is_some(), "unexpected call to end_row()");
        self.current_row = None;
        self.col = 0;
    }
}

impl CellMut<'_> {
    /// Set the cell from raw field text with automatic conversion.
    ///
    /// Coercion order: empty clears the cell, a leading `=` stores formula
    /// source, then boolean, locale-aware number, date, and date-time
    /// spellings are tried; anything else is stored as text.
    pub fn set_from_text(&mut self, value: &str, locale: &Locale) -> &mut Self {
        if value.is_empty() {
            return self.clear();
        }
        if let Some(formula) = value.strip_prefix('=') {
            return self.set_formula(formula);
        }
        if value.eq_ignore_ascii_case("true") {
            return self.set_boolean(true);
        }
        if value.eq_ignore_ascii_case("false") {
            return self.set_boolean(false);
        }
        if let Some(number) = parse_number(value, locale) {
            return self.set_number(number);
        }
        if let Some(date) = parse_date(value, locale) {
            return self.set_date(date);
        }
        if let Some(datetime) = parse_datetime(value, locale) {
            return self.set_date_time(datetime);
        }
        self.set_text(value)
    }
}
