use std::sync::Arc;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tabula_model::{CellType, CellValue, ErrorValue, Locale, RichText, Workbook};

#[test]
fn rows_and_cells_materialize_lazily() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    assert_eq!(sheet.row_count(), 0);
    assert_eq!(sheet.column_count(), 0);
    assert_eq!(sheet.last_row_num(), None);
    assert_eq!(sheet.last_col_num(), None);

    // A read has the same growth side effect as a write.
    let cell = sheet.cell(2, 3);
    assert!(cell.is_empty());
    assert_eq!(cell.column(), 3);

    assert_eq!(sheet.row_count(), 3);
    assert_eq!(sheet.column_count(), 4);
    assert_eq!(sheet.last_row_num(), Some(2));
    assert_eq!(sheet.last_col_num(), Some(3));

    // Intervening rows exist but have no materialized cells.
    assert_eq!(sheet.row_if_exists(1).unwrap().last_cell_num(), None);
    assert_eq!(sheet.row_if_exists(2).unwrap().last_cell_num(), Some(3));

    // Column count never shrinks.
    sheet.cell(5, 0);
    assert_eq!(sheet.column_count(), 4);
    assert_eq!(sheet.row_count(), 6);
}

#[test]
fn cell_index_always_matches_column_number() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    for col in [0u32, 1, 7, 19] {
        let mut row = sheet.row_mut(0);
        let cell = row.cell(col);
        assert_eq!(cell.column(), col);
        assert!(row.last_cell_num().unwrap() >= col);
    }

    for (i, cell) in sheet.row(0).cells().enumerate() {
        assert_eq!(cell.column(), i as u32);
    }
}

#[test]
fn read_only_lookups_do_not_grow() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");
    sheet.cell_mut(0, 0).set_number(1.0);

    assert!(sheet.cell_if_exists(0, 5).is_none());
    assert!(sheet.cell_if_exists(9, 0).is_none());
    assert_eq!(sheet.cell_text(9, 9, &Locale::en_us()), "");
    assert_eq!(sheet.row_count(), 1);
    assert_eq!(sheet.column_count(), 1);
}

#[test]
fn typed_values_round_trip() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");
    let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let datetime = date.and_hms_opt(13, 30, 0).unwrap();

    sheet.cell_mut(0, 0).set_boolean(true);
    sheet.cell_mut(0, 1).set_number(123.5);
    sheet.cell_mut(0, 2).set_text("hello");
    sheet.cell_mut(0, 3).set_date(date);
    sheet.cell_mut(0, 4).set_date_time(datetime);
    sheet.cell_mut(0, 5).set_formula("SUM(A1:A3)");
    sheet.cell_mut(0, 6).set_error(ErrorValue::Na);

    let row = sheet.row(0);
    assert_eq!(row.cell_if_exists(0).unwrap().boolean(), Ok(true));
    assert_eq!(row.cell_if_exists(1).unwrap().number(), Ok(123.5));
    assert_eq!(row.cell_if_exists(2).unwrap().text(), Ok("hello"));
    assert_eq!(row.cell_if_exists(3).unwrap().date(), Ok(date));
    assert_eq!(row.cell_if_exists(4).unwrap().date_time(), Ok(datetime));
    assert_eq!(row.cell_if_exists(5).unwrap().formula(), Ok("SUM(A1:A3)"));
    assert_eq!(
        row.cell_if_exists(6).unwrap().error_value(),
        Ok(ErrorValue::Na)
    );

    assert_eq!(row.cell_if_exists(0).unwrap().cell_type(), CellType::Boolean);
    assert_eq!(row.cell_if_exists(1).unwrap().cell_type(), CellType::Numeric);
    assert_eq!(row.cell_if_exists(2).unwrap().cell_type(), CellType::Text);
    assert_eq!(row.cell_if_exists(3).unwrap().cell_type(), CellType::Date);
    assert_eq!(
        row.cell_if_exists(4).unwrap().cell_type(),
        CellType::DateTime
    );
    assert_eq!(row.cell_if_exists(5).unwrap().cell_type(), CellType::Formula);
    assert_eq!(row.cell_if_exists(6).unwrap().cell_type(), CellType::Error);
}

#[test]
fn typed_accessors_reject_mismatches() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");
    sheet.cell_mut(0, 0).set_number(1.0);

    let cell = sheet.cell(0, 0);
    let err = cell.boolean().unwrap_err();
    assert_eq!(err.expected, CellType::Boolean);
    assert_eq!(err.actual, CellType::Numeric);
    assert!(cell.text().is_err());
    assert!(cell.date().is_err());
    assert!(cell.formula().is_err());
}

#[test]
fn empty_text_clears_the_cell() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    sheet.cell_mut(0, 0).set_text("x");
    assert_eq!(sheet.cell(0, 0).cell_type(), CellType::Text);

    sheet.cell_mut(0, 0).set_text("");
    assert!(sheet.cell(0, 0).is_empty());
    assert_eq!(sheet.cell(0, 0).value(), &CellValue::Blank);
}

#[test]
fn rich_text_shares_the_text_type_tag() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    sheet
        .cell_mut(0, 0)
        .set_rich_text(RichText::new("styled"));
    let cell = sheet.cell(0, 0);
    assert_eq!(cell.cell_type(), CellType::Text);
    assert!(cell.is_rich_text());
    assert_eq!(cell.text(), Ok("styled"));
    assert_eq!(cell.rich_text().unwrap().plain_text(), "styled");

    sheet.cell_mut(0, 1).set_text("plain");
    assert!(!sheet.cell(0, 1).is_rich_text());
    assert!(sheet.cell(0, 1).rich_text().is_none());
}

#[test]
fn repeated_text_values_share_one_allocation() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    sheet.cell_mut(0, 0).set_text("N/A");
    sheet.cell_mut(1, 0).set_text("N/A");

    let a = match sheet.cell(0, 0).value() {
        CellValue::Text(s) => Arc::clone(s),
        other => panic!("unexpected value: {other:?}"),
    };
    let b = match sheet.cell(1, 0).value() {
        CellValue::Text(s) => Arc::clone(s),
        other => panic!("unexpected value: {other:?}"),
    };
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn hyperlinks_are_sparse_attributes() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    assert_eq!(sheet.cell(0, 0).hyperlink(), None);
    sheet
        .cell_mut(0, 0)
        .set_hyperlink(Some("https://example.com/"));
    assert_eq!(sheet.cell(0, 0).hyperlink(), Some("https://example.com/"));

    sheet.cell_mut(0, 0).set_hyperlink(None);
    assert_eq!(sheet.cell(0, 0).hyperlink(), None);
}

#[test]
fn a1_helpers_address_cells() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    sheet.cell_mut_a1("B2").unwrap().set_number(3.0);
    assert_eq!(sheet.cell(1, 1).number(), Ok(3.0));
    assert_eq!(sheet.cell_a1("$B$2").unwrap().number(), Ok(3.0));
    assert!(sheet.cell_a1("nope!").is_err());
}

#[test]
fn copy_row_transfers_values_and_styles() {
    let mut wb = Workbook::new();
    let bold = wb.cell_style("bold");

    let src_sheet = wb.create_sheet("src");
    src_sheet.cell_mut(0, 0).set_text("a");
    src_sheet.cell_mut(0, 2).set_number(2.0);
    src_sheet
        .cell_mut(0, 2)
        .set_style(bold)
        .unwrap()
        .set_hyperlink(Some("https://example.com/"));
    let src_row = src_sheet.row(0).clone();

    let dst_sheet = wb.create_sheet("dst");
    dst_sheet.copy_row(0, &src_row);

    assert_eq!(dst_sheet.cell(0, 0).text(), Ok("a"));
    assert!(dst_sheet.cell(0, 1).is_empty());
    assert_eq!(dst_sheet.cell(0, 2).number(), Ok(2.0));
    assert_eq!(
        dst_sheet.cell(0, 2).style_id(),
        src_row.cell_if_exists(2).unwrap().style_id()
    );
    assert_eq!(
        dst_sheet.cell(0, 2).hyperlink(),
        Some("https://example.com/")
    );
}

#[test]
fn append_row_scenario_renders_like_the_source_data() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Data");

    sheet.cell_mut(0, 0).set_text("Name");
    sheet.cell_mut(0, 1).set_text("Amount");
    sheet.cell_mut(1, 0).set_text("Widget");
    sheet.cell_mut(1, 1).set_number(42.5);

    assert_eq!(sheet.row_count(), 2);
    assert_eq!(sheet.column_count(), 2);
    assert_eq!(sheet.cell_text(1, 1, &Locale::en_us()), "42.5");
    assert_eq!(sheet.cell_text(1, 1, &Locale::de_de()), "42,5");
    assert_eq!(sheet.cell_text(1, 0, &Locale::en_us()), "Widget");
}

#[test]
fn append_row_builds_typed_cells() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");
    let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

    let row = sheet.append_row(vec![
        CellValue::from("a"),
        CellValue::from(123.5),
        CellValue::Blank,
        CellValue::from(date),
        CellValue::from(true),
    ]);

    assert_eq!(row, 0);
    assert_eq!(sheet.row_count(), 1);
    assert_eq!(sheet.cell(0, 0).text(), Ok("a"));
    assert_eq!(sheet.cell(0, 1).number(), Ok(123.5));
    assert_eq!(sheet.cell_text(0, 1, &Locale::en_us()), "123.5");
    assert_eq!(sheet.cell_text(0, 1, &Locale::de_de()), "123,5");
    assert!(sheet.cell(0, 2).is_empty());
    assert_eq!(sheet.cell(0, 3).date(), Ok(date));
    assert_eq!(sheet.cell_text(0, 3, &Locale::en_us()), "Jan 1, 2023");
    assert_eq!(sheet.cell_text(0, 3, &Locale::de_de()), "01.01.2023");
    assert_eq!(sheet.cell(0, 4).boolean(), Ok(true));
}

#[test]
fn cell_value_serde_schema_is_stable() {
    let v = serde_json::to_value(CellValue::Number(1.5)).unwrap();
    assert_eq!(v, serde_json::json!({ "type": "number", "value": 1.5 }));

    let v = serde_json::to_value(CellValue::Error(ErrorValue::Div0)).unwrap();
    assert_eq!(v, serde_json::json!({ "type": "error", "value": "#DIV/0!" }));

    let v = serde_json::to_value(CellValue::from("x")).unwrap();
    assert_eq!(v, serde_json::json!({ "type": "text", "value": "x" }));

    let back: CellValue = serde_json::from_value(v).unwrap();
    assert_eq!(back, CellValue::from("x"));
}
