use pretty_assertions::assert_eq;
use tabula_model::{CellValue, MergeError, Region, RowCol, SheetEvent, Workbook};

#[test]
fn merge_gives_the_anchor_the_full_span_and_absorbs_the_rest() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    sheet.cell_mut(0, 0).set_text("keep");
    sheet.cell_mut(0, 1).set_text("drop");
    sheet.cell_mut(1, 1).set_number(1.0);

    sheet.add_merged_region(Region::of(0, 0, 1, 1)).unwrap();

    let anchor = sheet.cell(0, 0);
    assert_eq!(anchor.horizontal_span(), 2);
    assert_eq!(anchor.vertical_span(), 2);
    assert!(anchor.is_merged());
    assert!(!anchor.is_absorbed());
    assert_eq!(anchor.text(), Ok("keep"));

    // Non-anchor members are cleared, span 0, and resolve to the anchor.
    for rc in [RowCol::new(0, 1), RowCol::new(1, 0), RowCol::new(1, 1)] {
        let cell = sheet.cell(rc.row, rc.col);
        assert!(cell.is_absorbed());
        assert_eq!(cell.horizontal_span(), 0);
        assert_eq!(cell.vertical_span(), 0);
        assert!(cell.is_empty());
        assert_eq!(cell.merge_anchor(), Some(RowCol::new(0, 0)));
        assert_eq!(sheet.logical_cell(rc), RowCol::new(0, 0));
    }

    // Plain cells resolve to themselves.
    assert_eq!(sheet.logical_cell(RowCol::new(5, 5)), RowCol::new(5, 5));
}

#[test]
fn overlapping_merges_are_rejected_without_mutation() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    let first = Region::of(0, 0, 1, 1);
    sheet.add_merged_region(first).unwrap();

    let overlapping = Region::of(1, 1, 2, 2);
    let err = sheet.add_merged_region(overlapping).unwrap_err();
    assert_eq!(
        err,
        MergeError::Overlap {
            region: overlapping,
            existing: first,
        }
    );

    // The region set and the cells outside the first region are untouched.
    assert_eq!(sheet.merged_regions(), &[first]);
    assert_eq!(sheet.cell(2, 2).horizontal_span(), 1);
    assert!(sheet.cell(2, 2).merge_anchor().is_none());
}

#[test]
fn edits_inside_a_merge_land_on_the_anchor() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    sheet.cell_mut(0, 0).set_text("keep");
    sheet.add_merged_region(Region::of(0, 0, 0, 1)).unwrap();

    sheet.cell_mut(0, 1).set_text("hello");
    assert_eq!(sheet.cell(0, 0).text(), Ok("hello"));
    assert!(sheet.cell(0, 1).is_empty());
}

#[test]
fn unmerge_restores_standalone_cells() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    let region = Region::of(0, 0, 1, 1);
    sheet.add_merged_region(region).unwrap();

    // Only the anchor may unmerge.
    assert_eq!(
        sheet.unmerge(RowCol::new(0, 1)),
        Err(MergeError::NotAnchor(RowCol::new(0, 1)))
    );

    assert_eq!(sheet.unmerge(RowCol::new(0, 0)), Ok(region));
    assert!(sheet.merged_regions().is_empty());

    for rc in region.cells() {
        let cell = sheet.cell(rc.row, rc.col);
        assert_eq!(cell.horizontal_span(), 1);
        assert_eq!(cell.vertical_span(), 1);
        assert!(cell.merge_anchor().is_none());
    }

    // Cells are independent again.
    sheet.cell_mut(0, 1).set_text("b");
    assert_eq!(sheet.cell(0, 1).text(), Ok("b"));
    assert!(sheet.cell(0, 0).is_empty());
}

#[test]
fn merging_clears_absorbed_values_with_notifications() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    sheet.cell_mut(0, 0).set_text("keep");
    sheet.cell_mut(0, 1).set_text("drop");
    let events = sheet.subscribe();

    sheet.add_merged_region(Region::of(0, 0, 0, 1)).unwrap();

    let cleared: Vec<_> = events
        .try_iter()
        .filter_map(|e| match e {
            SheetEvent::CellValueChanged { cell, old, new } => Some((cell, old, new)),
            _ => None,
        })
        .collect();
    assert_eq!(
        cleared,
        vec![(
            RowCol::new(0, 1),
            CellValue::from("drop"),
            CellValue::Blank
        )]
    );
}

#[test]
fn merge_regions_can_be_looked_up_by_coverage() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    let region = Region::of(2, 2, 3, 4);
    sheet.add_merged_region(region).unwrap();

    assert_eq!(sheet.merged_region_at(RowCol::new(3, 4)), Some(region));
    assert_eq!(sheet.merged_region_at(RowCol::new(0, 0)), None);
}

#[test]
fn merged_cursor_resolves_to_the_anchor() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Sheet1");

    sheet.cell_mut(2, 2).set_number(1.0);
    sheet.add_merged_region(Region::of(0, 0, 1, 1)).unwrap();

    sheet.set_current_cell(RowCol::new(1, 1)).unwrap();
    assert_eq!(sheet.current_cell(), RowCol::new(0, 0));
}
