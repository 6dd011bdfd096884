//! Integration test: tables through the document API

use pretty_assertions::assert_eq;
use wordpack::document::{
    BorderEdge, CellAddress, TableBorders, TableWidth, VerticalAlignment,
};
use wordpack::{Document, Error, Table};

fn reopen(doc: &mut Document) -> Document {
    let bytes = doc.to_bytes().expect("serialize");
    Document::from_bytes(&bytes).expect("reopen")
}

#[test]
fn test_table_roundtrip_through_package() {
    let mut doc = Document::new();
    doc.add_paragraph("before the table");
    {
        let table = doc.add_table(2, 3).unwrap();
        table.set_borders(TableBorders::all(BorderEdge::default()));
        table.set_width(TableWidth::Percent(100.0));
        for r in 0..2 {
            for c in 0..3 {
                table.set_cell_text(r, c, format!("cell {r}{c}")).unwrap();
            }
        }
        table.row_mut(0).unwrap().set_header(true);
    }

    let doc2 = reopen(&mut doc);
    assert_eq!(doc2.table_count(), 1);
    let table = doc2.table(0).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.column_count(), 3);
    assert_eq!(table.cell_text(1, 2).unwrap(), "cell 12");
    assert!(table.row(0).unwrap().properties.header);
    assert_eq!(table.properties.width, Some(TableWidth::Percent(100.0)));
}

#[test]
fn test_zero_dimension_table_rejected() {
    let mut doc = Document::new();
    assert!(matches!(
        doc.add_table(0, 4),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(doc.table_count(), 0);
}

#[test]
fn test_merges_survive_roundtrip() {
    let mut doc = Document::new();
    {
        let table = doc.add_table(3, 4).unwrap();
        for r in 0..3 {
            for c in 0..4 {
                table.set_cell_text(r, c, format!("{r}:{c}")).unwrap();
            }
        }
        table.merge_cells_horizontal(0, 0, 2).unwrap();
        table.merge_cells_vertical(1, 2, 3).unwrap();
    }

    let doc2 = reopen(&mut doc);
    let table = doc2.table(0).unwrap();

    // Horizontal: first row collapsed from 4 to 2 cells.
    assert_eq!(table.row(0).unwrap().cell_count(), 2);
    assert_eq!(table.cell(0, 0).unwrap().grid_span(), 3);
    assert_eq!(table.cell_text(0, 0).unwrap(), "0:0");

    // Vertical: origin keeps content, continuation is cleared.
    assert!(table.cell(1, 3).unwrap().is_v_merge_start());
    assert!(table.cell(2, 3).unwrap().is_v_merge_continue());
    assert_eq!(table.cell_text(1, 3).unwrap(), "1:3");
    assert_eq!(table.cell_text(2, 3).unwrap(), "");
}

#[test]
fn test_nested_tables_roundtrip() {
    let mut doc = Document::new();
    {
        let outer = doc.add_table(1, 2).unwrap();
        outer.set_cell_text(0, 0, "host cell").unwrap();

        let mut inner = Table::new(2, 2).unwrap();
        inner.set_cell_text(0, 0, "nested").unwrap();
        let mut deepest = Table::new(1, 1).unwrap();
        deepest.set_cell_text(0, 0, "level three").unwrap();
        inner.cell_mut(1, 1).unwrap().add_table(deepest);

        outer.cell_mut(0, 1).unwrap().add_table(inner);
    }

    let doc2 = reopen(&mut doc);
    let outer = doc2.table(0).unwrap();
    let inner = outer.cell(0, 1).unwrap().tables().next().unwrap();
    assert_eq!(inner.cell_text(0, 0).unwrap(), "nested");
    let deepest = inner.cell(1, 1).unwrap().tables().next().unwrap();
    assert_eq!(deepest.cell_text(0, 0).unwrap(), "level three");
}

#[test]
fn test_structural_edits_then_save() {
    let mut doc = Document::new();
    {
        let table = doc.add_table(2, 2).unwrap();
        table.set_column_width(0, 2400).unwrap();
        table.set_cell_text(0, 0, "a").unwrap();
        table.set_cell_text(1, 1, "d").unwrap();
        table.insert_row(1).unwrap();
        table.add_column().unwrap();
        table
            .cell_mut(1, 0)
            .unwrap()
            .set_vertical_alignment(VerticalAlignment::Center);
    }

    let doc2 = reopen(&mut doc);
    let table = doc2.table(0).unwrap();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column_count(), 3);
    assert_eq!(table.cell_text(0, 0).unwrap(), "a");
    assert_eq!(table.cell_text(2, 1).unwrap(), "d");
    // Inserted row copied the column width from its template.
    assert_eq!(table.cell(1, 0).unwrap().width(), Some(2400));
    assert_eq!(
        table.cell(1, 0).unwrap().vertical_alignment(),
        Some(VerticalAlignment::Center)
    );
}

#[test]
fn test_find_and_walk_after_reopen() {
    let mut doc = Document::new();
    {
        let table = doc.add_table(2, 2).unwrap();
        table.set_cell_text(0, 0, "alpha").unwrap();
        table.set_cell_text(0, 1, "beta").unwrap();
        table.set_cell_text(1, 0, "gamma").unwrap();
        table.set_cell_text(1, 1, "beta max").unwrap();
    }

    let doc2 = reopen(&mut doc);
    let table = doc2.table(0).unwrap();

    assert_eq!(table.find_cell("beta"), Some(CellAddress::new(0, 1)));
    assert_eq!(
        table.find_cells("beta"),
        vec![CellAddress::new(0, 1), CellAddress::new(1, 1)]
    );

    let mut walk = table.walk();
    let visited: Vec<_> = walk.by_ref().map(|(_, cell)| cell.text()).collect();
    assert_eq!(visited, vec!["alpha", "beta", "gamma", "beta max"]);
    assert_eq!(walk.progress(), (4, 4));
}
