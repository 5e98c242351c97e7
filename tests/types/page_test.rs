use pindai::{
    types::{
        cell::Cell,
        error::DatabaseError,
        page::{Page, PageType},
        value::Value,
    },
    utils::mock::DatabaseBuilder,
};

const PAGE_SIZE: usize = 512;

fn fruit_rows(count: i64) -> Vec<(i64, Vec<Value>)> {
    (1..=count)
        .map(|id| (id, vec![Value::Null, Value::Text(format!("fruit {}", id))]))
        .collect()
}

fn single_table(rows: i64, leaf_capacity: usize) -> Vec<u8> {
    DatabaseBuilder::new()
        .page_size(PAGE_SIZE as u32)
        .leaf_capacity(leaf_capacity)
        .table(
            "fruits",
            "CREATE TABLE fruits (id integer primary key, name text)",
            fruit_rows(rows),
        )
        .build()
}

fn page(bytes: &[u8], index: usize) -> &[u8] {
    &bytes[index * PAGE_SIZE..(index + 1) * PAGE_SIZE]
}

#[test]
fn test_page_type_codes() {
    assert_eq!(PageType::from_u8(0x0D), Some(PageType::LeafTable));
    assert_eq!(PageType::from_u8(0x05), Some(PageType::InteriorTable));
    assert_eq!(PageType::from_u8(0x0A), Some(PageType::LeafIndex));
    assert_eq!(PageType::from_u8(0x02), Some(PageType::InteriorIndex));
    assert_eq!(PageType::from_u8(0x07), None);
    assert_eq!(PageType::LeafTable.header_size(), 8);
    assert_eq!(PageType::InteriorTable.header_size(), 12);
}

#[test]
fn test_first_page_header_follows_database_header() {
    let bytes = single_table(2, 10);
    let schema_page = Page::from_bytes(0, page(&bytes, 0)).unwrap();

    assert_eq!(schema_page.page_type, PageType::LeafTable);
    assert_eq!(schema_page.cell_count, 1);
    assert_eq!(schema_page.cell_pointer_array_offset, 108);
    assert!(schema_page.is_leaf());
}

#[test]
fn test_leaf_page_cells() {
    let bytes = single_table(3, 10);
    let leaf_bytes = page(&bytes, 1);
    let leaf = Page::from_bytes(1, leaf_bytes).unwrap();

    assert_eq!(leaf.cell_count, 3);
    assert_eq!(leaf.right_most_child, None);
    assert_eq!(leaf.cell_pointer_array_offset, 8);

    let cells = leaf.cells(leaf_bytes, PAGE_SIZE).unwrap();
    let row_ids: Vec<i64> = cells.iter().map(Cell::row_id).collect();
    assert_eq!(row_ids, vec![1, 2, 3]);

    let Cell::LeafTable(first) = &cells[0] else {
        panic!("expected a leaf table cell");
    };
    let row = first.to_row().unwrap();
    assert_eq!(row.values, vec![Value::Null, Value::Text("fruit 1".to_string())]);
}

#[test]
fn test_interior_page_cells_and_right_most_child() {
    // pages: schema, three leaves, interior root
    let bytes = single_table(5, 2);
    let root_bytes = page(&bytes, 4);
    let root = Page::from_bytes(4, root_bytes).unwrap();

    assert_eq!(root.page_type, PageType::InteriorTable);
    assert_eq!(root.cell_count, 2);
    assert_eq!(root.right_most_child, Some(4));
    assert_eq!(root.cell_pointer_array_offset, 12);

    let cells = root.cells(root_bytes, PAGE_SIZE).unwrap();
    let children: Vec<(u32, i64)> = cells
        .iter()
        .map(|cell| match cell {
            Cell::InteriorTable(interior) => (interior.left_child, interior.row_id),
            other => panic!("unexpected cell {:?}", other),
        })
        .collect();
    assert_eq!(children, vec![(2, 2), (3, 4)]);
}

#[test]
fn test_index_pages_are_unsupported() {
    let mut bytes = page(&single_table(1, 10), 1).to_vec();
    bytes[0] = 0x0A;
    assert!(matches!(
        Page::from_bytes(1, &bytes),
        Err(DatabaseError::UnsupportedPageType {
            page_id: 1,
            page_type: 0x0A
        })
    ));

    bytes[0] = 0x07;
    assert!(matches!(
        Page::from_bytes(1, &bytes),
        Err(DatabaseError::UnsupportedPageType { page_type: 0x07, .. })
    ));
}

#[test]
fn test_zero_content_offset_means_65536() {
    let mut bytes = vec![0u8; PAGE_SIZE];
    bytes[0] = 0x0D;
    let page = Page::from_bytes(3, &bytes).unwrap();
    assert_eq!(page.cell_content_area_offset, 65536);
    assert!(page.cells(&bytes, PAGE_SIZE).unwrap().is_empty());
}

#[test]
fn test_declared_cells_without_bytes_is_mismatch() {
    let mut bytes = page(&single_table(4, 10), 1).to_vec();
    // claim a fifth cell whose pointer slot is zeroed free space
    bytes[3..5].copy_from_slice(&5u16.to_be_bytes());
    let leaf = Page::from_bytes(1, &bytes).unwrap();

    assert!(matches!(
        leaf.cells(&bytes, PAGE_SIZE),
        Err(DatabaseError::CellCountMismatch {
            page_id: 1,
            declared: 5,
            decoded: 4
        })
    ));
}

#[test]
fn test_pointer_array_past_page_end_is_corrupt() {
    let mut bytes = page(&single_table(1, 10), 1).to_vec();
    bytes[3..5].copy_from_slice(&400u16.to_be_bytes());
    let leaf = Page::from_bytes(1, &bytes).unwrap();
    assert!(matches!(
        leaf.cells(&bytes, PAGE_SIZE),
        Err(DatabaseError::CorruptedPage { page_id: 1, .. })
    ));
}

#[test]
fn test_payload_past_page_end_is_corrupt() {
    let mut bytes = page(&single_table(1, 10), 1).to_vec();
    let leaf = Page::from_bytes(1, &bytes).unwrap();
    let pointer = leaf.cell_content_area_offset as usize;
    // single-byte payload size varint of the only cell, last cell on the page
    bytes[pointer] = 0x7F;

    assert!(matches!(
        leaf.cells(&bytes, PAGE_SIZE),
        Err(DatabaseError::CorruptedPage { page_id: 1, .. })
    ));
}

#[test]
fn test_payload_beyond_local_limit_reports_limit() {
    let mut bytes = vec![0u8; PAGE_SIZE];
    bytes[0] = 0x0D;
    bytes[3..5].copy_from_slice(&1u16.to_be_bytes());
    bytes[5..7].copy_from_slice(&400u16.to_be_bytes());
    bytes[8..10].copy_from_slice(&400u16.to_be_bytes());
    // payload size 512, rowid 1
    bytes[400..403].copy_from_slice(&[0x84, 0x00, 0x01]);

    let leaf = Page::from_bytes(2, &bytes).unwrap();
    let err = leaf.cells(&bytes, PAGE_SIZE).unwrap_err();
    assert!(matches!(
        err,
        DatabaseError::PayloadOverflow {
            page_id: 2,
            payload_size: 512,
            max_local: 477
        }
    ));
    assert!(err.to_string().contains("477 bytes"));
}
