use pindai::{
    executor::scan::Scanner,
    storage::{
        btree::{BTreeWalker, page_index, rows_of},
        page_store::PageStore,
    },
    types::{
        error::{DatabaseError, ErrorKind},
        page::Page,
        value::Value,
    },
    utils::mock::{DatabaseBuilder, TempDatabase},
};

const PAGE_SIZE: usize = 512;

fn numbered_rows(count: i64) -> Vec<(i64, Vec<Value>)> {
    (1..=count)
        .map(|id| (id, vec![Value::Null, Value::Integer(id * 10)]))
        .collect()
}

fn numbers_database(count: i64, leaf_capacity: usize, fanout: usize) -> Vec<u8> {
    DatabaseBuilder::new()
        .page_size(PAGE_SIZE as u32)
        .leaf_capacity(leaf_capacity)
        .fanout(fanout)
        .table(
            "numbers",
            "CREATE TABLE numbers (id integer primary key, value integer)",
            numbered_rows(count),
        )
        .build()
}

/// Table root is always the last page the builder writes.
fn root_of(bytes: &[u8]) -> u32 {
    (bytes.len() / PAGE_SIZE - 1) as u32
}

fn leaf_cell_total(bytes: &[u8]) -> usize {
    (1..bytes.len() / PAGE_SIZE)
        .map(|index| {
            let page = &bytes[index * PAGE_SIZE..(index + 1) * PAGE_SIZE];
            Page::from_bytes(index as u32, page).unwrap()
        })
        .filter(Page::is_leaf)
        .map(|page| page.cell_count as usize)
        .sum()
}

#[test]
fn test_page_index_conversion() {
    assert_eq!(page_index(1, 0).unwrap(), 0);
    assert_eq!(page_index(7, 0).unwrap(), 6);
    assert!(matches!(
        page_index(0, 3),
        Err(DatabaseError::CorruptedPage { page_id: 3, .. })
    ));
}

#[test]
fn test_rows_match_leaf_cell_counts() {
    for &(count, leaf_capacity, fanout) in
        &[(0, 4, 2), (1, 4, 2), (4, 4, 2), (7, 3, 2), (30, 2, 3), (200, 7, 4)]
    {
        let bytes = numbers_database(count, leaf_capacity, fanout);
        let temp_db = TempDatabase::new(&bytes);
        let mut store = PageStore::open(temp_db.path()).unwrap();

        let rows = rows_of(&mut store, root_of(&bytes)).unwrap();
        assert_eq!(rows.len(), count as usize);
        assert_eq!(rows.len(), leaf_cell_total(&bytes));
    }
}

#[test]
fn test_rows_come_back_in_rowid_order() {
    let bytes = numbers_database(30, 2, 3);
    let temp_db = TempDatabase::new(&bytes);
    let mut store = PageStore::open(temp_db.path()).unwrap();

    let rows = rows_of(&mut store, root_of(&bytes)).unwrap();
    let row_ids: Vec<i64> = rows.iter().map(|row| row.row_id).collect();
    assert_eq!(row_ids, (1..=30).collect::<Vec<_>>());
    assert_eq!(rows[29].values, vec![Value::Null, Value::Integer(300)]);
}

#[test]
fn test_walker_yields_lazily_in_batches() {
    let bytes = numbers_database(10, 3, 2);
    let temp_db = TempDatabase::new(&bytes);
    let mut store = PageStore::open(temp_db.path()).unwrap();
    let mut walker = BTreeWalker::new(&mut store, root_of(&bytes));

    let first = walker.scan().unwrap().unwrap();
    assert_eq!(first.row_id, 1);

    let batch = walker.scan_batch(4).unwrap();
    assert_eq!(batch.iter().map(|r| r.row_id).collect::<Vec<_>>(), vec![2, 3, 4, 5]);

    let rest = walker.scan_batch(100).unwrap();
    assert_eq!(rest.len(), 5);
    assert!(walker.scan().unwrap().is_none());
}

#[test]
fn test_interior_cycle_is_detected() {
    // schema, two leaves, interior root at index 3
    let mut bytes = numbers_database(2, 1, 2);
    let root = 3 * PAGE_SIZE;
    bytes[root + 8..root + 12].copy_from_slice(&4u32.to_be_bytes());

    let temp_db = TempDatabase::new(&bytes);
    let mut store = PageStore::open(temp_db.path()).unwrap();
    let err = rows_of(&mut store, 3).unwrap_err();

    assert!(matches!(err, DatabaseError::BTreeCycle { page_id: 3 }));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_child_beyond_file_is_corrupt() {
    let mut bytes = numbers_database(2, 1, 2);
    let root = 3 * PAGE_SIZE;
    bytes[root + 8..root + 12].copy_from_slice(&99u32.to_be_bytes());

    let temp_db = TempDatabase::new(&bytes);
    let mut store = PageStore::open(temp_db.path()).unwrap();
    assert!(matches!(
        rows_of(&mut store, 3),
        Err(DatabaseError::CorruptedPage { page_id: 98, .. })
    ));
}

#[test]
fn test_zero_child_pointer_is_corrupt() {
    let mut bytes = numbers_database(2, 1, 2);
    let root = 3 * PAGE_SIZE;
    let pointer = u16::from_be_bytes([bytes[root + 12], bytes[root + 13]]) as usize;
    bytes[root + pointer..root + pointer + 4].copy_from_slice(&0u32.to_be_bytes());

    let temp_db = TempDatabase::new(&bytes);
    let mut store = PageStore::open(temp_db.path()).unwrap();
    assert!(matches!(
        rows_of(&mut store, 3),
        Err(DatabaseError::CorruptedPage { page_id: 3, .. })
    ));
}

#[test]
fn test_index_root_is_rejected() {
    let mut bytes = numbers_database(2, 10, 2);
    bytes[PAGE_SIZE] = 0x0A;

    let temp_db = TempDatabase::new(&bytes);
    let mut store = PageStore::open(temp_db.path()).unwrap();
    assert!(matches!(
        rows_of(&mut store, 1),
        Err(DatabaseError::UnsupportedPageType { page_id: 1, page_type: 0x0A })
    ));
}

#[test]
fn test_bad_record_reports_its_page() {
    let mut bytes = numbers_database(1, 10, 2);
    let leaf = PAGE_SIZE;
    let pointer = u16::from_be_bytes([bytes[leaf + 8], bytes[leaf + 9]]) as usize;
    // cell: payload size, rowid, header size, serial(NULL), serial(int8)
    bytes[leaf + pointer + 4] = 0x0A;

    let temp_db = TempDatabase::new(&bytes);
    let mut store = PageStore::open(temp_db.path()).unwrap();
    let err = rows_of(&mut store, 1).unwrap_err();

    assert!(matches!(err, DatabaseError::InPage { page_id: 1, .. }));
    assert!(matches!(err.root_cause(), DatabaseError::UnsupportedSerialType(10)));
    assert_eq!(err.kind(), ErrorKind::Format);
}
