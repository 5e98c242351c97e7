//! Fixtures for tests and benchmarks: an in-memory writer for small SQLite
//! files and a temporary-file wrapper that opens them.

use std::{io::Write, path::Path};

use tempfile::NamedTempFile;

use crate::{
    storage::{header::DatabaseHeader, storage_manager::StorageManager},
    types::{
        HEADER_SIZE, INTERIOR_PAGE_HEADER_SIZE, LEAF_PAGE_HEADER_SIZE, RowId,
        error::DatabaseError, page::PageType, record::encode_record, value::Value,
        varint::write_varint,
    },
};

pub type RowData = (RowId, Vec<Value>);

struct SchemaObject {
    object_type: String,
    name: String,
    table_name: String,
    sql: String,
    rows: Option<Vec<RowData>>,
}

/// Lays out a database file the way SQLite does for table B-trees: page 1
/// holds the header and the schema leaf, every table gets its own tree, and
/// tables with more rows than `leaf_capacity` get interior levels.
pub struct DatabaseBuilder {
    page_size: u32,
    reserved_space: u8,
    leaf_capacity: usize,
    fanout: usize,
    objects: Vec<SchemaObject>,
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self {
            page_size: 4096,
            reserved_space: 0,
            leaf_capacity: usize::MAX,
            fanout: usize::MAX,
            objects: Vec::new(),
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn reserved_space(mut self, reserved_space: u8) -> Self {
        self.reserved_space = reserved_space;
        self
    }

    /// Maximum rows per leaf page; extra rows force interior pages.
    pub fn leaf_capacity(mut self, rows: usize) -> Self {
        assert!(rows > 0, "leaf capacity must be positive");
        self.leaf_capacity = rows;
        self
    }

    /// Maximum children per interior page.
    pub fn fanout(mut self, children: usize) -> Self {
        assert!(children >= 2, "interior pages need at least two children");
        self.fanout = children;
        self
    }

    /// Add a table. Rows must be in ascending rowid order.
    pub fn table(mut self, name: &str, sql: &str, rows: Vec<RowData>) -> Self {
        assert!(
            rows.windows(2).all(|pair| pair[0].0 < pair[1].0),
            "rows of {} must have ascending rowids",
            name
        );
        self.objects.push(SchemaObject {
            object_type: "table".to_string(),
            name: name.to_string(),
            table_name: name.to_string(),
            sql: sql.to_string(),
            rows: Some(rows),
        });
        self
    }

    /// Add an index entry to the schema. No index pages are written.
    pub fn index(mut self, name: &str, table_name: &str, sql: &str) -> Self {
        self.objects.push(SchemaObject {
            object_type: "index".to_string(),
            name: name.to_string(),
            table_name: table_name.to_string(),
            sql: sql.to_string(),
            rows: None,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pages: Vec<Vec<u8>> = vec![Vec::new()];
        let mut schema_rows = Vec::with_capacity(self.objects.len());

        for (position, object) in self.objects.iter().enumerate() {
            let root_page_number = match &object.rows {
                Some(rows) => i64::from(self.write_tree(&mut pages, rows)),
                None => 0,
            };
            schema_rows.push((
                position as RowId + 1,
                vec![
                    Value::Text(object.object_type.clone()),
                    Value::Text(object.name.clone()),
                    Value::Text(object.table_name.clone()),
                    Value::Integer(root_page_number),
                    Value::Text(object.sql.clone()),
                ],
            ));
        }

        let schema_cells: Vec<Vec<u8>> = schema_rows.iter().map(leaf_cell).collect();
        pages[0] = self.layout_page(0, PageType::LeafTable, &schema_cells, None);

        let header = DatabaseHeader {
            page_size: self.page_size,
            reserved_space: self.reserved_space,
            database_size_pages: pages.len() as u32,
            ..DatabaseHeader::default()
        };
        pages[0][..HEADER_SIZE].copy_from_slice(&header.to_bytes());

        pages.concat()
    }

    /// Write the tree for `rows` and return its 1-based root page number.
    fn write_tree(&self, pages: &mut Vec<Vec<u8>>, rows: &[RowData]) -> u32 {
        // (page number, largest rowid in the subtree)
        let mut level: Vec<(u32, RowId)> = Vec::new();

        if rows.is_empty() {
            let page = self.layout_page(pages.len(), PageType::LeafTable, &[], None);
            pages.push(page);
            return pages.len() as u32;
        }

        for chunk in rows.chunks(self.leaf_capacity) {
            let cells: Vec<Vec<u8>> = chunk.iter().map(leaf_cell).collect();
            let page = self.layout_page(pages.len(), PageType::LeafTable, &cells, None);
            pages.push(page);
            level.push((pages.len() as u32, chunk[chunk.len() - 1].0));
        }

        while level.len() > 1 {
            let mut parents = Vec::new();
            for group in level.chunks(self.fanout) {
                let (last_page, last_row_id) = group[group.len() - 1];
                let cells: Vec<Vec<u8>> = group[..group.len() - 1]
                    .iter()
                    .map(|&(page_number, max_row_id)| interior_cell(page_number, max_row_id))
                    .collect();
                let page =
                    self.layout_page(pages.len(), PageType::InteriorTable, &cells, Some(last_page));
                pages.push(page);
                parents.push((pages.len() as u32, last_row_id));
            }
            level = parents;
        }

        level[0].0
    }

    /// One page image: header, pointer array, then cells packed downward
    /// from the end of the usable area.
    fn layout_page(
        &self,
        page_index: usize,
        page_type: PageType,
        cells: &[Vec<u8>],
        right_most_child: Option<u32>,
    ) -> Vec<u8> {
        let page_size = self.page_size as usize;
        let usable_size = page_size - self.reserved_space as usize;
        let mut page = vec![0u8; page_size];

        let header_offset = if page_index == 0 { HEADER_SIZE } else { 0 };
        let header_size = match page_type {
            PageType::InteriorTable => INTERIOR_PAGE_HEADER_SIZE,
            _ => LEAF_PAGE_HEADER_SIZE,
        };
        let mut pointer_at = header_offset + header_size;

        let mut content_start = usable_size;
        for cell in cells {
            assert!(
                content_start >= cell.len() && content_start - cell.len() >= pointer_at + 2,
                "page {} overflows; lower leaf_capacity or fanout",
                page_index
            );
            content_start -= cell.len();
            page[content_start..content_start + cell.len()].copy_from_slice(cell);
            page[pointer_at..pointer_at + 2].copy_from_slice(&(content_start as u16).to_be_bytes());
            pointer_at += 2;
        }

        let header = &mut page[header_offset..header_offset + header_size];
        header[0] = page_type.as_u8();
        header[3..5].copy_from_slice(&(cells.len() as u16).to_be_bytes());
        // 65536 is stored as 0
        header[5..7].copy_from_slice(&(content_start as u16).to_be_bytes());
        if let Some(child) = right_most_child {
            header[8..12].copy_from_slice(&child.to_be_bytes());
        }

        page
    }
}

fn leaf_cell((row_id, values): &RowData) -> Vec<u8> {
    let payload = encode_record(values);
    let mut cell = Vec::with_capacity(payload.len() + 18);
    write_varint(&mut cell, payload.len() as u64);
    write_varint(&mut cell, *row_id as u64);
    cell.extend_from_slice(&payload);
    cell
}

fn interior_cell(child_page_number: u32, max_row_id: RowId) -> Vec<u8> {
    let mut cell = child_page_number.to_be_bytes().to_vec();
    write_varint(&mut cell, max_row_id as u64);
    cell
}

/// A database file that lives as long as the value does.
pub struct TempDatabase {
    file: NamedTempFile,
    pub storage_manager: Option<StorageManager>,
}

impl TempDatabase {
    pub fn new(bytes: &[u8]) -> Self {
        Self::with_prefix("pindai_test_", bytes)
    }

    pub fn with_prefix(prefix: &str, bytes: &[u8]) -> Self {
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".db")
            .tempfile()
            .expect("failed to create temporary database file");
        file.write_all(bytes).expect("failed to write temporary database file");
        file.flush().expect("failed to flush temporary database file");
        Self {
            file,
            storage_manager: None,
        }
    }

    pub fn from_builder(builder: &DatabaseBuilder) -> Self {
        Self::new(&builder.build())
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn create_storage_manager(&mut self) -> Result<&mut StorageManager, DatabaseError> {
        let storage_manager = StorageManager::open(self.file.path())?;
        Ok(self.storage_manager.insert(storage_manager))
    }

    pub fn get_storage_manager(&mut self) -> Option<&mut StorageManager> {
        self.storage_manager.as_mut()
    }
}
