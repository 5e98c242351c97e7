pub mod cell;
pub mod error;
pub mod page;
pub mod record;
pub mod row;
pub mod serial_type;
pub mod value;
pub mod varint;

// Common type aliases
pub type PageId = u32; // 0-based page index
pub type RowId = i64;

// Constants following the SQLite file format
pub const HEADER_SIZE: usize = 100; // Database header size, prefixed to page 0
pub const PAGE_SIZE_OFFSET: usize = 16; // Big-endian u16 page size inside the header
pub const LEAF_PAGE_HEADER_SIZE: usize = 8;
pub const INTERIOR_PAGE_HEADER_SIZE: usize = 12;
pub const CELL_POINTER_SIZE: usize = 2;
pub const MAX_VARINT_LEN: usize = 9;
pub const SCHEMA_ROOT_PAGE: PageId = 0;
pub const RESERVED_NAME_PREFIX: &str = "sqlite_";
