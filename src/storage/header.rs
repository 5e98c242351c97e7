use crate::types::{HEADER_SIZE, error::DatabaseError};

pub const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// The 100-byte header at the start of every database file.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseHeader {
    pub magic: [u8; 16],
    /// Page size in bytes; the on-disk value 1 stands for 65536.
    pub page_size: u32,
    pub file_format_write_version: u8,
    pub file_format_read_version: u8,
    pub reserved_space: u8,
    pub max_embedded_payload_fraction: u8,
    pub min_embedded_payload_fraction: u8,
    pub leaf_payload_fraction: u8,
    pub file_change_counter: u32,
    pub database_size_pages: u32,
    pub freelist_trunk_page: u32,
    pub freelist_pages_count: u32,
    pub schema_cookie: u32,
    pub schema_format_number: u32,
    pub default_page_cache_size: u32,
    pub largest_root_btree_page: u32,
    pub text_encoding: u32,
    pub user_version: u32,
    pub incremental_vacuum_mode: u32,
    pub application_id: u32,
    pub reserved: [u8; 20],
    pub version_valid_for: u32,
    pub sqlite_version_number: u32,
}

impl Default for DatabaseHeader {
    fn default() -> Self {
        Self {
            magic: *SQLITE_MAGIC,
            page_size: 4096,
            file_format_write_version: 1,
            file_format_read_version: 1,
            reserved_space: 0,
            max_embedded_payload_fraction: 64,
            min_embedded_payload_fraction: 32,
            leaf_payload_fraction: 32,
            file_change_counter: 1,
            database_size_pages: 1,
            freelist_trunk_page: 0,
            freelist_pages_count: 0,
            schema_cookie: 1,
            schema_format_number: 4,
            default_page_cache_size: 0,
            largest_root_btree_page: 0,
            text_encoding: 1,
            user_version: 0,
            incremental_vacuum_mode: 0,
            application_id: 0,
            reserved: [0; 20],
            version_valid_for: 1,
            sqlite_version_number: 3_045_000,
        }
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

impl DatabaseHeader {
    /// Bytes per page available to cell content.
    pub fn usable_size(&self) -> usize {
        self.page_size as usize - self.reserved_space as usize
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(HEADER_SIZE);

        buffer.extend_from_slice(&self.magic);
        let stored_page_size: u16 = if self.page_size == 65536 {
            1
        } else {
            self.page_size as u16
        };
        buffer.extend_from_slice(&stored_page_size.to_be_bytes());
        buffer.push(self.file_format_write_version);
        buffer.push(self.file_format_read_version);
        buffer.push(self.reserved_space);
        buffer.push(self.max_embedded_payload_fraction);
        buffer.push(self.min_embedded_payload_fraction);
        buffer.push(self.leaf_payload_fraction);
        for field in [
            self.file_change_counter,
            self.database_size_pages,
            self.freelist_trunk_page,
            self.freelist_pages_count,
            self.schema_cookie,
            self.schema_format_number,
            self.default_page_cache_size,
            self.largest_root_btree_page,
            self.text_encoding,
            self.user_version,
            self.incremental_vacuum_mode,
            self.application_id,
        ] {
            buffer.extend_from_slice(&field.to_be_bytes());
        }
        buffer.extend_from_slice(&self.reserved);
        buffer.extend_from_slice(&self.version_valid_for.to_be_bytes());
        buffer.extend_from_slice(&self.sqlite_version_number.to_be_bytes());

        buffer.resize(HEADER_SIZE, 0);
        buffer
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DatabaseError> {
        if bytes.len() < HEADER_SIZE {
            return Err(DatabaseError::InvalidHeader {
                reason: format!("header too short: {} bytes", bytes.len()),
            });
        }

        let mut magic = [0u8; 16];
        magic.copy_from_slice(&bytes[0..16]);
        if &magic != SQLITE_MAGIC {
            return Err(DatabaseError::InvalidHeader {
                reason: "missing SQLite format 3 magic string".to_string(),
            });
        }

        let page_size = match u16::from_be_bytes([bytes[16], bytes[17]]) {
            1 => 65536,
            size if size >= 512 && size.is_power_of_two() => u32::from(size),
            size => {
                return Err(DatabaseError::InvalidHeader {
                    reason: format!("unsupported page size: {}", size),
                });
            }
        };

        let reserved_space = bytes[20];
        if page_size - u32::from(reserved_space) < 480 {
            return Err(DatabaseError::InvalidHeader {
                reason: format!(
                    "{} reserved bytes leave too little usable space in a {} byte page",
                    reserved_space, page_size
                ),
            });
        }

        let text_encoding = read_u32(bytes, 56);
        if text_encoding > 1 {
            return Err(DatabaseError::InvalidHeader {
                reason: format!("unsupported text encoding {} (only UTF-8 is read)", text_encoding),
            });
        }

        let mut reserved = [0u8; 20];
        reserved.copy_from_slice(&bytes[72..92]);

        Ok(Self {
            magic,
            page_size,
            file_format_write_version: bytes[18],
            file_format_read_version: bytes[19],
            reserved_space,
            max_embedded_payload_fraction: bytes[21],
            min_embedded_payload_fraction: bytes[22],
            leaf_payload_fraction: bytes[23],
            file_change_counter: read_u32(bytes, 24),
            database_size_pages: read_u32(bytes, 28),
            freelist_trunk_page: read_u32(bytes, 32),
            freelist_pages_count: read_u32(bytes, 36),
            schema_cookie: read_u32(bytes, 40),
            schema_format_number: read_u32(bytes, 44),
            default_page_cache_size: read_u32(bytes, 48),
            largest_root_btree_page: read_u32(bytes, 52),
            text_encoding,
            user_version: read_u32(bytes, 60),
            incremental_vacuum_mode: read_u32(bytes, 64),
            application_id: read_u32(bytes, 68),
            reserved,
            version_valid_for: read_u32(bytes, 92),
            sqlite_version_number: read_u32(bytes, 96),
        })
    }
}
