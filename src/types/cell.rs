use crate::types::{
    PageId, RowId, error::DatabaseError, page::PageType, row::Row, varint::read_varint,
};

/// Leaf table cell: rowid key plus the record split into header and body.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafTableCell<'a> {
    pub row_id: RowId,
    pub payload_size: u64,
    pub payload_header: &'a [u8],
    pub payload_body: &'a [u8],
}

impl LeafTableCell<'_> {
    pub fn to_row(&self) -> Result<Row, DatabaseError> {
        Row::from_payload(self.row_id, self.payload_header, self.payload_body)
    }
}

/// Interior table cell: the largest rowid of the left subtree and its
/// 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteriorTableCell {
    pub row_id: RowId,
    pub left_child: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    LeafTable(LeafTableCell<'a>),
    InteriorTable(InteriorTableCell),
}

impl<'a> Cell<'a> {
    /// Parse the cell starting at `offset`. `page` must already be cut to the
    /// usable size so payloads cannot reach into the reserved region.
    pub fn parse(
        page: &'a [u8],
        offset: usize,
        page_type: PageType,
        page_id: PageId,
    ) -> Result<Self, DatabaseError> {
        match page_type {
            PageType::LeafTable => Self::parse_leaf(page, offset, page_id).map(Cell::LeafTable),
            PageType::InteriorTable => {
                Self::parse_interior(page, offset, page_id).map(Cell::InteriorTable)
            }
            other => Err(DatabaseError::UnsupportedPageType {
                page_id,
                page_type: other.as_u8(),
            }),
        }
    }

    fn parse_leaf(
        page: &'a [u8],
        offset: usize,
        page_id: PageId,
    ) -> Result<LeafTableCell<'a>, DatabaseError> {
        let mut cursor = offset;
        let (payload_size, consumed) = read_varint(&page[cursor..])?;
        cursor += consumed;
        let (row_id, consumed) = read_varint(&page[cursor..])?;
        cursor += consumed;

        // Larger payloads spill into overflow pages, which are not followed
        let max_local = page.len().saturating_sub(35);
        if payload_size > max_local as u64 {
            return Err(DatabaseError::PayloadOverflow {
                page_id,
                payload_size,
                max_local,
            });
        }
        let available = page.len() - cursor;
        if payload_size > available as u64 {
            return Err(DatabaseError::CorruptedPage {
                page_id,
                reason: format!(
                    "{} byte payload at offset {} runs past the page end",
                    payload_size, cursor
                ),
            });
        }
        let payload = &page[cursor..cursor + payload_size as usize];

        let (header_size, _) = read_varint(payload)?;
        if header_size > payload_size {
            return Err(DatabaseError::TruncatedRecord {
                reason: format!(
                    "record header of {} bytes exceeds a {} byte payload",
                    header_size, payload_size
                ),
            });
        }
        let (payload_header, payload_body) = payload.split_at(header_size as usize);

        Ok(LeafTableCell {
            row_id: row_id as RowId,
            payload_size,
            payload_header,
            payload_body,
        })
    }

    fn parse_interior(
        page: &[u8],
        offset: usize,
        page_id: PageId,
    ) -> Result<InteriorTableCell, DatabaseError> {
        let pointer = page
            .get(offset..offset + 4)
            .ok_or_else(|| DatabaseError::CorruptedPage {
                page_id,
                reason: format!("interior cell at offset {} runs past the page end", offset),
            })?;
        let left_child = u32::from_be_bytes([pointer[0], pointer[1], pointer[2], pointer[3]]);
        if left_child == 0 {
            return Err(DatabaseError::CorruptedPage {
                page_id,
                reason: format!("interior cell at offset {} has a zero child pointer", offset),
            });
        }
        let (row_id, _) = read_varint(&page[offset + 4..])?;

        Ok(InteriorTableCell {
            row_id: row_id as RowId,
            left_child,
        })
    }

    pub fn row_id(&self) -> RowId {
        match self {
            Cell::LeafTable(cell) => cell.row_id,
            Cell::InteriorTable(cell) => cell.row_id,
        }
    }
}
