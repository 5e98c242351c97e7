use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{
    CELL_POINTER_SIZE, HEADER_SIZE, INTERIOR_PAGE_HEADER_SIZE, LEAF_PAGE_HEADER_SIZE, PageId,
    cell::Cell, error::DatabaseError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageType {
    InteriorIndex = 2,
    InteriorTable = 5,
    LeafIndex = 10,
    LeafTable = 13,
}

impl PageType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            2 => Some(PageType::InteriorIndex),
            5 => Some(PageType::InteriorTable),
            10 => Some(PageType::LeafIndex),
            13 => Some(PageType::LeafTable),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn is_interior(&self) -> bool {
        matches!(self, PageType::InteriorIndex | PageType::InteriorTable)
    }

    pub fn is_table(&self) -> bool {
        matches!(self, PageType::InteriorTable | PageType::LeafTable)
    }

    pub fn header_size(&self) -> usize {
        if self.is_interior() {
            INTERIOR_PAGE_HEADER_SIZE
        } else {
            LEAF_PAGE_HEADER_SIZE
        }
    }
}

/*
 * B-tree page layout
 * ┌─────────────────────────────────────────────────────────────────┐
 * │  DATABASE HEADER (100 bytes, page 0 only)                       │
 * ├─────────────────────────────────────────────────────────────────┤
 * │  PAGE HEADER (8 bytes leaf, 12 bytes interior)                  │
 * │  type(1) | first_freeblock(2) | cell_count(2) |                 │
 * │  content_offset(2) | fragmented(1) | [right_most_child(4)]      │
 * ├─────────────────────────────────────────────────────────────────┤
 * │  CELL POINTER ARRAY   [ptr0(2)] [ptr1(2)] ...                   │
 * ├─────────────────────────────────────────────────────────────────┤
 * │                    UNALLOCATED                                  │
 * ├─────────────────────────────────────────────────────────────────┤
 * │  CELL CONTENT AREA (grows downward from the end of the page)    │
 * ├─────────────────────────────────────────────────────────────────┤
 * │  RESERVED (header byte 20, usually 0)                           │
 * └─────────────────────────────────────────────────────────────────┘
 */

/// Decoded page header of a table B-tree page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub page_id: PageId,
    pub page_type: PageType,
    pub first_freeblock: u16,
    pub cell_count: u16,
    /// Start of the cell content area; a stored 0 means 65536.
    pub cell_content_area_offset: u32,
    pub fragmented_free_bytes: u8,
    /// Interior pages only: 1-based page number of the right-most subtree.
    pub right_most_child: Option<u32>,
    pub cell_pointer_array_offset: usize,
}

impl Page {
    /// Parse the header of page `page_id`. Page 0 starts after the
    /// 100-byte database header.
    pub fn from_bytes(page_id: PageId, bytes: &[u8]) -> Result<Self, DatabaseError> {
        let header_offset = if page_id == 0 { HEADER_SIZE } else { 0 };
        let header = bytes
            .get(header_offset..header_offset + LEAF_PAGE_HEADER_SIZE)
            .ok_or_else(|| DatabaseError::CorruptedPage {
                page_id,
                reason: format!("page of {} bytes is too small for a page header", bytes.len()),
            })?;

        let page_type = match PageType::from_u8(header[0]) {
            Some(page_type) if page_type.is_table() => page_type,
            _ => {
                return Err(DatabaseError::UnsupportedPageType {
                    page_id,
                    page_type: header[0],
                });
            }
        };

        let first_freeblock = u16::from_be_bytes([header[1], header[2]]);
        let cell_count = u16::from_be_bytes([header[3], header[4]]);
        let raw_content_offset = u16::from_be_bytes([header[5], header[6]]);
        let cell_content_area_offset = if raw_content_offset == 0 {
            65536
        } else {
            u32::from(raw_content_offset)
        };
        let fragmented_free_bytes = header[7];

        let right_most_child = if page_type.is_interior() {
            let pointer = bytes
                .get(header_offset + 8..header_offset + INTERIOR_PAGE_HEADER_SIZE)
                .ok_or_else(|| DatabaseError::CorruptedPage {
                    page_id,
                    reason: "page too small for an interior page header".to_string(),
                })?;
            Some(u32::from_be_bytes([pointer[0], pointer[1], pointer[2], pointer[3]]))
        } else {
            None
        };

        Ok(Page {
            page_id,
            page_type,
            first_freeblock,
            cell_count,
            cell_content_area_offset,
            fragmented_free_bytes,
            right_most_child,
            cell_pointer_array_offset: header_offset + page_type.header_size(),
        })
    }

    pub fn is_leaf(&self) -> bool {
        !self.page_type.is_interior()
    }

    /// Decode every cell in pointer-array order. `usable_size` excludes the
    /// reserved region at the end of the page.
    pub fn cells<'a>(&self, bytes: &'a [u8], usable_size: usize) -> Result<Vec<Cell<'a>>, DatabaseError> {
        let usable = bytes.get(..usable_size).ok_or_else(|| DatabaseError::CorruptedPage {
            page_id: self.page_id,
            reason: format!("page of {} bytes is shorter than usable size {}", bytes.len(), usable_size),
        })?;

        let content_start = self.cell_content_area_offset as usize;
        let pointer_array_end =
            self.cell_pointer_array_offset + self.cell_count as usize * CELL_POINTER_SIZE;
        if pointer_array_end > usable.len() {
            return Err(DatabaseError::CorruptedPage {
                page_id: self.page_id,
                reason: format!(
                    "cell pointer array for {} cells ends at {} past the page end",
                    self.cell_count, pointer_array_end
                ),
            });
        }

        let mut cells = Vec::with_capacity(self.cell_count as usize);
        for index in 0..self.cell_count {
            let at = self.cell_pointer_array_offset + index as usize * CELL_POINTER_SIZE;
            let pointer = u16::from_be_bytes([usable[at], usable[at + 1]]) as usize;

            if pointer < content_start.max(pointer_array_end) || pointer >= usable.len() {
                debug!(
                    page_id = self.page_id,
                    cell = index,
                    pointer,
                    content_start,
                    "cell pointer outside the cell content area"
                );
                return Err(DatabaseError::CellCountMismatch {
                    page_id: self.page_id,
                    declared: self.cell_count,
                    decoded: index,
                });
            }

            let cell = Cell::parse(usable, pointer, self.page_type, self.page_id)
                .map_err(|e| e.in_page(self.page_id))?;
            cells.push(cell);
        }

        if cells.len() != self.cell_count as usize {
            return Err(DatabaseError::CellCountMismatch {
                page_id: self.page_id,
                declared: self.cell_count,
                decoded: cells.len() as u16,
            });
        }

        debug!(
            page_id = self.page_id,
            page_type = ?self.page_type,
            cells = cells.len(),
            "decoded page cells"
        );
        Ok(cells)
    }
}
