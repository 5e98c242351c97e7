use thiserror::Error;

use crate::{planner::error::PlannerError, types::PageId};

/// Coarse classification of every failure the reader can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Format,
    Schema,
    Query,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid database header: {reason}")]
    InvalidHeader { reason: String },

    #[error("Unsupported page type {page_type:#04x} on page {page_id}")]
    UnsupportedPageType { page_id: PageId, page_type: u8 },

    #[error("Malformed varint: {reason}")]
    MalformedVarint { reason: String },

    #[error("Unsupported serial type: {0}")]
    UnsupportedSerialType(u64),

    #[error("Truncated record: {reason}")]
    TruncatedRecord { reason: String },

    #[error("Record body not fully consumed: used {consumed} of {declared} bytes")]
    PayloadNotConsumed { consumed: usize, declared: usize },

    #[error("Page {page_id} declares {declared} cells but only {decoded} could be decoded")]
    CellCountMismatch {
        page_id: PageId,
        declared: u16,
        decoded: u16,
    },

    #[error("Payload of {payload_size} bytes on page {page_id} exceeds the {max_local} bytes stored in-page")]
    PayloadOverflow {
        page_id: PageId,
        payload_size: u64,
        max_local: usize,
    },

    #[error("Corrupted page: page_id={page_id}, reason={reason}")]
    CorruptedPage { page_id: PageId, reason: String },

    #[error("B-tree cycle detected: page {page_id} reached twice")]
    BTreeCycle { page_id: PageId },

    #[error("page {page_id}: {source}")]
    InPage {
        page_id: PageId,
        #[source]
        source: Box<DatabaseError>,
    },

    #[error("Table '{name}' not found")]
    TableNotFound { name: String },

    #[error("Column '{name}' not found in table '{table}'")]
    ColumnNotFound { name: String, table: String },

    #[error("Malformed schema for '{table}': {reason}")]
    MalformedSchema { table: String, reason: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Query(#[from] PlannerError),
}

impl DatabaseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatabaseError::Io(_) => ErrorKind::Io,
            DatabaseError::InvalidHeader { .. }
            | DatabaseError::UnsupportedPageType { .. }
            | DatabaseError::MalformedVarint { .. }
            | DatabaseError::UnsupportedSerialType(_)
            | DatabaseError::TruncatedRecord { .. }
            | DatabaseError::PayloadNotConsumed { .. }
            | DatabaseError::CellCountMismatch { .. }
            | DatabaseError::PayloadOverflow { .. }
            | DatabaseError::CorruptedPage { .. }
            | DatabaseError::BTreeCycle { .. } => ErrorKind::Format,
            DatabaseError::InPage { source, .. } => source.kind(),
            DatabaseError::TableNotFound { .. }
            | DatabaseError::ColumnNotFound { .. }
            | DatabaseError::MalformedSchema { .. } => ErrorKind::Schema,
            DatabaseError::UnknownCommand(_) | DatabaseError::Query(_) => ErrorKind::Query,
        }
    }

    /// Attach the page being decoded, unless the error already names one.
    pub fn in_page(self, page_id: PageId) -> Self {
        match self {
            DatabaseError::MalformedVarint { .. }
            | DatabaseError::UnsupportedSerialType(_)
            | DatabaseError::TruncatedRecord { .. }
            | DatabaseError::PayloadNotConsumed { .. } => DatabaseError::InPage {
                page_id,
                source: Box::new(self),
            },
            other => other,
        }
    }

    /// Strip the page wrapper, for callers matching on the underlying variant.
    pub fn root_cause(&self) -> &DatabaseError {
        match self {
            DatabaseError::InPage { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
