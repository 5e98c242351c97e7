use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::{
    executor::scan::{ScanIterator, Scanner},
    storage::page_store::PageStore,
    types::{
        PageId, RowId,
        cell::Cell,
        error::{DatabaseError, Result},
        row::Row,
    },
};

/// Convert a 1-based page number stored in the file into a page index.
pub fn page_index(page_number: u32, referenced_from: PageId) -> Result<PageId> {
    page_number
        .checked_sub(1)
        .ok_or_else(|| DatabaseError::CorruptedPage {
            page_id: referenced_from,
            reason: "reference to page number 0".to_string(),
        })
}

/// Depth-first, left-to-right walk of a table B-tree, yielding leaf rows in
/// ascending rowid order. Pages are read lazily, one at a time.
pub struct BTreeWalker<'a> {
    store: &'a mut PageStore,
    root_page_id: PageId,
    pending: Vec<PageId>,
    buffered: VecDeque<Row>,
    visited: HashSet<PageId>,
    last_row_id: Option<RowId>,
}

impl<'a> BTreeWalker<'a> {
    pub fn new(store: &'a mut PageStore, root_page_id: PageId) -> Self {
        Self {
            store,
            root_page_id,
            pending: vec![root_page_id],
            buffered: VecDeque::new(),
            visited: HashSet::new(),
            last_row_id: None,
        }
    }

    fn visit(&mut self, page_id: PageId) -> Result<()> {
        if !self.visited.insert(page_id) {
            return Err(DatabaseError::BTreeCycle { page_id });
        }
        if u64::from(page_id) >= self.store.page_count() {
            return Err(DatabaseError::CorruptedPage {
                page_id,
                reason: format!(
                    "page lies beyond the end of a {} page file",
                    self.store.page_count()
                ),
            });
        }

        let usable_size = self.store.usable_size();
        let (page, bytes) = self.store.load_page(page_id)?;
        let cells = page.cells(&bytes, usable_size)?;

        match page.right_most_child {
            None => {
                if cells.is_empty() && page_id != self.root_page_id {
                    warn!(page_id, "empty leaf page below the root");
                }
                for cell in &cells {
                    let row_id = cell.row_id();
                    if self.last_row_id.is_some_and(|last| row_id <= last) {
                        warn!(page_id, row_id, "rowid out of ascending order");
                    }
                    self.last_row_id = Some(row_id);

                    if let Cell::LeafTable(leaf) = cell {
                        let row = leaf.to_row().map_err(|e| e.in_page(page_id))?;
                        self.buffered.push_back(row);
                    }
                }
            }
            Some(right_most) => {
                let mut children = Vec::with_capacity(cells.len() + 1);
                for cell in &cells {
                    if let Cell::InteriorTable(interior) = cell {
                        children.push(page_index(interior.left_child, page_id)?);
                    }
                }
                children.push(page_index(right_most, page_id)?);
                debug!(page_id, children = children.len(), "descending interior page");
                // Stack order: left-most child is popped first
                self.pending.extend(children.into_iter().rev());
            }
        }

        Ok(())
    }
}

impl Scanner for BTreeWalker<'_> {
    fn scan(&mut self) -> Result<Option<Row>> {
        loop {
            if let Some(row) = self.buffered.pop_front() {
                return Ok(Some(row));
            }
            match self.pending.pop() {
                Some(page_id) => self.visit(page_id)?,
                None => return Ok(None),
            }
        }
    }
}

/// Every row of the tree rooted at `root_page_id`, realized in order.
pub fn rows_of(store: &mut PageStore, root_page_id: PageId) -> Result<Vec<Row>> {
    ScanIterator::new(BTreeWalker::new(store, root_page_id)).collect()
}
