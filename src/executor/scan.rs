use crate::types::{error::Result, row::Row};

/// Single-pass row source. Once `scan` returns `Ok(None)` the source is
/// exhausted; after an error its state is unspecified.
pub trait Scanner {
    fn scan(&mut self) -> Result<Option<Row>>;

    fn scan_batch(&mut self, batch_size: usize) -> Result<Vec<Row>> {
        let mut rows = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            match self.scan()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }
}

pub struct ScanIterator<S: Scanner> {
    scanner: S,
    failed: bool,
}

impl<S: Scanner> ScanIterator<S> {
    pub fn new(scanner: S) -> Self {
        Self {
            scanner,
            failed: false,
        }
    }
}

impl<S: Scanner> Iterator for ScanIterator<S> {
    type Item = Result<Row>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.scanner.scan() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
