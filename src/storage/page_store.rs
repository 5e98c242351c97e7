use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    storage::header::DatabaseHeader,
    types::{HEADER_SIZE, PageId, error::Result, page::Page},
};

/// Read-only random access to the pages of one database file.
pub struct PageStore {
    path: PathBuf,
    file: File,
    header: DatabaseHeader,
    page_count: u64,
}

impl PageStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new().read(true).open(path)?;

        let mut header_buffer = vec![0u8; HEADER_SIZE];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut header_buffer)?;
        let header = DatabaseHeader::from_bytes(&header_buffer)?;

        let file_size = file.metadata()?.len();
        let page_count = file_size / u64::from(header.page_size);
        debug!(
            path = %path.display(),
            page_size = header.page_size,
            page_count,
            "opened database file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
            page_count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &DatabaseHeader {
        &self.header
    }

    pub fn page_size(&self) -> u32 {
        self.header.page_size
    }

    pub fn usable_size(&self) -> usize {
        self.header.usable_size()
    }

    /// Whole pages present in the file.
    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    fn page_offset(&self, page_id: PageId) -> u64 {
        u64::from(page_id) * u64::from(self.header.page_size)
    }

    /// Raw bytes of the page at 0-based index `page_id`. Page 0 still begins
    /// with the database header; the page decoder skips it.
    pub fn read_page(&mut self, page_id: PageId) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.header.page_size as usize];
        self.file.seek(SeekFrom::Start(self.page_offset(page_id)))?;
        self.file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Read and decode the header of page `page_id`, returning both.
    pub fn load_page(&mut self, page_id: PageId) -> Result<(Page, Vec<u8>)> {
        let bytes = self.read_page(page_id)?;
        let page = Page::from_bytes(page_id, &bytes)?;
        Ok((page, bytes))
    }

    /// Release the file handle.
    pub fn close(self) {
        debug!(path = %self.path.display(), "closed database file");
    }
}
