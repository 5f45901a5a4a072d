//! Blocking page-granular file I/O.
//!
//! A [`PageFile`] wraps a standard file and exposes it as an array of
//! fixed-size pages. Reads are bounds-checked against the current file
//! extent; the extent itself only grows in whole, zero-filled pages.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tundra_common::PageId;

use super::error::{FileError, FileResult};
use super::options::OpenOptions;

/// A file organized as fixed-size pages addressed by zero-based page id.
///
/// All operations block the calling thread; the file position is managed
/// internally, so callers never see a cursor.
pub struct PageFile {
    /// The underlying file.
    file: File,
    /// The file path.
    path: PathBuf,
    /// Size of each page in bytes.
    page_size: usize,
    /// Whether the file was opened with write access.
    writable: bool,
}

impl PageFile {
    /// Creates a new page file at `path`, truncating any existing file.
    ///
    /// The fresh file is initialized with a single zero-filled page.
    pub fn create(path: impl AsRef<Path>, page_size: usize) -> FileResult<Self> {
        let mut file = Self::open_with(path, page_size, OpenOptions::for_create())?;
        file.ensure_capacity(1)?;
        Ok(file)
    }

    /// Opens an existing page file for reading and writing.
    ///
    /// Returns [`FileError::NotFound`] if the file does not exist.
    pub fn open(path: impl AsRef<Path>, page_size: usize) -> FileResult<Self> {
        Self::open_with(path, page_size, OpenOptions::for_update())
    }

    /// Opens a page file with the specified options.
    pub fn open_with(
        path: impl AsRef<Path>,
        page_size: usize,
        options: OpenOptions,
    ) -> FileResult<Self> {
        let path = path.as_ref().to_path_buf();
        let writable = options.is_write();

        let file = options
            .to_std_options()
            .open(&path)
            .map_err(|e| FileError::from_io_with_path(e, &path))?;

        let mut page_file = Self {
            file,
            path,
            page_size,
            writable,
        };

        if let Some(pages) = options.preallocate_pages {
            page_file.ensure_capacity(pages)?;
        }

        Ok(page_file)
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the page size in bytes.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns the total number of pages in the file.
    pub fn page_count(&self) -> FileResult<u64> {
        let len = self.file.metadata()?.len();
        Ok(len / self.page_size as u64)
    }

    /// Reads the block at `page_id` into `buf`.
    ///
    /// `buf` must be exactly one page long. Returns
    /// [`FileError::NonExistentPage`] if the page lies beyond the current
    /// file extent.
    pub fn read_block(&mut self, page_id: PageId, buf: &mut [u8]) -> FileResult<()> {
        self.check_buf(buf.len())?;

        let page_count = self.page_count()?;
        if !page_id.is_valid() || page_id.as_u64() >= page_count {
            return Err(FileError::non_existent_page(page_id, page_count));
        }

        self.file
            .seek(SeekFrom::Start(page_id.offset_in_file(self.page_size)))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    /// Writes `buf` as the block at `page_id`.
    ///
    /// `buf` must be exactly one page long. The page must lie within the
    /// file extent or directly at its end (in which case the file grows by
    /// one page).
    pub fn write_block(&mut self, page_id: PageId, buf: &[u8]) -> FileResult<()> {
        self.check_writable("write_block")?;
        self.check_buf(buf.len())?;

        let page_count = self.page_count()?;
        if !page_id.is_valid() || page_id.as_u64() > page_count {
            return Err(FileError::non_existent_page(page_id, page_count));
        }

        self.file
            .seek(SeekFrom::Start(page_id.offset_in_file(self.page_size)))?;
        self.file.write_all(buf).map_err(|source| FileError::WriteFailed {
            page_id,
            source,
        })?;
        Ok(())
    }

    /// Appends `buf` as a new block at the end of the file.
    ///
    /// Returns the id of the newly written page.
    pub fn append_block(&mut self, buf: &[u8]) -> FileResult<PageId> {
        self.check_writable("append_block")?;
        self.check_buf(buf.len())?;

        let page_id = PageId::new(self.page_count()?);
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(buf).map_err(|source| FileError::WriteFailed {
            page_id,
            source,
        })?;
        Ok(page_id)
    }

    /// Extends the file with zero-filled pages to at least `min_pages`.
    ///
    /// Does nothing if the file already holds that many pages.
    pub fn ensure_capacity(&mut self, min_pages: u64) -> FileResult<()> {
        self.check_writable("ensure_capacity")?;

        if self.page_count()? < min_pages {
            self.file.set_len(min_pages * self.page_size as u64)?;
        }
        Ok(())
    }

    /// Syncs all data and metadata to disk.
    pub fn sync(&mut self) -> FileResult<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Checks that a block buffer is exactly one page long.
    fn check_buf(&self, len: usize) -> FileResult<()> {
        if len != self.page_size {
            return Err(FileError::BufferSizeMismatch {
                expected: self.page_size,
                actual: len,
            });
        }
        Ok(())
    }

    /// Checks that the file was opened with write access.
    fn check_writable(&self, operation: &'static str) -> FileResult<()> {
        if !self.writable {
            return Err(FileError::InvalidOperation {
                operation,
                mode: "read-only",
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for PageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFile")
            .field("path", &self.path)
            .field("page_size", &self.page_size)
            .field("writable", &self.writable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PAGE_SIZE: usize = 512;

    #[test]
    fn test_create_initializes_one_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("create.db");

        let mut file = PageFile::create(&path, PAGE_SIZE).unwrap();
        assert_eq!(file.page_count().unwrap(), 1);

        // The initial page reads back as zeroes
        let mut buf = vec![0xFFu8; PAGE_SIZE];
        file.read_block(PageId::new(0), &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.db");

        let err = PageFile::open(&path, PAGE_SIZE).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_write_and_read_block() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rw.db");

        let mut file = PageFile::create(&path, PAGE_SIZE).unwrap();
        file.ensure_capacity(3).unwrap();

        let mut page = vec![0u8; PAGE_SIZE];
        page[..4].copy_from_slice(b"data");
        file.write_block(PageId::new(2), &page).unwrap();

        let mut buf = vec![0u8; PAGE_SIZE];
        file.read_block(PageId::new(2), &mut buf).unwrap();
        assert_eq!(&buf[..4], b"data");
    }

    #[test]
    fn test_read_beyond_extent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bounds.db");

        let mut file = PageFile::create(&path, PAGE_SIZE).unwrap();

        let mut buf = vec![0u8; PAGE_SIZE];
        let err = file.read_block(PageId::new(5), &mut buf).unwrap_err();
        assert!(matches!(
            err,
            FileError::NonExistentPage { page_count: 1, .. }
        ));
    }

    #[test]
    fn test_write_beyond_extent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wbounds.db");

        let mut file = PageFile::create(&path, PAGE_SIZE).unwrap();
        let page = vec![0u8; PAGE_SIZE];

        // Writing directly at the end of the file appends
        file.write_block(PageId::new(1), &page).unwrap();
        assert_eq!(file.page_count().unwrap(), 2);

        // Writing past the end does not
        let err = file.write_block(PageId::new(5), &page).unwrap_err();
        assert!(matches!(err, FileError::NonExistentPage { .. }));
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.db");

        let mut file = PageFile::create(&path, PAGE_SIZE).unwrap();

        let mut buf = vec![0u8; PAGE_SIZE / 2];
        let err = file.read_block(PageId::new(0), &mut buf).unwrap_err();
        assert!(matches!(
            err,
            FileError::BufferSizeMismatch {
                expected: PAGE_SIZE,
                ..
            }
        ));
    }

    #[test]
    fn test_ensure_capacity_zero_fills() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grow.db");

        let mut file = PageFile::create(&path, PAGE_SIZE).unwrap();
        file.ensure_capacity(4).unwrap();
        assert_eq!(file.page_count().unwrap(), 4);

        let mut buf = vec![0xAAu8; PAGE_SIZE];
        file.read_block(PageId::new(3), &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));

        // Shrinking is not a thing: asking for less is a no-op
        file.ensure_capacity(2).unwrap();
        assert_eq!(file.page_count().unwrap(), 4);
    }

    #[test]
    fn test_append_block() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("append.db");

        let mut file = PageFile::create(&path, PAGE_SIZE).unwrap();

        let page = vec![7u8; PAGE_SIZE];
        let id = file.append_block(&page).unwrap();
        assert_eq!(id, PageId::new(1));
        assert_eq!(file.page_count().unwrap(), 2);

        let mut buf = vec![0u8; PAGE_SIZE];
        file.read_block(id, &mut buf).unwrap();
        assert_eq!(buf, page);
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ro.db");

        PageFile::create(&path, PAGE_SIZE).unwrap();

        let mut file = PageFile::open_with(&path, PAGE_SIZE, OpenOptions::for_read()).unwrap();
        let page = vec![0u8; PAGE_SIZE];
        let err = file.write_block(PageId::new(0), &page).unwrap_err();
        assert!(matches!(err, FileError::InvalidOperation { .. }));
    }

    #[test]
    fn test_preallocate_on_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prealloc.db");

        let file = PageFile::open_with(
            &path,
            PAGE_SIZE,
            OpenOptions::for_create().preallocate_pages(8),
        )
        .unwrap();
        assert_eq!(file.page_count().unwrap(), 8);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");

        {
            let mut file = PageFile::create(&path, PAGE_SIZE).unwrap();
            let mut page = vec![0u8; PAGE_SIZE];
            page[..6].copy_from_slice(b"stored");
            file.write_block(PageId::new(0), &page).unwrap();
            file.sync().unwrap();
        }

        let mut file = PageFile::open(&path, PAGE_SIZE).unwrap();
        let mut buf = vec![0u8; PAGE_SIZE];
        file.read_block(PageId::new(0), &mut buf).unwrap();
        assert_eq!(&buf[..6], b"stored");
    }
}
