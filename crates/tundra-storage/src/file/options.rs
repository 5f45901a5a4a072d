//! Page-file open options.

use std::fs;

/// Options for opening page files.
///
/// This is similar to `std::fs::OpenOptions` but with page-file specific
/// additions such as pre-allocation measured in pages.
///
/// # Example
///
/// ```rust
/// use tundra_storage::file::OpenOptions;
///
/// let options = OpenOptions::new()
///     .read(true)
///     .write(true)
///     .create(true);
/// ```
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Open for reading.
    pub(crate) read: bool,
    /// Open for writing.
    pub(crate) write: bool,
    /// Truncate existing file.
    pub(crate) truncate: bool,
    /// Create file if it doesn't exist.
    pub(crate) create: bool,
    /// Create file, fail if it exists.
    pub(crate) create_new: bool,
    /// Pre-allocate the file to at least this many pages.
    pub(crate) preallocate_pages: Option<u64>,
}

impl OpenOptions {
    /// Creates a new set of options with default values.
    ///
    /// All options are initially set to `false` or `None`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            read: false,
            write: false,
            truncate: false,
            create: false,
            create_new: false,
            preallocate_pages: None,
        }
    }

    /// Sets the option for read access.
    #[must_use]
    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// Sets the option for write access.
    #[must_use]
    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Sets the option for truncating an existing file.
    #[must_use]
    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Sets the option to create a new file if it doesn't exist.
    #[must_use]
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Sets the option to create a new file, failing if it exists.
    #[must_use]
    pub fn create_new(mut self, create_new: bool) -> Self {
        self.create_new = create_new;
        self
    }

    /// Sets pre-allocation for the file, measured in pages.
    ///
    /// The file will be extended with zero-filled pages to at least this
    /// page count when opened for writing.
    #[must_use]
    pub fn preallocate_pages(mut self, pages: u64) -> Self {
        self.preallocate_pages = Some(pages);
        self
    }

    /// Returns true if read access is enabled.
    #[inline]
    pub fn is_read(&self) -> bool {
        self.read
    }

    /// Returns true if write access is enabled.
    #[inline]
    pub fn is_write(&self) -> bool {
        self.write
    }

    /// Converts to `std::fs::OpenOptions`.
    pub fn to_std_options(&self) -> fs::OpenOptions {
        let mut opts = fs::OpenOptions::new();
        opts.read(self.read)
            .write(self.write)
            .truncate(self.truncate)
            .create(self.create)
            .create_new(self.create_new);
        opts
    }

    /// Creates a builder for reading an existing page file.
    #[must_use]
    pub fn for_read() -> Self {
        Self::new().read(true)
    }

    /// Creates a builder for updating an existing page file.
    #[must_use]
    pub fn for_update() -> Self {
        Self::new().read(true).write(true)
    }

    /// Creates a builder for creating a fresh page file.
    #[must_use]
    pub fn for_create() -> Self {
        Self::new().read(true).write(true).create(true).truncate(true)
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}
