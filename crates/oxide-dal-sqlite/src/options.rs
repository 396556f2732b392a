//! Connection options.

/// In-memory database URL.
pub const MEMORY_URL: &str = "sqlite::memory:";

/// How to open a SQLite database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteOptions {
    /// Database URL, e.g. `sqlite::memory:` or `sqlite://path/to/db.sqlite3`.
    pub url: String,
    /// Create the database file if it does not exist.
    pub create_if_missing: bool,
    /// Initial autocommit mode.
    pub autocommit: bool,
}

impl SqliteOptions {
    /// Options for `url`, creating the file if needed, in autocommit mode.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            create_if_missing: true,
            autocommit: true,
        }
    }

    /// Options for a private in-memory database.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(MEMORY_URL)
    }

    /// Sets whether a missing database file is created.
    #[must_use]
    pub const fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Sets the initial autocommit mode.
    #[must_use]
    pub const fn autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = autocommit;
        self
    }
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self::memory()
    }
}
