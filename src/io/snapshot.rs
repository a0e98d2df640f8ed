//! Snapshot persistence
//!
//! Each ledger is durably represented as a whole-collection snapshot,
//! written after every committed transaction and read at startup. There
//! is no partial or incremental persistence: the most recent full
//! snapshot wins.
//!
//! The [`SnapshotStore`] trait is the seam that lets the core's tests
//! substitute an in-memory store for the file-backed one:
//!
//! - [`CsvSnapshotStore`] keeps one CSV file per collection inside a data
//!   directory, writing each through a temporary file so a failed save
//!   never truncates the previous snapshot.
//! - [`MemorySnapshotStore`] holds the snapshot in memory for tests.

use crate::io::record_format::{
    book_to_row, convert_book_row, convert_issue_row, convert_member_row, convert_reservation_row,
    issue_to_row, member_to_row, reservation_to_row, BookRow, IssueRow, MemberRow, ReservationRow,
};
use crate::types::{Book, CirculationError, IssueRecord, Member, Reservation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Whole-library snapshot: every collection, in full
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibrarySnapshot {
    /// All catalog entries
    pub books: Vec<Book>,
    /// All registered members
    pub members: Vec<Member>,
    /// All issue records, open and closed
    pub issues: Vec<IssueRecord>,
    /// All reservations in queue order
    pub reservations: Vec<Reservation>,
}

impl LibrarySnapshot {
    /// An empty library
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Durable storage for whole-library snapshots
///
/// `load` is called once at startup; `save` after every committed
/// transaction. A `save` failure must be surfaced to the caller as the
/// failure of the logical operation, never logged and ignored.
pub trait SnapshotStore {
    /// Load the most recent snapshot, or an empty library if none exists
    fn load(&self) -> Result<LibrarySnapshot, CirculationError>;

    /// Replace the durable snapshot with `snapshot`
    fn save(&self, snapshot: &LibrarySnapshot) -> Result<(), CirculationError>;
}

/// File-backed snapshot store: one CSV file per collection
///
/// Layout inside the data directory: `books.csv`, `members.csv`,
/// `issues.csv`, `reservations.csv`. Missing files load as empty
/// collections so a fresh directory is a valid empty library.
pub struct CsvSnapshotStore {
    dir: PathBuf,
}

impl CsvSnapshotStore {
    /// Create a store rooted at `dir`; the directory is created on save
    pub fn new(dir: &Path) -> Self {
        CsvSnapshotStore {
            dir: dir.to_path_buf(),
        }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Read one collection file into rows, empty if the file is absent
    fn load_rows<R: DeserializeOwned>(&self, file: &str) -> Result<Vec<R>, CirculationError> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&path)?;

        let mut rows = Vec::new();
        for result in reader.deserialize::<R>() {
            rows.push(result?);
        }
        Ok(rows)
    }

    /// Write one collection file through a temporary sibling
    ///
    /// The rename keeps the previous snapshot intact if the write fails
    /// partway.
    fn save_rows<R: Serialize>(&self, file: &str, rows: &[R]) -> Result<(), CirculationError> {
        let path = self.path(file);
        let tmp = self.path(&format!("{}.tmp", file));

        let mut writer = csv::Writer::from_path(&tmp)
            .map_err(|e| CirculationError::snapshot(&e.to_string()))?;
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| CirculationError::snapshot(&e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| CirculationError::snapshot(&e.to_string()))?;
        drop(writer);

        fs::rename(&tmp, &path).map_err(|e| CirculationError::snapshot(&e.to_string()))?;
        Ok(())
    }
}

impl SnapshotStore for CsvSnapshotStore {
    fn load(&self) -> Result<LibrarySnapshot, CirculationError> {
        let book_rows: Vec<BookRow> = self.load_rows("books.csv")?;
        let member_rows: Vec<MemberRow> = self.load_rows("members.csv")?;
        let issue_rows: Vec<IssueRow> = self.load_rows("issues.csv")?;
        let reservation_rows: Vec<ReservationRow> = self.load_rows("reservations.csv")?;

        let mut snapshot = LibrarySnapshot::empty();
        for row in book_rows {
            snapshot
                .books
                .push(convert_book_row(row).map_err(|message| CirculationError::ParseError {
                    line: None,
                    message,
                })?);
        }
        for row in member_rows {
            snapshot.members.push(convert_member_row(row).map_err(|message| {
                CirculationError::ParseError {
                    line: None,
                    message,
                }
            })?);
        }
        for row in issue_rows {
            snapshot
                .issues
                .push(convert_issue_row(row).map_err(|message| CirculationError::ParseError {
                    line: None,
                    message,
                })?);
        }
        for row in reservation_rows {
            snapshot.reservations.push(convert_reservation_row(row).map_err(|message| {
                CirculationError::ParseError {
                    line: None,
                    message,
                }
            })?);
        }

        Ok(snapshot)
    }

    fn save(&self, snapshot: &LibrarySnapshot) -> Result<(), CirculationError> {
        fs::create_dir_all(&self.dir).map_err(|e| CirculationError::snapshot(&e.to_string()))?;

        let books: Vec<BookRow> = snapshot.books.iter().map(book_to_row).collect();
        let members: Vec<MemberRow> = snapshot.members.iter().map(member_to_row).collect();
        let issues: Vec<IssueRow> = snapshot.issues.iter().map(issue_to_row).collect();
        let reservations: Vec<ReservationRow> =
            snapshot.reservations.iter().map(reservation_to_row).collect();

        self.save_rows("books.csv", &books)?;
        self.save_rows("members.csv", &members)?;
        self.save_rows("issues.csv", &issues)?;
        self.save_rows("reservations.csv", &reservations)?;
        Ok(())
    }
}

/// In-memory snapshot store for tests and ephemeral runs
pub struct MemorySnapshotStore {
    inner: Mutex<LibrarySnapshot>,
}

impl MemorySnapshotStore {
    /// Create a store holding an empty library
    pub fn new() -> Self {
        MemorySnapshotStore {
            inner: Mutex::new(LibrarySnapshot::empty()),
        }
    }

    /// Create a store pre-seeded with a snapshot
    pub fn with_snapshot(snapshot: LibrarySnapshot) -> Self {
        MemorySnapshotStore {
            inner: Mutex::new(snapshot),
        }
    }

    /// The most recently saved snapshot
    pub fn current(&self) -> LibrarySnapshot {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<LibrarySnapshot, CirculationError> {
        Ok(self.current())
    }

    fn save(&self, snapshot: &LibrarySnapshot) -> Result<(), CirculationError> {
        *self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = snapshot.clone();
        Ok(())
    }
}
