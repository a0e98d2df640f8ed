//! Book-related types for the circulation engine
//!
//! This module defines the catalog-facing book record and its format
//! variants. Physical copies carry the three interlocking copy counters;
//! digital copies are unconditionally available and carry none.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Book identifier
pub type BookId = u64;

/// Catalog category of a book
///
/// Data only: categories have no behavior in the circulation core, they
/// travel with the book through snapshots and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookCategory {
    Fiction,
    NonFiction,
    Science,
    Technology,
    History,
    Biography,
    SelfHelp,
    Children,
    Poetry,
    Drama,
}

impl FromStr for BookCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // Legacy exports use underscored spellings ("Non_Fiction", "Self_Help").
        match value.replace(['_', ' '], "").to_lowercase().as_str() {
            "fiction" => Ok(BookCategory::Fiction),
            "nonfiction" => Ok(BookCategory::NonFiction),
            "science" => Ok(BookCategory::Science),
            "technology" => Ok(BookCategory::Technology),
            "history" => Ok(BookCategory::History),
            "biography" => Ok(BookCategory::Biography),
            "selfhelp" => Ok(BookCategory::SelfHelp),
            "children" => Ok(BookCategory::Children),
            "poetry" => Ok(BookCategory::Poetry),
            "drama" => Ok(BookCategory::Drama),
            _ => Err(format!("Invalid book category: '{}'", value)),
        }
    }
}

/// Format variants of a catalog entry
///
/// The tagged union replaces the legacy class hierarchy: shared fields
/// live on [`Book`], variant-specific state lives here. Availability
/// logic dispatches on this tag once, at the inventory boundary, instead
/// of being scattered through engine code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFormat {
    /// A copy-limited physical holding
    ///
    /// Invariant: `total_copies == available_copies + reserved_copies +
    /// open issues referencing this book`. The issued share is derived
    /// from the issue ledger, not stored here.
    Physical {
        /// Copies owned by the library
        total_copies: u32,
        /// Copies on the shelf, free to borrow
        available_copies: u32,
        /// Copies set aside for reservation holders
        reserved_copies: u32,
    },

    /// A digital holding (e-book or audio book)
    ///
    /// Always available; copy accounting does not apply.
    Digital,
}

/// One catalog entry
///
/// Created by catalog administration; the copy counters inside
/// [`BookFormat::Physical`] are mutated only by the circulation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    /// Unique book identifier
    pub id: BookId,

    /// Title of the book
    pub title: String,

    /// Author of the book
    pub author: String,

    /// Publisher of the book
    pub publisher: String,

    /// Year of publication
    pub year: u16,

    /// Catalog category
    pub category: BookCategory,

    /// Format variant, including physical copy counters
    pub format: BookFormat,
}

impl Book {
    /// Create a physical book with every copy on the shelf
    pub fn physical(
        id: BookId,
        title: &str,
        author: &str,
        publisher: &str,
        year: u16,
        category: BookCategory,
        total_copies: u32,
    ) -> Self {
        Book {
            id,
            title: title.to_string(),
            author: author.to_string(),
            publisher: publisher.to_string(),
            year,
            category,
            format: BookFormat::Physical {
                total_copies,
                available_copies: total_copies,
                reserved_copies: 0,
            },
        }
    }

    /// Create a digital book
    pub fn digital(
        id: BookId,
        title: &str,
        author: &str,
        publisher: &str,
        year: u16,
        category: BookCategory,
    ) -> Self {
        Book {
            id,
            title: title.to_string(),
            author: author.to_string(),
            publisher: publisher.to_string(),
            year,
            category,
            format: BookFormat::Digital,
        }
    }

    /// Whether this book's availability is bounded by copy counters
    ///
    /// The single capability query that replaces instanceof-style checks:
    /// digital formats answer `false` and every inventory operation on
    /// them is a successful no-op.
    pub fn has_finite_copies(&self) -> bool {
        matches!(self.format, BookFormat::Physical { .. })
    }

    /// Copies currently free to borrow, if copy-limited
    pub fn available_copies(&self) -> Option<u32> {
        match self.format {
            BookFormat::Physical {
                available_copies, ..
            } => Some(available_copies),
            BookFormat::Digital => None,
        }
    }

    /// Copies currently set aside for reservation holders, if copy-limited
    pub fn reserved_copies(&self) -> Option<u32> {
        match self.format {
            BookFormat::Physical {
                reserved_copies, ..
            } => Some(reserved_copies),
            BookFormat::Digital => None,
        }
    }

    /// Total copies owned, if copy-limited
    pub fn total_copies(&self) -> Option<u32> {
        match self.format {
            BookFormat::Physical { total_copies, .. } => Some(total_copies),
            BookFormat::Digital => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_physical_book_starts_fully_available() {
        let book = Book::physical(1, "Dune", "Frank Herbert", "Chilton", 1965, BookCategory::Fiction, 4);

        assert!(book.has_finite_copies());
        assert_eq!(book.total_copies(), Some(4));
        assert_eq!(book.available_copies(), Some(4));
        assert_eq!(book.reserved_copies(), Some(0));
    }

    #[test]
    fn test_digital_book_has_no_counters() {
        let book = Book::digital(2, "Dune", "Frank Herbert", "Chilton", 1965, BookCategory::Fiction);

        assert!(!book.has_finite_copies());
        assert_eq!(book.total_copies(), None);
        assert_eq!(book.available_copies(), None);
        assert_eq!(book.reserved_copies(), None);
    }

    #[rstest]
    #[case("Fiction", BookCategory::Fiction)]
    #[case("Non_Fiction", BookCategory::NonFiction)]
    #[case("NonFiction", BookCategory::NonFiction)]
    #[case("self_help", BookCategory::SelfHelp)]
    #[case("SCIENCE", BookCategory::Science)]
    #[case("Drama", BookCategory::Drama)]
    fn test_category_parsing(#[case] input: &str, #[case] expected: BookCategory) {
        assert_eq!(input.parse::<BookCategory>().unwrap(), expected);
    }

    #[test]
    fn test_category_parsing_rejects_unknown() {
        let result = "Cooking".parse::<BookCategory>();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid book category"));
    }
}
