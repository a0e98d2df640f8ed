//! Error types for the circulation engine
//!
//! This module defines all error types that can occur while processing
//! circulation operations. Errors are designed to be descriptive and
//! user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **Not-found errors**: Member, book, issue, or reservation absent
//! - **Eligibility errors**: Policy-driven refusals (limits, suspension)
//! - **Inventory conflicts**: No copy available, reserved by another member
//! - **State conflicts**: Duplicate reservation, already issued, already returned
//! - **I/O and persistence errors**: File access, parsing, snapshot writes
//!
//! Every validation failure is detected before any ledger mutation, so a
//! returned error always means the operation left the library unchanged.
//! Persistence errors are the exception: the in-memory commit has happened
//! and the caller must treat the operation as failed (see `core::library`).

use crate::types::{BookId, MemberId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the circulation engine
///
/// This enum represents all possible errors that can occur while
/// processing circulation operations. Each variant includes relevant
/// context to help diagnose and resolve the issue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CirculationError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// Record parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped
    /// and processing continues with the next record.
    #[error("Parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Writing the library snapshot to durable storage failed
    ///
    /// The in-memory state has already committed; the logical operation
    /// must be reported as failed rather than silently continued.
    #[error("Snapshot write failed: {message}")]
    SnapshotError {
        /// Description of the persistence failure
        message: String,
    },

    /// Member ID does not exist in the member directory
    #[error("Member {member} not found")]
    MemberNotFound {
        /// The member ID that was not found
        member: MemberId,
    },

    /// Book ID does not exist in the inventory
    #[error("Book {book} not found")]
    BookNotFound {
        /// The book ID that was not found
        book: BookId,
    },

    /// Member is not eligible for the requested operation
    ///
    /// Raised when borrowing or renewal policy checks fail: borrow limit
    /// reached, account suspended or expired, outstanding fines above the
    /// category threshold, or renewal limit reached.
    #[error("Member {member} is not eligible to {action}")]
    NotEligible {
        /// The member that failed the eligibility check
        member: MemberId,
        /// The operation that was refused ("borrow", "renew", ...)
        action: String,
    },

    /// No copy of the book can be taken for this operation
    #[error("No copy of book {book} is available")]
    NoCopyAvailable {
        /// The book with no obtainable copy
        book: BookId,
    },

    /// The book's oldest reservation belongs to a different member
    ///
    /// FIFO fairness: only the longest-waiting reserver may borrow or
    /// renew the book while the reservation is outstanding.
    #[error("Book {book} is reserved by member {reserved_by}")]
    ReservedByAnother {
        /// The contested book
        book: BookId,
        /// The member holding the oldest reservation
        reserved_by: MemberId,
    },

    /// An open issue already exists for this (member, book) pair
    #[error("Book {book} is already issued to member {member}")]
    AlreadyIssuedToMember {
        /// The member holding the open issue
        member: MemberId,
        /// The book in question
        book: BookId,
    },

    /// No open issue exists for this (member, book) pair
    ///
    /// Also raised by a second return of the same issue: the first return
    /// closed the record, so no fine can be charged twice.
    #[error("Book {book} is not currently issued to member {member}")]
    NotCurrentlyIssued {
        /// The member without an open issue
        member: MemberId,
        /// The book in question
        book: BookId,
    },

    /// The member already has a reservation for this book
    #[error("Member {member} has already reserved book {book}")]
    DuplicateReservation {
        /// The member with the existing reservation
        member: MemberId,
        /// The book in question
        book: BookId,
    },

    /// No reservation exists for this (member, book) pair
    #[error("No reservation by member {member} for book {book}")]
    ReservationNotFound {
        /// The member without a reservation
        member: MemberId,
        /// The book in question
        book: BookId,
    },

    /// Fine payment amount is not accepted
    ///
    /// Payments must be positive and must not exceed the member's
    /// outstanding fine balance.
    #[error("Invalid payment of {amount} for member {member}: outstanding fine is {balance}")]
    InvalidPayment {
        /// The paying member
        member: MemberId,
        /// The rejected payment amount
        amount: Decimal,
        /// The member's outstanding fine balance
        balance: Decimal,
    },

    /// Arithmetic overflow would occur in a counter or amount update
    ///
    /// The operation is rejected to keep ledger integrity.
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },

    /// A date computation left the representable calendar range
    #[error("Date out of range in {operation}")]
    DateOutOfRange {
        /// Operation that produced the out-of-range date
        operation: String,
    },
}

// Conversion from io::Error to CirculationError
impl From<std::io::Error> for CirculationError {
    fn from(error: std::io::Error) -> Self {
        CirculationError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to CirculationError
impl From<csv::Error> for CirculationError {
    fn from(error: csv::Error) -> Self {
        // Extract line number if available
        let line = error.position().map(|pos| pos.line());

        CirculationError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl CirculationError {
    /// Create a MemberNotFound error
    pub fn member_not_found(member: MemberId) -> Self {
        CirculationError::MemberNotFound { member }
    }

    /// Create a BookNotFound error
    pub fn book_not_found(book: BookId) -> Self {
        CirculationError::BookNotFound { book }
    }

    /// Create a NotEligible error
    pub fn not_eligible(member: MemberId, action: &str) -> Self {
        CirculationError::NotEligible {
            member,
            action: action.to_string(),
        }
    }

    /// Create a NoCopyAvailable error
    pub fn no_copy_available(book: BookId) -> Self {
        CirculationError::NoCopyAvailable { book }
    }

    /// Create a ReservedByAnother error
    pub fn reserved_by_another(book: BookId, reserved_by: MemberId) -> Self {
        CirculationError::ReservedByAnother { book, reserved_by }
    }

    /// Create an AlreadyIssuedToMember error
    pub fn already_issued(member: MemberId, book: BookId) -> Self {
        CirculationError::AlreadyIssuedToMember { member, book }
    }

    /// Create a NotCurrentlyIssued error
    pub fn not_currently_issued(member: MemberId, book: BookId) -> Self {
        CirculationError::NotCurrentlyIssued { member, book }
    }

    /// Create a DuplicateReservation error
    pub fn duplicate_reservation(member: MemberId, book: BookId) -> Self {
        CirculationError::DuplicateReservation { member, book }
    }

    /// Create a ReservationNotFound error
    pub fn reservation_not_found(member: MemberId, book: BookId) -> Self {
        CirculationError::ReservationNotFound { member, book }
    }

    /// Create an InvalidPayment error
    pub fn invalid_payment(member: MemberId, amount: Decimal, balance: Decimal) -> Self {
        CirculationError::InvalidPayment {
            member,
            amount,
            balance,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        CirculationError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create a DateOutOfRange error
    pub fn date_out_of_range(operation: &str) -> Self {
        CirculationError::DateOutOfRange {
            operation: operation.to_string(),
        }
    }

    /// Create a SnapshotError
    pub fn snapshot(message: &str) -> Self {
        CirculationError::SnapshotError {
            message: message.to_string(),
        }
    }
}
