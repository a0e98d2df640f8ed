//! CSV format handling for operations, snapshots, and reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - Flat row structures for (de)serialization of every collection
//! - Conversion between rows and domain types
//! - Report serialization for the reporting collaborators
//!
//! Rows keep amounts and dates as strings and convert explicitly, so a
//! malformed field produces a described error instead of a serde panic.
//! All functions are pure (no I/O) for easy testing.

use crate::core::engine::BookCirculation;
use crate::types::{
    Book, BookCategory, BookFormat, BookId, IssueId, IssueRecord, Member, MemberId, OperationRecord,
    OperationType, Reservation,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for one operation row
///
/// Matches the operations input format with columns:
/// `op,member,book,date,amount`. The book column is empty for fine
/// payments, the amount column is empty for everything else.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OperationRow {
    pub op: String,
    pub member: MemberId,
    pub book: Option<BookId>,
    pub date: String,
    pub amount: Option<String>,
}

/// Convert an OperationRow to an OperationRecord
///
/// This function:
/// - Parses the operation name (case-insensitively)
/// - Parses the date (ISO `YYYY-MM-DD`)
/// - Parses the amount into a Decimal (if present)
/// - Validates that fine payments carry an amount and every other
///   operation names a book
pub fn convert_operation_row(row: OperationRow) -> Result<OperationRecord, String> {
    let op = match row.op.to_lowercase().as_str() {
        "issue" => OperationType::Issue,
        "return" => OperationType::Return,
        "renew" => OperationType::Renew,
        "reserve" => OperationType::Reserve,
        "cancel" => OperationType::Cancel,
        "payfine" => OperationType::PayFine,
        _ => {
            return Err(format!(
                "Invalid operation '{}' for member {}",
                row.op, row.member
            ))
        }
    };

    let date = parse_date(&row.date)
        .map_err(|e| format!("Invalid date '{}' for member {}: {}", row.date, row.member, e))?;

    // Parse amount if present
    let amount = match row.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => {
            match Decimal::from_str(amount_str.trim()) {
                Ok(decimal) => Some(decimal),
                Err(_) => {
                    return Err(format!(
                        "Invalid amount '{}' for member {}",
                        amount_str, row.member
                    ))
                }
            }
        }
        _ => None,
    };

    // Validate field presence based on operation type
    match op {
        OperationType::PayFine => {
            if amount.is_none() {
                return Err(format!(
                    "payfine for member {} requires an amount",
                    row.member
                ));
            }
        }
        _ => {
            if row.book.is_none() {
                return Err(format!(
                    "{} for member {} requires a book",
                    row.op, row.member
                ));
            }
        }
    }

    Ok(OperationRecord {
        op,
        member: row.member,
        book: row.book,
        date,
        amount,
    })
}

/// Snapshot row for one catalog entry
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BookRow {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: u16,
    pub category: String,
    pub format: String,
    pub total_copies: Option<u32>,
    pub available_copies: Option<u32>,
    pub reserved_copies: Option<u32>,
}

/// Convert a BookRow to a Book
///
/// Physical rows must carry all three copy counters and the counters
/// must fit inside the total; digital rows must carry none.
pub fn convert_book_row(row: BookRow) -> Result<Book, String> {
    let category: BookCategory = row.category.parse()?;

    let format = match row.format.to_lowercase().as_str() {
        "physical" => {
            let total = row
                .total_copies
                .ok_or_else(|| format!("Physical book {} requires total_copies", row.id))?;
            let available = row
                .available_copies
                .ok_or_else(|| format!("Physical book {} requires available_copies", row.id))?;
            let reserved = row
                .reserved_copies
                .ok_or_else(|| format!("Physical book {} requires reserved_copies", row.id))?;
            if available + reserved > total {
                return Err(format!(
                    "Physical book {} counters exceed total: {} available + {} reserved > {} total",
                    row.id, available, reserved, total
                ));
            }
            BookFormat::Physical {
                total_copies: total,
                available_copies: available,
                reserved_copies: reserved,
            }
        }
        "digital" => BookFormat::Digital,
        _ => return Err(format!("Invalid book format '{}' for book {}", row.format, row.id)),
    };

    Ok(Book {
        id: row.id,
        title: row.title,
        author: row.author,
        publisher: row.publisher,
        year: row.year,
        category,
        format,
    })
}

/// Convert a Book to its snapshot row
pub fn book_to_row(book: &Book) -> BookRow {
    let (format, total, available, reserved) = match book.format {
        BookFormat::Physical {
            total_copies,
            available_copies,
            reserved_copies,
        } => (
            "physical",
            Some(total_copies),
            Some(available_copies),
            Some(reserved_copies),
        ),
        BookFormat::Digital => ("digital", None, None, None),
    };

    BookRow {
        id: book.id,
        title: book.title.clone(),
        author: book.author.clone(),
        publisher: book.publisher.clone(),
        year: book.year,
        category: format!("{:?}", book.category),
        format: format.to_string(),
        total_copies: total,
        available_copies: available,
        reserved_copies: reserved,
    }
}

/// Snapshot row for one member
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MemberRow {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub category: String,
    pub status: String,
    pub borrowed_count: u32,
    pub fine_balance: String,
    pub renewal_count: u32,
}

/// Convert a MemberRow to a Member
///
/// Unknown category names fall back to Regular (the documented
/// Regular-equivalent policy default); unknown statuses are rejected.
pub fn convert_member_row(row: MemberRow) -> Result<Member, String> {
    let category = row
        .category
        .parse()
        .unwrap_or(crate::types::MemberCategory::Regular);
    let status = row.status.parse()?;
    let fine_balance = Decimal::from_str(row.fine_balance.trim())
        .map_err(|_| format!("Invalid fine balance '{}' for member {}", row.fine_balance, row.id))?;

    Ok(Member {
        id: row.id,
        name: row.name,
        email: row.email,
        category,
        status,
        borrowed_count: row.borrowed_count,
        fine_balance,
        renewal_count: row.renewal_count,
    })
}

/// Convert a Member to its snapshot row
pub fn member_to_row(member: &Member) -> MemberRow {
    MemberRow {
        id: member.id,
        name: member.name.clone(),
        email: member.email.clone(),
        category: member.category.to_string(),
        status: member.status.to_string(),
        borrowed_count: member.borrowed_count,
        fine_balance: member.fine_balance.to_string(),
        renewal_count: member.renewal_count,
    }
}

/// Snapshot row for one issue record
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IssueRow {
    pub id: IssueId,
    pub member: MemberId,
    pub book: BookId,
    pub issued_on: String,
    pub due_on: String,
    pub returned_on: Option<String>,
    pub fine: String,
}

/// Convert an IssueRow to an IssueRecord
pub fn convert_issue_row(row: IssueRow) -> Result<IssueRecord, String> {
    let issued_on = parse_date(&row.issued_on)
        .map_err(|e| format!("Invalid issue date for issue {}: {}", row.id, e))?;
    let due_on = parse_date(&row.due_on)
        .map_err(|e| format!("Invalid due date for issue {}: {}", row.id, e))?;
    let returned_on = match row.returned_on {
        Some(value) if !value.trim().is_empty() => Some(
            parse_date(&value)
                .map_err(|e| format!("Invalid return date for issue {}: {}", row.id, e))?,
        ),
        _ => None,
    };
    let fine = Decimal::from_str(row.fine.trim())
        .map_err(|_| format!("Invalid fine '{}' for issue {}", row.fine, row.id))?;

    Ok(IssueRecord {
        id: row.id,
        member: row.member,
        book: row.book,
        issued_on,
        due_on,
        returned_on,
        fine,
    })
}

/// Convert an IssueRecord to its snapshot row
pub fn issue_to_row(issue: &IssueRecord) -> IssueRow {
    IssueRow {
        id: issue.id,
        member: issue.member,
        book: issue.book,
        issued_on: issue.issued_on.to_string(),
        due_on: issue.due_on.to_string(),
        returned_on: issue.returned_on.map(|d| d.to_string()),
        fine: issue.fine.to_string(),
    }
}

/// Snapshot row for one reservation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReservationRow {
    pub member: MemberId,
    pub book: BookId,
    pub reserved_on: String,
}

/// Convert a ReservationRow to a Reservation
pub fn convert_reservation_row(row: ReservationRow) -> Result<Reservation, String> {
    let reserved_on = parse_date(&row.reserved_on).map_err(|e| {
        format!(
            "Invalid reservation date for member {} book {}: {}",
            row.member, row.book, e
        )
    })?;
    Ok(Reservation::new(row.member, row.book, reserved_on))
}

/// Convert a Reservation to its snapshot row
pub fn reservation_to_row(reservation: &Reservation) -> ReservationRow {
    ReservationRow {
        member: reservation.member,
        book: reservation.book,
        reserved_on: reservation.reserved_on.to_string(),
    }
}

/// Parse an ISO `YYYY-MM-DD` date
fn parse_date(value: &str) -> Result<NaiveDate, String> {
    value
        .trim()
        .parse::<NaiveDate>()
        .map_err(|e| e.to_string())
}

/// Write the member summary report
///
/// Columns: member, name, category, status, borrowed, fine, renewals.
/// Members are written in the order given; the engine supplies them
/// sorted by ID for deterministic output.
pub fn write_member_report(members: &[Member], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["member", "name", "category", "status", "borrowed", "fine", "renewals"])
        .map_err(|e| format!("Failed to write report header: {}", e))?;

    for member in members {
        writer
            .write_record(&[
                member.id.to_string(),
                member.name.clone(),
                member.category.to_string(),
                member.status.to_string(),
                member.borrowed_count.to_string(),
                format!("{:.2}", member.fine_balance),
                member.renewal_count.to_string(),
            ])
            .map_err(|e| format!("Failed to write member record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write the overdue-issues report as of `today`
///
/// Columns: issue, member, book, due_on, days_overdue.
pub fn write_overdue_report(
    issues: &[IssueRecord],
    today: NaiveDate,
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["issue", "member", "book", "due_on", "days_overdue"])
        .map_err(|e| format!("Failed to write report header: {}", e))?;

    for issue in issues {
        writer
            .write_record(&[
                issue.id.to_string(),
                issue.member.to_string(),
                issue.book.to_string(),
                issue.due_on.to_string(),
                issue.days_overdue(today).to_string(),
            ])
            .map_err(|e| format!("Failed to write overdue record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write the per-book circulation report
///
/// Columns: book, title, issued_count, reserved_count. Rows arrive
/// most-issued first from the engine.
pub fn write_circulation_report(
    counts: &[BookCirculation],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["book", "title", "issued_count", "reserved_count"])
        .map_err(|e| format!("Failed to write report header: {}", e))?;

    for count in counts {
        writer
            .write_record(&[
                count.book.to_string(),
                count.title.clone(),
                count.issued_count.to_string(),
                count.reserved_count.to_string(),
            ])
            .map_err(|e| format!("Failed to write circulation record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
