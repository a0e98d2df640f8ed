//! Bulk import/export in the line-oriented `key=value` format
//!
//! Legacy data interchange uses one record per line, fields as
//! `key=value` pairs separated by commas, keys in the legacy camelCase
//! spelling:
//!
//! ```text
//! id=42, title=A Wizard of Earthsea, author=Ursula K. Le Guin, publisher=Parnassus, publicationYear=1968, category=Fiction, bookType=Physical Book, totalCopies=2, availableCopies=2, reservedCopies=0
//! ```
//!
//! Parsing is per-line and order-insensitive in the keys. Malformed
//! lines are skipped and reported with their line numbers; well-formed
//! lines still import, matching the reader modules' skip-and-report
//! handling.

use crate::types::{
    Book, BookCategory, BookFormat, IssueRecord, Member, MemberCategory, MemberStatus,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// Result of a bulk import: parsed records plus per-line error reports
#[derive(Debug)]
pub struct ImportOutcome<T> {
    /// Successfully parsed records, in input order
    pub records: Vec<T>,
    /// One message per skipped line, with its line number
    pub errors: Vec<String>,
}

impl<T> ImportOutcome<T> {
    fn new() -> Self {
        ImportOutcome {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Split one line into its key=value fields
///
/// Pairs are comma-separated; the first `=` in a pair separates key from
/// value, so values may themselves contain `=`. Pairs without an `=` are
/// ignored.
fn parse_line(line: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for pair in line.split(',') {
        if let Some((key, value)) = pair.split_once('=') {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    fields
}

fn required<'a>(fields: &'a HashMap<String, String>, key: &str) -> Result<&'a str, String> {
    fields
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| format!("missing field '{}'", key))
}

fn parse_number<T: FromStr>(fields: &HashMap<String, String>, key: &str) -> Result<T, String> {
    let value = required(fields, key)?;
    value
        .parse::<T>()
        .map_err(|_| format!("invalid value '{}' for field '{}'", value, key))
}

fn parse_import_date(fields: &HashMap<String, String>, key: &str) -> Result<NaiveDate, String> {
    let value = required(fields, key)?;
    value
        .parse::<NaiveDate>()
        .map_err(|_| format!("invalid date '{}' for field '{}'", value, key))
}

/// Parse one book line
fn book_from_fields(fields: &HashMap<String, String>) -> Result<Book, String> {
    let id = parse_number(fields, "id")?;
    let title = required(fields, "title")?.to_string();
    let author = required(fields, "author")?.to_string();
    let publisher = required(fields, "publisher")?.to_string();
    let year = parse_number(fields, "publicationYear")?;
    let category: BookCategory = required(fields, "category")?.parse()?;

    let book_type = required(fields, "bookType")?;
    let format = match book_type.to_lowercase().as_str() {
        "physical" | "physical book" => {
            let total_copies = parse_number(fields, "totalCopies")?;
            let available_copies = parse_number(fields, "availableCopies")?;
            let reserved_copies = parse_number(fields, "reservedCopies")?;
            if available_copies + reserved_copies > total_copies {
                return Err(format!(
                    "copy counters exceed total for book {}",
                    id
                ));
            }
            BookFormat::Physical {
                total_copies,
                available_copies,
                reserved_copies,
            }
        }
        // Legacy exports distinguish EBooks from audio books; both are
        // digital holdings here.
        "digital" | "ebook" | "audio book" | "audiobook" => BookFormat::Digital,
        _ => return Err(format!("invalid bookType '{}'", book_type)),
    };

    Ok(Book {
        id,
        title,
        author,
        publisher,
        year,
        category,
        format,
    })
}

/// Parse one member line
fn member_from_fields(fields: &HashMap<String, String>) -> Result<Member, String> {
    let id = parse_number(fields, "id")?;
    let name = required(fields, "name")?.to_string();
    let email = required(fields, "email")?.to_string();
    // Unknown member types map to the Regular-equivalent default
    let category: MemberCategory = required(fields, "memberType")?
        .parse()
        .unwrap_or(MemberCategory::Regular);
    let status: MemberStatus = required(fields, "membershipStatus")?.parse()?;
    let borrowed_count = parse_number(fields, "currentBorrowedBooks")?;
    let fine_raw = required(fields, "totalFineAmount")?;
    let fine_balance = Decimal::from_str(fine_raw)
        .map_err(|_| format!("invalid value '{}' for field 'totalFineAmount'", fine_raw))?;
    let renewal_count = parse_number(fields, "renewalCount")?;

    Ok(Member {
        id,
        name,
        email,
        category,
        status,
        borrowed_count,
        fine_balance,
        renewal_count,
    })
}

/// Parse one issue line
///
/// An absent, empty, or `0` returnDate marks an open loan, mirroring the
/// legacy epoch-zero convention.
fn issue_from_fields(fields: &HashMap<String, String>) -> Result<IssueRecord, String> {
    let id = parse_number(fields, "issueId")?;
    let member = parse_number(fields, "memberId")?;
    let book = parse_number(fields, "bookId")?;
    let issued_on = parse_import_date(fields, "issueDate")?;
    let due_on = parse_import_date(fields, "dueDate")?;
    let returned_on = match fields.get("returnDate").map(String::as_str) {
        None | Some("") | Some("0") => None,
        Some(value) => Some(
            value
                .parse::<NaiveDate>()
                .map_err(|_| format!("invalid date '{}' for field 'returnDate'", value))?,
        ),
    };
    let fine_raw = required(fields, "fineAmount")?;
    let fine = Decimal::from_str(fine_raw)
        .map_err(|_| format!("invalid value '{}' for field 'fineAmount'", fine_raw))?;

    Ok(IssueRecord {
        id,
        member,
        book,
        issued_on,
        due_on,
        returned_on,
        fine,
    })
}

fn import_lines<T>(
    input: &str,
    parse: impl Fn(&HashMap<String, String>) -> Result<T, String>,
) -> ImportOutcome<T> {
    let mut outcome = ImportOutcome::new();
    for (index, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse(&parse_line(line)) {
            Ok(record) => outcome.records.push(record),
            Err(e) => outcome.errors.push(format!("Line {}: {}", index + 1, e)),
        }
    }
    outcome
}

/// Import books from `key=value` lines
pub fn import_books(input: &str) -> ImportOutcome<Book> {
    import_lines(input, book_from_fields)
}

/// Import members from `key=value` lines
pub fn import_members(input: &str) -> ImportOutcome<Member> {
    import_lines(input, member_from_fields)
}

/// Import issue records from `key=value` lines
pub fn import_issues(input: &str) -> ImportOutcome<IssueRecord> {
    import_lines(input, issue_from_fields)
}

/// Render one book as a `key=value` line
pub fn export_book(book: &Book) -> String {
    match book.format {
        BookFormat::Physical {
            total_copies,
            available_copies,
            reserved_copies,
        } => format!(
            "id={}, title={}, author={}, publisher={}, publicationYear={}, category={:?}, bookType=Physical Book, totalCopies={}, availableCopies={}, reservedCopies={}",
            book.id,
            book.title,
            book.author,
            book.publisher,
            book.year,
            book.category,
            total_copies,
            available_copies,
            reserved_copies
        ),
        BookFormat::Digital => format!(
            "id={}, title={}, author={}, publisher={}, publicationYear={}, category={:?}, bookType=Digital",
            book.id, book.title, book.author, book.publisher, book.year, book.category
        ),
    }
}

/// Render one member as a `key=value` line
pub fn export_member(member: &Member) -> String {
    format!(
        "id={}, name={}, email={}, memberType={}, membershipStatus={}, currentBorrowedBooks={}, totalFineAmount={}, renewalCount={}",
        member.id,
        member.name,
        member.email,
        member.category,
        member.status,
        member.borrowed_count,
        member.fine_balance,
        member.renewal_count
    )
}

/// Render one issue record as a `key=value` line
pub fn export_issue(issue: &IssueRecord) -> String {
    let returned = issue
        .returned_on
        .map(|d| d.to_string())
        .unwrap_or_else(|| "0".to_string());
    format!(
        "issueId={}, memberId={}, bookId={}, issueDate={}, dueDate={}, returnDate={}, fineAmount={}",
        issue.id, issue.member, issue.book, issue.issued_on, issue.due_on, returned, issue.fine
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_import_physical_book() {
        let input = "id=42, title=A Wizard of Earthsea, author=Ursula K. Le Guin, \
                     publisher=Parnassus, publicationYear=1968, category=Fiction, \
                     bookType=Physical Book, totalCopies=2, availableCopies=1, reservedCopies=1";

        let outcome = import_books(input);

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.records.len(), 1);
        let book = &outcome.records[0];
        assert_eq!(book.id, 42);
        assert_eq!(book.title, "A Wizard of Earthsea");
        assert_eq!(book.available_copies(), Some(1));
        assert_eq!(book.reserved_copies(), Some(1));
    }

    #[test]
    fn test_import_legacy_digital_types() {
        let input = "id=7, title=The Dispossessed, author=Ursula K. Le Guin, publisher=Harper, \
                     publicationYear=1974, category=Fiction, bookType=EBook\n\
                     id=8, title=The Word for World Is Forest, author=Ursula K. Le Guin, \
                     publisher=Putnam, publicationYear=1972, category=Fiction, bookType=Audio Book";

        let outcome = import_books(input);

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.records.iter().all(|b| !b.has_finite_copies()));
    }

    #[test]
    fn test_import_skips_malformed_lines_and_reports_them() {
        let input = "id=42, title=Good, author=A, publisher=P, publicationYear=1968, \
                     category=Fiction, bookType=Physical Book, totalCopies=2, \
                     availableCopies=2, reservedCopies=0\n\
                     id=43, title=Bad, bookType=Physical Book\n\
                     id=44, title=Also Good, author=A, publisher=P, publicationYear=1970, \
                     category=Drama, bookType=EBook";

        let outcome = import_books(input);

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("Line 2"));
        assert!(outcome.errors[0].contains("missing field"));
    }

    #[test]
    fn test_import_member_with_unknown_type_defaults_to_regular() {
        let input = "id=1001, name=Asha Rao, email=asha@example.edu, memberType=Alumni, \
                     membershipStatus=Active, currentBorrowedBooks=1, totalFineAmount=4.50, \
                     renewalCount=0";

        let outcome = import_members(input);

        assert!(outcome.errors.is_empty());
        let member = &outcome.records[0];
        assert_eq!(member.category, MemberCategory::Regular);
        assert_eq!(member.fine_balance, Decimal::new(450, 2));
    }

    #[test]
    fn test_import_issue_open_and_closed() {
        let input = "issueId=1, memberId=1001, bookId=42, issueDate=2024-03-01, \
                     dueDate=2024-03-06, returnDate=0, fineAmount=0\n\
                     issueId=2, memberId=1002, bookId=43, issueDate=2024-03-01, \
                     dueDate=2024-03-06, returnDate=2024-03-09, fineAmount=4.00";

        let outcome = import_issues(input);

        assert!(outcome.errors.is_empty());
        assert!(outcome.records[0].is_open());
        assert_eq!(outcome.records[1].returned_on, Some(date(9)));
        assert_eq!(outcome.records[1].fine, Decimal::new(400, 2));
    }

    #[test]
    fn test_keys_are_order_insensitive() {
        let input = "bookType=EBook, category=Poetry, publicationYear=1985, \
                     publisher=P, author=A, title=T, id=5";

        let outcome = import_books(input);

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.records[0].id, 5);
        assert_eq!(outcome.records[0].category, BookCategory::Poetry);
    }

    #[test]
    fn test_export_import_round_trip() {
        let book = Book::physical(42, "T", "A", "P", 1968, BookCategory::Fiction, 2);
        let mut member = Member::new(1001, "Asha Rao", "asha@example.edu", MemberCategory::Student);
        member.fine_balance = Decimal::new(450, 2);
        let mut issue = IssueRecord::new(1, 1001, 42, date(1), date(6));
        issue.fine = Decimal::new(400, 2);

        assert_eq!(import_books(&export_book(&book)).records[0], book);
        assert_eq!(import_members(&export_member(&member)).records[0], member);
        assert_eq!(import_issues(&export_issue(&issue)).records[0], issue);
    }
}
