//! Loan policy table and per-category fine rules
//!
//! This module anchors every numeric business rule of the circulation
//! engine so the rules are testable in isolation:
//!
//! - [`LoanPolicy::for_category`] - pure lookup of borrowing limits, fine
//!   rates, grace periods, renewal limits, maximum fines, and the loan
//!   period
//! - [`fine_for`] - the overdue fine formula, keyed by member category
//! - [`renewal_fine_rule`] - the per-category fine threshold that gates
//!   renewals
//!
//! The fine formula is intentionally a strategy keyed by category rather
//! than one global rule: each category has its own grace window, and only
//! some categories escalate charges for long-overdue books.

use crate::types::member::MemberCategory;
use rust_decimal::Decimal;

/// Days overdue after which the late-escalation surcharge starts accruing.
const ESCALATION_THRESHOLD_DAYS: i64 = 30;

/// Per-day surcharge applied beyond the escalation threshold (0.50).
const ESCALATION_PER_DAY: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

/// Borrowing and fine policy for one member category
///
/// A pure value looked up from the member category. It has no side
/// effects and no failure modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPolicy {
    /// Maximum number of books that may be borrowed at once
    pub borrow_limit: u32,

    /// Fine charged per chargeable overdue day
    pub daily_fine: Decimal,

    /// Days past the due date before fines start accruing
    pub grace_days: i64,

    /// Maximum number of renewals
    pub renewal_limit: u32,

    /// Fine balance at which the membership is suspended
    pub max_fine: Decimal,

    /// Standard loan period in days; renewals extend the due date by the
    /// same span
    pub loan_days: u64,
}

impl LoanPolicy {
    /// Look up the policy for a member category
    ///
    /// | category | borrow | daily fine | grace | renewals | max fine | loan days |
    /// |----------|--------|------------|-------|----------|----------|-----------|
    /// | Student  | 3      | 2.00       | 3     | 2        | 100.00   | 5         |
    /// | Faculty  | 5      | 1.00       | 5     | 3        | 50.00    | 5         |
    /// | Regular  | 2      | 3.00       | 2     | 1        | 200.00   | 5         |
    ///
    /// Regular is the documented default for anything that cannot be
    /// classified (unknown category strings parse to
    /// [`MemberCategory::Regular`]).
    pub fn for_category(category: MemberCategory) -> Self {
        match category {
            MemberCategory::Student => LoanPolicy {
                borrow_limit: 3,
                daily_fine: Decimal::new(200, 2),
                grace_days: 3,
                renewal_limit: 2,
                max_fine: Decimal::new(10000, 2),
                loan_days: 5,
            },
            MemberCategory::Faculty => LoanPolicy {
                borrow_limit: 5,
                daily_fine: Decimal::new(100, 2),
                grace_days: 5,
                renewal_limit: 3,
                max_fine: Decimal::new(5000, 2),
                loan_days: 5,
            },
            MemberCategory::Regular => LoanPolicy {
                borrow_limit: 2,
                daily_fine: Decimal::new(300, 2),
                grace_days: 2,
                renewal_limit: 1,
                max_fine: Decimal::new(20000, 2),
                loan_days: 5,
            },
        }
    }
}

/// Fine threshold a member must satisfy to renew a book
///
/// The renewal gate differs by category: some categories require a clean
/// fine slate, others merely tolerate balances below half the suspension
/// threshold. Exposed as explicit configuration instead of a single
/// hard-coded rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalFineRule {
    /// Renewal requires a zero fine balance
    ZeroFine,

    /// Renewal is allowed while the fine balance is below half the
    /// category's maximum fine
    BelowHalfMax,
}

impl RenewalFineRule {
    /// Check whether a fine balance satisfies this rule
    pub fn permits(&self, fine_balance: Decimal, max_fine: Decimal) -> bool {
        match self {
            RenewalFineRule::ZeroFine => fine_balance.is_zero(),
            RenewalFineRule::BelowHalfMax => fine_balance < max_fine / Decimal::TWO,
        }
    }
}

/// The renewal fine rule for a member category
///
/// Students must clear all fines before renewing; Faculty and Regular
/// members may renew while their balance stays below half the maximum.
pub fn renewal_fine_rule(category: MemberCategory) -> RenewalFineRule {
    match category {
        MemberCategory::Student => RenewalFineRule::ZeroFine,
        MemberCategory::Faculty | MemberCategory::Regular => RenewalFineRule::BelowHalfMax,
    }
}

/// Compute the fine for a book returned `days_overdue` days past its due
/// date
///
/// The first `grace_days` overdue days are free; every day beyond the
/// grace window is charged at the category's daily rate. Faculty and
/// Regular members additionally pay a 0.50/day surcharge for every day
/// beyond 30 days overdue. Non-positive `days_overdue` yields a zero
/// fine.
pub fn fine_for(category: MemberCategory, days_overdue: i64) -> Decimal {
    if days_overdue <= 0 {
        return Decimal::ZERO;
    }

    let policy = LoanPolicy::for_category(category);
    let charged_days = (days_overdue - policy.grace_days).max(0);
    let mut fine = Decimal::from(charged_days) * policy.daily_fine;

    // Long-overdue escalation applies to Faculty and Regular only.
    let escalates = matches!(
        category,
        MemberCategory::Faculty | MemberCategory::Regular
    );
    if escalates && days_overdue > ESCALATION_THRESHOLD_DAYS {
        fine += Decimal::from(days_overdue - ESCALATION_THRESHOLD_DAYS) * ESCALATION_PER_DAY;
    }

    fine
}
