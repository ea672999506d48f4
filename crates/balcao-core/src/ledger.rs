//! # Receivables & Payables
//!
//! Balance arithmetic for accounts receivable and payable.
//!
//! ```text
//! total       = original + interest + penalty − discount
//! outstanding = total − settled
//! days_overdue: only for open entries past their due date
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LedgerDirection {
    /// Money the business expects to receive.
    Receivable,
    /// Money the business owes.
    Payable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LedgerStatus {
    #[default]
    Pending,
    /// Paid (payable) or received (receivable).
    Settled,
    Cancelled,
    /// Flagged overdue by the backend.
    Overdue,
}

impl LedgerStatus {
    /// Still waiting for money to move.
    pub fn is_open(&self) -> bool {
        matches!(self, LedgerStatus::Pending | LedgerStatus::Overdue)
    }
}

/// One receivable or payable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerEntry {
    pub id: i64,
    pub direction: LedgerDirection,
    pub description: String,
    #[serde(rename = "original_cents")]
    pub original: Money,
    #[serde(default, rename = "interest_cents")]
    pub interest: Money,
    #[serde(default, rename = "penalty_cents")]
    pub penalty: Money,
    #[serde(default, rename = "discount_cents")]
    pub discount: Money,
    #[serde(default, rename = "settled_cents")]
    pub settled: Money,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: LedgerStatus,
}

impl LedgerEntry {
    pub fn total(&self) -> Money {
        self.original + self.interest + self.penalty - self.discount
    }

    pub fn outstanding(&self) -> Money {
        self.total() - self.settled
    }

    /// Whole days past due as of `today`, zero unless the entry is open.
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        if self.status.is_open() && self.due_date < today {
            (today - self.due_date).num_days()
        } else {
            0
        }
    }
}

/// Aggregate over a list of entries. Cancelled entries are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerSummary {
    pub count: u32,
    #[serde(rename = "total_cents")]
    pub total: Money,
    #[serde(rename = "settled_cents")]
    pub settled: Money,
    #[serde(rename = "outstanding_cents")]
    pub outstanding: Money,
    pub overdue_count: u32,
    #[serde(rename = "overdue_cents")]
    pub overdue: Money,
}

impl LedgerSummary {
    pub fn of(entries: &[LedgerEntry], today: NaiveDate) -> Self {
        entries
            .iter()
            .filter(|e| e.status != LedgerStatus::Cancelled)
            .fold(LedgerSummary::default(), |mut acc, e| {
                acc.count += 1;
                acc.total += e.total();
                acc.settled += e.settled;
                if e.status.is_open() {
                    acc.outstanding += e.outstanding();
                }
                if e.days_overdue(today) > 0 {
                    acc.overdue_count += 1;
                    acc.overdue += e.outstanding();
                }
                acc
            })
    }
}

/// Outstanding receivables minus outstanding payables.
pub fn net_position(entries: &[LedgerEntry], today: NaiveDate) -> Money {
    let (receivable, payable): (Vec<LedgerEntry>, Vec<LedgerEntry>) = entries
        .iter()
        .cloned()
        .partition(|e| e.direction == LedgerDirection::Receivable);
    LedgerSummary::of(&receivable, today).outstanding - LedgerSummary::of(&payable, today).outstanding
}
