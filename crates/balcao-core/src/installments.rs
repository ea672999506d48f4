//! Monthly installment schedules.
//!
//! ```text
//! R$ 100,00 in 3x, first due 2024-01-10
//!   #1  R$ 33,34  2024-01-10   ← remainder cents land on the first one
//!   #2  R$ 33,33  2024-02-10
//!   #3  R$ 33,33  2024-03-10
//! ```

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// One entry of an installment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Installment {
    /// 1-based.
    pub number: u32,
    #[serde(rename = "amount_cents")]
    pub amount: Money,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
}

/// Splits `gross` into `count` monthly installments.
///
/// The amounts always add back up to `gross`. Month-end due dates are clamped
/// (Jan 31 → Feb 29 → Mar 31 follows the first date, not the previous one).
pub fn schedule(
    gross: Money,
    count: u32,
    first_due: NaiveDate,
) -> Result<Vec<Installment>, ValidationError> {
    if count == 0 {
        return Err(ValidationError::MustBePositive {
            field: "installments".to_string(),
        });
    }

    let base = gross.cents() / count as i64;
    let remainder = gross.cents() - base * count as i64;

    (0..count)
        .map(|i| {
            let due_date = first_due
                .checked_add_months(Months::new(i))
                .ok_or_else(|| ValidationError::InvalidFormat {
                    field: "due date".to_string(),
                    reason: "out of calendar range".to_string(),
                })?;
            let cents = if i == 0 { base + remainder } else { base };
            Ok(Installment {
                number: i + 1,
                amount: Money::from_cents(cents),
                due_date,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_remainder_on_first_installment() {
        let plan = schedule(Money::from_cents(10000), 3, date(2024, 1, 10)).unwrap();
        let amounts: Vec<i64> = plan.iter().map(|i| i.amount.cents()).collect();
        assert_eq!(amounts, vec![3334, 3333, 3333]);
        assert_eq!(plan[2].due_date, date(2024, 3, 10));
        assert_eq!(plan.iter().map(|i| i.amount).sum::<Money>().cents(), 10000);
    }

    #[test]
    fn test_month_end_clamping() {
        let plan = schedule(Money::from_cents(300), 3, date(2024, 1, 31)).unwrap();
        assert_eq!(plan[1].due_date, date(2024, 2, 29));
        assert_eq!(plan[2].due_date, date(2024, 3, 31));
    }

    #[test]
    fn test_single_installment() {
        let plan = schedule(Money::from_cents(999), 1, date(2024, 5, 1)).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].number, 1);
        assert_eq!(plan[0].amount.cents(), 999);
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(schedule(Money::from_cents(100), 0, date(2024, 5, 1)).is_err());
    }
}
