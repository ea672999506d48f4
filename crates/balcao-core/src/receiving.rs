//! Goods receipt against a purchase order.
//!
//! A receipt records the supplier invoice (NF) and how much of each ordered
//! line arrived. Lines may arrive over several receipts; the order is fully
//! received once every line reaches its ordered quantity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Quantity;

/// One purchase-order line as seen by the receiving screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptLine {
    pub reference_id: i64,
    pub description: String,
    #[serde(rename = "ordered_milli")]
    pub ordered: Quantity,
    /// Received by earlier receipts.
    #[serde(default, rename = "previously_received_milli")]
    pub previously_received: Quantity,
    /// Arriving now.
    #[serde(rename = "received_milli")]
    pub received: Quantity,
}

impl ReceiptLine {
    /// Quantity still expected before this receipt.
    pub fn pending(&self) -> Quantity {
        self.ordered - self.previously_received
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GoodsReceipt {
    pub purchase_order_id: i64,
    /// Supplier invoice number.
    pub invoice_number: String,
    #[ts(as = "String")]
    pub received_on: NaiveDate,
    pub lines: Vec<ReceiptLine>,
}

impl GoodsReceipt {
    /// Checks the receipt can be posted.
    ///
    /// ## Errors
    /// - `Required` if the invoice number is blank
    /// - `MustBePositive` for a negative line quantity
    /// - `Empty` if no line receives anything
    /// - `ExceedsOrdered` if a line receives more than is pending
    pub fn validate(&self) -> Result<(), ValidationError> {
        debug!(
            purchase_order_id = self.purchase_order_id,
            lines = self.lines.len(),
            "Validating goods receipt"
        );

        if self.invoice_number.trim().is_empty() {
            return Err(ValidationError::required("invoice number"));
        }

        for line in &self.lines {
            if line.received.thousandths() < 0 {
                return Err(ValidationError::MustBePositive {
                    field: format!("quantity received for {}", line.description),
                });
            }
            if line.received > line.pending() {
                return Err(ValidationError::ExceedsOrdered {
                    item: line.description.clone(),
                });
            }
        }

        if !self.lines.iter().any(|l| l.received.is_positive()) {
            return Err(ValidationError::Empty {
                what: "received item".to_string(),
            });
        }

        Ok(())
    }

    /// Every line reaches its ordered quantity with this receipt.
    pub fn completes_order(&self) -> bool {
        self.lines
            .iter()
            .all(|l| l.previously_received + l.received >= l.ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ordered: i64, before: i64, now: i64) -> ReceiptLine {
        ReceiptLine {
            reference_id: 1,
            description: "Parafuso".to_string(),
            ordered: Quantity::units(ordered),
            previously_received: Quantity::units(before),
            received: Quantity::units(now),
        }
    }

    fn receipt(lines: Vec<ReceiptLine>) -> GoodsReceipt {
        GoodsReceipt {
            purchase_order_id: 10,
            invoice_number: "NF-4521".to_string(),
            received_on: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            lines,
        }
    }

    #[test]
    fn test_valid_partial_receipt() {
        let r = receipt(vec![line(50, 0, 20), line(10, 0, 0)]);
        assert!(r.validate().is_ok());
        assert!(!r.completes_order());
    }

    #[test]
    fn test_completing_receipt() {
        let r = receipt(vec![line(50, 30, 20)]);
        assert!(r.validate().is_ok());
        assert!(r.completes_order());
    }

    #[test]
    fn test_invoice_number_required() {
        let mut r = receipt(vec![line(5, 0, 5)]);
        r.invoice_number = "  ".to_string();
        assert_eq!(r.validate(), Err(ValidationError::required("invoice number")));
    }

    #[test]
    fn test_nothing_received() {
        let r = receipt(vec![line(5, 0, 0)]);
        assert!(matches!(r.validate(), Err(ValidationError::Empty { .. })));
    }

    #[test]
    fn test_exceeds_pending() {
        let r = receipt(vec![line(50, 40, 20)]);
        assert_eq!(
            r.validate(),
            Err(ValidationError::ExceedsOrdered {
                item: "Parafuso".to_string()
            })
        );
    }
}
