//! # Validation Module
//!
//! Submission checks for an order. Everything here runs before the network
//! layer is touched; a failure blocks submission and is fixed by the operator.
//!
//! ## What Each Kind Requires
//! ```text
//! ┌──────────────────┬──────────────┬───────┬───────────────────────────────┐
//! │ Kind             │ Counterparty │ Items │ Extra                         │
//! ├──────────────────┼──────────────┼───────┼───────────────────────────────┤
//! │ Sale             │ customer     │ ≥ 1   │ payment when finalized        │
//! │ Purchase order   │ supplier     │ ≥ 1   │ expected delivery date        │
//! │ Service order    │ customer     │ any   │ equipment + reported defect   │
//! └──────────────────┴──────────────┴───────┴───────────────────────────────┘
//! ```
//!
//! Every line must have a positive quantity regardless of kind: the permissive
//! editor turns garbage into zero, and zero is caught here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::order::Order;
use crate::status::StatusAction;
use crate::types::{OrderKind, PaymentSelection};
use crate::MAX_ORDER_ITEMS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// What submission should do with the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Create the order in its initial status.
    #[default]
    Save,
    /// Create it, record the payment, then apply the kind's finalize step.
    Finalize,
}

impl Destination {
    /// Status step applied after creation, if any.
    pub fn follow_up(&self, kind: OrderKind) -> Option<StatusAction> {
        match self {
            Destination::Save => None,
            Destination::Finalize => StatusAction::finalize_for(kind),
        }
    }

    /// Whether this destination needs a payment selection for `kind`.
    pub fn requires_payment(&self, kind: OrderKind) -> bool {
        self.follow_up(kind)
            .map(|action| action.requires_payment(kind))
            .unwrap_or(false)
    }
}

/// Checks that `order` can be sent to `destination`.
///
/// ## Example
/// ```rust
/// use balcao_core::order::Order;
/// use balcao_core::types::OrderKind;
/// use balcao_core::validation::{validate_for_submit, Destination};
///
/// let order = Order::new(OrderKind::Sale);
/// let err = validate_for_submit(&order, Destination::Save, None).unwrap_err();
/// assert_eq!(err.to_string(), "customer is required");
/// ```
pub fn validate_for_submit(
    order: &Order,
    destination: Destination,
    payment: Option<&PaymentSelection>,
) -> ValidationResult<()> {
    if order.counterparty_id.is_none() {
        return Err(ValidationError::required(order.kind.counterparty_label()));
    }

    match order.kind {
        OrderKind::Sale => require_items(order)?,
        OrderKind::PurchaseOrder => {
            require_items(order)?;
            if order.expected_delivery.is_none() {
                return Err(ValidationError::required("expected delivery date"));
            }
        }
        OrderKind::ServiceOrder => {
            let service = order
                .service
                .as_ref()
                .ok_or_else(|| ValidationError::required("equipment"))?;
            validate_required_text("equipment", &service.equipment)?;
            validate_required_text("reported defect", &service.reported_defect)?;
        }
    }

    validate_lines(order)?;

    if destination.requires_payment(order.kind) && payment.is_none() {
        return Err(ValidationError::required("payment method"));
    }

    Ok(())
}

fn require_items(order: &Order) -> ValidationResult<()> {
    if order.items.is_empty() {
        return Err(ValidationError::Empty {
            what: "item".to_string(),
        });
    }
    Ok(())
}

fn validate_lines(order: &Order) -> ValidationResult<()> {
    if order.items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "number of items".to_string(),
            min: 0,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    for item in &order.items {
        if !item.quantity.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: format!("quantity of {}", item.description),
            });
        }
    }
    Ok(())
}

/// Non-blank text field.
pub fn validate_required_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fee;
    use crate::money::{Money, Rate};
    use crate::order::{ItemField, OrderAction};
    use crate::types::{
        CatalogEntry, FeeTiers, ItemKind, PaymentKind, PaymentMethod, ServiceDetails,
    };
    use chrono::NaiveDate;

    fn entry() -> CatalogEntry {
        CatalogEntry {
            reference_id: 1,
            kind: ItemKind::Product,
            name: "Teclado".to_string(),
            code: None,
            price: Money::from_cents(12000),
            available: true,
        }
    }

    fn ready(kind: OrderKind) -> Order {
        let order = Order::new(kind)
            .apply(OrderAction::SetCounterparty(Some(42)))
            .unwrap()
            .order;
        order.apply(OrderAction::AddItem(entry())).unwrap().order
    }

    fn payment(order: &Order) -> PaymentSelection {
        let methods = vec![PaymentMethod {
            id: 1,
            name: "Dinheiro".to_string(),
            kind: PaymentKind::Cash,
            operator: None,
            fee_rate: Rate::zero(),
            fixed_fee: Money::zero(),
            allows_installments: false,
            max_installments: 1,
            tiers: FeeTiers::default(),
            settlement_days: 0,
            active: true,
        }];
        fee::select(&methods, 1, order.totals().grand_total, 1).unwrap()
    }

    #[test]
    fn test_sale_requires_customer_and_items() {
        let order = Order::new(OrderKind::Sale);
        assert_eq!(
            validate_for_submit(&order, Destination::Save, None),
            Err(ValidationError::required("customer"))
        );

        let order = order.apply(OrderAction::SetCounterparty(Some(1))).unwrap().order;
        assert!(matches!(
            validate_for_submit(&order, Destination::Save, None),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn test_finalized_sale_requires_payment() {
        let order = ready(OrderKind::Sale);
        assert!(validate_for_submit(&order, Destination::Save, None).is_ok());
        assert_eq!(
            validate_for_submit(&order, Destination::Finalize, None),
            Err(ValidationError::required("payment method"))
        );
        let selection = payment(&order);
        assert!(validate_for_submit(&order, Destination::Finalize, Some(&selection)).is_ok());
    }

    #[test]
    fn test_purchase_order_needs_delivery_date_but_not_payment() {
        let order = ready(OrderKind::PurchaseOrder);
        assert_eq!(
            validate_for_submit(&order, Destination::Finalize, None),
            Err(ValidationError::required("expected delivery date"))
        );
        let order = order
            .apply(OrderAction::SetExpectedDelivery(NaiveDate::from_ymd_opt(2024, 7, 1)))
            .unwrap()
            .order;
        assert!(validate_for_submit(&order, Destination::Finalize, None).is_ok());
    }

    #[test]
    fn test_service_order_needs_equipment_and_defect() {
        let order = Order::new(OrderKind::ServiceOrder)
            .apply(OrderAction::SetCounterparty(Some(3)))
            .unwrap()
            .order;
        assert_eq!(
            validate_for_submit(&order, Destination::Save, None),
            Err(ValidationError::required("equipment"))
        );

        let order = order
            .apply(OrderAction::SetServiceDetails(ServiceDetails {
                equipment: "Notebook".to_string(),
                reported_defect: " ".to_string(),
                ..Default::default()
            }))
            .unwrap()
            .order;
        assert_eq!(
            validate_for_submit(&order, Destination::Save, None),
            Err(ValidationError::required("reported defect"))
        );
    }

    #[test]
    fn test_zero_quantity_blocks_submit() {
        let order = ready(OrderKind::Sale)
            .apply(OrderAction::UpdateItem {
                index: 0,
                field: ItemField::Quantity,
                raw: "abc".to_string(),
            })
            .unwrap()
            .order;
        assert!(matches!(
            validate_for_submit(&order, Destination::Save, None),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_destination_follow_up() {
        assert_eq!(Destination::Save.follow_up(OrderKind::Sale), None);
        assert_eq!(
            Destination::Finalize.follow_up(OrderKind::Sale),
            Some(StatusAction::Invoice)
        );
        assert!(!Destination::Finalize.requires_payment(OrderKind::ServiceOrder));
    }
}
