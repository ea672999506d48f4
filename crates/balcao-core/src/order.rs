//! # Order Builder
//!
//! The in-progress order as an immutable value driven by a pure reducer.
//!
//! ## Reducer Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Order (v1) ──apply(OrderAction)──► Applied { order: v2, warning }     │
//! │       │                                   │                             │
//! │       │ unchanged on Err                  ▼                             │
//! │       ▼                              v2.totals()                        │
//! │   CoreError                     (pure, recomputed on demand)            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals
//! ```text
//! items_subtotal  = Σ line_total
//! discount_amount = Percentage ? items_subtotal × value / 100 : value
//! grand_total     = items_subtotal + freight − discount_amount
//! ```
//! Nothing is clamped: a discount above the subtotal yields a negative grand
//! total, reported by [`OrderTotals::is_credit`].
//!
//! ## Numeric Input
//! Every numeric action carries the raw text the operator typed and goes
//! through the permissive policy of [`crate::coerce`]: garbage or negative
//! input becomes zero and never fails the action.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::coerce::{coerce_hundredths, coerce_money, coerce_quantity};
use crate::error::{CoreError, CoreResult};
use crate::money::{div_round, Money, Rate};
use crate::types::{
    CatalogEntry, DiscountMode, ItemKind, LineItem, OrderKind, ServiceDetails,
};

// =============================================================================
// Order
// =============================================================================

/// A sale, purchase order or service order being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    /// Client-side identity, sent as the idempotency key on creation.
    #[ts(as = "String")]
    pub draft_id: Uuid,
    pub kind: OrderKind,
    /// Customer (sale, service order) or supplier (purchase order).
    pub counterparty_id: Option<i64>,
    /// Insertion order is display order.
    pub items: Vec<LineItem>,
    #[serde(rename = "freight_cents")]
    pub freight: Money,
    pub discount_mode: DiscountMode,
    /// Hundredths: cents in amount mode, basis points in percentage mode.
    pub discount_value: i64,
    pub notes: Option<String>,
    #[ts(as = "Option<String>")]
    pub expected_delivery: Option<NaiveDate>,
    pub service: Option<ServiceDetails>,
}

impl Order {
    /// Creates an empty order of the given kind.
    pub fn new(kind: OrderKind) -> Self {
        Self {
            draft_id: Uuid::new_v4(),
            kind,
            counterparty_id: None,
            items: Vec::new(),
            freight: Money::zero(),
            discount_mode: DiscountMode::Amount,
            discount_value: 0,
            notes: None,
            expected_delivery: None,
            service: None,
        }
    }

    /// Applies one action, returning the next order.
    ///
    /// `self` is left untouched; on `Err` the caller keeps the previous value.
    ///
    /// ## Errors
    /// - [`CoreError::ItemIndexOutOfRange`] for remove/update past the end
    pub fn apply(&self, action: OrderAction) -> CoreResult<Applied> {
        debug!(kind = %self.kind, action = action.name(), "Applying order action");

        let mut next = self.clone();
        let mut warning = None;

        match action {
            OrderAction::AddItem(entry) => {
                warning = next.add_item(&entry);
            }
            OrderAction::RemoveItem(index) => {
                next.check_index(index)?;
                next.items.remove(index);
            }
            OrderAction::UpdateItem { index, field, raw } => {
                next.check_index(index)?;
                let item = &mut next.items[index];
                match field {
                    ItemField::Quantity => item.quantity = coerce_quantity(&raw),
                    ItemField::UnitPrice => item.unit_price = coerce_money(&raw),
                    ItemField::Discount => item.discount = coerce_money(&raw),
                }
            }
            OrderAction::SetDiscountMode(mode) => next.discount_mode = mode,
            OrderAction::SetDiscountValue(raw) => next.discount_value = coerce_hundredths(&raw),
            OrderAction::SetFreight(raw) => next.freight = coerce_money(&raw),
            OrderAction::SetCounterparty(id) => next.counterparty_id = id,
            OrderAction::SetNotes(notes) => {
                next.notes = notes.filter(|n| !n.trim().is_empty());
            }
            OrderAction::SetExpectedDelivery(date) => next.expected_delivery = date,
            OrderAction::SetServiceDetails(details) => next.service = Some(details),
        }

        Ok(Applied {
            order: next,
            warning,
        })
    }

    /// Appends a line unless the order refuses it.
    fn add_item(&mut self, entry: &CatalogEntry) -> Option<Warning> {
        if self.kind.checks_stock() && entry.kind == ItemKind::Product && !entry.available {
            warn!(reference_id = entry.reference_id, "Catalog entry out of stock, not added");
            return Some(Warning::Unavailable {
                reference_id: entry.reference_id,
                name: entry.name.clone(),
            });
        }

        if self.kind.rejects_duplicate_products()
            && entry.kind == ItemKind::Product
            && self
                .items
                .iter()
                .any(|i| i.kind == ItemKind::Product && i.reference_id == entry.reference_id)
        {
            warn!(reference_id = entry.reference_id, "Product already on purchase order");
            return Some(Warning::DuplicateProduct {
                reference_id: entry.reference_id,
                name: entry.name.clone(),
            });
        }

        self.items.push(LineItem::from_catalog(entry));
        None
    }

    fn check_index(&self, index: usize) -> CoreResult<()> {
        if index >= self.items.len() {
            return Err(CoreError::ItemIndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    /// Order-level discount in currency.
    pub fn discount_amount(&self, items_subtotal: Money) -> Money {
        match self.discount_mode {
            DiscountMode::Amount => Money::from_cents(self.discount_value),
            DiscountMode::Percentage => {
                let raw = items_subtotal.cents() as i128 * self.discount_value as i128;
                Money::from_cents(div_round(raw, Rate::SCALE as i128) as i64)
            }
        }
    }

    /// Recomputes every derived total. Pure and idempotent.
    pub fn totals(&self) -> OrderTotals {
        let mut products_subtotal = Money::zero();
        let mut services_subtotal = Money::zero();
        for item in &self.items {
            match item.kind {
                ItemKind::Product => products_subtotal += item.line_total(),
                ItemKind::Service => services_subtotal += item.line_total(),
            }
        }
        let items_subtotal = products_subtotal + services_subtotal;
        let discount_amount = self.discount_amount(items_subtotal);

        OrderTotals {
            items_subtotal,
            products_subtotal,
            services_subtotal,
            discount_amount,
            freight: self.freight,
            grand_total: items_subtotal + self.freight - discount_amount,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Editable numeric field of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemField {
    Quantity,
    UnitPrice,
    Discount,
}

/// Everything an operator can do to an order before submitting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum OrderAction {
    AddItem(CatalogEntry),
    RemoveItem(usize),
    UpdateItem {
        index: usize,
        field: ItemField,
        raw: String,
    },
    SetDiscountMode(DiscountMode),
    SetDiscountValue(String),
    SetFreight(String),
    SetCounterparty(Option<i64>),
    SetNotes(Option<String>),
    SetExpectedDelivery(Option<NaiveDate>),
    SetServiceDetails(ServiceDetails),
}

impl OrderAction {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            OrderAction::AddItem(_) => "add_item",
            OrderAction::RemoveItem(_) => "remove_item",
            OrderAction::UpdateItem { .. } => "update_item",
            OrderAction::SetDiscountMode(_) => "set_discount_mode",
            OrderAction::SetDiscountValue(_) => "set_discount_value",
            OrderAction::SetFreight(_) => "set_freight",
            OrderAction::SetCounterparty(_) => "set_counterparty",
            OrderAction::SetNotes(_) => "set_notes",
            OrderAction::SetExpectedDelivery(_) => "set_expected_delivery",
            OrderAction::SetServiceDetails(_) => "set_service_details",
        }
    }
}

/// Outcome of a successful [`Order::apply`].
#[derive(Debug, Clone)]
pub struct Applied {
    pub order: Order,
    /// Set when the action was refused softly (nothing changed).
    pub warning: Option<Warning>,
}

/// A refusal that is shown to the operator but is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Warning {
    /// The product is already a line of this purchase order.
    DuplicateProduct { reference_id: i64, name: String },
    /// The catalog reports no stock for a product added to a service order.
    Unavailable { reference_id: i64, name: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DuplicateProduct { name, .. } => {
                write!(f, "{} is already on this order", name)
            }
            Warning::Unavailable { name, .. } => write!(f, "{} is out of stock", name),
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Derived monetary totals of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    #[serde(rename = "items_subtotal_cents")]
    pub items_subtotal: Money,
    #[serde(rename = "products_subtotal_cents")]
    pub products_subtotal: Money,
    #[serde(rename = "services_subtotal_cents")]
    pub services_subtotal: Money,
    #[serde(rename = "discount_cents")]
    pub discount_amount: Money,
    #[serde(rename = "freight_cents")]
    pub freight: Money,
    #[serde(rename = "grand_total_cents")]
    pub grand_total: Money,
}

impl OrderTotals {
    /// A negative grand total: the order is a credit to the counterparty.
    #[inline]
    pub fn is_credit(&self) -> bool {
        self.grand_total.is_negative()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Quantity;

    fn product(id: i64, cents: i64) -> CatalogEntry {
        CatalogEntry {
            reference_id: id,
            kind: ItemKind::Product,
            name: format!("Produto {}", id),
            code: None,
            price: Money::from_cents(cents),
            available: true,
        }
    }

    fn service(id: i64, cents: i64) -> CatalogEntry {
        CatalogEntry {
            kind: ItemKind::Service,
            name: format!("Serviço {}", id),
            ..product(id, cents)
        }
    }

    fn run(order: Order, actions: Vec<OrderAction>) -> Order {
        actions
            .into_iter()
            .fold(order, |o, a| o.apply(a).unwrap().order)
    }

    fn subtotal_200(kind: OrderKind) -> Order {
        run(
            Order::new(kind),
            vec![
                OrderAction::AddItem(product(1, 5000)),
                OrderAction::UpdateItem {
                    index: 0,
                    field: ItemField::Quantity,
                    raw: "2".to_string(),
                },
                OrderAction::AddItem(service(2, 10000)),
            ],
        )
    }

    #[test]
    fn test_percentage_discount_with_freight() {
        let order = run(
            subtotal_200(OrderKind::Sale),
            vec![
                OrderAction::SetDiscountMode(DiscountMode::Percentage),
                OrderAction::SetDiscountValue("10".to_string()),
                OrderAction::SetFreight("15".to_string()),
            ],
        );
        let totals = order.totals();
        assert_eq!(totals.items_subtotal.cents(), 20000);
        assert_eq!(totals.discount_amount.cents(), 2000);
        assert_eq!(totals.grand_total.cents(), 19500);
        assert_eq!(totals.products_subtotal.cents(), 10000);
        assert_eq!(totals.services_subtotal.cents(), 10000);
    }

    #[test]
    fn test_amount_discount() {
        let order = run(
            subtotal_200(OrderKind::Sale),
            vec![OrderAction::SetDiscountValue("30".to_string())],
        );
        assert_eq!(order.totals().grand_total.cents(), 17000);
    }

    #[test]
    fn test_removing_all_items_keeps_negative_total() {
        let order = run(
            subtotal_200(OrderKind::ServiceOrder),
            vec![
                OrderAction::SetFreight("10".to_string()),
                OrderAction::SetDiscountValue("25".to_string()),
                OrderAction::RemoveItem(1),
                OrderAction::RemoveItem(0),
            ],
        );
        let totals = order.totals();
        assert!(order.is_empty());
        assert!(totals.items_subtotal.is_zero());
        assert_eq!(totals.grand_total.cents(), 1000 - 2500);
        assert!(totals.is_credit());
    }

    #[test]
    fn test_subtotal_matches_remaining_lines() {
        let order = run(
            Order::new(OrderKind::Sale),
            vec![
                OrderAction::AddItem(product(1, 1099)),
                OrderAction::AddItem(product(2, 799)),
                OrderAction::AddItem(product(1, 1099)),
                OrderAction::UpdateItem {
                    index: 1,
                    field: ItemField::Quantity,
                    raw: "0,333".to_string(),
                },
                OrderAction::UpdateItem {
                    index: 2,
                    field: ItemField::Discount,
                    raw: "1,50".to_string(),
                },
                OrderAction::RemoveItem(0),
                OrderAction::UpdateItem {
                    index: 0,
                    field: ItemField::UnitPrice,
                    raw: "8".to_string(),
                },
            ],
        );
        let expected: Money = order.items.iter().map(|i| i.line_total()).sum();
        assert_eq!(order.totals().items_subtotal, expected);
        // 8,00 × 0,333 = 2,664 → 2,66 ; 10,99 − 1,50 = 9,49
        assert_eq!(expected.cents(), 266 + 949);
        assert_eq!(order.totals(), order.totals());
    }

    #[test]
    fn test_last_write_wins() {
        let order = run(
            subtotal_200(OrderKind::Sale),
            vec![
                OrderAction::UpdateItem {
                    index: 0,
                    field: ItemField::Quantity,
                    raw: "5".to_string(),
                },
                OrderAction::UpdateItem {
                    index: 0,
                    field: ItemField::Quantity,
                    raw: "3".to_string(),
                },
            ],
        );
        assert_eq!(order.items[0].quantity, Quantity::units(3));
    }

    #[test]
    fn test_garbage_input_coerces_to_zero() {
        let order = run(
            subtotal_200(OrderKind::Sale),
            vec![
                OrderAction::UpdateItem {
                    index: 0,
                    field: ItemField::UnitPrice,
                    raw: "abc".to_string(),
                },
                OrderAction::SetFreight("-7".to_string()),
            ],
        );
        assert!(order.items[0].unit_price.is_zero());
        assert!(order.freight.is_zero());
    }

    #[test]
    fn test_purchase_order_rejects_duplicate_product() {
        let order = run(
            Order::new(OrderKind::PurchaseOrder),
            vec![OrderAction::AddItem(product(1, 500))],
        );
        let applied = order.apply(OrderAction::AddItem(product(1, 500))).unwrap();
        assert_eq!(applied.order.items.len(), 1);
        assert!(matches!(
            applied.warning,
            Some(Warning::DuplicateProduct { reference_id: 1, .. })
        ));
    }

    #[test]
    fn test_sale_allows_duplicates() {
        let order = run(
            Order::new(OrderKind::Sale),
            vec![
                OrderAction::AddItem(product(1, 500)),
                OrderAction::AddItem(product(1, 500)),
            ],
        );
        assert_eq!(order.items.len(), 2);
    }

    fn out_of_stock(id: i64) -> CatalogEntry {
        CatalogEntry {
            available: false,
            ..product(id, 100)
        }
    }

    #[test]
    fn test_service_order_refuses_out_of_stock_product() {
        let applied = Order::new(OrderKind::ServiceOrder)
            .apply(OrderAction::AddItem(out_of_stock(9)))
            .unwrap();
        assert!(applied.order.is_empty());
        assert_eq!(
            applied.warning.map(|w| w.to_string()),
            Some("Produto 9 is out of stock".to_string())
        );
    }

    #[test]
    fn test_purchase_order_accepts_out_of_stock_product() {
        let applied = Order::new(OrderKind::PurchaseOrder)
            .apply(OrderAction::AddItem(out_of_stock(5)))
            .unwrap();
        assert_eq!(applied.order.items.len(), 1);
        assert_eq!(applied.warning, None);
    }

    #[test]
    fn test_sale_accepts_out_of_stock_product() {
        let applied = Order::new(OrderKind::Sale)
            .apply(OrderAction::AddItem(out_of_stock(5)))
            .unwrap();
        assert_eq!(applied.order.items.len(), 1);
        assert_eq!(applied.warning, None);
    }

    #[test]
    fn test_service_order_takes_services_regardless_of_stock() {
        let entry = CatalogEntry {
            available: false,
            ..service(4, 8000)
        };
        let applied = Order::new(OrderKind::ServiceOrder)
            .apply(OrderAction::AddItem(entry))
            .unwrap();
        assert_eq!(applied.order.items.len(), 1);
        assert_eq!(applied.warning, None);
    }

    #[test]
    fn test_oversized_price_does_not_flip_total_sign() {
        let order = run(
            Order::new(OrderKind::Sale),
            vec![
                OrderAction::AddItem(product(1, 100)),
                OrderAction::UpdateItem {
                    index: 0,
                    field: ItemField::UnitPrice,
                    raw: "90000000000000000".to_string(),
                },
                OrderAction::UpdateItem {
                    index: 0,
                    field: ItemField::Quantity,
                    raw: "2".to_string(),
                },
            ],
        );
        assert!(order.items[0].unit_price.is_zero());
        assert!(!order.totals().grand_total.is_negative());
    }

    #[test]
    fn test_oversized_catalog_price_clamps_total() {
        let order = run(
            Order::new(OrderKind::Sale),
            vec![
                OrderAction::AddItem(product(1, i64::MAX / 2)),
                OrderAction::UpdateItem {
                    index: 0,
                    field: ItemField::Quantity,
                    raw: "3".to_string(),
                },
                OrderAction::SetFreight("10".to_string()),
            ],
        );
        assert_eq!(order.totals().grand_total.cents(), i64::MAX);
    }

    #[test]
    fn test_out_of_range_leaves_order_unchanged() {
        let order = subtotal_200(OrderKind::Sale);
        let err = order.apply(OrderAction::RemoveItem(5)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::ItemIndexOutOfRange { index: 5, len: 2 }
        ));
        assert_eq!(order.items.len(), 2);
    }

    #[test]
    fn test_action_json_shape() {
        let action: OrderAction = serde_json::from_str(
            r#"{"action": "update_item", "value": {"index": 0, "field": "unit_price", "raw": "12,50"}}"#,
        )
        .unwrap();
        assert_eq!(action.name(), "update_item");

        let action: OrderAction =
            serde_json::from_str(r#"{"action": "remove_item", "value": 2}"#).unwrap();
        assert_eq!(action, OrderAction::RemoveItem(2));
    }
}
