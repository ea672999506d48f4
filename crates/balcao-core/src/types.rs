//! # Domain Types
//!
//! Core domain types shared by the order builder, the fee calculator and the
//! backend client.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogEntry   │   │    LineItem     │   │  PaymentMethod  │       │
//! │  │  ─────────────  │──►│  ─────────────  │   │  ─────────────  │       │
//! │  │  reference_id   │   │  reference_id   │   │  id (i64)       │       │
//! │  │  kind           │   │  quantity       │   │  fee_rate       │       │
//! │  │  price          │   │  unit_price     │   │  fixed_fee      │       │
//! │  │  available      │   │  discount       │   │  tiers          │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                       │                 │
//! │                                                       ▼                 │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  PaymentRecord  │◄──│PaymentSelection │──►│  FeeBreakdown   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! Fixed-point fields serialize as bare integers under a suffixed name
//! (`price_cents`, `quantity_milli`, `fee_rate_bps`) so a JSON reader never
//! mistakes cents for reais.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::{Money, Quantity, Rate};

// =============================================================================
// Catalog
// =============================================================================

/// Whether a catalog entity is a physical product or a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Product,
    Service,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Product => write!(f, "product"),
            ItemKind::Service => write!(f, "service"),
        }
    }
}

/// A product or service returned by a catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogEntry {
    pub reference_id: i64,
    pub kind: ItemKind,
    pub name: String,
    /// Internal code or barcode, when the catalog has one.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(rename = "price_cents")]
    pub price: Money,
    /// Stock flag computed by the catalog. Services are always available;
    /// see [`OrderKind::checks_stock`] for who acts on it.
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Line Item
// =============================================================================

/// One line of an order.
///
/// ## Line Total
/// ```text
/// line_total = unit_price × quantity − discount
/// ```
/// Not clamped: a discount larger than the line is carried as a negative
/// total and flows into the order subtotal unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub reference_id: i64,
    pub kind: ItemKind,
    /// Display only.
    pub description: String,
    #[serde(rename = "quantity_milli")]
    pub quantity: Quantity,
    #[serde(rename = "unit_price_cents")]
    pub unit_price: Money,
    /// Absolute amount subtracted from this line.
    #[serde(rename = "discount_cents")]
    pub discount: Money,
}

impl LineItem {
    /// Seeds a line from a catalog entry: one unit at catalog price, no discount.
    pub fn from_catalog(entry: &CatalogEntry) -> Self {
        Self {
            reference_id: entry.reference_id,
            kind: entry.kind,
            description: entry.name.clone(),
            quantity: Quantity::one(),
            unit_price: entry.price,
            discount: Money::zero(),
        }
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.times_quantity(self.quantity) - self.discount
    }
}

// =============================================================================
// Order Header
// =============================================================================

/// Interpretation of the order-level discount value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountMode {
    /// Value is an absolute amount in cents.
    #[default]
    Amount,
    /// Value is a percentage of the items subtotal, in basis points.
    Percentage,
}

/// The three order flows that share the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Sale,
    PurchaseOrder,
    /// "OS": a repair or service job.
    ServiceOrder,
}

impl OrderKind {
    /// Who is on the other side of the order.
    pub fn counterparty_label(&self) -> &'static str {
        match self {
            OrderKind::Sale | OrderKind::ServiceOrder => "customer",
            OrderKind::PurchaseOrder => "supplier",
        }
    }

    /// Purchase orders refuse the same product on two lines.
    pub fn rejects_duplicate_products(&self) -> bool {
        matches!(self, OrderKind::PurchaseOrder)
    }

    /// Only service orders refuse products the catalog has no stock for.
    pub fn checks_stock(&self) -> bool {
        matches!(self, OrderKind::ServiceOrder)
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Sale => write!(f, "sale"),
            OrderKind::PurchaseOrder => write!(f, "purchase order"),
            OrderKind::ServiceOrder => write!(f, "service order"),
        }
    }
}

/// Equipment and complaint recorded on a service order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ServiceDetails {
    pub equipment: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    pub reported_defect: String,
}

/// Identity of an order after the backend created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderRef {
    pub id: i64,
    /// Backend-generated human-readable number (e.g. "PV-000123").
    pub number: String,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the money moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Cash,
    CreditCard,
    DebitCard,
    Pix,
    BankSlip,
    BankTransfer,
    Cheque,
    Other,
}

/// Installment-dependent overrides of the base fee rate.
///
/// `None` and zero both mean "use the base rate".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeTiers {
    #[serde(default, rename = "two_bps")]
    pub two: Option<Rate>,
    #[serde(default, rename = "three_bps")]
    pub three: Option<Rate>,
    #[serde(default, rename = "four_to_six_bps")]
    pub four_to_six: Option<Rate>,
    #[serde(default, rename = "seven_to_twelve_bps")]
    pub seven_to_twelve: Option<Rate>,
}

/// A configured way of receiving (or paying) money.
///
/// Read-only from the builder's point of view; administrators edit it
/// elsewhere and the reference cache is invalidated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    pub kind: PaymentKind,
    /// Acquirer or card brand ("Cielo", "Stone").
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(rename = "fee_rate_bps")]
    pub fee_rate: Rate,
    #[serde(rename = "fixed_fee_cents")]
    pub fixed_fee: Money,
    pub allows_installments: bool,
    pub max_installments: u32,
    #[serde(default)]
    pub tiers: FeeTiers,
    pub settlement_days: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

// =============================================================================
// Payment Selection
// =============================================================================

/// Result of running the fee calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeBreakdown {
    #[serde(rename = "gross_cents")]
    pub gross: Money,
    pub installments: u32,
    /// The method's rate before tier selection.
    #[serde(rename = "base_rate_bps", default)]
    pub base_rate: Rate,
    /// Effective rate after tier selection.
    #[serde(rename = "fee_rate_bps")]
    pub fee_rate: Rate,
    #[serde(rename = "fixed_fee_cents")]
    pub fixed_fee: Money,
    #[serde(rename = "fee_cents")]
    pub fee_amount: Money,
    /// `gross − fee`, may be negative under a degenerate fee configuration.
    #[serde(rename = "net_cents")]
    pub net_amount: Money,
    #[serde(rename = "installment_cents")]
    pub installment_amount: Money,
    pub settlement_days: u32,
}

/// The payment chosen for the order being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentSelection {
    pub method_id: i64,
    pub installments: u32,
    /// Normally the order's grand total.
    #[serde(rename = "gross_cents")]
    pub gross_amount: Money,
    pub breakdown: FeeBreakdown,
}

/// A payment selection persisted against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentRecord {
    pub id: i64,
    pub order_id: i64,
    pub method_id: i64,
    pub installments: u32,
    #[serde(rename = "gross_cents")]
    pub gross_amount: Money,
    #[serde(rename = "fee_cents")]
    pub fee_amount: Money,
    #[serde(rename = "net_cents")]
    pub net_amount: Money,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub settlement_date: Option<NaiveDate>,
}

// =============================================================================
// Shared Reference Data
// =============================================================================

/// A step of the service-order intake checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChecklistItem {
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Warranty text printed on a service order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WarrantyTerm {
    pub id: i64,
    pub title: String,
    pub days: u32,
    pub text: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CatalogEntry {
        CatalogEntry {
            reference_id: 7,
            kind: ItemKind::Product,
            name: "Cabo HDMI".to_string(),
            code: Some("789100".to_string()),
            price: Money::from_cents(2590),
            available: true,
        }
    }

    #[test]
    fn test_line_from_catalog() {
        let line = LineItem::from_catalog(&entry());
        assert_eq!(line.quantity, Quantity::one());
        assert_eq!(line.unit_price.cents(), 2590);
        assert!(line.discount.is_zero());
        assert_eq!(line.line_total().cents(), 2590);
    }

    #[test]
    fn test_line_total_is_not_clamped() {
        let mut line = LineItem::from_catalog(&entry());
        line.discount = Money::from_cents(3000);
        assert_eq!(line.line_total().cents(), -410);
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(LineItem::from_catalog(&entry())).unwrap();
        assert_eq!(json["unit_price_cents"], 2590);
        assert_eq!(json["quantity_milli"], 1000);
        assert_eq!(json["kind"], "product");
    }

    #[test]
    fn test_payment_method_defaults() {
        let method: PaymentMethod = serde_json::from_str(
            r#"{
                "id": 3, "name": "Dinheiro", "kind": "cash",
                "fee_rate_bps": 0, "fixed_fee_cents": 0,
                "allows_installments": false, "max_installments": 1,
                "settlement_days": 0
            }"#,
        )
        .unwrap();
        assert!(method.active);
        assert_eq!(method.tiers, FeeTiers::default());
        assert!(method.operator.is_none());
    }

    #[test]
    fn test_order_kind_rules() {
        assert!(OrderKind::PurchaseOrder.rejects_duplicate_products());
        assert!(!OrderKind::Sale.rejects_duplicate_products());
        assert_eq!(OrderKind::PurchaseOrder.counterparty_label(), "supplier");
        assert_eq!(OrderKind::ServiceOrder.to_string(), "service order");
    }
}
