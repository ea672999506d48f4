//! # balcao-core: Pure Business Logic for Balcão
//!
//! Order math and payment fees for the Balcão ERP console, as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Balcão Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Operator console (apps/console)                 │   │
//! │  │     order draft ──► totals ──► payment preview ──► submit       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           balcao-api (REST client, cache, session)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ balcao-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐       │   │
//! │  │   │  order   │  │   fee    │  │  status  │  │  ledger  │       │   │
//! │  │   │ reducer  │  │  tiers   │  │ workflow │  │ balances │       │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────┘       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money, Quantity and Rate fixed-point types
//! - [`types`] - Domain types (LineItem, PaymentMethod, ...)
//! - [`coerce`] - Operator text → numbers
//! - [`order`] - Order builder reducer and totals
//! - [`fee`] - Payment/fee calculator
//! - [`installments`] - Monthly installment schedules
//! - [`validation`] - Submission checks
//! - [`status`] - Order lifecycle workflows
//! - [`ledger`] - Receivable/payable balances
//! - [`receiving`] - Goods receipt checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use balcao_core::order::{Order, OrderAction};
//! use balcao_core::types::{CatalogEntry, DiscountMode, ItemKind, OrderKind};
//! use balcao_core::Money;
//!
//! let entry = CatalogEntry {
//!     reference_id: 1,
//!     kind: ItemKind::Product,
//!     name: "Mouse".to_string(),
//!     code: None,
//!     price: Money::from_cents(20000),
//!     available: true,
//! };
//!
//! let order = Order::new(OrderKind::Sale);
//! let order = order.apply(OrderAction::AddItem(entry)).unwrap().order;
//! let order = order.apply(OrderAction::SetDiscountMode(DiscountMode::Percentage)).unwrap().order;
//! let order = order.apply(OrderAction::SetDiscountValue("10".into())).unwrap().order;
//! let order = order.apply(OrderAction::SetFreight("15".into())).unwrap().order;
//!
//! assert_eq!(order.totals().grand_total.cents(), 19500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coerce;
pub mod error;
pub mod fee;
pub mod installments;
pub mod ledger;
pub mod money;
pub mod order;
pub mod receiving;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Quantity, Rate};
pub use order::{Applied, Order, OrderAction, OrderTotals, Warning};
pub use status::{OrderStatus, StatusAction};
pub use types::*;
pub use validation::Destination;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines accepted on a single order.
pub const MAX_ORDER_ITEMS: usize = 500;
