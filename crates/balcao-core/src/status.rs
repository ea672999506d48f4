//! # Order Status Workflows
//!
//! Local mirror of the backend lifecycle of each order kind, so an illegal
//! transition is refused before any network call.
//!
//! ## Workflows
//! ```text
//! Sale
//!   quote ──approve──► approved ──invoice──► invoiced ──deliver──► delivered
//!     └──────────────invoice──────────────────┘
//!
//! Purchase order
//!   pending ──approve──► approved ──ship──► in_transit ──receive──► received
//!                           └──────────receive───────────────┘
//!
//! Service order
//!   open ──diagnose──► in_diagnosis ──quote──► awaiting_quote ──approve──► approved
//!     └──────────────quote─────────────┘                                    │
//!                                                                 start_work│
//!   delivered ◄──deliver── completed ◄──complete── in_progress ◄────────────┘
//!                                                  │        ▲
//!                                        await_parts     start_work
//!                                                  ▼        │
//!                                               awaiting_parts
//!
//! cancel: from any non-terminal status
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::OrderKind;

// =============================================================================
// Actions
// =============================================================================

/// A lifecycle step requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Approve,
    Invoice,
    Deliver,
    Ship,
    Receive,
    Diagnose,
    Quote,
    StartWork,
    AwaitParts,
    Complete,
    Cancel,
}

impl StatusAction {
    /// Whether the order must carry a payment record before this step.
    pub fn requires_payment(&self, kind: OrderKind) -> bool {
        matches!(
            (kind, self),
            (OrderKind::Sale, StatusAction::Invoice)
                | (OrderKind::Sale, StatusAction::Deliver)
                | (OrderKind::ServiceOrder, StatusAction::Deliver)
        )
    }

    /// Step applied right after creation when the operator finalizes.
    pub fn finalize_for(kind: OrderKind) -> Option<StatusAction> {
        match kind {
            OrderKind::Sale => Some(StatusAction::Invoice),
            OrderKind::PurchaseOrder => Some(StatusAction::Approve),
            OrderKind::ServiceOrder => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusAction::Approve => "approve",
            StatusAction::Invoice => "invoice",
            StatusAction::Deliver => "deliver",
            StatusAction::Ship => "ship",
            StatusAction::Receive => "receive",
            StatusAction::Diagnose => "diagnose",
            StatusAction::Quote => "quote",
            StatusAction::StartWork => "start_work",
            StatusAction::AwaitParts => "await_parts",
            StatusAction::Complete => "complete",
            StatusAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for StatusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Statuses
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Budget shown to the customer ("orçamento").
    #[default]
    Quote,
    Approved,
    Invoiced,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    #[default]
    Pending,
    Approved,
    InTransit,
    Received,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOrderStatus {
    #[default]
    Open,
    InDiagnosis,
    AwaitingQuote,
    Approved,
    InProgress,
    AwaitingParts,
    Completed,
    Delivered,
    Cancelled,
}

/// Status of any order, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum OrderStatus {
    Sale(SaleStatus),
    PurchaseOrder(PurchaseOrderStatus),
    ServiceOrder(ServiceOrderStatus),
}

impl OrderStatus {
    /// Status a freshly created order starts in.
    pub fn initial(kind: OrderKind) -> Self {
        match kind {
            OrderKind::Sale => OrderStatus::Sale(SaleStatus::default()),
            OrderKind::PurchaseOrder => OrderStatus::PurchaseOrder(PurchaseOrderStatus::default()),
            OrderKind::ServiceOrder => OrderStatus::ServiceOrder(ServiceOrderStatus::default()),
        }
    }

    pub fn kind(&self) -> OrderKind {
        match self {
            OrderStatus::Sale(_) => OrderKind::Sale,
            OrderStatus::PurchaseOrder(_) => OrderKind::PurchaseOrder,
            OrderStatus::ServiceOrder(_) => OrderKind::ServiceOrder,
        }
    }

    /// No further action is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Sale(SaleStatus::Delivered | SaleStatus::Cancelled)
                | OrderStatus::PurchaseOrder(
                    PurchaseOrderStatus::Received | PurchaseOrderStatus::Cancelled
                )
                | OrderStatus::ServiceOrder(
                    ServiceOrderStatus::Delivered | ServiceOrderStatus::Cancelled
                )
        )
    }

    /// Status reached by applying `action`.
    ///
    /// ## Errors
    /// [`CoreError::IllegalTransition`] when the workflow does not allow it.
    pub fn next(&self, action: StatusAction) -> CoreResult<OrderStatus> {
        use StatusAction as A;

        if action == A::Cancel {
            if self.is_terminal() {
                return Err(self.illegal(action));
            }
            return Ok(match self {
                OrderStatus::Sale(_) => OrderStatus::Sale(SaleStatus::Cancelled),
                OrderStatus::PurchaseOrder(_) => {
                    OrderStatus::PurchaseOrder(PurchaseOrderStatus::Cancelled)
                }
                OrderStatus::ServiceOrder(_) => {
                    OrderStatus::ServiceOrder(ServiceOrderStatus::Cancelled)
                }
            });
        }

        let next = match *self {
            OrderStatus::Sale(s) => {
                use SaleStatus::*;
                match (s, action) {
                    (Quote, A::Approve) => Some(Approved),
                    (Quote | Approved, A::Invoice) => Some(Invoiced),
                    (Invoiced, A::Deliver) => Some(Delivered),
                    _ => None,
                }
                .map(OrderStatus::Sale)
            }
            OrderStatus::PurchaseOrder(s) => {
                use PurchaseOrderStatus::*;
                match (s, action) {
                    (Pending, A::Approve) => Some(Approved),
                    (Approved, A::Ship) => Some(InTransit),
                    (Approved | InTransit, A::Receive) => Some(Received),
                    _ => None,
                }
                .map(OrderStatus::PurchaseOrder)
            }
            OrderStatus::ServiceOrder(s) => {
                use ServiceOrderStatus::*;
                match (s, action) {
                    (Open, A::Diagnose) => Some(InDiagnosis),
                    (Open | InDiagnosis, A::Quote) => Some(AwaitingQuote),
                    (AwaitingQuote, A::Approve) => Some(Approved),
                    (Approved | AwaitingParts, A::StartWork) => Some(InProgress),
                    (InProgress, A::AwaitParts) => Some(AwaitingParts),
                    (InProgress, A::Complete) => Some(Completed),
                    (Completed, A::Deliver) => Some(Delivered),
                    _ => None,
                }
                .map(OrderStatus::ServiceOrder)
            }
        };

        next.ok_or_else(|| self.illegal(action))
    }

    fn illegal(&self, action: StatusAction) -> CoreError {
        CoreError::IllegalTransition {
            kind: self.kind().to_string(),
            status: self.status_name().to_string(),
            action: action.to_string(),
        }
    }

    /// Wire name of the inner status.
    pub fn status_name(&self) -> &'static str {
        match self {
            OrderStatus::Sale(s) => match s {
                SaleStatus::Quote => "quote",
                SaleStatus::Approved => "approved",
                SaleStatus::Invoiced => "invoiced",
                SaleStatus::Delivered => "delivered",
                SaleStatus::Cancelled => "cancelled",
            },
            OrderStatus::PurchaseOrder(s) => match s {
                PurchaseOrderStatus::Pending => "pending",
                PurchaseOrderStatus::Approved => "approved",
                PurchaseOrderStatus::InTransit => "in_transit",
                PurchaseOrderStatus::Received => "received",
                PurchaseOrderStatus::Cancelled => "cancelled",
            },
            OrderStatus::ServiceOrder(s) => match s {
                ServiceOrderStatus::Open => "open",
                ServiceOrderStatus::InDiagnosis => "in_diagnosis",
                ServiceOrderStatus::AwaitingQuote => "awaiting_quote",
                ServiceOrderStatus::Approved => "approved",
                ServiceOrderStatus::InProgress => "in_progress",
                ServiceOrderStatus::AwaitingParts => "awaiting_parts",
                ServiceOrderStatus::Completed => "completed",
                ServiceOrderStatus::Delivered => "delivered",
                ServiceOrderStatus::Cancelled => "cancelled",
            },
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_name())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_happy_path() {
        let s = OrderStatus::initial(OrderKind::Sale);
        let s = s.next(StatusAction::Invoice).unwrap();
        assert_eq!(s, OrderStatus::Sale(SaleStatus::Invoiced));
        let s = s.next(StatusAction::Deliver).unwrap();
        assert!(s.is_terminal());
    }

    #[test]
    fn test_cannot_invoice_delivered_sale() {
        let s = OrderStatus::Sale(SaleStatus::Delivered);
        let err = s.next(StatusAction::Invoice).unwrap_err();
        assert_eq!(err.to_string(), "Cannot invoice a sale in status delivered");
    }

    #[test]
    fn test_cancel_rules() {
        let po = OrderStatus::PurchaseOrder(PurchaseOrderStatus::InTransit);
        assert_eq!(
            po.next(StatusAction::Cancel).unwrap(),
            OrderStatus::PurchaseOrder(PurchaseOrderStatus::Cancelled)
        );
        let cancelled = OrderStatus::ServiceOrder(ServiceOrderStatus::Cancelled);
        assert!(cancelled.next(StatusAction::Cancel).is_err());
    }

    #[test]
    fn test_service_order_parts_loop() {
        let s = OrderStatus::ServiceOrder(ServiceOrderStatus::InProgress);
        let s = s.next(StatusAction::AwaitParts).unwrap();
        let s = s.next(StatusAction::StartWork).unwrap();
        let s = s.next(StatusAction::Complete).unwrap();
        assert_eq!(s.status_name(), "completed");
    }

    #[test]
    fn test_requires_payment() {
        assert!(StatusAction::Invoice.requires_payment(OrderKind::Sale));
        assert!(StatusAction::Deliver.requires_payment(OrderKind::ServiceOrder));
        assert!(!StatusAction::Approve.requires_payment(OrderKind::PurchaseOrder));
        assert!(!StatusAction::Receive.requires_payment(OrderKind::PurchaseOrder));
    }

    #[test]
    fn test_finalize_actions() {
        assert_eq!(StatusAction::finalize_for(OrderKind::Sale), Some(StatusAction::Invoice));
        assert_eq!(
            StatusAction::finalize_for(OrderKind::PurchaseOrder),
            Some(StatusAction::Approve)
        );
        assert_eq!(StatusAction::finalize_for(OrderKind::ServiceOrder), None);
    }

    #[test]
    fn test_status_serializes_with_kind() {
        let json = serde_json::to_value(OrderStatus::PurchaseOrder(PurchaseOrderStatus::InTransit))
            .unwrap();
        assert_eq!(json["kind"], "purchase_order");
        assert_eq!(json["status"], "in_transit");
    }
}
