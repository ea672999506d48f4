//! Request bodies sent to the backend.
//!
//! Money in cents, quantities in thousandths, rates in basis points; field
//! names carry the unit.

use balcao_core::order::Order;
use balcao_core::{
    DiscountMode, FeeBreakdown, LineItem, Money, OrderKind, OrderRef, PaymentSelection,
    ServiceDetails, StatusAction,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of the order-creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderPayload {
    /// Also sent as the `Idempotency-Key` header.
    pub draft_id: Uuid,
    pub kind: OrderKind,
    pub counterparty_id: Option<i64>,
    pub items: Vec<LineItem>,
    #[serde(rename = "freight_cents")]
    pub freight: Money,
    pub discount_mode: DiscountMode,
    pub discount_value: i64,
    #[serde(rename = "discount_cents")]
    pub discount_amount: Money,
    #[serde(rename = "total_cents")]
    pub grand_total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_delivery: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentSelection>,
}

impl CreateOrderPayload {
    pub fn from_order(order: &Order, payment: Option<&PaymentSelection>) -> Self {
        let totals = order.totals();
        Self {
            draft_id: order.draft_id,
            kind: order.kind,
            counterparty_id: order.counterparty_id,
            items: order.items.clone(),
            freight: order.freight,
            discount_mode: order.discount_mode,
            discount_value: order.discount_value,
            discount_amount: totals.discount_amount,
            grand_total: totals.grand_total,
            notes: order.notes.clone(),
            expected_delivery: order.expected_delivery,
            service: order.service.clone(),
            payment: payment.cloned(),
        }
    }
}

/// Body of the payment-record endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecordPayload {
    pub order_id: i64,
    pub order_kind: OrderKind,
    pub method_id: i64,
    pub installments: u32,
    #[serde(rename = "gross_cents")]
    pub gross_amount: Money,
    #[serde(rename = "fee_cents")]
    pub fee_amount: Money,
    #[serde(rename = "net_cents")]
    pub net_amount: Money,
    pub settlement_date: NaiveDate,
}

impl PaymentRecordPayload {
    pub fn new(order: &OrderRef, kind: OrderKind, selection: &PaymentSelection, today: NaiveDate) -> Self {
        let FeeBreakdown {
            fee_amount,
            net_amount,
            settlement_days,
            ..
        } = selection.breakdown;
        Self {
            order_id: order.id,
            order_kind: kind,
            method_id: selection.method_id,
            installments: selection.installments,
            gross_amount: selection.gross_amount,
            fee_amount,
            net_amount,
            settlement_date: balcao_core::fee::settlement_date(today, settlement_days),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulateFeeRequest {
    #[serde(rename = "amount_cents")]
    pub amount: Money,
    pub installments: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionRequest {
    pub action: StatusAction,
}

/// REST collection of each order kind.
pub fn order_collection(kind: OrderKind) -> &'static str {
    match kind {
        OrderKind::Sale => "api/sales/",
        OrderKind::PurchaseOrder => "api/purchase-orders/",
        OrderKind::ServiceOrder => "api/service-orders/",
    }
}
