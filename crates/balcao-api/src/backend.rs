//! The backend as seen by the order builder.
//!
//! Paths and verbs are an [`HttpBackend`](crate::http::HttpBackend) detail;
//! callers and tests only depend on this trait.

use async_trait::async_trait;
use balcao_core::{
    CatalogEntry, ChecklistItem, FeeBreakdown, Money, OrderKind, OrderRef, PaymentMethod,
    PaymentRecord, StatusAction, WarrantyTerm,
};

use crate::error::ClientResult;
use crate::wire::{CreateOrderPayload, PaymentRecordPayload};

#[async_trait]
pub trait Backend: Send + Sync {
    /// Free-text search over products and services.
    async fn lookup_catalog(&self, query: &str) -> ClientResult<Vec<CatalogEntry>>;

    async fn payment_methods(&self, active_only: bool) -> ClientResult<Vec<PaymentMethod>>;

    async fn payment_method(&self, id: i64) -> ClientResult<PaymentMethod>;

    /// Server-authoritative fee calculation.
    async fn simulate_fee(
        &self,
        method_id: i64,
        amount: Money,
        installments: u32,
    ) -> ClientResult<FeeBreakdown>;

    /// Persists an order atomically.
    async fn create_order(&self, payload: &CreateOrderPayload) -> ClientResult<OrderRef>;

    async fn create_payment_record(
        &self,
        payload: &PaymentRecordPayload,
    ) -> ClientResult<PaymentRecord>;

    async fn transition_order_status(
        &self,
        kind: OrderKind,
        order_id: i64,
        action: StatusAction,
    ) -> ClientResult<()>;

    async fn checklist_items(&self) -> ClientResult<Vec<ChecklistItem>>;

    async fn warranty_terms(&self) -> ClientResult<Vec<WarrantyTerm>>;
}
