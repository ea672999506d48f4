//! # Order Commands
//!
//! Orders are read from a draft file: the order kind, the operator's actions
//! in the order they were made, and an optional payment.
//!
//! ```json
//! {
//!   "kind": "sale",
//!   "actions": [
//!     { "action": "set_counterparty", "value": 42 },
//!     { "action": "add_item", "value": { "reference_id": 7, "kind": "product",
//!       "name": "Cabo HDMI", "price_cents": 2990 } },
//!     { "action": "update_item", "value": { "index": 0, "field": "quantity", "raw": "2" } },
//!     { "action": "set_freight", "value": "15,00" }
//!   ],
//!   "payment": { "method_id": 1, "installments": 3 }
//! }
//! ```
//!
//! Actions go through the same reducer the order screen uses, so raw text
//! is coerced exactly as it would be there.

use balcao_api::{Backend, OrderSession, ReferenceCache, SubmitOutcome};
use balcao_core::{Destination, Order, OrderAction, OrderKind, OrderTotals, Warning};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::ConsoleError;

#[derive(Debug, Clone, Deserialize)]
pub struct DraftFile {
    pub kind: OrderKind,
    #[serde(default)]
    pub actions: Vec<OrderAction>,
    #[serde(default)]
    pub payment: Option<DraftPayment>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DraftPayment {
    pub method_id: i64,
    #[serde(default = "single_installment")]
    pub installments: u32,
}

fn single_installment() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsResponse {
    pub order: Order,
    pub totals: OrderTotals,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub outcome: SubmitOutcome,
    pub warnings: Vec<String>,
}

impl DraftFile {
    pub fn read(path: &Path) -> Result<Self, ConsoleError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Replays the actions on a fresh order without touching the backend.
    pub fn replay(&self) -> Result<(Order, Vec<Warning>), ConsoleError> {
        let mut order = Order::new(self.kind);
        let mut warnings = Vec::new();

        for action in &self.actions {
            let applied = order.apply(action.clone())?;
            order = applied.order;
            warnings.extend(applied.warning);
        }
        Ok((order, warnings))
    }
}

fn report(warnings: &[Warning]) -> Vec<String> {
    warnings
        .iter()
        .map(|w| {
            warn!(warning = %w, "Action refused");
            w.to_string()
        })
        .collect()
}

/// Totals of a draft, computed locally.
pub fn totals(draft: &DraftFile) -> Result<TotalsResponse, ConsoleError> {
    debug!(kind = %draft.kind, actions = draft.actions.len(), "order totals command");

    let (order, warnings) = draft.replay()?;
    let totals = order.totals();
    Ok(TotalsResponse {
        order,
        totals,
        warnings: report(&warnings),
    })
}

/// Replays a draft into a session and submits it.
pub async fn submit<B: Backend>(
    cache: Arc<ReferenceCache<B>>,
    draft: &DraftFile,
    destination: Destination,
) -> Result<SubmitResponse, ConsoleError> {
    debug!(kind = %draft.kind, ?destination, "order submit command");

    let session = OrderSession::new(cache, draft.kind);
    let mut warnings = Vec::new();
    for action in &draft.actions {
        warnings.extend(session.apply(action.clone())?);
    }

    if let Some(payment) = draft.payment {
        session
            .select_payment(payment.method_id, payment.installments)
            .await?;
    }

    let today = chrono::Local::now().date_naive();
    let outcome = session.submit(destination, today).await?;
    info!(number = %outcome.order.number, status = %outcome.status, "Order saved");

    Ok(SubmitResponse {
        outcome,
        warnings: report(&warnings),
    })
}
