//! # Order Session
//!
//! One in-progress order plus its payment selection, and the only way to
//! submit it.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Editing ──submit()──► Submitting ──create_order ok──► Submitted       │
//! │      ▲                      │                               │           │
//! │      └─create_order failed──┘                          reset()          │
//! │        or future dropped                                    │           │
//! │                                                             │           │
//! │      ◄──────────────── fresh empty order ◄──────────────────┘           │
//! │                                                                         │
//! │   Editing     apply / select_payment allowed                            │
//! │   Submitting  everything rejected with SubmissionInFlight               │
//! │   Submitted   everything rejected with AlreadySubmitted                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submission Steps
//! 1. validate locally (no request on failure, phase unchanged)
//! 2. `create_order` with the draft id as idempotency key
//! 3. Finalize only: `create_payment_record`, then the kind's status step
//!
//! Once step 2 succeeds the order exists on the backend, so a failure in
//! step 3 still ends in `Submitted` and is reported as a partial error.
//! Nothing is retried automatically.
//!
//! ## Locking
//! State lives behind a `std::sync::Mutex` that is never held across an
//! `.await`; the phase flag is the in-flight guard. The flag is owned by an
//! `InFlight` value for the length of the request, so a submit future
//! dropped before `create_order` answers leaves the session in `Editing`.

use balcao_core::order::{Order, OrderAction, OrderTotals, Warning};
use balcao_core::validation::{validate_for_submit, Destination};
use balcao_core::{fee, OrderKind, OrderRef, OrderStatus, PaymentRecord, PaymentSelection};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::backend::Backend;
use crate::error::{ClientError, ClientResult};
use crate::reference::ReferenceCache;
use crate::wire::{CreateOrderPayload, PaymentRecordPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
    Submitted,
}

#[derive(Debug)]
struct SessionState {
    order: Order,
    payment: Option<PaymentSelection>,
    phase: Phase,
}

/// What a successful submit produced.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub order: OrderRef,
    pub status: OrderStatus,
    pub payment: Option<PaymentRecord>,
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    // apply() is pure, so a poisoned state is still consistent
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds the session in `Submitting` until the order is created.
///
/// Dropped without [`InFlight::created`] (error or cancelled future), it
/// puts the phase back to `Editing`.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
    created: bool,
}

impl<'a> InFlight<'a> {
    /// Takes over a phase the caller has just set to `Submitting`.
    fn new(state: &'a Mutex<SessionState>) -> Self {
        Self {
            state,
            created: false,
        }
    }

    fn created(mut self) {
        lock_state(self.state).phase = Phase::Submitted;
        self.created = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.created {
            lock_state(self.state).phase = Phase::Editing;
        }
    }
}

pub struct OrderSession<B: Backend> {
    reference: Arc<ReferenceCache<B>>,
    state: Mutex<SessionState>,
}

impl<B: Backend> OrderSession<B> {
    pub fn new(reference: Arc<ReferenceCache<B>>, kind: OrderKind) -> Self {
        Self::with_order(reference, Order::new(kind))
    }

    /// Resumes editing an existing draft.
    pub fn with_order(reference: Arc<ReferenceCache<B>>, order: Order) -> Self {
        debug!(draft_id = %order.draft_id, kind = %order.kind, "Order session opened");
        Self {
            reference,
            state: Mutex::new(SessionState {
                order,
                payment: None,
                phase: Phase::Editing,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }

    fn ensure_editing(state: &SessionState) -> ClientResult<()> {
        match state.phase {
            Phase::Editing => Ok(()),
            Phase::Submitting => Err(ClientError::SubmissionInFlight),
            Phase::Submitted => Err(ClientError::AlreadySubmitted),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn order(&self) -> Order {
        self.lock().order.clone()
    }

    pub fn totals(&self) -> OrderTotals {
        self.lock().order.totals()
    }

    pub fn payment(&self) -> Option<PaymentSelection> {
        self.lock().payment.clone()
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Runs one reducer step on the order.
    pub fn apply(&self, action: OrderAction) -> ClientResult<Option<Warning>> {
        let mut state = self.lock();
        Self::ensure_editing(&state)?;

        let applied = state.order.apply(action)?;
        state.order = applied.order;
        Ok(applied.warning)
    }

    /// Attaches a payment for the current grand total.
    pub async fn select_payment(
        &self,
        method_id: i64,
        installments: u32,
    ) -> ClientResult<PaymentSelection> {
        let gross = {
            let state = self.lock();
            Self::ensure_editing(&state)?;
            state.order.totals().grand_total
        };

        let methods = self.reference.payment_methods().await?;
        let selection = fee::select(&methods, method_id, gross, installments)?;

        let mut state = self.lock();
        Self::ensure_editing(&state)?;
        info!(method_id, installments, net = selection.breakdown.net_amount.cents(), "Payment selected");
        state.payment = Some(selection.clone());
        Ok(selection)
    }

    pub fn clear_payment(&self) -> ClientResult<()> {
        let mut state = self.lock();
        Self::ensure_editing(&state)?;
        state.payment = None;
        Ok(())
    }

    /// Starts a fresh order of the same kind after a submission.
    pub fn reset(&self) -> ClientResult<()> {
        let mut state = self.lock();
        if state.phase == Phase::Submitting {
            return Err(ClientError::SubmissionInFlight);
        }
        let kind = state.order.kind;
        *state = SessionState {
            order: Order::new(kind),
            payment: None,
            phase: Phase::Editing,
        };
        Ok(())
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Sends the order to the backend.
    ///
    /// `today` dates the payment settlement.
    ///
    /// ## Errors
    /// - `Core(Validation)` before any request, order still editable
    /// - `SubmissionInFlight` / `AlreadySubmitted` for a second submit
    /// - backend errors from `create_order`, order still editable
    /// - `PaymentNotRecorded` / `StatusNotApplied` after the order exists
    pub async fn submit(
        &self,
        destination: Destination,
        today: NaiveDate,
    ) -> ClientResult<SubmitOutcome> {
        let (order, payment) = {
            let mut state = self.lock();
            Self::ensure_editing(&state)?;
            validate_for_submit(&state.order, destination, state.payment.as_ref())?;
            state.phase = Phase::Submitting;
            (state.order.clone(), state.payment.clone())
        };
        let in_flight = InFlight::new(&self.state);

        info!(draft_id = %order.draft_id, kind = %order.kind, ?destination, "Submitting order");

        let payment = self.refresh_payment(&order, payment).await?;

        let payload = CreateOrderPayload::from_order(&order, payment.as_ref());
        let created = match self.reference.backend().create_order(&payload).await {
            Ok(created) => created,
            Err(e) => {
                warn!(error = %e, "Order creation failed, keeping draft");
                return Err(e);
            }
        };

        // From here on the order exists: never go back to Editing
        in_flight.created();
        let mut outcome = SubmitOutcome {
            order: created.clone(),
            status: OrderStatus::initial(order.kind),
            payment: None,
        };

        if destination == Destination::Save {
            return Ok(outcome);
        }

        if let Some(selection) = payment.as_ref() {
            let body = PaymentRecordPayload::new(&created, order.kind, selection, today);
            match self.reference.backend().create_payment_record(&body).await {
                Ok(record) => outcome.payment = Some(record),
                Err(e) => {
                    error!(number = %created.number, error = %e, "Payment record failed");
                    return Err(ClientError::PaymentNotRecorded {
                        number: created.number,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Some(action) = destination.follow_up(order.kind) {
            let next = outcome.status.next(action)?;
            if let Err(e) = self
                .reference
                .backend()
                .transition_order_status(order.kind, created.id, action)
                .await
            {
                error!(number = %created.number, %action, error = %e, "Status step failed");
                return Err(ClientError::StatusNotApplied {
                    number: created.number,
                    action,
                    reason: e.to_string(),
                });
            }
            outcome.status = next;
        }

        info!(number = %outcome.order.number, status = %outcome.status, "Order submitted");
        Ok(outcome)
    }

    /// Recomputes the selection when the total moved after it was chosen.
    async fn refresh_payment(
        &self,
        order: &Order,
        payment: Option<PaymentSelection>,
    ) -> ClientResult<Option<PaymentSelection>> {
        let Some(selection) = payment else {
            return Ok(None);
        };
        let gross = order.totals().grand_total;
        if selection.gross_amount == gross {
            return Ok(Some(selection));
        }

        debug!(
            old = selection.gross_amount.cents(),
            new = gross.cents(),
            "Order total changed, recomputing payment"
        );
        let methods = self.reference.payment_methods().await?;
        let fresh = fee::select(&methods, selection.method_id, gross, selection.installments)?;
        Ok(Some(fresh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use balcao_core::order::ItemField;
    use balcao_core::{CatalogEntry, CoreError, ItemKind, Money, StatusAction, ValidationError};
    use std::future::Future;
    use std::task::Poll;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn entry() -> CatalogEntry {
        CatalogEntry {
            reference_id: 11,
            kind: ItemKind::Product,
            name: "Monitor".to_string(),
            code: None,
            price: Money::from_cents(10000),
            available: true,
        }
    }

    fn session(kind: OrderKind) -> (Arc<FakeBackend>, OrderSession<FakeBackend>) {
        let backend = Arc::new(FakeBackend::new());
        let cache = Arc::new(ReferenceCache::new(Arc::clone(&backend)));
        let session = OrderSession::new(cache, kind);
        session.apply(OrderAction::SetCounterparty(Some(7))).unwrap();
        session.apply(OrderAction::AddItem(entry())).unwrap();
        (backend, session)
    }

    #[tokio::test]
    async fn test_save_creates_order_once() {
        let (backend, session) = session(OrderKind::Sale);
        let outcome = session.submit(Destination::Save, today()).await.unwrap();

        assert_eq!(outcome.status.status_name(), "quote");
        assert!(outcome.payment.is_none());
        assert_eq!(backend.calls("create_order"), 1);
        assert_eq!(session.phase(), Phase::Submitted);

        let again = session.submit(Destination::Save, today()).await;
        assert!(matches!(again, Err(ClientError::AlreadySubmitted)));
        assert_eq!(backend.calls("create_order"), 1);
    }

    #[tokio::test]
    async fn test_concurrent_submits_create_one_order() {
        let (backend, session) = session(OrderKind::Sale);

        let (a, b) = tokio::join!(
            session.submit(Destination::Save, today()),
            session.submit(Destination::Save, today())
        );

        assert_eq!(backend.calls("create_order"), 1);
        assert!(a.is_ok() != b.is_ok());
        let rejected = if a.is_err() { a } else { b };
        assert!(matches!(rejected, Err(ClientError::SubmissionInFlight)));
    }

    #[tokio::test]
    async fn test_dropped_submit_returns_to_editing() {
        let (backend, session) = session(OrderKind::Sale);
        {
            let mut submit = std::pin::pin!(session.submit(Destination::Save, today()));
            std::future::poll_fn(|cx| {
                assert!(submit.as_mut().poll(cx).is_pending());
                Poll::Ready(())
            })
            .await;
            assert_eq!(session.phase(), Phase::Submitting);
        }

        // The caller gave up before create_order answered
        assert_eq!(session.phase(), Phase::Editing);
        session
            .apply(OrderAction::SetNotes(Some("retry".to_string())))
            .unwrap();
        session.reset().unwrap();
        session.apply(OrderAction::SetCounterparty(Some(7))).unwrap();
        session.apply(OrderAction::AddItem(entry())).unwrap();

        session.submit(Destination::Save, today()).await.unwrap();
        assert_eq!(session.phase(), Phase::Submitted);
        assert_eq!(backend.calls("create_order"), 2);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_draft() {
        let (backend, session) = session(OrderKind::Sale);
        session.select_payment(1, 1).await.unwrap();
        session
            .apply(OrderAction::UpdateItem {
                index: 0,
                field: ItemField::Quantity,
                raw: "3".to_string(),
            })
            .unwrap();
        session
            .reference
            .invalidate(crate::reference::ReferenceKind::PaymentMethods)
            .await;
        backend.fail_next("payment_methods");

        assert!(session.submit(Destination::Save, today()).await.is_err());
        assert_eq!(session.phase(), Phase::Editing);
        assert_eq!(backend.calls("create_order"), 0);
    }

    #[tokio::test]
    async fn test_edits_rejected_after_submit() {
        let (_backend, session) = session(OrderKind::Sale);
        session.submit(Destination::Save, today()).await.unwrap();

        let err = session.apply(OrderAction::AddItem(entry())).unwrap_err();
        assert!(matches!(err, ClientError::AlreadySubmitted));

        session.reset().unwrap();
        assert!(session.order().is_empty());
        assert_eq!(session.phase(), Phase::Editing);
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_request() {
        let backend = Arc::new(FakeBackend::new());
        let cache = Arc::new(ReferenceCache::new(Arc::clone(&backend)));
        let session = OrderSession::new(cache, OrderKind::Sale);

        let err = session.submit(Destination::Save, today()).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert_eq!(backend.calls("create_order"), 0);
        assert_eq!(session.phase(), Phase::Editing);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_draft() {
        let (backend, session) = session(OrderKind::Sale);
        backend.fail_next("create_order");
        let draft = session.order();

        assert!(session.submit(Destination::Save, today()).await.is_err());
        assert_eq!(session.phase(), Phase::Editing);
        assert_eq!(session.order(), draft);

        // Operator resubmits by hand with the same draft id
        session.submit(Destination::Save, today()).await.unwrap();
        assert_eq!(backend.calls("create_order"), 2);
        assert_eq!(backend.created_orders()[1].draft_id, draft.draft_id);
    }

    #[tokio::test]
    async fn test_finalize_sale_records_payment_then_invoices() {
        let (backend, session) = session(OrderKind::Sale);
        session.select_payment(1, 1).await.unwrap();

        let outcome = session.submit(Destination::Finalize, today()).await.unwrap();
        assert_eq!(outcome.status.status_name(), "invoiced");
        let record = outcome.payment.unwrap();
        assert_eq!(record.fee_amount.cents(), 350);
        assert_eq!(record.net_amount.cents(), 9650);
        assert_eq!(
            backend.recorded_payments()[0].settlement_date,
            NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()
        );
        assert_eq!(
            backend.transitions(),
            vec![(OrderKind::Sale, outcome.order.id, StatusAction::Invoice)]
        );
    }

    #[tokio::test]
    async fn test_finalize_sale_without_payment_is_rejected_locally() {
        let (backend, session) = session(OrderKind::Sale);
        let err = session
            .submit(Destination::Finalize, today())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "payment method is required");
        assert_eq!(backend.calls("create_order"), 0);
    }

    #[tokio::test]
    async fn test_payment_failure_after_creation_is_partial() {
        let (backend, session) = session(OrderKind::Sale);
        session.select_payment(1, 1).await.unwrap();
        backend.fail_next("create_payment_record");

        let err = session
            .submit(Destination::Finalize, today())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::PaymentNotRecorded { .. }));
        assert_eq!(session.phase(), Phase::Submitted);
        assert!(backend.transitions().is_empty());
    }

    #[tokio::test]
    async fn test_payment_follows_total_changes() {
        let (backend, session) = session(OrderKind::Sale);
        session.select_payment(1, 1).await.unwrap();
        session
            .apply(OrderAction::UpdateItem {
                index: 0,
                field: ItemField::Quantity,
                raw: "2".to_string(),
            })
            .unwrap();

        session.submit(Destination::Save, today()).await.unwrap();
        let sent = backend.created_orders().pop().unwrap();
        let payment = sent.payment.unwrap();
        assert_eq!(payment.gross_amount.cents(), 20000);
        assert_eq!(payment.breakdown.fee_amount.cents(), 650);
    }

    #[tokio::test]
    async fn test_purchase_order_finalize_approves_without_payment() {
        let (backend, session) = session(OrderKind::PurchaseOrder);
        session
            .apply(OrderAction::SetExpectedDelivery(NaiveDate::from_ymd_opt(2024, 6, 1)))
            .unwrap();

        let outcome = session.submit(Destination::Finalize, today()).await.unwrap();
        assert_eq!(outcome.status.status_name(), "approved");
        assert_eq!(backend.calls("create_payment_record"), 0);
    }

    #[tokio::test]
    async fn test_invalid_installments_rejected_on_select() {
        let (backend, session) = session(OrderKind::Sale);
        let err = session.select_payment(2, 3).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(CoreError::InvalidInstallmentCount { .. })
        ));
        assert!(session.payment().is_none());
        assert_eq!(backend.calls("simulate_fee"), 0);
    }
}
