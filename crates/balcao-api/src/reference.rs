//! # Reference Data Cache
//!
//! Read-through cache for the shared configuration every order screen needs.
//!
//! ## Slots
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ReferenceCache                                   │
//! │                                                                         │
//! │   PaymentMethods   RwLock<Option<Arc<Vec<PaymentMethod>>>>              │
//! │   ChecklistItems   RwLock<Option<Arc<Vec<ChecklistItem>>>>              │
//! │   WarrantyTerms    RwLock<Option<Arc<Vec<WarrantyTerm>>>>               │
//! │                                                                         │
//! │   get:  read lock ── hit ──► Arc clone                                  │
//! │              └── miss ──► write lock ── still empty? ──► fetch, store   │
//! │                                                                         │
//! │   invalidate(kind): clears one slot after an admin edit                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The fetch runs under the write lock, so concurrent first reads share one
//! request. Failed fetches leave the slot empty.

use balcao_core::fee::PaymentMethodLookup;
use balcao_core::{ChecklistItem, CoreError, PaymentMethod, WarrantyTerm};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::backend::Backend;
use crate::error::ClientResult;

/// Cached entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    PaymentMethods,
    ChecklistItems,
    WarrantyTerms,
}

type Slot<T> = RwLock<Option<Arc<Vec<T>>>>;

/// Active payment methods, shareable across tasks.
#[derive(Debug, Clone)]
pub struct MethodTable(Arc<Vec<PaymentMethod>>);

impl MethodTable {
    pub fn as_slice(&self) -> &[PaymentMethod] {
        &self.0
    }
}

impl PaymentMethodLookup for MethodTable {
    fn find_method(&self, id: i64) -> Option<&PaymentMethod> {
        self.0.as_slice().find_method(id)
    }
}

pub struct ReferenceCache<B: Backend> {
    backend: Arc<B>,
    payment_methods: Slot<PaymentMethod>,
    checklist_items: Slot<ChecklistItem>,
    warranty_terms: Slot<WarrantyTerm>,
}

impl<B: Backend> ReferenceCache<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            payment_methods: RwLock::new(None),
            checklist_items: RwLock::new(None),
            warranty_terms: RwLock::new(None),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Active payment methods.
    pub async fn payment_methods(&self) -> ClientResult<MethodTable> {
        let backend = &self.backend;
        load(&self.payment_methods, ReferenceKind::PaymentMethods, || {
            backend.payment_methods(true)
        })
        .await
        .map(MethodTable)
    }

    /// One active payment method.
    pub async fn payment_method(&self, id: i64) -> ClientResult<PaymentMethod> {
        let table = self.payment_methods().await?;
        table
            .find_method(id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("Payment method", id).into())
    }

    pub async fn checklist_items(&self) -> ClientResult<Arc<Vec<ChecklistItem>>> {
        let backend = &self.backend;
        load(&self.checklist_items, ReferenceKind::ChecklistItems, || {
            backend.checklist_items()
        })
        .await
    }

    pub async fn warranty_terms(&self) -> ClientResult<Arc<Vec<WarrantyTerm>>> {
        let backend = &self.backend;
        load(&self.warranty_terms, ReferenceKind::WarrantyTerms, || {
            backend.warranty_terms()
        })
        .await
    }

    /// Drops one slot; the next read fetches again.
    pub async fn invalidate(&self, kind: ReferenceKind) {
        info!(?kind, "Invalidating reference data");
        match kind {
            ReferenceKind::PaymentMethods => *self.payment_methods.write().await = None,
            ReferenceKind::ChecklistItems => *self.checklist_items.write().await = None,
            ReferenceKind::WarrantyTerms => *self.warranty_terms.write().await = None,
        }
    }

    pub async fn invalidate_all(&self) {
        self.invalidate(ReferenceKind::PaymentMethods).await;
        self.invalidate(ReferenceKind::ChecklistItems).await;
        self.invalidate(ReferenceKind::WarrantyTerms).await;
    }
}

async fn load<T, F, Fut>(slot: &Slot<T>, kind: ReferenceKind, fetch: F) -> ClientResult<Arc<Vec<T>>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ClientResult<Vec<T>>>,
{
    if let Some(cached) = slot.read().await.as_ref() {
        return Ok(Arc::clone(cached));
    }

    let mut guard = slot.write().await;
    // Another task may have filled it while we waited
    if let Some(cached) = guard.as_ref() {
        return Ok(Arc::clone(cached));
    }

    debug!(?kind, "Reference cache miss, fetching");
    let fresh = Arc::new(fetch().await?);
    info!(?kind, count = fresh.len(), "Reference data loaded");
    *guard = Some(Arc::clone(&fresh));
    Ok(fresh)
}
