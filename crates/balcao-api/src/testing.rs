//! In-memory [`Backend`] for unit tests.
//!
//! Other crates reach it through the `testing` feature.

use async_trait::async_trait;
use balcao_core::fee;
use balcao_core::{
    CatalogEntry, ChecklistItem, FeeBreakdown, FeeTiers, ItemKind, Money, OrderKind, OrderRef,
    PaymentKind, PaymentMethod, PaymentRecord, Rate, StatusAction, WarrantyTerm,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::backend::Backend;
use crate::error::{ClientError, ClientResult};
use crate::wire::{CreateOrderPayload, PaymentRecordPayload};

/// Counts calls per method and fails on demand.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    orders: Mutex<Vec<CreateOrderPayload>>,
    payments: Mutex<Vec<PaymentRecordPayload>>,
    transitions: Mutex<Vec<(OrderKind, i64, StatusAction)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self, name: &str) -> usize {
        lock(&self.calls).get(name).copied().unwrap_or(0)
    }

    /// The next call to `name` fails with an internal error.
    pub fn fail_next(&self, name: &'static str) {
        lock(&self.failing).insert(name);
    }

    pub fn created_orders(&self) -> Vec<CreateOrderPayload> {
        lock(&self.orders).clone()
    }

    pub fn recorded_payments(&self) -> Vec<PaymentRecordPayload> {
        lock(&self.payments).clone()
    }

    pub fn transitions(&self) -> Vec<(OrderKind, i64, StatusAction)> {
        lock(&self.transitions).clone()
    }

    fn hit(&self, name: &'static str) -> ClientResult<()> {
        *lock(&self.calls).entry(name).or_insert(0) += 1;
        if lock(&self.failing).remove(name) {
            return Err(ClientError::Internal(format!("{} failed", name)));
        }
        Ok(())
    }
}

pub fn methods() -> Vec<PaymentMethod> {
    vec![
        PaymentMethod {
            id: 1,
            name: "Cartão de Crédito".to_string(),
            kind: PaymentKind::CreditCard,
            operator: Some("Stone".to_string()),
            fee_rate: Rate::percent(3),
            fixed_fee: Money::from_cents(50),
            allows_installments: true,
            max_installments: 12,
            tiers: FeeTiers {
                two: None,
                three: Some(Rate::zero()),
                four_to_six: Some(Rate::percent(5)),
                seven_to_twelve: Some(Rate::from_bps(749)),
            },
            settlement_days: 30,
            active: true,
        },
        PaymentMethod {
            id: 2,
            name: "PIX".to_string(),
            kind: PaymentKind::Pix,
            operator: None,
            fee_rate: Rate::zero(),
            fixed_fee: Money::zero(),
            allows_installments: false,
            max_installments: 1,
            tiers: FeeTiers::default(),
            settlement_days: 0,
            active: true,
        },
        PaymentMethod {
            id: 3,
            name: "Cheque".to_string(),
            kind: PaymentKind::Cheque,
            operator: None,
            fee_rate: Rate::zero(),
            fixed_fee: Money::zero(),
            allows_installments: false,
            max_installments: 1,
            tiers: FeeTiers::default(),
            settlement_days: 2,
            active: false,
        },
    ]
}

#[async_trait]
impl Backend for FakeBackend {
    async fn lookup_catalog(&self, query: &str) -> ClientResult<Vec<CatalogEntry>> {
        self.hit("lookup_catalog")?;
        let catalog = vec![
            CatalogEntry {
                reference_id: 11,
                kind: ItemKind::Product,
                name: "Monitor".to_string(),
                code: Some("MON-24".to_string()),
                price: Money::from_cents(10000),
                available: true,
            },
            CatalogEntry {
                reference_id: 21,
                kind: ItemKind::Service,
                name: "Formatação".to_string(),
                code: None,
                price: Money::from_cents(15000),
                available: true,
            },
        ];
        let query = query.to_lowercase();
        Ok(catalog
            .into_iter()
            .filter(|e| e.name.to_lowercase().contains(&query))
            .collect())
    }

    async fn payment_methods(&self, active_only: bool) -> ClientResult<Vec<PaymentMethod>> {
        self.hit("payment_methods")?;
        Ok(methods()
            .into_iter()
            .filter(|m| m.active || !active_only)
            .collect())
    }

    async fn payment_method(&self, id: i64) -> ClientResult<PaymentMethod> {
        self.hit("payment_method")?;
        methods()
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("payment method {}", id)))
    }

    async fn simulate_fee(
        &self,
        method_id: i64,
        amount: Money,
        installments: u32,
    ) -> ClientResult<FeeBreakdown> {
        self.hit("simulate_fee")?;
        Ok(fee::calculate(&methods(), method_id, amount, installments)?)
    }

    async fn create_order(&self, payload: &CreateOrderPayload) -> ClientResult<OrderRef> {
        lock(&self.orders).push(payload.clone());
        self.hit("create_order")?;
        // Suspend so a concurrent submit can observe the in-flight phase
        tokio::task::yield_now().await;

        let id = self.calls("create_order") as i64;
        Ok(OrderRef {
            id,
            number: format!("PV-{:04}", id),
        })
    }

    async fn create_payment_record(
        &self,
        payload: &PaymentRecordPayload,
    ) -> ClientResult<PaymentRecord> {
        self.hit("create_payment_record")?;
        let mut payments = lock(&self.payments);
        payments.push(payload.clone());
        Ok(PaymentRecord {
            id: payments.len() as i64,
            order_id: payload.order_id,
            method_id: payload.method_id,
            installments: payload.installments,
            gross_amount: payload.gross_amount,
            fee_amount: payload.fee_amount,
            net_amount: payload.net_amount,
            settlement_date: Some(payload.settlement_date),
        })
    }

    async fn transition_order_status(
        &self,
        kind: OrderKind,
        order_id: i64,
        action: StatusAction,
    ) -> ClientResult<()> {
        self.hit("transition_order_status")?;
        lock(&self.transitions).push((kind, order_id, action));
        Ok(())
    }

    async fn checklist_items(&self) -> ClientResult<Vec<ChecklistItem>> {
        self.hit("checklist_items")?;
        tokio::task::yield_now().await;
        Ok(vec![ChecklistItem {
            id: 1,
            description: "Liga normalmente".to_string(),
            category: Some("inspection".to_string()),
            active: true,
        }])
    }

    async fn warranty_terms(&self) -> ClientResult<Vec<WarrantyTerm>> {
        self.hit("warranty_terms")?;
        Ok(vec![WarrantyTerm {
            id: 1,
            title: "Garantia de serviço".to_string(),
            days: 90,
            text: "Cobre defeitos do serviço executado.".to_string(),
        }])
    }
}
