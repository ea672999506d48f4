//! Fee preview and server simulation.
//!
//! Both paths check the installment count against the cached method first,
//! so an impossible count never produces a request.

use balcao_core::fee;
use balcao_core::{FeeBreakdown, Money};
use tracing::debug;

use crate::backend::Backend;
use crate::error::ClientResult;
use crate::reference::ReferenceCache;

/// Local calculation against the cached payment methods.
pub async fn preview<B: Backend>(
    cache: &ReferenceCache<B>,
    method_id: i64,
    gross: Money,
    installments: u32,
) -> ClientResult<FeeBreakdown> {
    let methods = cache.payment_methods().await?;
    Ok(fee::calculate(&methods, method_id, gross, installments)?)
}

/// Backend-authoritative calculation.
pub async fn simulate<B: Backend>(
    cache: &ReferenceCache<B>,
    method_id: i64,
    gross: Money,
    installments: u32,
) -> ClientResult<FeeBreakdown> {
    let method = cache.payment_method(method_id).await?;
    fee::check_installments(&method, installments)?;

    debug!(method_id, installments, gross = gross.cents(), "Simulating fee on backend");
    let mut breakdown = cache
        .backend()
        .simulate_fee(method_id, gross, installments)
        .await?;
    breakdown.base_rate = method.fee_rate;
    Ok(breakdown)
}
