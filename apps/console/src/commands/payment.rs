//! # Payment Commands
//!
//! Payment method listing, fee simulation and installment plans.

use balcao_api::{fees, Backend, ReferenceCache};
use balcao_core::coerce::parse_money;
use balcao_core::installments::{schedule, Installment};
use balcao_core::{FeeBreakdown, PaymentMethod};
use chrono::NaiveDate;
use tracing::debug;

use crate::error::ConsoleError;

/// Active methods from the cache, or every method straight from the backend.
pub async fn list_methods<B: Backend>(
    cache: &ReferenceCache<B>,
    include_inactive: bool,
) -> Result<Vec<PaymentMethod>, ConsoleError> {
    debug!(include_inactive, "list_methods command");

    if include_inactive {
        return Ok(cache.backend().payment_methods(false).await?);
    }
    Ok(cache.payment_methods().await?.as_slice().to_vec())
}

/// One method as the backend has it now, bypassing the cache.
pub async fn show_method<B: Backend>(
    cache: &ReferenceCache<B>,
    id: i64,
) -> Result<PaymentMethod, ConsoleError> {
    debug!(id, "show_method command");
    Ok(cache.backend().payment_method(id).await?)
}

/// Fee breakdown for `amount` ("150,00") paid with `method_id`.
///
/// `remote` asks the backend instead of calculating locally; the count is
/// checked locally either way.
pub async fn simulate<B: Backend>(
    cache: &ReferenceCache<B>,
    method_id: i64,
    amount: &str,
    installments: u32,
    remote: bool,
) -> Result<FeeBreakdown, ConsoleError> {
    debug!(method_id, amount, installments, remote, "simulate command");

    let gross = parse_money("amount", amount)?;
    let breakdown = if remote {
        fees::simulate(cache, method_id, gross, installments).await?
    } else {
        fees::preview(cache, method_id, gross, installments).await?
    };
    Ok(breakdown)
}

/// Monthly due dates and amounts.
pub fn installment_plan(
    amount: &str,
    count: u32,
    first_due: NaiveDate,
) -> Result<Vec<Installment>, ConsoleError> {
    let gross = parse_money("amount", amount)?;
    Ok(schedule(gross, count, first_due)?)
}
