//! # Payment/Fee Calculator
//!
//! Stateless fee computation for a payment method, amount and installment
//! count. The backend runs the same algorithm and is authoritative for what
//! gets persisted; this module is the instant preview.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. look up method                       → NotFound                     │
//! │  2. installments == 0                    → InvalidInstallmentCount      │
//! │     installments > 1, no installments    → InvalidInstallmentCount      │
//! │     installments > max_installments      → InvalidInstallmentCount      │
//! │  3. effective rate                                                      │
//! │        1      → fee_rate                                                │
//! │        2      → tiers.two            ─┐                                 │
//! │        3      → tiers.three           │ unset or zero                   │
//! │        4..=6  → tiers.four_to_six     ├──────────────► fee_rate         │
//! │        7..=12 → tiers.seven_to_twelve ─┘                                │
//! │        13..   → fee_rate                                                │
//! │  4. fee = gross × rate + fixed_fee                                      │
//! │  5. net = gross − fee          (not clamped)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Rate};
use crate::types::{FeeBreakdown, PaymentMethod, PaymentSelection};

// =============================================================================
// Method Lookup
// =============================================================================

/// Anything that can resolve a payment method id.
///
/// Implemented for slices and maps so the calculator works equally on a
/// freshly fetched list or on the session's reference cache snapshot.
pub trait PaymentMethodLookup {
    fn find_method(&self, id: i64) -> Option<&PaymentMethod>;
}

impl PaymentMethodLookup for [PaymentMethod] {
    fn find_method(&self, id: i64) -> Option<&PaymentMethod> {
        self.iter().find(|m| m.id == id)
    }
}

impl PaymentMethodLookup for Vec<PaymentMethod> {
    fn find_method(&self, id: i64) -> Option<&PaymentMethod> {
        self.as_slice().find_method(id)
    }
}

impl PaymentMethodLookup for HashMap<i64, PaymentMethod> {
    fn find_method(&self, id: i64) -> Option<&PaymentMethod> {
        self.get(&id)
    }
}

// =============================================================================
// Calculation
// =============================================================================

/// Computes the fee breakdown for `method_id`.
///
/// ## Errors
/// - [`CoreError::NotFound`] if the method is unknown
/// - [`CoreError::InvalidInstallmentCount`] if the method cannot be split
///   into `installments`
pub fn calculate<L>(
    lookup: &L,
    method_id: i64,
    gross: Money,
    installments: u32,
) -> CoreResult<FeeBreakdown>
where
    L: PaymentMethodLookup + ?Sized,
{
    let method = lookup
        .find_method(method_id)
        .ok_or_else(|| CoreError::not_found("Payment method", method_id))?;
    calculate_for(method, gross, installments)
}

/// Same as [`calculate`] with the method already resolved.
pub fn calculate_for(
    method: &PaymentMethod,
    gross: Money,
    installments: u32,
) -> CoreResult<FeeBreakdown> {
    check_installments(method, installments)?;

    let fee_rate = effective_rate(method, installments);
    let fee_amount = gross.percent_of(fee_rate) + method.fixed_fee;
    let net_amount = gross - fee_amount;

    debug!(
        method_id = method.id,
        installments,
        gross = gross.cents(),
        rate_bps = fee_rate.bps(),
        fee = fee_amount.cents(),
        "Fee calculated"
    );

    Ok(FeeBreakdown {
        gross,
        installments,
        base_rate: method.fee_rate,
        fee_rate,
        fixed_fee: method.fixed_fee,
        fee_amount,
        net_amount,
        installment_amount: gross.split(installments),
        settlement_days: method.settlement_days,
    })
}

/// Rejects installment counts the method does not offer.
pub fn check_installments(method: &PaymentMethod, installments: u32) -> CoreResult<()> {
    let max = if method.allows_installments {
        method.max_installments.max(1)
    } else {
        1
    };

    if installments == 0 || installments > max {
        return Err(CoreError::InvalidInstallmentCount {
            method_id: method.id,
            requested: installments,
            max,
        });
    }
    Ok(())
}

/// Rate applied for `installments`, after tier fallback.
pub fn effective_rate(method: &PaymentMethod, installments: u32) -> Rate {
    let tier = match installments {
        2 => method.tiers.two,
        3 => method.tiers.three,
        4..=6 => method.tiers.four_to_six,
        7..=12 => method.tiers.seven_to_twelve,
        _ => None,
    };

    match tier {
        Some(rate) if !rate.is_zero() => rate,
        _ => method.fee_rate,
    }
}

/// Date the funds become available, counting calendar days.
pub fn settlement_date(from: NaiveDate, settlement_days: u32) -> NaiveDate {
    from.checked_add_days(Days::new(settlement_days as u64))
        .unwrap_or(NaiveDate::MAX)
}

/// Builds the payment selection attached to an order.
pub fn select<L>(
    lookup: &L,
    method_id: i64,
    gross: Money,
    installments: u32,
) -> CoreResult<PaymentSelection>
where
    L: PaymentMethodLookup + ?Sized,
{
    let breakdown = calculate(lookup, method_id, gross, installments)?;
    Ok(PaymentSelection {
        method_id,
        installments,
        gross_amount: gross,
        breakdown,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
