//! Tax service functions with database access.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::models::{Contract, NewPayment};

use super::amounts::clamp_amount;
use super::annual::{summarize_year, AnnualSummary};
use super::calculators::{calculate_taxes, TaxBreakdown, TaxInput};

/// Tax breakdown for a stored payment under its contract's settings
pub async fn payment_taxes(pool: &PgPool, payment_id: Uuid) -> Result<TaxBreakdown> {
    let payment = db::get_payment(pool, payment_id)
        .await?
        .ok_or(AppError::NotFound("Pagamento não encontrado"))?;

    let contract = db::get_contract(pool, payment.contract_id)
        .await?
        .ok_or(AppError::NotFound("Contrato não encontrado"))?;

    Ok(calculate_taxes(&TaxInput::for_payment(&payment, &contract)))
}

/// Annual income summary over every stored payment
pub async fn annual_summary(pool: &PgPool, year: i32) -> Result<AnnualSummary> {
    let payments = db::list_payments(pool).await?;
    Ok(summarize_year(&payments, year))
}

/// Fill the persisted IR and IVA/IBS estimates of a payment about to be saved.
///
/// Both estimates are clamped to the money column range.
pub fn apply_tax_estimates(new: &mut NewPayment, contract: &Contract) {
    let breakdown = calculate_taxes(&TaxInput::for_charges(
        new.rent_amount,
        new.value,
        new.iptu_amount,
        new.condominium_amount,
        contract,
    ));

    new.ir_value = clamp_amount(breakdown.ir_value);
    new.iva_ibs_value = clamp_amount(breakdown.iva_ibs_value);
}
