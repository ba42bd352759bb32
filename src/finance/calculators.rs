//! Core tax calculation functions.
//!
//! Pure functions for rental income tax estimates - no database access.
//! All arithmetic is exact decimal; only the resulting tax values are rounded.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{Contract, Payment, TenantType};

use super::amounts::{clamp_amount, MAX_RATE};

/// Share of rent income kept as taxable base after the presumed-expense deduction.
pub const TAXABLE_BASE_FACTOR: Decimal = dec!(0.80);

/// One row of the progressive income-tax table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrBracket {
    /// Inclusive upper bound; `None` for the open-ended top bracket
    pub limit: Option<Decimal>,
    /// Rate in percent
    pub rate: Decimal,
    pub deduction: Decimal,
}

/// Monthly IRPF table (Carnê-Leão).
pub static IR_TABLE: [IrBracket; 5] = [
    IrBracket { limit: Some(dec!(2259.20)), rate: dec!(0), deduction: dec!(0) },
    IrBracket { limit: Some(dec!(2826.65)), rate: dec!(7.5), deduction: dec!(169.44) },
    IrBracket { limit: Some(dec!(3751.05)), rate: dec!(15), deduction: dec!(381.44) },
    IrBracket { limit: Some(dec!(4664.68)), rate: dec!(22.5), deduction: dec!(662.77) },
    IrBracket { limit: None, rate: dec!(27.5), deduction: dec!(896.00) },
];

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use gestao_alugueis::finance::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// First bracket whose upper bound is >= `income`.
pub fn find_bracket(income: Decimal) -> &'static IrBracket {
    IR_TABLE
        .iter()
        .find(|b| b.limit.map_or(true, |limit| income <= limit))
        .unwrap_or(&IR_TABLE[IR_TABLE.len() - 1])
}

/// `income × rate − deduction` for the matching bracket, floored at zero.
///
/// Saturates instead of overflowing for incomes near `Decimal::MAX`.
pub fn bracket_tax(income: Decimal, bracket: &IrBracket) -> Decimal {
    let tax = (income.saturating_mul(bracket.rate) / dec!(100)).saturating_sub(bracket.deduction);
    tax.max(Decimal::ZERO)
}

/// Inputs for a monthly tax estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxInput {
    pub rent: Decimal,
    pub iptu: Decimal,
    pub condominium: Decimal,
    pub iptu_reimbursable: bool,
    pub condominium_reimbursable: bool,
    pub tenant_type: TenantType,
    pub iva_ibs_subject: bool,
    /// Consumption-tax rate in percent
    pub iva_ibs_rate: Decimal,
}

impl Default for TaxInput {
    fn default() -> Self {
        Self {
            rent: Decimal::ZERO,
            iptu: Decimal::ZERO,
            condominium: Decimal::ZERO,
            iptu_reimbursable: false,
            condominium_reimbursable: false,
            tenant_type: TenantType::Individual,
            iva_ibs_subject: true,
            iva_ibs_rate: Decimal::ZERO,
        }
    }
}

impl TaxInput {
    /// Build the input for a stored payment under its contract.
    pub fn for_payment(payment: &Payment, contract: &Contract) -> Self {
        Self::for_charges(
            payment.rent_amount,
            payment.value,
            payment.iptu_amount,
            payment.condominium_amount,
            contract,
        )
    }

    /// Charge amounts combined with the contract's tax settings.
    ///
    /// Rent falls back to the payment's total value when no breakdown was recorded.
    pub fn for_charges(
        rent_amount: Option<Decimal>,
        value: Decimal,
        iptu: Decimal,
        condominium: Decimal,
        contract: &Contract,
    ) -> Self {
        Self {
            rent: rent_amount.unwrap_or(value),
            iptu,
            condominium,
            iptu_reimbursable: contract.iptu_reimbursable,
            condominium_reimbursable: contract.condominium_reimbursable,
            tenant_type: contract.tenant_type(),
            iva_ibs_subject: contract.iva_ibs_subject,
            iva_ibs_rate: contract.iva_ibs_rate,
        }
    }
}

/// Full decomposition of a monthly charge.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxBreakdown {
    pub gross_income: Decimal,
    pub rent_income: Decimal,
    pub reimbursements: Decimal,
    pub taxable_income: Decimal,
    pub ir_rate: Decimal,
    pub ir_deduction: Decimal,
    pub ir_value: Decimal,
    pub iva_ibs_rate: Decimal,
    pub iva_ibs_value: Decimal,
    pub net_income: Decimal,
}

/// Decompose a monthly charge into reimbursements, taxable base, IR, IVA/IBS and net income.
///
/// Amounts are clamped to `±MAX_AMOUNT` and the rate to `±MAX_RATE` first,
/// which keeps every intermediate value far from the `Decimal` range.
pub fn calculate_taxes(input: &TaxInput) -> TaxBreakdown {
    let rent = clamp_amount(input.rent);
    let iptu = clamp_amount(input.iptu);
    let condominium = clamp_amount(input.condominium);
    let iva_ibs_rate = input.iva_ibs_rate.clamp(-MAX_RATE, MAX_RATE);

    let gross_income = rent + iptu + condominium;

    let mut reimbursements = Decimal::ZERO;
    if input.iptu_reimbursable {
        reimbursements += iptu;
    }
    if input.condominium_reimbursable {
        reimbursements += condominium;
    }

    let rent_income = gross_income - reimbursements;
    let taxable_income = rent_income * TAXABLE_BASE_FACTOR;

    let (ir_rate, ir_deduction, ir_value) = match input.tenant_type {
        TenantType::Individual => {
            let bracket = find_bracket(taxable_income);
            (
                bracket.rate,
                bracket.deduction,
                round_money(bracket_tax(taxable_income, bracket), 2),
            )
        }
        TenantType::Entity => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
    };

    let iva_ibs_value = if input.iva_ibs_subject && iva_ibs_rate > Decimal::ZERO {
        round_money(rent_income * iva_ibs_rate / dec!(100), 2).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    TaxBreakdown {
        gross_income,
        rent_income,
        reimbursements,
        taxable_income,
        ir_rate,
        ir_deduction,
        ir_value,
        iva_ibs_rate,
        iva_ibs_value,
        net_income: rent_income - ir_value - iva_ibs_value,
    }
}

/// IRPF estimate over a full monthly income (no presumed-expense base).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrpfEstimate {
    pub tax: Decimal,
    /// `tax / income × 100`, zero when income is not positive
    pub effective_rate: Decimal,
    /// Nominal rate of the matching bracket, in percent
    pub bracket_rate: Decimal,
}

pub fn monthly_irpf(income: Decimal) -> IrpfEstimate {
    let bracket = find_bracket(income);
    let tax = round_money(bracket_tax(income, bracket), 2);
    let effective_rate = if income > Decimal::ZERO {
        round_money(tax / income * dec!(100), 2)
    } else {
        Decimal::ZERO
    };

    IrpfEstimate {
        tax,
        effective_rate,
        bracket_rate: bracket.rate,
    }
}
