//! Printable rent receipts.
//!
//! Receipts are rendered as HTML with an embedded QR code that carries the
//! receipt number, payment id and total, so a printed copy can be matched
//! back to the stored payment.

use askama::Template;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::error::{AppError, Result};
use crate::finance::{calculate_taxes, TaxInput};
use crate::format::{brl, date_br, percent};
use crate::models::{Contract, Payment, Property, TenantType};

/// One itemised value on the receipt
#[derive(Debug, Clone)]
pub struct ReceiptLine {
    pub label: String,
    pub amount: String,
}

#[derive(Debug, Clone)]
pub struct IrInfo {
    pub base: String,
    pub rate: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct IvaInfo {
    pub rate: String,
    pub value: String,
}

/// Receipt page template
#[derive(Template)]
#[template(path = "receipt.html")]
pub struct ReceiptTemplate {
    pub number: String,
    pub issued_on: String,
    pub owner: String,
    pub owner_document: String,
    pub tenant: String,
    pub tenant_document: String,
    pub tenant_type_label: &'static str,
    pub tenant_email: Option<String>,
    pub tenant_phone: Option<String>,
    pub address: String,
    pub reference_month: String,
    pub due_date: String,
    pub payment_date: String,
    pub payment_method: Option<String>,
    pub lines: Vec<ReceiptLine>,
    pub total: String,
    pub show_tax_info: bool,
    pub reimbursements: Option<String>,
    pub rent_income: String,
    pub ir: Option<IrInfo>,
    pub iva: Option<IvaInfo>,
    pub net: String,
    pub notes: Option<String>,
    pub is_individual: bool,
    pub qr_data_uri: String,
}

/// Receipt number: first 8 characters of the payment id, upper case
pub fn receipt_number(payment: &Payment) -> String {
    payment.id.simple().to_string()[..8].to_uppercase()
}

/// Assemble the receipt for a paid payment
pub fn build_receipt(
    payment: &Payment,
    contract: &Contract,
    property: &Property,
    issued_on: NaiveDate,
) -> Result<ReceiptTemplate> {
    let payment_date = payment
        .payment_date
        .ok_or_else(|| AppError::bad_request("Recibo disponível apenas para pagamentos realizados"))?;

    let taxes = calculate_taxes(&TaxInput::for_payment(payment, contract));
    let is_individual = contract.tenant_type() == TenantType::Individual;
    let number = receipt_number(payment);

    let qr_payload = format!(
        "RECIBO {}\nPagamento: {}\nValor: R$ {}",
        number,
        payment.id,
        brl(taxes.gross_income)
    );

    Ok(ReceiptTemplate {
        qr_data_uri: qr_data_uri(&qr_payload)?,
        number,
        issued_on: date_br(issued_on),
        owner: property.owner.clone(),
        owner_document: property.owner_document.clone(),
        tenant: contract.tenant.clone(),
        tenant_document: contract.tenant_document.clone(),
        tenant_type_label: contract.tenant_type().label(),
        tenant_email: contract.tenant_email.clone(),
        tenant_phone: contract.tenant_phone.clone(),
        address: property.address.clone(),
        reference_month: payment.reference_month.clone(),
        due_date: date_br(payment.due_date),
        payment_date: date_br(payment_date),
        payment_method: payment.payment_method.as_ref().map(|m| m.to_uppercase()),
        lines: receipt_lines(payment, contract),
        total: brl(taxes.gross_income),
        show_tax_info: is_individual || taxes.iva_ibs_value > Decimal::ZERO,
        reimbursements: (taxes.reimbursements > Decimal::ZERO)
            .then(|| brl(taxes.reimbursements)),
        rent_income: brl(taxes.rent_income),
        ir: (is_individual && taxes.ir_value > Decimal::ZERO).then(|| IrInfo {
            base: brl(taxes.taxable_income),
            rate: percent(taxes.ir_rate),
            value: brl(taxes.ir_value),
        }),
        iva: (taxes.iva_ibs_value > Decimal::ZERO).then(|| IvaInfo {
            rate: percent(taxes.iva_ibs_rate),
            value: brl(taxes.iva_ibs_value),
        }),
        net: brl(taxes.net_income),
        notes: payment.notes.clone().filter(|n| !n.trim().is_empty()),
        is_individual,
    })
}

fn receipt_lines(payment: &Payment, contract: &Contract) -> Vec<ReceiptLine> {
    let mut lines = vec![ReceiptLine {
        label: "Aluguel".to_string(),
        amount: brl(payment.rent_amount.unwrap_or(payment.value)),
    }];

    if payment.iptu_amount > Decimal::ZERO {
        lines.push(ReceiptLine {
            label: if contract.iptu_reimbursable { "IPTU (Reembolso)" } else { "IPTU" }.to_string(),
            amount: brl(payment.iptu_amount),
        });
    }
    if payment.condominium_amount > Decimal::ZERO {
        lines.push(ReceiptLine {
            label: if contract.condominium_reimbursable {
                "Condomínio (Reembolso)"
            } else {
                "Condomínio"
            }
            .to_string(),
            amount: brl(payment.condominium_amount),
        });
    }
    if payment.other_charges > Decimal::ZERO {
        lines.push(ReceiptLine {
            label: "Outras Despesas".to_string(),
            amount: brl(payment.other_charges),
        });
    }

    lines
}

/// PNG QR code as a `data:` URI
pub fn qr_data_uri(payload: &str) -> Result<String> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| AppError::Internal(format!("QR encode failed: {}", e)))?;
    let image = code.render::<Luma<u8>>().min_dimensions(160, 160).build();

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| AppError::Internal(format!("QR render failed: {}", e)))?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}
