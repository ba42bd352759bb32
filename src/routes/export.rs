//! Data export: payments CSV and full JSON backup

use std::collections::HashMap;
use std::io::Write;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::models::{Contract, Payment, PaymentView, Property};
use crate::AppState;

pub const BACKUP_VERSION: &str = "1.0";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export/payments", get(payments_csv))
        .route("/export/backup", get(backup))
}

fn write_headers<W: Write>(wtr: &mut csv::Writer<W>) -> csv::Result<()> {
    wtr.write_record([
        "Referência",
        "Inquilino",
        "Imóvel",
        "Vencimento",
        "Pagamento",
        "Valor",
        "Status",
        "Forma de Pagamento",
        "IR",
        "IVA/IBS",
        "Observações",
    ])
}

fn write_record<W: Write>(wtr: &mut csv::Writer<W>, view: &PaymentView) -> csv::Result<()> {
    let payment = &view.payment;
    wtr.write_record([
        payment.reference_month.clone(),
        view.contract.as_ref().map(|c| c.tenant.clone()).unwrap_or_default(),
        view.property.as_ref().map(|p| p.address.clone()).unwrap_or_default(),
        payment.due_date.to_string(),
        payment.payment_date.map(|d| d.to_string()).unwrap_or_default(),
        payment.value.to_string(),
        view.status.label().to_string(),
        payment.payment_method.clone().unwrap_or_default(),
        payment.ir_value.to_string(),
        payment.iva_ibs_value.to_string(),
        payment.notes.clone().unwrap_or_default(),
    ])
}

/// Render payment views as CSV
pub fn render_payments_csv(views: &[PaymentView]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    write_headers(&mut wtr).map_err(|e| AppError::Internal(format!("csv header: {}", e)))?;
    for view in views {
        write_record(&mut wtr, view).map_err(|e| AppError::Internal(format!("csv record: {}", e)))?;
    }
    wtr.into_inner()
        .map_err(|e| AppError::Internal(format!("csv flush: {}", e)))
}

/// GET /api/export/payments
async fn payments_csv(State(state): State<AppState>) -> Result<Response> {
    let payments = db::list_payments(&state.db).await?;
    let contracts: HashMap<Uuid, Contract> = db::list_contracts(&state.db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let properties: HashMap<Uuid, Property> = db::list_properties(&state.db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let today = crate::today();
    let views: Vec<PaymentView> = payments
        .into_iter()
        .map(|payment| {
            let contract = contracts.get(&payment.contract_id).cloned();
            let property = contract
                .as_ref()
                .and_then(|c| properties.get(&c.property_id))
                .cloned();
            PaymentView::new(payment, contract, property, today)
        })
        .collect();

    let body = render_payments_csv(&views)?;
    tracing::info!("Exported {} payments as CSV", views.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"pagamentos-{}.csv\"", today),
            ),
        ],
        body,
    )
        .into_response())
}

#[derive(Debug, Serialize)]
pub struct BackupData {
    pub properties: Vec<Property>,
    pub contracts: Vec<Contract>,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub export_date: String,
    pub version: &'static str,
    pub data: BackupData,
}

/// GET /api/export/backup
async fn backup(State(state): State<AppState>) -> Result<Json<Backup>> {
    let data = BackupData {
        properties: db::list_properties(&state.db).await?,
        contracts: db::list_contracts(&state.db).await?,
        payments: db::list_payments(&state.db).await?,
    };

    tracing::info!(
        "Backup exported: {} properties, {} contracts, {} payments",
        data.properties.len(),
        data.contracts.len(),
        data.payments.len()
    );

    Ok(Json(Backup {
        export_date: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        version: BACKUP_VERSION,
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payment::fixtures;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_csv_rows_with_joined_names() {
        let property = fixtures::property();
        let contract = fixtures::contract(property.id, "active");
        let mut paid = fixtures::payment("2025-03", "2025-03-05", Some("2025-03-04"), dec!(2500.00));
        paid.payment_method = Some("pix".to_string());
        paid.notes = Some("pago, sem multa".to_string());
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        let views = vec![
            PaymentView::new(paid, Some(contract), Some(property), today),
            PaymentView::new(
                fixtures::payment("2025-04", "2025-04-05", None, dec!(2500)),
                None,
                None,
                today,
            ),
        ];

        let csv = String::from_utf8(render_payments_csv(&views).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Referência,Inquilino,Imóvel"));
        assert!(lines[1].contains("Roberto Almeida"));
        assert!(lines[1].contains("2025-03-04"));
        assert!(lines[1].contains("Pago"));
        assert!(lines[1].contains("\"pago, sem multa\""));
        assert!(lines[2].starts_with("2025-04,,,2025-04-05,,2500,Pendente"));
    }
}
