//! Payment route handlers, including receipts and reminders

use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::error::{ApiJson, AppError, EntityId, Result};
use crate::finance::amounts::lenient;
use crate::finance::services::apply_tax_estimates;
use crate::models::{Contract, NewPayment, Payment, PaymentView};
use crate::notify::{build_reminder, Provider, ReminderKind};
use crate::receipts::build_receipt;
use crate::AppState;

use super::{non_blank, parse_reference, FieldErrors};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list).post(create))
        .route("/payments/:id", get(show).put(update).delete(remove))
        .route("/payments/:id/receipt", get(receipt))
        .route("/payments/:id/notify", post(notify))
}

/// Payment body for create and replace.
///
/// A `status` field may be present but is ignored; status is derived from the dates.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default)]
    pub contract_id: Option<String>,
    #[serde(default)]
    pub reference_month: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rent_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub iptu_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub condominium_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub other_charges: Option<Decimal>,
    #[serde(default)]
    pub receipt_type: Option<String>,
}

/// `YYYY-MM` with a real month
fn is_reference_month(value: &str) -> bool {
    match value.split_once('-') {
        Some((year, month)) => {
            year.len() == 4
                && month.len() == 2
                && year.chars().all(|c| c.is_ascii_digit())
                && matches!(month.parse::<u32>(), Ok(1..=12))
        }
        None => false,
    }
}

impl PaymentRequest {
    /// Validate field formats; the contract id is checked against the database separately
    pub fn validate(self) -> Result<(Option<Uuid>, NewPayment)> {
        let mut errors = FieldErrors::default();

        if non_blank(self.contract_id.clone()).is_none() {
            errors.push("contractId", "campo obrigatório");
        }
        let contract_id = parse_reference(self.contract_id.as_deref());

        let reference_month = errors.required("referenceMonth", self.reference_month);
        if !reference_month.is_empty() && !is_reference_month(&reference_month) {
            errors.push("referenceMonth", "use o formato AAAA-MM");
        }

        let due_date = errors.required_date("dueDate", self.due_date);
        let payment_date = errors.optional_date("paymentDate", self.payment_date);
        let value = errors.required_amount("value", self.value);
        let rent_amount = errors.optional_amount("rentAmount", self.rent_amount);
        let iptu_amount = errors.optional_amount("iptuAmount", self.iptu_amount).unwrap_or_default();
        let condominium_amount = errors
            .optional_amount("condominiumAmount", self.condominium_amount)
            .unwrap_or_default();
        let other_charges = errors
            .optional_amount("otherCharges", self.other_charges)
            .unwrap_or_default();

        errors.finish()?;

        Ok((
            contract_id,
            NewPayment {
                contract_id: contract_id.unwrap_or_default(),
                reference_month,
                due_date,
                payment_date,
                value,
                payment_method: non_blank(self.payment_method).map(|m| m.to_lowercase()),
                notes: non_blank(self.notes),
                rent_amount,
                iptu_amount,
                condominium_amount,
                other_charges,
                ir_value: Decimal::ZERO,
                iva_ibs_value: Decimal::ZERO,
                receipt_type: non_blank(self.receipt_type).unwrap_or_else(|| "rent".to_string()),
            },
        ))
    }
}

/// Validate, resolve the contract and fill in the tax estimates
async fn validated(state: &AppState, req: PaymentRequest) -> Result<(NewPayment, Contract)> {
    let (contract_id, mut new) = req.validate()?;

    let contract = match contract_id {
        Some(id) => db::get_contract(&state.db, id).await?,
        None => None,
    }
    .ok_or_else(|| AppError::bad_request("Contrato não encontrado"))?;

    apply_tax_estimates(&mut new, &contract);
    Ok((new, contract))
}

/// Attach contract and property to a payment
async fn view(state: &AppState, payment: Payment, contract: Option<Contract>) -> Result<PaymentView> {
    let contract = match contract {
        Some(c) => Some(c),
        None => db::get_contract(&state.db, payment.contract_id).await?,
    };
    let property = match &contract {
        Some(c) => db::get_property(&state.db, c.property_id).await?,
        None => None,
    };
    Ok(PaymentView::new(payment, contract, property, crate::today()))
}

/// GET /api/payments
async fn list(State(state): State<AppState>) -> Result<Json<Vec<PaymentView>>> {
    let payments = db::list_payments(&state.db).await?;
    let contracts: HashMap<Uuid, Contract> = db::list_contracts(&state.db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let properties: HashMap<Uuid, _> = db::list_properties(&state.db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let today = crate::today();
    let views = payments
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

    Ok(Json(views))
}

/// GET /api/payments/:id
async fn show(State(state): State<AppState>, EntityId(id): EntityId) -> Result<Json<PaymentView>> {
    let payment = db::get_payment(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Pagamento não encontrado"))?;

    Ok(Json(view(&state, payment, None).await?))
}

/// POST /api/payments
async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PaymentRequest>,
) -> Result<(StatusCode, Json<PaymentView>)> {
    let (new, contract) = validated(&state, req).await?;
    let payment = db::insert_payment(&state.db, &new).await?;

    state.cache.invalidate_dashboard();
    tracing::info!(
        "Created payment {} ({}) for contract {}",
        payment.id,
        payment.reference_month,
        payment.contract_id
    );
    Ok((StatusCode::CREATED, Json(view(&state, payment, Some(contract)).await?)))
}

/// PUT /api/payments/:id
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    ApiJson(req): ApiJson<PaymentRequest>,
) -> Result<Json<PaymentView>> {
    if db::get_payment(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound("Pagamento não encontrado"));
    }

    let (new, contract) = validated(&state, req).await?;
    let payment = db::update_payment(&state.db, id, &new)
        .await?
        .ok_or(AppError::NotFound("Pagamento não encontrado"))?;

    state.cache.invalidate_dashboard();
    Ok(Json(view(&state, payment, Some(contract)).await?))
}

/// DELETE /api/payments/:id
async fn remove(State(state): State<AppState>, EntityId(id): EntityId) -> Result<StatusCode> {
    if !db::delete_payment(&state.db, id).await? {
        return Err(AppError::NotFound("Pagamento não encontrado"));
    }

    state.cache.invalidate_dashboard();
    tracing::info!("Deleted payment {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/payments/:id/receipt
async fn receipt(State(state): State<AppState>, EntityId(id): EntityId) -> Result<Html<String>> {
    let payment = db::get_payment(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Pagamento não encontrado"))?;
    let contract = db::get_contract(&state.db, payment.contract_id)
        .await?
        .ok_or(AppError::NotFound("Contrato não encontrado"))?;
    let property = db::get_property(&state.db, contract.property_id)
        .await?
        .ok_or(AppError::NotFound("Imóvel não encontrado"))?;

    let template = build_receipt(&payment, &contract, &property, crate::today())?;
    Ok(Html(template.render()?))
}

/// Result of a reminder request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    pub success: bool,
    pub message: &'static str,
    pub provider: Provider,
    pub email_id: Option<String>,
    pub reminder: ReminderKind,
}

/// POST /api/payments/:id/notify
async fn notify(State(state): State<AppState>, EntityId(id): EntityId) -> Result<Json<NotifyResponse>> {
    let payment = db::get_payment(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Pagamento não encontrado"))?;
    let contract = db::get_contract(&state.db, payment.contract_id)
        .await?
        .ok_or(AppError::NotFound("Contrato não encontrado"))?;
    let property = db::get_property(&state.db, contract.property_id).await?;

    let email = build_reminder(&payment, &contract, property.as_ref(), crate::today())?;
    let delivery = state.notifier.send(&email).await?;

    Ok(Json(NotifyResponse {
        success: true,
        message: delivery.message(),
        provider: delivery.provider,
        email_id: delivery.email_id,
        reminder: email.kind,
    }))
}
