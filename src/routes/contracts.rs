//! Contract route handlers

use std::collections::HashMap;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::db;
use crate::error::{ApiJson, AppError, EntityId, Result};
use crate::finance::amounts::{lenient, lenient_bool};
use crate::models::{Contract, ContractStatus, ContractWithProperty, NewContract, TenantType};
use crate::AppState;

use super::{conflict_on_fk, non_blank, parse_reference, FieldErrors};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contracts", get(list).post(create))
        .route("/contracts/:id", get(show).put(update).delete(remove))
}

/// Contract body for create and replace
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRequest {
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(default)]
    pub tenant_document: Option<String>,
    #[serde(default)]
    pub tenant_email: Option<String>,
    #[serde(default)]
    pub tenant_phone: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rent_value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub due_day: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub admin_fee_percent: Option<Decimal>,
    #[serde(default)]
    pub adjustment_index: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub adjustment_percent: Option<Decimal>,
    #[serde(default)]
    pub next_adjustment_date: Option<String>,
    #[serde(default)]
    pub document_url: Option<String>,
    #[serde(default)]
    pub tenant_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rent_base_value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub iptu_value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub condominium_value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub iptu_reimbursable: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub condominium_reimbursable: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub iva_ibs_subject: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub iva_ibs_rate: Option<Decimal>,
}

impl ContractRequest {
    /// Validate field formats; the property id is checked against the database separately
    pub fn validate(self) -> Result<(Option<Uuid>, NewContract)> {
        let mut errors = FieldErrors::default();

        if non_blank(self.property_id.clone()).is_none() {
            errors.push("propertyId", "campo obrigatório");
        }
        let property_id = parse_reference(self.property_id.as_deref());

        let tenant = errors.required("tenant", self.tenant);
        let tenant_document = errors.required("tenantDocument", self.tenant_document);
        let tenant_email = non_blank(self.tenant_email);
        if tenant_email.as_deref().is_some_and(|e| !e.contains('@')) {
            errors.push("tenantEmail", "email inválido");
        }

        let start_date = errors.required_date("startDate", self.start_date);
        let end_date = errors.required_date("endDate", self.end_date);
        if end_date < start_date {
            errors.push("endDate", "deve ser igual ou posterior à data de início");
        }

        let rent_value = errors.required_amount("rentValue", self.rent_value);
        let due_day = match self.due_day {
            Some(day) if day.fract().is_zero() && (1..=31).contains(&day.to_i32().unwrap_or(0)) => {
                day.to_i32().unwrap_or(1)
            }
            _ => {
                errors.push("dueDay", "deve ser um dia entre 1 e 31");
                1
            }
        };

        let status = match non_blank(self.status) {
            None => ContractStatus::Active,
            Some(s) => ContractStatus::from_str(&s).unwrap_or_else(|| {
                errors.push("status", "use active, expired ou cancelled");
                ContractStatus::Active
            }),
        };

        let admin_fee_percent = errors.optional_rate("adminFeePercent", self.admin_fee_percent);
        let adjustment_percent = errors.optional_rate("adjustmentPercent", self.adjustment_percent);
        let next_adjustment_date = errors.optional_date("nextAdjustmentDate", self.next_adjustment_date);
        let rent_base_value = errors.optional_amount("rentBaseValue", self.rent_base_value);
        let iptu_value = errors.optional_amount("iptuValue", self.iptu_value).unwrap_or_default();
        let condominium_value = errors
            .optional_amount("condominiumValue", self.condominium_value)
            .unwrap_or_default();
        let iva_ibs_rate = errors.optional_rate("ivaIbsRate", self.iva_ibs_rate).unwrap_or_default();

        errors.finish()?;

        Ok((
            property_id,
            NewContract {
                property_id: property_id.unwrap_or_default(),
                tenant,
                tenant_document,
                tenant_email,
                tenant_phone: non_blank(self.tenant_phone),
                start_date,
                end_date,
                rent_value,
                due_day,
                status,
                admin_fee_percent,
                adjustment_index: non_blank(self.adjustment_index),
                adjustment_percent,
                next_adjustment_date,
                document_url: non_blank(self.document_url),
                tenant_type: self
                    .tenant_type
                    .as_deref()
                    .map(TenantType::from_str)
                    .unwrap_or_default(),
                rent_base_value,
                iptu_value,
                condominium_value,
                iptu_reimbursable: self.iptu_reimbursable.unwrap_or(false),
                condominium_reimbursable: self.condominium_reimbursable.unwrap_or(false),
                iva_ibs_subject: self.iva_ibs_subject.unwrap_or(true),
                iva_ibs_rate,
            },
        ))
    }
}

/// Validate the body and check that the referenced property exists
async fn validated(state: &AppState, req: ContractRequest) -> Result<NewContract> {
    let (property_id, new) = req.validate()?;

    let exists = match property_id {
        Some(id) => db::get_property(&state.db, id).await?.is_some(),
        None => false,
    };
    if !exists {
        return Err(AppError::bad_request("Imóvel não encontrado"));
    }

    Ok(new)
}

async fn with_property(state: &AppState, contract: Contract) -> Result<ContractWithProperty> {
    let property = db::get_property(&state.db, contract.property_id).await?;
    Ok(ContractWithProperty { contract, property })
}

/// GET /api/contracts
async fn list(State(state): State<AppState>) -> Result<Json<Vec<ContractWithProperty>>> {
    let contracts = db::list_contracts(&state.db).await?;
    let properties: HashMap<Uuid, _> = db::list_properties(&state.db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let items = contracts
        .into_iter()
        .map(|contract| {
            let property = properties.get(&contract.property_id).cloned();
            ContractWithProperty { contract, property }
        })
        .collect();

    Ok(Json(items))
}

/// GET /api/contracts/:id
async fn show(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<ContractWithProperty>> {
    let contract = db::get_contract(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Contrato não encontrado"))?;

    Ok(Json(with_property(&state, contract).await?))
}

/// POST /api/contracts
async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ContractRequest>,
) -> Result<(StatusCode, Json<ContractWithProperty>)> {
    let new = validated(&state, req).await?;
    let contract = db::insert_contract(&state.db, &new).await?;

    state.cache.invalidate_dashboard();
    tracing::info!("Created contract {} for property {}", contract.id, contract.property_id);
    Ok((StatusCode::CREATED, Json(with_property(&state, contract).await?)))
}

/// PUT /api/contracts/:id
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    ApiJson(req): ApiJson<ContractRequest>,
) -> Result<Json<ContractWithProperty>> {
    if db::get_contract(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound("Contrato não encontrado"));
    }

    let new = validated(&state, req).await?;
    let contract = db::update_contract(&state.db, id, &new)
        .await?
        .ok_or(AppError::NotFound("Contrato não encontrado"))?;

    state.cache.invalidate_dashboard();
    Ok(Json(with_property(&state, contract).await?))
}

/// DELETE /api/contracts/:id
///
/// Rejected with 409 while payments still reference the contract.
async fn remove(State(state): State<AppState>, EntityId(id): EntityId) -> Result<StatusCode> {
    if db::get_contract(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound("Contrato não encontrado"));
    }

    let message = "Não é possível excluir contrato com pagamentos vinculados";
    let linked = db::count_payments_for_contract(&state.db, id).await?;
    if linked > 0 {
        return Err(AppError::Conflict {
            message: message.to_string(),
            details: format!("{} pagamento(s) encontrado(s)", linked),
        });
    }

    db::delete_contract(&state.db, id).await.map_err(|e| {
        conflict_on_fk(e, message, "Pagamentos vinculados ao contrato".to_string())
    })?;

    state.cache.invalidate_dashboard();
    tracing::info!("Deleted contract {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn valid_body() -> serde_json::Value {
        json!({
            "propertyId": Uuid::new_v4().to_string(),
            "tenant": "Inquilino Teste",
            "tenantDocument": "987.654.321-00",
            "tenantEmail": "inquilino@teste.com",
            "tenantPhone": "(11) 99999-9999",
            "startDate": "2025-01-01",
            "endDate": "2027-01-01",
            "rentValue": "2000.00",
            "dueDay": 10,
            "status": "active",
        })
    }

    #[test]
    fn test_defaults_for_composition_fields() {
        let req: ContractRequest = serde_json::from_value(valid_body()).unwrap();
        let (property_id, new) = req.validate().unwrap();

        assert!(property_id.is_some());
        assert_eq!(new.due_day, 10);
        assert_eq!(new.status, ContractStatus::Active);
        assert_eq!(new.tenant_type, TenantType::Individual);
        assert!(new.iva_ibs_subject);
        assert_eq!(new.iva_ibs_rate, dec!(0));
        assert_eq!(new.iptu_value, dec!(0));
        assert!(!new.iptu_reimbursable);
    }

    #[test]
    fn test_malformed_property_id_is_not_a_format_error() {
        let mut body = valid_body();
        body["propertyId"] = json!("non-existent-id");
        let req: ContractRequest = serde_json::from_value(body).unwrap();

        let (property_id, _) = req.validate().unwrap();
        assert_eq!(property_id, None);
    }

    #[test]
    fn test_rejects_bad_due_day_and_date_order() {
        let mut body = valid_body();
        body["dueDay"] = json!(32);
        body["endDate"] = json!("2024-12-31");
        body["status"] = json!("paused");
        let req: ContractRequest = serde_json::from_value(body).unwrap();

        match req.validate() {
            Err(AppError::Validation { details, .. }) => {
                assert!(details.iter().any(|d| d.starts_with("dueDay")));
                assert!(details.iter().any(|d| d.starts_with("endDate")));
                assert!(details.iter().any(|d| d.starts_with("status")));
            }
            _ => panic!("expected validation error"),
        }
    }

    #[test]
    fn test_pj_tenant_and_string_flags() {
        let mut body = valid_body();
        body["tenantType"] = json!("pj");
        body["condominiumReimbursable"] = json!("true");
        body["ivaIbsRate"] = json!("12,5");
        let req: ContractRequest = serde_json::from_value(body).unwrap();

        let (_, new) = req.validate().unwrap();
        assert_eq!(new.tenant_type, TenantType::Entity);
        assert!(new.condominium_reimbursable);
        assert_eq!(new.iva_ibs_rate, dec!(12.5));
    }

    #[test]
    fn test_rates_and_amounts_out_of_column_range() {
        let mut body = valid_body();
        body["ivaIbsRate"] = json!("1000");
        body["rentValue"] = json!("1000000000");
        body["adminFeePercent"] = json!("8.125");
        let req: ContractRequest = serde_json::from_value(body).unwrap();

        match req.validate() {
            Err(AppError::Validation { details, .. }) => {
                assert!(details.iter().any(|d| d.starts_with("ivaIbsRate: deve ser no máximo")));
                assert!(details.iter().any(|d| d.starts_with("rentValue: deve ser no máximo")));
                assert!(details.iter().any(|d| d.starts_with("adminFeePercent: use no máximo 2")));
            }
            _ => panic!("expected validation error"),
        }
    }
}
