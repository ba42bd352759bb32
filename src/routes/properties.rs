//! Property route handlers

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::db;
use crate::error::{ApiJson, AppError, EntityId, Result};
use crate::finance::amounts::lenient;
use crate::models::{NewProperty, Property, PropertyType};
use crate::AppState;

use super::{conflict_on_fk, non_blank, FieldErrors};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/properties", get(list).post(create))
        .route("/properties/:id", get(show).put(update).delete(remove))
}

/// Property body for create and replace
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, rename = "type")]
    pub property_type: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub owner_document: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rent_value: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PropertyRequest {
    pub fn validate(self) -> Result<NewProperty> {
        let mut errors = FieldErrors::default();

        let address = errors.required("address", self.address);
        let property_type = match self.property_type.as_deref().and_then(PropertyType::from_str) {
            Some(t) => t,
            None => {
                errors.push("type", "use apartamento, casa, comercial ou terreno");
                PropertyType::Apartment
            }
        };
        let owner = errors.required("owner", self.owner);
        let owner_document = errors.required("ownerDocument", self.owner_document);
        let rent_value = errors.required_amount("rentValue", self.rent_value);

        errors.finish()?;

        Ok(NewProperty {
            address,
            property_type,
            owner,
            owner_document,
            rent_value,
            description: non_blank(self.description),
        })
    }
}

/// GET /api/properties
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Property>>> {
    Ok(Json(db::list_properties(&state.db).await?))
}

/// GET /api/properties/:id
async fn show(State(state): State<AppState>, EntityId(id): EntityId) -> Result<Json<Property>> {
    db::get_property(&state.db, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Imóvel não encontrado"))
}

/// POST /api/properties
async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PropertyRequest>,
) -> Result<(StatusCode, Json<Property>)> {
    let new = req.validate()?;
    let property = db::insert_property(&state.db, &new).await?;

    state.cache.invalidate_dashboard();
    tracing::info!("Created property {}", property.id);
    Ok((StatusCode::CREATED, Json(property)))
}

/// PUT /api/properties/:id
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    ApiJson(req): ApiJson<PropertyRequest>,
) -> Result<Json<Property>> {
    let new = req.validate()?;
    let property = db::update_property(&state.db, id, &new)
        .await?
        .ok_or(AppError::NotFound("Imóvel não encontrado"))?;

    state.cache.invalidate_dashboard();
    Ok(Json(property))
}

/// DELETE /api/properties/:id
///
/// Rejected with 409 while contracts still reference the property.
async fn remove(State(state): State<AppState>, EntityId(id): EntityId) -> Result<StatusCode> {
    if db::get_property(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound("Imóvel não encontrado"));
    }

    let message = "Não é possível excluir imóvel com contratos vinculados";
    let linked = db::count_contracts_for_property(&state.db, id).await?;
    if linked > 0 {
        return Err(AppError::Conflict {
            message: message.to_string(),
            details: format!("{} contrato(s) encontrado(s)", linked),
        });
    }

    db::delete_property(&state.db, id).await.map_err(|e| {
        conflict_on_fk(e, message, "Contratos vinculados ao imóvel".to_string())
    })?;

    state.cache.invalidate_dashboard();
    tracing::info!("Deleted property {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_valid_request() {
        let req: PropertyRequest = serde_json::from_value(json!({
            "address": "Rua Teste, 123 - Centro, São Paulo/SP",
            "type": "apartamento",
            "owner": "Teste Owner",
            "ownerDocument": "123.456.789-00",
            "rentValue": "1500.00",
            "description": "  ",
        }))
        .unwrap();

        let new = req.validate().unwrap();
        assert_eq!(new.property_type, PropertyType::Apartment);
        assert_eq!(new.rent_value, dec!(1500.00));
        assert_eq!(new.description, None);
    }

    #[test]
    fn test_invalid_request_lists_fields() {
        let req: PropertyRequest = serde_json::from_value(json!({
            "address": "",
            "type": "castelo",
            "rentValue": "abc",
        }))
        .unwrap();

        match req.validate() {
            Err(AppError::Validation { details, .. }) => {
                let fields: Vec<&str> = details.iter().filter_map(|d| d.split(':').next()).collect();
                assert_eq!(fields, vec!["address", "type", "owner", "ownerDocument", "rentValue"]);
            }
            other => panic!("expected validation error, got {:?}", other.map(|p| p.address)),
        }
    }
}
