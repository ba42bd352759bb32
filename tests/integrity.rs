//! Referential integrity and stored tax estimates against PostgreSQL.
//!
//! Runs when `TEST_DATABASE_URL` points at a database; skipped otherwise.

mod common;

use axum::{http::StatusCode, Router};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{app_with, authed, body_json, database_pool, empty, json_request};
use gestao_alugueis::finance::amounts::parse_amount;

async fn app() -> Option<Router> {
    match database_pool().await {
        Some(pool) => Some(app_with(pool).await),
        None => {
            eprintln!("TEST_DATABASE_URL not set, skipping");
            None
        }
    }
}

async fn send(app: &Router, request: axum::http::Request<axum::body::Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = if status == StatusCode::NO_CONTENT {
        Value::Null
    } else {
        body_json(response).await
    };
    (status, body)
}

fn amount(value: &Value) -> Decimal {
    parse_amount(value).unwrap_or_else(|| panic!("not an amount: {}", value))
}

async fn create_property(app: &Router) -> String {
    let (status, body) = send(
        app,
        json_request(
            authed("POST", "/api/properties"),
            json!({
                "address": "Rua Teste, 123 - Centro, São Paulo/SP",
                "type": "apartamento",
                "owner": "Teste Owner",
                "ownerDocument": "123.456.789-00",
                "rentValue": "3000.00",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

async fn create_contract(app: &Router, property_id: &str, iva_ibs_rate: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            authed("POST", "/api/contracts"),
            json!({
                "propertyId": property_id,
                "tenant": "Inquilino Teste",
                "tenantDocument": "987.654.321-00",
                "tenantEmail": "inquilino@teste.com",
                "startDate": "2025-01-01",
                "endDate": "2027-01-01",
                "rentValue": "3000.00",
                "dueDay": 10,
                "tenantType": "pf",
                "ivaIbsRate": iva_ibs_rate,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

fn payment_body(contract_id: &str, value: &str) -> Value {
    json!({
        "contractId": contract_id,
        "referenceMonth": "2025-03",
        "dueDate": "2025-03-10",
        "value": value,
    })
}

async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, empty(authed("DELETE", uri))).await
}

#[tokio::test]
async fn test_property_with_contracts_cannot_be_deleted() {
    let Some(app) = app().await else { return };

    let property_id = create_property(&app).await;
    let contract_id = create_contract(&app, &property_id, "0").await;

    let (status, body) = delete(&app, &format!("/api/properties/{}", property_id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("contratos vinculados"));
    assert_eq!(body["details"], "1 contrato(s) encontrado(s)");

    let (status, _) = delete(&app, &format!("/api/contracts/{}", contract_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = delete(&app, &format!("/api/properties/{}", property_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_contract_with_payments_cannot_be_deleted() {
    let Some(app) = app().await else { return };

    let property_id = create_property(&app).await;
    let contract_id = create_contract(&app, &property_id, "0").await;
    let (status, payment) = send(
        &app,
        json_request(authed("POST", "/api/payments"), payment_body(&contract_id, "3000.00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", payment);
    let payment_id = payment["id"].as_str().unwrap().to_string();

    let (status, body) = delete(&app, &format!("/api/contracts/{}", contract_id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("pagamentos vinculados"));
    assert_eq!(body["details"], "1 pagamento(s) encontrado(s)");

    for uri in [
        format!("/api/payments/{}", payment_id),
        format!("/api/contracts/{}", contract_id),
        format!("/api/properties/{}", property_id),
    ] {
        let (status, _) = delete(&app, &uri).await;
        assert_eq!(status, StatusCode::NO_CONTENT, "{}", uri);
    }
}

#[tokio::test]
async fn test_missing_references_are_rejected() {
    let Some(app) = app().await else { return };

    let missing = Uuid::new_v4().to_string();

    let (status, body) = send(
        &app,
        json_request(
            authed("POST", "/api/contracts"),
            json!({
                "propertyId": missing,
                "tenant": "Inquilino Teste",
                "tenantDocument": "987.654.321-00",
                "startDate": "2025-01-01",
                "endDate": "2027-01-01",
                "rentValue": "2000.00",
                "dueDay": 10,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Imóvel não encontrado");

    for contract_id in [missing.as_str(), "non-existent-id"] {
        let (status, body) = send(
            &app,
            json_request(authed("POST", "/api/payments"), payment_body(contract_id, "2500.00")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Contrato não encontrado");
    }
}

#[tokio::test]
async fn test_out_of_range_rate_is_a_validation_error() {
    let Some(app) = app().await else { return };

    let property_id = create_property(&app).await;
    let (status, body) = send(
        &app,
        json_request(
            authed("POST", "/api/contracts"),
            json!({
                "propertyId": property_id,
                "tenant": "Inquilino Teste",
                "tenantDocument": "987.654.321-00",
                "startDate": "2025-01-01",
                "endDate": "2027-01-01",
                "rentValue": "2000.00",
                "dueDay": 10,
                "ivaIbsRate": "1000",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Dados inválidos");

    let (status, _) = delete(&app, &format!("/api/properties/{}", property_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_stored_estimates_follow_payment_updates() {
    let Some(app) = app().await else { return };

    let property_id = create_property(&app).await;
    let contract_id = create_contract(&app, &property_id, "5").await;

    let (status, created) = send(
        &app,
        json_request(authed("POST", "/api/payments"), payment_body(&contract_id, "3000.00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    // 3000 * 0.8 = 2400 -> 7.5% - 169.44
    assert_eq!(amount(&created["irValue"]), dec!(10.56));
    assert_eq!(amount(&created["ivaIbsValue"]), dec!(150));
    let payment_id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        json_request(
            authed("PUT", &format!("/api/payments/{}", payment_id)),
            payment_body(&contract_id, "4000.00"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    // 4000 * 0.8 = 3200 -> 15% - 381.44
    assert_eq!(amount(&updated["irValue"]), dec!(98.56));
    assert_eq!(amount(&updated["ivaIbsValue"]), dec!(200));

    let (status, taxes) = send(
        &app,
        empty(authed("GET", &format!("/api/payments/{}/taxes", payment_id))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&taxes["irValue"]), dec!(98.56));

    for uri in [
        format!("/api/payments/{}", payment_id),
        format!("/api/contracts/{}", contract_id),
        format!("/api/properties/{}", property_id),
    ] {
        let (status, _) = delete(&app, &uri).await;
        assert_eq!(status, StatusCode::NO_CONTENT, "{}", uri);
    }
}
