//! Contract queries

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Contract, NewContract};

const CONTRACT_COLUMNS: &str = r#"
    id, property_id, tenant, tenant_document, tenant_email, tenant_phone,
    start_date, end_date, rent_value, due_day, status,
    admin_fee_percent, adjustment_index, adjustment_percent, next_adjustment_date,
    document_url, tenant_type, rent_base_value, iptu_value, condominium_value,
    iptu_reimbursable, condominium_reimbursable, iva_ibs_subject, iva_ibs_rate, created_at
"#;

pub async fn list_contracts(pool: &PgPool) -> Result<Vec<Contract>> {
    let contracts = sqlx::query_as::<_, Contract>(&format!(
        "SELECT {CONTRACT_COLUMNS} FROM contracts ORDER BY created_at, tenant"
    ))
    .fetch_all(pool)
    .await?;

    Ok(contracts)
}

pub async fn get_contract(pool: &PgPool, id: Uuid) -> Result<Option<Contract>> {
    let contract = sqlx::query_as::<_, Contract>(&format!(
        "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(contract)
}

/// Count contracts linked to a property
pub async fn count_contracts_for_property(pool: &PgPool, property_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contracts WHERE property_id = $1")
        .bind(property_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

pub async fn insert_contract(pool: &PgPool, new: &NewContract) -> Result<Contract> {
    let contract = sqlx::query_as::<_, Contract>(&format!(
        r#"
        INSERT INTO contracts (
            id, property_id, tenant, tenant_document, tenant_email, tenant_phone,
            start_date, end_date, rent_value, due_day, status,
            admin_fee_percent, adjustment_index, adjustment_percent, next_adjustment_date,
            document_url, tenant_type, rent_base_value, iptu_value, condominium_value,
            iptu_reimbursable, condominium_reimbursable, iva_ibs_subject, iva_ibs_rate
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24)
        RETURNING {CONTRACT_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(new.property_id)
    .bind(&new.tenant)
    .bind(&new.tenant_document)
    .bind(&new.tenant_email)
    .bind(&new.tenant_phone)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.rent_value)
    .bind(new.due_day)
    .bind(new.status.as_str())
    .bind(new.admin_fee_percent)
    .bind(&new.adjustment_index)
    .bind(new.adjustment_percent)
    .bind(new.next_adjustment_date)
    .bind(&new.document_url)
    .bind(new.tenant_type.as_str())
    .bind(new.rent_base_value)
    .bind(new.iptu_value)
    .bind(new.condominium_value)
    .bind(new.iptu_reimbursable)
    .bind(new.condominium_reimbursable)
    .bind(new.iva_ibs_subject)
    .bind(new.iva_ibs_rate)
    .fetch_one(pool)
    .await?;

    Ok(contract)
}

pub async fn update_contract(pool: &PgPool, id: Uuid, new: &NewContract) -> Result<Option<Contract>> {
    let contract = sqlx::query_as::<_, Contract>(&format!(
        r#"
        UPDATE contracts
        SET property_id = $2,
            tenant = $3,
            tenant_document = $4,
            tenant_email = $5,
            tenant_phone = $6,
            start_date = $7,
            end_date = $8,
            rent_value = $9,
            due_day = $10,
            status = $11,
            admin_fee_percent = $12,
            adjustment_index = $13,
            adjustment_percent = $14,
            next_adjustment_date = $15,
            document_url = $16,
            tenant_type = $17,
            rent_base_value = $18,
            iptu_value = $19,
            condominium_value = $20,
            iptu_reimbursable = $21,
            condominium_reimbursable = $22,
            iva_ibs_subject = $23,
            iva_ibs_rate = $24
        WHERE id = $1
        RETURNING {CONTRACT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(new.property_id)
    .bind(&new.tenant)
    .bind(&new.tenant_document)
    .bind(&new.tenant_email)
    .bind(&new.tenant_phone)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.rent_value)
    .bind(new.due_day)
    .bind(new.status.as_str())
    .bind(new.admin_fee_percent)
    .bind(&new.adjustment_index)
    .bind(new.adjustment_percent)
    .bind(new.next_adjustment_date)
    .bind(&new.document_url)
    .bind(new.tenant_type.as_str())
    .bind(new.rent_base_value)
    .bind(new.iptu_value)
    .bind(new.condominium_value)
    .bind(new.iptu_reimbursable)
    .bind(new.condominium_reimbursable)
    .bind(new.iva_ibs_subject)
    .bind(new.iva_ibs_rate)
    .fetch_optional(pool)
    .await?;

    Ok(contract)
}

pub async fn delete_contract(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM contracts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
