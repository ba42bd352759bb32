//! Payment queries

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewPayment, Payment};

const PAYMENT_COLUMNS: &str = r#"
    id, contract_id, reference_month, due_date, payment_date, value,
    payment_method, notes, rent_amount, iptu_amount, condominium_amount,
    other_charges, ir_value, iva_ibs_value, receipt_type, created_at
"#;

/// Get all payments, latest due date first
pub async fn list_payments(pool: &PgPool) -> Result<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY due_date DESC, created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(payments)
}

pub async fn get_payment(pool: &PgPool, id: Uuid) -> Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(payment)
}

/// Count payments linked to a contract
pub async fn count_payments_for_contract(pool: &PgPool, contract_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE contract_id = $1")
        .bind(contract_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

pub async fn insert_payment(pool: &PgPool, new: &NewPayment) -> Result<Payment> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        r#"
        INSERT INTO payments (
            id, contract_id, reference_month, due_date, payment_date, value,
            payment_method, notes, rent_amount, iptu_amount, condominium_amount,
            other_charges, ir_value, iva_ibs_value, receipt_type
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING {PAYMENT_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(new.contract_id)
    .bind(&new.reference_month)
    .bind(new.due_date)
    .bind(new.payment_date)
    .bind(new.value)
    .bind(&new.payment_method)
    .bind(&new.notes)
    .bind(new.rent_amount)
    .bind(new.iptu_amount)
    .bind(new.condominium_amount)
    .bind(new.other_charges)
    .bind(new.ir_value)
    .bind(new.iva_ibs_value)
    .bind(&new.receipt_type)
    .fetch_one(pool)
    .await?;

    Ok(payment)
}

pub async fn update_payment(pool: &PgPool, id: Uuid, new: &NewPayment) -> Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        r#"
        UPDATE payments
        SET contract_id = $2,
            reference_month = $3,
            due_date = $4,
            payment_date = $5,
            value = $6,
            payment_method = $7,
            notes = $8,
            rent_amount = $9,
            iptu_amount = $10,
            condominium_amount = $11,
            other_charges = $12,
            ir_value = $13,
            iva_ibs_value = $14,
            receipt_type = $15
        WHERE id = $1
        RETURNING {PAYMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(new.contract_id)
    .bind(&new.reference_month)
    .bind(new.due_date)
    .bind(new.payment_date)
    .bind(new.value)
    .bind(&new.payment_method)
    .bind(&new.notes)
    .bind(new.rent_amount)
    .bind(new.iptu_amount)
    .bind(new.condominium_amount)
    .bind(new.other_charges)
    .bind(new.ir_value)
    .bind(new.iva_ibs_value)
    .bind(&new.receipt_type)
    .fetch_optional(pool)
    .await?;

    Ok(payment)
}

pub async fn delete_payment(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
