//! Property queries

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewProperty, Property};

const PROPERTY_COLUMNS: &str = r#"
    id, address, property_type, owner, owner_document, rent_value, description, created_at
"#;

/// Get all properties, oldest first
pub async fn list_properties(pool: &PgPool) -> Result<Vec<Property>> {
    let properties = sqlx::query_as::<_, Property>(&format!(
        "SELECT {PROPERTY_COLUMNS} FROM properties ORDER BY created_at, address"
    ))
    .fetch_all(pool)
    .await?;

    Ok(properties)
}

/// Get a property by id
pub async fn get_property(pool: &PgPool, id: Uuid) -> Result<Option<Property>> {
    let property = sqlx::query_as::<_, Property>(&format!(
        "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(property)
}

pub async fn insert_property(pool: &PgPool, new: &NewProperty) -> Result<Property> {
    let property = sqlx::query_as::<_, Property>(&format!(
        r#"
        INSERT INTO properties (id, address, property_type, owner, owner_document, rent_value, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {PROPERTY_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&new.address)
    .bind(new.property_type.as_str())
    .bind(&new.owner)
    .bind(&new.owner_document)
    .bind(new.rent_value)
    .bind(&new.description)
    .fetch_one(pool)
    .await?;

    Ok(property)
}

/// Replace a property; `None` when it does not exist
pub async fn update_property(pool: &PgPool, id: Uuid, new: &NewProperty) -> Result<Option<Property>> {
    let property = sqlx::query_as::<_, Property>(&format!(
        r#"
        UPDATE properties
        SET address = $2,
            property_type = $3,
            owner = $4,
            owner_document = $5,
            rent_value = $6,
            description = $7
        WHERE id = $1
        RETURNING {PROPERTY_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&new.address)
    .bind(new.property_type.as_str())
    .bind(&new.owner)
    .bind(&new.owner_document)
    .bind(new.rent_value)
    .bind(&new.description)
    .fetch_optional(pool)
    .await?;

    Ok(property)
}

/// Delete a property; returns whether a row was removed
pub async fn delete_property(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM properties WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
