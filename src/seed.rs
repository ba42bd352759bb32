//! Demo data for a fresh database

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use tracing::info;

use crate::auth::hash_password;
use crate::db;
use crate::error::{AppError, Result};
use crate::finance::services::apply_tax_estimates;
use crate::models::{ContractStatus, NewContract, NewPayment, NewProperty, PropertyType, TenantType};

pub const ADMIN_USERNAME: &str = "admin@gestao.com";
const ADMIN_PASSWORD: &str = "admin123";

struct DemoLease {
    address: &'static str,
    property_type: PropertyType,
    description: &'static str,
    owner: &'static str,
    owner_document: &'static str,
    rent: Decimal,
    tenant: &'static str,
    tenant_document: &'static str,
    tenant_email: &'static str,
    tenant_phone: &'static str,
    tenant_type: TenantType,
    /// (year offset, month, day)
    start: (i32, u32, u32),
    /// years after the start year
    length_years: i32,
    due_day: u32,
}

const DEMO_LEASES: [DemoLease; 5] = [
    DemoLease {
        address: "Rua Augusta, 1500, Apto 42 - Jardim Paulista, São Paulo/SP",
        property_type: PropertyType::Apartment,
        description: "Apartamento 2 quartos, 1 vaga",
        owner: "Carlos Silva",
        owner_document: "123.456.789-00",
        rent: dec!(2500.00),
        tenant: "Roberto Almeida",
        tenant_document: "111.222.333-44",
        tenant_email: "roberto@gmail.com",
        tenant_phone: "(11) 98111-2222",
        tenant_type: TenantType::Individual,
        start: (0, 1, 1),
        length_years: 1,
        due_day: 5,
    },
    DemoLease {
        address: "Rua Pamplona, 300 - Bela Vista, São Paulo/SP",
        property_type: PropertyType::House,
        description: "Casa 3 quartos com quintal",
        owner: "Maria Santos",
        owner_document: "987.654.321-00",
        rent: dec!(3500.00),
        tenant: "Fernanda Lima",
        tenant_document: "222.333.444-55",
        tenant_email: "fernanda@hotmail.com",
        tenant_phone: "(11) 99222-3333",
        tenant_type: TenantType::Individual,
        start: (0, 1, 15),
        length_years: 2,
        due_day: 10,
    },
    DemoLease {
        address: "Av. Paulista, 1000, Loja 5 - Centro, São Paulo/SP",
        property_type: PropertyType::Commercial,
        description: "Loja comercial 80m²",
        owner: "João Oliveira",
        owner_document: "456.789.123-00",
        rent: dec!(5000.00),
        tenant: "Tech Solutions Ltda",
        tenant_document: "12.345.678/0001-90",
        tenant_email: "contato@techsolutions.com.br",
        tenant_phone: "(11) 3333-4444",
        tenant_type: TenantType::Entity,
        start: (-1, 7, 1),
        length_years: 2,
        due_day: 1,
    },
    DemoLease {
        address: "Rua da Consolação, 2800, Apto 101 - Consolação, São Paulo/SP",
        property_type: PropertyType::Apartment,
        description: "Apartamento 3 quartos, 2 vagas",
        owner: "Ana Ferreira",
        owner_document: "321.654.987-00",
        rent: dec!(3200.00),
        tenant: "Juliana Mendes",
        tenant_document: "333.444.555-66",
        tenant_email: "juliana.mendes@outlook.com",
        tenant_phone: "(11) 97333-4444",
        tenant_type: TenantType::Individual,
        start: (0, 2, 1),
        length_years: 1,
        due_day: 15,
    },
    DemoLease {
        address: "Praça da República, 50, Sala 302 - República, São Paulo/SP",
        property_type: PropertyType::Commercial,
        description: "Sala comercial 60m²",
        owner: "Pedro Costa",
        owner_document: "654.321.987-00",
        rent: dec!(4200.00),
        tenant: "Advocacia Martins & Associados",
        tenant_document: "98.765.432/0001-10",
        tenant_email: "contato@martinsadvocacia.com.br",
        tenant_phone: "(11) 3555-6666",
        tenant_type: TenantType::Entity,
        start: (0, 1, 1),
        length_years: 3,
        due_day: 20,
    },
];

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AppError::Internal(format!("invalid seed date {}-{}-{}", year, month, day)))
}

/// Create the admin user and demo portfolio unless a user already exists.
///
/// Returns whether anything was inserted.
pub async fn seed_demo_data(pool: &PgPool, today: NaiveDate) -> Result<bool> {
    if db::count_users(pool).await? > 0 {
        info!("Database already has users, skipping seed");
        return Ok(false);
    }

    info!("Seeding demo data...");
    let password_hash = hash_password(ADMIN_PASSWORD.to_string()).await?;
    db::insert_user(pool, ADMIN_USERNAME, &password_hash).await?;

    let year = today.year();
    let mut payments = 0;

    for (idx, lease) in DEMO_LEASES.iter().enumerate() {
        let property = db::insert_property(
            pool,
            &NewProperty {
                address: lease.address.to_string(),
                property_type: lease.property_type,
                owner: lease.owner.to_string(),
                owner_document: lease.owner_document.to_string(),
                rent_value: lease.rent,
                description: Some(lease.description.to_string()),
            },
        )
        .await?;

        let (offset, month, day) = lease.start;
        let contract = db::insert_contract(
            pool,
            &NewContract {
                property_id: property.id,
                tenant: lease.tenant.to_string(),
                tenant_document: lease.tenant_document.to_string(),
                tenant_email: Some(lease.tenant_email.to_string()),
                tenant_phone: Some(lease.tenant_phone.to_string()),
                start_date: date(year + offset, month, day)?,
                end_date: date(year + offset + lease.length_years, month, day)?,
                rent_value: lease.rent,
                due_day: lease.due_day as i32,
                status: ContractStatus::Active,
                admin_fee_percent: None,
                adjustment_index: Some("IGPM".to_string()),
                adjustment_percent: None,
                next_adjustment_date: None,
                document_url: None,
                tenant_type: lease.tenant_type,
                rent_base_value: Some(lease.rent),
                iptu_value: Decimal::ZERO,
                condominium_value: Decimal::ZERO,
                iptu_reimbursable: false,
                condominium_reimbursable: false,
                iva_ibs_subject: true,
                iva_ibs_rate: Decimal::ZERO,
            },
        )
        .await?;

        // (month, paid) for January through March
        let schedule = [(1, idx < 4), (2, idx < 3), (3, idx == 0)];
        for (month, paid) in schedule {
            // January only covers the first four leases
            if month == 1 && idx >= 4 {
                continue;
            }
            let due_date = date(year, month, lease.due_day.min(28))?;
            let mut new = NewPayment {
                contract_id: contract.id,
                reference_month: format!("{}-{:02}", year, month),
                due_date,
                payment_date: paid.then_some(due_date),
                value: lease.rent,
                payment_method: paid.then(|| "pix".to_string()),
                notes: None,
                rent_amount: Some(lease.rent),
                iptu_amount: Decimal::ZERO,
                condominium_amount: Decimal::ZERO,
                other_charges: Decimal::ZERO,
                ir_value: Decimal::ZERO,
                iva_ibs_value: Decimal::ZERO,
                receipt_type: "rent".to_string(),
            };
            apply_tax_estimates(&mut new, &contract);
            db::insert_payment(pool, &new).await?;
            payments += 1;
        }
    }

    info!(
        "Seed complete: 1 user ({}), {} properties, {} contracts, {} payments",
        ADMIN_USERNAME,
        DEMO_LEASES.len(),
        DEMO_LEASES.len(),
        payments
    );
    Ok(true)
}
