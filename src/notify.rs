//! Payment reminder e-mails
//!
//! Delivery goes through Resend when its API key is configured, otherwise
//! SendGrid. Without either key the message is only logged.

use askama::Template;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::EmailConfig;
use crate::error::{AppError, Result};
use crate::format::{brl, date_br, month_label};
use crate::models::{Contract, Payment, PaymentStatus, Property};

const RESEND_URL: &str = "https://api.resend.com/emails";
const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Template)]
#[template(path = "email/overdue.html")]
struct OverdueTemplate<'a> {
    tenant: &'a str,
    month: String,
    address: &'a str,
    due_date: String,
    value: String,
}

#[derive(Template)]
#[template(path = "email/due_soon.html")]
struct DueSoonTemplate<'a> {
    tenant: &'a str,
    month: String,
    address: &'a str,
    due_date: String,
    value: String,
    days: i64,
}

/// Which reminder a payment calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ReminderKind {
    Overdue,
    DueSoon { days: i64 },
}

/// Rendered e-mail ready for delivery
#[derive(Debug, Clone)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub kind: ReminderKind,
}

/// Provider that handled a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Resend,
    SendGrid,
    Simulated,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub provider: Provider,
    pub email_id: Option<String>,
}

impl Delivery {
    pub fn message(&self) -> &'static str {
        match self.provider {
            Provider::Simulated => "Email simulado (configurar SendGrid ou Resend para envio real)",
            _ => "Email enviado com sucesso",
        }
    }
}

#[derive(Deserialize)]
struct ResendResponse {
    id: Option<String>,
}

fn due_soon_subject(days: i64) -> String {
    match days {
        0 => "Lembrete de Pagamento - Aluguel vence hoje".to_string(),
        1 => "Lembrete de Pagamento - Vencimento amanhã".to_string(),
        _ => format!("Lembrete de Pagamento - Vencimento em {} dias", days),
    }
}

/// Build the reminder for an unpaid payment
pub fn build_reminder(
    payment: &Payment,
    contract: &Contract,
    property: Option<&Property>,
    today: NaiveDate,
) -> Result<Email> {
    if payment.is_paid() {
        return Err(AppError::bad_request("Pagamento já foi realizado"));
    }

    let to = contract
        .tenant_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::bad_request("Email do inquilino não cadastrado"))?
        .to_string();

    let tenant = if contract.tenant.trim().is_empty() {
        "Inquilino"
    } else {
        contract.tenant.as_str()
    };
    let address = property.map(|p| p.address.as_str()).unwrap_or("N/A");
    let month = month_label(&payment.reference_month);
    let due_date = date_br(payment.due_date);
    let value = brl(payment.value);

    let (kind, subject, html) = match payment.status(today) {
        PaymentStatus::Overdue => (
            ReminderKind::Overdue,
            "Lembrete de Pagamento - Aluguel Vencido".to_string(),
            OverdueTemplate { tenant, month, address, due_date, value }.render()?,
        ),
        _ => {
            let days = (payment.due_date - today).num_days();
            (
                ReminderKind::DueSoon { days },
                due_soon_subject(days),
                DueSoonTemplate { tenant, month, address, due_date, value, days }.render()?,
            )
        }
    };

    Ok(Email { to, subject, html, kind })
}

/// Outbound e-mail client
#[derive(Clone)]
pub struct Notifier {
    client: Client,
    config: EmailConfig,
}

impl Notifier {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    /// Provider that [`Notifier::send`] will use
    pub fn provider(&self) -> Provider {
        if self.config.resend_api_key.is_some() {
            Provider::Resend
        } else if self.config.sendgrid_api_key.is_some() {
            Provider::SendGrid
        } else {
            Provider::Simulated
        }
    }

    pub async fn send(&self, email: &Email) -> Result<Delivery> {
        match (&self.config.resend_api_key, &self.config.sendgrid_api_key) {
            (Some(key), _) => self.send_resend(key, email).await,
            (None, Some(key)) => self.send_sendgrid(key, email).await,
            (None, None) => {
                info!(
                    "Simulating e-mail (no provider configured) to={} subject={:?}",
                    email.to, email.subject
                );
                debug!("Simulated e-mail body: {}", email.html);
                Ok(Delivery {
                    provider: Provider::Simulated,
                    email_id: None,
                })
            }
        }
    }

    async fn send_resend(&self, api_key: &str, email: &Email) -> Result<Delivery> {
        let body = json!({
            "from": format!("{} <{}>", self.config.from_name, self.config.from_email),
            "to": [email.to],
            "subject": email.subject,
            "html": email.html,
        });

        let response = self
            .client
            .post(RESEND_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Erro ao enviar email: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("Resend rejected e-mail ({}): {}", status, text);
            return Err(AppError::Upstream(format!("Erro ao enviar email: {}", text)));
        }

        let parsed: ResendResponse = response
            .json()
            .await
            .unwrap_or(ResendResponse { id: None });

        info!("E-mail sent via Resend to {}", email.to);
        Ok(Delivery {
            provider: Provider::Resend,
            email_id: parsed.id,
        })
    }

    async fn send_sendgrid(&self, api_key: &str, email: &Email) -> Result<Delivery> {
        let body = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": self.config.from_email, "name": self.config.from_name },
            "subject": email.subject,
            "content": [{ "type": "text/html", "value": email.html }],
        });

        let response = self
            .client
            .post(SENDGRID_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Erro ao enviar email: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("SendGrid rejected e-mail ({}): {}", status, text);
            return Err(AppError::Upstream(format!("Erro ao enviar email: {}", text)));
        }

        info!("E-mail sent via SendGrid to {}", email.to);
        Ok(Delivery {
            provider: Provider::SendGrid,
            email_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payment::fixtures;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_overdue_reminder() {
        let property = fixtures::property();
        let contract = fixtures::contract(property.id, "active");
        let payment = fixtures::payment("2025-03", "2025-03-05", None, dec!(2500));

        let email = build_reminder(&payment, &contract, Some(&property), today()).unwrap();

        assert_eq!(email.kind, ReminderKind::Overdue);
        assert_eq!(email.to, "roberto@example.com");
        assert_eq!(email.subject, "Lembrete de Pagamento - Aluguel Vencido");
        assert!(email.html.contains("Março"));
        assert!(email.html.contains("R$ 2.500,00"));
        assert!(email.html.contains("Rua Augusta, 1500"));
    }

    #[test]
    fn test_due_soon_reminder_counts_days() {
        let property = fixtures::property();
        let contract = fixtures::contract(property.id, "active");
        let payment = fixtures::payment("2025-03", "2025-03-15", None, dec!(2500));

        let email = build_reminder(&payment, &contract, None, today()).unwrap();

        assert_eq!(email.kind, ReminderKind::DueSoon { days: 5 });
        assert!(email.subject.ends_with("em 5 dias"));
        assert!(email.html.contains("N/A"));
    }

    #[test]
    fn test_due_today_and_tomorrow_subjects() {
        let contract = fixtures::contract(Uuid::nil(), "active");

        let due_today = fixtures::payment("2025-03", "2025-03-10", None, dec!(2500));
        let email = build_reminder(&due_today, &contract, None, today()).unwrap();
        assert_eq!(email.kind, ReminderKind::DueSoon { days: 0 });
        assert_eq!(email.subject, "Lembrete de Pagamento - Aluguel vence hoje");
        assert!(email.html.contains("vence <strong>hoje</strong>"));

        let due_tomorrow = fixtures::payment("2025-03", "2025-03-11", None, dec!(2500));
        let email = build_reminder(&due_tomorrow, &contract, None, today()).unwrap();
        assert_eq!(email.subject, "Lembrete de Pagamento - Vencimento amanhã");
    }

    #[test]
    fn test_paid_or_missing_email_is_rejected() {
        let property = fixtures::property();
        let mut contract = fixtures::contract(property.id, "active");
        let paid = fixtures::payment("2025-03", "2025-03-05", Some("2025-03-05"), dec!(2500));
        assert!(build_reminder(&paid, &contract, None, today()).is_err());

        contract.tenant_email = Some("  ".to_string());
        let unpaid = fixtures::payment("2025-03", "2025-03-05", None, dec!(2500));
        let err = build_reminder(&unpaid, &contract, None, today()).err().unwrap();
        assert_eq!(err.to_string(), "Email do inquilino não cadastrado");
    }

    #[tokio::test]
    async fn test_simulated_delivery_without_keys() {
        let notifier = Notifier::new(EmailConfig::default());
        assert_eq!(notifier.provider(), Provider::Simulated);

        let email = Email {
            to: "a@b.c".to_string(),
            subject: "s".to_string(),
            html: "<p>x</p>".to_string(),
            kind: ReminderKind::Overdue,
        };
        let delivery = notifier.send(&email).await.unwrap();
        assert_eq!(delivery.provider, Provider::Simulated);
        assert!(delivery.message().starts_with("Email simulado"));
    }

    #[test]
    fn test_resend_preferred_over_sendgrid() {
        let notifier = Notifier::new(EmailConfig {
            resend_api_key: Some("re_x".to_string()),
            sendgrid_api_key: Some("SG.x".to_string()),
            ..EmailConfig::default()
        });
        assert_eq!(notifier.provider(), Provider::Resend);
    }
}
