//! Application configuration loaded from the environment.
//!
//! `.env` is loaded by `dotenvy` in `main` before [`Config::from_env`] runs.

use std::env;
use std::path::PathBuf;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub production: bool,
    /// Directory where uploaded documents are stored
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Built frontend served at `/` when present
    pub static_dir: Option<PathBuf>,
    pub cors_origin: Option<String>,
    pub seed_demo_data: bool,
    pub email: EmailConfig,
}

/// Outbound e-mail settings
#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    pub resend_api_key: Option<String>,
    pub sendgrid_api_key: Option<String>,
    pub from_email: String,
    pub from_name: String,
}

impl Config {
    /// Read configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 5000)?,
            production: env::var("APP_ENV").map(|v| v == "production").unwrap_or(false),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            static_dir: optional("STATIC_DIR").map(PathBuf::from),
            cors_origin: optional("CORS_ORIGIN"),
            seed_demo_data: parse_or("SEED_DEMO_DATA", false)?,
            email: EmailConfig {
                resend_api_key: optional("RESEND_API_KEY"),
                sendgrid_api_key: optional("SENDGRID_API_KEY"),
                from_email: env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "noreply@gestaoalugueis.com".to_string()),
                from_name: env::var("EMAIL_FROM_NAME")
                    .unwrap_or_else(|_| "Sistema de Gestão de Aluguéis".to_string()),
            },
        })
    }

    /// Configuration for tests and tooling that never touch the network
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/gestao_alugueis_test".to_string(),
            database_max_connections: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            production: false,
            upload_dir: env::temp_dir().join("gestao-alugueis-uploads"),
            max_upload_bytes: 1024 * 1024,
            static_dir: None,
            cors_origin: None,
            seed_demo_data: false,
            email: EmailConfig {
                from_email: "noreply@example.com".to_string(),
                from_name: "Test".to_string(),
                ..EmailConfig::default()
            },
        }
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
