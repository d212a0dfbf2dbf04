use serde::Deserialize;

use akeshya_auth_types::token::ACCESS_TOKEN_EXP;
use akeshya_core::config::Config;

/// Store service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing access tokens.
    pub jwt_secret: String,
    /// TCP port to listen on. Env var: `STORE_PORT`.
    #[serde(default = "default_port")]
    pub store_port: u16,
    /// Access token lifetime. Env var: `JWT_EXPIRATION_SECS`.
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_secs: u64,
    /// Directory uploaded images are written to.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Mail API endpoint. Without it OTP mails are only logged.
    pub email_api_url: Option<String>,
    #[serde(default)]
    pub email_api_key: String,
    #[serde(default = "default_email_from")]
    pub email_from: String,
    /// Adds a daily-rolling JSON log file in this directory.
    pub log_dir: Option<String>,
    #[serde(default = "enabled")]
    pub run_migrations: bool,
    #[serde(default = "enabled")]
    pub seed_admin: bool,
}

fn default_port() -> u16 {
    3114
}

fn default_jwt_expiration() -> u64 {
    ACCESS_TOKEN_EXP
}

fn default_upload_dir() -> String {
    "uploads".to_owned()
}

fn default_email_from() -> String {
    "no-reply@akeshya.com".to_owned()
}

fn enabled() -> bool {
    true
}

impl Config for StoreConfig {}
