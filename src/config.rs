use anyhow::{Context, Result};
use config::{Config, Environment, File};
use sea_orm::Database;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::gallery::GalleryCache;
use crate::notify::Notifier;
use crate::schemas::AppState;

/// Runtime settings.
///
/// Layered from built-in defaults, an optional `unihaven.{toml,yaml,json}` file
/// in the working directory and `UNIHAVEN__*` environment variables, e.g.
/// `UNIHAVEN__JWT_SECRET` or `UNIHAVEN__MAIL__TRANSPORT`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    /// HS256 signing key for bearer tokens
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    /// How long a public hostel gallery stays cached
    pub gallery_cache_ttl_secs: u64,
    pub metrics_enabled: bool,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub from_address: String,
    pub from_name: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// Directory the file transport writes `.eml` files to
    pub file_dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    /// Only log outgoing mail
    Log,
    Smtp,
    File,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .set_default("database_url", "sqlite://unihaven.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("jwt_secret", "change-me")?
            .set_default("jwt_expiry_hours", 24)?
            .set_default("gallery_cache_ttl_secs", 300)?
            .set_default("metrics_enabled", true)?
            .set_default("mail.transport", "log")?
            .set_default("mail.from_address", "no-reply@unihaven.local")?
            .set_default("mail.from_name", "Unihaven")?
            .set_default("mail.smtp_port", 587)?
            .set_default("mail.file_dir", "mail")?
            .add_source(File::with_name("unihaven").required(false))
            .add_source(Environment::with_prefix("UNIHAVEN").separator("__"))
            .build()
            .context("Failed to read configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        debug!(bind_address = %config.bind_address, transport = ?config.mail.transport, "Configuration loaded");
        Ok(config)
    }
}

/// Connects to the database and builds the state shared by all handlers.
pub async fn initialize_app_state_with_config(config: AppConfig) -> Result<AppState> {
    info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;

    let gallery_cache = GalleryCache::new(1000, Duration::from_secs(config.gallery_cache_ttl_secs));

    let notifier = Notifier::from_config(&config.mail)?;

    Ok(AppState {
        db,
        gallery_cache,
        config: Arc::new(config),
        notifier: Arc::new(notifier),
    })
}
