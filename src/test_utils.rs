#[cfg(test)]
pub mod test_utils {
    use crate::auth::issue_token;
    use crate::config::{AppConfig, MailConfig, MailTransport};
    use crate::gallery::GalleryCache;
    use crate::notify::Notifier;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use model::entities::user::{self, AccountStatus, Role, VerificationStatus};
    use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
    use std::sync::Arc;
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;
    use uuid::Uuid;

    /// Settings for tests: log-only mail and no metrics recorder.
    pub fn test_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            bind_address: "127.0.0.1:0".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 1,
            gallery_cache_ttl_secs: 60,
            metrics_enabled: false,
            mail: MailConfig {
                transport: MailTransport::Log,
                from_address: "no-reply@unihaven.local".to_string(),
                from_name: "Unihaven".to_string(),
                smtp_host: None,
                smtp_port: 587,
                smtp_username: None,
                smtp_password: None,
                file_dir: "mail".to_string(),
            },
        }
    }

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        db.execute_unprepared("PRAGMA foreign_keys = ON")
            .await
            .expect("Failed to enable foreign keys");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        let config = test_config();
        let notifier = Notifier::from_config(&config.mail).expect("Failed to build notifier");

        AppState {
            db,
            gallery_cache: GalleryCache::new(100, Duration::from_secs(60)),
            config: Arc::new(config),
            notifier: Arc::new(notifier),
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> (Router, AppState) {
        let state = setup_test_app_state().await;
        let router = create_router(state.clone());
        (router, state)
    }

    /// Inserts an active account with `role`. It has no password; tests act
    /// through [`bearer`] tokens instead of logging in.
    pub async fn create_test_user(db: &DatabaseConnection, email: &str, role: Role) -> user::Model {
        let now = Utc::now();
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(None),
            full_name: Set(format!("{:?} User", role)),
            email: Set(email.to_string()),
            phone: Set(None),
            whatsapp_phone: Set(None),
            gender: Set(None),
            role: Set(role),
            password_hash: Set(None),
            email_verified: Set(false),
            is_identity_verified: Set(false),
            id_front_image_url: Set(None),
            id_back_image_url: Set(None),
            passport_image_url: Set(None),
            id_number: Set(None),
            identity_verification_status: Set(VerificationStatus::NotSubmitted),
            verification_remarks: Set(None),
            account_status: Set(AccountStatus::Active),
            avatar_url: Set(None),
            bio: Set(None),
            visibility: Set("PUBLIC".to_string()),
            managed_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("Failed to create test user")
    }

    /// `Authorization` header value for `user`.
    pub fn bearer(state: &AppState, user: &user::Model) -> String {
        let token = issue_token(user, &state.config).expect("Failed to issue token");
        format!("Bearer {}", token)
    }
}
