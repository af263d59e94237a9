//! Fixtures shared by the unit tests of this crate.

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use model::entities::{hostel, room, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

/// In-memory SQLite with foreign keys on and all migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Stderr subscriber at the level named by RUST_LOG, WARN otherwise.
pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

pub async fn create_user(db: &DatabaseConnection, email: &str, role: user::Role) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(None),
        full_name: Set(format!("User {}", email)),
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
        identity_verification_status: Set(user::VerificationStatus::NotSubmitted),
        verification_remarks: Set(None),
        account_status: Set(user::AccountStatus::Active),
        avatar_url: Set(None),
        bio: Set(None),
        visibility: Set("PUBLIC".to_string()),
        managed_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create user")
}

pub async fn create_hostel(db: &DatabaseConnection, owner_id: Uuid, name: &str) -> hostel::Model {
    hostel::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        name: Set(name.to_string()),
        campus: Set("Main Campus".to_string()),
        address: Set(format!("{} Road", name)),
        description: Set(None),
        policy: Set(hostel::GenderPolicy::Mixed),
        is_verified: Set(false),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to create hostel")
}

pub async fn create_room(db: &DatabaseConnection, hostel_id: Uuid, total_slots: i32) -> room::Model {
    room::ActiveModel {
        id: Set(Uuid::new_v4()),
        hostel_id: Set(hostel_id),
        label: Set("Room 101".to_string()),
        floor: Set(Some("1".to_string())),
        block: Set(Some("A".to_string())),
        room_type: Set(room::RoomType::Single),
        price: Set(Decimal::new(1500000, 2)),
        billing_cycle: Set(room::BillingCycle::PerSemester),
        total_slots: Set(total_slots),
        occupied_slots: Set(0),
        status: Set(room::RoomStatus::Available),
    }
    .insert(db)
    .await
    .expect("Failed to create room")
}
