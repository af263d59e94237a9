use std::collections::BTreeMap;

use chrono::Utc;
use model::entities::user::{self, AccountStatus, Gender, Role, VerificationStatus};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use crate::error::{DomainError, Result};

/// Registration data; the password arrives already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub password_hash: String,
}

/// Self-service profile fields. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub whatsapp_phone: Option<String>,
    pub gender: Option<Gender>,
    pub visibility: Option<String>,
}

pub struct UserService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// New accounts are active students with nothing submitted yet.
    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    pub async fn register(&self, new_user: NewUser) -> Result<user::Model> {
        trace!("Registering user");

        let email = new_user.email.trim().to_lowercase();
        if self.find_by_email(&email).await?.is_some() {
            warn!("Email already registered");
            return Err(DomainError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new_user.username),
            full_name: Set(new_user.full_name),
            email: Set(email),
            phone: Set(new_user.phone),
            whatsapp_phone: Set(None),
            gender: Set(None),
            role: Set(Role::Student),
            password_hash: Set(Some(new_user.password_hash)),
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
        .insert(self.db)
        .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        let user = user::Entity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db)
            .await?;
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<user::Model> {
        user::Entity::find_by_id(user_id)
            .one(self.db)
            .await?
            .ok_or_else(|| {
                warn!(%user_id, "User not found");
                DomainError::not_found("User", user_id)
            })
    }

    #[instrument(skip(self, changes))]
    pub async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> Result<user::Model> {
        let user = self.get_user(user_id).await?;

        if let Some(visibility) = changes.visibility.as_deref() {
            if visibility != "PUBLIC" && visibility != "PRIVATE" {
                return Err(DomainError::Validation(
                    "Visibility must be PUBLIC or PRIVATE".to_string(),
                ));
            }
        }

        let mut active = user.into_active_model();
        if let Some(username) = changes.username {
            active.username = Set(Some(username));
        }
        if let Some(full_name) = changes.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(avatar_url) = changes.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(whatsapp_phone) = changes.whatsapp_phone {
            active.whatsapp_phone = Set(Some(whatsapp_phone));
        }
        if let Some(gender) = changes.gender {
            active.gender = Set(Some(gender));
        }
        if let Some(visibility) = changes.visibility {
            active.visibility = Set(visibility);
        }
        active.updated_at = Set(Utc::now());
        let user = active.update(self.db).await?;

        info!(%user_id, "Profile updated");
        Ok(user)
    }

    /// Direct role assignment, outside the verification workflow. Used by
    /// operators to bootstrap the first admin.
    #[instrument(skip(self))]
    pub async fn grant_role(&self, email: &str, role: Role) -> Result<user::Model> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("No user with email {}", email)))?;

        let mut active = user.into_active_model();
        active.role = Set(role);
        active.updated_at = Set(Utc::now());
        let user = active.update(self.db).await?;

        info!(user_id = %user.id, ?role, "Role granted");
        Ok(user)
    }

    /// Admin confirmation of a user's email address.
    #[instrument(skip(self))]
    pub async fn set_email_verified(&self, user_id: Uuid, email_verified: bool) -> Result<user::Model> {
        let user = self.get_user(user_id).await?;

        let mut active = user.into_active_model();
        active.email_verified = Set(email_verified);
        active.updated_at = Set(Utc::now());
        let user = active.update(self.db).await?;

        info!(%user_id, email_verified, "Email verification updated");
        Ok(user)
    }

    /// Newest accounts first.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<user::Model>> {
        let users = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(self.db)
            .await?;
        debug!(count = users.len(), "Users loaded");
        Ok(users)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: Uuid) -> Result<user::Model> {
        let user = self.get_user(user_id).await?;
        user.clone().delete(self.db).await?;
        info!(%user_id, "User deleted");
        Ok(user)
    }

    /// Number of accounts per role. Roles nobody holds are absent.
    #[instrument(skip(self))]
    pub async fn user_stats(&self) -> Result<BTreeMap<String, i64>> {
        let rows: Vec<(Role, i64)> = user::Entity::find()
            .select_only()
            .column(user::Column::Role)
            .column_as(Expr::col(user::Column::Id).count(), "count")
            .group_by(user::Column::Role)
            .into_tuple()
            .all(self.db)
            .await?;

        let stats = rows
            .into_iter()
            .map(|(role, count)| (format!("{:?}", role), count))
            .collect();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create_hostel, create_user, setup_db};
    use model::entities::hostel;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            full_name: "Jane Doe".to_string(),
            email: email.to_string(),
            username: None,
            phone: None,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_normalises_email_and_rejects_duplicates() {
        let db = setup_db().await;
        let service = UserService::new(&db);

        let user = service.register(new_user(" Jane@Example.com ")).await.unwrap();
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.account_status, AccountStatus::Active);
        assert_eq!(user.identity_verification_status, VerificationStatus::NotSubmitted);

        assert!(matches!(
            service.register(new_user("jane@example.com")).await,
            Err(DomainError::Conflict(_))
        ));
        assert!(service.find_by_email("JANE@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let db = setup_db().await;
        let student = create_user(&db, "s@example.com", Role::Student).await;
        let service = UserService::new(&db);

        let user = service
            .update_profile(
                student.id,
                ProfileChanges {
                    bio: Some("Second year".to_string()),
                    gender: Some(Gender::Female),
                    visibility: Some("PRIVATE".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(user.bio.as_deref(), Some("Second year"));
        assert_eq!(user.gender, Some(Gender::Female));
        assert_eq!(user.visibility, "PRIVATE");
        assert_eq!(user.full_name, student.full_name);

        assert!(matches!(
            service
                .update_profile(
                    student.id,
                    ProfileChanges {
                        visibility: Some("HIDDEN".to_string()),
                        ..Default::default()
                    },
                )
                .await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_confirms_email() {
        let db = setup_db().await;
        let student = create_user(&db, "s@example.com", Role::Student).await;
        let service = UserService::new(&db);
        assert!(!student.email_verified);

        let user = service.set_email_verified(student.id, true).await.unwrap();
        assert!(user.email_verified);
        assert!(service.get_user(student.id).await.unwrap().email_verified);

        let user = service.set_email_verified(student.id, false).await.unwrap();
        assert!(!user.email_verified);

        assert!(matches!(
            service.set_email_verified(Uuid::new_v4(), true).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stats_listing_and_delete() {
        let db = setup_db().await;
        let owner = create_user(&db, "o@example.com", Role::Owner).await;
        create_user(&db, "a@example.com", Role::Student).await;
        create_user(&db, "b@example.com", Role::Student).await;
        create_hostel(&db, owner.id, "Sunrise").await;
        let service = UserService::new(&db);

        let stats = service.user_stats().await.unwrap();
        assert_eq!(stats.get("Student"), Some(&2));
        assert_eq!(stats.get("Owner"), Some(&1));
        assert_eq!(stats.get("Admin"), None);

        let users = service.list_users().await.unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].email, "b@example.com");

        service.delete_user(owner.id).await.unwrap();
        assert!(hostel::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(matches!(
            service.delete_user(owner.id).await,
            Err(DomainError::NotFound(_))
        ));

        let admin = service.grant_role("a@example.com", Role::Admin).await.unwrap();
        assert_eq!(admin.role, Role::Admin);
    }
}
