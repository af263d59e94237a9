//! Identity verification and role promotion.
//!
//! ```text
//! NOT_SUBMITTED --submit--> PENDING --approve--> APPROVED (role := target)
//!                              ^    \--reject---> REJECTED (role := Student)
//!                              |                      |
//!                              +------ resubmit ------+
//! ```
//!
//! A caretaker can only be approved once an owner has claimed them through
//! [`VerificationService::link_caretaker`].

use chrono::Utc;
use model::entities::user::{self, AccountStatus, Role, VerificationStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use crate::error::{DomainError, Result};

pub const DEFAULT_APPROVAL_REMARKS: &str = "Verified via Admin";
pub const DEFAULT_REJECTION_REMARKS: &str = "Rejected";

/// Document references a user submits for review.
#[derive(Debug, Clone)]
pub struct IdentityDocuments {
    pub id_number: String,
    pub id_front_image_url: String,
    pub id_back_image_url: String,
    pub passport_image_url: String,
}

/// The admin's verdict on a pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn status(self) -> VerificationStatus {
        match self {
            Decision::Approved => VerificationStatus::Approved,
            Decision::Rejected => VerificationStatus::Rejected,
        }
    }
}

impl TryFrom<VerificationStatus> for Decision {
    type Error = DomainError;

    fn try_from(status: VerificationStatus) -> Result<Self> {
        match status {
            VerificationStatus::Approved => Ok(Decision::Approved),
            VerificationStatus::Rejected => Ok(Decision::Rejected),
            other => Err(DomainError::Validation(format!(
                "Decision must be APPROVED or REJECTED, got {:?}",
                other
            ))),
        }
    }
}

pub struct VerificationService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VerificationService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores the document URLs and puts the user in the review queue.
    /// Allowed from any state.
    #[instrument(skip(self, documents))]
    pub async fn submit_documents(&self, user_id: Uuid, documents: IdentityDocuments) -> Result<user::Model> {
        trace!("Submitting identity documents");

        let user = find_user(self.db, user_id).await?;
        debug!(previous = ?user.identity_verification_status, "Current verification status");

        let mut active = user.into_active_model();
        active.id_number = Set(Some(documents.id_number));
        active.id_front_image_url = Set(Some(documents.id_front_image_url));
        active.id_back_image_url = Set(Some(documents.id_back_image_url));
        active.passport_image_url = Set(Some(documents.passport_image_url));
        active.identity_verification_status = Set(VerificationStatus::Pending);
        active.updated_at = Set(Utc::now());
        let user = active.update(self.db).await?;

        info!(%user_id, "Identity documents submitted");
        Ok(user)
    }

    /// Approves or rejects a submission.
    ///
    /// Approval grants `target_role`; a caretaker must already be linked to an
    /// owner. Rejection always drops the user back to `Student`.
    #[instrument(skip(self))]
    pub async fn admin_decide(
        &self,
        user_id: Uuid,
        decision: Decision,
        target_role: Role,
        remarks: Option<String>,
    ) -> Result<user::Model> {
        trace!("Deciding identity verification");

        let txn = self.db.begin().await?;
        let user = find_user(&txn, user_id).await?;

        if decision == Decision::Approved && target_role == Role::Caretaker && user.managed_by.is_none() {
            warn!(%user_id, "Caretaker approval without an owner link");
            return Err(DomainError::PreconditionFailed(
                "Caretaker must be linked to an Owner first".to_string(),
            ));
        }

        let approved = decision == Decision::Approved;
        let remarks = remarks.filter(|r| !r.trim().is_empty()).unwrap_or_else(|| {
            if approved {
                DEFAULT_APPROVAL_REMARKS.to_string()
            } else {
                DEFAULT_REJECTION_REMARKS.to_string()
            }
        });

        let mut active = user.into_active_model();
        active.identity_verification_status = Set(decision.status());
        active.is_identity_verified = Set(approved);
        active.role = Set(if approved { target_role } else { Role::Student });
        active.verification_remarks = Set(Some(remarks));
        active.updated_at = Set(Utc::now());
        let user = active.update(&txn).await?;

        txn.commit().await?;

        info!(%user_id, ?decision, role = ?user.role, "Verification decided");
        Ok(user)
    }

    /// Points the user with `caretaker_email` at `owner_id`. Re-linking a
    /// caretaker that another owner already claimed reassigns them.
    #[instrument(skip(self))]
    pub async fn link_caretaker(&self, owner_id: Uuid, caretaker_email: &str) -> Result<user::Model> {
        trace!("Linking caretaker");

        let caretaker = user::Entity::find()
            .filter(user::Column::Email.eq(caretaker_email.trim().to_lowercase()))
            .one(self.db)
            .await?
            .ok_or_else(|| {
                warn!(email = caretaker_email, "No user with that email");
                DomainError::NotFound(format!("No user with email {}", caretaker_email))
            })?;

        if caretaker.id == owner_id {
            return Err(DomainError::Validation(
                "You cannot claim yourself as staff".to_string(),
            ));
        }
        if let Some(previous) = caretaker.managed_by.filter(|previous| *previous != owner_id) {
            debug!(%previous, "Caretaker reassigned from another owner");
        }

        let mut active = caretaker.into_active_model();
        active.managed_by = Set(Some(owner_id));
        active.updated_at = Set(Utc::now());
        let caretaker = active.update(self.db).await?;

        info!(caretaker = %caretaker.id, %owner_id, "Caretaker linked");
        Ok(caretaker)
    }

    /// Moderation. Any status may replace any other.
    #[instrument(skip(self))]
    pub async fn set_account_status(&self, user_id: Uuid, status: AccountStatus) -> Result<user::Model> {
        let user = find_user(self.db, user_id).await?;

        let mut active = user.into_active_model();
        active.account_status = Set(status);
        active.updated_at = Set(Utc::now());
        let user = active.update(self.db).await?;

        info!(%user_id, ?status, "Account status updated");
        Ok(user)
    }

    /// Review queue, most recently submitted first.
    #[instrument(skip(self))]
    pub async fn pending_verifications(&self) -> Result<Vec<user::Model>> {
        let queue = user::Entity::find()
            .filter(user::Column::IdentityVerificationStatus.eq(VerificationStatus::Pending))
            .order_by_desc(user::Column::UpdatedAt)
            .all(self.db)
            .await?;
        debug!(count = queue.len(), "Pending verifications loaded");
        Ok(queue)
    }

    /// Users an owner has claimed as staff.
    #[instrument(skip(self))]
    pub async fn caretakers_of(&self, owner_id: Uuid) -> Result<Vec<user::Model>> {
        let staff = user::Entity::find()
            .filter(user::Column::ManagedBy.eq(owner_id))
            .order_by_asc(user::Column::FullName)
            .all(self.db)
            .await?;
        Ok(staff)
    }
}

async fn find_user<C>(conn: &C, user_id: Uuid) -> Result<user::Model>
where
    C: sea_orm::ConnectionTrait,
{
    user::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            warn!(%user_id, "User not found");
            DomainError::not_found("User", user_id)
        })
}
