use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role of a user within the marketplace.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Role {
    #[sea_orm(string_value = "Student")]
    Student,
    #[sea_orm(string_value = "Owner")]
    Owner,
    #[sea_orm(string_value = "Admin")]
    Admin,
    #[sea_orm(string_value = "Caretaker")]
    Caretaker,
}

/// Moderation state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// User can log in and use all features
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Registered but not yet verified
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Temporary ban, e.g. pending investigation
    #[sea_orm(string_value = "SUSPENDED")]
    Suspended,
    /// Permanent ban
    #[sea_orm(string_value = "BANNED")]
    Banned,
    /// Closed by the user
    #[sea_orm(string_value = "DEACTIVATED")]
    Deactivated,
}

/// Progress of the identity verification workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    #[sea_orm(string_value = "NOT_SUBMITTED")]
    NotSubmitted,
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "female")]
    Female,
    #[sea_orm(string_value = "other")]
    Other,
}

/// A person using the marketplace: student, hostel owner, caretaker or admin.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: Option<String>,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub whatsapp_phone: Option<String>,
    pub gender: Option<Gender>,
    pub role: Role,
    pub password_hash: Option<String>,
    pub email_verified: bool,
    pub is_identity_verified: bool,
    pub id_front_image_url: Option<String>,
    pub id_back_image_url: Option<String>,
    pub passport_image_url: Option<String>,
    pub id_number: Option<String>,
    pub identity_verification_status: VerificationStatus,
    pub verification_remarks: Option<String>,
    pub account_status: AccountStatus,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    /// PUBLIC or PRIVATE
    pub visibility: String,
    /// Owner this user works for. Required before a caretaker can be approved.
    pub managed_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(belongs_to = "Entity", from = "Column::ManagedBy", to = "Column::Id")]
    Manager,
    #[sea_orm(has_many = "super::hostel::Entity")]
    Hostel,
    #[sea_orm(has_many = "super::booking::Entity")]
    Booking,
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::hostel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hostel.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
