use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Who a hostel accepts as tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum GenderPolicy {
    #[sea_orm(string_value = "Male Only")]
    #[serde(rename = "Male Only")]
    MaleOnly,
    #[sea_orm(string_value = "Female Only")]
    #[serde(rename = "Female Only")]
    FemaleOnly,
    #[sea_orm(string_value = "Mixed")]
    Mixed,
}

/// A property listing. Owned by exactly one user; rooms, media, reviews and
/// amenity links are removed with it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "hostels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub campus: String,
    pub address: String,
    pub description: Option<String>,
    pub policy: GenderPolicy,
    pub is_verified: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(has_many = "super::hostel_media::Entity")]
    Media,
    #[sea_orm(has_many = "super::room::Entity")]
    Room,
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
    #[sea_orm(has_many = "super::hostel_amenity::Entity")]
    HostelAmenity,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::hostel_media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Media.def()
    }
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl Related<super::amenity::Entity> for Entity {
    fn to() -> RelationDef {
        super::hostel_amenity::Relation::Amenity.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::hostel_amenity::Relation::Hostel.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
