use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Availability of a room.
///
/// `Available` and `Full` follow the slot count; `Maintenance` is only ever set
/// by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum RoomStatus {
    #[sea_orm(string_value = "Available")]
    Available,
    #[sea_orm(string_value = "Full")]
    Full,
    #[sea_orm(string_value = "Maintenance")]
    Maintenance,
}

impl RoomStatus {
    /// Status implied by the slot count alone.
    pub fn from_slots(occupied_slots: i32, total_slots: i32) -> Self {
        if occupied_slots >= total_slots {
            RoomStatus::Full
        } else {
            RoomStatus::Available
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum RoomType {
    #[sea_orm(string_value = "Single")]
    Single,
    #[sea_orm(string_value = "Bedsitter")]
    Bedsitter,
    #[sea_orm(string_value = "One Bedroom")]
    #[serde(rename = "One Bedroom")]
    OneBedroom,
    #[sea_orm(string_value = "Two Bedroom")]
    #[serde(rename = "Two Bedroom")]
    TwoBedroom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum BillingCycle {
    #[sea_orm(string_value = "Per Month")]
    #[serde(rename = "Per Month")]
    PerMonth,
    #[sea_orm(string_value = "Per Semester")]
    #[serde(rename = "Per Semester")]
    PerSemester,
}

/// A bookable unit inside a hostel with a fixed number of slots.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub hostel_id: Uuid,
    /// e.g. "Room 101"
    pub label: String,
    pub floor: Option<String>,
    pub block: Option<String>,
    pub room_type: RoomType,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub billing_cycle: BillingCycle,
    pub total_slots: i32,
    pub occupied_slots: i32,
    pub status: RoomStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hostel::Entity",
        from = "Column::HostelId",
        to = "super::hostel::Column::Id",
        on_delete = "Cascade"
    )]
    Hostel,
    #[sea_orm(has_many = "super::booking::Entity")]
    Booking,
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

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_slot_count() {
        assert_eq!(RoomStatus::from_slots(0, 2), RoomStatus::Available);
        assert_eq!(RoomStatus::from_slots(1, 2), RoomStatus::Available);
        assert_eq!(RoomStatus::from_slots(2, 2), RoomStatus::Full);
        assert_eq!(RoomStatus::from_slots(3, 2), RoomStatus::Full);
    }
}
