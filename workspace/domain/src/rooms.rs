use model::entities::room::{self, BillingCycle, RoomStatus, RoomType};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, IntoActiveModel,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use crate::error::{DomainError, Result};
use crate::occupancy::derived_status;

#[derive(Debug, Clone)]
pub struct NewRoom {
    pub hostel_id: Uuid,
    pub label: String,
    pub floor: Option<String>,
    pub block: Option<String>,
    pub room_type: RoomType,
    pub price: Decimal,
    pub billing_cycle: BillingCycle,
    pub total_slots: i32,
}

#[derive(Debug, Clone, Default)]
pub struct RoomChanges {
    pub label: Option<String>,
    pub floor: Option<String>,
    pub block: Option<String>,
    pub room_type: Option<RoomType>,
    pub price: Option<Decimal>,
    pub billing_cycle: Option<BillingCycle>,
    pub total_slots: Option<i32>,
}

/// Capacity summary of one hostel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomStats {
    pub room_count: i64,
    pub total_capacity: i64,
    pub total_occupied: i64,
}

#[derive(Debug, FromQueryResult)]
struct RoomStatsRow {
    room_count: i64,
    total_capacity: Option<i64>,
    total_occupied: Option<i64>,
}

fn check_price(price: Decimal) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(DomainError::Validation(
            "Price must be a valid positive number".to_string(),
        ));
    }
    Ok(())
}

fn check_total_slots(total_slots: i32) -> Result<()> {
    if total_slots < 1 {
        return Err(DomainError::Validation(
            "At least 1 slot is required".to_string(),
        ));
    }
    Ok(())
}

pub struct RoomService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RoomService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// New rooms start empty and `Available`.
    #[instrument(skip(self, new_room), fields(hostel_id = %new_room.hostel_id))]
    pub async fn create_room(&self, new_room: NewRoom) -> Result<room::Model> {
        trace!("Creating room");
        check_price(new_room.price)?;
        check_total_slots(new_room.total_slots)?;

        let room = room::ActiveModel {
            id: Set(Uuid::new_v4()),
            hostel_id: Set(new_room.hostel_id),
            label: Set(new_room.label),
            floor: Set(new_room.floor),
            block: Set(new_room.block),
            room_type: Set(new_room.room_type),
            price: Set(new_room.price),
            billing_cycle: Set(new_room.billing_cycle),
            total_slots: Set(new_room.total_slots),
            occupied_slots: Set(0),
            status: Set(RoomStatus::Available),
        }
        .insert(self.db)
        .await?;

        info!(room_id = %room.id, label = %room.label, "Room created");
        Ok(room)
    }

    pub async fn get_room(&self, room_id: Uuid) -> Result<room::Model> {
        room::Entity::find_by_id(room_id)
            .one(self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", room_id))
    }

    /// Every room of a hostel, grouped by block and floor.
    #[instrument(skip(self))]
    pub async fn list_rooms(&self, hostel_id: Uuid) -> Result<Vec<room::Model>> {
        let rooms = room::Entity::find()
            .filter(room::Column::HostelId.eq(hostel_id))
            .order_by_asc(room::Column::Block)
            .order_by_asc(room::Column::Floor)
            .order_by_asc(room::Column::Label)
            .all(self.db)
            .await?;
        debug!(count = rooms.len(), "Rooms loaded");
        Ok(rooms)
    }

    /// Rooms that are `Available` and still have a free slot.
    #[instrument(skip(self))]
    pub async fn available_rooms(&self, hostel_id: Uuid) -> Result<Vec<room::Model>> {
        let rooms = room::Entity::find()
            .filter(room::Column::HostelId.eq(hostel_id))
            .filter(room::Column::Status.eq(RoomStatus::Available))
            .filter(Expr::col(room::Column::OccupiedSlots).lt(Expr::col(room::Column::TotalSlots)))
            .order_by_asc(room::Column::Block)
            .order_by_asc(room::Column::Floor)
            .order_by_asc(room::Column::Label)
            .all(self.db)
            .await?;
        debug!(count = rooms.len(), "Available rooms loaded");
        Ok(rooms)
    }

    /// Partial update of a room's details. Occupancy is not editable here;
    /// shrinking `total_slots` below the current occupancy is refused.
    #[instrument(skip(self, changes))]
    pub async fn update_room(&self, room_id: Uuid, hostel_id: Uuid, changes: RoomChanges) -> Result<room::Model> {
        trace!("Updating room");

        if let Some(price) = changes.price {
            check_price(price)?;
        }
        if let Some(total_slots) = changes.total_slots {
            check_total_slots(total_slots)?;
        }

        let txn = self.db.begin().await?;
        let room = find_in_hostel(&txn, room_id, hostel_id).await?;

        let total_slots = changes.total_slots.unwrap_or(room.total_slots);
        if total_slots < room.occupied_slots {
            warn!(%room_id, total_slots, occupied = room.occupied_slots, "Capacity below occupancy");
            return Err(DomainError::PreconditionFailed(format!(
                "Room has {} occupied slots; capacity cannot drop to {}",
                room.occupied_slots, total_slots
            )));
        }
        let status = derived_status(room.status, room.occupied_slots, total_slots);

        let mut active = room.into_active_model();
        if let Some(label) = changes.label {
            active.label = Set(label);
        }
        if let Some(floor) = changes.floor {
            active.floor = Set(Some(floor));
        }
        if let Some(block) = changes.block {
            active.block = Set(Some(block));
        }
        if let Some(room_type) = changes.room_type {
            active.room_type = Set(room_type);
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(billing_cycle) = changes.billing_cycle {
            active.billing_cycle = Set(billing_cycle);
        }
        active.total_slots = Set(total_slots);
        active.status = Set(status);
        let room = active.update(&txn).await?;

        txn.commit().await?;

        info!(%room_id, "Room updated");
        Ok(room)
    }

    #[instrument(skip(self))]
    pub async fn delete_room(&self, room_id: Uuid, hostel_id: Uuid) -> Result<room::Model> {
        let room = find_in_hostel(self.db, room_id, hostel_id).await?;
        room.clone().delete(self.db).await?;
        info!(%room_id, %hostel_id, "Room deleted");
        Ok(room)
    }

    #[instrument(skip(self))]
    pub async fn room_stats(&self, hostel_id: Uuid) -> Result<RoomStats> {
        let row = room::Entity::find()
            .select_only()
            .column_as(Expr::col(room::Column::Id).count(), "room_count")
            .column_as(Expr::col(room::Column::TotalSlots).sum(), "total_capacity")
            .column_as(Expr::col(room::Column::OccupiedSlots).sum(), "total_occupied")
            .filter(room::Column::HostelId.eq(hostel_id))
            .into_model::<RoomStatsRow>()
            .one(self.db)
            .await?;

        let stats = match row {
            Some(row) => RoomStats {
                room_count: row.room_count,
                total_capacity: row.total_capacity.unwrap_or(0),
                total_occupied: row.total_occupied.unwrap_or(0),
            },
            None => RoomStats {
                room_count: 0,
                total_capacity: 0,
                total_occupied: 0,
            },
        };
        debug!(?stats, "Room stats computed");
        Ok(stats)
    }
}

async fn find_in_hostel<C>(conn: &C, room_id: Uuid, hostel_id: Uuid) -> Result<room::Model>
where
    C: sea_orm::ConnectionTrait,
{
    room::Entity::find_by_id(room_id)
        .filter(room::Column::HostelId.eq(hostel_id))
        .one(conn)
        .await?
        .ok_or_else(|| {
            warn!(%room_id, %hostel_id, "Room not found in hostel");
            DomainError::NotFound(format!("Room {} not found in hostel {}", room_id, hostel_id))
        })
}
