//! Room occupancy and its derived status.
//!
//! `occupied_slots` only moves through a single conditional `UPDATE`, so two
//! concurrent bookings cannot both read the same count and lose one of the
//! increments. The status follows in the same transaction.

use model::entities::room::{self, RoomStatus};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use crate::error::{DomainError, Result};

/// Direction of an occupancy change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDelta {
    /// A slot was taken (booking created)
    Increment,
    /// A slot was released (booking cancelled)
    Decrement,
}

impl SlotDelta {
    pub fn as_i32(self) -> i32 {
        match self {
            SlotDelta::Increment => 1,
            SlotDelta::Decrement => -1,
        }
    }
}

/// Status a room should carry after its slot count changed.
///
/// A manual `Maintenance` override survives slot changes; otherwise the
/// status is derived from the counts.
pub fn derived_status(current: RoomStatus, occupied_slots: i32, total_slots: i32) -> RoomStatus {
    match current {
        RoomStatus::Maintenance => RoomStatus::Maintenance,
        _ => RoomStatus::from_slots(occupied_slots, total_slots),
    }
}

pub struct OccupancyTracker<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OccupancyTracker<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Moves `occupied_slots` by one and recomputes the status, atomically.
    ///
    /// Fails with `NotFound` for an unknown room and with `PreconditionFailed`
    /// when the move would leave `[0, total_slots]`; nothing is written then.
    #[instrument(skip(self))]
    pub async fn adjust_occupancy(&self, room_id: Uuid, delta: SlotDelta) -> Result<room::Model> {
        let txn = self.db.begin().await?;
        let room = adjust_occupancy_in(&txn, room_id, delta).await?;
        txn.commit().await?;
        Ok(room)
    }

    /// Manual status override, stored exactly as requested. Does not touch
    /// `occupied_slots`; the next slot change recomputes the status unless it
    /// is `Maintenance`.
    #[instrument(skip(self))]
    pub async fn set_status(&self, room_id: Uuid, status: RoomStatus) -> Result<room::Model> {
        trace!("Setting room status");

        let room = room::Entity::find_by_id(room_id)
            .one(self.db)
            .await?
            .ok_or_else(|| {
                warn!(%room_id, "Room not found");
                DomainError::not_found("Room", room_id)
            })?;

        if status != RoomStatus::from_slots(room.occupied_slots, room.total_slots) {
            debug!(requested = ?status, occupied = room.occupied_slots, total = room.total_slots, "Status differs from the slot count");
        }

        let mut active = room.into_active_model();
        active.status = Set(status);
        let room = active.update(self.db).await?;

        info!(%room_id, status = ?room.status, "Room status updated");
        Ok(room)
    }
}

/// [`OccupancyTracker::adjust_occupancy`] on a caller-owned connection or
/// transaction, for flows that must commit the change together with their
/// own writes.
pub async fn adjust_occupancy_in<C>(conn: &C, room_id: Uuid, delta: SlotDelta) -> Result<room::Model>
where
    C: ConnectionTrait,
{
    debug!(%room_id, ?delta, "Adjusting occupancy");

    let occupied = Expr::col(room::Column::OccupiedSlots);
    let update = room::Entity::update_many().filter(room::Column::Id.eq(room_id));
    let update = match delta {
        SlotDelta::Increment => update
            .col_expr(room::Column::OccupiedSlots, occupied.add(1))
            .filter(Expr::col(room::Column::OccupiedSlots).lt(Expr::col(room::Column::TotalSlots))),
        SlotDelta::Decrement => update
            .col_expr(room::Column::OccupiedSlots, occupied.sub(1))
            .filter(room::Column::OccupiedSlots.gt(0)),
    };
    let outcome = update.exec(conn).await?;

    let room = room::Entity::find_by_id(room_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            warn!(%room_id, "Room not found");
            DomainError::not_found("Room", room_id)
        })?;

    if outcome.rows_affected == 0 {
        let reason = match delta {
            SlotDelta::Increment => "Room is fully occupied",
            SlotDelta::Decrement => "Room has no occupied slots to release",
        };
        warn!(
            %room_id,
            occupied = room.occupied_slots,
            total = room.total_slots,
            reason,
            "Occupancy change refused"
        );
        return Err(DomainError::PreconditionFailed(reason.to_string()));
    }

    let status = derived_status(room.status, room.occupied_slots, room.total_slots);
    let room = if status != room.status {
        let mut active = room.into_active_model();
        active.status = Set(status);
        active.update(conn).await?
    } else {
        room
    };

    info!(
        %room_id,
        occupied = room.occupied_slots,
        total = room.total_slots,
        status = ?room.status,
        "Occupancy adjusted"
    );
    Ok(room)
}
