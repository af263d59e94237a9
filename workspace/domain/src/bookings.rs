//! The booking flow that drives room occupancy.

use chrono::Utc;
use model::entities::booking::{self, BookingStatus};
use model::entities::hostel;
use model::entities::room::{self, RoomStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument, trace, warn};
use uuid::Uuid;

use crate::authz::{Actor, ManagedResource, can_manage};
use crate::error::{DomainError, Result};
use crate::occupancy::{SlotDelta, adjust_occupancy_in};

pub struct BookingService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BookingService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Takes a slot in `room_id` and records a pending booking, both or
    /// neither.
    #[instrument(skip(self))]
    pub async fn create_booking(&self, student_id: Uuid, room_id: Uuid) -> Result<booking::Model> {
        trace!("Creating booking");

        let txn = self.db.begin().await?;

        let room = room::Entity::find_by_id(room_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", room_id))?;
        if room.status == RoomStatus::Maintenance {
            warn!(%room_id, "Booking refused: room under maintenance");
            return Err(DomainError::PreconditionFailed(
                "Room is under maintenance".to_string(),
            ));
        }

        adjust_occupancy_in(&txn, room_id, SlotDelta::Increment).await?;

        let booking = booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            room_id: Set(room_id),
            status: Set(BookingStatus::Pending),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(booking_id = %booking.id, %room_id, %student_id, "Booking created");
        Ok(booking)
    }

    /// Cancels a booking and releases its slot.
    ///
    /// The student who booked may cancel, as may anyone who can manage the
    /// room's hostel.
    #[instrument(skip(self))]
    pub async fn cancel_booking(&self, booking_id: Uuid, actor: &Actor) -> Result<booking::Model> {
        trace!("Cancelling booking");

        let txn = self.db.begin().await?;

        let (booking, room) = booking::Entity::find_by_id(booking_id)
            .find_also_related(room::Entity)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", booking_id))?;

        if booking.student_id != actor.id {
            let owner_id = match room {
                Some(room) => hostel::Entity::find_by_id(room.hostel_id)
                    .one(&txn)
                    .await?
                    .map(|hostel| hostel.owner_id),
                None => None,
            };
            let allowed = owner_id
                .map(|owner_id| can_manage(actor, owner_id, ManagedResource::Booking))
                .unwrap_or(actor.is_admin());
            if !allowed {
                warn!(%booking_id, actor = %actor.id, "Not allowed to cancel booking");
                return Err(DomainError::Forbidden(
                    "You cannot cancel this booking".to_string(),
                ));
            }
        }

        if booking.status == BookingStatus::Cancelled {
            return Err(DomainError::PreconditionFailed(
                "Booking is already cancelled".to_string(),
            ));
        }

        let room_id = booking.room_id;
        let mut active = booking.into_active_model();
        active.status = Set(BookingStatus::Cancelled);
        let booking = active.update(&txn).await?;

        adjust_occupancy_in(&txn, room_id, SlotDelta::Decrement).await?;

        txn.commit().await?;

        info!(%booking_id, %room_id, "Booking cancelled");
        Ok(booking)
    }

    #[instrument(skip(self))]
    pub async fn bookings_of(&self, student_id: Uuid) -> Result<Vec<booking::Model>> {
        let bookings = booking::Entity::find()
            .filter(booking::Column::StudentId.eq(student_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(self.db)
            .await?;
        Ok(bookings)
    }
}
