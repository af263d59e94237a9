use chrono::Utc;
use model::entities::hostel::{self, GenderPolicy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use crate::authz::{Actor, ManagedResource, require_manage};
use crate::error::{DomainError, Result};

#[derive(Debug, Clone)]
pub struct NewHostel {
    pub name: String,
    pub campus: String,
    pub address: String,
    pub description: Option<String>,
    pub policy: GenderPolicy,
}

/// Optional filters for the public listing.
#[derive(Debug, Clone, Default)]
pub struct HostelFilter {
    pub campus: Option<String>,
    pub policy: Option<GenderPolicy>,
    pub is_verified: Option<bool>,
    /// Matched against name, campus and address
    pub search: Option<String>,
}

pub struct HostelService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> HostelService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a new hostel for `owner_id`. The same name may not be listed
    /// twice at one address.
    #[instrument(skip(self, new_hostel), fields(name = %new_hostel.name))]
    pub async fn create_hostel(&self, owner_id: Uuid, new_hostel: NewHostel) -> Result<hostel::Model> {
        trace!("Creating hostel");

        let txn = self.db.begin().await?;

        let duplicate = hostel::Entity::find()
            .filter(hostel::Column::Name.eq(new_hostel.name.as_str()))
            .filter(hostel::Column::Address.eq(new_hostel.address.as_str()))
            .one(&txn)
            .await?;
        if duplicate.is_some() {
            warn!(address = %new_hostel.address, "Duplicate hostel listing");
            return Err(DomainError::Conflict(
                "A hostel with this name already exists at this location".to_string(),
            ));
        }

        let hostel = hostel::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            name: Set(new_hostel.name),
            campus: Set(new_hostel.campus),
            address: Set(new_hostel.address),
            description: Set(new_hostel.description),
            policy: Set(new_hostel.policy),
            is_verified: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(hostel_id = %hostel.id, %owner_id, "Hostel created");
        Ok(hostel)
    }

    pub async fn get_hostel(&self, hostel_id: Uuid) -> Result<hostel::Model> {
        hostel::Entity::find_by_id(hostel_id)
            .one(self.db)
            .await?
            .ok_or_else(|| {
                warn!(%hostel_id, "Hostel not found");
                DomainError::not_found("Hostel", hostel_id)
            })
    }

    #[instrument(skip(self))]
    pub async fn list_hostels(&self, filter: HostelFilter) -> Result<Vec<hostel::Model>> {
        let mut condition = Condition::all();
        if let Some(campus) = filter.campus {
            condition = condition.add(hostel::Column::Campus.eq(campus));
        }
        if let Some(policy) = filter.policy {
            condition = condition.add(hostel::Column::Policy.eq(policy));
        }
        if let Some(is_verified) = filter.is_verified {
            condition = condition.add(hostel::Column::IsVerified.eq(is_verified));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let search = search.trim();
            condition = condition.add(
                Condition::any()
                    .add(hostel::Column::Name.contains(search))
                    .add(hostel::Column::Campus.contains(search))
                    .add(hostel::Column::Address.contains(search)),
            );
        }

        let hostels = hostel::Entity::find()
            .filter(condition)
            .order_by_asc(hostel::Column::CreatedAt)
            .all(self.db)
            .await?;
        debug!(count = hostels.len(), "Hostels loaded");
        Ok(hostels)
    }

    /// Loads a hostel and checks that `actor` may act on it as `resource`.
    pub async fn authorize(
        &self,
        actor: &Actor,
        hostel_id: Uuid,
        resource: ManagedResource,
    ) -> Result<hostel::Model> {
        let hostel = self.get_hostel(hostel_id).await?;
        require_manage(actor, hostel.owner_id, resource)?;
        Ok(hostel)
    }

    /// Marks a listing as checked (or unchecked) by an admin. Role gating is
    /// the caller's job.
    #[instrument(skip(self))]
    pub async fn set_verified(&self, hostel_id: Uuid, is_verified: bool) -> Result<hostel::Model> {
        let hostel = self.get_hostel(hostel_id).await?;
        let mut active = hostel.into_active_model();
        active.is_verified = Set(is_verified);
        let hostel = active.update(self.db).await?;
        info!(%hostel_id, is_verified, "Hostel verification updated");
        Ok(hostel)
    }

    /// Removes a hostel with its rooms, media, reviews and amenity links.
    #[instrument(skip(self))]
    pub async fn delete_hostel(&self, hostel_id: Uuid, actor: &Actor) -> Result<hostel::Model> {
        let hostel = self.authorize(actor, hostel_id, ManagedResource::Hostel).await?;
        hostel.clone().delete(self.db).await?;
        info!(%hostel_id, "Hostel deleted");
        Ok(hostel)
    }
}
