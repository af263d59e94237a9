//! Hostel galleries and the single-thumbnail rule.
//!
//! Every write that can change which row is the thumbnail runs in one
//! transaction: the demotion of the old thumbnail and the promotion of the new
//! one are never observable separately.

use chrono::Utc;
use model::entities::hostel;
use model::entities::hostel_media::{self, MediaType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use crate::error::{DomainError, Result};

/// One item of an upload batch.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub url: String,
    pub media_type: MediaType,
    pub is_thumbnail: bool,
}

/// Partial update of a gallery item. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct MediaChanges {
    pub url: Option<String>,
    pub media_type: Option<MediaType>,
    pub is_thumbnail: Option<bool>,
}

/// Outcome of [`MediaService::delete_media`].
#[derive(Debug, Clone)]
pub struct DeletedMedia {
    pub removed: hostel_media::Model,
    /// Item that took over as thumbnail, if the removed one was the thumbnail
    pub promoted: Option<hostel_media::Model>,
}

pub struct MediaService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MediaService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a batch of items into a hostel's gallery.
    ///
    /// When any item claims the thumbnail, the hostel's current thumbnail is
    /// demoted first. If several items claim it, the last one keeps it.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn add_media(&self, hostel_id: Uuid, items: Vec<NewMedia>) -> Result<Vec<hostel_media::Model>> {
        trace!("Adding hostel media");

        if items.is_empty() {
            return Err(DomainError::Validation(
                "At least one media item is required".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        if hostel::Entity::find_by_id(hostel_id).one(&txn).await?.is_none() {
            warn!(%hostel_id, "Hostel not found");
            return Err(DomainError::not_found("Hostel", hostel_id));
        }

        let thumbnail_index = items.iter().rposition(|item| item.is_thumbnail);
        if thumbnail_index.is_some() {
            demote_thumbnails(&txn, hostel_id).await?;
        }

        let created_at = Utc::now();
        let mut inserted = Vec::with_capacity(items.len());
        for (position, item) in items.into_iter().enumerate() {
            let media = hostel_media::ActiveModel {
                id: Set(Uuid::new_v4()),
                hostel_id: Set(hostel_id),
                url: Set(item.url),
                media_type: Set(item.media_type),
                is_thumbnail: Set(thumbnail_index == Some(position)),
                position: Set(position as i32),
                created_at: Set(created_at),
            }
            .insert(&txn)
            .await?;
            inserted.push(media);
        }

        txn.commit().await?;

        info!(%hostel_id, count = inserted.len(), "Media added");
        Ok(inserted)
    }

    /// Makes `media_id` the only thumbnail of `hostel_id`.
    #[instrument(skip(self))]
    pub async fn set_thumbnail(&self, media_id: Uuid, hostel_id: Uuid) -> Result<hostel_media::Model> {
        let txn = self.db.begin().await?;
        let media = find_in_hostel(&txn, media_id, hostel_id).await?;
        let media = promote(&txn, media).await?;
        txn.commit().await?;

        info!(%media_id, %hostel_id, "Thumbnail set");
        Ok(media)
    }

    /// Applies a partial update; `is_thumbnail = Some(true)` goes through the
    /// same demote-then-promote path as [`Self::set_thumbnail`].
    #[instrument(skip(self))]
    pub async fn update_media(
        &self,
        media_id: Uuid,
        hostel_id: Uuid,
        changes: MediaChanges,
    ) -> Result<hostel_media::Model> {
        trace!("Updating hostel media");

        let txn = self.db.begin().await?;
        let media = find_in_hostel(&txn, media_id, hostel_id).await?;

        let media = if changes.is_thumbnail == Some(true) && !media.is_thumbnail {
            promote(&txn, media).await?
        } else {
            media
        };

        let mut active = media.into_active_model();
        if let Some(url) = changes.url {
            active.url = Set(url);
        }
        if let Some(media_type) = changes.media_type {
            active.media_type = Set(media_type);
        }
        if changes.is_thumbnail == Some(false) {
            active.is_thumbnail = Set(false);
        }
        let media = active.update(&txn).await?;

        txn.commit().await?;

        info!(%media_id, %hostel_id, "Media updated");
        Ok(media)
    }

    /// Removes an item. When it was the thumbnail, the oldest remaining item
    /// of the hostel becomes the thumbnail; an empty gallery has none.
    #[instrument(skip(self))]
    pub async fn delete_media(&self, media_id: Uuid, hostel_id: Uuid) -> Result<DeletedMedia> {
        trace!("Deleting hostel media");

        let txn = self.db.begin().await?;
        let removed = find_in_hostel(&txn, media_id, hostel_id).await?;
        removed.clone().delete(&txn).await?;

        let promoted = if removed.is_thumbnail {
            let oldest = hostel_media::Entity::find()
                .filter(hostel_media::Column::HostelId.eq(hostel_id))
                .order_by_asc(hostel_media::Column::CreatedAt)
                .order_by_asc(hostel_media::Column::Position)
                .one(&txn)
                .await?;
            match oldest {
                Some(next) => {
                    debug!(promoted = %next.id, "Promoting oldest remaining item");
                    let mut active = next.into_active_model();
                    active.is_thumbnail = Set(true);
                    Some(active.update(&txn).await?)
                }
                None => None,
            }
        } else {
            None
        };

        txn.commit().await?;

        info!(%media_id, %hostel_id, promoted = promoted.is_some(), "Media deleted");
        Ok(DeletedMedia { removed, promoted })
    }

    /// The thumbnail first, then the rest in creation order.
    #[instrument(skip(self))]
    pub async fn gallery(&self, hostel_id: Uuid) -> Result<Vec<hostel_media::Model>> {
        let items = hostel_media::Entity::find()
            .filter(hostel_media::Column::HostelId.eq(hostel_id))
            .order_by_desc(hostel_media::Column::IsThumbnail)
            .order_by_asc(hostel_media::Column::CreatedAt)
            .order_by_asc(hostel_media::Column::Position)
            .all(self.db)
            .await?;

        debug!(%hostel_id, count = items.len(), "Gallery loaded");
        Ok(items)
    }
}

async fn find_in_hostel<C>(conn: &C, media_id: Uuid, hostel_id: Uuid) -> Result<hostel_media::Model>
where
    C: ConnectionTrait,
{
    hostel_media::Entity::find_by_id(media_id)
        .filter(hostel_media::Column::HostelId.eq(hostel_id))
        .one(conn)
        .await?
        .ok_or_else(|| {
            warn!(%media_id, %hostel_id, "Media not found in hostel");
            DomainError::NotFound(format!("Media {} not found in hostel {}", media_id, hostel_id))
        })
}

async fn demote_thumbnails<C>(conn: &C, hostel_id: Uuid) -> Result<u64>
where
    C: ConnectionTrait,
{
    let outcome = hostel_media::Entity::update_many()
        .col_expr(hostel_media::Column::IsThumbnail, false.into())
        .filter(hostel_media::Column::HostelId.eq(hostel_id))
        .filter(hostel_media::Column::IsThumbnail.eq(true))
        .exec(conn)
        .await?;
    debug!(%hostel_id, demoted = outcome.rows_affected, "Thumbnails demoted");
    Ok(outcome.rows_affected)
}

async fn promote<C>(conn: &C, media: hostel_media::Model) -> Result<hostel_media::Model>
where
    C: ConnectionTrait,
{
    demote_thumbnails(conn, media.hostel_id).await?;
    let mut active = media.into_active_model();
    active.is_thumbnail = Set(true);
    Ok(active.update(conn).await?)
}
