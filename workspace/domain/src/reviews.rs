use chrono::Utc;
use model::entities::{hostel, review};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use crate::authz::{Actor, ManagedResource, require_manage};
use crate::error::{DomainError, Result};

const MAX_REPLY_LEN: usize = 500;

#[derive(Debug, Clone)]
pub struct NewReview {
    pub hostel_id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
}

/// Star badge data for a hostel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingSummary {
    /// Rounded to one decimal place; zero without reviews
    pub average_rating: Decimal,
    pub total_reviews: i64,
}

pub struct ReviewService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReviewService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// One review per user and hostel; a second one is a `Conflict`.
    #[instrument(skip(self, new_review), fields(hostel_id = %new_review.hostel_id))]
    pub async fn create_review(&self, user_id: Uuid, new_review: NewReview) -> Result<review::Model> {
        trace!("Creating review");

        if !(1..=5).contains(&new_review.rating) {
            return Err(DomainError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        if hostel::Entity::find_by_id(new_review.hostel_id)
            .one(self.db)
            .await?
            .is_none()
        {
            warn!(hostel_id = %new_review.hostel_id, "Hostel not found");
            return Err(DomainError::not_found("Hostel", new_review.hostel_id));
        }

        let now = Utc::now();
        let inserted = review::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            hostel_id: Set(new_review.hostel_id),
            rating: Set(new_review.rating),
            title: Set(new_review.title),
            comment: Set(new_review.comment),
            owner_reply: Set(None),
            replied_at: Set(None),
            is_verified: Set(false),
            helpful_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await;

        let review = match inserted.map_err(DomainError::from) {
            Err(DomainError::Conflict(_)) => {
                warn!(%user_id, "Second review of the same hostel");
                return Err(DomainError::Conflict(
                    "You have already reviewed this hostel".to_string(),
                ));
            }
            other => other?,
        };

        info!(review_id = %review.id, rating = review.rating, "Review created");
        Ok(review)
    }

    /// Stores the hostel owner's public answer to a review, replacing any
    /// earlier one. Only the owner of the reviewed hostel or an admin may reply.
    #[instrument(skip(self, actor, reply), fields(actor = %actor.id))]
    pub async fn reply_to_review(&self, review_id: Uuid, actor: &Actor, reply: &str) -> Result<review::Model> {
        trace!("Replying to review");

        let reply = reply.trim();
        if reply.is_empty() || reply.chars().count() > MAX_REPLY_LEN {
            return Err(DomainError::Validation(format!(
                "Reply must be between 1 and {} characters",
                MAX_REPLY_LEN
            )));
        }

        let (review, hostel) = review::Entity::find_by_id(review_id)
            .find_also_related(hostel::Entity)
            .one(self.db)
            .await?
            .ok_or_else(|| {
                warn!(%review_id, "Review not found");
                DomainError::not_found("Review", review_id)
            })?;
        let hostel = hostel.ok_or_else(|| DomainError::not_found("Hostel", review.hostel_id))?;
        require_manage(actor, hostel.owner_id, ManagedResource::Review)?;

        let now = Utc::now();
        let mut active = review.into_active_model();
        active.owner_reply = Set(Some(reply.to_string()));
        active.replied_at = Set(Some(now));
        active.updated_at = Set(now);
        let review = active.update(self.db).await?;

        info!(%review_id, hostel_id = %hostel.id, "Owner replied to review");
        Ok(review)
    }

    /// Newest first.
    #[instrument(skip(self))]
    pub async fn hostel_reviews(&self, hostel_id: Uuid) -> Result<Vec<review::Model>> {
        let reviews = review::Entity::find()
            .filter(review::Column::HostelId.eq(hostel_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(self.db)
            .await?;
        debug!(count = reviews.len(), "Reviews loaded");
        Ok(reviews)
    }

    #[instrument(skip(self))]
    pub async fn rating_summary(&self, hostel_id: Uuid) -> Result<RatingSummary> {
        let ratings: Vec<i32> = review::Entity::find()
            .select_only()
            .column(review::Column::Rating)
            .filter(review::Column::HostelId.eq(hostel_id))
            .into_tuple()
            .all(self.db)
            .await?;

        let total_reviews = ratings.len() as i64;
        let average_rating = if ratings.is_empty() {
            Decimal::ZERO
        } else {
            let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
            (Decimal::from(sum) / Decimal::from(total_reviews)).round_dp(1)
        };

        debug!(%average_rating, total_reviews, "Rating summary computed");
        Ok(RatingSummary {
            average_rating,
            total_reviews,
        })
    }
}
