use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use domain::authz::{AUTHENTICATED, OWNER_OR_ADMIN};
use domain::reviews::{NewReview, RatingSummary, ReviewService};
use model::entities::review;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateReviewRequest {
    pub hostel_id: Uuid,
    /// 1 to 5 stars
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Request body for the owner's answer to a review
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ReplyReviewRequest {
    #[validate(length(min = 1, max = 500, message = "Reply cannot be empty"))]
    pub owner_reply: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hostel_id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub owner_reply: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<review::Model> for ReviewResponse {
    fn from(model: review::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            hostel_id: model.hostel_id,
            rating: model.rating,
            title: model.title,
            comment: model.comment,
            owner_reply: model.owner_reply,
            replied_at: model.replied_at,
            helpful_count: model.helpful_count,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RatingSummaryResponse {
    /// One decimal place, zero without reviews
    #[schema(value_type = String, example = "4.3")]
    pub average_rating: Decimal,
    pub total_reviews: i64,
}

impl From<RatingSummary> for RatingSummaryResponse {
    fn from(summary: RatingSummary) -> Self {
        Self {
            average_rating: summary.average_rating,
            total_reviews: summary.total_reviews,
        }
    }
}

/// Review a hostel
#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = "reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created successfully", body = ApiResponse<ReviewResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Hostel not found", body = ErrorResponse),
        (status = 409, description = "Hostel already reviewed by this user", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn create_review(
    State(state): State<AppState>,
    caller: CurrentUser,
    Valid(Json(request)): Valid<Json<CreateReviewRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ReviewResponse>>)> {
    trace!("Entering create_review function");
    let actor = caller.require(AUTHENTICATED)?;

    let review = ReviewService::new(&state.db)
        .create_review(
            actor.id,
            NewReview {
                hostel_id: request.hostel_id,
                rating: request.rating,
                title: request.title,
                comment: request.comment,
            },
        )
        .await?;

    info!("Review {} created for hostel {}", review.id, review.hostel_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ReviewResponse::from(review), "Review created successfully")),
    ))
}

/// Answer a review of one of the caller's hostels
#[utoipa::path(
    patch,
    path = "/api/reviews/reply/{id}",
    tag = "reviews",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = ReplyReviewRequest,
    responses(
        (status = 200, description = "Reply saved successfully", body = ApiResponse<ReviewResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Not the owner of the reviewed hostel", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn reply_to_review(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<ReplyReviewRequest>>,
) -> ApiResult<Json<ApiResponse<ReviewResponse>>> {
    trace!("Entering reply_to_review function for review_id: {}", id);
    let actor = caller.require(OWNER_OR_ADMIN)?;

    let review = ReviewService::new(&state.db)
        .reply_to_review(id, &actor, &request.owner_reply)
        .await?;

    info!("Reply saved on review {}", id);
    Ok(Json(ApiResponse::ok(ReviewResponse::from(review), "Reply saved successfully")))
}

/// Reviews of a hostel, newest first
#[utoipa::path(
    get,
    path = "/api/reviews/hostel/{hostel_id}",
    tag = "reviews",
    params(("hostel_id" = Uuid, Path, description = "Hostel ID")),
    responses(
        (status = 200, description = "Reviews retrieved successfully", body = ApiResponse<Vec<ReviewResponse>>)
    )
)]
#[instrument(skip(state))]
pub async fn hostel_reviews(
    State(state): State<AppState>,
    Path(hostel_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<ReviewResponse>>>> {
    let reviews = ReviewService::new(&state.db).hostel_reviews(hostel_id).await?;
    debug!("Retrieved {} reviews for hostel {}", reviews.len(), hostel_id);

    Ok(Json(ApiResponse::ok(
        reviews.into_iter().map(ReviewResponse::from).collect(),
        "Reviews retrieved successfully",
    )))
}

/// Average rating and review count of a hostel
#[utoipa::path(
    get,
    path = "/api/reviews/stats/{hostel_id}",
    tag = "reviews",
    params(("hostel_id" = Uuid, Path, description = "Hostel ID")),
    responses(
        (status = 200, description = "Rating summary retrieved successfully", body = ApiResponse<RatingSummaryResponse>)
    )
)]
#[instrument(skip(state))]
pub async fn rating_summary(
    State(state): State<AppState>,
    Path(hostel_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<RatingSummaryResponse>>> {
    let summary = ReviewService::new(&state.db).rating_summary(hostel_id).await?;
    Ok(Json(ApiResponse::ok(
        RatingSummaryResponse::from(summary),
        "Rating summary retrieved successfully",
    )))
}
