use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use domain::authz::AUTHENTICATED;
use domain::bookings::BookingService;
use model::entities::booking::{self, BookingStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateBookingRequest {
    pub room_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl From<booking::Model> for BookingResponse {
    fn from(model: booking::Model) -> Self {
        Self {
            id: model.id,
            student_id: model.student_id,
            room_id: model.room_id,
            status: model.status,
            created_at: model.created_at,
        }
    }
}

/// Book a slot in a room
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created successfully", body = ApiResponse<BookingResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 412, description = "Room is full or under maintenance", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn create_booking(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(request): Json<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<BookingResponse>>)> {
    trace!("Entering create_booking function");
    let actor = caller.require(AUTHENTICATED)?;

    let booking = BookingService::new(&state.db)
        .create_booking(actor.id, request.room_id)
        .await?;

    info!("Booking {} created for room {}", booking.id, booking.room_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            BookingResponse::from(booking),
            "Booking created successfully",
        )),
    ))
}

/// Cancel a booking and release its slot
#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/cancel",
    tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = ApiResponse<BookingResponse>),
        (status = 403, description = "Caller cannot cancel this booking", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
        (status = 412, description = "Booking already cancelled", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn cancel_booking(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<BookingResponse>>> {
    trace!("Entering cancel_booking function for booking_id: {}", id);

    let booking = BookingService::new(&state.db)
        .cancel_booking(id, &caller.actor())
        .await?;

    info!("Booking {} cancelled", id);
    Ok(Json(ApiResponse::ok(
        BookingResponse::from(booking),
        "Booking cancelled",
    )))
}

/// The caller's bookings, newest first
#[utoipa::path(
    get,
    path = "/api/bookings/mine",
    tag = "bookings",
    responses(
        (status = 200, description = "Bookings retrieved successfully", body = ApiResponse<Vec<BookingResponse>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn my_bookings(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<BookingResponse>>>> {
    let bookings = BookingService::new(&state.db).bookings_of(caller.id()).await?;
    debug!("Retrieved {} bookings", bookings.len());

    Ok(Json(ApiResponse::ok(
        bookings.into_iter().map(BookingResponse::from).collect(),
        "Bookings retrieved successfully",
    )))
}
