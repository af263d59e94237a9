use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use domain::authz::{AUTHENTICATED, MANAGEMENT, ManagedResource};
use domain::hostels::HostelService;
use domain::occupancy::OccupancyTracker;
use domain::rooms::{NewRoom, RoomChanges, RoomService, RoomStats};
use model::entities::room::{self, BillingCycle, RoomStatus, RoomType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request body for adding a room to a hostel
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateRoomRequest {
    pub hostel_id: Uuid,
    /// e.g. "Room 101"
    #[validate(length(min = 1, max = 50, message = "Room label is required (e.g., Room 101)"))]
    pub label: String,
    #[validate(length(max = 20))]
    pub floor: Option<String>,
    #[validate(length(max = 50))]
    pub block: Option<String>,
    pub room_type: RoomType,
    #[schema(value_type = String, example = "4500.00")]
    pub price: Decimal,
    #[serde(default = "default_billing_cycle")]
    pub billing_cycle: BillingCycle,
    #[validate(range(min = 1, message = "At least 1 slot is required"))]
    pub total_slots: i32,
}

fn default_billing_cycle() -> BillingCycle {
    BillingCycle::PerSemester
}

/// Partial update of a room's details
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateRoomRequest {
    #[validate(length(min = 1, max = 50))]
    pub label: Option<String>,
    #[validate(length(max = 20))]
    pub floor: Option<String>,
    #[validate(length(max = 50))]
    pub block: Option<String>,
    pub room_type: Option<RoomType>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub billing_cycle: Option<BillingCycle>,
    #[validate(range(min = 1))]
    pub total_slots: Option<i32>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RoomStatusRequest {
    pub status: RoomStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoomResponse {
    pub id: Uuid,
    pub hostel_id: Uuid,
    pub label: String,
    pub floor: Option<String>,
    pub block: Option<String>,
    pub room_type: RoomType,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub billing_cycle: BillingCycle,
    pub total_slots: i32,
    pub occupied_slots: i32,
    pub status: RoomStatus,
}

impl From<room::Model> for RoomResponse {
    fn from(model: room::Model) -> Self {
        Self {
            id: model.id,
            hostel_id: model.hostel_id,
            label: model.label,
            floor: model.floor,
            block: model.block,
            room_type: model.room_type,
            price: model.price,
            billing_cycle: model.billing_cycle,
            total_slots: model.total_slots,
            occupied_slots: model.occupied_slots,
            status: model.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoomStatsResponse {
    pub room_count: i64,
    pub total_capacity: i64,
    pub total_occupied: i64,
}

impl From<RoomStats> for RoomStatsResponse {
    fn from(stats: RoomStats) -> Self {
        Self {
            room_count: stats.room_count,
            total_capacity: stats.total_capacity,
            total_occupied: stats.total_occupied,
        }
    }
}

/// Add a room to a hostel the caller manages
#[utoipa::path(
    post,
    path = "/api/rooms",
    tag = "rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created successfully", body = ApiResponse<RoomResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller cannot manage this hostel", body = ErrorResponse),
        (status = 404, description = "Hostel not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn create_room(
    State(state): State<AppState>,
    caller: CurrentUser,
    Valid(Json(request)): Valid<Json<CreateRoomRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<RoomResponse>>)> {
    trace!("Entering create_room function");
    let actor = caller.require(MANAGEMENT)?;
    HostelService::new(&state.db)
        .authorize(&actor, request.hostel_id, ManagedResource::Room)
        .await?;

    debug!("Creating room '{}' in hostel {}", request.label, request.hostel_id);
    let room = RoomService::new(&state.db)
        .create_room(NewRoom {
            hostel_id: request.hostel_id,
            label: request.label,
            floor: request.floor,
            block: request.block,
            room_type: request.room_type,
            price: request.price,
            billing_cycle: request.billing_cycle,
            total_slots: request.total_slots,
        })
        .await?;

    info!("Room created successfully with ID: {}", room.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(RoomResponse::from(room), "Room created successfully")),
    ))
}

/// All rooms of a hostel
#[utoipa::path(
    get,
    path = "/api/rooms/list/{hostel_id}",
    tag = "rooms",
    params(("hostel_id" = Uuid, Path, description = "Hostel ID")),
    responses(
        (status = 200, description = "Rooms retrieved successfully", body = ApiResponse<Vec<RoomResponse>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn list_rooms(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(hostel_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<RoomResponse>>>> {
    caller.require(AUTHENTICATED)?;

    let rooms = RoomService::new(&state.db).list_rooms(hostel_id).await?;
    debug!("Retrieved {} rooms for hostel {}", rooms.len(), hostel_id);

    Ok(Json(ApiResponse::ok(
        rooms.into_iter().map(RoomResponse::from).collect(),
        "Rooms retrieved successfully",
    )))
}

/// Rooms of a hostel that can still be booked
#[utoipa::path(
    get,
    path = "/api/rooms/available/{hostel_id}",
    tag = "rooms",
    params(("hostel_id" = Uuid, Path, description = "Hostel ID")),
    responses(
        (status = 200, description = "Available rooms retrieved successfully", body = ApiResponse<Vec<RoomResponse>>)
    )
)]
#[instrument(skip(state))]
pub async fn available_rooms(
    State(state): State<AppState>,
    Path(hostel_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<RoomResponse>>>> {
    let rooms = RoomService::new(&state.db).available_rooms(hostel_id).await?;
    debug!("{} rooms available in hostel {}", rooms.len(), hostel_id);

    Ok(Json(ApiResponse::ok(
        rooms.into_iter().map(RoomResponse::from).collect(),
        "Available rooms retrieved successfully",
    )))
}

/// Capacity summary of a hostel
#[utoipa::path(
    get,
    path = "/api/rooms/stats/{hostel_id}",
    tag = "rooms",
    params(("hostel_id" = Uuid, Path, description = "Hostel ID")),
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<RoomStatsResponse>),
        (status = 403, description = "Caller cannot manage this hostel", body = ErrorResponse),
        (status = 404, description = "Hostel not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn room_stats(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(hostel_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<RoomStatsResponse>>> {
    let actor = caller.require(MANAGEMENT)?;
    HostelService::new(&state.db)
        .authorize(&actor, hostel_id, ManagedResource::Room)
        .await?;

    let stats = RoomService::new(&state.db).room_stats(hostel_id).await?;
    Ok(Json(ApiResponse::ok(
        RoomStatsResponse::from(stats),
        "Statistics retrieved successfully",
    )))
}

/// Update a room's details
#[utoipa::path(
    patch,
    path = "/api/rooms/{hostel_id}/{room_id}",
    tag = "rooms",
    params(
        ("hostel_id" = Uuid, Path, description = "Hostel ID"),
        ("room_id" = Uuid, Path, description = "Room ID"),
    ),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Room updated successfully", body = ApiResponse<RoomResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller cannot manage this hostel", body = ErrorResponse),
        (status = 404, description = "Room not found in this hostel", body = ErrorResponse),
        (status = 412, description = "Capacity below current occupancy", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn update_room(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path((hostel_id, room_id)): Path<(Uuid, Uuid)>,
    Valid(Json(request)): Valid<Json<UpdateRoomRequest>>,
) -> ApiResult<Json<ApiResponse<RoomResponse>>> {
    trace!("Entering update_room function");
    let actor = caller.require(MANAGEMENT)?;
    HostelService::new(&state.db)
        .authorize(&actor, hostel_id, ManagedResource::Room)
        .await?;

    let room = RoomService::new(&state.db)
        .update_room(
            room_id,
            hostel_id,
            RoomChanges {
                label: request.label,
                floor: request.floor,
                block: request.block,
                room_type: request.room_type,
                price: request.price,
                billing_cycle: request.billing_cycle,
                total_slots: request.total_slots,
            },
        )
        .await?;

    info!("Room {} updated", room.id);
    Ok(Json(ApiResponse::ok(RoomResponse::from(room), "Room updated successfully")))
}

/// Remove a room from a hostel
#[utoipa::path(
    delete,
    path = "/api/rooms/{hostel_id}/{room_id}",
    tag = "rooms",
    params(
        ("hostel_id" = Uuid, Path, description = "Hostel ID"),
        ("room_id" = Uuid, Path, description = "Room ID"),
    ),
    responses(
        (status = 200, description = "Room deleted successfully", body = ApiResponse<RoomResponse>),
        (status = 403, description = "Caller cannot manage this hostel", body = ErrorResponse),
        (status = 404, description = "Room not found in this hostel", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn delete_room(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path((hostel_id, room_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<RoomResponse>>> {
    let actor = caller.require(MANAGEMENT)?;
    HostelService::new(&state.db)
        .authorize(&actor, hostel_id, ManagedResource::Room)
        .await?;

    let room = RoomService::new(&state.db).delete_room(room_id, hostel_id).await?;

    info!("Room {} deleted", room.id);
    Ok(Json(ApiResponse::ok(RoomResponse::from(room), "Room deleted successfully")))
}

/// Put a room under maintenance or release it
#[utoipa::path(
    patch,
    path = "/api/rooms/status/{room_id}",
    tag = "rooms",
    params(("room_id" = Uuid, Path, description = "Room ID")),
    request_body = RoomStatusRequest,
    responses(
        (status = 200, description = "Room status updated", body = ApiResponse<RoomResponse>),
        (status = 403, description = "Caller cannot manage this hostel", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn set_room_status(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(room_id): Path<Uuid>,
    Json(request): Json<RoomStatusRequest>,
) -> ApiResult<Json<ApiResponse<RoomResponse>>> {
    let actor = caller.require(MANAGEMENT)?;
    let room = RoomService::new(&state.db).get_room(room_id).await?;
    HostelService::new(&state.db)
        .authorize(&actor, room.hostel_id, ManagedResource::Room)
        .await?;

    debug!("Requested status {:?} for room {}", request.status, room_id);
    let room = OccupancyTracker::new(&state.db)
        .set_status(room_id, request.status)
        .await?;

    info!("Room {} is now {:?}", room.id, room.status);
    Ok(Json(ApiResponse::ok(RoomResponse::from(room), "Room status updated")))
}
