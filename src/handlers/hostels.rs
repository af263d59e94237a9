use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use domain::authz::{ADMIN, OWNER_OR_ADMIN};
use domain::hostels::{HostelFilter, HostelService, NewHostel};
use model::entities::hostel::{self, GenderPolicy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Request body for listing a hostel
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateHostelRequest {
    #[validate(length(min = 3, max = 255))]
    pub name: String,
    #[validate(length(min = 2, max = 255))]
    pub campus: String,
    #[validate(length(min = 5, max = 500))]
    pub address: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub policy: GenderPolicy,
}

/// Request body for an admin (un)verifying a listing
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VerifyHostelRequest {
    pub is_verified: bool,
}

/// Filters for the public hostel listing
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HostelQuery {
    pub campus: Option<String>,
    pub policy: Option<GenderPolicy>,
    pub is_verified: Option<bool>,
    /// Matched against name, campus and address
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HostelResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub campus: String,
    pub address: String,
    pub description: Option<String>,
    pub policy: GenderPolicy,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<hostel::Model> for HostelResponse {
    fn from(model: hostel::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            campus: model.campus,
            address: model.address,
            description: model.description,
            policy: model.policy,
            is_verified: model.is_verified,
            created_at: model.created_at,
        }
    }
}

/// List a new hostel owned by the caller
#[utoipa::path(
    post,
    path = "/api/hostels",
    tag = "hostels",
    request_body = CreateHostelRequest,
    responses(
        (status = 201, description = "Hostel created successfully", body = ApiResponse<HostelResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Owners and admins only", body = ErrorResponse),
        (status = 409, description = "Same name already listed at this address", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn create_hostel(
    State(state): State<AppState>,
    caller: CurrentUser,
    Valid(Json(request)): Valid<Json<CreateHostelRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<HostelResponse>>)> {
    trace!("Entering create_hostel function");
    let actor = caller.require(OWNER_OR_ADMIN)?;
    debug!("Creating hostel '{}' on campus {}", request.name, request.campus);

    let hostel = HostelService::new(&state.db)
        .create_hostel(
            actor.id,
            NewHostel {
                name: request.name,
                campus: request.campus,
                address: request.address,
                description: request.description,
                policy: request.policy,
            },
        )
        .await?;

    info!("Hostel created successfully with ID: {}", hostel.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            HostelResponse::from(hostel),
            "Hostel created successfully",
        )),
    ))
}

/// Public hostel listing
#[utoipa::path(
    get,
    path = "/api/hostels",
    tag = "hostels",
    params(HostelQuery),
    responses(
        (status = 200, description = "Hostels retrieved successfully", body = ApiResponse<Vec<HostelResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_hostels(
    State(state): State<AppState>,
    Query(query): Query<HostelQuery>,
) -> ApiResult<Json<ApiResponse<Vec<HostelResponse>>>> {
    trace!("Entering list_hostels function");

    let hostels = HostelService::new(&state.db)
        .list_hostels(HostelFilter {
            campus: query.campus,
            policy: query.policy,
            is_verified: query.is_verified,
            search: query.search,
        })
        .await?;
    debug!("Retrieved {} hostels", hostels.len());

    Ok(Json(ApiResponse::ok(
        hostels.into_iter().map(HostelResponse::from).collect(),
        "Hostels retrieved successfully",
    )))
}

/// Get a hostel by ID
#[utoipa::path(
    get,
    path = "/api/hostels/{id}",
    tag = "hostels",
    params(("id" = Uuid, Path, description = "Hostel ID")),
    responses(
        (status = 200, description = "Hostel retrieved successfully", body = ApiResponse<HostelResponse>),
        (status = 404, description = "Hostel not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_hostel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<HostelResponse>>> {
    let hostel = HostelService::new(&state.db).get_hostel(id).await?;
    Ok(Json(ApiResponse::ok(
        HostelResponse::from(hostel),
        "Hostel retrieved successfully",
    )))
}

/// Delete a hostel with its rooms, media and reviews
#[utoipa::path(
    delete,
    path = "/api/hostels/{id}",
    tag = "hostels",
    params(("id" = Uuid, Path, description = "Hostel ID")),
    responses(
        (status = 200, description = "Hostel deleted successfully", body = ApiResponse<HostelResponse>),
        (status = 403, description = "Only the owner or an admin may delete", body = ErrorResponse),
        (status = 404, description = "Hostel not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn delete_hostel(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<HostelResponse>>> {
    trace!("Entering delete_hostel function for hostel_id: {}", id);

    let hostel = HostelService::new(&state.db)
        .delete_hostel(id, &caller.actor())
        .await?;
    state.gallery_cache.invalidate(id).await;

    info!("Hostel {} deleted", id);
    Ok(Json(ApiResponse::ok(
        HostelResponse::from(hostel),
        "Hostel deleted successfully",
    )))
}

/// Mark a listing as verified or unverified
#[utoipa::path(
    patch,
    path = "/api/hostels/verify/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Hostel ID")),
    request_body = VerifyHostelRequest,
    responses(
        (status = 200, description = "Hostel verification updated", body = ApiResponse<HostelResponse>),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "Hostel not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn verify_hostel(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<VerifyHostelRequest>,
) -> ApiResult<Json<ApiResponse<HostelResponse>>> {
    trace!("Entering verify_hostel function for hostel_id: {}", id);
    caller.require(ADMIN)?;

    let hostel = HostelService::new(&state.db)
        .set_verified(id, request.is_verified)
        .await?;

    let message = format!("Hostel verification set to {}", hostel.is_verified);
    info!("{} for hostel {}", message, id);
    Ok(Json(ApiResponse::ok(HostelResponse::from(hostel), message)))
}
