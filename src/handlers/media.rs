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
use domain::authz::{MANAGEMENT, ManagedResource, OWNER_OR_ADMIN};
use domain::hostels::HostelService;
use domain::media::{DeletedMedia, MediaChanges, MediaService, NewMedia};
use model::entities::hostel_media::{self, MediaType};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct MediaItemRequest {
    #[validate(url)]
    pub url: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub is_thumbnail: bool,
}

/// A batch of uploads for one hostel
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct AddMediaRequest {
    pub hostel_id: Uuid,
    #[validate(length(min = 1, message = "At least one media item is required"), nested)]
    pub items: Vec<MediaItemRequest>,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateMediaRequest {
    /// Hostel the item must belong to
    pub hostel_id: Uuid,
    #[validate(url)]
    pub url: Option<String>,
    pub media_type: Option<MediaType>,
    /// `true` makes this the hostel's only thumbnail
    pub is_thumbnail: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaResponse {
    pub id: Uuid,
    pub hostel_id: Uuid,
    pub url: String,
    pub media_type: MediaType,
    pub is_thumbnail: bool,
    pub created_at: DateTime<Utc>,
}

impl From<hostel_media::Model> for MediaResponse {
    fn from(model: hostel_media::Model) -> Self {
        Self {
            id: model.id,
            hostel_id: model.hostel_id,
            url: model.url,
            media_type: model.media_type,
            is_thumbnail: model.is_thumbnail,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteMediaResponse {
    pub removed: MediaResponse,
    /// Item that took over as thumbnail, if the removed one was it
    pub promoted: Option<MediaResponse>,
}

impl From<DeletedMedia> for DeleteMediaResponse {
    fn from(deleted: DeletedMedia) -> Self {
        Self {
            removed: MediaResponse::from(deleted.removed),
            promoted: deleted.promoted.map(MediaResponse::from),
        }
    }
}

/// A hostel's gallery, thumbnail first
#[utoipa::path(
    get,
    path = "/api/media/{hostel_id}",
    tag = "media",
    params(("hostel_id" = Uuid, Path, description = "Hostel ID")),
    responses(
        (status = 200, description = "Gallery retrieved successfully", body = ApiResponse<Vec<MediaResponse>>)
    )
)]
#[instrument(skip(state))]
pub async fn get_gallery(
    State(state): State<AppState>,
    Path(hostel_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<MediaResponse>>>> {
    trace!("Entering get_gallery function");

    let items = state
        .gallery_cache
        .get_or_load(hostel_id, || async { MediaService::new(&state.db).gallery(hostel_id).await })
        .await?;

    Ok(Json(ApiResponse::ok(
        items.into_iter().map(MediaResponse::from).collect(),
        "Gallery retrieved successfully",
    )))
}

/// Upload a batch of media items
#[utoipa::path(
    post,
    path = "/api/media",
    tag = "media",
    request_body = AddMediaRequest,
    responses(
        (status = 201, description = "Media added successfully", body = ApiResponse<Vec<MediaResponse>>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller cannot manage this hostel", body = ErrorResponse),
        (status = 404, description = "Hostel not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn add_media(
    State(state): State<AppState>,
    caller: CurrentUser,
    Valid(Json(request)): Valid<Json<AddMediaRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vec<MediaResponse>>>)> {
    trace!("Entering add_media function");
    let actor = caller.require(MANAGEMENT)?;
    HostelService::new(&state.db)
        .authorize(&actor, request.hostel_id, ManagedResource::MediaWrite)
        .await?;

    let hostel_id = request.hostel_id;
    debug!("Adding {} media items to hostel {}", request.items.len(), hostel_id);
    let items = request
        .items
        .into_iter()
        .map(|item| NewMedia {
            url: item.url,
            media_type: item.media_type,
            is_thumbnail: item.is_thumbnail,
        })
        .collect();

    let added = MediaService::new(&state.db).add_media(hostel_id, items).await?;
    state.gallery_cache.invalidate(hostel_id).await;

    info!("Added {} media items to hostel {}", added.len(), hostel_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            added.into_iter().map(MediaResponse::from).collect(),
            "Media added successfully",
        )),
    ))
}

/// Replace a media item or make it the thumbnail
#[utoipa::path(
    patch,
    path = "/api/media/{media_id}",
    tag = "media",
    params(("media_id" = Uuid, Path, description = "Media ID")),
    request_body = UpdateMediaRequest,
    responses(
        (status = 200, description = "Media updated successfully", body = ApiResponse<MediaResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller cannot manage this hostel", body = ErrorResponse),
        (status = 404, description = "Media not found in this hostel", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn update_media(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(media_id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<UpdateMediaRequest>>,
) -> ApiResult<Json<ApiResponse<MediaResponse>>> {
    trace!("Entering update_media function");
    let actor = caller.require(MANAGEMENT)?;
    HostelService::new(&state.db)
        .authorize(&actor, request.hostel_id, ManagedResource::MediaWrite)
        .await?;

    let hostel_id = request.hostel_id;
    let media = MediaService::new(&state.db)
        .update_media(
            media_id,
            hostel_id,
            MediaChanges {
                url: request.url,
                media_type: request.media_type,
                is_thumbnail: request.is_thumbnail,
            },
        )
        .await?;
    state.gallery_cache.invalidate(hostel_id).await;

    info!("Media {} updated", media_id);
    Ok(Json(ApiResponse::ok(
        MediaResponse::from(media),
        "Media updated successfully",
    )))
}

/// Remove a media item, promoting a new thumbnail if needed
#[utoipa::path(
    delete,
    path = "/api/media/{hostel_id}/{media_id}",
    tag = "media",
    params(
        ("hostel_id" = Uuid, Path, description = "Hostel ID"),
        ("media_id" = Uuid, Path, description = "Media ID"),
    ),
    responses(
        (status = 200, description = "Media deleted successfully", body = ApiResponse<DeleteMediaResponse>),
        (status = 403, description = "Only the owner or an admin may delete", body = ErrorResponse),
        (status = 404, description = "Media not found in this hostel", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn delete_media(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path((hostel_id, media_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<DeleteMediaResponse>>> {
    let actor = caller.require(OWNER_OR_ADMIN)?;
    HostelService::new(&state.db)
        .authorize(&actor, hostel_id, ManagedResource::MediaDelete)
        .await?;

    let deleted = MediaService::new(&state.db).delete_media(media_id, hostel_id).await?;
    state.gallery_cache.invalidate(hostel_id).await;

    if let Some(promoted) = &deleted.promoted {
        info!("Media {} promoted to thumbnail", promoted.id);
    }
    info!("Media {} deleted from hostel {}", media_id, hostel_id);
    Ok(Json(ApiResponse::ok(
        DeleteMediaResponse::from(deleted),
        "Media deleted successfully",
    )))
}
