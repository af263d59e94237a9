use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::config::AppConfig;
use crate::gallery::GalleryCache;
use crate::handlers::{auth, bookings, hostels, media, reviews, rooms, users};
use crate::notify::Notifier;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Public hostel galleries, keyed by hostel id
    pub gallery_cache: GalleryCache,
    pub config: Arc<AppConfig>,
    /// Outgoing mail
    pub notifier: Arc<Notifier>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        auth::register,
        auth::login,
        hostels::create_hostel,
        hostels::list_hostels,
        hostels::get_hostel,
        hostels::delete_hostel,
        hostels::verify_hostel,
        rooms::create_room,
        rooms::list_rooms,
        rooms::available_rooms,
        rooms::room_stats,
        rooms::update_room,
        rooms::delete_room,
        rooms::set_room_status,
        bookings::create_booking,
        bookings::cancel_booking,
        bookings::my_bookings,
        media::get_gallery,
        media::add_media,
        media::update_media,
        media::delete_media,
        reviews::create_review,
        reviews::hostel_reviews,
        reviews::rating_summary,
        reviews::reply_to_review,
        users::get_profile,
        users::update_me,
        users::submit_id,
        users::claim_staff,
        users::my_staff,
        users::pending_verifications,
        users::verify_user,
        users::set_account_status,
        users::admin_update_user,
        users::all_users,
        users::user_stats,
        users::delete_user,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            hostels::CreateHostelRequest,
            hostels::HostelResponse,
            hostels::VerifyHostelRequest,
            rooms::CreateRoomRequest,
            rooms::UpdateRoomRequest,
            rooms::RoomStatusRequest,
            rooms::RoomResponse,
            rooms::RoomStatsResponse,
            bookings::CreateBookingRequest,
            bookings::BookingResponse,
            media::MediaItemRequest,
            media::AddMediaRequest,
            media::UpdateMediaRequest,
            media::MediaResponse,
            media::DeleteMediaResponse,
            reviews::CreateReviewRequest,
            reviews::ReviewResponse,
            reviews::RatingSummaryResponse,
            reviews::ReplyReviewRequest,
            users::UserResponse,
            users::PendingVerificationResponse,
            users::AdminUpdateUserRequest,
            users::UpdateProfileRequest,
            users::SubmitIdRequest,
            users::ClaimStaffRequest,
            users::VerifyUserRequest,
            users::AccountStatusRequest,
            model::entities::user::Role,
            model::entities::user::AccountStatus,
            model::entities::user::VerificationStatus,
            model::entities::user::Gender,
            model::entities::hostel::GenderPolicy,
            model::entities::hostel_media::MediaType,
            model::entities::room::RoomStatus,
            model::entities::room::RoomType,
            model::entities::room::BillingCycle,
            model::entities::booking::BookingStatus,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "hostels", description = "Hostel listings"),
        (name = "rooms", description = "Rooms and slot occupancy"),
        (name = "bookings", description = "Room bookings"),
        (name = "media", description = "Hostel galleries"),
        (name = "reviews", description = "Hostel reviews"),
        (name = "users", description = "Profiles, identity verification and staff"),
        (name = "admin", description = "Moderation and verification queue"),
    ),
    info(
        title = "Unihaven API",
        description = "Student hostel marketplace: listings, rooms, bookings and identity verification",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
