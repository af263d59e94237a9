use crate::handlers::{auth, bookings, health::health_check, hostels, media, reviews, rooms, users};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use axum_prometheus::PrometheusMetricLayer;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Hostels
        .route("/hostels", post(hostels::create_hostel).get(hostels::list_hostels))
        .route("/hostels/:id", get(hostels::get_hostel).delete(hostels::delete_hostel))
        .route("/hostels/verify/:id", patch(hostels::verify_hostel))
        // Rooms
        .route("/rooms", post(rooms::create_room))
        .route("/rooms/list/:hostel_id", get(rooms::list_rooms))
        .route("/rooms/available/:hostel_id", get(rooms::available_rooms))
        .route("/rooms/stats/:hostel_id", get(rooms::room_stats))
        .route("/rooms/status/:room_id", patch(rooms::set_room_status))
        .route(
            "/rooms/:hostel_id/:room_id",
            patch(rooms::update_room).delete(rooms::delete_room),
        )
        // Bookings
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/mine", get(bookings::my_bookings))
        .route("/bookings/:id/cancel", patch(bookings::cancel_booking))
        // Media
        .route("/media", post(media::add_media))
        // PATCH reads this segment as the media id
        .route(
            "/media/:hostel_id",
            get(media::get_gallery).patch(media::update_media),
        )
        .route("/media/:hostel_id/:media_id", delete(media::delete_media))
        // Reviews
        .route("/reviews", post(reviews::create_review))
        .route("/reviews/hostel/:hostel_id", get(reviews::hostel_reviews))
        .route("/reviews/stats/:hostel_id", get(reviews::rating_summary))
        .route("/reviews/reply/:id", patch(reviews::reply_to_review))
        // Users
        .route("/users/profile/:id", get(users::get_profile))
        .route("/users/update-me", patch(users::update_me))
        .route("/users/submit-id", post(users::submit_id))
        .route("/users/claim-staff", post(users::claim_staff))
        .route("/users/my-staff", get(users::my_staff))
        // Admin
        .route("/users/admin/pending", get(users::pending_verifications))
        .route("/users/admin/verify-user/:id", patch(users::verify_user))
        .route("/users/admin/account-status/:id", patch(users::set_account_status))
        .route("/users/admin/update-user/:id", patch(users::admin_update_user))
        .route("/users/admin/all-users", get(users::all_users))
        .route("/users/admin/stats", get(users::user_stats))
        .route("/users/admin/delete/:id", delete(users::delete_user))
}

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let metrics_enabled = state.config.metrics_enabled;

    let mut router = Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // The recorder is process-global, so it can only be installed once
    if metrics_enabled {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer);
        info!("Prometheus metrics exposed at /metrics");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
