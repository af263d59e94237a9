use crate::auth::{hash_password, issue_token, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::handlers::users::UserResponse;
use crate::notify::{Notification, NotificationKind};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use domain::DomainError;
use domain::users::{NewUser, UserService};
use model::entities::user::AccountStatus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating an account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 255))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 3, max = 255))]
    pub username: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Bearer token plus the account it was issued for
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Create a student account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created successfully", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<RegisterRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    trace!("Entering register function");

    let password_hash = hash_password(&request.password)?;
    let user = UserService::new(&state.db)
        .register(NewUser {
            full_name: request.full_name,
            email: request.email,
            username: request.username,
            phone: request.phone,
            password_hash,
        })
        .await?;

    state.notifier.dispatch(Notification {
        recipient: user.email.clone(),
        name: user.full_name.clone(),
        subject: "Welcome to Unihaven".to_string(),
        message: "Your account is ready. Browse hostels near your campus and book a room.".to_string(),
        html: None,
        kind: NotificationKind::Welcome,
    });

    let token = issue_token(&user, &state.config)?;
    info!(user_id = %user.id, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            AuthResponse {
                token,
                user: UserResponse::from(user),
            },
            "Account created successfully",
        )),
    ))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Wrong email or password", body = ErrorResponse),
        (status = 403, description = "Account suspended, banned or deactivated", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<LoginRequest>>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    trace!("Entering login function");

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = UserService::new(&state.db)
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| {
            debug!("Unknown email");
            invalid()
        })?;

    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
    if !verify_password(&request.password, hash)? {
        warn!(user_id = %user.id, "Wrong password");
        return Err(invalid());
    }

    match user.account_status {
        AccountStatus::Active | AccountStatus::Pending => {}
        status => {
            warn!(user_id = %user.id, ?status, "Login refused for moderated account");
            return Err(DomainError::Forbidden(format!("Account is {:?}", status)).into());
        }
    }

    let token = issue_token(&user, &state.config)?;
    info!(user_id = %user.id, role = ?user.role, "User logged in");

    Ok(Json(ApiResponse::ok(
        AuthResponse {
            token,
            user: UserResponse::from(user),
        },
        "Login successful",
    )))
}
