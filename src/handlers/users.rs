use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::notify::{Notification, NotificationKind};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use domain::authz::{ADMIN, AUTHENTICATED, MANAGEMENT};
use domain::users::{ProfileChanges, UserService};
use domain::verification::{Decision, IdentityDocuments, VerificationService};
use model::entities::user::{self, AccountStatus, Gender, Role, VerificationStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User response model. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub whatsapp_phone: Option<String>,
    pub gender: Option<Gender>,
    pub role: Role,
    pub email_verified: bool,
    pub is_identity_verified: bool,
    pub identity_verification_status: VerificationStatus,
    pub verification_remarks: Option<String>,
    pub account_status: AccountStatus,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub visibility: String,
    /// Owner this user works for, if claimed as staff
    pub managed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            full_name: model.full_name,
            email: model.email,
            phone: model.phone,
            whatsapp_phone: model.whatsapp_phone,
            gender: model.gender,
            role: model.role,
            email_verified: model.email_verified,
            is_identity_verified: model.is_identity_verified,
            identity_verification_status: model.identity_verification_status,
            verification_remarks: model.verification_remarks,
            account_status: model.account_status,
            avatar_url: model.avatar_url,
            bio: model.bio,
            visibility: model.visibility,
            managed_by: model.managed_by,
            created_at: model.created_at,
        }
    }
}

/// Entry of the admin review queue: the user plus the submitted documents
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PendingVerificationResponse {
    pub user: UserResponse,
    pub id_number: Option<String>,
    pub id_front_image_url: Option<String>,
    pub id_back_image_url: Option<String>,
    pub passport_image_url: Option<String>,
}

impl From<user::Model> for PendingVerificationResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id_number: model.id_number.clone(),
            id_front_image_url: model.id_front_image_url.clone(),
            id_back_image_url: model.id_back_image_url.clone(),
            passport_image_url: model.passport_image_url.clone(),
            user: UserResponse::from(model),
        }
    }
}

/// Request body for self-service profile updates
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 255))]
    pub username: Option<String>,
    #[validate(length(min = 3, max = 255))]
    pub full_name: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 20))]
    pub whatsapp_phone: Option<String>,
    pub gender: Option<Gender>,
    /// PUBLIC or PRIVATE
    pub visibility: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(request: UpdateProfileRequest) -> Self {
        Self {
            username: request.username,
            full_name: request.full_name,
            avatar_url: request.avatar_url,
            bio: request.bio,
            phone: request.phone,
            whatsapp_phone: request.whatsapp_phone,
            gender: request.gender,
            visibility: request.visibility,
        }
    }
}

/// Request body for an admin correcting someone else's profile
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct AdminUpdateUserRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: UpdateProfileRequest,
    pub role: Option<Role>,
    /// Confirms (or revokes) the user's email address
    pub email_verified: Option<bool>,
}

/// Identity documents, as URLs of already uploaded images
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct SubmitIdRequest {
    #[validate(length(min = 5, message = "ID Number is required"))]
    pub id_number: String,
    #[validate(url)]
    pub id_front_image_url: String,
    #[validate(url)]
    pub id_back_image_url: String,
    #[validate(url)]
    pub passport_image_url: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ClaimStaffRequest {
    /// Email of the user to claim as caretaker
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct VerifyUserRequest {
    /// APPROVED or REJECTED
    pub status: VerificationStatus,
    /// Role granted on approval; ignored on rejection
    pub target_role: Role,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AccountStatusRequest {
    pub status: AccountStatus,
}

/// Get a user's profile
#[utoipa::path(
    get,
    path = "/api/users/profile/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn get_profile(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering get_profile function");
    caller.require(AUTHENTICATED)?;

    let user = UserService::new(&state.db).get_user(id).await?;

    // Private profiles are visible to their owner and to admins only
    if user.visibility == "PRIVATE" && user.id != caller.id() && !caller.actor().is_admin() {
        warn!(user_id = %id, "Private profile requested by another user");
        return Err(domain::DomainError::Forbidden("This profile is private".to_string()).into());
    }

    debug!(user_id = %id, "Profile retrieved");
    Ok(Json(ApiResponse::ok(
        UserResponse::from(user),
        "Profile retrieved successfully",
    )))
}

/// Update the caller's own profile
#[utoipa::path(
    patch,
    path = "/api/users/update-me",
    tag = "users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn update_me(
    State(state): State<AppState>,
    caller: CurrentUser,
    Valid(Json(request)): Valid<Json<UpdateProfileRequest>>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering update_me function");

    let user = UserService::new(&state.db)
        .update_profile(caller.id(), request.into())
        .await?;

    info!(user_id = %user.id, "Own profile updated");
    Ok(Json(ApiResponse::ok(
        UserResponse::from(user),
        "Profile updated successfully",
    )))
}

/// Submit identity documents for review
#[utoipa::path(
    post,
    path = "/api/users/submit-id",
    tag = "users",
    request_body = SubmitIdRequest,
    responses(
        (status = 200, description = "Documents submitted for review", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn submit_id(
    State(state): State<AppState>,
    caller: CurrentUser,
    Valid(Json(request)): Valid<Json<SubmitIdRequest>>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering submit_id function");

    let documents = IdentityDocuments {
        id_number: request.id_number,
        id_front_image_url: request.id_front_image_url,
        id_back_image_url: request.id_back_image_url,
        passport_image_url: request.passport_image_url,
    };
    let user = VerificationService::new(&state.db)
        .submit_documents(caller.id(), documents)
        .await?;

    info!(user_id = %user.id, "Identity documents queued for review");
    Ok(Json(ApiResponse::ok(
        UserResponse::from(user),
        "Documents submitted for review",
    )))
}

/// Claim a user as caretaker of the caller
#[utoipa::path(
    post,
    path = "/api/users/claim-staff",
    tag = "users",
    request_body = ClaimStaffRequest,
    responses(
        (status = 200, description = "Caretaker linked", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Not a management role", body = ErrorResponse),
        (status = 404, description = "No user with that email", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn claim_staff(
    State(state): State<AppState>,
    caller: CurrentUser,
    Valid(Json(request)): Valid<Json<ClaimStaffRequest>>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering claim_staff function");
    let actor = caller.require(MANAGEMENT)?;
    debug!("Claiming staff member {}", request.email);

    let caretaker = VerificationService::new(&state.db)
        .link_caretaker(actor.id, &request.email)
        .await?;

    state.notifier.dispatch(Notification {
        recipient: caretaker.email.clone(),
        name: caretaker.full_name.clone(),
        subject: "You have been added as staff".to_string(),
        message: format!(
            "{} has linked your account as a caretaker. Submit your identity documents to be approved.",
            caller.0.email
        ),
        html: None,
        kind: NotificationKind::StaffLinked,
    });

    info!(caretaker = %caretaker.id, "Staff member claimed");
    Ok(Json(ApiResponse::ok(
        UserResponse::from(caretaker),
        "Caretaker linked successfully",
    )))
}

/// List caretakers managed by the caller
#[utoipa::path(
    get,
    path = "/api/users/my-staff",
    tag = "users",
    responses(
        (status = 200, description = "Staff retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 403, description = "Not a management role", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn my_staff(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let actor = caller.require(MANAGEMENT)?;

    let staff = VerificationService::new(&state.db).caretakers_of(actor.id).await?;
    debug!("Retrieved {} staff members", staff.len());

    Ok(Json(ApiResponse::ok(
        staff.into_iter().map(UserResponse::from).collect(),
        "Staff retrieved successfully",
    )))
}

/// Users waiting for an identity decision
#[utoipa::path(
    get,
    path = "/api/users/admin/pending",
    tag = "admin",
    responses(
        (status = 200, description = "Queue retrieved successfully", body = ApiResponse<Vec<PendingVerificationResponse>>),
        (status = 403, description = "Admins only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn pending_verifications(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<PendingVerificationResponse>>>> {
    caller.require(ADMIN)?;

    let queue = VerificationService::new(&state.db).pending_verifications().await?;
    debug!("Verification queue holds {} users", queue.len());

    Ok(Json(ApiResponse::ok(
        queue.into_iter().map(PendingVerificationResponse::from).collect(),
        "Pending verifications retrieved successfully",
    )))
}

/// Approve or reject a user's identity submission
#[utoipa::path(
    patch,
    path = "/api/users/admin/verify-user/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = VerifyUserRequest,
    responses(
        (status = 200, description = "Decision recorded", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 412, description = "Caretaker is not linked to an owner", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn verify_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<VerifyUserRequest>>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering verify_user function");
    caller.require(ADMIN)?;

    let decision = Decision::try_from(request.status)?;
    debug!(user_id = %id, ?decision, target_role = ?request.target_role, "Deciding verification");

    let user = VerificationService::new(&state.db)
        .admin_decide(id, decision, request.target_role, request.remarks)
        .await?;

    let message = match decision {
        Decision::Approved => format!("Your identity has been verified. Your role is now {:?}.", user.role),
        Decision::Rejected => format!(
            "Your identity verification was rejected: {}",
            user.verification_remarks.as_deref().unwrap_or_default()
        ),
    };
    state.notifier.dispatch(Notification {
        recipient: user.email.clone(),
        name: user.full_name.clone(),
        subject: "Identity verification update".to_string(),
        message,
        html: None,
        kind: NotificationKind::VerificationDecision,
    });

    info!(user_id = %id, ?decision, "Verification decided");
    Ok(Json(ApiResponse::ok(
        UserResponse::from(user),
        "Verification decision recorded",
    )))
}

/// Moderate an account
#[utoipa::path(
    patch,
    path = "/api/users/admin/account-status/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AccountStatusRequest,
    responses(
        (status = 200, description = "Account status updated", body = ApiResponse<UserResponse>),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn set_account_status(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AccountStatusRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    caller.require(ADMIN)?;

    let user = VerificationService::new(&state.db)
        .set_account_status(id, request.status)
        .await?;

    state.notifier.dispatch(Notification {
        recipient: user.email.clone(),
        name: user.full_name.clone(),
        subject: "Account status changed".to_string(),
        message: format!("Your account status is now {:?}.", user.account_status),
        html: None,
        kind: NotificationKind::AccountStatus,
    });

    info!(user_id = %id, status = ?user.account_status, "Account moderated");
    Ok(Json(ApiResponse::ok(
        UserResponse::from(user),
        "Account status updated",
    )))
}

/// Correct another user's profile and optionally their role
#[utoipa::path(
    patch,
    path = "/api/users/admin/update-user/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.id()))]
pub async fn admin_update_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<AdminUpdateUserRequest>>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    caller.require(ADMIN)?;

    let service = UserService::new(&state.db);
    let mut user = service.update_profile(id, request.profile.into()).await?;
    if let Some(role) = request.role {
        user = service.grant_role(&user.email, role).await?;
    }
    if let Some(email_verified) = request.email_verified {
        user = service.set_email_verified(id, email_verified).await?;
    }

    info!(user_id = %id, role = ?user.role, "User updated by admin");
    Ok(Json(ApiResponse::ok(
        UserResponse::from(user),
        "User updated successfully",
    )))
}

/// List every account
#[utoipa::path(
    get,
    path = "/api/users/admin/all-users",
    tag = "admin",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 403, description = "Admins only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn all_users(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    caller.require(ADMIN)?;

    let users = UserService::new(&state.db).list_users().await?;
    info!("Successfully retrieved {} users", users.len());

    Ok(Json(ApiResponse::ok(
        users.into_iter().map(UserResponse::from).collect(),
        "Users retrieved successfully",
    )))
}

/// Number of accounts per role
#[utoipa::path(
    get,
    path = "/api/users/admin/stats",
    tag = "admin",
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<BTreeMap<String, i64>>),
        (status = 403, description = "Admins only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn user_stats(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<ApiResponse<BTreeMap<String, i64>>>> {
    caller.require(ADMIN)?;

    let stats = UserService::new(&state.db).user_stats().await?;
    debug!(?stats, "User statistics computed");

    Ok(Json(ApiResponse::ok(stats, "Statistics retrieved successfully")))
}

/// Permanently remove an account
#[utoipa::path(
    delete,
    path = "/api/users/admin/delete/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<UserResponse>),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller = %caller.id()))]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    caller.require(ADMIN)?;

    if id == caller.id() {
        return Err(ApiError::Validation("Admins cannot delete their own account".to_string()));
    }

    let user = UserService::new(&state.db).delete_user(id).await?;
    info!(user_id = %id, "User deleted");

    Ok(Json(ApiResponse::ok(
        UserResponse::from(user),
        "User deleted successfully",
    )))
}
