use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::extract::{AppJson, Caller};
use super::validation::{
    Validator, validate_address, validate_email, validate_name, validate_password,
    validate_required,
};
use super::{ApiError, ApiResponse, AppState, UserDto, UserEnvelope};
use crate::domain::{Identity, Role, UserId};
use crate::models::NewUser;
use crate::services::AuthSession;

/// Session key holding the logged-in user's id.
pub const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(alias = "currentPassword")]
    pub current_password: String,
    #[serde(alias = "newPassword")]
    pub new_password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserDto,
    pub token: String,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            token: session.token,
        }
    }
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the caller's identity and stores it in the request extensions.
///
/// Sources, in order:
/// 1. `X-Api-Key` header
/// 2. `Authorization: Bearer <token>` header
/// 3. Session cookie (from login)
///
/// A presented token that does not resolve is rejected with 401. A request
/// without any credential continues anonymously.
pub async fn identity_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = if let Some(token) = extract_api_key(request.headers()) {
        let identity = state
            .auth_service()
            .resolve_token(&token)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;
        Some(identity)
    } else if let Ok(Some(user_id)) = session.get::<i32>(SESSION_USER_KEY).await {
        state
            .auth_service()
            .resolve_user(UserId::new(user_id))
            .await?
    } else {
        None
    };

    if let Some(identity) = identity {
        tracing::Span::current().record("user_id", identity.id.value());
        request.extensions_mut().insert::<Identity>(identity);
    }

    Ok(next.run(request).await)
}

/// Extract the bearer token from headers
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

async fn start_session(session: &Session, user_id: UserId) -> Result<(), ApiError> {
    session
        .insert(SESSION_USER_KEY, user_id.value())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    session: Session,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let mut v = Validator::new();
    v.check("name", validate_name(&payload.name));
    v.check("email", validate_email(&payload.email));
    v.check("password", validate_password(&payload.password));
    v.check("address", validate_address(&payload.address));
    v.finish()?;

    let auth = state
        .auth_service()
        .signup(NewUser {
            name: payload.name,
            email: payload.email.trim().to_string(),
            password: payload.password,
            address: payload.address,
            role: Role::User,
        })
        .await?;

    start_session(&session, auth.user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "User registered successfully",
            auth.into(),
        )),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let mut v = Validator::new();
    v.check("email", validate_email(payload.email.trim()));
    v.check(
        "password",
        validate_required(&payload.password, "Password required"),
    );
    v.finish()?;

    let auth = state
        .auth_service()
        .login(payload.email.trim(), &payload.password)
        .await?;

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;
    start_session(&session, auth.user.id).await?;

    tracing::info!(user_id = %auth.user.id, "User logged in");

    Ok(Json(ApiResponse::success("Login successful", auth.into())))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<()>> {
    let _ = session.flush().await;
    Json(ApiResponse::message("Logged out"))
}

/// GET /auth/profile
pub async fn profile(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<ApiResponse<UserEnvelope<UserDto>>>, ApiError> {
    let user = state.auth_service().profile(caller.identity()).await?;

    Ok(Json(ApiResponse::success(
        "Profile retrieved successfully",
        UserEnvelope { user: user.into() },
    )))
}

/// PUT /auth/change-password
/// Verifies the current password, stores the new one and rotates the token.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    caller.authenticated()?;

    let mut v = Validator::new();
    v.check(
        "current_password",
        validate_required(&payload.current_password, "Current password required"),
    );
    v.check(
        "new_password",
        validate_password(&payload.new_password).map_err(|msg| format!("New {}", lower_first(&msg))),
    );
    v.finish()?;

    let token = state
        .auth_service()
        .change_password(
            caller.identity(),
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(ApiResponse::success(
        "Password updated successfully",
        TokenResponse { token },
    )))
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}
