use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, State},
    http::HeaderMap,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use bytes::Bytes;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::guard::{require_admin, require_patient, CurrentUser};
use crate::auth::jwt::TokenIssuer;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session;
use crate::error::{AppJson, HttpError};
use crate::state::AppState;
use crate::storage::ext_from_mime;
use crate::users::dto::{
    Ack, AddAdminRequest, AddDoctorForm, AdminCreatedResponse, AuthResponse,
    DoctorCreatedResponse, DoctorsResponse, LoginRequest, RegisterPatientRequest, UserResponse,
};
use crate::users::repo::StoreError;
use crate::users::repo_types::{Avatar, Role, User};

/// Open endpoints: self-registration, login, the public doctor directory.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/patient/register", post(register_patient))
        .route("/login", post(login))
        .route("/doctors", get(get_all_doctors))
}

pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/addnew", post(add_new_admin))
        .route("/doctor/addnew", post(add_new_doctor))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB, avatars included
        .route("/admin/me", get(me))
        .route("/admin/logout", get(logout_admin))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

pub fn patient_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/patient/me", get(me))
        .route("/patient/logout", get(logout_patient))
        .route_layer(middleware::from_fn_with_state(state, require_patient))
}

/// Conflicts raced past the pre-insert check keep their endpoint-specific
/// message instead of falling through as internal errors.
fn conflict_or_internal(e: StoreError, message: &str) -> HttpError {
    match e {
        StoreError::DuplicateEmail => HttpError::Conflict(message.to_string()),
        StoreError::Backend(e) => HttpError::Internal(e),
    }
}

/// Issue a token for the user and build the cookie-bearing success reply.
/// The cookie name follows the user's role.
fn grant_session(
    state: &AppState,
    user: User,
    message: &str,
) -> Result<(HeaderMap, Json<AuthResponse>), HttpError> {
    let issuer = TokenIssuer::from_ref(state);
    let token = issuer.issue(user.id)?;

    let mut headers = HeaderMap::new();
    session::attach(&mut headers, user.role, &token, issuer.ttl())?;

    Ok((
        headers,
        Json(AuthResponse {
            success: true,
            message: message.to_string(),
            user,
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn register_patient(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterPatientRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), HttpError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.validate()?;

    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "registration with a known email");
        return Err(HttpError::Conflict("User already Registered!".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .users
        .insert(payload.into_new_user(password_hash))
        .await
        .map_err(|e| conflict_or_internal(e, "User already Registered!"))?;

    info!(user_id = %user.id, "patient registered");
    grant_session(&state, user, "User Registered Successfully")
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), HttpError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.validate()?;

    // Lookup miss and password mismatch collapse into one message so the
    // reply never reveals which half failed.
    let user = match state.users.find_by_email(&payload.email).await? {
        Some(user) => user,
        None => {
            warn!(email = %payload.email, "login with unknown email");
            return Err(HttpError::Authentication("Invalid Email Or Password!".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(HttpError::Authentication("Invalid Email Or Password!".into()));
    }

    info!(user_id = %user.id, role = %user.role, "user logged in");
    grant_session(&state, user, "User Logged In Successfully")
}

/// Creating an admin never grants a session; the caller stays logged in as
/// themselves.
#[instrument(skip(state, payload))]
pub async fn add_new_admin(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<AddAdminRequest>,
) -> Result<Json<AdminCreatedResponse>, HttpError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.validate()?;

    if state.users.find_by_email(&payload.email).await?.is_some() {
        return Err(HttpError::Conflict(
            "Admin With This Email Already Exists!".into(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let admin = state
        .users
        .insert(payload.into_new_user(password_hash))
        .await
        .map_err(|e| conflict_or_internal(e, "Admin With This Email Already Exists!"))?;

    info!(user_id = %admin.id, "admin created");
    Ok(Json(AdminCreatedResponse {
        success: true,
        message: "New Admin Registered".to_string(),
        admin,
    }))
}

#[instrument(skip(state, multipart))]
pub async fn add_new_doctor(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DoctorCreatedResponse>, HttpError> {
    let mut form = AddDoctorForm::default();
    let mut avatar_file: Option<(Bytes, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::Validation(e.to_string()))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("docAvatar") => {
                let content_type = field
                    .content_type()
                    .map(|ct| ct.to_string())
                    .unwrap_or_default();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| HttpError::Validation(e.to_string()))?;
                avatar_file = Some((data, content_type));
            }
            Some(text_field) => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| HttpError::Validation(e.to_string()))?;
                match text_field {
                    "firstName" => form.first_name = value,
                    "lastName" => form.last_name = value,
                    "email" => form.email = value,
                    "phone" => form.phone = value,
                    "nationalId" => form.national_id = value,
                    "dob" => form.dob = value,
                    "gender" => form.gender = value,
                    "password" => form.password = value,
                    "doctorDepartment" => form.doctor_department = value,
                    _ => {}
                }
            }
            None => {}
        }
    }

    // The file is checked before the text fields, so a bad upload is
    // reported even when the rest of the form is also incomplete.
    let (data, content_type) = avatar_file
        .ok_or_else(|| HttpError::Validation("Doctor Avatar Required!".into()))?;
    let Some(ext) = ext_from_mime(&content_type) else {
        return Err(HttpError::Validation("File Format Not Supported!".into()));
    };

    form.email = form.email.trim().to_lowercase();
    form.validate()?;

    if state.users.find_by_email(&form.email).await?.is_some() {
        return Err(HttpError::Conflict(
            "Doctor With This Email Already Exists!".into(),
        ));
    }

    let key = format!("avatars/{}.{}", Uuid::new_v4(), ext);
    let url = match state.images.upload_image(&key, data, &content_type).await {
        Ok(url) => url,
        Err(e) => {
            error!(error = ?e, key = %key, "avatar upload failed");
            return Err(HttpError::Upstream("Failed To Upload Doctor Avatar!".into()));
        }
    };

    let password_hash = hash_password(&form.password)?;
    let doctor = state
        .users
        .insert(form.into_new_user(password_hash, Avatar { public_id: key, url }))
        .await
        .map_err(|e| conflict_or_internal(e, "Doctor With This Email Already Exists!"))?;

    info!(user_id = %doctor.id, "doctor created");
    Ok(Json(DoctorCreatedResponse {
        success: true,
        message: "New Doctor Registered".to_string(),
        doctor,
    }))
}

#[instrument(skip(state))]
pub async fn get_all_doctors(
    State(state): State<AppState>,
) -> Result<Json<DoctorsResponse>, HttpError> {
    let doctors = state.users.list_by_role(Role::Doctor).await?;
    Ok(Json(DoctorsResponse {
        success: true,
        doctors,
    }))
}

/// Shared by the patient and admin `me` routes; the guard in front decides
/// who gets through.
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse {
        success: true,
        user,
    })
}

/// Logout only clears the cookie. An already-issued token stays valid until
/// it expires on its own.
#[instrument]
pub async fn logout_admin() -> Result<(HeaderMap, Json<Ack>), HttpError> {
    let mut headers = HeaderMap::new();
    session::detach(&mut headers, Role::Admin)?;
    Ok((
        headers,
        Json(Ack {
            success: true,
            message: "Admin Logged Out Successfully.".to_string(),
        }),
    ))
}

#[instrument]
pub async fn logout_patient() -> Result<(HeaderMap, Json<Ack>), HttpError> {
    let mut headers = HeaderMap::new();
    session::detach(&mut headers, Role::Patient)?;
    Ok((
        headers,
        Json(Ack {
            success: true,
            message: "Patient Logged Out Successfully.".to_string(),
        }),
    ))
}
