use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    auth::{jwt::TokenIssuer, session},
    error::HttpError,
    state::AppState,
    users::repo_types::{Role, User},
};

/// Authenticated user resolved by the guard, available to handlers behind it
/// via `Extension<CurrentUser>`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Dashboard guard: a valid `adminToken` session belonging to an Admin.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, HttpError> {
    authorize(state, Role::Admin, request, next).await
}

/// Frontend guard: a valid `patientToken` session belonging to a Patient.
pub async fn require_patient(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, HttpError> {
    authorize(state, Role::Patient, request, next).await
}

/// The route's expected role picks which cookie is read; the stored user's
/// role is the authority for authorization. A role claim inside the token is
/// never consulted.
async fn authorize(
    state: AppState,
    expected: Role,
    mut request: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let token = session::extract(request.headers(), session::cookie_name(expected))
        .ok_or_else(|| HttpError::Authentication(not_authenticated(expected).to_string()))?;

    let claims = TokenIssuer::from_ref(&state).verify(&token).map_err(|e| {
        warn!(error = %e, "session token rejected");
        let message = match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                "Json Web Token is expired, Try again!"
            }
            _ => "Json Web Token is invalid, Try again!",
        };
        HttpError::Authentication(message.to_string())
    })?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| HttpError::Authentication("User No Longer Exists!".to_string()))?;

    if user.role != expected {
        warn!(user_id = %user.id, role = %user.role, required = %expected, "role refused");
        return Err(HttpError::Authorization(format!(
            "{} not authorized for this resource!",
            user.role
        )));
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

fn not_authenticated(expected: Role) -> &'static str {
    match expected {
        Role::Admin => "Dashboard User is not authenticated!",
        _ => "User is not authenticated!",
    }
}
