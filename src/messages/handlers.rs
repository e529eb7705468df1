use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::guard::require_admin;
use crate::error::{AppJson, HttpError};
use crate::messages::dto::{Ack, MessagesResponse, SendMessageRequest};
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/send", post(send_message))
}

pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/getall", get(get_all_messages))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// Anyone can write in; no session required.
#[instrument(skip(state, payload))]
pub async fn send_message(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SendMessageRequest>,
) -> Result<Json<Ack>, HttpError> {
    payload.validate()?;

    let stored = state.messages.insert(payload.into_new_message()).await?;

    info!(message_id = %stored.id, "contact message stored");
    Ok(Json(Ack {
        success: true,
        message: "Message Sent Successfully!".to_string(),
    }))
}

#[instrument(skip(state))]
pub async fn get_all_messages(
    State(state): State<AppState>,
) -> Result<Json<MessagesResponse>, HttpError> {
    let messages = state.messages.list_all().await?;
    Ok(Json(MessagesResponse {
        success: true,
        messages,
    }))
}
