pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new().nest(
        "/message",
        handlers::public_routes().merge(handlers::admin_routes(state)),
    )
}
