use axum::{
    async_trait,
    extract::{
        rejection::JsonRejection, rejection::PathRejection, FromRequest, FromRequestParts, Path,
        Request,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::error;

/// Application failure taxonomy. Handlers and guards return this and let `?`
/// carry it to the boundary; the mapping to wire status and body happens
/// exactly once, in `into_response`.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Authorization(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Upstream(String),
    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

/// Uniform error body: `{ "success": false, "message": ... }`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::Validation(m) | HttpError::Conflict(m) | HttpError::Authentication(m) => {
                (StatusCode::BAD_REQUEST, m)
            }
            HttpError::Authorization(m) => (StatusCode::FORBIDDEN, m),
            HttpError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            HttpError::Upstream(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
            HttpError::Internal(e) => {
                // Detail stays in the log; the client gets a generic message.
                error!(error = ?e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };
        (
            status,
            Json(ErrorBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

/// `Json` extractor whose rejection goes through the same normalizer as every
/// other failure instead of axum's plain-text default.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| HttpError::Validation(rejection.body_text()))?;
        Ok(AppJson(value))
    }
}

/// `Path` extractor with the same rejection treatment, so a malformed id in
/// the URL gets the uniform body too.
pub struct AppPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| HttpError::Validation(rejection.body_text()))?;
        Ok(AppPath(value))
    }
}
