use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub enum HttpError {
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<backend_application::AppError> for HttpError {
    fn from(value: backend_application::AppError) -> Self {
        match value {
            backend_application::AppError::Unauthorized => HttpError::Unauthorized,
            backend_application::AppError::BadRequest(msg) => HttpError::BadRequest(msg),
            backend_application::AppError::NoRunYet => {
                HttpError::NotFound("no detection run yet".to_string())
            }
            backend_application::AppError::Internal(err) => HttpError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, format!("bad request: {}", msg)),
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_run_yet_maps_to_not_found() {
        let err: HttpError = backend_application::AppError::NoRunYet.into();
        match err {
            HttpError::NotFound(message) => assert_eq!(message, "no detection run yet"),
            _ => panic!("unexpected mapping"),
        }
    }

    #[test]
    fn bad_request_keeps_message() {
        let err: HttpError =
            backend_application::AppError::BadRequest("row 3: invalid Amount".to_string()).into();
        match err {
            HttpError::BadRequest(message) => assert!(message.contains("row 3")),
            _ => panic!("unexpected mapping"),
        }
    }
}
