use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use rmx_core::Error;

/// Wrapper so core errors can flow out of handlers with `?`.
#[derive(Debug)]
pub struct ApiError(pub Error);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, self.0.to_string()),
            Error::NotFound(what) => (StatusCode::NOT_FOUND, what.clone()),
            Error::InvalidUrl(_) | Error::Validation(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.0.to_string())
            }
            // User-facing messages from the proxy boundary pass through;
            // the underlying detail was already logged there.
            Error::Scraping(message) | Error::Generation(message) => {
                (StatusCode::BAD_GATEWAY, message.clone())
            }
            other => {
                tracing::error!("request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::Unauthorized, StatusCode::UNAUTHORIZED),
            (Error::NotFound("Media 4".to_string()), StatusCode::NOT_FOUND),
            (
                Error::Validation("bad style".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                Error::InvalidUrl("nope".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                Error::Generation("backend said no".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                Error::Storage("disk on fire".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            let response = ApiError(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
