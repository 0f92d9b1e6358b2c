use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};

use rmx_core::{Error, SessionUser};

use crate::error::ApiError;
use crate::AppState;

/// Session identity for the current request. Extraction rejects with 401
/// before the handler body runs, so no data access happens for anonymous
/// requests.
pub struct CurrentUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError(Error::Unauthorized))?;

        let token = header
            .strip_prefix("Token ")
            .ok_or(ApiError(Error::Unauthorized))?;

        let user = state
            .sessions
            .resolve(token)
            .await
            .ok_or(ApiError(Error::Unauthorized))?;

        Ok(CurrentUser(user))
    }
}
