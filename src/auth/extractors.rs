use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    auth::{dto::PublicUser, services::authenticate},
    error::ApiError,
    state::AppState,
};

/// Verified caller identity, rebuilt from the bearer token on every request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub PublicUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // A non-ASCII header value is as good as no header.
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let user = authenticate(state.users.as_ref(), &state.keys, header).await?;
        Ok(AuthUser(user))
    }
}
