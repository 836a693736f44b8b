use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, VerifyResponse},
        extractors::AuthUser,
        services,
    },
    error::ApiResult,
    extract::Json,
    response::ApiResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/verify", get(verify))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<ApiResponse<AuthResponse>> {
    let response = services::login(state.users.as_ref(), &state.keys, payload.username.as_deref()).await?;
    Ok(ApiResponse::ok(response).message("Login successful"))
}

#[instrument(skip_all)]
pub async fn verify(AuthUser(user): AuthUser) -> ApiResult<ApiResponse<VerifyResponse>> {
    Ok(ApiResponse::ok(VerifyResponse { user }))
}

#[cfg(test)]
mod tests {
    use crate::auth::dto::{AuthResponse, PublicUser};

    #[test]
    fn auth_response_serialization() {
        let response = AuthResponse {
            user: PublicUser {
                id: 3,
                username: "alice".to_string(),
            },
            token: "t".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["user"]["id"], 3);
        assert_eq!(json["user"]["username"], "alice");
        assert_eq!(json["token"], "t");
    }
}
