use tracing::{debug, info, warn};

use crate::{
    auth::{
        dto::{AuthResponse, PublicUser},
        error::AuthError,
        jwt::JwtKeys,
        repo::UserRepo,
    },
    error::{ApiError, ApiResult},
};

pub const MAX_USERNAME_LEN: usize = 50;

/// Trims the submitted username and checks its length.
pub fn normalize_username(raw: Option<&str>) -> ApiResult<String> {
    let username = raw.map(str::trim).unwrap_or_default();
    if username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::validation(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(username.to_string())
}

/// Resolves or creates the user, then issues a token for them.
pub async fn login(users: &dyn UserRepo, keys: &JwtKeys, raw_username: Option<&str>) -> ApiResult<AuthResponse> {
    let username = normalize_username(raw_username)?;

    let user = match users.find_by_username(&username).await? {
        Some(user) => user,
        None => {
            let user = users.create(&username).await?;
            info!(user_id = user.id, username = %user.username, "user created");
            user
        }
    };

    let token = keys.sign(user.id, &user.username)?;
    info!(user_id = user.id, "user logged in");
    Ok(AuthResponse {
        user: user.into(),
        token,
    })
}

/// Extracts the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AuthError::Missing)?;
    if token.trim().is_empty() {
        return Err(AuthError::Missing);
    }
    Ok(token)
}

/// Token Verifier: header → signed claims → live user.
///
/// The store is only consulted once the signature and expiry have passed,
/// so a token for a deleted user stops working even before it expires.
pub async fn authenticate(users: &dyn UserRepo, keys: &JwtKeys, header: Option<&str>) -> ApiResult<PublicUser> {
    let token = bearer_token(header)?;
    let claims = keys.verify(token)?;

    let Some(user) = users.find_by_id(claims.sub).await? else {
        warn!(user_id = claims.sub, "token for unknown user");
        return Err(AuthError::UnknownUser.into());
    };
    debug!(user_id = user.id, "request authenticated");
    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{config::JwtConfig, memory::MemoryUserRepo};

    fn keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "unit-secret".into(),
            issuer: "poston".into(),
            ttl: Duration::from_secs(600),
        })
        .unwrap()
    }

    #[test]
    fn username_is_trimmed_and_bounded() {
        assert_eq!(normalize_username(Some("  alice ")).unwrap(), "alice");
        assert!(matches!(normalize_username(Some("   ")), Err(ApiError::Validation(_))));
        assert!(matches!(normalize_username(None), Err(ApiError::Validation(_))));
        assert!(normalize_username(Some(&"é".repeat(50))).is_ok());
        assert!(matches!(normalize_username(Some(&"a".repeat(51))), Err(ApiError::Validation(_))));
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token(Some("Bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(Some("bearer abc")), Err(AuthError::Missing));
        assert_eq!(bearer_token(Some("Token abc")), Err(AuthError::Missing));
        assert_eq!(bearer_token(Some("Bearer ")), Err(AuthError::Missing));
        assert_eq!(bearer_token(None), Err(AuthError::Missing));
    }

    #[tokio::test]
    async fn login_is_idempotent_on_identity() {
        let users = MemoryUserRepo::default();
        let keys = keys();

        let first = login(&users, &keys, Some("alice")).await.unwrap();
        let second = login(&users, &keys, Some("  alice  ")).await.unwrap();

        assert_eq!(first.user, second.user);
        assert_ne!(first.token, second.token);
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn authenticate_resolves_live_user() {
        let users = Arc::new(MemoryUserRepo::default());
        let keys = keys();
        let issued = login(users.as_ref(), &keys, Some("bob")).await.unwrap();

        let header = format!("Bearer {}", issued.token);
        let user = authenticate(users.as_ref(), &keys, Some(&header)).await.unwrap();
        assert_eq!(user, issued.user);

        users.remove(issued.user.id);
        let err = authenticate(users.as_ref(), &keys, Some(&header)).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::UnknownUser)));
    }

    #[tokio::test]
    async fn malformed_header_never_reaches_store() {
        let users = MemoryUserRepo::default();
        let err = authenticate(&users, &keys(), Some("Basic Zm9vOmJhcg==")).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::Missing)));
        assert_eq!(users.lookups(), 0);
    }
}
