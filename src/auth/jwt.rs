use std::time::Duration;

use anyhow::{bail, Context};
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::{claims::Claims, error::AuthError},
    config::{JwtConfig, MAX_TOKEN_TTL},
    state::AppState,
};

/// Signing and verification keys, built once from configuration.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> anyhow::Result<Self> {
        if config.secret.is_empty() {
            bail!("jwt secret is not configured");
        }
        if config.ttl.is_zero() {
            bail!("jwt lifetime must be positive");
        }
        if config.ttl > MAX_TOKEN_TTL {
            bail!("jwt lifetime exceeds {}s", MAX_TOKEN_TTL.as_secs());
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            ttl: config.ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn sign(&self, user_id: i32, username: &str) -> anyhow::Result<String> {
        self.sign_at(user_id, username, OffsetDateTime::now_utc())
    }

    /// Signs a token valid over `[now, now + ttl)`.
    pub fn sign_at(&self, user_id: i32, username: &str, now: OffsetDateTime) -> anyhow::Result<String> {
        let exp = time::Duration::try_from(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .context("jwt expiry out of range")?;
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("jwt encode")?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Checks signature and issuer, then expiry against `now` with no leeway.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "iss"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => debug!("jwt signature mismatch"),
                    kind => debug!(?kind, "jwt rejected"),
                }
                AuthError::Invalid
            })?
            .claims;

        if now.unix_timestamp() >= claims.exp {
            debug!(user_id = claims.sub, exp = claims.exp, "jwt expired");
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, ttl_secs: u64) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: "test-issuer".into(),
            ttl: Duration::from_secs(ttl_secs),
        })
        .expect("keys")
    }

    #[test]
    fn sign_and_verify() {
        let keys = make_keys("dev-secret", 3600);
        let token = keys.sign(7, "alice").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn valid_until_expiry_instant() {
        let keys = make_keys("dev-secret", 60);
        let issued = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let token = keys.sign_at(1, "alice", issued).unwrap();

        assert!(keys.verify_at(&token, issued).is_ok());
        assert!(keys.verify_at(&token, issued + Duration::from_secs(59)).is_ok());
        assert_eq!(
            keys.verify_at(&token, issued + Duration::from_secs(60)),
            Err(AuthError::Expired)
        );
        assert_eq!(
            keys.verify_at(&token, issued + Duration::from_secs(86_400)),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn tokens_are_fresh_per_issue() {
        let keys = make_keys("dev-secret", 60);
        let now = OffsetDateTime::now_utc();
        let a = keys.sign_at(1, "alice", now).unwrap();
        let b = keys.sign_at(1, "alice", now).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_other_secret() {
        let token = make_keys("secret-a", 60).sign(1, "alice").unwrap();
        assert_eq!(make_keys("secret-b", 60).verify(&token), Err(AuthError::Invalid));
    }

    #[test]
    fn rejects_tampered_and_garbage() {
        let keys = make_keys("dev-secret", 60);
        let token = keys.sign(1, "alice").unwrap();
        let forged = make_keys("other-secret", 60).sign(2, "mallory").unwrap();
        let (head, _) = token.rsplit_once('.').unwrap();
        let (_, forged_sig) = forged.rsplit_once('.').unwrap();
        let spliced = format!("{head}.{forged_sig}");

        assert_eq!(keys.verify(&spliced), Err(AuthError::Invalid));
        assert_eq!(keys.verify("not-a-jwt"), Err(AuthError::Invalid));
        assert_eq!(keys.verify(""), Err(AuthError::Invalid));
    }

    #[test]
    fn bad_signature_wins_over_expiry() {
        let past = OffsetDateTime::now_utc() - Duration::from_secs(3600);
        let token = make_keys("secret-a", 60).sign_at(1, "alice", past).unwrap();
        assert_eq!(make_keys("secret-b", 60).verify(&token), Err(AuthError::Invalid));
        assert_eq!(make_keys("secret-a", 60).verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn refuses_empty_secret() {
        let err = JwtKeys::new(&JwtConfig {
            secret: String::new(),
            issuer: "x".into(),
            ttl: Duration::from_secs(60),
        })
        .unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn refuses_lifetime_beyond_a_year() {
        let err = JwtKeys::new(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "x".into(),
            ttl: Duration::from_secs(1_000_000_000_000),
        })
        .unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn expiry_overflow_is_an_error() {
        let keys = make_keys("dev-secret", 3600);
        let end_of_time = time::macros::datetime!(9999-12-31 23:30 UTC);
        assert!(keys.sign_at(1, "alice", end_of_time).is_err());
    }
}
