/// Why a bearer credential was rejected.
///
/// All variants end the request with 401; they stay distinct so logs can
/// tell a missing header from a forged or stale token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    Missing,
    #[error("Invalid token")]
    Invalid,
    #[error("Token expired")]
    Expired,
    #[error("User not found")]
    UnknownUser,
}

impl AuthError {
    pub fn kind(self) -> &'static str {
        match self {
            AuthError::Missing => "auth_missing",
            AuthError::Invalid => "auth_invalid",
            AuthError::Expired => "auth_expired",
            AuthError::UnknownUser => "auth_unknown_user",
        }
    }
}
