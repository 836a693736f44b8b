use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload binding a token to one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: i32,         // user ID
    pub username: String, // username at issue time
    pub iat: i64,         // issued at (unix timestamp)
    pub exp: i64,         // expires at (unix timestamp)
    pub iss: String,      // issuer
    pub jti: Uuid,        // token ID, unique per issue
}
