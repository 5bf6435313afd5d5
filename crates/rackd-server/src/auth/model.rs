//! Auth wire and claim models

use serde::{Deserialize, Serialize};

/// JWT claims carried by an access token
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JwtPayload {
    /// Subject: the authenticated username
    pub sub: String,
    /// Expiry as a unix timestamp in seconds
    pub exp: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_ttl: i64,
}
