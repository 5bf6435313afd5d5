//! JWT token service

use std::sync::LazyLock;
use std::time::Duration;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use moka::sync::Cache;

use super::model::JwtPayload;

/// Cached token data containing the full payload
#[derive(Clone)]
struct CachedTokenData {
    claims: JwtPayload,
}

/// Token cache to avoid repeated validation of the same token
static TOKEN_CACHE: LazyLock<Cache<String, CachedTokenData>> = LazyLock::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(300))
        .build()
});

/// Decode and validate a token with caching
pub fn decode_jwt_token_cached(
    token: &str,
    secret_key: &str,
) -> jsonwebtoken::errors::Result<jsonwebtoken::TokenData<JwtPayload>> {
    if let Some(cached) = TOKEN_CACHE.get(token) {
        let now = chrono::Utc::now().timestamp();
        if cached.claims.exp > now {
            return Ok(jsonwebtoken::TokenData {
                header: Header::default(),
                claims: cached.claims,
            });
        }
        TOKEN_CACHE.invalidate(token);
    }

    let result = decode_jwt_token(token, secret_key)?;

    TOKEN_CACHE.insert(
        token.to_string(),
        CachedTokenData {
            claims: result.claims.clone(),
        },
    );

    Ok(result)
}

/// Decode and validate a token without caching
pub fn decode_jwt_token(
    token: &str,
    secret_key: &str,
) -> jsonwebtoken::errors::Result<jsonwebtoken::TokenData<JwtPayload>> {
    let decoding_key = DecodingKey::from_base64_secret(secret_key)?;
    decode::<JwtPayload>(token, &decoding_key, &Validation::default())
}

/// Encode an access token for the given subject
pub fn encode_jwt_token(
    sub: &str,
    secret_key: &str,
    expire_seconds: i64,
) -> jsonwebtoken::errors::Result<String> {
    let exp = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::seconds(expire_seconds))
        .unwrap_or_else(chrono::Utc::now)
        .timestamp();

    let payload = JwtPayload {
        sub: sub.to_string(),
        exp,
    };

    let encoding_key = EncodingKey::from_base64_secret(secret_key)?;
    encode(&Header::default(), &payload, &encoding_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::constants::DEFAULT_TOKEN_SECRET_KEY;

    #[test]
    fn test_encode_decode_round_trip() {
        let token = encode_jwt_token("rackd", DEFAULT_TOKEN_SECRET_KEY, 3600).unwrap();
        let decoded = decode_jwt_token(&token, DEFAULT_TOKEN_SECRET_KEY).unwrap();
        assert_eq!(decoded.claims.sub, "rackd");
        assert!(decoded.claims.exp > chrono::Utc::now().timestamp());
    }

    #[test]
    fn test_decode_rejects_tampered_token() {
        let token = encode_jwt_token("rackd", DEFAULT_TOKEN_SECRET_KEY, 3600).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(decode_jwt_token(&tampered, DEFAULT_TOKEN_SECRET_KEY).is_err());
    }

    #[test]
    fn test_cached_decode_matches_uncached() {
        let token = encode_jwt_token("cached-user", DEFAULT_TOKEN_SECRET_KEY, 3600).unwrap();
        let first = decode_jwt_token_cached(&token, DEFAULT_TOKEN_SECRET_KEY).unwrap();
        let second = decode_jwt_token_cached(&token, DEFAULT_TOKEN_SECRET_KEY).unwrap();
        assert_eq!(first.claims.sub, second.claims.sub);
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = encode_jwt_token("rackd", DEFAULT_TOKEN_SECRET_KEY, -60).unwrap();
        assert!(decode_jwt_token(&token, DEFAULT_TOKEN_SECRET_KEY).is_err());
    }
}
