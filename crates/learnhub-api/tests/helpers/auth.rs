use jsonwebtoken::{encode, EncodingKey, Header};
use learnhub_api::auth::JwtClaims;
use uuid::Uuid;

/// HS256 secret shared by the test config and minted tokens.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

pub fn token_with_secret(user_id: Uuid, secret: &str, exp_offset_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user_id,
        exp: now + exp_offset_secs,
        iat: now,
        iss: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// `Authorization` header value for the given user.
pub fn bearer(user_id: Uuid) -> String {
    format!("Bearer {}", token_with_secret(user_id, TEST_JWT_SECRET, 3600))
}
