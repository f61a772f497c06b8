use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use learnhub_core::{AppError, Config};
use learnhub_services::DirectoryService;
use std::sync::Arc;

use crate::auth::models::{CurrentActor, JwtClaims};
use crate::error::HttpAppError;

/// HS256 token verification with the configured shared secret
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["sub", "exp"]);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.jwt_secret(), config.jwt_issuer())
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AppError> {
        decode::<JwtClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                _ => AppError::Unauthorized("Invalid token".to_string()),
            })
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub verifier: JwtVerifier,
    pub directory: DirectoryService,
}

fn bearer_token(headers: &http::HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".to_string()))
}

/// Verify the bearer token and resolve the caller from the stored user record.
/// The role always comes from the store, never from the token.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let actor = match authenticate(&auth_state, request.headers()).await {
        Ok(actor) => actor,
        Err(err) => return HttpAppError(err).into_response(),
    };

    tracing::debug!(user_id = %actor.user_id, role = %actor.role, "Request authenticated");
    request.extensions_mut().insert(CurrentActor(actor));
    next.run(request).await
}

async fn authenticate(
    auth_state: &AuthState,
    headers: &http::HeaderMap,
) -> Result<learnhub_core::Actor, AppError> {
    let token = bearer_token(headers)?;
    let claims = auth_state.verifier.verify(token)?;
    auth_state.directory.resolve_actor(claims.sub).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const SECRET: &str = "an-hs256-secret-that-is-long-enough";

    fn token(exp_offset: i64, issuer: Option<&str>) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = JwtClaims {
            sub: Uuid::new_v4(),
            exp: now + exp_offset,
            iat: now,
            iss: issuer.map(str::to_string),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_accepts_valid_token() {
        let verifier = JwtVerifier::new(SECRET, None);
        assert!(verifier.verify(&token(3600, None)).is_ok());
    }

    #[test]
    fn test_verify_rejects_expired_and_foreign_tokens() {
        let verifier = JwtVerifier::new(SECRET, None);
        let expired = verifier.verify(&token(-3600, None)).unwrap_err();
        assert!(matches!(expired, AppError::Unauthorized(ref m) if m == "Token has expired"));

        let other = JwtVerifier::new("a-completely-different-secret-value", None);
        assert!(other.verify(&token(3600, None)).is_err());
    }

    #[test]
    fn test_verify_checks_issuer_when_configured() {
        let verifier = JwtVerifier::new(SECRET, Some("learnhub"));
        assert!(verifier.verify(&token(3600, Some("learnhub"))).is_ok());
        assert!(verifier.verify(&token(3600, Some("elsewhere"))).is_err());
    }
}
