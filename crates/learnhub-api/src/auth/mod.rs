pub mod middleware;
pub mod models;

pub use middleware::{auth_middleware, AuthState, JwtVerifier};
pub use models::{CurrentActor, JwtClaims};
