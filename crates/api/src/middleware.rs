//! API middleware and shared state.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use guarda_common::config::AuthConfig;
use guarda_core::{Principal, Services};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Domain services.
    pub services: Services,
    /// Identity token verifier.
    pub verifier: TokenVerifier,
}

/// Claims carried by identity tokens from the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Stable external identity.
    pub sub: String,
    /// Expiry (unix seconds).
    pub exp: u64,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub picture: Option<String>,
}

impl From<IdentityClaims> for Principal {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            subject: claims.sub,
            name: claims.name,
            email: claims.email,
            avatar_url: claims.picture,
        }
    }
}

/// HS256 verifier for identity tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier from the auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = config.issuer.as_deref() {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verify a token and return the principal it names.
    pub fn verify(&self, token: &str) -> Result<Principal, jsonwebtoken::errors::Error> {
        let data = decode::<IdentityClaims>(token, &self.key, &self.validation)?;
        Ok(data.claims.into())
    }
}

/// Authentication middleware.
///
/// A valid bearer token is resolved to its profile, creating it on first
/// sight, and stored in the request extensions. Requests without a usable
/// token pass through anonymous; `AuthUser` rejects them where needed.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.verifier.verify(token) {
            Ok(principal) => match state.services.profile.resolve(&principal).await {
                Ok(profile) => {
                    req.extensions_mut().insert(profile);
                }
                Err(e) => {
                    tracing::warn!(error = %e, subject = %principal.subject, "Failed to resolve identity");
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "Rejected identity token");
            }
        }
    }

    next.run(req).await
}
