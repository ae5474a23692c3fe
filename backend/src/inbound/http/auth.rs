//! Bearer-token authentication for HTTP handlers.
//!
//! Tokens are HS256 JWTs issued elsewhere carrying `sub` (user id), `role`
//! (`customer` or `admin`) and `exp`. Handlers take an [`Authenticated`]
//! argument; the extractor verifies the token with the [`TokenVerifier`]
//! registered as app data and yields the calling [`Actor`].

use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Actor, Error, Role, UserId};

/// Claims carried by storefront bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// `customer` or `admin`.
    pub role: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

/// Verifies bearer tokens against the shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: Arc<[u8]>,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier for tokens signed with `secret`.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a raw token and resolve the caller.
    ///
    /// # Errors
    ///
    /// Returns an `unauthorized` error for bad signatures, expired tokens and
    /// claims that do not name a valid user or role.
    pub fn verify(&self, token: &str) -> Result<Actor, Error> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &self.validation,
        )
        .map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            Error::unauthorized("invalid or expired token")
        })?;
        let claims = data.claims;
        let user_id =
            UserId::new(&claims.sub).map_err(|err| Error::unauthorized(err.to_string()))?;
        let role: Role = claims
            .role
            .parse()
            .map_err(|err: crate::domain::UserValidationError| {
                Error::unauthorized(err.to_string())
            })?;
        Ok(Actor::new(user_id, role))
    }

    /// Sign a token for `actor` valid for `ttl_secs`.
    ///
    /// Token issuance belongs to the identity provider; this exists so tests
    /// and local tooling can mint tokens the verifier accepts.
    #[cfg(any(test, feature = "test-support"))]
    pub fn issue(&self, actor: &Actor, ttl_secs: u64) -> Result<String, Error> {
        use jsonwebtoken::{EncodingKey, Header, encode};

        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        let claims = Claims {
            sub: actor.user_id().to_string(),
            role: actor.role().as_str().to_owned(),
            exp: now.saturating_add(ttl_secs),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|err| Error::internal(format!("failed to sign token: {err}")))
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("bearer token required"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("bearer token required"))?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(Error::unauthorized("bearer token required"));
    }
    Ok(token.trim())
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, Error> {
    let verifier = req
        .app_data::<web::Data<TokenVerifier>>()
        .ok_or_else(|| Error::internal("token verifier is not configured"))?;
    let token = bearer_token(req)?;
    verifier.verify(token).map(Authenticated)
}

/// The verified caller of a request.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Actor);

impl Authenticated {
    /// The caller.
    pub fn actor(&self) -> &Actor {
        &self.0
    }

    /// The caller's id.
    pub fn user_id(&self) -> UserId {
        *self.0.user_id()
    }
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(actix_web::Error::from))
    }
}
