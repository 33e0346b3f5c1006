//! The authorization gate.
//!
//! Registration and login live in an upstream service; by the time a
//! request reaches this engine, that layer has verified the caller and
//! forwarded the identity as trusted headers. This extractor turns them
//! into a typed [`Actor`] exactly once per request — handlers never
//! re-derive identity or role themselves.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::{Actor, ActorId, Role};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the verified actor id (a UUID).
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Header carrying the verified actor role (`buyer`, `seller`, `rider`).
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extractor yielding the authenticated actor for a request.
#[derive(Debug, Clone, Copy)]
pub struct AuthActor(pub Actor);

impl<S> FromRequestParts<S> for AuthActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, ACTOR_ID_HEADER)?;
        let id = Uuid::parse_str(id)
            .map_err(|_| ApiError::Unauthorized(format!("invalid {ACTOR_ID_HEADER}")))?;

        let role = header_value(parts, ACTOR_ROLE_HEADER)?;
        let role = role
            .parse::<Role>()
            .map_err(|_| ApiError::Unauthorized(format!("invalid {ACTOR_ROLE_HEADER}")))?;

        Ok(AuthActor(Actor::new(ActorId::from_uuid(id), role)))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {name}")))
}
