use actix_web::{dev::Payload, http::header, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::core::AppError;

/// Raw bearer token from the `Authorization` header
///
/// Decoding the token into a user is left to the report service's actor
/// resolver; this extractor only rejects requests that carry no token at all.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_header(value: &str) -> Option<Self> {
        let (scheme, token) = value.split_once(' ')?;
        let token = token.trim();

        if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
            Some(BearerToken(token.to_string()))
        } else {
            None
        }
    }
}

impl FromRequest for BearerToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(BearerToken::from_header)
            .ok_or_else(|| AppError::unauthorized("Missing bearer token"));

        ready(token)
    }
}
