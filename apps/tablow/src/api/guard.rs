//! Edit protection: optional HTTP Basic credentials and an optional global
//! rate limit on inline edits. Listing is never guarded.

use super::error::ApiError;
use axum::http::{HeaderMap, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use subtle::ConstantTimeEq;

/// `user:password` pair accepted for edits.
#[derive(Clone)]
pub struct Credentials(String);

impl Credentials {
    /// Parse `user:password`. Both halves must be non-empty.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (user, password) = raw.split_once(':')?;
        (!user.is_empty() && !password.is_empty()).then(|| Self(raw.to_string()))
    }

    fn matches(&self, presented: &[u8]) -> bool {
        self.0.as_bytes().ct_eq(presented).into()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credentials(****)")
    }
}

/// Checks run before every inline edit.
#[derive(Default)]
pub struct EditGuard {
    credentials: Option<Credentials>,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl EditGuard {
    /// A guard that lets every edit through.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Allow at most `per_second` edits per second across all tables.
    #[must_use]
    pub fn with_rate_limit(mut self, per_second: NonZeroU32) -> Self {
        self.limiter = Some(RateLimiter::direct(Quota::per_second(per_second)));
        self
    }

    #[must_use]
    pub fn requires_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Admit or reject one edit request.
    pub fn check(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        if let Some(credentials) = &self.credentials {
            let presented = basic_credentials(headers).ok_or(ApiError::Unauthorized)?;
            if !credentials.matches(&presented) {
                return Err(ApiError::Unauthorized);
            }
        }

        if let Some(limiter) = &self.limiter
            && limiter.check().is_err()
        {
            return Err(ApiError::RateLimited);
        }

        Ok(())
    }
}

impl std::fmt::Debug for EditGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditGuard")
            .field("credentials", &self.credentials)
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}

/// Decoded `user:password` bytes from a Basic `Authorization` header.
fn basic_credentials(headers: &HeaderMap) -> Option<Vec<u8>> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    STANDARD.decode(encoded.trim()).ok()
}
