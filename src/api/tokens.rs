//! Access/refresh token persistence.
//!
//! Tokens live in the local store under the fixed keys `access` and
//! `refresh`, the same keys the browser client uses in localStorage.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::storage::{LocalStore, StorageResult};

pub const ACCESS_TOKEN_KEY: &str = "access";
pub const REFRESH_TOKEN_KEY: &str = "refresh";

/// Tokens issued by `/api/token/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn LocalStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn access_token(&self) -> StorageResult<Option<String>> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> StorageResult<Option<String>> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    pub fn save(&self, pair: &TokenPair) -> StorageResult<()> {
        self.store.set(ACCESS_TOKEN_KEY, &pair.access)?;
        self.store.set(REFRESH_TOKEN_KEY, &pair.refresh)
    }

    pub fn set_access_token(&self, access: &str) -> StorageResult<()> {
        self.store.set(ACCESS_TOKEN_KEY, access)
    }

    pub fn clear(&self) -> StorageResult<()> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.access_token(), Ok(Some(_)))
    }

    /// True when the stored access token has an `exp` claim within `leeway` of `now`.
    /// Tokens without a readable `exp` are treated as still valid.
    pub fn access_token_expired(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        match self.access_token() {
            Ok(Some(token)) => token_expiry(&token).is_some_and(|exp| exp <= now + leeway),
            _ => false,
        }
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Reads the `exp` claim of a JWT without verifying its signature.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Utc.timestamp_opt(claims.exp?, 0).single()
}

#[cfg(test)]
pub(crate) fn fake_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp},"user_id":1}}"#));
    format!("{header}.{payload}.signature")
}
