//! Authenticated JSON client for the classroom REST backend.
//!
//! Every endpoint wrapper goes through [`ApiClient::request`], which attaches
//! the bearer token, refreshes an expired access token once, and maps
//! non-2xx responses onto [`ClientError::Http`].

pub mod auth;
pub mod badges;
pub mod classrooms;
pub mod drills;
pub mod notifications;
pub mod tokens;
pub mod transfers;

pub use tokens::{TokenPair, TokenStore};

use chrono::{Duration, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::storage::LocalStore;

/// Seconds before `exp` at which an access token is refreshed pre-emptively.
const TOKEN_REFRESH_LEEWAY_SECS: i64 = 10;

/// List endpoints answer either with a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListResponse<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Plain(items) => items,
            Self::Paged { results } => results,
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http: Client,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(config: ClientConfig, store: Arc<dyn LocalStore>) -> ClientResult<Self> {
        if !config.api_base_url.starts_with("http://") && !config.api_base_url.starts_with("https://")
        {
            return Err(ClientError::Config(format!(
                "API base URL must be http(s): {}",
                config.api_base_url
            )));
        }

        let http = Client::builder().timeout(config.http_timeout).build()?;

        Ok(Self {
            config,
            http,
            tokens: TokenStore::new(store),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    // ========== generic verbs ==========

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::GET, path, None).await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let encoded = encode_query(query)?;
        let path = if encoded.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{encoded}")
        };
        self.request(Method::GET, &path, None).await
    }

    /// GET for list endpoints, unwrapping a paginated `results` envelope.
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Vec<T>> {
        let list: ListResponse<T> = self.get(path).await?;
        Ok(list.into_vec())
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// DELETE, discarding whatever body the server sends back.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let _: serde_json::Value = self.request(Method::DELETE, path, None).await?;
        Ok(())
    }

    // ========== request pipeline ==========

    /// Sends an authenticated request. A 401 triggers one token refresh and
    /// one replay; a failed refresh clears the stored tokens.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<T> {
        if self
            .tokens
            .access_token_expired(Utc::now(), Duration::seconds(TOKEN_REFRESH_LEEWAY_SECS))
            && self.tokens.refresh_token()?.is_some()
        {
            tracing::debug!(path, "access token expired, refreshing before request");
            self.refresh_access_token().await?;
        }

        let (status, bytes) = self.send(method.clone(), path, body.as_ref(), true).await?;

        if status == StatusCode::UNAUTHORIZED && self.tokens.refresh_token()?.is_some() {
            tracing::debug!(path, "request unauthorized, attempting token refresh");
            self.refresh_access_token().await?;
            let (status, bytes) = self.send(method, path, body.as_ref(), true).await?;
            return decode_response(status, &bytes);
        }

        decode_response(status, &bytes)
    }

    /// Sends a request without the bearer header (login, register, refresh).
    pub(crate) async fn request_anonymous<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<T> {
        let (status, bytes) = self.send(method, path, body.as_ref(), false).await?;
        decode_response(status, &bytes)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        authenticated: bool,
    ) -> ClientResult<(StatusCode, Vec<u8>)> {
        let url = self.config.endpoint(path);
        let mut builder = self.http.request(method.clone(), &url);

        if authenticated {
            if let Some(token) = self.tokens.access_token()? {
                builder = builder.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "request failed");
            ClientError::Network(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?.to_vec();
        tracing::debug!(%method, %url, status = status.as_u16(), "request completed");

        Ok((status, bytes))
    }
}

fn encode_query<Q: Serialize + ?Sized>(query: &Q) -> ClientResult<String> {
    let value = serde_json::to_value(query)?;
    let Some(map) = value.as_object() else {
        return Ok(String::new());
    };

    let pairs: Vec<String> = map
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(format!("{}={}", urlencoding::encode(key), urlencoding::encode(&text)))
        })
        .collect();

    Ok(pairs.join("&"))
}

fn decode_response<T: DeserializeOwned>(status: StatusCode, bytes: &[u8]) -> ClientResult<T> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }

    if !status.is_success() {
        return Err(ClientError::Http {
            status: status.as_u16(),
            message: error_message(status, bytes),
        });
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"null")?);
    }

    Ok(serde_json::from_slice(bytes)?)
}

/// Pulls a human-readable message out of an error body: `detail`, `error`
/// or `message`, then the first field error of a validation map.
fn error_message(status: StatusCode, bytes: &[u8]) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    };

    let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) else {
        let text = String::from_utf8_lossy(bytes).trim().to_string();
        return if text.is_empty() { fallback() } else { text };
    };

    let Some(map) = value.as_object() else {
        return fallback();
    };

    for key in ["detail", "error", "message"] {
        if let Some(text) = map.get(key).and_then(|v| v.as_str()) {
            return text.to_string();
        }
    }

    map.iter()
        .find_map(|(field, value)| {
            let first = match value {
                serde_json::Value::Array(items) => items.first()?.as_str()?.to_string(),
                serde_json::Value::String(s) => s.clone(),
                _ => return None,
            };
            Some(format!("{field}: {first}"))
        })
        .unwrap_or_else(fallback)
}
