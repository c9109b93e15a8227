use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, TokenPair};
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(alias = "user_type", default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub total_points: Option<i64>,
}

fn default_role() -> Role {
    Role::Unknown
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

#[derive(Deserialize)]
struct UsernameCheck {
    #[serde(default)]
    available: Option<bool>,
    #[serde(default)]
    exists: Option<bool>,
}

impl ApiClient {
    /// Exchanges credentials for a token pair and stores it.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<TokenPair> {
        let body = serde_json::to_value(Credentials { username, password })?;
        let pair: TokenPair = self
            .request_anonymous(Method::POST, "/api/token/", Some(body))
            .await?;
        self.tokens().save(&pair)?;
        tracing::info!(username, "logged in");
        Ok(pair)
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.tokens().clear()?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Trades the stored refresh token for a new access token. Any failure
    /// clears both tokens and reports [`ClientError::Unauthorized`].
    pub async fn refresh_access_token(&self) -> ClientResult<()> {
        let Some(refresh) = self.tokens().refresh_token()? else {
            return Err(ClientError::Unauthorized);
        };

        let body = serde_json::to_value(RefreshRequest { refresh: &refresh })?;
        let result: ClientResult<RefreshResponse> = self
            .request_anonymous(Method::POST, "/api/token/refresh/", Some(body))
            .await;

        match result {
            Ok(response) => {
                self.tokens().set_access_token(&response.access)?;
                if let Some(rotated) = response.refresh {
                    self.tokens().save(&TokenPair {
                        access: response.access,
                        refresh: rotated,
                    })?;
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed, clearing session");
                self.tokens().clear()?;
                Err(ClientError::Unauthorized)
            }
        }
    }

    pub async fn register(&self, registration: &Registration) -> ClientResult<UserProfile> {
        let body = serde_json::to_value(registration)?;
        self.request_anonymous(Method::POST, "/api/user/register/", Some(body))
            .await
    }

    /// Whether `username` is still free.
    pub async fn check_username(&self, username: &str) -> ClientResult<bool> {
        let path = format!(
            "/api/user/check-username/?username={}",
            urlencoding::encode(username)
        );
        let check: UsernameCheck = self.request_anonymous(Method::GET, &path, None).await?;
        Ok(match (check.available, check.exists) {
            (Some(available), _) => available,
            (None, Some(exists)) => !exists,
            (None, None) => false,
        })
    }

    pub async fn profile(&self) -> ClientResult<UserProfile> {
        self.get("/api/profile/").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<UserProfile> {
        self.patch("/api/profile/", update).await
    }
}
