//! User identity lookup (`users.info`). Failures here are always
//! recoverable; callers fall back to a nameless greeting.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

const API_BASE: &str = "https://slack.com/api";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("identity api rejected lookup: {0}")]
    Api(String),
    #[error("identity lookup is not available")]
    Unavailable,
}

#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn lookup_user(&self, user_id: &str) -> Result<UserProfile, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct UsersInfoResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user: Option<UserRecord>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    name: String,
}

pub struct HttpIdentityLookup {
    client: Client,
    bot_token: SecretString,
    api_base: String,
}

impl HttpIdentityLookup {
    pub fn new(bot_token: SecretString) -> Self {
        Self { client: Client::new(), bot_token, api_base: API_BASE.to_owned() }
    }

    pub fn with_api_base(bot_token: SecretString, api_base: impl Into<String>) -> Self {
        Self { client: Client::new(), bot_token, api_base: api_base.into() }
    }
}

#[async_trait]
impl IdentityLookup for HttpIdentityLookup {
    async fn lookup_user(&self, user_id: &str) -> Result<UserProfile, IdentityError> {
        let response = self
            .client
            .get(format!("{}/users.info", self.api_base))
            .bearer_auth(self.bot_token.expose_secret())
            .query(&[("user", user_id)])
            .send()
            .await?;

        let parsed: UsersInfoResponse = response.json().await?;
        if !parsed.ok {
            return Err(IdentityError::Api(
                parsed.error.unwrap_or_else(|| "unknown error".into()),
            ));
        }

        match parsed.user {
            Some(user) => Ok(UserProfile { display_name: user.name }),
            None => Err(IdentityError::Api("missing user record".to_owned())),
        }
    }
}

/// Lookup that always reports unavailability, exercising the documented
/// fallback path.
#[derive(Default)]
pub struct NoopIdentityLookup;

#[async_trait]
impl IdentityLookup for NoopIdentityLookup {
    async fn lookup_user(&self, _user_id: &str) -> Result<UserProfile, IdentityError> {
        Err(IdentityError::Unavailable)
    }
}

/// Fixed-name lookup for tests.
pub struct StaticIdentityLookup {
    display_name: String,
}

impl StaticIdentityLookup {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self { display_name: display_name.into() }
    }
}

#[async_trait]
impl IdentityLookup for StaticIdentityLookup {
    async fn lookup_user(&self, _user_id: &str) -> Result<UserProfile, IdentityError> {
        Ok(UserProfile { display_name: self.display_name.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::{IdentityError, IdentityLookup, NoopIdentityLookup, StaticIdentityLookup};

    #[tokio::test]
    async fn noop_lookup_reports_unavailable() {
        let error =
            NoopIdentityLookup.lookup_user("U1").await.expect_err("noop lookup never resolves");
        assert!(matches!(error, IdentityError::Unavailable));
    }

    #[tokio::test]
    async fn static_lookup_resolves_the_configured_name() {
        let lookup = StaticIdentityLookup::new("tex");
        let profile = lookup.lookup_user("U1").await.expect("static lookup");
        assert_eq!(profile.display_name, "tex");
    }

    #[test]
    fn users_info_response_decodes() {
        let body = r#"{"ok": true, "user": {"name": "tex", "id": "U1"}}"#;
        let parsed: super::UsersInfoResponse =
            serde_json::from_str(body).expect("response should decode");
        assert!(parsed.ok);
        assert_eq!(parsed.user.map(|user| user.name).as_deref(), Some("tex"));
    }
}
