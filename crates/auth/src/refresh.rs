//! Reqwest-backed refresh client for the upstream auth endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use streamgate_types::{CachedToken, CredentialIdentity, GatewayError, RefreshClient, Result};

/// Token lifetime assumed when the upstream reports no expiry at all.
const DEFAULT_LIFETIME_SECS: u64 = 300;

/// Wire shape of the upstream auth response. The upstream reports either an
/// absolute expiry or a relative lifetime; absolute wins when both appear.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(alias = "access_token")]
    token: String,
    #[serde(default, alias = "expiresAt")]
    expires_at: Option<u64>,
    #[serde(default, alias = "expiresIn")]
    expires_in: Option<u64>,
}

impl RefreshResponse {
    fn into_token(self) -> CachedToken {
        match (self.expires_at, self.expires_in) {
            (Some(at), _) => CachedToken::with_expires_at(self.token, at),
            (None, Some(lifetime)) => CachedToken::new(self.token, lifetime),
            (None, None) => CachedToken::new(self.token, DEFAULT_LIFETIME_SECS),
        }
    }
}

/// [`RefreshClient`] that POSTs a refresh-token grant to the identity's
/// token endpoint.
pub struct HttpRefreshClient {
    http: reqwest::Client,
}

impl HttpRefreshClient {
    /// Creates a client reusing the given HTTP connection pool.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl RefreshClient for HttpRefreshClient {
    async fn refresh(&self, identity: &CredentialIdentity) -> Result<CachedToken> {
        let mut body = serde_json::json!({
            "grant_type": "refresh_token",
            "refresh_token": identity.refresh_token,
        });
        if let Some(client_id) = &identity.client_id {
            body["client_id"] = serde_json::Value::String(client_id.clone());
        }

        let resp = self
            .http
            .post(&identity.token_url)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: RefreshResponse = resp.json().await?;
        Ok(parsed.into_token())
    }
}
