//! Terraform Cloud Token Provider
//!
//! Mints organization and team API tokens through the Terraform Cloud API v2
//! (also served by Terraform Enterprise under a custom address).
//!
//! - Organization token: `POST /api/v2/organizations/{organization}/authentication-token`
//! - Team token: `POST /api/v2/teams/{team_id}/authentication-token`
//!
//! Deleting uses `DELETE` on the same paths. Note that Terraform Cloud keeps a
//! single organization token and a single team token per scope: minting a new
//! one invalidates the previous one upstream.

use async_trait::async_trait;
use reqwest::{header, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use tfsecrets_core::RoleScope;

use crate::error::{Result, UpstreamError};
use crate::provider::TokenProvider;
use crate::types::{MintedToken, TokenRequest};

/// JSON:API media type used by Terraform Cloud
const JSON_API: &str = "application/vnd.api+json";

/// Terraform Cloud token provider
pub struct TerraformCloudProvider {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl TerraformCloudProvider {
    /// Create a provider whose HTTP calls are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tfsecrets/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            timeout,
        })
    }

    /// Build the authentication-token URL for a scope
    fn token_url(address: &str, scope: &RoleScope) -> Result<Url> {
        let mut url = Url::parse(address)
            .map_err(|e| UpstreamError::InvalidAddress(format!("{}: {}", address, e)))?;

        let (collection, id) = match scope {
            RoleScope::Organization { organization } => ("organizations", organization.as_str()),
            RoleScope::Team { team_id, .. } => ("teams", team_id.as_str()),
        };

        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidAddress(address.to_string()))?
            .pop_if_empty()
            .extend(["api", "v2", collection, id, "authentication-token"]);

        Ok(url)
    }

    fn map_send_error(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            err.into()
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenDocument {
    data: TokenData,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    #[serde(default)]
    id: Option<String>,
    attributes: TokenAttributes,
}

#[derive(Debug, Deserialize)]
struct TokenAttributes {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDocument {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

/// Extract a human readable message from a JSON:API error body
///
/// Terraform Cloud answers either `{"errors": ["msg"]}` or
/// `{"errors": [{"title": ..., "detail": ...}]}`.
fn error_message(status: StatusCode, body: &str) -> String {
    let messages: Vec<String> = serde_json::from_str::<ErrorDocument>(body)
        .map(|doc| {
            doc.errors
                .iter()
                .filter_map(|e| match e {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Object(obj) => {
                        let title = obj.get("title").and_then(|v| v.as_str());
                        let detail = obj.get("detail").and_then(|v| v.as_str());
                        match (title, detail) {
                            (Some(t), Some(d)) => Some(format!("{}: {}", t, d)),
                            (Some(t), None) => Some(t.to_string()),
                            (None, Some(d)) => Some(d.to_string()),
                            (None, None) => None,
                        }
                    }
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if messages.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    } else {
        messages.join("; ")
    }
}

#[async_trait]
impl TokenProvider for TerraformCloudProvider {
    async fn create_token(&self, request: &TokenRequest) -> Result<MintedToken> {
        let url = Self::token_url(&request.address, &request.scope)?;
        debug!(url = %url, kind = %request.scope.kind(), "Requesting upstream token");

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&request.trust_anchor)
            .header(header::CONTENT_TYPE, JSON_API)
            .header(header::ACCEPT, JSON_API)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            let message = error_message(status, &body);
            warn!(status = status.as_u16(), error = %message, "Upstream rejected token request");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let document: TokenDocument = serde_json::from_str(&body)?;
        let token = document
            .data
            .attributes
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| UpstreamError::InvalidResponse("response contains no token".into()))?;

        let mut minted = MintedToken::for_scope(token, &request.scope);
        if let Some(id) = document.data.id {
            minted = minted.with_token_id(id);
        }
        Ok(minted)
    }

    async fn revoke_token(&self, request: &TokenRequest) -> Result<()> {
        let url = Self::token_url(&request.address, &request.scope)?;
        debug!(url = %url, kind = %request.scope.kind(), "Deleting upstream token");

        let response = self
            .http_client
            .delete(url)
            .bearer_auth(&request.trust_anchor)
            .header(header::ACCEPT, JSON_API)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            // Nothing to delete: the token is already gone upstream
            debug!("Upstream token already absent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(UpstreamError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    fn description(&self) -> &str {
        "Terraform Cloud token provider"
    }
}
