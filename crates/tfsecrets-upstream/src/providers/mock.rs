//! Mock Token Provider
//!
//! For tests and local development - mints unique fake tokens in memory.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{Result, UpstreamError};
use crate::provider::TokenProvider;
use crate::types::{MintedToken, TokenRequest};

/// A call observed by the mock provider
#[derive(Debug, Clone)]
pub enum ProviderCall {
    Create(TokenRequest),
    Revoke(TokenRequest),
}

impl ProviderCall {
    pub fn request(&self) -> &TokenRequest {
        match self {
            ProviderCall::Create(request) | ProviderCall::Revoke(request) => request,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, ProviderCall::Create(_))
    }
}

/// Mock token provider
///
/// Every `create_token` call returns a fresh token shaped like a Terraform
/// Cloud token (`<id>.atlasv1.<secret>`). Calls are recorded so tests can
/// assert on the upstream request shape. A failure can be injected with
/// [`MockProvider::fail_with`], and a delay with [`MockProvider::with_delay`].
#[derive(Default)]
pub struct MockProvider {
    calls: Mutex<Vec<ProviderCall>>,
    failure: Mutex<Option<(u16, String)>>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new mock provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer every subsequent call with the given upstream status
    pub fn fail_with(&self, status: u16, message: impl Into<String>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some((status, message.into()));
    }

    /// Stop injecting failures
    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// All calls observed so far, in order
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of `create_token` calls observed
    pub fn created_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_create()).count()
    }

    /// Number of `revoke_token` calls observed
    pub fn revoked_count(&self) -> usize {
        self.calls().iter().filter(|c| !c.is_create()).count()
    }

    async fn answer(&self, call: ProviderCall) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);

        let failure = self
            .failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match failure {
            Some((status, message)) => Err(UpstreamError::Status { status, message }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TokenProvider for MockProvider {
    async fn create_token(&self, request: &TokenRequest) -> Result<MintedToken> {
        self.answer(ProviderCall::Create(request.clone())).await?;

        let id = Uuid::new_v4().simple().to_string();
        let secret = Uuid::new_v4().simple().to_string();
        let token = format!("{}.atlasv1.{}", &id[..14], secret);

        Ok(MintedToken::for_scope(token, &request.scope).with_token_id(format!("at-{}", &id[..16])))
    }

    async fn revoke_token(&self, request: &TokenRequest) -> Result<()> {
        self.answer(ProviderCall::Revoke(request.clone())).await
    }

    fn description(&self) -> &str {
        "mock token provider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfsecrets_core::{RoleScope, UpstreamConfig};

    fn request(scope: RoleScope) -> TokenRequest {
        let config = UpstreamConfig::new("tfc-abc", None).unwrap();
        TokenRequest::new(&config, scope)
    }

    fn team_scope() -> RoleScope {
        RoleScope::Team {
            organization: "acme".into(),
            team_id: "team-1".into(),
        }
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let provider = MockProvider::new();
        let req = request(team_scope());

        let first = provider.create_token(&req).await.unwrap();
        let second = provider.create_token(&req).await.unwrap();

        assert_ne!(first.token, second.token);
        assert_ne!(first.token_id, second.token_id);
        assert!(first.token.contains(".atlasv1."));
        assert_eq!(first.team_id.as_deref(), Some("team-1"));
    }

    #[tokio::test]
    async fn test_calls_recorded() {
        let provider = MockProvider::new();
        let req = request(team_scope());

        provider.create_token(&req).await.unwrap();
        provider.revoke_token(&req).await.unwrap();

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].is_create());
        assert_eq!(calls[0].request().scope, team_scope());
        assert_eq!(calls[0].request().trust_anchor, "tfc-abc");
        assert_eq!(provider.created_count(), 1);
        assert_eq!(provider.revoked_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let provider = MockProvider::new();
        provider.fail_with(503, "maintenance");

        let result = provider.create_token(&request(team_scope())).await;
        match result {
            Err(UpstreamError::Status { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("Expected Status error, got {:?}", other.map(|_| ())),
        }

        provider.clear_failure();
        assert!(provider.create_token(&request(team_scope())).await.is_ok());
    }
}
