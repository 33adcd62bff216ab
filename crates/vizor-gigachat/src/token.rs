//! Access token cache with single-flight refresh.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use reqwest::Client;
use reqwest::header::ACCEPT;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::typed::TokenResponse;
use crate::{Error, GigaChatConfig, Result, Stage, TRACING_TARGET_AUTH};

/// A cached token is never handed out this close to its expiry.
pub const TOKEN_SAFETY_MARGIN: SignedDuration = SignedDuration::from_mins(2);

/// Bearer token with its absolute expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
    expires_at: Timestamp,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_at: Timestamp) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    /// Returns the raw bearer value.
    #[inline]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    #[inline]
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Returns whether the token outlives `now` by more than [`TOKEN_SAFETY_MARGIN`].
    pub fn is_fresh_at(&self, now: Timestamp) -> bool {
        self.expires_at.duration_since(now) > TOKEN_SAFETY_MARGIN
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Process-local cache of the provider access token.
///
/// Readers take a shared lock only to copy the cached value. A stale token is
/// refreshed under a dedicated mutex, so concurrent callers that find the cache
/// stale wait for one refresh and then all receive its result.
pub struct TokenCache {
    http: Client,
    auth_url: String,
    auth_key: String,
    scope: String,
    current: RwLock<Option<AccessToken>>,
    refresh: Mutex<()>,
}

impl TokenCache {
    /// Creates an empty cache that authenticates through `http`.
    pub fn new(http: Client, config: &GigaChatConfig) -> Self {
        Self {
            http,
            auth_url: config.gigachat_auth_url.clone(),
            auth_key: config.gigachat_auth_key.trim().to_owned(),
            scope: config.gigachat_scope.clone(),
            current: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Returns a token valid for at least [`TOKEN_SAFETY_MARGIN`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthFailure`] when the provider rejects the key. Nothing
    /// is cached on failure, so the next call authenticates again.
    pub async fn get_token(&self) -> Result<AccessToken> {
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let _refresh = self.refresh.lock().await;

        if let Some(token) = self.cached().await {
            tracing::trace!(target: TRACING_TARGET_AUTH, "Token refreshed by a concurrent caller");
            return Ok(token);
        }

        let token = self.authenticate().await?;
        *self.current.write().await = Some(token.clone());

        Ok(token)
    }

    async fn cached(&self) -> Option<AccessToken> {
        let now = Timestamp::now();
        self.current
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_fresh_at(now))
            .cloned()
    }

    #[tracing::instrument(skip_all, target = TRACING_TARGET_AUTH)]
    async fn authenticate(&self) -> Result<AccessToken> {
        let request_uid = Uuid::new_v4();
        tracing::debug!(
            target: TRACING_TARGET_AUTH,
            %request_uid,
            scope = %self.scope,
            "Requesting access token"
        );

        let response = self
            .http
            .post(&self.auth_url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", self.auth_key))
            .header("RqUID", request_uid.to_string())
            .header(ACCEPT, "application/json")
            .form(&[("scope", self.scope.as_str())])
            .send()
            .await
            .map_err(Error::http(Stage::Auth))?;

        let status = response.status();
        let body = response.text().await.map_err(Error::http(Stage::Auth))?;

        if !status.is_success() {
            tracing::warn!(
                target: TRACING_TARGET_AUTH,
                %request_uid,
                status = status.as_u16(),
                "Provider rejected authentication"
            );
            return Err(Error::AuthFailure { status, body });
        }

        let decoded: TokenResponse =
            serde_json::from_str(&body).map_err(Error::decode(Stage::Auth))?;

        let (Some(secret), Some(expires_at_ms)) = (decoded.access_token, decoded.expires_at) else {
            return Err(Error::AuthFailure { status, body });
        };

        let expires_at = Timestamp::from_millisecond(expires_at_ms)
            .map_err(|_| Error::AuthFailure { status, body: body.clone() })?;

        let token = AccessToken::new(secret, expires_at);
        if !token.is_fresh_at(Timestamp::now()) {
            tracing::warn!(
                target: TRACING_TARGET_AUTH,
                %request_uid,
                %expires_at,
                "Issued token expires within the safety margin"
            );
            return Err(Error::AuthFailure { status, body });
        }

        tracing::info!(
            target: TRACING_TARGET_AUTH,
            %request_uid,
            %expires_at,
            "Access token refreshed"
        );

        Ok(token)
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("auth_url", &self.auth_url)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockito::Matcher;

    use super::*;

    const KEY: &str = "dGVzdC1jbGllbnQ6dGVzdC1zZWNyZXQ=";

    fn cache_for(server: &mockito::Server) -> TokenCache {
        let config = GigaChatConfig::new(KEY).with_auth_url(format!("{}/oauth", server.url()));
        TokenCache::new(Client::new(), &config)
    }

    fn token_body(secret: &str, expires_in: SignedDuration) -> String {
        let expires_at = Timestamp::now() + expires_in;
        serde_json::json!({
            "access_token": secret,
            "expires_at": expires_at.as_millisecond(),
        })
        .to_string()
    }

    #[test]
    fn freshness_respects_safety_margin() {
        let now = Timestamp::now();
        let token = AccessToken::new("t", now + SignedDuration::from_mins(5));

        assert!(token.is_fresh_at(now));
        assert!(!token.is_fresh_at(now + SignedDuration::from_mins(3)));
        assert!(!format!("{token:?}").contains("\"t\""));
    }

    #[tokio::test]
    async fn fresh_token_is_reused_without_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth")
            .match_header("authorization", format!("Basic {KEY}").as_str())
            .match_header("rquid", Matcher::Regex("^[0-9a-f-]{36}$".to_owned()))
            .match_header("accept", "application/json")
            .match_body(Matcher::UrlEncoded(
                "scope".to_owned(),
                "GIGACHAT_API_PERS".to_owned(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(token_body("first", SignedDuration::from_mins(30)))
            .expect(1)
            .create_async()
            .await;

        let cache = cache_for(&server);
        let first = cache.get_token().await.expect("first call authenticates");
        let second = cache.get_token().await.expect("second call hits the cache");

        assert_eq!(first.secret(), "first");
        assert_eq!(first, second);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth")
            .with_status(200)
            .with_body(token_body("shared", SignedDuration::from_mins(30)))
            .expect(1)
            .create_async()
            .await;

        let cache = Arc::new(cache_for(&server));
        let tasks = (0..16).map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get_token().await })
        });

        let tokens = futures::future::join_all(tasks).await;
        for token in tokens {
            let token = token.expect("task should not panic").expect("token");
            assert_eq!(token.secret(), "shared");
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn token_issued_inside_margin_is_never_used() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth")
            .with_status(200)
            .with_body(token_body("short", SignedDuration::from_secs(60)))
            .expect(2)
            .create_async()
            .await;

        let cache = cache_for(&server);
        for _ in 0..2 {
            let error = cache.get_token().await.expect_err("short token is rejected");
            assert!(matches!(error, Error::AuthFailure { .. }));
        }
        assert!(cache.cached().await.is_none());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn stale_cached_token_is_refreshed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth")
            .with_status(200)
            .with_body(token_body("renewed", SignedDuration::from_mins(30)))
            .expect(1)
            .create_async()
            .await;

        let cache = cache_for(&server);
        *cache.current.write().await = Some(AccessToken::new(
            "stale",
            Timestamp::now() + SignedDuration::from_secs(60),
        ));

        let token = cache.get_token().await.expect("refresh");
        assert_eq!(token.secret(), "renewed");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn failed_refresh_is_not_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth")
            .with_status(401)
            .with_body(r#"{"message":"Authorization error"}"#)
            .expect(2)
            .create_async()
            .await;

        let cache = cache_for(&server);
        for _ in 0..2 {
            let error = cache.get_token().await.expect_err("auth must fail");
            match error {
                Error::AuthFailure { status, body } => {
                    assert_eq!(status.as_u16(), 401);
                    assert!(body.contains("Authorization error"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn success_without_token_is_auth_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth")
            .with_status(200)
            .with_body(r#"{"expires_at": 0}"#)
            .create_async()
            .await;

        let error = cache_for(&server)
            .get_token()
            .await
            .expect_err("missing token must fail");
        assert!(matches!(error, Error::AuthFailure { .. }));
    }
}
