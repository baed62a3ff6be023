//! Token endpoint client
//!
//! Handles the two token endpoint interactions:
//! 1. Authorization code exchange (callback completion)
//! 2. Token refresh (client asks for a new access token)
//!
//! Both POST a form body to `{accounts_url}/api/token` with HTTP Basic
//! client authentication. Each call is a single attempt; callers decide how
//! to surface a failure.

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::authorize::build_authorization_url;
use crate::constants::TOKEN_PATH;
use crate::credentials::ClientCredentials;
use crate::error::{Error, Result};

/// Response body from the token endpoint.
///
/// `refresh_token` is always present after a code exchange. On refresh the
/// provider only includes it when it rotates the refresh token.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    /// Seconds until the access token expires
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// Tokens obtained from a successful code exchange.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: Option<u64>,
}

/// Client for the accounts service of one registered application.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    accounts_url: String,
    credentials: ClientCredentials,
    redirect_uri: String,
}

impl AuthClient {
    pub fn new(
        http: reqwest::Client,
        accounts_url: impl Into<String>,
        credentials: ClientCredentials,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            http,
            accounts_url: accounts_url.into().trim_end_matches('/').to_string(),
            credentials,
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Consent page URL carrying `state` for the callback check.
    pub fn authorization_url(&self, scope: &str, state: &str) -> String {
        build_authorization_url(
            &self.accounts_url,
            self.credentials.client_id(),
            scope,
            &self.redirect_uri,
            state,
        )
    }

    fn token_url(&self) -> String {
        format!("{}{}", self.accounts_url, TOKEN_PATH)
    }

    /// Exchange an authorization code for an access/refresh token pair.
    ///
    /// `redirect_uri` must be the same value sent on the authorization
    /// request; the provider rejects the exchange otherwise.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenPair> {
        let response = self
            .http
            .post(self.token_url())
            .header(AUTHORIZATION, self.credentials.basic_authorization())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::TokenExchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token = parse_token_response(response, "token").await?;
        let refresh_token = token.refresh_token.ok_or_else(|| {
            Error::TokenExchange("token response is missing refresh_token".into())
        })?;

        debug!(expires_in = ?token.expires_in, "authorization code exchanged");
        Ok(TokenPair {
            access_token: token.access_token,
            refresh_token,
            expires_in: token.expires_in,
        })
    }

    /// Mint a new access token from a refresh token.
    pub async fn refresh_token(&self, refresh: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(self.token_url())
            .header(AUTHORIZATION, self.credentials.basic_authorization())
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh)])
            .send()
            .await
            .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));

            // invalid_grant (400) and 401/403 mean the refresh token or the
            // client credentials were rejected
            if matches!(status.as_u16(), 400 | 401 | 403) {
                return Err(Error::InvalidCredentials(format!(
                    "refresh token rejected ({status}): {body}"
                )));
            }

            return Err(Error::TokenExchange(format!(
                "token refresh returned {status}: {body}"
            )));
        }

        let token = parse_token_response(response, "refresh").await?;
        debug!(
            rotated = token.refresh_token.is_some(),
            "access token refreshed"
        );
        Ok(token)
    }
}

async fn parse_token_response(response: reqwest::Response, kind: &str) -> Result<TokenResponse> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::Http(format!("reading {kind} response failed: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::TokenExchange(format!("invalid {kind} response: {e}")))
}
