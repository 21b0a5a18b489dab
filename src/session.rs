// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session and authentication lifecycle.
//!
//! A [`Session`] owns the account credentials and, after a successful
//! login, a [`SessionToken`]. Every authenticated request goes through
//! [`Session::validate_credentials`] first, so missing credentials or a stale
//! token are reported before anything is sent.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Value, json};

use crate::error::{Error, ParseError, Result};
use crate::protocol::{ApiResponse, AuthHeaders, CloudConfig, HttpClient, endpoint, signature_now};
use crate::response::LoginResponse;

/// Bearer token issued by a successful login.
///
/// Tokens are never modified; a new login replaces the whole token.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    access_token: String,
    refresh_token: String,
    lifetime_secs: i64,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionToken {
    fn from_login(login: LoginResponse, issued_at: DateTime<Utc>) -> Result<Self> {
        let expires_at = TimeDelta::try_seconds(login.expires_in)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .ok_or_else(|| ParseError::InvalidValue {
                field: "ExpiresIn".to_string(),
                message: format!("lifetime of {} seconds is out of range", login.expires_in),
            })?;

        Ok(Self {
            access_token: login.access_token,
            refresh_token: login.refresh_token,
            lifetime_secs: login.expires_in,
            issued_at,
            expires_at,
        })
    }

    /// Returns the bearer token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Returns the lifetime granted by the server, in seconds.
    #[must_use]
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Returns when the token was received.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Returns when the token stops being valid.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` if the token is no longer valid at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("lifetime_secs", &self.lifetime_secs)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Authenticated connection to the cloud.
#[derive(Debug)]
pub struct Session {
    config: CloudConfig,
    http: HttpClient,
    token: Option<SessionToken>,
}

impl Session {
    /// Creates a session that is not logged in yet.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created from `config`.
    pub fn new(config: CloudConfig) -> Result<Self> {
        let http = config.build_http_client()?;
        Ok(Self {
            config,
            http,
            token: None,
        })
    }

    /// Returns the configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    /// Returns the current token, if a login succeeded.
    #[must_use]
    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Returns `true` if a token is held, expired or not.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Checks that credentials, and optionally a live token, are present.
    ///
    /// # Errors
    ///
    /// - [`Error::LoginRequired`] if username or password is empty, or if
    ///   `require_token` is set and no token exists
    /// - [`Error::LoginExpired`] if `require_token` is set and the token
    ///   has expired
    pub fn validate_credentials(&self, require_token: bool) -> Result<()> {
        self.validate_credentials_at(require_token, Utc::now())
    }

    /// Same as [`validate_credentials`](Self::validate_credentials), with an
    /// explicit clock.
    ///
    /// # Errors
    ///
    /// See [`validate_credentials`](Self::validate_credentials).
    pub fn validate_credentials_at(&self, require_token: bool, now: DateTime<Utc>) -> Result<()> {
        if self.config.username().is_empty() {
            return Err(Error::LoginRequired("empty username".to_string()));
        }
        if self.config.password().is_empty() {
            return Err(Error::LoginRequired("empty password".to_string()));
        }
        if !require_token {
            return Ok(());
        }

        match &self.token {
            None => Err(Error::LoginRequired("no token, login first".to_string())),
            Some(token) if token.is_expired_at(now) => Err(Error::LoginExpired {
                expired_at: token.expires_at,
            }),
            Some(_) => Ok(()),
        }
    }

    /// Builds the headers for a request sent now.
    ///
    /// The bearer header is included whenever a token is held, even an
    /// expired one; expiry is enforced by
    /// [`validate_credentials`](Self::validate_credentials).
    #[must_use]
    pub fn auth_headers(&self) -> AuthHeaders {
        AuthHeaders::new(
            signature_now(),
            self.token.as_ref().map(SessionToken::access_token),
        )
    }

    /// Logs in with the configured credentials.
    ///
    /// Returns `Ok(true)` when a new token was stored. A non-200 reply leaves
    /// the current token untouched and returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns error if credentials are empty, the request cannot be sent, or
    /// a 200 reply does not carry token data.
    pub async fn login(&mut self) -> Result<bool> {
        self.validate_credentials(false)?;

        let body = json!({
            "username": self.config.username(),
            "password": self.config.password(),
        });
        let response = self
            .http
            .post_json(endpoint::LOGIN, &body, &self.auth_headers())
            .await?;

        if !response.is_success() {
            tracing::warn!(status = response.status(), "Login rejected");
            return Ok(false);
        }

        let login: LoginResponse = response.parse_data()?;
        let token = SessionToken::from_login(login, Utc::now())?;
        tracing::info!(expires_at = %token.expires_at, "Logged in");
        self.token = Some(token);
        Ok(true)
    }

    /// Drops the token locally. The server is not contacted.
    pub fn logout(&mut self) {
        self.token = None;
    }

    /// Sends an authenticated GET request.
    pub(crate) async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<ApiResponse> {
        self.validate_credentials(true)?;
        Ok(self.http.get(path, query, &self.auth_headers()).await?)
    }

    /// Sends an authenticated POST request with a JSON body.
    pub(crate) async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.validate_credentials(true)?;
        Ok(self.http.post_json(path, body, &self.auth_headers()).await?)
    }
}
