// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the AlphaESS cloud API.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::error::ProtocolError;
use crate::protocol::{ApiResponse, AuthHeaders, BASE_URL};

// ============================================================================
// CloudConfig - Connection and account settings
// ============================================================================

/// Configuration for an AlphaESS cloud session.
///
/// Holds the account credentials and the connection parameters used to build
/// the underlying HTTP client.
///
/// # Examples
///
/// ```
/// use alphaess_cloud::protocol::CloudConfig;
/// use std::time::Duration;
///
/// let config = CloudConfig::new("user@example.com", "secret")
///     .with_base_url("http://127.0.0.1:8080/api")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "http://127.0.0.1:8080/api/");
/// assert_eq!(config.username(), "user@example.com");
/// ```
#[derive(Clone)]
pub struct CloudConfig {
    username: String,
    password: String,
    base_url: String,
    timeout: Duration,
}

impl CloudConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the given account using the public
    /// cloud endpoint.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            base_url: BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the API base URL.
    ///
    /// A trailing `/` is added when missing so endpoint paths can be appended.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an http(s) URL or the HTTP client
    /// cannot be created.
    pub fn build_http_client(&self) -> Result<HttpClient, ProtocolError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProtocolError::InvalidAddress(self.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient {
            base_url: self.base_url.clone(),
            client,
        })
    }
}

impl std::fmt::Debug for CloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// HttpClient - Thin request/response wrapper
// ============================================================================

/// HTTP client for the cloud API.
///
/// Any status code is returned as an [`ApiResponse`]; deciding what a
/// non-200 reply means is left to the caller. Only transport failures are
/// reported as errors.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a GET request with query parameters.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent or the body cannot be read.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        headers: &AuthHeaders,
    ) -> Result<ApiResponse, ProtocolError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "Sending GET request");

        let mut request = self.client.get(&url).query(query);
        for (name, value) in headers.iter() {
            request = request.header(name, value);
        }

        Self::read(request.send().await.map_err(ProtocolError::Http)?).await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent or the body cannot be read.
    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
        headers: &AuthHeaders,
    ) -> Result<ApiResponse, ProtocolError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "Sending POST request");

        let mut request = self.client.post(&url).json(body);
        for (name, value) in headers.iter() {
            request = request.header(name, value);
        }

        Self::read(request.send().await.map_err(ProtocolError::Http)?).await
    }

    async fn read(response: reqwest::Response) -> Result<ApiResponse, ProtocolError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(ProtocolError::Http)?;

        tracing::debug!(status, "Received HTTP response");

        Ok(ApiResponse::new(status, body))
    }
}
