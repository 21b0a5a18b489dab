// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire-level pieces of the AlphaESS cloud API.
//!
//! - [`CloudConfig`] / [`HttpClient`]: connection settings and transport
//! - [`signature_at`] / [`signature_now`]: the time-based request signature
//! - [`AuthHeaders`]: headers attached to every request
//! - [`ApiResponse`]: status code plus raw body, with access to the
//!   `data` envelope field
//! - [`endpoint`]: paths relative to the API base URL

mod http;
mod signature;

pub use http::{CloudConfig, HttpClient};
pub use signature::{Signature, signature_at, signature_now};

use serde_json::Value;

use crate::error::ParseError;

/// Public API base URL.
pub const BASE_URL: &str = "https://cloud.alphaess.com/api/";

/// Header carrying the request signature.
pub const HEADER_AUTH_SIGNATURE: &str = "Authsignature";
/// Header carrying the signature timestamp.
pub const HEADER_AUTH_TIMESTAMP: &str = "Authtimestamp";
/// Header carrying the bearer token.
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// Endpoint paths, relative to the base URL.
pub mod endpoint {
    /// POST: exchange credentials for a token.
    pub const LOGIN: &str = "Account/Login";
    /// GET: settings document of one system (`system_id` query).
    pub const GET_SETTINGS: &str = "Account/GetCustomUseESSSetting";
    /// GET: systems owned by the account.
    pub const GET_SYSTEM_LIST: &str = "Account/GetCustomUseESSList";
    /// POST: replace the settings document of one system.
    pub const SET_SETTINGS: &str = "Account/CustomUseESSSetting";
    /// POST: start charging on a pile.
    pub const START_CHARGING: &str = "ESS/StartCharging";
    /// POST: stop charging on a pile.
    pub const STOP_CHARGING: &str = "ESS/StopCharging";
    /// POST: current status of a pile.
    pub const GET_CHARGING_STATUS: &str = "ESS/GetChargingStatus";
    /// GET: latest power flow of a system (`sys_sn` query).
    pub const GET_LAST_POWER_DATA: &str = "ESS/GetLastPowerDataBySN";
}

/// Headers attached to a request.
///
/// Always contains the signature and its timestamp; contains the bearer
/// authorization only once a token exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthHeaders {
    headers: Vec<(&'static str, String)>,
}

impl AuthHeaders {
    /// Builds the header set from a signature and an optional access token.
    #[must_use]
    pub fn new(signature: Signature, access_token: Option<&str>) -> Self {
        let mut headers = vec![
            (HEADER_AUTH_SIGNATURE, signature.signature),
            (HEADER_AUTH_TIMESTAMP, signature.timestamp),
        ];
        if let Some(token) = access_token {
            headers.push((HEADER_AUTHORIZATION, format!("Bearer {token}")));
        }
        Self { headers }
    }

    /// Returns the value of a header, matched case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.headers.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns `true` if no header is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Response received from the cloud.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: String,
}

impl ApiResponse {
    /// Creates a response from a status code and raw body.
    #[must_use]
    pub fn new(status: u16, body: String) -> Self {
        Self { status, body }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns `true` for HTTP 200, the only status the cloud uses for
    /// success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Extracts the `data` payload of the response envelope.
    ///
    /// # Errors
    ///
    /// Returns error if the body is not JSON or has no `data` field.
    pub fn data(&self) -> Result<Value, ParseError> {
        let mut envelope: Value = serde_json::from_str(&self.body)?;
        match envelope.get_mut("data") {
            Some(data) => Ok(data.take()),
            None => Err(ParseError::MissingField("data".to_string())),
        }
    }

    /// Extracts the `data` payload and deserializes it into `T`.
    ///
    /// # Errors
    ///
    /// Returns error if the envelope or the payload cannot be parsed.
    pub fn parse_data<T: serde::de::DeserializeOwned>(&self) -> Result<T, ParseError> {
        serde_json::from_value(self.data()?).map_err(Into::into)
    }
}
