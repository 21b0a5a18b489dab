// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Login response parsing.

use serde::Deserialize;

/// Token data returned by a successful login.
///
/// # Examples
///
/// ```
/// use alphaess_cloud::response::LoginResponse;
///
/// let json = r#"{
///     "AccessToken": "eyJhbGciOi",
///     "ExpiresIn": 36000,
///     "TokenCreateTime": "2024-01-01 12:00:00",
///     "RefreshTokenKey": "d2f1c0"
/// }"#;
/// let login: LoginResponse = serde_json::from_str(json).unwrap();
/// assert_eq!(login.access_token, "eyJhbGciOi");
/// assert_eq!(login.expires_in, 36000);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    #[serde(rename = "AccessToken")]
    pub access_token: String,

    /// Token lifetime in seconds.
    #[serde(rename = "ExpiresIn")]
    pub expires_in: i64,

    /// Token used to renew the session.
    #[serde(rename = "RefreshTokenKey")]
    pub refresh_token: String,
}
