// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `alphaess_cloud` library.
//!
//! Credential and token problems are reported before any request leaves the
//! client. Caller-supplied values that fall outside the accepted ranges are
//! reported as [`Error::InvalidInput`]. Transport and parse failures keep
//! their own categories so they can be told apart from a plain non-200 reply.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Username, password or session token is missing.
    #[error("login required: {0}")]
    LoginRequired(String),

    /// The session token reached its expiry time.
    #[error("login expired at {expired_at}")]
    LoginExpired {
        /// Expiry timestamp of the stale token.
        expired_at: DateTime<Utc>,
    },

    /// A caller-supplied parameter is out of its allowed range.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValueError),

    /// The cloud answered with something the client cannot map, or the
    /// call did not succeed where success is mandatory.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Error occurred during HTTP communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response body.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u32,
        /// Maximum allowed value.
        max: u32,
        /// The actual value that was provided.
        actual: u32,
    },

    /// State-of-charge bounds violate `20 <= min < max <= 100`.
    #[error("invalid state of charge cap: min {min}%, max {max}% (expected 20 <= min < max <= 100)")]
    InvalidStateOfChargeCap {
        /// Requested lower bound in percent.
        min: u8,
        /// Requested upper bound in percent.
        max: u8,
    },

    /// Charging mode code is not one of the known modes.
    #[error("unknown charging mode: {0}")]
    UnknownChargingMode(u8),

    /// Neither an ampere nor a watt value was given.
    #[error("either ampere or watts must be given")]
    MissingChargeCurrent,
}

/// Errors related to HTTP communication with the cloud.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed before a status code was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid base URL.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to parsing cloud responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Failed to interpret a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
