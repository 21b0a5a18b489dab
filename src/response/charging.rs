// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Charging pile status response parsing.

use serde_json::Value;

use crate::error::ParseError;

/// Status code returned by the charging-status endpoint.
///
/// The cloud sends the code either bare (`"data": 3`) or wrapped in an
/// object (`"data": {"chargingpile_status": 3}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargingStatusResponse {
    /// Raw status code.
    pub code: i64,
}

impl ChargingStatusResponse {
    /// Field holding the code when the payload is an object.
    pub const STATUS_FIELD: &'static str = "chargingpile_status";

    /// Parses the `data` payload.
    ///
    /// # Errors
    ///
    /// Returns error if no integer status code can be found.
    pub fn from_data(data: &Value) -> Result<Self, ParseError> {
        let raw = match data {
            Value::Object(map) => map
                .get(Self::STATUS_FIELD)
                .ok_or_else(|| ParseError::MissingField(Self::STATUS_FIELD.to_string()))?,
            other => other,
        };

        status_code(raw)
            .map(|code| Self { code })
            .ok_or_else(|| ParseError::InvalidValue {
                field: Self::STATUS_FIELD.to_string(),
                message: format!("expected an integer status code, got {raw}"),
            })
    }
}

/// Reads an integral status code from a number or numeric string.
///
/// Integral floats such as `3.0` are accepted; fractional ones are not.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn status_code(value: &Value) -> Option<i64> {
    let float = match value {
        Value::Number(n) => {
            if let Some(code) = n.as_i64() {
                return Some(code);
            }
            n.as_f64()?
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(code) = s.parse() {
                return Some(code);
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };

    let in_range = float.fract() == 0.0 && float.abs() < i64::MAX as f64;
    in_range.then_some(float as i64)
}
