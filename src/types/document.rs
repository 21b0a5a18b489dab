// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loosely typed settings documents.
//!
//! The cloud returns system settings as a flat JSON object whose shape is
//! only partially known. Documents are kept as ordered JSON maps so every
//! field, known or not, is sent back untouched on update.
//!
//! The cloud is not consistent about scalar encoding: the same field may
//! arrive as `16` or `"16"`. The helpers here accept both.

use serde_json::{Map, Value};

/// An ordered JSON object as returned and accepted by the settings endpoints.
pub type SettingsDocument = Map<String, Value>;

/// Returns a scalar as a string key: strings as-is, numbers in decimal form.
#[must_use]
pub fn value_as_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Returns a non-negative integer from a number or a numeric string.
#[must_use]
pub fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Returns a float from a number or a numeric string.
#[must_use]
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Returns a non-empty string field of a document.
#[must_use]
pub fn string_field(document: &SettingsDocument, key: &str) -> Option<String> {
    document.get(key).and_then(value_as_key)
}

/// Returns an identifier field both as a string key and as the raw value.
///
/// The key is used for local lookups; the raw value is what gets sent back
/// to the cloud, so a numeric id stays numeric.
#[must_use]
pub fn id_field(document: &SettingsDocument, key: &str) -> Option<(String, Value)> {
    let raw = document.get(key)?;
    value_as_key(raw).map(|id| (id, raw.clone()))
}
