// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EV charging piles attached to a system.

use serde_json::{Value, json};

use crate::error::{Error, ParseError, Result};
use crate::protocol::endpoint;
use crate::response::ChargingStatusResponse;
use crate::session::Session;
use crate::types::{
    ChargeCurrent, ChargingMode, ChargingStatus, SettingsDocument, id_field, string_field,
    value_as_key, value_as_u32,
};

use super::{KEY_CHARGING_PILE_LIST, KEY_SERIAL, KEY_SYSTEM_ID, System, post_settings_document};

/// Pile identifier.
pub const KEY_PILE_ID: &str = "chargingpile_id";
/// Pile serial number.
pub const KEY_PILE_SERIAL: &str = "chargingpile_sn";
/// Pile display name.
pub const KEY_PILE_NAME: &str = "chargingpile_name";
/// Hardware current limit in amperes.
pub const KEY_HARDWARE_MAX_CURRENT: &str = "hardware_max_current";
/// User-configured current limit in amperes.
pub const KEY_MAX_CURRENT: &str = "max_current";
/// Charging mode code.
pub const KEY_CHARGING_MODE: &str = "chargingmode";

/// Current limit assumed when the pile reports none.
const DEFAULT_MAX_AMPERE: u32 = 16;

/// One EV charging point attached to a [`System`].
///
/// Piles are rebuilt from the settings document on every settings fetch.
#[derive(Debug, Clone)]
pub struct ChargingPile {
    pile_id: String,
    pile_id_value: Value,
    serial_number: String,
    name: Option<String>,
    hardware_max_current: Option<u32>,
    max_current: Option<u32>,
    charging_mode: Option<ChargingMode>,
    status: Option<ChargingStatus>,
    settings: SettingsDocument,
}

impl ChargingPile {
    /// Creates a pile from its fragment of the settings document.
    ///
    /// # Errors
    ///
    /// Returns error if the fragment has no pile id or serial number.
    pub fn from_settings(settings: SettingsDocument) -> std::result::Result<Self, ParseError> {
        let (pile_id, pile_id_value) = id_field(&settings, KEY_PILE_ID)
            .ok_or_else(|| ParseError::MissingField(KEY_PILE_ID.to_string()))?;
        let serial_number = string_field(&settings, KEY_PILE_SERIAL)
            .ok_or_else(|| ParseError::MissingField(KEY_PILE_SERIAL.to_string()))?;

        let charging_mode = settings
            .get(KEY_CHARGING_MODE)
            .and_then(value_as_u32)
            .and_then(|code| u8::try_from(code).ok())
            .and_then(|code| ChargingMode::try_from(code).ok());

        Ok(Self {
            name: string_field(&settings, KEY_PILE_NAME),
            hardware_max_current: settings.get(KEY_HARDWARE_MAX_CURRENT).and_then(value_as_u32),
            max_current: settings.get(KEY_MAX_CURRENT).and_then(value_as_u32),
            charging_mode,
            status: None,
            pile_id,
            pile_id_value,
            serial_number,
            settings,
        })
    }

    /// Returns the pile id.
    #[must_use]
    pub fn pile_id(&self) -> &str {
        &self.pile_id
    }

    /// Returns the pile id as the cloud sent it (number or string).
    #[must_use]
    pub fn pile_id_value(&self) -> &Value {
        &self.pile_id_value
    }

    /// Returns the serial number.
    #[must_use]
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the hardware current limit in amperes.
    #[must_use]
    pub fn hardware_max_current(&self) -> Option<u32> {
        self.hardware_max_current
    }

    /// Returns the user-configured current limit in amperes.
    #[must_use]
    pub fn max_current(&self) -> Option<u32> {
        self.max_current
    }

    /// Upper bound for [`PileHandle::change_charging_current`]: the
    /// configured limit, else the hardware limit, else 16 A.
    #[must_use]
    pub fn current_limit(&self) -> u32 {
        self.max_current
            .or(self.hardware_max_current)
            .unwrap_or(DEFAULT_MAX_AMPERE)
    }

    /// Returns the charging mode from the last settings fetch.
    #[must_use]
    pub fn charging_mode(&self) -> Option<ChargingMode> {
        self.charging_mode
    }

    /// Returns the last fetched charging status.
    #[must_use]
    pub fn status(&self) -> Option<&ChargingStatus> {
        self.status.as_ref()
    }

    /// Returns the settings fragment this pile was built from.
    #[must_use]
    pub fn settings(&self) -> &SettingsDocument {
        &self.settings
    }

    /// Builds the full settings document that applies `updates` to this pile.
    ///
    /// See [`merge_pile_settings`] for the merge rules.
    #[must_use]
    pub fn build_settings_document(
        &self,
        system: &System,
        updates: &SettingsDocument,
    ) -> SettingsDocument {
        merge_pile_settings(&system.settings, &system.system_id_value, self, updates)
    }
}

/// Builds a full system settings document carrying a pile update.
///
/// 1. The pile's own fragment is cloned, `updates` applied on top and the
///    system id injected as the cloud sent it.
/// 2. The system snapshot is cloned and the matching entry of
///    `charging_pile_list` is replaced by the updated fragment.
/// 3. Every key of the updated fragment is also written to the top level of
///    the document, overwriting what is there.
///
/// The result only depends on the stored snapshots and `updates`, so
/// building twice with the same `updates` gives the same document.
#[must_use]
pub fn merge_pile_settings(
    system_settings: &SettingsDocument,
    system_id: &Value,
    pile: &ChargingPile,
    updates: &SettingsDocument,
) -> SettingsDocument {
    let mut fragment = pile.settings.clone();
    for (key, value) in updates {
        fragment.insert(key.clone(), value.clone());
    }
    fragment.insert(KEY_SYSTEM_ID.to_string(), system_id.clone());

    let mut document = system_settings.clone();
    let mut replaced = false;
    if let Some(Value::Array(list)) = document.get_mut(KEY_CHARGING_PILE_LIST) {
        for entry in list.iter_mut() {
            let id = entry.get(KEY_PILE_ID).and_then(value_as_key);
            if id.as_deref() == Some(pile.pile_id.as_str()) {
                *entry = Value::Object(fragment.clone());
                replaced = true;
            }
        }
    }
    if !replaced {
        tracing::warn!(pile_id = %pile.pile_id, "Pile not found in settings snapshot");
    }

    for (key, value) in fragment {
        document.insert(key, value);
    }
    document
}

/// A [`ChargingPile`] bound to the session and its parent system, for
/// network operations.
///
/// Obtained from [`SystemHandle::pile`](super::SystemHandle::pile).
#[derive(Debug)]
pub struct PileHandle<'a> {
    session: &'a Session,
    system_id: &'a Value,
    system_serial: &'a str,
    system_settings: &'a SettingsDocument,
    pile: &'a mut ChargingPile,
}

impl<'a> PileHandle<'a> {
    pub(crate) fn new(
        session: &'a Session,
        system_id: &'a Value,
        system_serial: &'a str,
        system_settings: &'a SettingsDocument,
        pile: &'a mut ChargingPile,
    ) -> Self {
        Self {
            session,
            system_id,
            system_serial,
            system_settings,
            pile,
        }
    }

    /// Returns the pile.
    #[must_use]
    pub fn pile(&self) -> &ChargingPile {
        &*self.pile
    }

    async fn switch_charging(&self, path: &str) -> Result<bool> {
        let body = json!({
            KEY_SERIAL: self.system_serial,
            KEY_PILE_SERIAL: self.pile.serial_number,
        });
        let response = self.session.post(path, &body).await?;

        if !response.is_success() {
            tracing::warn!(
                pile_id = %self.pile.pile_id,
                path,
                status = response.status(),
                "Charging command rejected"
            );
            return Ok(false);
        }
        Ok(true)
    }

    /// Starts charging.
    ///
    /// Local state is not updated; fetch the status to observe the effect.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not valid or the request cannot be
    /// sent.
    pub async fn start_charging(&self) -> Result<bool> {
        self.switch_charging(endpoint::START_CHARGING).await
    }

    /// Stops charging.
    ///
    /// Local state is not updated; fetch the status to observe the effect.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not valid or the request cannot be
    /// sent.
    pub async fn stop_charging(&self) -> Result<bool> {
        self.switch_charging(endpoint::STOP_CHARGING).await
    }

    /// Fetches the charging status and stores it on the pile.
    ///
    /// Unlike the other pile operations, a failed call is always an error so
    /// it cannot be mistaken for a status.
    ///
    /// # Errors
    ///
    /// - [`Error::LoginRequired`] or [`Error::LoginExpired`] if the session
    ///   is not valid
    /// - [`Error::InvalidResponse`] if the request cannot be sent, the cloud
    ///   does not answer with 200, or the reply carries no known status code
    pub async fn fetch_charging_status(&mut self) -> Result<ChargingStatus> {
        let body = json!({
            KEY_SERIAL: self.system_serial,
            KEY_PILE_ID: self.pile.pile_id_value,
        });
        let response = self
            .session
            .post(endpoint::GET_CHARGING_STATUS, &body)
            .await
            .map_err(|e| match e {
                Error::Protocol(e) => {
                    Error::InvalidResponse(format!("charging status request failed: {e}"))
                }
                other => other,
            })?;

        if !response.is_success() {
            return Err(Error::InvalidResponse(format!(
                "charging status request failed with HTTP {}",
                response.status()
            )));
        }

        let code = response
            .data()
            .and_then(|data| ChargingStatusResponse::from_data(&data))
            .map_err(|e| Error::InvalidResponse(format!("malformed charging status reply: {e}")))?
            .code;
        let status = ChargingStatus::from_code(code).ok_or_else(|| {
            Error::InvalidResponse(format!("unknown charging pile status code {code}"))
        })?;

        tracing::debug!(pile_id = %self.pile.pile_id, status = %status, "Charging status fetched");
        self.pile.status = Some(status.clone());
        Ok(status)
    }

    /// Builds the full settings document that applies `updates` to this pile.
    #[must_use]
    pub fn build_settings_document(&self, updates: &SettingsDocument) -> SettingsDocument {
        merge_pile_settings(self.system_settings, self.system_id, &*self.pile, updates)
    }

    async fn post_update(&self, key: &str, value: String) -> Result<bool> {
        let mut updates = SettingsDocument::new();
        updates.insert(key.to_string(), Value::String(value));
        let document = self.build_settings_document(&updates);
        post_settings_document(self.session, self.system_id, self.system_serial, document).await
    }

    /// Changes the charging mode.
    ///
    /// Codes other than 1 (Slow), 2 (Normal), 3 (Fast) and 4 (Max) are
    /// ignored and return `Ok(false)` without contacting the cloud.
    ///
    /// The pile keeps its fetched settings; fetch settings again before the
    /// next change, or it will be built on the old values.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not valid or the request cannot be
    /// sent.
    pub async fn change_charging_mode(&self, mode: u8) -> Result<bool> {
        let Ok(mode) = ChargingMode::try_from(mode) else {
            tracing::debug!(pile_id = %self.pile.pile_id, mode, "Ignoring unknown charging mode");
            return Ok(false);
        };
        self.post_update(KEY_CHARGING_MODE, mode.code().to_string())
            .await
    }

    /// Changes the charge current limit.
    ///
    /// When `ampere` is `None` it is derived from `watts` assuming a 230 V
    /// three-phase supply (`watts / 690`, rounded down).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if neither value is given or the
    /// current is outside `6..=`[`ChargingPile::current_limit`], or any
    /// session or transport error.
    pub async fn change_charging_current(
        &self,
        ampere: Option<u32>,
        watts: Option<u32>,
    ) -> Result<bool> {
        let current = ChargeCurrent::resolve(ampere, watts, self.pile.current_limit())?;
        self.post_update(KEY_MAX_CURRENT, current.ampere().to_string())
            .await
    }
}
