// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Energy systems and their charging piles.
//!
//! A [`System`] is one installation under the account. It holds the last
//! fetched settings document, which is the base every update is built on:
//! the settings endpoint only accepts whole documents, never sparse patches.
//!
//! Network operations live on [`SystemHandle`] and [`PileHandle`], which
//! borrow the [`Session`] next to the entity they act on.

mod pile;

pub use pile::{
    ChargingPile, KEY_CHARGING_MODE, KEY_HARDWARE_MAX_CURRENT, KEY_MAX_CURRENT, KEY_PILE_ID,
    KEY_PILE_NAME, KEY_PILE_SERIAL, PileHandle, merge_pile_settings,
};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{ParseError, Result};
use crate::protocol::endpoint;
use crate::response::{PowerData, PowerSnapshot};
use crate::session::Session;
use crate::types::{SettingsDocument, StateOfChargeCap, id_field, string_field};

/// System identifier.
pub const KEY_SYSTEM_ID: &str = "system_id";
/// System serial number.
pub const KEY_SERIAL: &str = "sys_sn";
/// Inverter model.
pub const KEY_MODEL_INVERTER: &str = "minv";
/// Battery model.
pub const KEY_MODEL_BATTERY: &str = "mbat";
/// Backup box firmware version; absent when no backup box is fitted.
pub const KEY_BACKUPBOX_VERSION: &str = "bakbox_ver";
/// Upper state-of-charge bound.
pub const KEY_SOC_HIGH: &str = "bat_high_cap";
/// Lower state-of-charge bound.
pub const KEY_SOC_LOW: &str = "bat_use_cap";
/// List of charging pile fragments inside a settings document.
pub const KEY_CHARGING_PILE_LIST: &str = "charging_pile_list";

/// One energy installation under the account.
#[derive(Debug, Clone)]
pub struct System {
    system_id: String,
    system_id_value: Value,
    serial_number: String,
    version_backupbox: Option<String>,
    model_inverter: Option<String>,
    model_battery: Option<String>,
    listing: SettingsDocument,
    settings: SettingsDocument,
    last_fetch: Option<DateTime<Utc>>,
    power_data: Option<Value>,
    power: Option<PowerSnapshot>,
    piles: BTreeMap<String, ChargingPile>,
}

impl System {
    /// Creates a system from one entry of the system list.
    ///
    /// # Errors
    ///
    /// Returns error if the entry has no system id or serial number.
    pub fn from_listing(entry: SettingsDocument) -> std::result::Result<Self, ParseError> {
        let (system_id, system_id_value) = id_field(&entry, KEY_SYSTEM_ID)
            .ok_or_else(|| ParseError::MissingField(KEY_SYSTEM_ID.to_string()))?;
        let serial_number = string_field(&entry, KEY_SERIAL)
            .ok_or_else(|| ParseError::MissingField(KEY_SERIAL.to_string()))?;

        Ok(Self {
            version_backupbox: string_field(&entry, KEY_BACKUPBOX_VERSION),
            model_inverter: string_field(&entry, KEY_MODEL_INVERTER),
            model_battery: string_field(&entry, KEY_MODEL_BATTERY),
            system_id,
            system_id_value,
            serial_number,
            listing: entry,
            settings: SettingsDocument::new(),
            last_fetch: None,
            power_data: None,
            power: None,
            piles: BTreeMap::new(),
        })
    }

    /// Returns the system id.
    #[must_use]
    pub fn system_id(&self) -> &str {
        &self.system_id
    }

    /// Returns the system id as the cloud sent it (number or string).
    #[must_use]
    pub fn system_id_value(&self) -> &Value {
        &self.system_id_value
    }

    /// Returns the serial number.
    #[must_use]
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// Returns the inverter model, once known.
    #[must_use]
    pub fn model_inverter(&self) -> Option<&str> {
        self.model_inverter.as_deref()
    }

    /// Returns the battery model, once known.
    #[must_use]
    pub fn model_battery(&self) -> Option<&str> {
        self.model_battery.as_deref()
    }

    /// Returns the backup box version, if one is fitted.
    #[must_use]
    pub fn version_backupbox(&self) -> Option<&str> {
        self.version_backupbox.as_deref()
    }

    /// Returns `true` if a backup box is fitted.
    #[must_use]
    pub fn has_backupbox(&self) -> bool {
        self.version_backupbox.is_some()
    }

    /// Returns the raw system-list entry this system was created from.
    #[must_use]
    pub fn listing(&self) -> &SettingsDocument {
        &self.listing
    }

    /// Returns the last fetched settings document (empty before the first
    /// fetch).
    #[must_use]
    pub fn settings(&self) -> &SettingsDocument {
        &self.settings
    }

    /// Returns when settings were last fetched.
    #[must_use]
    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    /// Returns the raw payload of the last power-data fetch.
    #[must_use]
    pub fn power_data(&self) -> Option<&Value> {
        self.power_data.as_ref()
    }

    /// Returns the aggregated values of the last power-data fetch.
    #[must_use]
    pub fn power(&self) -> Option<&PowerSnapshot> {
        self.power.as_ref()
    }

    /// Returns the charging piles, keyed by pile id.
    #[must_use]
    pub fn piles(&self) -> &BTreeMap<String, ChargingPile> {
        &self.piles
    }

    /// Returns a charging pile by id.
    #[must_use]
    pub fn pile(&self, pile_id: &str) -> Option<&ChargingPile> {
        self.piles.get(pile_id)
    }

    /// Replaces the settings snapshot and everything derived from it.
    pub(crate) fn apply_settings(&mut self, document: SettingsDocument, fetched_at: DateTime<Utc>) {
        self.last_fetch = Some(fetched_at);
        self.model_inverter = string_field(&document, KEY_MODEL_INVERTER);
        self.model_battery = string_field(&document, KEY_MODEL_BATTERY);
        self.version_backupbox = string_field(&document, KEY_BACKUPBOX_VERSION);

        self.piles.clear();
        if let Some(Value::Array(list)) = document.get(KEY_CHARGING_PILE_LIST) {
            for entry in list {
                let Value::Object(fragment) = entry else {
                    tracing::warn!(system_id = %self.system_id, "Skipping non-object charging pile entry");
                    continue;
                };
                match ChargingPile::from_settings(fragment.clone()) {
                    Ok(pile) => {
                        self.piles.insert(pile.pile_id().to_string(), pile);
                    }
                    Err(e) => {
                        tracing::warn!(system_id = %self.system_id, error = %e, "Skipping charging pile entry");
                    }
                }
            }
        }

        self.settings = document;
    }

    pub(crate) fn apply_power_data(&mut self, payload: Value) -> std::result::Result<(), ParseError> {
        let data: PowerData = serde_json::from_value(payload.clone())?;
        self.power = Some(data.snapshot());
        self.power_data = Some(payload);
        Ok(())
    }

    /// Builds the full settings document that sets the given state-of-charge
    /// bounds, starting from the current snapshot.
    #[must_use]
    pub fn state_of_charge_document(&self, cap: StateOfChargeCap) -> SettingsDocument {
        let mut document = self.settings.clone();
        document.insert(KEY_SOC_HIGH.to_string(), Value::String(cap.max().to_string()));
        document.insert(KEY_SOC_LOW.to_string(), Value::String(cap.min().to_string()));
        document
    }
}

/// Posts a complete settings document for a system.
///
/// The system id and serial number are written into the document before
/// sending, the id in the type the cloud used for it. Returns whether the
/// cloud answered with 200.
async fn post_settings_document(
    session: &Session,
    system_id: &Value,
    serial_number: &str,
    mut document: SettingsDocument,
) -> Result<bool> {
    document.insert(KEY_SYSTEM_ID.to_string(), system_id.clone());
    document.insert(KEY_SERIAL.to_string(), Value::String(serial_number.to_string()));

    let response = session
        .post(endpoint::SET_SETTINGS, &Value::Object(document))
        .await?;

    if !response.is_success() {
        tracing::warn!(%system_id, status = response.status(), "Settings update rejected");
        return Ok(false);
    }
    tracing::debug!(%system_id, "Settings updated");
    Ok(true)
}

/// A [`System`] bound to the session, for network operations.
///
/// Obtained from [`AlphaCloud::system_mut`](crate::AlphaCloud::system_mut).
#[derive(Debug)]
pub struct SystemHandle<'a> {
    session: &'a Session,
    system: &'a mut System,
}

impl<'a> SystemHandle<'a> {
    pub(crate) fn new(session: &'a Session, system: &'a mut System) -> Self {
        Self { session, system }
    }

    /// Returns the system.
    #[must_use]
    pub fn system(&self) -> &System {
        &*self.system
    }

    /// Fetches the settings document and rebuilds the charging piles from it.
    ///
    /// Returns the document, or `None` if the cloud did not answer with 200;
    /// in that case nothing is changed.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not valid, the request cannot be sent,
    /// or a 200 reply does not carry a settings object.
    pub async fn fetch_settings(&mut self) -> Result<Option<SettingsDocument>> {
        let response = self
            .session
            .get(
                endpoint::GET_SETTINGS,
                &[(KEY_SYSTEM_ID, self.system.system_id.as_str())],
            )
            .await?;

        if !response.is_success() {
            tracing::warn!(
                system_id = %self.system.system_id,
                status = response.status(),
                "Settings fetch rejected"
            );
            return Ok(None);
        }

        let Value::Object(document) = response.data()? else {
            return Err(ParseError::InvalidValue {
                field: "data".to_string(),
                message: "settings payload is not an object".to_string(),
            }
            .into());
        };

        self.system.apply_settings(document.clone(), Utc::now());
        tracing::debug!(
            system_id = %self.system.system_id,
            piles = self.system.piles.len(),
            "Settings fetched"
        );
        Ok(Some(document))
    }

    /// Fetches the latest power flow and stores it on the system.
    ///
    /// Returns the aggregated snapshot, or `None` if the cloud did not answer
    /// with 200.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not valid, the request cannot be sent,
    /// or a 200 reply cannot be parsed.
    pub async fn fetch_last_power_data(&mut self) -> Result<Option<PowerSnapshot>> {
        let response = self
            .session
            .get(
                endpoint::GET_LAST_POWER_DATA,
                &[(KEY_SERIAL, self.system.serial_number.as_str())],
            )
            .await?;

        if !response.is_success() {
            tracing::warn!(
                serial = %self.system.serial_number,
                status = response.status(),
                "Power data fetch rejected"
            );
            return Ok(None);
        }

        self.system.apply_power_data(response.data()?)?;
        Ok(self.system.power)
    }

    /// Posts a complete settings document.
    ///
    /// The endpoint replaces the whole document, so `document` must carry
    /// every setting, not just the changed ones. Start from
    /// [`System::settings`].
    ///
    /// # Errors
    ///
    /// Returns error if the session is not valid or the request cannot be
    /// sent.
    pub async fn post_settings(&self, document: SettingsDocument) -> Result<bool> {
        post_settings_document(
            self.session,
            &self.system.system_id_value,
            &self.system.serial_number,
            document,
        )
        .await
    }

    /// Sets the battery state-of-charge bounds.
    ///
    /// The update is built on the fetched settings, so nothing is sent and
    /// `Ok(false)` is returned until [`fetch_settings`](Self::fetch_settings)
    /// has succeeded once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) unless
    /// `20 <= min_percent < max_percent <= 100`, or any error of
    /// [`post_settings`](Self::post_settings).
    pub async fn set_state_of_charge_cap(&self, min_percent: u8, max_percent: u8) -> Result<bool> {
        let cap = StateOfChargeCap::new(min_percent, max_percent)?;
        if self.system.last_fetch.is_none() {
            tracing::warn!(
                system_id = %self.system.system_id,
                "Settings not fetched yet, not sending state of charge update"
            );
            return Ok(false);
        }
        self.post_settings(self.system.state_of_charge_document(cap))
            .await
    }

    /// Binds one of this system's charging piles for network operations.
    #[must_use]
    pub fn pile(&mut self, pile_id: &str) -> Option<PileHandle<'_>> {
        let System {
            system_id_value,
            serial_number,
            settings,
            piles,
            ..
        } = &mut *self.system;

        let pile = piles.get_mut(pile_id)?;
        Some(PileHandle::new(
            self.session,
            &*system_id_value,
            serial_number.as_str(),
            &*settings,
            pile,
        ))
    }
}
