// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Account-level client and system registry.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{ParseError, Result};
use crate::protocol::{CloudConfig, endpoint};
use crate::session::Session;
use crate::system::{System, SystemHandle};

/// Client for one AlphaESS cloud account.
///
/// Owns the [`Session`] and the systems of the account, keyed by system id.
/// Systems in turn own their charging piles. Operations that change state
/// take `&mut self`, so a client is used by one caller at a time.
///
/// # Examples
///
/// ```no_run
/// use alphaess_cloud::AlphaCloud;
///
/// #[tokio::main]
/// async fn main() -> alphaess_cloud::Result<()> {
///     let mut cloud = AlphaCloud::new("user@example.com", "secret")?;
///
///     if !cloud.login().await? {
///         eprintln!("login rejected");
///         return Ok(());
///     }
///
///     let ids: Vec<String> = cloud.fetch_system_list().await?.keys().cloned().collect();
///     for id in ids {
///         let Some(mut system) = cloud.system_mut(&id) else { continue };
///         system.fetch_settings().await?;
///         system.set_state_of_charge_cap(20, 100).await?;
///
///         let pile_ids: Vec<String> = system.system().piles().keys().cloned().collect();
///         for pile_id in pile_ids {
///             if let Some(mut pile) = system.pile(&pile_id) {
///                 let status = pile.fetch_charging_status().await?;
///                 println!("{pile_id}: {status}");
///             }
///         }
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct AlphaCloud {
    session: Session,
    systems: HashMap<String, System>,
}

impl AlphaCloud {
    /// Creates a client for the public cloud endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::with_config(CloudConfig::new(username, password))
    }

    /// Creates a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn with_config(config: CloudConfig) -> Result<Self> {
        Ok(Self {
            session: Session::new(config)?,
            systems: HashMap::new(),
        })
    }

    /// Returns the session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Logs in. See [`Session::login`].
    ///
    /// # Errors
    ///
    /// See [`Session::login`].
    pub async fn login(&mut self) -> Result<bool> {
        self.session.login().await
    }

    /// Drops the token locally. Known systems are kept.
    pub fn logout(&mut self) {
        self.session.logout();
    }

    /// Fetches the systems of the account into the registry.
    ///
    /// Every listed system is inserted, replacing an existing entry with the
    /// same id; systems missing from the list are kept. A non-200 reply
    /// leaves the registry unchanged. Returns the whole registry either way.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not valid, the request cannot be sent,
    /// or a 200 reply does not carry a list.
    pub async fn fetch_system_list(&mut self) -> Result<&HashMap<String, System>> {
        let response = self.session.get(endpoint::GET_SYSTEM_LIST, &[]).await?;

        if !response.is_success() {
            tracing::warn!(status = response.status(), "System list fetch rejected");
            return Ok(&self.systems);
        }

        let Value::Array(entries) = response.data()? else {
            return Err(ParseError::InvalidValue {
                field: "data".to_string(),
                message: "system list payload is not an array".to_string(),
            }
            .into());
        };

        for entry in entries {
            let Value::Object(entry) = entry else {
                tracing::warn!("Skipping non-object system list entry");
                continue;
            };
            match System::from_listing(entry) {
                Ok(system) => {
                    self.systems.insert(system.system_id().to_string(), system);
                }
                Err(e) => tracing::warn!(error = %e, "Skipping system list entry"),
            }
        }

        tracing::info!(systems = self.systems.len(), "System list fetched");
        Ok(&self.systems)
    }

    /// Returns all known systems, keyed by system id.
    #[must_use]
    pub fn systems(&self) -> &HashMap<String, System> {
        &self.systems
    }

    /// Returns a known system.
    #[must_use]
    pub fn system(&self, system_id: &str) -> Option<&System> {
        self.systems.get(system_id)
    }

    /// Binds a known system to the session for network operations.
    #[must_use]
    pub fn system_mut(&mut self, system_id: &str) -> Option<SystemHandle<'_>> {
        let session = &self.session;
        self.systems
            .get_mut(system_id)
            .map(|system| SystemHandle::new(session, system))
    }
}
