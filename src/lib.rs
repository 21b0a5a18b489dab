// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `alphaess_cloud` - A Rust client library for the AlphaESS cloud API.
//!
//! This library provides async APIs to read and control residential energy
//! storage systems (inverter, battery, EV charging piles) through the vendor
//! cloud.
//!
//! # Supported Features
//!
//! - **Session**: signed requests, login, token expiry tracking
//! - **Systems**: list systems, fetch settings and live power flow
//! - **Battery**: set state-of-charge bounds
//! - **Charging piles**: start/stop charging, read status, change charging
//!   mode and current limit
//!
//! # Whole-document updates
//!
//! The settings endpoint replaces the complete settings document of a
//! system. Every update is therefore built from the last fetched settings
//! snapshot with the change applied on top; fetch settings before changing
//! anything, and again after each change. Identifiers are sent back in the
//! JSON type the cloud used for them.
//!
//! # Failure reporting
//!
//! Missing credentials and stale tokens fail fast with
//! [`Error::LoginRequired`] / [`Error::LoginExpired`] before a request is
//! sent. Out-of-range arguments fail with [`Error::InvalidInput`]. A
//! non-200 reply is *not* an error for most operations: they return
//! `false` / `None` / an unchanged registry instead. Reading a charging
//! pile's status is the exception: any failure of that call, including
//! transport errors and malformed replies, is [`Error::InvalidResponse`].
//!
//! # Quick Start
//!
//! ```no_run
//! use alphaess_cloud::AlphaCloud;
//!
//! #[tokio::main]
//! async fn main() -> alphaess_cloud::Result<()> {
//!     let mut cloud = AlphaCloud::new("user@example.com", "secret")?;
//!     cloud.login().await?;
//!
//!     cloud.fetch_system_list().await?;
//!     if let Some(mut system) = cloud.system_mut("12345") {
//!         if let Some(power) = system.fetch_last_power_data().await? {
//!             println!("PV: {} W, EV: {} W", power.pv_power, power.ev_power);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod client;
pub mod error;
pub mod protocol;
pub mod response;
pub mod session;
pub mod system;
pub mod types;

pub use client::AlphaCloud;
pub use error::{Error, ParseError, ProtocolError, Result, ValueError};
pub use protocol::CloudConfig;
pub use response::PowerSnapshot;
pub use session::{Session, SessionToken};
pub use system::{ChargingPile, PileHandle, System, SystemHandle};
pub use types::{ChargeCurrent, ChargingMode, ChargingStatus, SettingsDocument, StateOfChargeCap};
