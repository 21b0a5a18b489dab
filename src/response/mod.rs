// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response parsing for AlphaESS cloud payloads.
//!
//! Each type here corresponds to the `data` field of one endpoint's
//! response envelope. Settings documents are not parsed into a fixed schema;
//! see [`crate::types::SettingsDocument`].

mod charging;
mod login;
mod power;

pub use charging::ChargingStatusResponse;
pub use login::LoginResponse;
pub use power::{PowerData, PowerSnapshot};
