// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for AlphaESS cloud control.
//!
//! Constrained values are validated at construction time so out-of-range
//! requests are rejected before anything is sent.
//!
//! # Types
//!
//! - [`StateOfChargeCap`] - Battery min/max charge bounds (20-100%)
//! - [`ChargingMode`] - Slow/Normal/Fast/Max charging
//! - [`ChargingStatus`] - Known charging pile status codes
//! - [`ChargeCurrent`] - Charge current limit in amperes (6 A minimum)
//! - [`SettingsDocument`] - Ordered JSON settings document

mod charging;
mod document;
mod soc;

pub use charging::{ChargeCurrent, ChargingMode, ChargingStatus};
pub use document::{
    SettingsDocument, id_field, string_field, value_as_f64, value_as_key, value_as_u32,
};
pub use soc::StateOfChargeCap;
