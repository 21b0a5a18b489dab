// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Live power-flow response parsing.

use serde::Deserialize;
use serde_json::Value;

use crate::types::value_as_f64;

/// Latest power flow of a system, as returned by the power-data endpoint.
///
/// Fields the cloud omits default to `None`.
///
/// # Examples
///
/// ```
/// use alphaess_cloud::response::PowerData;
///
/// let json = r#"{
///     "ppv1": 1200, "ppv2": 800,
///     "ev1_power": 4140,
///     "pbat": -350.5, "soc": 76.4
/// }"#;
/// let data: PowerData = serde_json::from_str(json).unwrap();
/// let snapshot = data.snapshot();
/// assert_eq!(snapshot.pv_power, 2000.0);
/// assert_eq!(snapshot.ev_power, 4140.0);
/// assert_eq!(snapshot.battery_soc, Some(76.4));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PowerData {
    /// PV string 1 power in W.
    #[serde(default)]
    pub ppv1: Option<Value>,
    /// PV string 2 power in W.
    #[serde(default)]
    pub ppv2: Option<Value>,
    /// PV string 3 power in W.
    #[serde(default)]
    pub ppv3: Option<Value>,
    /// PV string 4 power in W.
    #[serde(default)]
    pub ppv4: Option<Value>,

    /// Charger 1 power in W.
    #[serde(default)]
    pub ev1_power: Option<Value>,
    /// Charger 2 power in W.
    #[serde(default)]
    pub ev2_power: Option<Value>,
    /// Charger 3 power in W.
    #[serde(default)]
    pub ev3_power: Option<Value>,
    /// Charger 4 power in W.
    #[serde(default)]
    pub ev4_power: Option<Value>,

    /// Battery power in W (negative while charging).
    #[serde(default)]
    pub pbat: Option<Value>,

    /// Battery state of charge in percent.
    #[serde(default)]
    pub soc: Option<Value>,
}

fn sum(values: [&Option<Value>; 4]) -> f64 {
    values
        .into_iter()
        .filter_map(|v| v.as_ref().and_then(value_as_f64))
        .sum()
}

impl PowerData {
    /// Derives the aggregated snapshot. Missing or non-numeric fields count
    /// as zero in the sums.
    #[must_use]
    pub fn snapshot(&self) -> PowerSnapshot {
        PowerSnapshot {
            pv_power: sum([&self.ppv1, &self.ppv2, &self.ppv3, &self.ppv4]),
            ev_power: sum([
                &self.ev1_power,
                &self.ev2_power,
                &self.ev3_power,
                &self.ev4_power,
            ]),
            battery_power: self.pbat.as_ref().and_then(value_as_f64),
            battery_soc: self.soc.as_ref().and_then(value_as_f64),
        }
    }
}

/// Aggregated live power values of a system.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PowerSnapshot {
    /// Sum of all PV string powers in W.
    pub pv_power: f64,
    /// Sum of all charger powers in W.
    pub ev_power: f64,
    /// Battery power in W, as reported.
    pub battery_power: Option<f64>,
    /// Battery state of charge in percent, as reported.
    pub battery_soc: Option<f64>,
}
