// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Charging pile types: modes, status codes and charge current.

use std::fmt;

use crate::error::ValueError;

/// Charging mode of a pile.
///
/// # Examples
///
/// ```
/// use alphaess_cloud::types::ChargingMode;
///
/// let mode = ChargingMode::try_from(3).unwrap();
/// assert_eq!(mode, ChargingMode::Fast);
/// assert_eq!(mode.code(), 3);
/// assert_eq!(mode.name(), "Fast");
///
/// assert!(ChargingMode::try_from(5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargingMode {
    /// Slow charging.
    Slow,
    /// Normal charging.
    Normal,
    /// Fast charging.
    Fast,
    /// Customer-defined / maximum charging.
    Max,
}

impl ChargingMode {
    /// Returns the numeric code used by the cloud.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Slow => 1,
            Self::Normal => 2,
            Self::Fast => 3,
            Self::Max => 4,
        }
    }

    /// Returns the human-readable name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::Max => "Customer / Max",
        }
    }
}

impl fmt::Display for ChargingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for ChargingMode {
    type Error = ValueError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Slow),
            2 => Ok(Self::Normal),
            3 => Ok(Self::Fast),
            4 => Ok(Self::Max),
            _ => Err(ValueError::UnknownChargingMode(code)),
        }
    }
}

/// Last observed state of a charging pile.
///
/// Only codes present in the status table can be represented; an unknown
/// code has no `ChargingStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChargingStatus {
    code: i64,
    text: &'static str,
}

impl ChargingStatus {
    /// Maps a status code reported by the cloud.
    ///
    /// Returns `None` when the code is not in the status table.
    ///
    /// # Examples
    ///
    /// ```
    /// use alphaess_cloud::types::ChargingStatus;
    ///
    /// assert_eq!(ChargingStatus::from_code(3).unwrap().text(), "Charging");
    /// assert_eq!(ChargingStatus::from_code(6).unwrap().text(), "Charging stopped");
    /// assert!(ChargingStatus::from_code(99).is_none());
    /// ```
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        let text = match code {
            3 => "Charging",
            4 => "Insufficient power",
            6 => "Charging stopped",
            _ => return None,
        };
        Some(Self { code, text })
    }

    /// Returns the status code.
    #[must_use]
    pub const fn code(&self) -> i64 {
        self.code
    }

    /// Returns the status text.
    #[must_use]
    pub const fn text(&self) -> &'static str {
        self.text
    }

    /// Returns `true` while the pile is charging.
    #[must_use]
    pub const fn is_charging(&self) -> bool {
        self.code == 3
    }
}

impl fmt::Display for ChargingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.text, self.code)
    }
}

/// Charge current limit in amperes.
///
/// The lower bound is fixed by the hardware at 6 A. The upper bound is the
/// pile's configured maximum and is checked by [`ChargeCurrent::new`].
///
/// # Examples
///
/// ```
/// use alphaess_cloud::types::ChargeCurrent;
///
/// // 230 V on three phases: 4140 W / 690 = 6 A
/// assert_eq!(ChargeCurrent::ampere_from_watts(4140), 6);
/// assert_eq!(ChargeCurrent::ampere_from_watts(2070), 3);
///
/// assert_eq!(ChargeCurrent::new(10, 16).unwrap().ampere(), 10);
/// assert!(ChargeCurrent::new(3, 16).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChargeCurrent(u32);

impl ChargeCurrent {
    /// Lowest current any pile accepts.
    pub const MIN_AMPERE: u32 = 6;

    /// Watts per ampere on a 230 V three-phase supply.
    pub const WATTS_PER_AMPERE: u32 = 690;

    /// Creates a validated current.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` unless `6 <= ampere <= max_ampere`.
    pub fn new(ampere: u32, max_ampere: u32) -> Result<Self, ValueError> {
        if ampere < Self::MIN_AMPERE || ampere > max_ampere {
            return Err(ValueError::OutOfRange {
                min: Self::MIN_AMPERE,
                max: max_ampere,
                actual: ampere,
            });
        }
        Ok(Self(ampere))
    }

    /// Resolves the requested current from either amperes or watts.
    ///
    /// `ampere` wins when both are given.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::MissingChargeCurrent` if both are `None`, or
    /// `ValueError::OutOfRange` if the resulting current is not accepted.
    pub fn resolve(
        ampere: Option<u32>,
        watts: Option<u32>,
        max_ampere: u32,
    ) -> Result<Self, ValueError> {
        let ampere = match (ampere, watts) {
            (Some(ampere), _) => ampere,
            (None, Some(watts)) => Self::ampere_from_watts(watts),
            (None, None) => return Err(ValueError::MissingChargeCurrent),
        };
        Self::new(ampere, max_ampere)
    }

    /// Converts watts to whole amperes, rounding down.
    #[must_use]
    pub const fn ampere_from_watts(watts: u32) -> u32 {
        watts / Self::WATTS_PER_AMPERE
    }

    /// Returns the current in amperes.
    #[must_use]
    pub const fn ampere(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChargeCurrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}A", self.0)
    }
}
