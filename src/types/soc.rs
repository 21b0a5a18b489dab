// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Battery state-of-charge bounds.

use std::fmt;

use crate::error::ValueError;

/// Configured minimum and maximum battery charge, in percent.
///
/// The cloud accepts bounds with `20 <= min < max <= 100`.
///
/// # Examples
///
/// ```
/// use alphaess_cloud::types::StateOfChargeCap;
///
/// let cap = StateOfChargeCap::new(20, 100).unwrap();
/// assert_eq!(cap.min(), 20);
/// assert_eq!(cap.max(), 100);
///
/// assert!(StateOfChargeCap::new(25, 20).is_err());
/// assert!(StateOfChargeCap::new(10, 50).is_err());
/// assert!(StateOfChargeCap::new(50, 110).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateOfChargeCap {
    min: u8,
    max: u8,
}

impl StateOfChargeCap {
    /// Lowest accepted lower bound.
    pub const LOWEST_MIN: u8 = 20;
    /// Highest accepted upper bound.
    pub const HIGHEST_MAX: u8 = 100;

    /// Creates validated bounds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidStateOfChargeCap` unless
    /// `20 <= min < max <= 100`.
    pub fn new(min: u8, max: u8) -> Result<Self, ValueError> {
        if min < Self::LOWEST_MIN || min >= max || max > Self::HIGHEST_MAX {
            return Err(ValueError::InvalidStateOfChargeCap { min, max });
        }
        Ok(Self { min, max })
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn min(&self) -> u8 {
        self.min
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn max(&self) -> u8 {
        self.max
    }
}

impl fmt::Display for StateOfChargeCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%..{}%", self.min, self.max)
    }
}
