//! Travel modes understood by the routing service.
//!
//! The enum offers compile-time safety for profile selection.
//!
//! # Examples
//! ```
//! use waymatrix_core::Profile;
//!
//! assert_eq!(Profile::DrivingCar.as_str(), "driving-car");
//! assert_eq!(Profile::FootWalking.to_string(), "foot-walking");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Travel mode used for one matrix request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Passenger car.
    #[default]
    DrivingCar,
    /// Heavy goods vehicle.
    DrivingHgv,
    /// Everyday bicycle.
    CyclingRegular,
    /// Road bike.
    CyclingRoad,
    /// Bicycle preferring quiet streets.
    CyclingSafe,
    /// Mountain bike.
    CyclingMountain,
    /// Touring bike.
    CyclingTour,
    /// E-bike.
    CyclingElectric,
    /// Pedestrian.
    FootWalking,
    /// Hiking trails.
    FootHiking,
    /// Wheelchair users.
    Wheelchair,
}

/// Returned when a profile name is not one of [`Profile::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown travel profile '{name}'")]
pub struct UnknownProfile {
    /// The rejected name.
    pub name: String,
}

impl Profile {
    /// Every profile, in the order hosts present them.
    pub const ALL: [Self; 11] = [
        Self::DrivingCar,
        Self::DrivingHgv,
        Self::CyclingRegular,
        Self::CyclingRoad,
        Self::CyclingSafe,
        Self::CyclingMountain,
        Self::CyclingTour,
        Self::CyclingElectric,
        Self::FootWalking,
        Self::FootHiking,
        Self::Wheelchair,
    ];

    /// Return the profile as the service's `&str` name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DrivingCar => "driving-car",
            Self::DrivingHgv => "driving-hgv",
            Self::CyclingRegular => "cycling-regular",
            Self::CyclingRoad => "cycling-road",
            Self::CyclingSafe => "cycling-safe",
            Self::CyclingMountain => "cycling-mountain",
            Self::CyclingTour => "cycling-tour",
            Self::CyclingElectric => "cycling-electric",
            Self::FootWalking => "foot-walking",
            Self::FootHiking => "foot-hiking",
            Self::Wheelchair => "wheelchair",
        }
    }

    /// Resolve the index of an enum parameter into a profile.
    ///
    /// # Examples
    /// ```
    /// use waymatrix_core::Profile;
    ///
    /// assert_eq!(Profile::from_index(0), Some(Profile::DrivingCar));
    /// assert_eq!(Profile::from_index(99), None);
    /// ```
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Profile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|profile| profile.as_str() == wanted)
            .ok_or_else(|| UnknownProfile { name: s.to_owned() })
    }
}
