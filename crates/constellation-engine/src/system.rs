//! The fixed set of supported navigation satellite systems.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// One of the seven GNSS constellation types the engine knows about.
///
/// The serialized form matches the element-file stem on disk, e.g.
/// `gps-ops` for `gps-ops.txt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GnssSystem {
    #[serde(rename = "gps-ops")]
    GpsOps,
    #[serde(rename = "galileo")]
    Galileo,
    #[serde(rename = "glo-ops")]
    GloOps,
    #[serde(rename = "beidou")]
    Beidou,
    #[serde(rename = "musson")]
    Musson,
    #[serde(rename = "sbas")]
    Sbas,
    #[serde(rename = "nnss")]
    Nnss,
}

impl GnssSystem {
    pub const ALL: [GnssSystem; 7] = [
        Self::GpsOps,
        Self::Galileo,
        Self::GloOps,
        Self::Beidou,
        Self::Musson,
        Self::Sbas,
        Self::Nnss,
    ];

    /// Element-file stem under the TLE directory.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::GpsOps => "gps-ops",
            Self::Galileo => "galileo",
            Self::GloOps => "glo-ops",
            Self::Beidou => "beidou",
            Self::Musson => "musson",
            Self::Sbas => "sbas",
            Self::Nnss => "nnss",
        }
    }

    /// Human-readable system name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GpsOps => "NAVSTAR GPS",
            Self::Galileo => "Galileo",
            Self::GloOps => "GLONASS",
            Self::Beidou => "Beidou",
            Self::Musson => "Russian LEO Navigation",
            Self::Sbas => "Satellite-Based Augmentation System",
            Self::Nnss => "Navy Navigation Satellite System",
        }
    }

    pub fn from_stem(stem: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.file_stem() == stem)
            .ok_or_else(|| EngineError::UnknownSystem(stem.to_string()))
    }
}

impl fmt::Display for GnssSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_round_trip() {
        for system in GnssSystem::ALL {
            assert_eq!(GnssSystem::from_stem(system.file_stem()).unwrap(), system);
        }
    }

    #[test]
    fn unknown_stem_is_an_error() {
        assert!(GnssSystem::from_stem("starlink").is_err());
    }

    #[test]
    fn serde_uses_file_stems() {
        let json = serde_json::to_string(&GnssSystem::GloOps).unwrap();
        assert_eq!(json, "\"glo-ops\"");
        let back: GnssSystem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GnssSystem::GloOps);
    }
}
