//! Observations produced by a discovery round.

use serde::{Deserialize, Serialize};

/// A device seen during one discovery round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// Address as reported by the backend (MAC or peripheral UUID).
    pub address: String,

    /// Advertised name, if any.
    pub name: Option<String>,

    /// Signal strength in dBm.
    pub rssi: i16,
}

impl DiscoveredDevice {
    /// Create a device record.
    pub fn new(address: impl Into<String>, name: Option<&str>, rssi: i16) -> Self {
        Self {
            address: address.into(),
            name: name.map(str::to_owned),
            rssi,
        }
    }
}

/// How a single sample relates to the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Found with a signal at or above the threshold.
    Near,
    /// Found, but the signal is below the threshold.
    Weak,
    /// Not seen in this round.
    Absent,
}

/// One observation of the target, built fresh every cycle.
///
/// `rssi` and `name` are only ever present when `matched` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalSample {
    matched: bool,
    rssi: Option<i16>,
    name: Option<String>,
}

impl SignalSample {
    /// The target was found with the given reading.
    #[must_use]
    pub fn found(rssi: i16, name: Option<String>) -> Self {
        Self {
            matched: true,
            rssi: Some(rssi),
            name,
        }
    }

    /// The target was not among the discovered devices.
    #[must_use]
    pub const fn not_found() -> Self {
        Self {
            matched: false,
            rssi: None,
            name: None,
        }
    }

    /// Build a sample from the matching device, if any.
    #[must_use]
    pub fn from_match(device: Option<&DiscoveredDevice>) -> Self {
        device.map_or_else(Self::not_found, |d| Self::found(d.rssi, d.name.clone()))
    }

    /// Whether the target was seen.
    #[must_use]
    pub const fn matched(&self) -> bool {
        self.matched
    }

    /// Signal strength, when seen.
    #[must_use]
    pub const fn rssi(&self) -> Option<i16> {
        self.rssi
    }

    /// Advertised name, when seen and broadcast.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Classify against `threshold` (inclusive).
    #[must_use]
    pub fn presence(&self, threshold: i16) -> Presence {
        match (self.matched, self.rssi) {
            (true, Some(rssi)) if rssi >= threshold => Presence::Near,
            (true, Some(_)) => Presence::Weak,
            _ => Presence::Absent,
        }
    }
}
