//! Deciding whether a discovered device is the one we follow.

use std::fmt;

use crate::device::DiscoveredDevice;

/// The active matching strategy for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetIdentity {
    /// Case-insensitive exact address match.
    Address(String),
    /// Case-insensitive substring of the advertised name.
    Name(String),
}

impl TargetIdentity {
    /// Short label for the strategy, used in the start banner.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Name(_) => "name",
        }
    }

    /// The configured identifier.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Address(v) | Self::Name(v) => v,
        }
    }

    /// Returns `true` if `device` is the target.
    #[must_use]
    pub fn matches(&self, device: &DiscoveredDevice) -> bool {
        match self {
            Self::Address(address) => device.address.eq_ignore_ascii_case(address),
            Self::Name(fragment) => device
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&fragment.to_lowercase())),
        }
    }

    /// First device in `devices` that is the target.
    #[must_use]
    pub fn find<'a>(&self, devices: &'a [DiscoveredDevice]) -> Option<&'a DiscoveredDevice> {
        devices.iter().find(|d| self.matches(d))
    }
}

impl fmt::Display for TargetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.value())
    }
}

/// Returns `true` if `device` is the configured target.
///
/// With no identity configured nothing ever matches; runs refuse to start
/// in that case, so this only matters to direct callers.
#[must_use]
pub fn matches(device: &DiscoveredDevice, identity: Option<&TargetIdentity>) -> bool {
    identity.is_some_and(|id| id.matches(device))
}
