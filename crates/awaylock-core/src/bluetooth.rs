//! Bluetooth Low Energy discovery via BlueZ.
//!
//! This module provides a [`Discovery`] implementation that:
//! - Connects to the system `bluetoothd` over D-Bus
//! - Runs an LE discovery session for the requested duration
//! - Reports every device that advertised during the round, with the RSSI
//!   read while the session was still running

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use std::time::Duration;

use bluer::{Adapter, AdapterEvent, Address, DiscoveryFilter, DiscoveryTransport, Session};
use futures::{pin_mut, StreamExt};
use tracing::{debug, info};

use crate::device::DiscoveredDevice;
use crate::discovery::{Discovery, DiscoveryError, DiscoveryResult};

/// BlueZ-backed scanner bound to the default adapter.
pub struct BluezDiscovery {
    _session: Session,
    adapter: Adapter,
}

impl BluezDiscovery {
    /// Connect to `bluetoothd` and pick the default adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable, no adapter exists,
    /// or the adapter is powered off.
    pub async fn new() -> DiscoveryResult<Self> {
        let session = Session::new()
            .await
            .map_err(|e| DiscoveryError::SessionInitFailed {
                message: e.to_string(),
            })?;

        let adapter = session.default_adapter().await.map_err(|e| match e.kind {
            bluer::ErrorKind::NotFound => DiscoveryError::AdapterNotFound,
            _ => DiscoveryError::SessionInitFailed {
                message: e.to_string(),
            },
        })?;

        if !adapter.is_powered().await.map_err(discovery_failed)? {
            return Err(DiscoveryError::AdapterPoweredOff);
        }

        info!(adapter = adapter.name(), "Using Bluetooth adapter");
        Ok(Self {
            _session: session,
            adapter,
        })
    }

    async fn read_device(&self, address: Address) -> bluer::Result<Option<DiscoveredDevice>> {
        let device = self.adapter.device(address)?;
        let Some(rssi) = device.rssi().await? else {
            return Ok(None);
        };
        let name = device.name().await?;
        Ok(Some(DiscoveredDevice {
            address: address.to_string(),
            name,
            rssi,
        }))
    }
}

impl Discovery for BluezDiscovery {
    async fn discover(&self, duration: Duration) -> DiscoveryResult<Vec<DiscoveredDevice>> {
        self.adapter
            .set_discovery_filter(DiscoveryFilter {
                transport: DiscoveryTransport::Le,
                duplicate_data: true,
                ..DiscoveryFilter::default()
            })
            .await
            .map_err(discovery_failed)?;

        let cached = self
            .adapter
            .device_addresses()
            .await
            .map_err(discovery_failed)?;
        let mut round = RoundTracker::new(cached);

        // Property changes arrive as repeated `DeviceAdded` events.
        let events = self
            .adapter
            .discover_devices_with_changes()
            .await
            .map_err(discovery_failed)?;
        pin_mut!(events);

        let deadline = tokio::time::Instant::now() + duration;
        loop {
            match tokio::time::timeout_at(deadline, events.next()).await {
                Ok(Some(AdapterEvent::DeviceAdded(address))) => {
                    if !round.is_fresh(address) {
                        continue;
                    }
                    // RSSI is only valid while the session is running.
                    match self.read_device(address).await {
                        Ok(Some(device)) => round.record(address, device),
                        Ok(None) => {}
                        Err(e) => debug!(%address, error = %e, "Device vanished before it could be read"),
                    }
                }
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            }
        }

        let devices = round.finish();
        debug!(count = devices.len(), "Discovery round finished");
        Ok(devices)
    }
}

/// Sightings collected during one discovery session.
///
/// BlueZ replays one `DeviceAdded` per cached device when a session
/// starts. That replay carries no new reading, so a cached device only
/// counts once a later event shows it advertising.
#[derive(Debug)]
struct RoundTracker<A> {
    replay_pending: HashSet<A>,
    seen: BTreeMap<A, DiscoveredDevice>,
}

impl<A: Ord + Hash + Copy> RoundTracker<A> {
    fn new(cached: impl IntoIterator<Item = A>) -> Self {
        Self {
            replay_pending: cached.into_iter().collect(),
            seen: BTreeMap::new(),
        }
    }

    /// Whether an event for `address` may carry a reading from this round.
    fn is_fresh(&mut self, address: A) -> bool {
        !self.replay_pending.remove(&address)
    }

    /// Keep the latest reading for `address`.
    fn record(&mut self, address: A, device: DiscoveredDevice) {
        self.seen.insert(address, device);
    }

    fn finish(self) -> Vec<DiscoveredDevice> {
        self.seen.into_values().collect()
    }
}

fn discovery_failed(e: bluer::Error) -> DiscoveryError {
    DiscoveryError::DiscoveryFailed {
        message: e.to_string(),
    }
}
