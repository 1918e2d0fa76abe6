//! Device selection
//!
//! Applies the suitability predicates across every enumerated device and
//! returns the passing (device, queue family) pairs in driver order.

use ash::vk;

use super::capability::{enumerate_devices, log_devices, DeviceDescriptor, QueueFamilyDescriptor};
use super::driver::InstanceDriver;
use super::error::{BootstrapError, BootstrapResult};
use super::suitability::{suitable_queue_families, supports_required_present_mode};
use crate::config::BootstrapConfig;

/// A (device, queue family) pair that passed every suitability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Device the family belongs to
    pub device: DeviceDescriptor,
    /// Suitable queue family of `device`
    pub queue_family: QueueFamilyDescriptor,
}

/// How to pick one candidate when several qualify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// First candidate in driver enumeration order
    #[default]
    FirstEnumerated,
    /// Requested preference for high-performance devices.
    ///
    /// Not implemented: selection still follows enumeration order.
    PreferHighPerformance,
}

impl SelectionPolicy {
    /// Policy requested by the configuration
    pub fn from_config(config: &BootstrapConfig) -> Self {
        if config.prefer_high_performance {
            Self::PreferHighPerformance
        } else {
            Self::FirstEnumerated
        }
    }
}

/// Filter already-enumerated devices into candidates
///
/// A device contributes one candidate per suitable queue family, and only if
/// the device itself supports FIFO presentation. The result may be empty.
pub fn collect_candidates<D: InstanceDriver>(
    driver: &D,
    surface: vk::SurfaceKHR,
    devices: &[DeviceDescriptor],
) -> BootstrapResult<Vec<Candidate>> {
    let mut candidates = Vec::new();

    for device in devices {
        let families = suitable_queue_families(driver, surface, device)?;
        if families.is_empty() {
            log::debug!("Skipping {}: no graphics+transfer family can present", device.name);
            continue;
        }
        if !supports_required_present_mode(driver, surface, device)? {
            log::debug!("Skipping {}: FIFO presentation unsupported", device.name);
            continue;
        }

        candidates.extend(families.into_iter().map(|queue_family| Candidate {
            device: device.clone(),
            queue_family,
        }));
    }

    Ok(candidates)
}

/// Enumerate devices and return every candidate for `surface`
///
/// Fails with [`BootstrapError::NoSuitableDevice`] when nothing qualifies.
pub fn select_candidates<D: InstanceDriver>(driver: &D, surface: vk::SurfaceKHR) -> BootstrapResult<Vec<Candidate>> {
    let devices = enumerate_devices(driver)?;
    require_candidates(collect_candidates(driver, surface, &devices)?, devices.len())
}

fn require_candidates(candidates: Vec<Candidate>, examined: usize) -> BootstrapResult<Vec<Candidate>> {
    if candidates.is_empty() {
        Err(BootstrapError::NoSuitableDevice { examined })
    } else {
        Ok(candidates)
    }
}

/// Pick one candidate according to `policy`
pub fn choose_candidate(candidates: Vec<Candidate>, policy: SelectionPolicy) -> BootstrapResult<Candidate> {
    if policy == SelectionPolicy::PreferHighPerformance {
        log::warn!("High-performance device preference is not implemented; using enumeration order");
    }

    let examined = candidates.len();
    candidates
        .into_iter()
        .next()
        .ok_or(BootstrapError::NoSuitableDevice { examined })
}

/// Device selection driven by a [`BootstrapConfig`]
pub struct DeviceSelector {
    policy: SelectionPolicy,
    list_devices: bool,
}

impl DeviceSelector {
    /// Create a selector from configuration
    pub fn new(config: &BootstrapConfig) -> Self {
        Self {
            policy: SelectionPolicy::from_config(config),
            list_devices: config.list_devices,
        }
    }

    /// Enumerate, filter, and pick the candidate to build a session from
    pub fn select<D: InstanceDriver>(&self, driver: &D, surface: vk::SurfaceKHR) -> BootstrapResult<Candidate> {
        let devices = enumerate_devices(driver)?;
        if self.list_devices {
            log_devices(&devices);
        }

        let candidates = require_candidates(collect_candidates(driver, surface, &devices)?, devices.len())?;
        log::debug!("{} candidate(s) passed suitability checks", candidates.len());

        let chosen = choose_candidate(candidates, self.policy)?;
        log::info!(
            "Selected GPU: {} ({}), queue family {}",
            chosen.device.name,
            chosen.device.category,
            chosen.queue_family.index
        );
        Ok(chosen)
    }
}
