//! Hardware capability query
//!
//! Produces a fresh snapshot of every physical device and its queue families.
//! Nothing is cached: each call re-queries the driver.

use ash::vk;
use bitflags::bitflags;
use std::ffi::CStr;
use std::fmt;

use super::driver::InstanceDriver;
use super::error::{BootstrapError, BootstrapResult};

bitflags! {
    /// Capabilities of a queue family
    ///
    /// Bit values match `VkQueueFlagBits` so driver flags convert losslessly.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct QueueCapabilities: u32 {
        /// Graphics operations
        const GRAPHICS = 0x0000_0001;
        /// Compute operations
        const COMPUTE = 0x0000_0002;
        /// Transfer operations
        const TRANSFER = 0x0000_0004;
        /// Sparse memory binding
        const SPARSE_BINDING = 0x0000_0008;
        /// Protected memory
        const PROTECTED = 0x0000_0010;
        /// Video decode
        const VIDEO_DECODE = 0x0000_0020;
        /// Video encode
        const VIDEO_ENCODE = 0x0000_0040;
    }
}

impl From<vk::QueueFlags> for QueueCapabilities {
    fn from(flags: vk::QueueFlags) -> Self {
        Self::from_bits_truncate(flags.as_raw())
    }
}

/// Device category as reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCategory {
    /// Dedicated GPU
    Discrete,
    /// GPU sharing memory with the host
    Integrated,
    /// GPU exposed through virtualization
    Virtual,
    /// Software implementation running on the CPU
    Cpu,
    /// Anything else
    Other,
}

impl From<vk::PhysicalDeviceType> for DeviceCategory {
    fn from(device_type: vk::PhysicalDeviceType) -> Self {
        match device_type {
            vk::PhysicalDeviceType::DISCRETE_GPU => Self::Discrete,
            vk::PhysicalDeviceType::INTEGRATED_GPU => Self::Integrated,
            vk::PhysicalDeviceType::VIRTUAL_GPU => Self::Virtual,
            vk::PhysicalDeviceType::CPU => Self::Cpu,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discrete => "discrete",
            Self::Integrated => "integrated",
            Self::Virtual => "virtual",
            Self::Cpu => "cpu",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// One queue family of a physical device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueFamilyDescriptor {
    /// Position within the owning device's family list
    pub index: u32,
    /// Supported operations
    pub capabilities: QueueCapabilities,
    /// Number of queues in the family
    pub queue_count: u32,
    /// Minimum image transfer granularity
    pub min_image_transfer_granularity: vk::Extent3D,
}

impl QueueFamilyDescriptor {
    fn from_properties(index: u32, properties: &vk::QueueFamilyProperties) -> Self {
        Self {
            index,
            capabilities: properties.queue_flags.into(),
            queue_count: properties.queue_count,
            min_image_transfer_granularity: properties.min_image_transfer_granularity,
        }
    }
}

/// One enumerated physical device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Driver-assigned handle
    pub handle: vk::PhysicalDevice,
    /// Human-readable name
    pub name: String,
    /// Device category
    pub category: DeviceCategory,
    /// Highest supported API version
    pub api_version: u32,
    /// PCI vendor id
    pub vendor_id: u32,
    /// Vendor-specific device id
    pub device_id: u32,
    /// Queue families in driver order
    pub queue_families: Vec<QueueFamilyDescriptor>,
}

impl DeviceDescriptor {
    /// API version formatted as `major.minor.patch`
    pub fn api_version_string(&self) -> String {
        format!(
            "{}.{}.{}",
            vk::api_version_major(self.api_version),
            vk::api_version_minor(self.api_version),
            vk::api_version_patch(self.api_version),
        )
    }
}

/// Query one device's descriptor
pub fn describe_device<D: InstanceDriver>(driver: &D, handle: vk::PhysicalDevice) -> DeviceDescriptor {
    let properties = driver.physical_device_properties(handle);
    let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
        .to_string_lossy()
        .into_owned();

    let queue_families = driver
        .queue_family_properties(handle)
        .iter()
        .zip(0u32..)
        .map(|(family, index)| QueueFamilyDescriptor::from_properties(index, family))
        .collect();

    DeviceDescriptor {
        handle,
        name,
        category: properties.device_type.into(),
        api_version: properties.api_version,
        vendor_id: properties.vendor_id,
        device_id: properties.device_id,
        queue_families,
    }
}

/// Physical device handles, retrying while the driver reports an incomplete result
fn enumerate_handles<D: InstanceDriver>(driver: &D) -> BootstrapResult<Vec<vk::PhysicalDevice>> {
    loop {
        let count = driver
            .physical_device_count()
            .map_err(BootstrapError::enumeration("physical device count"))?;

        match driver.physical_devices(count) {
            Ok(handles) => return Ok(handles),
            Err(vk::Result::INCOMPLETE) => {
                log::debug!("Device list grew past {} entries, re-querying", count);
            }
            Err(result) => {
                return Err(BootstrapError::Enumeration {
                    query: "physical devices",
                    result,
                })
            }
        }
    }
}

/// Enumerate every physical device with its queue families populated
///
/// An empty result means the driver genuinely reports no devices; that is
/// left to the caller to handle.
pub fn enumerate_devices<D: InstanceDriver>(driver: &D) -> BootstrapResult<Vec<DeviceDescriptor>> {
    let handles = enumerate_handles(driver)?;
    log::debug!("Driver reports {} physical device(s)", handles.len());

    Ok(handles
        .into_iter()
        .map(|handle| describe_device(driver, handle))
        .collect())
}

/// Log every device and its queue families
pub fn log_devices(devices: &[DeviceDescriptor]) {
    log::info!("Found {} physical device(s):", devices.len());
    for (position, device) in devices.iter().enumerate() {
        log::info!(
            "  [{}] {} ({}, API {}, vendor 0x{:04x}, device 0x{:04x})",
            position,
            device.name,
            device.category,
            device.api_version_string(),
            device.vendor_id,
            device.device_id,
        );
        for family in &device.queue_families {
            let granularity = family.min_image_transfer_granularity;
            log::info!(
                "      family {}: {:?}, {} queue(s), granularity {}x{}x{}",
                family.index,
                family.capabilities,
                family.queue_count,
                granularity.width,
                granularity.height,
                granularity.depth,
            );
        }
    }
}
