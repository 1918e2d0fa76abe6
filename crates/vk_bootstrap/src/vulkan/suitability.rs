//! Suitability predicates
//!
//! Both predicates only read driver state. A queue family qualifies when it
//! supports graphics and transfer work and the driver confirms it can present
//! to the surface; a device qualifies when it has at least one such family and
//! supports FIFO presentation.

use ash::vk;

use super::capability::{DeviceDescriptor, QueueCapabilities, QueueFamilyDescriptor};
use super::driver::InstanceDriver;
use super::error::{BootstrapError, BootstrapResult};

/// Capabilities every selected queue family must have
pub const REQUIRED_QUEUE_CAPABILITIES: QueueCapabilities =
    QueueCapabilities::GRAPHICS.union(QueueCapabilities::TRANSFER);

/// Presentation mode every selected device must support
pub const REQUIRED_PRESENT_MODE: vk::PresentModeKHR = vk::PresentModeKHR::FIFO;

/// Whether `family` of `device` can run the session's queue
pub fn queue_family_is_suitable<D: InstanceDriver>(
    driver: &D,
    surface: vk::SurfaceKHR,
    device: &DeviceDescriptor,
    family: &QueueFamilyDescriptor,
) -> BootstrapResult<bool> {
    if !family.capabilities.contains(REQUIRED_QUEUE_CAPABILITIES) {
        return Ok(false);
    }

    // Graphics capability does not imply presentation on every platform
    driver
        .surface_support(device.handle, family.index, surface)
        .map_err(BootstrapError::enumeration("surface support"))
}

/// Queue families of `device` that pass [`queue_family_is_suitable`], in driver order
pub fn suitable_queue_families<D: InstanceDriver>(
    driver: &D,
    surface: vk::SurfaceKHR,
    device: &DeviceDescriptor,
) -> BootstrapResult<Vec<QueueFamilyDescriptor>> {
    let mut suitable = Vec::new();
    for family in &device.queue_families {
        if queue_family_is_suitable(driver, surface, device, family)? {
            suitable.push(family.clone());
        }
    }
    Ok(suitable)
}

/// Whether `device` supports FIFO presentation to `surface`
pub fn supports_required_present_mode<D: InstanceDriver>(
    driver: &D,
    surface: vk::SurfaceKHR,
    device: &DeviceDescriptor,
) -> BootstrapResult<bool> {
    let modes = driver
        .surface_present_modes(device.handle, surface)
        .map_err(BootstrapError::enumeration("surface present modes"))?;
    Ok(modes.contains(&REQUIRED_PRESENT_MODE))
}

/// Whether `device` has a suitable queue family and supports FIFO presentation
pub fn device_is_suitable<D: InstanceDriver>(
    driver: &D,
    surface: vk::SurfaceKHR,
    device: &DeviceDescriptor,
) -> BootstrapResult<bool> {
    if suitable_queue_families(driver, surface, device)?.is_empty() {
        return Ok(false);
    }
    supports_required_present_mode(driver, surface, device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vulkan::capability::enumerate_devices;
    use crate::vulkan::mock::{MockDevice, MockDriver, Query};

    fn single_family_driver(flags: vk::QueueFlags, presentable: bool) -> MockDriver {
        MockDriver::new(vec![
            MockDevice::new("Test GPU", vk::PhysicalDeviceType::DISCRETE_GPU).with_family(flags, presentable)
        ])
    }

    #[test]
    fn test_family_needs_graphics_and_transfer() {
        let cases = [
            (vk::QueueFlags::GRAPHICS, false),
            (vk::QueueFlags::TRANSFER, false),
            (vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER, false),
            (vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE, false),
            (vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER, true),
            (vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER | vk::QueueFlags::COMPUTE, true),
        ];

        for (flags, expected) in cases {
            // Presentation is supported in every case
            let driver = single_family_driver(flags, true);
            let devices = enumerate_devices(&driver).unwrap();
            let device = &devices[0];
            let result = queue_family_is_suitable(&driver, vk::SurfaceKHR::null(), device, &device.queue_families[0]);
            assert_eq!(result.unwrap(), expected, "flags {:?}", flags);
        }
    }

    #[test]
    fn test_family_without_presentation_is_rejected() {
        let driver = single_family_driver(vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER, false);
        let devices = enumerate_devices(&driver).unwrap();
        let device = &devices[0];

        let suitable = queue_family_is_suitable(&driver, vk::SurfaceKHR::null(), device, &device.queue_families[0]);
        assert!(!suitable.unwrap());
    }

    #[test]
    fn test_device_without_suitable_family_is_rejected_despite_fifo() {
        let driver = MockDriver::new(vec![MockDevice::new("Compute only", vk::PhysicalDeviceType::DISCRETE_GPU)
            .with_family(vk::QueueFlags::COMPUTE, true)
            .with_family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER, false)
            .with_present_modes(&[vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX])]);
        let devices = enumerate_devices(&driver).unwrap();

        assert!(suitable_queue_families(&driver, vk::SurfaceKHR::null(), &devices[0]).unwrap().is_empty());
        assert!(supports_required_present_mode(&driver, vk::SurfaceKHR::null(), &devices[0]).unwrap());
        assert!(!device_is_suitable(&driver, vk::SurfaceKHR::null(), &devices[0]).unwrap());
    }

    #[test]
    fn test_device_without_fifo_is_rejected() {
        let driver = MockDriver::new(vec![MockDevice::new("No FIFO", vk::PhysicalDeviceType::DISCRETE_GPU)
            .with_family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER, true)
            .with_present_modes(&[vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE])]);
        let devices = enumerate_devices(&driver).unwrap();

        assert!(!device_is_suitable(&driver, vk::SurfaceKHR::null(), &devices[0]).unwrap());
    }

    #[test]
    fn test_device_with_fifo_and_suitable_family_is_accepted() {
        let driver = MockDriver::new(vec![MockDevice::new("Good", vk::PhysicalDeviceType::INTEGRATED_GPU)
            .with_family(vk::QueueFlags::COMPUTE, false)
            .with_family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER, true)]);
        let devices = enumerate_devices(&driver).unwrap();

        let families = suitable_queue_families(&driver, vk::SurfaceKHR::null(), &devices[0]).unwrap();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].index, 1);
        assert!(device_is_suitable(&driver, vk::SurfaceKHR::null(), &devices[0]).unwrap());
    }

    #[test]
    fn test_surface_support_failure_is_an_error() {
        let driver = single_family_driver(vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER, true)
            .failing_query(Query::SurfaceSupport, vk::Result::ERROR_SURFACE_LOST_KHR);
        let devices = enumerate_devices(&driver).unwrap();
        let device = &devices[0];

        let err = queue_family_is_suitable(&driver, vk::SurfaceKHR::null(), device, &device.queue_families[0])
            .unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::Enumeration {
                query: "surface support",
                result: vk::Result::ERROR_SURFACE_LOST_KHR,
            }
        ));
    }

    #[test]
    fn test_present_mode_failure_is_an_error() {
        let driver = single_family_driver(vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER, true)
            .failing_query(Query::PresentModes, vk::Result::ERROR_SURFACE_LOST_KHR);
        let devices = enumerate_devices(&driver).unwrap();

        let err = device_is_suitable(&driver, vk::SurfaceKHR::null(), &devices[0]).unwrap_err();
        assert!(matches!(err, BootstrapError::Enumeration { query: "surface present modes", .. }));
    }
}
