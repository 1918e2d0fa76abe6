//! `ash`-backed driver implementation

use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
use ash::{vk, Device, Instance};
use std::ffi::CStr;

use super::driver::{DeviceDriver, DriverResult, InstanceDriver, SwapchainRequest};

/// Instance-level driver over a live `ash` instance and surface loader
pub struct AshDriver<'a> {
    instance: &'a Instance,
    surface_loader: &'a Surface,
}

impl<'a> AshDriver<'a> {
    /// Wrap an instance and its surface loader
    pub fn new(instance: &'a Instance, surface_loader: &'a Surface) -> Self {
        Self {
            instance,
            surface_loader,
        }
    }
}

impl InstanceDriver for AshDriver<'_> {
    type Device = AshDevice;

    fn physical_device_count(&self) -> DriverResult<u32> {
        let mut count = 0;
        unsafe {
            (self.instance.fp_v1_0().enumerate_physical_devices)(
                self.instance.handle(),
                &mut count,
                std::ptr::null_mut(),
            )
            .result()?;
        }
        Ok(count)
    }

    fn physical_devices(&self, capacity: u32) -> DriverResult<Vec<vk::PhysicalDevice>> {
        let mut count = capacity;
        let mut devices = Vec::with_capacity(capacity as usize);
        let result = unsafe {
            (self.instance.fp_v1_0().enumerate_physical_devices)(
                self.instance.handle(),
                &mut count,
                devices.as_mut_ptr(),
            )
        };

        match result {
            vk::Result::SUCCESS => {
                // The driver wrote `count` (<= capacity) handles
                unsafe { devices.set_len(count as usize) };
                Ok(devices)
            }
            other => Err(other),
        }
    }

    fn physical_device_properties(&self, physical_device: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties {
        unsafe { self.instance.get_physical_device_properties(physical_device) }
    }

    fn queue_family_properties(&self, physical_device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        unsafe { self.instance.get_physical_device_queue_family_properties(physical_device) }
    }

    fn surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> DriverResult<bool> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_support(physical_device, queue_family_index, surface)
        }
    }

    fn surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> DriverResult<Vec<vk::PresentModeKHR>> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(physical_device, surface)
        }
    }

    fn surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> DriverResult<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(physical_device, surface)
        }
    }

    fn surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> DriverResult<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
        }
    }

    fn supports_swapchain(&self, physical_device: vk::PhysicalDevice) -> DriverResult<bool> {
        let extensions = unsafe { self.instance.enumerate_device_extension_properties(physical_device)? };
        Ok(extensions.iter().any(|available| {
            let name = unsafe { CStr::from_ptr(available.extension_name.as_ptr()) };
            name == SwapchainLoader::name()
        }))
    }

    fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
    ) -> DriverResult<AshDevice> {
        let priorities = [1.0];
        let queue_infos = [vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(queue_family_index)
            .queue_priorities(&priorities)
            .build()];

        let required_extensions = [SwapchainLoader::name().as_ptr()];

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&required_extensions);

        let device = unsafe { self.instance.create_device(physical_device, &create_info, None)? };
        let swapchain_loader = SwapchainLoader::new(self.instance, &device);

        Ok(AshDevice {
            device,
            swapchain_loader,
        })
    }
}

/// Logical device created through [`AshDriver`]
pub struct AshDevice {
    device: Device,
    swapchain_loader: SwapchainLoader,
}

impl AshDevice {
    /// The underlying `ash` device
    pub fn raw(&self) -> &Device {
        &self.device
    }

    /// Swapchain extension loader
    pub fn swapchain_loader(&self) -> &SwapchainLoader {
        &self.swapchain_loader
    }
}

impl DeviceDriver for AshDevice {
    fn get_queue(&self, queue_family_index: u32, queue_index: u32) -> vk::Queue {
        unsafe { self.device.get_device_queue(queue_family_index, queue_index) }
    }

    fn create_swapchain(&self, request: &SwapchainRequest) -> DriverResult<vk::SwapchainKHR> {
        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(request.surface)
            .min_image_count(request.min_image_count)
            .image_format(request.format.format)
            .image_color_space(request.format.color_space)
            .image_extent(request.extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(request.pre_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(request.present_mode)
            .clipped(true)
            .old_swapchain(vk::SwapchainKHR::null());

        unsafe { self.swapchain_loader.create_swapchain(&create_info, None) }
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> DriverResult<Vec<vk::Image>> {
        unsafe { self.swapchain_loader.get_swapchain_images(swapchain) }
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        unsafe { self.swapchain_loader.destroy_swapchain(swapchain, None) }
    }

    fn create_command_pool(&self, queue_family_index: u32) -> DriverResult<vk::CommandPool> {
        let pool_create_info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(queue_family_index);

        unsafe { self.device.create_command_pool(&pool_create_info, None) }
    }

    fn allocate_primary_command_buffer(&self, pool: vk::CommandPool) -> DriverResult<vk::CommandBuffer> {
        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let buffers = unsafe { self.device.allocate_command_buffers(&alloc_info)? };
        buffers
            .into_iter()
            .next()
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }

    fn destroy_command_pool(&self, pool: vk::CommandPool) {
        unsafe {
            // Destroying the pool frees every buffer allocated from it
            self.device.destroy_command_pool(pool, None);
        }
    }

    fn destroy(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}
