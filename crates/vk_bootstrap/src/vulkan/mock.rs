//! Scripted in-memory driver for tests
//!
//! Devices are described up front; every create/destroy call made against the
//! driver is appended to a shared journal so tests can assert on ordering.

use ash::vk::{self, Handle};
use std::cell::{Cell, RefCell};
use std::os::raw::c_char;
use std::rc::Rc;

use super::driver::{DeviceDriver, DriverResult, InstanceDriver, SwapchainRequest};
use super::error::SessionStage;

/// Journal entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateDevice { device: String, queue_family_index: u32 },
    GetQueue { queue_family_index: u32, queue_index: u32 },
    CreateSwapchain { min_image_count: u32, present_mode: vk::PresentModeKHR, extent: (u32, u32) },
    GetSwapchainImages,
    CreateCommandPool { queue_family_index: u32 },
    AllocateCommandBuffer,
    DestroyCommandPool,
    DestroySwapchain,
    DestroyDevice,
}

/// Driver query that can be scripted to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    DeviceCount,
    DeviceList,
    SurfaceSupport,
    PresentModes,
    SwapchainImages,
}

/// Synthetic physical device
#[derive(Debug, Clone)]
pub struct MockDevice {
    name: String,
    device_type: vk::PhysicalDeviceType,
    families: Vec<(vk::QueueFlags, bool)>,
    present_modes: Vec<vk::PresentModeKHR>,
    swapchain_extension: bool,
}

impl MockDevice {
    pub fn new(name: &str, device_type: vk::PhysicalDeviceType) -> Self {
        Self {
            name: name.to_string(),
            device_type,
            families: Vec::new(),
            present_modes: vec![vk::PresentModeKHR::FIFO],
            swapchain_extension: true,
        }
    }

    /// Append a queue family; `presentable` is the surface support answer for it
    pub fn with_family(mut self, flags: vk::QueueFlags, presentable: bool) -> Self {
        self.families.push((flags, presentable));
        self
    }

    pub fn with_present_modes(mut self, modes: &[vk::PresentModeKHR]) -> Self {
        self.present_modes = modes.to_vec();
        self
    }

    pub fn without_swapchain_extension(mut self) -> Self {
        self.swapchain_extension = false;
        self
    }
}

/// Instance-level mock
pub struct MockDriver {
    devices: Vec<MockDevice>,
    journal: Rc<RefCell<Vec<Call>>>,
    fail_stage: Option<SessionStage>,
    query_failure: Option<(Query, vk::Result)>,
    stale_counts: Cell<u32>,
    attempts: Cell<u32>,
    capabilities: vk::SurfaceCapabilitiesKHR,
    formats: Vec<vk::SurfaceFormatKHR>,
}

impl MockDriver {
    pub fn new(devices: Vec<MockDevice>) -> Self {
        Self {
            devices,
            journal: Rc::new(RefCell::new(Vec::new())),
            fail_stage: None,
            query_failure: None,
            stale_counts: Cell::new(0),
            attempts: Cell::new(0),
            capabilities: vk::SurfaceCapabilitiesKHR {
                min_image_count: 2,
                max_image_count: 8,
                current_extent: vk::Extent2D { width: 800, height: 600 },
                min_image_extent: vk::Extent2D { width: 1, height: 1 },
                max_image_extent: vk::Extent2D { width: 4096, height: 4096 },
                current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
                ..Default::default()
            },
            formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
        }
    }

    /// Fail the given session step
    pub fn failing_at(mut self, stage: SessionStage) -> Self {
        self.fail_stage = Some(stage);
        self
    }

    /// Report one fewer device than exists for the first `times` count queries
    pub fn with_stale_counts(self, times: u32) -> Self {
        self.stale_counts.set(times);
        self
    }

    /// Make every call of `query` return `result`
    pub fn failing_query(mut self, query: Query, result: vk::Result) -> Self {
        self.query_failure = Some((query, result));
        self
    }

    pub fn with_surface_capabilities(mut self, capabilities: vk::SurfaceCapabilitiesKHR) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_surface_formats(mut self, formats: Vec<vk::SurfaceFormatKHR>) -> Self {
        self.formats = formats;
        self
    }

    pub fn journal(&self) -> Vec<Call> {
        self.journal.borrow().clone()
    }

    pub fn enumeration_attempts(&self) -> u32 {
        self.attempts.get()
    }

    /// Handle the driver hands out for the device at `position`
    pub fn handle_of(position: usize) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(position as u64 + 1)
    }

    fn device(&self, handle: vk::PhysicalDevice) -> &MockDevice {
        &self.devices[handle.as_raw() as usize - 1]
    }

    fn record(&self, call: Call) {
        self.journal.borrow_mut().push(call);
    }

    fn scripted(&self, query: Query) -> DriverResult<()> {
        match self.query_failure {
            Some((failing, result)) if failing == query => Err(result),
            _ => Ok(()),
        }
    }
}

impl InstanceDriver for MockDriver {
    type Device = MockLogicalDevice;

    fn physical_device_count(&self) -> DriverResult<u32> {
        self.scripted(Query::DeviceCount)?;
        let len = self.devices.len() as u32;
        if self.stale_counts.get() > 0 {
            Ok(len.saturating_sub(1))
        } else {
            Ok(len)
        }
    }

    fn physical_devices(&self, capacity: u32) -> DriverResult<Vec<vk::PhysicalDevice>> {
        self.attempts.set(self.attempts.get() + 1);
        self.scripted(Query::DeviceList)?;
        if (capacity as usize) < self.devices.len() {
            self.stale_counts.set(self.stale_counts.get().saturating_sub(1));
            return Err(vk::Result::INCOMPLETE);
        }
        Ok((0..self.devices.len()).map(Self::handle_of).collect())
    }

    fn physical_device_properties(&self, physical_device: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties {
        let device = self.device(physical_device);
        let mut properties = vk::PhysicalDeviceProperties {
            device_type: device.device_type,
            api_version: vk::make_api_version(0, 1, 3, 0),
            vendor_id: 0x10de,
            device_id: physical_device.as_raw() as u32,
            ..Default::default()
        };
        for (slot, byte) in properties.device_name.iter_mut().zip(device.name.bytes()) {
            *slot = byte as c_char;
        }
        properties
    }

    fn queue_family_properties(&self, physical_device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        self.device(physical_device)
            .families
            .iter()
            .map(|&(flags, _)| vk::QueueFamilyProperties {
                queue_flags: flags,
                queue_count: 1,
                timestamp_valid_bits: 64,
                min_image_transfer_granularity: vk::Extent3D { width: 1, height: 1, depth: 1 },
            })
            .collect()
    }

    fn surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        _surface: vk::SurfaceKHR,
    ) -> DriverResult<bool> {
        self.scripted(Query::SurfaceSupport)?;
        Ok(self.device(physical_device).families[queue_family_index as usize].1)
    }

    fn surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> DriverResult<Vec<vk::PresentModeKHR>> {
        self.scripted(Query::PresentModes)?;
        Ok(self.device(physical_device).present_modes.clone())
    }

    fn surface_capabilities(
        &self,
        _physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> DriverResult<vk::SurfaceCapabilitiesKHR> {
        Ok(self.capabilities)
    }

    fn surface_formats(
        &self,
        _physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> DriverResult<Vec<vk::SurfaceFormatKHR>> {
        Ok(self.formats.clone())
    }

    fn supports_swapchain(&self, physical_device: vk::PhysicalDevice) -> DriverResult<bool> {
        Ok(self.device(physical_device).swapchain_extension)
    }

    fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
    ) -> DriverResult<MockLogicalDevice> {
        if self.fail_stage == Some(SessionStage::LogicalDevice) {
            return Err(vk::Result::ERROR_INITIALIZATION_FAILED);
        }
        self.record(Call::CreateDevice {
            device: self.device(physical_device).name.clone(),
            queue_family_index,
        });
        Ok(MockLogicalDevice {
            journal: Rc::clone(&self.journal),
            fail_stage: self.fail_stage,
            images_failure: self
                .query_failure
                .filter(|&(query, _)| query == Query::SwapchainImages)
                .map(|(_, result)| result),
            image_count: Cell::new(0),
        })
    }
}

/// Logical device mock sharing the driver's journal
pub struct MockLogicalDevice {
    journal: Rc<RefCell<Vec<Call>>>,
    fail_stage: Option<SessionStage>,
    images_failure: Option<vk::Result>,
    image_count: Cell<u32>,
}

impl MockLogicalDevice {
    fn record(&self, call: Call) {
        self.journal.borrow_mut().push(call);
    }

    fn fails(&self, stage: SessionStage) -> bool {
        self.fail_stage == Some(stage)
    }
}

impl DeviceDriver for MockLogicalDevice {
    fn get_queue(&self, queue_family_index: u32, queue_index: u32) -> vk::Queue {
        self.record(Call::GetQueue {
            queue_family_index,
            queue_index,
        });
        vk::Queue::from_raw(0x51)
    }

    fn create_swapchain(&self, request: &SwapchainRequest) -> DriverResult<vk::SwapchainKHR> {
        if self.fails(SessionStage::Swapchain) {
            return Err(vk::Result::ERROR_SURFACE_LOST_KHR);
        }
        self.image_count.set(request.min_image_count);
        self.record(Call::CreateSwapchain {
            min_image_count: request.min_image_count,
            present_mode: request.present_mode,
            extent: (request.extent.width, request.extent.height),
        });
        Ok(vk::SwapchainKHR::from_raw(0x5C))
    }

    fn swapchain_images(&self, _swapchain: vk::SwapchainKHR) -> DriverResult<Vec<vk::Image>> {
        if let Some(result) = self.images_failure {
            return Err(result);
        }
        self.record(Call::GetSwapchainImages);
        Ok((0..u64::from(self.image_count.get()))
            .map(|i| vk::Image::from_raw(0x100 + i))
            .collect())
    }

    fn destroy_swapchain(&self, _swapchain: vk::SwapchainKHR) {
        self.record(Call::DestroySwapchain);
    }

    fn create_command_pool(&self, queue_family_index: u32) -> DriverResult<vk::CommandPool> {
        if self.fails(SessionStage::CommandPool) {
            return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        }
        self.record(Call::CreateCommandPool { queue_family_index });
        Ok(vk::CommandPool::from_raw(0xC0))
    }

    fn allocate_primary_command_buffer(&self, _pool: vk::CommandPool) -> DriverResult<vk::CommandBuffer> {
        if self.fails(SessionStage::CommandBuffer) {
            return Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        }
        self.record(Call::AllocateCommandBuffer);
        Ok(vk::CommandBuffer::from_raw(0xCB))
    }

    fn destroy_command_pool(&self, _pool: vk::CommandPool) {
        self.record(Call::DestroyCommandPool);
    }

    fn destroy(&mut self) {
        self.record(Call::DestroyDevice);
    }
}
