//! # Driver Abstraction
//!
//! The device selector and session builder never call `ash` directly. They go
//! through the two traits in this module so the selection policy and the
//! creation/teardown ordering can be exercised without a GPU.
//!
//! - [`InstanceDriver`]: instance-level queries and logical device creation
//! - [`DeviceDriver`]: everything that hangs off a created logical device
//!
//! Both traits speak raw `ash::vk` handles and structures; ownership of those
//! handles is tracked by the session, not by the driver.

use ash::vk;

/// Raw driver result, before it is mapped to a [`BootstrapError`](super::BootstrapError)
pub type DriverResult<T> = Result<T, vk::Result>;

/// Parameters for swapchain creation
#[derive(Debug, Clone, Copy)]
pub struct SwapchainRequest {
    /// Presentation surface
    pub surface: vk::SurfaceKHR,
    /// Requested minimum image count
    pub min_image_count: u32,
    /// Image format and color space
    pub format: vk::SurfaceFormatKHR,
    /// Image extent
    pub extent: vk::Extent2D,
    /// Transform reported by the surface
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    /// Presentation mode
    pub present_mode: vk::PresentModeKHR,
}

/// Instance-level driver operations
pub trait InstanceDriver {
    /// Logical device type produced by [`create_device`](Self::create_device)
    type Device: DeviceDriver;

    /// Number of physical devices currently reported by the driver
    fn physical_device_count(&self) -> DriverResult<u32>;

    /// Fill up to `capacity` physical device handles
    ///
    /// Returns `Err(vk::Result::INCOMPLETE)` when the driver has more devices
    /// than `capacity`; callers are expected to re-query the count and retry.
    fn physical_devices(&self, capacity: u32) -> DriverResult<Vec<vk::PhysicalDevice>>;

    /// Device properties (name, type, API version, ids)
    fn physical_device_properties(&self, physical_device: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties;

    /// Queue family properties in driver order
    fn queue_family_properties(&self, physical_device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties>;

    /// Whether `queue_family_index` can present to `surface`
    fn surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> DriverResult<bool>;

    /// Presentation modes supported for `surface`
    fn surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> DriverResult<Vec<vk::PresentModeKHR>>;

    /// Current surface capabilities
    fn surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> DriverResult<vk::SurfaceCapabilitiesKHR>;

    /// Supported surface formats
    fn surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> DriverResult<Vec<vk::SurfaceFormatKHR>>;

    /// Whether the device exposes `VK_KHR_swapchain`
    fn supports_swapchain(&self, physical_device: vk::PhysicalDevice) -> DriverResult<bool>;

    /// Create a logical device with a single queue from `queue_family_index`
    /// and the swapchain extension enabled
    fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
    ) -> DriverResult<Self::Device>;
}

/// Operations on a created logical device
///
/// Implementations must not release anything on drop: the session decides
/// when each handle is destroyed.
pub trait DeviceDriver {
    /// Retrieve a queue created together with the device
    fn get_queue(&self, queue_family_index: u32, queue_index: u32) -> vk::Queue;

    /// Create a swapchain
    fn create_swapchain(&self, request: &SwapchainRequest) -> DriverResult<vk::SwapchainKHR>;

    /// Images owned by a swapchain
    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> DriverResult<Vec<vk::Image>>;

    /// Destroy a swapchain
    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR);

    /// Create a resettable command pool bound to `queue_family_index`
    fn create_command_pool(&self, queue_family_index: u32) -> DriverResult<vk::CommandPool>;

    /// Allocate one primary command buffer from `pool`
    fn allocate_primary_command_buffer(&self, pool: vk::CommandPool) -> DriverResult<vk::CommandBuffer>;

    /// Destroy a command pool and every buffer allocated from it
    fn destroy_command_pool(&self, pool: vk::CommandPool);

    /// Wait for the device to go idle, then destroy it
    fn destroy(&mut self);
}
