//! Session construction and teardown
//!
//! A [`Session`] owns the logical device, its queue, the swapchain, a command
//! pool and one primary command buffer built from a chosen [`Candidate`].
//! Construction is all-or-nothing: if any step fails, everything created so
//! far in that build is released before the error is returned. Teardown runs
//! exactly once, when the session is dropped, in reverse creation order.

use ash::vk;

use super::driver::{DeviceDriver, InstanceDriver, SwapchainRequest};
use super::error::{BootstrapError, BootstrapResult, SessionStage};
use super::selector::Candidate;
use super::suitability::REQUIRED_PRESENT_MODE;

/// Swapchain image count needed for triple buffering
pub const MIN_SWAPCHAIN_IMAGES: u32 = 3;

/// Preferred surface format
const PREFERRED_FORMAT: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
    format: vk::Format::B8G8R8A8_SRGB,
    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
};

/// Live set of resources built from one candidate
pub struct Session<D: DeviceDriver> {
    device: D,
    physical_device: vk::PhysicalDevice,
    queue_family_index: u32,
    queue: vk::Queue,
    swapchain: vk::SwapchainKHR,
    swapchain_images: Vec<vk::Image>,
    swapchain_format: vk::SurfaceFormatKHR,
    swapchain_extent: vk::Extent2D,
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
}

impl<D: DeviceDriver> Session<D> {
    /// Logical device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Physical device the session was built on
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Queue family used for the queue and command pool
    pub fn queue_family_index(&self) -> u32 {
        self.queue_family_index
    }

    /// Graphics/present queue
    pub fn queue(&self) -> vk::Queue {
        self.queue
    }

    /// Swapchain handle
    pub fn swapchain(&self) -> vk::SwapchainKHR {
        self.swapchain
    }

    /// Swapchain images captured right after creation
    pub fn swapchain_images(&self) -> &[vk::Image] {
        &self.swapchain_images
    }

    /// Swapchain surface format
    pub fn swapchain_format(&self) -> vk::SurfaceFormatKHR {
        self.swapchain_format
    }

    /// Swapchain image extent
    pub fn swapchain_extent(&self) -> vk::Extent2D {
        self.swapchain_extent
    }

    /// Command pool
    pub fn command_pool(&self) -> vk::CommandPool {
        self.command_pool
    }

    /// Primary command buffer allocated from the pool
    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    /// Release every resource in reverse creation order
    pub fn teardown(self) {
        drop(self);
    }
}

impl<D: DeviceDriver> Drop for Session<D> {
    fn drop(&mut self) {
        log::debug!("Tearing down session");
        // The pool frees its command buffer
        self.device.destroy_command_pool(self.command_pool);
        self.device.destroy_swapchain(self.swapchain);
        self.device.destroy();
    }
}

/// Resources created so far in one build; released in reverse unless completed
struct PartialSession<'d, D: DeviceDriver> {
    device: &'d mut D,
    swapchain: Option<vk::SwapchainKHR>,
    command_pool: Option<vk::CommandPool>,
    completed: bool,
}

impl<'d, D: DeviceDriver> PartialSession<'d, D> {
    fn new(device: &'d mut D) -> Self {
        Self {
            device,
            swapchain: None,
            command_pool: None,
            completed: false,
        }
    }

    /// Hand ownership of everything to the caller
    fn complete(mut self) {
        self.completed = true;
    }
}

impl<D: DeviceDriver> Drop for PartialSession<'_, D> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        log::warn!("Session build failed, releasing partially created resources");
        if let Some(pool) = self.command_pool.take() {
            self.device.destroy_command_pool(pool);
        }
        if let Some(swapchain) = self.swapchain.take() {
            self.device.destroy_swapchain(swapchain);
        }
        self.device.destroy();
    }
}

/// Builds a [`Session`] from a chosen candidate
///
/// No configuration flag reaches the builder: the configuration is consumed
/// by instance creation and by the [`DeviceSelector`](super::DeviceSelector).
/// The only inputs are the candidate, the surface and the window extent.
pub struct SessionBuilder<'a, I: InstanceDriver> {
    driver: &'a I,
    surface: vk::SurfaceKHR,
    window_extent: vk::Extent2D,
}

impl<'a, I: InstanceDriver> SessionBuilder<'a, I> {
    /// Create a builder presenting to `surface`
    pub fn new(driver: &'a I, surface: vk::SurfaceKHR) -> Self {
        Self {
            driver,
            surface,
            window_extent: vk::Extent2D::default(),
        }
    }

    /// Framebuffer size used when the surface leaves the extent to the swapchain
    pub fn with_window_extent(mut self, width: u32, height: u32) -> Self {
        self.window_extent = vk::Extent2D { width, height };
        self
    }

    /// Create device, queue, swapchain, command pool and command buffer in order
    pub fn build(&self, candidate: &Candidate) -> BootstrapResult<Session<I::Device>> {
        let physical_device = candidate.device.handle;
        let queue_family_index = candidate.queue_family.index;

        let has_swapchain = self
            .driver
            .supports_swapchain(physical_device)
            .map_err(BootstrapError::enumeration("device extensions"))?;
        if !has_swapchain {
            log::error!("{} does not expose VK_KHR_swapchain", candidate.device.name);
            return Err(BootstrapError::ResourceCreation {
                stage: SessionStage::LogicalDevice,
                result: vk::Result::ERROR_EXTENSION_NOT_PRESENT,
            });
        }

        let mut device = self
            .driver
            .create_device(physical_device, queue_family_index)
            .map_err(BootstrapError::creation(SessionStage::LogicalDevice))?;
        log::debug!("Logical device created on {}", candidate.device.name);

        let mut partial = PartialSession::new(&mut device);

        // Every suitable family exposes at least one queue
        let queue = partial.device.get_queue(queue_family_index, 0);

        let request = self.swapchain_request(physical_device)?;
        let swapchain = partial
            .device
            .create_swapchain(&request)
            .map_err(BootstrapError::creation(SessionStage::Swapchain))?;
        partial.swapchain = Some(swapchain);
        let swapchain_images = partial
            .device
            .swapchain_images(swapchain)
            .map_err(BootstrapError::creation(SessionStage::Swapchain))?;
        log::debug!(
            "Swapchain created: {} image(s), {}x{}",
            swapchain_images.len(),
            request.extent.width,
            request.extent.height
        );

        let command_pool = partial
            .device
            .create_command_pool(queue_family_index)
            .map_err(BootstrapError::creation(SessionStage::CommandPool))?;
        partial.command_pool = Some(command_pool);

        let command_buffer = partial
            .device
            .allocate_primary_command_buffer(command_pool)
            .map_err(BootstrapError::creation(SessionStage::CommandBuffer))?;
        partial.complete();

        log::info!("Session ready on {}", candidate.device.name);
        Ok(Session {
            device,
            physical_device,
            queue_family_index,
            queue,
            swapchain,
            swapchain_images,
            swapchain_format: request.format,
            swapchain_extent: request.extent,
            command_pool,
            command_buffer,
        })
    }

    fn swapchain_request(&self, physical_device: vk::PhysicalDevice) -> BootstrapResult<SwapchainRequest> {
        let capabilities = self
            .driver
            .surface_capabilities(physical_device, self.surface)
            .map_err(BootstrapError::creation(SessionStage::Swapchain))?;
        let formats = self
            .driver
            .surface_formats(physical_device, self.surface)
            .map_err(BootstrapError::creation(SessionStage::Swapchain))?;

        Ok(SwapchainRequest {
            surface: self.surface,
            min_image_count: choose_image_count(&capabilities)?,
            format: choose_format(&formats)?,
            extent: choose_extent(&capabilities, self.window_extent),
            pre_transform: capabilities.current_transform,
            present_mode: REQUIRED_PRESENT_MODE,
        })
    }
}

/// At least three images; a surface capped below that cannot host the session
fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> BootstrapResult<u32> {
    let count = MIN_SWAPCHAIN_IMAGES.max(capabilities.min_image_count);
    if capabilities.max_image_count > 0 && capabilities.max_image_count < count {
        return Err(BootstrapError::SwapchainImageLimit {
            required: count,
            maximum: capabilities.max_image_count,
        });
    }
    Ok(count)
}

fn choose_format(formats: &[vk::SurfaceFormatKHR]) -> BootstrapResult<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|sf| sf.format == PREFERRED_FORMAT.format && sf.color_space == PREFERRED_FORMAT.color_space)
        .or_else(|| formats.first())
        .copied()
        .ok_or(BootstrapError::MissingSurfaceFormat)
}

/// Surface's current extent, or the window size clamped to the surface limits
fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, window_extent: vk::Extent2D) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }
    vk::Extent2D {
        width: window_extent.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: window_extent.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}
