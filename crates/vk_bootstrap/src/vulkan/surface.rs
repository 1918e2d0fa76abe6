//! Vulkan surface management
//!
//! Handles window surface creation and destruction for presentation

use ash::{extensions::khr, vk};

use super::error::BootstrapResult;
use super::instance::VulkanInstance;
use crate::window::SurfaceProvider;

/// Vulkan surface wrapper for presentation
pub struct PresentationSurface {
    surface_loader: khr::Surface,
    surface: vk::SurfaceKHR,
}

impl PresentationSurface {
    /// Create a surface for `window` through the window system
    pub fn new<W: SurfaceProvider>(instance: &VulkanInstance, window: &mut W) -> BootstrapResult<Self> {
        let surface_loader = khr::Surface::new(instance.entry(), instance.instance());
        let surface = window.create_surface(instance.instance().handle())?;
        log::debug!("Presentation surface created");

        Ok(Self {
            surface_loader,
            surface,
        })
    }

    /// Get the underlying surface handle
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.surface
    }

    /// Get the surface loader
    pub fn loader(&self) -> &khr::Surface {
        &self.surface_loader
    }
}

impl Drop for PresentationSurface {
    fn drop(&mut self) {
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
        }
    }
}
