//! Vulkan context management
//!
//! Owns the instance, the presentation surface and the session built on them.
//! Fields drop in declaration order, so the session is torn down before the
//! surface, and the surface is destroyed before the instance.

use super::ash_driver::{AshDevice, AshDriver};
use super::error::BootstrapResult;
use super::instance::VulkanInstance;
use super::selector::{Candidate, DeviceSelector};
use super::session::{Session, SessionBuilder};
use super::surface::PresentationSurface;
use crate::config::BootstrapConfig;
use crate::window::SurfaceProvider;

/// Main Vulkan context that owns all bootstrapped resources
pub struct VulkanContext {
    session: Session<AshDevice>,
    candidate: Candidate,
    surface: PresentationSurface,
    instance: VulkanInstance,
}

impl VulkanContext {
    /// Run the full bootstrap sequence for `window`
    ///
    /// instance → surface → device selection → session. Any failure releases
    /// whatever was created before it and is returned to the caller.
    pub fn new<W: SurfaceProvider>(window: &mut W, config: &BootstrapConfig) -> BootstrapResult<Self> {
        let instance = VulkanInstance::new(window, config)?;
        let surface = PresentationSurface::new(&instance, window)?;

        let driver = AshDriver::new(instance.instance(), surface.loader());
        let candidate = DeviceSelector::new(config).select(&driver, surface.handle())?;

        let (width, height) = window.framebuffer_size();
        let session = SessionBuilder::new(&driver, surface.handle())
            .with_window_extent(width, height)
            .build(&candidate)?;

        Ok(Self {
            session,
            candidate,
            surface,
            instance,
        })
    }

    /// Live session
    pub fn session(&self) -> &Session<AshDevice> {
        &self.session
    }

    /// Candidate the session was built from
    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    /// Presentation surface
    pub fn surface(&self) -> &PresentationSurface {
        &self.surface
    }

    /// Vulkan instance
    pub fn instance(&self) -> &VulkanInstance {
        &self.instance
    }
}
