//! # Vulkan Bootstrap
//!
//! Brings a graphics session up on top of Vulkan and a GLFW window: create a
//! window and surface, enumerate hardware, pick a device and queue family that
//! can render and present, then build the swapchain and command recording
//! resources in a fixed order.
//!
//! ## Flow
//!
//! 1. [`window::Window`] supplies the required instance extensions and the surface
//! 2. [`vulkan::VulkanInstance`] is created from a [`config::BootstrapConfig`]
//! 3. [`vulkan::DeviceSelector`] enumerates devices and filters queue families
//! 4. [`vulkan::SessionBuilder`] creates device, queue, swapchain, command pool
//!    and command buffer, rolling back on failure
//! 5. Dropping the [`vulkan::Session`] releases everything in reverse order
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vk_bootstrap::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BootstrapConfig::default();
//!     let mut window = Window::new(&config.window.title, config.window.width, config.window.height)?;
//!     let context = VulkanContext::new(&mut window, &config)?;
//!
//!     let wait = std::time::Duration::from_millis(100);
//!     while window.wait_event(wait) != Some(Event::Quit) {}
//!
//!     drop(context);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod vulkan;
pub mod window;

/// Common imports for bootstrap users
pub mod prelude {
    pub use crate::{
        config::{BootstrapConfig, Config, ConfigError, WindowConfig},
        vulkan::{BootstrapError, BootstrapResult, Candidate, DeviceSelector, Session, SessionBuilder, VulkanContext},
        window::{Event, SurfaceProvider, Window, WindowError},
    };
}
