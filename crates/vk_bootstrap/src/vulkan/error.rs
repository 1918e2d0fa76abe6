//! Error types for device negotiation and session construction

use ash::vk;
use std::fmt;
use thiserror::Error;

use crate::window::WindowError;

/// Construction step of a [`Session`](super::session::Session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStage {
    /// Logical device creation
    LogicalDevice,
    /// Swapchain creation, including the surface queries it depends on
    Swapchain,
    /// Command pool creation
    CommandPool,
    /// Primary command buffer allocation
    CommandBuffer,
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LogicalDevice => "logical device",
            Self::Swapchain => "swapchain",
            Self::CommandPool => "command pool",
            Self::CommandBuffer => "command buffer",
        };
        f.write_str(name)
    }
}

/// Bootstrap errors
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// A hardware query failed for a reason other than an incomplete result
    #[error("Enumeration failed ({query}): {result:?}")]
    Enumeration {
        /// Which query failed
        query: &'static str,
        /// Driver result code
        result: vk::Result,
    },

    /// No (device, queue family) pair passed every suitability check
    #[error("No suitable GPU found ({examined} device(s) examined)")]
    NoSuitableDevice {
        /// Number of devices the driver reported
        examined: usize,
    },

    /// A session resource could not be created
    #[error("Failed to create {stage}: {result:?}")]
    ResourceCreation {
        /// Step that failed
        stage: SessionStage,
        /// Driver result code
        result: vk::Result,
    },

    /// The surface reported no formats to build a swapchain with
    #[error("Surface reports no supported formats")]
    MissingSurfaceFormat,

    /// The surface cannot hold enough swapchain images for triple buffering
    #[error("Surface allows at most {maximum} swapchain image(s), {required} required")]
    SwapchainImageLimit {
        /// Images the session needs
        required: u32,
        /// Maximum the surface reports
        maximum: u32,
    },

    /// Instance creation or driver loading failed
    #[error("Instance creation failed: {0}")]
    InstanceCreation(String),

    /// Window provider error
    #[error("Window error: {0}")]
    Window(#[from] WindowError),
}

impl BootstrapError {
    /// Shorthand for mapping a driver query failure
    pub(crate) fn enumeration(query: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::Enumeration { query, result }
    }

    /// Shorthand for mapping a resource creation failure
    pub(crate) fn creation(stage: SessionStage) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::ResourceCreation { stage, result }
    }
}

/// Result type for bootstrap operations
pub type BootstrapResult<T> = Result<T, BootstrapError>;
