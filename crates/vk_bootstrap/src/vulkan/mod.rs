//! Vulkan bootstrap
//!
//! Leaf-first: capability query, suitability predicates, device selection,
//! session construction/teardown, plus the instance, surface and driver glue
//! they run on.

/// Error taxonomy
pub mod error;

/// Driver traits the core is written against
pub mod driver;

/// `ash` implementation of the driver traits
pub mod ash_driver;

/// Device and queue family enumeration
pub mod capability;

/// Suitability predicates
pub mod suitability;

/// Candidate selection
pub mod selector;

/// Session construction and teardown
pub mod session;

/// Instance creation and extension listing
pub mod instance;

/// Presentation surface
pub mod surface;

/// Owner of instance, surface and session
pub mod context;

#[cfg(test)]
pub(crate) mod mock;

pub use ash_driver::{AshDevice, AshDriver};
pub use capability::{enumerate_devices, DeviceCategory, DeviceDescriptor, QueueCapabilities, QueueFamilyDescriptor};
pub use context::VulkanContext;
pub use driver::{DeviceDriver, DriverResult, InstanceDriver, SwapchainRequest};
pub use error::{BootstrapError, BootstrapResult, SessionStage};
pub use instance::VulkanInstance;
pub use selector::{choose_candidate, collect_candidates, select_candidates, Candidate, DeviceSelector, SelectionPolicy};
pub use session::{Session, SessionBuilder};
pub use suitability::{device_is_suitable, queue_family_is_suitable};
pub use surface::PresentationSurface;
