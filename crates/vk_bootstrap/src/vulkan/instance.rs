//! Vulkan instance creation
//!
//! Loads the driver, enables the extensions the window requires and, unless
//! disabled, the Khronos validation layer with a debug messenger that forwards
//! to `log`.

use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry, Instance};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use super::error::{BootstrapError, BootstrapResult};
use crate::config::BootstrapConfig;
use crate::window::SurfaceProvider;

const VALIDATION_LAYER: &CStr = unsafe { CStr::from_bytes_with_nul_unchecked(b"VK_LAYER_KHRONOS_validation\0") };
const ENGINE_NAME: &CStr = unsafe { CStr::from_bytes_with_nul_unchecked(b"VkBootstrap\0") };

/// Vulkan instance wrapper with RAII cleanup
pub struct VulkanInstance {
    entry: Entry,
    instance: Instance,
    debug_messenger: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
}

impl VulkanInstance {
    /// Create an instance for `window` using the settings in `config`
    pub fn new<W: SurfaceProvider>(window: &W, config: &BootstrapConfig) -> BootstrapResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| BootstrapError::InstanceCreation(format!("Failed to load Vulkan: {e}")))?;

        let required_extensions = window.required_instance_extensions()?;
        if config.list_extensions {
            log_instance_extensions(&entry, &required_extensions)?;
        }

        let enable_validation = !config.disable_validation && validation_layer_available(&entry)?;

        let mut extension_names = required_extensions
            .iter()
            .map(|name| CString::new(name.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BootstrapError::InstanceCreation(format!("Invalid extension name: {e}")))?;
        if enable_validation {
            extension_names.push(DebugUtils::name().to_owned());
        }
        let extension_ptrs: Vec<*const c_char> = extension_names.iter().map(|name| name.as_ptr()).collect();

        let layer_ptrs: Vec<*const c_char> = if enable_validation {
            vec![VALIDATION_LAYER.as_ptr()]
        } else {
            Vec::new()
        };

        let app_name = CString::new(config.application_name.as_str())
            .map_err(|e| BootstrapError::InstanceCreation(format!("Invalid application name: {e}")))?;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(ENGINE_NAME)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_0);

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_ptrs);

        let instance = unsafe { entry.create_instance(&create_info, None) }
            .map_err(|e| BootstrapError::InstanceCreation(format!("vkCreateInstance: {e:?}")))?;
        log::info!(
            "Vulkan instance created ({} extension(s), validation {})",
            extension_ptrs.len(),
            if enable_validation { "on" } else { "off" }
        );

        let debug_messenger = if enable_validation {
            let debug_utils = DebugUtils::new(&entry, &instance);
            match setup_debug_messenger(&debug_utils) {
                Ok(messenger) => Some((debug_utils, messenger)),
                Err(e) => {
                    log::warn!("Debug messenger unavailable: {:?}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            entry,
            instance,
            debug_messenger,
        })
    }

    /// Vulkan entry point
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Vulkan instance
    pub fn instance(&self) -> &Instance {
        &self.instance
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        unsafe {
            if let Some((debug_utils, messenger)) = self.debug_messenger.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

fn validation_layer_available(entry: &Entry) -> BootstrapResult<bool> {
    let layers = entry
        .enumerate_instance_layer_properties()
        .map_err(BootstrapError::enumeration("instance layers"))?;

    let available = layers
        .iter()
        .any(|layer| unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) } == VALIDATION_LAYER);
    if !available {
        log::warn!("{} not installed, continuing without validation", VALIDATION_LAYER.to_string_lossy());
    }
    Ok(available)
}

/// Log every instance extension and layer the loader reports plus the window's requirements
pub fn log_instance_extensions(entry: &Entry, required: &[String]) -> BootstrapResult<()> {
    let extensions = entry
        .enumerate_instance_extension_properties(None)
        .map_err(BootstrapError::enumeration("instance extensions"))?;

    log::info!("Available instance extensions ({}):", extensions.len());
    for extension in &extensions {
        let name = unsafe { CStr::from_ptr(extension.extension_name.as_ptr()) };
        log::info!("  {} (rev {})", name.to_string_lossy(), extension.spec_version);
    }

    let layers = entry
        .enumerate_instance_layer_properties()
        .map_err(BootstrapError::enumeration("instance layers"))?;
    log::info!("Available instance layers ({}):", layers.len());
    for layer in &layers {
        let name = unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) };
        log::info!("  {}", name.to_string_lossy());
    }

    log::info!("Requiring extensions:");
    for name in required {
        log::info!("  {}", name);
    }
    Ok(())
}

fn setup_debug_messenger(debug_utils: &DebugUtils) -> Result<vk::DebugUtilsMessengerEXT, vk::Result> {
    let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback));

    unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
}

/// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if callback_data.is_null() || (*callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*callback_data).p_message).to_string_lossy();

    if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR {
        log::error!("[Vulkan] {:?} - {}", message_type, message);
    } else if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING {
        log::warn!("[Vulkan] {:?} - {}", message_type, message);
    } else {
        log::debug!("[Vulkan] {:?} - {}", message_type, message);
    }

    vk::FALSE
}
