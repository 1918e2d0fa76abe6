//! Window management using GLFW
//!
//! Supplies the window, the instance extensions it needs, the presentation
//! surface, and an event queue that can be polled or waited on.

use ash::vk;
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialised
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// GLFW found no Vulkan loader
    #[error("Vulkan is not supported by the windowing system")]
    VulkanUnsupported,

    /// The window could not be created
    #[error("Window creation failed")]
    CreationFailed,

    /// Required instance extensions could not be determined
    #[error("Failed to get required instance extensions")]
    MissingExtensions,

    /// Surface creation failed
    #[error("Failed to create Vulkan surface: {0:?}")]
    SurfaceCreation(vk::Result),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// Events surfaced to the application loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The user asked to close the window
    Quit,
    /// Framebuffer was resized (not acted upon)
    Resized(u32, u32),
    /// Anything else
    Other,
}

/// Window and surface collaborator used by the bootstrap sequence
pub trait SurfaceProvider {
    /// Instance extensions the window system needs
    fn required_instance_extensions(&self) -> WindowResult<Vec<String>>;

    /// Create a presentation surface for `instance`
    fn create_surface(&mut self, instance: vk::Instance) -> WindowResult<vk::SurfaceKHR>;

    /// Current framebuffer size in pixels
    fn framebuffer_size(&self) -> (u32, u32);

    /// Next pending event, without blocking
    fn poll_event(&mut self) -> Option<Event>;

    /// Next pending event, sleeping up to `timeout` for one to arrive
    fn wait_event(&mut self, timeout: Duration) -> Option<Event>;
}

/// GLFW window wrapper with proper resource management
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    pending: VecDeque<Event>,
}

impl Window {
    /// Create a window without an API context
    pub fn new(title: &str, width: u32, height: u32) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors).map_err(|_| WindowError::InitializationFailed)?;

        if !glfw.vulkan_supported() {
            return Err(WindowError::VulkanUnsupported);
        }

        // Configure for Vulkan (no OpenGL context)
        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(false));

        let (mut window, events) = glfw
            .create_window(width, height, title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.set_key_polling(true);
        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);

        log::debug!("Window '{}' created ({}x{})", title, width, height);
        Ok(Self {
            glfw,
            window,
            events,
            pending: VecDeque::new(),
        })
    }

    fn translate(event: glfw::WindowEvent) -> Event {
        match event {
            glfw::WindowEvent::Close
            | glfw::WindowEvent::Key(glfw::Key::Escape, _, glfw::Action::Press, _) => Event::Quit,
            glfw::WindowEvent::FramebufferSize(width, height) => {
                Event::Resized(width.max(0) as u32, height.max(0) as u32)
            }
            _ => Event::Other,
        }
    }

    fn collect_events(&mut self) {
        let events = glfw::flush_messages(&self.events).map(|(_, event)| event);
        enqueue(&mut self.pending, events, self.window.should_close());
    }
}

/// Translate window events into `pending`; a close request yields a single `Quit`
fn enqueue<E>(pending: &mut VecDeque<Event>, events: E, should_close: bool)
where
    E: IntoIterator<Item = glfw::WindowEvent>,
{
    pending.extend(events.into_iter().map(Window::translate));
    if should_close && !pending.contains(&Event::Quit) {
        pending.push_back(Event::Quit);
    }
}

impl SurfaceProvider for Window {
    fn required_instance_extensions(&self) -> WindowResult<Vec<String>> {
        self.glfw
            .get_required_instance_extensions()
            .ok_or(WindowError::MissingExtensions)
    }

    fn create_surface(&mut self, instance: vk::Instance) -> WindowResult<vk::SurfaceKHR> {
        let mut surface = vk::SurfaceKHR::null();
        let result = self.window.create_window_surface(instance, std::ptr::null(), &mut surface);

        if result == vk::Result::SUCCESS {
            Ok(surface)
        } else {
            Err(WindowError::SurfaceCreation(result))
        }
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    fn poll_event(&mut self) -> Option<Event> {
        if self.pending.is_empty() {
            self.glfw.poll_events();
            self.collect_events();
        }
        self.pending.pop_front()
    }

    fn wait_event(&mut self, timeout: Duration) -> Option<Event> {
        if self.pending.is_empty() {
            self.glfw.wait_events_timeout(timeout.as_secs_f64());
            self.collect_events();
        }
        self.pending.pop_front()
    }
}
