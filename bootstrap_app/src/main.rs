//! Vulkan bootstrap demo
//!
//! Opens a window, negotiates a device and queue family, builds the session
//! and idles in the event loop until the window is closed.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::time::Duration;
use vk_bootstrap::config::{BootstrapConfig, Config};
use vk_bootstrap::foundation::logging;
use vk_bootstrap::vulkan::VulkanContext;
use vk_bootstrap::window::{Event, SurfaceProvider, Window};

/// Longest the idle loop sleeps before checking the window again
const EVENT_WAIT: Duration = Duration::from_millis(100);

fn cli() -> Command {
    Command::new("vk_bootstrap_demo")
        .about("Bootstraps a Vulkan session: device selection, swapchain and command buffer setup")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Load settings from a .toml or .ron file"),
        )
        .arg(
            Arg::new("list-extensions")
                .long("list-extensions")
                .action(ArgAction::SetTrue)
                .help("List available and required instance extensions"),
        )
        .arg(
            Arg::new("list-devices")
                .long("list-devices")
                .action(ArgAction::SetTrue)
                .help("List physical devices and their queue families"),
        )
        .arg(
            Arg::new("prefer-high-performance")
                .long("prefer-high-performance")
                .action(ArgAction::SetTrue)
                .help("Prefer a high-performance device (not implemented yet)"),
        )
        .arg(
            Arg::new("disable-validation")
                .long("disable-validation")
                .action(ArgAction::SetTrue)
                .help("Do not enable the Khronos validation layer"),
        )
}

/// Build the configuration: file (or defaults) with command-line flags OR-ed on top
fn load_config(matches: &ArgMatches) -> Result<BootstrapConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => BootstrapConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => BootstrapConfig::default(),
    };

    config.list_extensions |= matches.get_flag("list-extensions");
    config.list_devices |= matches.get_flag("list-devices");
    config.prefer_high_performance |= matches.get_flag("prefer-high-performance");
    config.disable_validation |= matches.get_flag("disable-validation");

    config.validate()?;
    Ok(config)
}

fn run(config: &BootstrapConfig) -> Result<()> {
    let mut window = Window::new(&config.window.title, config.window.width, config.window.height)
        .context("Failed to create window instance. Check availability of Vulkan drivers")?;

    let context = VulkanContext::new(&mut window, config).context("Failed to initialise Vulkan")?;
    let session = context.session();
    log::info!(
        "Running with {} swapchain image(s) at {}x{} on queue family {}",
        session.swapchain_images().len(),
        session.swapchain_extent().width,
        session.swapchain_extent().height,
        session.queue_family_index()
    );

    loop {
        match window.wait_event(EVENT_WAIT) {
            Some(Event::Quit) => break,
            Some(Event::Resized(width, height)) => {
                log::debug!("Framebuffer resized to {}x{} (ignored)", width, height);
            }
            Some(Event::Other) => {}
            None => {}
        }
    }

    log::info!("Shutting down");
    // Session, surface and instance go before the window
    drop(context);
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;

    logging::init(&config.log_level);
    log::info!("Starting {}", config.application_name);

    run(&config)
}
