use color_eyre::{eyre::eyre, Result};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tracked_props::config::AppConfig;
use tracked_props::controller::{Frame, GamepadSources, TrackedControls};
use tracked_props::property::{ResourceTable, TypeRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = AppConfig::load().await?;

    // Property types are fixed from here on
    let registry = TypeRegistry::with_builtins().seal();
    info!("Registered {} property types", registry.len());

    let resources = ResourceTable::new(config.resources.clone());
    let mut controls = TrackedControls::new(config.controls_settings(&registry, &resources)?);
    let mut gamepads = GamepadSources::new(config.joystick_deadzone)
        .map_err(|e| eyre!("Failed to open gamepads: {}", e))?;

    // Desktop gamepads always have a reference space
    let frame = Frame::new(true);
    let mut interval = tokio::time::interval(Duration::from_millis(config.tick_interval_ms));
    info!("Starting tick loop every {}ms", config.tick_interval_ms);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let sources = gamepads.poll();
                controls.tick(&sources, Some(&frame), |event| {
                    debug!("{}: {:?}", event.name(), event);
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

// RUST_LOG directives, INFO when unset or unparseable
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
