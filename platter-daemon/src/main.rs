//! Platter - Shared Turntable Controller
//!
//! Daemon binary: loads the configuration, brings every channel into the
//! braking state, and runs the coordinator on the embassy std executor.
//!
//! One session at a time holds the controls for a fixed time-box while the
//! others wait in line. SIGINT/SIGTERM stop every channel and release the
//! pins before the process exits.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use embassy_executor::Spawner;
use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{error, info};
use static_cell::StaticCell;

use platter_daemon::config::load_config;
use platter_daemon::{Coordinator, Inbound};
use platter_hal::SimPinDriver;

mod channels;
mod console;
mod tasks;

/// Coordinator as run by this binary
pub type PlatterCoordinator = Coordinator<CriticalSectionRawMutex, SimPinDriver>;

/// Platter daemon - turn-based control of a multi-channel motorized platter
#[derive(Parser, Debug)]
#[command(name = "platter-daemon", version, long_about = None)]
struct Args {
    /// Path to the configuration file (defaults to the embedded platter.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read session events from stdin
    #[arg(long, default_value_t = false)]
    console: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// Shared by the tick and dispatch tasks for the life of the process
static COORDINATOR: StaticCell<PlatterCoordinator> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let args = Args::parse();

    // RUST_LOG overrides the default filter
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    info!("Platter daemon starting...");

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(2);
        }
    };

    // No pin service on this host: outputs go to the recording driver
    let coordinator = match PlatterCoordinator::new(&config, SimPinDriver::new()) {
        Ok(coordinator) => coordinator,
        Err(e) => {
            error!("Failed to initialize actuation: {}", e);
            process::exit(1);
        }
    };
    let coordinator: &'static PlatterCoordinator = COORDINATOR.init(coordinator);

    // The dispatch task applies the shutdown after any events already queued
    let handler = ctrlc::set_handler(|| {
        info!("Shutdown signal received...");
        block_on(channels::INBOUND.send(Inbound::Shutdown));
    });
    if let Err(e) = handler {
        error!("Failed to install signal handler: {}", e);
        abort(coordinator);
    }

    let spawned = spawner
        .spawn(tasks::tick_task(coordinator, config.tick_interval_ms))
        .and_then(|_| spawner.spawn(tasks::dispatch_task(coordinator)))
        .and_then(|_| spawner.spawn(tasks::notify_task()));
    if let Err(e) = spawned {
        error!("Failed to spawn tasks: {:?}", e);
        abort(coordinator);
    }

    if args.console {
        if let Err(e) = console::spawn() {
            error!("Failed to start console: {}", e);
            abort(coordinator);
        }
    } else {
        info!("No transport attached; waiting for events (Ctrl-C to stop)");
    }

    info!("All tasks spawned, daemon running");

    let code = channels::SHUTDOWN_DONE.wait().await;
    info!("Daemon stopped");
    process::exit(code);
}

/// Stop and release the pins on a startup failure, then exit
fn abort(coordinator: &PlatterCoordinator) -> ! {
    if let Err(e) = coordinator.shutdown() {
        error!("Shutdown failed: {}", e);
    }
    process::exit(1);
}
