//! # homewatchd — homewatch daemon
//!
//! Composition root that wires storage, controllers and the console together
//! and runs the polling loop.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize tracing
//! - Open the selected storage backend (files, `SQLite` or memory)
//! - Construct the controllers, injecting the store, log and clock via port traits
//! - Run the scheduler on a background task
//! - Read console commands from stdin and forward them to the command issuer
//! - Handle graceful shutdown (`q`, end of input, Ctrl+C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod console;

use std::io::Write;
use std::sync::Arc;

use homewatch_adapter_storage_file::{FileChannelStore, FileEventLog};
use homewatch_app::clock::SystemClock;
use homewatch_app::memory::{MemoryChannelStore, MemoryEventLog};
use homewatch_app::ports::{Annunciator, ChannelStore, EventLog};
use homewatch_app::scheduler::Scheduler;
use homewatch_app::services::door_lock::DoorLockController;
use homewatch_app::services::doorbell::DoorbellController;
use homewatch_app::services::fire_alarm::FireAlarmController;
use homewatch_app::services::issuer::CommandIssuer;
use homewatch_app::services::plug::PlugController;
use homewatch_app::services::thermostat::ThermostatController;
use homewatch_domain::channel::Device;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::config::{Backend, Config, DevicesConfig};
use crate::console::ConsoleCommand;

/// Rings the terminal bell.
#[derive(Debug, Clone, Copy)]
struct TerminalBell;

impl Annunciator for TerminalBell {
    fn chime(&self, device: Device) {
        let mut stdout = std::io::stdout();
        if stdout.write_all(b"\x07").and_then(|()| stdout.flush()).is_err() {
            tracing::debug!(device = %device, "terminal bell unavailable");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    match config.storage.backend {
        Backend::File => {
            let dir = &config.storage.data_dir;
            let store = FileChannelStore::open(dir).await?;
            let log = FileEventLog::open(dir).await?;
            tracing::info!(data_dir = %dir.display(), "using file storage");
            run(&config, store, log).await
        }
        Backend::Sqlite => {
            let db = homewatch_adapter_storage_sqlite_sqlx::Config {
                database_url: config.storage.database_url.clone(),
            }
            .build()
            .await?;
            tracing::info!(database_url = %config.storage.database_url, "using sqlite storage");
            run(&config, db.channel_store(), db.event_log()).await
        }
        Backend::Memory => {
            tracing::info!("using in-memory storage, nothing will be persisted");
            run(
                &config,
                Arc::new(MemoryChannelStore::new()),
                Arc::new(MemoryEventLog::new()),
            )
            .await
        }
    }
}

async fn run<S, L>(config: &Config, store: S, log: L) -> Result<(), Box<dyn std::error::Error>>
where
    S: ChannelStore + Clone + 'static,
    L: EventLog + Clone + 'static,
{
    let mut scheduler = build_scheduler(&config.devices, &store, &log);
    scheduler.initialize().await?;
    let issuer = CommandIssuer::new(store.clone(), log, SystemClock);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let period = config.tick_interval();
    let scheduler_task =
        tokio::spawn(async move { scheduler.run(period, shutdown_rx).await });

    println!("homewatchd running, ticking every {} ms", period.as_millis());
    println!("{}", console::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("end of input, shutting down");
                    break;
                };
                match console::parse(&line) {
                    Ok(None) => {}
                    Ok(Some(ConsoleCommand::Quit)) => break,
                    Ok(Some(ConsoleCommand::Help)) => println!("{}", console::HELP),
                    Ok(Some(ConsoleCommand::Status)) => match console::status_lines(&store).await {
                        Ok(status) => println!("{}", status.join("\n")),
                        Err(err) => tracing::error!(error = %err, "failed to read channels"),
                    },
                    Ok(Some(command)) => {
                        if !console::dispatch(&issuer, command).await {
                            println!("command failed, see the device log");
                        }
                    }
                    Err(err) => println!("{err}. Type 'help' for the list of commands."),
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!("received Ctrl+C, shutting down");
                break;
            }
        }
    }

    // the receiver may already be gone if the scheduler task panicked
    let _ = shutdown_tx.send(true);
    let rounds = scheduler_task.await?;
    tracing::info!(rounds, "homewatchd stopped");
    Ok(())
}

fn build_scheduler<S, L>(
    devices: &DevicesConfig,
    store: &S,
    log: &L,
) -> Scheduler<S, L, SystemClock, TerminalBell>
where
    S: ChannelStore + Clone,
    L: EventLog + Clone,
{
    let mut scheduler = Scheduler::new();
    if devices.lock {
        scheduler = scheduler.with_door_lock(DoorLockController::new(
            store.clone(),
            log.clone(),
            SystemClock,
        ));
    }
    if devices.doorbell {
        scheduler = scheduler.with_doorbell(DoorbellController::new(
            store.clone(),
            log.clone(),
            SystemClock,
            TerminalBell,
        ));
    }
    if devices.fire_alarm {
        scheduler = scheduler.with_fire_alarm(FireAlarmController::new(
            store.clone(),
            log.clone(),
            SystemClock,
        ));
    }
    if devices.thermostat {
        scheduler = scheduler.with_thermostat(ThermostatController::new(
            store.clone(),
            log.clone(),
            SystemClock,
        ));
    }
    if devices.plug {
        scheduler = scheduler.with_plug(PlugController::new(
            store.clone(),
            log.clone(),
            SystemClock,
        ));
    }
    scheduler
}
