//! Mixlink service
//!
//! Runs one device session from the command line and logs everything the
//! session surfaces: status transitions and the live variable feed. Sends a
//! liveness probe on an interval while running.
//!
//! Usage: `mixlink-service <host> <device-name> [target-port] [feedback-port]`

use std::time::Duration;

use anyhow::{bail, Context, Result};
use mixlink_client::{DeviceConfig, DeviceEvent, Session};
use tracing::info;

const PING_INTERVAL: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = parse_args(std::env::args().skip(1).collect())?;
    info!("starting session for {}", config.display_label());

    let (session, mut events) = Session::start(config);
    let mut ping_timer = tokio::time::interval(PING_INTERVAL);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                session.shutdown();
                break;
            }
            _ = ping_timer.tick() => {
                session.ping().await;
            }
            event = events.recv() => match event {
                Some(DeviceEvent::Status { status, label }) => {
                    info!(?status, %label, "status changed");
                }
                Some(DeviceEvent::Variable { id, value }) => {
                    let label = session.variable_label(&id);
                    info!(%id, %value, %label, "variable");
                }
                None => break,
            }
        }
    }

    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<DeviceConfig> {
    if args.len() < 2 || args.len() > 4 {
        bail!("usage: mixlink-service <host> <device-name> [target-port] [feedback-port]");
    }

    let mut config = DeviceConfig {
        host: args[0].clone(),
        device_name: args[1].clone(),
        ..Default::default()
    };
    if let Some(port) = args.get(2) {
        config.target_port = port.parse().context("invalid target port")?;
    }
    if let Some(port) = args.get(3) {
        config.feedback_port = port.parse().context("invalid feedback port")?;
    }
    Ok(config)
}
