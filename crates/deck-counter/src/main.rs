//! Counter plugin: entry point.
//!
//! The host launches this binary with its usual arguments:
//!
//! ```text
//! deck-counter -port 28196 -pluginUUID <UUID> -registerEvent registerPlugin -info '<JSON>'
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=debug` to see every inbound event.  The
//! process exits with status 1 when the host stops answering, so the host
//! relaunches it.

mod counter;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use deck_plugin::{normalize_host_args, run_plugin, HostArgs, SessionEnd};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::counter::{catalog, schema, CounterDelegate};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `RUST_LOG` wins; otherwise `info`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = HostArgs::parse_from(normalize_host_args(std::env::args()));
    let (bootstrap, config) = args.into_bootstrap()?;
    let catalog = catalog().context("building the action catalog")?;

    info!(
        "counter plugin {} starting (host {}, long press {:?})",
        bootstrap.plugin_uuid, bootstrap.info.application.version, config.long_press_threshold
    );

    let end = run_plugin(bootstrap, config, catalog, Arc::new(CounterDelegate), schema()).await?;

    match end {
        SessionEnd::Closed => {
            info!("counter plugin stopped");
            Ok(())
        }
        SessionEnd::HostGone { consecutive_errors } => {
            error!("host unreachable after {consecutive_errors} consecutive errors; exiting");
            std::process::exit(1);
        }
    }
}
