//! Smoke-test runner: calls every venues/tips operation against a live (or
//! mock) API and reports OK or ERROR for each.
//!
//! ```text
//! FOURSQUARE_CLIENT_ID=.. FOURSQUARE_CLIENT_SECRET=.. venues-smoke --group venues
//! ```

mod checks;

use std::process::ExitCode;

use clap::Parser;
use foursquare_core::{ClientConfig, VenuesClient, DEFAULT_API_URL};
use tracing::{debug, error, info, Dispatch};
use tracing_subscriber::EnvFilter;

use crate::checks::{Group, Inputs};

#[derive(Debug, Parser)]
#[command(name = "venues-smoke", about = "Exercise the venues API end to end")]
struct Cli {
    #[arg(long, env = "FOURSQUARE_CLIENT_ID")]
    client_id: String,

    #[arg(long, env = "FOURSQUARE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    #[arg(long, env = "FOURSQUARE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, default_value = "40a55d80f964a52020f31ee3")]
    venue_id: String,

    /// Id the venue check expects back; defaults to `--venue-id`.
    #[arg(long)]
    expect_venue_id: Option<String>,

    #[arg(long, default_value = "4b5e662a70c603bba7d790b4")]
    tip_id: String,

    #[arg(long, default_value = "40.7", allow_hyphen_values = true)]
    lat: String,

    #[arg(long, default_value = "-74", allow_hyphen_values = true)]
    lng: String,

    /// Only run checks from this group.
    #[arg(long, value_enum)]
    group: Option<Group>,

    /// Only run checks with this name.
    #[arg(long)]
    check: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let logger = Dispatch::new(tracing_subscriber::fmt().with_env_filter(filter).finish());
    if tracing::dispatcher::set_global_default(logger.clone()).is_err() {
        eprintln!("venues-smoke: a global logger is already installed");
    }

    let config = ClientConfig::new(cli.api_url, cli.client_id, cli.client_secret);
    let client = match VenuesClient::new(config) {
        Ok(client) => client.with_logger(logger),
        Err(err) => {
            error!(error = %err, "cannot build client");
            return ExitCode::FAILURE;
        }
    };

    let inputs = Inputs {
        venue_id: cli.venue_id,
        expect_venue_id: cli.expect_venue_id,
        tip_id: cli.tip_id,
        lat: cli.lat,
        lng: cli.lng,
    };

    let selected = checks::select(cli.group, cli.check.as_deref());
    if selected.is_empty() {
        error!("no checks match the given filters");
        return ExitCode::FAILURE;
    }

    let mut failures = 0usize;
    for check in &selected {
        debug!(group = ?check.group, check = check.name, "running");
        match checks::run(&client, &inputs, check.kind).await {
            Ok(()) => info!(group = ?check.group, check = check.name, "OK"),
            Err(err) => {
                failures += 1;
                error!(group = ?check.group, check = check.name, error = %err, "ERROR");
            }
        }
    }

    info!(run = selected.len(), failed = failures, "done");
    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
