//! `vigil status`: Query the status of a running verification service.

use clap::Args;
use serde::Deserialize;

use super::{bail_on_error, print_unreachable, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the service.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    version: String,
    settings_version: u64,
    circuits: Vec<String>,
    ledger_states: usize,
    gist_roots: usize,
    uptime_secs: u64,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/status", args.endpoint);

    match reqwest::get(&url).await {
        Ok(r) if r.status().is_success() => {
            let status: StatusResponse = r.json().await?;
            println!("Service Status:");
            println!("  Version:     {}", status.version);
            println!("  Settings:    v{}", status.settings_version);
            println!("  States:      {}", status.ledger_states);
            println!("  GIST roots:  {}", status.gist_roots);
            println!("  Uptime:      {}s", status.uptime_secs);
            if status.circuits.is_empty() {
                println!("  Circuits:    (none)");
            } else {
                for circuit in &status.circuits {
                    println!("  Circuit:     {}", circuit);
                }
            }
        }
        Ok(r) => bail_on_error("status", r).await?,
        Err(e) => print_unreachable(&args.endpoint, &e),
    }

    Ok(())
}
