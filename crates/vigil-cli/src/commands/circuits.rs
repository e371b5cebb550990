//! `vigil circuits`: List the circuits a service accepts.

use clap::Args;
use serde::Deserialize;

use super::{bail_on_error, print_unreachable, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct CircuitsArgs {
    /// API endpoint of the service.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct CircuitInfo {
    id: String,
    kind: String,
    signal_count: usize,
}

#[derive(Deserialize)]
struct CircuitsResponse {
    circuits: Vec<CircuitInfo>,
    count: usize,
}

pub async fn run(args: &CircuitsArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/circuits", args.endpoint);

    match reqwest::get(&url).await {
        Ok(r) if r.status().is_success() => {
            let data: CircuitsResponse = r.json().await?;
            println!("Registered circuits ({}):", data.count);
            for circuit in &data.circuits {
                println!(
                    "  {:<45} {:<7} {} signals",
                    circuit.id, circuit.kind, circuit.signal_count
                );
            }
        }
        Ok(r) => bail_on_error("listing circuits", r).await?,
        Err(e) => print_unreachable(&args.endpoint, &e),
    }

    Ok(())
}
