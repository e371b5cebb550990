//! `vigil inputs`: Show a circuit's public-signal layout.

use clap::Args;
use serde::Deserialize;

use super::{bail_on_error, print_unreachable, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct InputsArgs {
    /// Circuit identifier.
    pub circuit: String,

    /// API endpoint of the service.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct InputInfo {
    name: String,
    index: usize,
}

#[derive(Deserialize)]
struct InputsResponse {
    circuit: String,
    inputs: Vec<InputInfo>,
}

pub async fn run(args: &InputsArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/circuits/{}/inputs", args.endpoint, args.circuit);

    match reqwest::get(&url).await {
        Ok(r) if r.status().is_success() => {
            let data: InputsResponse = r.json().await?;
            println!("Signals of {}:", data.circuit);
            for input in &data.inputs {
                println!("  [{:>2}] {}", input.index, input.name);
            }
        }
        Ok(r) => bail_on_error("reading inputs", r).await?,
        Err(e) => print_unreachable(&args.endpoint, &e),
    }

    Ok(())
}
