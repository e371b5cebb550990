//! `vigil verify`: Submit a proof to a verification service.

use clap::Args;
use serde::Deserialize;

use super::{bail_on_error, print_unreachable, read_json_arg, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Request JSON `{ proof, signals, query, caller }` (as string or path to file).
    #[arg(short, long)]
    pub request: String,

    /// API endpoint of the service.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct Disclosure {
    name: String,
    index: usize,
    value: String,
}

#[derive(Deserialize)]
struct VerifyResponse {
    request_id: String,
    disclosures: Vec<Disclosure>,
}

pub async fn run(args: &VerifyArgs) -> anyhow::Result<()> {
    let body: serde_json::Value = serde_json::from_str(&read_json_arg(&args.request)?)
        .map_err(|e| anyhow::anyhow!("invalid request JSON: {}", e))?;

    let url = format!("{}/api/v1/verify", args.endpoint);
    let client = reqwest::Client::new();

    match client.post(&url).json(&body).send().await {
        Ok(r) if r.status().is_success() => {
            let data: VerifyResponse = r.json().await?;
            println!("Proof ACCEPTED (request {})", data.request_id);
            for d in &data.disclosures {
                println!("  [{:>2}] {:<20} {}", d.index, d.name, d.value);
            }
        }
        Ok(r) => bail_on_error("verification", r).await?,
        Err(e) => print_unreachable(&args.endpoint, &e),
    }

    Ok(())
}
