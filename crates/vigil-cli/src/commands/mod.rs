pub mod circuits;
pub mod encode_query;
pub mod inputs;
pub mod status;
pub mod verify;

use serde::Deserialize;

/// Default API endpoint of the service.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9101";

/// Error body returned by the service.
#[derive(Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    pub class: String,
}

/// Read a JSON argument given either inline or as a path to a file.
pub fn read_json_arg(arg: &str) -> anyhow::Result<String> {
    if std::path::Path::new(arg).exists() {
        Ok(std::fs::read_to_string(arg)?)
    } else {
        Ok(arg.to_string())
    }
}

/// Report a failed request: print the service's error body if it sent one.
pub async fn bail_on_error(what: &str, resp: reqwest::Response) -> anyhow::Result<()> {
    let status = resp.status();
    if let Ok(err) = resp.json::<ErrorResponse>().await {
        anyhow::bail!(
            "{} failed (HTTP {}, {} / {}): {}",
            what,
            status,
            err.class,
            err.kind,
            err.error
        );
    }
    anyhow::bail!("{} failed (HTTP {})", what, status)
}

/// Print the usual hint when the service cannot be reached.
pub fn print_unreachable(endpoint: &str, e: &reqwest::Error) {
    println!("Could not reach service at {}", endpoint);
    println!("  Error: {}", e);
    println!();
    println!("Is the service running? Start it with: vigil-node");
}
