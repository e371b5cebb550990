//! `vigil encode-query`: Encode an atomic query for a verification request.
//!
//! Works offline: the JSON query is validated and printed as the hex string
//! the `query` field of a verify request expects.

use clap::Args;
use vigil_verifier::AtomicQuery;

use super::read_json_arg;

#[derive(Args, Debug)]
pub struct EncodeQueryArgs {
    /// Query JSON (as string or path to file).
    pub query: String,
}

pub fn run(args: &EncodeQueryArgs) -> anyhow::Result<()> {
    println!("{}", encode(&read_json_arg(&args.query)?)?);
    Ok(())
}

fn encode(json: &str) -> anyhow::Result<String> {
    let query: AtomicQuery =
        serde_json::from_str(json).map_err(|e| anyhow::anyhow!("invalid query JSON: {}", e))?;
    query.circuit_id()?;
    Ok(hex::encode(query.encode()))
}
