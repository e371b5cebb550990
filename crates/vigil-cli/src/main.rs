//! Vigil CLI: command-line client for the verification service.
//!
//! Subcommands: status, circuits, inputs, encode-query, verify.

mod commands;

use clap::{Parser, Subcommand};

/// Vigil: policy verification for zero-knowledge credential proofs.
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query the status of a running service.
    Status(commands::status::StatusArgs),
    /// List the circuits the service accepts.
    Circuits(commands::circuits::CircuitsArgs),
    /// Show a circuit's public-signal layout.
    Inputs(commands::inputs::InputsArgs),
    /// Encode an atomic query from JSON to its hex wire form.
    EncodeQuery(commands::encode_query::EncodeQueryArgs),
    /// Submit a proof for verification.
    Verify(commands::verify::VerifyArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Status(args) => commands::status::run(args).await,
        Commands::Circuits(args) => commands::circuits::run(args).await,
        Commands::Inputs(args) => commands::inputs::run(args).await,
        Commands::EncodeQuery(args) => commands::encode_query::run(args),
        Commands::Verify(args) => commands::verify::run(args).await,
    }
}
