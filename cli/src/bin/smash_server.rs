//! Network benchmark server.

use clap::Parser;

use smash_cli::init_logging;
use smash_core::bench::{serve, ServerConfig};
use smash_core::compression::CodecRegistry;
use smash_core::constants::{cli_defaults, DEFAULT_MAX_PAYLOAD};

/// Compression library network benchmark (server side).
#[derive(Parser, Debug)]
#[command(name = "smash-server", version, about = "Compression network benchmark server")]
struct Cli {
    /// Address to listen on.
    #[arg(long = "address", default_value = "0.0.0.0")]
    address: String,

    /// Port to listen on.
    #[arg(short = 'p', long = "port", default_value_t = cli_defaults::PORT)]
    port: u16,

    /// Largest payload accepted from a client, in bytes.
    #[arg(long = "max_payload", default_value_t = DEFAULT_MAX_PAYLOAD)]
    max_payload: u64,

    /// More log output (repeat for debug).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ServerConfig {
        bind: format!("{}:{}", cli.address, cli.port),
        max_payload: cli.max_payload,
    };
    serve(&config, &CodecRegistry::builtin())?;
    Ok(())
}
