//! lucivpn - OpenVPN toggles for OpenWRT routers
//!
//! Lists, reads and switches the OpenVPN instances of LuCI-managed routers
//! over the LuCI JSON-RPC API.

use clap::{Parser, Subcommand};
use lucivpn_core::{error::LuciError, init_logging};

mod cli;

#[derive(Parser)]
#[command(name = "lucivpn")]
#[command(about = "Toggle OpenVPN instances on OpenWRT routers via LuCI RPC")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure a router and store its password in the keyring
    Setup,
    /// List the OpenVPN instances of the configured routers
    List {
        /// Only list this router
        #[arg(long)]
        host: Option<String>,
        /// Print states as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read the state of one instance from the router
    Status { host: String, name: String },
    /// Enable an instance
    On { host: String, name: String },
    /// Disable an instance
    Off { host: String, name: String },
    /// Poll every router on its scan interval until interrupted
    Watch,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Setup => cli::setup::run_setup().await,
        Commands::List { host, json } => cli::vpn::run_list(host.as_deref(), json).await,
        Commands::Status { host, name } => cli::vpn::run_status(&host, &name).await,
        Commands::On { host, name } => cli::vpn::run_switch(&host, &name, true).await,
        Commands::Off { host, name } => cli::vpn::run_switch(&host, &name, false).await,
        Commands::Watch => cli::vpn::run_watch().await,
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(exit_code(&e));
        }
    }
}

/// Map an error to the process exit code
///
/// 2 for configuration and credential problems, 1 for runtime failures.
fn exit_code(error: &LuciError) -> i32 {
    match error {
        LuciError::Config(_) | LuciError::Toml(_) | LuciError::TomlSerialize(_) => 2,
        LuciError::Keyring(_) => 2,
        LuciError::Auth(_) | LuciError::Rpc(_) | LuciError::UnknownInstance { .. } => 1,
        LuciError::Io(_) => 1,
    }
}
