//! # Puente CLI
//!
//! Command-line interface for the print bridge.
//!
//! ## Usage
//!
//! ```bash
//! # Run the HTTP bridge server
//! puente serve --listen 0.0.0.0:8080
//!
//! # Print a service document to the configured printer
//! puente print ticket-42
//!
//! # Print a PDF URL to a specific printer
//! puente print-url https://example.com/order.pdf --address 192.168.1.50 --type ethernet
//!
//! # Print a plain-text test page
//! puente test-page --address 00:11:62:AA:BB:CC
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use puente::{
    PrintError,
    job::{self, PrintJobRunner, download::DEFAULT_SERVICE_BASE},
    server::{self, ServerConfig},
    settings::{
        PrinterProfileType,
        store::{DEFAULT_STORE_PATH, SettingsStore},
    },
};

/// Puente - ESC/POS print bridge
#[derive(Parser, Debug)]
#[command(name = "puente")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings store location
    #[arg(long, global = true, default_value = DEFAULT_STORE_PATH)]
    settings: PathBuf,

    /// Print-service base URL for id-based PDF retrieval
    #[arg(long, global = true, default_value = DEFAULT_SERVICE_BASE)]
    service_base: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP bridge server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,
    },
    /// Print a service document by id to the configured printer
    Print {
        /// Document token resolved against the print service
        pdf_id: String,
    },
    /// Print a PDF from a literal URL
    PrintUrl {
        /// PDF URL
        url: String,

        /// Printer address (Bluetooth MAC, device path, or host/IP)
        #[arg(long)]
        address: String,

        /// Transport/profile hint ("ethernet", "bluetooth", "receipt", ...)
        #[arg(long = "type", default_value = "")]
        kind: String,
    },
    /// Print a plain-text test page
    TestPage {
        /// Printer address
        #[arg(long)]
        address: String,

        /// Profile name ("Ethernet Printer" selects the TCP transport)
        #[arg(long, default_value = "Bluetooth Printer")]
        name: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), PrintError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { listen } => {
            let config = ServerConfig {
                listen_addr: listen,
                service_base: cli.service_base,
                settings_path: cli.settings,
            };
            tokio::runtime::Runtime::new()?.block_on(server::serve(config))
        }
        Commands::Print { pdf_id } => {
            let store = SettingsStore::load(&cli.settings)?;
            let runner = PrintJobRunner::new(&cli.service_base)?;
            runner.run_for_document(&pdf_id, &store.settings(), &mut |stage| {
                println!("{stage}...");
            })?;
            println!("Print job sent.");
            Ok(())
        }
        Commands::PrintUrl { url, address, kind } => {
            let store = SettingsStore::load(&cli.settings)?;
            let profile_type = PrinterProfileType::parse_or_default(&kind);
            let settings = store
                .resolve_for_address(&address, profile_type)
                .map(|profile| profile.settings())
                .unwrap_or_else(|| store.settings());

            let runner = PrintJobRunner::new(&cli.service_base)?;
            runner.run_for_url(&address, &kind, &url, &settings, &mut |stage| {
                println!("{stage}...");
            })?;
            println!("Print job sent.");
            Ok(())
        }
        Commands::TestPage { address, name } => {
            job::print_test_page(&name, &address)?;
            println!("Test page sent.");
            Ok(())
        }
    }
}
