use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use vending_machine::domain::money::Money;
use vending_machine::domain::ports::{MachineStoreBox, PaymentGatewayBox};
use vending_machine::infrastructure::gateway::{ApprovingGateway, DecliningGateway};
use vending_machine::infrastructure::in_memory::InMemoryMachineStore;
#[cfg(feature = "storage-rocksdb")]
use vending_machine::infrastructure::rocksdb::RocksDBStore;
use vending_machine::interfaces::csv::command_reader::CommandReader;
use vending_machine::interfaces::csv::report_writer::ReportWriter;
use vending_machine::{MachineConfig, VendingEngine};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Report {
    Products,
    Payments,
    Funds,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command script CSV file (`command, product, tx, value`)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Report written to stdout once the script has run
    #[arg(long, value_enum, default_value_t = Report::Products)]
    report: Report,

    /// Only list payments of this type in the payments report
    #[arg(long)]
    payment_filter: Option<String>,

    /// Capacity of each slot when seeding a new machine
    #[arg(long, default_value_t = 20)]
    stock_limit: u32,

    /// Unit price of each product when seeding a new machine
    #[arg(long, default_value = "2.40")]
    price: Decimal,

    /// Simulate an offline card terminal that declines every charge
    #[arg(long)]
    decline_cards: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = MachineConfig {
        stock_limit: cli.stock_limit,
        price: Money::new(cli.price),
        ..MachineConfig::default()
    };

    let gateway: PaymentGatewayBox = if cli.decline_cards {
        Box::new(DecliningGateway::default())
    } else {
        Box::new(ApprovingGateway)
    };

    let store = open_store(cli.db_path)?;
    let engine = VendingEngine::open(&config, store, gateway)
        .await
        .into_diagnostic()?;

    // Run the command script
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for result in reader.commands() {
        match result {
            Ok(script_line) => {
                if let Err(e) = script_line.command.execute(&engine).await {
                    warn!(line = script_line.line, "Error processing command: {e}");
                }
            }
            Err(e) => {
                warn!("Error reading command: {e}");
            }
        }
    }

    // Output the requested report
    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    match cli.report {
        Report::Products => {
            let products = engine.list_products().await;
            writer.write_products(&products).into_diagnostic()?;
        }
        Report::Payments => {
            let payments = engine.list_payments(cli.payment_filter.as_deref()).await;
            writer.write_payments(&payments).into_diagnostic()?;
        }
        Report::Funds => {
            let snapshot = engine.snapshot().await;
            let reconciliation = engine.reconcile().await;
            writer
                .write_funds(&snapshot.funds, &reconciliation)
                .into_diagnostic()?;
        }
    }

    Ok(())
}

fn open_store(db_path: Option<PathBuf>) -> Result<MachineStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(Box::new(RocksDBStore::open(path).into_diagnostic()?)),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryMachineStore::new()))
        }
        None => Ok(Box::new(InMemoryMachineStore::new())),
    }
}
