use clap::{Parser, Subcommand};
use miette::Result;
use paysm::application::workflow::PaymentService;
use paysm::domain::payment::{Amount, Payment, PaymentId, PaymentState};
use paysm::domain::ports::PaymentStoreRef;
use paysm::infrastructure::in_memory::InMemoryPaymentStore;
#[cfg(feature = "storage-rocksdb")]
use paysm::infrastructure::rocksdb::RocksDBStore;
use paysm::infrastructure::simulator::{DEFAULT_APPROVAL_RATE, RandomAuthorizationGateway};
use paysm::interfaces::output::{OutputFormat, PaymentWriter};
use rust_decimal::Decimal;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "PAYSM_DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    /// Probability that the simulated gateway approves a request.
    #[arg(long, env = "PAYSM_APPROVAL_RATE", default_value_t = DEFAULT_APPROVAL_RATE, global = true)]
    approval_rate: f64,

    /// Output format for payment records.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a payment in the NEW state
    Create {
        #[arg(long)]
        amount: Decimal,
    },
    /// Pre-authorize a payment
    PreAuthorize { id: PaymentId },
    /// Authorize a pre-authorized payment
    Authorize { id: PaymentId },
    /// Decline authorization of a pre-authorized payment
    Decline { id: PaymentId },
    /// Show one payment, or all of them
    Show { id: Option<PaymentId> },
    /// Create a payment and drive it through pre-authorization and authorization
    Run {
        #[arg(long)]
        amount: Decimal,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    paysm::telemetry::init_tracing();
    let cli = Cli::parse();

    let store = open_store(cli.db_path)?;
    let gateway = Arc::new(RandomAuthorizationGateway::new(cli.approval_rate)?);
    let service = PaymentService::new(store, gateway)?;

    let payments = match cli.command {
        Command::Create { amount } => vec![service.create_payment(Amount::new(amount)?).await?],
        Command::PreAuthorize { id } => {
            service.pre_authorize(id).await?;
            vec![service.get_payment(id).await?]
        }
        Command::Authorize { id } => {
            service.authorize(id).await?;
            vec![service.get_payment(id).await?]
        }
        Command::Decline { id } => {
            service.decline_authorization(id).await?;
            vec![service.get_payment(id).await?]
        }
        Command::Show { id: Some(id) } => vec![service.get_payment(id).await?],
        Command::Show { id: None } => service.payments().await?,
        Command::Run { amount } => vec![run(&service, Amount::new(amount)?).await?],
    };

    let stdout = io::stdout();
    let mut writer = PaymentWriter::new(cli.format, stdout.lock());
    writer.write_payments(payments)?;

    Ok(())
}

async fn run(service: &PaymentService, amount: Amount) -> paysm::error::Result<Payment> {
    let payment = service.create_payment(amount).await?;
    let change = service.pre_authorize(payment.id).await?;
    if change.state == PaymentState::PreAuth {
        service.authorize(payment.id).await?;
    }
    service.get_payment(payment.id).await
}

fn open_store(db_path: Option<PathBuf>) -> paysm::error::Result<PaymentStoreRef> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(Arc::new(RocksDBStore::open(path)?)),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Arc::new(InMemoryPaymentStore::new()))
        }
        None => Ok(Arc::new(InMemoryPaymentStore::new())),
    }
}
