use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use solvix::application::dashboard::{Dashboard, MovementForm, NoticeLevel};
use solvix::application::finance::FinanceService;
use solvix::config::{AppConfig, StorageConfig};
use solvix::domain::draft::TransactionDraft;
use solvix::domain::ports::{Clock, ClockBox};
use solvix::domain::saving_box::NewSavingBox;
use solvix::domain::transaction::{InstallmentMode, PaymentMethod, TransactionKind};
use solvix::infrastructure::clock::{FixedClock, SystemClock};
use solvix::infrastructure::in_memory::{
    InMemoryBillPaymentStore, InMemorySavingBoxStore, InMemoryTransactionStore,
};
use solvix::infrastructure::json_file::JsonFileStore;
#[cfg(feature = "storage-rocksdb")]
use solvix::infrastructure::rocksdb::RocksDBStore;
use solvix::interfaces::csv::transaction_reader::TransactionReader;
use solvix::interfaces::csv::transaction_writer::TransactionWriter;
use solvix::interfaces::display::Formatter;
use solvix::interfaces::rest::{AppState, router};
use solvix::telemetry;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Personal finance tracker", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = solvix::config::CONFIG_ENV)]
    config: Option<PathBuf>,

    /// JSON snapshot file holding all data. Without it (or --db-path) data lives in memory.
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Pins the current date used for billing cycles (YYYY-MM-DD).
    #[arg(long, global = true, hide = true, env = "SOLVIX_TODAY")]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the JSON API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Balance, bill, subscriptions, suggestions and upcoming installments
    Summary,
    /// Record a transaction (category "Bill Payment" pays the current bill)
    Add(AddArgs),
    /// List transactions, newest first
    List,
    /// Delete a transaction
    Delete { id: u64 },
    /// Show the current credit-card bill
    Bill,
    /// Pay the current credit-card bill
    PayBill {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show installments due after the current cycle
    Installments,
    /// Import transactions from a CSV file
    Import { input: PathBuf },
    /// Export transactions as CSV
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Manage saving boxes
    #[command(subcommand)]
    Box(BoxCommand),
}

#[derive(Subcommand)]
enum BoxCommand {
    List,
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        goal: Option<Decimal>,
    },
    Show {
        id: u64,
    },
    Deposit(MovementArgs),
    Withdraw(MovementArgs),
}

#[derive(Args)]
struct MovementArgs {
    id: u64,
    amount: String,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    description: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Income,
    Expense,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaymentArg {
    Debit,
    Credit,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Total,
    PerInstallment,
}

#[derive(Args)]
struct AddArgs {
    #[arg(long, value_enum, default_value = "expense")]
    kind: KindArg,
    /// Amount; `,` or `.` as decimal separator
    #[arg(long, allow_hyphen_values = true)]
    amount: String,
    #[arg(long)]
    category: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, value_enum)]
    payment: Option<PaymentArg>,
    #[arg(long)]
    recurring: bool,
    /// Subscription service from the catalog (e.g. Netflix)
    #[arg(long)]
    subscription: Option<String>,
    #[arg(long)]
    installments: Option<u32>,
    #[arg(long, value_enum)]
    installment_mode: Option<ModeArg>,
    /// Interest per month, in percent
    #[arg(long)]
    interest: Option<Decimal>,
    #[arg(long)]
    first_due_date: Option<NaiveDate>,
}

impl AddArgs {
    fn into_draft(self, today: NaiveDate) -> TransactionDraft {
        TransactionDraft {
            kind: Some(match self.kind {
                KindArg::Income => TransactionKind::Income,
                KindArg::Expense => TransactionKind::Expense,
            }),
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: Some(self.date.unwrap_or(today)),
            payment_method: self.payment.map(|p| match p {
                PaymentArg::Debit => PaymentMethod::Debit,
                PaymentArg::Credit => PaymentMethod::Credit,
            }),
            recurring: self.recurring,
            subscription_service: self.subscription,
            installment_count: self.installments,
            installment_mode: self.installment_mode.map(|m| match m {
                ModeArg::Total => InstallmentMode::Total,
                ModeArg::PerInstallment => InstallmentMode::PerInstallment,
            }),
            interest_per_month: self.interest,
            first_due_date: self.first_due_date,
        }
    }
}

fn build_service(storage: &StorageConfig, clock: ClockBox) -> Result<FinanceService> {
    if let Some(db_path) = &storage.db_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            info!(path = %db_path.display(), "Using RocksDB storage");
            return Ok(FinanceService::new(
                Box::new(store.clone()),
                Box::new(store.clone()),
                Box::new(store),
                clock,
            ));
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        {
            let _ = db_path;
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to {} storage.",
                if storage.data_file.is_some() {
                    "JSON file"
                } else {
                    "In-Memory"
                }
            );
        }
    }

    if let Some(path) = &storage.data_file {
        let store = JsonFileStore::open(path).into_diagnostic()?;
        info!(path = %path.display(), "Using JSON file storage");
        return Ok(FinanceService::new(
            Box::new(store.clone()),
            Box::new(store.clone()),
            Box::new(store),
            clock,
        ));
    }

    Ok(FinanceService::new(
        Box::new(InMemoryTransactionStore::new()),
        Box::new(InMemorySavingBoxStore::new()),
        Box::new(InMemoryBillPaymentStore::new()),
        clock,
    ))
}

/// Prints the dashboard notices; any error notice fails the command.
fn report(dashboard: &mut Dashboard) -> Result<()> {
    let notices = dashboard.take_notices();
    for notice in &notices {
        println!("{}", notice.message);
    }
    match notices.iter().find(|n| n.level == NoticeLevel::Error) {
        Some(failure) => Err(miette::miette!("{}", failure.message)),
        None => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).into_diagnostic()?;
    if cli.data_file.is_some() {
        config.storage.data_file = cli.data_file;
    }
    if cli.db_path.is_some() {
        config.storage.db_path = cli.db_path;
    }

    let clock: ClockBox = match cli.today {
        Some(day) => Box::new(FixedClock::new(day)),
        None => Box::new(SystemClock),
    };
    let today = clock.today();
    let service = Arc::new(build_service(&config.storage, clock)?);
    let fmt = Formatter::new(config.display.clone());

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let address = config.server.address();
            let listener = tokio::net::TcpListener::bind(&address)
                .await
                .into_diagnostic()?;
            info!("Listening on {}", address);
            axum::serve(listener, router(AppState::new(service)))
                .await
                .into_diagnostic()?;
        }
        Command::Summary => {
            let mut dashboard = Dashboard::new(service);
            dashboard.load().await;
            report(&mut dashboard)?;
            print!("{}", fmt.summary(&dashboard.summary()));
            println!("\nSubscriptions");
            print!("{}", fmt.subscriptions(&dashboard.subscriptions()));
            println!("\nSuggestions");
            print!("{}", fmt.suggestions(&dashboard.suggestions()));
            println!("\nFuture installments");
            print!("{}", fmt.future_installments(dashboard.future_installments()));
        }
        Command::Add(args) => {
            let mut dashboard = Dashboard::new(service);
            dashboard.submit(args.into_draft(today)).await;
            report(&mut dashboard)?;
            if let Some(tx) = dashboard.transactions().first() {
                print!("{}", fmt.transactions(std::slice::from_ref(tx)));
            }
        }
        Command::List => {
            let transactions = service.list_transactions().await.into_diagnostic()?;
            print!("{}", fmt.transactions(&transactions));
        }
        Command::Delete { id } => {
            let mut dashboard = Dashboard::new(service);
            dashboard.delete(id).await;
            report(&mut dashboard)?;
        }
        Command::Bill => {
            let bill = service.current_bill().await.into_diagnostic()?;
            print!("{}", fmt.bill(&bill));
        }
        Command::PayBill { date } => {
            let mut dashboard = Dashboard::new(service);
            dashboard.pay_bill(date).await;
            report(&mut dashboard)?;
        }
        Command::Installments => {
            let groups = service.future_installments().await.into_diagnostic()?;
            print!("{}", fmt.future_installments(&groups));
        }
        Command::Import { input } => {
            let file = File::open(&input).into_diagnostic()?;
            let reader = TransactionReader::new(file);
            let mut imported = 0;
            for (line, row) in reader.transactions().enumerate() {
                let result = match row {
                    Ok(new) => service.create_transaction(new).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(_) => imported += 1,
                    Err(e) => eprintln!("Error importing row {}: {}", line + 1, e),
                }
            }
            println!("Imported {imported} transactions");
            let summary = service.summary().await.into_diagnostic()?;
            print!("{}", fmt.summary(&summary));
        }
        Command::Export { output } => {
            let transactions = service.list_transactions().await.into_diagnostic()?;
            match output {
                Some(path) => {
                    let file = File::create(path).into_diagnostic()?;
                    TransactionWriter::new(file)
                        .write_transactions(&transactions)
                        .into_diagnostic()?;
                }
                None => {
                    let stdout = io::stdout();
                    TransactionWriter::new(stdout.lock())
                        .write_transactions(&transactions)
                        .into_diagnostic()?;
                }
            }
        }
        Command::Box(command) => run_box_command(command, service, &fmt, today).await?,
    }

    Ok(())
}

async fn run_box_command(
    command: BoxCommand,
    service: Arc<FinanceService>,
    fmt: &Formatter,
    today: NaiveDate,
) -> Result<()> {
    match command {
        BoxCommand::List => {
            let boxes = service.list_saving_boxes().await.into_diagnostic()?;
            print!("{}", fmt.saving_boxes(&boxes));
        }
        BoxCommand::Create {
            name,
            description,
            goal,
        } => {
            let mut dashboard = Dashboard::new(service);
            dashboard
                .create_box(NewSavingBox {
                    name,
                    description,
                    target_amount: goal,
                })
                .await;
            report(&mut dashboard)?;
            if let Some(created) = dashboard.selected_box() {
                print!("{}", fmt.saving_boxes(std::slice::from_ref(created)));
            }
        }
        BoxCommand::Show { id } => {
            let saving_box = service.get_saving_box(id).await.into_diagnostic()?;
            print!("{}", fmt.saving_box(&saving_box));
        }
        BoxCommand::Deposit(args) => {
            move_money(service, MovementForm::Deposit, args, fmt, today).await?;
        }
        BoxCommand::Withdraw(args) => {
            move_money(service, MovementForm::Withdraw, args, fmt, today).await?;
        }
    }
    Ok(())
}

async fn move_money(
    service: Arc<FinanceService>,
    form: MovementForm,
    args: MovementArgs,
    fmt: &Formatter,
    today: NaiveDate,
) -> Result<()> {
    let mut dashboard = Dashboard::new(service);
    dashboard.select_box(args.id).await;
    if dashboard.selected_box().is_some() {
        dashboard
            .move_money(
                form,
                &args.amount,
                Some(args.date.unwrap_or(today)),
                &args.description,
            )
            .await;
    }
    report(&mut dashboard)?;
    if let Some(updated) = dashboard.selected_box() {
        print!("{}", fmt.saving_box(updated));
    }
    Ok(())
}
