use clap::{Parser, Subcommand, ValueEnum};
use ezpay::application::navigation::{Navigator, Route};
use ezpay::application::state::PaymentStateStore;
use ezpay::application::views::Mount;
use ezpay::application::views::balance::BalanceView;
use ezpay::application::views::confirm::{ConfirmOutcome, ConfirmView};
use ezpay::application::views::history::HistoryView;
use ezpay::application::views::initiate::{InitiateOutcome, InitiatePaymentView};
use ezpay::application::views::outcome::{FailureView, SuccessView};
use ezpay::config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
use ezpay::domain::payment::PaymentMethod;
use ezpay::domain::ports::{HistoryReply, SharedPaymentApi};
use ezpay::infrastructure::http::HttpPaymentApi;
use ezpay::interfaces::console;
use ezpay::interfaces::csv::history_writer::HistoryWriter;
use miette::{IntoDiagnostic, Result};
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "ezpay", author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the payment service
    #[arg(long, env = "EZPAY_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "EZPAY_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS, global = true)]
    timeout_ms: u64,

    /// Log requests and state changes to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a transfer and confirm it with the OTP sent to the sender
    Pay {
        #[command(subcommand)]
        method: PayCommand,
    },
    /// Check an account balance
    Balance {
        #[arg(long)]
        account: String,
        #[arg(long)]
        ifsc: String,
    },
    /// List past transactions, newest first
    History {
        #[arg(long, value_enum, default_value_t = Format::Table, global = true)]
        format: Format,

        #[command(subcommand)]
        target: HistoryTarget,
    },
}

#[derive(Subcommand)]
enum PayCommand {
    Bank {
        #[arg(long)]
        sender_account: String,
        #[arg(long)]
        sender_ifsc: String,
        #[arg(long)]
        receiver_account: String,
        #[arg(long)]
        receiver_ifsc: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        purpose: String,
    },
    Upi {
        #[arg(long)]
        sender: String,
        #[arg(long)]
        receiver: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        note: String,
    },
}

#[derive(Subcommand)]
enum HistoryTarget {
    Bank { account: String },
    Upi { handle: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Csv,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ClientConfig::new(cli.base_url, cli.timeout_ms).into_diagnostic()?;
    let api: SharedPaymentApi = Arc::new(HttpPaymentApi::new(&config).into_diagnostic()?);

    match cli.command {
        Command::Pay { method } => pay(api, method).await,
        Command::Balance { account, ifsc } => balance(api, &account, &ifsc).await,
        Command::History { format, target } => history(api, target, format).await,
    }
}

async fn pay(api: SharedPaymentApi, command: PayCommand) -> Result<ExitCode> {
    let store = PaymentStateStore::new();
    let navigator = Navigator::new(store.clone());
    navigator.navigate(Route::Payment);

    let mut initiate = InitiatePaymentView::new(api.clone(), store.clone());
    match command {
        PayCommand::Bank {
            sender_account,
            sender_ifsc,
            receiver_account,
            receiver_ifsc,
            amount,
            purpose,
        } => {
            initiate.select_method(PaymentMethod::Account);
            let form = &mut initiate.bank;
            form.sender_account.input(&sender_account);
            form.sender_ifsc.input(&sender_ifsc);
            form.receiver_account.input(&receiver_account);
            form.receiver_ifsc.input(&receiver_ifsc);
            form.amount.input(&amount);
            form.purpose.input(&purpose);
        }
        PayCommand::Upi {
            sender,
            receiver,
            amount,
            note,
        } => {
            initiate.select_method(PaymentMethod::Upi);
            let form = &mut initiate.upi;
            form.sender.input(&sender);
            form.receiver.input(&receiver);
            form.amount.input(&amount);
            form.note.input(&note);
        }
    }

    match initiate.submit().await.into_diagnostic()? {
        InitiateOutcome::AwaitingOtp { .. } => {}
        InitiateOutcome::Rejected(message) | InitiateOutcome::Failed(message) => {
            eprintln!("{}", message);
            return Ok(ExitCode::FAILURE);
        }
    }

    let mut confirm = match ConfirmView::mount(&navigator, api, store.clone()) {
        Mount::Rendered(view) => view,
        Mount::Redirected(_) => return Ok(ExitCode::FAILURE),
    };
    eprintln!("An OTP has been sent. It is valid for {}.", confirm.time_left());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let confirmed = loop {
        eprint!("Enter OTP ({} left): ", confirm.time_left());
        tokio::select! {
            _ = confirm.expired() => break false,
            line = lines.next_line() => {
                let Some(line) = line.into_diagnostic()? else {
                    confirm.abandon(&navigator);
                    eprintln!();
                    eprintln!("No OTP entered. Payment cancelled.");
                    return Ok(ExitCode::FAILURE);
                };
                match confirm.submit_code(&line).await {
                    Ok(ConfirmOutcome::Confirmed) => break true,
                    Ok(ConfirmOutcome::Expired) => break false,
                    Ok(ConfirmOutcome::InvalidCode) | Ok(ConfirmOutcome::Failed(_)) => {
                        if let Some(message) = confirm.error() {
                            eprintln!("{}", message);
                        }
                    }
                    Err(err) if err.is_validation() => eprintln!("{}", err.user_message()),
                    Err(err) => return Err(err).into_diagnostic(),
                }
            }
        }
    };
    drop(confirm);

    if confirmed {
        if let Mount::Rendered(view) = SuccessView::mount(&navigator, store.clone()) {
            println!("{}", console::receipt(view.receipt()));
            view.finish(&navigator);
        }
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!();
        if let Mount::Rendered(view) = FailureView::mount(&navigator, store.clone()) {
            eprintln!("{}", view.message());
        }
        Ok(ExitCode::FAILURE)
    }
}

async fn balance(api: SharedPaymentApi, account: &str, ifsc: &str) -> Result<ExitCode> {
    let mut view = BalanceView::new(api);
    view.form.account.input(account);
    view.form.ifsc.input(ifsc);

    let outcome = view.check().await.into_diagnostic()?;
    if outcome.is_error() {
        eprintln!("{}", console::balance(&outcome));
        return Ok(ExitCode::FAILURE);
    }
    println!("{}", console::balance(&outcome));
    Ok(ExitCode::SUCCESS)
}

async fn history(api: SharedPaymentApi, target: HistoryTarget, format: Format) -> Result<ExitCode> {
    let mut view = HistoryView::new(api);
    match &target {
        HistoryTarget::Bank { account } => {
            view.select(PaymentMethod::Account);
            view.account.input(account);
        }
        HistoryTarget::Upi { handle } => {
            view.select(PaymentMethod::Upi);
            view.handle.input(handle);
        }
    }

    let reply = view.lookup().await.into_diagnostic()?;
    match (&reply, format) {
        (HistoryReply::Records(records), Format::Csv) => {
            let stdout = io::stdout();
            HistoryWriter::new(stdout.lock())
                .write_records(records)
                .into_diagnostic()?;
            Ok(ExitCode::SUCCESS)
        }
        (HistoryReply::Records(_), Format::Table) => {
            println!("{}", console::history_reply(view.option(), &reply));
            Ok(ExitCode::SUCCESS)
        }
        (HistoryReply::Empty, _) => {
            eprintln!("{}", console::history_reply(view.option(), &reply));
            Ok(ExitCode::SUCCESS)
        }
        (HistoryReply::Failure(_), _) => {
            eprintln!("{}", console::history_reply(view.option(), &reply));
            Ok(ExitCode::FAILURE)
        }
    }
}
