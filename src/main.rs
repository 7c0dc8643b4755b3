//! `token` - operate a fungible-token ledger kept in a local sled directory.

use clap::{Parser, Subcommand, ValueEnum};
use ourtoken::deploy::{self, parse_amount, DeployError, TokenConfig};
use ourtoken::events::{CodecError, EventCodec};
use ourtoken::identity::{Address, Keypair};
use ourtoken::ledger::{Amount, Ledger, LedgerError};
use ourtoken::storage::{LedgerStore, SledStore, StoreError};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "token", version, about = "Fungible-token ledger")]
struct Cli {
    /// Directory holding the ledger database.
    #[arg(long, default_value = "./token-data", env = "TOKEN_DATA_DIR")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a keypair, store it under a label, and print its address.
    Keygen {
        #[arg(long)]
        label: String,
    },
    /// Create the ledger, issuing the whole supply to the issuer.
    Deploy {
        /// Account receiving the initial supply (address or keypair label).
        #[arg(long)]
        issuer: String,

        /// Base units to issue, e.g. `1000e18`.
        #[arg(long, env = "TOKEN_INITIAL_SUPPLY", value_parser = parse_amount_arg)]
        initial_supply: Option<Amount>,

        #[arg(long, default_value = deploy::DEFAULT_NAME)]
        name: String,

        #[arg(long, default_value = deploy::DEFAULT_SYMBOL)]
        symbol: String,
    },
    /// Show name, symbol, supply and holder counts.
    Info,
    /// Show an account balance.
    Balance { account: String },
    /// Show what `spender` may still move out of `owner`'s balance.
    Allowance { owner: String, spender: String },
    /// Move tokens from `--from` to `to`.
    Transfer {
        #[arg(long)]
        from: String,
        to: String,
        #[arg(value_parser = parse_amount_arg)]
        amount: Amount,
    },
    /// Set the allowance `spender` holds over `--owner`.
    Approve {
        #[arg(long)]
        owner: String,
        spender: String,
        #[arg(value_parser = parse_amount_arg)]
        amount: Amount,
    },
    /// Spend `--caller`'s allowance to move `owner`'s tokens to `to`.
    TransferFrom {
        #[arg(long)]
        caller: String,
        owner: String,
        to: String,
        #[arg(value_parser = parse_amount_arg)]
        amount: Amount,
    },
    /// Print the persisted event log.
    Events {
        #[arg(long, value_enum, default_value_t = Encoding::Text)]
        encoding: Encoding,
    },
}

/// How `token events` renders each log entry
#[derive(Clone, Copy, ValueEnum)]
enum Encoding {
    /// Human-readable summary
    Text,
    /// Binary log entry as hex
    Hex,
    /// Binary log entry as URL-safe base64
    Base64,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("No ledger deployed in this data directory; run `token deploy` first")]
    NotDeployed,

    #[error("'{0}' is neither an address nor a stored keypair label")]
    UnknownAccount(String),

    #[error("Keypair label '{0}' is already in use")]
    LabelTaken(String),
}

fn parse_amount_arg(s: &str) -> Result<Amount, String> {
    parse_amount(s).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let store = LedgerStore::new(SledStore::open(&cli.data_dir)?);

    match cli.command {
        Command::Keygen { label } => {
            if store.load_keypair(&label)?.is_some() {
                return Err(CliError::LabelTaken(label));
            }
            let keypair = Keypair::generate();
            store.save_keypair(&label, &keypair)?;
            store.flush()?;
            println!("{}", keypair.address());
        }

        Command::Deploy {
            issuer,
            initial_supply,
            name,
            symbol,
        } => {
            let issuer = resolve(&store, &issuer)?;
            let config = TokenConfig::new(
                initial_supply.unwrap_or(deploy::INITIAL_SUPPLY),
                name,
                symbol,
            );
            let ledger = deploy::deploy_into(&store, &config, issuer)?;
            println!(
                "Deployed {} ({}) with supply {} to {}",
                ledger.name(),
                ledger.symbol(),
                ledger.total_supply(),
                issuer
            );
        }

        Command::Info => {
            let ledger = load(&store)?;
            let stats = ledger.statistics();
            println!("name:         {}", ledger.name());
            println!("symbol:       {}", ledger.symbol());
            println!("decimals:     {}", ledger.decimals());
            println!("total supply: {}", stats.total_supply);
            println!("holders:      {}", stats.holder_count);
            println!("allowances:   {}", stats.allowance_count);
        }

        Command::Balance { account } => {
            let ledger = load(&store)?;
            println!("{}", ledger.balance_of(resolve(&store, &account)?));
        }

        Command::Allowance { owner, spender } => {
            let ledger = load(&store)?;
            let owner = resolve(&store, &owner)?;
            let spender = resolve(&store, &spender)?;
            println!("{}", ledger.allowance(owner, spender));
        }

        Command::Transfer { from, to, amount } => {
            let from = resolve(&store, &from)?;
            let to = resolve(&store, &to)?;
            apply(&store, |ledger| ledger.transfer(from, to, amount))?;
        }

        Command::Approve {
            owner,
            spender,
            amount,
        } => {
            let owner = resolve(&store, &owner)?;
            let spender = resolve(&store, &spender)?;
            apply(&store, |ledger| ledger.approve(owner, spender, amount))?;
        }

        Command::TransferFrom {
            caller,
            owner,
            to,
            amount,
        } => {
            let caller = resolve(&store, &caller)?;
            let owner = resolve(&store, &owner)?;
            let to = resolve(&store, &to)?;
            apply(&store, |ledger| ledger.transfer_from(caller, owner, to, amount))?;
        }

        Command::Events { encoding } => {
            for (seq, event) in store.events()?.iter().enumerate() {
                let rendered = match encoding {
                    Encoding::Text => event.to_string(),
                    Encoding::Hex => EventCodec::encode_hex(event)?,
                    Encoding::Base64 => EventCodec::encode_base64(event)?,
                };
                println!("{:>6}  {}", seq, rendered);
            }
        }
    }

    Ok(())
}

/// Accept either a `0x` address or the label of a stored keypair
fn resolve(store: &LedgerStore<SledStore>, account: &str) -> Result<Address, CliError> {
    if let Ok(address) = Address::parse(account) {
        return Ok(address);
    }
    store
        .load_keypair(account)?
        .map(|keypair| keypair.address())
        .ok_or_else(|| CliError::UnknownAccount(account.to_string()))
}

fn load(store: &LedgerStore<SledStore>) -> Result<Ledger, CliError> {
    store.load_ledger()?.ok_or(CliError::NotDeployed)
}

/// Load, mutate, then commit the snapshot and the emitted events together
fn apply<F>(store: &LedgerStore<SledStore>, op: F) -> Result<(), CliError>
where
    F: FnOnce(&mut Ledger) -> Result<(), LedgerError>,
{
    let mut ledger = load(store)?;
    op(&mut ledger)?;

    let events = ledger.drain_events();
    store.commit(&ledger, &events)?;
    store.flush()?;

    for event in &events {
        println!("{}", event);
    }
    Ok(())
}
