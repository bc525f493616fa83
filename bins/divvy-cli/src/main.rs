//! divvy-cli: command-line driver for a Divvy share token.
//!
//! The token lives in a JSON state file. Every state-changing command loads
//! it, applies one operation and atomically rewrites it; a failed operation
//! leaves the file as it was.

mod config;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use divvy_core::constants::COIN;
use divvy_core::crypto::{KeyPair, PublicKey, sign_claim, signature_from_hex};
use divvy_core::types::AccountId;
use divvy_dividend::schedule::next_era_at;
use divvy_dividend::{DividendToken, TokenConfig};

use crate::config::{CliConfig, Overrides};

/// Divvy share token command-line interface.
#[derive(Parser, Debug)]
#[command(name = "divvy-cli")]
#[command(version, about = "Shares that pay dividends on every transfer.")]
struct Cli {
    /// Path to the token state file (default: <data dir>/divvy/state.json).
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Log level filter (e.g. "info", "debug", "divvy_dividend=trace").
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format: text or json.
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a keypair and print its account id.
    Keygen(KeygenArgs),
    /// Create a fresh token state file.
    Init(InitArgs),
    /// Sign a claim for an account with the authorizer's secret key.
    SignClaim(SignClaimArgs),
    /// Redeem a claim signature.
    Claim(ClaimArgs),
    /// Transfer shares; the amount also funds the dividend pool.
    Transfer(TransferArgs),
    /// Withdraw all available dividends as new shares.
    Withdraw(AccountArgs),
    /// Destroy shares.
    Burn(BurnArgs),
    /// Show balance and dividend figures for an account.
    Show(AccountArgs),
    /// Show token-wide figures.
    Status(StatusArgs),
}

#[derive(Args, Debug)]
struct KeygenArgs {
    /// Hex-encoded 32-byte secret. A random key is generated if omitted.
    #[arg(long)]
    seed_hex: Option<String>,
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Hex-encoded authorizer public key.
    #[arg(long)]
    authorizer: String,

    /// Claim deadline: Unix seconds or an RFC 3339 timestamp.
    #[arg(long)]
    deadline: String,

    /// Overwrite an existing state file.
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug)]
struct SignClaimArgs {
    /// Hex-encoded authorizer secret key.
    #[arg(long)]
    secret: String,

    #[arg(long)]
    account: AccountId,
}

#[derive(Args, Debug)]
struct ClaimArgs {
    #[arg(long)]
    account: AccountId,

    /// Hex-encoded 64-byte authorizer signature.
    #[arg(long)]
    signature: String,

    /// Unix seconds to use as the current time (default: system clock).
    #[arg(long)]
    now: Option<u64>,
}

#[derive(Args, Debug)]
struct TransferArgs {
    #[arg(long)]
    from: AccountId,

    #[arg(long)]
    to: AccountId,

    /// Amount in base units.
    #[arg(long)]
    amount: u64,

    /// Unix seconds to use as the current time (default: system clock).
    #[arg(long)]
    now: Option<u64>,
}

#[derive(Args, Debug)]
struct AccountArgs {
    #[arg(long)]
    account: AccountId,
}

#[derive(Args, Debug)]
struct BurnArgs {
    #[arg(long)]
    account: AccountId,

    /// Amount in base units.
    #[arg(long)]
    amount: u64,
}

#[derive(Args, Debug)]
struct StatusArgs {
    /// Unix seconds to use as the current time (default: system clock).
    #[arg(long)]
    now: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = Overrides {
        state_path: cli.state.clone(),
        log_level: cli.log_level.clone(),
        log_format: cli.log_format.clone(),
    };
    let config = CliConfig::load(&overrides)?;
    init_logging(&config.log_level, &config.log_format);

    run(cli.command, &config.state_path)
}

fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    // Logs go to stderr so command output stays parseable.
    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn run(command: Commands, state_path: &Path) -> Result<()> {
    match command {
        Commands::Keygen(args) => keygen(args),
        Commands::Init(args) => init(args, state_path),
        Commands::SignClaim(args) => sign(args),
        Commands::Claim(args) => {
            let signature = signature_from_hex(&args.signature).context("bad --signature")?;
            let now = resolve_now(args.now)?;
            mutate(state_path, |token| {
                let amount = token.claim(&args.account, &signature, now)?;
                println!("claimed {}", format_amount(amount));
                Ok(())
            })
        }
        Commands::Transfer(args) => {
            let now = resolve_now(args.now)?;
            mutate(state_path, |token| {
                let dist = token.transfer(&args.from, &args.to, args.amount, now)?;
                println!(
                    "transferred {} (era {}, {} to holders)",
                    format_amount(args.amount),
                    dist.era,
                    format_amount(dist.contribution)
                );
                Ok(())
            })
        }
        Commands::Withdraw(args) => mutate(state_path, |token| {
            let amount = token.withdraw_dividend(&args.account)?;
            println!("withdrew {}", format_amount(amount));
            Ok(())
        }),
        Commands::Burn(args) => mutate(state_path, |token| {
            token.burn(&args.account, args.amount)?;
            println!("burned {}", format_amount(args.amount));
            Ok(())
        }),
        Commands::Show(args) => show(&load_state(state_path)?, &args.account),
        Commands::Status(args) => status(&load_state(state_path)?, resolve_now(args.now)?),
    }
}

// ---------------------------------------------------------------------------
// Key handling
// ---------------------------------------------------------------------------

fn parse_secret(hex_str: &str) -> Result<KeyPair> {
    let bytes = hex::decode(hex_str.trim()).context("secret is not valid hex")?;
    let bytes: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .with_context(|| format!("secret must be 32 bytes, got {}", bytes.len()))?;
    Ok(KeyPair::from_secret_bytes(bytes))
}

fn keygen(args: KeygenArgs) -> Result<()> {
    let keypair = match args.seed_hex {
        Some(s) => parse_secret(&s)?,
        None => KeyPair::generate(),
    };
    println!("secret:     {}", hex::encode(keypair.secret_bytes()));
    println!("public key: {}", keypair.public_key());
    println!("account:    {}", keypair.account_id());
    Ok(())
}

fn sign(args: SignClaimArgs) -> Result<()> {
    let authorizer = parse_secret(&args.secret)?;
    println!("{}", hex::encode(sign_claim(&authorizer, &args.account)));
    Ok(())
}

// ---------------------------------------------------------------------------
// State file
// ---------------------------------------------------------------------------

fn init(args: InitArgs, state_path: &Path) -> Result<()> {
    if state_path.exists() && !args.force {
        bail!(
            "State file already exists: {} (use --force to overwrite)",
            state_path.display()
        );
    }
    let authorizer = PublicKey::from_hex(&args.authorizer).context("bad --authorizer")?;
    let deadline = parse_deadline(&args.deadline)?;
    let token = DividendToken::in_memory(TokenConfig::new(authorizer, deadline));
    save_state(state_path, &token)?;
    info!(path = %state_path.display(), deadline, "state file initialized");
    println!("initialized {}", state_path.display());
    Ok(())
}

fn load_state(path: &Path) -> Result<DividendToken> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Corrupt state file: {}", path.display()))
}

/// Write the snapshot to a sibling temp file, then rename it into place.
fn save_state(path: &Path, token: &DividendToken) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(token).context("Failed to encode state")?;
    let tmp = tmp_path(path);
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace state file: {}", path.display()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load, apply `op`, print its events and save. Nothing is written when `op`
/// fails.
fn mutate<F>(path: &Path, op: F) -> Result<()>
where
    F: FnOnce(&mut DividendToken) -> Result<()>,
{
    let mut token = load_state(path)?;
    op(&mut token)?;
    for event in token.take_events() {
        println!("{}", serde_json::to_string(&event)?);
    }
    save_state(path, &token)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

fn show(token: &DividendToken, account: &AccountId) -> Result<()> {
    println!("account:      {account}");
    println!("balance:      {}", format_amount(token.balance_of(account)));
    println!(
        "accumulative: {}",
        format_amount(token.accumulative_dividend_of(account)?)
    );
    println!(
        "withdrawable: {}",
        format_amount(token.withdrawable_dividend_of(account)?)
    );
    println!("withdrawn:    {}", format_amount(token.withdrawn_dividend_of(account)));
    println!("claimed:      {}", token.claimed(account));
    Ok(())
}

fn status(token: &DividendToken, now: u64) -> Result<()> {
    let deadline = token.claim_deadline();
    println!("authorizer:   {}", token.authorizer());
    println!("deadline:     {}", format_timestamp(deadline));
    println!("claims open:  {}", token.config().claim_window_open(now));
    println!("total supply: {}", format_amount(token.total_supply()));
    println!("holders:      {}", token.ledger().holder_count());
    println!("per share:    {}", token.per_share());
    println!("era:          {}", token.era(now));
    match next_era_at(deadline, now) {
        Some(ts) => println!("next era:     {}", format_timestamp(ts)),
        None => println!("next era:     none (distribution ended)"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Parsing and formatting
// ---------------------------------------------------------------------------

/// Unix seconds, or an RFC 3339 timestamp no earlier than the epoch.
fn parse_deadline(s: &str) -> Result<u64> {
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    let dt = chrono::DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("deadline {s:?} is neither Unix seconds nor RFC 3339"))?;
    u64::try_from(dt.timestamp()).context("deadline is before the Unix epoch")
}

fn resolve_now(now: Option<u64>) -> Result<u64> {
    match now {
        Some(now) => Ok(now),
        None => u64::try_from(chrono::Utc::now().timestamp())
            .context("system clock is before the Unix epoch"),
    }
}

fn format_amount(units: u64) -> String {
    format!("{}.{:08}", units / COIN, units % COIN)
}

fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| chrono::DateTime::from_timestamp(s, 0))
        .map(|dt| format!("{} ({secs})", dt.to_rfc3339()))
        .unwrap_or_else(|| secs.to_string())
}
