//! sigil — command-line front end for the Sigil wallet manager.
//!
//! Every subcommand maps to one wallet manager or resolver call. Secrets
//! and passwords are read without echo and never accepted on the command
//! line.

mod rpc;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sigil_core::traits::ConfigStore;
use sigil_wallet::resolver;
use sigil_wallet::{
    ExportFormat, FileConfigStore, ImportSecret, WalletConfig, WalletKind, WalletManager,
};
use zeroize::Zeroizing;

use crate::rpc::RpcChainClient;

/// Sigil command-line wallet manager.
#[derive(Parser)]
#[command(name = "sigil")]
#[command(version, about = "Local encrypted wallet manager.")]
struct Cli {
    /// Data directory (default: $SIGIL_HOME or ~/.sigil).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Node JSON-RPC endpoint for balance queries and broadcasts.
    #[arg(
        long,
        global = true,
        env = "SIGIL_RPC_ENDPOINT",
        default_value = "http://127.0.0.1:8899"
    )]
    rpc_endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wallet management subcommands.
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },
}

#[derive(Subcommand)]
enum WalletAction {
    /// Create a new wallet.
    Create(CreateArgs),
    /// Import a recovery phrase, private key, or keystore file.
    Import(ImportArgs),
    /// List stored wallets.
    List(ListArgs),
    /// Export a wallet's secret.
    Export(ExportArgs),
    /// Delete a wallet (requires its password).
    Delete(TargetArgs),
    /// Set the active wallet.
    Use(UseArgs),
    /// Show the active wallet.
    Current,
    /// Query a balance by wallet name or address.
    Balance(BalanceArgs),
    /// Sign a hex payload with a wallet and broadcast it.
    Send(SendArgs),
}

#[derive(Args)]
struct CreateArgs {
    /// Wallet name.
    name: String,

    /// Wallet type (mnemonic or private-key).
    #[arg(short = 't', long = "type", default_value = "mnemonic")]
    kind: WalletKind,
}

#[derive(Args)]
struct ImportArgs {
    /// Wallet name.
    name: String,

    /// Keystore JSON file. Without it the phrase or key is prompted for.
    #[arg(short, long)]
    keystore: Option<PathBuf>,
}

#[derive(Args)]
struct ListArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportKind {
    Mnemonic,
    PrivateKey,
    Keystore,
}

#[derive(Args)]
struct ExportArgs {
    /// Wallet name (default: active wallet).
    name: Option<String>,

    /// Representation to export.
    #[arg(short, long, value_enum, default_value = "private-key")]
    format: ExportKind,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct TargetArgs {
    /// Wallet name (default: active wallet).
    name: Option<String>,
}

#[derive(Args)]
struct UseArgs {
    /// Wallet name.
    name: String,
}

#[derive(Args)]
struct BalanceArgs {
    /// Wallet name or address (default: active wallet).
    target: Option<String>,
}

#[derive(Args)]
struct SendArgs {
    /// Hex-encoded payload to sign.
    payload: String,

    /// Wallet name (default: active wallet).
    #[arg(short, long)]
    wallet: Option<String>,
}

/// Everything a subcommand needs.
struct App {
    manager: WalletManager,
    pointer: FileConfigStore,
    rpc_endpoint: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.data_dir {
        Some(dir) => WalletConfig::with_data_dir(dir),
        None => WalletConfig::from_env(),
    };
    let app = App {
        manager: WalletManager::new(&config),
        pointer: FileConfigStore::new(config.config_path()),
        rpc_endpoint: cli.rpc_endpoint,
    };

    match cli.command {
        Commands::Wallet { action } => match action {
            WalletAction::Create(args) => wallet_create(&app, args),
            WalletAction::Import(args) => wallet_import(&app, args),
            WalletAction::List(args) => wallet_list(&app, args),
            WalletAction::Export(args) => wallet_export(&app, args),
            WalletAction::Delete(args) => wallet_delete(&app, args),
            WalletAction::Use(args) => wallet_use(&app, args),
            WalletAction::Current => wallet_current(&app),
            WalletAction::Balance(args) => wallet_balance(&app, args).await,
            WalletAction::Send(args) => wallet_send(&app, args).await,
        },
    }
}

/// Create a wallet and show its recovery phrase once.
fn wallet_create(app: &App, args: CreateArgs) -> Result<()> {
    if args.kind == WalletKind::Keystore {
        bail!("Keystore wallets can only be imported (use `wallet import --keystore`)");
    }
    if app.manager.store().exists(&args.name) {
        bail!("Wallet already exists: {}", args.name);
    }
    let password = prompt_new_password("Enter wallet password")?;

    let created = app
        .manager
        .create(&args.name, password.as_bytes(), args.kind)
        .context("Failed to create wallet")?;

    println!("\n=== WALLET CREATED ===");
    println!("Name:    {}", created.name);
    println!("Type:    {}", created.kind);
    println!("Address: {}", created.address);
    if let Some(phrase) = &created.mnemonic {
        println!("\nRECOVERY PHRASE ({} WORDS):", phrase.split_whitespace().count());
        println!("  {}", phrase.as_str());
        println!("\nWARNING: This phrase will NOT be shown again.");
        println!("Store it offline. Anyone with it controls this wallet.");
    }
    Ok(())
}

/// Import an existing secret under a new name.
fn wallet_import(app: &App, args: ImportArgs) -> Result<()> {
    if app.manager.store().exists(&args.name) {
        bail!("Wallet already exists: {}", args.name);
    }
    let secret = match &args.keystore {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read keystore: {}", path.display()))?;
            let password = prompt_password("Keystore password")?;
            ImportSecret::Keystore { json, password }
        }
        None => {
            let input = prompt_password("Recovery phrase or hex private key")?;
            ImportSecret::from_text(&input)
        }
    };
    let password = prompt_new_password("Enter new wallet password")?;

    let address = app
        .manager
        .import(&args.name, password.as_bytes(), secret)
        .context("Failed to import wallet")?;

    println!("\n=== WALLET IMPORTED ===");
    println!("Name:    {}", args.name);
    println!("Address: {address}");
    Ok(())
}

fn wallet_list(app: &App, args: ListArgs) -> Result<()> {
    let wallets = app.manager.list().context("Failed to list wallets")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&wallets)?);
        return Ok(());
    }
    if wallets.is_empty() {
        println!("No wallets found in {}", app.manager.store().dir().display());
        return Ok(());
    }

    let active = active_wallet(&app.pointer)?;
    for w in &wallets {
        let marker = if active.as_deref() == Some(w.name.as_str()) { "*" } else { " " };
        println!(
            "{marker} {:<20} {:<12} {}  {}",
            w.name,
            w.kind,
            w.address,
            w.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

/// Export a secret to stdout or a file.
fn wallet_export(app: &App, args: ExportArgs) -> Result<()> {
    let name = resolver::resolve_or_fail(args.name.as_deref(), &app.pointer)?;
    let password = prompt_password("Wallet password")?;
    let format = match args.format {
        ExportKind::Mnemonic => ExportFormat::Mnemonic,
        ExportKind::PrivateKey => ExportFormat::PrivateKey,
        ExportKind::Keystore => ExportFormat::Keystore {
            password: prompt_new_password("Enter keystore password")?,
        },
    };

    let exported = app
        .manager
        .export(&name, password.as_bytes(), format)
        .with_context(|| format!("Failed to export wallet '{name}'"))?;

    match args.output {
        Some(path) => {
            write_secret_file(&path, exported.expose())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported '{name}' to {}", path.display());
        }
        None => println!("{}", exported.expose()),
    }
    Ok(())
}

fn wallet_delete(app: &App, args: TargetArgs) -> Result<()> {
    let name = resolver::resolve_or_fail(args.name.as_deref(), &app.pointer)?;
    let password = prompt_password(&format!("Password for '{name}'"))?;
    app.manager
        .delete(&name, password.as_bytes(), &app.pointer)
        .with_context(|| format!("Failed to delete wallet '{name}'"))?;
    println!("Deleted wallet '{name}'");
    Ok(())
}

fn wallet_use(app: &App, args: UseArgs) -> Result<()> {
    app.manager
        .use_wallet(&args.name, &app.pointer)
        .with_context(|| format!("Failed to select wallet '{}'", args.name))?;
    println!("Active wallet: {}", args.name);
    Ok(())
}

fn wallet_current(app: &App) -> Result<()> {
    match app.manager.current(None, &app.pointer)? {
        Some(name) => {
            let address = app.manager.get_address(&name)?;
            println!("{name} ({address})");
        }
        None => println!("No active wallet. Set one with `sigil wallet use <name>`."),
    }
    Ok(())
}

async fn wallet_balance(app: &App, args: BalanceArgs) -> Result<()> {
    let target = resolver::resolve_or_fail(args.target.as_deref(), &app.pointer)?;
    let chain = RpcChainClient::new(&app.rpc_endpoint).context("Failed to connect to RPC")?;
    let balance = app
        .manager
        .get_balance(&target, &chain)
        .await
        .with_context(|| format!("Failed to query balance for '{target}'"))?;

    println!("\n=== BALANCE: {target} ===");
    println!("Native: {}", balance.native);
    for token in &balance.tokens {
        println!(
            "{:<8} {} ({} base units)",
            token.symbol,
            token.display_amount(),
            token.amount
        );
    }
    Ok(())
}

async fn wallet_send(app: &App, args: SendArgs) -> Result<()> {
    let name = resolver::resolve_or_fail(args.wallet.as_deref(), &app.pointer)?;
    let payload = hex::decode(args.payload.trim().trim_start_matches("0x"))
        .context("Payload must be hex")?;
    if payload.is_empty() {
        bail!("Payload is empty");
    }
    let chain = RpcChainClient::new(&app.rpc_endpoint).context("Failed to connect to RPC")?;
    let password = prompt_password("Wallet password")?;

    let signer = app
        .manager
        .get_signer(&name, password.as_bytes(), &chain)
        .with_context(|| format!("Failed to unlock wallet '{name}'"))?;
    let txid = signer.send(payload).await.context("Broadcast failed")?;
    drop(signer);

    println!("\n=== PAYLOAD SENT ===");
    println!("TxID: {txid}");
    Ok(())
}

/// Current active pointer. An unreadable config file is an error, not "none".
fn active_wallet(pointer: &dyn ConfigStore) -> Result<Option<String>> {
    pointer
        .get_active_wallet()
        .context("Failed to read active wallet from config")
}

/// Write an exported secret to a new owner-only file. Never overwrites.
fn write_secret_file(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()
}

/// Prompt for a secret without echo.
fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    rpassword::prompt_password(format!("{prompt}: "))
        .map(Zeroizing::new)
        .context("Failed to read password")
}

/// Prompt twice for a new password and require a match.
fn prompt_new_password(prompt: &str) -> Result<Zeroizing<String>> {
    let password = prompt_password(prompt)?;
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    let confirm = prompt_password("Confirm password")?;
    if *password != *confirm {
        bail!("Passwords do not match");
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_file_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.txt");
        write_secret_file(&path, "deadbeef").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "deadbeef\n");

        let err = write_secret_file(&path, "other").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "deadbeef\n");
    }

    #[test]
    fn malformed_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(active_wallet(&FileConfigStore::new(path.clone())).is_err());

        std::fs::write(&path, r#"{"activeWallet":"main"}"#).unwrap();
        assert_eq!(
            active_wallet(&FileConfigStore::new(path.clone())).unwrap().as_deref(),
            Some("main")
        );
    }

    #[cfg(unix)]
    #[test]
    fn secret_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phrase.txt");
        write_secret_file(&path, "abandon about").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
