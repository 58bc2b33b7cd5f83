//! ormbridge command-line tool.
//!
//! Loads a bridge configuration, connects to the remote server described by a
//! field metadata snapshot, finalizes the configured models in order and
//! prints the resulting local schema.

mod formatter;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use formatter::{ModelSummary, OutputFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ormbridge::{BridgeConfig, BridgeContext, SchemaBridge};
use ormbridge_client::{ConnectionManager, LogNotifier, Snapshot, SnapshotClient};

/// ormbridge command-line tool
#[derive(Parser, Debug)]
#[command(name = "ormbridge")]
#[command(version, about = "Synthesize local model fields from a remote server", long_about = None)]
pub struct Args {
    /// Bridge configuration file (JSON).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Remote field metadata snapshot (JSON).
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Remote server host.
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Remote server port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Remote database name.
    #[arg(short, long)]
    pub database: Option<String>,

    /// Login.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password.
    #[arg(long)]
    pub password: Option<String>,

    /// Locale sent with every remote call.
    #[arg(long)]
    pub language: Option<String>,

    /// Connection attempts before giving up.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Seconds between connection attempts.
    #[arg(long)]
    pub retry_delay: Option<u64>,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Exit with an error when not connected or when links stay unresolved.
    #[arg(long)]
    pub strict: bool,
}

/// Resolved command-line configuration.
#[derive(Debug)]
pub struct CliConfig {
    pub bridge: BridgeConfig,
    pub snapshot: PathBuf,
    pub format: OutputFormat,
    pub strict: bool,
}

impl Args {
    /// Load the configuration file, if any, and apply command-line overrides.
    pub fn into_config(self) -> Result<CliConfig, ormbridge::Error> {
        let mut bridge = match &self.config {
            Some(path) => BridgeConfig::load(path)?,
            None => BridgeConfig::default(),
        };

        let connection = &mut bridge.connection;
        if let Some(host) = self.host {
            connection.host = Some(host);
        }
        if let Some(port) = self.port {
            connection.port = port;
        }
        if let Some(database) = self.database {
            connection.database = database;
        }
        if let Some(user) = self.user {
            connection.user = user;
        }
        if let Some(password) = self.password {
            connection.password = password;
        }
        if let Some(language) = self.language {
            connection.language = language;
        }
        if let Some(max_attempts) = self.max_attempts {
            bridge.retry.max_attempts = max_attempts;
        }
        if let Some(delay) = self.retry_delay {
            bridge.retry.delay_secs = delay;
        }

        Ok(CliConfig {
            bridge,
            snapshot: self.snapshot,
            format: self.format,
            strict: self.strict,
        })
    }
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ormbridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let config = args.into_config()?;
    link_models(&config)
}

/// Connect, finalize every configured model and print the result.
///
/// Returns `false` in strict mode when the run left anything unlinked.
fn link_models(config: &CliConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let bridge_config = &config.bridge;
    let snapshot = Snapshot::load(&config.snapshot)?;
    tracing::info!(
        snapshot = %config.snapshot.display(),
        remote_models = snapshot.models.len(),
        models = bridge_config.models.len(),
        "configuration loaded"
    );

    let mut manager = ConnectionManager::new(
        Arc::new(SnapshotClient::new(snapshot)),
        bridge_config.connection_config(),
    )
    .with_retry_policy(bridge_config.retry_policy());
    if let Some(notification) = bridge_config.notification_config() {
        manager = manager.with_notification(notification, Arc::new(LogNotifier));
    }

    let context = Arc::new(BridgeContext::new());
    let connection = context.connect(&manager)?;
    let bridge = SchemaBridge::new(context);

    let models = bridge_config.bridged_models();
    let mut outcomes = Vec::with_capacity(models.len());
    for model in &models {
        outcomes.push(bridge.on_model_finalized(model.clone())?);
    }

    // Summarized only now: later models may have completed earlier ones.
    let summaries: Vec<ModelSummary> = models
        .iter()
        .zip(&outcomes)
        .map(|(model, outcome)| ModelSummary::new(model, outcome))
        .collect();
    let pending = bridge.pending_links();

    let formatter = formatter::create_formatter(config.format);
    println!("{}", formatter.format_report(&summaries, &pending));

    if !pending.is_empty() {
        tracing::warn!(count = pending.len(), "links left unresolved");
    }

    Ok(!(config.strict && (!connection.is_connected() || !pending.is_empty())))
}
