//! dropmirror CLI - mirror a Dropbox shared folder to a local directory
//!
//! Wires the Dropbox provider and local store into the synchronizer,
//! drives one run, prints a summary, and maps the outcome onto exit codes:
//!
//! - `0` - full success: every entry downloaded or skipped
//! - `1` - setup failure: bad credential, bad link, unusable save
//!   directory, invalid arguments; nothing was attempted
//! - `2` - partial failure: the run completed but some entries failed

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod output;

use output::{get_formatter, OutputFormat, OutputFormatter};

use dropmirror_core::config::Config;
use dropmirror_core::domain::credential::Credential;
use dropmirror_core::domain::newtypes::{AccessToken, SharedLink};
use dropmirror_dropbox::client::DropboxClient;
use dropmirror_dropbox::provider::DropboxSharedFolderProvider;
use dropmirror_sync::engine::{SyncOptions, SyncReport, Synchronizer};
use dropmirror_sync::store::LocalStoreAdapter;

/// Exit code for setup failures (credential, link, save directory, arguments)
const EXIT_SETUP_FAILURE: u8 = 1;

/// Exit code when the run completed but some entries failed
const EXIT_PARTIAL_FAILURE: u8 = 2;

const EXIT_CODE_HELP: &str = "Exit codes:
  0  full success (every entry downloaded or skipped)
  1  setup failure (credential, link, save directory, arguments)
  2  partial failure (run completed, some entries failed)";

#[derive(Debug, Parser)]
#[command(
    name = "dropmirror",
    version,
    about = "Mirror a Dropbox shared folder to a local directory",
    after_help = EXIT_CODE_HELP
)]
pub struct Cli {
    /// Shared folder link to download from Dropbox
    #[arg(long)]
    link: String,

    /// Local directory to save files into (created if missing)
    #[arg(long)]
    save_dir: PathBuf,

    /// Pre-obtained access token
    #[arg(long, conflicts_with_all = ["app_key", "app_secret"])]
    token: Option<String>,

    /// App key (see https://www.dropbox.com/developers/apps)
    #[arg(long, requires = "app_secret")]
    app_key: Option<String>,

    /// App secret paired with --app-key
    #[arg(long, requires = "app_key")]
    app_secret: Option<String>,

    /// Max retries per entry after the first attempt (default from config, 3)
    #[arg(long)]
    retry: Option<u32>,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Minimal output
    #[arg(short, long)]
    quiet: bool,

    /// Use alternate config file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Builds the credential from the argument surface
    ///
    /// clap already enforces that `--token` excludes the pair and that the
    /// pair is complete; what remains is requiring at least one of them.
    fn credential(&self) -> anyhow::Result<Credential> {
        if let Some(token) = &self.token {
            let token = AccessToken::new(token.clone()).context("invalid --token")?;
            return Ok(Credential::Token(token));
        }

        match (&self.app_key, &self.app_secret) {
            (Some(app_key), Some(app_secret)) => Ok(Credential::AppKeyPair {
                app_key: app_key.clone(),
                app_secret: app_secret.clone(),
            }),
            _ => anyhow::bail!(
                "a credential is required: pass --token, or --app-key together with --app-secret"
            ),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    // Setup tracing: -q wins, then -v levels, then the configured level.
    let filter = if cli.quiet {
        "warn".to_string()
    } else {
        match cli.verbose {
            0 => config.logging.level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let formatter = get_formatter(matches!(format, OutputFormat::Json));

    match run(&cli, &config).await {
        Ok(report) => {
            print_summary(formatter.as_ref(), &report, cli.json, cli.quiet);
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_PARTIAL_FAILURE)
            }
        }
        Err(err) => {
            formatter.error(&format!("{err:#}"));
            ExitCode::from(EXIT_SETUP_FAILURE)
        }
    }
}

/// Parses the run inputs, wires the adapters, and drives one run
///
/// Everything returned as `Err` here is a setup failure; entry-level
/// failures live inside the returned [`SyncReport`].
async fn run(cli: &Cli, config: &Config) -> anyhow::Result<SyncReport> {
    let link = SharedLink::new(cli.link.clone()).context("invalid --link")?;
    let credential = cli.credential()?;

    let client = DropboxClient::new(&config.http).context("failed to build HTTP client")?;
    let provider = Arc::new(DropboxSharedFolderProvider::new(client));
    let store = Arc::new(LocalStoreAdapter::new());

    let options = SyncOptions::new(cli.save_dir.clone())
        .with_retry_limit(cli.retry.unwrap_or(config.retry.max_attempts))
        .with_base_delay(config.retry.base_delay());

    tracing::info!(
        link = %link,
        save_dir = %cli.save_dir.display(),
        retry_limit = options.retry_limit,
        "Starting mirror"
    );

    let synchronizer = Synchronizer::new(provider, store, options);
    let report = synchronizer.run(&link, &credential).await?;
    Ok(report)
}

/// Prints the run summary in the selected format
fn print_summary(formatter: &dyn OutputFormatter, report: &SyncReport, json: bool, quiet: bool) {
    if json {
        formatter.print_json(&serde_json::json!({
            "success": report.is_success(),
            "downloaded": report.downloaded,
            "skipped": report.skipped,
            "folders_skipped": report.folders_skipped,
            "failed": report.failed,
            "duration_ms": report.duration_ms,
        }));
        return;
    }

    let duration_display = if report.duration_ms >= 1000 {
        format!("{:.1}s", report.duration_ms as f64 / 1000.0)
    } else {
        format!("{}ms", report.duration_ms)
    };

    if report.is_success() {
        if report.downloaded == 0 {
            formatter.success(&format!("Already up to date ({})", duration_display));
        } else {
            formatter.success(&format!("Mirror complete in {}", duration_display));
        }
    } else {
        formatter.error(&format!(
            "{} entr{} failed",
            report.failed.len(),
            if report.failed.len() == 1 { "y" } else { "ies" }
        ));
    }

    if quiet {
        return;
    }

    formatter.info(&format!(
        "Downloaded: {} file{}",
        report.downloaded,
        plural(report.downloaded)
    ));
    formatter.info(&format!(
        "Skipped:    {} file{}",
        report.skipped,
        plural(report.skipped)
    ));
    if report.folders_skipped > 0 {
        formatter.info(&format!(
            "Folders:    {} skipped (recursive download not supported)",
            report.folders_skipped
        ));
    }

    for failed in &report.failed {
        formatter.info(&format!("  - {}: {}", failed.path, failed.reason));
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
