// file: src/main.rs
// description: commandline application entry point and scheduling loop
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tv1_feed_connector::feed::ReqwestTransport;
use tv1_feed_connector::{
    BundleImporter, Config, DirectoryImporter, FeedSession, Fetcher, FilterResolver,
    HttpBundleImporter, PlatformMode, PollingOrchestrator, RetryPolicy,
};

#[derive(Parser)]
#[command(name = "tv1_feed_connector")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Imports Trend Vision One threat-intel feeds into OpenCTI as STIX 2.1 bundles", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = tv1_feed_connector::config::DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll forever, sleeping between cycles
    Run {
        /// Write bundles to this directory instead of the platform
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Run a single cycle and exit
    Once {
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Print the contextual filter the next cycle would send
    Filter,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config, &cli.command);
    let debug = loaded.as_ref().map(|c| c.polling.debug).unwrap_or(false);
    tv1_feed_connector::utils::logging::init_logger(cli.color, cli.verbose || debug);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("[ERROR] {}", e);
            std::process::exit(2);
        }
    };

    info!("Trend Vision One feed connector");

    match cli.command {
        Commands::Run { output_dir } => {
            cmd_run(config, output_dir).await?;
        }
        Commands::Once { output_dir } => {
            let failed = cmd_once(config, output_dir).await?;
            if failed {
                std::process::exit(1);
            }
        }
        Commands::Filter => {
            cmd_filter(config).await?;
        }
    }

    Ok(())
}

fn load_config(path: &Path, command: &Commands) -> tv1_feed_connector::Result<Config> {
    let mut config = Config::load_unvalidated(Some(path))?;

    // A dry run never talks to the platform, so its credentials are optional.
    if let Commands::Run {
        output_dir: Some(dir),
    }
    | Commands::Once {
        output_dir: Some(dir),
    } = command
    {
        config.platform.mode = PlatformMode::Directory;
        config.platform.output_dir = dir.clone();
    }
    if matches!(command, Commands::Filter) {
        config.platform.mode = PlatformMode::Directory;
    }

    config.validate()?;
    Ok(config)
}

fn build_importer(config: &Config) -> Result<Arc<dyn BundleImporter>> {
    match config.platform.mode {
        PlatformMode::Http => {
            let importer = HttpBundleImporter::new(&config.platform)
                .context("Failed to create platform client")?;
            info!("Importing bundles to {}", importer.endpoint());
            Ok(Arc::new(importer))
        }
        PlatformMode::Directory => {
            let importer = DirectoryImporter::new(config.platform.output_dir.clone())
                .context("Failed to prepare output directory")?;
            info!("Writing bundles to {}", importer.output_dir().display());
            Ok(Arc::new(importer))
        }
    }
}

async fn cmd_run(config: Config, output_dir: Option<PathBuf>) -> Result<()> {
    if output_dir.is_some() {
        warn!("Dry run: bundles go to disk, not to the platform");
    }

    let sleep_interval = config.sleep_interval();
    let importer = build_importer(&config)?;
    let orchestrator =
        PollingOrchestrator::from_config(config, importer).context("Failed to create feed client")?;

    info!(
        "Polling with {} ladder candidate(s), sleeping {}s between cycles",
        orchestrator.ladder().len(),
        sleep_interval.as_secs()
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested, finishing current cycle");
            let _ = shutdown_tx.send(true);
        }
    });

    let cycles = orchestrator
        .run_until_shutdown(sleep_interval, shutdown_rx)
        .await;

    info!("Stopped after {} cycle(s)", cycles);
    Ok(())
}

async fn cmd_once(config: Config, output_dir: Option<PathBuf>) -> Result<bool> {
    if output_dir.is_some() {
        warn!("Dry run: bundles go to disk, not to the platform");
    }

    let importer = build_importer(&config)?;
    let orchestrator =
        PollingOrchestrator::from_config(config, importer).context("Failed to create feed client")?;

    let report = orchestrator.run_cycle().await;
    report.log();
    println!("{}", report.render());

    Ok(report.outcome.is_failure())
}

async fn cmd_filter(config: Config) -> Result<()> {
    let transport = ReqwestTransport::new(Duration::from_secs(config.feed.request_timeout_secs))
        .context("Failed to create feed client")?;
    let fetcher = Fetcher::new(
        Arc::new(transport),
        FeedSession::new(&config.feed.api_root, &config.feed.api_key),
        RetryPolicy::from_config(&config.feed),
    );

    let filter = FilterResolver::from_config(&config.feed)
        .resolve(&fetcher)
        .await;
    println!("{}", filter);
    Ok(())
}
