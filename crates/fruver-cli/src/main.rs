mod collect;
mod export;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fruver")]
#[command(about = "Harvest fruit and vegetable prices from Colombian grocery sites")]
struct Cli {
    /// Site catalogue to load instead of `FRUVER_SITES_PATH`
    #[arg(long, global = true)]
    sites: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Harvest every configured site, or one with `--site`, and export CSVs
    Collect(CollectArgs),
    /// List the configured sites
    Sites,
}

#[derive(Debug, Default, Args)]
struct CollectArgs {
    /// Restrict the run to a single site (by slug)
    #[arg(long)]
    site: Option<String>,

    /// Directory the CSV files are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headful: bool,

    /// WebDriver server to connect to
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Print the planned run without opening a browser
    #[arg(long)]
    dry_run: bool,
}

impl CollectArgs {
    /// Apply command-line overrides on top of the environment config.
    fn apply(&self, config: &mut fruver_core::AppConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url.clone_from(url);
        }
        if self.headful {
            config.headless = false;
        }
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = fruver_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    if let Some(path) = &cli.sites {
        config.sites_path.clone_from(path);
    }
    let sites = fruver_core::load_sites(&config.sites_path)?;

    match cli.command {
        Some(Commands::Sites) => {
            collect::print_sites(&sites);
            Ok(())
        }
        Some(Commands::Collect(args)) => {
            args.apply(&mut config);
            collect::run_collect(&config, &sites, args.site.as_deref(), args.dry_run).await
        }
        None => collect::run_collect(&config, &sites, None, false).await,
    }
}
