mod cli;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::{debug, error};

use stratum_core::kernel::error::Result;
use stratum_core::{DefaultPluginManager, KernelComponent, PluginManager};

/// Stratum: inspect plugin categories and how their implementations resolve
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Settings file (JSON, YAML or TOML)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Directory-list root, lowest priority first (repeatable)
    #[arg(long = "plugin-path", value_name = "DIR", global = true)]
    plugin_path: Vec<PathBuf>,

    /// Search-path root, lowest priority first (repeatable)
    #[arg(long = "search-root", value_name = "DIR", global = true)]
    search_root: Vec<PathBuf>,

    /// Report every scan and override decision
    #[arg(long, global = true)]
    debug_plugins: bool,

    /// Fail on the first plugin unit that cannot be loaded
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered categories
    Categories,
    /// List the visible implementations of a category
    List {
        /// Category identifier
        category: String,
    },
    /// Show which implementation wins for a name and what it shadows
    Which {
        /// Category identifier
        category: String,
        /// Implementation name
        name: String,
    },
    /// Show overrides, skipped units and scanned directories of a category
    Report {
        /// Category identifier
        category: String,
    },
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    cli::init_logging(args.debug_plugins);

    if let Err(e) = run(args).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let settings = cli::build_settings(
        args.config.as_deref(),
        args.plugin_path,
        args.search_root,
        args.debug_plugins,
        args.strict,
    )?;
    debug!("Effective settings: {:?}", settings);

    let manager = DefaultPluginManager::new(settings);
    manager.initialize().await?;
    manager.register_declared_categories().await?;
    manager.start().await?;

    let output = match &args.command {
        Commands::Categories => {
            let registry = manager.registry().read().await;
            let categories: Vec<_> = registry
                .list_categories()
                .into_iter()
                .filter_map(|id| registry.get(&id).cloned())
                .collect();
            cli::render_categories(&categories)
        }
        Commands::List { category } => {
            let table = manager.effective_table(category).await?;
            cli::render_list(&table)
        }
        Commands::Which { category, name } => {
            manager.get_plugin_class(category, name).await?;
            let table = manager.effective_table(category).await?;
            cli::render_which(&table, name)
        }
        Commands::Report { category } => {
            let report = manager.resolution_report(category).await?;
            cli::render_report(&report)
        }
    };
    print!("{}", output);

    manager.stop().await
}
