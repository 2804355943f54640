use clap::{Parser, Subcommand};
use modroute::commands::{
    run_edit, run_extension_clear, run_extension_disable, run_extension_enable,
    run_extension_info, run_extension_list, run_extension_styles, run_resolve, run_routes,
};
use modroute::logging::init_logging;
use modroute_common::config::ModrouteConfig;
use starbase::{App, AppResult, AppSession};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// modroute CLI - extension asset routes for asset:// URLs
#[derive(Parser)]
#[command(name = "modroute")]
#[command(about = "Inspect and manage extension asset routes", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to modroute.toml (discovered from the current directory by default)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Subcommand)]
enum Commands {
    /// Bake and print the route table
    Routes {
        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve an asset:// URL through the route table
    Resolve {
        /// Virtual URL to resolve
        url: String,
    },
    /// Manage installed extensions
    Extension {
        #[command(subcommand)]
        action: ExtensionAction,
    },
    /// Apply enabled extensions' edits to a JSON archive
    Edit {
        /// Archive JSON file
        #[arg(short, long)]
        input: PathBuf,
        /// Output path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Subcommand)]
enum ExtensionAction {
    /// List installed extensions and the enabled order
    List,
    /// Enable an installed extension
    Enable {
        /// Extension id (directory or file name)
        id: String,
        /// Position in the enabled list, 0 is highest (defaults to last)
        #[arg(short, long)]
        priority: Option<usize>,
    },
    /// Disable an extension
    Disable {
        /// Extension id
        id: String,
    },
    /// Disable every extension
    Clear,
    /// Show an extension's descriptor
    Info {
        /// Extension id
        id: String,
    },
    /// List stylesheets contributed by enabled extensions
    Styles,
}

/// Application session for the modroute CLI
#[derive(Clone)]
struct ModrouteSession {
    command: Commands,
    config: ModrouteConfig,
}

#[async_trait::async_trait]
impl AppSession for ModrouteSession {
    async fn execute(&mut self) -> AppResult {
        let config = &self.config;
        match &self.command {
            Commands::Routes { json } => run_routes(config, *json),
            Commands::Resolve { url } => run_resolve(config, url),
            Commands::Extension { action } => match action {
                ExtensionAction::List => run_extension_list(config),
                ExtensionAction::Enable { id, priority } => {
                    run_extension_enable(config, id.clone(), *priority)
                }
                ExtensionAction::Disable { id } => run_extension_disable(config, id.clone()),
                ExtensionAction::Clear => run_extension_clear(config),
                ExtensionAction::Info { id } => run_extension_info(config, id.clone()),
                ExtensionAction::Styles => run_extension_styles(config),
            },
            Commands::Edit { input, output } => run_edit(config, input.clone(), output.clone()),
        }
    }
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<ModrouteConfig> {
    match explicit {
        Some(path) => ModrouteConfig::load(path),
        None => ModrouteConfig::discover_or_default(&std::env::current_dir()?),
    }
}

#[tokio::main]
async fn main() -> starbase::MainResult {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(ExitCode::from(1));
        }
    };
    let _guard = init_logging(&config.logging);

    let session = ModrouteSession {
        command: cli.command,
        config,
    };

    // Initialize and run starbase App
    let exit_code = App::default()
        .run(
            session,
            |mut session| async move { session.execute().await },
        )
        .await?;

    Ok(ExitCode::from(exit_code))
}
