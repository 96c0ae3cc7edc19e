use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{stderr, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::Level;

use smart_preview::commands;
use smart_preview::scaffold::build_token;
use smart_preview::{Config, OutputHandler, PreviewError, ViteBundler};

#[derive(Parser)]
#[command(name = "smart-preview")]
#[command(about = "Generate AI mock data and isolated preview pages for React components", long_about = None)]
struct Cli {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.smart-preview/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask the model for mock props, wrappers and network mocks
    Analyze {
        /// Component source files
        files: Vec<String>,
    },
    /// Scaffold previews from the analysis artifact and run the bundler
    Build,
    /// Analyze one component, then build
    Preview {
        /// Component source file
        file: String,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(stderr)
        .init();
}

fn project_root(explicit: Option<&Path>) -> Result<PathBuf, PreviewError> {
    let root = match explicit {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().map_err(|e| PreviewError::io(e, "."))?,
    };
    root.canonicalize().map_err(|e| PreviewError::io(e, root))
}

async fn run(cli: Cli, output: &OutputHandler) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let root = project_root(cli.project.as_deref())?;
    let show_spinner = stderr().is_terminal();

    match cli.command {
        Command::Analyze { files } => {
            commands::require_files(&files)?;
            let client = commands::create_client(&config.ai)?;
            let report = commands::analyze(&config, &root, &files, &client, show_spinner).await?;
            output.print_analysis_report(&report, &commands::artifact_path(&config, &root));
        }
        Command::Build => {
            let bundler = ViteBundler::new(&config.bundler);
            let built = commands::build(&config, &root, &bundler, &build_token())?;
            output.print_previews(&built.previews);
            output.print_success("Build complete!");
        }
        Command::Preview { file } => {
            println!("🚀 Starting AI Preview for: {file}");
            let client = commands::create_client(&config.ai)?;

            output.print_step("STEP 1: ANALYZING");
            let files = vec![file];
            let report = commands::analyze(&config, &root, &files, &client, show_spinner).await?;
            output.print_analysis_report(&report, &commands::artifact_path(&config, &root));

            output.print_step("STEP 2: BUILDING");
            let bundler = ViteBundler::new(&config.bundler);
            let built = commands::build(&config, &root, &bundler, &build_token())?;
            output.print_previews(&built.previews);

            output.print_success("DONE!");
            output.print_hint(&format!(
                "Run `{}` to see the result.",
                smart_preview::Bundler::preview_command(&bundler, &built.config_path)
            ));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let output = OutputHandler::new().with_verbose(cli.verbose);

    if let Err(err) = run(cli, &output).await {
        output.print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}
