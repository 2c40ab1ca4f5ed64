mod colors;
mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use commands::SelectArgs;

#[derive(Parser)]
#[command(name = "gosdk")]
#[command(author, version, about = "Find or download the Go SDK a build needs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the SDK that would be used
    Discover {
        #[command(flatten)]
        select: SelectArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print shell exports (GOROOT, PATH) for the SDK
    Env {
        #[command(flatten)]
        select: SelectArgs,

        /// Shell syntax: bash, zsh or fish (detected from $SHELL by default)
        #[arg(long)]
        shell: Option<String>,
    },

    /// Run a command with the SDK's GOROOT and PATH
    Exec {
        #[command(flatten)]
        select: SelectArgs,

        /// Command and arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },

    /// Print the download URL for a version and platform
    Url {
        /// Go version (defaults to GO_VERSION or the built-in default)
        #[arg(long = "go-version", value_name = "VERSION")]
        go_version: Option<String>,

        /// Target OS (e.g. linux, darwin, windows)
        #[arg(long)]
        os: Option<String>,

        /// Target architecture (e.g. amd64, arm64)
        #[arg(long)]
        arch: Option<String>,
    },

    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
    colors::init_colors();

    match cli.command {
        Commands::Discover { select, json } => {
            commands::discover(&select, json).await?;
        }
        Commands::Env { select, shell } => {
            commands::shellenv(&select, shell.as_deref()).await?;
        }
        Commands::Exec { select, command } => {
            let code = commands::exec(&select, &command).await?;
            std::process::exit(code);
        }
        Commands::Url {
            go_version,
            os,
            arch,
        } => {
            commands::url(go_version.as_deref(), os.as_deref(), arch.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "gosdk", &mut std::io::stdout());
        }
    }

    Ok(())
}
