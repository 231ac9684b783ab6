use acl_core::EngineConfig;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::policy::RequestArgs;

#[derive(Parser)]
#[command(name = "acl")]
#[command(version, about = "Repository access-policy CLI", long_about = None)]
struct Cli {
    /// Engine configuration file (falls back to $ACL_CONFIG, then defaults)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Policy validation, evaluation and export
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },
    /// Child-query definitions
    Queries {
        #[command(subcommand)]
        command: QueriesCommands,
    },
}

#[derive(Subcommand)]
enum PolicyCommands {
    /// Validate a rule-set description
    Check {
        /// Path to the description (.toml, .yaml, .yml or .json)
        file: PathBuf,
    },
    /// Evaluate a request against a policy
    Eval {
        /// Path to the description
        file: PathBuf,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// Print the interchange tree as JSON
    Export {
        /// Path to the description
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum QueriesCommands {
    /// Validate a child-query file and list its queries
    Check {
        /// Path to the TOML query file
        file: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        })
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<EngineConfig> {
    Ok(match path {
        Some(path) => acl_utils::load_config(path)?,
        None => acl_utils::from_env_or_default()?,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Policy { command } => {
            let config = load_config(cli.config.as_ref())?;
            match command {
                PolicyCommands::Check { file } => commands::policy::check(&file, &config)?,
                PolicyCommands::Eval { file, request } => {
                    commands::policy::eval(&file, &request, &config)?;
                }
                PolicyCommands::Export { file } => commands::policy::export(&file, &config)?,
            }
        }
        Commands::Queries { command } => match command {
            QueriesCommands::Check { file } => commands::queries::check(&file)?,
        },
    }

    Ok(())
}
