use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use karmanator_config::ConfigLoader;
use karmanator_runtime::{Dispatcher, KarmaEngine, TOP_COUNT};
use karmanator_store::KarmaStore;

mod chat;
mod start;

/// ⚖️  Karmanator — IRC karma bot
#[derive(Parser)]
#[command(name = "karmanator", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to karmanator.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Connect to the configured IRC server and run the bot
    Start,
    /// Run the bot against this terminal (each line is a message in #local)
    Chat {
        /// Name to send messages as (defaults to $USER)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show karma for a name
    Show {
        name: String,
    },
    /// Show the top karma list
    Top {
        /// Rank every name instead of the top three
        #[arg(long)]
        all: bool,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub async fn run(self) -> karmanator_core::Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // Resolve log level: --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or(config.logging.level.as_str())
        };
        init_tracing(log_level, &config.logging.format);

        let engine = KarmaEngine::new(KarmaStore::open(&config.store.path));

        match self.command {
            Commands::Start => start::cmd_start(config, Dispatcher::new(engine)).await,
            Commands::Chat { name } => chat::cmd_chat(name, Dispatcher::new(engine)).await,
            Commands::Show { name } => Self::cmd_show(&engine, &name),
            Commands::Top { all } => Self::cmd_top(&engine, all),
            Commands::Config { json } => Self::cmd_config(&config_loader, json),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    fn cmd_show(engine: &KarmaEngine, name: &str) -> karmanator_core::Result<()> {
        println!("{}", engine.query_one(name)?);
        Ok(())
    }

    fn cmd_top(engine: &KarmaEngine, all: bool) -> karmanator_core::Result<()> {
        if all {
            let map = engine.store().load()?;
            if map.is_empty() {
                println!("No karma recorded yet.");
            }
            for (i, (name, net)) in karmanator_runtime::rank(&map).into_iter().enumerate() {
                println!("{:>4}. {} ({})", i + 1, name, net);
            }
            return Ok(());
        }

        match engine.query_top()? {
            Some(line) => println!("{line}"),
            None => println!("Not enough karma yet, need at least {TOP_COUNT} names."),
        }
        Ok(())
    }

    fn cmd_config(loader: &ConfigLoader, json: bool) -> karmanator_core::Result<()> {
        let config = loader.get().redacted();
        println!("# {}", loader.path().display());
        if json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config)
                    .map_err(|e| karmanator_core::KarmaError::Config(e.to_string()))?
            );
        }
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> karmanator_core::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "karmanator", &mut std::io::stdout());
        Ok(())
    }
}

fn init_tracing(log_level: &str, format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    match format {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(true)
            .init(),
        "compact" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .with_target(false)
            .init(),
        _ => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from(["karmanator", "show", "alice"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Show {
                name: "alice".into()
            }
        );
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["karmanator", "top", "--all", "-c", "/tmp/k.toml", "-v"])
            .unwrap();
        assert_eq!(cli.command, Commands::Top { all: true });
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/k.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["karmanator", "start", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_show_requires_name() {
        assert!(Cli::try_parse_from(["karmanator", "show"]).is_err());
    }
}
