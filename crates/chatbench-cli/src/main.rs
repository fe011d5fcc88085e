use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "chatbench")]
#[command(about = "chatbench - run mental-health prompts under demographic contexts against Gemini", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send every prompt under every context and write the results CSV
    Sweep {
        #[command(flatten)]
        source: SourceArgs,

        /// Results file (replaced on every run)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the prompts a sweep would use
    Prompts {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// List the context prefixes
    Contexts {
        /// Config file (default: ./chatbench.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct SourceArgs {
    /// Prompt source CSV (needs a `Statement` column by default)
    #[arg(short, long)]
    pub prompts: Option<PathBuf>,

    /// Config file (default: ./chatbench.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    chatbench_infrastructure::init_tracing(chatbench_infrastructure::logging::default_directive(
        cli.verbose,
        "info",
    ));

    match cli.command {
        Commands::Sweep { source, output } => commands::sweep::run(&source, output).await?,
        Commands::Prompts { source } => commands::prompts::list(&source)?,
        Commands::Contexts { config } => commands::contexts::list(config.as_deref())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sweep_accepts_path_overrides() {
        let cli = Cli::try_parse_from([
            "chatbench",
            "sweep",
            "--prompts",
            "in.csv",
            "--output",
            "out.csv",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Sweep { source, output } => {
                assert_eq!(source.prompts, Some(PathBuf::from("in.csv")));
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            _ => panic!("expected sweep"),
        }
    }
}
