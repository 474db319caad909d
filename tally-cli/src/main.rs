use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use std::io::{IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use tally_ingest::{StatementInput, parse_statements};

mod config;
mod output;
mod state;

use config::{OutputFormat, OutputSection};

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Convert Apple Card PDF statements into transaction tables"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: ~/.tally/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse statements and print their transactions sorted by date
    Convert {
        /// Statement PDFs; reads one statement from stdin when omitted
        files: Vec<PathBuf>,

        /// Output format (overrides config)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Omit the CSV header line
        #[arg(long)]
        no_header: bool,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file (never overwrites)
    Init,

    /// Print the effective configuration
    Show,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Convert {
            files,
            format,
            output,
            no_header,
        } => {
            let cfg = config::load_config(cli.config.as_deref())?;
            let mut opts = cfg.output;
            if let Some(format) = format {
                opts.format = format;
            }
            if no_header {
                opts.header = false;
            }
            convert(files, output.as_deref(), &opts).await?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => {
                config::init_config(cli.config.as_deref())?;
            }
            ConfigCommand::Show => {
                let cfg = config::load_config(cli.config.as_deref())?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

async fn convert(files: Vec<PathBuf>, output: Option<&Path>, opts: &OutputSection) -> Result<()> {
    let input = read_input(&files)?;
    let txns = parse_statements(input)
        .await
        .context("parsing statements")?;
    log::info!("{} transactions", txns.len());

    // Render fully before writing so a failure leaves no partial output.
    let rendered = output::render(&txns, opts)?;
    match output {
        Some(path) => std::fs::write(path, &rendered)
            .with_context(|| format!("write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&rendered)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn read_input(files: &[PathBuf]) -> Result<StatementInput> {
    if files.is_empty() {
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            bail!("no statement given (pass PDF paths or pipe one on stdin)");
        }
        let mut bytes = Vec::new();
        stdin.read_to_end(&mut bytes).context("read stdin")?;
        return Ok(StatementInput::Single(bytes));
    }

    let mut payloads = Vec::with_capacity(files.len());
    for path in files {
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        payloads.push(bytes);
    }
    Ok(StatementInput::Many(payloads))
}
