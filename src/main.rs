//! CLI entry point for pnr-script
//!
//! Hosts one interpreter with an in-memory design context bound to `ctx`.
//!
//! # Usage
//!
//! Run scripts in order, sharing one namespace:
//! ```bash
//! pnr-script run scripts/place.rhai scripts/report.rhai
//! ```
//!
//! Evaluate a snippet and print the final design state:
//! ```bash
//! pnr-script --dump-context exec 'ctx.set_setting("seed", 1)'
//! ```
//!
//! Interactive console:
//! ```bash
//! pnr-script repl
//! ```
//!
//! # Exit codes
//!
//! - `0` everything ran
//! - `2` a script faulted
//! - `1` fatal configuration or host error

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use pnr_script::config::BridgeConfig;
use pnr_script::context::DesignContext;
use pnr_script::logging::{self, LoggingConfig};
use pnr_script::repl::{default_history_path, History, PlainConsole, Repl};
use pnr_script::scripting::{dump_fault, fatal, HostObject, Interpreter};

/// Exit status when a script faulted.
const SCRIPT_FAULT_EXIT_CODE: u8 = 2;

#[derive(Parser)]
#[command(name = "pnr-script")]
#[command(version, about = "Scripted place-and-route automation", long_about = None)]
struct Cli {
    /// Configuration file (default: ./pnr-script.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fabric family, overriding the configuration
    #[arg(long, global = true)]
    arch: Option<String>,

    /// Name of the design bound to `ctx`
    #[arg(long, global = true, default_value = "top")]
    design: String,

    /// Print the design context as JSON after the command
    #[arg(long, global = true)]
    dump_context: bool,

    /// More log output (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run script files in order in one shared namespace
    Run {
        /// Paths to .rhai files
        #[arg(required = true)]
        scripts: Vec<PathBuf>,
    },

    /// Run literal source code
    Exec {
        /// Rhai source
        code: String,
    },

    /// Start the interactive console
    Repl,

    /// List the namespaces and types visible to scripts
    Catalog,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => fatal::abort(format!("{err:#}")),
    };

    let log_config = LoggingConfig::from_bridge_config(&config)
        .map_err(anyhow::Error::msg)?
        .with_verbosity(cli.verbose);
    logging::init(log_config).map_err(anyhow::Error::msg)?;

    let program = std::env::args().next();
    let history = history_for(&config);
    let mut interp = Interpreter::new(config);
    interp.initialize(program.as_deref());

    let arch = interp
        .catalog()
        .map(|c| c.arch().to_string())
        .unwrap_or_default();
    let ctx = HostObject::new(DesignContext::new(cli.design.as_str(), arch));
    interp.inject_global("ctx", &ctx);

    let mut faulted = false;
    match &cli.command {
        Commands::Run { scripts } => {
            for script in scripts {
                tracing::info!(script = %script.display(), "running script");
                if let Err(fault) = interp.execute_file(script) {
                    dump_fault(&fault);
                    faulted = true;
                    break;
                }
            }
        }
        Commands::Exec { code } => match interp.execute_source(code) {
            Ok(value) if value.is_unit() => {}
            Ok(value) => println!("{}", interp.describe(&value)),
            Err(fault) => {
                dump_fault(&fault);
                faulted = true;
            }
        },
        Commands::Repl => {
            Repl::new(&mut interp, PlainConsole::stdio(), history)
                .run()
                .context("console I/O failed")?;
        }
        Commands::Catalog => {
            if let Some(catalog) = interp.catalog() {
                for (namespace, exports) in catalog.namespaces() {
                    println!("{namespace}");
                    for name in exports {
                        println!("    {name}");
                    }
                }
            }
        }
    }

    if cli.dump_context {
        let snapshot = ctx.read().snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    interp.teardown();

    Ok(if faulted {
        ExitCode::from(SCRIPT_FAULT_EXIT_CODE)
    } else {
        ExitCode::SUCCESS
    })
}

fn load_config(cli: &Cli) -> Result<BridgeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            anyhow::ensure!(path.is_file(), "config file not found: {}", path.display());
            BridgeConfig::load_from(path)
                .with_context(|| format!("loading {}", path.display()))?
        }
        None => BridgeConfig::load()?,
    };
    if let Some(arch) = &cli.arch {
        config.arch = arch.clone();
        config.validate()?;
    }
    Ok(config)
}

fn history_for(config: &BridgeConfig) -> History {
    let length = config.repl.history_length;
    match config.repl.history_file.clone().or_else(default_history_path) {
        Some(path) => History::with_file(length, path),
        None => History::new(length),
    }
}
