//! prompt-stream - interactive demo of the prompt writer
//!
//! Wraps standard output in a `PromptWriter` and echoes every line read from
//! standard input. After each line the status icon and prompt rotate, so the
//! redraw below the last printed line is easy to see.
//!
//! # Quick Start
//!
//! ```text
//! prompt-stream                 # Prompt and icons from config.toml
//! prompt-stream -p "λ " -i "⚡"  # Custom prompt and icon
//! prompt-stream --no-cycle      # Keep the initial prompt and icon
//! ```

use std::env;
use std::io::{self, BufRead, Write};

use crossterm::tty::IsTty;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use prompt_stream::config::{Config as StreamConfig, ConfigError};
use prompt_stream::{PromptWriter, Rotation};

/// Command line configuration
#[derive(Debug, Default)]
struct Config {
    /// Prompt override
    prompt: Option<String>,
    /// Status icon override
    icon: Option<String>,
    /// Start without a status icon
    no_icon: bool,
    /// Keep the initial prompt and icon
    no_cycle: bool,
    /// Decorate even when stdout is not a terminal
    force: bool,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the log filter
const LOG_ENV: &str = "PROMPT_STREAM_LOG";

fn print_version() {
    eprintln!("prompt-stream {}", VERSION);
}

fn print_help() {
    eprintln!("prompt-stream {} - Keep a prompt below the last printed line", VERSION);
    eprintln!();
    eprintln!("Usage: prompt-stream [OPTIONS]");
    eprintln!();
    eprintln!("Prompt options:");
    eprintln!("  -p, --prompt <TEXT>   Initial prompt (default from config.toml, \"$ \")");
    eprintln!("  -i, --icon <TEXT>     Initial status icon");
    eprintln!("      --no-icon         Start without a status icon");
    eprintln!("      --no-cycle        Do not rotate prompts and icons per line");
    eprintln!();
    eprintln!("Other options:");
    eprintln!("  -f, --force           Show the prompt even when stdout is not a terminal");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.prompt-stream/config.toml");
    eprintln!("Log file:      ~/.prompt-stream/prompt-stream.log ({} sets the filter)", LOG_ENV);
}

fn parse_args() -> Result<Config, String> {
    parse_args_from(env::args().skip(1))
}

fn parse_args_from(args: impl IntoIterator<Item = String>) -> Result<Config, String> {
    let mut config = Config::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-p" | "--prompt" => {
                let prompt = args.next().ok_or("Missing prompt argument")?;
                config.prompt = Some(prompt);
            }
            "-i" | "--icon" => {
                let icon = args.next().ok_or("Missing icon argument")?;
                config.icon = Some(icon);
            }
            "--no-icon" => {
                config.no_icon = true;
            }
            "--no-cycle" => {
                config.no_cycle = true;
            }
            "-f" | "--force" => {
                config.force = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
    }

    Ok(config)
}

/// Log to `~/.prompt-stream/prompt-stream.log`; stdout belongs to the prompt writer
fn init_logging(default_level: &str) {
    let Some(log_path) = StreamConfig::log_path() else {
        return;
    };

    // Create log directory if needed
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    // Open log file (append mode)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(default_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let config = match parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    // Config file first: it picks the default log level
    let (stream_config, config_error) = match StreamConfig::load() {
        Ok(c) => (c, None),
        Err(e) => (StreamConfig::default(), Some(e)),
    };

    init_logging(&stream_config.log_level);
    info!("prompt-stream {} starting...", VERSION);
    if let Some(e) = config_error {
        report_config_error(&e);
    }

    run(config, stream_config)
}

fn report_config_error(e: &ConfigError) {
    warn!("{}; using defaults", e);
    eprintln!("Warning: {}; using defaults", e);
}

fn run(config: Config, stream_config: StreamConfig) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let decorate = config.force || stdout.is_tty();
    info!("Prompt decoration: {}", decorate);

    let writer = PromptWriter::new(stdout);
    if decorate {
        let prompt = config.prompt.as_deref().unwrap_or(&stream_config.prompt);
        let icon = if config.no_icon {
            None
        } else {
            config.icon.as_deref().or(stream_config.initial_icon())
        };
        writer.set_prompt(Some(prompt)).set_status_icon(icon);
        info!("Prompt: {:?}, icon: {:?}", prompt, icon);
    }

    let mut prompts = Rotation::new(stream_config.prompts.iter().map(String::as_str));
    let mut icons = Rotation::new(stream_config.status_icons.iter().map(String::as_str));
    let cycle = decorate && !config.no_cycle;

    let mut out = &writer;
    writeln!(out, "Input multiple lines of text and see how prompt and icon changes")?;
    writeln!(out, "Enter \"{}\" to exit", stream_config.quit_command)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        if stream_config.is_quit(&line) {
            info!("Quit command received");
            break;
        }

        if cycle {
            if let Some(icon) = icons.advance() {
                writer.set_status_icon(Some(*icon));
            }
            if let Some(prompt) = prompts.advance() {
                writer.set_prompt(Some(*prompt));
            }
            debug!("Rotated to icon {:?}, prompt {:?}", writer.status_icon(), writer.prompt());
        }

        writeln!(out, "Text entered: {}", line)?;
    }

    writer.close()?;
    info!("Input closed");
    Ok(())
}
