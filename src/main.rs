// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use rtlsub::app_config::{self, Config};
use rtlsub::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for rtlsub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// rtlsub - translate a folder of subtitles into a right-to-left language
#[derive(Parser, Debug)]
#[command(name = "rtlsub")]
#[command(version)]
#[command(about = "Translate VTT/SRT subtitle folders into a right-to-left language")]
#[command(long_about = "rtlsub translates every .vtt and .srt file of a folder through an OpenAI-compatible API.

Sources are kept as NAME_en.ext and translations are written as NAME.ext with
right-to-left styling. Outputs of older runs named NAME_ar.ext are renamed to the
current scheme. Running twice is safe: translated files are detected and skipped.

EXAMPLES:
    rtlsub ~/courses/rust                 # Translate a folder
    rtlsub                                # Prompt for the folder
    rtlsub -t fa --log-level debug ./subs # Translate into Persian with debug logging
    rtlsub completions bash > rtlsub.bash # Generate bash completions

CONFIGURATION:
    Settings are read from conf.json by default (see --config); defaults are used
    when the file does not exist. The API key is read from the API_KEY environment
    variable, which may also be set in a .env file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Folder containing subtitle files (prompted for when omitted)
    #[arg(value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: PathBuf,

    /// Model identifier to use
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'ar', 'fa', 'he')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger);
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌"),
            Level::Warn => ("\x1B[1;33m", "🚧"),
            Level::Info => ("\x1B[1;32m", ""),
            Level::Debug => ("\x1B[1;36m", "🔍"),
            Level::Trace => ("\x1B[1;35m", "📋"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::decoration_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Ask for the folder on stdin, stripping surrounding quotes
fn prompt_for_directory() -> Result<PathBuf> {
    print!("📁 Enter folder path: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read folder path")?;

    let cleaned = line.trim().trim_matches(|c| c == '"' || c == '\'');
    if cleaned.is_empty() {
        return Err(anyhow!("No folder path given"));
    }
    Ok(PathBuf::from(cleaned))
}

/// Load configuration and apply environment and command line overrides
fn load_config(options: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_default(&options.config)?;
    config.apply_env();

    if let Some(model) = &options.model {
        config.translation.provider.model = model.clone();
    }
    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "rtlsub", &mut std::io::stdout());
        return Ok(());
    }

    // Credentials may live in a .env file next to the working directory
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(anyhow!("Failed to load .env file: {}", e));
        }
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    let input_dir = match &cli.input_dir {
        Some(dir) => dir.clone(),
        None => prompt_for_directory()?,
    };
    if !input_dir.is_dir() {
        error!("Invalid directory: {:?}", input_dir);
        return Err(anyhow!("Invalid directory: {:?}", input_dir));
    }

    info!(
        "Translating {:?} from {} to {} with {}",
        input_dir, config.source_language, config.target_language, config.translation.provider.model
    );

    let controller = Controller::with_config(config)?;
    if let Err(e) = controller.check_provider().await {
        error!("🛑 Stopped: {}", e);
        return Err(e.into());
    }

    match controller.run_folder(&input_dir).await {
        Ok(summary) => {
            if summary.is_noop() {
                info!("🎉 Nothing to do.");
            } else {
                info!("🎉 All operations completed successfully.");
            }
            Ok(())
        }
        Err(e) => {
            error!("🛑 Stopped: {}", e);
            Err(e.into())
        }
    }
}
