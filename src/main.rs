// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pinyin_annotator::annotation::ActionKind;
use pinyin_annotator::app_config::{Config, LogLevel};
use pinyin_annotator::preferences::{
    JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore, ReadingPosition, ToneType,
};
use pinyin_annotator::{
    ActionMessage, Controller, Document, PartialPreferences, ReadingTableConverter, StatusResponse,
    UserPreferences,
};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for ToneType to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliToneType {
    Symbol,
    Num,
    None,
}

impl From<CliToneType> for ToneType {
    fn from(cli_tone: CliToneType) -> Self {
        match cli_tone {
            CliToneType::Symbol => ToneType::Symbol,
            CliToneType::Num => ToneType::Num,
            CliToneType::None => ToneType::None,
        }
    }
}

/// CLI Wrapper for ReadingPosition to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliReadingPosition {
    Over,
    Under,
}

impl From<CliReadingPosition> for ReadingPosition {
    fn from(cli_position: CliReadingPosition) -> Self {
        match cli_position {
            CliReadingPosition::Over => ReadingPosition::Over,
            CliReadingPosition::Under => ReadingPosition::Under,
        }
    }
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Preference file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE")]
    prefs: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "pinyin-annotator.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct DocumentArgs {
    /// HTML fragment loaded into the document body
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// JSON object mapping each character to its tone-marked reading
    #[arg(short, long, value_name = "FILE")]
    readings: Option<PathBuf>,

    /// Selector of the element to annotate (overrides the configuration)
    #[arg(short, long)]
    selector: Option<String>,

    /// Page URL, used to pick site-specific styles
    #[arg(long)]
    url: Option<String>,

    /// Write the resulting body markup here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct SetArgs {
    /// Tone representation
    #[arg(long, value_enum)]
    tone: Option<CliToneType>,

    /// Keep annotating content added after an annotate
    #[arg(long)]
    monitor: Option<bool>,

    /// Where readings are drawn
    #[arg(long, value_enum)]
    position: Option<CliReadingPosition>,

    /// Annotate automatically when a document is loaded
    #[arg(long)]
    auto_annotate: Option<bool>,

    /// Show dictionary links on annotated characters
    #[arg(long)]
    dict_links: Option<bool>,

    /// Ignored tag names (repeatable; empty list restores the defaults)
    #[arg(long = "ignore", value_name = "TAG")]
    ignored_tags: Option<Vec<String>>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Annotate the Chinese text of an HTML fragment
    Annotate(DocumentArgs),

    /// Remove annotations from an HTML fragment
    Clear(DocumentArgs),

    /// Annotate when not annotated, clear otherwise
    Toggle(DocumentArgs),

    /// Print the effective preferences
    Check(CommonArgs),

    /// Update stored preferences
    Set(SetArgs),

    /// Generate shell completions for pinyin-annotator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// pinyin-annotator - ruby pinyin annotations for Chinese text
#[derive(Parser, Debug)]
#[command(name = "pinyin-annotator")]
#[command(version)]
#[command(about = "Annotate Chinese text with pinyin readings")]
#[command(long_about = "Annotates the Chinese characters of an HTML fragment with ruby pinyin readings, and removes them again.

EXAMPLES:
    pinyin-annotator annotate page.html -r readings.json          # Annotate and print the body
    pinyin-annotator annotate page.html -r readings.json -o out.html
    pinyin-annotator clear out.html                               # Restore the original text
    pinyin-annotator toggle page.html -s '#article'               # Only touch one element
    pinyin-annotator set --tone num --position under              # Update preferences
    pinyin-annotator check                                        # Show preferences
    pinyin-annotator completions bash > pinyin-annotator.bash     # Generate bash completions")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logger starts at info; the level is adjusted once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Annotate(args) => run_document_action(args, ActionKind::Annotate).await,
        Commands::Clear(args) => run_document_action(args, ActionKind::Clear).await,
        Commands::Toggle(args) => run_document_action(args, ActionKind::Toggle).await,
        Commands::Check(common) => run_check(common).await,
        Commands::Set(args) => run_set(args).await,
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pinyin-annotator", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the configuration file when present, apply CLI overrides and set the log level
fn load_config(common: &CommonArgs) -> Result<Config> {
    let config_path = Path::new(&common.config_path);
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        debug!("Config file not found at '{}', using defaults", common.config_path);
        Config::default()
    };

    if let Some(prefs) = &common.prefs {
        config.preferences_path = Some(prefs.clone());
    }
    if let Some(log_level) = &common.log_level {
        config.log_level = log_level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());
    Ok(config)
}

fn open_store(config: &Config) -> Arc<dyn PreferenceStore> {
    match config.resolved_preferences_path() {
        Some(path) => {
            debug!("Using preference file {:?}", path);
            Arc::new(JsonFilePreferenceStore::new(path))
        }
        None => {
            warn!("No config directory available, preferences will not be saved");
            Arc::new(MemoryPreferenceStore::new())
        }
    }
}

/// Send one message through a controller over `doc` and wait for the response
async fn send_once(
    doc: Document,
    converter: ReadingTableConverter,
    config: Config,
    message: ActionMessage,
) -> Result<(Document, StatusResponse)> {
    let store = open_store(&config);
    let shared = doc.into_shared();
    let (controller, handle) = Controller::new(shared.clone(), Arc::new(converter), store, config);

    let task = tokio::spawn(controller.run());
    let response = handle.send(message).await?;
    drop(handle);
    task.await.context("Controller task failed")?;

    let doc = Arc::try_unwrap(shared)
        .map_err(|_| anyhow!("Document is still shared after the controller stopped"))?
        .into_inner();
    Ok((doc, response))
}

/// Whether `markup` is a whole page rather than body content
fn is_full_page(markup: &str) -> bool {
    let start: String = markup.trim_start().chars().take(9).collect::<String>().to_ascii_lowercase();
    start.starts_with("<!doctype") || start.starts_with("<html")
}

async fn run_document_action(args: DocumentArgs, action: ActionKind) -> Result<()> {
    let mut config = load_config(&args.common)?;
    if let Some(selector) = &args.selector {
        config.engine.observation_selector = selector.clone();
    }
    if let Some(url) = &args.url {
        config = config.for_url(url)?;
    }
    config.validate().context("Configuration validation failed")?;

    let markup = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input file: {:?}", args.input))?;
    let full_page = is_full_page(&markup);
    let doc = if full_page {
        Document::from_html(&markup)
    } else {
        Document::from_body_markup(&markup)
    };

    let converter = match &args.readings {
        Some(path) => ReadingTableConverter::from_json_file(path)?,
        None => {
            warn!("No readings file given, characters will be left without readings");
            ReadingTableConverter::default()
        }
    };

    let (doc, response) = send_once(doc, converter, config, ActionMessage::new(action)).await?;
    let body = if full_page {
        format!("<!DOCTYPE html>\n{}", doc.outer_html(doc.root()))
    } else {
        doc.inner_html(doc.body())
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &body).with_context(|| format!("Failed to write output file: {:?}", path))?;
            info!("Wrote {:?}", path);
        }
        None => println!("{}", body),
    }
    info!("Status: {}", response.status);
    Ok(())
}

async fn run_check(common: CommonArgs) -> Result<()> {
    let config = load_config(&common)?;
    let store = open_store(&config);
    let prefs = UserPreferences::load(store.as_ref()).await;
    println!("{}", serde_json::to_string_pretty(&prefs)?);
    Ok(())
}

async fn run_set(args: SetArgs) -> Result<()> {
    let config = load_config(&args.common)?;
    let partial = PartialPreferences {
        tone_type: args.tone.map(Into::into),
        monitor_enabled: args.monitor,
        reading_position: args.position.map(Into::into),
        auto_annotate_on_load: args.auto_annotate,
        ignored_tag_names: args.ignored_tags,
        dictionary_link_enabled: args.dict_links,
        ..Default::default()
    };
    if partial.is_empty() {
        return Err(anyhow!("Nothing to set; pass at least one option"));
    }

    let (_, response) = send_once(
        Document::new(),
        ReadingTableConverter::default(),
        config,
        ActionMessage::update_options(partial),
    )
    .await?;
    debug!("Preferences updated, status {}", response.status);
    info!("Preferences updated");
    Ok(())
}
