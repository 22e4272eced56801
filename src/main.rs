use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use localiser::core::{localise_document, LocaliserOptions};
use localiser::env::{core as env_core, generate_env_docs, EnvVar};
use localiser::translation::{ConfigManager, LocaliserConfig, LocaliserResult, LookupTable, Strategy};

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Translate the text of an HTML document in place using a static lookup table
#[derive(Parser, Debug)]
#[command(name = "localiser", version, about)]
struct Cli {
    /// HTML file to localise, or "-" to read from stdin
    #[arg(value_name = "INPUT", required_unless_present_any = ["env_docs", "init_config"])]
    input: Option<String>,

    /// Lookup table (JSON, or TOML by extension)
    #[arg(short, long, value_name = "PATH")]
    table: Option<PathBuf>,

    /// Locale to translate into
    #[arg(short, long)]
    locale: Option<String>,

    /// Translation strategy: whole-text, per-word, per-character
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Force a locale regardless of --locale (repeatable; the table's first listed locale wins)
    #[arg(long = "override", value_name = "LOCALE")]
    overrides: Vec<String>,

    /// Class token marking subtrees that must not be translated
    #[arg(short, long, value_name = "CLASS")]
    boundary_class: Option<String>,

    /// Input and output charset (defaults to the document's declared charset)
    #[arg(short, long)]
    encoding: Option<String>,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Configuration file (defaults to the first of localiser.toml, .localiser.toml, ~/.config/localiser/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Set <html lang> to the locale used
    #[arg(long)]
    set_lang: bool,

    /// Print the supported environment variables and exit
    #[arg(long)]
    env_docs: bool,

    /// Write an example configuration file and exit
    #[arg(long, value_name = "PATH")]
    init_config: Option<PathBuf>,
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn main() {
    let cli = Cli::parse();
    let filter_handle = init_tracing();

    if let Err(e) = run(cli, &filter_handle) {
        print_error_message(&e.to_string());
        process::exit(1);
    }
}

/// 先按环境变量安装日志，配置文件加载后再用最终的 `log_level` 替换过滤器
fn init_tracing() -> FilterHandle {
    let level = env_core::LogLevel::get_or_default("info".to_string());
    let (filter, handle) = reload::Layer::new(level_filter(&level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(!env_core::NoColor::get_or_default(false))
                .with_writer(io::stderr),
        )
        .init();

    handle
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("localiser={}", level)).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn run(cli: Cli, filter_handle: &FilterHandle) -> LocaliserResult<()> {
    if cli.env_docs {
        print!("{}", generate_env_docs());
        return Ok(());
    }

    if let Some(path) = &cli.init_config {
        ConfigManager::generate_example_config(path)?;
        tracing::info!("已生成示例配置: {}", path.display());
        return Ok(());
    }

    let config = load_config(&cli)?;

    if let Err(e) = filter_handle.reload(level_filter(&config.log_level)) {
        tracing::warn!("无法应用日志级别 {}: {}", config.log_level, e);
    }

    let lookup_table = match &cli.table {
        Some(path) => LookupTable::from_path(path)?,
        None => config.load_lookup_table()?,
    };

    let mut options = LocaliserOptions::from(&config);
    options.encoding = cli.encoding.clone();
    options.set_lang = cli.set_lang;

    let input_data = read_input(cli.input.as_deref().unwrap_or("-"))?;
    let (output, stats) = localise_document(&input_data, &lookup_table, &options)?;

    tracing::debug!("{:?}", stats);

    match &cli.output {
        Some(path) => fs::write(path, output)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&output)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// 配置文件 → 环境变量 → 命令行参数，后者覆盖前者
fn load_config(cli: &Cli) -> LocaliserResult<LocaliserConfig> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };

    let mut config = manager.into_config();

    if let Some(locale) = &cli.locale {
        config.locale = locale.clone();
    }
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if let Some(boundary_class) = &cli.boundary_class {
        config.boundary_class = boundary_class.clone();
    }
    if !cli.overrides.is_empty() {
        config.overrides = cli.overrides.clone();
    }

    config.validate()?;
    Ok(config)
}

fn read_input(target: &str) -> LocaliserResult<Vec<u8>> {
    let mut data = Vec::new();

    if target == "-" {
        io::stdin().lock().read_to_end(&mut data)?;
    } else {
        data = fs::read(target)
            .map_err(|e| localiser::LocaliserError::Io(format!("无法读取 {}: {}", target, e)))?;
    }

    Ok(data)
}

fn print_error_message(msg: &str) {
    if env_core::NoColor::get_or_default(false) {
        eprintln!("{msg}");
    } else {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    }
}
