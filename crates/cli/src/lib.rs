use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pipemap_core::csv_export::{export_store_csv, CsvExportConfig};
use pipemap_core::{
    format_distance, ActionScript, AnnotationStore, GeoCoordinate, StoreAction, StoreConfig,
};
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "pipemap-cli")]
#[command(about = "Pipemap CLI")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the geodesic distance between two "lat,lon" coordinates.
    Distance {
        #[arg(value_name = "FROM", allow_hyphen_values = true)]
        from: String,
        #[arg(value_name = "TO", allow_hyphen_values = true)]
        to: String,
        /// Print raw meters instead of a formatted label.
        #[arg(long)]
        meters: bool,
    },
    /// Apply a JSON action script to a fresh store and print the result.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Abort on the first rejected action.
        #[arg(long)]
        strict: bool,
        /// JSON store config; defaults come from PIPEMAP_* variables otherwise.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Distance { from, to, meters } => run_distance(&from, &to, meters),
        Commands::Replay { script, format, strict, config } => {
            run_replay(&script, format, strict, config.as_deref())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_distance(from: &str, to: &str, meters: bool) -> Result<()> {
    let from: GeoCoordinate = from.parse().context("invalid FROM coordinate")?;
    let to: GeoCoordinate = to.parse().context("invalid TO coordinate")?;

    let distance = from.distance_to(&to);
    if meters {
        println!("{distance:.3}");
    } else {
        println!("{}", format_distance(distance));
    }

    Ok(())
}

fn run_replay(
    script_path: &Path,
    format: OutputFormat,
    strict: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let actions = read_script(script_path)?;
    let config = load_config(config_path)?;

    let mut store = AnnotationStore::with_config(config);
    let mut script = ActionScript::new();
    let mut rejected = 0usize;

    for (index, action) in actions.into_iter().enumerate() {
        let step = index + 1;
        let name = action.name();
        match script.apply(&mut store, action) {
            Ok(outcome) => log::debug!("step {step} ({name}): {outcome:?}"),
            Err(error) if strict => {
                return Err(error).with_context(|| format!("step {step} ({name}) failed"));
            }
            Err(_) => rejected += 1,
        }
    }

    if rejected > 0 {
        log::warn!("{rejected} action(s) rejected and skipped");
    }

    write_output(&store, format)
}

fn read_script(path: &Path) -> Result<Vec<StoreAction>> {
    if !path.is_file() {
        anyhow::bail!("script does not exist: {}", path.display());
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse action script {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<StoreConfig> {
    match path {
        Some(path) => StoreConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => StoreConfig::from_env().context("invalid PIPEMAP_* environment configuration"),
    }
}

fn write_output(store: &AnnotationStore, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&store.snapshot())?;
            writeln!(out, "{json}")?;
        }
        OutputFormat::Csv => {
            export_store_csv(&mut out, store, &CsvExportConfig::default())
                .context("failed to write CSV output")?;
        }
    }

    Ok(())
}
