use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};

use pylon_core::settings::MapperConfig;
use pylon_provider_storage::{ResourceKind, find_kind, resource_kinds};

#[derive(Parser)]
#[command(name = "pylon")]
#[command(about = "Inspect how storage cluster payloads map to configuration state", long_about = None)]
struct Cli {
    /// Mapper settings (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported resource kinds
    Resources,
    /// Project an API payload into state and print it
    Read {
        /// Resource kind (e.g. nfs_export)
        kind: String,
        /// Path to a JSON payload as returned by the cluster
        payload: PathBuf,
    },
    /// Check that a payload survives a trip through state unchanged
    Audit {
        /// Resource kind (e.g. nfs_export)
        kind: String,
        /// Path to a JSON payload as returned by the cluster
        payload: PathBuf,
    },
    /// Show the wire fields of a resource kind and the state types they map to
    Schema {
        /// Resource kind (e.g. nfs_export)
        kind: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Resources => run_resources(),
        Commands::Read { kind, payload } => run_read(&kind, &payload, &config),
        Commands::Audit { kind, payload } => run_audit(&kind, &payload, &config),
        Commands::Schema { kind } => run_schema(&kind),
    });

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<MapperConfig, String> {
    let Some(path) = path else {
        return Ok(MapperConfig::default());
    };
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let config = MapperConfig::from_json(&content)
        .map_err(|e| format!("Invalid mapper config {}: {}", path.display(), e))?;
    log::debug!("loaded mapper config from {}", path.display());
    Ok(config)
}

fn load_payload(path: &Path) -> Result<serde_json::Value, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e))
}

fn get_kind(name: &str) -> Result<Box<dyn ResourceKind>, String> {
    find_kind(name).ok_or_else(|| {
        let known: Vec<&str> = resource_kinds().iter().map(|k| k.name()).collect();
        format!(
            "Unknown resource kind '{}' (expected one of: {})",
            name,
            known.join(", ")
        )
    })
}

fn run_resources() -> Result<(), String> {
    for kind in resource_kinds() {
        println!("  • {} {}", kind.name().cyan().bold(), kind.description());
    }
    Ok(())
}

fn run_read(kind: &str, payload: &Path, config: &MapperConfig) -> Result<(), String> {
    let kind = get_kind(kind)?;
    let payload = load_payload(payload)?;
    let state = kind
        .read_payload(&payload, config)
        .map_err(|e| e.to_string())?;
    println!("{}", to_pretty(&state)?);
    Ok(())
}

fn run_audit(kind: &str, payload_path: &Path, config: &MapperConfig) -> Result<(), String> {
    let kind = get_kind(kind)?;
    let payload = load_payload(payload_path)?;

    println!("{}", "Auditing...".cyan());
    let body = kind
        .round_trip(&payload, config)
        .map_err(|e| e.to_string())?;

    // Explicit nulls read back as null state and are never sent
    let original = to_pretty(&without_nulls(&payload))?;
    let returned = to_pretty(&body)?;
    if original == returned {
        println!(
            "{}",
            format!("✓ {} survives the round trip unchanged.", payload_path.display())
                .green()
                .bold()
        );
        return Ok(());
    }

    print_diff(payload_path, &original, &returned);
    Err(format!(
        "{} does not survive the round trip through {} state",
        payload_path.display(),
        kind.name()
    ))
}

fn run_schema(kind: &str) -> Result<(), String> {
    let kind = get_kind(kind)?;
    let fields = kind.schema();

    println!("{} {}", kind.name().cyan().bold(), kind.description());
    let width = fields.iter().map(|f| f.tag.len()).max().unwrap_or(0);
    for field in &fields {
        println!(
            "  {:width$}  {} {} {}",
            field.tag,
            field.wire_type.yellow(),
            "→".dimmed(),
            field.attr_type,
            width = width
        );
    }
    Ok(())
}

fn without_nulls(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), without_nulls(v)))
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(without_nulls).collect())
        }
        other => other.clone(),
    }
}

fn to_pretty(value: &serde_json::Value) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| format!("Failed to render JSON: {}", e))
}

fn print_diff(file: &Path, original: &str, returned: &str) {
    println!("\n{} {}:", "Round trip diff for".cyan().bold(), file.display());

    let diff = TextDiff::from_lines(original, returned);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-".red(),
            ChangeTag::Insert => "+".green(),
            ChangeTag::Equal => " ".normal(),
        };
        print!("{}{}", sign, change);
    }
}
