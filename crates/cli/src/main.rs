mod schema_file;
mod values;

use anyhow::{Context, Result};
use argforge::ValueSet;
use argforge_schema::ConstructorSchema;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::{fs, path::PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::schema_file::{load_schema, write_sample_schema};

#[derive(Parser)]
#[command(name = "argforge")]
#[command(version, about = "Render validated command-line argument strings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample argforge.json schema
    Init(InitArgs),

    /// Load a schema and report its arguments
    Check(CheckArgs),

    /// Render an argument string from supplied values
    Render(RenderArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Target directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to the schema file (default: $ARGFORGE_SCHEMA or argforge.json)
    #[arg(short, long, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Only output JSON (no human-readable output)
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct RenderArgs {
    /// Path to the schema file (default: $ARGFORGE_SCHEMA or argforge.json)
    #[arg(short, long, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// JSON object of argument values
    #[arg(long, value_name = "FILE")]
    values: Option<PathBuf>,

    /// Set a value: NAME=VALUE (repeat to build a list) or NAME for true
    #[arg(long = "set", value_name = "NAME[=VALUE]")]
    sets: Vec<String>,

    /// Drop unknown argument names instead of failing
    #[arg(long)]
    lenient: bool,

    /// Override the schema's parameters separator
    #[arg(long, value_name = "SEP", allow_hyphen_values = true)]
    separator: Option<String>,

    /// Print one token per line instead of the joined string
    #[arg(long)]
    tokens: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    schema_path: String,
    arg_count: usize,
    schema: ConstructorSchema,
}

fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Check(args) => check(args),
        Commands::Render(args) => render(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let dest = write_sample_schema(&dir)?;

    eprintln!("Created: {}", dest.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit argforge.json to declare your arguments");
    eprintln!("  2. Run: argforge check");
    eprintln!("  3. Run: argforge render --set output=out.txt");

    Ok(())
}

fn check(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let loaded = load_schema(args.schema.as_deref())?;
    let constructor = loaded
        .schema
        .build()
        .with_context(|| format!("invalid schema: {}", loaded.path.display()))?;

    if args.json {
        let report = CheckReport {
            schema_path: loaded.path.display().to_string(),
            arg_count: constructor.registry().len(),
            schema: ConstructorSchema::from_constructor(&constructor),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    eprintln!("=== Schema Check Results ===");
    eprintln!("Schema: {}", loaded.path.display());
    eprintln!("Arguments: {}", constructor.registry().len());
    eprintln!();
    for spec in constructor.registry().iter() {
        let mut line = format!(
            "  {} ({}): {} value(s)",
            spec.name(),
            if spec.flag().is_empty() { "<positional>" } else { spec.flag() },
            spec.cardinality()
        );
        if spec.is_mandatory() {
            line.push_str(", mandatory");
        }
        let predecessors: Vec<_> = constructor.registry().predecessors(spec.name()).collect();
        if !predecessors.is_empty() {
            line.push_str(&format!(", requires {}", predecessors.join(", ")));
        }
        let conflicts = spec.get_conflicts_with();
        if !conflicts.is_empty() {
            let names: Vec<_> = conflicts.iter().map(String::as_str).collect();
            line.push_str(&format!(", conflicts with {}", names.join(", ")));
        }
        eprintln!("{line}");
    }
    eprintln!();
    eprintln!("OK: schema is valid");

    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    tracing::debug!("executing render command");

    let mut loaded = load_schema(args.schema.as_deref())?;
    if args.lenient {
        loaded.schema.strict = false;
    }
    if let Some(sep) = args.separator {
        loaded.schema.parameters_separator = sep;
    }
    let constructor = loaded
        .schema
        .build()
        .with_context(|| format!("invalid schema: {}", loaded.path.display()))?;

    let mut values = match &args.values {
        Some(path) => values::read_values_file(path)?,
        None => ValueSet::new(),
    };
    values::apply_sets(&mut values, &args.sets)?;

    if args.tokens {
        for token in constructor.render_tokens(&values)? {
            println!("{token}");
        }
    } else {
        println!("{}", constructor.render(&values)?);
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
