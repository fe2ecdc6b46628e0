//! JSON-LD Validator CLI
//!
//! Fetches a page (or reads a local file), extracts its JSON-LD blocks and
//! validates each against the registered schema.org shapes.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use jsonld_schemas::config::OutputFormat;
use jsonld_schemas::extract::{load_file, load_page};
use jsonld_schemas::{Extraction, Outcome, ShapeRegistry, Validator, ValidatorConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jsonld-validator")]
#[command(about = "Validate schema.org JSON-LD blocks embedded in a web page")]
#[command(version)]
struct Cli {
    /// Config file (defaults to jsonld.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// Print every violation under a failing script
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a page and validate its JSON-LD
    Url {
        url: String,
        /// Request timeout in seconds (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Validate a local HTML page, or a .json file of candidates
    File { path: PathBuf },

    /// List registered types and their shapes
    Shapes,

    /// Show the effective configuration
    Config {
        /// Write it to this path as TOML
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config_path = cli.config.as_ref().map(|p| p.to_string_lossy().to_string());
    let mut config = ValidatorConfig::load_from(config_path.as_deref())
        .context("failed to load configuration")?;
    if cli.verbose {
        config.output.show_violations = true;
    }
    let registry = config
        .registry()
        .context("invalid [validation] closed_shapes")?;

    match cli.command {
        Commands::Url { url, timeout } => {
            if let Some(secs) = timeout {
                config.fetch.timeout_secs = secs;
            }
            match load_page(&url, &config.fetch) {
                Ok(extraction) => report(&url, extraction, &registry, &config, cli.format),
                Err(e) => {
                    println!("❌ Could not retrieve data: {}", e);
                    Ok(1)
                }
            }
        }

        Commands::File { path } => {
            let extraction = load_file(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            report(&path.display().to_string(), extraction, &registry, &config, cli.format)
        }

        Commands::Shapes => {
            match cli.format {
                Format::Json => {
                    let shapes: serde_json::Map<String, serde_json::Value> = registry
                        .entries()
                        .map(|(name, shape)| serde_json::to_value(shape).map(|v| (name.to_string(), v)))
                        .collect::<serde_json::Result<_>>()?;
                    println!("{}", to_json(&serde_json::Value::Object(shapes), config.output.format)?);
                }
                Format::Text => {
                    println!("📋 {} registered types", registry.len());
                    for (name, shape) in registry.entries() {
                        let required: Vec<&str> = shape.required_fields().map(|f| f.name).collect();
                        println!(
                            "  {} -> {} ({}) requires: {}",
                            name,
                            shape.name,
                            if shape.open { "open" } else { "closed" },
                            required.join(", ")
                        );
                    }
                }
            }
            Ok(0)
        }

        Commands::Config { save } => {
            if let Some(path) = save {
                config.save(&path.to_string_lossy())?;
                println!("✅ Config written to {:?}", path);
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            Ok(0)
        }
    }
}

fn report(
    source: &str,
    extraction: Extraction,
    registry: &ShapeRegistry,
    config: &ValidatorConfig,
    format: Format,
) -> anyhow::Result<i32> {
    let validator = Validator::new(registry);

    let start = Instant::now();
    let result = validator.validate(&extraction.candidates);
    let elapsed = start.elapsed();

    match format {
        Format::Json => {
            let failures: Vec<serde_json::Value> = extraction
                .failures
                .iter()
                .map(|f| serde_json::json!({"index": f.index, "error": f.source.to_string()}))
                .collect();
            let doc = serde_json::json!({
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "source": source,
                "elapsed_ms": elapsed.as_secs_f64() * 1000.0,
                "tally": result.tally,
                "items": result.observations,
                "decode_failures": failures,
                "repaired_scripts": extraction.repaired,
            });
            println!("{}", to_json(&doc, config.output.format)?);
        }
        Format::Text => {
            println!("🔍 {} JSON-LD block(s) from {}", extraction.candidates.len(), source);
            for failure in &extraction.failures {
                println!("⚠️  {}", failure);
            }
            for index in &extraction.repaired {
                println!("⚠️  script #{} contained raw control characters", index);
            }
            for observation in &result.observations {
                println!("{}", observation);
                if let Outcome::Invalid { violations } = &observation.outcome {
                    if config.output.show_violations {
                        for v in violations {
                            println!("   └─ {}", v);
                        }
                    }
                }
            }
            println!("Time: {:?}", elapsed);
            println!("{}", result.tally);
        }
    }

    Ok(0)
}

fn to_json(value: &serde_json::Value, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value),
        OutputFormat::Compact => serde_json::to_string(value),
    }
}
