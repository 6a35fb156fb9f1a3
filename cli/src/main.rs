mod catalog;
mod error_formatter;
mod formatter;
mod pmsm;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use deductor::{DeductionOptions, Derivation, Model, Row, ALL_GROUPS};
use formatter::Formatter;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "deductor")]
#[command(about = "Declare the quantities, give what you know, deduce the rest.")]
#[command(
    long_about = "Deductor deduces every derivable quantity of a model from a partial set of known values.\nThe CLI ships a catalog of models; pick one, give the values you know, and read back the rest."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deduce a model from known values and display it
    ///
    /// Applies every rule of the model until nothing new is learned, fills
    /// defaults, checks validators, and prints the resulting attributes.
    Run {
        /// Catalog model to deduce (see `deductor list`)
        model: String,
        /// Known values (format: name=value)
        ///
        /// Examples: R=2, tau=0.5, Kemf_rpm=0.021
        facts: Vec<String>,
        /// JSON file with known values, e.g. {"R": 2.0}
        ///
        /// Values given on the command line take part in deduction after these.
        #[arg(short = 's', long = "seed-file")]
        seed_file: Option<PathBuf>,
        /// Relative tolerance for treating two values as consistent
        #[arg(short = 't', long, default_value_t = 0.05)]
        tolerance: f64,
        /// Skip validators after deduction
        #[arg(long)]
        no_validate: bool,
        /// Only show attributes of this group
        #[arg(short = 'g', long, default_value = ALL_GROUPS)]
        group: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Also show where every known value came from
        #[arg(long)]
        trace: bool,
        /// Upper bound on deduction passes
        #[arg(long, default_value_t = 1000)]
        max_passes: usize,
        /// Name to label the result with
        #[arg(long)]
        name: Option<String>,
        /// Description to label the result with
        #[arg(long, requires = "name")]
        description: Option<String>,
    },
    /// Show model structure
    ///
    /// Shows all attributes, rules and validators of a catalog model.
    Show {
        /// Catalog model to show
        model: String,
        /// Only show attributes of this group
        #[arg(short = 'g', long)]
        group: Option<String>,
    },
    /// List catalog models with attribute, rule and validator counts
    List,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deductor=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run {
            model,
            facts,
            seed_file,
            tolerance,
            no_validate,
            group,
            json,
            trace,
            max_passes,
            name,
            description,
        } => {
            let mut options = DeductionOptions::new()
                .with_tolerance(*tolerance)
                .with_max_passes(*max_passes);
            if *no_validate {
                options = options.without_validation();
            }
            let output = RunOutput {
                group,
                json: *json,
                trace: *trace,
            };
            let label = name
                .as_ref()
                .map(|name| (name.as_str(), description.as_deref().unwrap_or("")));
            run_command(model, facts, seed_file.as_deref(), &options, label, &output)
        }
        Commands::Show { model, group } => show_command(model, group.as_deref()),
        Commands::List => list_command(),
    };

    if let Err(e) = result {
        // Check if it's a DeductorError and format it nicely, otherwise use default
        if let Some(deductor_err) = e.downcast_ref::<deductor::DeductorError>() {
            eprintln!("{}", error_formatter::format_error(deductor_err));
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

/// How `run` prints its result
struct RunOutput<'a> {
    group: &'a str,
    json: bool,
    trace: bool,
}

#[derive(Serialize)]
struct TracedListing<'a> {
    schema: &'a str,
    rows: Vec<Row>,
    trace: &'a [Derivation],
}

fn run_command(
    model_name: &str,
    facts: &[String],
    seed_file: Option<&Path>,
    options: &DeductionOptions,
    label: Option<(&str, &str)>,
    output: &RunOutput,
) -> Result<()> {
    let schema = load_schema(model_name)?;

    let mut seed = match seed_file {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Cannot read seed file {}", path.display()))?;
            deductor::serializers::seed_from_json(&json)?
        }
        None => Vec::new(),
    };
    seed.extend(parse_facts(facts)?);
    tracing::debug!(model = model_name, values = seed.len(), "deducing");

    let mut model = Model::new(&schema, seed, options)?;
    if let Some((name, description)) = label {
        model = model.named(name, description);
    }

    if output.json {
        if output.trace {
            let listing = TracedListing {
                schema: schema.name(),
                rows: model.rows(output.group)?,
                trace: model.trace(),
            };
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            println!("{}", deductor::serializers::to_json(&model, output.group)?);
        }
        return Ok(());
    }

    let formatter = Formatter::default();
    print!("{}", formatter.format_model(&model, output.group)?);
    if output.trace {
        println!();
        print!("{}", formatter.format_trace(model.trace()));
    }

    Ok(())
}

fn show_command(model_name: &str, group: Option<&str>) -> Result<()> {
    let schema = load_schema(model_name)?;
    let formatter = Formatter::default();
    print!("{}", formatter.format_schema(&schema, group));
    Ok(())
}

fn list_command() -> Result<()> {
    let mut schemas = Vec::with_capacity(catalog::ENTRIES.len());
    for entry in catalog::ENTRIES {
        schemas.push((entry, entry.schema()?));
    }

    let models: Vec<(&str, &str, &deductor::Schema)> = schemas
        .iter()
        .map(|(entry, schema)| (entry.name, entry.description, schema.as_ref()))
        .collect();

    println!("Catalog contains {} models\n", models.len());
    let formatter = Formatter::default();
    print!("{}", formatter.format_catalog(&models));

    Ok(())
}

fn load_schema(model_name: &str) -> Result<Arc<deductor::Schema>> {
    let entry = catalog::find(model_name).ok_or_else(|| {
        anyhow!(
            "Model '{}' not found. Available models: {}",
            model_name,
            catalog::names()
        )
    })?;
    Ok(entry.schema()?)
}

/// Parse `name=value` pairs
fn parse_facts(facts: &[String]) -> Result<Vec<(String, f64)>> {
    facts
        .iter()
        .map(|fact| {
            let Some((name, value)) = fact.split_once('=') else {
                bail!("Invalid fact '{}': expected name=value", fact);
            };
            let name = name.trim();
            if name.is_empty() {
                bail!("Invalid fact '{}': missing name", fact);
            }
            let value: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid value for '{}': '{}'", name, value.trim()))?;
            Ok((name.to_string(), value))
        })
        .collect()
}
