//! # Tally CLI Application
//!
//! Terminal front end for the estimation engine.
//!
//! ```text
//! tally materials
//! tally complexity
//! tally estimate <material> [key=value ...] [--complexity K] [--overhead P] [--settings FILE]
//! tally calc <category> [key=value ...]
//! tally override <FILE> <material> <index> <price>
//! ```
//!
//! Results are printed as a text summary followed by the JSON wire shape.
//! Logs go to stderr; pass `-vv` or set `RUST_LOG=debug` to see them.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use estimate_core::calculators::{CalculatorRegistry, Outcome, ResultCategory, ResultEntries};
use estimate_core::catalog::Catalog;
use estimate_core::errors::CalcError;
use estimate_core::estimate::{estimate, validate_request, EstimateRequest, EstimationResult};
use estimate_core::file_io::{load_user_settings_or_default, save_user_settings, FileLock, UserSettings};
use estimate_core::overrides::{effective_prices, PriceOverrides};
use estimate_core::validation::{InputValue, Inputs};
use tracing_subscriber::EnvFilter;

/// Construction material and cost estimates from the terminal.
#[derive(Parser, Debug)]
#[command(name = "tally", author, version, about)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv); overrides RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List catalog materials and their input fields
    Materials,

    /// List complexity levels and their labor factors
    Complexity,

    /// Estimate materials, labor and total cost for one catalog material
    Estimate {
        /// Material key (see `tally materials`)
        material: String,

        /// Measured inputs as key=value pairs
        #[arg(value_parser = parse_input)]
        inputs: Vec<(String, InputValue)>,

        /// Complexity key (simple, medium, complex)
        #[arg(long)]
        complexity: Option<String>,

        /// Overhead (BDI) percentage
        #[arg(long)]
        overhead: Option<f64>,

        /// User settings file holding price overrides and defaults
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,
    },

    /// Run one of the quick per-category calculators
    Calc {
        /// Calculator category (flooring, stairs, ...)
        category: String,

        /// Inputs as key=value pairs
        #[arg(value_parser = parse_input)]
        inputs: Vec<(String, InputValue)>,
    },

    /// Store a unit price override in a user settings file
    Override {
        /// User settings file
        file: PathBuf,

        /// Material key
        material: String,

        /// Composition line index
        index: usize,

        /// Unit price replacing the catalog default
        price: f64,
    },
}

enum Failure {
    Invalid(Vec<String>),
    Calc(CalcError),
}

impl From<CalcError> for Failure {
    fn from(e: CalcError) -> Self {
        match e {
            CalcError::ValidationFailed { errors } => Failure::Invalid(errors),
            other => Failure::Calc(other),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Output goes to stderr so JSON on stdout stays clean for piping.
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli.command) {
        Ok(code) => code,
        Err(Failure::Invalid(errors)) => {
            eprintln!("Invalid input:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            ExitCode::from(2)
        }
        Err(Failure::Calc(e)) => {
            eprintln!("Error [{}]: {}", e.error_code(), e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode, Failure> {
    let catalog = Catalog::builtin()?;
    match command {
        Commands::Materials => {
            list_materials(&catalog);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Complexity => {
            for level in catalog.list_complexity_levels() {
                println!("{:<10} {:<10} x{}", level.key, level.name, level.factor);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Estimate {
            material,
            inputs,
            complexity,
            overhead,
            settings,
        } => run_estimate(&catalog, material, to_inputs(inputs), complexity, overhead, settings),
        Commands::Calc { category, inputs } => run_calc(&category, &to_inputs(inputs)),
        Commands::Override {
            file,
            material,
            index,
            price,
        } => run_override(&catalog, &file, &material, index, price),
    }
}

fn list_materials(catalog: &Catalog) {
    for material in catalog.list_materials() {
        println!("{} - {} (per {})", material.key, material.name, material.base_unit);
        for field in &material.input_fields {
            let required = if field.required { " *" } else { "" };
            let options: Vec<&str> = field.options.iter().map(|o| o.value.as_str()).collect();
            if options.is_empty() {
                println!("    {}{}  {}", field.key, required, field.label);
            } else {
                println!("    {}{}  {} [{}]", field.key, required, field.label, options.join("|"));
            }
        }
    }
}

/// Parse one `key=value` input. Values that read as numbers become numbers.
fn parse_input(arg: &str) -> Result<(String, InputValue), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got: {}", arg))?;
    if key.is_empty() {
        return Err(format!("missing key in: {}", arg));
    }
    let value = match value.parse::<f64>() {
        Ok(n) => InputValue::Number(n),
        Err(_) => InputValue::Text(value.to_string()),
    };
    Ok((key.to_string(), value))
}

fn to_inputs(pairs: Vec<(String, InputValue)>) -> Inputs {
    let mut inputs = Inputs::new();
    for (key, value) in pairs {
        inputs.insert(key, value);
    }
    inputs
}

fn run_estimate(
    catalog: &Catalog,
    material_key: String,
    inputs: Inputs,
    complexity: Option<String>,
    overhead: Option<f64>,
    settings_path: Option<PathBuf>,
) -> Result<ExitCode, Failure> {
    let settings = match settings_path {
        Some(path) => {
            let settings = load_user_settings_or_default(&path, &user_id())?;
            tracing::info!(path = %path.display(), overrides = settings.price_overrides.len(), "loaded user settings");
            settings
        }
        None => UserSettings::new(user_id()),
    };

    let request = EstimateRequest::new(material_key, inputs)
        .with_complexity(complexity.unwrap_or_else(|| settings.default_complexity.clone()))
        .with_overhead(overhead.unwrap_or(settings.default_overhead_percentage));

    validate_request(catalog, &request)?.into_result()?;
    let result = estimate(catalog, &request, &settings.price_overrides)?;

    print_estimate(&result);
    print_json(&result);
    Ok(ExitCode::SUCCESS)
}

fn print_estimate(result: &EstimationResult) {
    println!("{} ({})", result.material, result.complexity_name);
    println!(
        "  base {} {}, with {}% waste {} {}",
        result.base_quantity, result.base_unit, result.waste_percentage, result.adjusted_quantity, result.base_unit
    );
    println!();
    for item in &result.line_items {
        println!(
            "  {:<28} {:>10} {:<4} x {:>9.2} = {:>11.2}",
            item.name, item.quantity, item.unit, item.unit_price, item.total
        );
    }
    println!();
    println!("  Materials       {:>12.2}", result.material_subtotal);
    println!(
        "  Labor           {:>12.2}  ({} h, {} days)",
        result.labor_subtotal, result.labor_hours, result.labor_days
    );
    println!("  Subtotal        {:>12.2}", result.subtotal);
    println!("  Overhead {:>5}% {:>12.2}", result.overhead_percentage, result.overhead_amount);
    println!("  TOTAL           {:>12.2}", result.total_cost);
    println!("  per {:<11} {:>12.2}", result.base_unit, result.cost_per_base_unit);
    println!();
}

fn run_calc(category: &str, inputs: &Inputs) -> Result<ExitCode, Failure> {
    let registry = CalculatorRegistry::new();
    match registry.calculate(category, inputs)? {
        Outcome::Computed(result) => {
            println!("{}", result.category());
            for (group, entries) in result.group_by_category() {
                let heading = match group {
                    ResultCategory::Primary => "Results",
                    ResultCategory::Secondary => "Materials",
                    ResultCategory::Info => "Notes",
                };
                println!("  {}", heading);
                for (key, entry) in entries {
                    let mark = if entry.highlight { "*" } else { " " };
                    println!("   {} {:<22} {} {}", mark, key, entry.value, entry.unit);
                }
            }
            println!();
            print_json(&result);
            Ok(ExitCode::SUCCESS)
        }
        Outcome::NotFound(miss) => {
            eprintln!("No table entry for {} = {}", miss.field, miss.value);
            print_json(&miss);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_override(
    catalog: &Catalog,
    path: &Path,
    material_key: &str,
    index: usize,
    price: f64,
) -> Result<ExitCode, Failure> {
    let material = catalog.material(material_key)?;
    if index >= material.compositions.len() {
        return Err(Failure::Calc(CalcError::invalid_input(
            "compositionIndex",
            index.to_string(),
            format!("{} has {} composition lines", material.key, material.compositions.len()),
        )));
    }

    let _lock = FileLock::acquire(path, user_id())?;
    let mut settings = load_user_settings_or_default(path, &user_id())?;
    settings.price_overrides.set(material_key, index, price)?;
    prune(&mut settings.price_overrides, catalog);
    save_user_settings(&settings, path)?;

    for line in effective_prices(material, &settings.price_overrides) {
        let mark = if line.override_unit_price.is_some() { "*" } else { " " };
        println!(
            " {} [{}] {:<28} {:>9.2} (default {:.2})",
            mark, line.composition_index, line.name, line.unit_price, line.default_unit_price
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn prune(overrides: &mut PriceOverrides, catalog: &Catalog) {
    let removed = overrides.prune(catalog);
    if !removed.is_empty() {
        eprintln!("Removed {} stale override(s)", removed.len());
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    if let Ok(json) = serde_json::to_string_pretty(value) {
        println!("{}", json);
    }
}

fn user_id() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "local".to_string())
}
