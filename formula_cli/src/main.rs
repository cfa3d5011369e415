//! # Lambda Explorer CLI
//!
//! Command line front end for the formula catalog.
//!
//! ## Usage
//!
//! ```bash
//! lambda list --topic propulsion
//! lambda show CircleArea
//! lambda solve IdealGasMolar P=1 n=1 R=8.314 T=300
//! lambda solve SpecificImpulse c_e=2943 --default g0
//! lambda plot CircleArea --x r --y A --start 0 --end 3 --step 0.5 --format csv
//! lambda defaults set g0 9.80665
//! ```
//!
//! Errors are printed to stderr followed by their JSON form, and the process
//! exits with status 1.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use formula_core::catalog::{catalog, CatalogEntry, Topic};
use formula_core::defaults::DefaultValues;
use formula_core::errors::{FormulaError, FormulaResult};
use formula_core::file_io::{load_defaults, save_defaults};
use formula_core::formula::parse_number;
use formula_core::plot::{sweep, PlotRequest, PlotSeries};

/// Solve engineering formulas for any one unknown
#[derive(Parser, Debug)]
#[command(name = "lambda", author, version, about, long_about = None)]
struct Cli {
    /// Default values file (.json, .yaml or .yml)
    #[arg(long, global = true, value_name = "PATH", default_value = "defaults.json")]
    defaults: PathBuf,

    /// Print the solved expression and the defaults file in use
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List formulas grouped by topic
    List {
        /// Only show this topic
        #[arg(long)]
        topic: Option<String>,
    },
    /// Show a formula's variables and solved forms
    Show {
        /// Formula id (e.g. IdealGasMolar)
        id: String,
    },
    /// Solve a formula for its one missing variable
    Solve {
        id: String,
        /// Known values
        #[arg(value_name = "NAME=VALUE", value_parser = parse_assignment)]
        values: Vec<(String, String)>,
        /// Take NAME's value from the defaults file
        #[arg(long = "default", value_name = "NAME")]
        use_defaults: Vec<String>,
        /// Print the solution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sweep one variable and solve for another
    Plot {
        id: String,
        /// Swept variable
        #[arg(long = "x", value_name = "NAME")]
        x_variable: String,
        /// Solved variable
        #[arg(long = "y", value_name = "NAME")]
        y_variable: String,
        #[arg(long, allow_negative_numbers = true)]
        start: f64,
        #[arg(long, allow_negative_numbers = true)]
        end: f64,
        #[arg(long)]
        step: f64,
        /// Values for the remaining variables
        #[arg(value_name = "NAME=VALUE", value_parser = parse_assignment)]
        constants: Vec<(String, String)>,
        #[arg(long, value_enum, default_value_t = PlotFormat::Table)]
        format: PlotFormat,
    },
    /// Inspect or edit the defaults file
    Defaults {
        #[command(subcommand)]
        action: DefaultsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DefaultsCommand {
    /// Print every variable and its default
    Show,
    /// Set a default value
    Set { name: String, value: String },
    /// Blank a default value
    Clear { name: String },
    /// Write an entry for every catalog variable, keeping existing values
    Init,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PlotFormat {
    Table,
    Csv,
    Json,
}

fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", arg)),
    }
}

/// Collect NAME=VALUE pairs, rejecting a name given more than once.
fn collect_assignments(values: &[(String, String)]) -> FormulaResult<HashMap<String, String>> {
    let mut map = HashMap::with_capacity(values.len());
    for (name, text) in values {
        if map.insert(name.clone(), text.clone()).is_some() {
            return Err(FormulaError::invalid_input(name, text, "given more than once"));
        }
    }
    Ok(map)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        if let Ok(json) = serde_json::to_string_pretty(&e) {
            eprintln!("{}", json);
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> FormulaResult<()> {
    match &cli.command {
        Command::List { topic } => list(topic.as_deref()),
        Command::Show { id } => show(id),
        Command::Solve {
            id,
            values,
            use_defaults,
            json,
        } => solve(cli, id, values, use_defaults, *json),
        Command::Plot {
            id,
            x_variable,
            y_variable,
            start,
            end,
            step,
            constants,
            format,
        } => {
            let constants = collect_assignments(constants)?
                .iter()
                .map(|(name, text)| parse_number(name, text).map(|v| (name.clone(), v)))
                .collect::<FormulaResult<HashMap<_, _>>>()?;
            let request = PlotRequest {
                x_variable: x_variable.clone(),
                y_variable: y_variable.clone(),
                start: *start,
                end: *end,
                step: *step,
                constants,
            };
            plot(id, &request, *format)
        }
        Command::Defaults { action } => defaults(cli, action),
    }
}

// ============================================================================
// list / show
// ============================================================================

fn list(topic: Option<&str>) -> FormulaResult<()> {
    let filter = match topic {
        Some(name) => Some(Topic::from_name(name).ok_or_else(|| {
            let known: Vec<&str> = Topic::ALL.iter().map(|t| t.display_name()).collect();
            FormulaError::invalid_input("topic", name, format!("expected one of: {}", known.join(", ")))
        })?),
        None => None,
    };

    for (topic, entries) in catalog()?.by_topic() {
        if filter.is_some_and(|f| f != topic) {
            continue;
        }
        println!("{}", topic.display_name());
        for entry in entries {
            println!("  {:<30} {}", entry.definition.id, entry.formula.equation());
        }
        println!();
    }
    Ok(())
}

fn show(id: &str) -> FormulaResult<()> {
    let entry = catalog()?.get(id)?;
    let definition = &entry.definition;

    println!("{} ({})", definition.name, definition.id);
    println!("{}", definition.description);
    println!();
    println!("  {}", entry.formula.equation());
    println!();
    println!("Variables:");
    for var in &definition.variables {
        println!("  {:<8} {:<32} [{}]", var.symbol, var.description, var.units);
    }
    println!();
    println!("Solved forms:");
    for var in entry.formula.variables() {
        if let Some(expr) = entry.formula.solved_expression(var) {
            println!("  {} = {}", var, expr);
        }
    }
    if !definition.assumptions.is_empty() {
        println!();
        println!("Assumptions:");
        for assumption in &definition.assumptions {
            println!("  - {}", assumption);
        }
    }
    Ok(())
}

// ============================================================================
// solve
// ============================================================================

fn solve(
    cli: &Cli,
    id: &str,
    values: &[(String, String)],
    use_defaults: &[String],
    json: bool,
) -> FormulaResult<()> {
    let entry = catalog()?.get(id)?;
    let formula = &entry.formula;

    let mut inputs = collect_assignments(values)?;
    if !use_defaults.is_empty() {
        if cli.verbose {
            println!("Defaults: {}", cli.defaults.display());
        }
        let defaults = load_defaults(&cli.defaults)?;
        let names: Vec<&str> = use_defaults.iter().map(String::as_str).collect();
        defaults.apply_to(formula, &mut inputs, &names)?;
    }

    let solution = formula.solve_form(&inputs)?;

    if json {
        let text = serde_json::to_string_pretty(&solution).map_err(|e| FormulaError::SerializationError {
            reason: e.to_string(),
        })?;
        println!("{}", text);
        return Ok(());
    }

    if cli.verbose {
        if let Some(expr) = formula.solved_expression(&solution.variable) {
            println!("{} = {}", solution.variable, expr);
        }
    }
    println!("{} = {}{}", solution.variable, solution.value, units_suffix(entry, &solution.variable));
    Ok(())
}

fn units_suffix(entry: &CatalogEntry, variable: &str) -> String {
    match entry.definition.variable(variable) {
        Some(info) if info.units != "-" => format!(" {}", info.units),
        _ => String::new(),
    }
}

// ============================================================================
// plot
// ============================================================================

fn plot(id: &str, request: &PlotRequest, format: PlotFormat) -> FormulaResult<()> {
    let entry = catalog()?.get(id)?;
    let series = sweep(&entry.formula, request)?;

    match format {
        PlotFormat::Json => {
            let text = serde_json::to_string_pretty(&series).map_err(|e| FormulaError::SerializationError {
                reason: e.to_string(),
            })?;
            println!("{}", text);
        }
        PlotFormat::Csv => print!("{}", series.to_csv()),
        PlotFormat::Table => print_table(entry, &series),
    }

    if let Some(reason) = &series.stopped_early {
        if format != PlotFormat::Json {
            eprintln!(
                "Stopped after {} of {} points: {}",
                series.points.len(),
                request.point_count(),
                reason
            );
        }
    }
    Ok(())
}

fn print_table(entry: &CatalogEntry, series: &PlotSeries) {
    let x_header = format!("{}{}", series.x_variable, units_suffix(entry, &series.x_variable));
    let y_header = format!("{}{}", series.y_variable, units_suffix(entry, &series.y_variable));
    println!("{:>16}  {:>20}", x_header, y_header);
    println!("{:>16}  {:>20}", "-".repeat(16), "-".repeat(20));
    for point in &series.points {
        println!("{:>16.6}  {:>20.6}", point.x, point.y);
    }
}

// ============================================================================
// defaults
// ============================================================================

fn defaults(cli: &Cli, action: &DefaultsCommand) -> FormulaResult<()> {
    let path = cli.defaults.as_path();
    if cli.verbose {
        println!("Defaults: {}", path.display());
    }

    match action {
        DefaultsCommand::Show => {
            let mut store = DefaultValues::seeded_from_catalog()?;
            store.merge(load_defaults(path)?);
            for (name, value) in store.iter() {
                println!("  {:<10} {}", name, if value.is_empty() { "-" } else { value });
            }
        }
        DefaultsCommand::Set { name, value } => {
            ensure_catalog_variable(name)?;
            parse_number(name, value)?;
            update(path, |store| store.set(name.clone(), value.clone()))?;
            println!("{} = {}", name, value.trim());
        }
        DefaultsCommand::Clear { name } => {
            ensure_catalog_variable(name)?;
            update(path, |store| {
                store.clear(name);
            })?;
            println!("{} cleared", name);
        }
        DefaultsCommand::Init => {
            let mut store = DefaultValues::seeded_from_catalog()?;
            store.merge(load_defaults(path)?);
            save_defaults(&store, path)?;
            println!("Wrote {} entries to {}", store.len(), path.display());
        }
    }
    Ok(())
}

fn ensure_catalog_variable(name: &str) -> FormulaResult<()> {
    if catalog()?.all_variables().iter().any(|v| v == name) {
        Ok(())
    } else {
        Err(FormulaError::invalid_input("name", name, "not a variable of any catalog formula"))
    }
}

/// Load, modify and save the defaults file.
fn update(path: &Path, edit: impl FnOnce(&mut DefaultValues)) -> FormulaResult<()> {
    let mut store = load_defaults(path)?;
    edit(&mut store);
    save_defaults(&store, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("P=1.5").unwrap(), ("P".to_string(), "1.5".to_string()));
        assert_eq!(parse_assignment("T= ").unwrap(), ("T".to_string(), String::new()));
        assert!(parse_assignment("P").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn test_collect_assignments_rejects_repeats() {
        let values = vec![("P".to_string(), "1".to_string()), ("T".to_string(), "300".to_string())];
        let map = collect_assignments(&values).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["T"], "300");

        let repeated = vec![("P".to_string(), "1".to_string()), ("P".to_string(), "2".to_string())];
        let err = collect_assignments(&repeated).unwrap_err();
        assert_eq!(err, FormulaError::invalid_input("P", "2", "given more than once"));
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_parse_solve_command() {
        let cli = Cli::try_parse_from([
            "lambda", "solve", "IdealGasMolar", "P=1", "n=1", "R=8.314", "--default", "T", "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Solve { id, values, use_defaults, json } => {
                assert_eq!(id, "IdealGasMolar");
                assert_eq!(values.len(), 3);
                assert_eq!(use_defaults, vec!["T".to_string()]);
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.defaults, PathBuf::from("defaults.json"));
    }

    #[test]
    fn test_parse_plot_command() {
        let cli = Cli::try_parse_from([
            "lambda", "--defaults", "d.yaml", "plot", "IdealGasLaw", "--x", "T", "--y", "p", "--start", "-10",
            "--end", "10", "--step", "5", "rho=1.2", "R=287", "--format", "csv",
        ])
        .unwrap();
        assert_eq!(cli.defaults, PathBuf::from("d.yaml"));
        match cli.command {
            Command::Plot { start, format, constants, .. } => {
                assert_eq!(start, -10.0);
                assert_eq!(format, PlotFormat::Csv);
                assert_eq!(constants.len(), 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
