//! Soap Formulation Calculator
//!
//! Command-line host for the formulation engine. Keeps the working
//! formulation, prices and saved recipes in a local SQLite key-value store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::Connection;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use soap_calculator::advisor::{ActionKind, SuggestedAction, apply_action};
use soap_calculator::calculator::{aggregate, price_per_kg};
use soap_calculator::error::CalcError;
use soap_calculator::models::{Formulation, Oil, QualityKey};
use soap_calculator::oils::{OilTable, QualityRanges};
use soap_calculator::parse::{parse_amount, parse_items, validate_water_ratio};
use soap_calculator::preview::{Hypothetical, compare, preview};
use soap_calculator::ranges::{lacking_keys, recommended_oils};
use soap_calculator::report::analyze;
use soap_calculator::{db, import};

#[derive(Parser)]
#[command(name = "soap-calculator")]
#[command(about = "Formulation calculator for cold-process soap")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, env = "SOAP_CALC_DB", default_value = "soap_data.db")]
    database: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// List all oils in the reference table
    Oils,

    /// Show details for a specific oil
    Oil {
        /// Oil id or name
        id: String,
    },

    /// Analyse a formulation (the saved working one if no items are given)
    Calc {
        /// Items as <oil>=<grams>, e.g. olive=300 coconut=100
        items: Vec<String>,

        /// Water-to-lye ratio for this calculation only
        #[arg(short, long)]
        water_ratio: Option<f64>,
    },

    /// Replace the working formulation
    Set {
        /// Items as <oil>=<grams>
        #[arg(required = true)]
        items: Vec<String>,
    },

    /// Add or remove grams of one oil in the working formulation
    Adjust {
        kind: AdjustKind,
        oil: String,
        grams: String,
    },

    /// Apply a numbered suggestion from `calc`
    Apply {
        /// Suggestion number
        advice: usize,
        /// Action number within the suggestion
        #[arg(default_value = "1")]
        action: usize,
    },

    /// Show what a single change would do without applying it
    Preview {
        #[command(subcommand)]
        change: PreviewCommand,
    },

    /// Manage price overrides
    Price {
        #[command(subcommand)]
        command: PriceCommand,
    },

    /// List effective prices
    Prices,

    /// Set the water-to-lye ratio
    Water { ratio: f64 },

    /// Save the working formulation as a recipe
    Save { name: String },

    /// List saved recipes
    Recipes,

    /// Load a saved recipe as the working formulation
    Load { id: String },

    /// Delete a saved recipe
    Delete { id: String },

    /// Import recipe JSON exports from a directory
    Import {
        /// Directory to scan recursively
        dir: PathBuf,
    },

    /// Show or set the display theme
    Theme {
        #[arg(conflicts_with = "reset")]
        name: Option<String>,

        /// Forget the stored theme and go back to the default
        #[arg(long)]
        reset: bool,
    },

    /// Restore the starter formulation
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
enum AdjustKind {
    Add,
    Reduce,
}

#[derive(Subcommand)]
enum PreviewCommand {
    /// Add grams of an oil (default: 10% of the batch, at least 50 g)
    Add { oil: String, grams: Option<String> },
    /// Remove grams of an oil
    Reduce { oil: String, grams: String },
    /// Swap the oil in a slot (1-based)
    Replace { slot: usize, oil: String },
}

#[derive(Subcommand)]
enum PriceCommand {
    /// Override the price per kg of an oil
    Set { oil: String, price: f64 },
    /// Go back to the reference price
    Clear { oil: String },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "soap_calculator=debug,warn"
    } else {
        "soap_calculator=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn resolve<'a>(table: &'a OilTable, oil: &str) -> Result<&'a Oil> {
    Ok(table
        .resolve(oil)
        .ok_or_else(|| CalcError::UnknownOil(oil.to_string()))?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;

    let table = OilTable::standard();
    let ranges = QualityRanges::default();
    debug!(oils = table.len(), "reference table ready");

    match cli.command {
        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::Oils => {
            let prices = db::load_prices(&conn)?;
            let formulation = db::load_formulation(&conn)?;
            let current = aggregate(&formulation.items, &table, &prices);
            let lacking = lacking_keys(&current, &ranges);
            let recommended: Vec<&str> = recommended_oils(&table, &lacking)
                .iter()
                .map(|oil| oil.id.as_str())
                .collect();

            println!(
                "  {:<14} {:<18} {:>6} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>8}",
                "Id", "Name", "SAP", "INS", "Hard", "Clean", "Cond", "Bubb", "Cream", "Price/kg"
            );
            println!("{}", "-".repeat(92));
            for oil in table.oils() {
                let q = &oil.qualities;
                let marker = if recommended.contains(&oil.id.as_str()) { "+" } else { " " };
                println!(
                    "{} {:<14} {:<18} {:>6.3} {:>5.0} {:>5.0} {:>5.0} {:>5.0} {:>5.0} {:>5.0} {:>8.2}",
                    marker,
                    oil.id,
                    oil.name,
                    oil.sap,
                    oil.ins,
                    q.hardness,
                    q.cleansing,
                    q.conditioning,
                    q.bubbly,
                    q.creamy,
                    price_per_kg(oil, &prices)
                );
            }
            if !lacking.is_empty() {
                let names: Vec<&str> = lacking.iter().map(|k| k.label()).collect();
                println!("\n+ supplies what the working formulation lacks: {}", names.join(", "));
            }
        }

        Commands::Oil { id } => {
            let oil = resolve(&table, &id)?;
            let prices = db::load_prices(&conn)?;
            println!("Oil: {}", oil.name);
            println!("  ID: {}", oil.id);
            println!("  {}", oil.description);
            println!("  SAP (NaOH): {:.3}", oil.sap);
            println!("  INS: {:.0}", oil.ins);
            for key in QualityKey::ALL {
                println!("  {}: {:.0}", key, oil.qualities.get(key));
            }
            match (prices.get(&oil.id), oil.default_price) {
                (Some(custom), _) => println!("  Price: {:.2}/kg (custom)", custom),
                (None, Some(default)) => println!("  Price: {:.2}/kg", default),
                (None, None) => println!("  Price: not set"),
            }
        }

        Commands::Calc { items, water_ratio } => {
            let items = if items.is_empty() {
                db::load_formulation(&conn)?.items
            } else {
                parse_items(&items, &table)?
            };
            let water_ratio = match water_ratio {
                Some(r) => validate_water_ratio(r)?,
                None => db::load_water_ratio(&conn)?,
            };
            let prices = db::load_prices(&conn)?;

            let analysis = analyze(&items, &table, &prices, &ranges, water_ratio);
            println!("{}", analysis);
        }

        Commands::Set { items } => {
            let items = parse_items(&items, &table)?;
            let mut formulation = db::load_formulation(&conn)?;
            formulation.items = items;
            db::store_formulation(&conn, &formulation)?;
            print_headline(&conn, &table, &ranges, &formulation)?;
        }

        Commands::Adjust { kind, oil, grams } => {
            let oil = resolve(&table, &oil)?;
            let action = SuggestedAction {
                oil_id: oil.id.clone(),
                oil_name: oil.name.clone(),
                delta_g: parse_amount(&grams)?,
                kind: match kind {
                    AdjustKind::Add => ActionKind::Add,
                    AdjustKind::Reduce => ActionKind::Reduce,
                },
            };
            let mut formulation = db::load_formulation(&conn)?;
            apply_action(&mut formulation.items, &action, &table);
            db::store_formulation(&conn, &formulation)?;
            println!("Applied: {}", action);
            print_headline(&conn, &table, &ranges, &formulation)?;
        }

        Commands::Apply { advice, action } => {
            let mut formulation = db::load_formulation(&conn)?;
            let prices = db::load_prices(&conn)?;
            let water_ratio = db::load_water_ratio(&conn)?;
            let analysis = analyze(&formulation.items, &table, &prices, &ranges, water_ratio);

            let chosen = advice
                .checked_sub(1)
                .and_then(|i| analysis.advice.get(i))
                .and_then(|a| action.checked_sub(1).and_then(|j| a.actions.get(j)));
            match chosen {
                Some(chosen) => {
                    apply_action(&mut formulation.items, chosen, &table);
                    db::store_formulation(&conn, &formulation)?;
                    println!("Applied: {}", chosen);
                    print_headline(&conn, &table, &ranges, &formulation)?;
                }
                None => println!("No suggestion {}.{}", advice, action),
            }
        }

        Commands::Preview { change } => {
            let change = match change {
                PreviewCommand::Add { oil, grams } => Hypothetical::Add {
                    oil_id: resolve(&table, &oil)?.id.clone(),
                    delta_g: grams.as_deref().map(parse_amount).transpose()?,
                },
                PreviewCommand::Reduce { oil, grams } => Hypothetical::Reduce {
                    oil_id: resolve(&table, &oil)?.id.clone(),
                    delta_g: parse_amount(&grams)?,
                },
                PreviewCommand::Replace { slot, oil } => Hypothetical::Replace {
                    slot: slot.saturating_sub(1),
                    oil_id: resolve(&table, &oil)?.id.clone(),
                },
            };
            let formulation = db::load_formulation(&conn)?;
            let prices = db::load_prices(&conn)?;

            let before = aggregate(&formulation.items, &table, &prices);
            let after = preview(&formulation.items, &change, &table, &prices);
            let delta = compare(&before, &after);

            println!("{:<14} {:>9} {:>9} {:>9}", "", "Now", "Preview", "Change");
            println!(
                "{:<14} {:>9.1} {:>9.1} {:>+9.1}",
                "Oils (g)",
                before.total_weight,
                after.total_weight,
                delta.total_weight,
            );
            println!(
                "{:<14} {:>9.1} {:>9.1} {:>+9.1}",
                "NaOH (g)",
                before.total_naoh,
                after.total_naoh,
                delta.total_naoh,
            );
            println!(
                "{:<14} {:>9.1} {:>9.1} {:>+9.1}",
                "INS",
                before.avg_ins,
                after.avg_ins,
                delta.avg_ins,
            );
            for (key, d) in &delta.qualities {
                println!(
                    "{:<14} {:>9.0} {:>9.0} {:>+9.0}",
                    key.label(),
                    before.qualities.get(*key),
                    after.qualities.get(*key),
                    d
                );
            }
            println!(
                "{:<14} {:>9.2} {:>9.2} {:>+9.2}",
                "Cost",
                before.total_cost,
                after.total_cost,
                delta.total_cost,
            );
        }

        Commands::Price { command } => {
            let mut prices = db::load_prices(&conn)?;
            match command {
                PriceCommand::Set { oil, price } => {
                    let oil = resolve(&table, &oil)?;
                    if !price.is_finite() || price < 0.0 {
                        return Err(CalcError::InvalidNumber(price.to_string()).into());
                    }
                    prices.insert(oil.id.clone(), price);
                    println!("{}: {:.2}/kg", oil.name, price);
                }
                PriceCommand::Clear { oil } => {
                    let oil = resolve(&table, &oil)?;
                    prices.remove(&oil.id);
                    println!("{}: back to reference price", oil.name);
                }
            }
            db::store_prices(&conn, &prices)?;
        }

        Commands::Prices => {
            let prices = db::load_prices(&conn)?;
            for oil in table.oils() {
                let marker = if prices.contains_key(&oil.id) { "*" } else { " " };
                println!("{} {:<18} {:>8.2}/kg", marker, oil.name, price_per_kg(oil, &prices));
            }
        }

        Commands::Water { ratio } => {
            let ratio = validate_water_ratio(ratio)?;
            db::store_water_ratio(&conn, ratio)?;
            println!("Water ratio set to {:.1}", ratio);
        }

        Commands::Save { name } => {
            let formulation = db::load_formulation(&conn)?;
            let water_ratio = db::load_water_ratio(&conn)?;
            let recipe = db::save_recipe(&conn, &name, &formulation, water_ratio)?;
            println!("Saved '{}' as {}", recipe.name, recipe.id);
        }

        Commands::Recipes => {
            let recipes = db::list_recipes(&conn)?;
            if recipes.is_empty() {
                println!("No saved recipes. Use 'save <name>' or 'import <dir>' first.");
            } else {
                let prices = db::load_prices(&conn)?;
                println!("{:<16} {:<24} {}", "Id", "Name", "Summary");
                println!("{}", "-".repeat(72));
                for r in recipes {
                    let analysis = analyze(&r.items, &table, &prices, &ranges, r.water_ratio);
                    println!("{:<16} {:<24} {}", r.id, r.name, analysis.headline());
                }
            }
        }

        Commands::Load { id } => {
            let recipe = db::load_recipe(&conn, &id)?;
            println!("Loaded '{}'", recipe.name);
            let formulation = Formulation {
                items: recipe.items,
                additives: recipe.additives,
            };
            print_headline(&conn, &table, &ranges, &formulation)?;
        }

        Commands::Delete { id } => {
            let removed = db::delete_recipe(&conn, &id)?;
            println!("Deleted '{}'", removed.name);
        }

        Commands::Import { dir } => {
            let stats = import::import_directory(&conn, &dir)?;
            println!("{}", stats);
        }

        Commands::Theme { name, reset } => match name {
            Some(name) => {
                db::store_theme(&conn, &name)?;
                println!("Theme set to {}", name);
            }
            None if reset => {
                db::delete_value(&conn, db::KEY_THEME)?;
                println!("Theme reset to {}", db::load_theme(&conn)?);
            }
            None => println!("{}", db::load_theme(&conn)?),
        },

        Commands::Reset => {
            let formulation = db::reset_formulation(&conn)?;
            print_headline(&conn, &table, &ranges, &formulation)?;
        }
    }

    Ok(())
}

/// Recompute and print the one-line status after a change
fn print_headline(
    conn: &Connection,
    table: &OilTable,
    ranges: &QualityRanges,
    formulation: &Formulation,
) -> Result<()> {
    let prices = db::load_prices(conn)?;
    let water_ratio = db::load_water_ratio(conn)?;
    let analysis = analyze(&formulation.items, table, &prices, ranges, water_ratio);
    println!("Now: {}", analysis.headline());
    Ok(())
}
