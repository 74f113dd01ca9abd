//! Key-value persistence for the working formulation and user settings
//!
//! Each value is stored as JSON under its own key. Loaders never fail on bad
//! data: a missing or unreadable value falls back to its documented default.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::calculator::{DEFAULT_WATER_RATIO, MAX_WATER_RATIO, MIN_WATER_RATIO};
use crate::error::CalcError;
use crate::models::{FormulaItem, Formulation, PriceOverrides, SavedFormula};
use crate::oils::{COCONUT, OLIVE, PALM};

pub const KEY_FORMULATION: &str = "formulation";
pub const KEY_PRICES: &str = "prices";
pub const KEY_RECIPES: &str = "recipes";
pub const KEY_WATER_RATIO: &str = "water_ratio";
pub const KEY_THEME: &str = "theme";

pub const DEFAULT_THEME: &str = "light";

/// Formulation used on first start and after a reset
pub fn starter_formulation() -> Formulation {
    Formulation {
        items: vec![
            FormulaItem::new(OLIVE, 300.0),
            FormulaItem::new(COCONUT, 100.0),
            FormulaItem::new(PALM, 100.0),
        ],
        additives: Vec::new(),
    }
}

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Raw stored text for a key
pub fn get_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

/// Insert or replace the text for a key
pub fn put_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
        (key, value),
    )?;
    Ok(())
}

pub fn delete_value(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
    Ok(())
}

fn load_json<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>> {
    let Some(text) = get_value(conn, key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&text) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "stored value is malformed, using default");
            Ok(None)
        }
    }
}

fn store_json<T: Serialize>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    put_value(conn, key, &serde_json::to_string(value)?)
}

pub fn load_formulation(conn: &Connection) -> Result<Formulation> {
    Ok(load_json(conn, KEY_FORMULATION)?.unwrap_or_else(starter_formulation))
}

pub fn store_formulation(conn: &Connection, formulation: &Formulation) -> Result<()> {
    store_json(conn, KEY_FORMULATION, formulation)
}

/// Put the starter formulation back
pub fn reset_formulation(conn: &Connection) -> Result<Formulation> {
    let formulation = starter_formulation();
    store_formulation(conn, &formulation)?;
    info!("formulation reset to starter");
    Ok(formulation)
}

pub fn load_prices(conn: &Connection) -> Result<PriceOverrides> {
    Ok(load_json(conn, KEY_PRICES)?.unwrap_or_default())
}

pub fn store_prices(conn: &Connection, prices: &PriceOverrides) -> Result<()> {
    store_json(conn, KEY_PRICES, prices)
}

/// Stored water ratio; anything outside 1 to 5 falls back to the default
pub fn load_water_ratio(conn: &Connection) -> Result<f64> {
    let ratio: Option<f64> = load_json(conn, KEY_WATER_RATIO)?;
    Ok(ratio
        .filter(|r| (MIN_WATER_RATIO..=MAX_WATER_RATIO).contains(r))
        .unwrap_or(DEFAULT_WATER_RATIO))
}

pub fn store_water_ratio(conn: &Connection, ratio: f64) -> Result<()> {
    store_json(conn, KEY_WATER_RATIO, &ratio)
}

pub fn load_theme(conn: &Connection) -> Result<String> {
    Ok(load_json(conn, KEY_THEME)?.unwrap_or_else(|| DEFAULT_THEME.to_string()))
}

pub fn store_theme(conn: &Connection, theme: &str) -> Result<()> {
    store_json(conn, KEY_THEME, &theme)
}

pub fn list_recipes(conn: &Connection) -> Result<Vec<SavedFormula>> {
    Ok(load_json(conn, KEY_RECIPES)?.unwrap_or_default())
}

fn store_recipes(conn: &Connection, recipes: &[SavedFormula]) -> Result<()> {
    store_json(conn, KEY_RECIPES, &recipes)
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Save the given formulation under a new recipe id, newest first
pub fn save_recipe(
    conn: &Connection,
    name: &str,
    formulation: &Formulation,
    water_ratio: f64,
) -> Result<SavedFormula> {
    let mut recipes = list_recipes(conn)?;
    let timestamp = now_millis();

    let mut id = timestamp.to_string();
    let mut suffix = 1;
    while recipes.iter().any(|r| r.id == id) {
        id = format!("{}-{}", timestamp, suffix);
        suffix += 1;
    }

    let recipe = SavedFormula {
        id,
        name: name.to_string(),
        items: formulation.items.clone(),
        additives: formulation.additives.clone(),
        water_ratio,
        timestamp,
    };
    recipes.insert(0, recipe.clone());
    store_recipes(conn, &recipes)?;
    info!(id = %recipe.id, name, "saved recipe");
    Ok(recipe)
}

/// Append recipes that are not already stored, keyed by id. Returns how many were added.
pub fn insert_recipes(conn: &Connection, incoming: Vec<SavedFormula>) -> Result<usize> {
    let mut recipes = list_recipes(conn)?;
    let mut added = 0;
    for recipe in incoming {
        if recipes.iter().any(|r| r.id == recipe.id) {
            continue;
        }
        recipes.push(recipe);
        added += 1;
    }
    store_recipes(conn, &recipes)?;
    Ok(added)
}

pub fn delete_recipe(conn: &Connection, id: &str) -> Result<SavedFormula> {
    let mut recipes = list_recipes(conn)?;
    let position = recipes
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| CalcError::RecipeNotFound(id.to_string()))?;
    let removed = recipes.remove(position);
    store_recipes(conn, &recipes)?;
    info!(id, name = %removed.name, "deleted recipe");
    Ok(removed)
}

/// Make a saved recipe the working formulation, replacing it wholesale
pub fn load_recipe(conn: &Connection, id: &str) -> Result<SavedFormula> {
    let recipe = list_recipes(conn)?
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| CalcError::RecipeNotFound(id.to_string()))?;

    store_formulation(
        conn,
        &Formulation {
            items: recipe.items.clone(),
            additives: recipe.additives.clone(),
        },
    )?;
    store_water_ratio(conn, recipe.water_ratio)?;
    info!(id, name = %recipe.name, "loaded recipe");
    Ok(recipe)
}
