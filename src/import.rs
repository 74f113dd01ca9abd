//! Bulk import of exported recipe files
//!
//! Walks a directory tree for `*.json` files and stores every recipe found.
//! A file may hold one saved recipe, a list of them, or a bare formulation
//! (`{items, additives}`), which is named after the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Deserialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::calculator::DEFAULT_WATER_RATIO;
use crate::db;
use crate::models::{Formulation, SavedFormula};

#[derive(Deserialize)]
#[serde(untagged)]
enum RecipeFile {
    Many(Vec<SavedFormula>),
    One(SavedFormula),
    Bare(Formulation),
}

/// Find all JSON files under a directory
pub fn find_recipe_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Parse a single export file into recipes
fn parse_recipe_file(path: &Path) -> Result<Vec<SavedFormula>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed: RecipeFile = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a recipe export", path.display()))?;

    let recipes = match parsed {
        RecipeFile::Many(list) => list,
        RecipeFile::One(recipe) => vec![recipe],
        RecipeFile::Bare(formulation) => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("imported")
                .to_string();
            vec![SavedFormula {
                id: format!("import-{}", name),
                name,
                items: formulation.items,
                additives: formulation.additives,
                water_ratio: DEFAULT_WATER_RATIO,
                timestamp: 0,
            }]
        }
    };
    Ok(recipes)
}

/// Import every recipe under `dir` into the saved-recipe list
pub fn import_directory(conn: &Connection, dir: &Path) -> Result<ImportStats> {
    let mut stats = ImportStats::default();

    info!("Scanning {} for recipe exports", dir.display());
    let files = find_recipe_files(dir)?;
    debug!("Found {} JSON files", files.len());

    for path in &files {
        match parse_recipe_file(path) {
            Ok(recipes) if recipes.is_empty() => stats.skipped += 1,
            Ok(recipes) => {
                let found = recipes.len();
                let added = db::insert_recipes(conn, recipes)?;
                stats.files += 1;
                stats.recipes += added;
                stats.duplicates += found - added;
                debug!(file = %path.display(), added, "imported");
            }
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportStats {
    pub files: usize,
    pub recipes: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} recipes from {} files. Duplicates: {}, Skipped: {}, Errors: {}",
            self.recipes, self.files, self.duplicates, self.skipped, self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FormulaItem;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_import_directory_mixed_files() {
        let temp = TempDir::new().expect("tempdir should be created");
        write(
            temp.path(),
            "single.json",
            r#"{"id":"r1","name":"Castile","items":[{"oilId":"olive","weight":1000}],
                "waterRatio":2.0,"timestamp":1700000000000}"#,
        );
        write(
            temp.path(),
            "nested/list.json",
            r#"[{"id":"r2","name":"Bastille","items":[],"waterRatio":2.3,"timestamp":1},
                {"id":"r1","name":"Castile again","items":[],"waterRatio":2.3,"timestamp":2}]"#,
        );
        write(
            temp.path(),
            "nested/deeper/lavender.json",
            r#"{"items":[{"oilId":"coconut","weight":100}],"additives":[{"name":"lavender","weight":15}]}"#,
        );
        write(temp.path(), "broken.json", "{ nope");
        write(temp.path(), "notes.txt", "not a recipe");

        let conn = conn();
        let stats = import_directory(&conn, temp.path()).unwrap();

        assert_eq!(
            stats,
            ImportStats {
                files: 3,
                recipes: 3,
                duplicates: 1,
                skipped: 0,
                errors: 1,
            }
        );

        let recipes = db::list_recipes(&conn).unwrap();
        let lavender = recipes.iter().find(|r| r.id == "import-lavender").unwrap();
        assert_eq!(lavender.name, "lavender");
        assert_eq!(lavender.items, vec![FormulaItem::new("coconut", 100.0)]);
        assert_eq!(lavender.additives.len(), 1);
        assert_eq!(lavender.water_ratio, DEFAULT_WATER_RATIO);
    }

    #[test]
    fn test_find_recipe_files_only_json() {
        let temp = TempDir::new().expect("tempdir should be created");
        write(temp.path(), "a.json", "[]");
        write(temp.path(), "b.JSON.bak", "[]");
        write(temp.path(), "sub/c.json", "[]");

        let files = find_recipe_files(temp.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_empty_list_is_skipped() {
        let temp = TempDir::new().expect("tempdir should be created");
        write(temp.path(), "empty.json", "[]");

        let stats = import_directory(&conn(), temp.path()).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.recipes, 0);
    }
}
