//! Generate CATALOG.md from the formula catalog.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gen-catalog [OUTPUT]
//! ```
//!
//! Without an argument the file is written to
//! `formula_core/src/catalog/CATALOG.md` (relative to the workspace root).

use std::fs;
use std::path::PathBuf;

use formula_core::catalog::{catalog, generate_catalog_markdown};

const DEFAULT_OUTPUT: &str = "formula_core/src/catalog/CATALOG.md";

fn main() {
    let output_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    println!("Generating {}...", output_path.display());

    let catalog = match catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error building catalog: {}", e);
            std::process::exit(1);
        }
    };
    let markdown = generate_catalog_markdown(catalog);

    match fs::write(&output_path, &markdown) {
        Ok(()) => {
            println!("Successfully wrote {} bytes to {}", markdown.len(), output_path.display());
        }
        Err(e) => {
            eprintln!("Error writing file: {}", e);
            std::process::exit(1);
        }
    }
}
