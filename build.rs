//! Build script for sign dictionary validation
//!
//! Parses every bundled dictionary JSON at compile time so that a malformed
//! sign (bad tuple, unknown axis, duplicate letter) fails the build instead
//! of silently dropping gestures in the browser.

// Include the shared dictionary file format
#[path = "src/gesture/wire.rs"]
mod wire;

use std::fs;
use std::path::Path;
use wire::DictionaryFile;

/// Validate a dictionary file
fn validate_dictionary_file(path: &Path) -> Result<(), String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let file: DictionaryFile = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    let errors = wire::validate_file(&file);

    if errors.is_empty() {
        println!(
            "cargo:warning=✓ {} validated ({} letters, {} words)",
            path.display(),
            file.letters.len(),
            file.words.len()
        );
        Ok(())
    } else {
        Err(format!(
            "Dictionary '{}' has invalid entries:\n  {}",
            path.display(),
            errors.join("\n  ")
        ))
    }
}

fn main() {
    // Dictionary files to validate (relative to crate root)
    let signs_dir = Path::new("assets/signs");

    // Rerun if the shared file format changes
    println!("cargo:rerun-if-changed=src/gesture/wire.rs");

    if !signs_dir.exists() {
        println!("cargo:warning=Sign directory not found, skipping validation");
        return;
    }

    let mut has_errors = false;

    if let Ok(entries) = fs::read_dir(signs_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                // Tell cargo to rerun if this file changes
                println!("cargo:rerun-if-changed={}", path.display());

                if let Err(e) = validate_dictionary_file(&path) {
                    println!("cargo:warning=VALIDATION ERROR: {}", e);
                    has_errors = true;
                }
            }
        }
    }

    if has_errors {
        panic!("Sign dictionary validation failed! Fix the entries in assets/signs.");
    }

    // Rerun if the sign directory changes
    println!("cargo:rerun-if-changed={}", signs_dir.display());
}
