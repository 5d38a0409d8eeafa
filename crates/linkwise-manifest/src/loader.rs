//! Manifest loading from YAML or JSON sources.
//!
//! Every entry point validates the parsed document, so a returned
//! [`Manifest`] is always safe to turn into a graph.

use std::path::Path;

use linkwise_common::constants::JSON_EXTENSIONS;
use linkwise_common::error::{LinkwiseError, Result};

use crate::model::Manifest;
use crate::validator;

/// Parses and validates a YAML manifest.
///
/// # Errors
///
/// Returns an error if the document is not valid YAML, does not match the
/// manifest model, or fails validation.
pub fn parse_yaml(content: &str) -> Result<Manifest> {
    let manifest: Manifest = serde_yaml::from_str(content)?;
    validator::validate(&manifest)?;
    Ok(manifest)
}

/// Parses and validates a JSON manifest.
///
/// # Errors
///
/// Returns an error if the document is not valid JSON, does not match the
/// manifest model, or fails validation.
pub fn parse_json(content: &str) -> Result<Manifest> {
    let manifest: Manifest = serde_json::from_str(content)?;
    validator::validate(&manifest)?;
    Ok(manifest)
}

/// Reads a manifest file, choosing the format from its extension.
///
/// `.json` files are parsed as JSON; anything else as YAML.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or any parse or
/// validation error.
pub fn load(path: &Path) -> Result<Manifest> {
    tracing::info!(path = %path.display(), "loading manifest");
    let content = std::fs::read_to_string(path).map_err(|e| LinkwiseError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            JSON_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        });
    let manifest = if is_json {
        parse_json(&content)?
    } else {
        parse_yaml(&content)?
    };
    tracing::debug!(components = manifest.components.len(), "manifest loaded");
    Ok(manifest)
}
