//! WASM bindings for the Shadow Compiler
//!
//! This module provides WebAssembly bindings for the AST writer and the
//! compile-free part of the shadow merge, allowing them to be used in web
//! browsers next to a WASM-hosted compiler.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use wasm_bindgen::prelude::*;

use crate::models::ShadowOptions;

/// Initialize panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Render compiler AST JSON to Solidity source
///
/// # Arguments
/// * `ast_json` - Compiler output, or an object mapping paths to ASTs
///
/// # Returns
/// A JSON string mapping each path to its rendered source, or an error message
#[wasm_bindgen]
pub fn render(ast_json: &str) -> Result<String, String> {
    let output = crate::render_ast_json(ast_json, false).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&output.sources).map_err(|e| format!("Serialization error: {}", e))
}

/// Merge shadow code into rendered or original sources without compiling
///
/// # Arguments
/// * `ast_json` - Compiler output, or an object mapping paths to ASTs
/// * `sources_json` - Optional object mapping paths to the original texts
/// * `shadow` - The shadow code
/// * `options_json` - Shadow options (`injectIntoPath`, `injectIntoContract`, `mergeStrategy`)
///
/// # Returns
/// A JSON string with the resolved target and the merged sources
#[wasm_bindgen]
pub fn merge(
    ast_json: &str,
    sources_json: Option<String>,
    shadow: &str,
    options_json: &str,
) -> Result<String, String> {
    let mut batch: Value = serde_json::from_str(ast_json).map_err(|e| e.to_string())?;
    if batch.get("sources").map_or(false, Value::is_object) {
        batch = batch["sources"].take();
    }
    let asts: BTreeMap<String, Value> = serde_json::from_value(batch).map_err(|e| e.to_string())?;
    let texts: Option<BTreeMap<String, String>> = sources_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| e.to_string())?;
    let options: ShadowOptions = serde_json::from_str(options_json).map_err(|e| e.to_string())?;

    let merged = crate::merge_ast_input(&asts, texts.as_ref(), shadow, &options)
        .map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&json!({
        "target": merged.target,
        "sources": merged.sources,
    }))
    .map_err(|e| format!("Serialization error: {}", e))
}

/// Get the compiler version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Validate compiler AST JSON without rendering it
///
/// # Returns
/// `true` if every AST converts, otherwise returns an error message
#[wasm_bindgen]
pub fn validate(ast_json: &str) -> Result<bool, String> {
    match crate::parse_ast_json(ast_json) {
        Ok(_) => Ok(true),
        Err(e) => Err(e.to_string()),
    }
}
