pub mod ast;
pub mod compiler;
pub mod error;
pub mod instrument;
pub mod models;
pub mod resolver;
pub mod shadow;
pub mod writer;

#[cfg(feature = "wasm")]
pub mod wasm;

use std::collections::BTreeMap;

use serde_json::Value;

pub use ast::{ingest, ingest_compiler_output, AstBatch, AstNode, NodeId, NodeKind, SourceSpan, SourceUnit};
pub use compiler::{compile_checked, Compiler, SolcProcess};
pub use error::{AstError, ResolveError, ShadowError};
pub use instrument::{instrument, InstrumentationOptions};
pub use models::{
    CompileOptions, CompileOutput, Diagnostic, MergeStrategy, OutputSelection, Severity,
    ShadowOptions, SourceInput,
};
pub use resolver::{resolve, InjectionHint, InjectionTarget};
pub use shadow::{
    compile_sources_with_shadow, merge_and_compile, merge_ast_input, merge_sources,
    MergedSources, ShadowCompilation,
};
pub use writer::{render, RenderOptions, RenderOutput, SourceMap};

/// Parse compiler AST JSON into a batch of typed source units
///
/// Accepts either a full standard-JSON compiler output (`{"sources": {...}}`)
/// or an object mapping each path to its AST.
///
/// # Arguments
///
/// * `json` - The AST JSON as a string
///
/// # Returns
///
/// A Result containing either the parsed batch or an error
pub fn parse_ast_json(json: &str) -> Result<AstBatch, AstError> {
    let value: Value = serde_json::from_str(json).map_err(|err| AstError::ParseFailed {
        cause: err.to_string(),
        files: Vec::new(),
    })?;
    if value.get("sources").map_or(false, Value::is_object) {
        return ingest_compiler_output(&value);
    }
    let raw: BTreeMap<String, Value> = match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => {
            return Err(AstError::ParseFailed {
                cause: "expected an object of source ASTs".to_string(),
                files: Vec::new(),
            })
        }
    };
    ingest(&raw)
}

/// Render compiler AST JSON back to Solidity source code
///
/// # Arguments
///
/// * `json` - The AST JSON, as accepted by [`parse_ast_json`]
/// * `with_source_map` - Whether to record node positions in the output
///
/// # Returns
///
/// A Result containing either the rendered sources or an error
///
/// # Example
///
/// ```
/// use shadow_compiler::render_ast_json;
///
/// let ast = r#"{"sources": {"A.sol": {"id": 0, "ast": {
///     "nodeType": "SourceUnit", "id": 2, "src": "0:13:0", "absolutePath": "A.sol",
///     "nodes": [{
///         "nodeType": "ContractDefinition", "id": 1, "src": "0:13:0",
///         "name": "A", "contractKind": "contract", "abstract": false,
///         "baseContracts": [], "nodes": []
///     }]
/// }}}}"#;
///
/// let output = render_ast_json(ast, false).unwrap();
/// assert_eq!(output.sources["A.sol"], "contract A {}\n");
/// ```
pub fn render_ast_json(json: &str, with_source_map: bool) -> Result<RenderOutput, AstError> {
    parse_ast_json(json)?.render(&RenderOptions { with_source_map })
}
