use thiserror::Error;

use crate::ast::NodeId;
use crate::models::Diagnostic;

/// Failures while converting compiler ASTs into the typed graph, or writing
/// the graph back to source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    #[error("failed to parse AST for {files:?}: {cause}")]
    ParseFailed { cause: String, files: Vec<String> },
    #[error("AST conversion produced no source units for {files:?}")]
    EmptyResult { files: Vec<String> },
    #[error("failed to write source unit {file} to Solidity code: {cause}")]
    WriteFailed { cause: String, file: String },
}

impl AstError {
    pub fn parse_failed<T: Into<String>>(cause: T, file: &str) -> Self {
        Self::ParseFailed {
            cause: cause.into(),
            files: vec![file.to_string()],
        }
    }

    pub fn write_failed<T: Into<String>>(cause: T, file: &str) -> Self {
        Self::WriteFailed {
            cause: cause.into(),
            file: file.to_string(),
        }
    }
}

/// Failures while picking the file, contract and node that receive the shadow code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("source compilation resulted in no contract files")]
    NoSources,
    #[error("multiple source files found ({available:?}); an injection path is required")]
    PathRequired { available: Vec<String> },
    #[error("injection path {path} not found among {available:?}")]
    PathNotFound { path: String, available: Vec<String> },
    #[error("source {path} contains no contracts")]
    NoContracts { path: String },
    #[error("contract {name} not found in {path}")]
    ContractNotFound { path: String, name: String },
    #[error("multiple contracts found in {path} ({candidates:?}); a contract name is required")]
    AmbiguousContract { path: String, candidates: Vec<String> },
    #[error("contract {contract} in {path} does not contain any members to inject after")]
    NoInjectionPoint { path: String, contract: String },
}

/// Failures of the shadow merge pipeline. Nothing is compiled once one of
/// these is raised, except for [`ShadowError::Compilation`] which reports
/// the diagnostics of the final compile call.
#[derive(Debug, Error)]
pub enum ShadowError {
    #[error(transparent)]
    Ast(#[from] AstError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("failed to locate injection point {node} in instrumented code for {path}")]
    InjectionPointLost { path: String, node: NodeId },
    #[error("source text for {path} not found")]
    MissingSource { path: String },
    #[error("injection offset {offset} is not a valid position in {path} ({len} bytes)")]
    InvalidSpan { path: String, offset: usize, len: usize },
    #[error("AST not found for source: {path}")]
    MissingAst { path: String },
    #[error("{0} is not supported yet")]
    NotSupported(String),
    #[error("compilation failed with {} error(s)", .0.len())]
    Compilation(Vec<Diagnostic>),
    #[error("compiler invocation failed: {0}")]
    Compiler(#[source] anyhow::Error),
}
