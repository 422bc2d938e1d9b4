use std::collections::BTreeMap;
use std::fmt;

use foundry_compilers::artifacts::EvmVersion;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resolver::InjectionTarget;

/// Compiler input and option structures
///
/// These structures configure one compile call and are read from JSON
/// configuration files by the CLI.

/// Artifact requested from the compiler
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputSelection {
    #[serde(rename = "abi")]
    Abi,
    #[serde(rename = "ast")]
    Ast,
    #[serde(rename = "evm.bytecode")]
    Bytecode,
    #[serde(rename = "evm.deployedBytecode")]
    DeployedBytecode,
    #[serde(rename = "storageLayout")]
    StorageLayout,
}

impl OutputSelection {
    /// Field name in the compiler's `outputSelection` setting.
    pub fn as_solc_field(&self) -> &'static str {
        match self {
            Self::Abi => "abi",
            Self::Ast => "ast",
            Self::Bytecode => "evm.bytecode",
            Self::DeployedBytecode => "evm.deployedBytecode",
            Self::StorageLayout => "storageLayout",
        }
    }

    /// Whether the artifact is produced per contract rather than per file.
    pub fn is_contract_level(&self) -> bool {
        !matches!(self, Self::Ast)
    }
}

/// Options for one compile call
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Compiler release to locate or install, e.g. `0.8.20`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solc_version: Option<String>,
    /// Target EVM hardfork; unknown names are rejected when parsing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<EvmVersion>,
    /// Artifacts to request
    pub output_selection: Vec<OutputSelection>,
    /// Turn error diagnostics into a failed call
    pub throw_on_compilation_error: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            solc_version: None,
            evm_version: None,
            output_selection: vec![
                OutputSelection::Abi,
                OutputSelection::Ast,
                OutputSelection::Bytecode,
                OutputSelection::DeployedBytecode,
                OutputSelection::StorageLayout,
            ],
            throw_on_compilation_error: false,
        }
    }
}

impl CompileOptions {
    /// Same compiler settings, requesting only the ASTs and failing on errors.
    pub fn ast_only(&self) -> Self {
        Self {
            output_selection: vec![OutputSelection::Ast],
            throw_on_compilation_error: true,
            ..self.clone()
        }
    }
}

/// How shadow code is merged into the target contract
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Splice into the original text; nothing else changes
    #[default]
    Safe,
    /// Regenerate the target file with every overridable function marked virtual
    Replace,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// Where and how to inject shadow code
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inject_into_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inject_into_contract: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_strategy: Option<MergeStrategy>,
}

/// Sources handed to the shadow compile front-end, keyed by path
#[derive(Debug, Clone, PartialEq)]
pub enum SourceInput {
    Solidity(BTreeMap<String, String>),
    SolidityAst(BTreeMap<String, Value>),
    Yul(BTreeMap<String, String>),
}

/// Compiler output structures
///
/// Normalized view of what the compiler returned, independent of the
/// compiler's own JSON layout.

/// Output of one compile call
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CompileOutput {
    pub files: BTreeMap<String, FileOutput>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Per-file output
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FileOutput {
    pub contracts: BTreeMap<String, ContractOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ast: Option<Value>,
}

/// Per-contract output
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContractOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abi: Option<Value>,
    /// Creation bytecode, hex without prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytecode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_bytecode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_layout: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A compiler error, warning or note
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_location: Option<SourceLocation>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.formatted_message {
            Some(formatted) => write!(f, "{}", formatted.trim_end()),
            None => write!(f, "{:?}: {}", self.severity, self.message),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub start: i64,
    pub end: i64,
}

/// JSON artifact written by `shadowc merge`
#[derive(Debug, Serialize, Clone)]
pub struct ShadowArtifact {
    pub compiler: CompilerInfo,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    pub strategy: MergeStrategy,
    pub target: InjectionTarget,
    /// Sources as handed to the final compile call
    pub sources: BTreeMap<String, String>,
    pub output: CompileOutput,
}

/// Compiler information
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompilerInfo {
    pub name: String,
    pub version: String,
}
