use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use foundry_compilers::artifacts::output_selection::OutputSelection as SolcOutputSelection;
use foundry_compilers::artifacts::{
    BytecodeObject, CompilerOutput, Contract, Error as SolcError, Settings,
    Severity as SolcSeverity, SolcInput, SolcLanguage, Source, Sources,
};
use foundry_compilers::compilers::solc::Solc;
use tracing::debug;

use super::Compiler;
use crate::models::{
    CompileOptions, CompileOutput, ContractOutput, Diagnostic, FileOutput, Severity,
    SourceLocation,
};

/// Runs a local `solc` binary in standard-JSON mode.
///
/// When the options name a `solcVersion`, that release is located or
/// installed instead of using `binary`.
#[derive(Debug, Clone)]
pub struct SolcProcess {
    binary: PathBuf,
}

impl Default for SolcProcess {
    fn default() -> Self {
        Self::new("solc")
    }
}

impl SolcProcess {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// The version reported by `solc --version`.
    pub async fn version(&self) -> Result<String> {
        let binary = self.binary.clone();
        let solc = tokio::task::spawn_blocking(move || Solc::new(&binary))
            .await?
            .with_context(|| format!("{} is not a usable solc", self.binary.display()))?;
        Ok(solc.version.to_string())
    }

    fn solc(&self, options: &CompileOptions) -> Result<Solc> {
        match &options.solc_version {
            Some(requested) => {
                let version = semver::Version::parse(requested.trim_start_matches('v'))
                    .with_context(|| format!("invalid solc version `{}`", requested))?;
                debug!("Using solc {} instead of {}", version, self.binary.display());
                Solc::find_or_install(&version)
                    .with_context(|| format!("solc {} is not available", version))
            }
            None => Solc::new(&self.binary)
                .with_context(|| format!("failed to start {}", self.binary.display())),
        }
    }
}

#[async_trait]
impl Compiler for SolcProcess {
    async fn compile(
        &self,
        sources: &BTreeMap<String, String>,
        options: &CompileOptions,
    ) -> Result<CompileOutput> {
        let input = solc_input(sources, options);
        let process = self.clone();
        let options = options.clone();
        let output = tokio::task::spawn_blocking(move || -> Result<CompilerOutput> {
            let solc = process.solc(&options)?;
            debug!("Running solc {} on {} file(s)", solc.version, input.sources.len());
            solc.compile_exact(&input)
                .with_context(|| format!("solc {} failed", solc.version))
        })
        .await??;
        compile_output(output)
    }
}

/// Builds the compiler's standard-JSON input document.
pub fn solc_input(sources: &BTreeMap<String, String>, options: &CompileOptions) -> SolcInput {
    let sources: Sources = sources
        .iter()
        .map(|(path, content)| (PathBuf::from(path), Source::new(content.as_str())))
        .collect();

    let mut file_level = Vec::new();
    let mut contract_level = Vec::new();
    for selection in &options.output_selection {
        let field = selection.as_solc_field().to_string();
        let target = if selection.is_contract_level() {
            &mut contract_level
        } else {
            &mut file_level
        };
        if !target.contains(&field) {
            target.push(field);
        }
    }

    let mut settings = Settings::default();
    settings.output_selection = SolcOutputSelection(BTreeMap::from([(
        "*".to_string(),
        BTreeMap::from([("".to_string(), file_level), ("*".to_string(), contract_level)]),
    )]));
    settings.evm_version = options.evm_version;

    SolcInput::new(SolcLanguage::Solidity, sources, settings)
}

/// Normalizes the compiler's standard-JSON output.
pub fn compile_output(output: CompilerOutput) -> Result<CompileOutput> {
    let diagnostics = output.errors.iter().map(diagnostic).collect();

    let mut files: BTreeMap<String, FileOutput> = BTreeMap::new();
    for (path, source) in output.sources {
        let ast = source
            .ast
            .map(serde_json::to_value)
            .transpose()
            .with_context(|| format!("unreadable AST for {}", path.display()))?;
        files.entry(path_key(&path)).or_default().ast = ast;
    }
    for (path, by_name) in output.contracts {
        let file = files.entry(path_key(&path)).or_default();
        for (name, contract) in by_name {
            let contract = contract_output(&contract)
                .with_context(|| format!("unreadable output for {}:{}", path.display(), name))?;
            file.contracts.insert(name, contract);
        }
    }

    Ok(CompileOutput { files, diagnostics })
}

fn path_key(path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().into_owned()
}

fn diagnostic(error: &SolcError) -> Diagnostic {
    Diagnostic {
        severity: match error.severity {
            SolcSeverity::Error => Severity::Error,
            SolcSeverity::Warning => Severity::Warning,
            SolcSeverity::Info => Severity::Info,
        },
        message: error.message.clone(),
        formatted_message: error.formatted_message.clone(),
        source_location: error.source_location.as_ref().map(|location| SourceLocation {
            file: location.file.clone(),
            start: location.start as i64,
            end: location.end as i64,
        }),
    }
}

fn contract_output(contract: &Contract) -> Result<ContractOutput> {
    let evm = contract.evm.as_ref();
    let bytecode = evm
        .and_then(|evm| evm.bytecode.as_ref())
        .map(|bytecode| hex_object(&bytecode.object));
    let deployed_bytecode = evm
        .and_then(|evm| evm.deployed_bytecode.as_ref())
        .and_then(|deployed| deployed.bytecode.as_ref())
        .map(|bytecode| hex_object(&bytecode.object));

    let storage_layout = if contract.storage_layout.storage.is_empty() {
        None
    } else {
        Some(serde_json::to_value(&contract.storage_layout)?)
    };

    Ok(ContractOutput {
        abi: contract.abi.as_ref().map(serde_json::to_value).transpose()?,
        bytecode,
        deployed_bytecode,
        storage_layout,
    })
}

/// Bytecode as hex without prefix; unlinked objects keep their placeholders.
fn hex_object(object: &BytecodeObject) -> String {
    match object {
        BytecodeObject::Bytecode(bytes) => hex::encode(bytes),
        BytecodeObject::Unlinked(text) => text.trim_start_matches("0x").to_string(),
    }
}
