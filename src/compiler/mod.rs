//! Compiler boundary
//!
//! The shadow pipeline never generates bytecode itself. Every compile goes
//! through the [`Compiler`] trait; [`SolcProcess`] is the bundled adapter.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::error::ShadowError;
use crate::models::{CompileOptions, CompileOutput, Diagnostic, Severity};

mod solc;

pub use solc::{compile_output, solc_input, SolcProcess};

/// Anything that turns `path -> source text` into compiler output.
#[async_trait]
pub trait Compiler: Send + Sync {
    async fn compile(
        &self,
        sources: &BTreeMap<String, String>,
        options: &CompileOptions,
    ) -> anyhow::Result<CompileOutput>;
}

/// Compiles `sources`, escalating error diagnostics to
/// [`ShadowError::Compilation`] when the options ask for it.
///
/// # Arguments
///
/// * `compiler` - The compiler to call
/// * `sources` - Source texts keyed by path
/// * `options` - Compile options, including the escalation flag
///
/// # Returns
///
/// The compiler output, with diagnostics returned as data unless escalated
pub async fn compile_checked<C>(
    compiler: &C,
    sources: &BTreeMap<String, String>,
    options: &CompileOptions,
) -> Result<CompileOutput, ShadowError>
where
    C: Compiler + ?Sized,
{
    debug!("Compiling {} source file(s)", sources.len());
    let output = compiler.compile(sources, options).await.map_err(|err| {
        error!("Compiler invocation failed: {:#}", err);
        ShadowError::Compiler(err)
    })?;

    for diagnostic in &output.diagnostics {
        match diagnostic.severity {
            Severity::Error => warn!("{}", diagnostic),
            Severity::Warning => debug!("{}", diagnostic),
            Severity::Info => {}
        }
    }

    if options.throw_on_compilation_error && output.has_errors() {
        let errors: Vec<Diagnostic> = output.errors().cloned().collect();
        error!("Compilation failed with {} error(s)", errors.len());
        return Err(ShadowError::Compilation(errors));
    }
    Ok(output)
}
