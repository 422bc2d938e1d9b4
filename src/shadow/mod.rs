//! Shadow merge orchestration
//!
//! Splices user-supplied shadow code into a target contract and hands the
//! merged sources to the compiler. Two strategies exist:
//!
//! - `Safe` inserts the shadow code into the original text, right after the
//!   last member of the target contract. Nothing else changes.
//! - `Replace` marks every overridable function of the target contract
//!   `virtual`, regenerates the file from its AST and splices into the
//!   regenerated text, using the source map produced alongside it.
//!
//! Either the whole pipeline succeeds or nothing is compiled.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::ast::{self, AstBatch, SourceSpan};
use crate::compiler::{compile_checked, Compiler};
use crate::error::{ResolveError, ShadowError};
use crate::instrument::{instrument, InstrumentationOptions};
use crate::models::{CompileOptions, CompileOutput, MergeStrategy, ShadowOptions, SourceInput};
use crate::resolver::{resolve, InjectionHint, InjectionTarget};
use crate::writer::RenderOptions;

/// Sources ready for the final compile call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSources {
    /// Every file of the compilation; only the target path differs from its
    /// pre-splice text.
    pub sources: BTreeMap<String, String>,
    pub target: InjectionTarget,
    /// Byte offset in the pre-splice target text where shadow code went.
    pub injection_offset: usize,
}

/// Result of [`compile_sources_with_shadow`].
#[derive(Debug, Clone)]
pub struct ShadowCompilation {
    pub target: InjectionTarget,
    pub sources: BTreeMap<String, String>,
    pub output: CompileOutput,
}

fn logged<E: Into<ShadowError>>(err: E) -> ShadowError {
    let err = err.into();
    error!("{}", err);
    err
}

/// Merges `shadow` into the target contract without compiling.
///
/// # Arguments
///
/// * `batch` - ASTs parsed from `original_sources`
/// * `original_sources` - Source texts keyed by path
/// * `shadow` - The code to inject
/// * `strategy` - Safe or Replace
/// * `target` - Where to inject, as resolved against `batch`
///
/// # Returns
///
/// The merged sources
pub fn merge_sources(
    batch: &AstBatch,
    original_sources: &BTreeMap<String, String>,
    shadow: &str,
    strategy: MergeStrategy,
    target: &InjectionTarget,
) -> Result<MergedSources, ShadowError> {
    match strategy {
        MergeStrategy::Safe => {
            debug!("Merging shadow code into the original text of {}", target.path);
            let text = original_sources
                .get(&target.path)
                .ok_or_else(|| {
                    logged(ShadowError::MissingSource {
                        path: target.path.clone(),
                    })
                })?;
            let (merged, injection_offset) =
                splice(&target.path, text, target.injection_span, shadow).map_err(logged)?;

            let mut sources = original_sources.clone();
            sources.insert(target.path.clone(), merged);
            Ok(MergedSources {
                sources,
                target: target.clone(),
                injection_offset,
            })
        }
        MergeStrategy::Replace => {
            let unit = batch.get(&target.path).ok_or_else(|| {
                logged(ShadowError::MissingAst {
                    path: target.path.clone(),
                })
            })?;
            let options = InstrumentationOptions {
                mark_functions_as_virtual: true,
                contract_filter: Some(target.contract_name.clone()),
                ..InstrumentationOptions::default()
            };
            let mut instrumented = batch.clone();
            instrumented.replace(instrument(unit, &options));
            merge_rendered(&instrumented, shadow, target)
        }
    }
}

/// Renders `batch` with source maps and splices into the fresh target text.
fn merge_rendered(
    batch: &AstBatch,
    shadow: &str,
    target: &InjectionTarget,
) -> Result<MergedSources, ShadowError> {
    debug!("Merging shadow code into regenerated {}", target.path);
    let rendered = batch
        .render(&RenderOptions {
            with_source_map: true,
        })
        .map_err(logged)?;

    let span = rendered
        .source_maps
        .as_ref()
        .and_then(|maps| maps.get(&target.path))
        .and_then(|map| map.get(&target.injection_node))
        .copied()
        .ok_or_else(|| {
            logged(ShadowError::InjectionPointLost {
                path: target.path.clone(),
                node: target.injection_node,
            })
        })?;

    let mut sources = rendered.sources;
    let text = sources.get(&target.path).ok_or_else(|| {
        logged(ShadowError::MissingSource {
            path: target.path.clone(),
        })
    })?;
    let (merged, injection_offset) = splice(&target.path, text, span, shadow).map_err(logged)?;
    sources.insert(target.path.clone(), merged);

    Ok(MergedSources {
        sources,
        target: target.clone(),
        injection_offset,
    })
}

/// Merges `shadow` into `original_sources` and compiles the result.
pub async fn merge_and_compile<C>(
    compiler: &C,
    batch: &AstBatch,
    original_sources: &BTreeMap<String, String>,
    shadow: &str,
    strategy: MergeStrategy,
    target: &InjectionTarget,
    options: &CompileOptions,
) -> Result<CompileOutput, ShadowError>
where
    C: Compiler + ?Sized,
{
    let merged = merge_sources(batch, original_sources, shadow, strategy, target)?;
    compile_checked(compiler, &merged.sources, options).await
}

fn merge_strategy(shadow_options: &ShadowOptions) -> MergeStrategy {
    shadow_options.merge_strategy.unwrap_or_else(|| {
        debug!(
            "No merge strategy provided; using default \"{}\"",
            MergeStrategy::default()
        );
        MergeStrategy::default()
    })
}

fn injection_hint(shadow_options: &ShadowOptions) -> InjectionHint {
    InjectionHint::new(
        shadow_options.inject_into_path.clone(),
        shadow_options.inject_into_contract.clone(),
    )
}

/// Ingests compiler ASTs and merges `shadow` into the resolved target.
///
/// `texts` are the sources the ASTs were parsed from. Without them, Safe
/// mode splices into a fresh rendering of the unmodified batch, since no
/// other text matches the spans at hand.
pub fn merge_ast_input(
    asts: &BTreeMap<String, Value>,
    texts: Option<&BTreeMap<String, String>>,
    shadow: &str,
    shadow_options: &ShadowOptions,
) -> Result<MergedSources, ShadowError> {
    let strategy = merge_strategy(shadow_options);
    let batch = ast::ingest(asts).map_err(logged)?;
    let target = resolve(&batch, &injection_hint(shadow_options)).map_err(logged)?;

    match (strategy, texts) {
        (MergeStrategy::Safe, None) => merge_rendered(&batch, shadow, &target),
        (strategy, texts) => merge_sources(
            &batch,
            texts.unwrap_or(&BTreeMap::new()),
            shadow,
            strategy,
            &target,
        ),
    }
}

/// Compiles `input` with `shadow` merged into the contract selected by
/// `shadow_options`.
///
/// Solidity sources are compiled once for their ASTs (errors escalated),
/// then merged and compiled again with `options`.
pub async fn compile_sources_with_shadow<C>(
    compiler: &C,
    input: SourceInput,
    shadow: &str,
    shadow_options: &ShadowOptions,
    options: &CompileOptions,
) -> Result<ShadowCompilation, ShadowError>
where
    C: Compiler + ?Sized,
{
    let strategy = merge_strategy(shadow_options);
    info!("Compiling sources with shadow code injected in {} mode", strategy);

    let merged = match input {
        SourceInput::Yul(_) => return Err(logged(ShadowError::NotSupported("Yul".to_string()))),
        SourceInput::SolidityAst(asts) => merge_ast_input(&asts, None, shadow, shadow_options)?,
        SourceInput::Solidity(sources) => {
            if sources.is_empty() {
                return Err(logged(ResolveError::NoSources));
            }
            let ast_output = compile_checked(compiler, &sources, &options.ast_only()).await?;

            let mut asts = BTreeMap::new();
            for path in sources.keys() {
                let ast = ast_output
                    .files
                    .get(path)
                    .and_then(|file| file.ast.clone())
                    .ok_or_else(|| logged(ShadowError::MissingAst { path: path.clone() }))?;
                asts.insert(path.clone(), ast);
            }
            merge_ast_input(&asts, Some(&sources), shadow, shadow_options)?
        }
    };

    let output = compile_checked(compiler, &merged.sources, options).await?;
    Ok(ShadowCompilation {
        target: merged.target,
        sources: merged.sources,
        output,
    })
}

/// Inserts `shadow` after `span`, surrounded by blank lines.
///
/// The compiler leaves the terminating `;` of a state variable out of its
/// span, so a `;` that directly follows the span is kept before the shadow
/// code.
fn splice(
    path: &str,
    text: &str,
    span: SourceSpan,
    shadow: &str,
) -> Result<(String, usize), ShadowError> {
    let end = span.end();
    if end > text.len() || !text.is_char_boundary(end) {
        return Err(ShadowError::InvalidSpan {
            path: path.to_string(),
            offset: end,
            len: text.len(),
        });
    }
    let offset = past_terminator(text, end);

    let mut merged = String::with_capacity(text.len() + shadow.len() + 4);
    merged.push_str(&text[..offset]);
    merged.push_str("\n\n");
    merged.push_str(shadow);
    merged.push_str("\n\n");
    merged.push_str(&text[offset..]);
    Ok((merged, offset))
}

fn past_terminator(text: &str, end: usize) -> usize {
    let rest = &text[end..];
    let trimmed = rest.trim_start();
    if trimmed.starts_with(';') {
        end + (rest.len() - trimmed.len()) + 1
    } else {
        end
    }
}
