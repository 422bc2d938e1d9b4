//! Injection-target resolution: picks the file, contract and node after
//! which shadow code is inserted.

use serde::Serialize;
use tracing::debug;

use crate::ast::{AstBatch, NodeId, SourceSpan};
use crate::error::ResolveError;

/// Caller hints narrowing where shadow code goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionHint {
    pub path: Option<String>,
    pub contract_name: Option<String>,
}

impl InjectionHint {
    pub fn new(path: Option<String>, contract_name: Option<String>) -> Self {
        Self {
            path,
            contract_name,
        }
    }
}

/// A resolved injection point. Holds no borrow of the batch it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionTarget {
    pub path: String,
    pub contract_name: String,
    pub contract_id: NodeId,
    /// Last member of the contract body; shadow code goes right after it.
    pub injection_node: NodeId,
    /// Span of the injection node in the text the batch was parsed from.
    pub injection_span: SourceSpan,
}

/// Resolves exactly one injection target in `batch`.
///
/// # Arguments
///
/// * `batch` - Every source unit of the compilation
/// * `hint` - Optional file path and contract name
///
/// # Returns
///
/// The target, or the reason no single target could be chosen
pub fn resolve(batch: &AstBatch, hint: &InjectionHint) -> Result<InjectionTarget, ResolveError> {
    if batch.is_empty() {
        return Err(ResolveError::NoSources);
    }

    let unit = match &hint.path {
        Some(path) => batch.get(path).ok_or_else(|| ResolveError::PathNotFound {
            path: path.clone(),
            available: batch.paths(),
        })?,
        None => match batch.units() {
            [only] => only,
            _ => {
                return Err(ResolveError::PathRequired {
                    available: batch.paths(),
                })
            }
        },
    };
    let path = unit.absolute_path().to_string();

    let contracts = unit.contracts();
    if contracts.is_empty() {
        return Err(ResolveError::NoContracts { path });
    }
    let contract = match &hint.contract_name {
        Some(name) => contracts
            .iter()
            .find(|contract| contract.name() == name)
            .copied()
            .ok_or_else(|| ResolveError::ContractNotFound {
                path: path.clone(),
                name: name.clone(),
            })?,
        None => match contracts.as_slice() {
            [only] => *only,
            _ => {
                return Err(ResolveError::AmbiguousContract {
                    path,
                    candidates: contracts
                        .iter()
                        .map(|contract| contract.name().to_string())
                        .collect(),
                })
            }
        },
    };
    debug!("Using contract {} in {} to inject shadow code", contract.name(), path);

    let injection = contract
        .last_member()
        .ok_or_else(|| ResolveError::NoInjectionPoint {
            path: path.clone(),
            contract: contract.name().to_string(),
        })?;

    Ok(InjectionTarget {
        contract_name: contract.name().to_string(),
        contract_id: contract.id(),
        injection_node: injection.id,
        injection_span: injection.span,
        path,
    })
}
