//! Visibility and virtual-ness rewrites applied before shadow code is merged.

use tracing::{debug, trace};

use crate::ast::{AstNode, ContractKind, NodeKind, SourceUnit, Visibility};

/// Which rewrites [`instrument`] applies, and to which contracts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentationOptions {
    /// Private and internal functions become public.
    pub expose_internal_functions: bool,
    /// Non-public state variables become public.
    pub expose_internal_variables: bool,
    /// Functions that can be overridden are marked `virtual`. Library
    /// functions and functions left private are skipped.
    pub mark_functions_as_virtual: bool,
    /// Restricts the rewrites to the contract with this name.
    pub contract_filter: Option<String>,
}

/// Returns a copy of `unit` with the requested rewrites applied.
///
/// Only nodes that change are reallocated; every other node is shared with
/// the input. Ids and spans are preserved.
pub fn instrument(unit: &SourceUnit, options: &InstrumentationOptions) -> SourceUnit {
    let mut replacements: Vec<AstNode> = Vec::new();

    for contract in unit.contracts() {
        if let Some(filter) = &options.contract_filter {
            if contract.name() != filter {
                continue;
            }
        }

        for (node, function) in contract.functions() {
            let mut patched = function.clone();
            if options.expose_internal_functions
                && matches!(function.visibility, Visibility::Private | Visibility::Internal)
            {
                trace!(
                    "{}: {}.{} {} -> public",
                    unit.absolute_path(),
                    contract.name(),
                    function.name,
                    function.visibility.as_str()
                );
                patched.visibility = Visibility::Public;
            }
            // Library members and private functions cannot be virtual.
            if options.mark_functions_as_virtual
                && !function.is_virtual
                && function.kind.is_overridable()
                && contract.kind() != ContractKind::Library
                && patched.visibility != Visibility::Private
            {
                trace!(
                    "{}: {}.{} marked virtual",
                    unit.absolute_path(),
                    contract.name(),
                    function.name
                );
                patched.is_virtual = true;
            }
            if &patched != function {
                replacements.push(AstNode {
                    kind: NodeKind::FunctionDefinition(patched),
                    ..node.clone()
                });
            }
        }

        if options.expose_internal_variables {
            for (node, variable) in contract.state_variables() {
                if variable.visibility == Visibility::Public {
                    continue;
                }
                trace!(
                    "{}: {}.{} {} -> public",
                    unit.absolute_path(),
                    contract.name(),
                    variable.name,
                    variable.visibility.as_str()
                );
                let mut patched = variable.clone();
                patched.visibility = Visibility::Public;
                replacements.push(AstNode {
                    kind: NodeKind::VariableDeclaration(patched),
                    ..node.clone()
                });
            }
        }
    }

    debug!(
        "Instrumented {}: {} node(s) rewritten",
        unit.absolute_path(),
        replacements.len()
    );
    unit.patched(replacements)
}
