//! Conversion of compiler JSON ASTs into the typed arena graph.
//!
//! Accepts the compact JSON AST the compiler emits per source (`nodeType`,
//! `id`, `src` on every node), either bare or wrapped in the compiler's
//! `{ "id": n, "ast": {...} }` source entry.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use tracing::debug;

use foundry_compilers::artifacts::ast::SourceLocation;

use super::{
    AssemblyBody, AstBatch, AstNode, ContractDefinition, ContractKind, FunctionDefinition,
    FunctionKind, ImportDirective, InlineAssembly, Literal, LiteralKind, Mutability, NodeId,
    NodeKind, SourceSpan, SourceUnit, StateMutability, StorageLocation, SymbolAlias,
    UsingFunction, VariableDeclaration, Visibility, YulCase, YulExpression, YulLiteral,
    YulLiteralKind, YulStatement,
};
use crate::error::AstError;

type Convert<T> = Result<T, String>;

const UNIT_MEMBERS: &[&str] = &[
    "PragmaDirective",
    "ImportDirective",
    "ContractDefinition",
    "FunctionDefinition",
    "StructDefinition",
    "EnumDefinition",
    "ErrorDefinition",
    "EventDefinition",
    "UserDefinedValueTypeDefinition",
    "UsingForDirective",
    "VariableDeclaration",
];
const CONTRACT_MEMBERS: &[&str] = &[
    "FunctionDefinition",
    "ModifierDefinition",
    "VariableDeclaration",
    "EventDefinition",
    "ErrorDefinition",
    "StructDefinition",
    "EnumDefinition",
    "UserDefinedValueTypeDefinition",
    "UsingForDirective",
];
const INHERITANCE: &[&str] = &["InheritanceSpecifier"];
const PARAMETER_LIST: &[&str] = &["ParameterList"];
const BLOCK: &[&str] = &["Block"];
const DOCUMENTATION: &[&str] = &["StructuredDocumentation"];
const VARIABLE: &[&str] = &["VariableDeclaration"];
const MODIFIER_INVOCATION: &[&str] = &["ModifierInvocation"];
const OVERRIDE: &[&str] = &["OverrideSpecifier"];
const ENUM_VALUE: &[&str] = &["EnumValue"];
const ELEMENTARY_TYPE: &[&str] = &["ElementaryTypeName"];
const CATCH_CLAUSE: &[&str] = &["TryCatchClause"];

/// Converts one compiler AST per file into a linked [`AstBatch`].
///
/// Either every file converts or the whole call fails. Imports are resolved
/// against the paths of the batch once all units exist.
pub fn ingest(raw: &BTreeMap<String, Value>) -> Result<AstBatch, AstError> {
    let files: Vec<String> = raw.keys().cloned().collect();
    debug!("Parsing {} source file(s) into AST nodes", files.len());

    let entries: Vec<(&String, Option<&Value>)> = raw
        .iter()
        .map(|(path, value)| (path, unwrap_source_entry(value)))
        .collect();
    if !entries.is_empty() && entries.iter().all(|(_, ast)| ast.is_none()) {
        return Err(AstError::EmptyResult { files });
    }

    let mut seen = HashSet::new();
    let mut units = Vec::with_capacity(entries.len());
    for (path, ast) in entries {
        let ast = ast.ok_or_else(|| AstError::parse_failed("source entry has no AST", path))?;
        let unit = UnitBuilder::new(&mut seen)
            .build(path, ast)
            .map_err(|cause| AstError::parse_failed(cause, path))?;
        units.push(unit);
    }

    let paths: Vec<String> = units
        .iter()
        .map(|unit| unit.absolute_path().to_string())
        .collect();
    for unit in &mut units {
        unit.resolve_imports(&paths);
    }

    debug!("Parsed {} source unit(s) from sources", units.len());
    Ok(AstBatch::new(units))
}

/// Ingests the `sources` section of a compiler standard-JSON output.
pub fn ingest_compiler_output(output: &Value) -> Result<AstBatch, AstError> {
    let sources = output
        .get("sources")
        .and_then(Value::as_object)
        .ok_or_else(|| AstError::ParseFailed {
            cause: "compiler output has no `sources` object".to_string(),
            files: Vec::new(),
        })?;
    let raw: BTreeMap<String, Value> = sources
        .iter()
        .map(|(path, entry)| (path.clone(), entry.clone()))
        .collect();
    ingest(&raw)
}

fn unwrap_source_entry(value: &Value) -> Option<&Value> {
    if value.get("nodeType").is_some() {
        return Some(value);
    }
    value.get("ast").filter(|ast| !ast.is_null())
}

#[derive(Clone, Copy)]
enum Expect {
    Any,
    OneOf(&'static [&'static str]),
}

impl Expect {
    fn check(self, value: &Value, key: &str) -> Convert<()> {
        let found = node_type(value)?;
        match self {
            Expect::OneOf(kinds) if !kinds.contains(&found) => Err(format!(
                "expected one of {:?} for `{}`, found {}",
                kinds, key, found
            )),
            _ => Ok(()),
        }
    }
}

/// Children collected while converting one node.
struct Scope {
    id: NodeId,
    node_type: String,
    children: Vec<NodeId>,
}

struct UnitBuilder<'a> {
    seen: &'a mut HashSet<NodeId>,
    nodes: Vec<AstNode>,
}

impl<'a> UnitBuilder<'a> {
    fn new(seen: &'a mut HashSet<NodeId>) -> Self {
        Self {
            seen,
            nodes: Vec::new(),
        }
    }

    fn build(mut self, path: &str, ast: &Value) -> Convert<SourceUnit> {
        let found = node_type(ast)?;
        if found != "SourceUnit" {
            return Err(format!("expected SourceUnit at the root, found {}", found));
        }
        if let Some(declared) = ast.get("absolutePath").and_then(Value::as_str) {
            if declared != path {
                debug!("Source {} declares absolutePath {}, keying it by {}", path, declared, path);
            }
        }
        let root = self.convert(ast, None)?;
        let license = opt_str(ast, "license");
        Ok(SourceUnit::from_nodes(path.to_string(), license, root, self.nodes))
    }

    fn convert(&mut self, value: &Value, parent: Option<NodeId>) -> Convert<NodeId> {
        let id = node_id(value)?;
        if !self.seen.insert(id) {
            return Err(format!("duplicate node id {}", id));
        }
        let span = source_span(value)?;
        let mut scope = Scope {
            id,
            node_type: node_type(value)?.to_string(),
            children: Vec::new(),
        };
        let kind = self.convert_kind(&mut scope, value)?;
        self.nodes.push(AstNode {
            id,
            span,
            parent,
            children: scope.children,
            kind,
        });
        Ok(id)
    }

    fn convert_kind(&mut self, scope: &mut Scope, value: &Value) -> Convert<NodeKind> {
        let kind = match scope.node_type.as_str() {
            "SourceUnit" => NodeKind::SourceUnit {
                nodes: self.child_list(scope, value, "nodes", Expect::OneOf(UNIT_MEMBERS))?,
            },
            "PragmaDirective" => NodeKind::PragmaDirective {
                literals: string_list(value, "literals"),
            },
            "ImportDirective" => NodeKind::ImportDirective(ImportDirective {
                file: str_field(value, "file")?.to_string(),
                absolute_path: opt_str(value, "absolutePath"),
                unit_alias: opt_str(value, "unitAlias").filter(|alias| !alias.is_empty()),
                symbol_aliases: symbol_aliases(value),
                resolved: None,
            }),
            "ContractDefinition" => {
                let documentation = self.documentation(scope, value)?;
                let base_contracts =
                    self.child_list(scope, value, "baseContracts", Expect::OneOf(INHERITANCE))?;
                let members = self.child_list(scope, value, "nodes", Expect::OneOf(CONTRACT_MEMBERS))?;
                NodeKind::ContractDefinition(ContractDefinition {
                    name: str_field(value, "name")?.to_string(),
                    kind: parse_field(value, "contractKind", ContractKind::parse)?,
                    is_abstract: bool_field(value, "abstract"),
                    documentation,
                    base_contracts,
                    members,
                    linearized_base_contracts: value
                        .get("linearizedBaseContracts")
                        .and_then(Value::as_array)
                        .map(|ids| ids.iter().filter_map(Value::as_i64).map(NodeId).collect())
                        .unwrap_or_default(),
                })
            }
            "InheritanceSpecifier" => NodeKind::InheritanceSpecifier {
                base_name: value
                    .get("baseName")
                    .and_then(path_name)
                    .ok_or("InheritanceSpecifier has no base name")?,
                arguments: self.opt_child_list(scope, value, "arguments", Expect::Any)?,
            },
            "FunctionDefinition" => {
                let documentation = self.documentation(scope, value)?;
                let overrides = self.opt_child(scope, value, "overrides", Expect::OneOf(OVERRIDE))?;
                let parameters = self.child(scope, value, "parameters", Expect::OneOf(PARAMETER_LIST))?;
                let return_parameters =
                    self.child(scope, value, "returnParameters", Expect::OneOf(PARAMETER_LIST))?;
                let modifiers =
                    self.child_list(scope, value, "modifiers", Expect::OneOf(MODIFIER_INVOCATION))?;
                let body = self.opt_child(scope, value, "body", Expect::OneOf(BLOCK))?;
                NodeKind::FunctionDefinition(FunctionDefinition {
                    name: opt_str(value, "name").unwrap_or_default(),
                    kind: parse_field(value, "kind", FunctionKind::parse)?,
                    visibility: parse_field(value, "visibility", Visibility::parse)?,
                    state_mutability: parse_field(value, "stateMutability", StateMutability::parse)?,
                    is_virtual: bool_field(value, "virtual"),
                    documentation,
                    overrides,
                    parameters,
                    return_parameters,
                    modifiers,
                    body,
                })
            }
            "ModifierDefinition" => {
                let documentation = self.documentation(scope, value)?;
                let overrides = self.opt_child(scope, value, "overrides", Expect::OneOf(OVERRIDE))?;
                let parameters = self.child(scope, value, "parameters", Expect::OneOf(PARAMETER_LIST))?;
                let body = self.opt_child(scope, value, "body", Expect::OneOf(BLOCK))?;
                NodeKind::ModifierDefinition {
                    name: str_field(value, "name")?.to_string(),
                    is_virtual: bool_field(value, "virtual"),
                    documentation,
                    overrides,
                    parameters,
                    body,
                }
            }
            "ModifierInvocation" => NodeKind::ModifierInvocation {
                name: value
                    .get("modifierName")
                    .and_then(path_name)
                    .ok_or("ModifierInvocation has no modifier name")?,
                arguments: self.opt_child_list(scope, value, "arguments", Expect::Any)?,
            },
            "OverrideSpecifier" => NodeKind::OverrideSpecifier {
                overrides: value
                    .get("overrides")
                    .and_then(Value::as_array)
                    .map(|paths| paths.iter().filter_map(path_name).collect())
                    .unwrap_or_default(),
            },
            "VariableDeclaration" => {
                let documentation = self.documentation(scope, value)?;
                let type_name = self.opt_child(scope, value, "typeName", Expect::Any)?;
                let overrides = self.opt_child(scope, value, "overrides", Expect::OneOf(OVERRIDE))?;
                let initial = self.opt_child(scope, value, "value", Expect::Any)?;
                NodeKind::VariableDeclaration(VariableDeclaration {
                    name: opt_str(value, "name").unwrap_or_default(),
                    type_name,
                    visibility: value
                        .get("visibility")
                        .and_then(Value::as_str)
                        .and_then(Visibility::parse)
                        .unwrap_or(Visibility::Internal),
                    mutability: variable_mutability(value),
                    is_state_variable: bool_field(value, "stateVariable"),
                    storage_location: value
                        .get("storageLocation")
                        .and_then(Value::as_str)
                        .and_then(StorageLocation::parse)
                        .unwrap_or(StorageLocation::Default),
                    indexed: bool_field(value, "indexed"),
                    documentation,
                    overrides,
                    value: initial,
                })
            }
            "ParameterList" => NodeKind::ParameterList {
                parameters: self.child_list(scope, value, "parameters", Expect::OneOf(VARIABLE))?,
            },
            "EventDefinition" => {
                let documentation = self.documentation(scope, value)?;
                NodeKind::EventDefinition {
                    name: str_field(value, "name")?.to_string(),
                    anonymous: bool_field(value, "anonymous"),
                    documentation,
                    parameters: self.child(scope, value, "parameters", Expect::OneOf(PARAMETER_LIST))?,
                }
            }
            "ErrorDefinition" => {
                let documentation = self.documentation(scope, value)?;
                NodeKind::ErrorDefinition {
                    name: str_field(value, "name")?.to_string(),
                    documentation,
                    parameters: self.child(scope, value, "parameters", Expect::OneOf(PARAMETER_LIST))?,
                }
            }
            "StructDefinition" => NodeKind::StructDefinition {
                name: str_field(value, "name")?.to_string(),
                members: self.child_list(scope, value, "members", Expect::OneOf(VARIABLE))?,
            },
            "EnumDefinition" => NodeKind::EnumDefinition {
                name: str_field(value, "name")?.to_string(),
                members: self.child_list(scope, value, "members", Expect::OneOf(ENUM_VALUE))?,
            },
            "EnumValue" => NodeKind::EnumValue {
                name: str_field(value, "name")?.to_string(),
            },
            "UserDefinedValueTypeDefinition" => NodeKind::UserDefinedValueTypeDefinition {
                name: str_field(value, "name")?.to_string(),
                underlying_type: self.child(scope, value, "underlyingType", Expect::Any)?,
            },
            "UsingForDirective" => {
                let library_name = value.get("libraryName").and_then(path_name);
                let functions = using_functions(value);
                if library_name.is_none() && functions.is_empty() {
                    return Err(format!(
                        "UsingForDirective {} has neither a library nor a function list",
                        scope.id
                    ));
                }
                NodeKind::UsingForDirective {
                    library_name,
                    functions,
                    type_name: self.opt_child(scope, value, "typeName", Expect::Any)?,
                    global: bool_field(value, "global"),
                }
            }
            "StructuredDocumentation" => NodeKind::StructuredDocumentation {
                text: str_field(value, "text")?.to_string(),
            },

            "ElementaryTypeName" => NodeKind::ElementaryTypeName {
                name: str_field(value, "name")?.to_string(),
                payable: value.get("stateMutability").and_then(Value::as_str) == Some("payable"),
            },
            "UserDefinedTypeName" => NodeKind::UserDefinedTypeName {
                name: path_name(value).ok_or("UserDefinedTypeName has no name")?,
            },
            "Mapping" => NodeKind::Mapping {
                key_type: self.child(scope, value, "keyType", Expect::Any)?,
                value_type: self.child(scope, value, "valueType", Expect::Any)?,
            },
            "ArrayTypeName" => NodeKind::ArrayTypeName {
                base_type: self.child(scope, value, "baseType", Expect::Any)?,
                length: self.opt_child(scope, value, "length", Expect::Any)?,
            },
            "FunctionTypeName" => NodeKind::FunctionTypeName {
                visibility: parse_field(value, "visibility", Visibility::parse)?,
                state_mutability: parse_field(value, "stateMutability", StateMutability::parse)?,
                parameter_types: self.child(
                    scope,
                    value,
                    "parameterTypes",
                    Expect::OneOf(PARAMETER_LIST),
                )?,
                return_parameter_types: self.child(
                    scope,
                    value,
                    "returnParameterTypes",
                    Expect::OneOf(PARAMETER_LIST),
                )?,
            },

            "Block" | "UncheckedBlock" => NodeKind::Block {
                statements: self.child_list(scope, value, "statements", Expect::Any)?,
                unchecked: scope.node_type == "UncheckedBlock",
            },
            "ExpressionStatement" => NodeKind::ExpressionStatement {
                expression: self.child(scope, value, "expression", Expect::Any)?,
            },
            "VariableDeclarationStatement" => NodeKind::VariableDeclarationStatement {
                declarations: self.nullable_child_list(
                    scope,
                    value,
                    "declarations",
                    Expect::OneOf(VARIABLE),
                )?,
                initial_value: self.opt_child(scope, value, "initialValue", Expect::Any)?,
            },
            "Return" => NodeKind::Return {
                expression: self.opt_child(scope, value, "expression", Expect::Any)?,
            },
            "IfStatement" => NodeKind::IfStatement {
                condition: self.child(scope, value, "condition", Expect::Any)?,
                true_body: self.child(scope, value, "trueBody", Expect::Any)?,
                false_body: self.opt_child(scope, value, "falseBody", Expect::Any)?,
            },
            "ForStatement" => NodeKind::ForStatement {
                initialization: self.opt_child(scope, value, "initializationExpression", Expect::Any)?,
                condition: self.opt_child(scope, value, "condition", Expect::Any)?,
                loop_expression: self.opt_child(scope, value, "loopExpression", Expect::Any)?,
                body: self.child(scope, value, "body", Expect::Any)?,
            },
            "WhileStatement" | "DoWhileStatement" => {
                let do_while = scope.node_type == "DoWhileStatement";
                // Source order: `do body while (cond)` versus `while (cond) body`.
                let (condition, body) = if do_while {
                    let body = self.child(scope, value, "body", Expect::Any)?;
                    (self.child(scope, value, "condition", Expect::Any)?, body)
                } else {
                    let condition = self.child(scope, value, "condition", Expect::Any)?;
                    (condition, self.child(scope, value, "body", Expect::Any)?)
                };
                NodeKind::WhileStatement {
                    condition,
                    body,
                    do_while,
                }
            }
            "EmitStatement" => NodeKind::EmitStatement {
                event_call: self.child(scope, value, "eventCall", Expect::Any)?,
            },
            "RevertStatement" => NodeKind::RevertStatement {
                error_call: self.child(scope, value, "errorCall", Expect::Any)?,
            },
            "TryStatement" => NodeKind::TryStatement {
                external_call: self.child(scope, value, "externalCall", Expect::Any)?,
                clauses: self.child_list(scope, value, "clauses", Expect::OneOf(CATCH_CLAUSE))?,
            },
            "TryCatchClause" => NodeKind::TryCatchClause {
                error_name: opt_str(value, "errorName").unwrap_or_default(),
                parameters: self.opt_child(scope, value, "parameters", Expect::OneOf(PARAMETER_LIST))?,
                block: self.child(scope, value, "block", Expect::OneOf(BLOCK))?,
            },
            "InlineAssembly" => NodeKind::InlineAssembly(inline_assembly(value)?),
            "Break" => NodeKind::Break,
            "Continue" => NodeKind::Continue,
            "PlaceholderStatement" => NodeKind::PlaceholderStatement,

            "Identifier" | "IdentifierPath" => NodeKind::Identifier {
                name: str_field(value, "name")?.to_string(),
            },
            "Literal" => NodeKind::Literal(Literal {
                kind: parse_field(value, "kind", LiteralKind::parse)?,
                value: opt_str(value, "value"),
                hex_value: opt_str(value, "hexValue").unwrap_or_default(),
                subdenomination: opt_str(value, "subdenomination"),
            }),
            "UnaryOperation" => NodeKind::UnaryOperation {
                operator: str_field(value, "operator")?.to_string(),
                prefix: bool_field(value, "prefix"),
                operand: self.child(scope, value, "subExpression", Expect::Any)?,
            },
            "BinaryOperation" => NodeKind::BinaryOperation {
                operator: str_field(value, "operator")?.to_string(),
                left: self.child(scope, value, "leftExpression", Expect::Any)?,
                right: self.child(scope, value, "rightExpression", Expect::Any)?,
            },
            "Assignment" => NodeKind::Assignment {
                operator: str_field(value, "operator")?.to_string(),
                left: self.child(scope, value, "leftHandSide", Expect::Any)?,
                right: self.child(scope, value, "rightHandSide", Expect::Any)?,
            },
            "Conditional" => NodeKind::Conditional {
                condition: self.child(scope, value, "condition", Expect::Any)?,
                true_expression: self.child(scope, value, "trueExpression", Expect::Any)?,
                false_expression: self.child(scope, value, "falseExpression", Expect::Any)?,
            },
            "FunctionCall" => NodeKind::FunctionCall {
                expression: self.child(scope, value, "expression", Expect::Any)?,
                arguments: self.child_list(scope, value, "arguments", Expect::Any)?,
                names: string_list(value, "names"),
            },
            "FunctionCallOptions" => NodeKind::FunctionCallOptions {
                expression: self.child(scope, value, "expression", Expect::Any)?,
                names: string_list(value, "names"),
                options: self.child_list(scope, value, "options", Expect::Any)?,
            },
            "MemberAccess" => NodeKind::MemberAccess {
                expression: self.child(scope, value, "expression", Expect::Any)?,
                member_name: str_field(value, "memberName")?.to_string(),
            },
            "IndexAccess" => NodeKind::IndexAccess {
                base: self.child(scope, value, "baseExpression", Expect::Any)?,
                index: self.opt_child(scope, value, "indexExpression", Expect::Any)?,
            },
            "IndexRangeAccess" => NodeKind::IndexRangeAccess {
                base: self.child(scope, value, "baseExpression", Expect::Any)?,
                start: self.opt_child(scope, value, "startExpression", Expect::Any)?,
                end: self.opt_child(scope, value, "endExpression", Expect::Any)?,
            },
            "TupleExpression" => NodeKind::TupleExpression {
                components: self.nullable_child_list(scope, value, "components", Expect::Any)?,
                inline_array: bool_field(value, "isInlineArray"),
            },
            "ElementaryTypeNameExpression" => NodeKind::ElementaryTypeNameExpression {
                type_name: self.child(scope, value, "typeName", Expect::OneOf(ELEMENTARY_TYPE))?,
            },
            "NewExpression" => NodeKind::NewExpression {
                type_name: self.child(scope, value, "typeName", Expect::Any)?,
            },

            other => NodeKind::Opaque {
                node_type: other.to_string(),
            },
        };
        Ok(kind)
    }

    fn adopt(&mut self, scope: &mut Scope, child: &Value, key: &str, expect: Expect) -> Convert<NodeId> {
        expect.check(child, key)?;
        let id = self.convert(child, Some(scope.id))?;
        scope.children.push(id);
        Ok(id)
    }

    fn child(&mut self, scope: &mut Scope, value: &Value, key: &str, expect: Expect) -> Convert<NodeId> {
        match value.get(key) {
            None | Some(Value::Null) => Err(format!(
                "{} {} is missing `{}`",
                scope.node_type, scope.id, key
            )),
            Some(child) => self.adopt(scope, child, key, expect),
        }
    }

    fn opt_child(
        &mut self,
        scope: &mut Scope,
        value: &Value,
        key: &str,
        expect: Expect,
    ) -> Convert<Option<NodeId>> {
        match value.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(child) => self.adopt(scope, child, key, expect).map(Some),
        }
    }

    fn child_list(
        &mut self,
        scope: &mut Scope,
        value: &Value,
        key: &str,
        expect: Expect,
    ) -> Convert<Vec<NodeId>> {
        Ok(self.opt_child_list(scope, value, key, expect)?.unwrap_or_default())
    }

    fn opt_child_list(
        &mut self,
        scope: &mut Scope,
        value: &Value,
        key: &str,
        expect: Expect,
    ) -> Convert<Option<Vec<NodeId>>> {
        match value.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| self.adopt(scope, item, key, expect))
                .collect::<Convert<Vec<_>>>()
                .map(Some),
            Some(_) => Err(format!(
                "`{}` of {} {} must be an array",
                key, scope.node_type, scope.id
            )),
        }
    }

    fn nullable_child_list(
        &mut self,
        scope: &mut Scope,
        value: &Value,
        key: &str,
        expect: Expect,
    ) -> Convert<Vec<Option<NodeId>>> {
        let Some(items) = value.get(key).and_then(Value::as_array) else {
            return Ok(Vec::new());
        };
        items
            .iter()
            .map(|item| match item {
                Value::Null => Ok(None),
                item => self.adopt(scope, item, key, expect).map(Some),
            })
            .collect()
    }

    /// NatSpec node; older compilers emit documentation as a plain string,
    /// which carries no span and is dropped.
    fn documentation(&mut self, scope: &mut Scope, value: &Value) -> Convert<Option<NodeId>> {
        match value.get("documentation") {
            Some(doc) if doc.is_object() => self
                .adopt(scope, doc, "documentation", Expect::OneOf(DOCUMENTATION))
                .map(Some),
            _ => Ok(None),
        }
    }
}

fn node_type(value: &Value) -> Convert<&str> {
    value
        .get("nodeType")
        .and_then(Value::as_str)
        .ok_or_else(|| "node is missing `nodeType`".to_string())
}

fn node_id(value: &Value) -> Convert<NodeId> {
    value
        .get("id")
        .and_then(Value::as_i64)
        .map(NodeId)
        .ok_or_else(|| {
            format!(
                "{} node is missing an integer `id`",
                node_type(value).unwrap_or("untyped")
            )
        })
}

/// Parses the compiler's `offset:length:sourceIndex` location.
fn source_span(value: &Value) -> Convert<SourceSpan> {
    let src = value
        .get("src")
        .and_then(Value::as_str)
        .ok_or_else(|| format!("{} node has no `src`", node_type(value).unwrap_or("untyped")))?;
    parse_src(src).ok_or_else(|| format!("malformed source location `{}`", src))
}

/// Unknown positions (`-1`) have no span in any text.
fn parse_src(src: &str) -> Option<SourceSpan> {
    let location: SourceLocation = src.parse().ok()?;
    let offset = u32::try_from(location.start?).ok()?;
    let length = u32::try_from(location.length?).ok()?;
    Some(SourceSpan::new(offset, length))
}

fn str_field<'v>(value: &'v Value, key: &str) -> Convert<&'v str> {
    value.get(key).and_then(Value::as_str).ok_or_else(|| {
        format!(
            "{} node is missing string field `{}`",
            node_type(value).unwrap_or("untyped"),
            key
        )
    })
}

fn opt_str(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_field<T>(value: &Value, key: &str, parse: fn(&str) -> Option<T>) -> Convert<T> {
    let raw = str_field(value, key)?;
    parse(raw).ok_or_else(|| format!("unknown `{}` value `{}`", key, raw))
}

/// Name of an `IdentifierPath`, `Identifier` or `UserDefinedTypeName`.
fn path_name(value: &Value) -> Option<String> {
    value
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .or_else(|| {
            value
                .get("pathNode")
                .and_then(|path| path.get("name"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
}

fn symbol_aliases(value: &Value) -> Vec<SymbolAlias> {
    value
        .get("symbolAliases")
        .and_then(Value::as_array)
        .map(|aliases| {
            aliases
                .iter()
                .filter_map(|alias| {
                    let foreign = alias.get("foreign").and_then(path_name)?;
                    let local = alias.get("local").and_then(Value::as_str).map(str::to_string);
                    Some(SymbolAlias { foreign, local })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Entries of `functionList`, either `{function}` or `{definition, operator}`.
fn using_functions(value: &Value) -> Vec<UsingFunction> {
    value
        .get("functionList")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let name = entry
                        .get("function")
                        .or_else(|| entry.get("definition"))
                        .and_then(path_name)?;
                    let operator = opt_str(entry, "operator");
                    Some(UsingFunction { name, operator })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn inline_assembly(value: &Value) -> Convert<InlineAssembly> {
    let body = match (value.get("AST"), value.get("operations").and_then(Value::as_str)) {
        (Some(ast), _) if ast.is_object() => AssemblyBody::Yul(yul_block(ast)?),
        (_, Some(operations)) => AssemblyBody::Legacy(operations.to_string()),
        _ => return Err("InlineAssembly has neither `AST` nor `operations`".to_string()),
    };
    Ok(InlineAssembly {
        flags: string_list(value, "flags"),
        body,
    })
}

fn yul_block(value: &Value) -> Convert<Vec<YulStatement>> {
    let found = node_type(value)?;
    if found != "YulBlock" {
        return Err(format!("expected YulBlock, found {}", found));
    }
    yul_list(value, "statements", yul_statement)
}

fn yul_list<T>(value: &Value, key: &str, convert: fn(&Value) -> Convert<T>) -> Convert<Vec<T>> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(convert).collect(),
        Some(_) => Err(format!("`{}` of a Yul node must be an array", key)),
    }
}

fn yul_field<T>(value: &Value, key: &str, convert: fn(&Value) -> Convert<T>) -> Convert<T> {
    match value.get(key) {
        Some(child) if !child.is_null() => convert(child),
        _ => Err(format!(
            "{} is missing `{}`",
            node_type(value).unwrap_or("Yul node"),
            key
        )),
    }
}

fn yul_names(value: &Value, key: &str) -> Convert<Vec<String>> {
    yul_list(value, key, |item| Ok(str_field(item, "name")?.to_string()))
}

fn yul_statement(value: &Value) -> Convert<YulStatement> {
    let statement = match node_type(value)? {
        "YulBlock" => YulStatement::Block(yul_block(value)?),
        "YulVariableDeclaration" => YulStatement::VariableDeclaration {
            variables: yul_names(value, "variables")?,
            value: match value.get("value") {
                Some(expression) if !expression.is_null() => Some(yul_expression(expression)?),
                _ => None,
            },
        },
        "YulAssignment" => YulStatement::Assignment {
            variables: yul_names(value, "variableNames")?,
            value: yul_field(value, "value", yul_expression)?,
        },
        "YulExpressionStatement" => {
            YulStatement::Expression(yul_field(value, "expression", yul_expression)?)
        }
        "YulIf" => YulStatement::If {
            condition: yul_field(value, "condition", yul_expression)?,
            body: yul_field(value, "body", yul_block)?,
        },
        "YulSwitch" => YulStatement::Switch {
            expression: yul_field(value, "expression", yul_expression)?,
            cases: yul_list(value, "cases", yul_case)?,
        },
        "YulForLoop" => YulStatement::ForLoop {
            pre: yul_field(value, "pre", yul_block)?,
            condition: yul_field(value, "condition", yul_expression)?,
            post: yul_field(value, "post", yul_block)?,
            body: yul_field(value, "body", yul_block)?,
        },
        "YulFunctionDefinition" => YulStatement::FunctionDefinition {
            name: str_field(value, "name")?.to_string(),
            parameters: yul_names(value, "parameters")?,
            returns: yul_names(value, "returnVariables")?,
            body: yul_field(value, "body", yul_block)?,
        },
        "YulBreak" => YulStatement::Break,
        "YulContinue" => YulStatement::Continue,
        "YulLeave" => YulStatement::Leave,
        other => return Err(format!("unsupported Yul statement {}", other)),
    };
    Ok(statement)
}

fn yul_case(value: &Value) -> Convert<YulCase> {
    let case_value = match value.get("value") {
        Some(Value::String(default)) if default == "default" => None,
        Some(literal) if literal.is_object() => Some(yul_literal(literal)?),
        _ => return Err("YulCase has no value".to_string()),
    };
    Ok(YulCase {
        value: case_value,
        body: yul_field(value, "body", yul_block)?,
    })
}

fn yul_expression(value: &Value) -> Convert<YulExpression> {
    let expression = match node_type(value)? {
        "YulIdentifier" => YulExpression::Identifier(str_field(value, "name")?.to_string()),
        "YulLiteral" => YulExpression::Literal(yul_literal(value)?),
        "YulFunctionCall" => YulExpression::Call {
            function: yul_field(value, "functionName", |name| {
                Ok(str_field(name, "name")?.to_string())
            })?,
            arguments: yul_list(value, "arguments", yul_expression)?,
        },
        other => return Err(format!("unsupported Yul expression {}", other)),
    };
    Ok(expression)
}

fn yul_literal(value: &Value) -> Convert<YulLiteral> {
    Ok(YulLiteral {
        kind: parse_field(value, "kind", YulLiteralKind::parse)?,
        value: opt_str(value, "value"),
        hex_value: opt_str(value, "hexValue").filter(|hex| !hex.is_empty()),
    })
}

fn variable_mutability(value: &Value) -> Mutability {
    match value.get("mutability").and_then(Value::as_str) {
        Some("constant") => Mutability::Constant,
        Some("immutable") => Mutability::Immutable,
        Some(_) => Mutability::Mutable,
        None if bool_field(value, "constant") => Mutability::Constant,
        None => Mutability::Mutable,
    }
}
