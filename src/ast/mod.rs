//! Typed Solidity AST
//!
//! Nodes live in a per-file arena indexed by their compiler-assigned id.
//! Every node owns its children exclusively; cross-file links (imports) are
//! plain path keys resolved against the [`AstBatch`] they belong to.
//!
//! The arena holds `Arc`-shared nodes so that a transform can produce a new
//! [`SourceUnit`] by swapping only the nodes it changes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod ingest;
pub mod yul;

pub use ingest::{ingest, ingest_compiler_output};
pub use yul::{
    AssemblyBody, InlineAssembly, YulCase, YulExpression, YulLiteral, YulLiteralKind,
    YulStatement,
};

/// Compiler-assigned node identifier, unique within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Byte range of a node within one specific text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub offset: u32,
    pub length: u32,
}

impl SourceSpan {
    pub fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.offset as usize + self.length as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Internal,
    External,
}

impl Visibility {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            "internal" => Some(Self::Internal),
            "external" => Some(Self::External),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Internal => "internal",
            Self::External => "external",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pure" => Some(Self::Pure),
            "view" => Some(Self::View),
            "nonpayable" => Some(Self::NonPayable),
            "payable" => Some(Self::Payable),
            _ => None,
        }
    }

    /// Keyword as written in source; `None` for the implicit default.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::Pure => Some("pure"),
            Self::View => Some("view"),
            Self::Payable => Some("payable"),
            Self::NonPayable => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Contract,
    Library,
    Interface,
}

impl ContractKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "contract" => Some(Self::Contract),
            "library" => Some(Self::Library),
            "interface" => Some(Self::Interface),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Library => "library",
            Self::Interface => "interface",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Constructor,
    Fallback,
    Receive,
    FreeFunction,
}

impl FunctionKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "function" => Some(Self::Function),
            "constructor" => Some(Self::Constructor),
            "fallback" => Some(Self::Fallback),
            "receive" => Some(Self::Receive),
            "freeFunction" => Some(Self::FreeFunction),
            _ => None,
        }
    }

    /// Whether a function of this kind can be declared `virtual`.
    pub fn is_overridable(&self) -> bool {
        matches!(self, Self::Function | Self::Fallback | Self::Receive)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Mutable,
    Immutable,
    Constant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLocation {
    Default,
    Memory,
    Storage,
    Calldata,
}

impl StorageLocation {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(Self::Default),
            "memory" => Some(Self::Memory),
            "storage" => Some(Self::Storage),
            "calldata" => Some(Self::Calldata),
            _ => None,
        }
    }

    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::Memory => Some("memory"),
            Self::Storage => Some("storage"),
            Self::Calldata => Some("calldata"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    Bool,
    String,
    HexString,
    UnicodeString,
}

impl LiteralKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "number" => Some(Self::Number),
            "bool" => Some(Self::Bool),
            "string" => Some(Self::String),
            "hexString" => Some(Self::HexString),
            "unicodeString" => Some(Self::UnicodeString),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolAlias {
    pub foreign: String,
    pub local: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    /// Path as written in the import statement.
    pub file: String,
    /// Path as resolved by the compiler, when it reported one.
    pub absolute_path: Option<String>,
    pub unit_alias: Option<String>,
    pub symbol_aliases: Vec<SymbolAlias>,
    /// Absolute path of the imported unit, when it is part of the same batch.
    pub resolved: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDefinition {
    pub name: String,
    pub kind: ContractKind,
    pub is_abstract: bool,
    pub documentation: Option<NodeId>,
    pub base_contracts: Vec<NodeId>,
    /// Body members, in source order.
    pub members: Vec<NodeId>,
    pub linearized_base_contracts: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefinition {
    pub name: String,
    pub kind: FunctionKind,
    pub visibility: Visibility,
    pub state_mutability: StateMutability,
    pub is_virtual: bool,
    pub documentation: Option<NodeId>,
    pub overrides: Option<NodeId>,
    pub parameters: NodeId,
    pub return_parameters: NodeId,
    pub modifiers: Vec<NodeId>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    pub name: String,
    pub type_name: Option<NodeId>,
    pub visibility: Visibility,
    pub mutability: Mutability,
    pub is_state_variable: bool,
    pub storage_location: StorageLocation,
    pub indexed: bool,
    pub documentation: Option<NodeId>,
    pub overrides: Option<NodeId>,
    pub value: Option<NodeId>,
}

/// One entry of a `using {f, g as +} for T` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingFunction {
    pub name: String,
    /// User-defined operator bound to the function.
    pub operator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Decoded value; absent for string literals that are not valid UTF-8.
    pub value: Option<String>,
    pub hex_value: String,
    pub subdenomination: Option<String>,
}

/// Closed set of node kinds the pipeline understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    SourceUnit {
        nodes: Vec<NodeId>,
    },
    PragmaDirective {
        literals: Vec<String>,
    },
    ImportDirective(ImportDirective),
    ContractDefinition(ContractDefinition),
    InheritanceSpecifier {
        base_name: String,
        arguments: Option<Vec<NodeId>>,
    },
    FunctionDefinition(FunctionDefinition),
    ModifierDefinition {
        name: String,
        is_virtual: bool,
        documentation: Option<NodeId>,
        overrides: Option<NodeId>,
        parameters: NodeId,
        body: Option<NodeId>,
    },
    ModifierInvocation {
        name: String,
        arguments: Option<Vec<NodeId>>,
    },
    OverrideSpecifier {
        overrides: Vec<String>,
    },
    VariableDeclaration(VariableDeclaration),
    ParameterList {
        parameters: Vec<NodeId>,
    },
    EventDefinition {
        name: String,
        anonymous: bool,
        documentation: Option<NodeId>,
        parameters: NodeId,
    },
    ErrorDefinition {
        name: String,
        documentation: Option<NodeId>,
        parameters: NodeId,
    },
    StructDefinition {
        name: String,
        members: Vec<NodeId>,
    },
    EnumDefinition {
        name: String,
        members: Vec<NodeId>,
    },
    EnumValue {
        name: String,
    },
    UserDefinedValueTypeDefinition {
        name: String,
        underlying_type: NodeId,
    },
    /// `using L for T;` when `library_name` is set, `using {f, g} for T;` otherwise.
    UsingForDirective {
        library_name: Option<String>,
        functions: Vec<UsingFunction>,
        type_name: Option<NodeId>,
        global: bool,
    },
    StructuredDocumentation {
        text: String,
    },

    ElementaryTypeName {
        name: String,
        payable: bool,
    },
    UserDefinedTypeName {
        name: String,
    },
    Mapping {
        key_type: NodeId,
        value_type: NodeId,
    },
    ArrayTypeName {
        base_type: NodeId,
        length: Option<NodeId>,
    },
    FunctionTypeName {
        visibility: Visibility,
        state_mutability: StateMutability,
        parameter_types: NodeId,
        return_parameter_types: NodeId,
    },

    Block {
        statements: Vec<NodeId>,
        unchecked: bool,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    VariableDeclarationStatement {
        declarations: Vec<Option<NodeId>>,
        initial_value: Option<NodeId>,
    },
    Return {
        expression: Option<NodeId>,
    },
    IfStatement {
        condition: NodeId,
        true_body: NodeId,
        false_body: Option<NodeId>,
    },
    ForStatement {
        initialization: Option<NodeId>,
        condition: Option<NodeId>,
        loop_expression: Option<NodeId>,
        body: NodeId,
    },
    WhileStatement {
        condition: NodeId,
        body: NodeId,
        do_while: bool,
    },
    EmitStatement {
        event_call: NodeId,
    },
    RevertStatement {
        error_call: NodeId,
    },
    /// The first clause is the success clause, the rest are `catch` clauses.
    TryStatement {
        external_call: NodeId,
        clauses: Vec<NodeId>,
    },
    TryCatchClause {
        /// Empty for the success clause and for a bare `catch`.
        error_name: String,
        parameters: Option<NodeId>,
        block: NodeId,
    },
    InlineAssembly(InlineAssembly),
    Break,
    Continue,
    PlaceholderStatement,

    Identifier {
        name: String,
    },
    Literal(Literal),
    UnaryOperation {
        operator: String,
        prefix: bool,
        operand: NodeId,
    },
    BinaryOperation {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    Assignment {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    Conditional {
        condition: NodeId,
        true_expression: NodeId,
        false_expression: NodeId,
    },
    FunctionCall {
        expression: NodeId,
        arguments: Vec<NodeId>,
        names: Vec<String>,
    },
    FunctionCallOptions {
        expression: NodeId,
        names: Vec<String>,
        options: Vec<NodeId>,
    },
    MemberAccess {
        expression: NodeId,
        member_name: String,
    },
    IndexAccess {
        base: NodeId,
        index: Option<NodeId>,
    },
    IndexRangeAccess {
        base: NodeId,
        start: Option<NodeId>,
        end: Option<NodeId>,
    },
    TupleExpression {
        components: Vec<Option<NodeId>>,
        inline_array: bool,
    },
    ElementaryTypeNameExpression {
        type_name: NodeId,
    },
    NewExpression {
        type_name: NodeId,
    },

    /// A compiler node kind this model does not represent.
    Opaque {
        node_type: String,
    },
}

impl NodeKind {
    /// The compiler's `nodeType` tag for this kind.
    pub fn node_type(&self) -> &str {
        match self {
            Self::SourceUnit { .. } => "SourceUnit",
            Self::PragmaDirective { .. } => "PragmaDirective",
            Self::ImportDirective(_) => "ImportDirective",
            Self::ContractDefinition(_) => "ContractDefinition",
            Self::InheritanceSpecifier { .. } => "InheritanceSpecifier",
            Self::FunctionDefinition(_) => "FunctionDefinition",
            Self::ModifierDefinition { .. } => "ModifierDefinition",
            Self::ModifierInvocation { .. } => "ModifierInvocation",
            Self::OverrideSpecifier { .. } => "OverrideSpecifier",
            Self::VariableDeclaration(_) => "VariableDeclaration",
            Self::ParameterList { .. } => "ParameterList",
            Self::EventDefinition { .. } => "EventDefinition",
            Self::ErrorDefinition { .. } => "ErrorDefinition",
            Self::StructDefinition { .. } => "StructDefinition",
            Self::EnumDefinition { .. } => "EnumDefinition",
            Self::EnumValue { .. } => "EnumValue",
            Self::UserDefinedValueTypeDefinition { .. } => "UserDefinedValueTypeDefinition",
            Self::UsingForDirective { .. } => "UsingForDirective",
            Self::StructuredDocumentation { .. } => "StructuredDocumentation",
            Self::ElementaryTypeName { .. } => "ElementaryTypeName",
            Self::UserDefinedTypeName { .. } => "UserDefinedTypeName",
            Self::Mapping { .. } => "Mapping",
            Self::ArrayTypeName { .. } => "ArrayTypeName",
            Self::FunctionTypeName { .. } => "FunctionTypeName",
            Self::Block { unchecked: true, .. } => "UncheckedBlock",
            Self::Block { .. } => "Block",
            Self::ExpressionStatement { .. } => "ExpressionStatement",
            Self::VariableDeclarationStatement { .. } => "VariableDeclarationStatement",
            Self::Return { .. } => "Return",
            Self::IfStatement { .. } => "IfStatement",
            Self::ForStatement { .. } => "ForStatement",
            Self::WhileStatement { do_while: true, .. } => "DoWhileStatement",
            Self::WhileStatement { .. } => "WhileStatement",
            Self::EmitStatement { .. } => "EmitStatement",
            Self::RevertStatement { .. } => "RevertStatement",
            Self::TryStatement { .. } => "TryStatement",
            Self::TryCatchClause { .. } => "TryCatchClause",
            Self::InlineAssembly(_) => "InlineAssembly",
            Self::Break => "Break",
            Self::Continue => "Continue",
            Self::PlaceholderStatement => "PlaceholderStatement",
            Self::Identifier { .. } => "Identifier",
            Self::Literal(_) => "Literal",
            Self::UnaryOperation { .. } => "UnaryOperation",
            Self::BinaryOperation { .. } => "BinaryOperation",
            Self::Assignment { .. } => "Assignment",
            Self::Conditional { .. } => "Conditional",
            Self::FunctionCall { .. } => "FunctionCall",
            Self::FunctionCallOptions { .. } => "FunctionCallOptions",
            Self::MemberAccess { .. } => "MemberAccess",
            Self::IndexAccess { .. } => "IndexAccess",
            Self::IndexRangeAccess { .. } => "IndexRangeAccess",
            Self::TupleExpression { .. } => "TupleExpression",
            Self::ElementaryTypeNameExpression { .. } => "ElementaryTypeNameExpression",
            Self::NewExpression { .. } => "NewExpression",
            Self::Opaque { node_type } => node_type,
        }
    }

    /// NatSpec documentation attached to a declaration, if any.
    pub fn documentation(&self) -> Option<NodeId> {
        match self {
            Self::ContractDefinition(contract) => contract.documentation,
            Self::FunctionDefinition(function) => function.documentation,
            Self::VariableDeclaration(variable) => variable.documentation,
            Self::ModifierDefinition { documentation, .. }
            | Self::EventDefinition { documentation, .. }
            | Self::ErrorDefinition { documentation, .. } => *documentation,
            _ => None,
        }
    }
}

/// A node of the typed AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub id: NodeId,
    /// Span in the text this node was parsed from.
    pub span: SourceSpan,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl AstNode {
    pub fn as_contract(&self) -> Option<&ContractDefinition> {
        match &self.kind {
            NodeKind::ContractDefinition(contract) => Some(contract),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDefinition> {
        match &self.kind {
            NodeKind::FunctionDefinition(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableDeclaration> {
        match &self.kind {
            NodeKind::VariableDeclaration(variable) => Some(variable),
            _ => None,
        }
    }

    pub fn as_import(&self) -> Option<&ImportDirective> {
        match &self.kind {
            NodeKind::ImportDirective(import) => Some(import),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Arena {
    slots: Vec<Arc<AstNode>>,
    index: Arc<HashMap<NodeId, usize>>,
}

impl Arena {
    fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.index.get(&id).map(|&slot| self.slots[slot].as_ref())
    }

    fn shares(&self, other: &Arena, id: NodeId) -> bool {
        match (self.index.get(&id), other.index.get(&id)) {
            (Some(&a), Some(&b)) => Arc::ptr_eq(&self.slots[a], &other.slots[b]),
            _ => false,
        }
    }
}

/// The root of one source file, owning every node parsed from it.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    absolute_path: String,
    license: Option<String>,
    root: NodeId,
    arena: Arena,
}

impl SourceUnit {
    pub(crate) fn from_nodes(
        absolute_path: String,
        license: Option<String>,
        root: NodeId,
        nodes: Vec<AstNode>,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id, slot))
            .collect();
        Self {
            absolute_path,
            license,
            root,
            arena: Arena {
                slots: nodes.into_iter().map(Arc::new).collect(),
                index: Arc::new(index),
            },
        }
    }

    pub fn absolute_path(&self) -> &str {
        &self.absolute_path
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn root(&self) -> &AstNode {
        self.arena
            .get(self.root)
            .unwrap_or_else(|| unreachable!("source unit root {} is always in its arena", self.root))
    }

    pub fn node(&self, id: NodeId) -> Option<&AstNode> {
        self.arena.get(id)
    }

    pub fn len(&self) -> usize {
        self.arena.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.slots.is_empty()
    }

    /// All nodes of the unit, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &AstNode> {
        self.arena.slots.iter().map(|node| node.as_ref())
    }

    /// Last child of any node, whatever its kind.
    pub fn last_child(&self, id: NodeId) -> Option<&AstNode> {
        self.node(id)?
            .children
            .last()
            .and_then(|child| self.node(*child))
    }

    /// Top-level contracts, interfaces and libraries in source order.
    pub fn contracts(&self) -> Vec<ContractView<'_>> {
        let NodeKind::SourceUnit { nodes } = &self.root().kind else {
            return Vec::new();
        };
        nodes
            .iter()
            .filter_map(|id| self.node(*id))
            .filter_map(|node| {
                node.as_contract().map(|definition| ContractView {
                    unit: self,
                    node,
                    definition,
                })
            })
            .collect()
    }

    pub fn contract(&self, name: &str) -> Option<ContractView<'_>> {
        self.contracts()
            .into_iter()
            .find(|contract| contract.name() == name)
    }

    pub fn imports(&self) -> Vec<&ImportDirective> {
        let NodeKind::SourceUnit { nodes } = &self.root().kind else {
            return Vec::new();
        };
        nodes
            .iter()
            .filter_map(|id| self.node(*id))
            .filter_map(AstNode::as_import)
            .collect()
    }

    /// Returns a new unit in which the given nodes replace the ones with the
    /// same id. Every other node is shared with `self`.
    pub(crate) fn patched(&self, replacements: Vec<AstNode>) -> SourceUnit {
        let mut slots = self.arena.slots.clone();
        for node in replacements {
            if let Some(&slot) = self.arena.index.get(&node.id) {
                slots[slot] = Arc::new(node);
            }
        }
        SourceUnit {
            absolute_path: self.absolute_path.clone(),
            license: self.license.clone(),
            root: self.root,
            arena: Arena {
                slots,
                index: Arc::clone(&self.arena.index),
            },
        }
    }

    /// Whether `self` and `other` hold the very same allocation for a node.
    pub fn shares_node(&self, other: &SourceUnit, id: NodeId) -> bool {
        self.arena.shares(&other.arena, id)
    }

    pub(crate) fn resolve_imports(&mut self, paths: &[String]) {
        let mut replacements = Vec::new();
        for node in self.nodes() {
            let Some(import) = node.as_import() else {
                continue;
            };
            let target = import.absolute_path.as_deref().unwrap_or(&import.file);
            let resolved = paths.iter().find(|path| path.as_str() == target).cloned();
            if resolved != import.resolved {
                let mut node = node.clone();
                if let NodeKind::ImportDirective(import) = &mut node.kind {
                    import.resolved = resolved;
                }
                replacements.push(node);
            }
        }
        if !replacements.is_empty() {
            *self = self.patched(replacements);
        }
    }
}

/// Borrowed view of a contract definition within its unit.
#[derive(Debug, Clone, Copy)]
pub struct ContractView<'a> {
    unit: &'a SourceUnit,
    node: &'a AstNode,
    definition: &'a ContractDefinition,
}

impl<'a> ContractView<'a> {
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn name(&self) -> &'a str {
        &self.definition.name
    }

    pub fn kind(&self) -> ContractKind {
        self.definition.kind
    }

    pub fn node(&self) -> &'a AstNode {
        self.node
    }

    pub fn definition(&self) -> &'a ContractDefinition {
        self.definition
    }

    pub fn members(&self) -> impl Iterator<Item = &'a AstNode> + 'a {
        let unit = self.unit;
        let definition = self.definition;
        definition
            .members
            .iter()
            .filter_map(move |id| unit.node(*id))
    }

    pub fn functions(&self) -> impl Iterator<Item = (&'a AstNode, &'a FunctionDefinition)> + 'a {
        self.members()
            .filter_map(|node| node.as_function().map(|function| (node, function)))
    }

    pub fn state_variables(
        &self,
    ) -> impl Iterator<Item = (&'a AstNode, &'a VariableDeclaration)> + 'a {
        self.members().filter_map(|node| {
            node.as_variable()
                .filter(|variable| variable.is_state_variable)
                .map(|variable| (node, variable))
        })
    }

    /// Last member of the contract body, i.e. the last child that sits
    /// between the contract's braces.
    pub fn last_member(&self) -> Option<&'a AstNode> {
        self.definition
            .members
            .last()
            .and_then(|id| self.unit.node(*id))
    }
}

/// Every source unit of one compilation, keyed by absolute path.
#[derive(Debug, Clone, Default)]
pub struct AstBatch {
    units: Vec<SourceUnit>,
}

impl AstBatch {
    pub fn new(units: Vec<SourceUnit>) -> Self {
        Self { units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    pub fn into_units(self) -> Vec<SourceUnit> {
        self.units
    }

    pub fn get(&self, path: &str) -> Option<&SourceUnit> {
        self.units.iter().find(|unit| unit.absolute_path == path)
    }

    pub fn paths(&self) -> Vec<String> {
        self.units
            .iter()
            .map(|unit| unit.absolute_path.clone())
            .collect()
    }

    /// Swaps in a unit with the same path, keeping batch order.
    /// Returns `false` if no unit has that path.
    pub fn replace(&mut self, unit: SourceUnit) -> bool {
        match self
            .units
            .iter_mut()
            .find(|existing| existing.absolute_path == unit.absolute_path)
        {
            Some(existing) => {
                *existing = unit;
                true
            }
            None => false,
        }
    }

    /// The unit an import points to, when it was resolved within this batch.
    pub fn imported_unit(&self, import: &ImportDirective) -> Option<&SourceUnit> {
        import.resolved.as_deref().and_then(|path| self.get(path))
    }
}
