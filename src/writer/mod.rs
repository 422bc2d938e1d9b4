//! Solidity source writer
//!
//! Renders typed source units back to Solidity text. Output is fully
//! determined by the tree: the same unmutated unit always produces the same
//! bytes and the same source map.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::ast::{
    AssemblyBody, AstBatch, AstNode, ContractDefinition, FunctionDefinition, FunctionKind,
    ImportDirective, InlineAssembly, Literal, LiteralKind, Mutability, NodeId, NodeKind,
    SourceSpan, SourceUnit, UsingFunction, VariableDeclaration, YulExpression, YulLiteral,
    YulLiteralKind, YulStatement,
};
use crate::error::AstError;

const INDENT: &str = "    ";

/// Node id to byte range, valid only for the text it was rendered with.
pub type SourceMap = BTreeMap<NodeId, SourceSpan>;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub with_source_map: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderOutput {
    pub sources: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_maps: Option<BTreeMap<String, SourceMap>>,
}

/// Renders every unit to Solidity text, keyed by absolute path.
///
/// # Arguments
///
/// * `units` - The source units to render
/// * `options` - Whether to record a source map per unit
///
/// # Returns
///
/// The rendered texts, plus the source maps when requested
pub fn render(units: &[&SourceUnit], options: &RenderOptions) -> Result<RenderOutput, AstError> {
    let mut sources = BTreeMap::new();
    let mut source_maps = options.with_source_map.then(BTreeMap::new);

    for unit in units {
        let path = unit.absolute_path();
        let (text, map) = SourceWriter::new(unit)
            .write_unit()
            .map_err(|cause| AstError::write_failed(cause, path))?;
        debug!("Rendered {} ({} bytes, {} mapped nodes)", path, text.len(), map.len());
        if let Some(maps) = source_maps.as_mut() {
            maps.insert(path.to_string(), map);
        }
        sources.insert(path.to_string(), text);
    }

    Ok(RenderOutput {
        sources,
        source_maps,
    })
}

impl AstBatch {
    /// Renders every unit of the batch. See [`render`].
    pub fn render(&self, options: &RenderOptions) -> Result<RenderOutput, AstError> {
        let units: Vec<&SourceUnit> = self.units().iter().collect();
        render(&units, options)
    }
}

type Rendered = Result<(), String>;

struct SourceWriter<'u> {
    unit: &'u SourceUnit,
    out: String,
    indent: usize,
    map: SourceMap,
}

impl<'u> SourceWriter<'u> {
    fn new(unit: &'u SourceUnit) -> Self {
        Self {
            unit,
            out: String::new(),
            indent: 0,
            map: SourceMap::new(),
        }
    }

    fn write_unit(mut self) -> Result<(String, SourceMap), String> {
        let root = self.unit.root();
        let NodeKind::SourceUnit { nodes } = &root.kind else {
            return Err(format!("root {} is not a SourceUnit", root.id));
        };

        if let Some(license) = self.unit.license() {
            self.push("// SPDX-License-Identifier: ");
            self.push(license);
            self.push("\n");
        }
        self.members(nodes)?;
        self.record(root.id, 0);

        Ok((self.out, self.map))
    }

    fn node(&self, id: NodeId) -> Result<&'u AstNode, String> {
        self.unit
            .node(id)
            .ok_or_else(|| format!("dangling node id {}", id))
    }

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn pad(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn record(&mut self, id: NodeId, start: usize) {
        let end = self.out.len();
        if end > start {
            self.map
                .insert(id, SourceSpan::new(start as u32, (end - start) as u32));
        }
    }

    fn mapped(&mut self, id: NodeId, write: impl FnOnce(&mut Self) -> Rendered) -> Rendered {
        let start = self.out.len();
        write(self)?;
        self.record(id, start);
        Ok(())
    }

    /// Renders one node in place, recording its span.
    fn emit(&mut self, id: NodeId) -> Rendered {
        let node = self.node(id)?;
        self.mapped(id, |w| w.inline(node))
    }

    fn emit_list(&mut self, ids: &[NodeId]) -> Rendered {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.emit(*id)?;
        }
        Ok(())
    }

    /// Renders a member or statement on its own line, preceded by its NatSpec.
    fn line(&mut self, id: NodeId) -> Rendered {
        let node = self.node(id)?;
        if let Some(doc) = node.kind.documentation() {
            self.documentation(doc)?;
        }
        self.pad();
        self.mapped(id, |w| w.declaration(node))?;
        self.push("\n");
        Ok(())
    }

    /// Lines of declarations, blank-line separated.
    fn members(&mut self, ids: &[NodeId]) -> Rendered {
        let mut previous: Option<&NodeKind> = None;
        for id in ids {
            let node = self.node(*id)?;
            if let Some(previous) = previous {
                if needs_blank_line(previous, &node.kind) {
                    self.push("\n");
                }
            }
            self.line(*id)?;
            previous = Some(&node.kind);
        }
        Ok(())
    }

    fn documentation(&mut self, id: NodeId) -> Rendered {
        let node = self.node(id)?;
        let NodeKind::StructuredDocumentation { text } = &node.kind else {
            return Err(format!("{} is not documentation", id));
        };
        let start = self.out.len();
        for line in text.trim_matches('\n').lines() {
            self.pad();
            let line = line.trim();
            if line.is_empty() {
                self.push("///\n");
            } else {
                self.push("/// ");
                self.push(line);
                self.push("\n");
            }
        }
        self.record(id, start);
        Ok(())
    }

    fn declaration(&mut self, node: &'u AstNode) -> Rendered {
        match &node.kind {
            NodeKind::VariableDeclaration(variable) => {
                self.variable(variable)?;
                self.push(";");
                Ok(())
            }
            _ => self.inline(node),
        }
    }

    fn inline(&mut self, node: &'u AstNode) -> Rendered {
        match &node.kind {
            NodeKind::SourceUnit { .. } => {
                return Err(format!("nested source unit {}", node.id));
            }
            NodeKind::PragmaDirective { literals } => {
                self.push("pragma ");
                self.push(&pragma_text(literals));
                self.push(";");
            }
            NodeKind::ImportDirective(import) => self.import(import),
            NodeKind::ContractDefinition(contract) => self.contract(contract)?,
            NodeKind::InheritanceSpecifier {
                base_name,
                arguments,
            } => {
                self.push(base_name);
                if let Some(arguments) = arguments {
                    self.push("(");
                    self.emit_list(arguments)?;
                    self.push(")");
                }
            }
            NodeKind::FunctionDefinition(function) => self.function(function)?,
            NodeKind::ModifierDefinition {
                name,
                is_virtual,
                overrides,
                parameters,
                body,
                ..
            } => {
                self.push("modifier ");
                self.push(name);
                self.emit(*parameters)?;
                if *is_virtual {
                    self.push(" virtual");
                }
                if let Some(overrides) = overrides {
                    self.push(" ");
                    self.emit(*overrides)?;
                }
                self.body(*body)?;
            }
            NodeKind::ModifierInvocation { name, arguments } => {
                self.push(name);
                if let Some(arguments) = arguments {
                    self.push("(");
                    self.emit_list(arguments)?;
                    self.push(")");
                }
            }
            NodeKind::OverrideSpecifier { overrides } => {
                self.push("override");
                if !overrides.is_empty() {
                    self.push("(");
                    self.push(&overrides.join(", "));
                    self.push(")");
                }
            }
            NodeKind::VariableDeclaration(variable) => self.variable(variable)?,
            NodeKind::ParameterList { parameters } => {
                self.push("(");
                self.emit_list(parameters)?;
                self.push(")");
            }
            NodeKind::EventDefinition {
                name,
                anonymous,
                parameters,
                ..
            } => {
                self.push("event ");
                self.push(name);
                self.emit(*parameters)?;
                if *anonymous {
                    self.push(" anonymous");
                }
                self.push(";");
            }
            NodeKind::ErrorDefinition {
                name, parameters, ..
            } => {
                self.push("error ");
                self.push(name);
                self.emit(*parameters)?;
                self.push(";");
            }
            NodeKind::StructDefinition { name, members } => {
                self.push("struct ");
                self.push(name);
                self.braced(members)?;
            }
            NodeKind::EnumDefinition { name, members } => {
                self.push("enum ");
                self.push(name);
                self.push(" { ");
                self.emit_list(members)?;
                self.push(" }");
            }
            NodeKind::EnumValue { name } => self.push(name),
            NodeKind::UserDefinedValueTypeDefinition {
                name,
                underlying_type,
            } => {
                self.push("type ");
                self.push(name);
                self.push(" is ");
                self.emit(*underlying_type)?;
                self.push(";");
            }
            NodeKind::UsingForDirective {
                library_name,
                functions,
                type_name,
                global,
            } => {
                self.push("using ");
                match library_name {
                    Some(library) => self.push(library),
                    None => self.push(&using_list(functions)),
                }
                self.push(" for ");
                match type_name {
                    Some(type_name) => self.emit(*type_name)?,
                    None => self.push("*"),
                }
                if *global {
                    self.push(" global");
                }
                self.push(";");
            }
            NodeKind::StructuredDocumentation { .. } => {
                return Err(format!("documentation {} outside a declaration", node.id));
            }

            NodeKind::ElementaryTypeName { name, payable } => {
                self.push(name);
                if *payable && name == "address" {
                    self.push(" payable");
                }
            }
            NodeKind::UserDefinedTypeName { name } => self.push(name),
            NodeKind::Mapping {
                key_type,
                value_type,
            } => {
                self.push("mapping(");
                self.emit(*key_type)?;
                self.push(" => ");
                self.emit(*value_type)?;
                self.push(")");
            }
            NodeKind::ArrayTypeName { base_type, length } => {
                self.emit(*base_type)?;
                self.push("[");
                if let Some(length) = length {
                    self.emit(*length)?;
                }
                self.push("]");
            }
            NodeKind::FunctionTypeName {
                visibility,
                state_mutability,
                parameter_types,
                return_parameter_types,
            } => {
                self.push("function");
                self.emit(*parameter_types)?;
                self.push(" ");
                self.push(visibility.as_str());
                if let Some(keyword) = state_mutability.keyword() {
                    self.push(" ");
                    self.push(keyword);
                }
                self.returns(*return_parameter_types)?;
            }

            NodeKind::Block {
                statements,
                unchecked,
            } => {
                if *unchecked {
                    self.push("unchecked ");
                }
                self.block(statements)?;
            }
            NodeKind::ExpressionStatement { expression } => {
                self.emit(*expression)?;
                self.push(";");
            }
            NodeKind::VariableDeclarationStatement {
                declarations,
                initial_value,
            } => {
                match declarations.as_slice() {
                    [Some(declaration)] => self.emit(*declaration)?,
                    _ => {
                        self.push("(");
                        self.optional_list(declarations)?;
                        self.push(")");
                    }
                }
                if let Some(value) = initial_value {
                    self.push(" = ");
                    self.emit(*value)?;
                }
                self.push(";");
            }
            NodeKind::Return { expression } => {
                self.push("return");
                if let Some(expression) = expression {
                    self.push(" ");
                    self.emit(*expression)?;
                }
                self.push(";");
            }
            NodeKind::IfStatement {
                condition,
                true_body,
                false_body,
            } => {
                self.push("if (");
                self.emit(*condition)?;
                self.push(") ");
                self.emit(*true_body)?;
                if let Some(false_body) = false_body {
                    self.push(" else ");
                    self.emit(*false_body)?;
                }
            }
            NodeKind::ForStatement {
                initialization,
                condition,
                loop_expression,
                body,
            } => {
                self.push("for (");
                match initialization {
                    Some(initialization) => self.emit(*initialization)?,
                    None => self.push(";"),
                }
                if let Some(condition) = condition {
                    self.push(" ");
                    self.emit(*condition)?;
                }
                self.push(";");
                if let Some(step) = loop_expression {
                    self.push(" ");
                    self.loop_step(*step)?;
                }
                self.push(") ");
                self.emit(*body)?;
            }
            NodeKind::WhileStatement {
                condition,
                body,
                do_while: true,
            } => {
                self.push("do ");
                self.emit(*body)?;
                self.push(" while (");
                self.emit(*condition)?;
                self.push(");");
            }
            NodeKind::WhileStatement {
                condition, body, ..
            } => {
                self.push("while (");
                self.emit(*condition)?;
                self.push(") ");
                self.emit(*body)?;
            }
            NodeKind::EmitStatement { event_call } => {
                self.push("emit ");
                self.emit(*event_call)?;
                self.push(";");
            }
            NodeKind::RevertStatement { error_call } => {
                self.push("revert ");
                self.emit(*error_call)?;
                self.push(";");
            }
            NodeKind::TryStatement {
                external_call,
                clauses,
            } => {
                let Some((success, catches)) = clauses.split_first() else {
                    return Err(format!("try statement {} has no clauses", node.id));
                };
                self.push("try ");
                self.emit(*external_call)?;
                self.try_clause(*success, true)?;
                for clause in catches {
                    self.try_clause(*clause, false)?;
                }
            }
            NodeKind::TryCatchClause { .. } => {
                return Err(format!("catch clause {} outside a try statement", node.id));
            }
            NodeKind::InlineAssembly(assembly) => self.assembly(assembly)?,
            NodeKind::Break => self.push("break;"),
            NodeKind::Continue => self.push("continue;"),
            NodeKind::PlaceholderStatement => self.push("_;"),

            NodeKind::Identifier { name } => self.push(name),
            NodeKind::Literal(literal) => self.literal(node.id, literal)?,
            NodeKind::UnaryOperation {
                operator,
                prefix,
                operand,
            } => {
                if *prefix {
                    self.push(operator);
                    // `delete x`
                    if operator.chars().all(char::is_alphabetic) {
                        self.push(" ");
                    }
                    self.emit(*operand)?;
                } else {
                    self.emit(*operand)?;
                    self.push(operator);
                }
            }
            NodeKind::BinaryOperation {
                operator,
                left,
                right,
            }
            | NodeKind::Assignment {
                operator,
                left,
                right,
            } => {
                self.emit(*left)?;
                self.push(" ");
                self.push(operator);
                self.push(" ");
                self.emit(*right)?;
            }
            NodeKind::Conditional {
                condition,
                true_expression,
                false_expression,
            } => {
                self.emit(*condition)?;
                self.push(" ? ");
                self.emit(*true_expression)?;
                self.push(" : ");
                self.emit(*false_expression)?;
            }
            NodeKind::FunctionCall {
                expression,
                arguments,
                names,
            } => {
                self.emit(*expression)?;
                if names.is_empty() {
                    self.push("(");
                    self.emit_list(arguments)?;
                    self.push(")");
                } else {
                    self.push("({");
                    self.named_list(names, arguments)?;
                    self.push("})");
                }
            }
            NodeKind::FunctionCallOptions {
                expression,
                names,
                options,
            } => {
                self.emit(*expression)?;
                self.push("{");
                self.named_list(names, options)?;
                self.push("}");
            }
            NodeKind::MemberAccess {
                expression,
                member_name,
            } => {
                self.emit(*expression)?;
                self.push(".");
                self.push(member_name);
            }
            NodeKind::IndexAccess { base, index } => {
                self.emit(*base)?;
                self.push("[");
                if let Some(index) = index {
                    self.emit(*index)?;
                }
                self.push("]");
            }
            NodeKind::IndexRangeAccess { base, start, end } => {
                self.emit(*base)?;
                self.push("[");
                if let Some(start) = start {
                    self.emit(*start)?;
                }
                self.push(":");
                if let Some(end) = end {
                    self.emit(*end)?;
                }
                self.push("]");
            }
            NodeKind::TupleExpression {
                components,
                inline_array,
            } => {
                let (open, close) = if *inline_array { ("[", "]") } else { ("(", ")") };
                self.push(open);
                self.optional_list(components)?;
                self.push(close);
            }
            NodeKind::ElementaryTypeNameExpression { type_name } => {
                // `payable(x)` converts to `address payable`
                match &self.node(*type_name)?.kind {
                    NodeKind::ElementaryTypeName {
                        name,
                        payable: true,
                    } if name == "address" => self.mapped(*type_name, |w| {
                        w.push("payable");
                        Ok(())
                    })?,
                    _ => self.emit(*type_name)?,
                }
            }
            NodeKind::NewExpression { type_name } => {
                self.push("new ");
                self.emit(*type_name)?;
            }

            NodeKind::Opaque { node_type } => {
                return Err(format!(
                    "unsupported node kind {} ({})",
                    node_type, node.id
                ));
            }
        }
        Ok(())
    }

    fn import(&mut self, import: &ImportDirective) {
        self.push("import ");
        if import.symbol_aliases.is_empty() {
            self.push(&quote(&import.file));
            if let Some(alias) = &import.unit_alias {
                self.push(" as ");
                self.push(alias);
            }
        } else {
            let symbols: Vec<String> = import
                .symbol_aliases
                .iter()
                .map(|alias| match &alias.local {
                    Some(local) if local != &alias.foreign => {
                        format!("{} as {}", alias.foreign, local)
                    }
                    _ => alias.foreign.clone(),
                })
                .collect();
            self.push("{");
            self.push(&symbols.join(", "));
            self.push("} from ");
            self.push(&quote(&import.file));
        }
        self.push(";");
    }

    fn contract(&mut self, contract: &'u ContractDefinition) -> Rendered {
        if contract.is_abstract {
            self.push("abstract ");
        }
        self.push(contract.kind.as_str());
        self.push(" ");
        self.push(&contract.name);
        if !contract.base_contracts.is_empty() {
            self.push(" is ");
            self.emit_list(&contract.base_contracts)?;
        }
        if contract.members.is_empty() {
            self.push(" {}");
            return Ok(());
        }
        self.push(" {\n");
        self.indent += 1;
        self.members(&contract.members)?;
        self.indent -= 1;
        self.pad();
        self.push("}");
        Ok(())
    }

    fn function(&mut self, function: &'u FunctionDefinition) -> Rendered {
        match function.kind {
            FunctionKind::Constructor => self.push("constructor"),
            FunctionKind::Fallback => self.push("fallback"),
            FunctionKind::Receive => self.push("receive"),
            FunctionKind::Function | FunctionKind::FreeFunction => {
                self.push("function ");
                self.push(&function.name);
            }
        }
        self.emit(function.parameters)?;

        if !matches!(
            function.kind,
            FunctionKind::Constructor | FunctionKind::FreeFunction
        ) {
            self.push(" ");
            self.push(function.visibility.as_str());
        }
        if let Some(keyword) = function.state_mutability.keyword() {
            self.push(" ");
            self.push(keyword);
        }
        if function.is_virtual {
            self.push(" virtual");
        }
        if let Some(overrides) = function.overrides {
            self.push(" ");
            self.emit(overrides)?;
        }
        for modifier in &function.modifiers {
            self.push(" ");
            self.emit(*modifier)?;
        }

        self.returns(function.return_parameters)?;
        self.body(function.body)
    }

    /// ` returns (...)`, left out for an empty list.
    fn returns(&mut self, list: NodeId) -> Rendered {
        let returns = self.node(list)?;
        if matches!(&returns.kind, NodeKind::ParameterList { parameters } if !parameters.is_empty()) {
            self.push(" returns ");
            self.emit(list)?;
        }
        Ok(())
    }

    /// The success clause reads ` returns (...) { }`, the others ` catch Error(...) { }`.
    fn try_clause(&mut self, id: NodeId, success: bool) -> Rendered {
        let node = self.node(id)?;
        let NodeKind::TryCatchClause {
            error_name,
            parameters,
            block,
        } = &node.kind
        else {
            return Err(format!("{} is not a catch clause", id));
        };
        self.push(" ");
        self.mapped(id, |w| {
            if !success {
                w.push("catch ");
                w.push(error_name);
            }
            if let Some(parameters) = parameters {
                if success {
                    w.push("returns ");
                }
                w.emit(*parameters)?;
                w.push(" ");
            }
            w.emit(*block)
        })
    }

    fn assembly(&mut self, assembly: &InlineAssembly) -> Rendered {
        self.push("assembly ");
        if !assembly.flags.is_empty() {
            let flags: Vec<String> = assembly.flags.iter().map(|flag| quote(flag)).collect();
            self.push("(");
            self.push(&flags.join(", "));
            self.push(") ");
        }
        match &assembly.body {
            AssemblyBody::Yul(statements) => self.yul_block(statements),
            AssemblyBody::Legacy(text) => {
                self.push(text.trim());
                Ok(())
            }
        }
    }

    fn yul_block(&mut self, statements: &[YulStatement]) -> Rendered {
        if statements.is_empty() {
            self.push("{}");
            return Ok(());
        }
        self.push("{\n");
        self.indent += 1;
        for statement in statements {
            self.pad();
            self.yul_statement(statement)?;
            self.push("\n");
        }
        self.indent -= 1;
        self.pad();
        self.push("}");
        Ok(())
    }

    /// `for` headers keep their init and post blocks on one line.
    fn yul_header_block(&mut self, statements: &[YulStatement]) -> Rendered {
        self.push("{");
        for statement in statements {
            self.push(" ");
            self.yul_statement(statement)?;
        }
        self.push(if statements.is_empty() { "}" } else { " }" });
        Ok(())
    }

    fn yul_statement(&mut self, statement: &YulStatement) -> Rendered {
        match statement {
            YulStatement::Block(statements) => self.yul_block(statements)?,
            YulStatement::VariableDeclaration { variables, value } => {
                self.push("let ");
                self.push(&variables.join(", "));
                if let Some(value) = value {
                    self.push(" := ");
                    self.yul_expression(value)?;
                }
            }
            YulStatement::Assignment { variables, value } => {
                self.push(&variables.join(", "));
                self.push(" := ");
                self.yul_expression(value)?;
            }
            YulStatement::Expression(expression) => self.yul_expression(expression)?,
            YulStatement::If { condition, body } => {
                self.push("if ");
                self.yul_expression(condition)?;
                self.push(" ");
                self.yul_block(body)?;
            }
            YulStatement::Switch { expression, cases } => {
                self.push("switch ");
                self.yul_expression(expression)?;
                for case in cases {
                    self.push("\n");
                    self.pad();
                    match &case.value {
                        Some(value) => {
                            self.push("case ");
                            self.yul_literal(value)?;
                        }
                        None => self.push("default"),
                    }
                    self.push(" ");
                    self.yul_block(&case.body)?;
                }
            }
            YulStatement::ForLoop {
                pre,
                condition,
                post,
                body,
            } => {
                self.push("for ");
                self.yul_header_block(pre)?;
                self.push(" ");
                self.yul_expression(condition)?;
                self.push(" ");
                self.yul_header_block(post)?;
                self.push(" ");
                self.yul_block(body)?;
            }
            YulStatement::FunctionDefinition {
                name,
                parameters,
                returns,
                body,
            } => {
                self.push("function ");
                self.push(name);
                self.push("(");
                self.push(&parameters.join(", "));
                self.push(")");
                if !returns.is_empty() {
                    self.push(" -> ");
                    self.push(&returns.join(", "));
                }
                self.push(" ");
                self.yul_block(body)?;
            }
            YulStatement::Break => self.push("break"),
            YulStatement::Continue => self.push("continue"),
            YulStatement::Leave => self.push("leave"),
        }
        Ok(())
    }

    fn yul_expression(&mut self, expression: &YulExpression) -> Rendered {
        match expression {
            YulExpression::Identifier(name) => self.push(name),
            YulExpression::Literal(literal) => self.yul_literal(literal)?,
            YulExpression::Call {
                function,
                arguments,
            } => {
                self.push(function);
                self.push("(");
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.yul_expression(argument)?;
                }
                self.push(")");
            }
        }
        Ok(())
    }

    fn yul_literal(&mut self, literal: &YulLiteral) -> Rendered {
        match (literal.kind, &literal.value, &literal.hex_value) {
            (YulLiteralKind::String, Some(value), _) => self.push(&quote(value)),
            (YulLiteralKind::String, None, Some(hex)) => self.push(&format!("hex\"{}\"", hex)),
            (YulLiteralKind::Number | YulLiteralKind::Bool, Some(value), _) => self.push(value),
            _ => return Err("Yul literal has no value".to_string()),
        }
        Ok(())
    }

    fn variable(&mut self, variable: &VariableDeclaration) -> Rendered {
        let type_name = variable
            .type_name
            .ok_or_else(|| format!("variable `{}` has no type name", variable.name))?;
        self.emit(type_name)?;
        if variable.indexed {
            self.push(" indexed");
        }
        if variable.is_state_variable {
            self.push(" ");
            self.push(variable.visibility.as_str());
        }
        match variable.mutability {
            Mutability::Constant => self.push(" constant"),
            Mutability::Immutable => self.push(" immutable"),
            Mutability::Mutable => {}
        }
        if let Some(overrides) = variable.overrides {
            self.push(" ");
            self.emit(overrides)?;
        }
        if let Some(location) = variable.storage_location.keyword() {
            self.push(" ");
            self.push(location);
        }
        if !variable.name.is_empty() {
            self.push(" ");
            self.push(&variable.name);
        }
        if let Some(value) = variable.value {
            self.push(" = ");
            self.emit(value)?;
        }
        Ok(())
    }

    /// Function or modifier body, or `;` for declarations without one.
    fn body(&mut self, body: Option<NodeId>) -> Rendered {
        match body {
            Some(body) => {
                self.push(" ");
                self.emit(body)
            }
            None => {
                self.push(";");
                Ok(())
            }
        }
    }

    fn block(&mut self, statements: &[NodeId]) -> Rendered {
        if statements.is_empty() {
            self.push("{}");
            return Ok(());
        }
        self.push("{\n");
        self.indent += 1;
        for statement in statements {
            self.line(*statement)?;
        }
        self.indent -= 1;
        self.pad();
        self.push("}");
        Ok(())
    }

    /// `{ member; ... }` bodies of structs.
    fn braced(&mut self, members: &[NodeId]) -> Rendered {
        if members.is_empty() {
            self.push(" {}");
            return Ok(());
        }
        self.push(" {\n");
        self.indent += 1;
        for member in members {
            self.line(*member)?;
        }
        self.indent -= 1;
        self.pad();
        self.push("}");
        Ok(())
    }

    /// The step of a `for` header has no terminating `;`.
    fn loop_step(&mut self, id: NodeId) -> Rendered {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::ExpressionStatement { expression } => {
                let expression = *expression;
                self.mapped(id, |w| w.emit(expression))
            }
            _ => self.emit(id),
        }
    }

    fn optional_list(&mut self, ids: &[Option<NodeId>]) -> Rendered {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            if let Some(id) = id {
                self.emit(*id)?;
            }
        }
        Ok(())
    }

    fn named_list(&mut self, names: &[String], values: &[NodeId]) -> Rendered {
        if names.len() != values.len() {
            return Err(format!(
                "{} names for {} named arguments",
                names.len(),
                values.len()
            ));
        }
        for (i, (name, value)) in names.iter().zip(values).enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push(name);
            self.push(": ");
            self.emit(*value)?;
        }
        Ok(())
    }

    fn literal(&mut self, id: NodeId, literal: &Literal) -> Rendered {
        let value = literal.value.as_deref();
        match literal.kind {
            LiteralKind::Number | LiteralKind::Bool => {
                let value = value.ok_or_else(|| format!("literal {} has no value", id))?;
                self.push(value);
                if let Some(unit) = &literal.subdenomination {
                    self.push(" ");
                    self.push(unit);
                }
            }
            LiteralKind::String => match value {
                Some(value) => self.push(&quote(value)),
                None => self.push(&format!("hex\"{}\"", literal.hex_value)),
            },
            LiteralKind::HexString => self.push(&format!("hex\"{}\"", literal.hex_value)),
            LiteralKind::UnicodeString => {
                let value = value.ok_or_else(|| format!("literal {} has no value", id))?;
                self.push("unicode\"");
                self.push(&escape(value, true));
                self.push("\"");
            }
        }
        Ok(())
    }
}

fn needs_blank_line(previous: &NodeKind, next: &NodeKind) -> bool {
    !matches!(
        (previous, next),
        (NodeKind::VariableDeclaration(_), NodeKind::VariableDeclaration(_))
            | (NodeKind::PragmaDirective { .. }, NodeKind::PragmaDirective { .. })
            | (NodeKind::ImportDirective(_), NodeKind::ImportDirective(_))
    )
}

/// `{f, g as +}` of a `using` directive.
fn using_list(functions: &[UsingFunction]) -> String {
    let entries: Vec<String> = functions
        .iter()
        .map(|function| match &function.operator {
            Some(operator) => format!("{} as {}", function.name, operator),
            None => function.name.clone(),
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn is_version_operator(token: &str) -> bool {
    token.starts_with(['<', '>', '=', '^', '~', '|'])
}

/// Joins pragma tokens, e.g. `["solidity", ">=", "0.7", ".0", "<", "0.9", ".0"]`
/// into `solidity >=0.7.0 <0.9.0`.
fn pragma_text(literals: &[String]) -> String {
    let Some((name, rest)) = literals.split_first() else {
        return String::new();
    };
    let mut text = name.clone();
    let mut previous_operator = true;
    for (i, token) in rest.iter().enumerate() {
        let operator = is_version_operator(token);
        if i == 0 || (operator && !previous_operator) {
            text.push(' ');
        }
        text.push_str(token);
        previous_operator = operator;
    }
    text
}

fn quote(value: &str) -> String {
    format!("\"{}\"", escape(value, false))
}

fn escape(value: &str, unicode: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c if unicode && !c.is_control() => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("\\x{:02x}", byte));
                }
            }
        }
    }
    out
}
