#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use shadow_compiler::models::FileOutput;
use shadow_compiler::{CompileOptions, CompileOutput, Compiler, Diagnostic, OutputSelection};

pub const COUNTER: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

contract Counter {
    uint256 internal count;
    address private owner;

    function increment() internal {
        count += 1;
    }

    function get() public view returns (uint256) {
        return count;
    }
}
"#;

pub const TOKEN: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import "./Counter.sol";

contract Token is Counter {
    mapping(address => uint256) public balances;
}
"#;

pub const PAIR: &str = r#"contract A {
    uint256 a;
}

contract B {}
"#;

pub const SHADOW: &str = "function peek() public view returns (address) {\n    return owner;\n}";

/// Builds compiler-shaped JSON ASTs whose `src` fields point into a fixture text.
pub struct AstBuilder {
    text: &'static str,
    next_id: i64,
}

impl AstBuilder {
    pub fn new(text: &'static str, first_id: i64) -> Self {
        Self {
            text,
            next_id: first_id,
        }
    }

    pub fn id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn offset(&self, needle: &str) -> usize {
        self.text
            .find(needle)
            .unwrap_or_else(|| panic!("`{}` not found in fixture", needle))
    }

    /// Span of the first occurrence of `needle`.
    pub fn src(&self, needle: &str) -> String {
        format!("{}:{}:0", self.offset(needle), needle.len())
    }

    /// Span of the first occurrence of `needle` at or after `anchor`.
    pub fn src_in(&self, anchor: &str, needle: &str) -> String {
        let base = self.offset(anchor);
        let relative = self.text[base..]
            .find(needle)
            .unwrap_or_else(|| panic!("`{}` not found after `{}`", needle, anchor));
        format!("{}:{}:0", base + relative, needle.len())
    }

    /// Empty span right after `anchor`.
    pub fn empty_after(&self, anchor: &str) -> String {
        format!("{}:0:0", self.offset(anchor) + anchor.len())
    }

    /// From `anchor` to the last non-whitespace byte of the text.
    pub fn src_to_end(&self, anchor: &str) -> String {
        let start = self.offset(anchor);
        let end = self.text.trim_end().len();
        format!("{}:{}:0", start, end - start)
    }

    pub fn unit(&mut self, path: &str, license: Option<&str>, nodes: Vec<Value>) -> Value {
        let id = self.id();
        let mut unit = json!({
            "nodeType": "SourceUnit",
            "id": id,
            "src": format!("0:{}:0", self.text.len()),
            "absolutePath": path,
            "exportedSymbols": {},
            "nodes": nodes,
        });
        if let Some(license) = license {
            unit["license"] = json!(license);
        }
        unit
    }

    pub fn pragma(&mut self, needle: &str, literals: &[&str]) -> Value {
        let id = self.id();
        json!({ "nodeType": "PragmaDirective", "id": id, "src": self.src(needle), "literals": literals })
    }

    pub fn import(&mut self, file: &str, absolute_path: &str, src: String) -> Value {
        let id = self.id();
        json!({
            "nodeType": "ImportDirective",
            "id": id,
            "src": src,
            "file": file,
            "absolutePath": absolute_path,
            "unitAlias": "",
            "symbolAliases": [],
        })
    }

    pub fn contract(&mut self, name: &str, bases: Vec<Value>, members: Vec<Value>, src: String) -> Value {
        let id = self.id();
        json!({
            "nodeType": "ContractDefinition",
            "id": id,
            "src": src,
            "name": name,
            "contractKind": "contract",
            "abstract": false,
            "baseContracts": bases,
            "nodes": members,
            "linearizedBaseContracts": [id],
        })
    }

    pub fn inheritance(&mut self, base: &str, src: String) -> Value {
        let path_id = self.id();
        let id = self.id();
        json!({
            "nodeType": "InheritanceSpecifier",
            "id": id,
            "src": src.clone(),
            "baseName": { "nodeType": "IdentifierPath", "id": path_id, "src": src, "name": base },
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn function(
        &mut self,
        name: &str,
        visibility: &str,
        mutability: &str,
        parameters: Value,
        returns: Value,
        body: Option<Value>,
        src: String,
    ) -> Value {
        let id = self.id();
        json!({
            "nodeType": "FunctionDefinition",
            "id": id,
            "src": src,
            "name": name,
            "kind": "function",
            "visibility": visibility,
            "stateMutability": mutability,
            "virtual": false,
            "implemented": body.is_some(),
            "modifiers": [],
            "parameters": parameters,
            "returnParameters": returns,
            "body": body,
        })
    }

    pub fn params(&mut self, parameters: Vec<Value>, src: String) -> Value {
        let id = self.id();
        json!({ "nodeType": "ParameterList", "id": id, "src": src, "parameters": parameters })
    }

    pub fn var(&mut self, name: &str, type_name: Value, visibility: &str, state: bool, src: String) -> Value {
        let id = self.id();
        json!({
            "nodeType": "VariableDeclaration",
            "id": id,
            "src": src,
            "name": name,
            "typeName": type_name,
            "visibility": visibility,
            "stateVariable": state,
            "storageLocation": "default",
            "mutability": "mutable",
            "constant": false,
        })
    }

    pub fn elementary(&mut self, name: &str, src: String) -> Value {
        let id = self.id();
        json!({ "nodeType": "ElementaryTypeName", "id": id, "src": src, "name": name })
    }

    pub fn mapping(&mut self, key: Value, value: Value, src: String) -> Value {
        let id = self.id();
        json!({ "nodeType": "Mapping", "id": id, "src": src, "keyType": key, "valueType": value })
    }

    pub fn block(&mut self, statements: Vec<Value>, src: String) -> Value {
        let id = self.id();
        json!({ "nodeType": "Block", "id": id, "src": src, "statements": statements })
    }

    pub fn identifier(&mut self, name: &str, src: String) -> Value {
        let id = self.id();
        json!({ "nodeType": "Identifier", "id": id, "src": src, "name": name })
    }

    pub fn number(&mut self, value: &str, src: String) -> Value {
        let id = self.id();
        json!({ "nodeType": "Literal", "id": id, "src": src, "kind": "number", "value": value, "hexValue": "" })
    }

    pub fn assignment(&mut self, operator: &str, left: Value, right: Value, src: String) -> Value {
        let id = self.id();
        json!({
            "nodeType": "Assignment",
            "id": id,
            "src": src,
            "operator": operator,
            "leftHandSide": left,
            "rightHandSide": right,
        })
    }

    pub fn expression_statement(&mut self, expression: Value, src: String) -> Value {
        let id = self.id();
        json!({ "nodeType": "ExpressionStatement", "id": id, "src": src, "expression": expression })
    }

    pub fn return_statement(&mut self, expression: Value, src: String) -> Value {
        let id = self.id();
        json!({ "nodeType": "Return", "id": id, "src": src, "expression": expression })
    }
}

/// `Counter.sol`: two state variables, an internal and a public function.
pub fn counter_ast(first_id: i64) -> Value {
    let mut b = AstBuilder::new(COUNTER, first_id);
    let pragma = b.pragma("pragma solidity ^0.8.20;", &["solidity", "^", "0.8", ".20"]);

    let uint_type = b.elementary("uint256", b.src("uint256"));
    let count = b.var("count", uint_type, "internal", true, b.src("uint256 internal count"));
    let address_type = b.elementary("address", b.src("address"));
    let owner = b.var("owner", address_type, "private", true, b.src("address private owner"));

    let parameters = b.params(vec![], b.src_in("function increment", "()"));
    let returns = b.params(vec![], b.empty_after("function increment() internal"));
    let left = b.identifier("count", b.src_in("count += 1", "count"));
    let right = b.number("1", b.src_in("count += 1", "1"));
    let assignment = b.assignment("+=", left, right, b.src("count += 1"));
    let statement = b.expression_statement(assignment, b.src("count += 1;"));
    let body = b.block(
        vec![statement],
        b.src_in("function increment", "{\n        count += 1;\n    }"),
    );
    let increment = b.function(
        "increment",
        "internal",
        "nonpayable",
        parameters,
        returns,
        Some(body),
        b.src("function increment() internal {\n        count += 1;\n    }"),
    );

    let parameters = b.params(vec![], b.src_in("function get", "()"));
    let return_type = b.elementary("uint256", b.src_in("returns (", "uint256"));
    let return_value = b.var("", return_type, "internal", false, b.src_in("returns (", "uint256"));
    let returns = b.params(vec![return_value], b.src("(uint256)"));
    let value = b.identifier("count", b.src_in("return count", "count"));
    let statement = b.return_statement(value, b.src("return count;"));
    let body = b.block(
        vec![statement],
        b.src_in("function get", "{\n        return count;\n    }"),
    );
    let get = b.function(
        "get",
        "public",
        "view",
        parameters,
        returns,
        Some(body),
        b.src("function get() public view returns (uint256) {\n        return count;\n    }"),
    );

    let contract = b.contract(
        "Counter",
        vec![],
        vec![count, owner, increment, get],
        b.src_to_end("contract Counter"),
    );
    b.unit("Counter.sol", Some("MIT"), vec![pragma, contract])
}

/// `Token.sol`: imports `Counter.sol`, one mapping state variable.
pub fn token_ast(first_id: i64) -> Value {
    let mut b = AstBuilder::new(TOKEN, first_id);
    let pragma = b.pragma("pragma solidity ^0.8.20;", &["solidity", "^", "0.8", ".20"]);
    let import = b.import("./Counter.sol", "Counter.sol", b.src("import \"./Counter.sol\";"));

    let base = b.inheritance("Counter", b.src_in("is Counter", "Counter"));
    let key = b.elementary("address", b.src("address"));
    let value = b.elementary("uint256", b.src("uint256"));
    let mapping = b.mapping(key, value, b.src("mapping(address => uint256)"));
    let balances = b.var(
        "balances",
        mapping,
        "public",
        true,
        b.src("mapping(address => uint256) public balances"),
    );

    let contract = b.contract("Token", vec![base], vec![balances], b.src_to_end("contract Token"));
    b.unit("Token.sol", Some("MIT"), vec![pragma, import, contract])
}

/// `Pair.sol`: two contracts, the second one empty.
pub fn pair_ast(first_id: i64) -> Value {
    let mut b = AstBuilder::new(PAIR, first_id);
    let uint_type = b.elementary("uint256", b.src("uint256"));
    let a = b.var("a", uint_type, "internal", true, b.src("uint256 a"));
    let first = b.contract("A", vec![], vec![a], b.src("contract A {\n    uint256 a;\n}"));
    let second = b.contract("B", vec![], vec![], b.src("contract B {}"));
    b.unit("Pair.sol", None, vec![first, second])
}

pub fn counter_input() -> BTreeMap<String, Value> {
    BTreeMap::from([("Counter.sol".to_string(), counter_ast(1))])
}

/// Counter as a bare AST, Token wrapped in a compiler source entry.
pub fn two_file_input() -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("Counter.sol".to_string(), counter_ast(1)),
        (
            "Token.sol".to_string(),
            json!({ "id": 1, "ast": token_ast(1000) }),
        ),
    ])
}

pub fn counter_sources() -> BTreeMap<String, String> {
    BTreeMap::from([("Counter.sol".to_string(), COUNTER.to_string())])
}

pub fn two_file_sources() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Counter.sol".to_string(), COUNTER.to_string()),
        ("Token.sol".to_string(), TOKEN.to_string()),
    ])
}

pub type CompileCall = (BTreeMap<String, String>, CompileOptions);

/// A [`Compiler`] that records every call and answers from canned data.
#[derive(Default)]
pub struct RecordingCompiler {
    calls: Mutex<Vec<CompileCall>>,
    asts: BTreeMap<String, Value>,
    diagnostics: Vec<Diagnostic>,
    offline: bool,
}

impl RecordingCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns these ASTs whenever ASTs are requested.
    pub fn with_asts(asts: BTreeMap<String, Value>) -> Self {
        Self {
            asts,
            ..Self::default()
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<CompileCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Compiler for RecordingCompiler {
    async fn compile(
        &self,
        sources: &BTreeMap<String, String>,
        options: &CompileOptions,
    ) -> anyhow::Result<CompileOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((sources.clone(), options.clone()));
        if self.offline {
            anyhow::bail!("compiler offline");
        }

        let wants_ast = options.output_selection.contains(&OutputSelection::Ast);
        let files = sources
            .keys()
            .map(|path| {
                let ast = if wants_ast {
                    self.asts.get(path).cloned()
                } else {
                    None
                };
                (
                    path.clone(),
                    FileOutput {
                        contracts: BTreeMap::new(),
                        ast,
                    },
                )
            })
            .collect();

        Ok(CompileOutput {
            files,
            diagnostics: self.diagnostics.clone(),
        })
    }
}
