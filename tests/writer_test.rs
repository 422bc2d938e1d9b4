#![recursion_limit = "256"]
mod common;

use std::collections::BTreeMap;

use serde_json::{json, Value};
use shadow_compiler::ast::NodeKind;
use shadow_compiler::{
    ingest, render, render_ast_json, AstError, NodeId, RenderOptions, RenderOutput, SourceUnit,
};

use common::{counter_ast, counter_input, pair_ast, two_file_input, AstBuilder, COUNTER, TOKEN};

fn with_map() -> RenderOptions {
    RenderOptions {
        with_source_map: true,
    }
}

#[test]
fn test_render_reproduces_formatted_source() {
    let batch = ingest(&two_file_input()).unwrap();
    let output = batch.render(&RenderOptions::default()).unwrap();

    assert_eq!(output.sources["Counter.sol"], COUNTER);
    assert_eq!(output.sources["Token.sol"], TOKEN);
    assert!(output.source_maps.is_none());
}

#[test]
fn test_render_is_deterministic() {
    let batch = ingest(&two_file_input()).unwrap();
    let first = batch.render(&with_map()).unwrap();
    let second = batch.render(&with_map()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_source_map_spans_are_in_bounds() {
    let batch = ingest(&two_file_input()).unwrap();
    let output = batch.render(&with_map()).unwrap();
    let maps = output.source_maps.unwrap();

    for (path, map) in &maps {
        let text = &output.sources[path];
        assert!(!map.is_empty());
        for (id, span) in map {
            assert!(span.length > 0, "{} in {} has an empty span", id, path);
            assert!(span.end() <= text.len(), "{} in {} is out of bounds", id, path);
        }
    }
}

#[test]
fn test_source_map_points_at_rendered_nodes() {
    let batch = ingest(&counter_input()).unwrap();
    let unit = batch.get("Counter.sol").unwrap();
    let output = batch.render(&with_map()).unwrap();
    let text = &output.sources["Counter.sol"];
    let map = &output.source_maps.as_ref().unwrap()["Counter.sol"];

    let slice = |id: NodeId| {
        let span = map[&id];
        &text[span.offset as usize..span.end()]
    };

    let counter = unit.contract("Counter").unwrap();
    let (count, _) = counter.state_variables().next().unwrap();
    // state variable spans include the terminating `;`
    assert_eq!(slice(count.id), "uint256 internal count;");

    let (get, _) = counter.functions().nth(1).unwrap();
    assert_eq!(
        slice(get.id),
        "function get() public view returns (uint256) {\n        return count;\n    }"
    );

    assert_eq!(slice(unit.root().id), text.as_str());
}

#[test]
fn test_unit_without_license() {
    let raw = BTreeMap::from([("Pair.sol".to_string(), pair_ast(1))]);
    let batch = ingest(&raw).unwrap();
    let output = batch.render(&RenderOptions::default()).unwrap();
    assert_eq!(
        output.sources["Pair.sol"],
        "contract A {\n    uint256 internal a;\n}\n\ncontract B {}\n"
    );
}

#[test]
fn test_render_empty_input() {
    let output = render(&[], &with_map()).unwrap();
    assert!(output.sources.is_empty());
    assert_eq!(output.source_maps, Some(BTreeMap::new()));

    let output = render(&[], &RenderOptions::default()).unwrap();
    assert!(output.source_maps.is_none());
}

#[test]
fn test_render_selected_units() {
    let batch = ingest(&two_file_input()).unwrap();
    let units: Vec<&SourceUnit> = batch
        .units()
        .iter()
        .filter(|unit| unit.absolute_path() == "Token.sol")
        .collect();
    let output = render(&units, &RenderOptions::default()).unwrap();
    assert_eq!(output.sources.len(), 1);
    assert!(output.sources.contains_key("Token.sol"));
}

#[test]
fn test_opaque_node_fails_to_render() {
    let mut ast = counter_ast(1);
    ast["nodes"][1]["nodes"][2]["body"]["statements"][0] = json!({
        "nodeType": "Throw",
        "id": 900,
        "src": "10:5:0"
    });
    let raw = BTreeMap::from([("Counter.sol".to_string(), ast)]);
    let batch = ingest(&raw).unwrap();
    assert!(matches!(
        batch.get("Counter.sol").unwrap().node(NodeId(900)).map(|n| &n.kind),
        Some(NodeKind::Opaque { .. })
    ));

    let err = batch.render(&RenderOptions::default()).unwrap_err();
    match err {
        AstError::WriteFailed { cause, file } => {
            assert_eq!(file, "Counter.sol");
            assert!(cause.contains("Throw"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_render_statements_and_expressions() {
    let ast = json!({
        "nodeType": "SourceUnit", "id": 1, "src": "0:0:0", "absolutePath": "Vault.sol",
        "nodes": [{
            "nodeType": "ContractDefinition", "id": 2, "src": "0:0:0",
            "name": "Vault", "contractKind": "contract", "abstract": true, "baseContracts": [],
            "nodes": [
                {
                    "nodeType": "EventDefinition", "id": 3, "src": "0:0:0", "name": "Moved", "anonymous": false,
                    "parameters": { "nodeType": "ParameterList", "id": 4, "src": "0:0:0", "parameters": [{
                        "nodeType": "VariableDeclaration", "id": 5, "src": "0:0:0", "name": "to",
                        "typeName": { "nodeType": "ElementaryTypeName", "id": 6, "src": "0:0:0", "name": "address", "stateMutability": "nonpayable" },
                        "visibility": "internal", "stateVariable": false, "storageLocation": "default", "indexed": true
                    }]}
                },
                {
                    "nodeType": "FunctionDefinition", "id": 7, "src": "0:0:0", "name": "sweep", "kind": "function",
                    "visibility": "external", "stateMutability": "nonpayable", "virtual": true, "modifiers": [],
                    "documentation": { "nodeType": "StructuredDocumentation", "id": 8, "src": "0:0:0", "text": "@notice Moves everything out" },
                    "parameters": { "nodeType": "ParameterList", "id": 9, "src": "0:0:0", "parameters": [{
                        "nodeType": "VariableDeclaration", "id": 10, "src": "0:0:0", "name": "items",
                        "typeName": {
                            "nodeType": "ArrayTypeName", "id": 11, "src": "0:0:0",
                            "baseType": { "nodeType": "ElementaryTypeName", "id": 12, "src": "0:0:0", "name": "uint256" }
                        },
                        "visibility": "internal", "stateVariable": false, "storageLocation": "calldata"
                    }]},
                    "returnParameters": { "nodeType": "ParameterList", "id": 13, "src": "0:0:0", "parameters": [] },
                    "body": { "nodeType": "Block", "id": 14, "src": "0:0:0", "statements": [
                        {
                            "nodeType": "ForStatement", "id": 15, "src": "0:0:0",
                            "initializationExpression": {
                                "nodeType": "VariableDeclarationStatement", "id": 16, "src": "0:0:0",
                                "declarations": [{
                                    "nodeType": "VariableDeclaration", "id": 17, "src": "0:0:0", "name": "i",
                                    "typeName": { "nodeType": "ElementaryTypeName", "id": 18, "src": "0:0:0", "name": "uint256" },
                                    "visibility": "internal", "stateVariable": false, "storageLocation": "default"
                                }],
                                "initialValue": { "nodeType": "Literal", "id": 19, "src": "0:0:0", "kind": "number", "value": "0", "hexValue": "30" }
                            },
                            "condition": {
                                "nodeType": "BinaryOperation", "id": 20, "src": "0:0:0", "operator": "<",
                                "leftExpression": { "nodeType": "Identifier", "id": 21, "src": "0:0:0", "name": "i" },
                                "rightExpression": {
                                    "nodeType": "MemberAccess", "id": 22, "src": "0:0:0", "memberName": "length",
                                    "expression": { "nodeType": "Identifier", "id": 23, "src": "0:0:0", "name": "items" }
                                }
                            },
                            "loopExpression": {
                                "nodeType": "ExpressionStatement", "id": 24, "src": "0:0:0",
                                "expression": {
                                    "nodeType": "UnaryOperation", "id": 25, "src": "0:0:0", "operator": "++", "prefix": false,
                                    "subExpression": { "nodeType": "Identifier", "id": 26, "src": "0:0:0", "name": "i" }
                                }
                            },
                            "body": { "nodeType": "Block", "id": 27, "src": "0:0:0", "statements": [
                                {
                                    "nodeType": "IfStatement", "id": 28, "src": "0:0:0",
                                    "condition": {
                                        "nodeType": "BinaryOperation", "id": 29, "src": "0:0:0", "operator": "==",
                                        "leftExpression": {
                                            "nodeType": "IndexAccess", "id": 30, "src": "0:0:0",
                                            "baseExpression": { "nodeType": "Identifier", "id": 31, "src": "0:0:0", "name": "items" },
                                            "indexExpression": { "nodeType": "Identifier", "id": 32, "src": "0:0:0", "name": "i" }
                                        },
                                        "rightExpression": { "nodeType": "Literal", "id": 33, "src": "0:0:0", "kind": "number", "value": "1", "subdenomination": "ether" }
                                    },
                                    "trueBody": { "nodeType": "Break", "id": 34, "src": "0:0:0" },
                                    "falseBody": {
                                        "nodeType": "EmitStatement", "id": 35, "src": "0:0:0",
                                        "eventCall": {
                                            "nodeType": "FunctionCall", "id": 36, "src": "0:0:0", "names": [],
                                            "expression": { "nodeType": "Identifier", "id": 37, "src": "0:0:0", "name": "Moved" },
                                            "arguments": [{
                                                "nodeType": "FunctionCall", "id": 38, "src": "0:0:0", "names": [],
                                                "expression": {
                                                    "nodeType": "ElementaryTypeNameExpression", "id": 39, "src": "0:0:0",
                                                    "typeName": { "nodeType": "ElementaryTypeName", "id": 40, "src": "0:0:0", "name": "address" }
                                                },
                                                "arguments": [{ "nodeType": "Identifier", "id": 41, "src": "0:0:0", "name": "this" }]
                                            }]
                                        }
                                    }
                                }
                            ]}
                        },
                        {
                            "nodeType": "ExpressionStatement", "id": 42, "src": "0:0:0",
                            "expression": {
                                "nodeType": "UnaryOperation", "id": 43, "src": "0:0:0", "operator": "delete", "prefix": true,
                                "subExpression": { "nodeType": "Identifier", "id": 44, "src": "0:0:0", "name": "items" }
                            }
                        },
                        {
                            "nodeType": "RevertStatement", "id": 45, "src": "0:0:0",
                            "errorCall": {
                                "nodeType": "FunctionCall", "id": 46, "src": "0:0:0", "names": [],
                                "expression": { "nodeType": "Identifier", "id": 47, "src": "0:0:0", "name": "Error" },
                                "arguments": [{ "nodeType": "Literal", "id": 48, "src": "0:0:0", "kind": "string", "value": "say \"no\"", "hexValue": "" }]
                            }
                        }
                    ]}
                }
            ]
        }]
    });

    let expected = r#"abstract contract Vault {
    event Moved(address indexed to);

    /// @notice Moves everything out
    function sweep(uint256[] calldata items) external virtual {
        for (uint256 i = 0; i < items.length; i++) {
            if (items[i] == 1 ether) break; else emit Moved(address(this));
        }
        delete items;
        revert Error("say \"no\"");
    }
}
"#;

    let raw = BTreeMap::from([("Vault.sol".to_string(), ast)]);
    let output = ingest(&raw).unwrap().render(&RenderOptions::default()).unwrap();
    assert_eq!(output.sources["Vault.sol"], expected);
}

#[test]
fn test_render_ast_json() {
    let json = json!({ "sources": { "Counter.sol": { "id": 0, "ast": counter_ast(1) } } }).to_string();
    let output = render_ast_json(&json, true).unwrap();
    assert_eq!(output.sources["Counter.sol"], COUNTER);
    assert!(output.source_maps.unwrap().contains_key("Counter.sol"));

    let err = render_ast_json("[1, 2]", false).unwrap_err();
    assert!(matches!(err, AstError::ParseFailed { .. }));
}

fn src() -> String {
    "0:0:0".to_string()
}

/// Gives a hand-written node the next id and an empty span.
fn node(b: &mut AstBuilder, mut value: Value) -> Value {
    value["id"] = json!(b.id());
    value["src"] = json!(src());
    value
}

fn call(b: &mut AstBuilder, expression: Value, arguments: Vec<Value>) -> Value {
    node(
        b,
        json!({ "nodeType": "FunctionCall", "names": [], "expression": expression, "arguments": arguments }),
    )
}

fn member(b: &mut AstBuilder, expression: Value, name: &str) -> Value {
    node(
        b,
        json!({ "nodeType": "MemberAccess", "memberName": name, "expression": expression }),
    )
}

fn located(b: &mut AstBuilder, name: &str, type_name: &str, location: &str) -> Value {
    let type_name = b.elementary(type_name, src());
    let mut variable = b.var(name, type_name, "internal", false, src());
    variable["storageLocation"] = json!(location);
    variable
}

fn render_one(path: &str, ast: Value) -> RenderOutput {
    let raw = BTreeMap::from([(path.to_string(), ast)]);
    ingest(&raw).unwrap().render(&with_map()).unwrap()
}

fn slice<'a>(output: &'a RenderOutput, path: &str, id: i64) -> &'a str {
    let span = output.source_maps.as_ref().unwrap()[path][&NodeId(id)];
    &output.sources[path][span.offset as usize..span.end()]
}

fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().unwrap()
}

#[test]
fn test_render_payable_conversion() {
    let mut b = AstBuilder::new("", 1);
    let mut owner_type = b.elementary("address", src());
    owner_type["stateMutability"] = json!("payable");
    let owner = b.var("owner", owner_type, "internal", true, src());

    let a_type = b.elementary("address", src());
    let a = b.var("a", a_type, "internal", false, src());
    let parameters = b.params(vec![a], src());
    let returns = b.params(vec![], src());

    let mut conversion_type = b.elementary("address", src());
    conversion_type["stateMutability"] = json!("payable");
    let conversion_type_id = id_of(&conversion_type);
    let conversion = node(
        &mut b,
        json!({ "nodeType": "ElementaryTypeNameExpression", "typeName": conversion_type }),
    );
    let recipient = b.identifier("a", src());
    let payable = call(&mut b, conversion, vec![recipient]);
    let transfer = member(&mut b, payable, "transfer");
    let amount = b.number("1", src());
    let transfer_call = call(&mut b, transfer, vec![amount]);
    let statement = b.expression_statement(transfer_call, src());
    let body = b.block(vec![statement], src());
    let pay = b.function("pay", "public", "nonpayable", parameters, returns, Some(body), src());

    let contract = b.contract("Wallet", vec![], vec![owner, pay], src());
    let ast = b.unit("Wallet.sol", None, vec![contract]);

    let output = render_one("Wallet.sol", ast);
    assert_eq!(
        output.sources["Wallet.sol"],
        "contract Wallet {\n    address payable internal owner;\n\n    function pay(address a) public {\n        payable(a).transfer(1);\n    }\n}\n"
    );
    assert_eq!(slice(&output, "Wallet.sol", conversion_type_id), "payable");
}

#[test]
fn test_render_try_catch() {
    let mut b = AstBuilder::new("", 1);
    let total_type = b.elementary("uint256", src());
    let total = b.var("total", total_type, "internal", true, src());

    let target_type = b.elementary("address", src());
    let target = b.var("target", target_type, "internal", false, src());
    let parameters = b.params(vec![target], src());
    let returns = b.params(vec![], src());

    let interface = b.identifier("Target", src());
    let address = b.identifier("target", src());
    let cast = call(&mut b, interface, vec![address]);
    let ping = member(&mut b, cast, "ping");
    let external_call = call(&mut b, ping, vec![]);

    let value_type = b.elementary("uint256", src());
    let value = b.var("v", value_type, "internal", false, src());
    let success_parameters = b.params(vec![value], src());
    let left = b.identifier("total", src());
    let right = b.identifier("v", src());
    let add = b.assignment("+=", left, right, src());
    let add_statement = b.expression_statement(add, src());
    let success_block = b.block(vec![add_statement], src());
    let success = node(
        &mut b,
        json!({ "nodeType": "TryCatchClause", "errorName": "", "parameters": success_parameters, "block": success_block }),
    );

    let reason = located(&mut b, "reason", "string", "memory");
    let reason_parameters = b.params(vec![reason], src());
    let reason_block = b.block(vec![], src());
    let catch_error = node(
        &mut b,
        json!({ "nodeType": "TryCatchClause", "errorName": "Error", "parameters": reason_parameters, "block": reason_block }),
    );
    let catch_error_id = id_of(&catch_error);

    let data = located(&mut b, "data", "bytes", "memory");
    let data_parameters = b.params(vec![data], src());
    let data_block = b.block(vec![], src());
    let catch_data = node(
        &mut b,
        json!({ "nodeType": "TryCatchClause", "errorName": "", "parameters": data_parameters, "block": data_block }),
    );

    let try_statement = node(
        &mut b,
        json!({ "nodeType": "TryStatement", "externalCall": external_call, "clauses": [success, catch_error, catch_data] }),
    );
    let body = b.block(vec![try_statement], src());
    let function = b.function("call", "public", "nonpayable", parameters, returns, Some(body), src());
    let contract = b.contract("Caller", vec![], vec![total, function], src());
    let ast = b.unit("Caller.sol", None, vec![contract]);

    let expected = r#"contract Caller {
    uint256 internal total;

    function call(address target) public {
        try Target(target).ping() returns (uint256 v) {
            total += v;
        } catch Error(string memory reason) {} catch (bytes memory data) {}
    }
}
"#;
    let output = render_one("Caller.sol", ast);
    assert_eq!(output.sources["Caller.sol"], expected);
    assert_eq!(
        slice(&output, "Caller.sol", catch_error_id),
        "catch Error(string memory reason) {}"
    );
}

#[test]
fn test_bare_catch_clause() {
    let mut b = AstBuilder::new("", 1);
    let parameters = b.params(vec![], src());
    let returns = b.params(vec![], src());
    let callee = b.identifier("target", src());
    let ping = member(&mut b, callee, "ping");
    let external_call = call(&mut b, ping, vec![]);
    let success_block = b.block(vec![], src());
    let success = node(
        &mut b,
        json!({ "nodeType": "TryCatchClause", "errorName": "", "parameters": null, "block": success_block }),
    );
    let fallback_block = b.block(vec![], src());
    let fallback = node(
        &mut b,
        json!({ "nodeType": "TryCatchClause", "errorName": "", "parameters": null, "block": fallback_block }),
    );
    let try_statement = node(
        &mut b,
        json!({ "nodeType": "TryStatement", "externalCall": external_call, "clauses": [success, fallback] }),
    );
    let body = b.block(vec![try_statement], src());
    let function = b.function("poke", "external", "nonpayable", parameters, returns, Some(body), src());
    let contract = b.contract("Poker", vec![], vec![function], src());
    let ast = b.unit("Poker.sol", None, vec![contract]);

    let output = render_one("Poker.sol", ast);
    assert!(output.sources["Poker.sol"].contains("        try target.ping() {} catch {}\n"));
}

fn yul_id(name: &str) -> Value {
    json!({ "nodeType": "YulIdentifier", "src": "0:0:0", "name": name })
}

fn yul_number(value: &str) -> Value {
    json!({ "nodeType": "YulLiteral", "src": "0:0:0", "kind": "number", "value": value, "type": "" })
}

fn yul_call(name: &str, arguments: Vec<Value>) -> Value {
    json!({ "nodeType": "YulFunctionCall", "src": "0:0:0", "functionName": yul_id(name), "arguments": arguments })
}

fn yul_block(statements: Vec<Value>) -> Value {
    json!({ "nodeType": "YulBlock", "src": "0:0:0", "statements": statements })
}

fn yul_let(name: &str, value: Value) -> Value {
    json!({
        "nodeType": "YulVariableDeclaration",
        "src": "0:0:0",
        "variables": [{ "nodeType": "YulTypedName", "src": "0:0:0", "name": name, "type": "" }],
        "value": value
    })
}

fn yul_assign(name: &str, value: Value) -> Value {
    json!({ "nodeType": "YulAssignment", "src": "0:0:0", "variableNames": [yul_id(name)], "value": value })
}

fn yul_statement(expression: Value) -> Value {
    json!({ "nodeType": "YulExpressionStatement", "src": "0:0:0", "expression": expression })
}

#[test]
fn test_render_inline_assembly() {
    let mut b = AstBuilder::new("", 1);
    let a = located(&mut b, "a", "uint256", "default");
    let parameters = b.params(vec![a], src());
    let returns = b.params(vec![], src());

    let yul = yul_block(vec![
        yul_let("x", yul_call("add", vec![yul_id("a"), yul_number("1")])),
        json!({
            "nodeType": "YulIf", "src": "0:0:0",
            "condition": yul_call("iszero", vec![yul_id("x")]),
            "body": yul_block(vec![yul_statement(yul_call("revert", vec![yul_number("0"), yul_number("0")]))])
        }),
        json!({
            "nodeType": "YulSwitch", "src": "0:0:0",
            "expression": yul_id("x"),
            "cases": [
                { "nodeType": "YulCase", "src": "0:0:0", "value": yul_number("1"), "body": yul_block(vec![yul_assign("x", yul_number("2"))]) },
                { "nodeType": "YulCase", "src": "0:0:0", "value": "default", "body": yul_block(vec![]) }
            ]
        }),
        json!({
            "nodeType": "YulForLoop", "src": "0:0:0",
            "pre": yul_block(vec![yul_let("i", yul_number("0"))]),
            "condition": yul_call("lt", vec![yul_id("i"), yul_number("10")]),
            "post": yul_block(vec![yul_assign("i", yul_call("add", vec![yul_id("i"), yul_number("1")]))]),
            "body": yul_block(vec![yul_statement(yul_call("sstore", vec![
                yul_id("i"),
                json!({ "nodeType": "YulLiteral", "src": "0:0:0", "kind": "string", "value": "ab", "type": "" })
            ]))])
        }),
        json!({
            "nodeType": "YulFunctionDefinition", "src": "0:0:0", "name": "double",
            "parameters": [{ "nodeType": "YulTypedName", "src": "0:0:0", "name": "v", "type": "" }],
            "returnVariables": [{ "nodeType": "YulTypedName", "src": "0:0:0", "name": "r", "type": "" }],
            "body": yul_block(vec![yul_assign("r", yul_call("mul", vec![yul_id("v"), yul_number("2")]))])
        }),
    ]);
    let assembly = node(
        &mut b,
        json!({ "nodeType": "InlineAssembly", "flags": ["memory-safe"], "evmVersion": "paris", "externalReferences": [], "AST": yul }),
    );
    let assembly_id = id_of(&assembly);
    let body = b.block(vec![assembly], src());
    let function = b.function("mix", "internal", "pure", parameters, returns, Some(body), src());
    let contract = b.contract("Mixer", vec![], vec![function], src());
    let ast = b.unit("Mixer.sol", None, vec![contract]);

    let expected = r#"contract Mixer {
    function mix(uint256 a) internal pure {
        assembly ("memory-safe") {
            let x := add(a, 1)
            if iszero(x) {
                revert(0, 0)
            }
            switch x
            case 1 {
                x := 2
            }
            default {}
            for { let i := 0 } lt(i, 10) { i := add(i, 1) } {
                sstore(i, "ab")
            }
            function double(v) -> r {
                r := mul(v, 2)
            }
        }
    }
}
"#;
    let output = render_one("Mixer.sol", ast);
    assert_eq!(output.sources["Mixer.sol"], expected);
    assert!(slice(&output, "Mixer.sol", assembly_id).starts_with("assembly (\"memory-safe\") {\n"));
}

#[test]
fn test_render_using_list_function_type_and_slice() {
    let mut b = AstBuilder::new("", 1);
    let underlying = b.elementary("uint256", src());
    let fixed = node(
        &mut b,
        json!({ "nodeType": "UserDefinedValueTypeDefinition", "name": "Fixed", "underlyingType": underlying }),
    );
    let fixed_type = node(
        &mut b,
        json!({ "nodeType": "UserDefinedTypeName", "pathNode": { "nodeType": "IdentifierPath", "name": "Fixed" } }),
    );
    let using = node(
        &mut b,
        json!({
            "nodeType": "UsingForDirective",
            "functionList": [
                { "definition": { "nodeType": "IdentifierPath", "name": "add" }, "operator": "+" },
                { "function": { "nodeType": "IdentifierPath", "name": "sub" } }
            ],
            "typeName": fixed_type,
            "global": true
        }),
    );

    let argument = located(&mut b, "", "uint256", "default");
    let argument_types = b.params(vec![argument], src());
    let result = located(&mut b, "", "bool", "default");
    let result_types = b.params(vec![result], src());
    let hook_type = node(
        &mut b,
        json!({
            "nodeType": "FunctionTypeName",
            "visibility": "external",
            "stateMutability": "view",
            "parameterTypes": argument_types,
            "returnParameterTypes": result_types
        }),
    );
    let check = b.var("check", hook_type, "internal", true, src());

    let data = located(&mut b, "data", "bytes", "calldata");
    let parameters = b.params(vec![data], src());
    let tail = located(&mut b, "", "bytes", "calldata");
    let returns = b.params(vec![tail], src());
    let base = b.identifier("data", src());
    let start = b.number("4", src());
    let range = node(
        &mut b,
        json!({ "nodeType": "IndexRangeAccess", "baseExpression": base, "startExpression": start }),
    );
    let statement = b.return_statement(range, src());
    let body = b.block(vec![statement], src());
    let function = b.function("tail", "external", "pure", parameters, returns, Some(body), src());

    let contract = b.contract("Hooks", vec![], vec![check, function], src());
    let ast = b.unit("Hooks.sol", None, vec![fixed, using, contract]);

    let expected = r#"type Fixed is uint256;

using {add as +, sub} for Fixed global;

contract Hooks {
    function(uint256) external view returns (bool) internal check;

    function tail(bytes calldata data) external pure returns (bytes calldata) {
        return data[4:];
    }
}
"#;
    let output = render_one("Hooks.sol", ast);
    assert_eq!(output.sources["Hooks.sol"], expected);
}
