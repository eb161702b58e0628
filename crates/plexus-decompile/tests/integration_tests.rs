//! End-to-end tests for decompilation and round trips through the
//! compiler.
//!
//! Round trips compare syntax trees rather than text where formatting may
//! legitimately differ; spans never take part in tree equality.

use plexus_codegen::{compile, compile_with, CompileOptions};
use plexus_core::{validate, Graph, NodeKind, Registry, SlotSource};
use plexus_decompile::{decompile, decompile_with, DecompileError, DecompileOptions};
use plexus_syntax::{parse, render, Expr, Module, RenderOptions, Stmt, SyntaxError};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn count(nodes: &[plexus_core::Node], kind: NodeKind) -> usize {
    nodes.iter().filter(|node| node.kind == kind).count()
}

/// Parse both texts and compare their trees.
fn assert_same_program(left: &str, right: &str) {
    assert_eq!(parse(left).unwrap(), parse(right).unwrap(), "\n{left}\n---\n{right}");
}

fn round_trip(source: &str) -> String {
    let graph = decompile(source).unwrap();
    validate(&graph, Registry::builtin()).expect("decompiled graph should validate");
    compile(&graph).unwrap()
}

const SCENARIO_B: &str =
    "price = 100\nif price > 50:\n    print(\"Expensive\")\nelse:\n    print(\"Cheap\")";

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_b_conditional_with_else() {
    let graph = decompile(SCENARIO_B).unwrap();
    assert_eq!(count(&graph.nodes, NodeKind::VariableAssign), 1);
    assert_eq!(count(&graph.nodes, NodeKind::BinaryOp), 1);
    assert_eq!(count(&graph.nodes, NodeKind::IfStatement), 1);

    let assign = &graph.nodes[0];
    assert_eq!(assign.value.as_deref(), Some("price"));

    let binop = graph
        .nodes
        .iter()
        .find(|node| node.kind == NodeKind::BinaryOp)
        .unwrap();
    assert_eq!(binop.value.as_deref(), Some(">"));
    assert_eq!(
        binop.input("left").and_then(|slot| slot.source()),
        Some(SlotSource::Link(&assign.id))
    );

    let branch = graph.nodes.last().unwrap();
    assert_eq!(branch.kind, NodeKind::IfStatement);
    assert_eq!(branch.body.len(), 1);
    assert_eq!(branch.body[0].kind, NodeKind::Print);
    assert_eq!(branch.orelse.len(), 1);
    assert_eq!(branch.orelse[0].kind, NodeKind::Print);

    let text = compile(&graph).unwrap();
    assert_eq!(text, format!("{SCENARIO_B}\n"));
}

#[test]
fn scenario_c_elif_stays_nested() {
    let source = "if a:\n    print(1)\nelif b:\n    print(2)\nelse:\n    print(3)\n";
    let graph = decompile(source).unwrap();
    assert_eq!(graph.nodes.len(), 1);
    let branch = &graph.nodes[0];
    assert!(branch.has_elif());
    let elif = &branch.orelse[0];
    assert_eq!(elif.body.len(), 1);
    assert_eq!(elif.orelse.len(), 1);
    assert_eq!(elif.orelse[0].kind, NodeKind::Print);

    assert_eq!(compile(&graph).unwrap(), source);
}

#[test]
fn elif_tests_with_expressions_are_hoisted() {
    let source = "x = 7\nif x > 10:\n    print('big')\nelif x > 5:\n    print('medium')\nelif x > 0:\n    print('small')\n";
    let graph = decompile(source).unwrap();
    let branch = graph.nodes.last().unwrap();
    assert!(branch.has_elif());
    assert!(branch.orelse[0].has_elif());
    assert_eq!(count(&graph.nodes, NodeKind::BinaryOp), 3);
    assert_eq!(round_trip(source), source);
}

#[test]
fn while_loop_is_unsupported_syntax() {
    let err = decompile("x = 0\nwhile x < 3:\n    x = x + 1\n").unwrap_err();
    match err {
        DecompileError::Syntax(SyntaxError::Unsupported {
            construct, line, ..
        }) => {
            assert_eq!(construct, "while loop");
            assert_eq!(line, 2);
        }
        other => panic!("expected unsupported syntax, got {other:?}"),
    }
}

#[test]
fn malformed_source_is_rejected() {
    let err = decompile("x = (1 +\n").unwrap_err();
    assert!(matches!(err, DecompileError::Syntax(SyntaxError::Invalid { .. })));
}

#[test]
fn misindented_source_is_rejected() {
    for source in ["if x:\nprint(1)\n", "print(1)\n    x = 2\n", "if a:\n    x = 1\n  y = 2\n"] {
        let err = decompile(source).unwrap_err();
        assert!(
            matches!(err, DecompileError::Syntax(SyntaxError::Invalid { .. })),
            "{source:?}: {err:?}"
        );
    }
}

#[test]
fn decompiled_graph_matches_expected_json() {
    let graph = decompile("x = 5\nprint(x)\n").unwrap();
    let expected: Graph = serde_json::from_str(
        r#"{"nodes": [
            {"id": "assign-1", "type": "variable_assign", "value": "x",
             "inputs": [{"name": "value", "value": "5"}]},
            {"id": "print-2", "type": "print",
             "inputs": [{"name": "target", "link": "assign-1"}]}
        ]}"#,
    )
    .unwrap();
    assert_eq!(graph, expected);
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn code_side_round_trip_preserves_programs() {
    let programs = [
        "total = 0\nfor n in [1, 2, 3]:\n    total = total + n\nprint(total)\n",
        "name = input('Who? ')\nprint(name)\n",
        "r = (a + b) * (c - d) / 2\nprint(r ** 2 ** 3)\n",
        "ok = x >= 1 and y != 2 or not_set\nif ok:\n    pass\nelse:\n    print('no')\n",
        "for i in range(1, 10, 2):\n    if i % 3 == 0:\n        print(i)\n",
        "print(len('abc'), math.floor(2.5))\n",
        "v = -3.5 * 2\nprint(v)\n",
    ];
    for program in programs {
        assert_same_program(&round_trip(program), program);
    }
}

#[test]
fn graph_side_round_trip_preserves_output() {
    let json = r#"{"nodes": [
        {"id": "a", "type": "variable_assign", "value": "age",
         "inputs": [{"name": "value", "value": "21"}]},
        {"id": "b", "type": "binary_op", "value": ">=",
         "inputs": [{"name": "left", "link": "a"}, {"name": "right", "value": "18"}]},
        {"id": "c", "type": "if_statement",
         "inputs": [{"name": "test", "link": "b"}],
         "body": [{"id": "d", "type": "print", "inputs": [{"name": "target", "value": "'OK'"}]}],
         "orelse": []}
    ]}"#;
    let original = Graph::from_json(json).unwrap();
    let text = compile(&original).unwrap();
    let rebuilt = decompile(&text).unwrap();
    assert_eq!(compile(&rebuilt).unwrap(), text);
}

#[test]
fn registered_callees_round_trip_with_keywords() {
    let registry = Registry::from_definitions_json(
        r#"[{"node_type": "call_function", "func_name": "round", "module": "builtins",
             "inputs": [{"name": "number"}, {"name": "ndigits", "required": false}]}]"#,
    )
    .unwrap();
    let source = "x = round(3.14159, ndigits=2)\nprint(x)\n";
    let graph = decompile_with(source, &registry, &DecompileOptions::default()).unwrap();
    let text = compile_with(&graph, &registry, &CompileOptions::default()).unwrap();
    assert_eq!(text, "x = round(3.14159, 2)\nprint(x)\n");
}

#[test]
fn decompilation_is_deterministic() {
    let first = serde_json::to_string(&decompile(SCENARIO_B).unwrap()).unwrap();
    for _ in 0..5 {
        let again = serde_json::to_string(&decompile(SCENARIO_B).unwrap()).unwrap();
        assert_eq!(again, first);
    }
}

// ---------------------------------------------------------------------------
// Property: generated arithmetic programs survive decompile -> compile
// ---------------------------------------------------------------------------

const NAMES: [&str; 4] = ["a", "b", "c", "total"];
const OPS: [&str; 11] = ["+", "-", "*", "/", "//", "%", "**", "<", "==", ">=", "and"];

fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        (0u32..1000).prop_map(|n| Expr::literal(n.to_string())),
        proptest::sample::select(NAMES.to_vec()).prop_map(|name| Expr::name(name)),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        (
            inner.clone(),
            proptest::sample::select(OPS.to_vec()),
            inner,
        )
            .prop_map(|(left, symbol, right)| {
                let op = plexus_core::BinaryOperator::from_symbol(symbol)
                    .expect("operator table covers the generated symbols");
                Expr::binop(left, op, right)
            })
    })
}

fn arb_stmt() -> impl Strategy<Value = Stmt> {
    prop_oneof![
        (proptest::sample::select(NAMES.to_vec()), arb_expr())
            .prop_map(|(name, value)| Stmt::assign(name, value)),
        arb_expr().prop_map(|value| Stmt::expr(Expr::Call(plexus_syntax::Call::new(
            "print",
            vec![value]
        )))),
    ]
}

proptest! {
    #[test]
    fn generated_programs_round_trip(body in proptest::collection::vec(arb_stmt(), 1..8)) {
        let text = render(&Module { body }, &RenderOptions::default());
        let graph = decompile(&text).unwrap();
        prop_assert_eq!(compile(&graph).unwrap(), text);
    }
}
