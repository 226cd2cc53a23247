// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the Rill parser.
//!
//! These tests use `proptest` to verify parser invariants over generated
//! inputs:
//!
//! 1. **Parsing never panics** - arbitrary source either parses or
//!    returns a single diagnostic
//! 2. **Arena invariants** - on success, every non-root node is linked
//!    under a valid parent exactly once, and all payload slots are in
//!    bounds
//! 3. **Generated declarations parse** - well-formed `var`/`const`
//!    declarations over random names, types, and integers build the
//!    expected shape
//! 4. **Generated expressions parse** - random arithmetic nests survive
//!    the Pratt ladder

use proptest::prelude::*;

use crate::ast::{Ast, AstNodeKind, NodeFlags, NodePayload};
use crate::source_analysis::{Parser, scan};

fn parse(source: &str) -> Result<Ast, crate::source_analysis::ParseError> {
    let (tokens, line_starts) = scan("prop", source);
    Parser::new("prop", source, tokens, line_starts).parse()
}

const PRIMITIVE_TYPES: &[&str] = &[
    "u8", "i8", "u16", "i16", "u32", "i32", "u64", "i64", "f32", "f64", "string", "bool",
];

const BINARY_OPERATORS: &[&str] = &["+", "-", "*", "/", "%", "<<", ">>", "&", "|", "^"];

/// A name that is an identifier, not a reserved word.
fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}".prop_filter("reserved words are not identifiers", |name| {
        crate::source_analysis::TokenKind::from_reserved_word(name).is_none()
    })
}

fn primitive_type() -> impl Strategy<Value = &'static str> {
    prop::sample::select(PRIMITIVE_TYPES)
}

/// A small arithmetic expression tree rendered to source text.
fn arithmetic_expr() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        (0u32..1000).prop_map(|n| n.to_string()),
        identifier(),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        (
            inner.clone(),
            prop::sample::select(BINARY_OPERATORS),
            inner,
        )
            .prop_map(|(a, op, b)| format!("({a} {op} {b})"))
    })
}

fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(256),
        ..default
    }
}

/// Checks the arena link invariants on a successfully parsed tree.
fn assert_arena_invariants(ast: &Ast) {
    let len = ast.len();
    for (index, node) in ast.nodes().iter().enumerate() {
        assert!((node.parent as usize) < len, "parent index out of bounds");
        for &child in &node.children {
            assert!((child as usize) < len, "child index out of bounds");
        }
        let slots = match node.payload {
            NodePayload::None => vec![],
            NodePayload::Decl { init, ty, .. } => vec![init, ty],
            NodePayload::Function { return_type, body } => vec![return_type, body],
            NodePayload::Binary { left, right, .. } => vec![left, right],
            NodePayload::Unary { operand, .. } => vec![operand],
            NodePayload::Cast { operand, ty } => vec![operand, ty],
        };
        for slot in slots {
            assert!((slot as usize) < len, "payload index out of bounds");
        }
        if index == 0 {
            continue;
        }
        let occurrences = ast
            .node(node.parent)
            .children
            .iter()
            .filter(|&&c| c as usize == index)
            .count();
        assert_eq!(occurrences, 1, "node {index} not linked exactly once");
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: parsing arbitrary input never panics.
    #[test]
    fn parser_never_panics(input in "\\PC{0,300}") {
        let _ = parse(&input);
    }

    /// Property 2: successful parses satisfy the arena invariants.
    #[test]
    fn arena_invariants_hold(exprs in prop::collection::vec(arithmetic_expr(), 1..4)) {
        let source: String = exprs
            .iter()
            .enumerate()
            .map(|(i, e)| format!("var v{i} = {e};\n"))
            .collect();
        let ast = parse(&source).expect("generated declarations parse");
        assert_arena_invariants(&ast);
    }

    /// Property 3: well-formed declarations produce the expected shape.
    #[test]
    fn generated_decls_parse(
        name in identifier(),
        ty in primitive_type(),
        value in any::<u32>(),
        is_const in any::<bool>(),
        with_type in any::<bool>(),
    ) {
        let keyword = if is_const { "const" } else { "var" };
        let annotation = if with_type {
            format!(": {ty}")
        } else {
            String::new()
        };
        let source = format!("{keyword} {name}{annotation} = {value};");
        let ast = parse(&source).expect("generated decl parses");

        let root_children = &ast.node(Ast::ROOT).children;
        prop_assert_eq!(root_children.len(), 1);
        let decl = ast.node(root_children[0]);
        prop_assert_eq!(decl.kind, AstNodeKind::Decl);

        let NodePayload::Decl { flags, init, ty: ty_slot } = decl.payload else {
            panic!("decl payload expected");
        };
        prop_assert_eq!(flags.contains(NodeFlags::IS_CONST), is_const);
        prop_assert_eq!(flags.contains(NodeFlags::TYPE_INFER), !with_type);
        prop_assert_eq!(ty_slot != 0, with_type);
        prop_assert!(init != 0);
    }

    /// Property 4: random arithmetic nests parse, shifts included.
    #[test]
    fn generated_expressions_parse(expr in arithmetic_expr()) {
        let source = format!("var x = {expr};");
        let ast = parse(&source).expect("generated expression parses");
        assert_arena_invariants(&ast);
    }
}
