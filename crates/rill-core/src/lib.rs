// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Rill compiler core.
//!
//! This crate contains the Rill language front-end:
//! - Lexical analysis: a single-pass, byte-table scanner producing a
//!   columnar token buffer plus a line-start index
//! - Parsing: a Pratt/recursive-descent parser producing an
//!   index-addressed AST arena with line/column-accurate diagnostics
//!
//! The crate is an embeddable library with no process surface of its own;
//! type checking and code generation consume the [`ast::Ast`] arena
//! read-only.
//!
//! # Example
//!
//! ```
//! use rill_core::prelude::*;
//!
//! let source = "function add(x: i32, y: i32) -> i32 { return x + y; }";
//! let (tokens, line_starts) = scan("adder.rl", source);
//! let ast = Parser::new("adder.rl", source, tokens, line_starts)
//!     .parse()
//!     .expect("well-formed module");
//!
//! let root = ast.node(Ast::ROOT);
//! assert_eq!(root.children.len(), 1);
//! ```

pub mod ast;
pub mod source_analysis;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{Ast, AstNode, AstNodeKind, NodeFlags, NodePayload};
    pub use crate::source_analysis::{
        ParseError, ParseErrorKind, Parser, Scanner, Span, Token, TokenFlags, TokenKind,
        TokenList, scan,
    };
}
