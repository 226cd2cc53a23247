// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source analysis for Rill: scanning and parsing.
//!
//! # Scanning
//!
//! The [`Scanner`] converts source text into a columnar [`TokenList`]
//! (parallel start/length/kind/flag arrays) plus a line-start index. It is
//! a single byte-table-driven pass; see [`TokenKind`] for the full lexeme
//! set.
//!
//! ```
//! use rill_core::source_analysis::{Scanner, TokenKind};
//!
//! let mut scanner = Scanner::new("demo", "const n = 3;");
//! let tokens = scanner.tokenize();
//! assert_eq!(tokens.kind(0), TokenKind::Const);
//! ```
//!
//! # Parsing
//!
//! The [`Parser`] turns the token buffer into an index-addressed
//! [`Ast`](crate::ast::Ast) arena. Binary operator precedence uses Pratt
//! parsing (see the [`parser`] module docs for the precedence table).
//!
//! # Error Handling
//!
//! The two components disagree on purpose:
//!
//! - **Scanner errors are data.** Malformed lexemes produce tokens whose
//!   [`TokenFlags`] describe the problem; scanning never fails.
//! - **Parser errors are fatal.** The first structural error becomes a
//!   [`ParseError`] (module, line, column, excerpt, caret) and no AST is
//!   returned.

mod error;
mod lexer;
mod parser;
mod span;
mod token;


pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Scanner, scan};
pub use parser::Parser;
pub use span::{Position, Span};
pub use token::{Token, TokenFlags, TokenKind, TokenList};
