// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error types for the Rill parser.
//!
//! Scanner problems are not errors - they travel as [`TokenFlags`] on the
//! tokens themselves. The parser, by contrast, is fail-fast: the first
//! structural error aborts parsing with a [`ParseError`], which carries
//! everything needed to point a human at the problem (module, line,
//! column, the offending source line, a caret) and integrates with
//! [`miette`] for embedding tools.
//!
//! [`TokenFlags`]: super::TokenFlags

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use crate::ast::ColorCode;

use super::{Position, Span, TokenKind};

/// The category of a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A specific token kind was required.
    #[error("expected `{expected}`, found `{found}`")]
    ExpectedToken {
        /// The token kind the grammar required here.
        expected: TokenKind,
        /// The token kind actually present.
        found: TokenKind,
    },

    /// The parameter list of a function is malformed.
    #[error("{0}")]
    InvalidParameter(&'static str),

    /// A type was expected but no acceptable prefix was seen.
    #[error("expected a type, found `{found}`")]
    InvalidType {
        /// The token kind actually present.
        found: TokenKind,
    },

    /// No primary expression can begin with the current token.
    #[error("expected an expression, found `{found}`")]
    UnexpectedPrimary {
        /// The token kind actually present.
        found: TokenKind,
    },

    /// A `.name` postfix was not followed by an argument list.
    #[error("expected `(` after method name")]
    MissingMethodParens,
}

/// A fatal parse error.
///
/// The parser reports at most one of these per invocation and returns no
/// AST alongside it. [`ParseError::render`] produces the colored
/// terminal-ready report; `Display` gives the bare message.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic()]
pub struct ParseError {
    /// What went wrong.
    #[source]
    pub kind: ParseErrorKind,
    /// Module name the parser was created with (paths allowed).
    pub module: EcoString,
    /// 1-based line of the offending token.
    pub line: u32,
    /// Byte column of the offending token within its line.
    pub column: u32,
    /// The source location of the error.
    #[label("here")]
    pub span: Span,
    /// The full source line containing the error.
    pub excerpt: EcoString,
    /// Optional fix-it hint.
    pub hint: Option<EcoString>,
}

impl ParseError {
    /// Builds an error at `span`, resolving line, column, and the source
    /// line excerpt against the scanned input.
    #[must_use]
    pub(crate) fn at(
        kind: ParseErrorKind,
        module: &str,
        span: Span,
        source: &str,
        line_starts: &[u32],
    ) -> Self {
        let position = Position::of(span.start(), line_starts);
        let line_start = line_starts[position.line as usize - 1] as usize;
        let line_end = source[line_start..]
            .find('\n')
            .map_or(source.len(), |i| line_start + i);
        Self {
            kind,
            module: module.into(),
            line: position.line,
            column: position.column,
            span,
            excerpt: source[line_start..line_end].into(),
            hint: None,
        }
    }

    /// Attaches a fix-it hint.
    #[must_use]
    pub(crate) fn with_hint(mut self, hint: impl Into<EcoString>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Renders the full colored report: message, location, excerpt, caret,
    /// and hint.
    #[must_use]
    pub fn render(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{bold}{red}error{reset}{bold}: {msg}{reset}",
            bold = ColorCode::BOLD,
            red = ColorCode::RED,
            reset = ColorCode::RESET,
            msg = self.kind,
        );
        let _ = writeln!(
            out,
            " {blue}-->{reset} {module}:{line}:{column}",
            blue = ColorCode::BLUE,
            reset = ColorCode::RESET,
            module = self.module,
            line = self.line,
            column = self.column,
        );
        let gutter = self.line.to_string().len();
        let _ = writeln!(
            out,
            " {pad} {blue}|{reset}",
            pad = " ".repeat(gutter),
            blue = ColorCode::BLUE,
            reset = ColorCode::RESET,
        );
        let _ = writeln!(
            out,
            " {blue}{line} |{reset} {excerpt}",
            blue = ColorCode::BLUE,
            reset = ColorCode::RESET,
            line = self.line,
            excerpt = self.excerpt,
        );
        let _ = writeln!(
            out,
            " {pad} {blue}|{reset} {caret_pad}{red}^{reset}",
            pad = " ".repeat(gutter),
            blue = ColorCode::BLUE,
            red = ColorCode::RED,
            reset = ColorCode::RESET,
            caret_pad = " ".repeat(self.column as usize),
        );
        if let Some(hint) = &self.hint {
            let _ = writeln!(
                out,
                " {pad} {cyan}= hint: {hint}{reset}",
                pad = " ".repeat(gutter),
                cyan = ColorCode::CYAN,
                reset = ColorCode::RESET,
            );
        }
        out
    }
}
