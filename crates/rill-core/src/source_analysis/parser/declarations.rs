// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Declaration parsing for Rill.
//!
//! This module contains the declaration-shaped productions, extracted from
//! the main `Parser` implementation:
//!
//! - `var` / `const` declarations (also reused for `for`-loop init clauses
//!   and, in parameter form, for function parameters)
//! - type expressions, including ownership qualifiers (`Own<T>`), generic
//!   argument lists, and `T[]` array suffixes
//! - function definitions and lambdas

use crate::ast::{AstNodeKind, NodeFlags, NodePayload};

use super::{ParseError, ParseErrorKind, Parser, TokenKind};

impl Parser<'_> {
    /// Parses `('var' | 'const') IDENT (':' type)? ('=' expression)? ';'`.
    ///
    /// A missing `:` leaves the type slot at 0 and sets `TYPE_INFER`; a
    /// missing `=` leaves the initializer slot at 0. The terminating `;`
    /// is mandatory.
    pub(super) fn parse_decl(&mut self) -> Result<u32, ParseError> {
        let mut flags = NodeFlags::empty();
        if self.check(TokenKind::Const) {
            flags |= NodeFlags::IS_CONST;
        }
        self.advance();

        let name = self.expect(TokenKind::Identifier)?;
        let decl = self.add_node(AstNodeKind::Decl, name);

        let ty = if self.match_token(TokenKind::Colon) {
            let ty = self.parse_type()?;
            self.add_child(decl, ty);
            ty
        } else {
            flags |= NodeFlags::TYPE_INFER;
            0
        };

        let init = if self.match_token(TokenKind::Equal) {
            let init = self.parse_expression()?;
            self.add_child(decl, init);
            init
        } else {
            0
        };

        self.ast_mut().node_mut(decl).payload = NodePayload::Decl { flags, init, ty };

        self.expect(TokenKind::Semicolon)
            .map_err(|e| e.with_hint("declarations end with `;`"))?;
        Ok(decl)
    }

    /// Parses a type expression.
    ///
    /// ```text
    /// type := primitive
    ///       | ownership '<' type '>'
    ///       | IDENT ('<' type (',' type)* '>')?
    ///       | type '[' ']'
    /// ```
    ///
    /// Nested generics close one `>` at a time thanks to the scanner's
    /// compound-angle split, so `Share<Share<i32>>` needs no special
    /// handling here.
    pub(super) fn parse_type(&mut self) -> Result<u32, ParseError> {
        let type_token = self.current_token();

        let mut ty = match type_token.kind {
            kind if kind.is_primitive_type() => {
                self.advance();
                self.add_node(AstNodeKind::Type, type_token)
            }

            kind if kind.is_ownership() => {
                self.advance();
                self.expect(TokenKind::Less)?;
                let node = self.add_node(AstNodeKind::Type, type_token);
                let inner = self.parse_type()?;
                self.add_child(node, inner);
                self.expect(TokenKind::Greater)?;
                node
            }

            TokenKind::Identifier => {
                self.advance();
                let node = self.add_node(AstNodeKind::Type, type_token);
                if self.match_token(TokenKind::Less) {
                    loop {
                        let argument = self.parse_type()?;
                        self.add_child(node, argument);
                        if !self.match_token(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::Greater)?;
                }
                node
            }

            found => return Err(self.error_here(ParseErrorKind::InvalidType { found })),
        };

        // Trailing `[]` suffixes wrap outward.
        while self.match_token(TokenKind::LeftBracket) {
            self.expect(TokenKind::RightBracket)?;
            let array = self.add_node(AstNodeKind::ArrayType, type_token);
            self.add_child(array, ty);
            ty = array;
        }

        Ok(ty)
    }

    /// Parses a function definition or lambda.
    ///
    /// ```text
    /// function := 'function' IDENT? ('<' generic (',' generic)* '>')?
    ///             '(' (param (',' param)*)? ')' '->' type block
    /// generic  := IDENT '...'?
    /// param    := IDENT ':' type
    /// ```
    ///
    /// The name is required exactly when `is_lambda` is false. Children
    /// are appended in source order: generic parameters, value parameters,
    /// return type, body; the return type and body are also recorded in
    /// the payload.
    pub(super) fn parse_function(&mut self, is_lambda: bool) -> Result<u32, ParseError> {
        let func_token = self.advance();
        let func = self.add_node(AstNodeKind::Function, func_token);

        if !is_lambda {
            self.expect(TokenKind::Identifier)?;
        }

        if self.match_token(TokenKind::Less) {
            loop {
                let param = self.expect(TokenKind::Identifier)?;
                let generic = self.add_node(AstNodeKind::Type, param);
                // A trailing `...` marks the generic as variadic. The
                // spread is consumed; no separate node records it yet.
                self.match_token(TokenKind::Spread);
                self.add_child(func, generic);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Greater)?;
        }

        self.expect(TokenKind::LeftParen)?;
        while !self.check(TokenKind::RightParen) {
            let param = self.parse_parameter()?;
            self.add_child(func, param);

            if !self.check(TokenKind::Comma) && !self.check(TokenKind::RightParen) {
                return Err(self.error_here(ParseErrorKind::InvalidParameter(
                    "parameters must be separated by commas",
                )));
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;

        self.expect(TokenKind::Arrow)?;
        let return_type = self.parse_type()?;
        self.add_child(func, return_type);

        let brace = self.expect(TokenKind::LeftBrace)?;
        let body = self.parse_block(brace)?;
        self.add_child(func, body);

        self.ast_mut().node_mut(func).payload = NodePayload::Function { return_type, body };
        Ok(func)
    }

    /// Parses one `IDENT ':' type` parameter into a `Decl` node.
    fn parse_parameter(&mut self) -> Result<u32, ParseError> {
        if !self.check(TokenKind::Identifier) {
            return Err(self.error_here(ParseErrorKind::InvalidParameter(
                "expected a parameter name",
            )));
        }
        let name = self.advance();

        if !self.match_token(TokenKind::Colon) {
            return Err(self.error_here(ParseErrorKind::InvalidParameter(
                "expected `:` and a type after the parameter name",
            )));
        }
        let ty = self.parse_type()?;

        let param = self.add_node(AstNodeKind::Decl, name);
        self.add_child(param, ty);
        self.ast_mut().node_mut(param).payload = NodePayload::Decl {
            flags: NodeFlags::empty(),
            init: 0,
            ty,
        };
        Ok(param)
    }
}
