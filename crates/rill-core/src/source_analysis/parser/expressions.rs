// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing for Rill.
//!
//! This module contains the expression grammar, extracted from the main
//! `Parser` implementation:
//!
//! - assignment (right-associative) and the ternary conditional
//! - the binary operator ladder, Pratt-parsed via [`binary_binding_power`]
//! - prefix unary operators, `new` and `delete`
//! - primary expressions: literals, identifiers with call/method-call
//!   postfix chains, grouping, array initializers, `cast<T>(expr)`, and
//!   lambdas
//!
//! Shift operators deserve a note: the scanner emits `<<` and `>>` as two
//! single-angle tokens flagged `COMPOUND_START`/`COMPOUND_END` (so generic
//! argument lists can consume one `>` at a time). The operator peek below
//! is the only place those pairs are reassembled.

use crate::ast::{AstNodeKind, NodePayload};
use crate::source_analysis::TokenFlags;

use super::{ParseError, ParseErrorKind, Parser, Token, TokenKind, binary_binding_power};

impl Parser<'_> {
    /// Parses a full expression (assignment level).
    pub(super) fn parse_expression(&mut self) -> Result<u32, ParseError> {
        self.parse_assignment()
    }

    /// Parses the right-associative assignment level:
    /// `=  +=  -=  *=  /=  %=  &=  |=  ^=  <<=  >>=`.
    fn parse_assignment(&mut self) -> Result<u32, ParseError> {
        let target = self.parse_ternary()?;

        if self.current_kind().is_assignment_op() {
            let op_token = self.advance();
            let value = self.parse_expression()?;
            return Ok(self.binary_node(op_token, op_token.kind, target, value));
        }

        Ok(target)
    }

    /// Parses `cond ? then : else`, right-associative in both branches.
    fn parse_ternary(&mut self) -> Result<u32, ParseError> {
        let condition = self.parse_binary_expression(0)?;

        if self.check(TokenKind::Question) {
            let question = self.advance();
            let then_branch = self.parse_expression()?;
            self.expect(TokenKind::Colon)?;
            let else_branch = self.parse_expression()?;

            let node = self.add_node(AstNodeKind::Ternary, question);
            self.add_child(node, condition);
            self.add_child(node, then_branch);
            self.add_child(node, else_branch);
            return Ok(node);
        }

        Ok(condition)
    }

    /// Pratt loop over the binary operator ladder.
    ///
    /// Reads a unary expression, then keeps consuming operators whose left
    /// binding power is at least `min_bp`, recursing with the operator's
    /// right binding power for the right operand.
    fn parse_binary_expression(&mut self, min_bp: u8) -> Result<u32, ParseError> {
        let mut lhs = self.parse_unary()?;

        while let Some((op, width)) = self.peek_binary_operator() {
            let Some(bp) = binary_binding_power(op) else {
                break;
            };
            if bp.left < min_bp {
                break;
            }

            let op_token = self.advance();
            if width == 2 {
                // Second half of a compound `<<` / `>>` pair.
                self.advance();
            }

            let rhs = self.parse_binary_expression(bp.right)?;
            lhs = self.binary_node(op_token, op, lhs, rhs);
        }

        Ok(lhs)
    }

    /// Resolves the current token(s) to a binary operator.
    ///
    /// An angle token flagged `COMPOUND_START` whose successor is the
    /// matching `COMPOUND_END` half resolves to a shift operator spanning
    /// both tokens; everything else resolves to its own kind.
    fn peek_binary_operator(&self) -> Option<(TokenKind, usize)> {
        let token = self.current_token();
        let next = self.peek_at(1);

        let compound = |kind| {
            token.flags.contains(TokenFlags::COMPOUND_START)
                && next.kind == kind
                && next.flags.contains(TokenFlags::COMPOUND_END)
        };

        match token.kind {
            TokenKind::Less if compound(TokenKind::Less) => Some((TokenKind::ShiftLeft, 2)),
            TokenKind::Greater if compound(TokenKind::Greater) => {
                Some((TokenKind::ShiftRight, 2))
            }
            TokenKind::Eof => None,
            kind => Some((kind, 1)),
        }
    }

    /// Appends a `BinaryExpr` node over two operands.
    fn binary_node(&mut self, op_token: Token, op: TokenKind, left: u32, right: u32) -> u32 {
        let node = self.add_node(AstNodeKind::BinaryExpr, op_token);
        self.add_child(node, left);
        self.add_child(node, right);
        self.ast_mut().node_mut(node).payload = NodePayload::Binary { left, right, op };
        node
    }

    /// Parses prefix unary operators: `! - ~ & *`, plus `new` and
    /// `delete`.
    pub(super) fn parse_unary(&mut self) -> Result<u32, ParseError> {
        match self.current_kind() {
            TokenKind::Bang
            | TokenKind::Minus
            | TokenKind::Tilde
            | TokenKind::Amp
            | TokenKind::Star
            | TokenKind::Delete => {
                let op_token = self.advance();
                let operand = self.parse_unary()?;
                Ok(self.unary_node(op_token, operand))
            }
            TokenKind::New => self.parse_new(),
            _ => self.parse_primary(),
        }
    }

    /// Parses `new type ( '{' args '}' | '(' expr ')' )?`.
    ///
    /// The allocated type is the unary operand; the initializer, when
    /// present, is attached as an extra child.
    fn parse_new(&mut self) -> Result<u32, ParseError> {
        let new_token = self.advance();
        let ty = self.parse_type()?;
        let node = self.unary_node(new_token, ty);

        if self.check(TokenKind::LeftBrace) {
            let brace = self.advance();
            let init = self.parse_array_init(brace)?;
            self.add_child(node, init);
        } else if self.match_token(TokenKind::LeftParen) {
            let init = self.parse_expression()?;
            self.expect(TokenKind::RightParen)?;
            self.add_child(node, init);
        }

        Ok(node)
    }

    fn unary_node(&mut self, op_token: Token, operand: u32) -> u32 {
        let node = self.add_node(AstNodeKind::UnaryExpr, op_token);
        self.add_child(node, operand);
        self.ast_mut().node_mut(node).payload = NodePayload::Unary {
            operand,
            op: op_token.kind,
        };
        node
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> Result<u32, ParseError> {
        let token = self.current_token();
        match token.kind {
            kind if kind.is_literal() => {
                self.advance();
                Ok(self.add_node(AstNodeKind::Literal, token))
            }

            TokenKind::LeftBrace => {
                self.advance();
                self.parse_array_init(token)
            }

            // Grouping produces no node of its own.
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RightParen)?;
                Ok(expr)
            }

            TokenKind::Identifier => {
                self.advance();
                let id = self.add_node(AstNodeKind::Identifier, token);
                self.parse_postfix_chain(token, id)
            }

            TokenKind::Cast => self.parse_cast(),

            TokenKind::Function => self.parse_function(true),

            found => Err(self.error_here(ParseErrorKind::UnexpectedPrimary { found })),
        }
    }

    /// Postfix loop over `.method(args)` and `(args)` applications.
    fn parse_postfix_chain(&mut self, callee_token: Token, start: u32) -> Result<u32, ParseError> {
        let mut expr = start;
        loop {
            if self.match_token(TokenKind::Dot) {
                let method = self.expect(TokenKind::Identifier)?;
                if !self.match_token(TokenKind::LeftParen) {
                    return Err(self.error_here(ParseErrorKind::MissingMethodParens));
                }
                let call = self.add_node(AstNodeKind::MethodCall, method);
                self.add_child(call, expr);
                self.parse_call_args(call)?;
                expr = call;
            } else if self.match_token(TokenKind::LeftParen) {
                let call = self.add_node(AstNodeKind::Call, callee_token);
                self.add_child(call, expr);
                self.parse_call_args(call)?;
                expr = call;
            } else {
                return Ok(expr);
            }
        }
    }

    /// Parses the comma-separated arguments of a call, up to and including
    /// the closing parenthesis.
    fn parse_call_args(&mut self, call: u32) -> Result<(), ParseError> {
        while !self.check(TokenKind::RightParen) {
            let arg = self.parse_expression()?;
            self.add_child(call, arg);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(())
    }

    /// Parses `{ expr (',' expr)* ','? }` into an `ArrayInit` node. The
    /// opening brace has already been consumed and is passed in.
    pub(super) fn parse_array_init(&mut self, brace: Token) -> Result<u32, ParseError> {
        let node = self.add_node(AstNodeKind::ArrayInit, brace);
        if !self.match_token(TokenKind::RightBrace) {
            loop {
                let element = self.parse_expression()?;
                self.add_child(node, element);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
                if self.check(TokenKind::RightBrace) {
                    break;
                }
            }
            self.expect(TokenKind::RightBrace)?;
        }
        Ok(node)
    }

    /// Parses `cast '<' type '>' '(' expr ')'`.
    fn parse_cast(&mut self) -> Result<u32, ParseError> {
        let cast_token = self.advance();
        self.expect(TokenKind::Less)?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Greater)?;
        self.expect(TokenKind::LeftParen)?;
        let operand = self.parse_expression()?;
        self.expect(TokenKind::RightParen)?;

        let node = self.add_node(AstNodeKind::CastExpr, cast_token);
        self.add_child(node, ty);
        self.add_child(node, operand);
        self.ast_mut().node_mut(node).payload = NodePayload::Cast { operand, ty };
        Ok(node)
    }
}
