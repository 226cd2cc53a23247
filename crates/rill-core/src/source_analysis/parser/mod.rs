// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for Rill source code.
//!
//! The parser consumes the columnar token buffer produced by the scanner
//! and builds an index-addressed [`Ast`] arena. It is a pure push-down
//! over token indices: the only state is the current cursor and the arena
//! under construction.
//!
//! # Error Policy
//!
//! Errors are fatal. The first structural problem produces a
//! [`ParseError`] - rendered to standard error with module, line, column,
//! the offending source line, and a caret - and no AST is returned. There
//! is no recovery and no multi-error collection; the caller gets either a
//! complete tree or a single precise diagnostic.
//!
//! # Expression Precedence (Pratt)
//!
//! Binary operator precedence uses Pratt parsing driven by a binding-power
//! table (see [`binary_binding_power`]). Assignment and the ternary
//! conditional sit below the table and associate to the right by recursing
//! into the whole expression grammar for their right-hand side.
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | assignment | `=` `+=` `-=` `*=` `/=` `%=` `&=` `\|=` `^=` `<<=` `>>=` | Right |
//! | ternary | `? :` | Right |
//! | 10  | `\|\|` | Left |
//! | 20  | `&&` | Left |
//! | 30  | `\|` | Left |
//! | 40  | `^` | Left |
//! | 50  | `&` | Left |
//! | 60  | `<<` `>>` | Left |
//! | 70  | `==` `!=` | Left |
//! | 80  | `<` `<=` `>` `>=` | Left |
//! | 90  | `+` `-` | Left |
//! | 100 | `*` `/` `%` | Left |
//!
//! The shift operators never arrive as single tokens: the scanner splits
//! `<<` and `>>` into two flagged single-angle tokens so that generic
//! argument lists can close one `>` at a time. The binary-expression loop
//! reassembles adjacent `COMPOUND_START`/`COMPOUND_END` pairs into shift
//! operators; everything else treats the halves as ordinary angles.
//!
//! # Usage
//!
//! ```
//! use rill_core::source_analysis::{Parser, scan};
//!
//! let source = "var x: i32 = 0;";
//! let (tokens, line_starts) = scan("demo", source);
//! let ast = Parser::new("demo", source, tokens, line_starts)
//!     .parse()
//!     .expect("well-formed input");
//! assert_eq!(ast.node(0).children.len(), 1);
//! ```

use ecow::EcoString;

use crate::ast::{Ast, AstNodeKind};

use super::{ParseError, ParseErrorKind, Token, TokenKind, TokenList};

// Submodules with additional impl blocks for Parser
mod declarations;
mod expressions;

// Property-based tests for the parser.
#[cfg(test)]
mod property_tests;

// ============================================================================
// Pratt Parsing for Binary Operator Precedence
// ============================================================================

/// Binding power for binary operators (Pratt parsing).
///
/// Higher values bind tighter. All binary levels in the table are
/// left-associative, so `right == left + 1`; assignment and ternary are
/// handled outside the table and recurse for right associativity.
#[derive(Debug, Clone, Copy)]
pub(super) struct BindingPower {
    /// How tightly this operator binds to its left operand.
    pub(super) left: u8,
    /// How tightly this operator binds to its right operand.
    pub(super) right: u8,
}

impl BindingPower {
    /// Creates a left-associative binding power.
    const fn left_assoc(precedence: u8) -> Self {
        Self {
            left: precedence,
            right: precedence + 1,
        }
    }
}

/// Gets the binding power for a binary operator.
///
/// Returns `None` for non-operators, which ends the binary expression
/// loop. The precedence levels are listed in the module docs; to add an
/// operator, add an entry here.
pub(super) fn binary_binding_power(op: TokenKind) -> Option<BindingPower> {
    let bp = match op {
        TokenKind::OrOr => BindingPower::left_assoc(10),
        TokenKind::AndAnd => BindingPower::left_assoc(20),
        TokenKind::Pipe => BindingPower::left_assoc(30),
        TokenKind::Caret => BindingPower::left_assoc(40),
        TokenKind::Amp => BindingPower::left_assoc(50),
        TokenKind::ShiftLeft | TokenKind::ShiftRight => BindingPower::left_assoc(60),
        TokenKind::EqualEqual | TokenKind::BangEqual => BindingPower::left_assoc(70),
        TokenKind::Less
        | TokenKind::LessEqual
        | TokenKind::Greater
        | TokenKind::GreaterEqual => BindingPower::left_assoc(80),
        TokenKind::Plus | TokenKind::Minus => BindingPower::left_assoc(90),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => BindingPower::left_assoc(100),
        _ => return None,
    };
    Some(bp)
}

/// The parser state.
pub struct Parser<'src> {
    /// Module name for diagnostics (paths allowed).
    module_name: EcoString,
    /// The source text; consulted only through token offsets.
    source: &'src str,
    /// The columnar token buffer, ending in exactly one EOF token.
    tokens: TokenList,
    /// Line-start index from the scanner, for line/column resolution.
    line_starts: Vec<u32>,
    /// Current token index.
    current: usize,
    /// The arena under construction.
    ast: Ast,
}

impl<'src> Parser<'src> {
    /// Creates a parser over a scanned module.
    ///
    /// `tokens` and `line_starts` must come from scanning `source`; the
    /// token buffer's trailing EOF is what stops the parse loop.
    #[must_use]
    pub fn new(
        module_name: impl Into<EcoString>,
        source: &'src str,
        tokens: TokenList,
        line_starts: Vec<u32>,
    ) -> Self {
        Self {
            module_name: module_name.into(),
            source,
            tokens,
            line_starts,
            current: 0,
            ast: Ast::new(),
        }
    }

    /// Parses the module into an AST.
    ///
    /// The root node's children are the top-level declarations in source
    /// order. On a structural error the diagnostic is written to standard
    /// error and returned; no AST escapes a failed parse.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered.
    pub fn parse(mut self) -> Result<Ast, ParseError> {
        match self.parse_program() {
            Ok(()) => Ok(self.ast),
            Err(error) => {
                eprintln!("{}", error.render());
                Err(error)
            }
        }
    }

    fn parse_program(&mut self) -> Result<(), ParseError> {
        while !self.is_at_end() {
            match self.current_kind() {
                TokenKind::Var | TokenKind::Const => {
                    let decl = self.parse_decl()?;
                    self.ast.add_child(Ast::ROOT, decl);
                }
                TokenKind::Function => {
                    let func = self.parse_function(false)?;
                    self.ast.add_child(Ast::ROOT, func);
                }
                // Class and struct bodies are not parsed yet; the tokens
                // are consumed and dropped.
                TokenKind::Class | TokenKind::Struct => {
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Returns the current token without consuming it.
    ///
    /// Past the end of the buffer this keeps returning the trailing EOF
    /// token rather than panicking.
    pub(super) fn current_token(&self) -> Token {
        let index = self.current.min(self.tokens.len() - 1);
        self.tokens.get(index)
    }

    /// Returns the current token kind.
    pub(super) fn current_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Returns the token `offset` positions ahead (0 = current), clamped
    /// to the trailing EOF.
    pub(super) fn peek_at(&self, offset: usize) -> Token {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        self.tokens.get(index)
    }

    /// Checks if the cursor sits on the EOF token.
    pub(super) fn is_at_end(&self) -> bool {
        self.current_kind().is_eof()
    }

    /// Consumes and returns the current token. At EOF the cursor stays
    /// put and the EOF token is returned.
    pub(super) fn advance(&mut self) -> Token {
        let token = self.current_token();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Checks whether the current token has the given kind.
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consumes the current token if it has the given kind.
    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Requires the current token to have the given kind.
    ///
    /// # Errors
    ///
    /// Returns an `ExpectedToken` error at the current token otherwise.
    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.expected(kind))
        }
    }

    // ========================================================================
    // Error Construction
    // ========================================================================

    /// Builds an `ExpectedToken` error at the current token.
    pub(super) fn expected(&self, expected: TokenKind) -> ParseError {
        self.error_here(ParseErrorKind::ExpectedToken {
            expected,
            found: self.current_kind(),
        })
    }

    /// Builds an error of the given category at the current token.
    pub(super) fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::at(
            kind,
            &self.module_name,
            self.current_token().span(),
            self.source,
            &self.line_starts,
        )
    }

    /// Shorthand for arena appends inside the productions.
    pub(super) fn add_node(&mut self, kind: AstNodeKind, token: Token) -> u32 {
        self.ast.add_node(kind, token)
    }

    pub(super) fn add_child(&mut self, parent: u32, child: u32) {
        self.ast.add_child(parent, child);
    }

    pub(super) fn ast_mut(&mut self) -> &mut Ast {
        &mut self.ast
    }

    // ========================================================================
    // Statements & Control Flow
    // ========================================================================

    /// Parses a `{ ... }` statement block. The opening brace has already
    /// been consumed and is passed in as the block's token.
    pub(super) fn parse_block(&mut self, brace: Token) -> Result<u32, ParseError> {
        let block = self.add_node(AstNodeKind::Block, brace);
        while !self.match_token(TokenKind::RightBrace) {
            if self.is_at_end() {
                return Err(self.expected(TokenKind::RightBrace));
            }
            let statement = match self.current_kind() {
                TokenKind::Var | TokenKind::Const => self.parse_decl()?,
                TokenKind::Return => self.parse_return()?,
                TokenKind::If => self.parse_if()?,
                TokenKind::While => self.parse_while()?,
                TokenKind::For => self.parse_for()?,
                TokenKind::Break => self.parse_loop_exit(AstNodeKind::Break)?,
                TokenKind::Continue => self.parse_loop_exit(AstNodeKind::Continue)?,
                _ => {
                    let expr = self.parse_expression()?;
                    self.expect(TokenKind::Semicolon)
                        .map_err(|e| e.with_hint("statements end with `;`"))?;
                    expr
                }
            };
            self.add_child(block, statement);
        }
        Ok(block)
    }

    /// Parses `return expr? ;`.
    fn parse_return(&mut self) -> Result<u32, ParseError> {
        let return_token = self.advance();
        let node = self.add_node(AstNodeKind::Return, return_token);
        if !self.match_token(TokenKind::Semicolon) {
            let value = self.parse_expression()?;
            self.add_child(node, value);
            self.expect(TokenKind::Semicolon)
                .map_err(|e| e.with_hint("statements end with `;`"))?;
        }
        Ok(node)
    }

    /// Parses `break;` or `continue;`.
    fn parse_loop_exit(&mut self, kind: AstNodeKind) -> Result<u32, ParseError> {
        let token = self.advance();
        let node = self.add_node(kind, token);
        self.expect(TokenKind::Semicolon)?;
        Ok(node)
    }

    /// Parses `if (cond) block (else (if | block))?`.
    ///
    /// Children: condition, then-block, and the else branch when present
    /// (either a nested `If` or a `Block`).
    fn parse_if(&mut self) -> Result<u32, ParseError> {
        let if_token = self.advance();
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen)?;

        let brace = self.expect(TokenKind::LeftBrace)?;
        let then_branch = self.parse_block(brace)?;

        let mut else_branch = 0;
        if self.match_token(TokenKind::Else) {
            else_branch = if self.check(TokenKind::If) {
                self.parse_if()?
            } else {
                let brace = self.expect(TokenKind::LeftBrace)?;
                self.parse_block(brace)?
            };
        }

        let node = self.add_node(AstNodeKind::If, if_token);
        self.add_child(node, condition);
        self.add_child(node, then_branch);
        if else_branch != 0 {
            self.add_child(node, else_branch);
        }
        Ok(node)
    }

    /// Parses `while (cond) block`.
    fn parse_while(&mut self) -> Result<u32, ParseError> {
        let while_token = self.advance();
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen)?;

        let brace = self.expect(TokenKind::LeftBrace)?;
        let body = self.parse_block(brace)?;

        let node = self.add_node(AstNodeKind::While, while_token);
        self.add_child(node, condition);
        self.add_child(node, body);
        Ok(node)
    }

    /// Parses `for (init?; cond?; step?) block`.
    ///
    /// Children are the present clauses in order, then the body block. The
    /// init clause is a full declaration (which consumes its own `;`) or
    /// an expression.
    fn parse_for(&mut self) -> Result<u32, ParseError> {
        let for_token = self.advance();
        self.expect(TokenKind::LeftParen)?;

        let mut init = 0;
        if !self.match_token(TokenKind::Semicolon) {
            init = if matches!(self.current_kind(), TokenKind::Var | TokenKind::Const) {
                self.parse_decl()?
            } else {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon)?;
                expr
            };
        }

        let mut condition = 0;
        if !self.match_token(TokenKind::Semicolon) {
            condition = self.parse_expression()?;
            self.expect(TokenKind::Semicolon)?;
        }

        let mut step = 0;
        if !self.match_token(TokenKind::RightParen) {
            step = self.parse_expression()?;
            self.expect(TokenKind::RightParen)?;
        }

        let brace = self.expect(TokenKind::LeftBrace)?;
        let body = self.parse_block(brace)?;

        let node = self.add_node(AstNodeKind::For, for_token);
        if init != 0 {
            self.add_child(node, init);
        }
        if condition != 0 {
            self.add_child(node, condition);
        }
        if step != 0 {
            self.add_child(node, step);
        }
        self.add_child(node, body);
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeFlags, NodePayload};
    use crate::source_analysis::scan;

    fn parse_source(source: &str) -> Ast {
        let (tokens, line_starts) = scan("test", source);
        Parser::new("test", source, tokens, line_starts)
            .parse()
            .expect("source should parse")
    }

    fn parse_error(source: &str) -> ParseError {
        let (tokens, line_starts) = scan("test", source);
        Parser::new("test", source, tokens, line_starts)
            .parse()
            .expect_err("source should fail to parse")
    }

    /// The single top-level child of the root.
    fn sole_child(ast: &Ast) -> u32 {
        let children = &ast.node(Ast::ROOT).children;
        assert_eq!(children.len(), 1, "expected one top-level node");
        children[0]
    }

    #[test]
    fn var_decl_with_type_and_init() {
        let ast = parse_source("var x: i32 = 0;");
        let decl_idx = sole_child(&ast);
        let decl = ast.node(decl_idx);
        assert_eq!(decl.kind, AstNodeKind::Decl);
        assert_eq!(decl.token.kind, TokenKind::Identifier);

        let NodePayload::Decl { flags, init, ty } = decl.payload else {
            panic!("decl payload expected");
        };
        assert_eq!(flags, NodeFlags::empty());
        assert_ne!(ty, 0);
        assert_ne!(init, 0);

        let ty_node = ast.node(ty);
        assert_eq!(ty_node.kind, AstNodeKind::Type);
        assert_eq!(ty_node.token.kind, TokenKind::I32);

        let init_node = ast.node(init);
        assert_eq!(init_node.kind, AstNodeKind::Literal);
        assert_eq!(init_node.token.kind, TokenKind::NumLiteral);
    }

    #[test]
    fn const_array_decl_with_initializer_list() {
        let ast = parse_source("const arr: i32[] = { 1, 2, 3, 4, 5 };");
        let decl = ast.node(sole_child(&ast));
        let NodePayload::Decl { flags, init, ty } = decl.payload else {
            panic!("decl payload expected");
        };
        assert!(flags.contains(NodeFlags::IS_CONST));

        let array_type = ast.node(ty);
        assert_eq!(array_type.kind, AstNodeKind::ArrayType);
        let element = ast.node(array_type.children[0]);
        assert_eq!(element.kind, AstNodeKind::Type);
        assert_eq!(element.token.kind, TokenKind::I32);

        let init_node = ast.node(init);
        assert_eq!(init_node.kind, AstNodeKind::ArrayInit);
        assert_eq!(init_node.children.len(), 5);
        for &child in &init_node.children {
            assert_eq!(ast.node(child).kind, AstNodeKind::Literal);
        }
    }

    #[test]
    fn decl_without_type_sets_infer_flag() {
        let ast = parse_source("const y = 8;");
        let decl = ast.node(sole_child(&ast));
        let NodePayload::Decl { flags, init, ty } = decl.payload else {
            panic!("decl payload expected");
        };
        assert!(flags.contains(NodeFlags::IS_CONST));
        assert!(flags.contains(NodeFlags::TYPE_INFER));
        assert_eq!(ty, 0);
        assert_ne!(init, 0);
    }

    #[test]
    fn decl_without_initializer() {
        let ast = parse_source("var x: u64;");
        let decl = ast.node(sole_child(&ast));
        let NodePayload::Decl { flags, init, ty } = decl.payload else {
            panic!("decl payload expected");
        };
        assert_eq!(flags, NodeFlags::empty());
        assert_eq!(init, 0);
        assert_ne!(ty, 0);
    }

    #[test]
    fn nested_generic_ownership_type() {
        let ast = parse_source("var x: Share<Share<i32>> = null;");
        let decl = ast.node(sole_child(&ast));
        let NodePayload::Decl { ty, init, .. } = decl.payload else {
            panic!("decl payload expected");
        };

        let outer = ast.node(ty);
        assert_eq!(outer.kind, AstNodeKind::Type);
        assert_eq!(outer.token.kind, TokenKind::Share);
        let inner = ast.node(outer.children[0]);
        assert_eq!(inner.token.kind, TokenKind::Share);
        let leaf = ast.node(inner.children[0]);
        assert_eq!(leaf.token.kind, TokenKind::I32);

        assert_eq!(ast.node(init).token.kind, TokenKind::Null);
    }

    #[test]
    fn ref_decl_with_address_of_initializer() {
        let ast = parse_source("const z: Ref<u32> = &x;");
        let decl = ast.node(sole_child(&ast));
        let NodePayload::Decl { ty, init, .. } = decl.payload else {
            panic!("decl payload expected");
        };
        assert_eq!(ast.node(ty).token.kind, TokenKind::Ref);

        let unary = ast.node(init);
        assert_eq!(unary.kind, AstNodeKind::UnaryExpr);
        let NodePayload::Unary { operand, op } = unary.payload else {
            panic!("unary payload expected");
        };
        assert_eq!(op, TokenKind::Amp);
        assert_eq!(ast.node(operand).kind, AstNodeKind::Identifier);
    }

    #[test]
    fn function_with_params_return_type_and_empty_body() {
        let ast = parse_source("function add(x: i32, y: i32) -> i32 {}");
        let func_idx = sole_child(&ast);
        let func = ast.node(func_idx);
        assert_eq!(func.kind, AstNodeKind::Function);

        let NodePayload::Function { return_type, body } = func.payload else {
            panic!("function payload expected");
        };
        assert_ne!(return_type, 0);
        assert_ne!(body, 0);
        assert_eq!(ast.node(return_type).token.kind, TokenKind::I32);
        assert_eq!(ast.node(body).kind, AstNodeKind::Block);
        assert!(ast.node(body).children.is_empty());

        // Children: the two parameter decls, then return type, then body.
        assert_eq!(func.children.len(), 4);
        for &param in &func.children[..2] {
            let param_node = ast.node(param);
            assert_eq!(param_node.kind, AstNodeKind::Decl);
            let NodePayload::Decl { ty, .. } = param_node.payload else {
                panic!("param payload expected");
            };
            assert_eq!(ast.node(ty).token.kind, TokenKind::I32);
        }
        assert_eq!(func.children[2], return_type);
        assert_eq!(func.children[3], body);
    }

    #[test]
    fn for_loop_has_exactly_four_children() {
        let ast = parse_source("for (var i = 0; i < 10; i += 1) {}");
        let node = ast.node(sole_child(&ast));
        assert_eq!(node.kind, AstNodeKind::For);
        assert_eq!(node.children.len(), 4);

        let init = ast.node(node.children[0]);
        assert_eq!(init.kind, AstNodeKind::Decl);

        let cond = ast.node(node.children[1]);
        assert_eq!(cond.kind, AstNodeKind::BinaryExpr);
        assert!(matches!(
            cond.payload,
            NodePayload::Binary { op: TokenKind::Less, .. }
        ));

        let step = ast.node(node.children[2]);
        assert!(matches!(
            step.payload,
            NodePayload::Binary { op: TokenKind::PlusEqual, .. }
        ));

        let body = ast.node(node.children[3]);
        assert_eq!(body.kind, AstNodeKind::Block);
        assert!(body.children.is_empty());
    }

    #[test]
    fn for_loop_with_empty_clauses() {
        let ast = parse_source("for (;;) { break; }");
        let node = ast.node(sole_child(&ast));
        assert_eq!(node.kind, AstNodeKind::For);
        // Only the body remains.
        assert_eq!(node.children.len(), 1);
        let body = ast.node(node.children[0]);
        assert_eq!(body.kind, AstNodeKind::Block);
        assert_eq!(ast.node(body.children[0]).kind, AstNodeKind::Break);
    }

    #[test]
    fn if_else_chain() {
        let ast = parse_source(
            "function f(x: i32) -> void { if (x > 0) { return; } else if (x < 0) { x = 1; } else { x = 2; } }",
        );
        let func = ast.node(sole_child(&ast));
        let NodePayload::Function { body, .. } = func.payload else {
            panic!("function payload expected");
        };
        let if_idx = ast.node(body).children[0];
        let if_node = ast.node(if_idx);
        assert_eq!(if_node.kind, AstNodeKind::If);
        assert_eq!(if_node.children.len(), 3);

        let else_if = ast.node(if_node.children[2]);
        assert_eq!(else_if.kind, AstNodeKind::If);
        assert_eq!(else_if.children.len(), 3);
        assert_eq!(ast.node(else_if.children[2]).kind, AstNodeKind::Block);
    }

    #[test]
    fn while_loop_with_statements() {
        let ast = parse_source("function f() -> void { while (true) { continue; } }");
        let func = ast.node(sole_child(&ast));
        let NodePayload::Function { body, .. } = func.payload else {
            panic!("function payload expected");
        };
        let while_node = ast.node(ast.node(body).children[0]);
        assert_eq!(while_node.kind, AstNodeKind::While);
        assert_eq!(while_node.children.len(), 2);
        let loop_body = ast.node(while_node.children[1]);
        assert_eq!(ast.node(loop_body.children[0]).kind, AstNodeKind::Continue);
    }

    #[test]
    fn return_with_value() {
        let ast = parse_source("function f() -> i32 { return 1 + 2; }");
        let func = ast.node(sole_child(&ast));
        let NodePayload::Function { body, .. } = func.payload else {
            panic!("function payload expected");
        };
        let ret = ast.node(ast.node(body).children[0]);
        assert_eq!(ret.kind, AstNodeKind::Return);
        assert_eq!(ret.children.len(), 1);
        assert_eq!(ast.node(ret.children[0]).kind, AstNodeKind::BinaryExpr);
    }

    #[test]
    fn class_and_struct_are_skipped_at_top_level() {
        let ast = parse_source("class Foo struct Bar var x = 1;");
        // Only the decl lands under the root.
        let decl = ast.node(sole_child(&ast));
        assert_eq!(decl.kind, AstNodeKind::Decl);
    }

    #[test]
    fn non_declaration_top_level_tokens_are_skipped() {
        let ast = parse_source("print(42); import io;");
        assert!(ast.node(Ast::ROOT).children.is_empty());
    }

    #[test]
    fn binary_initializer_forms_parse() {
        for source in [
            "var x = 5 + 5;",
            "var y = 4 - 6;",
            "var z = 10 * 9;",
            "var t = 15 / 3;",
            "var g = 10 % 3;",
            "var x = 5 & 3;",
            "var y = 10 | 7;",
            "var z = 6 ^ 3;",
            "var t = 8 << 2;",
            "var g = 16 >> 2;",
            "var x = 5 < 10;",
            "var y = 10 > 5;",
            "var z = 5 <= 5;",
            "var t = 10 >= 10;",
            "var g = 5 == 5;",
            "var h = 5 != 6;",
            "var x = true && false;",
            "var y = true || false;",
            "var x = (5 + 3) * 2;",
            "var y = 10 / (2 + 3);",
            "var z = (5 > 3) && (10 < 15);",
        ] {
            let ast = parse_source(source);
            let decl = ast.node(sole_child(&ast));
            assert_eq!(decl.kind, AstNodeKind::Decl, "source {source:?}");
        }
    }

    #[test]
    fn statement_forms_in_function_bodies_parse() {
        for body in [
            "x += 3;",
            "y -= 4;",
            "z *= 5;",
            "t /= 4;",
            "g %= 3;",
            "print(42);",
            "calculate(10, 20);",
            "process();",
            "process(5 + 3, calculate(2, 3), true);",
            "compute((10 * 2), foo(), bar(x));",
            "handler(complex_func(a, b), 42, \"string\");",
            "obj.method();",
            "list.append(42);",
            "name.substr(0, 5);",
        ] {
            let source = format!("function f() -> void {{ {body} }}");
            let ast = parse_source(&source);
            let func = ast.node(sole_child(&ast));
            let NodePayload::Function { body: block, .. } = func.payload else {
                panic!("function payload expected");
            };
            assert_eq!(
                ast.node(block).children.len(),
                1,
                "body {body:?} should be one statement"
            );
        }
    }

    #[test]
    fn array_decl_without_type_infers() {
        let ast = parse_source("var arr = { 1, 2, 3 };");
        let decl = ast.node(sole_child(&ast));
        let NodePayload::Decl { flags, init, ty } = decl.payload else {
            panic!("decl payload expected");
        };
        assert!(flags.contains(NodeFlags::TYPE_INFER));
        assert_eq!(ty, 0);
        assert_eq!(ast.node(init).kind, AstNodeKind::ArrayInit);
    }

    #[test]
    fn ownership_decl_forms_parse() {
        for source in [
            "var p: Own<u8>;",
            "var q: Share<i64> = null;",
            "const r: Ref<u32> = &x;",
            "var s: Pin<f64>;",
            "var nested: Own<Share<Ref<i32>>> = null;",
        ] {
            let ast = parse_source(source);
            let decl = ast.node(sole_child(&ast));
            assert_eq!(decl.kind, AstNodeKind::Decl, "source {source:?}");
            let NodePayload::Decl { ty, .. } = decl.payload else {
                panic!("decl payload expected");
            };
            assert!(
                ast.node(ty).token.kind.is_ownership(),
                "source {source:?}"
            );
        }
    }

    #[test]
    fn missing_semicolon_points_at_eof() {
        let source = "var x = 5";
        let err = parse_error(source);
        assert_eq!(
            err.kind,
            ParseErrorKind::ExpectedToken {
                expected: TokenKind::Semicolon,
                found: TokenKind::Eof,
            }
        );
        assert_eq!(err.line, 1);
        assert_eq!(err.column, source.len() as u32);
        assert_eq!(err.excerpt, source);
    }

    #[test]
    fn error_location_on_later_line() {
        let err = parse_error("var a = 1;\nvar b = ;");
        assert!(matches!(
            err.kind,
            ParseErrorKind::UnexpectedPrimary {
                found: TokenKind::Semicolon
            }
        ));
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 8);
        assert_eq!(err.excerpt, "var b = ;");
    }

    #[test]
    fn missing_decl_name_is_expected_token() {
        let err = parse_error("var = 5;");
        assert!(matches!(
            err.kind,
            ParseErrorKind::ExpectedToken {
                expected: TokenKind::Identifier,
                ..
            }
        ));
    }

    #[test]
    fn unclosed_block_is_fatal() {
        let err = parse_error("function f() -> void { return;");
        assert!(matches!(
            err.kind,
            ParseErrorKind::ExpectedToken {
                expected: TokenKind::RightBrace,
                found: TokenKind::Eof,
            }
        ));
    }

    #[test]
    fn no_partial_ast_on_error() {
        let (tokens, line_starts) = scan("test", "var x = 5");
        let result = Parser::new("test", "var x = 5", tokens, line_starts).parse();
        assert!(result.is_err());
    }

    #[test]
    fn fresh_parser_unaffected_by_previous_failure() {
        let _ = parse_error("var x = 5");
        let ast = parse_source("var x = 5;");
        assert_eq!(ast.node(sole_child(&ast)).kind, AstNodeKind::Decl);
    }

    #[test]
    fn node_parent_invariant_holds() {
        let ast = parse_source(
            "function main() -> u16 { var x: u32 = 5; const y = 8; const z: Ref<u32> = &x; return 0; }",
        );
        for (index, node) in ast.nodes().iter().enumerate().skip(1) {
            let parent = ast.node(node.parent);
            #[expect(clippy::cast_possible_truncation, reason = "test arena is tiny")]
            let occurrences = parent
                .children
                .iter()
                .filter(|&&c| c == index as u32)
                .count();
            // Every production attaches its payload targets as children,
            // so each non-root node appears exactly once under its parent.
            assert_eq!(
                occurrences, 1,
                "node {index} appears {occurrences} times in parent's children"
            );
        }
    }

    #[test]
    fn dump_smoke_test() {
        let ast = parse_source("var x: i32 = 1 + 2;");
        let mut out = String::new();
        ast.dump(&mut out).unwrap();
        assert!(out.contains("ROOT"));
        assert!(out.contains("DECL"));
        assert!(out.contains("BINARY_EXPR"));
    }
}
