// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for Rill.
//!
//! The AST is an **arena**: an append-only sequence of [`AstNode`] records
//! addressed by `u32` indices. Index `0` is a synthetic [`AstNodeKind::Root`]
//! node whose children are the top-level declarations. There are no
//! node-to-node pointers; `parent`, `children`, and payload slots are all
//! indices into the same arena, which makes dumping, serialization, and
//! cycle checking trivial.
//!
//! # Design
//!
//! - Every node stores a **copy** of its originating [`Token`], so
//!   downstream passes can report diagnostics (and observe scanner flags)
//!   without the original token buffer.
//! - Payloads are discriminated by the node's kind: a `Decl` node carries
//!   declaration flags and its type/initializer slots, a `BinaryExpr` its
//!   operand slots and operator, and so on. Kinds without dedicated fields
//!   carry [`NodePayload::None`] and use only `children`.
//! - Index `0` doubles as "absent": a `Decl` with no initializer stores
//!   `init == 0`. The root is never a legal payload target, so the
//!   encoding is unambiguous.
//!
//! # Lifecycle
//!
//! Nodes are appended by the parser and never deleted. Payload slots of a
//! node may be patched while it is the parser's current construction site;
//! after parsing completes the arena is read-only.

use std::fmt::Write;

use crate::source_analysis::{Token, TokenKind};

use bitflags::bitflags;

/// The kind of an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AstNodeKind {
    /// The synthetic arena root (always index 0).
    Root,
    /// `var` / `const` declaration, or a function parameter.
    Decl,
    /// Function definition or lambda.
    Function,
    /// `T[]` array type wrapper.
    ArrayType,
    /// Type annotation (primitive, ownership qualifier, or named type).
    Type,
    /// Binary expression, including assignments.
    BinaryExpr,
    /// Prefix unary expression, including `new` / `delete`.
    UnaryExpr,
    /// `cast<T>(expr)`.
    CastExpr,
    /// Literal (`true`, `false`, `null`, numeric, string).
    Literal,
    /// Variable reference.
    Identifier,
    /// `{ a, b, c }` array initializer.
    ArrayInit,
    /// `receiver.method(args)` call.
    MethodCall,
    /// `callee(args)` call.
    Call,
    /// `cond ? then : else`.
    Ternary,
    /// `{ ... }` statement block.
    Block,
    /// `return expr?;`
    Return,
    /// `if` / `else if` / `else` chain.
    If,
    /// `while` loop.
    While,
    /// C-style `for` loop.
    For,
    /// `break;`
    Break,
    /// `continue;`
    Continue,
}

impl AstNodeKind {
    /// Stable upper-case name, used by the dump format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Root => "ROOT",
            Self::Decl => "DECL",
            Self::Function => "FUNCTION",
            Self::ArrayType => "ARRAY_TYPE",
            Self::Type => "TYPE",
            Self::BinaryExpr => "BINARY_EXPR",
            Self::UnaryExpr => "UNARY_EXPR",
            Self::CastExpr => "CAST_EXPR",
            Self::Literal => "LITERAL",
            Self::Identifier => "IDENTIFIER",
            Self::ArrayInit => "ARRAY_INIT",
            Self::MethodCall => "METHOD_CALL",
            Self::Call => "CALL",
            Self::Ternary => "TERNARY",
            Self::Block => "BLOCK",
            Self::Return => "RETURN",
            Self::If => "IF",
            Self::While => "WHILE",
            Self::For => "FOR",
            Self::Break => "BREAK",
            Self::Continue => "CONTINUE",
        }
    }
}

bitflags! {
    /// Declaration flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// Declared with `const`.
        const IS_CONST = 1 << 0;
        /// No type annotation; the type engine must infer.
        const TYPE_INFER = 1 << 1;
    }
}

/// Kind-discriminated payload.
///
/// For any `Decl`, exactly one of `TYPE_INFER` (in `flags`) or `ty != 0`
/// holds. For any `Function`, both `return_type` and `body` are non-zero
/// once the node is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodePayload {
    /// Children-only node.
    #[default]
    None,
    /// `Decl` payload.
    Decl {
        /// `IS_CONST` / `TYPE_INFER`.
        flags: NodeFlags,
        /// Initializer expression, or 0.
        init: u32,
        /// Type annotation, or 0 when inferred.
        ty: u32,
    },
    /// `Function` payload.
    Function {
        /// Return type node.
        return_type: u32,
        /// Body block node.
        body: u32,
    },
    /// `BinaryExpr` payload.
    Binary {
        /// Left operand.
        left: u32,
        /// Right operand.
        right: u32,
        /// Operator token kind (e.g. `Plus`, `ShiftRight`, `PlusEqual`).
        op: TokenKind,
    },
    /// `UnaryExpr` payload.
    Unary {
        /// Operand (for `new`, the initializer child may also be present).
        operand: u32,
        /// Operator token kind (`Bang`, `Minus`, `Tilde`, `Amp`, `Star`,
        /// `New`, `Delete`).
        op: TokenKind,
    },
    /// `CastExpr` payload.
    Cast {
        /// Expression being cast.
        operand: u32,
        /// Target type node.
        ty: u32,
    },
}

/// A single arena node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    /// Node kind; discriminates `payload`.
    pub kind: AstNodeKind,
    /// Copy of the originating token (scanner flags included).
    pub token: Token,
    /// Index of the last node whose `children` received this node, or 0.
    pub parent: u32,
    /// Child indices in source order.
    pub children: Vec<u32>,
    /// Kind-specific fields.
    pub payload: NodePayload,
}

/// ANSI escape codes used by diagnostics and the tree dump.
pub(crate) struct ColorCode;

impl ColorCode {
    pub(crate) const RESET: &'static str = "\x1b[0m";
    pub(crate) const RED: &'static str = "\x1b[31m";
    pub(crate) const GREEN: &'static str = "\x1b[32m";
    pub(crate) const YELLOW: &'static str = "\x1b[33m";
    pub(crate) const BLUE: &'static str = "\x1b[34m";
    pub(crate) const MAGENTA: &'static str = "\x1b[35m";
    pub(crate) const CYAN: &'static str = "\x1b[36m";
    pub(crate) const BOLD: &'static str = "\x1b[1m";
}

/// The AST arena.
///
/// Construction is append-only and parser-driven; consumers treat the
/// arena as read-only. Node indices increase in creation order and are
/// stable for the lifetime of the arena - they identify nodes but carry no
/// other meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    nodes: Vec<AstNode>,
}

impl Ast {
    /// Index of the synthetic root node.
    pub const ROOT: u32 = 0;

    /// Creates an arena holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        let root = AstNode {
            kind: AstNodeKind::Root,
            token: Token::placeholder(),
            parent: 0,
            children: Vec::new(),
            payload: NodePayload::None,
        };
        Self { nodes: vec![root] }
    }

    /// Appends a node with no children and an empty payload, returning its
    /// index.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "arenas beyond u32::MAX nodes are not supported"
    )]
    pub(crate) fn add_node(&mut self, kind: AstNodeKind, token: Token) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(AstNode {
            kind,
            token,
            parent: 0,
            children: Vec::new(),
            payload: NodePayload::None,
        });
        index
    }

    /// Appends `child` to `parent`'s child list and records the back-index.
    ///
    /// Out-of-range indices are ignored rather than panicking, mirroring
    /// the append-only contract: a bad index means the caller never
    /// created the node, and there is nothing sensible to link.
    pub(crate) fn add_child(&mut self, parent: u32, child: u32) {
        if parent as usize >= self.nodes.len() || child as usize >= self.nodes.len() {
            return;
        }
        self.nodes[parent as usize].children.push(child);
        self.nodes[child as usize].parent = parent;
    }

    /// Mutable access for payload patching during construction.
    pub(crate) fn node_mut(&mut self, index: u32) -> &mut AstNode {
        &mut self.nodes[index as usize]
    }

    /// Returns the node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn node(&self, index: u32) -> &AstNode {
        &self.nodes[index as usize]
    }

    /// All nodes in creation order; index 0 is the root.
    #[must_use]
    pub fn nodes(&self) -> &[AstNode] {
        &self.nodes
    }

    /// Returns the number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Writes a human-readable tree of the whole arena.
    ///
    /// # Errors
    ///
    /// Propagates formatter errors from `out`.
    pub fn dump(&self, out: &mut dyn Write) -> std::fmt::Result {
        self.dump_from(out, Self::ROOT, 0)
    }

    /// Writes a human-readable tree rooted at `start`.
    ///
    /// The walk is cycle-safe: each node prints at most once, so a
    /// corrupted arena cannot loop the dump.
    ///
    /// # Errors
    ///
    /// Propagates formatter errors from `out`.
    pub fn dump_from(&self, out: &mut dyn Write, start: u32, indent: usize) -> std::fmt::Result {
        let mut visited = vec![false; self.nodes.len()];
        self.dump_node(out, start, indent, &mut visited)
    }

    fn dump_node(
        &self,
        out: &mut dyn Write,
        index: u32,
        indent: usize,
        visited: &mut [bool],
    ) -> std::fmt::Result {
        if index as usize >= self.nodes.len() || visited[index as usize] {
            return Ok(());
        }
        visited[index as usize] = true;
        let node = &self.nodes[index as usize];

        if indent > 0 {
            for _ in 0..indent - 1 {
                out.write_str("│   ")?;
            }
            out.write_str("├── ")?;
        }

        write!(
            out,
            "{bold}{blue}Node {index}{reset} [{green}{kind}{reset}] {yellow}token{{start={start} len={len} kind={tkind}}}{reset}",
            bold = ColorCode::BOLD,
            blue = ColorCode::BLUE,
            green = ColorCode::GREEN,
            yellow = ColorCode::YELLOW,
            reset = ColorCode::RESET,
            kind = node.kind.name(),
            start = node.token.start,
            len = node.token.len,
            tkind = node.token.kind,
        )?;
        if !node.token.flags.is_empty() {
            write!(
                out,
                " {}flags={:?}{}",
                ColorCode::MAGENTA,
                node.token.flags,
                ColorCode::RESET
            )?;
        }
        out.write_char('\n')?;

        let pad = "│   ".repeat(indent);
        match &node.payload {
            NodePayload::None => {}
            NodePayload::Decl { flags, init, ty } => {
                writeln!(out, "{pad}{c}└─ flags: {flags:?}{r}", c = ColorCode::CYAN, r = ColorCode::RESET)?;
                writeln!(out, "{pad}{c}└─ init: {init}{r}", c = ColorCode::CYAN, r = ColorCode::RESET)?;
                writeln!(out, "{pad}{c}└─ type: {ty}{r}", c = ColorCode::CYAN, r = ColorCode::RESET)?;
            }
            NodePayload::Function { return_type, body } => {
                writeln!(out, "{pad}{c}└─ return_type: {return_type}{r}", c = ColorCode::CYAN, r = ColorCode::RESET)?;
                writeln!(out, "{pad}{c}└─ body: {body}{r}", c = ColorCode::CYAN, r = ColorCode::RESET)?;
            }
            NodePayload::Binary { left, right, op } => {
                writeln!(out, "{pad}{c}└─ left: {left}{r}", c = ColorCode::CYAN, r = ColorCode::RESET)?;
                writeln!(out, "{pad}{c}└─ right: {right}{r}", c = ColorCode::CYAN, r = ColorCode::RESET)?;
                writeln!(out, "{pad}{c}└─ operator: {op}{r}", c = ColorCode::CYAN, r = ColorCode::RESET)?;
            }
            NodePayload::Unary { operand, op } => {
                writeln!(out, "{pad}{c}└─ operand: {operand}{r}", c = ColorCode::CYAN, r = ColorCode::RESET)?;
                writeln!(out, "{pad}{c}└─ operator: {op}{r}", c = ColorCode::CYAN, r = ColorCode::RESET)?;
            }
            NodePayload::Cast { operand, ty } => {
                writeln!(out, "{pad}{c}└─ operand: {operand}{r}", c = ColorCode::CYAN, r = ColorCode::RESET)?;
                writeln!(out, "{pad}{c}└─ type: {ty}{r}", c = ColorCode::CYAN, r = ColorCode::RESET)?;
            }
        }

        writeln!(
            out,
            "{pad}{}└─ parent: {}{}",
            ColorCode::RED,
            node.parent,
            ColorCode::RESET
        )?;
        if !node.children.is_empty() {
            write!(out, "{pad}{}└─ children: [", ColorCode::MAGENTA)?;
            for (i, child) in node.children.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write!(out, "{child}")?;
            }
            writeln!(out, "]{}", ColorCode::RESET)?;
        }

        // Payload targets first (they may not be in `children`), then the
        // ordered child list; the visited set de-duplicates overlap.
        match node.payload {
            NodePayload::Binary { left, right, .. } => {
                self.dump_node(out, left, indent + 1, visited)?;
                self.dump_node(out, right, indent + 1, visited)?;
            }
            NodePayload::Unary { operand, .. } => {
                self.dump_node(out, operand, indent + 1, visited)?;
            }
            NodePayload::Decl { init, ty, .. } => {
                if ty != 0 {
                    self.dump_node(out, ty, indent + 1, visited)?;
                }
                if init != 0 {
                    self.dump_node(out, init, indent + 1, visited)?;
                }
            }
            NodePayload::Function { return_type, body } => {
                self.dump_node(out, return_type, indent + 1, visited)?;
                self.dump_node(out, body, indent + 1, visited)?;
            }
            NodePayload::Cast { operand, ty } => {
                self.dump_node(out, ty, indent + 1, visited)?;
                self.dump_node(out, operand, indent + 1, visited)?;
            }
            NodePayload::None => {}
        }
        for &child in &node.children {
            self.dump_node(out, child, indent + 1, visited)?;
        }
        Ok(())
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}
