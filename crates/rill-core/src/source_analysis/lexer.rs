// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for Rill source code.
//!
//! The [`Scanner`] converts source text into a columnar [`TokenList`] plus a
//! line-start index. It is a single forward pass over raw bytes with no
//! backtracking:
//!
//! - A 256-entry byte-class table drives token dispatch.
//! - Whitespace runs are skipped eight bytes at a time where possible,
//!   falling back to byte-at-a-time near comments and end of input.
//! - Malformed lexemes never abort the scan; they produce tokens whose
//!   [`TokenFlags`] record what went wrong, or an [`TokenKind::Unknown`]
//!   token covering the bad run.
//! - `<<` and `>>` are split into two single-angle tokens flagged
//!   `COMPOUND_START` / `COMPOUND_END`, so the parser can close nested
//!   generic argument lists one `>` at a time. `<<=` and `>>=` remain
//!   single tokens.
//!
//! Scanning is total: every byte of the input is accounted for, and the
//! token stream always ends with exactly one [`TokenKind::Eof`] token.

use ecow::EcoString;

use super::{Token, TokenFlags, TokenKind, TokenList};

/// Mutually exclusive byte classes for token dispatch.
///
/// Built once at startup; indexing by the current byte selects the lexing
/// routine without per-byte branching chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum ByteClass {
    Other = 0,
    Whitespace,
    Slash,
    Star,
    IdentStart,
    Digit,
    Quote,
}

const fn classify(b: u8) -> ByteClass {
    match b {
        b' ' | b'\t' | b'\n' | b'\r' => ByteClass::Whitespace,
        b'/' => ByteClass::Slash,
        b'*' => ByteClass::Star,
        b'A'..=b'Z' | b'a'..=b'z' | b'_' | b'@' => ByteClass::IdentStart,
        b'0'..=b'9' => ByteClass::Digit,
        b'"' => ByteClass::Quote,
        _ => ByteClass::Other,
    }
}

static BYTE_CLASS: [ByteClass; 256] = {
    let mut table = [ByteClass::Other; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = classify(i as u8);
        i += 1;
    }
    table
};

/// Single-character operator and delimiter kinds, `Unknown` elsewhere.
static SINGLE_CHAR_TOKENS: [TokenKind; 256] = {
    let mut table = [TokenKind::Unknown; 256];
    table[b'+' as usize] = TokenKind::Plus;
    table[b'-' as usize] = TokenKind::Minus;
    table[b'*' as usize] = TokenKind::Star;
    table[b'/' as usize] = TokenKind::Slash;
    table[b'%' as usize] = TokenKind::Percent;
    table[b'=' as usize] = TokenKind::Equal;
    table[b'!' as usize] = TokenKind::Bang;
    table[b'<' as usize] = TokenKind::Less;
    table[b'>' as usize] = TokenKind::Greater;
    table[b'&' as usize] = TokenKind::Amp;
    table[b'|' as usize] = TokenKind::Pipe;
    table[b'^' as usize] = TokenKind::Caret;
    table[b'~' as usize] = TokenKind::Tilde;
    table[b'.' as usize] = TokenKind::Dot;
    table[b'(' as usize] = TokenKind::LeftParen;
    table[b')' as usize] = TokenKind::RightParen;
    table[b'{' as usize] = TokenKind::LeftBrace;
    table[b'}' as usize] = TokenKind::RightBrace;
    table[b'[' as usize] = TokenKind::LeftBracket;
    table[b']' as usize] = TokenKind::RightBracket;
    table[b',' as usize] = TokenKind::Comma;
    table[b':' as usize] = TokenKind::Colon;
    table[b';' as usize] = TokenKind::Semicolon;
    table[b'?' as usize] = TokenKind::Question;
    table
};

static HEX_DIGIT: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = b'0';
    while i <= b'9' {
        table[i as usize] = true;
        i += 1;
    }
    let mut i = b'a';
    while i <= b'f' {
        table[i as usize] = true;
        i += 1;
    }
    let mut i = b'A';
    while i <= b'F' {
        table[i as usize] = true;
        i += 1;
    }
    table
};

static BIN_DIGIT: [bool; 256] = {
    let mut table = [false; 256];
    table[b'0' as usize] = true;
    table[b'1' as usize] = true;
    table
};

/// Escape letters accepted after `\` in string literals.
static VALID_ESCAPE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'n' as usize] = true;
    table[b't' as usize] = true;
    table[b'r' as usize] = true;
    table[b'\\' as usize] = true;
    table[b'"' as usize] = true;
    table[b'0' as usize] = true;
    table[b'x' as usize] = true;
    table
};

const fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

const fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// An eight-byte run of a single repeated byte, for the whitespace fast path.
const fn repeat8(b: u8) -> u64 {
    u64::from_le_bytes([b; 8])
}

const SPACE_RUN: u64 = repeat8(b' ');
const TAB_RUN: u64 = repeat8(b'\t');
const NEWLINE_RUN: u64 = repeat8(b'\n');
const CARRIAGE_RUN: u64 = repeat8(b'\r');

/// The Rill scanner.
///
/// Construct with [`Scanner::new`], run [`Scanner::tokenize`] once, then
/// read [`Scanner::line_starts`]. The source buffer must outlive every
/// token produced: tokens are `(start, len)` views into it.
///
/// # Examples
///
/// ```
/// use rill_core::source_analysis::{Scanner, TokenKind};
///
/// let mut scanner = Scanner::new("demo", "var x: i32 = 0;");
/// let tokens = scanner.tokenize();
/// assert_eq!(tokens.kind(0), TokenKind::Var);
/// assert!(tokens.get(tokens.len() - 1).kind.is_eof());
/// ```
pub struct Scanner<'src> {
    /// Module name, carried for diagnostics parity with the parser.
    module_name: EcoString,
    source: &'src [u8],
    pos: usize,
    line_starts: Vec<u32>,
    /// Second half of a split `<<` / `>>`, delivered on the next call.
    pending: Option<Token>,
    /// Flags discovered while skipping trivia (unterminated block comment),
    /// attached to the next emitted token.
    carried_flags: TokenFlags,
}

impl<'src> Scanner<'src> {
    /// Creates a scanner over `source`.
    ///
    /// `module_name` is used only for diagnostics; paths are fine. The
    /// source is assumed UTF-8 but only ASCII is classified; non-ASCII
    /// bytes in identifier position produce flagged tokens.
    #[must_use]
    pub fn new(module_name: impl Into<EcoString>, source: &'src str) -> Self {
        let mut line_starts = Vec::with_capacity(source.len() / 40 + 1);
        line_starts.push(0);
        Self {
            module_name: module_name.into(),
            source: source.as_bytes(),
            pos: 0,
            line_starts,
            pending: None,
            carried_flags: TokenFlags::empty(),
        }
    }

    /// Returns the module name this scanner was created with.
    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Scans the whole source into a columnar token buffer.
    ///
    /// The result always ends with exactly one EOF token, whatever the
    /// input. Call once; subsequent calls return a buffer holding only the
    /// EOF token.
    pub fn tokenize(&mut self) -> TokenList {
        let mut tokens = TokenList::with_capacity(self.source.len() / 4 + 1);
        loop {
            let token = self.next_token();
            let at_eof = token.kind.is_eof();
            tokens.push(token);
            if at_eof {
                break;
            }
        }
        tokens
    }

    /// The line-start index accumulated by [`Scanner::tokenize`].
    ///
    /// Strictly increasing byte offsets, always beginning with `0`; entry
    /// `i` is the offset where line `i` (0-based) begins.
    #[must_use]
    pub fn line_starts(&self) -> &[u32] {
        &self.line_starts
    }

    /// Consumes the scanner, yielding the line-start index.
    #[must_use]
    pub fn into_line_starts(self) -> Vec<u32> {
        self.line_starts
    }

    fn next_token(&mut self) -> Token {
        if let Some(token) = self.pending.take() {
            return token;
        }

        self.skip_whitespace_and_comments();
        let carried = std::mem::take(&mut self.carried_flags);

        let Some(&byte) = self.source.get(self.pos) else {
            return self.token_at(self.pos, self.pos, TokenKind::Eof, carried);
        };

        let mut token = match BYTE_CLASS[byte as usize] {
            ByteClass::IdentStart => self.lex_identifier(),
            ByteClass::Digit => self.lex_number(),
            ByteClass::Quote => self.lex_string(),
            _ => self.lex_operator(),
        };
        token.flags |= carried;
        token
    }

    /// Skips whitespace and comments, recording line starts.
    ///
    /// Fast path: while at least eight bytes remain, a homogeneous run of
    /// spaces, tabs, newlines, or carriage returns is consumed as one
    /// eight-byte word. Mixed runs, comments, and the tail of the buffer
    /// take the byte-serial path, which behaves identically.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos + 8 <= self.source.len() {
                let chunk = u64::from_le_bytes(
                    self.source[self.pos..self.pos + 8]
                        .try_into()
                        .expect("eight bytes remain"),
                );
                if chunk == NEWLINE_RUN {
                    for i in 0..8 {
                        self.push_line_start(self.pos + i + 1);
                    }
                } else if chunk != SPACE_RUN && chunk != TAB_RUN && chunk != CARRIAGE_RUN {
                    break;
                }
                self.pos += 8;
            }

            match self.source.get(self.pos) {
                Some(b'\n') => {
                    self.pos += 1;
                    self.push_line_start(self.pos);
                }
                Some(b' ' | b'\t' | b'\r') => self.pos += 1,
                Some(b'/') if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
                Some(b'/') if self.peek_at(1) == Some(b'*') => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        self.pos += 2;
        while let Some(&b) = self.source.get(self.pos) {
            if b == b'\n' {
                // Leave the newline for the whitespace loop to record.
                return;
            }
            self.pos += 1;
        }
    }

    /// Skips a `/* ... */` comment. Reaching end of input without the
    /// closing `*/` flags the next emitted token with
    /// `UNTERMINATED_BLOCK_COMMENT`.
    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.source.len() {
            match self.source[self.pos] {
                b'*' if self.peek_at(1) == Some(b'/') => {
                    self.pos += 2;
                    return;
                }
                b'\n' => {
                    self.pos += 1;
                    self.push_line_start(self.pos);
                }
                _ => self.pos += 1,
            }
        }
        self.carried_flags |= TokenFlags::UNTERMINATED_BLOCK_COMMENT;
    }

    /// Lexes an identifier, reserved word, or `@` annotation.
    ///
    /// Accepts `[A-Za-z_]` (optionally after a leading `@`), then
    /// `[A-Za-z0-9_]`. A byte that neither continues nor terminates the
    /// identifier (any non-ASCII byte) stops the scan and sets
    /// `INVALID_IDENTIFIER_CHAR`. An `@` not followed by a valid start
    /// yields `Unknown` over the run.
    fn lex_identifier(&mut self) -> Token {
        let start = self.pos;
        let mut flags = TokenFlags::empty();

        let at_prefixed = self.source[self.pos] == b'@';
        if at_prefixed {
            self.pos += 1;
            if !self.source.get(self.pos).copied().is_some_and(is_ident_start) {
                // Bare `@` or `@` before a non-letter: unknown over the run.
                self.consume_ident_run();
                return self.token_at(start, self.pos.max(start + 1), TokenKind::Unknown, flags);
            }
        }

        self.consume_ident_run();

        // A byte that is not a continuation, not ASCII whitespace, and not
        // ASCII punctuation does not terminate an identifier cleanly.
        if let Some(&b) = self.source.get(self.pos) {
            if !b.is_ascii() {
                flags |= TokenFlags::INVALID_IDENTIFIER_CHAR;
            }
        }

        let text = self.text(start, self.pos);
        let kind = match TokenKind::from_reserved_word(text) {
            Some(kind) => kind,
            None if at_prefixed => TokenKind::Annotation,
            None => TokenKind::Identifier,
        };
        self.token_at(start, self.pos, kind, flags)
    }

    fn consume_ident_run(&mut self) {
        while self
            .source
            .get(self.pos)
            .copied()
            .is_some_and(is_ident_continue)
        {
            self.pos += 1;
        }
    }

    /// Lexes a numeric literal.
    ///
    /// Forms: `0x` + hex digits, `0b` + binary digits, or decimal digits
    /// with an optional single `.` fraction and optional `e`/`E` exponent.
    /// `0.123` is supported; `.123` is not (the `.` lexes as `Dot`).
    ///
    /// Error encoding:
    /// - a second `.` sets `MULTIPLE_DECIMAL_POINTS`;
    /// - an exponent marker with no digits sets `INVALID_EXPONENT`;
    /// - a decimal digit outside a binary literal's radix sets
    ///   `INVALID_DIGIT` and is absorbed;
    /// - a trailing identifier-like run (`12abc`) turns the whole run into
    ///   `Unknown`.
    fn lex_number(&mut self) -> Token {
        let start = self.pos;
        let mut flags = TokenFlags::empty();

        // Word-at-a-time run over leading decimal digits.
        while self.pos + 8 <= self.source.len() {
            let chunk = u64::from_le_bytes(
                self.source[self.pos..self.pos + 8]
                    .try_into()
                    .expect("eight bytes remain"),
            );
            // All eight bytes are '0'..='9' iff neither subtracting '0'
            // nor adding 0x46 borrows into any byte's high bit.
            let below = chunk.wrapping_sub(repeat8(0x30));
            let above = chunk.wrapping_add(repeat8(0x46));
            if (below | above) & repeat8(0x80) != 0 {
                break;
            }
            self.pos += 8;
        }

        let is_hex;
        let is_bin;
        if self.source.get(self.pos) == Some(&b'0') {
            let next = self.peek_at(1).map_or(0, |b| b | 0x20);
            is_hex = next == b'x';
            is_bin = next == b'b';
        } else {
            is_hex = false;
            is_bin = false;
        }
        if is_hex || is_bin {
            self.pos += 2;
        }

        let mut decimal_points = 0u32;
        while let Some(&b) = self.source.get(self.pos) {
            let accept = if is_hex {
                HEX_DIGIT[b as usize]
            } else if is_bin {
                BIN_DIGIT[b as usize]
            } else {
                b.is_ascii_digit() || b == b'.'
            };
            if !accept {
                break;
            }
            if b == b'.' {
                decimal_points += 1;
                if decimal_points > 1 {
                    flags |= TokenFlags::MULTIPLE_DECIMAL_POINTS;
                }
            }
            self.pos += 1;
        }

        // A binary literal that runs into decimal digits absorbs them as
        // invalid-digit content rather than splitting the lexeme.
        if is_bin && self.source.get(self.pos).is_some_and(u8::is_ascii_digit) {
            flags |= TokenFlags::INVALID_DIGIT;
            while self.source.get(self.pos).is_some_and(u8::is_ascii_digit) {
                self.pos += 1;
            }
        }

        // Exponent: `e`/`E`, optional sign, then decimal digits.
        if !is_hex && self.source.get(self.pos).is_some_and(|&b| (b | 0x20) == b'e') {
            self.pos += 1;
            if matches!(self.source.get(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.source.get(self.pos).is_some_and(u8::is_ascii_digit) {
                while self.source.get(self.pos).is_some_and(u8::is_ascii_digit) {
                    self.pos += 1;
                }
            } else {
                flags |= TokenFlags::INVALID_EXPONENT;
            }
        }

        // `12abc` is one unknown lexeme, not a number followed by an
        // identifier.
        if self
            .source
            .get(self.pos)
            .copied()
            .is_some_and(is_ident_start)
        {
            self.consume_ident_run();
            return self.token_at(start, self.pos, TokenKind::Unknown, flags);
        }

        self.token_at(start, self.pos, TokenKind::NumLiteral, flags)
    }

    /// Lexes a string literal.
    ///
    /// Recognized escapes: `\n \t \r \\ \" \0` and `\x` followed by exactly
    /// three hex digits. Any other escape letter, or a short `\x`, sets
    /// `INVALID_ESCAPE`; a missing closing quote sets
    /// `UNTERMINATED_STRING`. The token always covers every byte consumed.
    fn lex_string(&mut self) -> Token {
        let start = self.pos;
        let mut flags = TokenFlags::empty();
        self.pos += 1; // opening quote

        let mut terminated = false;
        while let Some(&b) = self.source.get(self.pos) {
            match b {
                b'"' => {
                    self.pos += 1;
                    terminated = true;
                    break;
                }
                b'\\' => {
                    let Some(escape) = self.peek_at(1) else {
                        // Lone backslash at end of input; the loop ends and
                        // the unterminated flag covers it.
                        self.pos += 1;
                        continue;
                    };
                    if !VALID_ESCAPE[escape as usize] {
                        flags |= TokenFlags::INVALID_ESCAPE;
                        self.pos += 2;
                        continue;
                    }
                    if escape == b'x' {
                        let hex_ok = (2..5).all(|i| {
                            self.peek_at(i)
                                .is_some_and(|b| HEX_DIGIT[b as usize])
                        });
                        if hex_ok {
                            self.pos += 5;
                        } else {
                            flags |= TokenFlags::INVALID_ESCAPE;
                            self.pos += 2;
                        }
                        continue;
                    }
                    self.pos += 2;
                }
                _ => self.pos += 1,
            }
        }

        if !terminated {
            flags |= TokenFlags::UNTERMINATED_STRING;
        }
        self.token_at(start, self.pos, TokenKind::StrLiteral, flags)
    }

    /// Lexes operators, delimiters, and everything the other routines do
    /// not claim. Longest match wins (`<<=` over `<<` over `<`), with one
    /// exception: `<<` and `>>` become two single-angle tokens flagged as a
    /// compound pair, which is what lets `Share<Share<T>>` close its
    /// generics without retokenization.
    fn lex_operator(&mut self) -> Token {
        let start = self.pos;
        let byte = self.source[start];
        let next = self.peek_at(1);
        let third = self.peek_at(2);

        let two = |kind| (kind, 2usize);
        let three = |kind| (kind, 3usize);

        let matched = match (byte, next, third) {
            (b'>', Some(b'>'), Some(b'=')) => Some(three(TokenKind::ShiftRightEqual)),
            (b'>', Some(b'>'), _) => return self.split_compound_angle(TokenKind::Greater),
            (b'>', Some(b'='), _) => Some(two(TokenKind::GreaterEqual)),

            (b'<', Some(b'<'), Some(b'=')) => Some(three(TokenKind::ShiftLeftEqual)),
            (b'<', Some(b'<'), _) => return self.split_compound_angle(TokenKind::Less),
            (b'<', Some(b'='), _) => Some(two(TokenKind::LessEqual)),

            (b'.', Some(b'.'), Some(b'.')) => Some(three(TokenKind::Spread)),
            (b'.', Some(b'.'), _) => Some(two(TokenKind::Range)),

            (b'&', Some(b'&'), _) => Some(two(TokenKind::AndAnd)),
            (b'&', Some(b'='), _) => Some(two(TokenKind::AmpEqual)),
            (b'|', Some(b'|'), _) => Some(two(TokenKind::OrOr)),
            (b'|', Some(b'='), _) => Some(two(TokenKind::PipeEqual)),

            (b'=', Some(b'='), _) => Some(two(TokenKind::EqualEqual)),
            (b':', Some(b':'), _) => Some(two(TokenKind::Scope)),
            (b'!', Some(b'='), _) => Some(two(TokenKind::BangEqual)),
            (b'-', Some(b'>'), _) => Some(two(TokenKind::Arrow)),
            (b'-', Some(b'='), _) => Some(two(TokenKind::MinusEqual)),
            (b'+', Some(b'='), _) => Some(two(TokenKind::PlusEqual)),
            (b'*', Some(b'='), _) => Some(two(TokenKind::StarEqual)),
            (b'/', Some(b'='), _) => Some(two(TokenKind::SlashEqual)),
            (b'%', Some(b'='), _) => Some(two(TokenKind::PercentEqual)),
            (b'^', Some(b'='), _) => Some(two(TokenKind::CaretEqual)),

            _ => None,
        };

        if let Some((kind, width)) = matched {
            self.pos += width;
            return self.token_at(start, self.pos, kind, TokenFlags::empty());
        }

        let kind = SINGLE_CHAR_TOKENS[byte as usize];
        self.pos += 1;
        if kind == TokenKind::Unknown && !byte.is_ascii() {
            // A byte that cannot start anything absorbs the
            // identifier-like run it begins.
            while self
                .source
                .get(self.pos)
                .is_some_and(|&b| !b.is_ascii() || is_ident_continue(b))
            {
                self.pos += 1;
            }
        }
        self.token_at(start, self.pos, kind, TokenFlags::empty())
    }

    /// Emits the first half of a `<<` / `>>` pair and queues the second.
    fn split_compound_angle(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.pos += 2;
        self.pending = Some(self.token_at(
            start + 1,
            start + 2,
            kind,
            TokenFlags::COMPOUND_END,
        ));
        self.token_at(start, start + 1, kind, TokenFlags::COMPOUND_START)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn text(&self, start: usize, end: usize) -> &'src str {
        // The run is ASCII by construction of the identifier loops.
        std::str::from_utf8(&self.source[start..end]).unwrap_or("")
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    fn push_line_start(&mut self, offset: usize) {
        self.line_starts.push(offset as u32);
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported; single lexemes over 64KB truncate their recorded length"
    )]
    fn token_at(&self, start: usize, end: usize, kind: TokenKind, flags: TokenFlags) -> Token {
        Token::new(start as u32, (end - start) as u16, kind, flags)
    }
}

/// Scans `source` to completion, returning the token buffer and the
/// line-start index together.
#[must_use]
pub fn scan(module_name: impl Into<EcoString>, source: &str) -> (TokenList, Vec<u32>) {
    let mut scanner = Scanner::new(module_name, source);
    let tokens = scanner.tokenize();
    (tokens, scanner.into_line_starts())
}
