// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for scanner and parser crash safety testing.
//!
//! This target feeds arbitrary byte sequences through scan-then-parse and
//! asserts that neither stage panics. The scanner must encode every
//! malformed lexeme as token flags or `Unknown` tokens; the parser must
//! either build a complete arena or return a single diagnostic.
//!
//! Invalid UTF-8 bytes are converted via lossy conversion (U+FFFD
//! replacement) so both stages still get exercised with unusual byte
//! sequences.
//!
//! # Success Criteria
//!
//! - No panic on any input
//! - The token buffer ends with exactly one EOF token
//! - `parse` returns either an AST or a `ParseError`

#![no_main]

use libfuzzer_sys::fuzz_target;
use rill_core::source_analysis::{Parser, scan};

fuzz_target!(|data: &[u8]| {
    // Convert to UTF-8 using lossy conversion so invalid bytes become
    // U+FFFD replacement characters rather than being skipped entirely.
    let source = String::from_utf8_lossy(data);

    let (tokens, line_starts) = scan("fuzz", &source);
    assert!(tokens.get(tokens.len() - 1).kind.is_eof());

    // Success = no panic. A ParseError is a perfectly fine outcome.
    let _ = Parser::new("fuzz", &source, tokens, line_starts).parse();
});
