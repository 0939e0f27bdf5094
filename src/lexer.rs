//! Token detectors for the SCPI program-message grammar.
//!
//! One detector per token kind, each driving the [`Cursor`] through the
//! input in a fixed grammar order built from the skip primitives. A
//! detector call has exactly three outcomes, expressed as [`Lexed`]:
//!
//! - [`Lexed::Match`]: the token is present; the cursor advanced past it.
//! - [`Lexed::NoMatch`]: the expected grammar element is absent; the
//!   cursor is restored to where the call started. Not an error, simply
//!   "try the next alternative".
//! - [`Lexed::Incomplete`]: the buffer ended while more bytes could
//!   legally extend the attempt; the cursor is parked at end-of-buffer.
//!   The caller appends more bytes and retries the same detector from
//!   the token's starting offset.
//!
//! # Design
//!
//! Detectors never copy bytes: a matched [`Token`] borrows its range from
//! the caller's buffer. Rollback is a cursor snapshot taken at entry and
//! assigned back on failure, so a `NoMatch` is side-effect-free.

use crate::cursor::Cursor;
use crate::skip::Skip;
use crate::tag::{Token, TokenTag};

/// Outcome of a detector call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lexed<'a> {
    /// Token detected; the cursor advanced past all consumed bytes
    /// (which may include stripped prefix bytes not in the token span).
    Match(Token<'a>),
    /// The token is not present at the cursor; the cursor is unchanged.
    NoMatch,
    /// The buffer ended before match/no-match could be decided; the
    /// cursor sits at end-of-buffer.
    Incomplete,
}

impl<'a> Lexed<'a> {
    /// Returns the token for a [`Lexed::Match`], `None` otherwise.
    pub fn token(self) -> Option<Token<'a>> {
        match self {
            Lexed::Match(token) => Some(token),
            _ => None,
        }
    }

    /// Returns `true` for [`Lexed::Match`].
    pub fn is_match(self) -> bool {
        matches!(self, Lexed::Match(_))
    }

    /// Returns `true` for [`Lexed::Incomplete`].
    pub fn is_incomplete(self) -> bool {
        matches!(self, Lexed::Incomplete)
    }
}

/// Lexer state: a cursor over one caller-owned input buffer.
///
/// Created per scan session. The grammar-level parser asks it, at some
/// offset, "what token of the expected set starts here?" and decides from
/// the [`Lexed`] outcome whether to advance, retry after more input, or
/// report a syntax error upstream.
///
/// For streaming input, the caller persists the offset where an attempt
/// began, extends its buffer when more bytes arrive, and rebuilds the
/// state with [`Lexer::resume`] at that offset.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer at the start of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(buffer),
        }
    }

    /// Create a lexer over `buffer` at a previously observed offset.
    pub fn resume(buffer: &'a [u8], pos: usize) -> Self {
        Self {
            cursor: Cursor::at(buffer, pos),
        }
    }

    /// Current byte offset into the buffer.
    pub fn pos(&self) -> usize {
        self.cursor.pos()
    }

    /// Returns `true` if the whole buffer has been consumed.
    ///
    /// After an [`Lexed::Incomplete`] outcome this is always `true`; the
    /// parser polls it to tell "need more input" apart from "next token".
    pub fn is_eos(&self) -> bool {
        self.cursor.is_eos()
    }

    /// Build a token from `start` to the current cursor position.
    fn token(&self, tag: TokenTag, start: usize) -> Token<'a> {
        Token {
            tag,
            offset: start,
            bytes: self.cursor.slice_from(start),
        }
    }

    // ─── Whitespace ──────────────────────────────────────────────────

    /// Detect a run of spaces and tabs.
    pub fn whitespace(&mut self) -> Lexed<'a> {
        let start = self.cursor.pos();
        if self.cursor.skip_ws() == 0 {
            return Lexed::NoMatch;
        }
        Lexed::Match(self.token(TokenTag::Whitespace, start))
    }

    // ─── Program headers ─────────────────────────────────────────────

    /// Detect a common (`*RST`, `*IDN?`) or compound (`:SYST:ERR?`,
    /// `MEAS:VOLT`) program header.
    ///
    /// The common form is attempted first; a consumed `*` never falls
    /// through to compound parsing. An incomplete header is itself a
    /// token ([`TokenTag::IncompleteCommonHeader`] /
    /// [`TokenTag::IncompleteCompoundHeader`]) spanning the bytes
    /// consumed so far, with the cursor left after them: the bytes are a
    /// valid prefix, so the caller may wait for more input rather than
    /// reject.
    pub fn program_header(&mut self) -> Lexed<'a> {
        let mark = self.cursor;
        let tag = match self.skip_common_header() {
            Skip::Ok => {
                if self.cursor.skip_byte(b'?').matched() {
                    TokenTag::CommonQueryHeader
                } else {
                    TokenTag::CommonHeader
                }
            }
            Skip::Incomplete => TokenTag::IncompleteCommonHeader,
            Skip::None => match self.skip_compound_header() {
                Skip::Ok => {
                    if self.cursor.skip_byte(b'?').matched() {
                        TokenTag::CompoundQueryHeader
                    } else {
                        TokenTag::CompoundHeader
                    }
                }
                Skip::Incomplete => TokenTag::IncompleteCompoundHeader,
                Skip::None => {
                    self.cursor = mark;
                    return Lexed::NoMatch;
                }
            },
        };
        Lexed::Match(self.token(tag, mark.pos()))
    }

    /// `*` + mnemonic. A mnemonic that runs into end-of-buffer still
    /// completes the header; only a missing mnemonic is incomplete.
    fn skip_common_header(&mut self) -> Skip {
        if !self.cursor.skip_byte(b'*').matched() {
            return Skip::None;
        }
        let (_, count) = self.cursor.skip_mnemonic();
        if count > 0 {
            Skip::Ok
        } else {
            Skip::Incomplete
        }
    }

    /// Optional leading `:`, mnemonic, then zero or more `:` + mnemonic.
    ///
    /// A consumed `:` promises a mnemonic: if none follows, the header is
    /// incomplete, not absent. A mnemonic running into end-of-buffer
    /// completes the header (its continuation is settled by whatever
    /// byte arrives next scan).
    fn skip_compound_header(&mut self) -> Skip {
        let leading_colon = self.cursor.skip_byte(b':').matched();
        let (status, count) = self.cursor.skip_mnemonic();
        match status {
            Skip::Ok => {
                while self.cursor.skip_byte(b':').matched() {
                    let (inner, n) = self.cursor.skip_mnemonic();
                    if n == 0 {
                        return Skip::Incomplete;
                    }
                    if inner == Skip::Incomplete {
                        return Skip::Ok;
                    }
                }
                Skip::Ok
            }
            Skip::Incomplete => {
                debug_assert!(count > 0);
                Skip::Ok
            }
            Skip::None => {
                if leading_colon {
                    Skip::Incomplete
                } else {
                    Skip::None
                }
            }
        }
    }

    // ─── Character program data ──────────────────────────────────────

    /// Detect a bare mnemonic used as program data (`MAXimum`, `DEF`).
    pub fn character_program_data(&mut self) -> Lexed<'a> {
        let start = self.cursor.pos();
        let (_, count) = self.cursor.skip_mnemonic();
        if count == 0 {
            return Lexed::NoMatch;
        }
        Lexed::Match(self.token(TokenTag::ProgramMnemonic, start))
    }

    // ─── Decimal numeric program data ────────────────────────────────

    /// Detect a decimal number: signed mantissa with optional fraction,
    /// optionally followed by a whitespace-separated exponent.
    ///
    /// A failed exponent probe (no `E`, or `E` without digits) rolls the
    /// cursor back to immediately after the mantissa, discarding any
    /// whitespace and the lone `E` consumed while probing. The token
    /// boundary is the mantissa plus a well-formed exponent, never a
    /// partial exponent attempt.
    pub fn decimal_numeric_data(&mut self) -> Lexed<'a> {
        let mark = self.cursor;
        if self.skip_mantissa() == 0 {
            self.cursor = mark;
            return Lexed::NoMatch;
        }
        let after_mantissa = self.cursor;
        self.cursor.skip_ws();
        if self.skip_exponent() == 0 {
            self.cursor = after_mantissa;
        }
        Lexed::Match(self.token(TokenTag::DecimalNumericData, mark.pos()))
    }

    /// Optional sign, digit run, optional `.` + digit run.
    /// Returns the number of digits seen; sign and a lone `.` count for
    /// nothing on their own.
    fn skip_mantissa(&mut self) -> usize {
        self.cursor.skip_sign();
        let mut digits = self.cursor.skip_digits();
        if self.cursor.skip_byte(b'.').matched() {
            digits += self.cursor.skip_digits();
        }
        digits
    }

    /// `E`/`e`, optional whitespace, optional sign, digit run.
    /// Returns the number of exponent digits (0 means the probe failed).
    fn skip_exponent(&mut self) -> usize {
        if self.cursor.is_eos() || !matches!(self.cursor.current(), b'e' | b'E') {
            return 0;
        }
        self.cursor.advance();
        self.cursor.skip_ws();
        self.cursor.skip_sign();
        self.cursor.skip_digits()
    }

    // ─── Suffix program data ─────────────────────────────────────────

    /// Detect a unit suffix: optional `/`, then letters with an optional
    /// `-` and single digit, repeated across `/` or `.` separators
    /// (`MOHM`, `KM/S`, `V-1`).
    pub fn suffix_program_data(&mut self) -> Lexed<'a> {
        let mark = self.cursor;
        self.cursor.skip_byte(b'/');
        if self.cursor.skip_letters() == 0 {
            self.cursor = mark;
            return Lexed::NoMatch;
        }
        self.cursor.skip_byte(b'-');
        self.cursor.skip_digit();
        while self.cursor.skip_slash_or_dot().matched() {
            self.cursor.skip_letters();
            self.cursor.skip_byte(b'-');
            self.cursor.skip_digit();
        }
        Lexed::Match(self.token(TokenTag::SuffixData, mark.pos()))
    }

    // ─── Non-decimal numeric program data ────────────────────────────

    /// Detect a `#H`/`#Q`/`#B` numeric literal.
    ///
    /// The token covers only the digit run; the two prefix bytes are
    /// stripped from the span but counted in the cursor advance, so
    /// outer scanning resumes after the digits. Zero digits after a
    /// recognized prefix is a no-match, restored before the `#`.
    pub fn nondecimal_numeric_data(&mut self) -> Lexed<'a> {
        let mark = self.cursor;
        if !self.cursor.skip_byte(b'#').matched() {
            return Lexed::NoMatch;
        }
        let (tag, digits) = if self.cursor.is_eos() {
            (TokenTag::Unknown, 0)
        } else {
            match self.cursor.current() {
                b'h' | b'H' => {
                    self.cursor.advance();
                    (TokenTag::HexNumericData, self.cursor.skip_hex_digits())
                }
                b'q' | b'Q' => {
                    self.cursor.advance();
                    (TokenTag::OctNumericData, self.cursor.skip_oct_digits())
                }
                b'b' | b'B' => {
                    self.cursor.advance();
                    (TokenTag::BinNumericData, self.cursor.skip_bin_digits())
                }
                _ => (TokenTag::Unknown, 0),
            }
        };
        if digits == 0 {
            self.cursor = mark;
            return Lexed::NoMatch;
        }
        Lexed::Match(self.token(tag, mark.pos() + 2))
    }

    // ─── String program data ─────────────────────────────────────────

    /// Detect a double- or single-quoted string, selected by the opening
    /// byte. A doubled quote inside the body is a literal quote.
    ///
    /// The span includes both outer quotes. If the buffer ends before
    /// the closing quote resolves, the result is a plain no-match with
    /// the cursor restored to the opening quote: this detector does not
    /// distinguish "truncated" from "malformed" for strings, so the
    /// caller applies its own retry policy.
    pub fn string_program_data(&mut self) -> Lexed<'a> {
        let mark = self.cursor;
        if self.cursor.is_eos() {
            return Lexed::NoMatch;
        }
        let (quote, tag) = match self.cursor.current() {
            b'"' => (b'"', TokenTag::DoubleQuoteData),
            b'\'' => (b'\'', TokenTag::SingleQuoteData),
            _ => return Lexed::NoMatch,
        };
        self.cursor.advance();
        self.skip_quote_body(quote);
        if self.cursor.skip_byte(quote).matched() {
            Lexed::Match(self.token(tag, mark.pos()))
        } else {
            self.cursor = mark;
            Lexed::NoMatch
        }
    }

    /// Advance past the string body: any 7-bit byte other than the quote
    /// is consumed verbatim; a doubled quote is consumed as literal
    /// content; a lone quote is left unconsumed as the closing quote.
    ///
    /// Uses `memchr` to jump to the next quote candidate, combined with
    /// a positional scan for the first byte above `0x7F` (which also
    /// ends the body).
    fn skip_quote_body(&mut self, quote: u8) {
        loop {
            let rest = self.cursor.rest();
            let Some(stop) = earliest_of(
                memchr::memchr(quote, rest),
                rest.iter().position(|&b| b > 0x7F),
            ) else {
                // Plain 7-bit content to the end of the buffer.
                self.cursor.seek_to_end();
                return;
            };
            self.cursor.advance_n(stop);
            if self.cursor.current() != quote {
                // Byte above 0x7F: body ends here, close-quote check
                // will fail on it.
                return;
            }
            if self.cursor.peek() == quote {
                self.cursor.advance_n(2);
            } else {
                return;
            }
        }
    }

    // ─── Arbitrary block program data ────────────────────────────────

    /// Detect a length-prefixed binary block: `#`, one non-zero digit N,
    /// N decimal digits giving the payload length L, then exactly L raw
    /// bytes of any value.
    ///
    /// The token covers exactly the payload; the header is stripped from
    /// the span but counted in the cursor advance. Once the length is
    /// known, payload bytes are never re-interpreted as syntax. A header
    /// or payload cut off by end-of-buffer is [`Lexed::Incomplete`] with
    /// the whole buffer treated as consumed.
    pub fn arbitrary_block_data(&mut self) -> Lexed<'a> {
        let mark = self.cursor;
        if !self.cursor.skip_byte(b'#').matched() {
            return Lexed::NoMatch;
        }
        if self.cursor.is_eos() {
            // The length field may still arrive.
            return Lexed::Incomplete;
        }
        let field = self.cursor.current();
        if !matches!(field, b'1'..=b'9') {
            self.cursor = mark;
            return Lexed::NoMatch;
        }
        self.cursor.advance();

        // At most 9 length digits, so block_len < 10^9: no overflow.
        let mut block_len: usize = 0;
        for _ in 0..field - b'0' {
            if self.cursor.is_eos() {
                return Lexed::Incomplete;
            }
            let b = self.cursor.current();
            if !b.is_ascii_digit() {
                self.cursor = mark;
                return Lexed::NoMatch;
            }
            block_len = block_len * 10 + usize::from(b - b'0');
            self.cursor.advance();
        }

        if self.cursor.remaining() < block_len {
            self.cursor.seek_to_end();
            return Lexed::Incomplete;
        }
        let payload_start = self.cursor.pos();
        self.cursor.advance_n(block_len);
        Lexed::Match(self.token(TokenTag::ArbitraryBlockData, payload_start))
    }

    // ─── Expression program data ─────────────────────────────────────

    /// Detect a parenthesized expression: `(`, a maximal run of printable
    /// 7-bit bytes excluding `"` `#` `'` `(` `)` `;`, then `)`.
    ///
    /// Nested parentheses and recursive program data are not part of
    /// this grammar: an interior `(` or `)` ends the run, and a missing
    /// closing `)` is a no-match with the cursor restored.
    pub fn program_expression(&mut self) -> Lexed<'a> {
        let mark = self.cursor;
        if !self.cursor.skip_byte(b'(').matched() {
            return Lexed::NoMatch;
        }
        self.cursor.eat_while(is_expression_byte);
        if self.cursor.skip_byte(b')').matched() {
            Lexed::Match(self.token(TokenTag::ExpressionData, mark.pos()))
        } else {
            self.cursor = mark;
            Lexed::NoMatch
        }
    }

    // ─── Separators & terminators ────────────────────────────────────

    /// Detect `,`.
    pub fn comma(&mut self) -> Lexed<'a> {
        self.punct(b',', TokenTag::Comma)
    }

    /// Detect `;`.
    pub fn semicolon(&mut self) -> Lexed<'a> {
        self.punct(b';', TokenTag::Semicolon)
    }

    /// Detect `:`.
    pub fn colon(&mut self) -> Lexed<'a> {
        self.punct(b':', TokenTag::Colon)
    }

    /// Detect a caller-specified single byte.
    pub fn specific_character(&mut self, byte: u8) -> Lexed<'a> {
        self.punct(byte, TokenTag::SpecificCharacter)
    }

    /// Single-byte token: consume `byte` and emit `tag`.
    fn punct(&mut self, byte: u8, tag: TokenTag) -> Lexed<'a> {
        let start = self.cursor.pos();
        if self.cursor.skip_byte(byte).matched() {
            Lexed::Match(self.token(tag, start))
        } else {
            Lexed::NoMatch
        }
    }

    /// Detect a message terminator: `\r`, `\n`, or `\r\n` (in that
    /// order, either or both).
    pub fn newline(&mut self) -> Lexed<'a> {
        let start = self.cursor.pos();
        self.cursor.skip_byte(b'\r');
        self.cursor.skip_byte(b'\n');
        if self.cursor.pos() == start {
            return Lexed::NoMatch;
        }
        Lexed::Match(self.token(TokenTag::Newline, start))
    }
}

/// Returns the earliest (minimum) of two optional positions.
///
/// Combines the `memchr` quote search with the positional scan for
/// non-7-bit bytes in the string body scanner.
fn earliest_of(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// 256-byte lookup table for expression body bytes: printable 7-bit
/// ASCII (`0x20`-`0x7E`) excluding `"` `#` `'` `(` `)` `;`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "loop counter i is 0..=255, always fits in u8"
)]
static IS_EXPRESSION_BYTE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0usize;
    while i < 256 {
        let b = i as u8;
        table[i] = matches!(b, 0x20..=0x7E)
            && !matches!(b, b'"' | b'#' | b'\'' | b'(' | b')' | b';');
        i += 1;
    }
    table
};

/// Returns `true` if `b` may appear inside expression program data.
#[inline]
fn is_expression_byte(b: u8) -> bool {
    IS_EXPRESSION_BYTE_TABLE[b as usize]
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: run a detector expecting a match; panics otherwise.
    fn expect_match<'a>(lexed: Lexed<'a>) -> Token<'a> {
        match lexed {
            Lexed::Match(token) => token,
            other => panic!("expected a match, got {other:?}"),
        }
    }

    // ─── Whitespace ──────────────────────────────────────────────────

    #[test]
    fn whitespace_consumes_spaces_and_tabs() {
        let mut lexer = Lexer::new(b" \t  X");
        let tok = expect_match(lexer.whitespace());
        assert_eq!(tok.tag, TokenTag::Whitespace);
        assert_eq!(tok.bytes, b" \t  ");
        assert_eq!(lexer.pos(), 4);
    }

    #[test]
    fn whitespace_absent_is_no_match() {
        let mut lexer = Lexer::new(b"X");
        assert_eq!(lexer.whitespace(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    #[test]
    fn whitespace_stops_at_newline() {
        let mut lexer = Lexer::new(b"  \nX");
        let tok = expect_match(lexer.whitespace());
        assert_eq!(tok.bytes, b"  ");
    }

    // ─── Program headers ─────────────────────────────────────────────

    #[test]
    fn common_header_without_query() {
        let mut lexer = Lexer::new(b"*RST");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::CommonHeader);
        assert_eq!(tok.bytes, b"*RST");
        assert_eq!(lexer.pos(), 4);
    }

    #[test]
    fn common_query_header() {
        let mut lexer = Lexer::new(b"*IDN?");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::CommonQueryHeader);
        assert_eq!(tok.bytes, b"*IDN?");
    }

    #[test]
    fn common_header_stops_before_separator() {
        let mut lexer = Lexer::new(b"*CLS;");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::CommonHeader);
        assert_eq!(tok.bytes, b"*CLS");
        assert_eq!(lexer.pos(), 4);
    }

    #[test]
    fn star_without_mnemonic_is_incomplete_common() {
        let mut lexer = Lexer::new(b"*");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::IncompleteCommonHeader);
        assert_eq!(tok.bytes, b"*");
        assert!(lexer.is_eos());
    }

    #[test]
    fn star_before_non_letter_is_incomplete_common() {
        // '*' never falls through to compound parsing.
        let mut lexer = Lexer::new(b"*1");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::IncompleteCommonHeader);
        assert_eq!(tok.bytes, b"*");
        assert_eq!(lexer.pos(), 1);
    }

    #[test]
    fn compound_query_header() {
        let mut lexer = Lexer::new(b":SYST:ERR?");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::CompoundQueryHeader);
        assert_eq!(tok.bytes, b":SYST:ERR?");
        assert_eq!(lexer.pos(), 10);
    }

    #[test]
    fn compound_header_without_leading_colon() {
        let mut lexer = Lexer::new(b"MEAS:VOLT:DC ");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::CompoundHeader);
        assert_eq!(tok.bytes, b"MEAS:VOLT:DC");
    }

    #[test]
    fn single_mnemonic_is_compound_header() {
        let mut lexer = Lexer::new(b"CONF ");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::CompoundHeader);
        assert_eq!(tok.bytes, b"CONF");
    }

    #[test]
    fn trailing_colon_at_end_is_incomplete_compound() {
        let mut lexer = Lexer::new(b":SYST:");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::IncompleteCompoundHeader);
        assert_eq!(tok.bytes, b":SYST:");
        assert!(lexer.is_eos());
    }

    #[test]
    fn lone_colon_is_incomplete_compound() {
        let mut lexer = Lexer::new(b":");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::IncompleteCompoundHeader);
        assert_eq!(tok.bytes, b":");
    }

    #[test]
    fn colon_before_non_letter_is_incomplete_compound() {
        let mut lexer = Lexer::new(b":1");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::IncompleteCompoundHeader);
        assert_eq!(tok.bytes, b":");
        assert_eq!(lexer.pos(), 1);
    }

    #[test]
    fn mnemonic_running_into_buffer_end_completes_header() {
        // More letters may arrive, but the bytes so far form a header;
        // the caller re-scans once the message terminator is seen.
        let mut lexer = Lexer::new(b"*RST");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::CommonHeader);

        let mut lexer = Lexer::new(b":SYST:ERR");
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.tag, TokenTag::CompoundHeader);
        assert_eq!(tok.bytes, b":SYST:ERR");
    }

    #[test]
    fn header_no_match_restores_cursor() {
        let mut lexer = Lexer::new(b"123");
        assert_eq!(lexer.program_header(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    // ─── Character program data ──────────────────────────────────────

    #[test]
    fn character_data_is_a_mnemonic() {
        let mut lexer = Lexer::new(b"MAXimum,");
        let tok = expect_match(lexer.character_program_data());
        assert_eq!(tok.tag, TokenTag::ProgramMnemonic);
        assert_eq!(tok.bytes, b"MAXimum");
        assert_eq!(lexer.pos(), 7);
    }

    #[test]
    fn character_data_requires_leading_letter() {
        let mut lexer = Lexer::new(b"2ABC");
        assert_eq!(lexer.character_program_data(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    // ─── Decimal numeric program data ────────────────────────────────

    #[test]
    fn decimal_integer() {
        let mut lexer = Lexer::new(b"42,");
        let tok = expect_match(lexer.decimal_numeric_data());
        assert_eq!(tok.tag, TokenTag::DecimalNumericData);
        assert_eq!(tok.bytes, b"42");
    }

    #[test]
    fn decimal_signed_fraction() {
        let mut lexer = Lexer::new(b"-10.5V");
        let tok = expect_match(lexer.decimal_numeric_data());
        assert_eq!(tok.bytes, b"-10.5");
        assert_eq!(lexer.pos(), 5);
    }

    #[test]
    fn decimal_fraction_without_integer_part() {
        let mut lexer = Lexer::new(b"+.5 ");
        let tok = expect_match(lexer.decimal_numeric_data());
        assert_eq!(tok.bytes, b"+.5");
    }

    #[test]
    fn decimal_with_exponent() {
        let mut lexer = Lexer::new(b"1.5E-3,");
        let tok = expect_match(lexer.decimal_numeric_data());
        assert_eq!(tok.bytes, b"1.5E-3");
        assert_eq!(lexer.pos(), 6);
    }

    #[test]
    fn decimal_exponent_with_interior_whitespace() {
        let mut lexer = Lexer::new(b"1 e 5;");
        let tok = expect_match(lexer.decimal_numeric_data());
        assert_eq!(tok.bytes, b"1 e 5");
    }

    #[test]
    fn decimal_exponent_without_digits_rolls_back() {
        // The exponent attempt is discarded entirely: the token is the
        // mantissa, and neither the whitespace nor the 'E' stays consumed.
        let mut lexer = Lexer::new(b"1.5E");
        let tok = expect_match(lexer.decimal_numeric_data());
        assert_eq!(tok.bytes, b"1.5");
        assert_eq!(lexer.pos(), 3);

        let mut lexer = Lexer::new(b"2 EOM");
        let tok = expect_match(lexer.decimal_numeric_data());
        assert_eq!(tok.bytes, b"2");
        assert_eq!(lexer.pos(), 1);
    }

    #[test]
    fn decimal_requires_mantissa_digits() {
        for input in [&b"+"[..], b"-", b".", b"+.", b"E5", b"abc"] {
            let mut lexer = Lexer::new(input);
            assert_eq!(lexer.decimal_numeric_data(), Lexed::NoMatch, "input {input:?}");
            assert_eq!(lexer.pos(), 0, "cursor moved for {input:?}");
        }
    }

    // ─── Suffix program data ─────────────────────────────────────────

    #[test]
    fn suffix_simple_unit() {
        let mut lexer = Lexer::new(b"MOHM,");
        let tok = expect_match(lexer.suffix_program_data());
        assert_eq!(tok.tag, TokenTag::SuffixData);
        assert_eq!(tok.bytes, b"MOHM");
    }

    #[test]
    fn suffix_with_leading_slash() {
        let mut lexer = Lexer::new(b"/S ");
        let tok = expect_match(lexer.suffix_program_data());
        assert_eq!(tok.bytes, b"/S");
    }

    #[test]
    fn suffix_compound_units() {
        let mut lexer = Lexer::new(b"KM/S;");
        let tok = expect_match(lexer.suffix_program_data());
        assert_eq!(tok.bytes, b"KM/S");

        let mut lexer = Lexer::new(b"V.A ");
        let tok = expect_match(lexer.suffix_program_data());
        assert_eq!(tok.bytes, b"V.A");
    }

    #[test]
    fn suffix_with_negative_power() {
        let mut lexer = Lexer::new(b"M.S-2 ");
        let tok = expect_match(lexer.suffix_program_data());
        assert_eq!(tok.bytes, b"M.S-2");
    }

    #[test]
    fn suffix_requires_letters() {
        // A bare '/' is not a suffix.
        for input in [&b"/"[..], b"/,", b"-2", b"123"] {
            let mut lexer = Lexer::new(input);
            assert_eq!(lexer.suffix_program_data(), Lexed::NoMatch, "input {input:?}");
            assert_eq!(lexer.pos(), 0);
        }
    }

    // ─── Non-decimal numeric program data ────────────────────────────

    #[test]
    fn hex_literal_strips_prefix() {
        let mut lexer = Lexer::new(b"#H2A,");
        let tok = expect_match(lexer.nondecimal_numeric_data());
        assert_eq!(tok.tag, TokenTag::HexNumericData);
        assert_eq!(tok.bytes, b"2A");
        assert_eq!(tok.offset, 2);
        // The cursor accounts for the stripped "#H" prefix.
        assert_eq!(lexer.pos(), 4);
    }

    #[test]
    fn octal_and_binary_literals() {
        let mut lexer = Lexer::new(b"#Q17 ");
        let tok = expect_match(lexer.nondecimal_numeric_data());
        assert_eq!(tok.tag, TokenTag::OctNumericData);
        assert_eq!(tok.bytes, b"17");

        let mut lexer = Lexer::new(b"#B0101 ");
        let tok = expect_match(lexer.nondecimal_numeric_data());
        assert_eq!(tok.tag, TokenTag::BinNumericData);
        assert_eq!(tok.bytes, b"0101");
    }

    #[test]
    fn base_letter_accepts_both_cases() {
        let mut lexer = Lexer::new(b"#hff");
        let tok = expect_match(lexer.nondecimal_numeric_data());
        assert_eq!(tok.tag, TokenTag::HexNumericData);
        assert_eq!(tok.bytes, b"ff");
    }

    #[test]
    fn digit_invalid_for_base_is_no_match() {
        // '9' is not an octal digit; cursor restored before the '#'.
        let mut lexer = Lexer::new(b"#Q9");
        assert_eq!(lexer.nondecimal_numeric_data(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    #[test]
    fn prefix_without_digits_is_no_match() {
        for input in [&b"#H"[..], b"#HZ", b"#B2", b"#", b"#X1", b"42"] {
            let mut lexer = Lexer::new(input);
            assert_eq!(lexer.nondecimal_numeric_data(), Lexed::NoMatch, "input {input:?}");
            assert_eq!(lexer.pos(), 0);
        }
    }

    // ─── String program data ─────────────────────────────────────────

    #[test]
    fn double_quoted_string() {
        let mut lexer = Lexer::new(b"\"volt\",");
        let tok = expect_match(lexer.string_program_data());
        assert_eq!(tok.tag, TokenTag::DoubleQuoteData);
        assert_eq!(tok.bytes, b"\"volt\"");
        assert_eq!(lexer.pos(), 6);
    }

    #[test]
    fn single_quoted_string() {
        let mut lexer = Lexer::new(b"'volt' ");
        let tok = expect_match(lexer.string_program_data());
        assert_eq!(tok.tag, TokenTag::SingleQuoteData);
        assert_eq!(tok.bytes, b"'volt'");
    }

    #[test]
    fn empty_string() {
        let mut lexer = Lexer::new(b"\"\"");
        let tok = expect_match(lexer.string_program_data());
        assert_eq!(tok.bytes, b"\"\"");
    }

    #[test]
    fn doubled_quote_is_literal_content() {
        // Body aa""bb, quotes preserved; span includes the outer quotes.
        let mut lexer = Lexer::new(b"\"aa\"\"bb\"");
        let tok = expect_match(lexer.string_program_data());
        assert_eq!(tok.bytes, b"\"aa\"\"bb\"");
        assert_eq!(lexer.pos(), 8);
    }

    #[test]
    fn other_quote_kind_is_plain_content() {
        let mut lexer = Lexer::new(b"\"it's\"");
        let tok = expect_match(lexer.string_program_data());
        assert_eq!(tok.bytes, b"\"it's\"");
    }

    #[test]
    fn unterminated_string_is_no_match() {
        let mut lexer = Lexer::new(b"\"abc");
        assert_eq!(lexer.string_program_data(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);

        // Trailing doubled quote is content, so this one is open too.
        let mut lexer = Lexer::new(b"\"abc\"\"");
        assert_eq!(lexer.string_program_data(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    #[test]
    fn non_ascii_byte_breaks_string_body() {
        let mut lexer = Lexer::new(b"\"ab\x80cd\"");
        assert_eq!(lexer.string_program_data(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    #[test]
    fn not_a_quote_is_no_match() {
        let mut lexer = Lexer::new(b"volt");
        assert_eq!(lexer.string_program_data(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    // ─── Arbitrary block program data ────────────────────────────────

    #[test]
    fn block_with_full_payload() {
        let mut lexer = Lexer::new(b"#15HELLO,");
        let tok = expect_match(lexer.arbitrary_block_data());
        assert_eq!(tok.tag, TokenTag::ArbitraryBlockData);
        assert_eq!(tok.bytes, b"HELLO");
        assert_eq!(tok.offset, 3);
        // Header (#15) plus payload consumed.
        assert_eq!(lexer.pos(), 8);
    }

    #[test]
    fn block_payload_may_contain_any_byte() {
        // Delimiters, quotes, and non-ASCII bytes inside the payload are
        // never re-interpreted as syntax.
        let mut lexer = Lexer::new(b"#16;\"'\x00\xFF(X");
        let tok = expect_match(lexer.arbitrary_block_data());
        assert_eq!(tok.bytes, b";\"'\x00\xFF(");
        assert_eq!(lexer.pos(), 9);
    }

    #[test]
    fn block_multi_digit_length_field() {
        let mut payload = vec![0xAAu8; 12];
        let mut buf = b"#212".to_vec();
        buf.append(&mut payload);
        buf.push(b';');
        let mut lexer = Lexer::new(&buf);
        let tok = expect_match(lexer.arbitrary_block_data());
        assert_eq!(tok.len(), 12);
        assert_eq!(lexer.pos(), 16);
    }

    #[test]
    fn block_truncated_payload_is_incomplete() {
        let mut lexer = Lexer::new(b"#15HEL");
        assert_eq!(lexer.arbitrary_block_data(), Lexed::Incomplete);
        assert!(lexer.is_eos());
    }

    #[test]
    fn block_truncated_length_digits_is_incomplete() {
        let mut lexer = Lexer::new(b"#2");
        assert_eq!(lexer.arbitrary_block_data(), Lexed::Incomplete);
        assert!(lexer.is_eos());

        let mut lexer = Lexer::new(b"#21");
        assert_eq!(lexer.arbitrary_block_data(), Lexed::Incomplete);
        assert!(lexer.is_eos());
    }

    #[test]
    fn hash_at_buffer_end_is_incomplete() {
        let mut lexer = Lexer::new(b"#");
        assert_eq!(lexer.arbitrary_block_data(), Lexed::Incomplete);
        assert!(lexer.is_eos());
    }

    #[test]
    fn zero_length_field_digit_is_no_match() {
        let mut lexer = Lexer::new(b"#05");
        assert_eq!(lexer.arbitrary_block_data(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    #[test]
    fn non_digit_in_length_field_is_no_match() {
        let mut lexer = Lexer::new(b"#2A!!!");
        assert_eq!(lexer.arbitrary_block_data(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    #[test]
    fn block_resumes_after_more_bytes_arrive() {
        let short = b"#15HEL";
        let mut lexer = Lexer::new(short);
        assert_eq!(lexer.arbitrary_block_data(), Lexed::Incomplete);

        // The transport appends bytes; retry from the saved token start.
        let full = b"#15HELLO";
        let mut lexer = Lexer::resume(full, 0);
        let tok = expect_match(lexer.arbitrary_block_data());
        assert_eq!(tok.bytes, b"HELLO");
    }

    // ─── Expression program data ─────────────────────────────────────

    #[test]
    fn expression_with_operators() {
        let mut lexer = Lexer::new(b"(1+2*3),");
        let tok = expect_match(lexer.program_expression());
        assert_eq!(tok.tag, TokenTag::ExpressionData);
        assert_eq!(tok.bytes, b"(1+2*3)");
        assert_eq!(lexer.pos(), 7);
    }

    #[test]
    fn empty_expression() {
        let mut lexer = Lexer::new(b"()");
        let tok = expect_match(lexer.program_expression());
        assert_eq!(tok.bytes, b"()");
    }

    #[test]
    fn nested_parentheses_are_not_supported() {
        let mut lexer = Lexer::new(b"(1+(2))");
        assert_eq!(lexer.program_expression(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    #[test]
    fn excluded_bytes_end_the_expression_body() {
        for input in [&b"(1;2)"[..], b"(\"a\")", b"('a')", b"(#5)"] {
            let mut lexer = Lexer::new(input);
            assert_eq!(lexer.program_expression(), Lexed::NoMatch, "input {input:?}");
            assert_eq!(lexer.pos(), 0);
        }
    }

    #[test]
    fn unclosed_expression_is_no_match() {
        let mut lexer = Lexer::new(b"(1+2");
        assert_eq!(lexer.program_expression(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    // ─── Separators & terminators ────────────────────────────────────

    #[test]
    fn punctuation_single_bytes() {
        let mut lexer = Lexer::new(b",;:");
        assert_eq!(expect_match(lexer.comma()).tag, TokenTag::Comma);
        assert_eq!(expect_match(lexer.semicolon()).tag, TokenTag::Semicolon);
        assert_eq!(expect_match(lexer.colon()).tag, TokenTag::Colon);
        assert!(lexer.is_eos());
    }

    #[test]
    fn punctuation_no_match_leaves_cursor() {
        let mut lexer = Lexer::new(b";");
        assert_eq!(lexer.comma(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    #[test]
    fn specific_character_matches_requested_byte() {
        let mut lexer = Lexer::new(b"@2");
        let tok = expect_match(lexer.specific_character(b'@'));
        assert_eq!(tok.tag, TokenTag::SpecificCharacter);
        assert_eq!(tok.bytes, b"@");

        assert_eq!(lexer.specific_character(b'@'), Lexed::NoMatch);
    }

    #[test]
    fn newline_variants() {
        let mut lexer = Lexer::new(b"\r\nX");
        let tok = expect_match(lexer.newline());
        assert_eq!(tok.tag, TokenTag::Newline);
        assert_eq!(tok.bytes, b"\r\n");

        let mut lexer = Lexer::new(b"\nX");
        assert_eq!(expect_match(lexer.newline()).bytes, b"\n");

        let mut lexer = Lexer::new(b"\rX");
        assert_eq!(expect_match(lexer.newline()).bytes, b"\r");
    }

    #[test]
    fn newline_rejects_lf_cr_order() {
        // Only \r then \n combines; \n\r is two terminators.
        let mut lexer = Lexer::new(b"\n\r");
        assert_eq!(expect_match(lexer.newline()).bytes, b"\n");
        assert_eq!(expect_match(lexer.newline()).bytes, b"\r");
    }

    #[test]
    fn newline_absent_is_no_match() {
        let mut lexer = Lexer::new(b"X");
        assert_eq!(lexer.newline(), Lexed::NoMatch);
        assert_eq!(lexer.pos(), 0);
    }

    // ─── Whole-message scanning ──────────────────────────────────────

    #[test]
    fn tokens_tile_a_typical_message() {
        // Each detector resumes exactly where the previous one stopped.
        let buf = b"MEAS:VOLT:DC? 1.5E-3,\"range\";*RST\r\n";
        let mut lexer = Lexer::new(buf);

        let header = expect_match(lexer.program_header());
        assert_eq!(header.tag, TokenTag::CompoundQueryHeader);
        assert_eq!(header.bytes, b"MEAS:VOLT:DC?");

        expect_match(lexer.whitespace());

        let number = expect_match(lexer.decimal_numeric_data());
        assert_eq!(number.bytes, b"1.5E-3");

        expect_match(lexer.comma());

        let string = expect_match(lexer.string_program_data());
        assert_eq!(string.bytes, b"\"range\"");

        expect_match(lexer.semicolon());

        let common = expect_match(lexer.program_header());
        assert_eq!(common.tag, TokenTag::CommonHeader);
        assert_eq!(common.bytes, b"*RST");

        expect_match(lexer.newline());
        assert!(lexer.is_eos());
    }

    #[test]
    fn matched_token_spans_the_consumed_range() {
        // For plain (non-prefix-stripped) kinds the token bytes are
        // exactly the consumed bytes.
        let buf = b":SOUR:FREQ 12.5KHZ\n";
        let mut lexer = Lexer::new(buf);
        let mut covered = 0;
        let header = expect_match(lexer.program_header());
        covered += header.len();
        covered += expect_match(lexer.whitespace()).len();
        covered += expect_match(lexer.decimal_numeric_data()).len();
        covered += expect_match(lexer.suffix_program_data()).len();
        covered += expect_match(lexer.newline()).len();
        assert_eq!(covered, buf.len());
        assert_eq!(lexer.pos(), buf.len());
    }

    #[test]
    fn resume_continues_mid_buffer() {
        let buf = b"*IDN?;*RST";
        let mut lexer = Lexer::new(buf);
        expect_match(lexer.program_header());
        expect_match(lexer.semicolon());
        let pos = lexer.pos();

        let mut lexer = Lexer::resume(buf, pos);
        let tok = expect_match(lexer.program_header());
        assert_eq!(tok.bytes, b"*RST");
        assert_eq!(tok.offset, 6);
    }

    // ─── Property tests ──────────────────────────────────────────────

    mod proptest_detectors {
        use super::*;
        // Direct import: the glob-imported macro from the outer module
        // is ambiguous with the proptest prelude's assert_eq.
        use pretty_assertions::assert_eq;
        use proptest::prelude::*;
        use proptest::test_runner::TestCaseError;

        /// Postcondition shared by every detector: a no-match restores
        /// the cursor exactly, a match leaves the cursor at or past the
        /// token end with the token bytes aliasing the buffer, and an
        /// incomplete parks the cursor at end-of-buffer.
        fn check_detector<'a>(buf: &'a [u8], detect: impl Fn(&mut Lexer<'a>) -> Lexed<'a>) {
            let mut lexer = Lexer::new(buf);
            match detect(&mut lexer) {
                Lexed::NoMatch => assert_eq!(lexer.pos(), 0, "cursor moved on no-match"),
                Lexed::Match(token) => {
                    assert_eq!(lexer.pos(), token.end(), "cursor does not sit at token end");
                    assert_eq!(&buf[token.offset..token.end()], token.bytes);
                }
                Lexed::Incomplete => {
                    assert_eq!(lexer.pos(), buf.len(), "incomplete must consume the buffer")
                }
            }
        }

        /// Bytes weighted toward the interesting SCPI structure bytes.
        fn scpi_bytes() -> impl Strategy<Value = Vec<u8>> {
            let structural = proptest::sample::select(&b"#*:?\"'(),;.+-/E \t\n\r"[..]);
            proptest::collection::vec(
                prop_oneof![
                    4 => structural,
                    2 => b'0'..=b'9',
                    2 => b'A'..=b'Z',
                    1 => Just(0x80u8),
                    1 => Just(0u8),
                    1 => any::<u8>(),
                ],
                0..48,
            )
        }

        proptest! {
            #[test]
            fn detectors_uphold_cursor_contract(buf in scpi_bytes()) {
                check_detector(&buf, Lexer::whitespace);
                check_detector(&buf, Lexer::program_header);
                check_detector(&buf, Lexer::character_program_data);
                check_detector(&buf, Lexer::decimal_numeric_data);
                check_detector(&buf, Lexer::suffix_program_data);
                check_detector(&buf, Lexer::string_program_data);
                check_detector(&buf, Lexer::program_expression);
                check_detector(&buf, Lexer::comma);
                check_detector(&buf, Lexer::semicolon);
                check_detector(&buf, Lexer::colon);
                check_detector(&buf, Lexer::newline);
                check_detector(&buf, |l| l.specific_character(b'@'));
            }

            #[test]
            fn prefix_stripped_detectors_account_for_all_consumed_bytes(buf in scpi_bytes()) {
                // Non-decimal numerics strip "#<base>"; blocks strip the
                // whole "#N<digits>" header. Reconstructing prefix +
                // token bytes must tile the consumed span.
                let mut lexer = Lexer::new(&buf);
                if let Lexed::Match(token) = lexer.nondecimal_numeric_data() {
                    assert_eq!(token.offset, 2);
                    assert_eq!(lexer.pos(), token.end());
                    assert_eq!(&buf[token.offset..token.end()], token.bytes);
                } else {
                    // NoMatch restores; this detector has no incomplete state.
                    assert_eq!(lexer.pos(), 0);
                }

                let mut lexer = Lexer::new(&buf);
                match lexer.arbitrary_block_data() {
                    Lexed::Match(token) => {
                        assert_eq!(lexer.pos(), token.end());
                        assert_eq!(&buf[token.offset..token.end()], token.bytes);
                    }
                    Lexed::NoMatch => assert_eq!(lexer.pos(), 0),
                    Lexed::Incomplete => assert_eq!(lexer.pos(), buf.len()),
                }
            }

            #[test]
            fn growing_an_incomplete_block_converges(payload in proptest::collection::vec(any::<u8>(), 0..40)) {
                let mut buf = format!("#2{:02}", payload.len()).into_bytes();
                buf.extend_from_slice(&payload);

                // Every truncation of the full message is incomplete
                // (except the empty buffer, which is a plain no-match).
                for cut in 1..buf.len() {
                    let mut lexer = Lexer::new(&buf[..cut]);
                    prop_assert_eq!(
                        lexer.arbitrary_block_data(),
                        Lexed::Incomplete,
                        "cut at {}", cut
                    );
                }

                let mut lexer = Lexer::new(&buf);
                let tok = match lexer.arbitrary_block_data() {
                    Lexed::Match(tok) => tok,
                    other => return Err(TestCaseError::fail(format!("expected match, got {other:?}"))),
                };
                prop_assert_eq!(tok.bytes, payload.as_slice());
            }
        }
    }
}
