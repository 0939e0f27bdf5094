//! Character classifiers and composable skip primitives.
//!
//! Every token detector is built from these primitives. Each primitive
//! consumes zero or more bytes matching one narrow sub-pattern starting
//! exactly at the cursor and reports a tri-state [`Skip`] outcome, with a
//! separate byte count where a count is meaningful.

use crate::cursor::Cursor;

/// Outcome of a skip primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Skip {
    /// No byte of this sub-pattern is present at the cursor.
    None,
    /// The sub-pattern matched; the cursor advanced past it.
    Ok,
    /// The buffer ended while the sub-pattern was still plausibly
    /// matching; the cursor sits at end-of-buffer.
    Incomplete,
}

impl Skip {
    /// Returns `true` for [`Skip::Ok`].
    #[inline]
    pub fn matched(self) -> bool {
        matches!(self, Skip::Ok)
    }
}

// ─── Character classifiers ───────────────────────────────────────────

/// Space or horizontal tab. Newlines are message terminators in this
/// grammar, never whitespace.
#[inline]
pub(crate) fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Binary digit (`0` or `1`).
#[inline]
pub(crate) fn is_bin_digit(b: u8) -> bool {
    b == b'0' || b == b'1'
}

/// Octal digit (`0`-`7`).
#[inline]
pub(crate) fn is_oct_digit(b: u8) -> bool {
    (b'0'..=b'7').contains(&b)
}

/// Plus or minus sign.
#[inline]
pub(crate) fn is_sign(b: u8) -> bool {
    b == b'+' || b == b'-'
}

/// 256-byte lookup table for mnemonic continuation bytes.
/// `true` for a-z, A-Z, 0-9, and underscore.
/// Table lookup replaces the multi-range `matches!` with a single indexed read.
#[allow(
    clippy::cast_possible_truncation,
    reason = "loop counter i is 0..=255, always fits in u8"
)]
static IS_MNEMONIC_CONTINUE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0usize;
    while i < 256 {
        table[i] = matches!(
            i as u8,
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_'
        );
        i += 1;
    }
    table
};

/// Returns `true` if `b` may continue a program mnemonic.
#[inline]
pub(crate) fn is_mnemonic_continue(b: u8) -> bool {
    IS_MNEMONIC_CONTINUE_TABLE[b as usize]
}

// ─── Skip primitives ─────────────────────────────────────────────────

impl Cursor<'_> {
    /// Consume a run of spaces and tabs. Returns the count (0 means none).
    #[inline]
    pub fn skip_ws(&mut self) -> usize {
        self.eat_while(is_ws)
    }

    /// Consume a maximal run of decimal digits. Returns the count.
    #[inline]
    pub fn skip_digits(&mut self) -> usize {
        self.eat_while(|b| b.is_ascii_digit())
    }

    /// Consume a maximal run of hexadecimal digits. Returns the count.
    #[inline]
    pub fn skip_hex_digits(&mut self) -> usize {
        self.eat_while(|b| b.is_ascii_hexdigit())
    }

    /// Consume a maximal run of octal digits. Returns the count.
    #[inline]
    pub fn skip_oct_digits(&mut self) -> usize {
        self.eat_while(is_oct_digit)
    }

    /// Consume a maximal run of binary digits. Returns the count.
    #[inline]
    pub fn skip_bin_digits(&mut self) -> usize {
        self.eat_while(is_bin_digit)
    }

    /// Consume a maximal run of alphabetic bytes. Returns the count.
    #[inline]
    pub fn skip_letters(&mut self) -> usize {
        self.eat_while(|b| b.is_ascii_alphabetic())
    }

    /// Consume a single decimal digit if present.
    #[inline]
    pub fn skip_digit(&mut self) -> Skip {
        if !self.is_eos() && self.current().is_ascii_digit() {
            self.advance();
            Skip::Ok
        } else {
            Skip::None
        }
    }

    /// Consume a single `+` or `-` if present.
    #[inline]
    pub fn skip_sign(&mut self) -> Skip {
        if !self.is_eos() && is_sign(self.current()) {
            self.advance();
            Skip::Ok
        } else {
            Skip::None
        }
    }

    /// Consume exactly one occurrence of `byte` if present.
    #[inline]
    pub fn skip_byte(&mut self, byte: u8) -> Skip {
        if self.is_at(byte) {
            self.advance();
            Skip::Ok
        } else {
            Skip::None
        }
    }

    /// Consume a single `/` or `.` if present (suffix-data separators).
    #[inline]
    pub fn skip_slash_or_dot(&mut self) -> Skip {
        if self.is_at(b'/') || self.is_at(b'.') {
            self.advance();
            Skip::Ok
        } else {
            Skip::None
        }
    }

    /// Consume a program mnemonic: one alphabetic byte followed by a
    /// maximal run of alphanumeric-or-underscore bytes.
    ///
    /// Returns the outcome together with the number of bytes consumed:
    /// - `(Skip::Ok, n)` with `n > 0`: a mnemonic ending before a
    ///   non-mnemonic byte, so its extent is settled.
    /// - `(Skip::Incomplete, n)` with `n > 0`: the mnemonic ran into
    ///   end-of-buffer; more continuation bytes may still arrive, so the
    ///   caller cannot yet tell where it ends.
    /// - `(Skip::None, 0)`: no leading letter at the cursor (including
    ///   the cursor already being at end-of-buffer).
    pub fn skip_mnemonic(&mut self) -> (Skip, usize) {
        let start = self.pos();
        if !self.is_eos() && self.current().is_ascii_alphabetic() {
            self.advance();
            self.eat_while(is_mnemonic_continue);
        }
        let count = self.pos() - start;
        let status = if count == 0 {
            Skip::None
        } else if self.is_eos() {
            Skip::Incomplete
        } else {
            Skip::Ok
        };
        (status, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Classifiers ===

    #[test]
    fn ws_is_space_and_tab_only() {
        assert!(is_ws(b' '));
        assert!(is_ws(b'\t'));
        assert!(!is_ws(b'\n'));
        assert!(!is_ws(b'\r'));
        assert!(!is_ws(0));
    }

    #[test]
    fn bin_and_oct_digit_ranges() {
        assert!(is_bin_digit(b'0'));
        assert!(is_bin_digit(b'1'));
        assert!(!is_bin_digit(b'2'));

        assert!(is_oct_digit(b'0'));
        assert!(is_oct_digit(b'7'));
        assert!(!is_oct_digit(b'8'));
        assert!(!is_oct_digit(b'9'));
    }

    #[test]
    fn mnemonic_continue_table() {
        assert!(is_mnemonic_continue(b'a'));
        assert!(is_mnemonic_continue(b'Z'));
        assert!(is_mnemonic_continue(b'0'));
        assert!(is_mnemonic_continue(b'_'));
        assert!(!is_mnemonic_continue(b'-'));
        assert!(!is_mnemonic_continue(b':'));
        assert!(!is_mnemonic_continue(0));
        assert!(!is_mnemonic_continue(0xFF));
    }

    // === Counting primitives ===

    #[test]
    fn skip_ws_counts_run() {
        let mut c = Cursor::new(b"  \tx");
        assert_eq!(c.skip_ws(), 3);
        assert_eq!(c.current(), b'x');
        assert_eq!(c.skip_ws(), 0);
    }

    #[test]
    fn skip_ws_counts_mixed_tab_space_run() {
        let mut c = Cursor::new(b" \t \tX");
        assert_eq!(c.skip_ws(), 4);
        assert_eq!(c.current(), b'X');
    }

    #[test]
    fn skip_digits_counts_run() {
        let mut c = Cursor::new(b"1234x");
        assert_eq!(c.skip_digits(), 4);
        assert_eq!(c.current(), b'x');
    }

    #[test]
    fn skip_hex_digits_accepts_both_cases() {
        let mut c = Cursor::new(b"2aF!");
        assert_eq!(c.skip_hex_digits(), 3);
        assert_eq!(c.current(), b'!');
    }

    #[test]
    fn skip_oct_digits_stops_at_eight() {
        let mut c = Cursor::new(b"0178");
        assert_eq!(c.skip_oct_digits(), 3);
        assert_eq!(c.current(), b'8');
    }

    #[test]
    fn skip_bin_digits_stops_at_two() {
        let mut c = Cursor::new(b"01102");
        assert_eq!(c.skip_bin_digits(), 4);
        assert_eq!(c.current(), b'2');
    }

    #[test]
    fn skip_letters_counts_run() {
        let mut c = Cursor::new(b"MOHM3");
        assert_eq!(c.skip_letters(), 4);
        assert_eq!(c.current(), b'3');
    }

    // === Single-byte primitives ===

    #[test]
    fn skip_sign_consumes_plus_or_minus() {
        let mut c = Cursor::new(b"+1");
        assert_eq!(c.skip_sign(), Skip::Ok);
        assert_eq!(c.pos(), 1);

        let mut c = Cursor::new(b"-1");
        assert_eq!(c.skip_sign(), Skip::Ok);

        let mut c = Cursor::new(b"1");
        assert_eq!(c.skip_sign(), Skip::None);
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn skip_byte_exact_match_only() {
        let mut c = Cursor::new(b"*RST");
        assert_eq!(c.skip_byte(b'*'), Skip::Ok);
        assert_eq!(c.skip_byte(b'*'), Skip::None);
        assert_eq!(c.pos(), 1);
    }

    #[test]
    fn skip_byte_at_end_is_none() {
        let mut c = Cursor::new(b"");
        assert_eq!(c.skip_byte(b'x'), Skip::None);
    }

    #[test]
    fn skip_digit_consumes_one() {
        let mut c = Cursor::new(b"42");
        assert_eq!(c.skip_digit(), Skip::Ok);
        assert_eq!(c.pos(), 1);

        let mut c = Cursor::new(b"x");
        assert_eq!(c.skip_digit(), Skip::None);
    }

    #[test]
    fn skip_slash_or_dot_consumes_either() {
        let mut c = Cursor::new(b"/.");
        assert_eq!(c.skip_slash_or_dot(), Skip::Ok);
        assert_eq!(c.skip_slash_or_dot(), Skip::Ok);
        assert_eq!(c.skip_slash_or_dot(), Skip::None);
    }

    // === skip_mnemonic ===

    #[test]
    fn mnemonic_settled_before_non_mnemonic_byte() {
        let mut c = Cursor::new(b"SYST:");
        assert_eq!(c.skip_mnemonic(), (Skip::Ok, 4));
        assert_eq!(c.current(), b':');
    }

    #[test]
    fn mnemonic_running_into_end_is_incomplete() {
        let mut c = Cursor::new(b"SYST");
        assert_eq!(c.skip_mnemonic(), (Skip::Incomplete, 4));
        assert!(c.is_eos());
    }

    #[test]
    fn mnemonic_requires_leading_letter() {
        let mut c = Cursor::new(b"1ABC");
        assert_eq!(c.skip_mnemonic(), (Skip::None, 0));
        assert_eq!(c.pos(), 0);

        let mut c = Cursor::new(b"_ABC");
        assert_eq!(c.skip_mnemonic(), (Skip::None, 0));
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn mnemonic_at_end_of_buffer_is_none() {
        let mut c = Cursor::new(b"");
        assert_eq!(c.skip_mnemonic(), (Skip::None, 0));
    }

    #[test]
    fn mnemonic_continuation_bytes() {
        let mut c = Cursor::new(b"CHAN2_A?");
        assert_eq!(c.skip_mnemonic(), (Skip::Ok, 7));
        assert_eq!(c.current(), b'?');
    }

    // === Property tests ===

    mod proptest_skip {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn skip_digits_matches_reference(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
                let expected = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
                let mut c = Cursor::new(&bytes);
                prop_assert_eq!(c.skip_digits(), expected);
                prop_assert_eq!(c.pos(), expected);
            }

            #[test]
            fn skip_ws_matches_reference(bytes in proptest::collection::vec(
                prop_oneof![Just(b' '), Just(b'\t'), Just(b'x'), Just(b'\n')],
                0..128,
            )) {
                let expected = bytes.iter().take_while(|&&b| b == b' ' || b == b'\t').count();
                let mut c = Cursor::new(&bytes);
                prop_assert_eq!(c.skip_ws(), expected);
            }

            #[test]
            fn skip_mnemonic_outcome_agrees_with_count(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
                let mut c = Cursor::new(&bytes);
                let (status, count) = c.skip_mnemonic();
                match status {
                    Skip::None => {
                        prop_assert_eq!(count, 0);
                        prop_assert_eq!(c.pos(), 0);
                    }
                    Skip::Ok => {
                        prop_assert!(count > 0);
                        prop_assert!(!c.is_eos());
                    }
                    Skip::Incomplete => {
                        prop_assert!(count > 0);
                        prop_assert!(c.is_eos());
                    }
                }
            }
        }
    }
}
