//! Token tags and the zero-copy token descriptor.

/// Kind of a lexed token, grouped into semantic discriminant ranges:
///
/// - Program headers: 0-15
/// - Program data: 16-47
/// - Separators & terminators: 64-79
/// - Trivia: 112
/// - Control: 255
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenTag {
    // ─── Program headers ─────────────────────────────────────────────
    /// Instrument-level header: `*` + mnemonic (`*RST`).
    CommonHeader = 0,
    /// Common header with trailing `?` (`*IDN?`).
    CommonQueryHeader = 1,
    /// Hierarchical header: colon-separated mnemonics (`:SYST:ERR`).
    CompoundHeader = 2,
    /// Compound header with trailing `?` (`:SYST:ERR?`).
    CompoundQueryHeader = 3,
    /// `*` consumed but no mnemonic followed before a non-mnemonic byte
    /// or end-of-buffer.
    IncompleteCommonHeader = 4,
    /// A `:` was consumed but the mnemonic it promises is missing.
    IncompleteCompoundHeader = 5,
    /// Bare mnemonic used as character program data (`MAXimum`).
    ProgramMnemonic = 6,

    // ─── Program data ────────────────────────────────────────────────
    /// Mantissa with optional exponent (`1.5E-3`).
    DecimalNumericData = 16,
    /// Unit suffix attached to a numeric value (`MOHM`, `/S`).
    SuffixData = 17,
    /// Digit run of a `#H` hexadecimal literal (prefix stripped).
    HexNumericData = 18,
    /// Digit run of a `#Q` octal literal (prefix stripped).
    OctNumericData = 19,
    /// Digit run of a `#B` binary literal (prefix stripped).
    BinNumericData = 20,
    /// Double-quoted string, outer quotes included in the span.
    DoubleQuoteData = 21,
    /// Single-quoted string, outer quotes included in the span.
    SingleQuoteData = 22,
    /// Payload of a length-prefixed binary block (header stripped).
    ArbitraryBlockData = 23,
    /// Parenthesized expression, parentheses included in the span.
    ExpressionData = 24,

    // ─── Separators & terminators ────────────────────────────────────
    /// `,` between program data items.
    Comma = 64,
    /// `;` between message units.
    Semicolon = 65,
    /// `:` header-path separator.
    Colon = 66,
    /// A caller-specified single byte.
    SpecificCharacter = 67,
    /// `\r`, `\n`, or `\r\n`.
    Newline = 68,

    // ─── Trivia ──────────────────────────────────────────────────────
    /// Run of spaces and tabs.
    Whitespace = 112,

    // ─── Control ─────────────────────────────────────────────────────
    /// Placeholder for a token slot that has not been classified yet.
    /// Detectors never produce it; a failed detection is
    /// [`Lexed::NoMatch`](crate::Lexed::NoMatch).
    Unknown = 255,
}

impl TokenTag {
    /// Human-readable label for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TokenTag::CommonHeader => "common program header",
            TokenTag::CommonQueryHeader => "common query program header",
            TokenTag::CompoundHeader => "compound program header",
            TokenTag::CompoundQueryHeader => "compound query program header",
            TokenTag::IncompleteCommonHeader => "incomplete common program header",
            TokenTag::IncompleteCompoundHeader => "incomplete compound program header",
            TokenTag::ProgramMnemonic => "program mnemonic",
            TokenTag::DecimalNumericData => "decimal numeric program data",
            TokenTag::SuffixData => "suffix program data",
            TokenTag::HexNumericData => "hexadecimal numeric program data",
            TokenTag::OctNumericData => "octal numeric program data",
            TokenTag::BinNumericData => "binary numeric program data",
            TokenTag::DoubleQuoteData => "double-quoted string program data",
            TokenTag::SingleQuoteData => "single-quoted string program data",
            TokenTag::ArbitraryBlockData => "arbitrary block program data",
            TokenTag::ExpressionData => "expression program data",
            TokenTag::Comma => "`,`",
            TokenTag::Semicolon => "`;`",
            TokenTag::Colon => "`:`",
            TokenTag::SpecificCharacter => "specific character",
            TokenTag::Newline => "newline",
            TokenTag::Whitespace => "whitespace",
            TokenTag::Unknown => "unknown",
        }
    }

    /// Returns `true` for program header kinds, including the incomplete
    /// variants.
    pub fn is_header(self) -> bool {
        (self as u8) < 16
    }

    /// Returns `true` for program data kinds (numeric, string, block,
    /// expression, suffix).
    pub fn is_program_data(self) -> bool {
        (16..48).contains(&(self as u8))
    }
}

/// Size assertion: the tag is a single byte.
const _: () = assert!(std::mem::size_of::<TokenTag>() == 1);

/// A lexed token: a kind tag plus a borrowed view into the scanned buffer.
///
/// The token never outlives the buffer it references and carries no
/// storage of its own. `offset` is the byte position of `bytes` within
/// the buffer; for prefix-stripped kinds (non-decimal numerics, arbitrary
/// blocks) it points at the payload, not at the first consumed byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token kind.
    pub tag: TokenTag,
    /// Byte offset of `bytes` within the scanned buffer.
    pub offset: usize,
    /// The token's bytes, borrowed from the scanned buffer.
    pub bytes: &'a [u8],
}

impl<'a> Token<'a> {
    /// Length of the token's byte range.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the byte range is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte offset one past the end of the token's range.
    pub fn end(&self) -> usize {
        self.offset + self.bytes.len()
    }

    /// Checked UTF-8 view of the token bytes.
    ///
    /// Textual token kinds are always 7-bit ASCII and convert cleanly;
    /// arbitrary block payloads may not.
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Discriminants ===

    #[test]
    fn repr_u8_semantic_ranges() {
        // Program headers: 0-15
        assert_eq!(TokenTag::CommonHeader as u8, 0);
        assert_eq!(TokenTag::CommonQueryHeader as u8, 1);
        assert_eq!(TokenTag::CompoundHeader as u8, 2);
        assert_eq!(TokenTag::CompoundQueryHeader as u8, 3);
        assert_eq!(TokenTag::IncompleteCommonHeader as u8, 4);
        assert_eq!(TokenTag::IncompleteCompoundHeader as u8, 5);
        assert_eq!(TokenTag::ProgramMnemonic as u8, 6);

        // Program data: 16-47
        assert_eq!(TokenTag::DecimalNumericData as u8, 16);
        assert_eq!(TokenTag::ExpressionData as u8, 24);

        // Separators & terminators: 64-79
        assert_eq!(TokenTag::Comma as u8, 64);
        assert_eq!(TokenTag::Newline as u8, 68);

        // Trivia: 112
        assert_eq!(TokenTag::Whitespace as u8, 112);

        // Control: 255
        assert_eq!(TokenTag::Unknown as u8, 255);
    }

    #[test]
    fn tag_is_one_byte() {
        assert_eq!(std::mem::size_of::<TokenTag>(), 1);
    }

    // === Grouping predicates ===

    #[test]
    fn header_classification() {
        assert!(TokenTag::CommonHeader.is_header());
        assert!(TokenTag::CompoundQueryHeader.is_header());
        assert!(TokenTag::IncompleteCommonHeader.is_header());
        assert!(TokenTag::ProgramMnemonic.is_header());
        assert!(!TokenTag::DecimalNumericData.is_header());
        assert!(!TokenTag::Comma.is_header());
        assert!(!TokenTag::Unknown.is_header());
    }

    #[test]
    fn program_data_classification() {
        assert!(TokenTag::DecimalNumericData.is_program_data());
        assert!(TokenTag::ArbitraryBlockData.is_program_data());
        assert!(TokenTag::SuffixData.is_program_data());
        assert!(!TokenTag::CommonHeader.is_program_data());
        assert!(!TokenTag::Whitespace.is_program_data());
        assert!(!TokenTag::Unknown.is_program_data());
    }

    // === Name ===

    #[test]
    fn name_returns_readable_description() {
        assert_eq!(TokenTag::CommonQueryHeader.name(), "common query program header");
        assert_eq!(TokenTag::ArbitraryBlockData.name(), "arbitrary block program data");
        assert_eq!(TokenTag::Comma.name(), "`,`");
        assert_eq!(TokenTag::Unknown.name(), "unknown");
    }

    // === Token ===

    #[test]
    fn token_is_a_borrowed_view() {
        let buf = b"*IDN?";
        let tok = Token {
            tag: TokenTag::CommonQueryHeader,
            offset: 0,
            bytes: &buf[..],
        };
        assert_eq!(tok.len(), 5);
        assert!(!tok.is_empty());
        assert_eq!(tok.end(), 5);
        assert_eq!(tok.as_str(), Some("*IDN?"));
    }

    #[test]
    fn token_as_str_rejects_non_utf8_payload() {
        let payload = [0xFF, 0xFE, 0x00];
        let tok = Token {
            tag: TokenTag::ArbitraryBlockData,
            offset: 3,
            bytes: &payload,
        };
        assert_eq!(tok.as_str(), None);
        assert_eq!(tok.len(), 3);
    }

    #[test]
    fn token_is_copy() {
        let tok = Token {
            tag: TokenTag::Comma,
            offset: 7,
            bytes: b",".as_slice(),
        };
        let tok2 = tok;
        assert_eq!(tok, tok2);
    }
}
