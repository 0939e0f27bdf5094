//! Incremental tokenizer for SCPI (IEEE 488.2) instrument-control
//! command languages.
//!
//! The lexer scans a caller-owned byte buffer and, for each token kind
//! the grammar can expect at a given point, answers one of three things:
//! the token is here ([`Lexed::Match`]), it is not here
//! ([`Lexed::NoMatch`], cursor untouched), or the buffer ended before
//! the question could be settled ([`Lexed::Incomplete`]). The third
//! answer is what makes the lexer usable directly on a transport
//! receive buffer that fills up in fragments.
//!
//! Tokens are zero-copy: a [`Token`] borrows its byte range from the
//! scanned buffer and records the range's offset.
//!
//! # Example
//!
//! ```
//! use scpi_lexer_core::{Lexer, TokenTag};
//!
//! let mut lexer = Lexer::new(b"*IDN?");
//! let token = lexer.program_header().token().expect("a common query header");
//! assert_eq!(token.tag, TokenTag::CommonQueryHeader);
//! assert_eq!(token.bytes, b"*IDN?");
//! assert!(lexer.is_eos());
//! ```
//!
//! # Streaming
//!
//! On [`Lexed::Incomplete`] the cursor parks at end-of-buffer. The
//! caller keeps the offset where the attempt began, appends the bytes
//! that arrive next, and retries from that offset with
//! [`Lexer::resume`]:
//!
//! ```
//! use scpi_lexer_core::{Lexed, Lexer};
//!
//! let mut lexer = Lexer::new(b"#15HEL");
//! let start = lexer.pos();
//! assert_eq!(lexer.arbitrary_block_data(), Lexed::Incomplete);
//!
//! // Two more bytes arrive on the link.
//! let mut lexer = Lexer::resume(b"#15HELLO", start);
//! let token = lexer.arbitrary_block_data().token().expect("a complete block");
//! assert_eq!(token.bytes, b"HELLO");
//! ```

mod cursor;
mod lexer;
mod skip;
mod tag;

pub use cursor::Cursor;
pub use lexer::{Lexed, Lexer};
pub use skip::Skip;
pub use tag::{Token, TokenTag};
