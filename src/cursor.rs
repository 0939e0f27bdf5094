//! Bounds-checked cursor over a caller-owned byte buffer.
//!
//! The cursor advances through the buffer byte-by-byte. End-of-buffer is
//! detected by comparing the position against the buffer length -- there is
//! no sentinel termination, because the buffer belongs to the transport
//! layer and arbitrary-block payloads may legally contain any byte value,
//! including `0x00`.
//!
//! # Backtracking
//!
//! The cursor is [`Copy`]. A detector snapshots the cursor before a
//! speculative attempt and assigns the snapshot back to roll the attempt
//! out. All rollback in this crate goes through snapshots; the position
//! never moves backward any other way.
//!
//! # Streaming
//!
//! The position is an offset, not a pointer, so a caller can extend the
//! buffer (more bytes arrived on the link) and rebuild a cursor at a
//! previously observed offset to retry an incomplete token.

/// Bounds-checked, copyable cursor over a borrowed byte buffer.
///
/// Created via [`Cursor::new`] (offset 0) or [`Cursor::at`] (resume at a
/// saved offset).
///
/// # Invariant
///
/// `pos <= buf.len()` at all times. `pos == buf.len()` is the
/// end-of-buffer state.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    /// Caller-owned input buffer. Never mutated, never copied.
    buf: &'a [u8],
    /// Current read position (byte index into `buf`).
    pos: usize,
}

/// Size assertion: Cursor should be <= 24 bytes on 64-bit platforms.
/// &[u8] = 16 (fat pointer), usize = 8 => 24 bytes.
const _: () = assert!(std::mem::size_of::<Cursor<'static>>() <= 24);

impl<'a> Cursor<'a> {
    /// Create a cursor at position 0.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Create a cursor at a previously observed offset.
    ///
    /// # Contract
    ///
    /// `pos <= buf.len()`. Used to resume scanning after the caller has
    /// appended bytes to its buffer.
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        debug_assert!(pos <= buf.len(), "cursor offset {pos} exceeds buffer length");
        Self {
            buf,
            pos: pos.min(buf.len()),
        }
    }

    /// Returns the byte at the current position, or `0x00` at end-of-buffer.
    ///
    /// `0x00` is a legal buffer byte, so callers pair this with
    /// [`is_eos()`](Self::is_eos) exactly where the distinction matters.
    #[inline]
    pub fn current(&self) -> u8 {
        self.buf.get(self.pos).copied().unwrap_or(0)
    }

    /// Returns the byte one position ahead of current, or `0x00` past the end.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.buf.get(self.pos + 1).copied().unwrap_or(0)
    }

    /// Returns `true` if the cursor has consumed the whole buffer.
    #[inline]
    pub fn is_eos(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Returns `true` if the current byte exists and equals `byte`.
    #[inline]
    pub fn is_at(&self, byte: u8) -> bool {
        !self.is_eos() && self.buf[self.pos] == byte
    }

    /// Advance the cursor by one byte.
    #[inline]
    pub fn advance(&mut self) {
        debug_assert!(self.pos < self.buf.len(), "advance past end of buffer");
        self.pos += 1;
    }

    /// Advance the cursor by `n` bytes.
    #[inline]
    pub fn advance_n(&mut self, n: usize) {
        debug_assert!(self.pos + n <= self.buf.len(), "advance past end of buffer");
        self.pos += n;
    }

    /// Move the cursor to end-of-buffer.
    ///
    /// Used by detectors reporting an incomplete token: the whole buffer
    /// is treated as consumed so the caller can see "need more input" by
    /// comparing [`pos()`](Self::pos) against the buffer length.
    #[inline]
    pub fn seek_to_end(&mut self) {
        self.pos = self.buf.len();
    }

    /// Current byte offset into the buffer.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Length of the underlying buffer.
    #[inline]
    pub fn buffer_len(&self) -> usize {
        self.buf.len()
    }

    /// Number of bytes between the current position and end-of-buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Extract a sub-slice of the buffer.
    ///
    /// # Contract
    ///
    /// `start <= end <= buf.len()`. Guaranteed when both offsets come from
    /// the detectors' token boundary tracking.
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        debug_assert!(start <= end, "slice start {start} exceeds end {end}");
        &self.buf[start..end]
    }

    /// Extract the bytes from `start` to the current position.
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        self.slice(start, self.pos)
    }

    /// The unscanned remainder of the buffer.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Advance while `pred` returns `true` for the current byte.
    /// Returns the number of bytes consumed.
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while self.pos < self.buf.len() && pred(self.buf[self.pos]) {
            self.pos += 1;
        }
        self.pos - start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Basic Navigation ===

    #[test]
    fn current_returns_first_byte() {
        let cursor = Cursor::new(b"abc");
        assert_eq!(cursor.current(), b'a');
    }

    #[test]
    fn advance_moves_forward() {
        let mut cursor = Cursor::new(b"abc");
        cursor.advance();
        assert_eq!(cursor.current(), b'b');
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn advance_n_moves_multiple() {
        let mut cursor = Cursor::new(b"abcdef");
        cursor.advance_n(3);
        assert_eq!(cursor.current(), b'd');
        assert_eq!(cursor.pos(), 3);
    }

    #[test]
    fn advance_through_entire_buffer() {
        let mut cursor = Cursor::new(b"hi");
        assert_eq!(cursor.current(), b'h');
        cursor.advance();
        assert_eq!(cursor.current(), b'i');
        cursor.advance();
        assert!(cursor.is_eos());
    }

    #[test]
    fn at_resumes_from_offset() {
        let cursor = Cursor::at(b"abcdef", 4);
        assert_eq!(cursor.pos(), 4);
        assert_eq!(cursor.current(), b'e');
    }

    // === End-of-buffer ===

    #[test]
    fn is_eos_on_empty_buffer() {
        let cursor = Cursor::new(b"");
        assert!(cursor.is_eos());
        assert_eq!(cursor.current(), 0);
    }

    #[test]
    fn current_at_end_returns_zero() {
        let mut cursor = Cursor::new(b"x");
        cursor.advance();
        assert!(cursor.is_eos());
        assert_eq!(cursor.current(), 0);
    }

    #[test]
    fn interior_null_is_not_eos() {
        let mut cursor = Cursor::new(b"a\0b");
        cursor.advance();
        assert_eq!(cursor.current(), 0);
        assert!(!cursor.is_eos());
        cursor.advance();
        assert_eq!(cursor.current(), b'b');
    }

    #[test]
    fn peek_returns_next_byte() {
        let cursor = Cursor::new(b"abc");
        assert_eq!(cursor.peek(), b'b');
    }

    #[test]
    fn peek_near_end_returns_zero() {
        let mut cursor = Cursor::new(b"ab");
        cursor.advance();
        assert_eq!(cursor.peek(), 0);
    }

    #[test]
    fn is_at_checks_current_byte() {
        let mut cursor = Cursor::new(b"x");
        assert!(cursor.is_at(b'x'));
        assert!(!cursor.is_at(b'y'));
        cursor.advance();
        assert!(!cursor.is_at(b'x'));
        assert!(!cursor.is_at(0));
    }

    // === Slice ===

    #[test]
    fn slice_extracts_byte_range() {
        let cursor = Cursor::new(b"hello world");
        assert_eq!(cursor.slice(0, 5), b"hello");
        assert_eq!(cursor.slice(6, 11), b"world");
    }

    #[test]
    fn slice_from_extracts_to_current() {
        let mut cursor = Cursor::new(b"abcdef");
        cursor.advance_n(3);
        assert_eq!(cursor.slice_from(0), b"abc");
        assert_eq!(cursor.slice_from(1), b"bc");
    }

    #[test]
    fn slice_empty_range() {
        let cursor = Cursor::new(b"hello");
        assert_eq!(cursor.slice(2, 2), b"");
    }

    #[test]
    fn rest_and_remaining() {
        let mut cursor = Cursor::new(b"abcdef");
        cursor.advance_n(2);
        assert_eq!(cursor.rest(), b"cdef");
        assert_eq!(cursor.remaining(), 4);
        assert_eq!(cursor.buffer_len(), 6);
    }

    // === eat_while ===

    #[test]
    fn eat_while_consumes_matching_bytes() {
        let mut cursor = Cursor::new(b"aaabbb");
        let n = cursor.eat_while(|b| b == b'a');
        assert_eq!(n, 3);
        assert_eq!(cursor.current(), b'b');
    }

    #[test]
    fn eat_while_stops_at_end() {
        let mut cursor = Cursor::new(b"aaa");
        let n = cursor.eat_while(|b| b == b'a');
        assert_eq!(n, 3);
        assert!(cursor.is_eos());
    }

    #[test]
    fn eat_while_no_match() {
        let mut cursor = Cursor::new(b"hello");
        let n = cursor.eat_while(|b| b == b'z');
        assert_eq!(n, 0);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn eat_while_always_true_pred_is_bounded() {
        let mut cursor = Cursor::new(b"abc");
        let n = cursor.eat_while(|_| true);
        assert_eq!(n, 3);
        assert!(cursor.is_eos());
    }

    // === Copy Semantics ===

    #[test]
    fn cursor_is_copy_for_checkpointing() {
        let mut cursor = Cursor::new(b"abcdef");
        cursor.advance_n(2);

        // Snapshot via Copy
        let saved = cursor;

        // Advance original
        cursor.advance_n(3);
        assert_eq!(cursor.pos(), 5);

        // Restore
        cursor = saved;
        assert_eq!(cursor.pos(), 2);
        assert_eq!(cursor.current(), b'c');
    }

    #[test]
    fn seek_to_end_parks_cursor() {
        let mut cursor = Cursor::new(b"abc");
        cursor.seek_to_end();
        assert!(cursor.is_eos());
        assert_eq!(cursor.pos(), 3);
    }
}
