//! Input cursor
//!
//! A [`Cursor`] is an immutable text plus a mutable position. It is the only
//! state threaded through the combinators. Backtracking saves the position
//! and later restores it; the text is never copied.
//!
//! Positions and lengths are byte offsets. `read` rounds its end down to a
//! char boundary so it never splits a UTF-8 sequence.

use crate::error::Failure;
use crate::location::{ceil_char_boundary, floor_char_boundary};

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    position: usize,
    /// Furthest position at which any failure was raised.
    furthest: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            position: 0,
            furthest: 0,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Up to `n` bytes from the current position, without consuming them.
    pub fn read(&self, n: usize) -> &'a str {
        let end = floor_char_boundary(self.text, self.position.saturating_add(n));
        &self.text[self.position..end]
    }

    /// Everything from the current position on.
    pub fn read_to_end(&self) -> &'a str {
        &self.text[self.position..]
    }

    /// Move forward by `n` bytes, never past the end. A position inside a
    /// multi-byte character is rounded up to the end of that character.
    pub fn advance(&mut self, n: usize) -> &mut Self {
        self.position = ceil_char_boundary(self.text, self.position.saturating_add(n));
        self
    }

    pub fn is_at_end(&self) -> bool {
        self.position == self.text.len()
    }

    /// Bytes left to consume.
    pub fn remaining(&self) -> usize {
        self.text.len() - self.position
    }

    /// Build a failure at the current position and remember how far the
    /// parse got.
    pub fn fail(&mut self) -> Failure {
        self.furthest = self.furthest.max(self.position);
        Failure::at(self.position)
    }

    /// Furthest position at which a failure was raised so far.
    pub fn furthest(&self) -> usize {
        self.furthest
    }

    /// Reset the furthest failure to a previously observed value, for
    /// failures that happened off the parse path.
    pub(crate) fn restore_furthest(&mut self, furthest: usize) {
        self.furthest = furthest;
    }

    /// Reset the position to a previously observed value. Only the
    /// backtracking combinators rewind the cursor.
    pub(crate) fn restore(&mut self, position: usize) {
        debug_assert!(position <= self.text.len());
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_input() {
        let text = "Hello my name is bob";
        let mut cursor = Cursor::new(text);

        assert_eq!(cursor.read_to_end(), text);

        cursor.advance(5);
        assert_eq!(cursor.read_to_end(), " my name is bob");
        assert_eq!(cursor.read(1), " ");
        assert_eq!(cursor.read(5), " my n");
        assert_eq!(cursor.read(20000), " my name is bob");
    }

    #[test]
    fn test_read_does_not_consume() {
        let cursor = Cursor::new("abc");
        assert_eq!(cursor.read(2), "ab");
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut cursor = Cursor::new("abc");
        cursor.advance(10);
        assert_eq!(cursor.position(), 3);
        assert!(cursor.is_at_end());
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.read(1), "");
    }

    #[test]
    fn test_read_keeps_char_boundaries() {
        let cursor = Cursor::new("éa");
        assert_eq!(cursor.read(1), "");
        assert_eq!(cursor.read(2), "é");
    }

    #[test]
    fn test_advance_never_splits_a_character() {
        let mut cursor = Cursor::new("éa");
        cursor.advance(1);
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.read_to_end(), "a");
        assert_eq!(cursor.read(1), "a");
    }

    #[test]
    fn test_restore_and_furthest() {
        let mut cursor = Cursor::new("abcdef");
        cursor.advance(4);
        let failure = cursor.fail();
        assert_eq!(failure.position, 4);

        cursor.restore(1);
        assert_eq!(cursor.position(), 1);
        cursor.fail();
        assert_eq!(cursor.furthest(), 4);
    }
}
