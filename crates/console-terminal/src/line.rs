//! Fixed-capacity line buffer edited one keystroke at a time.

use console_types::keys::{ENTER, SPACE};

/// The line being edited.
///
/// Invariant: `cursor <= capacity` and every slot at or after the cursor is
/// zero. The cursor is always at the end of the text; there is no mid-line
/// editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    slots: Vec<u8>,
    cursor: usize,
}

impl LineBuffer {
    /// An empty line holding up to `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0; capacity],
            cursor: 0,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Insertion point; every slot at or past it is zero.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the cursor has reached the last slot.
    pub fn is_full(&self) -> bool {
        self.cursor == self.slots.len()
    }

    /// Clear every slot and move the cursor home.
    pub fn reset(&mut self) {
        self.slots.fill(0);
        self.cursor = 0;
    }

    /// Store a byte at the cursor. Returns `false` when the buffer is full.
    pub fn insert(&mut self, code: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots[self.cursor] = code;
        self.cursor += 1;
        true
    }

    /// Erase the byte before the cursor. Returns `false` on an empty line.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.slots[self.cursor] = 0;
        true
    }

    /// The text up to the first NUL or carriage return.
    pub fn text(&self) -> String {
        let end = self
            .slots
            .iter()
            .position(|&b| b == 0 || b == ENTER)
            .unwrap_or(self.slots.len());
        String::from_utf8_lossy(&self.slots[..end]).into_owned()
    }

    /// Terminal bytes that redraw the line after `prompt`.
    pub fn render(&self, prompt: &str, newline: bool) -> String {
        let mut s = format!("\r{prompt}{}", self.text());
        if newline {
            s.push_str("\r\n");
        }
        s
    }

    /// True when the byte before the cursor is a space, i.e. the last word
    /// has been finished.
    pub fn completed_word_boundary(&self) -> bool {
        self.cursor > 0 && self.slots[self.cursor - 1] == SPACE
    }

    fn word_start(&self, end: usize) -> usize {
        self.slots[..end]
            .iter()
            .rposition(|&b| b == SPACE)
            .map_or(0, |i| i + 1)
    }

    /// The word ending at the cursor, ignoring one trailing space.
    pub fn last_word(&self) -> String {
        let end = if self.completed_word_boundary() {
            self.cursor - 1
        } else {
            self.cursor
        };
        let start = self.word_start(end);
        String::from_utf8_lossy(&self.slots[start..end]).into_owned()
    }

    /// Overwrite the word under the cursor with `word` followed by a single
    /// space, leaving the cursor after the space.
    ///
    /// Returns `false` without touching the buffer when the result would not
    /// fit.
    pub fn replace_last_word(&mut self, word: &str) -> bool {
        let start = self.word_start(self.cursor);
        let end = start + word.len() + 1;
        if end > self.slots.len() {
            return false;
        }
        self.slots[start..end - 1].copy_from_slice(word.as_bytes());
        self.slots[end - 1] = SPACE;
        self.slots[end..].fill(0);
        self.cursor = end;
        true
    }
}
