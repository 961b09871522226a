//! Keystroke decoding for the raw byte protocol.
//!
//! The main loop never interprets terminal bytes itself. Every byte read in
//! raw mode goes through [`Key::from_byte`] first.

/// ASCII backspace.
pub const BACKSPACE: u8 = 0x08;
/// Horizontal tab, used as the completion key.
pub const TAB: u8 = 0x09;
/// Carriage return, submits the line.
pub const ENTER: u8 = 0x0D;
/// ASCII delete, treated the same as backspace.
pub const DELETE: u8 = 0x7F;
/// Audible alert.
pub const BELL: u8 = 0x07;
/// ASCII space, the only word separator.
pub const SPACE: u8 = 0x20;

/// A decoded keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Backspace (0x08) or Delete (0x7F).
    Erase,
    /// Tab (0x09): request completion.
    Complete,
    /// Enter (0x0D): submit the line.
    Submit,
    /// Any other byte, inserted literally.
    Literal(u8),
}

impl Key {
    /// Decode a raw terminal byte.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            BACKSPACE | DELETE => Self::Erase,
            TAB => Self::Complete,
            ENTER => Self::Submit,
            other => Self::Literal(other),
        }
    }

    /// Whether the key is accepted once the line buffer is full.
    pub fn allowed_when_full(self) -> bool {
        matches!(self, Self::Erase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erase_keys() {
        assert_eq!(Key::from_byte(0x08), Key::Erase);
        assert_eq!(Key::from_byte(0x7F), Key::Erase);
    }

    #[test]
    fn control_keys() {
        assert_eq!(Key::from_byte(0x09), Key::Complete);
        assert_eq!(Key::from_byte(0x0D), Key::Submit);
    }

    #[test]
    fn newline_is_literal() {
        // Only carriage return submits; a bare line feed is ordinary input.
        assert_eq!(Key::from_byte(b'\n'), Key::Literal(b'\n'));
    }

    #[test]
    fn printable_is_literal() {
        assert_eq!(Key::from_byte(b'a'), Key::Literal(b'a'));
        assert_eq!(Key::from_byte(b' '), Key::Literal(b' '));
    }

    #[test]
    fn only_erase_allowed_when_full() {
        assert!(Key::Erase.allowed_when_full());
        assert!(!Key::Submit.allowed_when_full());
        assert!(!Key::Complete.allowed_when_full());
        assert!(!Key::Literal(b'x').allowed_when_full());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn non_control_bytes_are_literal(b in any::<u8>()) {
                prop_assume!(![BACKSPACE, DELETE, TAB, ENTER].contains(&b));
                prop_assert_eq!(Key::from_byte(b), Key::Literal(b));
            }
        }
    }
}
