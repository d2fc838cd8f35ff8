//! Character to HID keycode translation for the US layout.
//!
//! Each table maps a keycode (the index) to the character it types. A character is looked up in the
//! unshifted table first and in the shifted table second, so when a character appears in both, the
//! unshifted keycode wins.

use crate::hid_state::HidModifiers;

/// Filler for keycodes that don't type a character. Never mappable itself.
pub const CHAR_ILLEGAL: u8 = 0xff;
pub const CHAR_RETURN: u8 = b'\n';
pub const CHAR_ESCAPE: u8 = 0x1b;
pub const CHAR_TAB: u8 = b'\t';
pub const CHAR_BACKSPACE: u8 = 0x7f;

const X: u8 = CHAR_ILLEGAL;

/// US layout, no modifier
#[rustfmt::skip]
pub const KEYTABLE_US_NONE: [u8; 101] = [
    X, X, X, X,                                                         /*   0-3  */
    b'a', b'b', b'c', b'd', b'e', b'f', b'g', b'h', b'i', b'j',         /*  4-13  */
    b'k', b'l', b'm', b'n', b'o', b'p', b'q', b'r', b's', b't',         /* 14-23  */
    b'u', b'v', b'w', b'x', b'y', b'z',                                 /* 24-29  */
    b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'0',         /* 30-39  */
    CHAR_RETURN, CHAR_ESCAPE, CHAR_BACKSPACE, CHAR_TAB, b' ',           /* 40-44  */
    b'-', b'=', b'[', b']', b'\\', X, b';', b'\'', b'`', b',',          /* 45-54  */
    b'.', b'/', X, X, X, X,                                             /* 55-60  */
    X, X, X, X, X, X, X, X,                                             /* 61-68  */
    X, X, X, X, X, X, X, X,                                             /* 69-76  */
    X, X, X, X, X, X, X, X,                                             /* 77-84  */
    b'*', b'-', b'+', b'\n', b'1', b'2', b'3', b'4', b'5',              /* 85-93  */
    b'6', b'7', b'8', b'9', b'0', b'.', 0xa7,                           /* 94-100 */
];

/// US layout, shift held
#[rustfmt::skip]
pub const KEYTABLE_US_SHIFT: [u8; 101] = [
    X, X, X, X,                                                         /*   0-3  */
    b'A', b'B', b'C', b'D', b'E', b'F', b'G', b'H', b'I', b'J',         /*  4-13  */
    b'K', b'L', b'M', b'N', b'O', b'P', b'Q', b'R', b'S', b'T',         /* 14-23  */
    b'U', b'V', b'W', b'X', b'Y', b'Z',                                 /* 24-29  */
    b'!', b'@', b'#', b'$', b'%', b'^', b'&', b'*', b'(', b')',         /* 30-39  */
    CHAR_RETURN, CHAR_ESCAPE, CHAR_BACKSPACE, CHAR_TAB, b' ',           /* 40-44  */
    b'_', b'+', b'{', b'}', b'|', X, b':', b'"', b'~', b'<',            /* 45-54  */
    b'>', b'?', X, X, X, X,                                             /* 55-60  */
    X, X, X, X, X, X, X, X,                                             /* 61-68  */
    X, X, X, X, X, X, X, X,                                             /* 69-76  */
    X, X, X, X, X, X, X, X,                                             /* 77-84  */
    b'*', b'-', b'+', b'\n', b'1', b'2', b'3', b'4', b'5',              /* 85-93  */
    b'6', b'7', b'8', b'9', b'0', b'.', 0xb1,                           /* 94-100 */
];

/// Modifier that has to be held while the keycode is pressed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Modifier {
    None,
    Shift,
}

impl From<Modifier> for HidModifiers {
    fn from(value: Modifier) -> Self {
        match value {
            Modifier::None => HidModifiers::NONE,
            Modifier::Shift => HidModifiers::SHIFT,
        }
    }
}

/// A single key press: keycode plus the modifier held with it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyStroke {
    pub keycode: u8,
    pub modifier: Modifier,
}

/// The character has no keycode in the US layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Unmappable(pub u8);

fn lookup_keycode(character: u8, table: &[u8]) -> Option<u8> {
    table.iter().position(|&c| c == character).map(|i| i as u8)
}

/// Translate a character to the key stroke that types it on a US keyboard.
pub fn translate(character: u8) -> Result<KeyStroke, Unmappable> {
    if character == CHAR_ILLEGAL {
        return Err(Unmappable(character));
    }
    if let Some(keycode) = lookup_keycode(character, &KEYTABLE_US_NONE) {
        return Ok(KeyStroke {
            keycode,
            modifier: Modifier::None,
        });
    }
    if let Some(keycode) = lookup_keycode(character, &KEYTABLE_US_SHIFT) {
        return Ok(KeyStroke {
            keycode,
            modifier: Modifier::Shift,
        });
    }
    Err(Unmappable(character))
}
