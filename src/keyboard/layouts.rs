//! Built-in keymap tables
//!
//! Each table row is `(character, scancode, modifier)`. Scancodes are USB HID
//! usage codes from the Keyboard/Keypad page; modifiers are the report byte 0 bits.

use super::report::modifier::{LEFT_SHIFT as S, NONE as N};

/// TheC64 Mini with a UK PC keyboard attached
pub const THEC64_MINI_UK: &str = "thec64-mini-uk";

/// Full-size THEC64, positional C64 legends on the PC key matrix
pub const THEC64: &str = "thec64";

pub const THEC64_MINI_UK_TABLE: &[(char, u8, u8)] = &[
    // Control characters
    ('\n', 0x28, N),
    ('\u{1b}', 0x29, N),
    ('\u{8}', 0x2a, N),
    ('\t', 0x2b, N),
    (' ', 0x2c, N),
    // Lowercase letters
    ('a', 0x04, N),
    ('b', 0x05, N),
    ('c', 0x06, N),
    ('d', 0x07, N),
    ('e', 0x08, N),
    ('f', 0x09, N),
    ('g', 0x0a, N),
    ('h', 0x0b, N),
    ('i', 0x0c, N),
    ('j', 0x0d, N),
    ('k', 0x0e, N),
    ('l', 0x0f, N),
    ('m', 0x10, N),
    ('n', 0x11, N),
    ('o', 0x12, N),
    ('p', 0x13, N),
    ('q', 0x14, N),
    ('r', 0x15, N),
    ('s', 0x16, N),
    ('t', 0x17, N),
    ('u', 0x18, N),
    ('v', 0x19, N),
    ('w', 0x1a, N),
    ('x', 0x1b, N),
    ('y', 0x1c, N),
    ('z', 0x1d, N),
    // Uppercase letters
    ('A', 0x04, S),
    ('B', 0x05, S),
    ('C', 0x06, S),
    ('D', 0x07, S),
    ('E', 0x08, S),
    ('F', 0x09, S),
    ('G', 0x0a, S),
    ('H', 0x0b, S),
    ('I', 0x0c, S),
    ('J', 0x0d, S),
    ('K', 0x0e, S),
    ('L', 0x0f, S),
    ('M', 0x10, S),
    ('N', 0x11, S),
    ('O', 0x12, S),
    ('P', 0x13, S),
    ('Q', 0x14, S),
    ('R', 0x15, S),
    ('S', 0x16, S),
    ('T', 0x17, S),
    ('U', 0x18, S),
    ('V', 0x19, S),
    ('W', 0x1a, S),
    ('X', 0x1b, S),
    ('Y', 0x1c, S),
    ('Z', 0x1d, S),
    // Number row
    ('1', 0x1e, N),
    ('2', 0x1f, N),
    ('3', 0x20, N),
    ('4', 0x21, N),
    ('5', 0x22, N),
    ('6', 0x23, N),
    ('7', 0x24, N),
    ('8', 0x25, N),
    ('9', 0x26, N),
    ('0', 0x27, N),
    ('!', 0x1e, S),
    ('"', 0x1f, S),
    ('£', 0x20, S),
    ('$', 0x21, S),
    ('%', 0x22, S),
    ('^', 0x23, S),
    ('&', 0x24, S),
    ('*', 0x25, S),
    ('(', 0x26, S),
    (')', 0x27, S),
    ('-', 0x2d, N),
    ('_', 0x2d, S),
    ('=', 0x2e, N),
    ('+', 0x2e, S),
    // Punctuation
    ('[', 0x2f, N),
    ('{', 0x2f, S),
    (']', 0x30, N),
    ('}', 0x30, S),
    ('#', 0x32, N),
    ('~', 0x32, S),
    (';', 0x33, N),
    (':', 0x33, S),
    ('\'', 0x34, N),
    ('@', 0x34, S),
    ('`', 0x35, N),
    ('¬', 0x35, S),
    (',', 0x36, N),
    ('<', 0x36, S),
    ('.', 0x37, N),
    ('>', 0x37, S),
    ('/', 0x38, N),
    ('?', 0x38, S),
    ('\\', 0x64, N),
    ('|', 0x64, S),
];

pub const THEC64_TABLE: &[(char, u8, u8)] = &[
    // Control characters
    ('\n', 0x28, N),
    ('\u{1b}', 0x29, N),
    ('\u{8}', 0x2a, N),
    ('\t', 0x2b, N),
    (' ', 0x2c, N),
    // Letters, both cases on the plain key
    ('a', 0x04, N),
    ('b', 0x05, N),
    ('c', 0x06, N),
    ('d', 0x07, N),
    ('e', 0x08, N),
    ('f', 0x09, N),
    ('g', 0x0a, N),
    ('h', 0x0b, N),
    ('i', 0x0c, N),
    ('j', 0x0d, N),
    ('k', 0x0e, N),
    ('l', 0x0f, N),
    ('m', 0x10, N),
    ('n', 0x11, N),
    ('o', 0x12, N),
    ('p', 0x13, N),
    ('q', 0x14, N),
    ('r', 0x15, N),
    ('s', 0x16, N),
    ('t', 0x17, N),
    ('u', 0x18, N),
    ('v', 0x19, N),
    ('w', 0x1a, N),
    ('x', 0x1b, N),
    ('y', 0x1c, N),
    ('z', 0x1d, N),
    ('A', 0x04, N),
    ('B', 0x05, N),
    ('C', 0x06, N),
    ('D', 0x07, N),
    ('E', 0x08, N),
    ('F', 0x09, N),
    ('G', 0x0a, N),
    ('H', 0x0b, N),
    ('I', 0x0c, N),
    ('J', 0x0d, N),
    ('K', 0x0e, N),
    ('L', 0x0f, N),
    ('M', 0x10, N),
    ('N', 0x11, N),
    ('O', 0x12, N),
    ('P', 0x13, N),
    ('Q', 0x14, N),
    ('R', 0x15, N),
    ('S', 0x16, N),
    ('T', 0x17, N),
    ('U', 0x18, N),
    ('V', 0x19, N),
    ('W', 0x1a, N),
    ('X', 0x1b, N),
    ('Y', 0x1c, N),
    ('Z', 0x1d, N),
    // Number row: ← 1 2 3 4 5 6 7 8 9 0 + -
    ('←', 0x35, N),
    ('1', 0x1e, N),
    ('2', 0x1f, N),
    ('3', 0x20, N),
    ('4', 0x21, N),
    ('5', 0x22, N),
    ('6', 0x23, N),
    ('7', 0x24, N),
    ('8', 0x25, N),
    ('9', 0x26, N),
    ('0', 0x27, N),
    ('!', 0x1e, S),
    ('"', 0x1f, S),
    ('#', 0x20, S),
    ('$', 0x21, S),
    ('%', 0x22, S),
    ('&', 0x23, S),
    ('\'', 0x24, S),
    ('(', 0x25, S),
    (')', 0x26, S),
    ('+', 0x2d, N),
    ('-', 0x2e, N),
    // Q row: @ *
    ('@', 0x2f, N),
    ('*', 0x30, N),
    // A row: : ; =
    (':', 0x33, N),
    ('[', 0x33, S),
    (';', 0x34, N),
    (']', 0x34, S),
    ('=', 0x31, N),
    // Z row: , . /
    (',', 0x36, N),
    ('<', 0x36, S),
    ('.', 0x37, N),
    ('>', 0x37, S),
    ('/', 0x38, N),
    ('?', 0x38, S),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::keymap::{KeyEntry, KeymapRegistry};

    fn entry(layout: &str, character: char) -> Option<KeyEntry> {
        KeymapRegistry::builtin()
            .unwrap()
            .resolve(layout, character)
            .unwrap()
    }

    #[test]
    fn uk_letters_and_case() {
        assert_eq!(entry(THEC64_MINI_UK, 'a'), Some(KeyEntry::new(0x04, N)));
        assert_eq!(entry(THEC64_MINI_UK, 'Z'), Some(KeyEntry::new(0x1d, S)));
    }

    #[test]
    fn uk_specific_punctuation() {
        assert_eq!(entry(THEC64_MINI_UK, '"'), Some(KeyEntry::new(0x1f, S)));
        assert_eq!(entry(THEC64_MINI_UK, '£'), Some(KeyEntry::new(0x20, S)));
        assert_eq!(entry(THEC64_MINI_UK, '@'), Some(KeyEntry::new(0x34, S)));
        assert_eq!(entry(THEC64_MINI_UK, '#'), Some(KeyEntry::new(0x32, N)));
        assert_eq!(entry(THEC64_MINI_UK, '\\'), Some(KeyEntry::new(0x64, N)));
    }

    #[test]
    fn thec64_positional_symbols() {
        assert_eq!(entry(THEC64, '@'), Some(KeyEntry::new(0x2f, N)));
        assert_eq!(entry(THEC64, '*'), Some(KeyEntry::new(0x30, N)));
        assert_eq!(entry(THEC64, '+'), Some(KeyEntry::new(0x2d, N)));
        assert_eq!(entry(THEC64, '"'), Some(KeyEntry::new(0x1f, S)));
        assert_eq!(entry(THEC64, '('), Some(KeyEntry::new(0x25, S)));
    }

    #[test]
    fn thec64_letters_ignore_case() {
        assert_eq!(entry(THEC64, 'q'), entry(THEC64, 'Q'));
        assert_eq!(entry(THEC64, 'Q'), Some(KeyEntry::new(0x14, N)));
    }

    #[test]
    fn thec64_lacks_pound_and_braces() {
        assert_eq!(entry(THEC64, '£'), None);
        assert_eq!(entry(THEC64, '{'), None);
        assert_eq!(entry(THEC64, '~'), None);
    }

    #[test]
    fn control_characters_in_every_layout() {
        for layout in [THEC64_MINI_UK, THEC64] {
            assert_eq!(entry(layout, '\n'), Some(KeyEntry::new(0x28, N)));
            assert_eq!(entry(layout, '\t'), Some(KeyEntry::new(0x2b, N)));
            assert_eq!(entry(layout, '\u{8}'), Some(KeyEntry::new(0x2a, N)));
            assert_eq!(entry(layout, '\u{1b}'), Some(KeyEntry::new(0x29, N)));
            assert_eq!(entry(layout, ' '), Some(KeyEntry::new(0x2c, N)));
        }
    }

    fn assert_mappings(layout: &str, expected: &[(char, u8, u8)]) {
        for &(character, scancode, modifier) in expected {
            assert_eq!(
                entry(layout, character),
                Some(KeyEntry::new(scancode, modifier)),
                "{layout} {character:?}"
            );
        }
    }

    #[test]
    fn uk_punctuation_table() {
        assert_mappings(
            THEC64_MINI_UK,
            &[
                ('"', 0x1f, S),
                ('£', 0x20, S),
                ('@', 0x34, S),
                ('\'', 0x34, N),
                ('#', 0x32, N),
                ('~', 0x32, S),
                ('\\', 0x64, N),
                ('|', 0x64, S),
                ('`', 0x35, N),
                ('¬', 0x35, S),
                ('-', 0x2d, N),
                ('_', 0x2d, S),
                ('=', 0x2e, N),
                ('+', 0x2e, S),
            ],
        );
    }

    #[test]
    fn thec64_symbol_table() {
        assert_mappings(
            THEC64,
            &[
                ('!', 0x1e, S),
                ('"', 0x1f, S),
                ('#', 0x20, S),
                ('$', 0x21, S),
                ('%', 0x22, S),
                ('&', 0x23, S),
                ('\'', 0x24, S),
                ('(', 0x25, S),
                (')', 0x26, S),
                ('+', 0x2d, N),
                ('-', 0x2e, N),
                ('@', 0x2f, N),
                ('*', 0x30, N),
                (':', 0x33, N),
                ('[', 0x33, S),
                (';', 0x34, N),
                (']', 0x34, S),
                ('=', 0x31, N),
                (',', 0x36, N),
                ('<', 0x36, S),
                ('.', 0x37, N),
                ('>', 0x37, S),
                ('/', 0x38, N),
                ('?', 0x38, S),
            ],
        );
    }

    #[test]
    fn thec64_unmapped_characters() {
        for character in ['£', '^', '{', '}', '~', '_', '|', '\\', '`'] {
            assert_eq!(entry(THEC64, character), None, "{character:?}");
        }
    }

    #[test]
    fn table_sizes() {
        let registry = KeymapRegistry::builtin().unwrap();
        assert_eq!(registry.layout(THEC64_MINI_UK).unwrap().len(), THEC64_MINI_UK_TABLE.len());
        assert_eq!(registry.layout(THEC64).unwrap().len(), THEC64_TABLE.len());
    }
}
