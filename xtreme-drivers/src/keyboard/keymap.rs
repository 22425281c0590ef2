//! Scan code to ASCII
//!
//! Covers what a ROM title needs: letters, both digit blocks, a handful of
//! punctuation keys, space and backspace. Everything else maps to 0.

/// Letter keys A-Z in alphabetical order
const LETTERS: [u8; 26] = [
    30, 48, 46, 32, 18, 33, 34, 35, 23, 36, 37, 38, 50, 49, 24, 25, 16, 19, 31, 20, 22, 47, 17,
    45, 21, 44,
];

/// Main block digits 0-9
const DIGITS: [u8; 10] = [11, 2, 3, 4, 5, 6, 7, 8, 9, 10];

/// Keypad digits 0-9
const KEYPAD: [u8; 10] = [112, 109, 110, 111, 106, 107, 108, 103, 104, 105];

const BACKSPACE: u8 = 0x08;

/// Translate a key-press scan code
pub fn keyscan_to_ascii(key: u8, shift: bool) -> u8 {
    let shifted = |lower: u8, upper: u8| if shift { upper } else { lower };

    match key {
        14 => return BACKSPACE,
        57 => return b' ',
        10 => return shifted(b'9', b'('),
        11 => return shifted(b'0', b')'),
        12 => return shifted(b'-', b'_'),
        51 => return shifted(b',', b'<'),
        52 => return shifted(b'.', b'>'),
        74 => return b'-',
        78 => return b'+',
        113 => return b'.',
        53 | 101 => return b'/',
        102 => return b'*',
        _ => {}
    }

    if let Some(idx) = LETTERS.iter().position(|&k| k == key) {
        return shifted(b'a', b'A') + idx as u8;
    }
    if let Some(idx) = DIGITS
        .iter()
        .position(|&k| k == key)
        .or_else(|| KEYPAD.iter().position(|&k| k == key))
    {
        return b'0' + idx as u8;
    }
    0
}
