//! Relative frequency of ASCII units in typical text.
//!
//! Higher means more common. Used to pick which trie child gets the inline
//! fast slot and, in the single-string matcher, which needle units make the
//! rarest anchors. Anything outside ASCII scores 0 and counts as rare.

#[rustfmt::skip]
static ASCII_FREQUENCY: [u8; 128] = [
    //  0    1    2    3    4    5    6    7    8    9    A    B    C    D    E    F
        0,   0,   0,   0,   0,   0,   0,   0,   0,  60, 110,   0,   0,  80,   0,   0, // 0x00
        0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0, // 0x10
      255,  40,  80,  30,  25,  25,  35,  80,  70,  70,  35,  40, 120,  85, 120,  70, // 0x20
       95,  90,  85,  80,  78,  78,  76,  75,  76,  78,  70,  60,  50,  70,  50,  40, // 0x30
       25, 100,  75,  85,  80, 100,  70,  65,  70,  95,  50,  45,  75,  75,  90,  95, // 0x40
       75,  30,  90,  95, 100,  65,  45,  60,  40,  50,  30,  45,  25,  45,  10,  70, // 0x50
       10, 210, 125, 160, 165, 240, 140, 135, 180, 200,  80, 105, 170, 145, 200, 205, // 0x60
      140,  60, 190, 195, 220, 150, 110, 130,  90, 130,  60,  45,  20,  45,  10,   0, // 0x70
];

/// Frequency score of a code unit; 0 for anything outside ASCII.
#[inline]
pub fn frequency(unit: u16) -> u8 {
    if unit < 0x80 {
        ASCII_FREQUENCY[unit as usize]
    } else {
        0
    }
}
