// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt::{Display, Formatter};

use crate::config::consts::MAX_BIT_WIDTH;

/// A word of `width` bits, `1 <= width <= 32`.
///
/// Displays as a zero-padded binary string, which is also its item log record.
///
/// ```
/// use layered_translator::transforms::BitWord;
///
/// let word = BitWord::new(0b101, 3);
/// assert_eq!(word.to_string(), "101");
/// assert_eq!(BitWord::new(0xff, 4).value(), 0xf);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitWord {
    value: u32,
    width: u8,
}

impl BitWord {
    /// Bits of `value` above `width` are discarded.
    ///
    /// # Panics
    /// If `width` is 0 or greater than 32.
    pub fn new(value: u32, width: u8) -> Self {
        assert!(
            (1..=MAX_BIT_WIDTH).contains(&width),
            "bit width must be within 1..={MAX_BIT_WIDTH}, got {width}"
        );
        Self {
            value: value & Self::mask(width),
            width,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    /// All-ones mask of `width` bits.
    pub fn mask(width: u8) -> u32 {
        if width >= 32 {
            u32::MAX
        } else {
            (1u32 << width) - 1
        }
    }
}

impl Display for BitWord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$b}", self.value, width = self.width as usize)
    }
}
