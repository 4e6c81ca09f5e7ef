// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::Ports;
use crate::errors::TranslatorError;
use crate::traits::Transform;
use crate::transforms::BitWord;

/// Repack a stream of `from_width`-bit words into `to_width`-bit words.
///
/// Bits keep their order across the repacking, most significant bit first:
/// packing the 8-bit words `0b10110011, 0b01010101` to 4 bits yields
/// `1011, 0011, 0101, 0101`.
///
/// Each pass consumes exactly one inbound word and emits every complete
/// output word it now has, so narrowing (32 → 8) is one-to-many and widening
/// (3 → 8) is many-to-one with passes that emit nothing. Leftover bits are
/// carried across passes; a trailing partial word is never emitted.
pub struct Regroup {
    from_width: u8,
    to_width: u8,
    pending: u64,
    pending_bits: u32,
}

impl Regroup {
    /// # Panics
    /// If either width is outside `1..=32`.
    pub fn new(from_width: u8, to_width: u8) -> Self {
        // Validate through BitWord so both widths share one rule.
        BitWord::new(0, from_width);
        BitWord::new(0, to_width);

        Self {
            from_width,
            to_width,
            pending: 0,
            pending_bits: 0,
        }
    }

    pub fn from_width(&self) -> u8 {
        self.from_width
    }

    pub fn to_width(&self) -> u8 {
        self.to_width
    }

    /// Bits received but not yet emitted.
    pub fn pending_bits(&self) -> u32 {
        self.pending_bits
    }

    fn accept(&mut self, word: BitWord) -> Vec<BitWord> {
        let value = BitWord::new(word.value(), self.from_width).value();
        self.pending = (self.pending << self.from_width) | u64::from(value);
        self.pending_bits += u32::from(self.from_width);

        let to_width = u32::from(self.to_width);
        let mut emitted = Vec::new();
        while self.pending_bits >= to_width {
            self.pending_bits -= to_width;
            let out = (self.pending >> self.pending_bits) as u32;
            emitted.push(BitWord::new(out, self.to_width));
        }
        // pending_bits < to_width <= 32 here
        self.pending &= (1u64 << self.pending_bits) - 1;
        emitted
    }
}

#[async_trait]
impl Transform<BitWord, BitWord> for Regroup {
    async fn transform(
        &mut self,
        ports: &mut Ports<BitWord, BitWord>,
    ) -> Result<(), TranslatorError> {
        let word = ports.get_inbound().await;
        for out in self.accept(word) {
            ports.put_outbound_no_clone(out);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "regroup"
    }
}
