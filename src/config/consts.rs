// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Widest word a `BitWord` can carry
pub const MAX_BIT_WIDTH: u8 = 32;
/// Width of the stimulus words in the loopback harness
pub const DEFAULT_WORD_WIDTH: u8 = 32;
/// Number of stimulus words when the configuration doesn't say
pub const DEFAULT_WORD_COUNT: usize = 2_400;
/// Default `RUST_LOG` directive for the demo binary
pub const DEFAULT_LOG_DIRECTIVE: &str = "layered_translator=info";
