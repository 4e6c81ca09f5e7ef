// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ready-made peers for the translator boundaries.

mod vec_source;

pub use vec_source::VecSource;
