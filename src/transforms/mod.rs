// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stock transforms.
//!
//! * [`Identity`] - one item in, the same item out
//! * [`Regroup`] - repack a bit stream from one word width to another,
//!   most significant bit first
//!
//! Both can be built from stage configuration through [`TransformFactory`].

mod bit_word;
mod factory;
mod identity;
mod regroup;

pub use bit_word::BitWord;
pub use factory::{TransformFactory, TransformKind};
pub use identity::Identity;
pub use regroup::Regroup;
