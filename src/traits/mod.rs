// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod source;
pub mod transform;

pub use source::{PullSource, PushSink};
pub use transform::{Item, Transform};
