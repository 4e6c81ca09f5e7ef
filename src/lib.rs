// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod adapters;   // stock pull sources
pub mod config;     // translator + loopback configuration
pub mod engine;     // translator, ports, background coordinator
pub mod errors;     // error handling
pub mod loopback;   // generation -> analysis round trip harness
pub mod observability;
pub mod traits;     // transform and boundary abstractions
pub mod transforms; // stock transforms
