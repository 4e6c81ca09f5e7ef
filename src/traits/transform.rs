// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::fmt::Display;

use crate::engine::Ports;
use crate::errors::TranslatorError;

/// A value that can flow through a translator.
///
/// Items are cloned for taps and `put_outbound`, and their `Display` form is
/// what the item logs record.
pub trait Item: Clone + Display + Send + 'static {}

impl<T> Item for T where T: Clone + Display + Send + 'static {}

/// Translation logic, written once and run under any [`Mode`](crate::config::Mode).
///
/// One call is one pass: acquire zero or more inbound items through
/// [`Ports::get_inbound`] / [`Ports::try_inbound`] and deliver zero or more
/// outbound items through [`Ports::put_outbound`]. The ports hide whether the
/// surrounding pipeline pushes or pulls.
///
/// Running state (partial words, counters) lives in `self` and survives
/// across passes for the lifetime of the translator.
///
/// # Example
/// ```rust
/// use async_trait::async_trait;
/// use layered_translator::engine::Ports;
/// use layered_translator::errors::TranslatorError;
/// use layered_translator::traits::Transform;
///
/// /// Emits every inbound number twice
/// struct Doubler;
///
/// #[async_trait]
/// impl Transform<u32, u32> for Doubler {
///     async fn transform(&mut self, ports: &mut Ports<u32, u32>) -> Result<(), TranslatorError> {
///         let item = ports.get_inbound().await;
///         ports.put_outbound(&item);
///         ports.put_outbound_no_clone(item);
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "doubler"
///     }
/// }
/// ```
#[async_trait]
pub trait Transform<I: Item, O: Item>: Send + 'static {
    /// Run one translation pass.
    ///
    /// Errors returned here end the passive run loop; only configuration
    /// misuse is expected to surface this way.
    async fn transform(&mut self, ports: &mut Ports<I, O>) -> Result<(), TranslatorError>;

    fn name(&self) -> &'static str;
}

#[async_trait]
impl<I: Item, O: Item> Transform<I, O> for Box<dyn Transform<I, O>> {
    async fn transform(&mut self, ports: &mut Ports<I, O>) -> Result<(), TranslatorError> {
        (**self).transform(ports).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
