// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::marker::PhantomData;

use crate::engine::Ports;
use crate::errors::TranslatorError;
use crate::traits::{Item, Transform};

/// Identity transform - every inbound item is delivered unchanged
pub struct Identity<T> {
    _item: PhantomData<fn() -> T>,
}

impl<T> Identity<T> {
    pub fn new() -> Self {
        Self { _item: PhantomData }
    }
}

impl<T> Default for Identity<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Item> Transform<T, T> for Identity<T> {
    async fn transform(&mut self, ports: &mut Ports<T, T>) -> Result<(), TranslatorError> {
        let item = ports.get_inbound().await;
        ports.put_outbound_no_clone(item);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}
