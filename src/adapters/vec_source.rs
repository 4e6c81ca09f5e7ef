// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::VecDeque;

use crate::traits::{Item, PullSource};

/// Finite pull source over a fixed list of items.
///
/// Once drained, `get_next` suspends forever and `try_next` returns `None`,
/// the same way any exhausted upstream behaves.
pub struct VecSource<T: Item> {
    items: VecDeque<T>,
    delivered: usize,
}

impl<T: Item> VecSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
            delivered: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    /// Items handed out so far.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    fn pop(&mut self) -> Option<T> {
        let item = self.items.pop_front()?;
        self.delivered += 1;
        Some(item)
    }
}

impl<T: Item> FromIterator<T> for VecSource<T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl<T: Item> PullSource<T> for VecSource<T> {
    async fn get_next(&mut self) -> T {
        match self.pop() {
            Some(item) => item,
            None => std::future::pending().await,
        }
    }

    async fn try_next(&mut self) -> Option<T> {
        self.pop()
    }

    fn has_available(&self) -> bool {
        !self.items.is_empty()
    }
}
