// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Boundary traits between a translator and its peers.
//!
//! * [`PullSource`] - something a consumer pulls items out of. Upstream peers
//!   of an active translator implement it, and an active translator
//!   implements it for its own downstream peer.
//! * [`PushSink`] - something a producer pushes items into without waiting.
//!   Downstream peers of a passive translator, tap observers and the inbound
//!   handle of a passive translator implement it.

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::traits::Item;

/// Pull-style item source.
///
/// `get_next` may suspend indefinitely when the source has nothing left;
/// that is how an exhausted stream looks, not an error.
#[async_trait]
pub trait PullSource<T: Item>: Send {
    /// Suspend until the next item is available and return it.
    async fn get_next(&mut self) -> T;

    /// Return the next item if one is ready within the current scheduling round.
    async fn try_next(&mut self) -> Option<T>;

    /// Acknowledge an item obtained with `get_next` or `try_next`.
    fn item_done(&mut self, _item: Option<&T>) {}

    /// Suspend until the source has had a chance to produce.
    async fn wait_for_sequences(&mut self) {
        tokio::task::yield_now().await;
    }

    /// Whether an item can be taken without suspending.
    fn has_available(&self) -> bool;

    /// `get_next` followed by `item_done`.
    async fn get(&mut self) -> T {
        let item = self.get_next().await;
        self.item_done(Some(&item));
        item
    }

    async fn peek(&mut self) -> Option<T> {
        self.try_next().await
    }

    /// Hand an item back to the source. Ignored unless the source is sequenced.
    fn put(&mut self, _item: T) {}

    /// Hand a response back to the source. Ignored unless the source is sequenced.
    fn put_response(&mut self, _item: T) {}
}

/// Push-style item sink. Accepting an item never suspends the caller.
pub trait PushSink<T: Item>: Send {
    fn push(&mut self, item: T);
}

impl<T: Item> PushSink<T> for UnboundedSender<T> {
    fn push(&mut self, item: T) {
        // A dropped receiver means nobody observes this stream any more.
        if self.send(item).is_err() {
            tracing::debug!("push sink receiver dropped; item discarded");
        }
    }
}

#[async_trait]
impl<T: Item> PullSource<T> for Box<dyn PullSource<T>> {
    async fn get_next(&mut self) -> T {
        (**self).get_next().await
    }

    async fn try_next(&mut self) -> Option<T> {
        (**self).try_next().await
    }

    fn item_done(&mut self, item: Option<&T>) {
        (**self).item_done(item)
    }

    async fn wait_for_sequences(&mut self) {
        (**self).wait_for_sequences().await
    }

    fn has_available(&self) -> bool {
        (**self).has_available()
    }

    async fn get(&mut self) -> T {
        (**self).get().await
    }

    async fn peek(&mut self) -> Option<T> {
        (**self).peek().await
    }

    fn put(&mut self, item: T) {
        (**self).put(item)
    }

    fn put_response(&mut self, item: T) {
        (**self).put_response(item)
    }
}

impl<T: Item> PushSink<T> for Box<dyn PushSink<T>> {
    fn push(&mut self, item: T) {
        (**self).push(item)
    }
}
