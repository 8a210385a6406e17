//! Distinct-until-changed views over store state

use std::sync::Arc;

use futures_util::stream::{self, Stream};
use tokio::sync::watch;

/// Selected slice of the store state
///
/// The first call to [`next`](Self::next) yields the current value; every
/// later call waits until the selected value differs from the last one
/// returned. `None` means the store is gone.
pub struct StatePublisher<S, V> {
    receiver: watch::Receiver<S>,
    selector: Arc<dyn Fn(&S) -> V + Send + Sync>,
    last: Option<V>,
}

impl<S, V> StatePublisher<S, V>
where
    S: Send + Sync + 'static,
    V: Clone + PartialEq + Send + 'static,
{
    pub(crate) fn new<F>(receiver: watch::Receiver<S>, selector: F) -> Self
    where
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        Self {
            receiver,
            selector: Arc::new(selector),
            last: None,
        }
    }

    /// Current selected value without waiting
    pub fn current(&self) -> V {
        (self.selector)(&self.receiver.borrow())
    }

    pub async fn next(&mut self) -> Option<V> {
        if self.last.is_none() {
            let value = (self.selector)(&self.receiver.borrow_and_update());
            self.last = Some(value.clone());
            return Some(value);
        }

        loop {
            self.receiver.changed().await.ok()?;
            let value = (self.selector)(&self.receiver.borrow_and_update());
            if self.last.as_ref() != Some(&value) {
                self.last = Some(value.clone());
                return Some(value);
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = V> + Send + Unpin {
        Box::pin(stream::unfold(self, |mut publisher| async move {
            publisher.next().await.map(|value| (value, publisher))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        value: u32,
        label: &'static str,
    }

    #[tokio::test]
    async fn test_starts_with_current_value() {
        let (_sender, receiver) = watch::channel(Counter { value: 3, label: "a" });
        let mut publisher = StatePublisher::new(receiver, |state: &Counter| state.value);
        assert_eq!(publisher.next().await, Some(3));
    }

    #[tokio::test]
    async fn test_skips_unrelated_changes() {
        let (sender, receiver) = watch::channel(Counter { value: 0, label: "a" });
        let mut publisher = StatePublisher::new(receiver, |state: &Counter| state.value);
        assert_eq!(publisher.next().await, Some(0));

        sender.send_replace(Counter { value: 0, label: "b" });
        sender.send_replace(Counter { value: 1, label: "b" });
        assert_eq!(publisher.next().await, Some(1));
    }

    #[tokio::test]
    async fn test_ends_when_sender_dropped() {
        let (sender, receiver) = watch::channel(Counter { value: 0, label: "a" });
        let mut publisher = StatePublisher::new(receiver, |state: &Counter| state.label);
        assert_eq!(publisher.next().await, Some("a"));

        drop(sender);
        assert_eq!(publisher.next().await, None);
    }
}
