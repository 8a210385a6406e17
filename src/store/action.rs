//! Action envelopes

use std::time::Duration;

/// Optional pauses around the processing of one action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreDelay {
    /// Wait before the action reaches middleware and reducers
    pub before: Option<Duration>,
    /// Wait after the new state was published (skipped on failure)
    pub after: Option<Duration>,
}

impl StoreDelay {
    pub fn before(duration: Duration) -> Self {
        Self {
            before: Some(duration),
            after: None,
        }
    }

    pub fn after(duration: Duration) -> Self {
        Self {
            before: None,
            after: Some(duration),
        }
    }
}

/// An action plus its delay configuration
///
/// Delays are applied inside the store's serial worker, so they never
/// change the processing order of dispatched batches.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionBox<A> {
    pub action: A,
    pub delay: StoreDelay,
}

impl<A> ActionBox<A> {
    pub fn new(action: A) -> Self {
        Self {
            action,
            delay: StoreDelay::default(),
        }
    }

    pub fn delayed(action: A, delay: StoreDelay) -> Self {
        Self { action, delay }
    }

    pub(crate) async fn wait_before(&self) {
        if let Some(duration) = self.delay.before {
            tokio::time::sleep(duration).await;
        }
    }

    pub(crate) async fn wait_after(&self) {
        if let Some(duration) = self.delay.after {
            tokio::time::sleep(duration).await;
        }
    }
}

impl<A> From<A> for ActionBox<A> {
    fn from(action: A) -> Self {
        Self::new(action)
    }
}
