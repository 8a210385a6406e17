//! Dispatch handles and completion tasks

use std::panic::Location;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use super::action::ActionBox;
use super::pipeline::{Middleware, Reducer};
use crate::error::{Error, Result, StoreError};

/// Messages processed by the store worker, strictly in arrival order
pub(crate) enum Command<S, A> {
    Dispatch {
        actions: Vec<ActionBox<A>>,
        completion: oneshot::Sender<Result<()>>,
        origin: &'static Location<'static>,
    },
    AddReducer(Arc<dyn Reducer<S, A>>),
    RemoveReducer(Arc<dyn Reducer<S, A>>),
    AddMiddleware(Arc<dyn Middleware<S, A>>),
    RemoveMiddleware(Arc<dyn Middleware<S, A>>),
}

pub(crate) fn dispatch_command<S, A>(
    actions: Vec<ActionBox<A>>,
    origin: &'static Location<'static>,
) -> (Command<S, A>, StoreTask) {
    let (completion, receiver) = oneshot::channel();
    let command = Command::Dispatch {
        actions,
        completion,
        origin,
    };
    (command, StoreTask::pending(receiver))
}

/// Completion handle for one dispatched batch
///
/// Dropping the task does not cancel the batch; it is fire-and-forget
/// unless awaited.
#[must_use = "await `result()` to observe failures, or drop to fire-and-forget"]
pub struct StoreTask {
    inner: TaskInner,
}

enum TaskInner {
    Pending(oneshot::Receiver<Result<()>>),
    Failed(Error),
}

impl StoreTask {
    fn pending(receiver: oneshot::Receiver<Result<()>>) -> Self {
        Self {
            inner: TaskInner::Pending(receiver),
        }
    }

    pub(crate) fn failed(error: impl Into<Error>) -> Self {
        Self {
            inner: TaskInner::Failed(error.into()),
        }
    }

    /// Wait until every action of the batch was reduced and published
    pub async fn result(self) -> Result<()> {
        match self.inner {
            TaskInner::Pending(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(StoreError::TaskDropped.into())),
            TaskInner::Failed(error) => Err(error),
        }
    }
}

/// Non-owning handle used by middleware and effects to reach a store
///
/// Holding a dispatcher never keeps the store alive. Once the store is
/// dropped every dispatch fails with [`StoreError::Closed`].
pub struct Dispatcher<S, A> {
    sender: mpsc::WeakSender<Command<S, A>>,
    state: watch::Receiver<S>,
}

impl<S, A> Clone for Dispatcher<S, A> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            state: self.state.clone(),
        }
    }
}

impl<S: Clone, A> Dispatcher<S, A> {
    pub(crate) fn new(sender: mpsc::WeakSender<Command<S, A>>, state: watch::Receiver<S>) -> Self {
        Self { sender, state }
    }

    /// Queue a batch without waiting for queue capacity
    #[track_caller]
    pub fn dispatch<I>(&self, actions: I) -> StoreTask
    where
        I: IntoIterator,
        I::Item: Into<ActionBox<A>>,
    {
        let origin = Location::caller();
        let Some(sender) = self.sender.upgrade() else {
            return StoreTask::failed(StoreError::Closed);
        };
        let (command, task) = dispatch_command(actions.into_iter().map(Into::into).collect(), origin);
        match sender.try_send(command) {
            Ok(()) => task,
            Err(mpsc::error::TrySendError::Full(_)) => {
                StoreTask::failed(StoreError::QueueFull(sender.max_capacity()))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => StoreTask::failed(StoreError::Closed),
        }
    }

    /// Queue a batch, waiting for capacity, and wait for it to settle
    #[track_caller]
    pub fn dispatch_async<I>(&self, actions: I) -> impl std::future::Future<Output = Result<()>> + '_
    where
        I: IntoIterator,
        I::Item: Into<ActionBox<A>>,
    {
        let origin = Location::caller();
        let actions: Vec<ActionBox<A>> = actions.into_iter().map(Into::into).collect();
        async move {
            let sender = self.sender.upgrade().ok_or(StoreError::Closed)?;
            let (command, task) = dispatch_command(actions, origin);
            sender.send(command).await.map_err(|_| StoreError::Closed)?;
            drop(sender);
            task.result().await
        }
    }

    /// Latest published state, or `None` once the store is gone
    pub fn state(&self) -> Option<S> {
        self.sender.upgrade()?;
        Some(self.state.borrow().clone())
    }

    pub fn is_closed(&self) -> bool {
        self.sender.upgrade().is_none()
    }
}
