//! Generic action-driven state store
//!
//! A [`Store`] owns its state inside a single worker task. Callers dispatch
//! batches of actions; the worker runs them strictly in submission order
//! through the coordinator, the middleware and the reducers, then publishes
//! the new state on a `watch` channel.
//!
//! ```text
//!  dispatch([A, B]) ──► mpsc (bounded, FIFO) ──► worker ──► watch<S> ──► publishers
//!        ▲                                         │
//!        └──────────── weak Dispatcher ◄── middleware / effects
//! ```

mod action;
mod dispatcher;
mod executor;
mod pipeline;
mod publisher;

use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;

pub use action::{ActionBox, StoreDelay};
pub use dispatcher::{Dispatcher, StoreTask};
pub use executor::StoreLogger;
pub use pipeline::{Coordinator, Middleware, PassthroughCoordinator, Reducer};
pub use publisher::StatePublisher;

use crate::constants::DEFAULT_QUEUE_CAPACITY;
use crate::error::{Result, StoreError};
use dispatcher::{dispatch_command, Command};
use executor::Executor;

/// Handle to a running store
///
/// Clones share the same worker. The worker stops once the last `Store`
/// handle is dropped; [`Dispatcher`]s never keep it alive.
pub struct Store<S, A> {
    identifier: Arc<str>,
    sender: mpsc::Sender<Command<S, A>>,
    state: watch::Receiver<S>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            sender: self.sender.clone(),
            state: self.state.clone(),
        }
    }
}

impl<S, A> Store<S, A>
where
    S: Clone + PartialEq + Send + Sync + 'static,
    A: Debug + Send + Sync + 'static,
{
    pub fn builder(identifier: impl Into<String>, initial: S) -> StoreBuilder<S, A> {
        StoreBuilder::new(identifier, initial)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Snapshot of the last published state
    pub fn state(&self) -> S {
        self.state.borrow().clone()
    }

    /// Selected value, starting with the current one and then on change
    pub fn publisher<V, F>(&self, selector: F) -> StatePublisher<S, V>
    where
        V: Clone + PartialEq + Send + 'static,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        StatePublisher::new(self.state.clone(), selector)
    }

    /// Every published state, starting with the current one
    pub fn states(&self) -> WatchStream<S> {
        WatchStream::new(self.state.clone())
    }

    /// Raw watch receiver, for effects that need `changed()` semantics
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.clone()
    }

    /// Weak dispatch handle for middleware and effects
    pub fn dispatcher(&self) -> Dispatcher<S, A> {
        Dispatcher::new(self.sender.downgrade(), self.state.clone())
    }

    /// Queue a batch; fails fast when the queue is full
    #[track_caller]
    pub fn dispatch<I>(&self, actions: I) -> StoreTask
    where
        I: IntoIterator,
        I::Item: Into<ActionBox<A>>,
    {
        let origin = std::panic::Location::caller();
        let actions = actions.into_iter().map(Into::into).collect();
        let (command, task) = dispatch_command(actions, origin);
        match self.sender.try_send(command) {
            Ok(()) => task,
            Err(mpsc::error::TrySendError::Full(_)) => {
                StoreTask::failed(StoreError::QueueFull(self.sender.max_capacity()))
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
        let origin = std::panic::Location::caller();
        let actions = actions.into_iter().map(Into::into).collect();
        async move {
            let (command, task) = dispatch_command(actions, origin);
            self.sender.send(command).await.map_err(|_| StoreError::Closed)?;
            task.result().await
        }
    }

    pub async fn add_middleware(&self, middleware: Arc<dyn Middleware<S, A>>) -> Result<()> {
        self.send(Command::AddMiddleware(middleware)).await
    }

    /// Remove a middleware previously added; it is detached by the worker
    pub async fn remove_middleware(&self, middleware: Arc<dyn Middleware<S, A>>) -> Result<()> {
        self.send(Command::RemoveMiddleware(middleware)).await
    }

    pub async fn add_reducer(&self, reducer: Arc<dyn Reducer<S, A>>) -> Result<()> {
        self.send(Command::AddReducer(reducer)).await
    }

    pub async fn remove_reducer(&self, reducer: Arc<dyn Reducer<S, A>>) -> Result<()> {
        self.send(Command::RemoveReducer(reducer)).await
    }

    async fn send(&self, command: Command<S, A>) -> Result<()> {
        self.sender
            .send(command)
            .await
            .map_err(|_| StoreError::Closed.into())
    }
}

/// Builder for [`Store`]
pub struct StoreBuilder<S, A> {
    identifier: String,
    initial: S,
    reducers: Vec<Arc<dyn Reducer<S, A>>>,
    middleware: Vec<Arc<dyn Middleware<S, A>>>,
    coordinator: Arc<dyn Coordinator<S, A>>,
    queue_capacity: usize,
}

impl<S, A> StoreBuilder<S, A>
where
    S: Clone + PartialEq + Send + Sync + 'static,
    A: Debug + Send + Sync + 'static,
{
    pub fn new(identifier: impl Into<String>, initial: S) -> Self {
        Self {
            identifier: identifier.into(),
            initial,
            reducers: Vec::new(),
            middleware: Vec::new(),
            coordinator: Arc::new(PassthroughCoordinator),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn reducer(mut self, reducer: impl Reducer<S, A> + 'static) -> Self {
        self.reducers.push(Arc::new(reducer));
        self
    }

    pub fn middleware(mut self, middleware: Arc<dyn Middleware<S, A>>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn coordinator(mut self, coordinator: impl Coordinator<S, A> + 'static) -> Self {
        self.coordinator = Arc::new(coordinator);
        self
    }

    /// Bounded queue size in batches (at least one)
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Spawn the worker. Must be called within a Tokio runtime.
    pub fn build(self) -> Store<S, A> {
        let identifier: Arc<str> = Arc::from(self.identifier);
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        let (publisher, state) = watch::channel(self.initial);

        let dispatcher = Dispatcher::new(sender.downgrade(), state.clone());
        let executor = Executor::new(
            StoreLogger::new(identifier.clone()),
            publisher,
            self.reducers,
            self.middleware,
            self.coordinator,
            dispatcher,
        );

        tracing::debug!(store = %identifier, capacity = self.queue_capacity, "Starting store worker");
        tokio::spawn(executor.run(receiver));

        Store {
            identifier,
            sender,
            state,
        }
    }
}
