//! Serial worker owning the store state
//!
//! One worker task per store drains the command queue. Every dispatched
//! action goes through the same steps:
//!
//! ```text
//! delay.before → coordinator → middleware → reducers → publish → delay.after
//! ```

use std::fmt::Debug;
use std::panic::Location;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use super::action::ActionBox;
use super::dispatcher::{Command, Dispatcher};
use super::pipeline::{Coordinator, Middleware, Reducer};
use crate::error::{Error, Result};

/// Per-store logging of action outcomes
#[derive(Debug, Clone)]
pub struct StoreLogger {
    identifier: Arc<str>,
}

impl StoreLogger {
    pub fn new(identifier: Arc<str>) -> Self {
        Self { identifier }
    }

    pub fn did_complete<A: Debug>(&self, action: &A, origin: &Location<'_>) {
        tracing::debug!(
            store = %self.identifier,
            ?action,
            file = origin.file(),
            line = origin.line(),
            "Action completed"
        );
    }

    pub fn did_skip<A: Debug>(&self, action: &A, origin: &Location<'_>) {
        tracing::debug!(
            store = %self.identifier,
            ?action,
            file = origin.file(),
            line = origin.line(),
            "Action skipped"
        );
    }

    pub fn did_fail<A: Debug>(&self, action: &A, error: &Error, origin: &Location<'_>) {
        tracing::error!(
            store = %self.identifier,
            ?action,
            %error,
            file = origin.file(),
            line = origin.line(),
            "Action failed"
        );
    }
}

pub(crate) struct Executor<S, A> {
    logger: StoreLogger,
    publisher: watch::Sender<S>,
    reducers: Vec<Arc<dyn Reducer<S, A>>>,
    middleware: Vec<Arc<dyn Middleware<S, A>>>,
    coordinator: Arc<dyn Coordinator<S, A>>,
    dispatcher: Dispatcher<S, A>,
}

impl<S, A> Executor<S, A>
where
    S: Clone + PartialEq + Send + Sync + 'static,
    A: Debug + Send + Sync + 'static,
{
    pub(crate) fn new(
        logger: StoreLogger,
        publisher: watch::Sender<S>,
        reducers: Vec<Arc<dyn Reducer<S, A>>>,
        middleware: Vec<Arc<dyn Middleware<S, A>>>,
        coordinator: Arc<dyn Coordinator<S, A>>,
        dispatcher: Dispatcher<S, A>,
    ) -> Self {
        Self {
            logger,
            publisher,
            reducers,
            middleware,
            coordinator,
            dispatcher,
        }
    }

    /// Drain commands until every strong sender is gone
    pub(crate) async fn run(mut self, mut receiver: mpsc::Receiver<Command<S, A>>) {
        while let Some(command) = receiver.recv().await {
            match command {
                Command::Dispatch {
                    actions,
                    completion,
                    origin,
                } => {
                    let result = self.process_batch(actions, origin).await;
                    // The caller may have dropped its task
                    let _ = completion.send(result);
                }
                Command::AddReducer(reducer) => self.reducers.push(reducer),
                Command::RemoveReducer(reducer) => {
                    self.reducers.retain(|existing| !same_object(existing, &reducer))
                }
                Command::AddMiddleware(middleware) => self.middleware.push(middleware),
                Command::RemoveMiddleware(middleware) => {
                    self.middleware.retain(|existing| {
                        let same = same_object(existing, &middleware);
                        if same {
                            existing.detach();
                        }
                        !same
                    });
                }
            }
        }

        tracing::debug!(store = %self.logger.identifier, "Store worker stopped");
        self.middleware.iter().for_each(|middleware| middleware.detach());
    }

    async fn process_batch(
        &mut self,
        actions: Vec<ActionBox<A>>,
        origin: &'static Location<'static>,
    ) -> Result<()> {
        for boxed in actions {
            boxed.wait_before().await;

            let current = self.publisher.borrow().clone();
            if !self.coordinator.should_execute(&boxed.action, &current) {
                self.logger.did_skip(&boxed.action, origin);
                continue;
            }

            for middleware in &self.middleware {
                middleware.apply(&current, &boxed.action, &self.dispatcher);
            }

            match self.reduce(current, &boxed.action) {
                Ok(next) => {
                    self.publisher.send_if_modified(|state| {
                        if *state == next {
                            false
                        } else {
                            *state = next;
                            true
                        }
                    });
                    self.logger.did_complete(&boxed.action, origin);
                }
                Err(error) => {
                    self.logger.did_fail(&boxed.action, &error, origin);
                    return Err(error);
                }
            }

            boxed.wait_after().await;
        }
        Ok(())
    }

    fn reduce(&self, state: S, action: &A) -> Result<S> {
        self.reducers
            .iter()
            .try_fold(state, |state, reducer| reducer.reduce(state, action))
    }
}

fn same_object<T: ?Sized>(lhs: &Arc<T>, rhs: &Arc<T>) -> bool {
    std::ptr::eq(Arc::as_ptr(lhs) as *const (), Arc::as_ptr(rhs) as *const ())
}
