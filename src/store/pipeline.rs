//! Participants of the dispatch pipeline

use crate::error::Result;

use super::dispatcher::Dispatcher;

/// Pure state transition
///
/// Reducers run in the order they were registered; each one receives the
/// state returned by the previous reducer for the same action. An error
/// aborts the batch and leaves the store at its last published state.
pub trait Reducer<S, A>: Send + Sync {
    fn reduce(&self, state: S, action: &A) -> Result<S>;
}

/// Side-effect hook invoked before reducers see an action.
///
/// Middleware must not block; follow-up work is spawned and reported back
/// by dispatching new actions through `dispatcher`, which only holds a weak
/// handle to the store.
pub trait Middleware<S, A>: Send + Sync {
    fn apply(&self, state: &S, action: &A, dispatcher: &Dispatcher<S, A>);

    /// Called when the middleware is removed or the store shuts down.
    /// Pending work should be cancelled here.
    fn detach(&self) {}
}

/// Gatekeeper deciding whether an action is worth executing
pub trait Coordinator<S, A>: Send + Sync {
    fn should_execute(&self, action: &A, state: &S) -> bool;
}

/// Coordinator that lets every action through
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughCoordinator;

impl<S, A> Coordinator<S, A> for PassthroughCoordinator {
    fn should_execute(&self, _action: &A, _state: &S) -> bool {
        true
    }
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(S, &A) -> Result<S> + Send + Sync,
{
    fn reduce(&self, state: S, action: &A) -> Result<S> {
        self(state, action)
    }
}
