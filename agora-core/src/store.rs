//! Snapshot store with reducer pattern

use crate::Action;
use std::marker::PhantomData;
use std::sync::Arc;

/// A reducer function that handles actions and mutates state
///
/// Returns `true` if the state changed.
pub type Reducer<S, A> = fn(&mut S, A) -> bool;

/// Snapshot store with a Redux-like reducer
///
/// State lives behind an `Arc`. Readers take cheap snapshots with
/// [`Store::snapshot`]; a dispatch while any snapshot is still alive clones
/// the state first (copy-on-write), so a snapshot never changes after it was
/// handed out.
///
/// # Example
/// ```
/// use agora_core::{Action, Store};
///
/// #[derive(Clone, Default)]
/// struct Counter {
///     value: i32,
/// }
///
/// #[derive(Clone, Debug)]
/// enum CounterAction {
///     Increment,
/// }
///
/// impl Action for CounterAction {
///     fn name(&self) -> &'static str {
///         "Increment"
///     }
/// }
///
/// fn reducer(state: &mut Counter, action: CounterAction) -> bool {
///     match action {
///         CounterAction::Increment => {
///             state.value += 1;
///             true
///         }
///     }
/// }
///
/// let mut store = Store::new(Counter::default(), reducer);
/// let before = store.snapshot();
/// store.dispatch(CounterAction::Increment);
/// assert_eq!(before.value, 0);
/// assert_eq!(store.state().value, 1);
/// ```
pub struct Store<S, A: Action> {
    state: Arc<S>,
    reducer: Reducer<S, A>,
    _marker: PhantomData<A>,
}

impl<S: Clone, A: Action> Store<S, A> {
    /// Create a new store with initial state and reducer
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self {
            state: Arc::new(state),
            reducer,
            _marker: PhantomData,
        }
    }

    /// Dispatch an action to the store
    ///
    /// Returns `true` if the state changed.
    pub fn dispatch(&mut self, action: A) -> bool {
        (self.reducer)(Arc::make_mut(&mut self.state), action)
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Take a shared snapshot of the current state
    pub fn snapshot(&self) -> Arc<S> {
        Arc::clone(&self.state)
    }
}

/// Store with middleware support
///
/// Wraps a `Store` and allows middleware to intercept actions
/// before and after they are processed by the reducer.
pub struct StoreWithMiddleware<S, A: Action, M: Middleware<A>> {
    store: Store<S, A>,
    middleware: M,
}

impl<S: Clone, A: Action, M: Middleware<A>> StoreWithMiddleware<S, A, M> {
    /// Create a new store with middleware
    pub fn new(state: S, reducer: Reducer<S, A>, middleware: M) -> Self {
        Self {
            store: Store::new(state, reducer),
            middleware,
        }
    }

    /// Dispatch an action through middleware and store
    pub fn dispatch(&mut self, action: A) -> bool {
        self.middleware.before(&action);
        let changed = self.store.dispatch(action.clone());
        self.middleware.after(&action, changed);
        changed
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        self.store.state()
    }

    /// Take a shared snapshot of the current state
    pub fn snapshot(&self) -> Arc<S> {
        self.store.snapshot()
    }

    /// Get a reference to the middleware
    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    /// Get a mutable reference to the middleware
    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }
}

/// Middleware trait for intercepting actions
///
/// Implement this trait to add logging, auditing, or other
/// cross-cutting concerns to your store.
pub trait Middleware<A: Action> {
    /// Called before the action is dispatched to the reducer
    fn before(&mut self, action: &A);

    /// Called after the action is processed by the reducer
    fn after(&mut self, action: &A, state_changed: bool);
}
