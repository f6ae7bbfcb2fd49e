use crate::{
    action::StoreAction,
    error::{Result, StoreError},
    listener::Subscription,
    Store,
};
use std::rc::{Rc, Weak};

/// Receives the states of a [StateObservable].
///
/// Closures taking an `Rc<State>` are observers. Implementors which
/// don't override [next()](Observer::next()) ignore every state.
pub trait Observer<State> {
    fn next(&self, _state: Rc<State>) {}
}

impl<State, F> Observer<State> for F
where
    F: Fn(Rc<State>),
{
    fn next(&self, state: Rc<State>) {
        self(state)
    }
}

/// The state of a [Store] seen as a stream of values, obtained with
/// [Store::observable()].
pub struct StateObservable<State, Action> {
    store: Weak<Store<State, Action>>,
}

impl<State, Action> StateObservable<State, Action>
where
    State: 'static,
    Action: StoreAction + 'static,
{
    pub(crate) fn new(store: Weak<Store<State, Action>>) -> Self {
        Self { store }
    }

    /// Subscribe an `observer`, which immediately receives the current
    /// state and then the state after every dispatch.
    ///
    /// Unsubscribing the returned [Subscription] stops the stream.
    pub fn subscribe<O: Observer<State> + 'static>(&self, observer: O) -> Result<Subscription> {
        let store = self.store.upgrade().ok_or(StoreError::StoreDropped)?;
        observer.next(store.state()?);

        let weak_store = self.store.clone();
        store.subscribe(move || {
            if let Some(state) = weak_store.upgrade().and_then(|store| store.state().ok()) {
                observer.next(state);
            }
        })
    }

    /// Returns this observable itself, for code which asks any source
    /// for its observable.
    pub fn observable(&self) -> &Self {
        self
    }
}

impl<State, Action> Clone for StateObservable<State, Action> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}
