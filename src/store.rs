use crate::{
    action::{action_from_value, LifecycleAction, StoreAction},
    enhancer::StoreEnhancer,
    error::{describe_action_type, Result, StoreError},
    listener::{Callback, ListenerHost, ListenerId, ListenerRegistry, Subscription},
    observable::StateObservable,
    Reducer,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{
    cell::RefCell,
    ops::Deref,
    rc::{Rc, Weak},
};

/// A [Reducer] behind a trait object, as handed to a
/// [StoreEnhancer].
pub type BoxedReducer<State, Action> = Box<dyn Reducer<State, Action>>;

/// Run the root reducer of a store, which must always produce a
/// state.
fn reduce_root<State, Action: StoreAction>(
    reducer: &dyn Reducer<State, Action>,
    state: Option<&Rc<State>>,
    action: &Action,
) -> Result<Rc<State>> {
    reducer
        .reduce(state, action)?
        .ok_or_else(|| StoreError::UndefinedRootState {
            action: describe_action_type(action.action_type()),
        })
}

/// A wrapper for an [Rc] reference to a [Store].
///
/// Stores are always created behind an [Rc], so that
/// [Subscription]s, [Dispatcher]s and [StateObservable]s can keep a
/// weak reference back to the store they belong to.
pub struct StoreRef<State, Action>(Rc<Store<State, Action>>);

impl<State, Action> StoreRef<State, Action>
where
    State: 'static,
    Action: StoreAction + 'static,
{
    /// Create a new [Store], which uses the specified `reducer` to
    /// handle `Action`s, starting from the `preloaded_state` if there
    /// is one.
    ///
    /// The reducer is called with the private `INIT` action before
    /// the store is returned, to produce the initial state. Any error
    /// raised by the reducer at that point is returned here.
    pub fn new<R: Reducer<State, Action> + 'static>(
        reducer: R,
        preloaded_state: Option<State>,
    ) -> Result<Self> {
        Self::create(Box::new(reducer), preloaded_state.map(Rc::new))
    }

    /// Create a new [Store], leaving its construction to `enhancer`.
    pub fn with_enhancer<R, E>(
        reducer: R,
        preloaded_state: Option<State>,
        enhancer: E,
    ) -> Result<Self>
    where
        R: Reducer<State, Action> + 'static,
        E: StoreEnhancer<State, Action>,
    {
        enhancer.enhance(
            Box::new(reducer),
            preloaded_state.map(Rc::new),
            Self::create,
        )
    }

    /// The plain store constructor, without any enhancer. This is the
    /// `create_store` function passed to [StoreEnhancer::enhance()].
    pub fn create(
        reducer: BoxedReducer<State, Action>,
        preloaded_state: Option<Rc<State>>,
    ) -> Result<Self> {
        let reducer: Rc<dyn Reducer<State, Action>> = Rc::from(reducer);
        let init = Action::from(LifecycleAction::Init);
        let state = reduce_root(&*reducer, preloaded_state.as_ref(), &init)?;

        Ok(Self(Rc::new_cyclic(|this| Store {
            dispatch_lock: RefCell::new(()),
            reducer: RefCell::new(reducer),
            state: RefCell::new(state),
            listeners: RefCell::new(ListenerRegistry::new()),
            this: this.clone(),
        })))
    }
}

impl<State, Action> StoreRef<State, Action> {
    /// A weak reference to the store, for use in listeners and
    /// reducers which need to call back into it.
    pub fn downgrade(&self) -> Weak<Store<State, Action>> {
        Rc::downgrade(&self.0)
    }
}

impl<State, Action> Clone for StoreRef<State, Action> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<State, Action> Deref for StoreRef<State, Action> {
    type Target = Store<State, Action>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<State, Action> PartialEq for StoreRef<State, Action> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// This struct is designed to operate as the single source of truth
/// for the state of your application.
///
/// The current state of this store ([Store::state()]) can only be
/// modified by dispatching an `Action` via [Store::dispatch()] to the
/// store. These actions are taken by the [Reducer] which you provided
/// to the store (at construction) and a new current state is
/// produced. Listeners subscribed with [Store::subscribe()] are
/// notified after every dispatch.
///
/// While the reducer is running, the store rejects every call made
/// back into it: reading the state, subscribing, unsubscribing,
/// replacing the reducer and dispatching all fail.
pub struct Store<State, Action> {
    /// Held for the duration of a reducer call, to detect re-entrant
    /// calls.
    dispatch_lock: RefCell<()>,
    reducer: RefCell<Rc<dyn Reducer<State, Action>>>,
    /// The current state of this store.
    state: RefCell<Rc<State>>,
    /// The listeners which are notified after every dispatch.
    listeners: RefCell<ListenerRegistry>,
    this: Weak<Store<State, Action>>,
}

impl<State, Action> Store<State, Action>
where
    State: 'static,
    Action: StoreAction + 'static,
{
    fn is_dispatching(&self) -> bool {
        self.dispatch_lock.try_borrow().is_err()
    }

    /// Get the current `State` stored in this store.
    ///
    /// Modifications to this state need to be performed by
    /// dispatching an `Action` to the store using
    /// [dispatch()](Store::dispatch()).
    pub fn state(&self) -> Result<Rc<State>> {
        if self.is_dispatching() {
            return Err(StoreError::ReentrantRead);
        }

        Ok(self.state.borrow().clone())
    }

    /// Dispatch an `Action` to be passed to the [Reducer] in order to
    /// produce the next `State` of this store, and then notify the
    /// store listeners. Returns the action.
    ///
    /// The listeners notified are the ones subscribed when the
    /// reducer returned. Listeners subscribed or unsubscribed while
    /// they are being notified only take part in the next dispatch.
    ///
    /// If the reducer fails, the state is left unchanged, the
    /// listeners are not notified and the error is returned.
    pub fn dispatch<A: Into<Action>>(&self, action: A) -> Result<Action> {
        self.dispatch_impl(action.into())
    }

    /// Dispatch an action which arrived as an untyped value, for
    /// example over a wire. The value must be a plain record with a
    /// `type` field which can be read as an `Action`.
    pub fn dispatch_value(&self, value: Value) -> Result<Action>
    where
        Action: DeserializeOwned,
    {
        self.dispatch_impl(action_from_value(value)?)
    }

    /// Concrete version of [Store::dispatch()], to avoid generating
    /// a copy of this function per type that implements
    /// `Into<Action>`.
    fn dispatch_impl(&self, action: Action) -> Result<Action> {
        if action.action_type().is_none() {
            return Err(StoreError::MissingActionType);
        }

        {
            // Released when this scope ends, whether the reducer
            // succeeded or not.
            let _lock = self
                .dispatch_lock
                .try_borrow_mut()
                .map_err(|_| StoreError::NestedDispatch)?;

            log::trace!(
                "dispatching {}",
                describe_action_type(action.action_type())
            );

            let reducer = self.reducer.borrow().clone();
            let state = self.state.borrow().clone();
            let next_state = reduce_root(&*reducer, Some(&state), &action)?;
            *self.state.borrow_mut() = next_state;
        }

        let listeners = self.listeners.borrow_mut().snapshot();
        listeners.notify();

        Ok(action)
    }

    /// Subscribe a listener, which is called after every
    /// [dispatch()](Store::dispatch()).
    ///
    /// Subscribing the same callback twice creates two independent
    /// subscriptions, each of which has to be unsubscribed.
    ///
    /// The store owns its listeners until they are unsubscribed. A
    /// listener which captures a [StoreRef] keeps the store alive, use
    /// [StoreRef::downgrade()] or a [Dispatcher] inside listeners.
    pub fn subscribe<L: Into<Callback>>(&self, listener: L) -> Result<Subscription> {
        if self.is_dispatching() {
            return Err(StoreError::ReentrantSubscribe);
        }

        let id = self.listeners.borrow_mut().add(listener.into());
        let host: Weak<dyn ListenerHost> = self.this.clone();
        Ok(Subscription::new(host, id))
    }

    /// Replace the reducer of this store, then dispatch the private
    /// `REPLACE` action so the new reducer can produce its state.
    pub fn replace_reducer<R: Reducer<State, Action> + 'static>(&self, reducer: R) -> Result<()> {
        if self.is_dispatching() {
            return Err(StoreError::ReentrantReplaceReducer);
        }

        *self.reducer.borrow_mut() = Rc::new(reducer);
        self.dispatch_impl(Action::from(LifecycleAction::Replace))?;
        Ok(())
    }

    /// A view of this store's state as a stream of values.
    pub fn observable(&self) -> StateObservable<State, Action> {
        StateObservable::new(self.this.clone())
    }

    /// A handle which dispatches actions to this store.
    pub fn dispatcher(&self) -> Dispatcher<State, Action> {
        Dispatcher {
            store: self.this.clone(),
        }
    }
}

impl<State, Action> ListenerHost for Store<State, Action>
where
    State: 'static,
    Action: StoreAction + 'static,
{
    fn remove_listener(&self, id: ListenerId) -> Result<()> {
        if self.is_dispatching() {
            return Err(StoreError::ReentrantUnsubscribe);
        }

        self.listeners.borrow_mut().remove(id);
        Ok(())
    }
}

/// A handle used to dispatch actions to a [Store], without keeping
/// the store alive.
pub struct Dispatcher<State, Action> {
    store: Weak<Store<State, Action>>,
}

impl<State, Action> Dispatcher<State, Action>
where
    State: 'static,
    Action: StoreAction + 'static,
{
    /// Dispatch an action to the store, see [Store::dispatch()].
    pub fn dispatch<A: Into<Action>>(&self, action: A) -> Result<Action> {
        let store = self.store.upgrade().ok_or(StoreError::StoreDropped)?;
        store.dispatch(action)
    }
}

impl<State, Action> Clone for Dispatcher<State, Action> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        combine_reducers, reducer_fn, Action, CombinedState, LifecycleAction, Reducer,
        ReducerMap, Reduction, Store, StoreAction, StoreError, StoreRef, Subscription,
    };
    use serde::Deserialize;
    use serde_json::json;
    use std::{
        cell::RefCell,
        rc::{Rc, Weak},
    };

    struct TestReducer;

    impl Reducer<i32, Action> for TestReducer {
        fn reduce(&self, state: Option<&Rc<i32>>, action: &Action) -> Reduction<i32> {
            let state = state.cloned().unwrap_or_else(|| Rc::new(0));
            Ok(Some(match action.action_type() {
                "INC" => Rc::new(*state + 1),
                "DEC" => Rc::new(*state - 1),
                "FAIL" => return Err(StoreError::reducer("asked to fail")),
                _ => state,
            }))
        }
    }

    type Handle = Rc<RefCell<Weak<Store<i32, Action>>>>;

    fn empty_handle() -> Handle {
        Rc::new(RefCell::new(Weak::new()))
    }

    /// A reducer which runs `reentrant` against its own store when it
    /// sees a "REENTER" action.
    fn reentrant_reducer<F>(handle: &Handle, reentrant: F) -> impl Reducer<i32, Action>
    where
        F: Fn(&Store<i32, Action>, &Rc<i32>) -> Reduction<i32> + 'static,
    {
        let handle = handle.clone();
        reducer_fn(move |state: Option<&Rc<i32>>, action: &Action| {
            let state = state.cloned().unwrap_or_else(|| Rc::new(0));
            let store = handle.borrow().upgrade();
            match (action.action_type(), store) {
                ("REENTER", Some(store)) => reentrant(&store, &state),
                _ => TestReducer.reduce(Some(&state), action),
            }
        })
    }

    fn counting_listener(store: &StoreRef<i32, Action>) -> (Rc<RefCell<Vec<i32>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_copy = seen.clone();
        let weak_store = store.downgrade();
        let subscription = store
            .subscribe(move || {
                if let Some(store) = weak_store.upgrade() {
                    seen_copy.borrow_mut().push(*store.state().unwrap());
                }
            })
            .unwrap();
        (seen, subscription)
    }

    #[test]
    fn initial_state_comes_from_the_init_action() {
        let store = StoreRef::new(TestReducer, None).unwrap();
        let expected = TestReducer
            .reduce(None, &LifecycleAction::Init.into())
            .unwrap()
            .unwrap();
        assert_eq!(store.state().unwrap(), expected);
    }

    #[test]
    fn preloaded_state_is_kept() {
        let store = StoreRef::new(TestReducer, Some(41)).unwrap();
        assert_eq!(*store.state().unwrap(), 41);
        store.dispatch(Action::new("INC")).unwrap();
        assert_eq!(*store.state().unwrap(), 42);
    }

    #[test]
    fn test_notify() {
        let store = StoreRef::new(TestReducer, None).unwrap();
        let (seen, _subscription) = counting_listener(&store);

        assert_eq!(0, *store.state().unwrap());

        store.dispatch(Action::new("INC")).unwrap();
        store.dispatch(Action::new("INC")).unwrap();
        assert_eq!(2, *store.state().unwrap());
        assert_eq!(*seen.borrow(), vec![1, 2]);

        store.dispatch(Action::new("DEC")).unwrap();
        assert_eq!(1, *store.state().unwrap());
    }

    #[test]
    fn dispatch_returns_the_action() {
        let store = StoreRef::new(TestReducer, None).unwrap();
        let action = Action::new("INC").with("source", "test");
        assert_eq!(store.dispatch(action.clone()), Ok(action));
    }

    #[test]
    fn listeners_are_notified_in_registration_order() {
        let store = StoreRef::new(TestReducer, None).unwrap();
        let order = Rc::new(RefCell::new(Vec::new()));

        for name in &["a", "b", "c"] {
            let order = order.clone();
            store
                .subscribe(move || order.borrow_mut().push(*name))
                .unwrap();
        }

        store.dispatch(Action::new("ANY")).unwrap();
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn subscription_changes_apply_to_the_next_dispatch() {
        let store = StoreRef::new(TestReducer, None).unwrap();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let subscription_b: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let subscription_c: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let listener_a = {
            let weak_store = store.downgrade();
            let calls = calls.clone();
            let subscription_b = subscription_b.clone();
            let subscription_c = subscription_c.clone();
            move || {
                calls.borrow_mut().push("a");
                if let Some(b) = subscription_b.borrow().as_ref() {
                    b.unsubscribe().unwrap();
                }
                if subscription_c.borrow().is_none() {
                    let calls = calls.clone();
                    let store = weak_store.upgrade().unwrap();
                    let c = store.subscribe(move || calls.borrow_mut().push("c")).unwrap();
                    *subscription_c.borrow_mut() = Some(c);
                }
            }
        };
        let listener_b = {
            let calls = calls.clone();
            move || calls.borrow_mut().push("b")
        };

        store.subscribe(listener_a).unwrap();
        *subscription_b.borrow_mut() = Some(store.subscribe(listener_b).unwrap());

        store.dispatch(Action::new("ANY")).unwrap();
        assert_eq!(*calls.borrow(), vec!["a", "b"]);

        calls.borrow_mut().clear();
        store.dispatch(Action::new("ANY")).unwrap();
        assert_eq!(*calls.borrow(), vec!["a", "c"]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let store = StoreRef::new(TestReducer, None).unwrap();
        let (seen, subscription) = counting_listener(&store);

        store.dispatch(Action::new("INC")).unwrap();
        assert!(subscription.is_active());
        subscription.unsubscribe().unwrap();
        subscription.unsubscribe().unwrap();
        assert!(!subscription.is_active());

        store.dispatch(Action::new("INC")).unwrap();
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn each_registration_is_removed_separately() {
        let store = StoreRef::new(TestReducer, None).unwrap();
        let calls = Rc::new(RefCell::new(0));
        let listener = {
            let calls = calls.clone();
            crate::Callback::new(move || *calls.borrow_mut() += 1)
        };

        let first = store.subscribe(listener.clone()).unwrap();
        let _second = store.subscribe(listener).unwrap();

        store.dispatch(Action::new("ANY")).unwrap();
        assert_eq!(*calls.borrow(), 2);

        first.unsubscribe().unwrap();
        store.dispatch(Action::new("ANY")).unwrap();
        assert_eq!(*calls.borrow(), 3);
    }

    #[test]
    fn weak_listeners_do_not_keep_the_store_alive() {
        let store = StoreRef::new(TestReducer, None).unwrap();
        let (seen, subscription) = counting_listener(&store);
        store.dispatch(Action::new("INC")).unwrap();
        assert_eq!(*seen.borrow(), vec![1]);

        let weak_store = store.downgrade();
        drop(store);
        assert!(weak_store.upgrade().is_none());

        // nothing left to remove from
        subscription.unsubscribe().unwrap();
        assert!(!subscription.is_active());
    }

    #[test]
    fn a_listener_may_dispatch() {
        let store = StoreRef::new(TestReducer, None).unwrap();
        let weak_store = store.downgrade();
        store
            .subscribe(move || {
                let store = weak_store.upgrade().unwrap();
                if *store.state().unwrap() < 3 {
                    store.dispatch(Action::new("INC")).unwrap();
                }
            })
            .unwrap();

        store.dispatch(Action::new("INC")).unwrap();
        assert_eq!(*store.state().unwrap(), 3);
    }

    #[test]
    fn nested_dispatch_caught_by_the_reducer() {
        let handle = empty_handle();
        let inner_result = Rc::new(RefCell::new(None));
        let inner_result_copy = inner_result.clone();

        let reducer = reentrant_reducer(&handle, move |store, state| {
            *inner_result_copy.borrow_mut() = Some(store.dispatch(Action::new("INC")));
            Ok(Some(Rc::new(**state + 10)))
        });
        let store = StoreRef::new(reducer, None).unwrap();
        *handle.borrow_mut() = store.downgrade();
        let (seen, _subscription) = counting_listener(&store);

        store.dispatch(Action::new("REENTER")).unwrap();

        assert_eq!(
            *inner_result.borrow(),
            Some(Err(StoreError::NestedDispatch))
        );
        assert_eq!(*store.state().unwrap(), 10);
        assert_eq!(*seen.borrow(), vec![10]);
    }

    #[test]
    fn nested_dispatch_propagated_by_the_reducer() {
        let handle = empty_handle();
        let reducer = reentrant_reducer(&handle, |store, _state| {
            store.dispatch(Action::new("INC"))?;
            Ok(None)
        });
        let store = StoreRef::new(reducer, Some(5)).unwrap();
        *handle.borrow_mut() = store.downgrade();
        let (seen, _subscription) = counting_listener(&store);

        assert_eq!(
            store.dispatch(Action::new("REENTER")),
            Err(StoreError::NestedDispatch)
        );
        assert_eq!(*store.state().unwrap(), 5);
        assert!(seen.borrow().is_empty());

        // the store is usable again
        store.dispatch(Action::new("INC")).unwrap();
        assert_eq!(*store.state().unwrap(), 6);
        assert_eq!(*seen.borrow(), vec![6]);
    }

    #[test]
    fn reducer_may_not_read_the_state() {
        let handle = empty_handle();
        let reducer = reentrant_reducer(&handle, |store, _state| {
            store.state()?;
            Ok(None)
        });
        let store = StoreRef::new(reducer, None).unwrap();
        *handle.borrow_mut() = store.downgrade();

        assert_eq!(
            store.dispatch(Action::new("REENTER")),
            Err(StoreError::ReentrantRead)
        );
    }

    #[test]
    fn reducer_may_not_subscribe() {
        let handle = empty_handle();
        let reducer = reentrant_reducer(&handle, |store, _state| {
            store.subscribe(|| {})?;
            Ok(None)
        });
        let store = StoreRef::new(reducer, None).unwrap();
        *handle.borrow_mut() = store.downgrade();

        assert_eq!(
            store.dispatch(Action::new("REENTER")),
            Err(StoreError::ReentrantSubscribe)
        );
    }

    #[test]
    fn reducer_may_not_unsubscribe() {
        let handle = empty_handle();
        let subscription: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let subscription_copy = subscription.clone();
        let reducer = reentrant_reducer(&handle, move |_store, state| {
            if let Some(subscription) = subscription_copy.borrow().as_ref() {
                subscription.unsubscribe()?;
            }
            Ok(Some(state.clone()))
        });
        let store = StoreRef::new(reducer, None).unwrap();
        *handle.borrow_mut() = store.downgrade();
        *subscription.borrow_mut() = Some(store.subscribe(|| {}).unwrap());

        assert_eq!(
            store.dispatch(Action::new("REENTER")),
            Err(StoreError::ReentrantUnsubscribe)
        );
        // still subscribed, and can be unsubscribed outside the reducer
        let subscription = subscription.borrow_mut().take().unwrap();
        assert!(subscription.is_active());
        subscription.unsubscribe().unwrap();
        assert!(!subscription.is_active());
    }

    #[test]
    fn reducer_may_not_replace_the_reducer() {
        let handle = empty_handle();
        let reducer = reentrant_reducer(&handle, |store, _state| {
            store.replace_reducer(TestReducer)?;
            Ok(None)
        });
        let store = StoreRef::new(reducer, None).unwrap();
        *handle.borrow_mut() = store.downgrade();

        assert_eq!(
            store.dispatch(Action::new("REENTER")),
            Err(StoreError::ReentrantReplaceReducer)
        );
    }

    #[test]
    fn failing_reducer_releases_the_store() {
        let store = StoreRef::new(TestReducer, None).unwrap();
        let (seen, _subscription) = counting_listener(&store);

        assert_eq!(
            store.dispatch(Action::new("FAIL")),
            Err(StoreError::Reducer("asked to fail".to_string()))
        );
        assert_eq!(*store.state().unwrap(), 0);
        assert!(seen.borrow().is_empty());

        store.dispatch(Action::new("INC")).unwrap();
        assert_eq!(*store.state().unwrap(), 1);
    }

    #[test]
    fn root_reducer_returning_nothing() {
        let reducer = reducer_fn(|state: Option<&Rc<i32>>, action: &Action| {
            match action.action_type() {
                "FORGET" => Ok(None),
                _ => Ok(Some(state.cloned().unwrap_or_else(|| Rc::new(0)))),
            }
        });
        let store = StoreRef::new(reducer, None).unwrap();

        assert_eq!(
            store.dispatch(Action::new("FORGET")),
            Err(StoreError::UndefinedRootState {
                action: "action of type \"FORGET\"".to_string()
            })
        );
        assert_eq!(*store.state().unwrap(), 0);
    }

    #[test]
    fn replace_reducer_dispatches_replace() {
        let store = StoreRef::new(TestReducer, Some(3)).unwrap();
        let seen_types = Rc::new(RefCell::new(Vec::new()));
        let seen_types_copy = seen_types.clone();

        let doubling = reducer_fn(move |state: Option<&Rc<i32>>, action: &Action| {
            seen_types_copy
                .borrow_mut()
                .push(action.action_type().to_string());
            let state = state.cloned().unwrap_or_else(|| Rc::new(1));
            Ok(Some(match action.action_type() {
                "INC" => Rc::new(*state * 2),
                _ => state,
            }))
        });
        let (notified, _subscription) = counting_listener(&store);

        store.replace_reducer(doubling).unwrap();
        assert_eq!(
            *seen_types.borrow(),
            vec![LifecycleAction::Replace.action_type().to_string()]
        );
        assert_eq!(*notified.borrow(), vec![3]);

        store.dispatch(Action::new("INC")).unwrap();
        assert_eq!(*store.state().unwrap(), 6);
    }

    #[test]
    fn replace_combined_reducer_rekeys_state() {
        let reducer = combine_reducers(ReducerMap::new().with("a", TestReducer));
        let store = StoreRef::new(reducer, None).unwrap();
        store.dispatch(Action::new("INC")).unwrap();

        let reducer = combine_reducers(
            ReducerMap::new()
                .with("a", TestReducer)
                .with("b", TestReducer),
        );
        store.replace_reducer(reducer).unwrap();

        let state = store.state().unwrap();
        assert_eq!(state.get::<i32>("a").as_deref(), Some(&1));
        assert_eq!(state.get::<i32>("b").as_deref(), Some(&0));
    }

    #[test]
    fn combined_reducer_errors_fail_construction() {
        let broken = reducer_fn(|_state: Option<&Rc<i32>>, _action: &Action| Ok(None));
        let reducer = combine_reducers(
            ReducerMap::new()
                .with("a", TestReducer)
                .with("b", broken),
        );

        let result = StoreRef::new(reducer, None);
        assert_eq!(
            result.err(),
            Some(StoreError::UninitializedReducer {
                key: "b".to_string()
            })
        );
    }

    #[test]
    fn combined_state_is_stable_through_the_store() {
        let reducer = combine_reducers(
            ReducerMap::new()
                .with("a", TestReducer)
                .with("b", TestReducer),
        );
        let store = StoreRef::new(reducer, Some(CombinedState::new().with("a", 5))).unwrap();

        let before = store.state().unwrap();
        assert_eq!(before.get::<i32>("a").as_deref(), Some(&5));
        assert_eq!(before.get::<i32>("b").as_deref(), Some(&0));

        store.dispatch(Action::new("NOTHING")).unwrap();
        assert!(Rc::ptr_eq(&before, &store.state().unwrap()));

        store.dispatch(Action::new("INC")).unwrap();
        let after = store.state().unwrap();
        assert!(!Rc::ptr_eq(&before, &after));
        assert_eq!(after.get::<i32>("a").as_deref(), Some(&6));
    }

    #[test]
    fn dispatch_value_checks_the_record() {
        let store = StoreRef::new(TestReducer, None).unwrap();

        assert_eq!(
            store.dispatch_value(json!({"type": "INC"})),
            Ok(Action::new("INC"))
        );
        assert_eq!(
            store.dispatch_value(json!(["INC"])),
            Err(StoreError::InvalidAction {
                kind: "array".to_string()
            })
        );
        assert_eq!(
            store.dispatch_value(json!({"payload": 1})),
            Err(StoreError::MissingActionType)
        );
        assert_eq!(*store.state().unwrap(), 1);
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    #[serde(tag = "type")]
    enum CounterAction {
        Increment,
        Add {
            amount: i32,
        },
        #[serde(skip)]
        Untyped,
        #[serde(skip)]
        Lifecycle(LifecycleAction),
    }

    impl From<LifecycleAction> for CounterAction {
        fn from(action: LifecycleAction) -> Self {
            CounterAction::Lifecycle(action)
        }
    }

    impl StoreAction for CounterAction {
        fn action_type(&self) -> Option<&str> {
            match self {
                CounterAction::Increment => Some("Increment"),
                CounterAction::Add { .. } => Some("Add"),
                CounterAction::Untyped => None,
                CounterAction::Lifecycle(action) => Some(action.action_type()),
            }
        }
    }

    struct TypedCounter;

    impl Reducer<i32, CounterAction> for TypedCounter {
        fn reduce(&self, state: Option<&Rc<i32>>, action: &CounterAction) -> Reduction<i32> {
            let state = state.cloned().unwrap_or_else(|| Rc::new(0));
            Ok(Some(match action {
                CounterAction::Increment => Rc::new(*state + 1),
                CounterAction::Add { amount } => Rc::new(*state + amount),
                _ => state,
            }))
        }
    }

    #[test]
    fn typed_actions() {
        let store = StoreRef::new(TypedCounter, None).unwrap();

        store.dispatch(CounterAction::Increment).unwrap();
        store
            .dispatch_value(json!({"type": "Add", "amount": 4}))
            .unwrap();
        assert_eq!(*store.state().unwrap(), 5);

        assert_eq!(
            store.dispatch(CounterAction::Untyped),
            Err(StoreError::MissingActionType)
        );
        assert!(matches!(
            store.dispatch_value(json!({"type": "Multiply"})),
            Err(StoreError::MalformedAction(_))
        ));
        assert_eq!(*store.state().unwrap(), 5);
    }

    #[test]
    fn dispatcher_outliving_the_store() {
        let store = StoreRef::new(TestReducer, None).unwrap();
        let dispatcher = store.dispatcher();

        dispatcher.dispatch(Action::new("INC")).unwrap();
        assert_eq!(*store.state().unwrap(), 1);

        drop(store);
        assert_eq!(
            dispatcher.dispatch(Action::new("INC")),
            Err(StoreError::StoreDropped)
        );
    }
}
