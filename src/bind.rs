//! Wrap action creators so that calling them dispatches the action
//! they create.

use crate::{action::StoreAction, error::Result, Dispatcher};
use indexmap::IndexMap;
use std::rc::Rc;

/// An action creator bound to a store: [call()](BoundActionCreator::call())
/// creates an action and dispatches it.
pub struct BoundActionCreator<Args, State, Action> {
    creator: Rc<dyn Fn(Args) -> Action>,
    dispatcher: Dispatcher<State, Action>,
}

impl<Args, State, Action> BoundActionCreator<Args, State, Action>
where
    State: 'static,
    Action: StoreAction + 'static,
{
    /// Create the action from `args` and dispatch it. Returns whatever
    /// the dispatch returns.
    pub fn call(&self, args: Args) -> Result<Action> {
        self.dispatcher.dispatch((self.creator)(args))
    }
}

impl<Args, State, Action> Clone for BoundActionCreator<Args, State, Action> {
    fn clone(&self) -> Self {
        Self {
            creator: self.creator.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

/// Bind a single action creator to the store behind `dispatcher`.
pub fn bind_action_creator<Args, State, Action, F>(
    creator: F,
    dispatcher: &Dispatcher<State, Action>,
) -> BoundActionCreator<Args, State, Action>
where
    F: Fn(Args) -> Action + 'static,
{
    BoundActionCreator {
        creator: Rc::new(creator),
        dispatcher: dispatcher.clone(),
    }
}

/// A keyed collection of action creators, see [bind_action_creators()].
pub struct ActionCreators<Args, Action> {
    creators: IndexMap<String, Option<Rc<dyn Fn(Args) -> Action>>>,
}

impl<Args, Action> ActionCreators<Args, Action> {
    pub fn new() -> Self {
        Self {
            creators: IndexMap::new(),
        }
    }

    pub fn with<K, F>(mut self, key: K, creator: F) -> Self
    where
        K: Into<String>,
        F: Fn(Args) -> Action + 'static,
    {
        self.insert(key, creator);
        self
    }

    pub fn insert<K, F>(&mut self, key: K, creator: F)
    where
        K: Into<String>,
        F: Fn(Args) -> Action + 'static,
    {
        self.insert_optional(key, Some(creator));
    }

    /// Insert an entry which may have no creator. Such entries are
    /// left out by [bind_action_creators()].
    pub fn insert_optional<K, F>(&mut self, key: K, creator: Option<F>)
    where
        K: Into<String>,
        F: Fn(Args) -> Action + 'static,
    {
        let creator = creator.map(|creator| Rc::new(creator) as Rc<dyn Fn(Args) -> Action>);
        self.creators.insert(key.into(), creator);
    }
}

impl<Args, Action> Default for ActionCreators<Args, Action> {
    fn default() -> Self {
        Self::new()
    }
}

/// Action creators bound by [bind_action_creators()], under the keys
/// they were given.
pub struct BoundActionCreators<Args, State, Action> {
    bound: IndexMap<String, BoundActionCreator<Args, State, Action>>,
}

impl<Args, State, Action> BoundActionCreators<Args, State, Action> {
    pub fn get(&self, key: &str) -> Option<&BoundActionCreator<Args, State, Action>> {
        self.bound.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bound.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

/// Bind every action creator in `creators` to the store behind
/// `dispatcher`. Entries without a creator are left out, the others
/// keep their keys and order.
pub fn bind_action_creators<Args, State, Action>(
    creators: ActionCreators<Args, Action>,
    dispatcher: &Dispatcher<State, Action>,
) -> BoundActionCreators<Args, State, Action> {
    let bound = creators
        .creators
        .into_iter()
        .filter_map(|(key, creator)| {
            let creator = creator?;
            Some((
                key,
                BoundActionCreator {
                    creator,
                    dispatcher: dispatcher.clone(),
                },
            ))
        })
        .collect();

    BoundActionCreators { bound }
}
