//! Build one [Reducer] for a [CombinedState] out of many independent
//! reducers, each owning the slice of the state stored under its
//! key.

use crate::{
    action::{is_init, is_replace, LifecycleAction, StoreAction},
    diagnostics,
    error::{describe_action_type, Result, StoreError},
    state::{CombinedState, Slice},
    Reducer, Reduction,
};
use indexmap::IndexMap;
use std::{
    any::type_name,
    cell::RefCell,
    collections::HashSet,
    fmt::Debug,
    marker::PhantomData,
    rc::Rc,
};

/// A [Reducer] for one slice of a [CombinedState], with the slice's
/// concrete type erased.
trait SliceReducer<Action> {
    fn reduce_slice(
        &self,
        key: &str,
        state: Option<&Slice>,
        action: &Action,
    ) -> Result<Option<Slice>>;
}

struct TypedSlice<State, R> {
    reducer: R,
    phantom_state: PhantomData<fn() -> State>,
}

impl<State, Action, R> SliceReducer<Action> for TypedSlice<State, R>
where
    State: 'static,
    R: Reducer<State, Action>,
{
    fn reduce_slice(
        &self,
        key: &str,
        state: Option<&Slice>,
        action: &Action,
    ) -> Result<Option<Slice>> {
        let state = match state {
            Some(slice) => Some(slice.clone().downcast::<State>().map_err(|_| {
                StoreError::SliceTypeMismatch {
                    key: key.to_string(),
                    expected: type_name::<State>(),
                }
            })?),
            None => None,
        };

        let next = self.reducer.reduce(state.as_ref(), action)?;
        Ok(next.map(|next| next as Slice))
    }
}

/// Reference equality of two slices, ignoring the vtable.
fn same_slice(a: &Slice, b: &Slice) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

/// The reducers to be combined with [combine_reducers()], by key.
///
/// Keys keep the order in which they were first inserted, which is
/// the order the combined reducer calls them in. Inserting a key
/// again replaces its reducer.
pub struct ReducerMap<Action> {
    reducers: IndexMap<String, Option<Box<dyn SliceReducer<Action>>>>,
}

impl<Action> ReducerMap<Action> {
    pub fn new() -> Self {
        Self {
            reducers: IndexMap::new(),
        }
    }

    pub fn with<K, State, R>(mut self, key: K, reducer: R) -> Self
    where
        K: Into<String>,
        State: 'static,
        R: Reducer<State, Action> + 'static,
    {
        self.insert(key, reducer);
        self
    }

    pub fn insert<K, State, R>(&mut self, key: K, reducer: R)
    where
        K: Into<String>,
        State: 'static,
        R: Reducer<State, Action> + 'static,
    {
        self.insert_optional(key, Some(reducer));
    }

    /// Insert an entry which may have no reducer. Such entries are
    /// dropped by [combine_reducers()].
    pub fn insert_optional<K, State, R>(&mut self, key: K, reducer: Option<R>)
    where
        K: Into<String>,
        State: 'static,
        R: Reducer<State, Action> + 'static,
    {
        let reducer = reducer.map(|reducer| {
            Box::new(TypedSlice {
                reducer,
                phantom_state: PhantomData,
            }) as Box<dyn SliceReducer<Action>>
        });
        self.reducers.insert(key.into(), reducer);
    }

    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<Action> Default for ReducerMap<Action> {
    fn default() -> Self {
        Self::new()
    }
}

/// A [Reducer] composed of multiple reducers, each owning one key
/// of a [CombinedState]. Created with [combine_reducers()].
pub struct CombinedReducer<Action> {
    reducers: IndexMap<String, Box<dyn SliceReducer<Action>>>,
    /// The result of checking the reducers when they were combined,
    /// raised on every call.
    shape_error: Option<StoreError>,
    /// Unexpected state keys which have already been warned about.
    unexpected_key_cache: RefCell<HashSet<String>>,
}

/// Combine a [ReducerMap] into a single [CombinedReducer].
///
/// Every reducer is probed once here, with the `INIT` action and with
/// an action of a random type, to check that it produces an initial
/// state and does not handle unknown actions by returning nothing. A
/// failure is not raised here: it is stored and raised each time the
/// combined reducer is called.
///
/// On each call the action is sent to every reducer in key order. If
/// no slice reducer returned a different [Rc] than it was given, the
/// previous [CombinedState] is returned as is, otherwise a new one is
/// built.
///
/// ```
/// use reactive_store::{combine_reducers, reducer_fn, Action, ReducerMap, StoreRef};
/// use std::rc::Rc;
///
/// let counter = reducer_fn(|state: Option<&Rc<i32>>, action: &Action| {
///     let state = state.cloned().unwrap_or_else(|| Rc::new(0));
///     Ok(Some(match action.action_type() {
///         "INC" => Rc::new(*state + 1),
///         _ => state,
///     }))
/// });
/// let todos = reducer_fn(|state: Option<&Rc<Vec<String>>>, action: &Action| {
///     let state = state.cloned().unwrap_or_default();
///     Ok(Some(match action.action_type() {
///         "ADD_TODO" => {
///             let mut todos = (*state).clone();
///             todos.push("todo".to_string());
///             Rc::new(todos)
///         }
///         _ => state,
///     }))
/// });
///
/// let reducer = combine_reducers(ReducerMap::new().with("counter", counter).with("todos", todos));
/// let store = StoreRef::new(reducer, None).unwrap();
/// store.dispatch(Action::new("INC")).unwrap();
///
/// let state = store.state().unwrap();
/// assert_eq!(state.get::<i32>("counter").as_deref(), Some(&1));
/// assert_eq!(state.get::<Vec<String>>("todos").map(|todos| todos.len()), Some(0));
/// ```
pub fn combine_reducers<Action: StoreAction>(
    reducer_map: ReducerMap<Action>,
) -> CombinedReducer<Action> {
    let mut reducers = IndexMap::with_capacity(reducer_map.len());

    for (key, reducer) in reducer_map.reducers {
        match reducer {
            Some(reducer) => {
                reducers.insert(key, reducer);
            }
            None => diagnostics::warning(format_args!("no reducer provided for key \"{}\"", key)),
        }
    }

    let shape_error = assert_reducer_shape(&reducers).err();

    CombinedReducer {
        reducers,
        shape_error,
        unexpected_key_cache: RefCell::new(HashSet::new()),
    }
}

/// Check that every reducer produces an initial state when given no
/// state, both for the `INIT` action and for an action type it
/// cannot know about.
fn assert_reducer_shape<Action: StoreAction>(
    reducers: &IndexMap<String, Box<dyn SliceReducer<Action>>>,
) -> Result<()> {
    for (key, reducer) in reducers {
        let init = Action::from(LifecycleAction::Init);
        if reducer.reduce_slice(key, None, &init)?.is_none() {
            return Err(StoreError::UninitializedReducer { key: key.clone() });
        }

        let probe = Action::from(LifecycleAction::probe_unknown_action());
        if reducer.reduce_slice(key, None, &probe)?.is_none() {
            return Err(StoreError::UnknownActionHandling { key: key.clone() });
        }
    }

    Ok(())
}

impl<Action> CombinedReducer<Action> {
    /// The keys of the combined reducers, in the order they are
    /// called.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.reducers.keys().map(String::as_str)
    }
}

impl<Action: StoreAction> CombinedReducer<Action> {
    fn warn_unexpected_state_shape(&self, state: &CombinedState, action: &Action) {
        if self.reducers.is_empty() {
            diagnostics::warning(
                "the store does not have a valid reducer, make sure the reducer map \
                 passed to combine_reducers() contains at least one reducer",
            );
            return;
        }

        let action_type = action.action_type();
        let argument_name = if action_type.map_or(false, is_init) {
            "the preloaded state passed to the store"
        } else {
            "the previous state received by the reducer"
        };

        let unexpected_keys: Vec<&str> = {
            let mut cache = self.unexpected_key_cache.borrow_mut();
            state
                .keys()
                .filter(|key| !self.reducers.contains_key(*key))
                .filter(|key| cache.insert(key.to_string()))
                .collect()
        };

        if action_type.map_or(false, is_replace) || unexpected_keys.is_empty() {
            return;
        }

        let expected_keys: Vec<&str> = self.keys().collect();
        diagnostics::warning(format_args!(
            "unexpected {} \"{}\" found in {}, expected to find one of the known reducer keys \
             instead: \"{}\", unexpected keys will be ignored",
            if unexpected_keys.len() > 1 { "keys" } else { "key" },
            unexpected_keys.join("\", \""),
            argument_name,
            expected_keys.join("\", \""),
        ));
    }

    #[cfg(test)]
    fn warned_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.unexpected_key_cache.borrow().iter().cloned().collect();
        keys.sort();
        keys
    }
}

impl<Action: StoreAction> Reducer<CombinedState, Action> for CombinedReducer<Action> {
    fn reduce(
        &self,
        state: Option<&Rc<CombinedState>>,
        action: &Action,
    ) -> Reduction<CombinedState> {
        if let Some(error) = &self.shape_error {
            return Err(error.clone());
        }

        let state = state.cloned().unwrap_or_default();

        if diagnostics::enabled() {
            self.warn_unexpected_state_shape(&state, action);
        }

        let mut has_changed = false;
        let mut next_state = CombinedState::with_capacity(self.reducers.len());

        for (key, reducer) in &self.reducers {
            let previous = state.slice(key);
            let next = reducer
                .reduce_slice(key, previous, action)?
                .ok_or_else(|| StoreError::UndefinedReducerOutput {
                    key: key.clone(),
                    action: describe_action_type(action.action_type()),
                })?;

            has_changed = has_changed
                || !previous.map_or(false, |previous| same_slice(previous, &next));
            next_state.insert_slice(key.clone(), next);
        }

        Ok(Some(if has_changed { Rc::new(next_state) } else { state }))
    }
}

impl<Action> Debug for CombinedReducer<Action> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("keys", &self.reducers.keys().collect::<Vec<_>>())
            .field("shape_error", &self.shape_error)
            .finish()
    }
}
