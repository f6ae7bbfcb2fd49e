use thiserror::Error;

/// Errors raised by a [Store](crate::Store), by a
/// [CombinedReducer](crate::CombinedReducer), or at the wire boundary
/// when converting untyped values into actions.
///
/// Every failure is raised synchronously to the direct caller. Nothing
/// in this crate retries or recovers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// [Store::state()](crate::Store::state()) was called from inside
    /// a reducer.
    #[error(
        "the store state may not be read while the reducer is executing, \
         the reducer has already received the state as an argument"
    )]
    ReentrantRead,

    /// [Store::subscribe()](crate::Store::subscribe()) was called from
    /// inside a reducer.
    #[error(
        "a listener may not be subscribed while the reducer is executing, \
         subscribe outside of the reducer and read the state in the listener"
    )]
    ReentrantSubscribe,

    /// [Subscription::unsubscribe()](crate::Subscription::unsubscribe())
    /// was called from inside a reducer.
    #[error("a listener may not be unsubscribed while the reducer is executing")]
    ReentrantUnsubscribe,

    /// A reducer tried to dispatch an action to its own store.
    #[error("reducers may not dispatch actions")]
    NestedDispatch,

    /// [Store::replace_reducer()](crate::Store::replace_reducer()) was
    /// called from inside a reducer.
    #[error("the reducer may not be replaced while the reducer is executing")]
    ReentrantReplaceReducer,

    /// An untyped action was not a plain record.
    #[error("actions must be plain records, instead the actual kind was: '{kind}'")]
    InvalidAction { kind: String },

    /// An action had no `type`.
    #[error(
        "actions may not have an undefined \"type\" property, \
         you may have misspelled an action type constant"
    )]
    MissingActionType,

    /// An untyped action could not be converted into the store's
    /// action type.
    #[error("the action could not be read as a store action: {0}")]
    MalformedAction(String),

    /// A slice reducer returned nothing when initialized with the
    /// `INIT` action.
    #[error(
        "the slice reducer for key \"{key}\" returned no state during initialization, \
         if the state passed to the reducer is missing you must explicitly return the initial state"
    )]
    UninitializedReducer { key: String },

    /// A slice reducer returned nothing when probed with a random,
    /// unknown action type.
    #[error(
        "the slice reducer for key \"{key}\" returned no state when probed with a random type, \
         do not handle the private \"@@reactive_store/*\" actions, \
         return the current state for any unknown action"
    )]
    UnknownActionHandling { key: String },

    /// A slice reducer returned nothing during a regular dispatch.
    #[error(
        "when called with {action}, the slice reducer for key \"{key}\" returned no state, \
         to ignore an action you must explicitly return the previous state"
    )]
    UndefinedReducerOutput { key: String, action: String },

    /// The root reducer of a store returned nothing.
    #[error("when called with {action}, the root reducer returned no state")]
    UndefinedRootState { action: String },

    /// A slice of a [CombinedState](crate::CombinedState) did not hold
    /// the type its reducer works with.
    #[error("the state stored under key \"{key}\" is not a {expected}")]
    SliceTypeMismatch { key: String, expected: &'static str },

    /// An application reducer failed.
    #[error("reducer failed: {0}")]
    Reducer(String),

    /// A [Dispatcher](crate::Dispatcher) or
    /// [StateObservable](crate::StateObservable) outlived its store.
    #[error("the store has been dropped")]
    StoreDropped,
}

impl StoreError {
    /// Raise a failure from inside an application reducer.
    pub fn reducer<S: Into<String>>(message: S) -> Self {
        StoreError::Reducer(message.into())
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Describe an action type for use in error messages: the quoted type,
/// or "an action" when the type is unknown.
pub(crate) fn describe_action_type(action_type: Option<&str>) -> String {
    match action_type {
        Some(action_type) => format!("action of type \"{}\"", action_type),
        None => "an action".to_string(),
    }
}
