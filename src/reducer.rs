use crate::error::StoreError;
use std::rc::Rc;

/// The result of a [Reducer::reduce()].
///
/// `Ok(None)` means the reducer produced no state at all, which
/// breaks the reducer contract and is reported by the
/// [Store](crate::Store) and by [CombinedReducer](crate::CombinedReducer).
pub type Reduction<State> = Result<Option<Rc<State>>, StoreError>;

/// Using the [reduce()](Reducer::reduce()) method, implementors of
/// this trait take an `Action` submitted to a store via
/// [Store::dispatch()](crate::Store::dispatch()) and the current
/// `State`, and produce the next `State`.
///
/// A reducer must be pure, and must follow these rules:
///
/// + When `state` is `None` it returns its initial state, whatever the
///   action.
/// + For an action type it does not recognise it returns the `state`
///   it was given, the same [Rc], not an equal copy. Consumers detect
///   changes with [Rc::ptr_eq()].
/// + It never returns `Ok(None)`.
pub trait Reducer<State, Action> {
    fn reduce(&self, state: Option<&Rc<State>>, action: &Action) -> Reduction<State>;
}

/// A [Reducer] implemented by a closure. See [reducer_fn()].
pub struct ReducerFn<F>(F);

impl<State, Action, F> Reducer<State, Action> for ReducerFn<F>
where
    F: Fn(Option<&Rc<State>>, &Action) -> Reduction<State>,
{
    fn reduce(&self, state: Option<&Rc<State>>, action: &Action) -> Reduction<State> {
        (self.0)(state, action)
    }
}

/// Use a closure as a [Reducer].
///
/// ```
/// use reactive_store::{reducer_fn, Action, Reducer};
/// use std::rc::Rc;
///
/// let counter = reducer_fn(|state: Option<&Rc<i32>>, action: &Action| {
///     let state = state.cloned().unwrap_or_else(|| Rc::new(0));
///     Ok(Some(match action.action_type() {
///         "INC" => Rc::new(*state + 1),
///         _ => state,
///     }))
/// });
///
/// let state = counter.reduce(None, &Action::new("INC")).unwrap();
/// assert_eq!(state.as_deref(), Some(&1));
/// ```
pub fn reducer_fn<State, Action, F>(closure: F) -> ReducerFn<F>
where
    F: Fn(Option<&Rc<State>>, &Action) -> Reduction<State>,
{
    ReducerFn(closure)
}
