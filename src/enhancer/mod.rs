//! [StoreEnhancer]s take over the construction of a [Store](crate::Store),
//! to wrap its reducer, adjust its preloaded state, or attach listeners
//! before the store is handed out. This module also contains a simple
//! enhancer implementation which can be used as a utility in an
//! application.

#[cfg(feature = "simple_logger")]
pub mod simple_logger;

use crate::{error::Result, BoxedReducer, StoreRef};
use std::rc::Rc;

/// Creates a [Store](crate::Store) without any further enhancement, see
/// [StoreRef::create()].
pub type CreateStoreFn<State, Action> =
    fn(BoxedReducer<State, Action>, Option<Rc<State>>) -> Result<StoreRef<State, Action>>;

/// Used with [StoreRef::with_enhancer()] to customize how a store is
/// built.
pub trait StoreEnhancer<State, Action> {
    /// This method is invoked once by [StoreRef::with_enhancer()] with
    /// the reducer and preloaded state it was given. It is necessary to
    /// call the provided `create_store` function, which builds the
    /// store, usually with a reducer wrapping the given one. Whatever
    /// this method returns is returned from
    /// [StoreRef::with_enhancer()].
    ///
    /// A reducer wrapped here is not re-wrapped by
    /// [Store::replace_reducer()](crate::Store::replace_reducer()).
    fn enhance(
        self,
        reducer: BoxedReducer<State, Action>,
        preloaded_state: Option<Rc<State>>,
        create_store: CreateStoreFn<State, Action>,
    ) -> Result<StoreRef<State, Action>>;
}
