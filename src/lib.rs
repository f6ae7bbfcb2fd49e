//! A synchronous, single-threaded state container, similar to redux.
//!
//! A [Store] holds the current state of an application. The state is
//! only changed by dispatching actions, which a [Reducer] turns into
//! the next state, after which the store's listeners are notified.
//! Reducers for independent parts of the state can be combined into
//! one with [combine_reducers()].

mod action;
mod bind;
mod combine;
mod diagnostics;
pub mod enhancer;
mod error;
mod listener;
mod observable;
pub mod plain_record;
mod reducer;
mod state;
mod store;

pub use action::{is_init, is_replace, Action, LifecycleAction, StoreAction};
pub use bind::*;
pub use combine::{combine_reducers, CombinedReducer, ReducerMap};
pub use error::{Result, StoreError};
pub use listener::{Callback, Subscription};
pub use observable::{Observer, StateObservable};
pub use reducer::*;
pub use state::{CombinedState, Slice};
pub use store::{BoxedReducer, Dispatcher, Store, StoreRef};
