use indexmap::IndexMap;
use std::{any::Any, fmt::Debug, rc::Rc};

/// A type-erased slice of a [CombinedState].
pub type Slice = Rc<dyn Any>;

/// The composite state produced by a
/// [CombinedReducer](crate::CombinedReducer): a record with one slice
/// per reducer key.
///
/// Each slice is owned by the reducer registered under its key and
/// can be read back with its concrete type using
/// [get()](CombinedState::get()).
///
/// ```
/// use reactive_store::CombinedState;
///
/// let state = CombinedState::new().with("counter", 3).with("name", "x".to_string());
/// assert_eq!(state.get::<i32>("counter").as_deref(), Some(&3));
/// assert!(state.get::<i32>("name").is_none());
/// ```
#[derive(Clone, Default)]
pub struct CombinedState {
    slices: IndexMap<String, Slice>,
}

impl CombinedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slices: IndexMap::with_capacity(capacity),
        }
    }

    /// Add a slice to this state, typically to build a preloaded
    /// state for a store.
    pub fn with<K: Into<String>, T: 'static>(mut self, key: K, value: T) -> Self {
        self.insert(key, Rc::new(value));
        self
    }

    pub fn insert<K: Into<String>, T: 'static>(&mut self, key: K, value: Rc<T>) {
        self.slices.insert(key.into(), value);
    }

    pub(crate) fn insert_slice(&mut self, key: String, slice: Slice) {
        self.slices.insert(key, slice);
    }

    /// Get the slice stored under `key`, if there is one and it is a
    /// `T`.
    pub fn get<T: 'static>(&self, key: &str) -> Option<Rc<T>> {
        self.slices.get(key)?.clone().downcast::<T>().ok()
    }

    /// Get the type-erased slice stored under `key`.
    pub fn slice(&self, key: &str) -> Option<&Slice> {
        self.slices.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.slices.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

impl Debug for CombinedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}
