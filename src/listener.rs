use crate::error::Result;
use std::{
    cell::Cell,
    fmt::Debug,
    rc::{Rc, Weak},
};

/// A wrapper for a callback which is notified after every
/// [Store::dispatch()](crate::Store::dispatch()). The callback takes no
/// arguments, read the new state with
/// [Store::state()](crate::Store::state()).
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn()>);

impl Callback {
    pub fn new<C: Fn() + 'static>(closure: C) -> Self {
        Callback(Rc::new(closure))
    }

    pub fn emit(&self) {
        (self.0)()
    }
}

impl<C> From<C> for Callback
where
    C: Fn() + 'static,
{
    fn from(closure: C) -> Self {
        Callback(Rc::new(closure))
    }
}

impl Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Callback(@ {:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Identifies one registration of a [Callback] with a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ListenerId(u64);

#[derive(Clone)]
struct ListenerEntry {
    id: ListenerId,
    callback: Callback,
}

/// The listeners of a store.
///
/// `current` is the list handed out to the dispatch notifying
/// listeners, `next` absorbs subscribe and unsubscribe calls. While
/// both share one allocation the first mutation clones `next`, every
/// later mutation before the next snapshot is done in place.
pub(crate) struct ListenerRegistry {
    current: Rc<Vec<ListenerEntry>>,
    next: Rc<Vec<ListenerEntry>>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        let listeners = Rc::new(Vec::new());
        Self {
            current: listeners.clone(),
            next: listeners,
            next_id: 0,
        }
    }

    pub fn add(&mut self, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        Rc::make_mut(&mut self.next).push(ListenerEntry { id, callback });
        id
    }

    pub fn remove(&mut self, id: ListenerId) {
        if let Some(index) = self.next.iter().position(|entry| entry.id == id) {
            Rc::make_mut(&mut self.next).remove(index);
        }
    }

    /// Freeze the listeners to notify for a dispatch. Later changes
    /// to the registry do not affect the returned list.
    pub fn snapshot(&mut self) -> Snapshot {
        self.current = self.next.clone();
        Snapshot(self.current.clone())
    }

    #[cfg(test)]
    fn shares_lists(&self) -> bool {
        Rc::ptr_eq(&self.current, &self.next)
    }
}

/// The listeners registered when a dispatch began notifying.
pub(crate) struct Snapshot(Rc<Vec<ListenerEntry>>);

impl Snapshot {
    pub fn notify(&self) {
        for entry in self.0.iter() {
            entry.callback.emit();
        }
    }
}

/// Implemented by stores, so a [Subscription] can remove its listener
/// without knowing the store's `State` and `Action` types.
pub(crate) trait ListenerHost {
    fn remove_listener(&self, id: ListenerId) -> Result<()>;
}

/// A registration of a listener with a store, returned by
/// [Store::subscribe()](crate::Store::subscribe()).
///
/// Dropping a `Subscription` does not remove the listener, call
/// [unsubscribe()](Subscription::unsubscribe()).
pub struct Subscription {
    host: Weak<dyn ListenerHost>,
    id: ListenerId,
    active: Cell<bool>,
}

impl Subscription {
    pub(crate) fn new(host: Weak<dyn ListenerHost>, id: ListenerId) -> Self {
        Self {
            host,
            id,
            active: Cell::new(true),
        }
    }

    /// Remove the listener from the store. The listener is still
    /// notified by a dispatch which is already notifying listeners,
    /// but not by any later dispatch.
    ///
    /// Only the first call has an effect, later calls do nothing.
    /// Fails with [StoreError::ReentrantUnsubscribe](crate::StoreError::ReentrantUnsubscribe)
    /// when called from inside a reducer.
    pub fn unsubscribe(&self) -> Result<()> {
        if !self.active.get() {
            return Ok(());
        }

        if let Some(host) = self.host.upgrade() {
            host.remove_listener(self.id)?;
        }

        self.active.set(false);
        Ok(())
    }

    /// Whether [unsubscribe()](Subscription::unsubscribe()) has not been
    /// called successfully yet.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}
