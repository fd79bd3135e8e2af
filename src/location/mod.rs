//! The shared fragment every machine on a page reads and writes.
//!
//! A [`Location`] wraps a [`HashStore`] and the list of mounted listeners.
//! Every write is followed by a hash-change notification delivered to all
//! listeners, whichever machine performed it.
//!
//! Notification dispatch does not nest. A write issued while listeners are
//! being notified (from a lifecycle hook, for example) is committed at once and
//! delivered as another round once the current one finishes, before the
//! outermost write returns.

mod store;

pub use store::{HashStore, HistoryMode, MemoryStore};

use crate::core::HashParams;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::debug;

/// Receiver of hash-change notifications.
pub trait HashChangeListener {
    fn hash_changed(&self);
}

/// Identifies a subscription so it can be removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Inner {
    store: RefCell<Box<dyn HashStore>>,
    listeners: RefCell<Vec<(ListenerId, Weak<dyn HashChangeListener>)>>,
    next_id: Cell<u64>,
    commits: Cell<u64>,
    dispatching: Cell<bool>,
    pending: Cell<bool>,
}

/// Shared handle to a page's fragment. Cloning shares the same fragment.
///
/// # Example
///
/// ```rust
/// use hashstate::core::HashParams;
/// use hashstate::location::{HistoryMode, Location};
///
/// let location = Location::with_fragment("#?yg-app=step1");
/// let mut params = location.params();
/// params.set("userId", "123");
/// location.write(&params, HistoryMode::Push);
///
/// assert_eq!(location.fragment(), "#?yg-app=step1&userId=123");
/// ```
#[derive(Clone)]
pub struct Location {
    inner: Rc<Inner>,
}

impl Location {
    pub fn new<S: HashStore + 'static>(store: S) -> Self {
        Self {
            inner: Rc::new(Inner {
                store: RefCell::new(Box::new(store)),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                commits: Cell::new(0),
                dispatching: Cell::new(false),
                pending: Cell::new(false),
            }),
        }
    }

    /// In-memory location with an empty fragment.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// In-memory location whose first entry holds `fragment`.
    pub fn with_fragment(fragment: &str) -> Self {
        Self::new(MemoryStore::with_fragment(fragment))
    }

    /// The raw current fragment.
    pub fn fragment(&self) -> String {
        self.inner.store.borrow().fragment()
    }

    /// The current fragment, decoded.
    pub fn params(&self) -> HashParams {
        HashParams::parse(&self.fragment())
    }

    /// Commit a full parameter set, then notify every listener.
    pub fn write(&self, params: &HashParams, mode: HistoryMode) {
        self.commit(params.to_fragment(), mode);
    }

    /// Replace the fragment as an outside actor would (address bar edit, plain
    /// anchor click), then notify every listener.
    pub fn set_fragment(&self, fragment: &str) {
        let fragment = if fragment.is_empty() || fragment.starts_with('#') {
            fragment.to_string()
        } else {
            format!("#{fragment}")
        };
        self.commit(fragment, HistoryMode::Push);
    }

    /// Step back one history entry. Notifies listeners when it moved.
    pub fn back(&self) -> bool {
        self.traverse(-1)
    }

    /// Step forward one history entry. Notifies listeners when it moved.
    pub fn forward(&self) -> bool {
        self.traverse(1)
    }

    pub fn history_len(&self) -> usize {
        self.inner.store.borrow().history_len()
    }

    /// Number of fragment commits performed through this location.
    pub fn commit_count(&self) -> u64 {
        self.inner.commits.get()
    }

    /// Number of listeners still alive.
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|(_, l)| l.strong_count() > 0)
            .count()
    }

    /// Raise a hash-change notification.
    pub fn notify(&self) {
        if self.inner.dispatching.replace(true) {
            self.inner.pending.set(true);
            return;
        }
        let _guard = DispatchGuard(&self.inner);

        loop {
            let listeners: Vec<_> = self
                .inner
                .listeners
                .borrow()
                .iter()
                .map(|(_, l)| l.clone())
                .collect();

            for listener in listeners.iter().filter_map(Weak::upgrade) {
                listener.hash_changed();
            }

            if !self.inner.pending.replace(false) {
                break;
            }
        }

        self.inner
            .listeners
            .borrow_mut()
            .retain(|(_, l)| l.strong_count() > 0);
    }

    /// Deliver future notifications to `listener` while it is alive.
    pub fn subscribe(&self, listener: Weak<dyn HashChangeListener>) -> ListenerId {
        let id = ListenerId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        // A dispatch in progress holds no borrow between listener calls.
        if let Ok(mut listeners) = self.inner.listeners.try_borrow_mut() {
            listeners.retain(|(lid, _)| *lid != id);
        }
    }

    fn commit(&self, fragment: String, mode: HistoryMode) {
        debug!(fragment = %fragment, ?mode, "committing fragment");
        self.inner.store.borrow_mut().commit(fragment, mode);
        self.inner.commits.set(self.inner.commits.get() + 1);
        self.notify();
    }

    fn traverse(&self, delta: isize) -> bool {
        let moved = self.inner.store.borrow_mut().traverse(delta);
        if moved {
            debug!(delta, fragment = %self.fragment(), "traversed history");
            self.notify();
        }
        moved
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Location")
            .field("fragment", &self.fragment())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

struct DispatchGuard<'a>(&'a Inner);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.dispatching.set(false);
        self.0.pending.set(false);
    }
}
