//! The data-source contract and its change-event protocol.
//!
//! A [`ListDataSource`] is the single origin of change for a bound list. It pushes
//! [`ChangeEvent`]s synchronously into every subscribed [`Observer`], on the thread that mutated
//! it, without buffering. Observers may call back into [`ListDataSource::len`] and
//! [`ListDataSource::get`] while handling an event, so implementations must not hold internal
//! borrows across delivery. [`ObserverSet`] takes care of the bookkeeping.
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use crate::error::SourceError;

/// Lifecycle of a data source. List widgets mirror it but never drive it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SourceState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// No more items will arrive (e.g. the last page of a paginated source was loaded).
    Exhausted,
    Failed,
}

/// A mutation notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeEvent<T> {
    /// Contents were replaced wholesale; observers should rebuild from `len`/`get`.
    Reset,
    /// `items` were pushed to the end. They now occupy `len() - items.len()..len()`.
    Appended { items: Vec<T> },
    /// Positions in `range` now hold `items`, in order.
    Replaced { range: Range<usize>, items: Vec<T> },
    Updated { index: usize, item: T },
    Failed { error: SourceError },
    State(SourceState),
}

impl<T> ChangeEvent<T> {
    /// Number of items carried by an `Appended` event; zero for every other kind.
    pub fn appended_count(&self) -> usize {
        match self {
            Self::Appended { items } => items.len(),
            _ => 0,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Appended { .. } => "appended",
            Self::Replaced { .. } => "replaced",
            Self::Updated { .. } => "updated",
            Self::Failed { .. } => "failed",
            Self::State(_) => "state",
        }
    }
}

/// Callback receiving one event per call.
pub type Observer<T> = Rc<dyn Fn(&ChangeEvent<T>)>;

/// Token returned by [`ListDataSource::subscribe`]. Pass it back to `unsubscribe` exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// An ordered, possibly unbounded collection that notifies observers about changes.
///
/// The source is owned by the caller. Widgets bound to it keep only a weak handle and must be
/// torn down (unsubscribed) before the source goes away; with `Rc`/`Weak` this is enforced for
/// free, since a dropped source simply has nobody left to notify.
pub trait ListDataSource {
    type Item;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetches the item at `index`. `None` inside `0..len()` is a hole (not yet loaded,
    /// evicted, ...) and is not an error.
    ///
    /// Plain lists remember which index each row came from, so later events still reach the
    /// right row. Windowed lists address rows by position: a hole shifts the rows after it until
    /// the window is reloaded with the hole filled.
    ///
    /// Expected to be cheap: list widgets call this while rendering.
    fn get(&self, index: usize) -> Option<Self::Item>;

    fn state(&self) -> SourceState;

    fn subscribe(&self, observer: Observer<Self::Item>) -> SubscriptionId;

    /// Removes a subscription. Returns `false` if `id` was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// Subscription bookkeeping for source implementations.
///
/// Keep it behind a `RefCell`, take a [`snapshot`](Self::snapshot), drop the borrow, then
/// [`dispatch`] the event.
pub struct ObserverSet<T> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Observer<T>)>,
}

impl<T> Default for ObserverSet<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for ObserverSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSet")
            .field("next_id", &self.next_id)
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<T> ObserverSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, observer: Observer<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    /// Order-preserving removal, so the remaining observers keep their delivery order.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        match self.entries.iter().position(|(e, _)| *e == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Observers in subscription order.
    pub fn snapshot(&self) -> Vec<Observer<T>> {
        self.entries.iter().map(|(_, o)| Rc::clone(o)).collect()
    }
}

/// Delivers `event` to each observer in order.
pub fn dispatch<T>(observers: &[Observer<T>], event: &ChangeEvent<T>) {
    for observer in observers {
        observer(event);
    }
}
