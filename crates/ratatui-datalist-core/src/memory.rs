//! An in-memory [`ListDataSource`].
use std::cell::Cell;
use std::cell::RefCell;
use std::ops::Range;

use crate::error::SourceError;
use crate::source::ChangeEvent;
use crate::source::ListDataSource;
use crate::source::Observer;
use crate::source::ObserverSet;
use crate::source::SourceState;
use crate::source::SubscriptionId;
use crate::source::dispatch;

/// A `Vec`-backed source. Every mutation emits the matching [`ChangeEvent`].
///
/// Share it as `Rc<VecSource<T>>`; mutation goes through `&self`.
#[derive(Debug)]
pub struct VecSource<T> {
    items: RefCell<Vec<T>>,
    state: Cell<SourceState>,
    observers: RefCell<ObserverSet<T>>,
}

impl<T: Clone> Default for VecSource<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Clone> VecSource<T> {
    /// A ready source holding `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self::with_state(items, SourceState::Ready)
    }

    pub fn with_state(items: Vec<T>, state: SourceState) -> Self {
        Self {
            items: RefCell::new(items),
            state: Cell::new(state),
            observers: RefCell::new(ObserverSet::new()),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.borrow().len()
    }

    /// A copy of the current contents.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn push(&self, item: T) {
        self.extend([item]);
    }

    pub fn extend(&self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return;
        }
        self.items.borrow_mut().extend(items.iter().cloned());
        self.emit(ChangeEvent::Appended { items });
    }

    /// Overwrites positions starting at `range.start` with `items`. Positions past the end of
    /// `range` or of the source are dropped; the emitted event reports what was applied.
    pub fn replace(&self, range: Range<usize>, items: Vec<T>) {
        let applied: Vec<T> = {
            let mut current = self.items.borrow_mut();
            let end = range.end.min(current.len());
            let start = range.start.min(end);
            let applied: Vec<T> = items.into_iter().take(end - start).collect();
            for (slot, item) in current[start..].iter_mut().zip(applied.iter()) {
                *slot = item.clone();
            }
            applied
        };
        if applied.is_empty() {
            return;
        }
        let start = range.start;
        let end = start + applied.len();
        self.emit(ChangeEvent::Replaced {
            range: start..end,
            items: applied,
        });
    }

    /// Returns `false` (and emits nothing) when `index` is out of bounds.
    pub fn update(&self, index: usize, item: T) -> bool {
        {
            let mut current = self.items.borrow_mut();
            let Some(slot) = current.get_mut(index) else {
                return false;
            };
            *slot = item.clone();
        }
        self.emit(ChangeEvent::Updated { index, item });
        true
    }

    /// Replaces all contents and emits `Reset`.
    pub fn reset(&self, items: Vec<T>) {
        *self.items.borrow_mut() = items;
        self.emit(ChangeEvent::Reset);
    }

    /// Marks the source failed and emits `Failed`. Contents are kept.
    pub fn fail(&self, error: impl Into<SourceError>) {
        self.state.set(SourceState::Failed);
        self.emit(ChangeEvent::Failed {
            error: error.into(),
        });
    }

    pub fn set_state(&self, state: SourceState) {
        self.state.set(state);
        self.emit(ChangeEvent::State(state));
    }

    fn emit(&self, event: ChangeEvent<T>) {
        let observers = self.observers.borrow().snapshot();
        dispatch(&observers, &event);
    }
}

impl<T: Clone> ListDataSource for VecSource<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.items.borrow().len()
    }

    fn get(&self, index: usize) -> Option<T> {
        self.items.borrow().get(index).cloned()
    }

    fn state(&self) -> SourceState {
        self.state.get()
    }

    fn subscribe(&self, observer: Observer<T>) -> SubscriptionId {
        self.observers.borrow_mut().insert(observer)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.borrow_mut().remove(id)
    }
}
