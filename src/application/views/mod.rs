//! View controllers. Each collects input, runs at most one call to the payment
//! service per submit and exposes what should be rendered.
//!
//! Submits take `&mut self`, so a view cannot start a second call while one is
//! pending. Dropping a pending submit discards its result and puts the view
//! back to where it was before the call.

pub mod balance;
pub mod confirm;
pub mod history;
pub mod initiate;
pub mod outcome;

use super::navigation::Route;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState<T> {
    #[default]
    Idle,
    Loading,
    Resolved(T),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            ViewState::Resolved(value) => Some(value),
            _ => None,
        }
    }
}

/// Publishes a view's state so a renderer can follow it.
pub struct ViewCell<T> {
    tx: watch::Sender<ViewState<T>>,
}

impl<T: Clone> ViewCell<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewState::Idle);
        Self { tx }
    }

    pub fn get(&self) -> ViewState<T> {
        self.tx.borrow().clone()
    }

    pub fn set(&self, state: ViewState<T>) {
        self.tx.send_replace(state);
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.tx.subscribe()
    }

    /// Switches to `Loading` until the returned guard drops. If nothing was
    /// resolved by then, the cell falls back to `Idle`.
    pub fn begin(&self) -> Loading<'_, T> {
        self.set(ViewState::Loading);
        Loading { cell: self }
    }
}

pub struct Loading<'a, T: Clone> {
    cell: &'a ViewCell<T>,
}

impl<T: Clone> Drop for Loading<'_, T> {
    fn drop(&mut self) {
        self.cell.tx.send_if_modified(|state| {
            if state.is_loading() {
                *state = ViewState::Idle;
                true
            } else {
                false
            }
        });
    }
}

/// Holds a view's busy flag up for as long as it lives.
pub(crate) struct Busy<'a>(&'a mut bool);

impl<'a> Busy<'a> {
    pub(crate) fn new(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

impl<T: Clone> Default for ViewCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of mounting a guarded view.
#[derive(Debug)]
pub enum Mount<V> {
    Rendered(V),
    Redirected(Route),
}

impl<V> Mount<V> {
    pub fn rendered(self) -> Option<V> {
        match self {
            Mount::Rendered(view) => Some(view),
            Mount::Redirected(_) => None,
        }
    }
}
