use crate::model::ExpenseId;
use serde::Serialize;

/// What changed in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    Added(ExpenseId),
    Removed(Vec<ExpenseId>),
}

/// Delivered to listeners after every mutation of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreEvent {
    change: Change,
    /// False when the snapshot write failed. The in-memory change stands either way.
    persisted: bool,
}

impl StoreEvent {
    pub(super) fn new(change: Change, persisted: bool) -> Self {
        Self { change, persisted }
    }

    pub fn change(&self) -> &Change {
        &self.change
    }

    pub fn persisted(&self) -> bool {
        self.persisted
    }
}

/// Returned by `ExpenseStore::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// The registered listeners, called in the order they subscribed.
#[derive(Default)]
pub(super) struct Listeners {
    next: u64,
    listeners: Vec<(Subscription, Listener)>,
}

impl Listeners {
    pub(super) fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> Subscription {
        let subscription = Subscription(self.next);
        self.next += 1;
        self.listeners.push((subscription, Box::new(listener)));
        subscription
    }

    pub(super) fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(s, _)| *s != subscription);
        self.listeners.len() != before
    }

    pub(super) fn notify(&mut self, event: &StoreEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub(super) fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
