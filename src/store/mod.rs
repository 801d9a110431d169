//! The `ExpenseStore`: the authoritative in-memory set of expense records and its persisted
//! snapshot.
//!
//! The store is single threaded and synchronous. Every mutation rewrites the whole snapshot before
//! returning. Persistence is best effort: when a write fails the error is logged, the in-memory
//! change stands, and listeners are told the change was not persisted.

mod index;
mod observer;
mod query;
mod snapshot;

pub use observer::{Change, StoreEvent, Subscription};
pub use query::{ExpenseView, Query, SortKey};
pub use snapshot::{decode, encode, FileSnapshot, MemorySnapshot, Snapshot};

use crate::model::{Category, ExpenseId, ExpenseRecord};
use crate::Result;
use anyhow::{bail, Context};
use index::CategoryIndex;
use observer::Listeners;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt::{Debug, Formatter};
use tracing::{debug, error, trace, warn};

/// Holds the expense records, keeps them indexed by category, and keeps the snapshot in sync.
pub struct ExpenseStore {
    snapshot: Box<dyn Snapshot>,
    /// Records keyed by insertion sequence number, so iteration is in insertion order.
    records: BTreeMap<u64, ExpenseRecord>,
    ids: HashMap<ExpenseId, u64>,
    index: CategoryIndex,
    next_seq: u64,
    listeners: Listeners,
    /// Set when the snapshot holds bytes that could neither be loaded nor set aside. Writing
    /// would destroy them, so `save` refuses.
    protected: bool,
}

impl ExpenseStore {
    /// Opens a store on `snapshot`, reading whatever it holds.
    ///
    /// This never fails. A missing snapshot gives an empty store. A snapshot that cannot be read
    /// or decoded also gives an empty store; the failure is logged and the unreadable contents are
    /// handed to `Snapshot::set_aside` so the next write does not destroy them silently. When the
    /// contents cannot be read at all, or setting them aside fails, the store keeps working in
    /// memory but never writes to the snapshot.
    pub fn load(snapshot: impl Snapshot + 'static) -> Self {
        let mut store = Self {
            snapshot: Box::new(snapshot),
            records: BTreeMap::new(),
            ids: HashMap::new(),
            index: CategoryIndex::default(),
            next_seq: 0,
            listeners: Listeners::default(),
            protected: false,
        };
        store.reload();
        store
    }

    /// Replaces the in-memory records with whatever the snapshot holds.
    fn reload(&mut self) {
        self.records.clear();
        self.ids.clear();
        self.index.clear();

        let location = self.snapshot.describe();
        let contents = match self.snapshot.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!("No snapshot at {location}, starting with no expenses");
                return;
            }
            Err(e) => {
                error!(
                    "Unable to read the snapshot at {location}, starting with no expenses. \
                    Changes will not be saved: {e:#}"
                );
                self.protected = true;
                return;
            }
        };

        match decode(&contents) {
            Ok(records) => {
                for record in records {
                    let id = record.id();
                    if !self.insert(record) {
                        warn!("Ignoring a second expense with id {id} in the snapshot at {location}");
                    }
                }
                debug!("Loaded {} expenses from {location}", self.records.len());
            }
            Err(e) => {
                warn!("The snapshot at {location} is unreadable, starting with no expenses: {e:#}");
                if !snapshot::is_blank(&contents) {
                    if let Err(e) = self.snapshot.set_aside(&contents) {
                        error!(
                            "Unable to set aside the unreadable snapshot, changes will not be \
                            saved: {e:#}"
                        );
                        self.protected = true;
                    }
                }
            }
        }
    }

    /// Adds a record and persists the collection. Returns the record's id.
    ///
    /// A record whose id is already in the store is ignored.
    pub fn add(&mut self, record: ExpenseRecord) -> ExpenseId {
        let id = record.id();
        if !self.insert(record) {
            warn!("An expense with id {id} already exists, ignoring");
            return id;
        }
        trace!("Added expense {id}");
        let persisted = self.persist();
        self.listeners
            .notify(&StoreEvent::new(Change::Added(id), persisted));
        id
    }

    /// Removes every record whose id is in `ids` and persists the collection once. Unknown ids
    /// are ignored. Returns the removed records in insertion order.
    ///
    /// When nothing matched, nothing is written and listeners are not notified.
    pub fn remove<'a>(&mut self, ids: impl IntoIterator<Item = &'a ExpenseId>) -> Vec<ExpenseRecord> {
        let mut seqs: Vec<u64> = ids
            .into_iter()
            .filter_map(|id| self.ids.get(id).copied())
            .collect::<HashSet<u64>>()
            .into_iter()
            .collect();
        seqs.sort_unstable();

        let removed: Vec<ExpenseRecord> = seqs.into_iter().filter_map(|seq| self.take(seq)).collect();
        if removed.is_empty() {
            debug!("None of the given expenses exist, nothing to remove");
            return removed;
        }

        trace!("Removed {} expenses", removed.len());
        let persisted = self.persist();
        let ids = removed.iter().map(ExpenseRecord::id).collect();
        self.listeners
            .notify(&StoreEvent::new(Change::Removed(ids), persisted));
        removed
    }

    /// Removes the records at `offsets` in the view that `query` produces, as a list does when
    /// rows are swiped or multi-selected for deletion. Out of range offsets are ignored.
    pub fn remove_at(
        &mut self,
        query: &Query,
        offsets: impl IntoIterator<Item = usize>,
    ) -> Vec<ExpenseRecord> {
        let ids = self.query(query).ids_at(offsets);
        self.remove(&ids)
    }

    /// Returns the records whose category is in the query, in the query's order. Records that
    /// compare equal keep their insertion order.
    pub fn query(&self, query: &Query) -> ExpenseView<'_> {
        let mut seqs: Vec<u64> = query
            .categories()
            .iter()
            .flat_map(|category| self.index.seqs(category.as_str()))
            .collect();
        // Categories are disjoint, so sorting the sequence numbers restores insertion order
        seqs.sort_unstable();

        let mut records: Vec<&ExpenseRecord> =
            seqs.iter().filter_map(|seq| self.records.get(seq)).collect();
        query.order(&mut records);
        ExpenseView::new(records)
    }

    /// The number of records in `category`.
    pub fn count_by_category(&self, category: &str) -> usize {
        self.index.count(category)
    }

    /// Writes the whole collection to the snapshot.
    pub fn save(&mut self) -> Result<()> {
        if self.protected {
            bail!(
                "Not overwriting the snapshot at {}, it could not be read or backed up when the \
                store was opened",
                self.snapshot.describe()
            )
        }
        let contents = encode(self.records.values())?;
        self.snapshot
            .write(&contents)
            .with_context(|| format!("Unable to write the snapshot to {}", self.snapshot.describe()))
    }

    /// Registers `listener` to be called after every add or remove.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    /// Returns false if `subscription` was not registered.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.listeners.unsubscribe(subscription)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &ExpenseId) -> Option<&ExpenseRecord> {
        self.ids.get(id).and_then(|seq| self.records.get(seq))
    }

    /// All records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ExpenseRecord> {
        self.records.values()
    }

    /// The categories that currently hold at least one record.
    pub fn categories(&self) -> BTreeSet<&Category> {
        self.index.categories()
    }

    /// Best-effort save used after mutations.
    fn persist(&mut self) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                error!("The change was kept in memory but could not be saved: {e:#}");
                false
            }
        }
    }

    /// Returns false if the id is already present.
    fn insert(&mut self, record: ExpenseRecord) -> bool {
        if self.ids.contains_key(&record.id()) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.ids.insert(record.id(), seq);
        self.index.insert(record.category(), seq);
        self.records.insert(seq, record);
        true
    }

    fn take(&mut self, seq: u64) -> Option<ExpenseRecord> {
        let record = self.records.remove(&seq)?;
        self.ids.remove(&record.id());
        self.index.remove(record.category(), seq);
        Some(record)
    }
}

impl Debug for ExpenseStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpenseStore")
            .field("snapshot", &self.snapshot.describe())
            .field("records", &self.records.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
