//! Filter and sort parameters for reading the store, and the view a query produces.

use crate::model::{Category, ExpenseId, ExpenseRecord};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// The field a query sorts by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Sort by expense name.
    #[default]
    Name,
    /// Sort by expense amount.
    Amount,
}

serde_plain::derive_display_from_serialize!(SortKey);
serde_plain::derive_fromstr_from_deserialize!(SortKey);

impl SortKey {
    fn compare(self, a: &ExpenseRecord, b: &ExpenseRecord) -> Ordering {
        match self {
            SortKey::Name => a.name().cmp(b.name()),
            SortKey::Amount => a.amount().cmp(&b.amount()),
        }
    }
}

/// Which categories to include and how to order the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    categories: BTreeSet<Category>,
    sort: SortKey,
    ascending: bool,
}

impl Query {
    pub fn new<C>(categories: impl IntoIterator<Item = C>, sort: SortKey, ascending: bool) -> Self
    where
        C: Into<Category>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            sort,
            ascending,
        }
    }

    pub fn categories(&self) -> &BTreeSet<Category> {
        &self.categories
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn ascending(&self) -> bool {
        self.ascending
    }

    /// Sorts `records`, which must be in insertion order. The sort is stable in both directions,
    /// so records that compare equal keep their insertion order.
    pub(super) fn order(&self, records: &mut [&ExpenseRecord]) {
        let key = self.sort;
        if self.ascending {
            records.sort_by(|a, b| key.compare(a, b));
        } else {
            records.sort_by(|a, b| key.compare(b, a));
        }
    }
}

/// The ordered, read-only result of a query. It borrows the store, so the store cannot change
/// while a view is alive.
#[derive(Debug, Clone, Default)]
pub struct ExpenseView<'a> {
    records: Vec<&'a ExpenseRecord>,
}

impl<'a> ExpenseView<'a> {
    pub(super) fn new(records: Vec<&'a ExpenseRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, offset: usize) -> Option<&'a ExpenseRecord> {
        self.records.get(offset).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ExpenseRecord> + '_ {
        self.records.iter().copied()
    }

    /// Resolves list offsets, e.g. the rows selected for deletion, to record ids. Offsets past the
    /// end of the view are skipped.
    pub fn ids_at(&self, offsets: impl IntoIterator<Item = usize>) -> Vec<ExpenseId> {
        offsets
            .into_iter()
            .filter_map(|offset| self.get(offset))
            .map(ExpenseRecord::id)
            .collect()
    }

    pub fn to_vec(&self) -> Vec<ExpenseRecord> {
        self.iter().cloned().collect()
    }
}

impl<'a> IntoIterator for ExpenseView<'a> {
    type Item = &'a ExpenseRecord;
    type IntoIter = std::vec::IntoIter<&'a ExpenseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl Serialize for ExpenseView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in &self.records {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;

    fn record(name: &str, amount: &str) -> ExpenseRecord {
        ExpenseRecord::new(name, Category::personal(), amount.parse::<Amount>().unwrap())
    }

    #[test]
    fn test_sort_key_strings() {
        assert_eq!(SortKey::Amount.to_string(), "amount");
        assert_eq!("name".parse::<SortKey>().unwrap(), SortKey::Name);
        assert!("date".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_order_descending_is_stable() {
        let a = record("a", "5");
        let b = record("b", "10");
        let c = record("c", "5");
        let mut records = vec![&a, &b, &c];
        Query::new(["Personal"], SortKey::Amount, false).order(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_ids_at_skips_out_of_range() {
        let a = record("a", "1");
        let b = record("b", "2");
        let view = ExpenseView::new(vec![&a, &b]);
        assert_eq!(view.ids_at([1, 7, 0]), vec![b.id(), a.id()]);
    }

    #[test]
    fn test_view_serializes_as_array() {
        let a = record("a", "1");
        let view = ExpenseView::new(vec![&a]);
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["name"], "a");
    }
}
