use crate::model::Category;
use std::collections::{BTreeSet, HashMap};

/// Maps each category to the insertion sequence numbers of its records.
///
/// Sequence numbers are assigned by the store in insertion order and never reused, so iterating
/// a category's set yields its records in insertion order.
#[derive(Debug, Clone, Default)]
pub(super) struct CategoryIndex {
    by_category: HashMap<Category, BTreeSet<u64>>,
}

impl CategoryIndex {
    pub(super) fn insert(&mut self, category: &Category, seq: u64) {
        self.by_category
            .entry(category.clone())
            .or_default()
            .insert(seq);
    }

    /// Removes `seq` from `category`. Categories with no records left are dropped.
    pub(super) fn remove(&mut self, category: &Category, seq: u64) {
        if let Some(seqs) = self.by_category.get_mut(category) {
            seqs.remove(&seq);
            if seqs.is_empty() {
                self.by_category.remove(category);
            }
        }
    }

    pub(super) fn count(&self, category: &str) -> usize {
        self.by_category.get(category).map_or(0, BTreeSet::len)
    }

    pub(super) fn seqs(&self, category: &str) -> impl Iterator<Item = u64> + '_ {
        self.by_category
            .get(category)
            .into_iter()
            .flat_map(|seqs| seqs.iter().copied())
    }

    /// The categories that currently hold at least one record, sorted.
    pub(super) fn categories(&self) -> BTreeSet<&Category> {
        self.by_category.keys().collect()
    }

    pub(super) fn clear(&mut self) {
        self.by_category.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_count_remove() {
        let business = Category::business();
        let personal = Category::personal();
        let mut index = CategoryIndex::default();
        index.insert(&business, 3);
        index.insert(&business, 1);
        index.insert(&personal, 2);

        assert_eq!(index.count("Business"), 2);
        assert_eq!(index.count("Personal"), 1);
        assert_eq!(index.count("Travel"), 0);
        assert_eq!(index.seqs("Business").collect::<Vec<_>>(), vec![1, 3]);

        index.remove(&personal, 2);
        assert_eq!(index.count("Personal"), 0);
        assert_eq!(index.categories(), BTreeSet::from([&business]));

        // Removing something that is not there does nothing
        index.remove(&personal, 2);
        index.remove(&business, 99);
        assert_eq!(index.count("Business"), 2);
    }
}
