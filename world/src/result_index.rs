use std::collections::HashMap;

use raindrop_core::DropId;

/// Maps each displayed result to the active drops sharing it, oldest first.
#[derive(Debug, Default)]
pub(crate) struct ResultIndex {
    buckets: HashMap<i32, Vec<DropId>>,
}

impl ResultIndex {
    pub(crate) fn insert(&mut self, result: i32, drop: DropId) {
        self.buckets.entry(result).or_default().push(drop);
    }

    /// Oldest active drop displaying `result`.
    pub(crate) fn first(&self, result: i32) -> Option<DropId> {
        self.buckets
            .get(&result)
            .and_then(|bucket| bucket.first().copied())
    }

    /// Removes `drop` from its bucket, dropping the bucket once empty.
    pub(crate) fn remove(&mut self, result: i32, drop: DropId) -> bool {
        let Some(bucket) = self.buckets.get_mut(&result) else {
            return false;
        };
        let Some(position) = bucket.iter().position(|entry| *entry == drop) else {
            return false;
        };

        let _ = bucket.remove(position);
        if bucket.is_empty() {
            let _ = self.buckets.remove(&result);
        }
        true
    }

    pub(crate) fn contains(&self, result: i32, drop: DropId) -> bool {
        self.buckets
            .get(&result)
            .is_some_and(|bucket| bucket.contains(&drop))
    }

    pub(crate) fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
    }
}

#[cfg(test)]
mod tests {
    use raindrop_core::PoolKind;

    use super::*;

    fn drop(slot: u32) -> DropId {
        DropId::new(PoolKind::Normal, slot)
    }

    #[test]
    fn first_returns_oldest_insertion() {
        let mut index = ResultIndex::default();
        index.insert(5, drop(3));
        index.insert(5, drop(1));
        assert_eq!(index.first(5), Some(drop(3)));

        assert!(index.remove(5, drop(3)));
        assert_eq!(index.first(5), Some(drop(1)));
    }

    #[test]
    fn empty_buckets_are_discarded() {
        let mut index = ResultIndex::default();
        index.insert(7, drop(0));
        assert!(index.remove(7, drop(0)));
        assert!(index.buckets.is_empty());
        assert_eq!(index.first(7), None);
    }

    #[test]
    fn removing_unknown_entries_is_rejected() {
        let mut index = ResultIndex::default();
        index.insert(7, drop(0));
        assert!(!index.remove(8, drop(0)));
        assert!(!index.remove(7, drop(1)));
        assert_eq!(index.len(), 1);
        assert!(index.contains(7, drop(0)));
    }
}
