use std::collections::BTreeMap;

/// Restores sequence order over items that arrive out of order.
///
/// Worker threads finish frames at unpredictable times; clustering is
/// order-sensitive, so results wait here until every earlier sequence
/// number has been delivered.
pub struct ReorderBuffer<T> {
    next_seq: usize,
    pending: BTreeMap<usize, T>,
}

impl<T> ReorderBuffer<T> {
    pub fn new() -> Self {
        Self {
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Inserts an item and returns every item that is now deliverable,
    /// in sequence order. Usually empty or a single item; longer runs
    /// appear when a slow frame was holding back faster ones.
    pub fn push(&mut self, seq: usize, item: T) -> Vec<T> {
        debug_assert!(
            seq >= self.next_seq && !self.pending.contains_key(&seq),
            "sequence number delivered twice"
        );
        self.pending.insert(seq, item);

        let mut ready = Vec::new();
        while let Some(item) = self.pending.remove(&self.next_seq) {
            ready.push(item);
            self.next_seq += 1;
        }
        ready
    }

    /// Items still waiting on an earlier sequence number.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
