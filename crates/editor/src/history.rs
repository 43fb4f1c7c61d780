//! Bounded undo/redo over immutable snapshots.

use std::collections::VecDeque;
use std::sync::Arc;

/// Maximum number of retained snapshots, the seed included.
pub const HISTORY_LIMIT: usize = 50;

/// Snapshot list with a cursor. Index `cursor` is the current state.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<Arc<[T]>>,
    cursor: usize,
    limit: usize,
}

impl<T: Clone> History<T> {
    /// History whose only entry is `initial`, so the first commit can be undone.
    pub fn new(initial: &[T]) -> Self {
        Self::with_limit(initial, HISTORY_LIMIT)
    }

    pub fn with_limit(initial: &[T], limit: usize) -> Self {
        let mut entries = VecDeque::with_capacity(limit.min(HISTORY_LIMIT) + 1);
        entries.push_back(Arc::from(initial));
        Self {
            entries,
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record `state` as the newest snapshot, dropping any redo tail and
    /// evicting the oldest entry past the limit.
    pub fn commit(&mut self, state: &[T]) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(Arc::from(state));
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > self.limit {
            self.entries.pop_front();
            self.cursor -= 1;
            tracing::trace!(limit = self.limit, "Evicted oldest history entry");
        }
    }

    /// Step back. `None` at the oldest retained snapshot.
    pub fn undo(&mut self) -> Option<Arc<[T]>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Step forward. `None` when nothing was undone.
    pub fn redo(&mut self) -> Option<Arc<[T]>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn current(&self) -> Arc<[T]> {
        Arc::clone(&self.entries[self.cursor])
    }

    /// Replace everything with a single seed snapshot.
    pub fn reset(&mut self, initial: &[T]) {
        self.entries.clear();
        self.entries.push_back(Arc::from(initial));
        self.cursor = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seeded_history_undoes_first_commit() {
        let mut h: History<u32> = History::new(&[]);
        assert!(!h.can_undo());
        h.commit(&[1]);
        assert!(h.can_undo());
        assert_eq!(&*h.undo().unwrap(), &[] as &[u32]);
        assert!(h.undo().is_none());
        assert_eq!(&*h.redo().unwrap(), &[1]);
        assert!(h.redo().is_none());
    }

    #[test]
    fn test_commit_truncates_redo_tail() {
        let mut h = History::new(&[0]);
        h.commit(&[1]);
        h.commit(&[2]);
        h.undo();
        h.commit(&[3]);
        assert!(!h.can_redo());
        assert_eq!(h.len(), 3);
        assert_eq!(&*h.undo().unwrap(), &[1]);
    }

    #[test]
    fn test_eviction_keeps_limit() {
        let mut h = History::new(&[0u32]);
        for i in 1..=60u32 {
            h.commit(&[i]);
        }
        assert_eq!(h.len(), HISTORY_LIMIT);
        assert_eq!(h.cursor(), HISTORY_LIMIT - 1);

        let mut oldest = None;
        while let Some(s) = h.undo() {
            oldest = Some(s);
        }
        // 61 snapshots were pushed in total; the first 11 are gone
        assert_eq!(&*oldest.unwrap(), &[11]);
    }

    #[test]
    fn test_snapshots_are_shared_not_copied_on_read() {
        let mut h = History::new(&[String::from("a")]);
        h.commit(&[String::from("b")]);
        let a = h.current();
        let b = h.current();
        assert!(Arc::ptr_eq(&a, &b));
    }

    proptest! {
        #[test]
        fn prop_undo_all_then_redo_all_round_trips(commits in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 1..49)) {
            let mut h: History<u8> = History::new(&[]);
            for c in &commits {
                h.commit(c);
            }
            let last = h.current();
            let mut undone = 0;
            while h.undo().is_some() {
                undone += 1;
            }
            prop_assert_eq!(undone, commits.len());
            prop_assert_eq!(h.current().len(), 0);
            while h.redo().is_some() {}
            prop_assert_eq!(h.current(), last);
        }

        #[test]
        fn prop_length_never_exceeds_limit(n in 0usize..200, limit in 1usize..60) {
            let mut h = History::with_limit(&[0usize], limit);
            for i in 0..n {
                h.commit(&[i]);
                prop_assert!(h.len() <= limit);
                prop_assert_eq!(h.cursor(), h.len() - 1);
            }
        }
    }
}
