//! Snapshot history with a movable cursor.

/// Linear undo/redo stack of full snapshots.
///
/// Never empty: the initial state is entry 0 and `cursor` always points at
/// the current snapshot. Committing after an undo drops the redo branch.
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    entries: Vec<T>,
    cursor: usize,
    limit: Option<usize>,
}

impl<T> HistoryStack<T> {
    pub fn new(initial: T) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            limit: None,
        }
    }

    /// Keep at most `limit` snapshots (at least one), evicting the oldest.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.map(|limit| limit.max(1));
        self.evict();
        self
    }

    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    /// Push a new snapshot and make it current. Returns how many old entries
    /// were evicted to honour the limit.
    pub fn commit(&mut self, snapshot: T) -> usize {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;
        self.evict()
    }

    fn evict(&mut self) -> usize {
        let Some(limit) = self.limit else {
            return 0;
        };
        let excess = self.entries.len().saturating_sub(limit);
        if excess > 0 {
            self.entries.drain(..excess);
            self.cursor = self.cursor.saturating_sub(excess);
        }
        excess
    }

    /// Step back one snapshot. `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Step forward one snapshot. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
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

    /// Drop every snapshot and start over from `initial`.
    pub fn reset(&mut self, initial: T) {
        self.entries.clear();
        self.entries.push(initial);
        self.cursor = 0;
    }
}
