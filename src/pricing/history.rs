//! Recent-history selection
//!
//! The recent view shows a fixed window of the newest records, newest first.

/// Number of records shown in the recent view
pub const RECENT_WINDOW: usize = 5;

/// Last `n` items of an insertion-ordered slice, newest first
pub fn select_recent<T: Clone>(records: &[T], n: usize) -> Vec<T> {
    records.iter().rev().take(n).cloned().collect()
}

/// In-memory list of displayed records, bounded to a window
#[derive(Debug, Clone)]
pub struct RecentHistory<T> {
    window: usize,
    entries: Vec<T>,
}

impl<T: Clone> RecentHistory<T> {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            entries: Vec::with_capacity(window + 1),
        }
    }

    /// Build a history from items in insertion order (oldest first)
    pub fn from_oldest_first<I: IntoIterator<Item = T>>(window: usize, items: I) -> Self {
        let mut history = Self::new(window);
        for item in items {
            history.push(item);
        }
        history
    }

    /// Append the newest item, dropping anything that fell out of the window
    pub fn push(&mut self, item: T) {
        self.entries.push(item);
        if self.entries.len() > self.window {
            let excess = self.entries.len() - self.window;
            self.entries.drain(..excess);
        }
    }

    /// Newest first
    pub fn recent(&self) -> Vec<T> {
        select_recent(&self.entries, self.window)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl<T: Clone> Default for RecentHistory<T> {
    fn default() -> Self {
        Self::new(RECENT_WINDOW)
    }
}
