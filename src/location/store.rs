//! Fragment storage backends.

use serde::{Deserialize, Serialize};

/// How a fragment write enters the history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryMode {
    /// Add a new entry (user-visible transitions)
    Push,
    /// Overwrite the current entry (implicit initial values)
    Replace,
}

/// Storage for the current fragment and its history entries.
///
/// Commits never navigate: they only replace or add the fragment of the
/// current document. A browser binding implements this over the history API;
/// [`MemoryStore`] keeps everything in process.
pub trait HashStore {
    /// The fragment of the current entry, including the leading `#`.
    fn fragment(&self) -> String;

    /// Commit a fragment as a new or replacing history entry.
    fn commit(&mut self, fragment: String, mode: HistoryMode);

    /// Number of history entries.
    fn history_len(&self) -> usize;

    /// Move `delta` entries through the history. Returns whether the current
    /// entry changed.
    fn traverse(&mut self, delta: isize) -> bool;
}

/// In-process fragment history.
///
/// # Example
///
/// ```rust
/// use hashstate::location::{HashStore, HistoryMode, MemoryStore};
///
/// let mut store = MemoryStore::new();
/// store.commit("#?a=1".to_string(), HistoryMode::Push);
/// store.commit("#?a=2".to_string(), HistoryMode::Replace);
///
/// assert_eq!(store.fragment(), "#?a=2");
/// assert_eq!(store.history_len(), 2);
///
/// assert!(store.traverse(-1));
/// assert_eq!(store.fragment(), "");
/// ```
#[derive(Clone, Debug)]
pub struct MemoryStore {
    entries: Vec<String>,
    index: usize,
}

impl MemoryStore {
    /// Start with a single entry that has no fragment.
    pub fn new() -> Self {
        Self::with_fragment("")
    }

    /// Start with a single entry holding `fragment`.
    pub fn with_fragment(fragment: impl Into<String>) -> Self {
        Self {
            entries: vec![fragment.into()],
            index: 0,
        }
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HashStore for MemoryStore {
    fn fragment(&self) -> String {
        self.entries[self.index].clone()
    }

    fn commit(&mut self, fragment: String, mode: HistoryMode) {
        match mode {
            HistoryMode::Push => {
                self.entries.truncate(self.index + 1);
                self.entries.push(fragment);
                self.index += 1;
            }
            HistoryMode::Replace => self.entries[self.index] = fragment,
        }
    }

    fn history_len(&self) -> usize {
        self.entries.len()
    }

    fn traverse(&mut self, delta: isize) -> bool {
        let target = self.index as isize + delta;
        if delta == 0 || target < 0 || target as usize >= self.entries.len() {
            return false;
        }
        self.index = target as usize;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_has_empty_fragment() {
        let store = MemoryStore::new();
        assert_eq!(store.fragment(), "");
        assert_eq!(store.history_len(), 1);
    }

    #[test]
    fn push_adds_entry() {
        let mut store = MemoryStore::new();
        store.commit("#?a=1".into(), HistoryMode::Push);
        store.commit("#?a=2".into(), HistoryMode::Push);

        assert_eq!(store.fragment(), "#?a=2");
        assert_eq!(store.entries(), &["", "#?a=1", "#?a=2"]);
    }

    #[test]
    fn replace_overwrites_current_entry() {
        let mut store = MemoryStore::with_fragment("#?a=1");
        store.commit("#?a=9".into(), HistoryMode::Replace);

        assert_eq!(store.fragment(), "#?a=9");
        assert_eq!(store.history_len(), 1);
    }

    #[test]
    fn traverse_moves_within_bounds() {
        let mut store = MemoryStore::new();
        store.commit("#?a=1".into(), HistoryMode::Push);

        assert!(store.traverse(-1));
        assert_eq!(store.fragment(), "");
        assert!(!store.traverse(-1));
        assert!(store.traverse(1));
        assert_eq!(store.fragment(), "#?a=1");
        assert!(!store.traverse(1));
        assert!(!store.traverse(0));
    }

    #[test]
    fn push_after_back_drops_forward_entries() {
        let mut store = MemoryStore::new();
        store.commit("#?a=1".into(), HistoryMode::Push);
        store.commit("#?a=2".into(), HistoryMode::Push);
        store.traverse(-1);
        store.commit("#?b=1".into(), HistoryMode::Push);

        assert_eq!(store.entries(), &["", "#?a=1", "#?b=1"]);
        assert!(!store.traverse(1));
    }
}
