use std::collections::VecDeque;
use std::fmt;

use crate::constants::MAX_HISTORY_ENTRIES;

use super::StateId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionReason {
    /// First state after initialization.
    Init,
    /// A state decided to move on.
    Condition,
    /// Requested from outside the state graph.
    Forced,
    NetworkSync,
    Rollback,
}

impl fmt::Display for TransitionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransitionReason::Init => "Init",
            TransitionReason::Condition => "Condition",
            TransitionReason::Forced => "Forced",
            TransitionReason::NetworkSync => "NetworkSync",
            TransitionReason::Rollback => "Rollback",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateHistoryEntry {
    /// `None` for the initial transition.
    pub from: Option<StateId>,
    pub to: StateId,
    pub tick: u64,
    pub reason: TransitionReason,
}

impl fmt::Display for StateHistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = self.from.map_or("None", StateId::name);
        write!(
            f,
            "[Tick {}] {} -> {} ({})",
            self.tick, from, self.to, self.reason
        )
    }
}

/// Bounded ring buffer of transitions; the oldest entry is evicted first.
#[derive(Clone, Debug)]
pub struct StateHistory {
    entries: VecDeque<StateHistoryEntry>,
    capacity: usize,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY_ENTRIES)
    }
}

impl StateHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: StateHistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StateHistoryEntry> {
        self.entries.iter()
    }

    /// Up to `n` entries, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &StateHistoryEntry> {
        self.entries.iter().rev().take(n)
    }

    pub fn last(&self) -> Option<&StateHistoryEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
