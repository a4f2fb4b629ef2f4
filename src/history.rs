use crate::{
    icons::IconId,
    round::Bet,
};
use chrono::{
    DateTime,
    Utc,
};
use rand::Rng;
use serde::Serialize;
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 20;

const ENTRY_ID_LEN: usize = 9;
const ENTRY_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub round: u64,
    pub timestamp: DateTime<Utc>,
    pub bets: Vec<Bet>,
    pub winning_icon: IconId,
    pub payout: u64,
}

impl HistoryEntry {
    pub fn total_staked(&self) -> u64 {
        self.bets.iter().map(|bet| bet.amount).sum()
    }

    pub fn is_win(&self) -> bool {
        self.payout > 0
    }
}

/// Short base-36 token identifying a history entry.
pub fn entry_id(rng: &mut impl Rng) -> String {
    (0..ENTRY_ID_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ENTRY_ID_ALPHABET.len());
            ENTRY_ID_ALPHABET[idx] as char
        })
        .collect()
}

/// Completed rounds, most recent first, bounded by `capacity`.
#[derive(Clone, Debug)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl HistoryLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the evicted entry, if any.
    pub fn push(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}
