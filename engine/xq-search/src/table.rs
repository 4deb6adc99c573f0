//! Transposition table.

use std::collections::HashMap;

use xq_core::Move;

/// How a stored score bounds the true value of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

/// One table entry, keyed externally by Zobrist hash.
#[derive(Debug, Clone, Copy)]
pub struct TtEntry {
    pub depth: u32,
    pub bound: Bound,
    pub score: i32,
    pub best: Option<Move>,
}

/// Zobrist-keyed score cache shared across searches of the same game.
/// Entries are replaced unconditionally; the newest search wins.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<u64, TtEntry>,
}

impl TranspositionTable {
    pub fn new() -> TranspositionTable {
        TranspositionTable::default()
    }

    #[inline]
    pub fn get(&self, hash: u64) -> Option<&TtEntry> {
        self.entries.get(&hash)
    }

    #[inline]
    pub fn put(&mut self, hash: u64, entry: TtEntry) {
        self.entries.insert(hash, entry);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
