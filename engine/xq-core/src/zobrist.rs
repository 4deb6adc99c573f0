//! Zobrist hashing tables.
//!
//! Keys are drawn from a seeded ChaCha20 stream so tables are
//! reproducible across runs and processes. The position hash is the XOR
//! over occupied squares of `key[color][type][square]`, XOR the side key
//! when BLACK is to move; `GameState` maintains it incrementally in O(1)
//! per apply/undo.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::board::{Color, PieceType, NUM_PIECE_TYPES, NUM_SQUARES};

/// Default table seed. Kept fixed so test positions hash identically
/// everywhere; override with [`Zobrist::with_seed`] when isolation
/// between hash spaces is needed.
pub const DEFAULT_SEED: u64 = 20251031;

/// Random key tables for incremental position hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zobrist {
    // keys[color][type 1..=7][square]; index 0 of the type axis unused
    keys: Box<[[[u64; NUM_SQUARES]; NUM_PIECE_TYPES + 1]; 2]>,
    side_key: u64,
}

impl Zobrist {
    /// Table generated from [`DEFAULT_SEED`].
    pub fn new() -> Zobrist {
        Zobrist::with_seed(DEFAULT_SEED)
    }

    /// Table generated from an explicit seed.
    pub fn with_seed(seed: u64) -> Zobrist {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut keys = Box::new([[[0u64; NUM_SQUARES]; NUM_PIECE_TYPES + 1]; 2]);
        for color in keys.iter_mut() {
            for pt in color.iter_mut().skip(1) {
                for key in pt.iter_mut() {
                    *key = rng.gen();
                }
            }
        }
        let side_key = rng.gen();
        Zobrist { keys, side_key }
    }

    /// Key for a piece of `color` and type `pt` standing on `sq`.
    #[inline]
    pub fn piece_key(&self, color: Color, pt: PieceType, sq: usize) -> u64 {
        self.keys[color.index()][pt.id() as usize][sq]
    }

    /// Key XORed in when BLACK is to move.
    #[inline]
    pub fn side_key(&self) -> u64 {
        self.side_key
    }
}

impl Default for Zobrist {
    fn default() -> Self {
        Zobrist::new()
    }
}
