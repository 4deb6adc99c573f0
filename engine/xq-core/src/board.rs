//! Board geometry and piece codes.
//!
//! The board is a 10-rank by 9-file grid stored rank-major:
//! `index = rank * 9 + file`, with rank 0 as RED's back rank. Squares
//! hold signed piece codes: the sign is the color (RED positive, BLACK
//! negative) and the magnitude is the piece type, zero meaning empty.
//! This keeps the board a flat `[i8; 90]` that copies cheaply and feeds
//! the tensor encoders directly.

/// Number of files (columns).
pub const FILES: usize = 9;
/// Number of ranks (rows).
pub const RANKS: usize = 10;
/// Total squares on the board.
pub const NUM_SQUARES: usize = FILES * RANKS; // 90

/// Side color. RED moves first and occupies ranks 0..=4 at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Sign convention used by piece codes: RED = +1, BLACK = -1.
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Color::Red => 1,
            Color::Black => -1,
        }
    }

    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }

    /// Table index: RED = 0, BLACK = 1.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Black => 1,
        }
    }
}

/// Piece type, numbered 1..=7 so that `color.sign() * (type as i8)` is
/// the board code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i8)]
pub enum PieceType {
    Pawn = 1,
    Cannon = 2,
    Knight = 3,
    Bishop = 4,
    Advisor = 5,
    Rook = 6,
    King = 7,
}

/// Number of piece types (types are indexed 1..=7).
pub const NUM_PIECE_TYPES: usize = 7;

impl PieceType {
    /// Numeric id in 1..=7.
    #[inline]
    pub fn id(self) -> i8 {
        self as i8
    }

    /// Decode from a numeric id in 1..=7.
    #[inline]
    pub fn from_id(id: i8) -> Option<PieceType> {
        match id {
            1 => Some(PieceType::Pawn),
            2 => Some(PieceType::Cannon),
            3 => Some(PieceType::Knight),
            4 => Some(PieceType::Bishop),
            5 => Some(PieceType::Advisor),
            6 => Some(PieceType::Rook),
            7 => Some(PieceType::King),
            _ => None,
        }
    }
}

/// Encode a piece as a signed board code.
#[inline]
pub fn make_piece(color: Color, pt: PieceType) -> i8 {
    color.sign() * pt.id()
}

/// Type of a board code, `None` for empty squares.
#[inline]
pub fn piece_type(code: i8) -> Option<PieceType> {
    PieceType::from_id(code.abs())
}

/// Color of a board code, `None` for empty squares.
#[inline]
pub fn piece_color(code: i8) -> Option<Color> {
    match code {
        0 => None,
        c if c > 0 => Some(Color::Red),
        _ => Some(Color::Black),
    }
}

#[inline]
pub fn index_of(file: usize, rank: usize) -> usize {
    rank * FILES + file
}

#[inline]
pub fn file_of(sq: usize) -> usize {
    sq % FILES
}

#[inline]
pub fn rank_of(sq: usize) -> usize {
    sq / FILES
}

/// Bounds check on signed file/rank coordinates produced by adding deltas.
#[inline]
pub fn in_bounds(file: i32, rank: i32) -> bool {
    (0..FILES as i32).contains(&file) && (0..RANKS as i32).contains(&rank)
}

/// Palace membership: files 3..=5, ranks 0..=2 (RED) or 7..=9 (BLACK).
#[inline]
pub fn in_palace(color: Color, file: i32, rank: i32) -> bool {
    if !(3..=5).contains(&file) {
        return false;
    }
    match color {
        Color::Red => (0..=2).contains(&rank),
        Color::Black => (7..=9).contains(&rank),
    }
}

/// Whether a rank lies across the river from `color`'s starting side.
/// The river runs between ranks 4 and 5.
#[inline]
pub fn across_river(color: Color, rank: usize) -> bool {
    match color {
        Color::Red => rank >= 5,
        Color::Black => rank <= 4,
    }
}

/// A file/rank offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub df: i32,
    pub dr: i32,
}

const fn d(df: i32, dr: i32) -> Delta {
    Delta { df, dr }
}

/// Orthogonal steps used by rook, cannon, and king.
pub const ORTHO_DELTAS: [Delta; 4] = [d(1, 0), d(-1, 0), d(0, 1), d(0, -1)];

/// Knight moves as (target, blocking leg) pairs. The leg is the
/// orthogonally adjacent square that must be empty.
pub const KNIGHT_DELTAS: [(Delta, Delta); 8] = [
    (d(1, 2), d(0, 1)),
    (d(2, 1), d(1, 0)),
    (d(2, -1), d(1, 0)),
    (d(1, -2), d(0, -1)),
    (d(-1, -2), d(0, -1)),
    (d(-2, -1), d(-1, 0)),
    (d(-2, 1), d(-1, 0)),
    (d(-1, 2), d(0, 1)),
];

/// Bishop (elephant) moves as (target, eye) pairs. The eye is the
/// diagonal midpoint that must be empty.
pub const BISHOP_DELTAS: [(Delta, Delta); 4] = [
    (d(2, 2), d(1, 1)),
    (d(2, -2), d(1, -1)),
    (d(-2, 2), d(-1, 1)),
    (d(-2, -2), d(-1, -1)),
];

/// Advisor single diagonal steps, confined to the palace.
pub const ADVISOR_DELTAS: [Delta; 4] = [d(1, 1), d(1, -1), d(-1, 1), d(-1, -1)];
