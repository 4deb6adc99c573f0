//! Packed 32-bit move encoding.
//!
//! Bit layout (low to high):
//! * bits 0..=6   : from square (0..=89)
//! * bits 7..=13  : to square (0..=89)
//! * bits 14..=17 : moving piece type (1..=7)
//! * bits 18..=21 : captured piece type (0 = none)
//! * bit 22       : capture flag
//! * bit 23       : check flag (best effort, set by callers)
//! * bits 24..=27 : ordering hint nibble
//! * bits 28..=31 : reserved
//!
//! `Move::code()` is stable across process boundaries and suitable for
//! logging and storage; `Move::try_from_code` validates field ranges on
//! the way back in.

use std::fmt;

use crate::board::{file_of, rank_of, PieceType, NUM_SQUARES};
use crate::error::RulesError;

const FROM_SHIFT: u32 = 0;
const TO_SHIFT: u32 = 7;
const PT_MOVE_SHIFT: u32 = 14;
const PT_CAPT_SHIFT: u32 = 18;
const CAPTURE_FLAG_SHIFT: u32 = 22;
const CHECK_FLAG_SHIFT: u32 = 23;
const HINT_SHIFT: u32 = 24;

const MASK7: u32 = (1 << 7) - 1;
const MASK4: u32 = (1 << 4) - 1;

/// Immutable packed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u32);

impl Move {
    /// Pack a move. The capture flag is derived from `captured`.
    pub fn new(
        from_sq: usize,
        to_sq: usize,
        moving: PieceType,
        captured: Option<PieceType>,
    ) -> Move {
        debug_assert!(from_sq < NUM_SQUARES && to_sq < NUM_SQUARES);
        let mut code = 0u32;
        code |= (from_sq as u32 & MASK7) << FROM_SHIFT;
        code |= (to_sq as u32 & MASK7) << TO_SHIFT;
        code |= (moving.id() as u32 & MASK4) << PT_MOVE_SHIFT;
        if let Some(cap) = captured {
            code |= (cap.id() as u32 & MASK4) << PT_CAPT_SHIFT;
            code |= 1 << CAPTURE_FLAG_SHIFT;
        }
        Move(code)
    }

    /// The raw packed encoding.
    #[inline]
    pub fn code(self) -> u32 {
        self.0
    }

    /// Decode and validate a packed encoding produced elsewhere.
    pub fn try_from_code(code: u32) -> Result<Move, RulesError> {
        let mv = Move(code);
        if mv.from_sq() >= NUM_SQUARES {
            return Err(RulesError::MalformedMove {
                code,
                reason: "from-square out of range",
            });
        }
        if mv.to_sq() >= NUM_SQUARES {
            return Err(RulesError::MalformedMove {
                code,
                reason: "to-square out of range",
            });
        }
        let moving = ((code >> PT_MOVE_SHIFT) & MASK4) as i8;
        if PieceType::from_id(moving).is_none() {
            return Err(RulesError::MalformedMove {
                code,
                reason: "moving piece type out of range",
            });
        }
        let captured = ((code >> PT_CAPT_SHIFT) & MASK4) as i8;
        if captured != 0 && PieceType::from_id(captured).is_none() {
            return Err(RulesError::MalformedMove {
                code,
                reason: "captured piece type out of range",
            });
        }
        Ok(mv)
    }

    #[inline]
    pub fn from_sq(self) -> usize {
        ((self.0 >> FROM_SHIFT) & MASK7) as usize
    }

    #[inline]
    pub fn to_sq(self) -> usize {
        ((self.0 >> TO_SHIFT) & MASK7) as usize
    }

    /// Moving piece type. Only `Move` values built through [`Move::new`]
    /// or validated by [`Move::try_from_code`] reach this accessor, so
    /// the field is always a valid type id.
    #[inline]
    pub fn moving_type(self) -> PieceType {
        PieceType::from_id(((self.0 >> PT_MOVE_SHIFT) & MASK4) as i8)
            .unwrap_or(PieceType::Pawn)
    }

    #[inline]
    pub fn captured_type(self) -> Option<PieceType> {
        PieceType::from_id(((self.0 >> PT_CAPT_SHIFT) & MASK4) as i8)
    }

    #[inline]
    pub fn is_capture(self) -> bool {
        (self.0 >> CAPTURE_FLAG_SHIFT) & 1 != 0
    }

    #[inline]
    pub fn is_check(self) -> bool {
        (self.0 >> CHECK_FLAG_SHIFT) & 1 != 0
    }

    #[inline]
    pub fn hint(self) -> u8 {
        ((self.0 >> HINT_SHIFT) & MASK4) as u8
    }

    pub fn with_check_flag(self, is_check: bool) -> Move {
        if is_check {
            Move(self.0 | (1 << CHECK_FLAG_SHIFT))
        } else {
            Move(self.0 & !(1 << CHECK_FLAG_SHIFT))
        }
    }

    pub fn with_hint(self, hint: u8) -> Move {
        Move((self.0 & !(MASK4 << HINT_SHIFT)) | ((hint as u32 & MASK4) << HINT_SHIFT))
    }

    /// Flat from/to index in `[0, 8100)` used by policy vectors.
    #[inline]
    pub fn index(self) -> usize {
        self.from_sq() * NUM_SQUARES + self.to_sq()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}-{}{}",
            (b'a' + file_of(self.from_sq()) as u8) as char,
            rank_of(self.from_sq()),
            (b'a' + file_of(self.to_sq()) as u8) as char,
            rank_of(self.to_sq()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let mv = Move::new(12, 85, PieceType::Cannon, Some(PieceType::Rook));
        assert_eq!(mv.from_sq(), 12);
        assert_eq!(mv.to_sq(), 85);
        assert_eq!(mv.moving_type(), PieceType::Cannon);
        assert_eq!(mv.captured_type(), Some(PieceType::Rook));
        assert!(mv.is_capture());
        assert!(!mv.is_check());
    }

    #[test]
    fn test_quiet_move() {
        let mv = Move::new(0, 9, PieceType::Rook, None);
        assert!(!mv.is_capture());
        assert_eq!(mv.captured_type(), None);
    }

    #[test]
    fn test_code_roundtrip() {
        let mv = Move::new(4, 13, PieceType::King, None).with_check_flag(true);
        let back = Move::try_from_code(mv.code()).unwrap();
        assert_eq!(back, mv);
        assert!(back.is_check());
    }

    #[test]
    fn test_flags_and_hint() {
        let mv = Move::new(30, 31, PieceType::Pawn, None);
        assert_eq!(mv.with_hint(9).hint(), 9);
        assert!(mv.with_check_flag(true).is_check());
        assert!(!mv.with_check_flag(true).with_check_flag(false).is_check());
    }

    #[test]
    fn test_malformed_codes_rejected() {
        // from-square 100 (> 89)
        let bad_from = 100u32;
        assert!(matches!(
            Move::try_from_code(bad_from),
            Err(RulesError::MalformedMove { .. })
        ));

        // to-square 127
        let bad_to = 127u32 << 7;
        assert!(matches!(
            Move::try_from_code(bad_to | 1),
            Err(RulesError::MalformedMove { .. })
        ));

        // moving type 0 is reserved
        let no_type = (5u32) | (9u32 << 7);
        assert!(Move::try_from_code(no_type).is_err());

        // moving type 9 is out of range
        let bad_type = (5u32) | (9u32 << 7) | (9u32 << 14);
        assert!(Move::try_from_code(bad_type).is_err());

        // captured type 12 is out of range
        let bad_cap = (5u32) | (9u32 << 7) | (1u32 << 14) | (12u32 << 18);
        assert!(Move::try_from_code(bad_cap).is_err());
    }

    #[test]
    fn test_move_index() {
        let mv = Move::new(3, 12, PieceType::Pawn, None);
        assert_eq!(mv.index(), 3 * NUM_SQUARES + 12);
    }

    #[test]
    fn test_display() {
        let mv = Move::new(0, 9, PieceType::Rook, None);
        assert_eq!(mv.to_string(), "a0-a1");
    }
}
