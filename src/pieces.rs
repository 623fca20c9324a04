use crate::board::Coordinate;
use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// The four seats around the cross, in turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerColor {
    /// Bottom arm, pawns march north.
    Red,
    /// Left arm, pawns march east.
    Blue,
    /// Top arm, pawns march south.
    Green,
    /// Right arm, pawns march west.
    Yellow,
}

impl PlayerColor {
    pub const ALL: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Yellow,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> PlayerColor {
        PlayerColor::ALL[i % 4]
    }

    /// Next seat clockwise.
    #[inline]
    pub fn next(self) -> PlayerColor {
        PlayerColor::from_index(self.index() + 1)
    }

    /// Unit step a pawn of this player takes when pushing.
    #[inline]
    pub fn forward(self) -> (i64, i64) {
        match self {
            PlayerColor::Red => (0, -1),
            PlayerColor::Blue => (1, 0),
            PlayerColor::Green => (0, 1),
            PlayerColor::Yellow => (-1, 0),
        }
    }

    /// Red and Green push along columns; their back rank is a row.
    #[inline]
    pub fn moves_vertically(self) -> bool {
        matches!(self, PlayerColor::Red | PlayerColor::Green)
    }

    pub fn name(self) -> &'static str {
        match self {
            PlayerColor::Red => "Red",
            PlayerColor::Blue => "Blue",
            PlayerColor::Green => "Green",
            PlayerColor::Yellow => "Yellow",
        }
    }
}

impl std::str::FromStr for PlayerColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" | "1" => Ok(PlayerColor::Red),
            "blue" | "2" => Ok(PlayerColor::Blue),
            "green" | "3" => Ok(PlayerColor::Green),
            "yellow" | "4" => Ok(PlayerColor::Yellow),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Scout,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
    Prince,
    Princess,
}

impl PieceKind {
    /// Notation letter. Pawns have none.
    pub fn letter(self) -> &'static str {
        match self {
            PieceKind::Pawn => "",
            PieceKind::Scout => "Sc",
            PieceKind::Knight => "N",
            PieceKind::Bishop => "B",
            PieceKind::Rook => "R",
            PieceKind::Queen => "Q",
            PieceKind::King => "K",
            PieceKind::Prince => "P",
            PieceKind::Princess => "S",
        }
    }

    /// Whole-point value used for the captured-piece score.
    pub fn points(self) -> u32 {
        (get_piece_value(self) / 100) as u32
    }

    /// Tracks `has_moved` (double step, castling).
    #[inline]
    pub fn tracks_moved(self) -> bool {
        matches!(
            self,
            PieceKind::Pawn | PieceKind::Rook | PieceKind::King | PieceKind::Prince | PieceKind::Princess
        )
    }
}

impl std::str::FromStr for PieceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pawn" => Ok(PieceKind::Pawn),
            "scout" => Ok(PieceKind::Scout),
            "knight" => Ok(PieceKind::Knight),
            "bishop" => Ok(PieceKind::Bishop),
            "rook" => Ok(PieceKind::Rook),
            "queen" => Ok(PieceKind::Queen),
            "king" => Ok(PieceKind::King),
            "prince" => Ok(PieceKind::Prince),
            "princess" => Ok(PieceKind::Princess),
            _ => Err(()),
        }
    }
}

/// Piece values in centi-points.
pub fn get_piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Scout => 200,
        PieceKind::Knight => 300,
        PieceKind::Bishop => 300,
        PieceKind::Prince => 300,
        PieceKind::Princess => 400,
        PieceKind::King => 400,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
    }
}

/// One entry of a pawn's en passant history: the square skipped by a
/// double step, or `None` for any other move.
pub type EnPassantRecord = Option<Coordinate>;

/// Pawns remember their last two moves so a double step stays visible
/// through the owner's second ply of the same turn.
pub const EN_PASSANT_LOOKBACK: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// Stable identity, survives moves but not promotion.
    pub id: u16,
    pub kind: PieceKind,
    pub color: PlayerColor,
    pub has_moved: bool,
    pub checked: bool,
    pub dead: bool,
    pub only_choice: bool,
    pub en_passant: ArrayVec<EnPassantRecord, EN_PASSANT_LOOKBACK>,
    pub move_counter: u16,
    pub streak: u16,
    pub last_turn_moved: Option<u32>,
}

impl Piece {
    pub fn new(id: u16, kind: PieceKind, color: PlayerColor) -> Self {
        Piece {
            id,
            kind,
            color,
            has_moved: false,
            checked: false,
            dead: false,
            only_choice: false,
            en_passant: ArrayVec::new(),
            move_counter: 0,
            streak: 0,
            last_turn_moved: None,
        }
    }

    #[inline]
    pub fn is_live_king(&self) -> bool {
        self.kind == PieceKind::King && !self.dead
    }

    #[inline]
    pub fn is_dead_king(&self) -> bool {
        self.kind == PieceKind::King && self.dead
    }

    /// Pushes onto the ring buffer, dropping the oldest entry when full.
    pub fn push_en_passant(&mut self, record: EnPassantRecord) {
        if self.en_passant.is_full() {
            self.en_passant.remove(0);
        }
        self.en_passant.push(record);
    }

    /// True if the history marks `square` as capturable.
    pub fn en_passant_targets(&self, square: Coordinate) -> bool {
        self.kind == PieceKind::Pawn && self.en_passant.iter().any(|r| *r == Some(square))
    }

    pub fn value(&self) -> i32 {
        get_piece_value(self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn en_passant_history_keeps_last_two() {
        let mut p = Piece::new(1, PieceKind::Pawn, PlayerColor::Red);
        let sq = Coordinate::new(6, 14);
        p.push_en_passant(Some(sq));
        assert!(p.en_passant_targets(sq));
        p.push_en_passant(None);
        assert!(p.en_passant_targets(sq));
        p.push_en_passant(None);
        assert!(!p.en_passant_targets(sq));
        assert_eq!(p.en_passant.len(), 2);
    }

    #[test]
    fn turn_order_wraps() {
        assert_eq!(PlayerColor::Yellow.next(), PlayerColor::Red);
        assert_eq!(PlayerColor::Red.next(), PlayerColor::Blue);
    }

    #[test]
    fn points_follow_values() {
        assert_eq!(PieceKind::Queen.points(), 9);
        assert_eq!(PieceKind::Pawn.points(), 1);
        assert_eq!("rook".parse::<PieceKind>(), Ok(PieceKind::Rook));
    }
}
