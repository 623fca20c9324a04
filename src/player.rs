use crate::moves::Move;
use crate::pieces::{PieceKind, PlayerColor};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One ply of a turn, kept for the per-turn ply rule and the AI's
/// repetition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlyRecord {
    pub piece_id: u16,
    pub kind: PieceKind,
    pub mv: Move,
}

/// Display palette: the two seat colors and the blends between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub right: String,
    pub left: String,
    pub middle: String,
    pub top: String,
    pub bottom: String,
}

/// Average of two `#RRGGBB` colors, rounding halves up.
fn blend_colors(a: &str, b: &str) -> String {
    let channel = |hex: &str, i: usize| -> u32 {
        hex.trim_start_matches('#')
            .get(i * 2..i * 2 + 2)
            .and_then(|s| u32::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    let mut out = String::from("#");
    for i in 0..3 {
        let mid = (channel(a, i) + channel(b, i)).div_ceil(2);
        out.push_str(&format!("{mid:02X}"));
    }
    out
}

impl Palette {
    pub fn new(right: &str, left: &str) -> Self {
        let middle = blend_colors(right, left);
        let top = blend_colors(&middle, left);
        let bottom = blend_colors(&middle, right);
        Palette {
            right: right.to_string(),
            left: left.to_string(),
            middle,
            top,
            bottom,
        }
    }

    pub fn for_color(color: PlayerColor) -> Self {
        match color {
            PlayerColor::Red => Palette::new("#800000", "#FF0000"),
            PlayerColor::Blue => Palette::new("#0000FF", "#87CEEB"),
            PlayerColor::Green => Palette::new("#006400", "#00FF7F"),
            PlayerColor::Yellow => Palette::new("#B8860B", "#FFD700"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub color: PlayerColor,
    pub name: String,
    pub title: String,
    pub palette: Palette,
    pub is_cpu: bool,
    pub captured: FxHashMap<PieceKind, u32>,
    /// Sum of captured piece points.
    pub score: u32,
    /// Plies played in the current turn.
    pub move_count: u8,
    pub time_remaining: u32,
    pub is_defeat: bool,
    pub current_turn: Vec<PlyRecord>,
    pub last_turn: Vec<PlyRecord>,
    pub last_move: String,
}

impl Player {
    pub fn new(color: PlayerColor, is_cpu: bool, time_limit: u32) -> Self {
        let title = match color {
            PlayerColor::Red => "Novice",
            PlayerColor::Blue => "Adept",
            PlayerColor::Green => "Comeback Kid",
            PlayerColor::Yellow => "Grandmaster",
        };
        Player {
            color,
            name: color.name().to_string(),
            title: title.to_string(),
            palette: Palette::for_color(color),
            is_cpu,
            captured: FxHashMap::default(),
            score: 0,
            move_count: 0,
            time_remaining: time_limit,
            is_defeat: false,
            current_turn: Vec::new(),
            last_turn: Vec::new(),
            last_move: String::new(),
        }
    }

    pub fn add_captured(&mut self, kind: PieceKind) {
        *self.captured.entry(kind).or_insert(0) += 1;
        self.update_score();
    }

    pub fn captured_count(&self, kind: PieceKind) -> u32 {
        self.captured.get(&kind).copied().unwrap_or(0)
    }

    pub fn update_score(&mut self) {
        self.score = self.captured.iter().map(|(kind, count)| kind.points() * count).sum();
    }

    /// Moves of this turn in play order.
    pub fn current_turn_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.current_turn.iter().map(|r| r.mv)
    }

    pub fn last_turn_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.last_turn.iter().map(|r| r.mv)
    }

    /// Rolls the per-turn lists over at the end of this player's turn.
    pub fn end_turn(&mut self) {
        if !self.current_turn.is_empty() {
            self.last_turn = std::mem::take(&mut self.current_turn);
        }
        self.move_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_tracks_captures() {
        let mut p = Player::new(PlayerColor::Red, false, 120);
        p.add_captured(PieceKind::Queen);
        p.add_captured(PieceKind::Pawn);
        p.add_captured(PieceKind::Pawn);
        assert_eq!(p.score, 11);
        assert_eq!(p.captured_count(PieceKind::Pawn), 2);
        assert_eq!(p.captured_count(PieceKind::Rook), 0);
    }

    #[test]
    fn palette_blends() {
        let pal = Palette::new("#000000", "#FFFFFF");
        assert_eq!(pal.middle, "#808080");
        assert_eq!(Palette::for_color(PlayerColor::Red).middle, "#C00000");
    }
}
