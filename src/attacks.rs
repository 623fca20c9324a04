use crate::board::{Board, Coordinate};
use crate::moves::get_raw_attacks;
use crate::pieces::{Piece, PieceKind, PlayerColor};

/// Small set of players, one bit per seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PlayerSet(u8);

impl PlayerSet {
    pub const EMPTY: PlayerSet = PlayerSet(0);

    #[inline]
    pub fn all_except(color: PlayerColor) -> PlayerSet {
        PlayerSet(0b1111 & !(1 << color.index()))
    }

    #[inline]
    pub fn single(color: PlayerColor) -> PlayerSet {
        PlayerSet(1 << color.index())
    }

    #[inline]
    pub fn insert(&mut self, color: PlayerColor) {
        self.0 |= 1 << color.index();
    }

    #[inline]
    pub fn contains(self, color: PlayerColor) -> bool {
        self.0 & (1 << color.index()) != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = PlayerColor> {
        PlayerColor::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<PlayerColor> for PlayerSet {
    fn from_iter<I: IntoIterator<Item = PlayerColor>>(iter: I) -> Self {
        let mut set = PlayerSet::EMPTY;
        for c in iter {
            set.insert(c);
        }
        set
    }
}

/// Cheap geometric prefilter: can a piece of `kind` on `from` reach
/// `target` in one move at all, ignoring blockers.
#[inline]
fn could_reach(kind: PieceKind, from: Coordinate, target: Coordinate) -> bool {
    let dx = (target.x - from.x).abs();
    let dy = (target.y - from.y).abs();
    if dx == 0 && dy == 0 {
        return false;
    }
    match kind {
        PieceKind::Pawn | PieceKind::King | PieceKind::Prince => dx <= 1 && dy <= 1,
        PieceKind::Knight => (dx == 1 && dy == 2) || (dx == 2 && dy == 1),
        PieceKind::Scout | PieceKind::Princess => (dx <= 1 && dy <= 1) || (dx == 0 && dy == 2) || (dx == 2 && dy == 0),
        PieceKind::Rook => dx == 0 || dy == 0,
        PieceKind::Bishop => dx == dy,
        PieceKind::Queen => dx == 0 || dy == 0 || dx == dy,
    }
}

#[inline]
fn is_active_attacker(piece: &Piece, by: PlayerSet) -> bool {
    by.contains(piece.color) && !piece.is_dead_king()
}

/// Every piece owned by a player in `by` whose raw attacks include
/// `target`. The target square must be occupied for anything to attack it.
pub fn attackers_of(board: &Board, target: Coordinate, by: PlayerSet) -> impl Iterator<Item = (Coordinate, &Piece)> + '_ {
    board.iter().filter(move |(from, piece)| {
        is_active_attacker(piece, by)
            && could_reach(piece.kind, *from, target)
            && get_raw_attacks(board, *from).contains(&target)
    })
}

/// Is `target` attacked by any non-dead piece of a player in `by`.
pub fn is_square_attacked(board: &Board, target: Coordinate, by: PlayerSet) -> bool {
    if by.is_empty() {
        return false;
    }
    attackers_of(board, target, by).next().is_some()
}

/// Value of the strongest piece of `by` attacking `target`, or 0.
pub fn strongest_attacker(board: &Board, target: Coordinate, by: PlayerSet) -> i32 {
    attackers_of(board, target, by).map(|(_, p)| p.value()).max().unwrap_or(0)
}

/// Per-board memo of live king squares. One cache belongs to one board
/// snapshot and is handed down to every legality check made on it.
#[derive(Debug, Clone, Default)]
pub struct KingCache {
    kings: Option<[Option<Coordinate>; 4]>,
}

impl KingCache {
    pub fn new() -> Self {
        KingCache { kings: None }
    }

    fn fill(board: &Board) -> [Option<Coordinate>; 4] {
        let mut kings = [None; 4];
        for (c, piece) in board.iter() {
            if piece.is_live_king() {
                kings[piece.color.index()] = Some(c);
            }
        }
        kings
    }

    /// Square of `color`'s live king. The first call scans the board.
    pub fn live_king(&mut self, board: &Board, color: PlayerColor) -> Option<Coordinate> {
        let kings = self.kings.get_or_insert_with(|| Self::fill(board));
        kings[color.index()]
    }

    /// Live kings of every player in `of`.
    pub fn live_kings(&mut self, board: &Board, of: PlayerSet) -> impl Iterator<Item = (PlayerColor, Coordinate)> + use<> {
        let kings = *self.kings.get_or_insert_with(|| Self::fill(board));
        of.iter().filter_map(move |c| kings[c.index()].map(|k| (c, k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i64, y: i64) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn player_set_ops() {
        let set = PlayerSet::all_except(PlayerColor::Green);
        assert!(set.contains(PlayerColor::Red));
        assert!(!set.contains(PlayerColor::Green));
        assert_eq!(set.iter().count(), 3);
        let only: PlayerSet = [PlayerColor::Blue].into_iter().collect();
        assert_eq!(only, PlayerSet::single(PlayerColor::Blue));
    }

    #[test]
    fn only_listed_players_attack() {
        let mut b = Board::new();
        b.spawn(c(8, 10), PieceKind::King, PlayerColor::Red);
        b.spawn(c(8, 5), PieceKind::Rook, PlayerColor::Green);
        assert!(is_square_attacked(&b, c(8, 10), PlayerSet::single(PlayerColor::Green)));
        assert!(!is_square_attacked(&b, c(8, 10), PlayerSet::single(PlayerColor::Blue)));
        assert_eq!(strongest_attacker(&b, c(8, 10), PlayerSet::all_except(PlayerColor::Red)), 500);
    }

    #[test]
    fn pawns_attack_diagonally_only() {
        let mut b = Board::new();
        b.spawn(c(8, 10), PieceKind::Pawn, PlayerColor::Red);
        b.spawn(c(9, 9), PieceKind::Knight, PlayerColor::Blue);
        b.spawn(c(8, 9), PieceKind::Knight, PlayerColor::Blue);
        let red = PlayerSet::single(PlayerColor::Red);
        assert!(is_square_attacked(&b, c(9, 9), red));
        assert!(!is_square_attacked(&b, c(8, 9), red));
    }

    #[test]
    fn dead_kings_do_not_attack() {
        let mut b = Board::new();
        b.spawn(c(8, 8), PieceKind::King, PlayerColor::Blue);
        b.spawn(c(9, 9), PieceKind::Knight, PlayerColor::Red);
        let blue = PlayerSet::single(PlayerColor::Blue);
        assert!(is_square_attacked(&b, c(9, 9), blue));
        if let Some(k) = b.get_mut(c(8, 8)) {
            k.dead = true;
        }
        assert!(!is_square_attacked(&b, c(9, 9), blue));
    }

    #[test]
    fn king_cache_skips_dead_kings() {
        let mut b = Board::new();
        b.spawn(c(8, 17), PieceKind::King, PlayerColor::Red);
        b.spawn(c(0, 8), PieceKind::King, PlayerColor::Blue);
        if let Some(k) = b.get_mut(c(0, 8)) {
            k.dead = true;
        }
        let mut cache = KingCache::new();
        assert_eq!(cache.live_king(&b, PlayerColor::Red), Some(c(8, 17)));
        assert_eq!(cache.live_king(&b, PlayerColor::Blue), None);
        let all: PlayerSet = PlayerColor::ALL.into_iter().collect();
        assert_eq!(cache.live_kings(&b, all).count(), 1);
    }
}
