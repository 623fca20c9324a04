use crate::pieces::{Piece, PieceKind, PlayerColor};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const GRID_SIZE: usize = 18;
/// First and last row/column of each arm of the cross.
pub const ARM_START: i64 = 5;
pub const ARM_END: i64 = 12;

/// Cells that exist on the cross: the central square plus four arms.
static CROSS_MASK: Lazy<[[bool; GRID_SIZE]; GRID_SIZE]> = Lazy::new(|| {
    let mut mask = [[false; GRID_SIZE]; GRID_SIZE];
    for (y, row) in mask.iter_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            let in_rows = (ARM_START..=ARM_END).contains(&(y as i64));
            let in_cols = (ARM_START..=ARM_END).contains(&(x as i64));
            *cell = in_rows || in_cols;
        }
    }
    mask
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
}

impl Coordinate {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Coordinate { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Coordinate::new(self.x + dx, self.y + dy)
    }

    #[inline]
    pub fn manhattan(self, other: Coordinate) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    #[inline]
    pub fn in_grid(self) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as usize) < GRID_SIZE && (self.y as usize) < GRID_SIZE
    }

    /// Lowercase file letter, `a` at x = 0. `?` off the grid.
    pub fn file(self) -> char {
        u8::try_from(self.x)
            .ok()
            .filter(|x| (*x as usize) < GRID_SIZE)
            .map(|x| (b'a' + x) as char)
            .unwrap_or('?')
    }

    /// Rank counted from the far (south) edge, 1-based.
    pub fn rank(self) -> i64 {
        GRID_SIZE as i64 - self.y
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.in_grid() {
            return write!(f, "({},{})", self.x, self.y);
        }
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// Whether (x, y) is a real cell of the cross. Everything else is absent.
#[inline]
pub fn is_cell(x: i64, y: i64) -> bool {
    x >= 0 && y >= 0 && (x as usize) < GRID_SIZE && (y as usize) < GRID_SIZE && CROSS_MASK[y as usize][x as usize]
}

/// Side effects of moving a piece on the board, for the caller's bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardMoveEffects {
    pub captured: Option<Piece>,
    pub en_passant_captured: Option<(Coordinate, Piece)>,
    pub castled_rook: Option<(Coordinate, Coordinate)>,
    pub promoted_to: Option<PieceKind>,
}

/// Fixed 18x18 grid, indexed `[y][x]`. The board is the only place a
/// piece's location is stored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<Piece>; GRID_SIZE]; GRID_SIZE],
    next_id: u16,
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..GRID_SIZE as i64 {
            for x in 0..GRID_SIZE as i64 {
                let c = match self.get(Coordinate::new(x, y)) {
                    _ if !is_cell(x, y) => ' ',
                    None => '.',
                    Some(p) => {
                        let ch = match p.kind {
                            PieceKind::Pawn => 'p',
                            PieceKind::Scout => 's',
                            PieceKind::Knight => 'n',
                            PieceKind::Bishop => 'b',
                            PieceKind::Rook => 'r',
                            PieceKind::Queen => 'q',
                            PieceKind::King => 'k',
                            PieceKind::Prince => 'i',
                            PieceKind::Princess => 'e',
                        };
                        if p.color == PlayerColor::Red { ch.to_ascii_uppercase() } else { ch }
                    }
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Board {
    pub fn new() -> Self {
        Board {
            cells: std::array::from_fn(|_| std::array::from_fn(|_| None)),
            next_id: 1,
        }
    }

    #[inline]
    pub fn is_cell(&self, c: Coordinate) -> bool {
        is_cell(c.x, c.y)
    }

    #[inline]
    pub fn get(&self, c: Coordinate) -> Option<&Piece> {
        if !is_cell(c.x, c.y) {
            return None;
        }
        self.cells[c.y as usize][c.x as usize].as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, c: Coordinate) -> Option<&mut Piece> {
        if !is_cell(c.x, c.y) {
            return None;
        }
        self.cells[c.y as usize][c.x as usize].as_mut()
    }

    /// Puts a piece on a cell, returning whatever was there. Writes to
    /// absent cells are dropped.
    pub fn set_piece(&mut self, c: Coordinate, piece: Piece) -> Option<Piece> {
        if !is_cell(c.x, c.y) {
            return None;
        }
        self.cells[c.y as usize][c.x as usize].replace(piece)
    }

    pub fn remove_piece(&mut self, c: Coordinate) -> Option<Piece> {
        if !is_cell(c.x, c.y) {
            return None;
        }
        self.cells[c.y as usize][c.x as usize].take()
    }

    /// Creates a fresh piece with a new identity and places it.
    pub fn spawn(&mut self, c: Coordinate, kind: PieceKind, color: PlayerColor) -> Option<Piece> {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.set_piece(c, Piece::new(id, kind, color))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &Piece)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(x, cell)| cell.as_ref().map(|p| (Coordinate::new(x as i64, y as i64), p)))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Coordinate, &mut Piece)> + '_ {
        self.cells.iter_mut().enumerate().flat_map(|(y, row)| {
            row.iter_mut()
                .enumerate()
                .filter_map(move |(x, cell)| cell.as_mut().map(|p| (Coordinate::new(x as i64, y as i64), p)))
        })
    }

    /// A player's army, derived from the grid.
    pub fn army(&self, color: PlayerColor) -> impl Iterator<Item = (Coordinate, &Piece)> + '_ {
        self.iter().filter(move |(_, p)| p.color == color)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn find_piece(&self, id: u16) -> Option<Coordinate> {
        self.iter().find(|(_, p)| p.id == id).map(|(c, _)| c)
    }

    /// Square of the player's king, dead or alive.
    pub fn find_king(&self, color: PlayerColor) -> Option<Coordinate> {
        self.army(color).find(|(_, p)| p.kind == PieceKind::King).map(|(c, _)| c)
    }

    /// Moves `from -> to` on the grid, resolving en passant, castling
    /// and promotion. Does not validate the move.
    pub fn apply_board_move(
        &mut self,
        from: Coordinate,
        to: Coordinate,
        side_promotion: PieceKind,
    ) -> BoardMoveEffects {
        let mut effects = BoardMoveEffects::default();
        let mut piece = match self.remove_piece(from) {
            Some(p) => p,
            None => return effects,
        };
        let dx = to.x - from.x;
        let dy = to.y - from.y;

        effects.captured = self.remove_piece(to);

        if piece.kind == PieceKind::Pawn {
            // Diagonal step into an empty square: the victim sits next
            // to the skipped square.
            if effects.captured.is_none() && dx.abs() == 1 && dy.abs() == 1 {
                for (ox, oy) in crate::moves::ORTHOGONAL_DIRECTIONS {
                    let sq = to.offset(ox, oy);
                    let is_victim = self
                        .get(sq)
                        .is_some_and(|p| p.color != piece.color && p.en_passant_targets(to));
                    if is_victim {
                        if let Some(victim) = self.remove_piece(sq) {
                            effects.en_passant_captured = Some((sq, victim));
                        }
                        break;
                    }
                }
            }

            let (fx, fy) = piece.color.forward();
            if dx == 2 * fx && dy == 2 * fy {
                piece.push_en_passant(Some(from.offset(fx, fy)));
            } else {
                piece.push_en_passant(None);
            }
        }

        if piece.kind == PieceKind::King && is_castling_hop(piece.color, dx, dy) {
            let step = (dx.signum(), dy.signum());
            let mut cursor = to.offset(step.0, step.1);
            while is_cell(cursor.x, cursor.y) {
                if let Some(r) = self.get(cursor) {
                    if r.kind == PieceKind::Rook && r.color == piece.color && !r.has_moved {
                        if let Some(mut rook) = self.remove_piece(cursor) {
                            rook.has_moved = true;
                            let rook_to = to.offset(-step.0, -step.1);
                            self.set_piece(rook_to, rook);
                            effects.castled_rook = Some((cursor, rook_to));
                        }
                    }
                    break;
                }
                cursor = cursor.offset(step.0, step.1);
            }
        }

        if piece.kind.tracks_moved() {
            piece.has_moved = true;
        }

        if piece.kind == PieceKind::Pawn {
            let (fx, fy) = piece.color.forward();
            let ahead = to.offset(fx, fy);
            if !is_cell(ahead.x, ahead.y) {
                let kind = if ahead.in_grid() { side_promotion } else { PieceKind::Queen };
                let id = self.next_id;
                self.next_id = self.next_id.wrapping_add(1);
                let mut promoted = Piece::new(id, kind, piece.color);
                promoted.has_moved = true;
                promoted.last_turn_moved = piece.last_turn_moved;
                piece = promoted;
                effects.promoted_to = Some(kind);
            }
        }

        self.set_piece(to, piece);
        effects
    }

    /// Copy of the board with the move applied, for legality checks.
    pub fn simulate_move(&self, from: Coordinate, to: Coordinate, side_promotion: PieceKind) -> Board {
        let mut next = self.clone();
        next.apply_board_move(from, to, side_promotion);
        next
    }
}

/// King hop of two squares along its own back rank.
#[inline]
pub fn is_castling_hop(color: PlayerColor, dx: i64, dy: i64) -> bool {
    if color.moves_vertically() {
        dy == 0 && dx.abs() == 2
    } else {
        dx == 0 && dy.abs() == 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_shape() {
        assert!(is_cell(0, 5));
        assert!(is_cell(5, 0));
        assert!(is_cell(8, 8));
        assert!(!is_cell(0, 0));
        assert!(!is_cell(4, 4));
        assert!(!is_cell(13, 13));
        assert!(!is_cell(-1, 6));
        assert!(!is_cell(6, 18));
        let cells = (0..18).flat_map(|y| (0..18).map(move |x| (x, y))).filter(|(x, y)| is_cell(*x, *y)).count();
        // 8x18 + 8x18 - 8x8 overlap
        assert_eq!(cells, 224);
    }

    #[test]
    fn absent_cells_never_hold_pieces() {
        let mut b = Board::new();
        assert!(b.spawn(Coordinate::new(0, 0), PieceKind::Rook, PlayerColor::Red).is_none());
        assert!(b.get(Coordinate::new(0, 0)).is_none());
        assert!(b.is_empty());
    }

    #[test]
    fn coordinate_notation() {
        assert_eq!(Coordinate::new(5, 15).to_string(), "f3");
        assert_eq!(Coordinate::new(0, 17).to_string(), "a1");
        assert_eq!(Coordinate::new(17, 0).to_string(), "r18");
    }

    #[test]
    fn off_grid_coordinates_still_print() {
        assert_eq!(Coordinate::new(-1, 0).to_string(), "(-1,0)");
        assert_eq!(Coordinate::new(300, 4).to_string(), "(300,4)");
        assert_eq!(Coordinate::new(-1, 0).file(), '?');
        assert_eq!(Coordinate::new(18, 3).file(), '?');
    }

    #[test]
    fn double_step_records_skip_square() {
        let mut b = Board::new();
        b.spawn(Coordinate::new(6, 15), PieceKind::Pawn, PlayerColor::Red);
        b.apply_board_move(Coordinate::new(6, 15), Coordinate::new(6, 13), PieceKind::Prince);
        let p = b.get(Coordinate::new(6, 13)).unwrap();
        assert!(p.has_moved);
        assert!(p.en_passant_targets(Coordinate::new(6, 14)));
    }

    #[test]
    fn promotion_back_rank_and_side() {
        let mut b = Board::new();
        b.spawn(Coordinate::new(6, 1), PieceKind::Pawn, PlayerColor::Red);
        let fx = b.apply_board_move(Coordinate::new(6, 1), Coordinate::new(6, 0), PieceKind::Prince);
        assert_eq!(fx.promoted_to, Some(PieceKind::Queen));

        // Red pawn in the west arm hits the arm's top wall at row 5.
        b.spawn(Coordinate::new(2, 6), PieceKind::Pawn, PlayerColor::Red);
        let fx = b.apply_board_move(Coordinate::new(2, 6), Coordinate::new(2, 5), PieceKind::Prince);
        assert_eq!(fx.promoted_to, Some(PieceKind::Prince));
        assert_eq!(b.get(Coordinate::new(2, 5)).unwrap().kind, PieceKind::Prince);
    }
}
