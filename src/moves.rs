use crate::attacks::{KingCache, PlayerSet, is_square_attacked};
use crate::board::{Board, Coordinate, GRID_SIZE, is_castling_hop, is_cell};
use crate::pieces::{Piece, PieceKind, PlayerColor};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub const ORTHOGONAL_DIRECTIONS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const DIAGONAL_DIRECTIONS: [(i64, i64); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const OCTAGONAL_DIRECTIONS: [(i64, i64); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
pub const KNIGHT_DIRECTIONS: [(i64, i64); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Ray length that crosses the whole grid.
const UNLIMITED: i64 = GRID_SIZE as i64;

/// Destinations of a single piece. Inline capacity covers a queen in the
/// middle of the cross.
pub type MoveList = SmallVec<[Coordinate; 32]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Coordinate,
    pub to: Coordinate,
}

impl Move {
    pub fn new(from: Coordinate, to: Coordinate) -> Self {
        Move { from, to }
    }
}

/// Walks from `from` along (dx, dy) for at most `max_step` squares.
/// Empty squares are destinations unless `pawn_like`; the first occupied
/// square stops the walk and is kept only if it holds an enemy.
fn collect_ray(
    board: &Board,
    from: Coordinate,
    color: PlayerColor,
    (dx, dy): (i64, i64),
    max_step: i64,
    pawn_like: bool,
    out: &mut MoveList,
) {
    for step in 1..=max_step {
        let to = from.offset(dx * step, dy * step);
        if !is_cell(to.x, to.y) {
            break;
        }
        match board.get(to) {
            None if pawn_like => break,
            None => out.push(to),
            Some(target) => {
                if target.color != color {
                    out.push(to);
                }
                break;
            }
        }
    }
}

fn generate_rays(
    board: &Board,
    from: Coordinate,
    color: PlayerColor,
    dirs: &[(i64, i64)],
    max_step: i64,
    out: &mut MoveList,
) {
    for dir in dirs {
        collect_ray(board, from, color, *dir, max_step, false, out);
    }
}

/// Orthogonal up to two squares, diagonal one.
fn generate_short_range(board: &Board, from: Coordinate, color: PlayerColor, out: &mut MoveList) {
    generate_rays(board, from, color, &ORTHOGONAL_DIRECTIONS, 2, out);
    generate_rays(board, from, color, &DIAGONAL_DIRECTIONS, 1, out);
}

/// The two forward diagonals of a pawn.
#[inline]
pub fn pawn_diagonals(color: PlayerColor) -> [(i64, i64); 2] {
    let (fx, fy) = color.forward();
    if fx == 0 { [(1, fy), (-1, fy)] } else { [(fx, 1), (fx, -1)] }
}

/// True if an enemy pawn next to the empty `square` recorded it as the
/// square it skipped.
pub fn is_en_passant_square(board: &Board, square: Coordinate, capturer: PlayerColor) -> bool {
    if !is_cell(square.x, square.y) || board.get(square).is_some() {
        return false;
    }
    ORTHOGONAL_DIRECTIONS.iter().any(|(ox, oy)| {
        board
            .get(square.offset(*ox, *oy))
            .is_some_and(|p| p.color != capturer && p.en_passant_targets(square))
    })
}

fn generate_pawn_moves(board: &Board, from: Coordinate, piece: &Piece, out: &mut MoveList) {
    let (fx, fy) = piece.color.forward();

    let step1 = from.offset(fx, fy);
    if is_cell(step1.x, step1.y) && board.get(step1).is_none() {
        out.push(step1);
        let step2 = from.offset(2 * fx, 2 * fy);
        if !piece.has_moved && is_cell(step2.x, step2.y) && board.get(step2).is_none() {
            out.push(step2);
        }
    }

    let diagonals = pawn_diagonals(piece.color);
    for dir in diagonals {
        collect_ray(board, from, piece.color, dir, 1, true, out);
    }

    for (dx, dy) in diagonals {
        let sq = from.offset(dx, dy);
        if is_en_passant_square(board, sq, piece.color) {
            out.push(sq);
        }
    }
}

fn generate_castling_moves(board: &Board, from: Coordinate, piece: &Piece, out: &mut MoveList) {
    if piece.has_moved || piece.dead {
        return;
    }
    let vertical = piece.color.moves_vertically();
    for (rook_sq, rook) in board.army(piece.color) {
        if rook.kind != PieceKind::Rook || rook.has_moved {
            continue;
        }
        let (step, dist) = if vertical {
            if rook_sq.y != from.y {
                continue;
            }
            ((rook_sq.x - from.x).signum(), (rook_sq.x - from.x).abs())
        } else {
            if rook_sq.x != from.x {
                continue;
            }
            ((rook_sq.y - from.y).signum(), (rook_sq.y - from.y).abs())
        };
        if dist <= 2 {
            continue;
        }
        let (sx, sy) = if vertical { (step, 0) } else { (0, step) };
        let clear = (1..dist).all(|i| board.get(from.offset(sx * i, sy * i)).is_none());
        if clear {
            out.push(from.offset(2 * sx, 2 * sy));
        }
    }
}

fn generate(board: &Board, from: Coordinate, piece: &Piece, with_castling: bool) -> MoveList {
    let mut out = MoveList::new();
    let color = piece.color;
    match piece.kind {
        PieceKind::Pawn => generate_pawn_moves(board, from, piece, &mut out),
        PieceKind::Knight => generate_rays(board, from, color, &KNIGHT_DIRECTIONS, 1, &mut out),
        PieceKind::Bishop => generate_rays(board, from, color, &DIAGONAL_DIRECTIONS, UNLIMITED, &mut out),
        PieceKind::Rook => generate_rays(board, from, color, &ORTHOGONAL_DIRECTIONS, UNLIMITED, &mut out),
        PieceKind::Queen => generate_rays(board, from, color, &OCTAGONAL_DIRECTIONS, UNLIMITED, &mut out),
        PieceKind::Prince => generate_rays(board, from, color, &OCTAGONAL_DIRECTIONS, 1, &mut out),
        PieceKind::Scout | PieceKind::Princess => generate_short_range(board, from, color, &mut out),
        PieceKind::King => {
            if piece.dead {
                return out;
            }
            generate_rays(board, from, color, &OCTAGONAL_DIRECTIONS, 1, &mut out);
            if with_castling {
                generate_castling_moves(board, from, piece, &mut out);
            }
        }
    }
    out
}

/// Pseudo-legal destinations of the piece on `from`, ignoring whether
/// the owner's king is left attacked.
pub fn get_raw_moves(board: &Board, from: Coordinate) -> MoveList {
    match board.get(from) {
        Some(piece) => generate(board, from, piece, true),
        None => MoveList::new(),
    }
}

/// Raw moves that land on an enemy piece.
pub fn get_raw_attacks(board: &Board, from: Coordinate) -> MoveList {
    let Some(piece) = board.get(from) else {
        return MoveList::new();
    };
    let mut moves = generate(board, from, piece, false);
    moves.retain(|to| board.get(*to).is_some_and(|t| t.color != piece.color));
    moves
}

/// Squares the piece on `from` would capture on if an enemy stood
/// there: empty or enemy-held. Pawns cover their forward diagonals only.
pub fn get_attack_coverage(board: &Board, from: Coordinate) -> MoveList {
    let Some(piece) = board.get(from) else {
        return MoveList::new();
    };
    if piece.kind != PieceKind::Pawn {
        return generate(board, from, piece, false);
    }
    pawn_diagonals(piece.color)
        .into_iter()
        .map(|(dx, dy)| from.offset(dx, dy))
        .filter(|sq| is_cell(sq.x, sq.y) && board.get(*sq).is_none_or(|t| t.color != piece.color))
        .collect()
}

/// Whether `to` is a pawn move the rules actually allow: a straight push
/// into an empty square, a capture, or en passant.
fn is_valid_pawn_destination(board: &Board, from: Coordinate, to: Coordinate, color: PlayerColor) -> bool {
    let diagonal = (to.x - from.x).abs() == 1 && (to.y - from.y).abs() == 1;
    match board.get(to) {
        Some(target) => diagonal && target.color != color,
        None => !diagonal || is_en_passant_square(board, to, color),
    }
}

/// Checks one pseudo-legal move of the piece on `from` against the
/// legality rules: no live king captures, no castling out of check, and
/// the mover's king must not be attacked afterwards.
///
/// `kings` memoizes king squares of `board` (the position before the
/// move) and is shared by every check on that position.
pub fn is_legal_destination(
    board: &Board,
    from: Coordinate,
    to: Coordinate,
    opponents: PlayerSet,
    side_promotion: PieceKind,
    kings: &mut KingCache,
) -> bool {
    let Some(piece) = board.get(from) else {
        return false;
    };
    if piece.is_dead_king() {
        return false;
    }
    if board.get(to).is_some_and(|t| t.is_live_king()) {
        return false;
    }
    if piece.kind == PieceKind::Pawn && !is_valid_pawn_destination(board, from, to, piece.color) {
        return false;
    }
    if piece.kind == PieceKind::King
        && is_castling_hop(piece.color, to.x - from.x, to.y - from.y)
        && is_square_attacked(board, from, opponents)
    {
        return false;
    }

    // Only a king move relocates the king.
    let king = if piece.kind == PieceKind::King { Some(to) } else { kings.live_king(board, piece.color) };
    let Some(king) = king else {
        return false;
    };
    let simulated = board.simulate_move(from, to, side_promotion);
    !is_square_attacked(&simulated, king, opponents)
}

/// Legal destinations of the piece on `from`.
pub fn get_legal_moves_for_piece(
    board: &Board,
    from: Coordinate,
    opponents: PlayerSet,
    side_promotion: PieceKind,
    kings: &mut KingCache,
) -> MoveList {
    let mut moves = get_raw_moves(board, from);
    moves.retain(|to| is_legal_destination(board, from, *to, opponents, side_promotion, kings));
    moves
}

/// Every legal move of `color` on the board.
pub fn get_legal_moves(
    board: &Board,
    color: PlayerColor,
    opponents: PlayerSet,
    side_promotion: PieceKind,
    kings: &mut KingCache,
) -> Vec<Move> {
    let mut moves = Vec::with_capacity(96);
    for (from, piece) in board.army(color) {
        if piece.is_dead_king() {
            continue;
        }
        for to in get_legal_moves_for_piece(board, from, opponents, side_promotion, kings) {
            moves.push(Move::new(from, to));
        }
    }
    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i64, y: i64) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn rook_ray_stops_at_pieces() {
        let mut b = Board::new();
        b.spawn(c(8, 8), PieceKind::Rook, PlayerColor::Red);
        b.spawn(c(8, 6), PieceKind::Pawn, PlayerColor::Red);
        b.spawn(c(11, 8), PieceKind::Pawn, PlayerColor::Blue);
        let moves = get_raw_moves(&b, c(8, 8));
        assert!(moves.contains(&c(8, 7)));
        assert!(!moves.contains(&c(8, 6)));
        assert!(moves.contains(&c(11, 8)));
        assert!(!moves.contains(&c(12, 8)));
        // West: (7,8) .. (0,8) are all cells of the cross.
        assert!(moves.contains(&c(0, 8)));
        // South runs down to the board edge.
        assert!(moves.contains(&c(8, 17)));
    }

    #[test]
    fn sliders_respect_the_cross() {
        let mut b = Board::new();
        b.spawn(c(5, 5), PieceKind::Bishop, PlayerColor::Red);
        let moves = get_raw_moves(&b, c(5, 5));
        // (4,4) is outside the cross, so the north-west ray is empty.
        assert!(!moves.contains(&c(4, 4)));
        assert!(!moves.contains(&c(3, 3)));
        assert!(moves.contains(&c(6, 6)));
        assert!(moves.contains(&c(6, 4)));
    }

    #[test]
    fn knight_and_short_range() {
        let mut b = Board::new();
        b.spawn(c(8, 8), PieceKind::Knight, PlayerColor::Red);
        assert_eq!(get_raw_moves(&b, c(8, 8)).len(), 8);

        let mut b = Board::new();
        b.spawn(c(8, 8), PieceKind::Scout, PlayerColor::Red);
        assert_eq!(get_raw_moves(&b, c(8, 8)).len(), 12);

        let mut b = Board::new();
        b.spawn(c(8, 8), PieceKind::Prince, PlayerColor::Red);
        assert_eq!(get_raw_moves(&b, c(8, 8)).len(), 8);
    }

    #[test]
    fn pawn_pushes_and_captures() {
        let mut b = Board::new();
        b.spawn(c(8, 15), PieceKind::Pawn, PlayerColor::Red);
        b.spawn(c(9, 14), PieceKind::Knight, PlayerColor::Green);
        b.spawn(c(7, 14), PieceKind::Knight, PlayerColor::Red);
        let moves = get_raw_moves(&b, c(8, 15));
        assert!(moves.contains(&c(8, 14)));
        assert!(moves.contains(&c(8, 13)));
        assert!(moves.contains(&c(9, 14)));
        assert!(!moves.contains(&c(7, 14)));
        assert_eq!(moves.len(), 3);

        let attacks = get_raw_attacks(&b, c(8, 15));
        assert_eq!(attacks.as_slice(), &[c(9, 14)]);
    }

    #[test]
    fn blue_pawn_marches_east() {
        let mut b = Board::new();
        b.spawn(c(2, 8), PieceKind::Pawn, PlayerColor::Blue);
        let moves = get_raw_moves(&b, c(2, 8));
        assert!(moves.contains(&c(3, 8)));
        assert!(moves.contains(&c(4, 8)));
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn castling_needs_clear_path() {
        let mut b = Board::new();
        b.spawn(c(9, 17), PieceKind::King, PlayerColor::Red);
        b.spawn(c(12, 17), PieceKind::Rook, PlayerColor::Red);
        b.spawn(c(5, 17), PieceKind::Rook, PlayerColor::Red);
        b.spawn(c(6, 17), PieceKind::Knight, PlayerColor::Red);
        let moves = get_raw_moves(&b, c(9, 17));
        assert!(moves.contains(&c(11, 17)));
        assert!(!moves.contains(&c(7, 17)));
        // Castling never shows up as an attack.
        assert!(get_raw_attacks(&b, c(9, 17)).is_empty());
    }

    #[test]
    fn pinned_piece_has_no_legal_moves() {
        let mut b = Board::new();
        b.spawn(c(8, 17), PieceKind::King, PlayerColor::Red);
        b.spawn(c(8, 14), PieceKind::Knight, PlayerColor::Red);
        b.spawn(c(8, 6), PieceKind::Rook, PlayerColor::Green);
        let opponents = PlayerSet::all_except(PlayerColor::Red);
        assert!(!get_raw_moves(&b, c(8, 14)).is_empty());
        assert!(get_legal_moves_for_piece(&b, c(8, 14), opponents, PieceKind::Prince, &mut KingCache::new()).is_empty());
    }

    #[test]
    fn live_king_is_never_a_destination() {
        let mut b = Board::new();
        b.spawn(c(8, 17), PieceKind::King, PlayerColor::Red);
        b.spawn(c(8, 10), PieceKind::Rook, PlayerColor::Red);
        b.spawn(c(8, 5), PieceKind::King, PlayerColor::Green);
        let opponents = PlayerSet::all_except(PlayerColor::Red);
        assert!(get_raw_moves(&b, c(8, 10)).contains(&c(8, 5)));
        let legal = get_legal_moves_for_piece(&b, c(8, 10), opponents, PieceKind::Prince, &mut KingCache::new());
        assert!(!legal.contains(&c(8, 5)));
        assert!(legal.contains(&c(8, 6)));
    }

    #[test]
    fn shared_king_cache_follows_the_moving_king() {
        let mut b = Board::new();
        b.spawn(c(8, 17), PieceKind::King, PlayerColor::Red);
        b.spawn(c(10, 15), PieceKind::Pawn, PlayerColor::Red);
        b.spawn(c(9, 6), PieceKind::Rook, PlayerColor::Green);
        let opponents = PlayerSet::all_except(PlayerColor::Red);
        let mut kings = KingCache::new();
        let moves = get_legal_moves(&b, PlayerColor::Red, opponents, PieceKind::Prince, &mut kings);

        // The rook covers the whole ninth file, the pawn moves freely.
        assert!(moves.contains(&Move::new(c(10, 15), c(10, 14))));
        assert!(moves.contains(&Move::new(c(8, 17), c(7, 16))));
        assert!(!moves.iter().any(|m| m.to.x == 9));
        assert_eq!(kings.live_king(&b, PlayerColor::Red), Some(c(8, 17)));
    }
}
