use crate::attacks::{KingCache, PlayerSet, is_square_attacked, strongest_attacker};
use crate::board::{ARM_END, ARM_START, Board, Coordinate, is_castling_hop, is_cell};
use crate::game::{GameState, HILL_SQUARES, in_home_zone};
use crate::moves::{
    KNIGHT_DIRECTIONS, Move, OCTAGONAL_DIRECTIONS, get_attack_coverage, get_legal_moves, get_raw_attacks,
    get_raw_moves, is_en_passant_square, pawn_diagonals,
};
use crate::pieces::{PieceKind, PlayerColor, get_piece_value};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

// ==================== Weights (centi-points) ====================

const TROPISM_CAP: i32 = 500; // Closing in on the nearest enemy king
const CHECK_BONUS: i32 = 800;
const CHECKMATE_BONUS: i32 = 200_000;
const KING_HILL_APPROACH_BONUS: i32 = 1_000;

const CENTER_PAWN_BONUS: i32 = 100;
const CENTER_PIECE_BONUS: i32 = 600;
const OUTER_PIECE_BONUS: i32 = 100;

const EQUAL_TRADE_DEFENDED: i32 = 200;
const EQUAL_TRADE_HANGING: i32 = 100;
const HANGING_MOVE_FACTOR: i32 = 2; // Losing trade on an undefended square costs double
const BLOCKED_PROMOTION_FACTOR: f64 = 0.4;
const PROMOTION_LANE_LOOKAHEAD: i64 = 4;

const BROKEN_CHAIN_PENALTY: i32 = 300;
const ISOLATED_PAWN_PENALTY: i32 = 100;
const PAWN_NEIGHBOR_BONUS: i32 = 200;
const CROWDED_PAWN_BONUS: i32 = 100;
const OVEREXTENSION_MIN_PAWNS: usize = 5;
const OVEREXTENSION_MIN_DEPTH: i64 = 4;
const OVEREXTENSION_CAP: i64 = 5;

const KING_MOBILITY_PENALTY: i32 = 200;
const CASTLING_BONUS: i32 = 4_000;
const LEAVE_HOME_BASE: f64 = 2_000.0;
const LEAVE_HOME_PHASE: f64 = 3_000.0;
const OUTSIDE_HOME_PHASE: f64 = 800.0;
const DEAD_KING_CAPTURE_BONUS: i32 = 10_000_000;
const DEFENDER_BONUS: i32 = 100;

const EMPTY_SQUARE_INFLUENCE: i32 = 25;
const ENEMY_INFLUENCE_CAP: i32 = 300;
const RETREAT_CAP: i32 = 600;

const HILL_URGENCY_RANGE: i64 = 7;
const HILL_APPROACH_WEIGHT: i32 = 300;
const HILL_OCCUPY_WEIGHT: i32 = 800;
const HILL_ATTACK_WEIGHT: i32 = 400;

const QUEEN_HANGING_PENALTY: i32 = 100_000;
const QUIET_PAWN_PENALTY: i32 = 100;
const UNDO_THIS_TURN_PENALTY: i32 = 4_000;
const UNDO_LAST_TURN_PENALTY: i32 = 3_000;
const REPEAT_LAST_TURN_PENALTY: i32 = 1_000;

// ==================== Geometry helpers ====================

#[inline]
fn in_center(c: Coordinate) -> bool {
    (ARM_START..=ARM_END).contains(&c.x) && (ARM_START..=ARM_END).contains(&c.y)
}

pub fn hill_distance(c: Coordinate) -> i64 {
    HILL_SQUARES.iter().map(|h| h.manhattan(c)).min().unwrap_or(i64::MAX)
}

/// How far a pawn has marched from its own edge of the board.
pub fn pawn_depth(color: PlayerColor, c: Coordinate) -> i64 {
    match color {
        PlayerColor::Red => 17 - c.y,
        PlayerColor::Green => c.y,
        PlayerColor::Blue => c.x,
        PlayerColor::Yellow => 17 - c.x,
    }
}

fn pawn_neighbors(board: &Board, around: Coordinate, color: PlayerColor) -> usize {
    OCTAGONAL_DIRECTIONS
        .iter()
        .filter(|(dx, dy)| {
            board
                .get(around.offset(*dx, *dy))
                .is_some_and(|p| p.kind == PieceKind::Pawn && p.color == color)
        })
        .count()
}

/// Friendly pieces covering `square`, walking outward from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Defense {
    pub count: i32,
    pub strongest: i32,
}

impl Defense {
    fn add(&mut self, value: i32) {
        self.count += 1;
        self.strongest = self.strongest.max(value);
    }
}

pub fn scan_defenders(board: &Board, square: Coordinate, color: PlayerColor) -> Defense {
    let mut defense = Defense::default();

    for (dx, dy) in KNIGHT_DIRECTIONS {
        if let Some(p) = board.get(square.offset(dx, dy))
            && p.color == color
            && p.kind == PieceKind::Knight
        {
            defense.add(p.value());
        }
    }

    for (dx, dy) in OCTAGONAL_DIRECTIONS {
        let orthogonal = dx == 0 || dy == 0;
        let mut step = 1;
        let mut cursor = square.offset(dx, dy);
        while is_cell(cursor.x, cursor.y) {
            let Some(p) = board.get(cursor) else {
                step += 1;
                cursor = cursor.offset(dx, dy);
                continue;
            };
            if p.color != color {
                break;
            }
            let covers = match p.kind {
                PieceKind::Rook => orthogonal,
                PieceKind::Bishop => !orthogonal,
                PieceKind::Queen => true,
                PieceKind::King | PieceKind::Prince => step == 1,
                PieceKind::Princess | PieceKind::Scout => (orthogonal && step <= 2) || (!orthogonal && step == 1),
                PieceKind::Pawn => step == 1 && !orthogonal && pawn_diagonals(p.color).contains(&(-dx, -dy)),
                PieceKind::Knight => false,
            };
            if covers {
                defense.add(p.value());
            }
            break;
        }
    }
    defense
}

// ==================== Move Evaluator ====================

/// Scores moves for one player on one position. Everything that does
/// not depend on the candidate move is computed once up front.
pub struct MoveEvaluator<'a> {
    game: &'a GameState,
    color: PlayerColor,
    opponents: PlayerSet,
    enemy_kings: SmallVec<[Coordinate; 3]>,
    /// Nearest live enemy king's distance to the hill.
    enemy_hill_distance: Option<i64>,
    own_pawns: usize,
    own_king_mobility: Option<usize>,
    average_moves: FxHashMap<PieceKind, f64>,
}

impl<'a> MoveEvaluator<'a> {
    pub fn new(game: &'a GameState, color: PlayerColor) -> Self {
        let board = &game.board;
        let opponents = game.opponents_of(color);

        let mut kings = KingCache::new();
        let enemy_kings: SmallVec<[Coordinate; 3]> = kings.live_kings(board, opponents).map(|(_, k)| k).collect();
        let enemy_hill_distance = enemy_kings.iter().map(|k| hill_distance(*k)).min();

        let own_pawns = board.army(color).filter(|(_, p)| p.kind == PieceKind::Pawn).count();
        let own_king_mobility = board.find_king(color).map(|k| get_raw_moves(board, k).len());

        let mut totals: FxHashMap<PieceKind, (u32, u32)> = FxHashMap::default();
        for (_, p) in board.army(color) {
            let entry = totals.entry(p.kind).or_insert((0, 0));
            entry.0 += p.move_counter as u32;
            entry.1 += 1;
        }
        let average_moves = totals
            .into_iter()
            .map(|(kind, (sum, n))| (kind, sum as f64 / n as f64))
            .collect();

        MoveEvaluator {
            game,
            color,
            opponents,
            enemy_kings,
            enemy_hill_distance,
            own_pawns,
            own_king_mobility,
            average_moves,
        }
    }

    /// Additive heuristic score of `mv`. Higher is better.
    pub fn score(&self, mv: Move) -> i32 {
        let board = &self.game.board;
        let Move { from, to } = mv;
        let Some(piece) = board.get(from) else {
            return 0;
        };
        let kind = piece.kind;
        let value = piece.value();
        let is_pawn = kind == PieceKind::Pawn;
        let is_king = kind == PieceKind::King;

        let target = board.get(to);
        let is_capture = target.is_some();
        let target_value = target.map(|t| t.value()).unwrap_or(0);

        let after = board.simulate_move(from, to, self.game.config.side_promotion);
        let mut after_kings = KingCache::new();

        let dest_attacked = is_square_attacked(&after, to, self.opponents);
        let defense = scan_defenders(&after, to, self.color);
        let attacker = if dest_attacked { strongest_attacker(&after, to, self.opponents) } else { 0 };
        let safe = !dest_attacked || defense.strongest >= attacker;
        let from_attacked = is_square_attacked(board, from, self.opponents);

        let mut score = 0;

        if !is_king {
            score += self.tropism(from, to, value);
            score += self.check_bonus(&after, &mut after_kings, to);
        } else if hill_distance(to) < hill_distance(from) {
            score += KING_HILL_APPROACH_BONUS;
        }

        score += if in_center(to) {
            if is_pawn { CENTER_PAWN_BONUS } else { CENTER_PIECE_BONUS }
        } else if !is_pawn {
            OUTER_PIECE_BONUS
        } else {
            0
        };

        if is_pawn && !is_capture && self.is_en_passant_capture(from, to) {
            score += get_piece_value(PieceKind::Pawn);
        }

        score += trade_score(dest_attacked, defense.count > 0, is_capture, value, target_value);

        if is_pawn {
            score += self.promotion_bonus(&after, to);
            score += self.pawn_structure(&after, from, to, is_capture);
            if !is_capture {
                score -= QUIET_PAWN_PENALTY;
            }
        } else if !is_king {
            score += self.king_mobility(&after, &mut after_kings);
        }

        if is_king && is_castling_hop(self.color, to.x - from.x, to.y - from.y) {
            score += CASTLING_BONUS;
        }

        if !is_pawn && !is_king {
            score += self.development(from, to);
        }

        if target.is_some_and(|t| t.is_dead_king()) {
            score += DEAD_KING_CAPTURE_BONUS;
        }

        score += defense.count * DEFENDER_BONUS;

        if !is_pawn && !is_king && safe {
            score += influence(&after, to, self.opponents);
            if from_attacked && value >= get_piece_value(PieceKind::Rook) {
                score += value.min(RETREAT_CAP);
            }
        }

        if !is_king && safe {
            score += self.hill_defense(&after, from, to);
        }

        if safe && matches!(kind, PieceKind::Rook | PieceKind::Bishop | PieceKind::Prince | PieceKind::Princess) {
            score += value / 2;
        }

        if kind == PieceKind::Queen {
            let unsafe_square = dest_attacked && defense.strongest < attacker;
            let bad_or_no_trade = !is_capture || target_value <= value;
            if unsafe_square && bad_or_no_trade {
                score -= QUEEN_HANGING_PENALTY;
            }
        }

        let clearly_escaping = from_attacked && safe && !is_capture;
        let good_capture = is_capture && target_value > 0 && target_value >= value;
        score -= self.repetition_penalty(mv, clearly_escaping || good_capture);

        if !piece.only_choice && piece.streak > 1 {
            let phase = self.phase(80);
            score -= (piece.streak as f64 * value as f64 * (0.2 + 0.3 * phase)) as i32;
        }

        if !is_pawn && !is_king {
            score += self.catch_up_development(kind, piece.move_counter, value);
        }

        score
    }

    fn phase(&self, horizon: u32) -> f64 {
        self.game.turn_number.min(horizon) as f64 / horizon as f64
    }

    fn tropism(&self, from: Coordinate, to: Coordinate, value: i32) -> i32 {
        let before = self.enemy_kings.iter().map(|k| k.manhattan(from)).min();
        let after = self.enemy_kings.iter().map(|k| k.manhattan(to)).min();
        match (before, after) {
            (Some(b), Some(a)) if a < b => value.min(TROPISM_CAP),
            _ => 0,
        }
    }

    /// Check bonus, plus the mate bonus when a checked king has no way out.
    fn check_bonus(&self, after: &Board, kings: &mut KingCache, to: Coordinate) -> i32 {
        let attacks = get_raw_attacks(after, to);
        let checked: SmallVec<[PlayerColor; 3]> = kings
            .live_kings(after, self.opponents)
            .filter(|(_, k)| attacks.contains(k))
            .map(|(c, _)| c)
            .collect();
        if checked.is_empty() {
            return 0;
        }
        let side_promotion = self.game.config.side_promotion;
        let mated = checked.iter().any(|enemy| {
            let opponents = self.game.opponents_of(*enemy);
            get_legal_moves(after, *enemy, opponents, side_promotion, kings).is_empty()
        });
        if mated { CHECK_BONUS + CHECKMATE_BONUS } else { CHECK_BONUS }
    }

    fn is_en_passant_capture(&self, from: Coordinate, to: Coordinate) -> bool {
        if (to.x - from.x).abs() != 1 || (to.y - from.y).abs() != 1 {
            return false;
        }
        is_en_passant_square(&self.game.board, to, self.color)
    }

    fn promotion_bonus(&self, after: &Board, to: Coordinate) -> i32 {
        let (fx, fy) = self.color.forward();
        let ahead = to.offset(fx, fy);
        if is_cell(ahead.x, ahead.y) {
            return 0;
        }
        let promoted = if ahead.in_grid() { self.game.config.side_promotion } else { PieceKind::Queen };
        let full = get_piece_value(promoted);

        // A friendly pawn queued behind on the same lane is stuck there.
        let mut blocked = false;
        for step in 1..=PROMOTION_LANE_LOOKAHEAD {
            let sq = to.offset(-fx * step, -fy * step);
            if !is_cell(sq.x, sq.y) {
                break;
            }
            if let Some(p) = after.get(sq) {
                blocked = p.color == self.color && p.kind == PieceKind::Pawn;
                break;
            }
        }
        if blocked { (full as f64 * BLOCKED_PROMOTION_FACTOR) as i32 } else { full }
    }

    fn pawn_structure(&self, after: &Board, from: Coordinate, to: Coordinate, is_capture: bool) -> i32 {
        let before = pawn_neighbors(&self.game.board, from, self.color);
        let after_count = pawn_neighbors(after, to, self.color);
        let mut score = 0;

        if !is_capture && before >= 2 && after_count < before {
            score -= BROKEN_CHAIN_PENALTY;
        }
        score += match after_count {
            0 => -ISOLATED_PAWN_PENALTY,
            1 | 2 => after_count as i32 * PAWN_NEIGHBOR_BONUS,
            _ => CROWDED_PAWN_BONUS,
        };

        if self.own_pawns >= OVEREXTENSION_MIN_PAWNS && after_count == 0 {
            let depth = pawn_depth(self.color, to);
            if depth >= OVEREXTENSION_MIN_DEPTH {
                score -= depth.min(OVEREXTENSION_CAP) as i32 * 100;
            }
        }
        score
    }

    fn king_mobility(&self, after: &Board, kings: &mut KingCache) -> i32 {
        let Some(before) = self.own_king_mobility else {
            return 0;
        };
        let Some(king) = kings.live_king(after, self.color) else {
            return 0;
        };
        if get_raw_moves(after, king).len() < before { -KING_MOBILITY_PENALTY } else { 0 }
    }

    fn development(&self, from: Coordinate, to: Coordinate) -> i32 {
        let phase = self.phase(20);
        let from_home = in_home_zone(self.color, from);
        let to_home = in_home_zone(self.color, to);
        if from_home && !to_home {
            (LEAVE_HOME_BASE + LEAVE_HOME_PHASE * phase) as i32
        } else if !to_home {
            (OUTSIDE_HOME_PHASE * phase) as i32
        } else {
            0
        }
    }

    fn hill_defense(&self, after: &Board, from: Coordinate, to: Coordinate) -> i32 {
        let Some(enemy_distance) = self.enemy_hill_distance else {
            return 0;
        };
        let urgency = (HILL_URGENCY_RANGE - enemy_distance).max(0) as i32;
        if urgency == 0 {
            return 0;
        }
        let mut score = 0;
        if hill_distance(to) < hill_distance(from) {
            score += urgency * HILL_APPROACH_WEIGHT;
        }
        if HILL_SQUARES.contains(&to) {
            score += urgency * HILL_OCCUPY_WEIGHT;
        }
        if get_attack_coverage(after, to).iter().any(|c| HILL_SQUARES.contains(c)) {
            score += urgency * HILL_ATTACK_WEIGHT;
        }
        score
    }

    fn repetition_penalty(&self, mv: Move, excused: bool) -> i32 {
        let player = self.game.player(self.color);
        let undo = Move::new(mv.to, mv.from);
        let mut penalty = 0;
        for m in player.current_turn_moves() {
            if m == undo {
                penalty += UNDO_THIS_TURN_PENALTY;
            }
        }
        if !excused {
            for m in player.last_turn_moves() {
                if m == undo {
                    penalty += UNDO_LAST_TURN_PENALTY;
                }
                if m == mv {
                    penalty += REPEAT_LAST_TURN_PENALTY;
                }
            }
        }
        penalty
    }

    fn catch_up_development(&self, kind: PieceKind, moves: u16, value: i32) -> i32 {
        let phase = self.phase(40);
        let average = self.average_moves.get(&kind).copied().unwrap_or(0.0);
        if moves == 0 && phase > 0.25 {
            (value as f64 * (0.3 + phase)) as i32
        } else if (moves as f64) < average && phase > 0.5 {
            (value as f64 * 0.2) as i32
        } else {
            0
        }
    }
}

/// Material result of landing on a square, by whether it is attacked
/// and defended afterwards.
fn trade_score(attacked: bool, defended: bool, is_capture: bool, value: i32, target_value: i32) -> i32 {
    let capture = is_capture && target_value > 0;
    match (attacked, defended, capture) {
        (false, _, true) => target_value,
        (false, _, false) => 0,
        (true, true, true) => match target_value.cmp(&value) {
            std::cmp::Ordering::Greater => target_value - value,
            std::cmp::Ordering::Equal => EQUAL_TRADE_DEFENDED,
            std::cmp::Ordering::Less => -(value - target_value) / 2,
        },
        (true, true, false) => -value / 5,
        (true, false, true) => match target_value.cmp(&value) {
            std::cmp::Ordering::Greater => (target_value - value) / 2,
            std::cmp::Ordering::Equal => EQUAL_TRADE_HANGING,
            std::cmp::Ordering::Less => -(value - target_value) * HANGING_MOVE_FACTOR,
        },
        (true, false, false) => -value * HANGING_MOVE_FACTOR,
    }
}

/// Reach of a piece on a safe square: a little for every empty square,
/// more for every enemy in range.
fn influence(after: &Board, at: Coordinate, opponents: PlayerSet) -> i32 {
    get_attack_coverage(after, at)
        .iter()
        .map(|c| match after.get(*c) {
            None => EMPTY_SQUARE_INFLUENCE,
            Some(p) if opponents.contains(p.color) => p.value().min(ENEMY_INFLUENCE_CAP),
            Some(_) => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn c(x: i64, y: i64) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn game_on(board: Board) -> GameState {
        let config = EngineConfig {
            cpu_players: Vec::new(),
            ai_seed: Some(1),
            ..EngineConfig::default()
        };
        GameState::with_board(config, board)
    }

    #[test]
    fn trade_table() {
        // Free capture.
        assert_eq!(trade_score(false, false, true, 100, 900), 900);
        // Hanging piece with no compensation.
        assert_eq!(trade_score(true, false, false, 500, 0), -1000);
        // Defended even trade.
        assert_eq!(trade_score(true, true, true, 300, 300), EQUAL_TRADE_DEFENDED);
        // Defended losing trade is halved.
        assert_eq!(trade_score(true, true, true, 900, 300), -300);
    }

    #[test]
    fn defenders_by_geometry() {
        let mut b = Board::new();
        b.spawn(c(8, 8), PieceKind::Knight, PlayerColor::Red);
        b.spawn(c(8, 12), PieceKind::Rook, PlayerColor::Red);
        b.spawn(c(10, 10), PieceKind::Bishop, PlayerColor::Red);
        b.spawn(c(9, 9), PieceKind::Pawn, PlayerColor::Red);
        b.spawn(c(7, 10), PieceKind::Knight, PlayerColor::Red);
        let d = scan_defenders(&b, c(8, 8), PlayerColor::Red);
        // Rook on the file, knight a jump away and the pawn on (9,9),
        // which captures towards (8,8). The bishop is screened by that pawn.
        assert_eq!(d.count, 3);
        assert_eq!(d.strongest, 500);

        let d = scan_defenders(&b, c(8, 8), PlayerColor::Blue);
        assert_eq!(d.count, 0);
    }

    #[test]
    fn pawn_depth_per_seat() {
        assert_eq!(pawn_depth(PlayerColor::Red, c(8, 15)), 2);
        assert_eq!(pawn_depth(PlayerColor::Green, c(8, 2)), 2);
        assert_eq!(pawn_depth(PlayerColor::Blue, c(2, 8)), 2);
        assert_eq!(pawn_depth(PlayerColor::Yellow, c(15, 8)), 2);
    }

    #[test]
    fn free_capture_beats_quiet_move() {
        let mut b = Board::new();
        b.spawn(c(8, 17), PieceKind::King, PlayerColor::Red);
        b.spawn(c(5, 12), PieceKind::Rook, PlayerColor::Red);
        b.spawn(c(5, 6), PieceKind::Queen, PlayerColor::Green);
        b.spawn(c(9, 0), PieceKind::King, PlayerColor::Green);
        let game = game_on(b);
        let eval = MoveEvaluator::new(&game, PlayerColor::Red);
        let capture = eval.score(Move::new(c(5, 12), c(5, 6)));
        let quiet = eval.score(Move::new(c(5, 12), c(6, 12)));
        assert!(capture > quiet, "capture {capture} quiet {quiet}");
    }

    #[test]
    fn castling_is_rewarded() {
        let mut b = Board::new();
        b.spawn(c(9, 17), PieceKind::King, PlayerColor::Red);
        b.spawn(c(12, 17), PieceKind::Rook, PlayerColor::Red);
        b.spawn(c(8, 0), PieceKind::King, PlayerColor::Green);
        let game = game_on(b);
        let eval = MoveEvaluator::new(&game, PlayerColor::Red);
        let castle = eval.score(Move::new(c(9, 17), c(11, 17)));
        let step = eval.score(Move::new(c(9, 17), c(10, 17)));
        assert!(castle - step >= CASTLING_BONUS - KING_HILL_APPROACH_BONUS);
    }

    #[test]
    fn hanging_queen_is_avoided() {
        let mut b = Board::new();
        b.spawn(c(8, 17), PieceKind::King, PlayerColor::Red);
        b.spawn(c(8, 12), PieceKind::Queen, PlayerColor::Red);
        b.spawn(c(10, 9), PieceKind::Rook, PlayerColor::Green);
        b.spawn(c(8, 0), PieceKind::King, PlayerColor::Green);
        let game = game_on(b);
        let eval = MoveEvaluator::new(&game, PlayerColor::Red);
        let hang = eval.score(Move::new(c(8, 12), c(8, 9)));
        assert!(hang < -QUEEN_HANGING_PENALTY / 2);
    }

    #[test]
    fn en_passant_victim_on_either_side() {
        let mut b = Board::new();
        b.spawn(c(12, 17), PieceKind::King, PlayerColor::Red);
        b.spawn(c(0, 12), PieceKind::King, PlayerColor::Blue);
        b.spawn(c(2, 8), PieceKind::Pawn, PlayerColor::Blue);
        b.spawn(c(2, 9), PieceKind::Pawn, PlayerColor::Red);
        b.apply_board_move(c(2, 8), c(4, 8), PieceKind::Prince);
        let game = game_on(b);

        // The Blue pawn sits beside the landing square, not beside the capturer.
        assert!(get_raw_moves(&game.board, c(2, 9)).contains(&c(3, 8)));
        let eval = MoveEvaluator::new(&game, PlayerColor::Red);
        assert!(eval.is_en_passant_capture(c(2, 9), c(3, 8)));
        assert!(!eval.is_en_passant_capture(c(2, 9), c(2, 8)));

        let effects = game.board.clone().apply_board_move(c(2, 9), c(3, 8), PieceKind::Prince);
        assert_eq!(effects.en_passant_captured.map(|(sq, _)| sq), Some(c(4, 8)));
    }

    /// Red rooks on the b-file and d8 against a Blue king boxed into its corner.
    fn boxed_blue_king(with_b_file_rook: bool) -> GameState {
        let mut b = Board::new();
        b.spawn(c(9, 17), PieceKind::King, PlayerColor::Red);
        if with_b_file_rook {
            b.spawn(c(1, 12), PieceKind::Rook, PlayerColor::Red);
        }
        b.spawn(c(3, 10), PieceKind::Rook, PlayerColor::Red);
        b.spawn(c(0, 5), PieceKind::King, PlayerColor::Blue);
        b.spawn(c(8, 0), PieceKind::King, PlayerColor::Green);
        b.spawn(c(17, 8), PieceKind::King, PlayerColor::Yellow);
        game_on(b)
    }

    #[test]
    fn check_and_mate_bonuses() {
        let mating = Move::new(c(3, 10), c(0, 10));
        let quiet = Move::new(c(3, 10), c(3, 9));

        let game = boxed_blue_king(true);
        let eval = MoveEvaluator::new(&game, PlayerColor::Red);
        let after = game.board.simulate_move(mating.from, mating.to, PieceKind::Prince);
        assert_eq!(eval.check_bonus(&after, &mut KingCache::new(), mating.to), CHECK_BONUS + CHECKMATE_BONUS);
        let after = game.board.simulate_move(quiet.from, quiet.to, PieceKind::Prince);
        assert_eq!(eval.check_bonus(&after, &mut KingCache::new(), quiet.to), 0);
        assert!(eval.score(mating) > CHECKMATE_BONUS / 2);
        assert!(eval.score(mating) > eval.score(quiet) + CHECKMATE_BONUS / 2);

        // Without the b-file rook the king walks out: check only.
        let game = boxed_blue_king(false);
        let eval = MoveEvaluator::new(&game, PlayerColor::Red);
        let after = game.board.simulate_move(mating.from, mating.to, PieceKind::Prince);
        assert_eq!(eval.check_bonus(&after, &mut KingCache::new(), mating.to), CHECK_BONUS);
    }
}
