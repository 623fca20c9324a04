use crate::config::AiSelection;
use crate::evaluation::MoveEvaluator;
use crate::game::{GameState, MoveRecord};
use crate::moves::Move;
use crate::pieces::{PieceKind, PlayerColor};
use crate::utils;
use rand::Rng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

/// Probability of taking the best bucket, and best-or-second.
const BEST_BUCKET_CHANCE: f64 = 0.90;
const SECOND_BUCKET_CHANCE: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

/// Everything the AI did on one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiTurn {
    pub plies: Vec<MoveRecord>,
    /// The AI found no move and passed.
    pub passed: bool,
}

pub fn score_moves(game: &GameState, color: PlayerColor, moves: &[Move]) -> Vec<ScoredMove> {
    let evaluator = MoveEvaluator::new(game, color);
    moves
        .iter()
        .map(|&mv| ScoredMove {
            mv,
            score: evaluator.score(mv),
        })
        .collect()
}

/// Groups moves by exact score, best bucket first.
pub fn bucket_moves(mut scored: Vec<ScoredMove>) -> Vec<Vec<Move>> {
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    let mut buckets: Vec<Vec<Move>> = Vec::new();
    let mut current: Option<i32> = None;
    for s in scored {
        if current == Some(s.score)
            && let Some(last) = buckets.last_mut()
        {
            last.push(s.mv);
            continue;
        }
        current = Some(s.score);
        buckets.push(vec![s.mv]);
    }
    buckets
}

fn pick_uniform(rng: &mut SmallRng, bucket: &[Move]) -> Option<Move> {
    if bucket.is_empty() {
        return None;
    }
    Some(bucket[rng.random_range(0..bucket.len())])
}

/// Chooses among scored buckets. `Weighted` takes the best bucket 90% of
/// the time, the second 9% and the third 1%.
pub fn select_from_buckets(rng: &mut SmallRng, buckets: &[Vec<Move>], selection: AiSelection) -> Option<Move> {
    if buckets.is_empty() {
        return None;
    }
    let index = match selection {
        AiSelection::BestOnly => 0,
        AiSelection::Weighted => {
            let r: f64 = rng.random();
            if r < BEST_BUCKET_CHANCE || buckets.len() == 1 {
                0
            } else if r < SECOND_BUCKET_CHANCE || buckets.len() == 2 {
                1
            } else {
                2
            }
        }
    };
    pick_uniform(rng, &buckets[index.min(buckets.len() - 1)])
}

/// Picks one of `moves`. A single candidate is returned as is.
pub fn pick_move(game: &mut GameState, color: PlayerColor, moves: &[Move]) -> Option<Move> {
    match moves {
        [] => None,
        [only] => Some(*only),
        _ => {
            let buckets = bucket_moves(score_moves(game, color, moves));
            let selection = game.config.ai_selection;
            select_from_buckets(&mut game.rng, &buckets, selection)
        }
    }
}

/// Best pawn move for an optional second ply, if it scores above zero.
fn pick_second_ply(game: &mut GameState, color: PlayerColor) -> Option<Move> {
    let pawn_moves: Vec<Move> = game
        .legal_moves(color)
        .into_iter()
        .filter(|m| game.board.get(m.from).is_some_and(|p| p.kind == PieceKind::Pawn))
        .collect();
    if pawn_moves.is_empty() {
        return None;
    }
    let scored = score_moves(game, color, &pawn_moves);
    let best_score = scored.iter().map(|s| s.score).max()?;
    if best_score <= 0 {
        return None;
    }
    let best: Vec<Move> = scored.iter().filter(|s| s.score == best_score).map(|s| s.mv).collect();
    pick_uniform(&mut game.rng, &best)
}

/// Plays the current player's whole turn if it is an AI seat.
pub fn play_ai_turn(game: &mut GameState) -> AiTurn {
    let mut turn = AiTurn::default();
    if !game.is_ai_turn() {
        return turn;
    }
    let color = game.turn;
    let show_log = game.config.show_log;

    let start = utils::now_ms();
    let moves = game.legal_moves(color);
    if show_log {
        utils::log(&format!(
            "AI {} legal move generation took {:.2} ms and found {} moves",
            color.name(),
            utils::now_ms() - start,
            moves.len()
        ));
    }

    let start = utils::now_ms();
    let chosen = pick_move(game, color, &moves);
    if show_log {
        utils::log(&format!("AI {} move selection took {:.2} ms", color.name(), utils::now_ms() - start));
    }

    let Some(mv) = chosen else {
        utils::warn(&format!("AI {} could not find a valid move", color.name()));
        game.advance_turn();
        turn.passed = true;
        return turn;
    };
    match game.apply_move(mv.from, mv.to) {
        Ok(record) => turn.plies.push(record),
        Err(e) => {
            utils::warn(&format!("AI {} picked an illegal move: {e}", color.name()));
            game.advance_turn();
            turn.passed = true;
            return turn;
        }
    }

    if game.config.ignore_turn_order {
        game.advance_turn();
        return turn;
    }
    if turn.plies.last().is_some_and(|r| r.turn_ended) {
        return turn;
    }

    if let Some(second) = pick_second_ply(game, color)
        && let Ok(record) = game.apply_move(second.from, second.to)
    {
        let ended = record.turn_ended;
        turn.plies.push(record);
        if ended {
            return turn;
        }
    }
    game.advance_turn();
    turn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Coordinate;
    use rand::SeedableRng;

    fn mv(a: (i64, i64), b: (i64, i64)) -> Move {
        Move::new(Coordinate::new(a.0, a.1), Coordinate::new(b.0, b.1))
    }

    #[test]
    fn buckets_group_equal_scores() {
        let scored = vec![
            ScoredMove { mv: mv((0, 5), (1, 5)), score: 10 },
            ScoredMove { mv: mv((0, 6), (1, 6)), score: 30 },
            ScoredMove { mv: mv((0, 7), (1, 7)), score: 10 },
            ScoredMove { mv: mv((0, 8), (1, 8)), score: -5 },
        ];
        let buckets = bucket_moves(scored);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0], vec![mv((0, 6), (1, 6))]);
        assert_eq!(buckets[1].len(), 2);
        assert_eq!(buckets[2], vec![mv((0, 8), (1, 8))]);
    }

    #[test]
    fn best_only_never_leaves_top_bucket() {
        let buckets = vec![vec![mv((0, 6), (1, 6))], vec![mv((0, 7), (1, 7))]];
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..200 {
            let picked = select_from_buckets(&mut rng, &buckets, AiSelection::BestOnly);
            assert_eq!(picked, Some(mv((0, 6), (1, 6))));
        }
    }

    #[test]
    fn weighted_mostly_picks_best() {
        let buckets = vec![vec![mv((0, 6), (1, 6))], vec![mv((0, 7), (1, 7))], vec![mv((0, 8), (1, 8))]];
        let mut rng = SmallRng::seed_from_u64(11);
        let best = (0..1000)
            .filter(|_| select_from_buckets(&mut rng, &buckets, AiSelection::Weighted) == Some(mv((0, 6), (1, 6))))
            .count();
        assert!(best > 800, "best bucket picked {best} times");
    }
}
