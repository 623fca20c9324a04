use crate::attacks::{KingCache, PlayerSet, is_square_attacked};
use crate::board::{ARM_END, ARM_START, Board, Coordinate, is_cell};
use crate::config::EngineConfig;
use crate::moves::{Move, MoveList, get_legal_moves_for_piece, get_raw_moves, is_legal_destination};
use crate::pieces::{Piece, PieceKind, PlayerColor};
use crate::player::{Player, PlyRecord};
use crate::utils;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four central squares a live king can occupy to win.
pub const HILL_SQUARES: [Coordinate; 4] = [
    Coordinate::new(8, 8),
    Coordinate::new(9, 8),
    Coordinate::new(8, 9),
    Coordinate::new(9, 9),
];

/// Captured kings needed for the multi-capture win.
pub const KINGS_TO_WIN: u32 = 2;

const FRONT_ROW: [PieceKind; 8] = [PieceKind::Pawn; 8];
const MIDDLE_ROW: [PieceKind; 8] = [
    PieceKind::Pawn,
    PieceKind::Scout,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Scout,
    PieceKind::Pawn,
];
const BACK_ROW: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("no piece on {0}")]
    NoPiece(Coordinate),
    #[error("piece on {0} cannot be selected now")]
    NotSelectable(Coordinate),
    #[error("{from} -> {to} is not a legal move")]
    IllegalDestination { from: Coordinate, to: Coordinate },
    #[error("the live king on {0} cannot be captured")]
    LiveKingCapture(Coordinate),
    #[error("{} has been defeated", .0.name())]
    PlayerDefeated(PlayerColor),
    #[error("{} has no plies left for that piece this turn", .0.name())]
    TurnPlyExhausted(PlayerColor),
}

/// What happened on one applied ply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub mv: Move,
    pub color: PlayerColor,
    pub kind: PieceKind,
    pub captured: Option<PieceKind>,
    pub en_passant: bool,
    pub castled: bool,
    pub promoted_to: Option<PieceKind>,
    pub notation: String,
    /// Players defeated as a consequence of this ply.
    pub defeated: Vec<PlayerColor>,
    pub turn_ended: bool,
}

/// Result of a tap on the board. Anything the rules refuse is `Ignored`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    Ignored,
    Selected(Coordinate),
    Deselected,
    Moved(Box<MoveRecord>),
}

/// `<letter><origin><x captured-letter | -><destination>`
pub fn move_notation(kind: PieceKind, from: Coordinate, captured: Option<PieceKind>, to: Coordinate) -> String {
    let marker = match captured {
        Some(c) => format!("x{}", c.letter()),
        None => "-".to_string(),
    };
    format!("{}{}{}{}", kind.letter(), from, marker, to)
}

/// Friendly "home zone": the arm an army starts on.
pub fn in_home_zone(color: PlayerColor, c: Coordinate) -> bool {
    match color {
        PlayerColor::Red => c.y >= 13,
        PlayerColor::Blue => c.x <= 4,
        PlayerColor::Green => c.y <= 4,
        PlayerColor::Yellow => c.x >= 13,
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub board: Board,
    pub players: [Player; 4],
    pub turn: PlayerColor,
    /// Starts at 1, +1 every time the turn passes.
    pub turn_number: u32,
    pub selected: Option<Coordinate>,
    pub config: EngineConfig,
    pub(crate) rng: SmallRng,
}

impl GameState {
    /// Standard four-army start.
    pub fn new(config: EngineConfig) -> Self {
        let mut game = GameState::with_board(config, Board::new());
        game.setup_standard();
        game
    }

    /// Game on an arbitrary board, Red to move.
    pub fn with_board(config: EngineConfig, board: Board) -> Self {
        let seed = config.ai_seed.unwrap_or_else(utils::random_seed);
        let players = PlayerColor::ALL.map(|c| Player::new(c, config.is_cpu(c), config.turn_limit_secs));
        let mut game = GameState {
            board,
            players,
            turn: PlayerColor::Red,
            turn_number: 1,
            selected: None,
            config,
            rng: SmallRng::seed_from_u64(seed),
        };
        game.refresh_status();
        game
    }

    pub fn setup_standard(&mut self) {
        self.board = Board::new();
        self.selected = None;

        let layouts = [FRONT_ROW, MIDDLE_ROW, BACK_ROW];
        // (color, first line, step away from the center, lines run along x)
        let armies = [
            (PlayerColor::Red, 15, 1, true),
            (PlayerColor::Blue, 2, -1, false),
            (PlayerColor::Green, 2, -1, true),
            (PlayerColor::Yellow, 15, 1, false),
        ];
        for (color, first, step, along_x) in armies {
            let mirrored = matches!(color, PlayerColor::Green | PlayerColor::Yellow);
            for (depth, layout) in layouts.iter().enumerate() {
                let line = first + step * depth as i64;
                let is_back = depth == 2;
                for i in ARM_START..=ARM_END {
                    let local = (i - ARM_START) as usize;
                    let kind = if is_back && mirrored { layout[7 - local] } else { layout[local] };
                    let c = if along_x { Coordinate::new(i, line) } else { Coordinate::new(line, i) };
                    self.board.spawn(c, kind, color);
                }
            }
        }
        self.refresh_status();
    }

    #[inline]
    pub fn player(&self, color: PlayerColor) -> &Player {
        &self.players[color.index()]
    }

    #[inline]
    pub fn player_mut(&mut self, color: PlayerColor) -> &mut Player {
        &mut self.players[color.index()]
    }

    pub fn current_player(&self) -> &Player {
        self.player(self.turn)
    }

    /// Players whose pieces threaten `color`: everyone else still in the game.
    pub fn opponents_of(&self, color: PlayerColor) -> PlayerSet {
        PlayerColor::ALL
            .into_iter()
            .filter(|c| *c != color && !self.player(*c).is_defeat)
            .collect()
    }

    /// True if some friendly piece is flagged as a check escape.
    fn has_only_choice(&self, color: PlayerColor) -> bool {
        self.board.army(color).any(|(_, p)| p.only_choice)
    }

    /// Checks every rule that decides whether the piece on `from` may
    /// move right now, except its destinations.
    pub fn check_selectable(&self, from: Coordinate) -> Result<&Piece, MoveError> {
        let piece = self.board.get(from).ok_or(MoveError::NoPiece(from))?;
        let color = piece.color;
        let player = self.player(color);
        if player.is_defeat {
            return Err(MoveError::PlayerDefeated(color));
        }
        if piece.is_dead_king() {
            return Err(MoveError::NotSelectable(from));
        }
        if !self.config.ignore_turn_order && color != self.turn {
            return Err(MoveError::NotSelectable(from));
        }
        if !piece.only_choice && self.has_only_choice(color) {
            return Err(MoveError::NotSelectable(from));
        }
        if !self.config.ignore_turn_order {
            if player.move_count >= self.config.max_plies_per_turn {
                return Err(MoveError::TurnPlyExhausted(color));
            }
            let moved_non_pawn = player.current_turn.iter().any(|r| r.kind != PieceKind::Pawn);
            if piece.kind != PieceKind::Pawn && moved_non_pawn {
                return Err(MoveError::TurnPlyExhausted(color));
            }
            if player.current_turn.iter().any(|r| r.piece_id == piece.id) {
                return Err(MoveError::TurnPlyExhausted(color));
            }
        }
        Ok(piece)
    }

    /// Legal destinations of the piece on `from`, honoring turn order,
    /// the ply rule and the only-choice restriction.
    pub fn legal_moves_from(&self, from: Coordinate) -> Result<MoveList, MoveError> {
        let piece = self.check_selectable(from)?;
        let opponents = self.opponents_of(piece.color);
        Ok(get_legal_moves_for_piece(
            &self.board,
            from,
            opponents,
            self.config.side_promotion,
            &mut KingCache::new(),
        ))
    }

    /// Every move `color` may play right now.
    pub fn legal_moves(&self, color: PlayerColor) -> Vec<Move> {
        let mut moves = Vec::new();
        for (from, _) in self.board.army(color) {
            if let Ok(dests) = self.legal_moves_from(from) {
                moves.extend(dests.into_iter().map(|to| Move::new(from, to)));
            }
        }
        moves
    }

    /// Destinations to shade for the current selection.
    pub fn shaded_cells(&self) -> MoveList {
        self.selected
            .and_then(|from| self.legal_moves_from(from).ok())
            .unwrap_or_default()
    }

    /// Validates and plays one ply.
    pub fn apply_move(&mut self, from: Coordinate, to: Coordinate) -> Result<MoveRecord, MoveError> {
        let piece = self.check_selectable(from)?.clone();
        let color = piece.color;

        if self.board.get(to).is_some_and(|t| t.is_live_king() && t.color != color) {
            return Err(MoveError::LiveKingCapture(to));
        }
        let opponents = self.opponents_of(color);
        let side_promotion = self.config.side_promotion;
        let pseudo = get_raw_moves(&self.board, from);
        let legal = pseudo.contains(&to)
            && is_legal_destination(&self.board, from, to, opponents, side_promotion, &mut KingCache::new());
        if !legal {
            return Err(MoveError::IllegalDestination { from, to });
        }

        let effects = self.board.apply_board_move(from, to, side_promotion);

        // A dead king is credited as a king.
        let captured = effects
            .captured
            .as_ref()
            .map(|p| p.kind)
            .or(effects.en_passant_captured.as_ref().map(|(_, p)| p.kind));
        if let Some(kind) = captured {
            self.player_mut(color).add_captured(kind);
        }

        let streak_continues = {
            let player = self.player(color);
            player.current_turn.iter().chain(player.last_turn.iter()).any(|r| r.piece_id == piece.id)
        };
        let turn_number = self.turn_number;
        if let Some(moved) = self.board.get_mut(to) {
            moved.move_counter = piece.move_counter.saturating_add(1);
            moved.streak = if streak_continues { piece.streak.saturating_add(1) } else { 1 };
            moved.last_turn_moved = Some(turn_number);
        }

        let mv = Move::new(from, to);
        let notation = move_notation(piece.kind, from, captured, to);
        {
            let player = self.player_mut(color);
            player.move_count += 1;
            player.current_turn.push(PlyRecord {
                piece_id: piece.id,
                kind: piece.kind,
                mv,
            });
            player.last_move = notation.clone();
        }
        self.selected = None;

        let defeated = self.refresh_status();
        if self.config.show_log {
            utils::log(&format!("{} plays {}", color.name(), notation));
        }

        let mut turn_ended = false;
        if !self.config.ignore_turn_order && color == self.turn {
            let exhausted = self.player(color).move_count >= self.config.max_plies_per_turn;
            if exhausted || self.legal_moves(color).is_empty() || self.winner().is_some() {
                self.advance_turn();
                turn_ended = true;
            }
        }

        Ok(MoveRecord {
            mv,
            color,
            kind: piece.kind,
            captured,
            en_passant: effects.en_passant_captured.is_some(),
            castled: effects.castled_rook.is_some(),
            promoted_to: effects.promoted_to,
            notation,
            defeated,
            turn_ended,
        })
    }

    /// Recomputes check flags and then checkmates until nothing changes.
    /// Returns the players defeated on the way.
    pub fn refresh_status(&mut self) -> Vec<PlayerColor> {
        let mut defeated = Vec::new();
        loop {
            self.update_check_states();
            let newly = self.update_checkmates();
            if newly.is_empty() {
                return defeated;
            }
            defeated.extend(newly);
        }
    }

    /// Flags each live king as checked iff an opponent attacks it.
    pub fn update_check_states(&mut self) {
        for color in PlayerColor::ALL {
            if self.player(color).is_defeat {
                continue;
            }
            let Some(king) = self.board.army(color).find(|(_, p)| p.is_live_king()).map(|(c, _)| c) else {
                continue;
            };
            let checked = is_square_attacked(&self.board, king, self.opponents_of(color));
            if let Some(k) = self.board.get_mut(king) {
                k.checked = checked;
            }
            if !checked {
                for (_, p) in self.board.iter_mut() {
                    if p.color == color {
                        p.only_choice = false;
                    }
                }
            }
        }
    }

    /// For every checked player, marks pieces that can escape as
    /// `only_choice`. A player with no escape loses: king dead, army
    /// frozen (or removed).
    pub fn update_checkmates(&mut self) -> Vec<PlayerColor> {
        let side_promotion = self.config.side_promotion;
        let mut defeated = Vec::new();
        for color in PlayerColor::ALL {
            if self.player(color).is_defeat {
                continue;
            }
            let Some(king) = self
                .board
                .army(color)
                .find(|(_, p)| p.is_live_king() && p.checked)
                .map(|(c, _)| c)
            else {
                continue;
            };
            let opponents = self.opponents_of(color);
            let mut kings = KingCache::new();
            let escapers: Vec<Coordinate> = self
                .board
                .army(color)
                .filter(|(_, p)| !p.is_dead_king())
                .map(|(c, _)| c)
                .filter(|from| {
                    !get_legal_moves_for_piece(&self.board, *from, opponents, side_promotion, &mut kings).is_empty()
                })
                .collect();

            for (c, p) in self.board.iter_mut() {
                if p.color == color {
                    p.only_choice = escapers.contains(&c);
                }
            }
            if !escapers.is_empty() {
                continue;
            }

            if let Some(k) = self.board.get_mut(king) {
                k.dead = true;
                k.checked = false;
            }
            self.player_mut(color).is_defeat = true;
            if !self.config.frozen_army {
                let squares: Vec<Coordinate> = self.board.army(color).map(|(c, _)| c).collect();
                for c in squares {
                    self.board.remove_piece(c);
                }
            }
            if self.config.show_log {
                utils::log(&format!("{} is checkmated", color.name()));
            }
            defeated.push(color);
        }
        defeated
    }

    /// Passes the turn to the next player still in the game.
    pub fn advance_turn(&mut self) {
        self.selected = None;
        let current = self.turn;
        self.player_mut(current).end_turn();

        let mut next = current.next();
        for _ in 0..4 {
            if !self.player(next).is_defeat {
                break;
            }
            next = next.next();
        }
        self.turn = next;
        self.turn_number += 1;

        let limit = self.config.turn_limit_secs;
        let player = self.player_mut(next);
        player.time_remaining = limit;
        player.move_count = 0;
        player.current_turn.clear();

        // Double steps of this player's pawns stop being capturable.
        for (_, p) in self.board.iter_mut() {
            if p.color == next && p.kind == PieceKind::Pawn {
                p.en_passant.clear();
            }
        }
    }

    /// Ends the current turn early.
    pub fn skip_turn(&mut self) {
        self.advance_turn();
    }

    /// One second of the current player's clock. Returns true if the
    /// turn timed out and passed on.
    pub fn tick_clock(&mut self) -> bool {
        if self.winner().is_some() {
            return false;
        }
        let current = self.turn;
        let player = self.player_mut(current);
        player.time_remaining = player.time_remaining.saturating_sub(1);
        if player.time_remaining == 0 {
            if self.config.show_log {
                utils::log(&format!("{} ran out of time", current.name()));
            }
            self.advance_turn();
            return true;
        }
        false
    }

    /// Hill king, two captured kings, or last player standing.
    pub fn winner(&self) -> Option<PlayerColor> {
        for (c, p) in self.board.iter() {
            if p.is_live_king() && !self.player(p.color).is_defeat && HILL_SQUARES.contains(&c) {
                return Some(p.color);
            }
        }
        if let Some(p) = self.players.iter().find(|p| p.captured_count(PieceKind::King) >= KINGS_TO_WIN) {
            return Some(p.color);
        }
        let mut alive = self.players.iter().filter(|p| !p.is_defeat);
        match (alive.next(), alive.next()) {
            (Some(last), None) => Some(last.color),
            _ => None,
        }
    }

    /// UI entry point: a tap on (row, col).
    pub fn tap(&mut self, row: i64, col: i64) -> TapOutcome {
        if !is_cell(col, row) || self.winner().is_some() {
            return TapOutcome::Ignored;
        }
        let cell = Coordinate::new(col, row);

        let Some(from) = self.selected else {
            return match self.check_selectable(cell) {
                Ok(_) => {
                    self.selected = Some(cell);
                    TapOutcome::Selected(cell)
                }
                Err(_) => TapOutcome::Ignored,
            };
        };

        if from == cell {
            self.selected = None;
            return TapOutcome::Deselected;
        }

        let selected_color = self.board.get(from).map(|p| p.color);
        if let Some(target) = self.board.get(cell)
            && Some(target.color) == selected_color
        {
            return match self.check_selectable(cell) {
                Ok(_) => {
                    self.selected = Some(cell);
                    TapOutcome::Selected(cell)
                }
                Err(_) => TapOutcome::Ignored,
            };
        }

        if !self.shaded_cells().contains(&cell) {
            return TapOutcome::Ignored;
        }
        match self.apply_move(from, cell) {
            Ok(record) => TapOutcome::Moved(Box::new(record)),
            Err(_) => TapOutcome::Ignored,
        }
    }

    pub fn is_ai_turn(&self) -> bool {
        let player = self.current_player();
        player.is_cpu && !player.is_defeat && self.winner().is_none()
    }
}
