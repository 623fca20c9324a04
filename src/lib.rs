use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

pub mod ai;
pub mod attacks;
pub mod board;
pub mod config;
pub mod evaluation;
pub mod game;
pub mod moves;
pub mod pieces;
pub mod player;
mod utils;

// Readable panic messages in the browser console instead of "unreachable"
#[cfg(feature = "debug")]
#[wasm_bindgen(start)]
fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

use board::{Coordinate, GRID_SIZE, is_cell};
use pieces::{PieceKind, PlayerColor};
use player::Palette;

pub use ai::{AiTurn, play_ai_turn};
pub use config::{AiSelection, EngineConfig};
pub use game::{GameState, MoveError, MoveRecord, TapOutcome};

// ============================================================================
// UI snapshot types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsPiece {
    pub id: u16,
    pub kind: PieceKind,
    pub color: PlayerColor,
    pub has_moved: bool,
    pub checked: bool,
    pub dead: bool,
    pub only_choice: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsCell {
    pub x: i64,
    pub y: i64,
    pub piece: Option<JsPiece>,
    pub selected: bool,
    pub shaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsCaptured {
    pub kind: PieceKind,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsPlayer {
    pub color: PlayerColor,
    pub name: String,
    pub title: String,
    pub palette: Palette,
    pub is_cpu: bool,
    pub score: u32,
    pub captured: Vec<JsCaptured>,
    pub time_remaining: u32,
    pub last_move: String,
    pub move_count: u8,
    pub is_defeat: bool,
}

/// Whole-game view for rendering. `grid[row][col]`, `None` off the cross.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub grid: Vec<Vec<Option<JsCell>>>,
    pub players: Vec<JsPlayer>,
    pub turn: PlayerColor,
    pub turn_number: u32,
    pub winner: Option<PlayerColor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsTapResult {
    /// "ignored", "selected", "deselected" or "moved".
    pub outcome: String,
    pub square: Option<Coordinate>,
    pub record: Option<MoveRecord>,
}

impl From<TapOutcome> for JsTapResult {
    fn from(outcome: TapOutcome) -> Self {
        let (name, square, record) = match outcome {
            TapOutcome::Ignored => ("ignored", None, None),
            TapOutcome::Selected(c) => ("selected", Some(c), None),
            TapOutcome::Deselected => ("deselected", None, None),
            TapOutcome::Moved(record) => ("moved", Some(record.mv.to), Some(*record)),
        };
        JsTapResult {
            outcome: name.to_string(),
            square,
            record,
        }
    }
}

pub fn snapshot(game: &GameState) -> Snapshot {
    let shaded = game.shaded_cells();
    let grid = (0..GRID_SIZE as i64)
        .map(|y| {
            (0..GRID_SIZE as i64)
                .map(|x| {
                    if !is_cell(x, y) {
                        return None;
                    }
                    let c = Coordinate::new(x, y);
                    Some(JsCell {
                        x,
                        y,
                        piece: game.board.get(c).map(|p| JsPiece {
                            id: p.id,
                            kind: p.kind,
                            color: p.color,
                            has_moved: p.has_moved,
                            checked: p.checked,
                            dead: p.dead,
                            only_choice: p.only_choice,
                        }),
                        selected: game.selected == Some(c),
                        shaded: shaded.contains(&c),
                    })
                })
                .collect()
        })
        .collect();

    let players = game
        .players
        .iter()
        .map(|p| {
            let mut captured: Vec<JsCaptured> = p
                .captured
                .iter()
                .map(|(kind, count)| JsCaptured { kind: *kind, count: *count })
                .collect();
            captured.sort_by_key(|c| std::cmp::Reverse(pieces::get_piece_value(c.kind)));
            JsPlayer {
                color: p.color,
                name: p.name.clone(),
                title: p.title.clone(),
                palette: p.palette.clone(),
                is_cpu: p.is_cpu,
                score: p.score,
                captured,
                time_remaining: p.time_remaining,
                last_move: p.last_move.clone(),
                move_count: p.move_count,
                is_defeat: p.is_defeat,
            }
        })
        .collect();

    Snapshot {
        grid,
        players,
        turn: game.turn,
        turn_number: game.turn_number,
        winner: game.winner(),
    }
}

// ============================================================================
// WASM engine
// ============================================================================

#[wasm_bindgen]
pub struct Engine {
    game: GameState,
}

#[wasm_bindgen]
impl Engine {
    /// `config` is a plain object of `EngineConfig` fields; missing
    /// fields, `null` or `undefined` take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<Engine, JsValue> {
        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        if config.show_log {
            utils::log(&format!("[WASM] engine created, cpu players: {:?}", config.cpu_players));
        }
        Ok(Engine {
            game: GameState::new(config),
        })
    }

    pub fn tap(&mut self, row: i32, col: i32) -> Result<JsValue, JsValue> {
        let result = JsTapResult::from(self.game.tap(row as i64, col as i64));
        Ok(serde_wasm_bindgen::to_value(&result)?)
    }

    pub fn skip_turn(&mut self) {
        self.game.skip_turn();
    }

    /// Called once per second by the host. True if the turn timed out.
    pub fn tick_clock(&mut self) -> bool {
        self.game.tick_clock()
    }

    pub fn is_ai_turn(&self) -> bool {
        self.game.is_ai_turn()
    }

    /// Delay the host should wait before calling `play_ai_turn`.
    pub fn ai_think_delay_ms(&self) -> u32 {
        self.game.config.ai_think_delay_ms
    }

    pub fn play_ai_turn(&mut self) -> Result<JsValue, JsValue> {
        let turn = ai::play_ai_turn(&mut self.game);
        Ok(serde_wasm_bindgen::to_value(&turn)?)
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
        Ok(snapshot(&self.game).serialize(&serializer)?)
    }

    /// Legal moves of the side to move as `[{from: {x, y}, to: {x, y}}]`.
    pub fn get_legal_moves_js(&self) -> Result<JsValue, JsValue> {
        let moves = self.game.legal_moves(self.game.turn);
        Ok(serde_wasm_bindgen::to_value(&moves)?)
    }

    pub fn winner(&self) -> Option<String> {
        self.game.winner().map(|c| c.name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn human_game() -> GameState {
        GameState::new(EngineConfig {
            cpu_players: Vec::new(),
            ai_seed: Some(3),
            ..EngineConfig::default()
        })
    }

    #[test]
    fn snapshot_marks_selection_and_shading() {
        let mut game = human_game();
        let selected = JsTapResult::from(game.tap(15, 8));
        assert_eq!(selected.outcome, "selected");
        assert_eq!(selected.square, Some(Coordinate::new(8, 15)));

        let view = snapshot(&game);
        assert_eq!(view.grid.len(), GRID_SIZE);
        assert!(view.grid[0][0].is_none());
        let king = view.grid[17][9].as_ref().and_then(|cell| cell.piece.as_ref()).expect("red king");
        assert_eq!((king.kind, king.color), (PieceKind::King, PlayerColor::Red));
        assert!(view.grid[15][8].as_ref().is_some_and(|cell| cell.selected));
        assert!(view.grid[14][8].as_ref().is_some_and(|cell| cell.shaded));
        assert!(view.grid[13][8].as_ref().is_some_and(|cell| cell.shaded));
        assert_eq!(view.players.len(), 4);
        assert_eq!(view.turn, PlayerColor::Red);

        let moved = JsTapResult::from(game.tap(13, 8));
        assert_eq!(moved.outcome, "moved");
        assert_eq!(moved.record.map(|r| r.notation), Some("i3-i5".to_string()));
    }
}
