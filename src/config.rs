use crate::pieces::{PieceKind, PlayerColor};
use serde::{Deserialize, Serialize};

/// How the AI picks among scored moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiSelection {
    /// Best score bucket 90% of the time, second 9%, third 1%.
    #[default]
    Weighted,
    /// Uniform pick inside the best score bucket.
    BestOnly,
}

/// Engine settings, fixed once the game is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Defeated armies stay on the board, unselectable. When false they
    /// are removed instead.
    pub frozen_army: bool,
    /// Sandbox mode: any live army may move, turns never auto-advance.
    pub ignore_turn_order: bool,
    pub turn_limit_secs: u32,
    pub max_plies_per_turn: u8,
    pub ai_think_delay_ms: u32,
    pub ai_selection: AiSelection,
    pub ai_seed: Option<u64>,
    pub cpu_players: Vec<PlayerColor>,
    /// Piece a pawn becomes on a side boundary of the cross.
    pub side_promotion: PieceKind,
    pub show_log: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            frozen_army: true,
            ignore_turn_order: false,
            turn_limit_secs: 120,
            max_plies_per_turn: 2,
            ai_think_delay_ms: 250,
            ai_selection: AiSelection::Weighted,
            ai_seed: None,
            cpu_players: vec![PlayerColor::Blue, PlayerColor::Green, PlayerColor::Yellow],
            side_promotion: PieceKind::Prince,
            show_log: false,
        }
    }
}

impl EngineConfig {
    pub fn is_cpu(&self, color: PlayerColor) -> bool {
        self.cpu_players.contains(&color)
    }
}
