//! The structured JSON game-record document (see §6.2).

use serde::{Deserialize, Serialize};

use crate::battlefield::board::{Action, Board, GameResult, Outcome, Phase};
use crate::battlefield::coords::Coord;
use crate::battlefield::piece::{Kind, Player};
use crate::battlefield::record;
use crate::errors::{EngineError, EngineResult};

pub const FORMAT_VERSION: &str = "1.0.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultCode {
    #[serde(rename = "ONGOING")]
    Ongoing,
    #[serde(rename = "NORTH_WINS")]
    NorthWins,
    #[serde(rename = "SOUTH_WINS")]
    SouthWins,
    #[serde(rename = "DRAW")]
    Draw,
}

impl From<GameResult> for ResultCode {
    fn from(r: GameResult) -> ResultCode {
        match r {
            GameResult::Ongoing => ResultCode::Ongoing,
            GameResult::NorthWins => ResultCode::NorthWins,
            GameResult::SouthWins => ResultCode::SouthWins,
            GameResult::Draw => ResultCode::Draw,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Metadata {
    pub game_name: String,
    pub created_at: String,
    pub saved_at: String,
    pub north_player: Option<String>,
    pub south_player: Option<String>,
    pub event: Option<String>,
    pub result: ResultCode,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardInfo {
    pub rows: usize,
    pub cols: usize,
    pub board: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub turn_number: u32,
    pub current_player: Player,
    pub phase: Phase,
    pub pending_retreats: Vec<String>,
    pub retreating_now: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: String,
    pub to: String,
    pub piece_id: u32,
    pub kind: Kind,
    pub owner: Player,
    pub was_retreating: bool,
    pub arsenal_destroyed_owner: Option<Player>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttackRecord {
    pub target: Option<String>,
    pub outcome: Outcome,
    pub attacker: Player,
    pub captured: Option<(Kind, Player)>,
    pub retreats_added: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndTurnRecord {
    pub captured_by_retreat: Vec<(String, Kind, Player)>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn_number: u32,
    pub player: Player,
    pub phase: Phase,
    pub moves: Vec<MoveRecord>,
    pub attack: Option<AttackRecord>,
    pub end_turn: Option<EndTurnRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UndoRedoState {
    pub undo_depth: usize,
    pub redo_depth: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRecord {
    pub format_version: String,
    pub metadata: Metadata,
    pub board_info: BoardInfo,
    pub game_state: GameState,
    pub turn_history: Vec<TurnRecord>,
    pub undo_redo_state: Option<UndoRedoState>,
}

impl GameRecord {
    /// Captures the current position and its full action history into a
    /// document. `board_info` always reflects the **current** board, not a
    /// replay target — `turn_history` is a historical log alongside it.
    pub fn capture(board: &Board, game_name: impl Into<String>, timestamp: impl Into<String>) -> GameRecord {
        let timestamp = timestamp.into();
        let (undo_depth, redo_depth) = board.undo_redo_depth();

        GameRecord {
            format_version: FORMAT_VERSION.to_string(),
            metadata: Metadata {
                game_name: game_name.into(),
                created_at: timestamp.clone(),
                saved_at: timestamp,
                north_player: None,
                south_player: None,
                event: None,
                result: board.result().into(),
            },
            board_info: BoardInfo { rows: board.rows(), cols: board.cols(), board: record::encode_board_only(board) },
            game_state: GameState {
                turn_number: board.turn_number(),
                current_player: board.current_player(),
                phase: board.phase(),
                pending_retreats: board.must_retreat().iter().map(Coord::label).collect(),
                retreating_now: board.retreating_now().iter().map(Coord::label).collect(),
            },
            turn_history: build_turn_history(board),
            undo_redo_state: Some(UndoRedoState { undo_depth, redo_depth }),
        }
    }

    /// Validates the document's internal consistency, per §6.2: sequential
    /// turn numbers, alternating players, and a move budget of at most 5 per
    /// turn. Does not replay `turn_history` onto the board — `board_info`
    /// already carries the authoritative current position.
    pub fn validate(&self) -> EngineResult<()> {
        if self.board_info.rows == 0 || self.board_info.cols == 0 {
            return Err(EngineError::MalformedDocument("board_info has zero rows or cols".into()));
        }
        let mut expected_turn = self.turn_history.first().map(|t| t.turn_number);
        let mut expected_player = self.turn_history.first().map(|t| t.player);
        for turn in &self.turn_history {
            if Some(turn.turn_number) != expected_turn {
                return Err(EngineError::MalformedDocument(format!(
                    "turn_history is not sequential: expected {:?}, found {}",
                    expected_turn, turn.turn_number
                )));
            }
            if Some(turn.player) != expected_player {
                return Err(EngineError::MalformedDocument("turn_history players do not alternate".into()));
            }
            if turn.moves.len() > crate::battlefield::consts::MAX_MOVES_PER_TURN {
                return Err(EngineError::MalformedDocument(format!(
                    "turn {} has more than {} moves",
                    turn.turn_number,
                    crate::battlefield::consts::MAX_MOVES_PER_TURN
                )));
            }
            expected_turn = Some(turn.turn_number + 1);
            expected_player = Some(-turn.player);
        }
        Ok(())
    }

    /// Parses the document's current position into a fresh `Board`,
    /// validating the document first.
    pub fn load(&self) -> EngineResult<Board> {
        self.validate()?;
        let mut board = record::parse_board_only(&self.board_info.board)?;
        board.set_current_player(self.game_state.current_player);
        board.set_phase(self.game_state.phase);
        board.set_turn_number(self.game_state.turn_number);
        let retreats = self
            .game_state
            .pending_retreats
            .iter()
            .map(|label| label.parse::<Coord>())
            .collect::<EngineResult<_>>()?;
        board.set_must_retreat(retreats);
        let retreating_now = self
            .game_state
            .retreating_now
            .iter()
            .map(|label| label.parse::<Coord>())
            .collect::<EngineResult<_>>()?;
        board.set_retreating_now(retreating_now);
        Ok(board)
    }
}

fn build_turn_history(board: &Board) -> Vec<TurnRecord> {
    let log = board.action_log();
    let boundary_count = log.iter().filter(|a| matches!(a, Action::TurnBoundary { .. })).count() as u32;
    let mut turn_number = board.turn_number().saturating_sub(boundary_count);
    let mut player = if boundary_count.is_multiple_of(2) { board.current_player() } else { -board.current_player() };

    let mut history = vec![];
    let mut current = TurnRecord { turn_number, player, phase: Phase::Movement, moves: vec![], attack: None, end_turn: None };

    for action in log {
        match action {
            Action::Move { from, to, piece_id, kind, owner, was_retreating, arsenal_destroyed_owner } => {
                current.moves.push(MoveRecord {
                    from: from.label(),
                    to: to.label(),
                    piece_id: *piece_id,
                    kind: *kind,
                    owner: *owner,
                    was_retreating: *was_retreating,
                    arsenal_destroyed_owner: *arsenal_destroyed_owner,
                });
            }
            Action::Attack { target, outcome, attacker, captured, retreats_added } => {
                current.phase = Phase::Battle;
                let is_pass = *target == Coord::new(0, 0)
                    && matches!(outcome, Outcome::Fail)
                    && captured.is_none()
                    && retreats_added.is_empty();
                current.attack = Some(AttackRecord {
                    target: if is_pass { None } else { Some(target.label()) },
                    outcome: *outcome,
                    attacker: *attacker,
                    captured: *captured,
                    retreats_added: retreats_added.iter().map(Coord::label).collect(),
                });
            }
            Action::TurnBoundary { captured_by_retreat, .. } => {
                current.end_turn = Some(EndTurnRecord {
                    captured_by_retreat: captured_by_retreat.iter().map(|(c, k, o)| (c.label(), *k, *o)).collect(),
                });
                turn_number += 1;
                player = -player;
                let finished = std::mem::replace(
                    &mut current,
                    TurnRecord { turn_number, player, phase: Phase::Movement, moves: vec![], attack: None, end_turn: None },
                );
                history.push(finished);
            }
        }
    }
    history.push(current);
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::setup::default_setup;
    use crate::battlefield::terrain::Terrain;

    #[test]
    fn captures_and_validates_empty_history() {
        let board = default_setup();
        let record = GameRecord::capture(&board, "test game", "2026-07-31T00:00:00Z");
        record.validate().unwrap();
        assert_eq!(record.turn_history.len(), 1);
        assert_eq!(record.turn_history[0].turn_number, 1);
    }

    #[test]
    fn round_trips_through_load() {
        let mut board = default_setup();
        board.set_terrain(Coord::new(5, 5), Terrain::Mountain).unwrap();
        let record = GameRecord::capture(&board, "test game", "2026-07-31T00:00:00Z");
        let loaded = record.load().unwrap();
        assert_eq!(record::encode_board_only(&loaded), record::encode_board_only(&board));
    }

    #[test]
    fn retreating_now_survives_a_save_and_load_round_trip() {
        let mut board = default_setup();
        let (coord, _) = board.pieces_of(Player::North)[0];
        board.set_must_retreat(std::collections::BTreeSet::from([coord]));
        board.resolve_retreats(Player::North).unwrap();
        assert!(board.retreating_now().contains(&coord));

        let record = GameRecord::capture(&board, "test game", "2026-07-31T00:00:00Z");
        let loaded = record.load().unwrap();
        assert!(loaded.retreating_now().contains(&coord));
        assert!(!loaded.must_retreat().contains(&coord));
    }

    #[test]
    fn turn_history_grows_across_turn_boundary() {
        let mut board = default_setup();
        let from = board.pieces_of(Player::North)[0].0;
        let dests: Vec<_> = board.generate_legal_moves(from).unwrap().into_iter().collect();
        board.execute_move(from, dests[0]).unwrap();
        board.switch_to_battle().unwrap();
        board.pass_attack().unwrap();
        board.end_turn().unwrap();

        let record = GameRecord::capture(&board, "test game", "2026-07-31T00:00:00Z");
        record.validate().unwrap();
        assert_eq!(record.turn_history.len(), 2);
        assert_eq!(record.turn_history[0].turn_number, 1);
        assert_eq!(record.turn_history[1].turn_number, 2);
        assert!(record.turn_history[0].end_turn.is_some());
    }
}
