pub(crate) mod actionlog;
pub(crate) mod combat;
pub(crate) mod movement;
pub(crate) mod network;
pub(crate) mod retreat;
pub(crate) mod turn;
pub(crate) mod victory;

use crate::battlefield::consts::{COLS, NORTH_ROWS, ROWS};
use crate::battlefield::coords::Coord;
use crate::battlefield::piece::{Kind, Piece, Player};
use crate::battlefield::terrain::Terrain;
use crate::errors::{EngineError, EngineResult};

pub use actionlog::Action;
pub use combat::Outcome;
pub use victory::GameResult;

/// A single square: an optional occupying piece plus its terrain tag.
#[derive(Clone, Copy, Debug)]
pub struct Square {
    pub occupant: Option<Piece>,
    pub terrain: Terrain,
}

impl Default for Square {
    fn default() -> Square {
        Square { occupant: None, terrain: Terrain::Flat }
    }
}

/// The current phase of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    Movement,
    Battle,
}

impl Phase {
    pub fn notate(&self) -> char {
        match self {
            Phase::Movement => 'M',
            Phase::Battle => 'B',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Movement => "movement",
            Phase::Battle => "battle",
        }
    }
}

/// This turn's single attack-or-pass slot. `target == None` means the player
/// explicitly passed during Battle; `Some(coord)` means they attacked `coord`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttackSlot {
    pub target: Option<Coord>,
}

/// The grid of squares, 20 rows by 25 columns.
#[derive(Clone)]
pub struct Grid(pub Vec<Vec<Square>>);

impl Grid {
    fn new() -> Grid {
        Grid(vec![vec![Square::default(); COLS]; ROWS])
    }
}

/// Owns the board, the turn clock, the network caches, and the action log.
/// This is the engine instance described by the spec: the sole owner of all
/// mutable game state, exposing only the public operations below.
#[derive(Clone)]
pub struct Board {
    cells: Grid,
    next_piece_id: u32,

    current_player: Player,
    turn_number: u32,
    phase: Phase,
    moves_this_turn: Vec<(Coord, Coord)>,
    moved_piece_ids: std::collections::HashSet<u32>,
    attack_this_turn: Option<AttackSlot>,
    must_retreat: std::collections::BTreeSet<Coord>,
    retreating_now: std::collections::BTreeSet<Coord>,

    network_cache: [Option<std::collections::HashSet<Coord>>; 2],

    result: GameResult,

    undo_stack: Vec<Action>,
    redo_stack: Vec<Action>,
    undo_limit: Option<usize>,
}

fn player_index(p: Player) -> usize {
    match p {
        Player::North => 0,
        Player::South => 1,
    }
}

impl Board {
    /// An empty board: all flat terrain, no pieces, NORTH to move, turn 1,
    /// Movement phase.
    pub fn empty() -> Board {
        Board {
            cells: Grid::new(),
            next_piece_id: 0,
            current_player: Player::North,
            turn_number: 1,
            phase: Phase::Movement,
            moves_this_turn: vec![],
            moved_piece_ids: Default::default(),
            attack_this_turn: None,
            must_retreat: Default::default(),
            retreating_now: Default::default(),
            network_cache: [None, None],
            result: GameResult::Ongoing,
            undo_stack: vec![],
            redo_stack: vec![],
            undo_limit: None,
        }
    }

    pub fn rows(&self) -> usize {
        ROWS
    }

    pub fn cols(&self) -> usize {
        COLS
    }

    pub fn in_bounds(&self, c: &Coord) -> bool {
        c.row < ROWS && c.col < COLS
    }

    pub fn get(&self, c: &Coord) -> EngineResult<&Square> {
        if !self.in_bounds(c) {
            return Err(EngineError::OutOfBounds(*c));
        }
        Ok(&self.cells.0[c.row][c.col])
    }

    fn get_mut(&mut self, c: &Coord) -> EngineResult<&mut Square> {
        if !self.in_bounds(c) {
            return Err(EngineError::OutOfBounds(*c));
        }
        Ok(&mut self.cells.0[c.row][c.col])
    }

    /// Places a piece directly (setup use only; bypasses move/attack legality).
    pub fn place_piece(&mut self, c: Coord, kind: Kind, owner: Player) -> EngineResult<Piece> {
        let id = self.next_piece_id;
        self.next_piece_id += 1;
        let piece = Piece::new(id, kind, owner);
        self.get_mut(&c)?.occupant = Some(piece);
        self.mark_dirty();
        Ok(piece)
    }

    /// Sets the terrain tag at a square directly (setup use only).
    pub fn set_terrain(&mut self, c: Coord, terrain: Terrain) -> EngineResult<()> {
        self.get_mut(&c)?.terrain = terrain;
        self.mark_dirty();
        Ok(())
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn moves_this_turn(&self) -> &[(Coord, Coord)] {
        &self.moves_this_turn
    }

    pub fn attack_slot(&self) -> Option<AttackSlot> {
        self.attack_this_turn
    }

    pub fn must_retreat(&self) -> &std::collections::BTreeSet<Coord> {
        &self.must_retreat
    }

    pub fn retreating_now(&self) -> &std::collections::BTreeSet<Coord> {
        &self.retreating_now
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result != GameResult::Ongoing
    }

    pub fn set_undo_limit(&mut self, limit: Option<usize>) {
        self.undo_limit = limit;
        self.trim_undo_stack();
    }

    fn trim_undo_stack(&mut self) {
        if let Some(limit) = self.undo_limit {
            while self.undo_stack.len() > limit {
                self.undo_stack.remove(0);
            }
        }
    }

    fn require_not_over(&self) -> EngineResult<()> {
        if self.is_over() {
            Err(EngineError::GameOver(self.result))
        } else {
            Ok(())
        }
    }

    /// Whether `coord` is in NORTH's home rows (used only for the default
    /// starting layout builder).
    pub fn is_north_territory(c: &Coord) -> bool {
        c.row < NORTH_ROWS
    }

    fn mark_dirty(&mut self) {
        self.network_cache = [None, None];
    }

    fn push_action(&mut self, action: Action) {
        self.undo_stack.push(action);
        self.redo_stack.clear();
        self.trim_undo_stack();
    }

    pub fn pieces_of(&self, owner: Player) -> Vec<(Coord, Piece)> {
        let mut out = vec![];
        for r in 0..ROWS {
            for c in 0..COLS {
                if let Some(p) = self.cells.0[r][c].occupant
                    && p.owner == owner {
                        out.push((Coord::new(r, c), p));
                    }
            }
        }
        out
    }

    /// The following setters exist only to support deserialising a board from
    /// the board-only encoding and the game-record document; they bypass all
    /// legality checks and are not meant for use during normal play.
    pub(crate) fn set_current_player(&mut self, player: Player) {
        self.current_player = player;
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn set_turn_number(&mut self, turn_number: u32) {
        self.turn_number = turn_number;
    }

    pub(crate) fn set_must_retreat(&mut self, must_retreat: std::collections::BTreeSet<Coord>) {
        self.must_retreat = must_retreat;
    }

    pub(crate) fn set_retreating_now(&mut self, retreating_now: std::collections::BTreeSet<Coord>) {
        self.retreating_now = retreating_now;
    }

    pub(crate) fn set_moves_this_turn(&mut self, moves: Vec<(Coord, Coord)>) {
        for (from, to) in &moves {
            if let Some(p) = self.cells.0[to.row][to.col].occupant {
                self.moved_piece_ids.insert(p.id);
            }
            let _ = from;
        }
        self.moves_this_turn = moves;
    }

    pub(crate) fn set_attack_slot(&mut self, slot: Option<AttackSlot>) {
        self.attack_this_turn = slot;
    }

    /// The full undo stack, oldest first: every successful mutating
    /// operation performed so far, for inspection by serialisation code.
    pub fn action_log(&self) -> &[Action] {
        &self.undo_stack
    }

    /// Depth of the undo and redo stacks, for the game-record document's
    /// replay-cursor metadata.
    pub fn undo_redo_depth(&self) -> (usize, usize) {
        (self.undo_stack.len(), self.redo_stack.len())
    }

    pub fn arsenals_of(&self, owner: Player) -> Vec<Coord> {
        let mut out = vec![];
        for r in 0..ROWS {
            for c in 0..COLS {
                if self.cells.0[r][c].terrain.arsenal_owner() == Some(owner) {
                    out.push(Coord::new(r, c));
                }
            }
        }
        out
    }
}
