/// Rows on the board. Rows 0..NORTH_ROWS are NORTH territory, the rest SOUTH.
pub const ROWS: usize = 20;
/// Columns on the board.
pub const COLS: usize = 25;
/// Row index boundary between NORTH and SOUTH home territory.
pub const NORTH_ROWS: usize = 10;

/// Moves allowed per turn.
pub const MAX_MOVES_PER_TURN: usize = 5;
/// Attacks allowed per turn.
pub const MAX_ATTACKS_PER_TURN: usize = 1;

/// The cavalry charge bonus applied per qualifying cavalry piece on a line.
pub const CHARGE_BONUS: i32 = 3;
/// Maximum distance from the target a charging cavalry may still contribute the bonus.
pub const CHARGE_STACK_CAP: usize = 4;

/// The eight radial directions used by both the network propagator and the combat engine.
pub const DIRECTIONS: [(isize, isize); 8] = [
    (-1, 0), (-1, 1), (0, 1), (1, 1),
    (1, 0), (1, -1), (0, -1), (-1, -1),
];
