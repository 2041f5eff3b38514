use thiserror::Error;

use crate::battlefield::coords::Coord;

/// Rule-identified failures the engine can return. Every public, state-mutating
/// operation either succeeds wholly or returns one of these and leaves the
/// board untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("no game in progress")]
    NoGameInProgress,

    #[error("game is already over ({0:?})")]
    GameOver(crate::battlefield::board::GameResult),

    #[error("square {0} is not owned by the player to move")]
    NotYourPiece(Coord),

    #[error("square {0} is empty")]
    EmptySquare(Coord),

    #[error("piece at {0} is offline and cannot move")]
    PieceOffline(Coord),

    #[error("square {0} is out of bounds")]
    OutOfBounds(Coord),

    #[error("square {0} is impassable terrain")]
    Impassable(Coord),

    #[error("square {0} is already occupied")]
    SquareOccupied(Coord),

    #[error("destination {0} exceeds the piece's movement range")]
    ExceedsRange(Coord),

    #[error("no path to {0} within the piece's movement range")]
    NoPath(Coord),

    #[error("piece at {0} has already moved this turn")]
    AlreadyMoved(Coord),

    #[error("must complete pending retreats before moving any other piece")]
    RetreatPending,

    #[error("wrong phase for this action: expected {expected}, currently {actual}")]
    WrongPhase { expected: &'static str, actual: &'static str },

    #[error("move budget exhausted for this turn")]
    MoveBudgetExhausted,

    #[error("attack budget exhausted for this turn")]
    AttackBudgetExhausted,

    #[error("no line of attackers reaches {0}")]
    NoAttackers(Coord),

    #[error("cannot switch to battle phase while retreats are pending")]
    RetreatsBlockPhaseChange,

    #[error("invalid coordinate label: {0}")]
    BadLabel(String),

    #[error("undo stack is empty")]
    NothingToUndo,

    #[error("redo stack is empty")]
    NothingToRedo,

    #[error("malformed board-only encoding: {0}")]
    MalformedEncoding(String),

    #[error("malformed game-record document: {0}")]
    MalformedDocument(String),

    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
