pub mod board;
pub mod consts;
pub mod coords;
pub mod gamerecord;
pub mod piece;
pub mod record;
pub mod terrain;

pub mod setup;

pub mod prelude {
    pub use super::board::{Action, AttackSlot, Board, GameResult, Phase, Square};
    pub use super::coords::Coord;
    pub use super::gamerecord::GameRecord;
    pub use super::piece::{Kind, Piece, Player};
    pub use super::setup::default_setup;
    pub use super::terrain::Terrain;
    pub use crate::errors::{EngineError, EngineResult};
}
