//! The canonical starting position for a fresh game.

use crate::battlefield::board::Board;
use crate::battlefield::coords::Coord;
use crate::battlefield::piece::{Kind, Player};
use crate::battlefield::terrain::Terrain;

const NORTH_ARSENAL: (usize, usize) = (0, 12);
const SOUTH_ARSENAL: (usize, usize) = (19, 12);

const INFANTRY_ROW: usize = 1;
const INFANTRY_COLS: [usize; 11] = [2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22];

const CAVALRY_ROW: usize = 2;
const CAVALRY_COLS: [usize; 4] = [6, 10, 14, 18];

const CANNON_ROW: usize = 2;
const CANNON_COLS: [usize; 1] = [12];

const SWIFT_CANNON_ROW: usize = 3;
const SWIFT_CANNON_COLS: [usize; 2] = [8, 16];

const RELAY_ROW: usize = 3;
const RELAY_COLS: [usize; 2] = [2, 22];

const SWIFT_RELAY_ROW: usize = 3;
const SWIFT_RELAY_COLS: [usize; 1] = [12];

const MOUNTAIN_RANGE_ROWS: [usize; 2] = [9, 10];
const MOUNTAIN_PASS_COLS: [usize; 5] = [4, 8, 12, 16, 20];

const FORTRESSES: [(usize, usize); 2] = [(3, 2), (16, 22)];

/// Builds the engine's canonical starting position: mirrored arsenals,
/// mirrored unit deployments in front of each, and a mountain range along
/// the NORTH/SOUTH boundary broken by a handful of mountain passes. This is
/// this crate's own choice of opening layout (the original source ships its
/// starting position as an opaque board-only file this pack doesn't carry);
/// see DESIGN.md for the reasoning.
pub fn default_setup() -> Board {
    let mut board = Board::empty();

    for &row in &MOUNTAIN_RANGE_ROWS {
        for col in 0..board.cols() {
            let terrain = if MOUNTAIN_PASS_COLS.contains(&col) { Terrain::MountainPass } else { Terrain::Mountain };
            board.set_terrain(Coord::new(row, col), terrain).expect("in bounds");
        }
    }
    for &(row, col) in &FORTRESSES {
        board.set_terrain(Coord::new(row, col), Terrain::Fortress).expect("in bounds");
    }

    board.set_terrain(Coord::new(NORTH_ARSENAL.0, NORTH_ARSENAL.1), Terrain::Arsenal(Player::North)).expect("in bounds");
    board.set_terrain(Coord::new(SOUTH_ARSENAL.0, SOUTH_ARSENAL.1), Terrain::Arsenal(Player::South)).expect("in bounds");

    deploy(&mut board, Player::North, INFANTRY_ROW, &INFANTRY_COLS, Kind::Infantry);
    deploy(&mut board, Player::North, CAVALRY_ROW, &CAVALRY_COLS, Kind::Cavalry);
    deploy(&mut board, Player::North, CANNON_ROW, &CANNON_COLS, Kind::Cannon);
    deploy(&mut board, Player::North, SWIFT_CANNON_ROW, &SWIFT_CANNON_COLS, Kind::SwiftCannon);
    deploy(&mut board, Player::North, RELAY_ROW, &RELAY_COLS, Kind::Relay);
    deploy(&mut board, Player::North, SWIFT_RELAY_ROW, &SWIFT_RELAY_COLS, Kind::SwiftRelay);

    let rows = board.rows();
    let mirror = |row: usize| rows - 1 - row;
    deploy(&mut board, Player::South, mirror(INFANTRY_ROW), &INFANTRY_COLS, Kind::Infantry);
    deploy(&mut board, Player::South, mirror(CAVALRY_ROW), &CAVALRY_COLS, Kind::Cavalry);
    deploy(&mut board, Player::South, mirror(CANNON_ROW), &CANNON_COLS, Kind::Cannon);
    deploy(&mut board, Player::South, mirror(SWIFT_CANNON_ROW), &SWIFT_CANNON_COLS, Kind::SwiftCannon);
    deploy(&mut board, Player::South, mirror(RELAY_ROW), &RELAY_COLS, Kind::Relay);
    deploy(&mut board, Player::South, mirror(SWIFT_RELAY_ROW), &SWIFT_RELAY_COLS, Kind::SwiftRelay);

    board
}

fn deploy(board: &mut Board, owner: Player, row: usize, cols: &[usize], kind: Kind) {
    for &col in cols {
        board.place_piece(Coord::new(row, col), kind, owner).expect("in bounds, unoccupied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::board::Phase;

    #[test]
    fn both_sides_start_symmetric_and_balanced() {
        let board = default_setup();
        assert_eq!(board.pieces_of(Player::North).len(), board.pieces_of(Player::South).len());
        assert_eq!(board.current_player(), Player::North);
        assert_eq!(board.phase(), Phase::Movement);
        assert_eq!(board.turn_number(), 1);
    }

    #[test]
    fn the_column_directly_in_front_of_each_arsenal_starts_online() {
        // The arsenal's own ray runs straight down column 12, through the
        // cannon and relay stacked in front of it, so those squares at
        // least are online from the first move — the wings must maneuver
        // into the network themselves.
        let mut board = default_setup();
        assert!(board.is_online(Coord::new(INFANTRY_ROW, 12)));
        assert!(board.is_online(Coord::new(CANNON_ROW, 12)));
        assert!(board.is_online(Coord::new(SWIFT_RELAY_ROW, 12)));
    }

    #[test]
    fn encoding_is_stable() {
        let board = default_setup();
        let encoded = crate::battlefield::record::encode_board_only(&board);
        let decoded = crate::battlefield::record::parse_board_only(&encoded).unwrap();
        assert_eq!(crate::battlefield::record::encode_board_only(&decoded), encoded);
    }
}
