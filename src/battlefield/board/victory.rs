use crate::battlefield::piece::Player;

use super::Board;

/// The outcome of the game so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameResult {
    Ongoing,
    NorthWins,
    SouthWins,
    Draw,
}

impl Board {
    /// An explicit surrender overrides all other signals for the
    /// surrendering player.
    pub fn surrender(&mut self, player: Player) -> crate::errors::EngineResult<()> {
        self.require_not_over()?;
        self.result = match player {
            Player::North => GameResult::SouthWins,
            Player::South => GameResult::NorthWins,
        };
        Ok(())
    }

    fn is_annihilated(&self, player: Player) -> bool {
        self.pieces_of(player).is_empty()
    }

    fn is_network_collapsed(&mut self, player: Player) -> bool {
        if self.is_annihilated(player) {
            return false;
        }
        let has_arsenals = !self.arsenals_of(player).is_empty();
        let has_online_pieces = self
            .pieces_of(player)
            .into_iter()
            .any(|(c, _)| self.is_online(c));
        !has_arsenals || !has_online_pieces
    }

    /// Evaluates victory conditions and updates `result` if the game has
    /// just become decided. Total annihilation outranks network collapse
    /// when labelling the cause if both players lose simultaneously; if both
    /// are defeated by either cause, the result is a draw.
    pub fn evaluate_victory(&mut self) {
        if self.is_over() {
            return;
        }
        let north_annihilated = self.is_annihilated(Player::North);
        let south_annihilated = self.is_annihilated(Player::South);
        let north_collapsed = self.is_network_collapsed(Player::North);
        let south_collapsed = self.is_network_collapsed(Player::South);

        let north_defeated = north_annihilated || north_collapsed;
        let south_defeated = south_annihilated || south_collapsed;

        self.result = match (north_defeated, south_defeated) {
            (true, true) => GameResult::Draw,
            (true, false) => GameResult::SouthWins,
            (false, true) => GameResult::NorthWins,
            (false, false) => GameResult::Ongoing,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::coords::Coord;
    use crate::battlefield::piece::Kind;
    use crate::battlefield::terrain::Terrain;
    use crate::battlefield::board::Board;

    #[test]
    fn annihilation_hands_victory_to_the_survivor() {
        let mut b = Board::empty();
        b.set_terrain(Coord::new(5, 0), Terrain::Arsenal(Player::North)).unwrap();
        b.place_piece(Coord::new(5, 5), Kind::Infantry, Player::North).unwrap();
        b.evaluate_victory();
        assert_eq!(b.result(), GameResult::NorthWins);
    }

    #[test]
    fn mutual_annihilation_is_a_draw() {
        let b = Board::empty();
        let mut b = b;
        b.evaluate_victory();
        assert_eq!(b.result(), GameResult::Draw);
    }

    #[test]
    fn losing_your_last_arsenal_collapses_your_network() {
        let mut b = Board::empty();
        b.set_terrain(Coord::new(0, 0), Terrain::Arsenal(Player::North)).unwrap();
        b.place_piece(Coord::new(5, 5), Kind::Infantry, Player::North).unwrap();
        b.set_terrain(Coord::new(10, 0), Terrain::Arsenal(Player::South)).unwrap();
        b.place_piece(Coord::new(10, 5), Kind::Infantry, Player::South).unwrap();
        b.set_terrain(Coord::new(0, 0), Terrain::Flat).unwrap();
        b.evaluate_victory();
        assert_eq!(b.result(), GameResult::SouthWins);
    }

    #[test]
    fn surrender_overrides_network_state() {
        let mut b = Board::empty();
        b.set_terrain(Coord::new(0, 0), Terrain::Arsenal(Player::North)).unwrap();
        b.place_piece(Coord::new(0, 1), Kind::Infantry, Player::North).unwrap();
        b.place_piece(Coord::new(10, 10), Kind::Infantry, Player::South).unwrap();
        b.surrender(Player::North).unwrap();
        assert_eq!(b.result(), GameResult::SouthWins);
        assert!(b.surrender(Player::South).is_err());
    }

    #[test]
    fn online_survivor_keeps_the_game_ongoing() {
        let mut b = Board::empty();
        b.set_terrain(Coord::new(5, 0), Terrain::Arsenal(Player::North)).unwrap();
        b.place_piece(Coord::new(5, 5), Kind::Infantry, Player::North).unwrap();
        b.set_terrain(Coord::new(10, 0), Terrain::Arsenal(Player::South)).unwrap();
        b.place_piece(Coord::new(10, 5), Kind::Infantry, Player::South).unwrap();
        b.evaluate_victory();
        assert_eq!(b.result(), GameResult::Ongoing);
    }
}
