use std::collections::{HashSet, VecDeque};

use crate::battlefield::coords::Coord;
use crate::battlefield::piece::Piece;
use crate::battlefield::terrain::Terrain;
use crate::errors::{EngineError, EngineResult};

use super::{Action, Board, Phase};

impl Board {
    /// A square is a legal node of the movement graph (either a pass-through
    /// for a friendly piece, or a landable empty square) for `mover`.
    fn is_movement_node(&mut self, coord: Coord, mover: crate::battlefield::piece::Player) -> bool {
        let Ok(sq) = self.get(&coord) else { return false };
        if !sq.terrain.is_traversable() {
            return false;
        }
        match sq.occupant {
            Some(p) if p.owner != mover => false,
            Some(_) => true, // friendly piece: pass-through only
            None => self.is_square_online(coord, mover),
        }
    }

    /// BFS over the 8-connected movement graph from `from`, bounded to the
    /// piece's effective movement range. Returns the empty squares reachable
    /// as a final stop. Does not check turn budgets or phase — used both by
    /// `generate_legal_moves` and by retreat resolution, which evaluates a
    /// single piece's reachability independent of the normal per-turn rules.
    pub(crate) fn reachable_destinations(&mut self, from: Coord) -> EngineResult<HashSet<Coord>> {
        let Some(piece) = self.get(&from)?.occupant else { return Err(EngineError::EmptySquare(from)) };
        if !self.is_movable(from) {
            return Ok(HashSet::new());
        }
        let range = self.effective_stats(from).movement;
        let mover = piece.owner;

        let mut reachable = HashSet::new();
        if range == 0 {
            return Ok(reachable);
        }

        let mut visited = HashSet::new();
        visited.insert(from);
        let mut frontier = VecDeque::new();
        frontier.push_back((from, 0usize));

        while let Some((cur, dist)) = frontier.pop_front() {
            if dist == range {
                continue;
            }
            for dir in crate::battlefield::consts::DIRECTIONS {
                let Some(next) = cur.step(dir) else { continue };
                if !self.in_bounds(&next) || visited.contains(&next) {
                    continue;
                }
                if !self.is_movement_node(next, mover) {
                    continue;
                }
                visited.insert(next);
                let next_dist = dist + 1;
                if self.get(&next)?.occupant.is_none() {
                    reachable.insert(next);
                }
                frontier.push_back((next, next_dist));
            }
        }

        Ok(reachable)
    }

    /// Legal destinations for the piece at `from`, honouring the full
    /// per-turn legality predicate (phase, budgets, retreat obligations).
    pub fn generate_legal_moves(&mut self, from: Coord) -> EngineResult<HashSet<Coord>> {
        self.require_legality_preconditions(from)?;
        self.reachable_destinations(from)
    }

    fn require_legality_preconditions(&mut self, from: Coord) -> EngineResult<()> {
        self.require_not_over()?;
        if self.phase != Phase::Movement {
            return Err(EngineError::WrongPhase { expected: "movement", actual: self.phase.label() });
        }
        if self.moves_this_turn.len() >= crate::battlefield::consts::MAX_MOVES_PER_TURN {
            return Err(EngineError::MoveBudgetExhausted);
        }
        let sq = self.get(&from)?;
        let Some(piece) = sq.occupant else { return Err(EngineError::EmptySquare(from)) };
        if piece.owner != self.current_player {
            return Err(EngineError::NotYourPiece(from));
        }
        if self.moved_piece_ids.contains(&piece.id) {
            return Err(EngineError::AlreadyMoved(from));
        }
        if !self.retreating_now.is_empty() && !self.retreating_now.contains(&from) {
            return Err(EngineError::RetreatPending);
        }
        Ok(())
    }

    /// Validates a proposed move without mutating state.
    pub fn validate_move(&mut self, from: Coord, to: Coord) -> bool {
        match self.generate_legal_moves(from) {
            Ok(set) => set.contains(&to),
            Err(_) => false,
        }
    }

    /// Executes a move, returning the piece moved and whether it destroyed an
    /// enemy arsenal. Fully transactional: on any failure nothing is mutated.
    pub fn execute_move(&mut self, from: Coord, to: Coord) -> EngineResult<(Piece, bool)> {
        let legal = self.generate_legal_moves(from)?;
        if !legal.contains(&to) {
            if !self.is_movable(from) {
                return Err(EngineError::PieceOffline(from));
            }
            if !self.in_bounds(&to) {
                return Err(EngineError::OutOfBounds(to));
            }
            if !self.get(&to)?.terrain.is_traversable() {
                return Err(EngineError::Impassable(to));
            }
            if self.get(&to)?.occupant.is_some() {
                return Err(EngineError::SquareOccupied(to));
            }
            if from.chebyshev(&to) > self.effective_stats(from).movement {
                return Err(EngineError::ExceedsRange(to));
            }
            return Err(EngineError::NoPath(to));
        }

        let piece = self.get(&from)?.occupant.unwrap();
        let was_retreating = self.retreating_now.contains(&from);

        let arsenal_destroyed_owner = match self.get(&to)?.terrain {
            Terrain::Arsenal(owner) if owner != piece.owner => Some(owner),
            _ => None,
        };

        self.get_mut(&from)?.occupant = None;
        self.get_mut(&to)?.occupant = Some(piece);
        if arsenal_destroyed_owner.is_some() {
            self.get_mut(&to)?.terrain = Terrain::Flat;
        }

        if was_retreating {
            self.retreating_now.remove(&from);
        }
        self.must_retreat.remove(&from);
        self.moves_this_turn.push((from, to));
        self.moved_piece_ids.insert(piece.id);
        self.mark_dirty();

        self.push_action(Action::Move {
            from,
            to,
            piece_id: piece.id,
            kind: piece.kind,
            owner: piece.owner,
            was_retreating,
            arsenal_destroyed_owner,
        });

        if arsenal_destroyed_owner.is_some() {
            self.end_turn_after_arsenal_destruction()?;
        }

        Ok((piece, arsenal_destroyed_owner.is_some()))
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::piece::{Kind, Player};

    #[test]
    fn offline_infantry_cannot_move() {
        let mut b = Board::empty();
        b.place_piece(Coord::new(5, 10), Kind::Infantry, Player::North).unwrap();
        // offline infantry has movement 0 with no arsenal on the board
        let moves = b.generate_legal_moves(Coord::new(5, 10)).unwrap();
        assert!(moves.is_empty());
    }

    #[test]
    fn online_infantry_moves_and_undoes() {
        let mut b = Board::empty();
        b.place_piece(Coord::new(10, 12), Kind::Infantry, Player::North).unwrap();
        b.set_terrain(Coord::new(5, 10), Terrain::Arsenal(Player::North)).unwrap();
        b.place_piece(Coord::new(5, 10), Kind::Infantry, Player::North).unwrap();
        let moves = b.generate_legal_moves(Coord::new(5, 10)).unwrap();
        assert_eq!(moves.len(), 8);
        let (_piece, destroyed) = b.execute_move(Coord::new(5, 10), Coord::new(6, 11)).unwrap();
        assert!(!destroyed);
        assert!(b.get(&Coord::new(5, 10)).unwrap().occupant.is_none());
        assert!(b.get(&Coord::new(6, 11)).unwrap().occupant.is_some());
        b.undo().unwrap();
        assert!(b.get(&Coord::new(5, 10)).unwrap().occupant.is_some());
        assert!(b.get(&Coord::new(6, 11)).unwrap().occupant.is_none());
        b.redo().unwrap();
        assert!(b.get(&Coord::new(6, 11)).unwrap().occupant.is_some());
    }

    #[test]
    fn wall_with_gap_edge_case() {
        let mut b = Board::empty();
        // The arsenal's own ray covers row 5 and column 10, which keeps the
        // infantry and its empty neighbours online without relying on the
        // proximity phase.
        b.set_terrain(Coord::new(5, 0), Terrain::Arsenal(Player::North)).unwrap();
        b.place_piece(Coord::new(5, 10), Kind::Infantry, Player::North).unwrap();
        b.place_piece(Coord::new(6, 11), Kind::Infantry, Player::South).unwrap();
        b.place_piece(Coord::new(6, 12), Kind::Infantry, Player::South).unwrap();
        b.place_piece(Coord::new(6, 13), Kind::Infantry, Player::South).unwrap();

        let moves = b.generate_legal_moves(Coord::new(5, 10)).unwrap();
        assert!(!moves.contains(&Coord::new(6, 11)), "enemy-occupied square must not be a destination");
        for expected in [Coord::new(6, 10), Coord::new(5, 11), Coord::new(4, 10), Coord::new(4, 11)] {
            assert!(moves.contains(&expected), "expected {expected} reachable");
        }
    }
}
