use crate::battlefield::coords::Coord;
use crate::battlefield::piece::{Kind, Player};
use crate::errors::EngineResult;

use super::Board;

impl Board {
    /// Processes `player`'s must-retreat set at the start of their turn.
    /// Each obligated piece with no legal destination is captured; otherwise
    /// it is transferred into `retreating_now` and must be moved this turn
    /// before anything else. Returns the squares whose occupants were
    /// captured by this resolution (for the turn-boundary record and for
    /// reporting to the front-end).
    pub(crate) fn resolve_retreats(&mut self, player: Player) -> EngineResult<Vec<(Coord, Kind, Player)>> {
        let pending: Vec<Coord> = self
            .must_retreat
            .iter()
            .copied()
            .filter(|c| self.get(c).map(|s| s.occupant.is_some_and(|p| p.owner == player)).unwrap_or(false))
            .collect();

        let mut captured = vec![];
        for coord in pending {
            self.must_retreat.remove(&coord);
            let destinations = self.reachable_destinations(coord)?;
            if destinations.is_empty() {
                if let Some(piece) = self.get(&coord)?.occupant {
                    captured.push((coord, piece.kind, piece.owner));
                    self.get_mut(&coord)?.occupant = None;
                    self.mark_dirty();
                }
            } else {
                self.retreating_now.insert(coord);
            }
        }
        Ok(captured)
    }
}
