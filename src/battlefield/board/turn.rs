use crate::errors::{EngineError, EngineResult};

use super::{Action, Board, Phase};

impl Board {
    /// Explicit Movement -> Battle transition. Rejected while any of the
    /// current player's pieces are still discharging a retreat obligation.
    pub fn switch_to_battle(&mut self) -> EngineResult<()> {
        self.require_not_over()?;
        if self.phase != Phase::Movement {
            return Err(EngineError::WrongPhase { expected: "movement", actual: self.phase.label() });
        }
        if !self.retreating_now.is_empty() {
            return Err(EngineError::RetreatsBlockPhaseChange);
        }
        self.phase = Phase::Battle;
        Ok(())
    }

    /// Ends the current turn: records a turn-boundary action, swaps the
    /// current player, increments the turn number, resets per-turn
    /// bookkeeping, resolves the new current player's pending retreats, and
    /// runs victory detection. Returns the squares captured by retreat
    /// resolution.
    pub fn end_turn(&mut self) -> EngineResult<Vec<crate::battlefield::coords::Coord>> {
        self.require_not_over()?;
        if !self.retreating_now.is_empty() {
            return Err(EngineError::RetreatPending);
        }

        let prior_player = self.current_player;
        let prior_turn_number = self.turn_number;
        let prior_phase = self.phase;
        let prior_moves = self.moves_this_turn.clone();
        let prior_attack = self.attack_this_turn;
        let prior_must_retreat = self.must_retreat.clone();
        let prior_retreating_now = self.retreating_now.clone();

        self.current_player = -self.current_player;
        self.turn_number += 1;
        self.phase = Phase::Movement;
        self.moves_this_turn.clear();
        self.moved_piece_ids.clear();
        self.attack_this_turn = None;

        let captured = self.resolve_retreats(self.current_player)?;

        self.push_action(Action::TurnBoundary {
            prior_player,
            prior_turn_number,
            prior_phase,
            prior_moves,
            prior_attack,
            prior_must_retreat,
            prior_retreating_now,
            captured_by_retreat: captured.clone(),
        });

        self.evaluate_victory();

        Ok(captured.into_iter().map(|(c, _, _)| c).collect())
    }

    /// Invoked by `execute_move` when a move destroys an enemy arsenal: this
    /// counts as the player's attack action, so the turn ends immediately
    /// (the Battle phase is skipped for this turn).
    pub(crate) fn end_turn_after_arsenal_destruction(&mut self) -> EngineResult<Vec<crate::battlefield::coords::Coord>> {
        self.end_turn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::coords::Coord;
    use crate::battlefield::piece::{Kind, Player};
    use crate::battlefield::terrain::Terrain;
    use crate::errors::EngineError;

    #[test]
    fn move_budget_then_attack_budget_then_swap() {
        let mut b = Board::empty();
        b.set_terrain(Coord::new(5, 0), Terrain::Arsenal(Player::North)).unwrap();
        let squares = [(5, 10), (5, 12), (5, 14), (5, 16), (5, 18), (5, 20)];
        for &(r, c) in &squares {
            b.place_piece(Coord::new(r, c), Kind::Infantry, Player::North).unwrap();
        }

        for &(r, c) in &squares[..5] {
            let from = Coord::new(r, c);
            let to = b.generate_legal_moves(from).unwrap().into_iter().next().unwrap();
            b.execute_move(from, to).unwrap();
        }
        let sixth = Coord::new(squares[5].0, squares[5].1);
        assert_eq!(b.generate_legal_moves(sixth).unwrap_err(), EngineError::MoveBudgetExhausted);

        b.switch_to_battle().unwrap();
        b.pass_attack().unwrap();
        assert_eq!(b.pass_attack().unwrap_err(), EngineError::AttackBudgetExhausted);

        let player_before = b.current_player();
        b.end_turn().unwrap();
        assert_ne!(b.current_player(), player_before);
        assert_eq!(b.turn_number(), 2);
    }

    #[test]
    fn switch_to_battle_rejected_while_retreat_pending() {
        let mut b = Board::empty();
        b.set_terrain(Coord::new(5, 0), Terrain::Arsenal(Player::North)).unwrap();
        b.place_piece(Coord::new(5, 10), Kind::Infantry, Player::North).unwrap();
        b.must_retreat.insert(Coord::new(5, 10));
        b.retreating_now.insert(Coord::new(5, 10));
        assert_eq!(b.switch_to_battle().unwrap_err(), EngineError::RetreatsBlockPhaseChange);
    }
}
