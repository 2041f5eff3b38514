use crate::battlefield::consts::{CHARGE_BONUS, CHARGE_STACK_CAP, DIRECTIONS};
use crate::battlefield::coords::Coord;
use crate::battlefield::piece::{Piece, Player};
use crate::errors::{EngineError, EngineResult};

use super::{Action, Board, Phase};

/// The result of resolving an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Outcome {
    Fail,
    Retreat,
    Capture,
}

impl Board {
    /// Attack power contributed by `attacker` against target square `t`,
    /// summed along all 8 radial lines (lines do not stop at intervening
    /// pieces — every attacker on the line contributes), with the cavalry
    /// charge bonus applied per line.
    pub fn attack_power(&mut self, target: Coord, attacker: Player) -> i32 {
        let mut total = 0;
        let target_blocks_charge = self.get(&target).map(|s| s.terrain.blocks_cavalry_charge()).unwrap_or(false);

        for dir in DIRECTIONS {
            let mut cavalry_chain: Vec<(Coord, usize)> = vec![]; // (coord, distance), increasing distance
            let mut cur = target;
            let mut dist = 0usize;
            loop {
                let Some(next) = cur.step(dir) else { break };
                if !self.in_bounds(&next) {
                    break;
                }
                dist += 1;
                if let Ok(sq) = self.get(&next)
                    && let Some(piece) = sq.occupant
                        && piece.owner == attacker {
                            total += self.effective_stats(next).attack;
                            if piece.kind.is_cavalry() {
                                cavalry_chain.push((next, dist));
                            }
                        }
                cur = next;
            }
            total += self.charge_bonus_for_line(&cavalry_chain, target_blocks_charge);
        }
        total
    }

    fn charge_bonus_for_line(&self, chain: &[(Coord, usize)], target_blocks_charge: bool) -> i32 {
        if target_blocks_charge || chain.is_empty() {
            return 0;
        }
        let (_, first_dist) = chain[0];
        if first_dist != 1 {
            return 0;
        }
        let mut bonus = CHARGE_BONUS;
        for window in chain.windows(2) {
            let (_, prev_dist) = window[0];
            let (_, cur_dist) = window[1];
            if cur_dist != prev_dist + 1 || cur_dist > CHARGE_STACK_CAP {
                break;
            }
            bonus += CHARGE_BONUS;
        }
        bonus
    }

    /// Defense power of `defender` at target square `t`: the occupant's
    /// effective defense plus `t`'s terrain bonus (applied exactly once,
    /// regardless of whether `t` is occupied), plus every `defender`-owned
    /// piece contributing its effective defense along the 8 radial lines.
    pub fn defense_power(&mut self, target: Coord, defender: Player) -> i32 {
        let mut total = self.get(&target).map(|s| s.terrain.defense_bonus()).unwrap_or(0);
        if let Ok(sq) = self.get(&target)
            && sq.occupant.is_some_and(|p| p.owner == defender) {
                total += self.effective_stats(target).defense;
            }
        for dir in DIRECTIONS {
            let mut cur = target;
            loop {
                let Some(next) = cur.step(dir) else { break };
                if !self.in_bounds(&next) {
                    break;
                }
                if let Ok(sq) = self.get(&next)
                    && sq.occupant.is_some_and(|p| p.owner == defender) {
                        total += self.effective_stats(next).defense;
                    }
                cur = next;
            }
        }
        total
    }

    /// Whether any `attacker`-owned piece (online or not) lies on some radial
    /// line from `target` — the precondition for attacking an empty square.
    fn has_attacker_on_line(&self, target: Coord, attacker: Player) -> bool {
        for dir in DIRECTIONS {
            let mut cur = target;
            loop {
                let Some(next) = cur.step(dir) else { break };
                if !self.in_bounds(&next) {
                    break;
                }
                if let Ok(sq) = self.get(&next)
                    && sq.occupant.is_some_and(|p| p.owner == attacker) {
                        return true;
                    }
                cur = next;
            }
        }
        false
    }

    fn resolve_outcome(attack: i32, defense: i32) -> Outcome {
        if attack <= defense {
            Outcome::Fail
        } else if attack == defense + 1 {
            Outcome::Retreat
        } else {
            Outcome::Capture
        }
    }

    /// Executes an attack on `target`: computes power, resolves the outcome,
    /// applies the effect, records it, and consumes the turn's attack slot.
    pub fn execute_attack(&mut self, target: Coord) -> EngineResult<Outcome> {
        self.require_not_over()?;
        if self.phase != Phase::Battle {
            return Err(EngineError::WrongPhase { expected: "battle", actual: self.phase.label() });
        }
        if self.attack_this_turn.is_some() {
            return Err(EngineError::AttackBudgetExhausted);
        }
        if !self.retreating_now.is_empty() {
            return Err(EngineError::RetreatPending);
        }
        if !self.in_bounds(&target) {
            return Err(EngineError::OutOfBounds(target));
        }

        let attacker = self.current_player;
        let defender = -attacker;

        if !self.has_attacker_on_line(target, attacker) {
            return Err(EngineError::NoAttackers(target));
        }

        let a = self.attack_power(target, attacker);
        let d = self.defense_power(target, defender);
        let outcome = Self::resolve_outcome(a, d);

        let mut captured: Option<Piece> = None;
        let mut retreats_added: Vec<Coord> = vec![];

        match outcome {
            Outcome::Fail => {}
            Outcome::Retreat => {
                if self.get(&target)?.occupant.is_some_and(|p| p.owner == defender) {
                    self.must_retreat.insert(target);
                    retreats_added.push(target);
                }
            }
            Outcome::Capture => {
                if self.get(&target)?.occupant.is_some_and(|p| p.owner == defender) {
                    captured = self.get(&target)?.occupant;
                    self.get_mut(&target)?.occupant = None;
                    self.mark_dirty();
                }
            }
        }

        self.attack_this_turn = Some(super::AttackSlot { target: Some(target) });
        self.push_action(Action::Attack {
            target,
            outcome,
            attacker,
            captured: captured.map(|p| (p.kind, p.owner)),
            retreats_added,
        });

        Ok(outcome)
    }

    /// Explicit pass during the Battle phase; consumes the attack slot with
    /// no target.
    pub fn pass_attack(&mut self) -> EngineResult<()> {
        self.require_not_over()?;
        if self.phase != Phase::Battle {
            return Err(EngineError::WrongPhase { expected: "battle", actual: self.phase.label() });
        }
        if self.attack_this_turn.is_some() {
            return Err(EngineError::AttackBudgetExhausted);
        }
        if !self.retreating_now.is_empty() {
            return Err(EngineError::RetreatPending);
        }
        self.attack_this_turn = Some(super::AttackSlot { target: None });
        self.push_action(Action::Attack {
            target: Coord::new(0, 0),
            outcome: Outcome::Fail,
            attacker: self.current_player,
            captured: None,
            retreats_added: vec![],
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::piece::Kind;

    fn setup() -> Board {
        Board::empty()
    }

    #[test]
    fn lone_infantry_fails() {
        let mut b = setup();
        b.place_piece(Coord::new(5, 10), Kind::Infantry, Player::North).unwrap();
        b.place_piece(Coord::new(5, 12), Kind::Infantry, Player::South).unwrap();
        // both offline (no arsenal); effective attack/defense both 0 => FAIL
        let a = b.attack_power(Coord::new(5, 12), Player::North);
        let d = b.defense_power(Coord::new(5, 12), Player::South);
        assert_eq!(a, 0);
        assert_eq!(d, 0);
    }

    fn online_board() -> Board {
        let mut b = Board::empty();
        b.set_terrain(Coord::new(5, 0), crate::battlefield::terrain::Terrain::Arsenal(Player::North)).unwrap();
        b.set_terrain(Coord::new(5, 24), crate::battlefield::terrain::Terrain::Arsenal(Player::South)).unwrap();
        b
    }

    #[test]
    fn infantry_vs_infantry_fail() {
        let mut b = online_board();
        b.place_piece(Coord::new(5, 10), Kind::Infantry, Player::North).unwrap();
        b.place_piece(Coord::new(5, 12), Kind::Infantry, Player::South).unwrap();
        let a = b.attack_power(Coord::new(5, 12), Player::North);
        let d = b.defense_power(Coord::new(5, 12), Player::South);
        assert_eq!(a, 4);
        assert_eq!(d, 6);
        assert_eq!(Board::resolve_outcome(a, d), Outcome::Fail);
    }

    #[test]
    fn single_cavalry_charge_retreat() {
        let mut b = online_board();
        b.place_piece(Coord::new(5, 11), Kind::Cavalry, Player::North).unwrap();
        b.place_piece(Coord::new(5, 12), Kind::Infantry, Player::South).unwrap();
        let a = b.attack_power(Coord::new(5, 12), Player::North);
        let d = b.defense_power(Coord::new(5, 12), Player::South);
        assert_eq!(a, 7);
        assert_eq!(d, 6);
        assert_eq!(Board::resolve_outcome(a, d), Outcome::Retreat);
    }

    #[test]
    fn four_chained_cavalry_capture() {
        let mut b = online_board();
        for col in [8, 9, 10, 11] {
            b.place_piece(Coord::new(5, col), Kind::Cavalry, Player::North).unwrap();
        }
        b.place_piece(Coord::new(5, 12), Kind::Infantry, Player::South).unwrap();
        let a = b.attack_power(Coord::new(5, 12), Player::North);
        let d = b.defense_power(Coord::new(5, 12), Player::South);
        assert_eq!(a, 28);
        assert_eq!(d, 6);
        assert_eq!(Board::resolve_outcome(a, d), Outcome::Capture);
    }

    #[test]
    fn cavalry_vs_fortress_no_charge() {
        let mut b = online_board();
        for col in [8, 9, 10, 11] {
            b.place_piece(Coord::new(5, col), Kind::Cavalry, Player::North).unwrap();
        }
        b.set_terrain(Coord::new(5, 12), crate::battlefield::terrain::Terrain::Fortress).unwrap();
        b.place_piece(Coord::new(5, 12), Kind::Infantry, Player::South).unwrap();
        let a = b.attack_power(Coord::new(5, 12), Player::North);
        let d = b.defense_power(Coord::new(5, 12), Player::South);
        assert_eq!(a, 16);
        assert_eq!(d, 10);
        assert_eq!(Board::resolve_outcome(a, d), Outcome::Capture);
    }
}
