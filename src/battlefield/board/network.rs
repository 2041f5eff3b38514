use std::collections::{HashSet, VecDeque};

use crate::battlefield::consts::DIRECTIONS;
use crate::battlefield::coords::Coord;
use crate::battlefield::piece::{Player, Stats};

use super::{player_index, Board};

impl Board {
    /// The set of squares online-for-`player`: reached by an arsenal ray,
    /// relay forwarding, or proximity to an online friendly piece. Cached
    /// per player and invalidated by any board mutation.
    pub fn online_squares(&mut self, player: Player) -> &HashSet<Coord> {
        let idx = player_index(player);
        if self.network_cache[idx].is_none() {
            self.network_cache[idx] = Some(self.compute_network(player));
        }
        self.network_cache[idx].as_ref().unwrap()
    }

    /// Pure, from-scratch computation of the online-squares set for `player`.
    /// Exposed for the incremental-vs-from-scratch equivalence test.
    pub fn compute_network(&self, player: Player) -> HashSet<Coord> {
        let mut online: HashSet<Coord> = HashSet::new();
        let mut activated_relays: HashSet<Coord> = HashSet::new();
        let mut queue: VecDeque<Coord> = VecDeque::new();

        for arsenal in self.arsenals_of(player) {
            online.insert(arsenal);
            queue.push_back(arsenal);
        }

        while let Some(root) = queue.pop_front() {
            for dir in DIRECTIONS {
                let mut cur = root;
                loop {
                    let Some(next) = cur.step(dir) else { break };
                    if !self.in_bounds(&next) {
                        break;
                    }
                    let square = &self.cells_ref()[next.row][next.col];
                    if square.terrain.blocks_network_ray() {
                        break;
                    }
                    if let Some(occ) = square.occupant {
                        if occ.owner != player {
                            break; // enemy piece blocks; its square is not marked
                        }
                        online.insert(next);
                        if occ.kind.is_relay() && activated_relays.insert(next) {
                            queue.push_back(next);
                        }
                        cur = next;
                        continue;
                    }
                    online.insert(next);
                    cur = next;
                }
            }
        }

        // Proximity phase: empty squares adjacent to an online friendly piece.
        let online_pieces: Vec<Coord> = online
            .iter()
            .copied()
            .filter(|c| {
                self.cells_ref()[c.row][c.col]
                    .occupant
                    .is_some_and(|p| p.owner == player)
            })
            .collect();
        loop {
            let mut added = false;
            for piece_sq in &online_pieces {
                for dir in DIRECTIONS {
                    let Some(n) = piece_sq.step(dir) else { continue };
                    if !self.in_bounds(&n) || online.contains(&n) {
                        continue;
                    }
                    let square = &self.cells_ref()[n.row][n.col];
                    if square.terrain.blocks_network_ray() || square.occupant.is_some() {
                        continue;
                    }
                    online.insert(n);
                    added = true;
                }
            }
            if !added {
                break;
            }
        }

        online
    }

    fn cells_ref(&self) -> &Vec<Vec<super::Square>> {
        &self.grid_ref().0
    }

    pub(crate) fn grid_ref(&self) -> &super::Grid {
        &self.cells
    }

    /// Whether the piece occupying `coord` (if any, owned by its own player)
    /// is online.
    pub fn is_online(&mut self, coord: Coord) -> bool {
        let Ok(sq) = self.get(&coord) else { return false };
        let Some(piece) = sq.occupant else { return false };
        self.online_squares(piece.owner).contains(&coord)
    }

    /// Whether an empty square is online for `player` (movement pathing use).
    pub fn is_square_online(&mut self, coord: Coord, player: Player) -> bool {
        self.online_squares(player).contains(&coord)
    }

    /// A piece's effective stats given its online status. Relays always keep
    /// their base defense/movement even offline.
    pub fn effective_stats(&mut self, coord: Coord) -> Stats {
        let Ok(sq) = self.get(&coord) else { return Stats { attack: 0, defense: 0, movement: 0, attack_range: 0 } };
        let Some(piece) = sq.occupant else { return Stats { attack: 0, defense: 0, movement: 0, attack_range: 0 } };
        let base = piece.kind.base_stats();
        if piece.kind.is_relay() {
            return base;
        }
        if self.is_online(coord) {
            base
        } else {
            Stats { attack: 0, defense: 0, movement: 0, attack_range: 0 }
        }
    }

    /// A piece is "movable" if online, or a relay (relays may move while offline).
    pub fn is_movable(&mut self, coord: Coord) -> bool {
        let Ok(sq) = self.get(&coord) else { return false };
        let Some(piece) = sq.occupant else { return false };
        piece.kind.is_relay() || self.is_online(coord)
    }
}
