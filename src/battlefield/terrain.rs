use crate::battlefield::piece::Player;

/// The terrain tag of a square. Arsenal carries its own ownership overlay
/// rather than reusing the occupant slot, since an arsenal square may
/// simultaneously hold an occupying piece of either side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Terrain {
    Flat,
    Mountain,
    MountainPass,
    Fortress,
    Arsenal(Player),
}

impl Terrain {
    /// Mountains are the only impassable terrain.
    pub fn is_traversable(&self) -> bool {
        !matches!(self, Terrain::Mountain)
    }

    /// Only mountains stop a network ray.
    pub fn blocks_network_ray(&self) -> bool {
        matches!(self, Terrain::Mountain)
    }

    /// The flat defense bonus contributed by standing on this terrain.
    pub fn defense_bonus(&self) -> i32 {
        match self {
            Terrain::MountainPass => 2,
            Terrain::Fortress => 4,
            _ => 0,
        }
    }

    /// Mountain-pass and fortress both suppress the cavalry charge bonus
    /// for an attack targeting a piece standing on them.
    pub fn blocks_cavalry_charge(&self) -> bool {
        matches!(self, Terrain::MountainPass | Terrain::Fortress)
    }

    pub fn arsenal_owner(&self) -> Option<Player> {
        match self {
            Terrain::Arsenal(p) => Some(*p),
            _ => None,
        }
    }
}
