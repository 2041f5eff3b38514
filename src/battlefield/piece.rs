use std::fmt;
use std::ops::Neg;

/// The two sides. NORTH holds rows 0..10, SOUTH holds rows 10..20 at setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Player {
    North,
    South,
}

impl Player {
    pub fn notate(&self) -> char {
        match self {
            Player::North => 'N',
            Player::South => 'S',
        }
    }

    /// Whether the given letter case corresponds to this player under the
    /// board-only encoding's convention (uppercase = NORTH, lowercase = SOUTH).
    pub fn from_case(upper: bool) -> Player {
        if upper { Player::North } else { Player::South }
    }

    pub fn is_upper(&self) -> bool {
        matches!(self, Player::North)
    }
}

impl Neg for Player {
    type Output = Player;
    fn neg(self) -> Player {
        match self {
            Player::North => Player::South,
            Player::South => Player::North,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.notate())
    }
}

/// The seven unit kinds. Arsenal is listed for completeness of the catalog
/// but is never constructed as a `Piece` — it is represented purely as
/// terrain (see `terrain::Terrain::Arsenal`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Kind {
    Infantry,
    Cavalry,
    Cannon,
    SwiftCannon,
    Relay,
    SwiftRelay,
}

/// Base stats for a unit kind, before any online/offline or terrain adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    pub attack: i32,
    pub defense: i32,
    pub movement: usize,
    pub attack_range: usize,
}

impl Kind {
    pub fn base_stats(&self) -> Stats {
        match self {
            Kind::Infantry => Stats { attack: 4, defense: 6, movement: 1, attack_range: 2 },
            Kind::Cavalry => Stats { attack: 4, defense: 5, movement: 2, attack_range: 2 },
            Kind::Cannon => Stats { attack: 5, defense: 8, movement: 1, attack_range: 3 },
            Kind::SwiftCannon => Stats { attack: 5, defense: 8, movement: 2, attack_range: 3 },
            Kind::Relay => Stats { attack: 0, defense: 1, movement: 1, attack_range: 0 },
            Kind::SwiftRelay => Stats { attack: 0, defense: 1, movement: 2, attack_range: 0 },
        }
    }

    /// Relays keep their base defense/movement even while offline; every
    /// other unit kind goes fully inert when cut off from the network.
    pub fn is_relay(&self) -> bool {
        matches!(self, Kind::Relay | Kind::SwiftRelay)
    }

    pub fn is_cavalry(&self) -> bool {
        matches!(self, Kind::Cavalry)
    }

    pub fn notate(&self) -> char {
        match self {
            Kind::Infantry => 'I',
            Kind::Cavalry => 'C',
            Kind::Cannon => 'K',
            Kind::SwiftCannon => 'W',
            Kind::Relay => 'R',
            Kind::SwiftRelay => 'X',
        }
    }

    pub fn from_letter(c: char) -> Option<Kind> {
        match c.to_ascii_uppercase() {
            'I' => Some(Kind::Infantry),
            'C' => Some(Kind::Cavalry),
            'K' => Some(Kind::Cannon),
            'W' => Some(Kind::SwiftCannon),
            'R' => Some(Kind::Relay),
            'X' => Some(Kind::SwiftRelay),
            _ => None,
        }
    }
}

/// A unit on the board. `id` is a stable identity assigned at placement time;
/// it survives moves and is what the action log uses to re-find a piece
/// after undo/redo, independent of its current square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub id: u32,
    pub kind: Kind,
    pub owner: Player,
}

impl Piece {
    pub fn new(id: u32, kind: Kind, owner: Player) -> Piece {
        Piece { id, kind, owner }
    }

    /// The letter used in the board-only encoding: uppercase for NORTH,
    /// lowercase for SOUTH.
    pub fn notate(&self) -> char {
        let c = self.kind.notate();
        if self.owner.is_upper() { c } else { c.to_ascii_lowercase() }
    }
}
