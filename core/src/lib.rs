#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Limes territory engine.
//!
//! This crate defines the vocabulary that connects adapters, the authoritative
//! board, and pure systems. Adapters submit [`Command`] values describing
//! desired mutations, the world executes those commands via its `apply` entry
//! point and broadcasts [`Event`] values. Systems read immutable map snapshots
//! and never mutate the board directly.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod catalog;

pub use catalog::{CardCatalog, CardDefinition, ROTATION_ORDER};

/// Maximum number of cards along either axis of the board.
pub const MAX_BOARD_CARDS: i32 = 4;

/// Integer coordinate on either the fine zone grid or the coarse card grid.
///
/// Points order lexicographically by `x`, then `y`, and render as the
/// canonical `"x,y"` key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    /// Creates a new point from its components.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component, growing eastwards.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component, growing southwards.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Point one unit away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Orthogonal neighbours paired with the direction of travel, in N, E, S, W order.
    #[must_use]
    pub const fn neighbors(self) -> [(Point, Direction); 4] {
        [
            (self.step(Direction::North), Direction::North),
            (self.step(Direction::East), Direction::East),
            (self.step(Direction::South), Direction::South),
            (self.step(Direction::West), Direction::West),
        ]
    }

    /// Surrounding points, including the four diagonals when requested.
    pub fn adjacent(self, diagonals: bool) -> impl Iterator<Item = Point> {
        const DIAGONALS: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

        let take = if diagonals { DIAGONALS.len() } else { 0 };
        self.neighbors()
            .into_iter()
            .map(|(point, _)| point)
            .chain(
                DIAGONALS
                    .into_iter()
                    .take(take)
                    .map(move |(dx, dy)| Point::new(self.x + dx, self.y + dy)),
            )
    }

    /// Card that contains this zone coordinate.
    #[must_use]
    pub const fn card(self) -> Self {
        Self::new(self.x.div_euclid(2), self.y.div_euclid(2))
    }

    /// Quadrant of this zone within its card, as `(0|1, 0|1)` column/row offsets.
    #[must_use]
    pub const fn quadrant(self) -> (i32, i32) {
        (self.x.rem_euclid(2), self.y.rem_euclid(2))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Failure to parse the canonical `"x,y"` point key.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("expected a point formatted as `x,y`, found `{0}`")]
pub struct ParsePointError(String);

impl FromStr for Point {
    type Err = ParsePointError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ParsePointError(value.to_owned());
        let (x, y) = value.trim().split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse::<i32>().map_err(|_| invalid())?;
        let y = y.trim().parse::<i32>().map_err(|_| invalid())?;
        Ok(Self::new(x, y))
    }
}

/// Cardinal directions on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Towards decreasing `y`.
    North,
    /// Towards increasing `x`.
    East,
    /// Towards increasing `y`.
    South,
    /// Towards decreasing `x`.
    West,
}

impl Direction {
    /// All directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Clockwise index of the direction, north being zero.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Direction with the provided clockwise index, wrapping modulo four.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        self.turned(Turn::Reverse)
    }

    /// Direction faced after performing the provided turn.
    #[must_use]
    pub const fn turned(self, turn: Turn) -> Self {
        Self::from_index(self.index() + turn.quarter_turns())
    }

    const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Relative turn performed by a walker facing some direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Turn {
    /// Quarter turn counter-clockwise.
    Left,
    /// Keep the current heading.
    Straight,
    /// Quarter turn clockwise.
    Right,
    /// Half turn.
    Reverse,
}

impl Turn {
    /// Turns in the order a left-hand wall follower tries them.
    pub const PREFERENCE: [Turn; 4] = [Turn::Left, Turn::Straight, Turn::Right, Turn::Reverse];

    /// Clockwise quarter turns equivalent to this turn.
    #[must_use]
    pub const fn quarter_turns(self) -> usize {
        match self {
            Self::Straight => 0,
            Self::Right => 1,
            Self::Reverse => 2,
            Self::Left => 3,
        }
    }
}

/// Corner of a zone square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Corner {
    /// Top-left corner.
    NorthWest,
    /// Top-right corner.
    NorthEast,
    /// Bottom-right corner.
    SouthEast,
    /// Bottom-left corner.
    SouthWest,
}

impl Corner {
    /// Corners in clockwise order starting at the top-left.
    pub const CLOCKWISE: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthEast,
        Corner::SouthWest,
    ];

    /// Corner between the two sides on the left and ahead of a walker facing `facing`.
    #[must_use]
    pub const fn front_left(facing: Direction) -> Self {
        Self::CLOCKWISE[facing.index()]
    }

    /// Corner between the two sides on the right and ahead of a walker facing `facing`.
    #[must_use]
    pub const fn front_right(facing: Direction) -> Self {
        Self::CLOCKWISE[(facing.index() + 1) % 4]
    }

    /// Corner between the two sides on the left and behind a walker facing `facing`.
    #[must_use]
    pub const fn back_left(facing: Direction) -> Self {
        Self::CLOCKWISE[(facing.index() + 3) % 4]
    }
}

/// Terrain covering a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Terrain {
    /// Yellow field, written `Y`.
    Field,
    /// Water, written `W`.
    Water,
    /// Forest, written `F`.
    Forest,
    /// Tower, written `T`. Towers never merge into larger territories.
    Tower,
}

impl Terrain {
    /// Single-letter code used by the card catalog.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Field => 'Y',
            Self::Water => 'W',
            Self::Forest => 'F',
            Self::Tower => 'T',
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Hut markers drawn against the edges of a zone, indexed by [`Direction`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Huts([bool; 4]);

impl Huts {
    /// Zone without any huts.
    pub const NONE: Huts = Huts([false; 4]);

    /// Creates a hut set from flags in north, east, south, west order.
    #[must_use]
    pub const fn new(north: bool, east: bool, south: bool, west: bool) -> Self {
        Self([north, east, south, west])
    }

    /// Whether a hut faces the provided direction.
    #[must_use]
    pub const fn faces(&self, direction: Direction) -> bool {
        self.0[direction.index()]
    }

    /// Number of huts on the zone.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.0.iter().map(|&hut| u32::from(hut)).sum()
    }

    /// Remaps the flags through a rotation read order: output direction `i`
    /// receives the raw flag at `order[i]`.
    #[must_use]
    pub const fn rotated(self, order: [usize; 4]) -> Self {
        Self([
            self.0[order[0]],
            self.0[order[1]],
            self.0[order[2]],
            self.0[order[3]],
        ])
    }
}

/// Terrain and hut layout of a single zone after rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneDescriptor {
    terrain: Terrain,
    huts: Huts,
}

impl ZoneDescriptor {
    /// Creates a new zone descriptor.
    #[must_use]
    pub const fn new(terrain: Terrain, huts: Huts) -> Self {
        Self { terrain, huts }
    }

    /// Terrain covering the zone.
    #[must_use]
    pub const fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Huts drawn on the zone.
    #[must_use]
    pub const fn huts(&self) -> Huts {
        self.huts
    }

    /// Same zone with its huts remapped through a rotation read order.
    #[must_use]
    pub const fn rotated(self, order: [usize; 4]) -> Self {
        Self::new(self.terrain, self.huts.rotated(order))
    }
}

impl fmt::Display for ZoneDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.terrain)?;
        for direction in Direction::ALL {
            write!(f, "{}", u8::from(self.huts.faces(direction)))?;
        }
        Ok(())
    }
}

/// Identifier of a card within the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(u8);

impl CardId {
    /// Creates a new card identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Numeric value printed on the card.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Clockwise quarter turns applied to a placed card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Rotation(u8);

impl Rotation {
    /// Card drawn upright.
    pub const UPRIGHT: Rotation = Rotation(0);

    /// Creates a rotation, wrapping the quarter-turn count modulo four.
    #[must_use]
    pub const fn from_quarter_turns(turns: u32) -> Self {
        Self((turns % 4) as u8)
    }

    /// Quarter turns in `0..4`.
    #[must_use]
    pub const fn quarter_turns(&self) -> u8 {
        self.0
    }

    /// Rotation one further quarter turn clockwise.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        Self::from_quarter_turns(self.0 as u32 + 1)
    }

    /// Read order used to lay the card's raw zones into quadrants.
    #[must_use]
    pub const fn read_order(self) -> [usize; 4] {
        ROTATION_ORDER[self.0 as usize]
    }
}

impl From<u8> for Rotation {
    fn from(value: u8) -> Self {
        Self::from_quarter_turns(u32::from(value))
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> Self {
        rotation.0
    }
}

/// A card laid on the coarse card grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Card grid coordinate of the placed card.
    pub position: Point,
    /// Catalog identifier of the card.
    pub card: CardId,
    /// Rotation applied to the card.
    pub rotation: Rotation,
}

impl Placement {
    /// Creates a new placement descriptor.
    #[must_use]
    pub const fn new(position: Point, card: CardId, rotation: Rotation) -> Self {
        Self {
            position,
            card,
            rotation,
        }
    }
}

/// Optional rule modifiers. Each flag toggles independently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variants {
    /// Cards may also be placed diagonally next to existing cards.
    pub diagonals: bool,
    /// Occupied water territories ferry workers and field adjacency one hop further.
    pub ferrymen: bool,
    /// Professional scoring bonuses for every terrain.
    pub profis: bool,
}

/// Failure to parse a comma-separated variant list.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown variant `{0}`; expected one of diagonals, ferrymen, profis")]
pub struct ParseVariantsError(String);

impl FromStr for Variants {
    type Err = ParseVariantsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut variants = Self::default();
        for name in value.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            match name {
                "diagonals" => variants.diagonals = true,
                "ferrymen" => variants.ferrymen = true,
                "profis" => variants.profis = true,
                other => return Err(ParseVariantsError(other.to_owned())),
            }
        }
        Ok(variants)
    }
}

/// Identifier of a territory, stable only within a single map build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerritoryId(u32);

impl TerritoryId {
    /// Creates a new territory identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Commands that express all permissible board mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the active rule variants.
    ConfigureVariants {
        /// Variants to activate.
        variants: Variants,
    },
    /// Lays a provisional card that is not yet confirmed.
    ProposeCard {
        /// Proposed position, card and rotation.
        placement: Placement,
    },
    /// Turns the provisional card one quarter clockwise.
    RotateProvisionalCard,
    /// Takes the provisional card back off the board.
    WithdrawProvisionalCard,
    /// Commits the provisional card to the board.
    ConfirmCard,
    /// Removes the most recently confirmed card.
    UndoCard,
    /// Puts a worker onto a zone.
    PlaceWorker {
        /// Zone receiving the worker.
        zone: Point,
    },
    /// Takes one worker off a zone.
    RemoveWorker {
        /// Zone losing a worker.
        zone: Point,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that new rule variants are active.
    VariantsChanged {
        /// Variants now in effect.
        variants: Variants,
    },
    /// The provisional card was laid, rotated, or withdrawn.
    ProvisionalCardChanged {
        /// Provisional card now on the board, if any.
        placement: Option<Placement>,
    },
    /// A card proposal or confirmation was refused.
    CardRejected {
        /// Card position named by the rejected request, if it named one.
        position: Option<Point>,
        /// Specific reason the request failed.
        reason: PlacementError,
    },
    /// A card was committed to the board.
    CardConfirmed {
        /// Committed placement.
        placement: Placement,
    },
    /// The most recent card was taken back.
    CardUndone {
        /// Placement that was removed.
        placement: Placement,
    },
    /// The zone grid and territories were rebuilt from scratch.
    MapRebuilt {
        /// Number of zones on the rebuilt map.
        zones: usize,
        /// Number of territories on the rebuilt map.
        territories: usize,
    },
    /// A worker was put onto a zone.
    WorkerPlaced {
        /// Zone receiving the worker.
        zone: Point,
    },
    /// A worker left the board.
    WorkerRemoved {
        /// Zone the worker stood on.
        zone: Point,
    },
    /// A worker request was refused.
    WorkerRejected {
        /// Zone named by the rejected request.
        zone: Point,
        /// Specific reason the request failed.
        reason: WorkerError,
    },
}

/// Reasons a card request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The card identifier is not part of the catalog.
    UnknownCard,
    /// Another card already occupies the position.
    Occupied,
    /// The position does not touch any confirmed card.
    Detached,
    /// The board would grow beyond four cards along an axis.
    OutOfBounds,
    /// There is no provisional card to act upon.
    NoProvisionalCard,
    /// There is no confirmed card to take back.
    NothingToUndo,
}

/// Reasons a worker request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerError {
    /// The zone is not covered by any card.
    NoZone,
    /// No worker stands on the zone.
    NoWorker,
}

/// Invariant violations raised by the engine.
///
/// These indicate a bug in the caller or in catalog data and never occur
/// during normal play.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A placement referenced a card missing from the catalog.
    #[error("card {0} is not present in the catalog")]
    UnknownCard(CardId),
    /// A catalog defined the same card twice.
    #[error("card {0} is defined more than once in the catalog")]
    DuplicateCard(CardId),
    /// A worker stands on a zone that belongs to no territory.
    #[error("worker at zone {0} does not stand on any territory")]
    WorkerOutsideMap(Point),
    /// A boundary walk reached a zone with no neighbour in its territory.
    #[error("territory zone {0} is not connected to the rest of its territory")]
    DisconnectedTerritory(Point),
    /// A boundary walk failed to return to its starting state.
    #[error("boundary trace starting at zone {0} did not close")]
    UnclosedBoundary(Point),
}
