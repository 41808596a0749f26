//! Static card catalog and rotation tables.
//!
//! Every card is split into four zones listed in `[NW, NE, SE, SW]` order.
//! Each zone carries a terrain and up to four huts facing north, east, south
//! and west.

use std::collections::BTreeMap;

use crate::{CardId, EngineError, Huts, Terrain, ZoneDescriptor};

/// Read order of raw card zones for each clockwise quarter turn.
///
/// Rotation `r` places raw zone `ROTATION_ORDER[r][q]` into quadrant `q`
/// (NW, NE, SE, SW) and remaps hut flags through the same permutation.
pub const ROTATION_ORDER: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 0, 1, 2], [2, 3, 0, 1], [1, 2, 3, 0]];

/// Raw zones printed on a single card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardDefinition {
    id: CardId,
    zones: [ZoneDescriptor; 4],
}

impl CardDefinition {
    /// Creates a card definition from zones in `[NW, NE, SE, SW]` order.
    #[must_use]
    pub const fn new(id: CardId, zones: [ZoneDescriptor; 4]) -> Self {
        Self { id, zones }
    }

    /// Identifier printed on the card.
    #[must_use]
    pub const fn id(&self) -> CardId {
        self.id
    }

    /// Unrotated zones in `[NW, NE, SE, SW]` order.
    #[must_use]
    pub const fn zones(&self) -> &[ZoneDescriptor; 4] {
        &self.zones
    }
}

/// Lookup table of every card that may be placed.
#[derive(Clone, Debug)]
pub struct CardCatalog {
    cards: BTreeMap<CardId, CardDefinition>,
}

impl CardCatalog {
    /// Catalog of the 24 cards shipped with the game.
    #[must_use]
    pub fn standard() -> Self {
        let cards = STANDARD_CARDS
            .iter()
            .map(|(id, zones)| {
                let id = CardId::new(*id);
                (id, CardDefinition::new(id, (*zones).map(decode_zone)))
            })
            .collect();
        Self { cards }
    }

    /// Builds a catalog from custom definitions, rejecting duplicate identifiers.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = CardDefinition>,
    ) -> Result<Self, EngineError> {
        let mut cards = BTreeMap::new();
        for definition in definitions {
            if cards.insert(definition.id(), definition).is_some() {
                return Err(EngineError::DuplicateCard(definition.id()));
            }
        }
        Ok(Self { cards })
    }

    /// Looks up a card definition.
    pub fn card(&self, id: CardId) -> Result<&CardDefinition, EngineError> {
        self.cards.get(&id).ok_or(EngineError::UnknownCard(id))
    }

    /// Card identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.cards.keys().copied()
    }

    /// Number of cards in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the catalog holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for CardCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Compact zone spelling: terrain followed by north/east/south/west hut bits.
type RawZone = (Terrain, [u8; 4]);

const Y: Terrain = Terrain::Field;
const W: Terrain = Terrain::Water;
const F: Terrain = Terrain::Forest;
const T: Terrain = Terrain::Tower;

const fn decode_zone((terrain, huts): RawZone) -> ZoneDescriptor {
    ZoneDescriptor::new(
        terrain,
        Huts::new(huts[0] != 0, huts[1] != 0, huts[2] != 0, huts[3] != 0),
    )
}

#[rustfmt::skip]
const STANDARD_CARDS: [(u8, [RawZone; 4]); 24] = [
    (1, [(F, [1, 0, 0, 0]), (Y, [0, 1, 0, 0]), (Y, [0, 0, 0, 0]), (F, [0, 0, 0, 0])]),
    (2, [(W, [0, 0, 0, 0]), (T, [0, 0, 0, 0]), (W, [0, 0, 0, 0]), (T, [1, 1, 0, 0])]),
    (3, [(T, [0, 0, 1, 1]), (Y, [0, 0, 0, 0]), (T, [0, 0, 0, 1]), (W, [0, 0, 0, 0])]),
    (4, [(T, [0, 0, 0, 1]), (F, [0, 0, 0, 0]), (W, [0, 0, 0, 0]), (F, [0, 1, 0, 0])]),
    (5, [(W, [0, 0, 0, 0]), (Y, [0, 0, 1, 0]), (W, [0, 0, 0, 0]), (F, [0, 0, 1, 0])]),
    (6, [(T, [0, 0, 0, 0]), (Y, [0, 0, 0, 0]), (F, [0, 0, 1, 0]), (Y, [0, 0, 0, 1])]),
    (7, [(Y, [0, 0, 0, 0]), (Y, [0, 1, 1, 0]), (W, [0, 0, 0, 0]), (W, [0, 0, 0, 0])]),
    (8, [(T, [1, 0, 0, 0]), (F, [0, 1, 0, 0]), (T, [0, 0, 0, 0]), (F, [0, 0, 0, 0])]),
    (9, [(T, [0, 0, 1, 0]), (W, [0, 0, 0, 0]), (F, [1, 0, 0, 0]), (W, [0, 0, 0, 0])]),
    (10, [(Y, [0, 0, 0, 1]), (F, [0, 0, 0, 0]), (W, [0, 0, 0, 0]), (F, [0, 1, 0, 0])]),
    (11, [(Y, [0, 0, 0, 1]), (T, [0, 0, 0, 0]), (Y, [0, 0, 1, 0]), (T, [0, 0, 0, 0])]),
    (12, [(F, [0, 0, 0, 1]), (W, [0, 0, 0, 0]), (W, [0, 0, 0, 0]), (F, [0, 1, 0, 0])]),
    (13, [(Y, [0, 0, 0, 0]), (Y, [0, 0, 0, 0]), (F, [0, 1, 0, 0]), (F, [0, 0, 0, 1])]),
    (14, [(W, [0, 0, 0, 0]), (F, [0, 0, 1, 1]), (W, [0, 0, 0, 0]), (F, [1, 0, 0, 0])]),
    (15, [(W, [0, 0, 0, 0]), (Y, [0, 1, 0, 1]), (T, [0, 0, 0, 0]), (Y, [1, 0, 0, 0])]),
    (16, [(F, [0, 0, 0, 0]), (Y, [0, 0, 0, 0]), (F, [0, 1, 0, 0]), (T, [0, 0, 0, 1])]),
    (17, [(Y, [0, 0, 0, 1]), (Y, [0, 0, 1, 0]), (W, [0, 0, 0, 0]), (W, [0, 0, 0, 0])]),
    (18, [(F, [0, 0, 0, 1]), (Y, [0, 0, 0, 0]), (W, [0, 0, 0, 0]), (Y, [0, 1, 0, 0])]),
    (19, [(T, [1, 0, 0, 0]), (Y, [0, 0, 0, 0]), (T, [0, 0, 0, 0]), (F, [0, 0, 1, 0])]),
    (20, [(W, [0, 0, 0, 0]), (Y, [0, 0, 0, 1]), (W, [0, 0, 0, 0]), (Y, [0, 1, 0, 0])]),
    (21, [(T, [1, 0, 0, 0]), (W, [0, 0, 0, 0]), (T, [1, 0, 0, 0]), (F, [0, 0, 0, 0])]),
    (22, [(Y, [0, 1, 0, 0]), (W, [0, 0, 0, 0]), (T, [0, 0, 0, 1]), (W, [0, 0, 0, 0])]),
    (23, [(W, [0, 0, 0, 0]), (W, [0, 0, 0, 0]), (F, [0, 1, 0, 0]), (F, [0, 0, 1, 0])]),
    (24, [(Y, [1, 0, 0, 1]), (F, [0, 0, 0, 0]), (Y, [0, 0, 0, 0]), (F, [0, 0, 0, 0])]),
];
