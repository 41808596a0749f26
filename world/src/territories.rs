//! Grouping of zones into territories.

use std::{
    cell::OnceCell,
    collections::{BTreeMap, BTreeSet},
};

use limes_core::{CardCatalog, EngineError, Placement, Point, Terrain, TerritoryId};

use crate::{
    outline::{trace_outline, Outline},
    zones::{build_zone_grid, ZoneGrid},
};

/// Maximal connected region of same-terrain zones. Towers are always alone.
#[derive(Clone, Debug)]
pub struct Territory {
    id: TerritoryId,
    terrain: Terrain,
    zones: BTreeSet<Point>,
    bordering_zones: BTreeSet<Point>,
    neighbors: BTreeSet<TerritoryId>,
    hut_count: u32,
    outline: OnceCell<Outline>,
}

impl Territory {
    fn new(id: TerritoryId, terrain: Terrain, zone: Point) -> Self {
        Self {
            id,
            terrain,
            zones: BTreeSet::from([zone]),
            bordering_zones: BTreeSet::new(),
            neighbors: BTreeSet::new(),
            hut_count: 0,
            outline: OnceCell::new(),
        }
    }

    /// Identifier of the territory within its map build.
    #[must_use]
    pub const fn id(&self) -> TerritoryId {
        self.id
    }

    /// Terrain shared by every zone of the territory.
    #[must_use]
    pub const fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Member zones.
    #[must_use]
    pub const fn zones(&self) -> &BTreeSet<Point> {
        &self.zones
    }

    /// Zones outside the territory that share an edge with it.
    #[must_use]
    pub const fn bordering_zones(&self) -> &BTreeSet<Point> {
        &self.bordering_zones
    }

    /// Distinct territories reachable across a shared edge.
    #[must_use]
    pub const fn neighbors(&self) -> &BTreeSet<TerritoryId> {
        &self.neighbors
    }

    /// Huts on bordering zones facing into the territory. Only counted for water.
    #[must_use]
    pub const fn hut_count(&self) -> u32 {
        self.hut_count
    }

    /// Canonical top-left zone: the lowest `y` among zones at the minimum `x`.
    #[must_use]
    pub fn top_left_zone(&self) -> Option<Point> {
        self.zones.first().copied()
    }

    /// Boundary outline of the territory, traced on first access.
    pub fn outline(&self) -> Result<&Outline, EngineError> {
        if let Some(outline) = self.outline.get() {
            return Ok(outline);
        }
        let outline = trace_outline(&self.zones)?;
        Ok(self.outline.get_or_init(|| outline))
    }
}

/// Zone grid and territories derived from one set of placements.
///
/// The state is rebuilt wholesale whenever placements change; territory
/// identifiers are only meaningful within a single build.
#[derive(Clone, Debug, Default)]
pub struct MapState {
    zones: ZoneGrid,
    territories: Vec<Territory>,
    index: BTreeMap<Point, TerritoryId>,
}

impl MapState {
    /// Builds the zone grid for the placements, then partitions it into territories.
    pub fn build<'a>(
        catalog: &CardCatalog,
        placements: impl IntoIterator<Item = &'a Placement>,
    ) -> Result<Self, EngineError> {
        let zones = build_zone_grid(catalog, placements)?;
        Ok(Self::from_zone_grid(zones))
    }

    /// Partitions an existing zone grid into territories.
    #[must_use]
    pub fn from_zone_grid(zones: ZoneGrid) -> Self {
        let mut territories: Vec<Territory> = Vec::new();
        let mut index = BTreeMap::new();
        let mut unscanned = BTreeMap::new();

        for (point, zone) in zones.iter() {
            if zone.terrain() != Terrain::Tower {
                let _ = unscanned.insert(point, zone.terrain());
                continue;
            }

            let id = next_id(&territories);
            let mut tower = Territory::new(id, Terrain::Tower, point);
            tower.bordering_zones = point
                .neighbors()
                .into_iter()
                .map(|(neighbor, _)| neighbor)
                .filter(|neighbor| zones.contains(*neighbor))
                .collect();
            let _ = index.insert(point, id);
            territories.push(tower);
        }

        while let Some((seed, terrain)) = unscanned.pop_first() {
            let id = next_id(&territories);
            let mut territory = Territory::new(id, terrain, seed);
            let _ = index.insert(seed, id);

            let mut worklist = vec![seed];
            while let Some(point) = worklist.pop() {
                for (neighbor, direction) in point.neighbors() {
                    let Some(zone) = zones.get(neighbor) else {
                        continue;
                    };

                    if zone.terrain() == terrain && unscanned.remove(&neighbor).is_some() {
                        let _ = territory.zones.insert(neighbor);
                        let _ = index.insert(neighbor, id);
                        worklist.push(neighbor);
                        continue;
                    }

                    if territory.zones.contains(&neighbor) {
                        continue;
                    }

                    let _ = territory.bordering_zones.insert(neighbor);
                    if terrain == Terrain::Water && zone.huts().faces(direction.opposite()) {
                        territory.hut_count += 1;
                    }
                }
            }

            territories.push(territory);
        }

        for territory in &mut territories {
            territory.neighbors = territory
                .bordering_zones
                .iter()
                .filter_map(|zone| index.get(zone).copied())
                .collect();
        }

        Self {
            zones,
            territories,
            index,
        }
    }

    /// Zone grid the territories were derived from.
    #[must_use]
    pub const fn zones(&self) -> &ZoneGrid {
        &self.zones
    }

    /// Every territory, ordered by identifier.
    #[must_use]
    pub fn territories(&self) -> &[Territory] {
        &self.territories
    }

    /// Looks up a territory by identifier.
    #[must_use]
    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        let index = usize::try_from(id.get()).ok()?;
        self.territories.get(index)
    }

    /// Identifier of the territory containing the zone.
    #[must_use]
    pub fn territory_id_at(&self, zone: Point) -> Option<TerritoryId> {
        self.index.get(&zone).copied()
    }

    /// Territory containing the zone.
    #[must_use]
    pub fn territory_at(&self, zone: Point) -> Option<&Territory> {
        self.territory_id_at(zone).and_then(|id| self.territory(id))
    }

    /// Whether no card has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

fn next_id(territories: &[Territory]) -> TerritoryId {
    TerritoryId::new(u32::try_from(territories.len()).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use limes_core::{CardId, Rotation};

    fn map_of(cards: &[(i32, i32, u8, u32)]) -> MapState {
        let placements: Vec<Placement> = cards
            .iter()
            .map(|&(x, y, card, rotation)| {
                Placement::new(
                    Point::new(x, y),
                    CardId::new(card),
                    Rotation::from_quarter_turns(rotation),
                )
            })
            .collect();
        MapState::build(&CardCatalog::standard(), &placements).expect("standard cards")
    }

    #[test]
    fn single_card_one_splits_into_forest_and_field() {
        let map = map_of(&[(0, 0, 1, 0)]);
        assert_eq!(map.territories().len(), 2);

        let forest = map.territory_at(Point::new(0, 0)).expect("NW zone");
        let field = map.territory_at(Point::new(1, 0)).expect("NE zone");

        assert_eq!(forest.terrain(), Terrain::Forest);
        assert_eq!(
            forest.zones(),
            &BTreeSet::from([Point::new(0, 0), Point::new(0, 1)]),
            "NW and SW share an edge"
        );
        assert_eq!(field.terrain(), Terrain::Field);
        assert_eq!(
            field.zones(),
            &BTreeSet::from([Point::new(1, 0), Point::new(1, 1)])
        );
        assert_eq!(forest.neighbors(), &BTreeSet::from([field.id()]));
        assert_eq!(field.neighbors(), &BTreeSet::from([forest.id()]));
    }

    #[test]
    fn diagonal_zones_never_merge() {
        // Card 5 carries water at NW and SE only.
        let map = map_of(&[(0, 0, 5, 0)]);
        let north_west = map.territory_at(Point::new(0, 0)).expect("NW water");
        let south_east = map.territory_at(Point::new(1, 1)).expect("SE water");

        assert_eq!(north_west.terrain(), south_east.terrain());
        assert_ne!(north_west.id(), south_east.id());
        assert!(!north_west.neighbors().contains(&south_east.id()));
        assert_eq!(map.territories().len(), 4);
    }

    #[test]
    fn touching_towers_stay_separate() {
        // Card 2 has a tower at NE, card 3 one at NW: side by side they touch.
        let map = map_of(&[(0, 0, 2, 0), (1, 0, 3, 0)]);
        let left = map.territory_at(Point::new(1, 0)).expect("card 2 tower");
        let right = map.territory_at(Point::new(2, 0)).expect("card 3 tower");

        assert_eq!(left.terrain(), Terrain::Tower);
        assert_eq!(right.terrain(), Terrain::Tower);
        assert_ne!(left.id(), right.id());
        assert_eq!(left.zones().len(), 1);
        assert!(left.neighbors().contains(&right.id()));
        assert!(right.neighbors().contains(&left.id()));
    }

    #[test]
    fn water_counts_huts_facing_into_it() {
        // Card 7: fields on top (NE hut faces south), water along the bottom.
        let map = map_of(&[(0, 0, 7, 0)]);
        let water = map.territory_at(Point::new(0, 1)).expect("SW water");

        assert_eq!(water.terrain(), Terrain::Water);
        assert_eq!(water.zones().len(), 2);
        assert_eq!(water.hut_count(), 1);
    }

    #[test]
    fn rotated_huts_still_face_the_water() {
        // Card 7 turned twice: water on top, the hut zone at SW now faces north and west.
        let map = map_of(&[(0, 0, 7, 2)]);
        let water = map.territory_at(Point::new(0, 0)).expect("NW water");
        assert_eq!(water.hut_count(), 1);
    }

    #[test]
    fn huts_facing_away_are_ignored() {
        // Card 5: both huts face south; only the field's hut looks into the SE water.
        let map = map_of(&[(0, 0, 5, 0)]);
        let north_west = map.territory_at(Point::new(0, 0)).expect("NW water");
        let south_east = map.territory_at(Point::new(1, 1)).expect("SE water");

        assert_eq!(north_west.terrain(), Terrain::Water);
        assert_ne!(north_west.id(), south_east.id());
        assert_eq!(north_west.hut_count(), 0);
        assert_eq!(south_east.hut_count(), 1);
    }

    #[test]
    fn territories_merge_across_card_edges() {
        // Two copies of card 7 side by side join their field rows and water rows.
        let map = map_of(&[(0, 0, 7, 0), (1, 0, 17, 0)]);
        let field = map.territory_at(Point::new(0, 0)).expect("field");
        let water = map.territory_at(Point::new(0, 1)).expect("water");

        assert_eq!(field.zones().len(), 4);
        assert_eq!(water.zones().len(), 4);
        assert_eq!(water.hut_count(), 2);
        assert_eq!(map.territories().len(), 2);
    }

    #[test]
    fn empty_placements_produce_an_empty_map() {
        let map = map_of(&[]);
        assert!(map.is_empty());
        assert!(map.territories().is_empty());
        assert_eq!(map.territory_at(Point::new(0, 0)).map(Territory::id), None);
    }
}
