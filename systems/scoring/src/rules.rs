//! Per-terrain point rules.

use std::collections::{BTreeMap, BTreeSet};

use limes_core::{Direction, Point, Terrain, TerritoryId, Variants};
use limes_world::{MapState, Territory};

/// Workers standing in each occupied territory.
pub(crate) type Occupancy = BTreeMap<TerritoryId, u32>;

/// Points earned by one occupied territory.
pub(crate) fn territory_points(
    map: &MapState,
    territory: &Territory,
    occupancy: &Occupancy,
    variants: Variants,
) -> u32 {
    let base = match territory.terrain() {
        Terrain::Field => field_size(territory),
        Terrain::Water => territory.hut_count(),
        Terrain::Forest => count(territory.neighbors().len()),
        Terrain::Tower => tower_sight(map, territory, variants.profis),
    };

    if !variants.profis {
        return base;
    }

    let bonus = match territory.terrain() {
        Terrain::Field => field_company(map, territory, occupancy, variants.ferrymen),
        Terrain::Water => watched_by_towers(map, territory),
        Terrain::Forest => forest_huts(map, territory),
        // Field zones are already part of the ray scan.
        Terrain::Tower => 0,
    };
    base + bonus
}

fn field_size(territory: &Territory) -> u32 {
    count(territory.zones().len())
}

/// Forest zones (and field zones for professionals) visible from the tower.
///
/// Each ray runs until the grid ends or another tower blocks the view. An
/// empty card slot ends the grid, even when cards lie beyond it.
fn tower_sight(map: &MapState, territory: &Territory, fields_count: bool) -> u32 {
    let Some(origin) = territory.top_left_zone() else {
        return 0;
    };

    Direction::ALL
        .into_iter()
        .map(|direction| {
            let mut seen = 0;
            let mut zone = origin.step(direction);
            while let Some(descriptor) = map.zones().get(zone) {
                match descriptor.terrain() {
                    Terrain::Tower => break,
                    Terrain::Forest => seen += 1,
                    Terrain::Field if fields_count => seen += 1,
                    Terrain::Field | Terrain::Water => {}
                }
                zone = zone.step(direction);
            }
            seen
        })
        .sum()
}

/// Workers in the field and in the occupied territories it reaches.
///
/// With ferrymen, an occupied water neighbour extends the reach by one hop to
/// its own occupied neighbours. Every territory is counted once.
fn field_company(
    map: &MapState,
    territory: &Territory,
    occupancy: &Occupancy,
    ferrymen: bool,
) -> u32 {
    let occupied = |id: TerritoryId| occupancy.contains_key(&id);
    let mut company = BTreeSet::from([territory.id()]);

    for neighbor in territory.neighbors().iter().copied().filter(|&id| occupied(id)) {
        let _ = company.insert(neighbor);

        let ferry = map
            .territory(neighbor)
            .filter(|water| ferrymen && water.terrain() == Terrain::Water);
        if let Some(water) = ferry {
            company.extend(
                water
                    .neighbors()
                    .iter()
                    .copied()
                    .filter(|&id| occupied(id) && id != territory.id()),
            );
        }
    }

    company
        .iter()
        .filter_map(|id| occupancy.get(id))
        .sum()
}

fn watched_by_towers(map: &MapState, territory: &Territory) -> u32 {
    let towers = territory
        .neighbors()
        .iter()
        .filter_map(|&id| map.territory(id))
        .filter(|neighbor| neighbor.terrain() == Terrain::Tower)
        .count();
    count(towers)
}

fn forest_huts(map: &MapState, territory: &Territory) -> u32 {
    territory
        .zones()
        .iter()
        .filter_map(|&zone| map.zones().get(zone))
        .map(|descriptor| descriptor.huts().count())
        .sum()
}

fn count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Tallies workers per territory, keeping the first zone seen in each.
pub(crate) fn occupancy(
    map: &MapState,
    workers: &[Point],
) -> Result<(Occupancy, Vec<(TerritoryId, Point)>), Point> {
    let mut tally = Occupancy::new();
    let mut representatives = Vec::new();

    for &worker in workers {
        let id = map.territory_id_at(worker).ok_or(worker)?;
        let entry = tally.entry(id).or_insert(0);
        if *entry == 0 {
            representatives.push((id, worker));
        }
        *entry += 1;
    }
    Ok((tally, representatives))
}
