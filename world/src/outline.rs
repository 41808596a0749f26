//! Boundary tracing of territories.
//!
//! The tracer walks the territory's zones while keeping the outside on its
//! left hand. At every step it prefers turning left, then going straight, then
//! turning right, and finally reversing. Each transition sweeps zero, one or
//! two corners of the zone it leaves; the corners emitted around one closed
//! walk form a polygon. Territories large enough to enclose foreign zones are
//! scanned for further walks, each of which becomes a hole.

use std::collections::{BTreeMap, BTreeSet};

use limes_core::{Corner, Direction, EngineError, Point, Turn};
use Corner::{NorthEast as NE, NorthWest as NW, SouthEast as SE, SouthWest as SW};

/// Territories smaller than this cannot wrap around another zone.
const HOLE_SCAN_MIN_ZONES: usize = 8;

/// Corners swept by a transition, indexed by facing and then by clockwise
/// quarter turns (straight, right, reverse, left).
const SWEPT_CORNERS: [[&[Corner]; 4]; 4] = [
    [&[], &[NW], &[NW, NE], &[SW]],
    [&[], &[NE], &[NE, SE], &[NW]],
    [&[], &[SE], &[SE, SW], &[NE]],
    [&[], &[SW], &[SW, NW], &[SE]],
];

/// A polygon vertex: the named corner of a zone's square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutlineVertex {
    /// Zone whose square provides the vertex.
    pub zone: Point,
    /// Corner of the zone square.
    pub corner: Corner,
}

impl OutlineVertex {
    const fn new(zone: Point, corner: Corner) -> Self {
        Self { zone, corner }
    }
}

/// Closed loops describing a territory: the outer boundary first, then holes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outline {
    loops: Vec<Vec<OutlineVertex>>,
}

impl Outline {
    /// Every loop, starting with the outer boundary.
    #[must_use]
    pub fn loops(&self) -> &[Vec<OutlineVertex>] {
        &self.loops
    }

    /// Outer boundary of the territory.
    #[must_use]
    pub fn outer(&self) -> &[OutlineVertex] {
        self.loops.first().map_or(&[], Vec::as_slice)
    }

    /// Boundaries of foreign regions enclosed by the territory.
    #[must_use]
    pub fn holes(&self) -> &[Vec<OutlineVertex>] {
        self.loops.get(1..).unwrap_or(&[])
    }
}

/// Traces the outline of a 4-connected zone set.
///
/// An empty set yields an empty outline. A zone set that is not 4-connected
/// is rejected with [`EngineError::DisconnectedTerritory`].
pub fn trace_outline(zones: &BTreeSet<Point>) -> Result<Outline, EngineError> {
    let Some(&top_left) = zones.first() else {
        return Ok(Outline::default());
    };

    if let Some(stray) = first_unreachable(zones, top_left) {
        return Err(EngineError::DisconnectedTerritory(stray));
    }

    if zones.len() == 1 {
        let square = Corner::CLOCKWISE
            .into_iter()
            .map(|corner| OutlineVertex::new(top_left, corner))
            .collect();
        return Ok(Outline {
            loops: vec![square],
        });
    }

    let mut traced = BTreeSet::new();
    let mut loops = vec![walk(zones, top_left, &mut traced)?];

    if zones.len() >= HOLE_SCAN_MIN_ZONES {
        for &zone in zones {
            if zones.contains(&zone.step(Direction::West))
                || traced.contains(&(zone, Direction::West))
            {
                continue;
            }
            loops.push(walk(zones, zone, &mut traced)?);
        }
    }

    Ok(Outline { loops })
}

fn first_unreachable(zones: &BTreeSet<Point>, start: Point) -> Option<Point> {
    let mut reached = BTreeSet::from([start]);
    let mut worklist = vec![start];
    while let Some(zone) = worklist.pop() {
        for (neighbor, _) in zone.neighbors() {
            if zones.contains(&neighbor) && reached.insert(neighbor) {
                worklist.push(neighbor);
            }
        }
    }
    zones.iter().find(|zone| !reached.contains(zone)).copied()
}

/// Follows the wall from `seed`, whose western side lies outside the zone set.
///
/// The walk stops as soon as a walker state repeats; only the repeating part
/// contributes vertices, so a seed state that merely leads onto the loop does
/// not distort it. Sides crossed by the loop are recorded in `traced`.
fn walk(
    zones: &BTreeSet<Point>,
    seed: Point,
    traced: &mut BTreeSet<(Point, Direction)>,
) -> Result<Vec<OutlineVertex>, EngineError> {
    let mut steps: Vec<(Point, Direction, Turn)> = Vec::new();
    let mut seen: BTreeMap<(Point, Direction), usize> = BTreeMap::new();
    let (mut zone, mut facing) = (seed, Direction::North);

    let cycle_start = loop {
        if let Some(&index) = seen.get(&(zone, facing)) {
            break index;
        }
        let _ = seen.insert((zone, facing), steps.len());

        let turn = Turn::PREFERENCE
            .into_iter()
            .find(|&turn| zones.contains(&zone.step(facing.turned(turn))))
            .ok_or(EngineError::DisconnectedTerritory(zone))?;

        steps.push((zone, facing, turn));
        facing = facing.turned(turn);
        zone = zone.step(facing);
    };

    let cycle = &steps[cycle_start..];
    let mut vertices = Vec::new();
    let mut sides = Vec::new();
    for &(zone, facing, turn) in cycle {
        vertices.extend(
            SWEPT_CORNERS[facing.index()][turn.quarter_turns()]
                .iter()
                .map(|&corner| OutlineVertex::new(zone, corner)),
        );
        sides.extend(crossed_sides(facing, turn).map(|side| (zone, side)));
    }

    if !sides.contains(&(seed, Direction::West)) {
        return Err(EngineError::UnclosedBoundary(seed));
    }
    traced.extend(sides);
    Ok(vertices)
}

/// Sides of the current zone that lie along the wall during a transition.
fn crossed_sides(facing: Direction, turn: Turn) -> impl Iterator<Item = Direction> {
    let count = match turn {
        Turn::Left => 0,
        Turn::Straight => 1,
        Turn::Right => 2,
        Turn::Reverse => 3,
    };
    [Turn::Left, Turn::Straight, Turn::Right]
        .into_iter()
        .take(count)
        .map(move |side| facing.turned(side))
}
