//! Expansion of placed cards into the fine zone grid.

use std::collections::BTreeMap;

use limes_core::{CardCatalog, EngineError, Placement, Point, ZoneDescriptor};

/// Offsets of the NW, NE, SE and SW quadrants from a card's top-left zone.
const QUADRANT_OFFSETS: [(i32, i32); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

/// Rotated zone descriptors keyed by fine-grid coordinate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneGrid {
    zones: BTreeMap<Point, ZoneDescriptor>,
}

impl ZoneGrid {
    /// Descriptor of the zone at the provided coordinate, if a card covers it.
    #[must_use]
    pub fn get(&self, zone: Point) -> Option<&ZoneDescriptor> {
        self.zones.get(&zone)
    }

    /// Whether a card covers the provided coordinate.
    #[must_use]
    pub fn contains(&self, zone: Point) -> bool {
        self.zones.contains_key(&zone)
    }

    /// Zones in `Point` order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &ZoneDescriptor)> {
        self.zones.iter().map(|(point, zone)| (*point, zone))
    }

    /// Number of zones on the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether no card has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Inclusive bounding box of the grid as `(min, max)` corners.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut points = self.zones.keys();
        let first = *points.next()?;
        Some(points.fold((first, first), |(min, max), point| {
            (
                Point::new(min.x().min(point.x()), min.y().min(point.y())),
                Point::new(max.x().max(point.x()), max.y().max(point.y())),
            )
        }))
    }
}

/// Lays every placement into the fine zone grid.
///
/// Card `(cx, cy)` covers zones `(2cx, 2cy)` through `(2cx + 1, 2cy + 1)`.
/// Quadrant `q` receives raw zone `order[q]` of the card, with its huts
/// remapped through the same read order.
pub fn build_zone_grid<'a>(
    catalog: &CardCatalog,
    placements: impl IntoIterator<Item = &'a Placement>,
) -> Result<ZoneGrid, EngineError> {
    let mut zones = BTreeMap::new();
    for placement in placements {
        let raw = catalog.card(placement.card)?.zones();
        let order = placement.rotation.read_order();
        let origin = Point::new(placement.position.x() * 2, placement.position.y() * 2);

        for (quadrant, (dx, dy)) in QUADRANT_OFFSETS.into_iter().enumerate() {
            let zone = raw[order[quadrant]].rotated(order);
            let _ = zones.insert(Point::new(origin.x() + dx, origin.y() + dy), zone);
        }
    }
    Ok(ZoneGrid { zones })
}
