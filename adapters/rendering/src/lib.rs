#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Limes adapters.
//!
//! Territory outlines are traced on the abstract zone grid. This crate maps
//! them into rendering space, where every zone is the square covering its
//! quadrant of the card, and answers hit tests against the projected shapes.

use anyhow::{ensure, Context, Result as AnyResult};
use glam::Vec2;
use limes_core::{Corner, EngineError, Point, Terrain, TerritoryId};
use limes_world::{MapState, Outline, OutlineVertex};
use serde::Deserialize;

/// Side length of a card in the physical game board artwork.
pub const DEFAULT_CARD_SIZE: f32 = 180.0;

/// RGBA color used when presenting territories.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Fill color of a terrain on the printed cards.
    #[must_use]
    pub const fn for_terrain(terrain: Terrain) -> Self {
        match terrain {
            Terrain::Field => Self::from_rgb_u8(0xea, 0xb5, 0x29),
            Terrain::Water => Self::from_rgb_u8(0x09, 0x4b, 0x99),
            Terrain::Forest => Self::from_rgb_u8(0x79, 0xa0, 0x29),
            Terrain::Tower => Self::from_rgb_u8(0x98, 0x99, 0x93),
        }
    }

    /// Formats the color as an opaque `#rrggbb` string.
    #[must_use]
    pub fn to_hex(self) -> String {
        let byte = |channel: f32| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue)
        )
    }
}


/// Axis-aligned square covered by one zone in rendering space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneSquare {
    /// Top-left corner.
    pub min: Vec2,
    /// Bottom-right corner.
    pub max: Vec2,
}

impl ZoneSquare {
    /// Midpoint of the square.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Named corner of the square.
    #[must_use]
    pub fn corner(&self, corner: Corner) -> Vec2 {
        match corner {
            Corner::NorthWest => self.min,
            Corner::NorthEast => Vec2::new(self.max.x, self.min.y),
            Corner::SouthEast => self.max,
            Corner::SouthWest => Vec2::new(self.min.x, self.max.y),
        }
    }
}

/// Placement of the card grid in rendering space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardLayout {
    /// Rendering-space position of the top-left corner of the anchor card.
    pub origin: Vec2,
    /// Card grid position drawn at `origin`.
    pub anchor: Point,
    /// Side length of a card.
    pub card_size: f32,
    /// Gap left between neighbouring cards.
    pub spacing: f32,
    /// Distance by which outlines are pulled inside their zones.
    pub margin: f32,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            anchor: Point::new(0, 0),
            card_size: DEFAULT_CARD_SIZE,
            spacing: 0.0,
            margin: 0.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutFile {
    #[serde(default)]
    layout: LayoutTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutTable {
    card_size: Option<f32>,
    spacing: Option<f32>,
    margin: Option<f32>,
    origin_x: Option<f32>,
    origin_y: Option<f32>,
    anchor_x: Option<i32>,
    anchor_y: Option<i32>,
}

impl BoardLayout {
    /// Reads a layout from the `[layout]` table of a TOML document.
    ///
    /// Missing keys keep their default values.
    pub fn from_toml_str(contents: &str) -> AnyResult<Self> {
        let file: LayoutFile =
            toml::from_str(contents).context("failed to parse board layout toml contents")?;
        let table = file.layout;
        let defaults = Self::default();

        let layout = Self {
            origin: Vec2::new(
                table.origin_x.unwrap_or(defaults.origin.x),
                table.origin_y.unwrap_or(defaults.origin.y),
            ),
            anchor: Point::new(
                table.anchor_x.unwrap_or(defaults.anchor.x()),
                table.anchor_y.unwrap_or(defaults.anchor.y()),
            ),
            card_size: table.card_size.unwrap_or(defaults.card_size),
            spacing: table.spacing.unwrap_or(defaults.spacing),
            margin: table.margin.unwrap_or(defaults.margin),
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Checks that cards have area and outlines stay inside their zones.
    pub fn validate(&self) -> AnyResult<()> {
        ensure!(
            self.card_size > 0.0,
            "card_size must be positive (received {})",
            self.card_size
        );
        ensure!(
            self.spacing >= 0.0,
            "spacing must not be negative (received {})",
            self.spacing
        );
        ensure!(
            self.margin >= 0.0 && self.margin < self.zone_size() / 2.0,
            "margin must lie in 0..{} (received {})",
            self.zone_size() / 2.0,
            self.margin
        );
        Ok(())
    }

    /// Distance between the top-left corners of neighbouring cards.
    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.card_size + self.spacing
    }

    /// Side length of a zone square.
    #[must_use]
    pub fn zone_size(&self) -> f32 {
        self.card_size / 2.0
    }

    /// Rendering-space square covered by a zone.
    #[must_use]
    pub fn zone_square(&self, zone: Point) -> ZoneSquare {
        let card = zone.card();
        let (column, row) = zone.quadrant();
        let card_origin = self.origin
            + Vec2::new(
                (card.x() - self.anchor.x()) as f32,
                (card.y() - self.anchor.y()) as f32,
            ) * self.pitch();
        let min = card_origin + Vec2::new(column as f32, row as f32) * self.zone_size();
        ZoneSquare {
            min,
            max: min + Vec2::splat(self.zone_size()),
        }
    }

    /// Rendering-space position of an outline vertex, inset by the margin.
    #[must_use]
    pub fn vertex_position(&self, vertex: OutlineVertex) -> Vec2 {
        let square = self.zone_square(vertex.zone);
        let corner = square.corner(vertex.corner);
        let towards_center = (square.center() - corner).signum();
        corner + towards_center * self.margin
    }

    /// Zone whose square contains the position, if the position is not in a gap.
    #[must_use]
    pub fn zone_at(&self, position: Vec2) -> Option<Point> {
        let relative = (position - self.origin) / self.pitch();
        let cards = relative.floor();
        let within = (relative - cards) * self.pitch();
        if within.x >= self.card_size || within.y >= self.card_size {
            return None;
        }

        let column = i32::from(within.x >= self.zone_size());
        let row = i32::from(within.y >= self.zone_size());
        let card_x = cards.x as i32 + self.anchor.x();
        let card_y = cards.y as i32 + self.anchor.y();
        Some(Point::new(card_x * 2 + column, card_y * 2 + row))
    }

    /// Projects every loop of a traced outline.
    #[must_use]
    pub fn project(&self, outline: &Outline) -> Vec<Vec<Vec2>> {
        outline
            .loops()
            .iter()
            .map(|ring| {
                ring.iter()
                    .map(|&vertex| self.vertex_position(vertex))
                    .collect()
            })
            .collect()
    }
}

/// A territory projected into rendering space.
#[derive(Clone, Debug, PartialEq)]
pub struct TerritoryShape {
    /// Territory the shape outlines.
    pub territory: TerritoryId,
    /// Terrain of the territory.
    pub terrain: Terrain,
    /// Fill color of the territory.
    pub fill: Color,
    /// Closed loops: the outer boundary first, then holes.
    pub loops: Vec<Vec<Vec2>>,
}

impl TerritoryShape {
    /// Outer boundary polygon.
    #[must_use]
    pub fn outer(&self) -> &[Vec2] {
        self.loops.first().map_or(&[], Vec::as_slice)
    }

    /// Hole polygons enclosed by the outer boundary.
    #[must_use]
    pub fn holes(&self) -> &[Vec<Vec2>] {
        self.loops.get(1..).unwrap_or(&[])
    }

    /// Even-odd point-in-polygon test over every loop.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let mut inside = false;
        for ring in &self.loops {
            for (index, &start) in ring.iter().enumerate() {
                let end = ring[(index + 1) % ring.len()];
                let straddles = (start.y > point.y) != (end.y > point.y);
                if straddles
                    && point.x < start.x + (point.y - start.y) * (end.x - start.x) / (end.y - start.y)
                {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/// Projects every territory of the map into rendering space.
pub fn territory_shapes(
    map: &MapState,
    layout: &BoardLayout,
) -> Result<Vec<TerritoryShape>, EngineError> {
    map.territories()
        .iter()
        .map(|territory| {
            Ok(TerritoryShape {
                territory: territory.id(),
                terrain: territory.terrain(),
                fill: Color::for_terrain(territory.terrain()),
                loops: layout.project(territory.outline()?),
            })
        })
        .collect()
}

/// Resolves a rendering-space position to the territory drawn there.
#[must_use]
pub fn pick_territory(map: &MapState, layout: &BoardLayout, position: Vec2) -> Option<TerritoryId> {
    layout
        .zone_at(position)
        .and_then(|zone| map.territory_id_at(zone))
}

#[cfg(test)]
mod tests {
    use super::*;
    use limes_core::{CardCatalog, CardId, Placement, Rotation};
    use limes_world::trace_outline;
    use std::collections::BTreeSet;

    fn map_of(cards: &[(i32, i32, u8, u32)]) -> MapState {
        let placements: Vec<Placement> = cards
            .iter()
            .map(|&(x, y, card, turns)| {
                Placement::new(
                    Point::new(x, y),
                    CardId::new(card),
                    Rotation::from_quarter_turns(turns),
                )
            })
            .collect();
        MapState::build(&CardCatalog::standard(), &placements).expect("standard cards")
    }

    #[test]
    fn zones_cover_their_card_quadrants() {
        let layout = BoardLayout::default();
        let square = layout.zone_square(Point::new(3, 1));

        assert_eq!(square.min, Vec2::new(270.0, 90.0));
        assert_eq!(square.max, Vec2::new(360.0, 180.0));
        assert_eq!(square.center(), Vec2::new(315.0, 135.0));
    }

    #[test]
    fn anchor_and_spacing_shift_cards() {
        let layout = BoardLayout {
            origin: Vec2::new(10.0, 20.0),
            anchor: Point::new(-1, -1),
            card_size: 100.0,
            spacing: 10.0,
            margin: 0.0,
        };

        let square = layout.zone_square(Point::new(0, 0));
        assert_eq!(square.min, Vec2::new(120.0, 130.0));
        assert_eq!(layout.zone_square(Point::new(-2, -2)).min, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn zone_at_inverts_zone_square() {
        let layout = BoardLayout {
            origin: Vec2::new(5.0, 5.0),
            anchor: Point::new(-1, 0),
            card_size: 80.0,
            spacing: 20.0,
            margin: 0.0,
        };

        for x in -2..4 {
            for y in -2..4 {
                let zone = Point::new(x, y);
                let center = layout.zone_square(zone).center();
                assert_eq!(layout.zone_at(center), Some(zone), "zone {zone}");
            }
        }
        assert_eq!(
            layout.zone_at(Vec2::new(5.0 + 90.0, 10.0)),
            None,
            "spacing belongs to no zone"
        );
    }

    #[test]
    fn margin_pulls_vertices_towards_the_zone_center() {
        let layout = BoardLayout {
            margin: 5.0,
            ..BoardLayout::default()
        };
        let vertex = OutlineVertex {
            zone: Point::new(0, 1),
            corner: Corner::NorthEast,
        };
        assert_eq!(layout.vertex_position(vertex), Vec2::new(85.0, 95.0));
    }

    #[test]
    fn shapes_hit_their_own_zones_only() {
        let map = map_of(&[(0, 0, 1, 0), (1, 0, 7, 0)]);
        let layout = BoardLayout {
            margin: 4.0,
            ..BoardLayout::default()
        };
        let shapes = territory_shapes(&map, &layout).expect("traceable map");
        assert_eq!(shapes.len(), map.territories().len());

        for shape in &shapes {
            let territory = map.territory(shape.territory).expect("territory exists");
            for (zone, _) in map.zones().iter() {
                let center = layout.zone_square(zone).center();
                assert_eq!(
                    shape.contains(center),
                    territory.zones().contains(&zone),
                    "territory {} at zone {zone}",
                    shape.territory
                );
            }
            assert_eq!(shape.fill, Color::for_terrain(shape.terrain));
            assert_eq!(shape.outer(), shape.loops[0].as_slice());
            assert!(shape.holes().is_empty(), "no territory here encloses another");
        }
    }

    #[test]
    fn ring_shapes_leave_their_hole_empty() {
        let zones: BTreeSet<Point> = (0..3)
            .flat_map(|x| (0..3).map(move |y| Point::new(x, y)))
            .filter(|&zone| zone != Point::new(1, 1))
            .collect();
        let layout = BoardLayout::default();
        let outline = trace_outline(&zones).expect("ring traces");
        let shape = TerritoryShape {
            territory: TerritoryId::new(0),
            terrain: Terrain::Water,
            fill: Color::for_terrain(Terrain::Water),
            loops: layout.project(&outline),
        };

        assert_eq!(shape.outer().len(), 4);
        assert_eq!(shape.holes().len(), 1);
        assert_eq!(shape.holes()[0].len(), 4);
        assert!(shape.outer().contains(&Vec2::new(270.0, 270.0)));
        assert!(shape.holes()[0].contains(&Vec2::new(90.0, 90.0)));
        assert!(!shape.contains(layout.zone_square(Point::new(1, 1)).center()));
        assert!(shape.contains(layout.zone_square(Point::new(2, 1)).center()));
    }

    #[test]
    fn picking_resolves_through_the_zone_grid() {
        let map = map_of(&[(0, 0, 7, 0)]);
        let layout = BoardLayout::default();

        let water = map.territory_id_at(Point::new(0, 1));
        assert_eq!(pick_territory(&map, &layout, Vec2::new(170.0, 100.0)), water);
        assert_eq!(pick_territory(&map, &layout, Vec2::new(200.0, 10.0)), None);
    }

    #[test]
    fn layout_toml_overrides_selected_fields() {
        let layout = BoardLayout::from_toml_str(
            "[layout]\ncard_size = 120.0\nmargin = 3.0\nanchor_x = -1\n",
        )
        .expect("valid layout");

        assert_eq!(layout.card_size, 120.0);
        assert_eq!(layout.margin, 3.0);
        assert_eq!(layout.spacing, 0.0);
        assert_eq!(layout.anchor, Point::new(-1, 0));
        assert_eq!(layout.origin, Vec2::ZERO);
        assert_eq!(BoardLayout::from_toml_str("").expect("empty"), BoardLayout::default());
    }

    #[test]
    fn layout_toml_rejects_oversized_margin() {
        let error = BoardLayout::from_toml_str("[layout]\ncard_size = 40.0\nmargin = 10.0\n")
            .expect_err("margin swallows the zone");
        assert!(error.to_string().contains("margin"));

        assert!(BoardLayout::from_toml_str("[layout]\nzoom = 2.0\n").is_err());
    }

    #[test]
    fn colors_follow_the_printed_cards() {
        assert_eq!(Color::for_terrain(Terrain::Field).to_hex(), "#eab529");
        assert_eq!(Color::for_terrain(Terrain::Water).to_hex(), "#094b99");
        assert_eq!(Color::for_terrain(Terrain::Forest).to_hex(), "#79a029");
        assert_eq!(Color::for_terrain(Terrain::Tower).to_hex(), "#989993");
    }
}
