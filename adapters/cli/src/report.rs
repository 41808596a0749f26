use std::fmt;

use anyhow::{Context, Result};
use glam::Vec2;
use limes_core::{Placement, Point, Terrain, TerritoryId, Variants};
use limes_rendering::{territory_shapes, BoardLayout};
use limes_system_scoring::ScoreReport;
use limes_world::query;
use serde::Serialize;

use crate::board::Session;

/// Everything the CLI reports about a board.
#[derive(Debug, Serialize)]
pub(crate) struct Summary {
    variants: Variants,
    placements: Vec<Placement>,
    workers: Vec<Point>,
    territories: Vec<TerritorySummary>,
    score: ScoreReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    outlines: Vec<ShapeSummary>,
}

#[derive(Debug, Serialize)]
struct TerritorySummary {
    id: TerritoryId,
    terrain: Terrain,
    zones: Vec<String>,
    hut_count: u32,
    neighbors: Vec<TerritoryId>,
}

#[derive(Debug, Serialize)]
struct ShapeSummary {
    territory: TerritoryId,
    fill: String,
    loops: Vec<Vec<[f32; 2]>>,
}

/// Collects the board, its territories and score, plus projected outlines on request.
pub(crate) fn summarize(session: &Session, layout: &BoardLayout, outlines: bool) -> Result<Summary> {
    let world = session.world();
    let map = query::map(world);

    let territories = map
        .territories()
        .iter()
        .map(|territory| TerritorySummary {
            id: territory.id(),
            terrain: territory.terrain(),
            zones: territory.zones().iter().map(Point::to_string).collect(),
            hut_count: territory.hut_count(),
            neighbors: territory.neighbors().iter().copied().collect(),
        })
        .collect();

    let outlines = if outlines {
        territory_shapes(map, layout)
            .context("failed to trace territory outlines")?
            .into_iter()
            .map(|shape| ShapeSummary {
                territory: shape.territory,
                fill: shape.fill.to_hex(),
                loops: shape
                    .loops
                    .iter()
                    .map(|ring| ring.iter().map(Vec2::to_array).collect())
                    .collect(),
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(Summary {
        variants: query::variants(world),
        placements: query::placements(world).to_vec(),
        workers: query::workers(world).to_vec(),
        territories,
        score: session.score()?.clone(),
        outlines,
    })
}

/// Plain text rendering of a summary.
pub(crate) fn render_text<'a>(session: &'a Session, summary: &'a Summary) -> TextReport<'a> {
    TextReport { session, summary }
}

pub(crate) struct TextReport<'a> {
    session: &'a Session,
    summary: &'a Summary,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let zones = query::map(self.session.world()).zones();
        if let Some((min, max)) = zones.bounds() {
            for y in min.y()..=max.y() {
                let row: Vec<String> = (min.x()..=max.x())
                    .map(|x| match zones.get(Point::new(x, y)) {
                        Some(descriptor) => descriptor.to_string(),
                        None => " ".repeat(5),
                    })
                    .collect();
                writeln!(f, "{}", row.join(" ").trim_end())?;
            }
        } else {
            writeln!(f, "(empty board)")?;
        }

        writeln!(f)?;
        writeln!(f, "territories: {}", self.summary.territories.len())?;
        for territory in &self.summary.territories {
            let neighbors: Vec<String> = territory
                .neighbors
                .iter()
                .map(TerritoryId::to_string)
                .collect();
            writeln!(
                f,
                "  {} {} zones={} huts={} neighbours=[{}]",
                territory.id,
                territory.terrain,
                territory.zones.join(" "),
                territory.hut_count,
                neighbors.join(" ")
            )?;
        }

        for shape in &self.summary.outlines {
            writeln!(f, "outline {} {}", shape.territory, shape.fill)?;
            for ring in &shape.loops {
                let points: Vec<String> = ring
                    .iter()
                    .map(|[x, y]| format!("({x},{y})"))
                    .collect();
                writeln!(f, "  {}", points.join(" "))?;
            }
        }

        writeln!(f)?;
        writeln!(f, "score: {}", self.summary.score.total())?;
        for (zone, entry) in self.summary.score.breakdown() {
            writeln!(
                f,
                "  {zone} {} {}: {}",
                entry.territory, entry.terrain, entry.points
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{parse_workers, CardSpec};

    fn card_seven(outlines: bool) -> (Session, Summary) {
        let cards = CardSpec::parse_list("0,0:7:0").expect("valid entries");
        let workers = parse_workers("0,0 1,1").expect("valid zones");
        let session = Session::lay(Variants::default(), &cards, &workers).expect("legal board");
        let summary =
            summarize(&session, &BoardLayout::default(), outlines).expect("summary");
        (session, summary)
    }

    #[test]
    fn json_summary_lists_territories_and_score() {
        let (_, summary) = card_seven(false);
        let json = serde_json::to_value(&summary).expect("json");

        assert_eq!(json["score"]["total"], 3);
        assert!(json.get("outlines").is_none());
        let field = json["territories"]
            .as_array()
            .expect("territory list")
            .iter()
            .find(|territory| territory["terrain"] == "Field")
            .expect("field territory");
        assert_eq!(field["zones"], serde_json::json!(["0,0", "1,0"]));
    }

    #[test]
    fn outlines_are_projected_with_terrain_colors() {
        let (_, summary) = card_seven(true);
        assert_eq!(summary.outlines.len(), 2);

        for shape in &summary.outlines {
            assert_eq!(shape.loops.len(), 1);
            assert_eq!(shape.loops[0].len(), 4);
        }
        let field = summary
            .outlines
            .iter()
            .find(|shape| shape.fill == "#eab529")
            .expect("field outline");
        assert!(field.loops[0].contains(&[180.0, 90.0]));
        assert!(field.loops[0].contains(&[0.0, 0.0]));
    }

    #[test]
    fn text_report_prints_the_zone_grid() {
        let (session, summary) = card_seven(false);
        let text = render_text(&session, &summary).to_string();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Y0000 Y0110"));
        assert_eq!(lines.next(), Some("W0000 W0000"));
        assert!(text.contains("territories: 2"));
        assert!(text.contains("score: 3"));
    }
}
