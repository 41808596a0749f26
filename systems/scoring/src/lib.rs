#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scoring of worked territories.
//!
//! Scoring is a pure function of the map, the worker positions and the active
//! variants. The [`Scoring`] system wraps it for event-driven adapters and
//! only recomputes when the board or its workers changed.

use std::collections::BTreeMap;

use limes_core::{EngineError, Event, Point, Terrain, TerritoryId, Variants};
use limes_world::MapState;
use serde::{Serialize, Serializer};
use tracing::debug;

mod rules;

/// Points earned by one worked territory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TerritoryScore {
    /// Territory the points were earned in.
    pub territory: TerritoryId,
    /// Terrain of the territory.
    pub terrain: Terrain,
    /// Points earned.
    pub points: u32,
}

/// Total score together with its breakdown by representative worker zone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    total: u32,
    #[serde(serialize_with = "serialize_breakdown")]
    breakdown: BTreeMap<Point, TerritoryScore>,
}

impl ScoreReport {
    /// Sum of all territory scores.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Territory scores keyed by the first worker zone seen in each territory.
    #[must_use]
    pub const fn breakdown(&self) -> &BTreeMap<Point, TerritoryScore> {
        &self.breakdown
    }
}

fn serialize_breakdown<S>(
    breakdown: &BTreeMap<Point, TerritoryScore>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(breakdown.iter().map(|(zone, score)| (zone.to_string(), score)))
}

/// Scores every territory holding at least one worker.
///
/// Stacked workers and several workers in one territory score the territory
/// once. A worker standing off the map is reported as
/// [`EngineError::WorkerOutsideMap`].
pub fn score(
    map: &MapState,
    workers: &[Point],
    variants: Variants,
) -> Result<ScoreReport, EngineError> {
    let (occupancy, representatives) =
        rules::occupancy(map, workers).map_err(EngineError::WorkerOutsideMap)?;

    let mut report = ScoreReport::default();
    for (id, zone) in representatives {
        let Some(territory) = map.territory(id) else {
            return Err(EngineError::WorkerOutsideMap(zone));
        };

        let points = rules::territory_points(map, territory, &occupancy, variants);
        report.total += points;
        let _ = report.breakdown.insert(
            zone,
            TerritoryScore {
                territory: id,
                terrain: territory.terrain(),
                points,
            },
        );
    }

    debug!(
        total = report.total,
        territories = report.breakdown.len(),
        workers = workers.len(),
        "score computed"
    );
    Ok(report)
}

/// Event-driven scoring system that caches the most recent report.
#[derive(Debug, Default)]
pub struct Scoring {
    variants: Variants,
    stale: bool,
    last_report: Option<ScoreReport>,
}

impl Scoring {
    /// Creates a scoring system that has not yet produced a report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last report produced by the system, if any.
    #[must_use]
    pub fn last_report(&self) -> Option<&ScoreReport> {
        self.last_report.as_ref()
    }

    /// Consumes world events and recomputes the score when they affect it.
    ///
    /// Returns whether a new report was produced. The board is only read when
    /// a map rebuild, worker move, or variant change has been observed since
    /// the previous report.
    pub fn handle(
        &mut self,
        events: &[Event],
        map: &MapState,
        workers: &[Point],
    ) -> Result<bool, EngineError> {
        for event in events {
            match event {
                Event::VariantsChanged { variants } => {
                    self.variants = *variants;
                    self.stale = true;
                }
                Event::MapRebuilt { .. }
                | Event::WorkerPlaced { .. }
                | Event::WorkerRemoved { .. } => self.stale = true,
                _ => {}
            }
        }

        if !self.stale && self.last_report.is_some() {
            return Ok(false);
        }

        let report = score(map, workers, self.variants)?;
        self.last_report = Some(report);
        self.stale = false;
        Ok(true)
    }
}
