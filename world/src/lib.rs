#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for the Limes territory engine.
//!
//! The world owns the placed cards and the workers standing on them. Every
//! change to the cards rebuilds the zone grid and its territories from
//! scratch, so readers always observe a [`MapState`] consistent with the
//! current placements.

use std::collections::BTreeSet;

use limes_core::{
    CardCatalog, Command, EngineError, Event, Placement, PlacementError, Point, Variants,
    WorkerError,
};
use tracing::debug;

pub mod outline;
pub mod placement;
pub mod territories;
pub mod zones;

pub use outline::{trace_outline, Outline, OutlineVertex};
pub use placement::{check_position, next_card_positions};
pub use territories::{MapState, Territory};
pub use zones::{build_zone_grid, ZoneGrid};

/// Represents the authoritative board: cards, workers and the derived map.
#[derive(Debug)]
pub struct World {
    catalog: CardCatalog,
    placements: Vec<Placement>,
    provisional: Option<Placement>,
    workers: Vec<Point>,
    variants: Variants,
    map: MapState,
}

impl World {
    /// Creates an empty board backed by the standard card catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(CardCatalog::standard())
    }

    /// Creates an empty board backed by a custom card catalog.
    #[must_use]
    pub fn with_catalog(catalog: CardCatalog) -> Self {
        Self {
            catalog,
            placements: Vec::new(),
            provisional: None,
            workers: Vec::new(),
            variants: Variants::default(),
            map: MapState::default(),
        }
    }

    fn placed_positions(&self) -> BTreeSet<Point> {
        self.placements
            .iter()
            .map(|placement| placement.position)
            .collect()
    }

    fn reject_card(
        &self,
        position: Option<Point>,
        reason: PlacementError,
        out_events: &mut Vec<Event>,
    ) {
        debug!(
            ?position,
            ?reason,
            cards = self.placements.len(),
            "card request rejected"
        );
        out_events.push(Event::CardRejected { position, reason });
    }

    /// Rebuilds the map and drops workers left without a zone.
    fn rebuild(&mut self, out_events: &mut Vec<Event>) -> Result<(), EngineError> {
        self.map = MapState::build(
            &self.catalog,
            self.placements.iter().chain(self.provisional.iter()),
        )?;

        let zones = self.map.zones().len();
        let territories = self.map.territories().len();
        debug!(zones, territories, "map rebuilt");
        out_events.push(Event::MapRebuilt { zones, territories });

        let map = &self.map;
        self.workers.retain(|&zone| {
            let keep = map.zones().contains(zone);
            if !keep {
                out_events.push(Event::WorkerRemoved { zone });
            }
            keep
        });
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Refused player intents are reported as events. An error is only returned
/// when the board reaches a state the catalog cannot describe.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), EngineError> {
    match command {
        Command::ConfigureVariants { variants } => {
            world.variants = variants;
            out_events.push(Event::VariantsChanged { variants });
        }
        Command::ProposeCard { placement } => {
            if world.catalog.card(placement.card).is_err() {
                world.reject_card(
                    Some(placement.position),
                    PlacementError::UnknownCard,
                    out_events,
                );
                return Ok(());
            }
            let placed = world.placed_positions();
            if let Err(reason) =
                check_position(&placed, placement.position, world.variants.diagonals)
            {
                world.reject_card(Some(placement.position), reason, out_events);
                return Ok(());
            }

            world.provisional = Some(placement);
            out_events.push(Event::ProvisionalCardChanged {
                placement: Some(placement),
            });
            world.rebuild(out_events)?;
        }
        Command::RotateProvisionalCard => {
            let Some(placement) = world.provisional.as_mut() else {
                world.reject_card(None, PlacementError::NoProvisionalCard, out_events);
                return Ok(());
            };

            placement.rotation = placement.rotation.clockwise();
            out_events.push(Event::ProvisionalCardChanged {
                placement: Some(*placement),
            });
            world.rebuild(out_events)?;
        }
        Command::WithdrawProvisionalCard => {
            if world.provisional.take().is_none() {
                world.reject_card(None, PlacementError::NoProvisionalCard, out_events);
                return Ok(());
            }

            out_events.push(Event::ProvisionalCardChanged { placement: None });
            world.rebuild(out_events)?;
        }
        Command::ConfirmCard => {
            let Some(placement) = world.provisional.take() else {
                world.reject_card(None, PlacementError::NoProvisionalCard, out_events);
                return Ok(());
            };

            world.placements.push(placement);
            out_events.push(Event::CardConfirmed { placement });
            world.rebuild(out_events)?;
        }
        Command::UndoCard => {
            let Some(placement) = world.placements.pop() else {
                world.reject_card(None, PlacementError::NothingToUndo, out_events);
                return Ok(());
            };

            if world.provisional.take().is_some() {
                out_events.push(Event::ProvisionalCardChanged { placement: None });
            }
            out_events.push(Event::CardUndone { placement });
            world.rebuild(out_events)?;
        }
        Command::PlaceWorker { zone } => {
            if !world.map.zones().contains(zone) {
                debug!(%zone, "worker rejected: no zone");
                out_events.push(Event::WorkerRejected {
                    zone,
                    reason: WorkerError::NoZone,
                });
                return Ok(());
            }

            world.workers.push(zone);
            out_events.push(Event::WorkerPlaced { zone });
        }
        Command::RemoveWorker { zone } => {
            let Some(index) = world.workers.iter().position(|&worker| worker == zone) else {
                debug!(%zone, "worker rejected: nobody there");
                out_events.push(Event::WorkerRejected {
                    zone,
                    reason: WorkerError::NoWorker,
                });
                return Ok(());
            };

            let _ = world.workers.remove(index);
            out_events.push(Event::WorkerRemoved { zone });
        }
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{next_card_positions as legal_positions, World};
    use crate::territories::MapState;
    use limes_core::{CardCatalog, Placement, Point, Variants};

    /// Catalog the world draws card definitions from.
    #[must_use]
    pub fn catalog(world: &World) -> &CardCatalog {
        &world.catalog
    }

    /// Confirmed placements in the order they were laid.
    #[must_use]
    pub fn placements(world: &World) -> &[Placement] {
        &world.placements
    }

    /// The card currently laid but not yet confirmed.
    #[must_use]
    pub fn provisional(world: &World) -> Option<Placement> {
        world.provisional
    }

    /// Worker positions, including stacked duplicates, in placement order.
    #[must_use]
    pub fn workers(world: &World) -> &[Point] {
        &world.workers
    }

    /// Rule variants currently in effect.
    #[must_use]
    pub fn variants(world: &World) -> Variants {
        world.variants
    }

    /// Zone grid and territories for the confirmed and provisional cards.
    #[must_use]
    pub fn map(world: &World) -> &MapState {
        &world.map
    }

    /// Card positions that would accept the next card.
    #[must_use]
    pub fn next_card_positions(world: &World) -> Vec<Point> {
        legal_positions(&world.placed_positions(), world.variants.diagonals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limes_core::{CardId, Rotation};

    fn propose(x: i32, y: i32, card: u8) -> Command {
        Command::ProposeCard {
            placement: Placement::new(Point::new(x, y), CardId::new(card), Rotation::UPRIGHT),
        }
    }

    fn run(world: &mut World, commands: impl IntoIterator<Item = Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(world, command, &mut events).expect("standard catalog");
        }
        events
    }

    #[test]
    fn proposing_a_card_rebuilds_the_map() {
        let mut world = World::new();
        let events = run(&mut world, [propose(0, 0, 1)]);

        assert_eq!(
            events,
            vec![
                Event::ProvisionalCardChanged {
                    placement: Some(Placement::new(
                        Point::new(0, 0),
                        CardId::new(1),
                        Rotation::UPRIGHT
                    )),
                },
                Event::MapRebuilt {
                    zones: 4,
                    territories: 2
                },
            ]
        );
        assert!(query::placements(&world).is_empty());
        assert_eq!(query::map(&world).territories().len(), 2);
    }

    #[test]
    fn first_card_must_sit_at_the_origin() {
        let mut world = World::new();
        let events = run(&mut world, [propose(1, 0, 1)]);

        assert_eq!(
            events,
            vec![Event::CardRejected {
                position: Some(Point::new(1, 0)),
                reason: PlacementError::Detached,
            }]
        );
        assert!(query::provisional(&world).is_none());
    }

    #[test]
    fn unknown_cards_are_rejected_before_the_map_changes() {
        let mut world = World::new();
        let events = run(&mut world, [propose(0, 0, 42)]);

        assert_eq!(
            events,
            vec![Event::CardRejected {
                position: Some(Point::new(0, 0)),
                reason: PlacementError::UnknownCard,
            }]
        );
        assert!(query::map(&world).is_empty());
    }

    #[test]
    fn rotating_updates_the_provisional_card() {
        let mut world = World::new();
        let _ = run(&mut world, [propose(0, 0, 1), Command::RotateProvisionalCard]);

        let provisional = query::provisional(&world).expect("card still provisional");
        assert_eq!(provisional.rotation, Rotation::from_quarter_turns(1));
    }

    #[test]
    fn commands_without_a_provisional_card_are_rejected() {
        let mut world = World::new();
        let events = run(
            &mut world,
            [
                Command::RotateProvisionalCard,
                Command::ConfirmCard,
                Command::WithdrawProvisionalCard,
                Command::UndoCard,
            ],
        );

        let reasons: Vec<PlacementError> = events
            .iter()
            .filter_map(|event| match event {
                Event::CardRejected {
                    position: None,
                    reason,
                } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                PlacementError::NoProvisionalCard,
                PlacementError::NoProvisionalCard,
                PlacementError::NoProvisionalCard,
                PlacementError::NothingToUndo,
            ]
        );
    }

    #[test]
    fn next_positions_follow_confirmed_cards() {
        let mut world = World::new();
        assert_eq!(query::next_card_positions(&world), vec![Point::new(0, 0)]);

        let _ = run(&mut world, [propose(0, 0, 1), Command::ConfirmCard]);
        assert_eq!(query::next_card_positions(&world).len(), 4);

        let _ = run(
            &mut world,
            [Command::ConfigureVariants {
                variants: Variants {
                    diagonals: true,
                    ..Variants::default()
                },
            }],
        );
        assert_eq!(query::next_card_positions(&world).len(), 8);
    }

    #[test]
    fn workers_need_a_zone_and_leave_with_their_card() {
        let mut world = World::new();
        let _ = run(
            &mut world,
            [
                propose(0, 0, 1),
                Command::ConfirmCard,
                propose(1, 0, 7),
                Command::ConfirmCard,
            ],
        );

        let events = run(
            &mut world,
            [
                Command::PlaceWorker {
                    zone: Point::new(9, 9),
                },
                Command::PlaceWorker {
                    zone: Point::new(2, 0),
                },
                Command::PlaceWorker {
                    zone: Point::new(0, 0),
                },
            ],
        );
        assert_eq!(
            events[0],
            Event::WorkerRejected {
                zone: Point::new(9, 9),
                reason: WorkerError::NoZone,
            }
        );
        assert_eq!(query::workers(&world).len(), 2);

        let events = run(&mut world, [Command::UndoCard]);
        assert!(events.contains(&Event::WorkerRemoved {
            zone: Point::new(2, 0)
        }));
        assert_eq!(query::workers(&world), &[Point::new(0, 0)]);
    }

    #[test]
    fn removing_a_missing_worker_is_rejected() {
        let mut world = World::new();
        let _ = run(&mut world, [propose(0, 0, 1), Command::ConfirmCard]);

        let events = run(
            &mut world,
            [
                Command::PlaceWorker {
                    zone: Point::new(1, 1),
                },
                Command::PlaceWorker {
                    zone: Point::new(1, 1),
                },
                Command::RemoveWorker {
                    zone: Point::new(1, 1),
                },
                Command::RemoveWorker {
                    zone: Point::new(0, 1),
                },
            ],
        );

        assert_eq!(query::workers(&world), &[Point::new(1, 1)]);
        assert_eq!(
            events.last(),
            Some(&Event::WorkerRejected {
                zone: Point::new(0, 1),
                reason: WorkerError::NoWorker,
            })
        );
    }
}
