use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use limes_core::{
    CardId, Command, Event, Placement, Point, Rotation, Variants, MAX_BOARD_CARDS,
};
use limes_system_scoring::{ScoreReport, Scoring};
use limes_world::{apply, query, World};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// One card of an `inspect` board, written as `x,y:id:rotation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CardSpec {
    pub(crate) placement: Placement,
}

impl CardSpec {
    /// Parses a whitespace separated list of card entries.
    pub(crate) fn parse_list(value: &str) -> Result<Vec<Self>> {
        value.split_whitespace().map(str::parse).collect()
    }
}

impl FromStr for CardSpec {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let mut parts = value.split(':');
        let (Some(position), Some(card), rotation, None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            bail!("card entry `{value}` must look like `x,y:id` or `x,y:id:rotation`");
        };

        let position: Point = position
            .parse()
            .with_context(|| format!("invalid card position in `{value}`"))?;
        let card: u8 = card
            .parse()
            .with_context(|| format!("invalid card id in `{value}`"))?;
        let turns: u32 = rotation
            .map(str::parse)
            .transpose()
            .with_context(|| format!("invalid rotation in `{value}`"))?
            .unwrap_or(0);

        Ok(Self {
            placement: Placement::new(
                position,
                CardId::new(card),
                Rotation::from_quarter_turns(turns),
            ),
        })
    }
}

/// Parses a whitespace separated list of worker zones.
pub(crate) fn parse_workers(value: &str) -> Result<Vec<Point>> {
    value
        .split_whitespace()
        .map(|entry| {
            entry
                .parse()
                .with_context(|| format!("invalid worker zone `{entry}`"))
        })
        .collect()
}

/// A board driven through world commands, with its score kept current.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    scoring: Scoring,
}

impl Session {
    fn new(variants: Variants) -> Result<Self> {
        let mut session = Self {
            world: World::new(),
            scoring: Scoring::new(),
        };
        let _ = session.submit(Command::ConfigureVariants { variants })?;
        Ok(session)
    }

    /// Lays the cards in order, then places the workers.
    pub(crate) fn lay(variants: Variants, cards: &[CardSpec], workers: &[Point]) -> Result<Self> {
        let mut session = Self::new(variants)?;
        for card in cards {
            session
                .place_card(card.placement)
                .with_context(|| format!("cannot lay card at {}", card.placement.position))?;
        }
        for &zone in workers {
            session.place_worker(zone)?;
        }
        Ok(session)
    }

    /// Deals a shuffled four-by-four board and scatters workers over it.
    pub(crate) fn deal(seed: u64, variants: Variants, workers: usize) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut session = Self::new(variants)?;

        let mut deck: Vec<CardId> = query::catalog(&session.world).ids().collect();
        deck.shuffle(&mut rng);

        let positions = (0..MAX_BOARD_CARDS)
            .flat_map(|y| (0..MAX_BOARD_CARDS).map(move |x| Point::new(x, y)));
        for (position, card) in positions.zip(deck) {
            let rotation = Rotation::from_quarter_turns(rng.gen_range(0..4));
            session.place_card(Placement::new(position, card, rotation))?;
        }

        let zones: Vec<Point> = query::map(&session.world)
            .zones()
            .iter()
            .map(|(zone, _)| zone)
            .collect();
        for _ in 0..workers {
            let Some(&zone) = zones.choose(&mut rng) else {
                break;
            };
            session.place_worker(zone)?;
        }
        debug!(seed, workers, "board dealt");
        Ok(session)
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Score of the current board.
    pub(crate) fn score(&self) -> Result<&ScoreReport> {
        self.scoring
            .last_report()
            .ok_or_else(|| anyhow!("no score has been computed yet"))
    }

    fn place_card(&mut self, placement: Placement) -> Result<()> {
        let events = self.submit(Command::ProposeCard { placement })?;
        if let Some(reason) = events.iter().find_map(|event| match event {
            Event::CardRejected { reason, .. } => Some(*reason),
            _ => None,
        }) {
            bail!("card {} rejected: {reason:?}", placement.card);
        }
        let _ = self.submit(Command::ConfirmCard)?;
        Ok(())
    }

    fn place_worker(&mut self, zone: Point) -> Result<()> {
        let events = self.submit(Command::PlaceWorker { zone })?;
        if let Some(reason) = events.iter().find_map(|event| match event {
            Event::WorkerRejected { reason, .. } => Some(*reason),
            _ => None,
        }) {
            bail!("worker at zone {zone} rejected: {reason:?}");
        }
        Ok(())
    }

    fn submit(&mut self, command: Command) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        apply(&mut self.world, command, &mut events).context("board reached an invalid state")?;
        let _ = self
            .scoring
            .handle(
                &events,
                query::map(&self.world),
                query::workers(&self.world),
            )
            .context("failed to score the board")?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_entries_parse_with_optional_rotation() {
        let cards = CardSpec::parse_list("0,0:1:2  1,0:7").expect("valid entries");
        assert_eq!(
            cards,
            vec![
                CardSpec {
                    placement: Placement::new(
                        Point::new(0, 0),
                        CardId::new(1),
                        Rotation::from_quarter_turns(2)
                    ),
                },
                CardSpec {
                    placement: Placement::new(Point::new(1, 0), CardId::new(7), Rotation::UPRIGHT),
                },
            ]
        );
        assert!("0,0".parse::<CardSpec>().is_err());
        assert!("0,0:1:2:3".parse::<CardSpec>().is_err());
        assert!("0,0:x".parse::<CardSpec>().is_err());
    }

    #[test]
    fn laying_cards_scores_workers() {
        let cards = CardSpec::parse_list("0,0:7:0").expect("valid entries");
        let workers = parse_workers("0,0 1,1").expect("valid zones");
        let session = Session::lay(Variants::default(), &cards, &workers).expect("legal board");

        assert_eq!(session.score().expect("scored").total(), 3);
    }

    #[test]
    fn detached_cards_are_reported() {
        let cards = CardSpec::parse_list("0,0:7:0 2,0:1:0").expect("valid entries");
        let error = Session::lay(Variants::default(), &cards, &[]).expect_err("gap in the board");
        assert!(format!("{error:#}").contains("Detached"));
    }

    #[test]
    fn dealing_is_deterministic_per_seed() {
        let first = Session::deal(7, Variants::default(), 3).expect("dealt board");
        let second = Session::deal(7, Variants::default(), 3).expect("dealt board");

        assert_eq!(query::placements(first.world()).len(), 16);
        assert_eq!(
            query::placements(first.world()),
            query::placements(second.world())
        );
        assert_eq!(query::workers(first.world()), query::workers(second.world()));
        assert_eq!(
            first.score().expect("scored"),
            second.score().expect("scored")
        );
    }
}
