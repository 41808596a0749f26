//! Legality of the next card position.

use std::collections::BTreeSet;

use limes_core::{PlacementError, Point, MAX_BOARD_CARDS};

/// Card positions where the next card may be laid, in `Point` order.
///
/// An empty board only offers the origin. Otherwise every free position that
/// touches a placed card and keeps the board within its bounds is offered.
pub fn next_card_positions(placed: &BTreeSet<Point>, diagonals: bool) -> Vec<Point> {
    if placed.is_empty() {
        return vec![Point::new(0, 0)];
    }

    let candidates: BTreeSet<Point> = placed
        .iter()
        .flat_map(|position| position.adjacent(diagonals))
        .filter(|candidate| !placed.contains(candidate))
        .collect();

    candidates
        .into_iter()
        .filter(|&candidate| within_bounds(placed, candidate))
        .collect()
}

/// Checks a single card position against the placed cards.
pub fn check_position(
    placed: &BTreeSet<Point>,
    position: Point,
    diagonals: bool,
) -> Result<(), PlacementError> {
    if placed.is_empty() {
        return if position == Point::new(0, 0) {
            Ok(())
        } else {
            Err(PlacementError::Detached)
        };
    }
    if placed.contains(&position) {
        return Err(PlacementError::Occupied);
    }
    if !position.adjacent(diagonals).any(|neighbor| placed.contains(&neighbor)) {
        return Err(PlacementError::Detached);
    }
    if !within_bounds(placed, position) {
        return Err(PlacementError::OutOfBounds);
    }
    Ok(())
}

fn within_bounds(placed: &BTreeSet<Point>, candidate: Point) -> bool {
    let (mut min_x, mut max_x) = (candidate.x(), candidate.x());
    let (mut min_y, mut max_y) = (candidate.y(), candidate.y());
    for position in placed {
        min_x = min_x.min(position.x());
        max_x = max_x.max(position.x());
        min_y = min_y.min(position.y());
        max_y = max_y.max(position.y());
    }
    max_x - min_x < MAX_BOARD_CARDS && max_y - min_y < MAX_BOARD_CARDS
}
