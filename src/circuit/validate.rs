//! Completeness check run before any solving work.

use super::types::SpotId;
use super::Spot;

/// Outcome of the completeness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completeness {
    /// No spot has a component on it
    Empty,
    /// These spots hold a single, unterminated component end
    Dangling(Vec<SpotId>),
    /// Every touched spot joins at least two components
    Complete,
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        matches!(self, Completeness::Complete)
    }
}

/// Check whether a board can be solved.
///
/// A board is solvable when at least one spot is touched and no touched
/// spot has exactly one incident component.
pub fn check_completeness(spots: &[Spot]) -> Completeness {
    let mut populated = 0usize;
    let mut dangling = Vec::new();

    for (idx, spot) in spots.iter().enumerate() {
        if spot.is_unused() {
            continue;
        }
        populated += 1;
        if spot.is_dangling() {
            dangling.push(SpotId(idx));
        }
    }

    if populated == 0 {
        Completeness::Empty
    } else if !dangling.is_empty() {
        Completeness::Dangling(dangling)
    } else {
        Completeness::Complete
    }
}
