//! Opponent decision policies.
//!
//! Policies only ever see a [`BoardView`], so hidden kinds cannot leak into a
//! decision. Timeouts and illegal choices are handled by the machine.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use furysweep_core::{BoardView, CellKind, ClueReading, Coord2, Opponent, PlayerPublic, ViewCell};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;

/// Score given to a hidden cell that must hold a hazard.
const CERTAIN: u32 = 1000;

#[async_trait]
pub trait EnemyDecisionPolicy: Send + Sync {
    /// Picks a hidden cell to reveal, `None` to let the machine choose.
    async fn decide(
        &self,
        view: &BoardView,
        opponent: &Opponent,
        player: &PlayerPublic,
    ) -> Option<Coord2>;
}

/// Uniform choice among hidden cells.
#[derive(Debug)]
pub struct RandomPolicy {
    rng: Mutex<SmallRng>,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl EnemyDecisionPolicy for RandomPolicy {
    async fn decide(
        &self,
        view: &BoardView,
        _opponent: &Opponent,
        _player: &PlayerPublic,
    ) -> Option<Coord2> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        view.hidden_cells().choose(&mut *rng).copied()
    }
}

/// Goes after the cells revealed clues point at.
///
/// Each hidden cell takes the best `remaining / hidden neighbors` ratio of
/// the clues around it, scaled to [`CERTAIN`]. Ties and boards without usable
/// clues fall back to a random pick.
#[derive(Debug)]
pub struct HeuristicPolicy {
    rng: Mutex<SmallRng>,
}

impl HeuristicPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    /// Hidden cells paired with their score, `None` when no clue touches them.
    pub fn score(view: &BoardView) -> Vec<(Coord2, Option<u32>)> {
        let mut scores: Vec<(Coord2, Option<u32>)> = view
            .hidden_cells()
            .into_iter()
            .map(|coords| (coords, None))
            .collect();

        for clue in view.iter_coords() {
            let Some(remaining) = remaining_hazards(view, clue) else {
                continue;
            };
            let hidden: Vec<Coord2> = view
                .iter_neighbors(clue)
                .filter(|&pos| view.is_hidden(pos))
                .collect();
            if hidden.is_empty() {
                continue;
            }
            let hidden_count = u32::try_from(hidden.len()).unwrap_or(u32::MAX);
            let ratio = (remaining.min(hidden_count) * CERTAIN) / hidden_count;

            for (coords, score) in scores.iter_mut() {
                if hidden.contains(coords) {
                    *score = Some(score.map_or(ratio, |current| current.max(ratio)));
                }
            }
        }
        scores
    }
}

/// Items a clue still accounts for among its hidden neighbors.
fn remaining_hazards(view: &BoardView, clue: Coord2) -> Option<u32> {
    let ViewCell::Clue(reading) = view.cell_at(clue)? else {
        return None;
    };
    let (shown, counts_currency) = match reading {
        ClueReading::Concealed => return None,
        ClueReading::Total(total) => (total, true),
        ClueReading::Split { hazards, .. } => (hazards, false),
    };
    let found = view
        .iter_neighbors(clue)
        .filter(|&pos| match view.cell_at(pos) {
            Some(ViewCell::Open(CellKind::Hazard)) => true,
            Some(ViewCell::Open(CellKind::Currency)) => counts_currency,
            _ => false,
        })
        .count();
    let found = u8::try_from(found).unwrap_or(u8::MAX);
    Some(u32::from(shown.saturating_sub(found)))
}

#[async_trait]
impl EnemyDecisionPolicy for HeuristicPolicy {
    async fn decide(
        &self,
        view: &BoardView,
        _opponent: &Opponent,
        _player: &PlayerPublic,
    ) -> Option<Coord2> {
        let scores = Self::score(view);
        let best = scores.iter().filter_map(|(_, score)| *score).max();

        let candidates: Vec<Coord2> = match best {
            Some(best) if best > 0 => scores
                .iter()
                .filter(|(_, score)| *score == Some(best))
                .map(|(coords, _)| *coords)
                .collect(),
            _ => {
                let unknown: Vec<Coord2> = scores
                    .iter()
                    .filter(|(_, score)| score.is_none())
                    .map(|(coords, _)| *coords)
                    .collect();
                if unknown.is_empty() {
                    scores.iter().map(|(coords, _)| *coords).collect()
                } else {
                    unknown
                }
            }
        };

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let choice = candidates.choose(&mut *rng).copied();
        log::trace!("Heuristic picked {:?} with score {:?}", choice, best);
        choice
    }
}
