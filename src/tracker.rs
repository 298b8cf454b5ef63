use std::collections::{BTreeMap, HashSet};
use std::f64::consts::PI;

use log::trace;

use crate::feature::{TouchObservation, TrackedTouch};
use crate::my_types::*;

pub const DEFAULT_MATCH_THRESHOLD: f64 = PI / 8.;

/// Assigns stable ids to anonymous touch observations, one sample at a time.
///
/// Every new observation is matched against the last known position of the
/// touches from the previous sample. Pairs are claimed greedily, starting
/// with the observation whose closest candidate is the closest of the whole
/// frame, so a loose pairing never takes an id from a tighter one.
#[derive(Debug, Clone)]
pub struct TouchTracker {
    match_threshold: f64,
    next_id: TouchId,
    /// Touches of the previous sample, id -> last position
    active: BTreeMap<TouchId, Angle>,
}

impl Default for TouchTracker {
    fn default() -> Self {
        TouchTracker::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl TouchTracker {
    pub fn new(match_threshold: f64) -> Self {
        TouchTracker {
            match_threshold,
            next_id: 0,
            active: BTreeMap::new(),
        }
    }

    pub fn match_threshold(&self) -> f64 {
        self.match_threshold
    }

    pub fn next_id(&self) -> TouchId {
        self.next_id
    }

    pub fn active(&self) -> &BTreeMap<TouchId, Angle> {
        &self.active
    }

    /// Forget the active touches. Ids keep counting from where they were.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Forget the active touches and restart ids at 0
    pub fn reset(&mut self) {
        self.active.clear();
        self.next_id = 0;
    }

    /// Label the observations of one sample.
    ///
    /// Returns one tracked touch per observation with a valid position, in
    /// input order. Observations without a position are dropped.
    pub fn assign(&mut self, observations: &[TouchObservation]) -> Vec<TrackedTouch> {
        let valid: Vec<(Angle, &TouchObservation)> = observations
            .iter()
            .filter_map(|obs| obs.valid_position().map(|p| (p, obs)))
            .collect();

        // candidate list per observation, closest first
        let candidates: Vec<Vec<(f64, TouchId)>> = valid
            .iter()
            .map(|&(position, _)| self.candidates(position))
            .collect();

        // observations without any candidate pick last
        let mut order: Vec<usize> = (0..valid.len()).collect();
        order.sort_by(|&a, &b| {
            best_distance(&candidates[a]).total_cmp(&best_distance(&candidates[b]))
        });

        let mut ids: Vec<TouchId> = vec![0; valid.len()];
        let mut claimed = HashSet::new();
        for &i in &order {
            let free = candidates[i]
                .iter()
                .map(|&(_, id)| id)
                .find(|id| !claimed.contains(id));
            ids[i] = match free {
                Some(id) => {
                    claimed.insert(id);
                    id
                }
                None => {
                    let id = self.allocate_id();
                    trace!("new touch {} at {:.3}", id, valid[i].0);
                    id
                }
            };
        }

        let matched: Vec<TrackedTouch> = valid
            .iter()
            .zip(ids)
            .map(|(&(position, obs), id)| TrackedTouch::new(id, position, obs))
            .collect();

        trace!(
            "frame: {} observations, {} matched, {} active before",
            matched.len(),
            claimed.len(),
            self.active.len()
        );

        // untouched ids vanish with the old snapshot
        self.active = matched.iter().map(|t| (t.id, t.position)).collect();

        matched
    }

    /// Active touches closer than the threshold, sorted by (distance, id)
    fn candidates(&self, position: Angle) -> Vec<(f64, TouchId)> {
        let mut candidates: Vec<(f64, TouchId)> = self
            .active
            .iter()
            // plain difference, no wrap at 2 pi
            .map(|(&id, &old)| ((old - position).abs(), id))
            .filter(|&(dist, _)| dist < self.match_threshold)
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        candidates
    }

    fn allocate_id(&mut self) -> TouchId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn best_distance(candidates: &[(f64, TouchId)]) -> f64 {
    candidates.first().map_or(f64::INFINITY, |c| c.0)
}
