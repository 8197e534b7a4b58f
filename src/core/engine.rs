use crate::core::matching::{CompatibilityGraph, Matching};
use crate::core::search::{RandomizedSearch, SearchOutcome};
use crate::domain::model::{Assignment, ForbiddenPair, Pairing, Participant};
use crate::utils::error::AssignmentError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_BUDGET_FACTOR: usize = 32;

/// Upper bound on placement attempts for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepBudget {
    /// `factor * n * n` for `n` participants.
    Scaled(usize),
    Fixed(usize),
}

impl StepBudget {
    pub fn limit(&self, participants: usize) -> usize {
        match *self {
            StepBudget::Scaled(factor) => factor
                .saturating_mul(participants)
                .saturating_mul(participants),
            StepBudget::Fixed(steps) => steps,
        }
    }
}

impl Default for StepBudget {
    fn default() -> Self {
        StepBudget::Scaled(DEFAULT_BUDGET_FACTOR)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Fixed seed for reproducible draws; a fresh one is drawn per call otherwise.
    pub seed: Option<u64>,
    pub budget: StepBudget,
}

/// Draws a giver -> receiver permutation that avoids self-assignment and
/// every forbidden pair.
///
/// The engine holds no state between calls, so one instance can serve
/// concurrent callers. Feasibility is decided up front with a maximum
/// bipartite matching; only feasible inputs reach the randomized search.
/// The resulting draw is pseudo-random, not uniform over all valid draws.
#[derive(Debug, Clone, Default)]
pub struct AssignmentEngine {
    options: EngineOptions,
}

impl AssignmentEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(EngineOptions {
            seed: Some(seed),
            ..EngineOptions::default()
        })
    }

    pub fn with_budget(mut self, budget: StepBudget) -> Self {
        self.options.budget = budget;
        self
    }

    pub fn assign(
        &self,
        participants: &[Participant],
        forbidden: &[ForbiddenPair],
    ) -> Result<Assignment, AssignmentError> {
        let seed = self.options.seed.unwrap_or_else(|| rand::rng().random());
        self.assign_seeded(participants, forbidden, seed)
    }

    /// Like [`assign`](Self::assign), but retries `SearchExhausted` with seeds
    /// derived from the base seed. Returns the draw and the attempt count.
    pub fn assign_with_retries(
        &self,
        participants: &[Participant],
        forbidden: &[ForbiddenPair],
        max_attempts: u32,
    ) -> Result<(Assignment, u32), AssignmentError> {
        let base_seed = self.options.seed.unwrap_or_else(|| rand::rng().random());
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let seed = base_seed.wrapping_add(u64::from(attempt - 1));
            match self.assign_seeded(participants, forbidden, seed) {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        "🔁 Attempt {}/{} failed ({}), retrying with a new order",
                        attempt,
                        max_attempts,
                        e
                    );
                    attempt += 1;
                }
                result => return result.map(|assignment| (assignment, attempt)),
            }
        }
    }

    /// Runs only the feasibility pre-check, without drawing.
    pub fn check_feasibility(
        &self,
        participants: &[Participant],
        forbidden: &[ForbiddenPair],
    ) -> Result<(), AssignmentError> {
        compatibility_graph(participants, forbidden).map(|_| ())
    }

    pub fn assign_seeded(
        &self,
        participants: &[Participant],
        forbidden: &[ForbiddenPair],
        seed: u64,
    ) -> Result<Assignment, AssignmentError> {
        let (graph, matching) = compatibility_graph(participants, forbidden)?;
        let n = graph.len();

        let budget = self.options.budget.limit(n);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        tracing::debug!(
            "Searching {} participants, seed {}, budget {}",
            n,
            seed,
            budget
        );

        match RandomizedSearch::new(&graph, matching, &mut rng).run(budget) {
            SearchOutcome::Found { receivers, steps } => {
                let pairs = receivers
                    .iter()
                    .enumerate()
                    .map(|(giver, &receiver)| Pairing {
                        giver: participants[giver].clone(),
                        receiver: participants[receiver].clone(),
                    })
                    .collect();
                Ok(Assignment { pairs, seed, steps })
            }
            SearchOutcome::Exhausted { steps } => {
                Err(AssignmentError::SearchExhausted { steps, budget })
            }
        }
    }
}

/// Builds the giver/receiver graph together with a perfect matching of it.
fn compatibility_graph(
    participants: &[Participant],
    forbidden: &[ForbiddenPair],
) -> Result<(CompatibilityGraph, Matching), AssignmentError> {
    let n = participants.len();
    if n < 2 {
        return Err(AssignmentError::InsufficientParticipants { count: n });
    }

    let index: HashMap<&str, usize> = participants
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.as_str(), i))
        .collect();

    let mut excluded = HashSet::with_capacity(forbidden.len());
    let mut ignored = 0usize;
    for pair in forbidden {
        match (
            index.get(pair.giver_id.as_str()),
            index.get(pair.receiver_id.as_str()),
        ) {
            (Some(&giver), Some(&receiver)) => {
                excluded.insert((giver, receiver));
            }
            _ => ignored += 1,
        }
    }
    if ignored > 0 {
        tracing::debug!("Ignoring {} prior pairs with unknown participants", ignored);
    }

    let graph = CompatibilityGraph::new(n, &excluded);
    let matching = graph.maximum_matching();
    if let Some(violation) = graph.hall_violation(&matching) {
        let ids = |indices: &[usize]| -> Vec<String> {
            indices.iter().map(|&i| participants[i].id.clone()).collect()
        };
        return Err(AssignmentError::Infeasible {
            giver: participants[violation.giver].id.clone(),
            over_constrained: ids(&violation.givers),
            available_receivers: ids(&violation.receivers),
        });
    }

    Ok((graph, matching))
}
