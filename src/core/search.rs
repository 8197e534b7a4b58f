//! Randomized search over a [`CompatibilityGraph`], guided by a perfect
//! matching.
//!
//! Givers are visited in a shuffled order and each tries its allowed
//! receivers in its own shuffled order. A placement is kept only if the
//! givers still waiting can all be matched afterwards, which is checked by
//! repairing the matching with one augmenting path. Every placement attempt
//! counts as one step against the budget.

use crate::core::matching::{CompatibilityGraph, Matching};
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// `receivers[g]` is the receiver chosen for giver `g`.
    Found { receivers: Vec<usize>, steps: usize },
    Exhausted { steps: usize },
}

pub struct RandomizedSearch<'a> {
    graph: &'a CompatibilityGraph,
    matching: Matching,
    order: Vec<usize>,
    candidates: Vec<Vec<usize>>,
}

impl<'a> RandomizedSearch<'a> {
    /// `matching` must be a perfect matching of `graph`.
    pub fn new<R: Rng + ?Sized>(
        graph: &'a CompatibilityGraph,
        matching: Matching,
        rng: &mut R,
    ) -> Self {
        let mut order: Vec<usize> = (0..graph.len()).collect();
        order.shuffle(rng);

        let candidates = (0..graph.len())
            .map(|giver| {
                let mut list = graph.candidates(giver).to_vec();
                list.shuffle(rng);
                list
            })
            .collect();

        Self {
            graph,
            matching,
            order,
            candidates,
        }
    }

    pub fn run(self, budget: usize) -> SearchOutcome {
        let Self {
            graph,
            mut matching,
            order,
            candidates,
        } = self;
        let n = graph.len();
        let mut locked = vec![false; n];
        let mut seen = vec![usize::MAX; n];
        let mut steps = 0;

        for &giver in &order {
            locked[giver] = true;

            let mut placed = false;
            for &receiver in &candidates[giver] {
                // 已被先前的 giver 拿走
                if matching
                    .giver_of(receiver)
                    .is_some_and(|holder| holder != giver && locked[holder])
                {
                    continue;
                }
                if steps == budget {
                    return SearchOutcome::Exhausted { steps };
                }
                steps += 1;
                if graph.reassign(&mut matching, giver, receiver, &locked, &mut seen, steps) {
                    placed = true;
                    break;
                }
            }

            if !placed {
                return SearchOutcome::Exhausted { steps };
            }
        }

        let receivers: Option<Vec<usize>> =
            (0..n).map(|giver| matching.receiver_of(giver)).collect();
        match receivers {
            Some(receivers) => SearchOutcome::Found { receivers, steps },
            None => SearchOutcome::Exhausted { steps },
        }
    }
}
