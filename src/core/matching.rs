//! Bipartite compatibility graph between givers and receivers.
//!
//! Both sides are the same participant indices. An edge `g -> r` exists when
//! `g != r` and the pair is not excluded. A valid draw is a perfect matching
//! of this graph; [`CompatibilityGraph::maximum_matching`] decides whether one
//! exists before any randomized search starts.

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone)]
pub struct CompatibilityGraph {
    /// Allowed receivers per giver, ascending.
    candidates: Vec<Vec<usize>>,
}

impl CompatibilityGraph {
    pub fn new(size: usize, excluded: &HashSet<(usize, usize)>) -> Self {
        let candidates = (0..size)
            .map(|giver| {
                (0..size)
                    .filter(|&receiver| receiver != giver && !excluded.contains(&(giver, receiver)))
                    .collect()
            })
            .collect();
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidates(&self, giver: usize) -> &[usize] {
        &self.candidates[giver]
    }

    pub fn allows(&self, giver: usize, receiver: usize) -> bool {
        self.candidates
            .get(giver)
            .is_some_and(|c| c.binary_search(&receiver).is_ok())
    }

    /// Maximum matching by repeated augmenting paths (Kuhn).
    pub fn maximum_matching(&self) -> Matching {
        let n = self.len();
        let mut matching = Matching {
            receiver_of: vec![None; n],
            giver_of: vec![None; n],
        };

        // 先貪婪配對，再對剩下的 giver 找增廣路徑
        for giver in 0..n {
            if let Some(&receiver) = self.candidates[giver]
                .iter()
                .find(|&&r| matching.giver_of[r].is_none())
            {
                matching.receiver_of[giver] = Some(receiver);
                matching.giver_of[receiver] = Some(giver);
            }
        }

        let mut seen = vec![usize::MAX; n];
        let unlocked = vec![false; n];
        for giver in 0..n {
            if matching.receiver_of[giver].is_none() {
                self.augment(giver, giver, &mut seen, &unlocked, &mut matching);
            }
        }

        matching
    }

    /// Iterative DFS for an augmenting path starting at an unmatched `root`.
    /// `seen[r] == stamp` marks receivers already explored in this pass.
    /// Receivers held by `locked` givers are never taken away from them.
    /// `matching` is only written when a path is found.
    fn augment(
        &self,
        root: usize,
        stamp: usize,
        seen: &mut [usize],
        locked: &[bool],
        matching: &mut Matching,
    ) -> bool {
        // (giver, index of the next candidate to try)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(top) = stack.last_mut() {
            let (giver, cursor) = *top;
            let Some(&receiver) = self.candidates[giver].get(cursor) else {
                stack.pop();
                continue;
            };
            top.1 += 1;

            if seen[receiver] == stamp {
                continue;
            }
            seen[receiver] = stamp;

            match matching.giver_of[receiver] {
                Some(holder) if locked[holder] => continue,
                Some(holder) => stack.push((holder, 0)),
                None => {
                    // Each giver on the path takes the receiver it last tried.
                    for &(g, next) in &stack {
                        let r = self.candidates[g][next - 1];
                        matching.receiver_of[g] = Some(r);
                        matching.giver_of[r] = Some(g);
                    }
                    return true;
                }
            }
        }

        false
    }

    /// Moves `giver` onto `receiver` inside a perfect `matching`, then
    /// re-matches the displaced holder through an augmenting path that leaves
    /// `locked` givers alone. `giver` itself must already be locked.
    ///
    /// Succeeds exactly when the unlocked givers can still all be matched
    /// after the move. On failure `matching` is left as it was.
    pub(crate) fn reassign(
        &self,
        matching: &mut Matching,
        giver: usize,
        receiver: usize,
        locked: &[bool],
        seen: &mut [usize],
        stamp: usize,
    ) -> bool {
        let (Some(holder), Some(previous)) =
            (matching.giver_of[receiver], matching.receiver_of[giver])
        else {
            return false;
        };
        if holder == giver {
            return true;
        }

        matching.receiver_of[giver] = Some(receiver);
        matching.giver_of[receiver] = Some(giver);
        matching.receiver_of[holder] = None;
        matching.giver_of[previous] = None;

        if self.augment(holder, stamp, seen, locked, matching) {
            return true;
        }

        // 還原原本的配對
        matching.receiver_of[holder] = Some(receiver);
        matching.giver_of[receiver] = Some(holder);
        matching.receiver_of[giver] = Some(previous);
        matching.giver_of[previous] = Some(giver);
        false
    }

    /// When `matching` is maximum but not perfect, collects the givers
    /// reachable from an unmatched giver by alternating paths. Those givers
    /// outnumber the receivers they can reach by exactly one.
    pub fn hall_violation(&self, matching: &Matching) -> Option<HallViolation> {
        let root = matching.unmatched_giver()?;
        let n = self.len();

        let mut giver_seen = vec![false; n];
        let mut receiver_seen = vec![false; n];
        let mut queue = VecDeque::from([root]);
        giver_seen[root] = true;

        while let Some(giver) = queue.pop_front() {
            for &receiver in &self.candidates[giver] {
                if receiver_seen[receiver] {
                    continue;
                }
                receiver_seen[receiver] = true;
                if let Some(holder) = matching.giver_of[receiver] {
                    if !giver_seen[holder] {
                        giver_seen[holder] = true;
                        queue.push_back(holder);
                    }
                }
            }
        }

        let collect = |flags: &[bool]| -> Vec<usize> {
            flags
                .iter()
                .enumerate()
                .filter_map(|(i, &set)| set.then_some(i))
                .collect()
        };

        Some(HallViolation {
            giver: root,
            givers: collect(&giver_seen),
            receivers: collect(&receiver_seen),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    receiver_of: Vec<Option<usize>>,
    giver_of: Vec<Option<usize>>,
}

impl Matching {
    #[cfg(test)]
    fn size(&self) -> usize {
        self.receiver_of.iter().filter(|r| r.is_some()).count()
    }

    #[cfg(test)]
    fn is_perfect(&self) -> bool {
        self.receiver_of.iter().all(Option::is_some)
    }

    pub fn receiver_of(&self, giver: usize) -> Option<usize> {
        self.receiver_of.get(giver).copied().flatten()
    }

    pub fn giver_of(&self, receiver: usize) -> Option<usize> {
        self.giver_of.get(receiver).copied().flatten()
    }

    pub fn unmatched_giver(&self) -> Option<usize> {
        self.receiver_of.iter().position(Option::is_none)
    }
}

/// Givers whose allowed receivers are fewer than the givers themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HallViolation {
    /// The unmatched giver the violation was grown from.
    pub giver: usize,
    pub givers: Vec<usize>,
    pub receivers: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(size: usize, excluded: &[(usize, usize)]) -> CompatibilityGraph {
        CompatibilityGraph::new(size, &excluded.iter().copied().collect())
    }

    fn assert_valid(g: &CompatibilityGraph, m: &Matching) {
        let mut used = HashSet::new();
        for giver in 0..g.len() {
            let r = m.receiver_of(giver).unwrap();
            assert!(g.allows(giver, r), "{giver} -> {r} not allowed");
            assert!(used.insert(r), "receiver {r} used twice");
        }
    }

    #[test]
    fn test_candidates_exclude_self_and_forbidden() {
        let g = graph(3, &[(0, 1)]);
        assert_eq!(g.candidates(0), &[2]);
        assert_eq!(g.candidates(1), &[0, 2]);
        assert!(!g.allows(1, 1));
        assert!(!g.allows(0, 1));
        assert!(!g.allows(5, 0));
    }

    #[test]
    fn test_perfect_matching_without_exclusions() {
        let g = graph(6, &[]);
        let m = g.maximum_matching();
        assert!(m.is_perfect());
        assert_valid(&g, &m);
        assert!(g.hall_violation(&m).is_none());
    }

    #[test]
    fn test_augmenting_path_repairs_greedy_choice() {
        // Greedy gives 0 -> 1, leaving 2 with nothing; 2 can only take 1.
        let g = graph(3, &[(2, 0), (1, 2)]);
        let m = g.maximum_matching();
        assert!(m.is_perfect());
        assert_valid(&g, &m);
        assert_eq!(m.receiver_of(2), Some(1));
    }

    #[test]
    fn test_two_people_mutually_forbidden() {
        let g = graph(2, &[(0, 1), (1, 0)]);
        let m = g.maximum_matching();
        assert_eq!(m.size(), 0);

        let violation = g.hall_violation(&m).unwrap();
        assert_eq!(violation.giver, 0);
        assert_eq!(violation.givers, vec![0]);
        assert!(violation.receivers.is_empty());
    }

    #[test]
    fn test_hall_violation_over_shared_receiver() {
        // 0 and 1 may only give to 2.
        let g = graph(4, &[(0, 1), (0, 3), (1, 0), (1, 3)]);
        let m = g.maximum_matching();
        assert!(!m.is_perfect());

        let violation = g.hall_violation(&m).unwrap();
        assert_eq!(violation.givers, vec![0, 1]);
        assert_eq!(violation.receivers, vec![2]);
        assert_eq!(violation.givers.len(), violation.receivers.len() + 1);
    }

    #[test]
    fn test_reassign_repairs_displaced_holder() {
        let g = graph(3, &[]);
        let mut m = g.maximum_matching();
        let giver = 0;
        let target = (1..3).find(|&r| m.receiver_of(giver) != Some(r)).unwrap();
        let mut locked = vec![false; 3];
        locked[giver] = true;
        let mut seen = vec![usize::MAX; 3];

        assert!(g.reassign(&mut m, giver, target, &locked, &mut seen, 0));
        assert_eq!(m.receiver_of(giver), Some(target));
        assert!(m.is_perfect());
        assert_valid(&g, &m);
    }

    #[test]
    fn test_reassign_refuses_move_that_strands_a_giver() {
        // 0 may give to 1 or 2, but 2 may only give to 1.
        let g = graph(3, &[(2, 0)]);
        let mut m = g.maximum_matching();
        assert_eq!(m.receiver_of(2), Some(1));
        let before = m.clone();

        let mut locked = vec![false; 3];
        locked[0] = true;
        let mut seen = vec![usize::MAX; 3];
        assert!(!g.reassign(&mut m, 0, 1, &locked, &mut seen, 0));
        assert_eq!(m, before);
    }
}
