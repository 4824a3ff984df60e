//! Greedy local search that packs guests into capacity-limited groups.
//!
//! A run starts from a random fill ([`Optimizer::randomize`]) and then sweeps
//! over every node in random order, moving each one to the group where it
//! has the fewest non-friends. Moves are committed immediately so later
//! nodes in the same pass already see them. The search stops after a pass
//! without moves or after [`MAX_PASSES`] passes.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::ConfigError;
use crate::ir::{Graph, GroupLabel, NodeId};

/// Upper bound on refinement passes per run.
pub const MAX_PASSES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLimits {
    max_groups: u32,
    group_size: usize,
}

impl GroupLimits {
    pub fn new(max_groups: i64, group_size: i64) -> Result<Self, ConfigError> {
        let max_groups = u32::try_from(max_groups)
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::MaxGroups(max_groups))?;
        let group_size = usize::try_from(group_size)
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::GroupSize(group_size))?;
        Ok(Self {
            max_groups,
            group_size,
        })
    }

    pub fn max_groups(&self) -> u32 {
        self.max_groups
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Seats available across all groups.
    pub fn capacity(&self) -> usize {
        (self.max_groups as usize).saturating_mul(self.group_size)
    }
}

/// Cooperative stop signal, checked between passes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RandomizeReport {
    pub placed: usize,
    pub full: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    /// 1-based pass number.
    pub pass: usize,
    pub moves: usize,
    pub total_cost: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptimizeReport {
    pub randomized: Option<RandomizeReport>,
    pub passes: usize,
    pub moves: usize,
    pub initial_cost: usize,
    pub final_cost: usize,
    pub converged: bool,
    pub cancelled: bool,
}

/// Number of other members of `group` that are not friends of `node`.
pub fn cost(graph: &Graph, node: NodeId, group: &GroupLabel) -> usize {
    graph
        .nodes()
        .filter(|(id, other)| *id != node && other.group == *group)
        .filter(|(id, _)| !graph.is_connected(node, *id))
        .count()
}

/// Sum of every node's cost in its own group.
pub fn total_cost(graph: &Graph) -> usize {
    Membership::of(graph).total_cost(graph)
}

/// Group -> members index kept in sync with the graph during a run.
#[derive(Debug, Default)]
struct Membership {
    members: HashMap<GroupLabel, Vec<NodeId>>,
}

impl Membership {
    fn of(graph: &Graph) -> Self {
        let mut members: HashMap<GroupLabel, Vec<NodeId>> = HashMap::new();
        for (id, node) in graph.nodes() {
            members.entry(node.group.clone()).or_default().push(id);
        }
        Self { members }
    }

    fn count(&self, group: &GroupLabel) -> usize {
        self.members.get(group).map_or(0, Vec::len)
    }

    fn cost(&self, graph: &Graph, node: NodeId, group: &GroupLabel) -> usize {
        self.members.get(group).map_or(0, |members| {
            members
                .iter()
                .filter(|member| **member != node && !graph.is_connected(node, **member))
                .count()
        })
    }

    fn total_cost(&self, graph: &Graph) -> usize {
        self.members
            .iter()
            .flat_map(|(group, members)| members.iter().map(move |id| (group, *id)))
            .map(|(group, id)| self.cost(graph, id, group))
            .sum()
    }

    fn relocate(&mut self, node: NodeId, from: &GroupLabel, to: GroupLabel) {
        if let Some(members) = self.members.get_mut(from) {
            members.retain(|member| *member != node);
            if members.is_empty() {
                self.members.remove(from);
            }
        }
        self.members.entry(to).or_default().push(node);
    }
}

pub struct Optimizer<R = StdRng> {
    limits: GroupLimits,
    rng: R,
    max_passes: usize,
}

impl Optimizer<StdRng> {
    /// Optimizer seeded from OS entropy; every run differs.
    pub fn new(limits: GroupLimits) -> Self {
        Self::with_rng(limits, StdRng::from_os_rng())
    }

    /// Optimizer whose runs are reproducible for a given seed.
    pub fn seeded(limits: GroupLimits, seed: u64) -> Self {
        Self::with_rng(limits, StdRng::seed_from_u64(seed))
    }

    pub fn from_seed(limits: GroupLimits, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(limits, seed),
            None => Self::new(limits),
        }
    }
}

impl<R: Rng> Optimizer<R> {
    pub fn with_rng(limits: GroupLimits, rng: R) -> Self {
        Self {
            limits,
            rng,
            max_passes: MAX_PASSES,
        }
    }

    /// Lowers or raises the pass cap (at least one pass).
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    pub fn limits(&self) -> GroupLimits {
        self.limits
    }

    /// Clears every group and refills groups `1..=max_groups` in a shuffled
    /// visiting order. The fill cursor only moves forward, so groups fill
    /// one after another and whatever does not fit becomes `Full`.
    pub fn randomize(&mut self, graph: &mut Graph) -> RandomizeReport {
        let mut order = graph.order().to_vec();
        for id in &order {
            graph.set_group(*id, GroupLabel::Unassigned);
        }
        order.shuffle(&mut self.rng);

        let max_groups = u64::from(self.limits.max_groups);
        let mut cursor: u64 = 1;
        let mut filled = 0usize;
        let mut report = RandomizeReport::default();
        for id in order {
            if cursor > max_groups {
                graph.set_group(id, GroupLabel::Full);
                report.full += 1;
                continue;
            }
            // cursor <= max_groups, which fits in u32
            graph.set_group(id, GroupLabel::Group(cursor as u32));
            report.placed += 1;
            filled += 1;
            if filled == self.limits.group_size {
                cursor += 1;
                filled = 0;
            }
        }
        log::debug!(
            "randomized {} nodes: {} placed, {} full",
            graph.len(),
            report.placed,
            report.full
        );
        report
    }

    /// Random fill followed by refinement.
    pub fn optimize(&mut self, graph: &mut Graph) -> OptimizeReport {
        if graph.is_empty() {
            return OptimizeReport {
                converged: true,
                ..OptimizeReport::default()
            };
        }
        let randomized = self.randomize(graph);
        let mut report = self.refine(graph);
        report.randomized = Some(randomized);
        log::info!(
            "optimized {} nodes in {} passes ({} moves), cost {} -> {}",
            graph.len(),
            report.passes,
            report.moves,
            report.initial_cost,
            report.final_cost
        );
        report
    }

    /// Refines the current assignment without re-randomizing it.
    pub fn refine(&mut self, graph: &mut Graph) -> OptimizeReport {
        self.refine_with_cancel(graph, &CancelToken::new())
    }

    pub fn refine_with_cancel(&mut self, graph: &mut Graph, cancel: &CancelToken) -> OptimizeReport {
        if graph.is_empty() {
            return OptimizeReport {
                converged: true,
                ..OptimizeReport::default()
            };
        }
        let initial_cost = total_cost(graph);
        let mut cancelled = false;
        let mut passes = self.passes(graph);
        loop {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            if passes.next().is_none() {
                break;
            }
        }
        let summary = passes.summary();
        OptimizeReport {
            randomized: None,
            passes: summary.passes,
            moves: summary.moves,
            initial_cost,
            final_cost: total_cost(graph),
            converged: summary.converged,
            cancelled,
        }
    }

    /// Refinement as an iterator of passes, for callers that want to yield
    /// or stop between passes.
    pub fn passes<'a>(&'a mut self, graph: &'a mut Graph) -> Passes<'a, R> {
        let membership = Membership::of(graph);
        Passes {
            optimizer: self,
            graph,
            membership,
            summary: PassSummary::default(),
        }
    }

    fn run_pass(&mut self, graph: &mut Graph, membership: &mut Membership) -> usize {
        let mut order = graph.order().to_vec();
        order.shuffle(&mut self.rng);

        // Ids past the node count never win: a lower id is then empty and
        // costs zero.
        let node_count = u32::try_from(graph.len()).unwrap_or(u32::MAX);
        let scan_limit = self.limits.max_groups.min(node_count);

        let mut moves = 0;
        for node in order {
            let current = graph.node(node).group.clone();
            let mut best_cost = membership.cost(graph, node, &current);
            let mut best = None;
            for id in 1..=scan_limit {
                let candidate = GroupLabel::Group(id);
                if candidate == current || membership.count(&candidate) >= self.limits.group_size {
                    continue;
                }
                let candidate_cost = membership.cost(graph, node, &candidate);
                if candidate_cost < best_cost {
                    best_cost = candidate_cost;
                    best = Some(candidate);
                }
            }
            if let Some(target) = best {
                membership.relocate(node, &current, target.clone());
                graph.set_group(node, target);
                moves += 1;
            }
        }
        moves
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PassSummary {
    pub passes: usize,
    pub moves: usize,
    pub converged: bool,
}

pub struct Passes<'a, R> {
    optimizer: &'a mut Optimizer<R>,
    graph: &'a mut Graph,
    membership: Membership,
    summary: PassSummary,
}

impl<R> Passes<'_, R> {
    pub fn summary(&self) -> PassSummary {
        self.summary
    }

    pub fn graph(&self) -> &Graph {
        &*self.graph
    }
}

impl<R: Rng> Iterator for Passes<'_, R> {
    type Item = PassReport;

    fn next(&mut self) -> Option<PassReport> {
        if self.summary.converged || self.summary.passes >= self.optimizer.max_passes {
            return None;
        }
        let moves = self.optimizer.run_pass(self.graph, &mut self.membership);
        self.summary.passes += 1;
        self.summary.moves += moves;
        if moves == 0 {
            self.summary.converged = true;
        }
        let report = PassReport {
            pass: self.summary.passes,
            moves,
            total_cost: self.membership.total_cost(self.graph),
        };
        log::debug!(
            "pass {}: {} moves, total cost {}",
            report.pass,
            report.moves,
            report.total_cost
        );
        Some(report)
    }
}
