//! Threading module
//!
//! Chains seed occurrences into threads: runs of node ids whose in-node
//! offsets advance by one stride per seed, the way the hits of a colinear
//! alignment do. Threads separated by a small node-id gap are then merged,
//! which reconnects chains broken where seeds were filtered out or an indel
//! shifted the expected offset.
//!
//! Every container here is ordered, so the result depends only on the
//! occurrences and their seed order.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound::{Excluded, Included};

use crate::graph::Occurrences;
use crate::types::NodeId;

/// Parameters for thread construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadParams {
    /// Offset step between consecutive seeds
    pub stride: usize,
    /// How far an offset may deviate from the expected step
    pub position_wobble: u32,
    /// Node-id gap across which threads are merged
    pub max_thread_gap: u32,
}

/// An ordered chain of node ids backed by consecutive seed hits.
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Thread {
    nodes: Vec<NodeId>,
}

impl Thread {
    pub fn new(id: NodeId) -> Self {
        Self { nodes: vec![id] }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn first(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn last(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Smallest and largest node id on the thread.
    pub fn extremes(&self) -> (NodeId, NodeId) {
        let min = self.nodes.iter().copied().min().unwrap_or_else(|| self.first());
        let max = self.nodes.iter().copied().max().unwrap_or_else(|| self.last());
        (min, max)
    }

    fn push(&mut self, id: NodeId) {
        self.nodes.push(id);
    }

    fn followed_by(mut self, next: Thread) -> Thread {
        self.nodes.extend(next.nodes);
        self
    }
}

impl TryFrom<Vec<NodeId>> for Thread {
    type Error = Vec<NodeId>;

    /// Fails on an empty node list.
    fn try_from(nodes: Vec<NodeId>) -> Result<Self, Self::Error> {
        if nodes.is_empty() {
            Err(nodes)
        } else {
            Ok(Self { nodes })
        }
    }
}

/// Accumulates seed hits, in seed order, into open threads.
#[derive(Debug)]
pub struct ThreadBuilder {
    params: ThreadParams,
    /// Open threads by their last hit, with the seed that placed it
    open: BTreeMap<(NodeId, i64), (usize, Thread)>,
    node_seeds: BTreeMap<NodeId, Vec<usize>>,
}

impl ThreadBuilder {
    pub fn new(params: ThreadParams) -> Self {
        Self {
            params,
            open: BTreeMap::new(),
            node_seeds: BTreeMap::new(),
        }
    }

    /// Add the occurrences of seed `seed_index`. Seeds must be added in
    /// increasing seed order. A thread never takes two hits from one seed.
    pub fn add_seed_hits(&mut self, seed_index: usize, occurrences: &Occurrences) {
        for (&id, offsets) in occurrences {
            self.node_seeds.entry(id).or_default().push(seed_index);
            for &offset in offsets {
                let offset = i64::from(offset);
                let thread = match self.take_predecessor(seed_index, id, offset) {
                    Some(mut thread) => {
                        thread.push(id);
                        thread
                    }
                    None => Thread::new(id),
                };
                // a repeated hit on an occupied slot keeps the longer thread
                match self.open.entry((id, offset)) {
                    Entry::Vacant(slot) => {
                        slot.insert((seed_index, thread));
                    }
                    Entry::Occupied(mut slot) => {
                        if thread.len() >= slot.get().1.len() {
                            slot.insert((seed_index, thread));
                        }
                    }
                }
            }
        }
    }

    /// Open thread ending at `(id, offset - stride + m)` for the nearest
    /// `m` in `0, 1, -1, 2, -2, ...` within the wobble radius, placed by an
    /// earlier seed than `seed_index`.
    fn take_predecessor(&mut self, seed_index: usize, id: NodeId, offset: i64) -> Option<Thread> {
        let expected = offset - self.params.stride as i64;
        let wobble = i64::from(self.params.position_wobble);
        let candidates = std::iter::once(0).chain((1..=wobble).flat_map(|m| [m, -m]));
        for m in candidates {
            let key = (id, expected + m);
            if matches!(self.open.get(&key), Some((placed_by, _)) if *placed_by < seed_index) {
                return self.open.remove(&key).map(|(_, thread)| thread);
            }
        }
        None
    }

    /// Collect the distinct open threads and merge nearby ones.
    pub fn finish(self) -> ThreadSet {
        let distinct: BTreeSet<Thread> = self.open.into_values().map(|(_, thread)| thread).collect();
        let merged = merge_threads(distinct, self.params.max_thread_gap);

        let mut by_length: BTreeMap<usize, Vec<Thread>> = BTreeMap::new();
        for thread in merged {
            by_length.entry(thread.len()).or_default().push(thread);
        }

        ThreadSet {
            by_length,
            node_seeds: self.node_seeds,
        }
    }
}

/// Merge threads whose head lies within `max_gap` node ids after another
/// thread's tail.
///
/// Threads are visited in ascending order. Candidate predecessors are the
/// already placed threads whose last node id is in `(first - max_gap, first]`;
/// the longest wins, then the one ending nearest, then the one placed first.
/// Threads ending on the same node id are all kept.
pub fn merge_threads(threads: BTreeSet<Thread>, max_gap: u32) -> Vec<Thread> {
    let mut by_last: BTreeMap<NodeId, Vec<Thread>> = BTreeMap::new();

    for thread in threads {
        let front = thread.first();
        let lower = front.saturating_sub(i64::from(max_gap));

        // (length, last node id, position in bucket)
        let mut best: Option<(usize, NodeId, usize)> = None;
        for (&last, bucket) in by_last.range((Excluded(lower), Included(front))) {
            for (i, candidate) in bucket.iter().enumerate() {
                let better = match best {
                    None => true,
                    Some((len, best_last, _)) => {
                        candidate.len() > len || (candidate.len() == len && last > best_last)
                    }
                };
                if better {
                    best = Some((candidate.len(), last, i));
                }
            }
        }

        let placed = match best {
            Some((_, last, i)) => {
                let predecessor = by_last.get_mut(&last).map(|bucket| bucket.remove(i));
                if by_last.get(&last).is_some_and(Vec::is_empty) {
                    by_last.remove(&last);
                }
                match predecessor {
                    Some(predecessor) => predecessor.followed_by(thread),
                    None => thread,
                }
            }
            None => thread,
        };
        by_last.entry(placed.last()).or_default().push(placed);
    }

    by_last.into_values().flatten().collect()
}

/// Threads grouped by length, plus which seeds hit each node.
#[derive(Debug, Clone, Default)]
pub struct ThreadSet {
    by_length: BTreeMap<usize, Vec<Thread>>,
    node_seeds: BTreeMap<NodeId, Vec<usize>>,
}

impl ThreadSet {
    pub fn is_empty(&self) -> bool {
        self.by_length.is_empty()
    }

    /// Number of threads
    pub fn len(&self) -> usize {
        self.by_length.values().map(Vec::len).sum()
    }

    /// Length groups, longest first.
    pub fn by_decreasing_length(&self) -> impl Iterator<Item = (usize, &[Thread])> + '_ {
        self.by_length
            .iter()
            .rev()
            .map(|(&len, threads)| (len, threads.as_slice()))
    }

    /// Threads from the `best_clusters` longest length groups, longest
    /// first. Zero means every group.
    pub fn best(&self, best_clusters: usize) -> impl Iterator<Item = &Thread> + '_ {
        let groups = if best_clusters == 0 {
            usize::MAX
        } else {
            best_clusters
        };
        self.by_decreasing_length()
            .take(groups)
            .flat_map(|(_, threads)| threads.iter())
    }

    /// Seed indices that had an occurrence on node `id`.
    pub fn seeds_for_node(&self, id: NodeId) -> &[usize] {
        self.node_seeds.get(&id).map_or(&[], Vec::as_slice)
    }
}
