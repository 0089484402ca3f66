//! Candidate region extraction
//!
//! Turns threads into node-id ranges and pulls those ranges out of the
//! index into a working subgraph owned by the caller.

use anyhow::Result;

use crate::graph::{AlignableGraph, KmerIndex};
use crate::thread::{Thread, ThreadSet};
use crate::types::{NodeId, Path};

/// Inclusive node-id interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRange {
    pub first: NodeId,
    pub last: NodeId,
}

impl NodeRange {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        Self {
            first: a.min(b),
            last: a.max(b),
        }
    }

    pub fn of_thread(thread: &Thread) -> Self {
        let (first, last) = thread.extremes();
        Self { first, last }
    }

    /// Range between the first and last node an alignment path visits.
    pub fn of_path(path: &Path) -> Option<Self> {
        Some(Self::new(path.first_node()?, path.last_node()?))
    }

    /// Grow by `left` and `right` node ids; node ids never go below zero.
    pub fn widened(self, left: NodeId, right: NodeId) -> Self {
        Self {
            first: self.first.saturating_sub(left).max(0),
            last: self.last.saturating_add(right),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        (self.first..=self.last).contains(&id)
    }
}

/// Ranges of the threads in the `best_clusters` longest length groups.
pub fn thread_ranges(threads: &ThreadSet, best_clusters: usize) -> Vec<NodeRange> {
    threads.best(best_clusters).map(NodeRange::of_thread).collect()
}

/// Range to re-extract around `path` when it has soft clips: each clipped
/// side moves outward by `extension` node ids.
pub fn softclip_range(path: &Path, extension: NodeId) -> Option<NodeRange> {
    let range = NodeRange::of_path(path)?;
    let left = if path.softclip_start() > 0 { extension } else { 0 };
    let right = if path.softclip_end() > 0 { extension } else { 0 };
    Some(range.widened(left, right))
}

/// Union of `ranges` pulled from `index`, with dangling edges removed.
pub fn extract_ranges<I, R>(index: &I, ranges: R) -> Result<I::Graph>
where
    I: KmerIndex + ?Sized,
    R: IntoIterator<Item = NodeRange>,
{
    let mut graph = I::Graph::default();
    for range in ranges {
        log::trace!("getting node range {}-{}", range.first, range.last);
        index.get_range(range.first, range.last, &mut graph)?;
    }
    graph.remove_orphan_edges();
    Ok(graph)
}
