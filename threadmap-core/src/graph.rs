//! Interfaces to the k-mer index and the graph aligner
//!
//! The mapper never builds or stores reference data itself. It asks a
//! [`KmerIndex`] for seed occurrences and node ranges, and hands the
//! resulting working subgraph, an [`AlignableGraph`], to the aligner.
//! Both are only ever borrowed immutably by the mapper; implementations
//! shared across threads must tolerate concurrent read-only queries.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::types::{GraphAlignment, NodeId};

/// In-node offsets of a seed's exact matches, keyed by node id.
pub type Occurrences = BTreeMap<NodeId, Vec<i32>>;

/// A working subgraph together with the graph aligner operating on it.
pub trait AlignableGraph: Default {
    /// Drop edges that reference nodes missing from this subgraph.
    fn remove_orphan_edges(&mut self);

    /// Align `sequence` against the subgraph. `None` means the aligner
    /// found no placement at all.
    fn align(&self, sequence: &[u8]) -> Result<Option<GraphAlignment>>;

    /// Sum of the sequence lengths of all nodes.
    fn total_node_length(&self) -> u64;

    /// Split into connected components.
    fn disjoint_subgraphs(&self) -> Vec<Self>
    where
        Self: Sized;
}

/// Read-only k-mer index over a reference graph.
pub trait KmerIndex {
    type Graph: AlignableGraph;

    /// Human readable identifier used in error messages.
    fn name(&self) -> &str;

    /// Seed lengths the index was built with, in preference order.
    fn kmer_sizes(&self) -> Vec<usize>;

    /// Cheap estimate of how many times `kmer` occurs.
    fn approx_kmer_matches(&self, kmer: &[u8]) -> Result<u64>;

    /// Exact occurrences of `kmer`.
    fn kmer_positions(&self, kmer: &[u8]) -> Result<Occurrences>;

    /// Add nodes `first..=last` and their edges to `graph`.
    fn get_range(&self, first: NodeId, last: NodeId, graph: &mut Self::Graph) -> Result<()>;

    /// Grow `graph` by `steps` edges in every direction.
    fn expand_context(&self, graph: &mut Self::Graph, steps: usize) -> Result<()>;

    /// Add the edges between nodes already present in `graph`.
    fn get_connected_nodes(&self, graph: &mut Self::Graph) -> Result<()>;
}
