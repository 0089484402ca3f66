//! Threadless alignment: grow the graph around every informative seed hit
//! until it is large enough to hold the read.

use std::collections::{BTreeMap, BTreeSet};

use super::Mapper;
use crate::error::MapResult;
use crate::graph::{AlignableGraph, KmerIndex};
use crate::seed::{balanced_kmers, initial_stride};
use crate::types::{Alignment, NodeId};

impl<'a, I: KmerIndex + ?Sized> Mapper<'a, I> {
    /// Align `read` on its given strand without threading. Seeds with
    /// fewer than `hit_max` node hits contribute their nodes; the graph then
    /// grows by context expansion until its largest component spans twice
    /// the read length or the read length in rounds has been spent.
    pub fn align_simple(&self, read: &Alignment, kmer_size: usize, stride: usize) -> MapResult<Alignment> {
        let mut alignment = read.clone();
        alignment.clear_outcome();

        let sequence = &read.sequence;
        let kmer_size = self.resolve_kmer_size(kmer_size);
        let stride = if stride == 0 {
            initial_stride(sequence.len(), kmer_size)
        } else {
            stride
        };

        let mut kmer_nodes: BTreeMap<&[u8], BTreeSet<NodeId>> = BTreeMap::new();
        for seed in balanced_kmers(sequence, kmer_size, stride) {
            let positions = self.index.kmer_positions(seed.kmer)?;
            kmer_nodes.insert(seed.kmer, positions.into_keys().collect());
        }

        let mut graph = I::Graph::default();
        let hit_max = self.config.seeding.hit_max;
        for nodes in kmer_nodes.values().filter(|nodes| nodes.len() < hit_max) {
            for &id in nodes {
                self.index.get_range(id, id, &mut graph)?;
            }
        }
        if graph.total_node_length() == 0 {
            log::debug!("no informative seeds, failed alignment");
            return Ok(alignment);
        }

        let target = 2 * sequence.len() as u64;
        let step = self.config.extension.context_step;
        let mut largest = largest_component(&graph);
        let mut iter = 0;
        while largest < target && iter < sequence.len() {
            self.index.expand_context(&mut graph, step)?;
            self.index.get_connected_nodes(&mut graph)?;
            largest = largest_component(&graph);
            iter += 1;
        }
        log::debug!("simple subgraph of {} bp after {} expansions", largest, iter);

        self.index.get_connected_nodes(&mut graph)?;
        alignment.set_outcome(graph.align(sequence)?);
        Ok(alignment)
    }
}

fn largest_component<G: AlignableGraph>(graph: &G) -> u64 {
    graph
        .disjoint_subgraphs()
        .iter()
        .map(AlignableGraph::total_node_length)
        .max()
        .unwrap_or(0)
}
