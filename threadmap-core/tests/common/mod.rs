//! In-memory fixtures: a linear reference cut into fixed-length nodes and
//! an aligner that places the longest exact run of the read, soft clipping
//! the rest. Runs shorter than [`MIN_RUN`] do not align.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use threadmap_core::{AlignableGraph, Edit, GraphAlignment, KmerIndex, Mapping, NodeId, Occurrences, Path};

/// Shorter exact runs are treated as chance matches.
pub const MIN_RUN: usize = 12;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic pseudo-random nucleotides (xorshift64).
pub fn random_sequence(length: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    (0..length)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            b"ACGT"[(state >> 33) as usize % 4]
        })
        .collect()
}

/// A base guaranteed to differ from `base`.
pub fn substitute(base: u8) -> u8 {
    match base {
        b'A' => b'C',
        b'C' => b'G',
        b'G' => b'T',
        _ => b'A',
    }
}

pub struct LinearIndex {
    name: String,
    reference: Vec<u8>,
    node_length: usize,
    kmer_sizes: Vec<usize>,
    masked: Vec<Range<usize>>,
    queries: AtomicUsize,
    ranges: Mutex<Vec<(NodeId, NodeId)>>,
}

impl LinearIndex {
    /// Nodes are numbered from 1 and hold `node_length` bases each.
    pub fn new(reference: &[u8], node_length: usize) -> Self {
        Self {
            name: "linear-test-index".to_string(),
            reference: reference.to_vec(),
            node_length,
            kmer_sizes: vec![18],
            masked: Vec::new(),
            queries: AtomicUsize::new(0),
            ranges: Mutex::new(Vec::new()),
        }
    }

    pub fn with_kmer_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.kmer_sizes = sizes;
        self
    }

    /// K-mers occurring at a start position inside `region` report an
    /// unbounded approximate count.
    pub fn mask_region(mut self, region: Range<usize>) -> Self {
        self.masked.push(region);
        self
    }

    pub fn node_count(&self) -> NodeId {
        self.reference.len().div_ceil(self.node_length) as NodeId
    }

    /// Number of seed queries answered so far.
    pub fn seed_queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Every range passed to `get_range`, in call order.
    pub fn requested_ranges(&self) -> Vec<(NodeId, NodeId)> {
        self.ranges.lock().unwrap().clone()
    }

    fn node_sequence(&self, id: NodeId) -> Vec<u8> {
        let start = (id as usize - 1) * self.node_length;
        let end = (start + self.node_length).min(self.reference.len());
        self.reference[start..end].to_vec()
    }

    fn matches(&self, kmer: &[u8]) -> Vec<usize> {
        if kmer.is_empty() || kmer.len() > self.reference.len() {
            return Vec::new();
        }
        self.reference
            .windows(kmer.len())
            .enumerate()
            .filter(|(_, window)| *window == kmer)
            .map(|(pos, _)| pos)
            .collect()
    }

    fn add_node(&self, id: NodeId, graph: &mut LinearSubgraph) {
        if id < 1 || id > self.node_count() {
            return;
        }
        graph.nodes.entry(id).or_insert_with(|| self.node_sequence(id));
        if id > 1 {
            graph.edges.insert((id - 1, id));
        }
        if id < self.node_count() {
            graph.edges.insert((id, id + 1));
        }
    }
}

impl KmerIndex for LinearIndex {
    type Graph = LinearSubgraph;

    fn name(&self) -> &str {
        &self.name
    }

    fn kmer_sizes(&self) -> Vec<usize> {
        self.kmer_sizes.clone()
    }

    fn approx_kmer_matches(&self, kmer: &[u8]) -> Result<u64> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let masked = self
            .matches(kmer)
            .iter()
            .any(|pos| self.masked.iter().any(|region| region.contains(pos)));
        Ok(if masked { u64::MAX } else { 0 })
    }

    fn kmer_positions(&self, kmer: &[u8]) -> Result<Occurrences> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let mut occurrences = Occurrences::new();
        for pos in self.matches(kmer) {
            let id = (pos / self.node_length) as NodeId + 1;
            let offset = (pos % self.node_length) as i32;
            occurrences.entry(id).or_default().push(offset);
        }
        Ok(occurrences)
    }

    fn get_range(&self, first: NodeId, last: NodeId, graph: &mut LinearSubgraph) -> Result<()> {
        self.ranges.lock().unwrap().push((first, last));
        for id in first.max(1)..=last.min(self.node_count()) {
            self.add_node(id, graph);
        }
        Ok(())
    }

    fn expand_context(&self, graph: &mut LinearSubgraph, steps: usize) -> Result<()> {
        for _ in 0..steps {
            let ids: Vec<NodeId> = graph.nodes.keys().copied().collect();
            for id in ids {
                self.add_node(id - 1, graph);
                self.add_node(id + 1, graph);
            }
        }
        Ok(())
    }

    fn get_connected_nodes(&self, graph: &mut LinearSubgraph) -> Result<()> {
        let ids: Vec<NodeId> = graph.nodes.keys().copied().collect();
        for pair in ids.windows(2) {
            if pair[1] == pair[0] + 1 {
                graph.edges.insert((pair[0], pair[1]));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinearSubgraph {
    nodes: BTreeMap<NodeId, Vec<u8>>,
    edges: BTreeSet<(NodeId, NodeId)>,
}

impl LinearSubgraph {
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn has_orphan_edges(&self) -> bool {
        self.edges
            .iter()
            .any(|(a, b)| !self.nodes.contains_key(a) || !self.nodes.contains_key(b))
    }

    /// Runs of consecutive node ids joined by edges.
    fn components(&self) -> Vec<Vec<NodeId>> {
        let mut components: Vec<Vec<NodeId>> = Vec::new();
        for &id in self.nodes.keys() {
            let joined = components
                .last()
                .and_then(|c| c.last())
                .is_some_and(|&prev| prev + 1 == id && self.edges.contains(&(prev, id)));
            match components.last_mut() {
                Some(component) if joined => component.push(id),
                _ => components.push(vec![id]),
            }
        }
        components
    }

    fn align_component(&self, ids: &[NodeId], read: &[u8]) -> Option<GraphAlignment> {
        let mut concat = Vec::new();
        let mut starts = Vec::new();
        for id in ids {
            starts.push(concat.len());
            concat.extend_from_slice(&self.nodes[id]);
        }

        // longest exact run: (length, read start, reference start)
        let mut best = (0usize, 0usize, 0usize);
        for i in 0..read.len() {
            for j in 0..concat.len() {
                if i > 0 && j > 0 && same_base(read[i - 1], concat[j - 1]) {
                    continue;
                }
                let mut len = 0;
                while i + len < read.len() && j + len < concat.len() && same_base(read[i + len], concat[j + len]) {
                    len += 1;
                }
                if len > best.0 {
                    best = (len, i, j);
                }
            }
        }
        let (len, read_start, ref_start) = best;
        if len < MIN_RUN {
            return None;
        }

        let mut mappings = Vec::new();
        for (k, id) in ids.iter().enumerate() {
            let node_start = starts[k];
            let node_end = node_start + self.nodes[id].len();
            let from = ref_start.max(node_start);
            let to = (ref_start + len).min(node_end);
            if from < to {
                mappings.push(Mapping {
                    node_id: *id,
                    offset: (from - node_start) as u32,
                    edits: vec![Edit::matched((to - from) as u32)],
                });
            }
        }
        if read_start > 0 {
            mappings[0].edits.insert(0, Edit::insertion(&read[..read_start]));
        }
        if read_start + len < read.len() {
            let last = mappings.len() - 1;
            mappings[last].edits.push(Edit::insertion(&read[read_start + len..]));
        }

        Some(GraphAlignment {
            path: Path { mappings },
            score: len as i32,
        })
    }
}

fn same_base(a: u8, b: u8) -> bool {
    a != b'N' && a == b
}

impl AlignableGraph for LinearSubgraph {
    fn remove_orphan_edges(&mut self) {
        let nodes = &self.nodes;
        self.edges
            .retain(|(a, b)| nodes.contains_key(a) && nodes.contains_key(b));
    }

    fn align(&self, sequence: &[u8]) -> Result<Option<GraphAlignment>> {
        let mut best: Option<GraphAlignment> = None;
        for component in self.components() {
            if let Some(hit) = self.align_component(&component, sequence) {
                if best.as_ref().map_or(true, |b| hit.score > b.score) {
                    best = Some(hit);
                }
            }
        }
        Ok(best)
    }

    fn total_node_length(&self) -> u64 {
        self.nodes.values().map(|s| s.len() as u64).sum()
    }

    fn disjoint_subgraphs(&self) -> Vec<Self> {
        self.components()
            .into_iter()
            .map(|ids| {
                let nodes: BTreeMap<NodeId, Vec<u8>> =
                    ids.iter().map(|id| (*id, self.nodes[id].clone())).collect();
                let edges = self
                    .edges
                    .iter()
                    .filter(|(a, b)| nodes.contains_key(a) && nodes.contains_key(b))
                    .copied()
                    .collect();
                LinearSubgraph { nodes, edges }
            })
            .collect()
    }
}
