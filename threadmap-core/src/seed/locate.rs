//! Seed filtering and occurrence lookup

use anyhow::Result;

use super::Seed;
use crate::graph::{KmerIndex, Occurrences};

/// Frequency limits applied to every seed. The two checks are independent:
/// the estimate is consulted first so that very frequent seeds never have
/// their positions fetched, and the exact cap catches seeds the estimate
/// under-counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedFilter {
    /// Upper bound on the index's approximate match estimate
    pub hit_size_threshold: u64,
    /// Upper bound on the number of nodes an exact lookup may return
    pub hit_max: usize,
}

/// Occurrences of each seed, in seed order. Dropped seeds keep an empty
/// slot so that slot `i` always belongs to seed `i`.
#[derive(Debug, Clone, Default)]
pub struct SeedHits {
    pub occurrences: Vec<Occurrences>,
    /// Total number of retained (node, offset) hits
    pub retained: usize,
    /// Seeds dropped by the approximate estimate
    pub too_frequent: usize,
    /// Seeds whose exact lookup exceeded the cap
    pub over_cap: usize,
}

impl SeedHits {
    pub fn is_empty(&self) -> bool {
        self.retained == 0
    }
}

pub fn locate_seeds<'a, I, S>(index: &I, seeds: S, filter: SeedFilter) -> Result<SeedHits>
where
    I: KmerIndex + ?Sized,
    S: IntoIterator<Item = Seed<'a>>,
{
    let mut hits = SeedHits::default();

    for seed in seeds {
        let approx_matches = index.approx_kmer_matches(seed.kmer)?;
        log::trace!(
            "{}\t{}",
            String::from_utf8_lossy(seed.kmer),
            approx_matches
        );
        if approx_matches > filter.hit_size_threshold {
            hits.too_frequent += 1;
            hits.occurrences.push(Occurrences::new());
            continue;
        }

        let mut positions = index.kmer_positions(seed.kmer)?;
        if positions.len() > filter.hit_max {
            hits.over_cap += 1;
            positions.clear();
        }
        hits.retained += positions.values().map(Vec::len).sum::<usize>();
        hits.occurrences.push(positions);
    }

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AlignableGraph;
    use crate::seed::balanced_kmers;
    use crate::types::{GraphAlignment, NodeId};
    use std::cell::Cell;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct NoGraph;

    impl AlignableGraph for NoGraph {
        fn remove_orphan_edges(&mut self) {}
        fn align(&self, _sequence: &[u8]) -> Result<Option<GraphAlignment>> {
            Ok(None)
        }
        fn total_node_length(&self) -> u64 {
            0
        }
        fn disjoint_subgraphs(&self) -> Vec<Self> {
            Vec::new()
        }
    }

    /// Answers from fixed tables keyed by k-mer.
    struct TableIndex {
        approx: BTreeMap<Vec<u8>, u64>,
        exact: BTreeMap<Vec<u8>, Occurrences>,
        position_queries: Cell<usize>,
    }

    impl KmerIndex for TableIndex {
        type Graph = NoGraph;

        fn name(&self) -> &str {
            "table"
        }
        fn kmer_sizes(&self) -> Vec<usize> {
            vec![4]
        }
        fn approx_kmer_matches(&self, kmer: &[u8]) -> Result<u64> {
            Ok(self.approx.get(kmer).copied().unwrap_or(0))
        }
        fn kmer_positions(&self, kmer: &[u8]) -> Result<Occurrences> {
            self.position_queries.set(self.position_queries.get() + 1);
            Ok(self.exact.get(kmer).cloned().unwrap_or_default())
        }
        fn get_range(&self, _first: NodeId, _last: NodeId, _graph: &mut NoGraph) -> Result<()> {
            Ok(())
        }
        fn expand_context(&self, _graph: &mut NoGraph, _steps: usize) -> Result<()> {
            Ok(())
        }
        fn get_connected_nodes(&self, _graph: &mut NoGraph) -> Result<()> {
            Ok(())
        }
    }

    fn occurrences(entries: &[(NodeId, i32)]) -> Occurrences {
        let mut occ = Occurrences::new();
        for &(id, offset) in entries {
            occ.entry(id).or_default().push(offset);
        }
        occ
    }

    #[test]
    fn test_filters_are_independent() {
        // seeds: AAAA, CCCC, GGGG (k = 4, stride 4)
        let read = b"AAAACCCCGGGGTTTT";
        let index = TableIndex {
            approx: BTreeMap::from([(b"AAAA".to_vec(), 5)]),
            exact: BTreeMap::from([
                (b"AAAA".to_vec(), occurrences(&[(1, 0)])),
                (b"CCCC".to_vec(), occurrences(&[(1, 4), (2, 0), (3, 0)])),
                (b"GGGG".to_vec(), occurrences(&[(2, 4), (2, 9)])),
            ]),
            position_queries: Cell::new(0),
        };
        let filter = SeedFilter { hit_size_threshold: 1, hit_max: 2 };

        let hits = locate_seeds(&index, balanced_kmers(read, 4, 4), filter).unwrap();

        assert_eq!(hits.occurrences.len(), 3);
        // AAAA dropped by the estimate without a position lookup
        assert!(hits.occurrences[0].is_empty());
        assert_eq!(index.position_queries.get(), 2);
        assert_eq!(hits.too_frequent, 1);
        // CCCC passes the estimate but hits three nodes
        assert!(hits.occurrences[1].is_empty());
        assert_eq!(hits.over_cap, 1);
        // GGGG kept with both offsets
        assert_eq!(hits.occurrences[2], occurrences(&[(2, 4), (2, 9)]));
        assert_eq!(hits.retained, 2);
    }

    #[test]
    fn test_no_seeds_no_queries() {
        let index = TableIndex {
            approx: BTreeMap::new(),
            exact: BTreeMap::new(),
            position_queries: Cell::new(0),
        };
        let filter = SeedFilter { hit_size_threshold: 0, hit_max: 100 };
        let hits = locate_seeds(&index, balanced_kmers(b"ACG", 4, 0), filter).unwrap();
        assert!(hits.is_empty());
        assert!(hits.occurrences.is_empty());
        assert_eq!(index.position_queries.get(), 0);
    }
}
