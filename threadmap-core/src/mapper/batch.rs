use rayon::prelude::*;

use super::Mapper;
use crate::error::MapResult;
use crate::graph::KmerIndex;
use crate::types::Alignment;

impl<'a, I: KmerIndex + Sync + ?Sized> Mapper<'a, I> {
    /// Map many reads in parallel. Results keep the input order; the first
    /// collaborator error aborts the batch.
    pub fn align_batch(&self, reads: &[Alignment]) -> MapResult<Vec<Alignment>> {
        log::debug!("mapping batch of {} reads", reads.len());
        reads.par_iter().map(|read| self.align(read)).collect()
    }

    /// Map read pairs in parallel.
    pub fn align_paired_batch(&self, pairs: &[(Alignment, Alignment)]) -> MapResult<Vec<(Alignment, Alignment)>> {
        log::debug!("mapping batch of {} pairs", pairs.len());
        pairs
            .par_iter()
            .map(|(read1, read2)| self.align_paired(read1, read2))
            .collect()
    }
}
