//! Paired-end mapping with mate rescue

use super::Mapper;
use crate::error::MapResult;
use crate::graph::{AlignableGraph, KmerIndex};
use crate::subgraph::{extract_ranges, NodeRange};
use crate::types::Alignment;

impl<'a, I: KmerIndex + ?Sized> Mapper<'a, I> {
    /// Map both mates independently, link them, and try to rescue a mate
    /// that did not map using its partner's location.
    ///
    /// Discordant pairs are returned as they are.
    pub fn align_paired(&self, read1: &Alignment, read2: &Alignment) -> MapResult<(Alignment, Alignment)> {
        let mut aln1 = self.align(read1)?;
        let mut aln2 = self.align(read2)?;

        aln1.fragment_next = Some(aln2.name.clone());
        aln2.fragment_prev = Some(aln1.name.clone());

        let pair_window = self.config.pairing.pair_window;
        match (aln1.is_mapped(), aln2.is_mapped()) {
            (false, true) => {
                self.align_mate_in_window(&aln2, &mut aln1, pair_window)?;
            }
            (true, false) => {
                self.align_mate_in_window(&aln1, &mut aln2, pair_window)?;
            }
            _ => {}
        }

        Ok((aln1, aln2))
    }

    /// Align `mate` directly against the region within `pair_window` node
    /// ids of where `anchor` mapped. The mate is first put on the anchor's
    /// strand. `mate` is only replaced when the rescue maps; returns whether
    /// it did.
    pub fn align_mate_in_window(&self, anchor: &Alignment, mate: &mut Alignment, pair_window: u32) -> MapResult<bool> {
        let Some(range) = anchor.path().and_then(NodeRange::of_path) else {
            return Ok(false);
        };
        let window = i64::from(pair_window);
        let range = range.widened(window, window);

        let mut candidate = if mate.strand == anchor.strand {
            mate.clone()
        } else {
            mate.reverse_complemented()
        };

        {
            let graph = extract_ranges(self.index, [range])?;
            candidate.set_outcome(graph.align(&candidate.sequence)?);
        }

        if !candidate.is_mapped() {
            log::debug!("mate rescue of {} failed in {}-{}", mate.name, range.first, range.last);
            return Ok(false);
        }
        log::debug!(
            "rescued {} with score {} in {}-{}",
            candidate.name,
            candidate.score(),
            range.first,
            range.last
        );
        *mate = candidate;
        Ok(true)
    }
}
