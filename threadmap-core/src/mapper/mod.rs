//! Read mapping driver
//!
//! A [`Mapper`] borrows a read-only [`KmerIndex`] and runs the
//! seed → thread → extract → align pipeline on both strands of a read,
//! shrinking the seed length when neither strand finds anything.

mod batch;
mod paired;
mod simple;

use std::time::Instant;

use crate::config::MapperConfig;
use crate::error::{MapError, MapResult};
use crate::graph::{AlignableGraph, KmerIndex};
use crate::seed::{balanced_kmers, initial_stride, locate_seeds, SeedFilter};
use crate::subgraph::{extract_ranges, softclip_range, thread_ranges};
use crate::thread::{ThreadBuilder, ThreadParams};
use crate::types::Alignment;

/// What happened while mapping one read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapReport {
    /// Seed-extend rounds run (each covers one or both strands)
    pub attempts: u32,
    /// Times the seed length was shrunk
    pub escalations: u32,
    /// Rounds in which the reverse strand was skipped
    pub reverse_skipped: u32,
    /// Widened re-alignments triggered by soft clips
    pub softclip_extensions: u32,
    /// Retained seed hits summed over attempts
    pub forward_hits: usize,
    pub reverse_hits: usize,
    /// Seed length and stride of the last round
    pub seed_length: usize,
    pub stride: usize,
}

/// Maps reads against a borrowed index.
pub struct Mapper<'a, I: KmerIndex + ?Sized> {
    index: &'a I,
    config: MapperConfig,
    default_kmer_size: usize,
}

impl<'a, I: KmerIndex + ?Sized> Mapper<'a, I> {
    /// Fails when the configuration is invalid or the index stores no
    /// seed lengths.
    pub fn new(index: &'a I, config: MapperConfig) -> MapResult<Self> {
        config.validate()?;
        let default_kmer_size = index
            .kmer_sizes()
            .first()
            .copied()
            .ok_or_else(|| MapError::NoKmerSizes {
                index: index.name().to_string(),
            })?;
        Ok(Self {
            index,
            config,
            default_kmer_size,
        })
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Map a bare sequence.
    pub fn align_sequence(&self, sequence: &[u8]) -> MapResult<Alignment> {
        self.align(&Alignment::new("", sequence))
    }

    /// Map a read with the configured seed length and stride.
    pub fn align(&self, read: &Alignment) -> MapResult<Alignment> {
        self.align_with(read, self.config.seeding.seed_length, self.config.seeding.stride)
    }

    /// Map a read with a pinned seed length and stride; 0 selects the
    /// default for either.
    pub fn align_with(&self, read: &Alignment, kmer_size: usize, stride: usize) -> MapResult<Alignment> {
        self.align_traced(read, kmer_size, stride)
            .map(|(alignment, _)| alignment)
    }

    /// Map a read and report the attempts it took.
    ///
    /// The returned alignment is the better of the two strands, forward on
    /// ties. When neither strand maps, the forward copy comes back
    /// unmapped.
    pub fn align_traced(
        &self,
        read: &Alignment,
        kmer_size: usize,
        stride: usize,
    ) -> MapResult<(Alignment, MapReport)> {
        let started = Instant::now();
        let read_length = read.sequence.len();
        let seeding = &self.config.seeding;

        let mut kmer_size = self.resolve_kmer_size(kmer_size);
        let mut stride = if stride == 0 {
            initial_stride(read_length, kmer_size)
        } else {
            stride
        };

        let mut forward = read.clone();
        forward.clear_outcome();
        let mut reverse = forward.reverse_complemented();
        let mut report = MapReport::default();

        log::trace!("aligning {}", String::from_utf8_lossy(&read.sequence));

        while !forward.is_mapped() && !reverse.is_mapped() && report.attempts < seeding.max_attempts {
            let round = Instant::now();
            report.forward_hits += self.align_threaded(&mut forward, kmer_size, stride, &mut report)?;
            log::debug!(
                "{:.6}\t{}\t{}",
                round.elapsed().as_secs_f64(),
                char::from(forward.strand),
                String::from_utf8_lossy(&forward.sequence)
            );

            if self.forward_is_good_enough(&forward) {
                report.reverse_skipped += 1;
            } else {
                let round = Instant::now();
                report.reverse_hits += self.align_threaded(&mut reverse, kmer_size, stride, &mut report)?;
                log::debug!(
                    "{:.6}\t{}\t{}",
                    round.elapsed().as_secs_f64(),
                    char::from(reverse.strand),
                    String::from_utf8_lossy(&reverse.sequence)
                );
            }

            report.attempts += 1;

            if forward.is_mapped() || reverse.is_mapped() || report.attempts >= seeding.max_attempts {
                break;
            }
            match self.shrink_kmer_size(kmer_size) {
                Some(smaller) => {
                    kmer_size = smaller;
                    stride = initial_stride(read_length, kmer_size);
                    report.escalations += 1;
                    log::debug!("realigning with {} {}", kmer_size, stride);
                }
                None => {
                    log::debug!("seed length {} cannot shrink further", kmer_size);
                    break;
                }
            }
        }

        report.seed_length = kmer_size;
        report.stride = stride;
        log::debug!(
            "{:.6}\tb\t{}",
            started.elapsed().as_secs_f64(),
            String::from_utf8_lossy(&read.sequence)
        );

        let best = match (forward.mapped_score(), reverse.mapped_score()) {
            (None, Some(_)) => reverse,
            (Some(f), Some(r)) if r > f => reverse,
            _ => forward,
        };
        Ok((best, report))
    }

    /// One seed-extend attempt on a single orientation. Replaces the
    /// alignment's outcome and returns the number of retained seed hits.
    fn align_threaded(
        &self,
        alignment: &mut Alignment,
        kmer_size: usize,
        stride: usize,
        report: &mut MapReport,
    ) -> MapResult<usize> {
        alignment.clear_outcome();

        let seeds = balanced_kmers(&alignment.sequence, kmer_size, stride);
        let params = ThreadParams {
            stride: seeds.stride(),
            position_wobble: self.config.threading.position_wobble,
            max_thread_gap: self.config.threading.max_thread_gap,
        };
        let hits = locate_seeds(self.index, seeds, self.seed_filter())?;
        log::debug!("kept kmer hits {}", hits.retained);

        let mut builder = ThreadBuilder::new(params);
        for (i, occurrences) in hits.occurrences.iter().enumerate() {
            builder.add_seed_hits(i, occurrences);
        }
        let threads = builder.finish();
        if threads.is_empty() {
            log::debug!("no threads, failed alignment");
            return Ok(hits.retained);
        }
        for (length, group) in threads.by_decreasing_length() {
            log::trace!("{} thread(s) of length {}", group.len(), length);
        }

        {
            let ranges = thread_ranges(&threads, self.config.threading.best_clusters);
            let graph = extract_ranges(self.index, ranges)?;
            alignment.set_outcome(graph.align(&alignment.sequence)?);
        }

        let clip_start = alignment.softclip_start();
        let clip_end = alignment.softclip_end();
        let threshold = self.config.extension.softclip_threshold;
        if clip_start > threshold || clip_end > threshold {
            log::debug!("softclip handling {} {}", clip_start, clip_end);
            let widened = alignment
                .path()
                .and_then(|path| softclip_range(path, self.config.extension.softclip_extension()));
            if let Some(range) = widened {
                let graph = extract_ranges(self.index, [range])?;
                alignment.set_outcome(graph.align(&alignment.sequence)?);
                report.softclip_extensions += 1;
                log::debug!(
                    "softclip after {} {}",
                    alignment.softclip_start(),
                    alignment.softclip_end()
                );
            }
        }

        if !alignment.is_mapped() {
            log::debug!("failed alignment");
        }
        Ok(hits.retained)
    }

    fn resolve_kmer_size(&self, kmer_size: usize) -> usize {
        if kmer_size == 0 {
            self.default_kmer_size
        } else {
            kmer_size
        }
    }

    fn shrink_kmer_size(&self, kmer_size: usize) -> Option<usize> {
        kmer_size
            .checked_sub(self.config.seeding.sensitivity_step)
            .filter(|&smaller| smaller >= self.config.seeding.min_seed_length)
    }

    fn forward_is_good_enough(&self, forward: &Alignment) -> bool {
        self.config.strand.prefer_forward
            && forward.is_mapped()
            && forward.score_per_bp() >= self.config.strand.target_score_per_bp
    }

    fn seed_filter(&self) -> SeedFilter {
        SeedFilter {
            hit_size_threshold: self.config.seeding.hit_size_threshold,
            hit_max: self.config.seeding.hit_max,
        }
    }
}
