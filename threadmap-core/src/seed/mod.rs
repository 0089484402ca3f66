//! Seed generation
//!
//! Reads are cut into fixed-length k-mers at a stride chosen so that the
//! seeds spread evenly over the whole read instead of leaving a ragged
//! uncovered tail.

pub mod locate;

pub use locate::{locate_seeds, SeedFilter, SeedHits};

/// A k-mer taken from a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed<'a> {
    /// Position of this seed in the seed sequence
    pub index: usize,
    /// Start of the k-mer in the read
    pub offset: usize,
    pub kmer: &'a [u8],
}

/// Stride that barely covers a read of `read_length` with `kmer_size`-mers.
pub fn initial_stride(read_length: usize, kmer_size: usize) -> usize {
    if read_length == 0 || kmer_size == 0 {
        return kmer_size.max(1);
    }
    let tiles = read_length.div_ceil(kmer_size);
    (read_length / tiles).max(1)
}

/// Closest stride to `stride` that spaces seeds evenly between the start
/// of the read and the last full k-mer.
pub fn balanced_stride(read_length: usize, kmer_size: usize, stride: usize) -> usize {
    let r = read_length as f64;
    let k = kmer_size as f64;
    let j = stride as f64;
    if stride > 0 && r > j {
        let tiles = ((r - k) / j).round();
        if tiles >= 1.0 {
            return (((r - k) / tiles).round() as usize).max(1);
        }
    }
    stride.max(1)
}

/// Iterator over the balanced seeds of a read.
///
/// Cloning restarts nothing and shares nothing; each clone walks the read
/// independently from its current position.
#[derive(Debug, Clone)]
pub struct SeedIter<'a> {
    read: &'a [u8],
    kmer_size: usize,
    stride: usize,
    offset: usize,
    index: usize,
}

impl<'a> SeedIter<'a> {
    /// Spacing actually used between consecutive seeds.
    pub fn stride(&self) -> usize {
        self.stride
    }
}

impl<'a> Iterator for SeedIter<'a> {
    type Item = Seed<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.kmer_size == 0 || self.offset + self.kmer_size >= self.read.len() {
            return None;
        }
        let seed = Seed {
            index: self.index,
            offset: self.offset,
            kmer: &self.read[self.offset..self.offset + self.kmer_size],
        };
        self.offset += self.stride;
        self.index += 1;
        Some(seed)
    }
}

/// Seeds of `read` with the balanced version of `stride`. A `stride` of 0
/// uses [`initial_stride`]. Reads no longer than `kmer_size` yield nothing.
pub fn balanced_kmers(read: &[u8], kmer_size: usize, stride: usize) -> SeedIter<'_> {
    let requested = if stride == 0 {
        initial_stride(read.len(), kmer_size)
    } else {
        stride
    };
    SeedIter {
        read,
        kmer_size,
        stride: balanced_stride(read.len(), kmer_size, requested),
        offset: 0,
        index: 0,
    }
}
