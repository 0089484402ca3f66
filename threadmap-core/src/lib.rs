//! threadmap core library
//!
//! Seed-and-extend mapping of short reads onto a reference graph: seeding,
//! seed filtering, threading, candidate subgraph extraction, strand
//! selection with sensitivity escalation, soft-clip driven re-extraction
//! and mate rescue. The k-mer index and the graph aligner are supplied by
//! the caller through the traits in [`graph`].

pub mod config;
pub mod error;
pub mod graph;
pub mod mapper;
pub mod seed;
pub mod sequence;
pub mod subgraph;
pub mod thread;
pub mod types;

// Re-export commonly used types and functions
pub use config::MapperConfig;
pub use error::{MapError, MapResult};
pub use graph::{AlignableGraph, KmerIndex, Occurrences};
pub use mapper::{MapReport, Mapper};
pub use seed::{balanced_kmers, balanced_stride, initial_stride, Seed};
pub use subgraph::NodeRange;
pub use thread::{Thread, ThreadSet};
pub use types::{Alignment, AlignmentOutcome, Edit, GraphAlignment, Mapping, NodeId, Path, Strand};

/// Version information for the threadmap core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
