use serde::{Deserialize, Serialize};

use crate::sequence::reverse_complement;

/// Identifier of a node in the reference graph.
pub type NodeId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

impl Strand {
    pub fn is_reverse(self) -> bool {
        matches!(self, Strand::Reverse)
    }

    pub fn flip(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// One edit of a mapping: `from_length` bases of the node against
/// `to_length` bases of the read. `sequence` carries the read bases for
/// substitutions and insertions and is empty for matches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Edit {
    pub from_length: u32,
    pub to_length: u32,
    #[serde(default)]
    pub sequence: Vec<u8>,
}

impl Edit {
    pub fn matched(length: u32) -> Self {
        Self {
            from_length: length,
            to_length: length,
            sequence: Vec::new(),
        }
    }

    pub fn insertion(bases: &[u8]) -> Self {
        Self {
            from_length: 0,
            to_length: bases.len() as u32,
            sequence: bases.to_vec(),
        }
    }

    /// Consumes read bases without consuming reference bases.
    pub fn is_unaligned_overhang(&self) -> bool {
        self.from_length == 0 && self.to_length > 0
    }
}

/// Placement of a read segment on a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub node_id: NodeId,
    /// Offset of the first aligned base within the node.
    pub offset: u32,
    pub edits: Vec<Edit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Path {
    pub mappings: Vec<Mapping>,
}

impl Path {
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn first_node(&self) -> Option<NodeId> {
        self.mappings.first().map(|m| m.node_id)
    }

    pub fn last_node(&self) -> Option<NodeId> {
        self.mappings.last().map(|m| m.node_id)
    }

    /// Length of the unaligned read prefix, if the path starts with one.
    pub fn softclip_start(&self) -> usize {
        self.mappings
            .first()
            .and_then(|m| m.edits.first())
            .filter(|e| e.is_unaligned_overhang())
            .map_or(0, |e| e.to_length as usize)
    }

    /// Length of the unaligned read suffix, if the path ends with one.
    pub fn softclip_end(&self) -> usize {
        self.mappings
            .last()
            .and_then(|m| m.edits.last())
            .filter(|e| e.is_unaligned_overhang())
            .map_or(0, |e| e.to_length as usize)
    }
}

/// What the graph aligner produces for one sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphAlignment {
    pub path: Path,
    pub score: i32,
}

/// Result state of an alignment. A mapped alignment keeps its score even
/// when that score is zero; only `Unmapped` denotes a miss.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignmentOutcome {
    #[default]
    Unmapped,
    Mapped(GraphAlignment),
}

impl From<Option<GraphAlignment>> for AlignmentOutcome {
    fn from(result: Option<GraphAlignment>) -> Self {
        result.map_or(AlignmentOutcome::Unmapped, AlignmentOutcome::Mapped)
    }
}

/// A read together with its current mapping state and pair linkage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Alignment {
    pub name: String,
    pub sequence: Vec<u8>,
    pub strand: Strand,
    pub outcome: AlignmentOutcome,
    pub fragment_prev: Option<String>,
    pub fragment_next: Option<String>,
}

impl Alignment {
    pub fn new(name: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            ..Default::default()
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.outcome, AlignmentOutcome::Mapped(_))
    }

    pub fn is_reverse(&self) -> bool {
        self.strand.is_reverse()
    }

    /// Score of the mapped alignment, or `None` when unmapped.
    pub fn mapped_score(&self) -> Option<i32> {
        match &self.outcome {
            AlignmentOutcome::Mapped(hit) => Some(hit.score),
            AlignmentOutcome::Unmapped => None,
        }
    }

    /// Score for reporting; unmapped alignments report zero.
    pub fn score(&self) -> i32 {
        self.mapped_score().unwrap_or(0)
    }

    pub fn score_per_bp(&self) -> f64 {
        if self.sequence.is_empty() {
            return 0.0;
        }
        f64::from(self.score()) / self.sequence.len() as f64
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.outcome {
            AlignmentOutcome::Mapped(hit) => Some(&hit.path),
            AlignmentOutcome::Unmapped => None,
        }
    }

    pub fn clear_outcome(&mut self) {
        self.outcome = AlignmentOutcome::Unmapped;
    }

    pub fn set_outcome(&mut self, result: Option<GraphAlignment>) {
        self.outcome = result.into();
    }

    pub fn softclip_start(&self) -> usize {
        self.path().map_or(0, Path::softclip_start)
    }

    pub fn softclip_end(&self) -> usize {
        self.path().map_or(0, Path::softclip_end)
    }

    /// The same read on the opposite strand, with no mapping.
    pub fn reverse_complemented(&self) -> Self {
        Self {
            name: self.name.clone(),
            sequence: reverse_complement(&self.sequence),
            strand: self.strand.flip(),
            outcome: AlignmentOutcome::Unmapped,
            fragment_prev: self.fragment_prev.clone(),
            fragment_next: self.fragment_next.clone(),
        }
    }
}
