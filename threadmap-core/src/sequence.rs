//! Nucleotide helpers shared by the mapper and its callers

/// Reverse complement of a read. Bases other than ACGT are kept as-is.
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence
        .iter()
        .rev()
        .map(|&nucleotide| complement_nucleotide(nucleotide))
        .collect()
}

/// Complement of a single nucleotide
pub fn complement_nucleotide(nucleotide: u8) -> u8 {
    match nucleotide.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        _ => nucleotide,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"ATCGN"), b"NCGAT".to_vec());
        assert_eq!(reverse_complement(b"acgt"), b"ACGT".to_vec());
        assert!(reverse_complement(b"").is_empty());
    }
}
