//! Strand orientation correction
//!
//! Personal exports report alleles on the plus strand. SNPedia stabilizes some variants
//! on the minus strand, so those genotypes must be complemented before they can be
//! compared with the reference rows.

use crate::model::{Genotype, Orientation};

/// Complements one nucleotide; any other symbol is returned unchanged
pub fn complement(allele: char) -> char {
    match allele {
        'A' => 'T',
        'T' => 'A',
        'C' => 'G',
        'G' => 'C',
        other => other,
    }
}

/// Brings `genotype` onto the strand the reference uses
///
/// Returns the corrected genotype and whether it was flipped. Only a called genotype
/// against a `minus` reference is flipped.
///
/// # Example
///
/// ```
/// use osgenome::{normalize, Genotype, Orientation};
///
/// let (corrected, flipped) = normalize(Genotype::Called('A', 'G'), Orientation::Minus);
/// assert_eq!(corrected, Genotype::Called('T', 'C'));
/// assert!(flipped);
/// ```
pub fn normalize(genotype: Genotype, orientation: Orientation) -> (Genotype, bool) {
    match (genotype, orientation) {
        (Genotype::Called(a, b), Orientation::Minus) => {
            (Genotype::Called(complement(a), complement(b)), true)
        }
        _ => (genotype, false),
    }
}
