//! Two-allele genotype calls

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading a genotype string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenotypeError {
    #[error("Malformed genotype '{0}': expected the form (X;Y)")]
    Malformed(String),

    #[error("Allele '{allele}' in '{genotype}' is not a single symbol")]
    InvalidAllele { genotype: String, allele: String },
}

/// A diploid genotype as reported for one variant
///
/// Serialized in the `(X;Y)` form used by the personal and enriched data files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Genotype {
    /// Both alleles were observed, in reported order
    Called(char, char),
    /// No call was made for this variant
    Unknown,
}

impl Genotype {
    /// Rendering used for a variant without a call
    pub const UNKNOWN_PLACEHOLDER: &'static str = "(-;-)";

    /// Builds a genotype from two allele symbols; a double dash is a no-call
    pub fn new(first: char, second: char) -> Self {
        if first == '-' && second == '-' {
            Self::Unknown
        } else {
            Self::Called(first, second)
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn alleles(&self) -> Option<(char, char)> {
        match *self {
            Self::Called(a, b) => Some((a, b)),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Called(a, b) => write!(f, "({};{})", a, b),
            Self::Unknown => f.write_str(Self::UNKNOWN_PLACEHOLDER),
        }
    }
}

impl FromStr for Genotype {
    type Err = GenotypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::Unknown);
        }

        let inner = trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| GenotypeError::Malformed(s.to_string()))?;

        let parts: Vec<&str> = inner.split(';').collect();
        if parts.len() != 2 {
            return Err(GenotypeError::Malformed(s.to_string()));
        }

        let first = single_symbol(parts[0], s)?;
        let second = single_symbol(parts[1], s)?;
        Ok(Self::new(first, second))
    }
}

fn single_symbol(allele: &str, genotype: &str) -> Result<char, GenotypeError> {
    let mut chars = allele.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(GenotypeError::InvalidAllele {
            genotype: genotype.to_string(),
            allele: allele.to_string(),
        }),
    }
}

impl TryFrom<String> for Genotype {
    type Error = GenotypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Genotype> for String {
    fn from(genotype: Genotype) -> Self {
        genotype.to_string()
    }
}

/// Canonical form of a variant identifier (trimmed, lower-case)
pub fn canonical_rsid(rsid: &str) -> String {
    rsid.trim().to_lowercase()
}

/// One personal genotype call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenotypeCall {
    pub rsid: String,
    pub genotype: Genotype,
}

impl GenotypeCall {
    pub fn new(rsid: &str, genotype: Genotype) -> Self {
        Self {
            rsid: canonical_rsid(rsid),
            genotype,
        }
    }

    pub fn has_genotype(&self) -> bool {
        !self.genotype.is_unknown()
    }
}
