//! Reference annotation records as scraped from SNPedia

use serde::{Deserialize, Serialize};

/// Strand on which SNPedia stabilizes a variant's alleles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Orientation {
    Plus,
    Minus,
    /// The page carried no orientation marker
    Unknown,
    /// Stored before orientation was recorded at all
    Legacy,
}

impl Orientation {
    /// Label shown in the enriched dataset
    pub fn label(&self) -> &'static str {
        match self {
            Self::Plus => "plus",
            Self::Minus => "minus",
            Self::Unknown => "",
            Self::Legacy => "Old Data Format",
        }
    }

    /// Whether genotype matching against this record can be trusted
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Plus | Self::Minus)
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy)
    }

    fn legacy() -> Self {
        Self::Legacy
    }
}

impl From<String> for Orientation {
    fn from(value: String) -> Self {
        match value.trim() {
            "plus" => Self::Plus,
            "minus" => Self::Minus,
            _ => Self::Unknown,
        }
    }
}

impl From<Orientation> for String {
    fn from(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Plus => "plus".to_string(),
            Orientation::Minus => "minus".to_string(),
            Orientation::Unknown | Orientation::Legacy => String::new(),
        }
    }
}

/// One row of a variant's genotype table: genotype, summary, significance, ...
///
/// Stored as the plain list of cell texts so that extra columns survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariationRow {
    cells: Vec<String>,
}

impl VariationRow {
    /// Builds a row from raw cell texts, dropping blank cells
    ///
    /// Returns `None` when no cell has any text.
    pub fn from_cells<I, S>(cells: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cells: Vec<String> = cells
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if cells.is_empty() {
            None
        } else {
            Some(Self { cells })
        }
    }

    pub fn genotype(&self) -> Option<&str> {
        self.cells.first().map(String::as_str)
    }

    pub fn summary(&self) -> Option<&str> {
        self.cells.get(1).map(String::as_str)
    }

    pub fn significance(&self) -> Option<&str> {
        self.cells.get(2).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cells joined by single spaces
    pub fn to_text(&self) -> String {
        self.cells.join(" ")
    }
}

/// SNPedia annotation for one variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Identifier; the reference store keys records by it, so it is not serialized
    #[serde(skip)]
    pub rsid: String,

    #[serde(rename = "Description", default)]
    pub description: String,

    #[serde(rename = "Variations", default)]
    pub variations: Vec<VariationRow>,

    #[serde(
        rename = "StabilizedOrientation",
        default = "Orientation::legacy",
        skip_serializing_if = "Orientation::is_legacy"
    )]
    pub orientation: Orientation,
}

impl AnnotationRecord {
    pub fn new(
        rsid: &str,
        description: impl Into<String>,
        variations: Vec<VariationRow>,
        orientation: Orientation,
    ) -> Self {
        Self {
            rsid: super::canonical_rsid(rsid),
            description: description.into(),
            variations,
            orientation,
        }
    }
}
