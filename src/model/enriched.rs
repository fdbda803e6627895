//! Records of the enriched dataset

use serde::{Deserialize, Serialize};

/// A personal genotype merged with its SNPedia annotation
///
/// Field names and the `"Yes"`/`"No"` flags follow the dataset file layout consumed by
/// the web front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(rename = "Name")]
    pub rsid: String,

    #[serde(rename = "Description", default)]
    pub description: String,

    /// Personal genotype, followed by the corrected genotype when it was flipped
    #[serde(rename = "Genotype")]
    pub genotype: String,

    /// Variation rows joined by `<br>`, the carried genotype's row in bold
    #[serde(rename = "Variations", default)]
    pub variations: String,

    #[serde(rename = "StabilizedOrientation", default)]
    pub orientation: String,

    #[serde(rename = "IsInteresting", with = "yes_no", default)]
    pub is_interesting: bool,

    #[serde(rename = "IsUncommon", with = "yes_no", default)]
    pub is_uncommon: bool,
}

impl EnrichedRecord {
    pub fn is_flipped(&self) -> bool {
        self.genotype.to_lowercase().contains("flipped")
    }

    /// The individual formatted variation rows
    pub fn variation_rows(&self) -> Vec<&str> {
        if self.variations.is_empty() {
            Vec::new()
        } else {
            self.variations.split("<br>").collect()
        }
    }
}

mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Yes" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(text.eq_ignore_ascii_case("yes"))
    }
}
