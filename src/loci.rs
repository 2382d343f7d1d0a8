//! Registry of known reference loci.
//!
//! The loci file is a TSV file with header; the following columns are used, others are ignored:
//!
//! 1. `H37Rv gene` -- gene name (string)
//! 2. `H37Rv gene id` -- gene identifier (string)
//! 3. `type` -- feature type, e.g., `CDS` or `rRNA` (string)
//! 4. `start` -- 1-based start position (integer)
//! 5. `stop` -- 1-based inclusive stop position (integer)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::io::std::tsv_reader;

/// Feature type of coding loci.
pub const CODING_FEATURE_TYPE: &str = "CDS";

/// A registered reference gene feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locus {
    /// Gene name.
    #[serde(rename = "H37Rv gene")]
    pub gene_name: String,
    /// Gene identifier.
    #[serde(rename = "H37Rv gene id")]
    pub gene_id: String,
    /// Feature type.
    #[serde(rename = "type")]
    pub feature_type: String,
    /// 1-based start position.
    pub start: i32,
    /// 1-based inclusive stop position.
    pub stop: i32,
}

impl Locus {
    /// Whether `pos` lies within `[start, stop]`.
    pub fn contains(&self, pos: i32) -> bool {
        self.start <= pos && pos <= self.stop
    }

    /// Whether the locus is a coding feature.
    pub fn is_coding(&self) -> bool {
        self.feature_type == CODING_FEATURE_TYPE
    }
}

/// Loci in definition order.
///
/// Lookups scan in order so the first defined locus wins when loci overlap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LociRegistry {
    pub loci: Vec<Locus>,
}

impl LociRegistry {
    /// Construct from already loaded loci.
    pub fn new(loci: Vec<Locus>) -> Self {
        Self { loci }
    }

    /// Load `LociRegistry` from the given path.
    pub fn from_path<P>(path: P) -> Result<Self, crate::error::Error>
    where
        P: AsRef<Path>,
    {
        let mut rdr = tsv_reader(path, true)?;
        let mut loci = Vec::new();
        for result in rdr.deserialize() {
            let locus: Locus = result?;
            loci.push(locus);
        }
        Ok(Self { loci })
    }

    /// Return the first locus containing `pos`, if any.
    pub fn find(&self, pos: i32) -> Option<&Locus> {
        self.loci.iter().find(|locus| locus.contains(pos))
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }
}
