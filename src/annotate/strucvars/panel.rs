//! Panel of genomic regions scanned for large deletions.
//!
//! The panel file is BED-like without header, lines starting with `#` are skipped.  Two layouts
//! are supported and distinguished by the last column:
//!
//! - `reference, start, stop, gene_id, gene_name, <number>` if the last column is numeric, these
//!   regions carry no strand convention;
//! - `reference, start, stop, gene_name, gene_id, strand` otherwise.

use std::path::Path;

use itertools::Itertools;
use parse_display::{Display, FromStr};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::common::io::std::tsv_reader;
use crate::error::Error;

/// Strand and region convention for projecting deletions into CDS coordinates.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StrandConvention {
    /// Coding sequence on the forward strand.
    Forward,
    /// Coding sequence on the reverse strand.
    Reverse,
    /// Promoter upstream of a forward strand gene.
    ForwardPromoter,
    /// Promoter upstream of a reverse strand gene.
    ReversePromoter,
}

/// A deletion projected into CDS and amino acid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdsProjection {
    pub cds_start: i32,
    pub cds_stop: i32,
    /// Amino acid coordinates, not available for promoters.
    pub aa_start: Option<i32>,
    pub aa_stop: Option<i32>,
}

impl StrandConvention {
    /// Project the deletion `[del_start, del_stop]` within `[region_start, region_stop]`.
    pub fn project(
        &self,
        region_start: i32,
        region_stop: i32,
        del_start: i32,
        del_stop: i32,
    ) -> CdsProjection {
        let (cds_start, cds_stop) = match self {
            StrandConvention::Forward => {
                ((del_start + 1) - region_start, (del_stop + 1) - region_start)
            }
            StrandConvention::Reverse => {
                ((region_stop + 1) - del_stop, (region_stop + 1) - del_start)
            }
            StrandConvention::ForwardPromoter => (del_stop - region_start, del_start - region_start),
            StrandConvention::ReversePromoter => (region_stop - del_start, region_stop - del_stop),
        };
        let (aa_start, aa_stop) = match self {
            StrandConvention::Forward | StrandConvention::Reverse => {
                (Some(cds_start / 3), Some(cds_stop / 3))
            }
            StrandConvention::ForwardPromoter | StrandConvention::ReversePromoter => (None, None),
        };
        CdsProjection {
            cds_start,
            cds_stop,
            aa_start,
            aa_stop,
        }
    }
}

/// A region of interest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Reference sequence name.
    pub reference: String,
    pub gene_name: String,
    pub gene_id: Option<String>,
    /// 1-based start position.
    pub start: i32,
    /// 1-based inclusive stop position.
    pub stop: i32,
    pub strand: Option<StrandConvention>,
}

/// Number of columns of a panel line.
const PANEL_COLUMNS: usize = 6;

impl Region {
    /// Whether `pos` lies within `[start, stop]`.
    pub fn contains(&self, pos: i32) -> bool {
        self.start <= pos && pos <= self.stop
    }

    /// Parse one panel line, which must have exactly six columns.
    pub fn from_record(record: &csv::StringRecord) -> Result<Self, Error> {
        if record.len() != PANEL_COLUMNS {
            return Err(Error::data_format("panel line", record.iter().join("\t")));
        }
        let last = &record[record.len() - 1];
        let numeric = !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit());

        let parse_pos = |value: &str| {
            value
                .parse::<i32>()
                .map_err(|_| Error::data_format("panel position", value))
        };
        let start = parse_pos(&record[1])?;
        let stop = parse_pos(&record[2])?;

        let (gene_name, gene_id, strand) = if numeric {
            (&record[4], &record[3], None)
        } else {
            let strand = record[5].parse::<StrandConvention>().ok();
            if strand.is_none() {
                tracing::debug!(
                    "unknown strand convention {:?} for {}, CDS coordinates will be NA",
                    &record[5],
                    &record[3]
                );
            }
            (&record[3], &record[4], strand)
        };

        Ok(Region {
            reference: record[0].to_string(),
            gene_name: gene_name.to_string(),
            gene_id: Some(gene_id.to_string()).filter(|id| !id.is_empty()),
            start,
            stop,
            strand,
        })
    }
}

/// Regions in panel order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionPanel {
    pub regions: Vec<Region>,
}

impl RegionPanel {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Load `RegionPanel` from the given path.
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let mut reader = tsv_reader(path, false)?;
        let mut regions = Vec::new();
        for result in reader.records() {
            regions.push(Region::from_record(&result?)?);
        }
        Ok(Self { regions })
    }

    /// All positions covered by any region, per reference.
    pub fn positions(&self) -> FxHashMap<&str, FxHashSet<i32>> {
        let mut result: FxHashMap<&str, FxHashSet<i32>> = FxHashMap::default();
        for region in &self.regions {
            result
                .entry(region.reference.as_str())
                .or_default()
                .extend(region.start..=region.stop);
        }
        result
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
