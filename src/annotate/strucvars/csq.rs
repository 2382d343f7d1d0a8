//! Detection of large deletions from per-position coverage.

use parse_display::Display;

use super::coverage::CoverageProvider;
use super::panel::{CdsProjection, Region};
use crate::common::na;

/// Coverage status of a region that needs no per-base scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CoverageStatus {
    #[display("No large deletion")]
    NoLargeDeletion,
    #[display("Complete deletion")]
    CompleteDeletion,
}

/// A deleted interval within a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub gene: String,
    /// `ref_stop - ref_start`, kept for compatibility with existing reports.
    pub sv_length: i32,
    pub ref_start: i32,
    pub ref_stop: i32,
    /// `None` for regions without strand convention.
    pub projection: Option<CdsProjection>,
}

/// Outcome of the deletion detection for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionFinding {
    /// The region was classified from its summary statistics alone.
    Status {
        gene: String,
        status: CoverageStatus,
    },
    /// The outer envelope of the uncovered positions.
    Deletion(Deletion),
}

/// One row of the deletion report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FindingRow {
    #[serde(rename = "Sample ID")]
    pub sample_id: String,
    #[serde(rename = "Gene")]
    pub gene: String,
    #[serde(rename = "SV Length", with = "na")]
    pub sv_length: Option<i32>,
    /// Start position or status text.
    #[serde(rename = "Ref Start")]
    pub ref_start: String,
    /// Stop position or status text.
    #[serde(rename = "Ref Stop")]
    pub ref_stop: String,
    #[serde(rename = "CDS Start", with = "na")]
    pub cds_start: Option<i32>,
    #[serde(rename = "CDS Stop", with = "na")]
    pub cds_stop: Option<i32>,
    #[serde(rename = "Amino Acid Start", with = "na")]
    pub aa_start: Option<i32>,
    #[serde(rename = "Amino Acid Stop", with = "na")]
    pub aa_stop: Option<i32>,
}

/// Column names of the deletion report, in output order.
pub const FINDING_COLUMNS: &[&str] = &[
    "Sample ID",
    "Gene",
    "SV Length",
    "Ref Start",
    "Ref Stop",
    "CDS Start",
    "CDS Stop",
    "Amino Acid Start",
    "Amino Acid Stop",
];

impl DeletionFinding {
    pub fn gene(&self) -> &str {
        match self {
            DeletionFinding::Status { gene, .. } => gene,
            DeletionFinding::Deletion(deletion) => &deletion.gene,
        }
    }

    /// Convert into a report row for `sample_id`.
    pub fn to_row(&self, sample_id: &str) -> FindingRow {
        match self {
            DeletionFinding::Status { gene, status } => FindingRow {
                sample_id: sample_id.to_string(),
                gene: gene.clone(),
                sv_length: None,
                ref_start: status.to_string(),
                ref_stop: status.to_string(),
                cds_start: None,
                cds_stop: None,
                aa_start: None,
                aa_stop: None,
            },
            DeletionFinding::Deletion(deletion) => {
                let projection = deletion.projection.as_ref();
                FindingRow {
                    sample_id: sample_id.to_string(),
                    gene: deletion.gene.clone(),
                    sv_length: Some(deletion.sv_length),
                    ref_start: deletion.ref_start.to_string(),
                    ref_stop: deletion.ref_stop.to_string(),
                    cds_start: projection.map(|p| p.cds_start),
                    cds_stop: projection.map(|p| p.cds_stop),
                    aa_start: projection.and_then(|p| p.aa_start),
                    aa_stop: projection.and_then(|p| p.aa_stop),
                }
            }
        }
    }
}

/// Configuration for the `DeletionDetector`.
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(pattern = "immutable")]
pub struct Config {
    /// Regions above both this average depth and `intact_min_percentage_coverage` have no large
    /// deletion.
    #[builder(default = "2.0")]
    pub intact_min_average_depth: f64,
    #[builder(default = "99.0")]
    pub intact_min_percentage_coverage: f64,
    /// Regions below this average depth or below `absent_max_percentage_coverage` are deleted
    /// completely.
    #[builder(default = "2.0")]
    pub absent_max_average_depth: f64,
    #[builder(default = "1.0")]
    pub absent_max_percentage_coverage: f64,
    /// Positions with lower depth count as uncovered.
    #[builder(default = "1")]
    pub min_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            intact_min_average_depth: 2.0,
            intact_min_percentage_coverage: 99.0,
            absent_max_average_depth: 2.0,
            absent_max_percentage_coverage: 1.0,
            min_depth: 1,
        }
    }
}

/// Classifies regions and locates deletions in them.
#[derive(Debug, Clone, Default)]
pub struct DeletionDetector {
    config: Config,
}

impl DeletionDetector {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run detection for `region` with the given summary statistics.
    ///
    /// Only regions that are neither clearly intact nor clearly absent are scanned base by base.
    /// Returns `None` if such a region has no uncovered position.
    pub fn detect<C>(
        &self,
        region: &Region,
        coverage: &C,
        average_depth: f64,
        percentage_coverage: f64,
    ) -> Option<DeletionFinding>
    where
        C: CoverageProvider + ?Sized,
    {
        let status = if average_depth > self.config.intact_min_average_depth
            && percentage_coverage > self.config.intact_min_percentage_coverage
        {
            Some(CoverageStatus::NoLargeDeletion)
        } else if average_depth < self.config.absent_max_average_depth
            || percentage_coverage < self.config.absent_max_percentage_coverage
        {
            Some(CoverageStatus::CompleteDeletion)
        } else {
            None
        };
        if let Some(status) = status {
            return Some(DeletionFinding::Status {
                gene: region.gene_name.clone(),
                status,
            });
        }

        let (del_start, del_stop) = self.uncovered_envelope(region, coverage)?;
        debug_assert!(region.contains(del_start) && region.contains(del_stop));

        Some(DeletionFinding::Deletion(Deletion {
            gene: region.gene_name.clone(),
            sv_length: del_stop - del_start,
            ref_start: del_start,
            ref_stop: del_stop,
            projection: region
                .strand
                .map(|strand| strand.project(region.start, region.stop, del_start, del_stop)),
        }))
    }

    /// First and last uncovered position of `region`.
    fn uncovered_envelope<C>(&self, region: &Region, coverage: &C) -> Option<(i32, i32)>
    where
        C: CoverageProvider + ?Sized,
    {
        let mut uncovered = (region.start..=region.stop).filter(|pos| {
            coverage
                .depth(&region.reference, *pos)
                .map_or(true, |depth| depth < self.config.min_depth)
        });
        let first = uncovered.next()?;
        let last = uncovered.last().unwrap_or(first);
        Some((first, last))
    }
}
