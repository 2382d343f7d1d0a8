//! Per-position read depth and per-region coverage summaries.

use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;
use rustc_hash::FxHashMap;

use super::panel::RegionPanel;
use crate::common::io::std::tsv_reader;
use crate::error::Error;

/// Read access to per-position depth.
pub trait CoverageProvider {
    /// Depth at 1-based `pos` on `reference`, `None` if the position was not reported.
    fn depth(&self, reference: &str, pos: i32) -> Option<u32>;
}

/// Whole-genome metrics gathered while loading a coverage file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoverageMetrics {
    /// Number of positions in the file.
    pub positions: usize,
    /// Number of positions with depth > 0.
    pub covered_positions: usize,
    /// Sum of the depth over all positions.
    pub total_depth: u64,
}

/// Depth per reference and position, restricted to the positions of a `RegionPanel`.
#[derive(Debug, Clone, Default)]
pub struct CoverageMap {
    depths: FxHashMap<String, FxHashMap<i32, u32>>,
    metrics: CoverageMetrics,
}

impl CoverageMap {
    /// Load a `samtools depth` style file (`reference, position, depth`, no header).
    ///
    /// Only positions covered by a region of `panel` are retained.
    pub fn from_path<P>(path: P, panel: &RegionPanel) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let retained = panel.positions();
        let mut result = Self::default();

        let mut reader = tsv_reader(path, false)?;
        let mut record = csv::StringRecord::new();
        while reader.read_record(&mut record)? {
            if record.len() < 3 {
                return Err(Error::data_format(
                    "coverage line",
                    record.iter().join("\t"),
                ));
            }
            let reference = &record[0];
            let pos = record[1]
                .parse::<i32>()
                .map_err(|_| Error::data_format("coverage position", &record[1]))?;
            let depth = record[2]
                .parse::<u32>()
                .map_err(|_| Error::data_format("coverage depth", &record[2]))?;

            result.metrics.positions += 1;
            if depth > 0 {
                result.metrics.covered_positions += 1;
                result.metrics.total_depth += u64::from(depth);
            }

            if retained
                .get(reference)
                .is_some_and(|positions| positions.contains(&pos))
            {
                result.insert(reference, pos, depth);
            }
        }

        Ok(result)
    }

    /// Record `depth` at `pos` on `reference`.
    pub fn insert(&mut self, reference: &str, pos: i32, depth: u32) {
        match self.depths.get_mut(reference) {
            Some(depths) => {
                depths.insert(pos, depth);
            }
            None => {
                let mut depths = FxHashMap::default();
                depths.insert(pos, depth);
                self.depths.insert(reference.to_string(), depths);
            }
        }
    }

    pub fn metrics(&self) -> &CoverageMetrics {
        &self.metrics
    }

    /// Number of retained positions.
    pub fn len(&self) -> usize {
        self.depths.values().map(|depths| depths.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CoverageProvider for CoverageMap {
    fn depth(&self, reference: &str, pos: i32) -> Option<u32> {
        self.depths
            .get(reference)
            .and_then(|depths| depths.get(&pos))
            .copied()
    }
}

/// Coverage statistics of one region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionCoverage {
    pub average_depth: f64,
    pub percentage_coverage: f64,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct SummaryRow {
    #[serde(rename = "Reference")]
    reference: String,
    #[serde(rename = "Gene Name")]
    gene_name: String,
    #[serde(rename = "Average Depth")]
    average_depth: f64,
    #[serde(rename = "Percentage Coverage")]
    percentage_coverage: f64,
}

/// Coverage statistics keyed by reference and gene name.
#[derive(Debug, Clone, Default)]
pub struct CoverageSummary {
    entries: IndexMap<(String, String), RegionCoverage>,
}

impl CoverageSummary {
    /// Load from a TSV file with header.
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let mut reader = tsv_reader(path, true)?;
        let mut result = Self::default();
        for row in reader.deserialize() {
            let row: SummaryRow = row?;
            result.insert(
                &row.reference,
                &row.gene_name,
                RegionCoverage {
                    average_depth: row.average_depth,
                    percentage_coverage: row.percentage_coverage,
                },
            );
        }
        Ok(result)
    }

    pub fn insert(&mut self, reference: &str, gene_name: &str, coverage: RegionCoverage) {
        self.entries
            .insert((reference.to_string(), gene_name.to_string()), coverage);
    }

    /// Statistics of the region, `None` if the region was not sequenced.
    pub fn get(&self, reference: &str, gene_name: &str) -> Option<&RegionCoverage> {
        self.entries
            .get(&(reference.to_string(), gene_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
