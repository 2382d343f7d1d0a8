//! Detection of large deletions in a panel of regions.

pub mod coverage;
pub mod csq;
pub mod panel;

use std::io::Write;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use crate::common::io::std::{finish_tsv_writer, open_write_maybe_gz, tsv_writer};
use crate::error::Error;

use self::coverage::{CoverageMap, CoverageProvider, CoverageSummary};
use self::csq::{ConfigBuilder, DeletionDetector, DeletionFinding, FINDING_COLUMNS};
use self::panel::RegionPanel;

/// Command line arguments for `annotate strucvars` sub command.
#[derive(Parser, Debug)]
#[command(about = "Detect large deletions from per-position coverage", long_about = None)]
pub struct Args {
    /// Path to the per-position coverage file (`samtools depth` output).
    #[arg(long)]
    pub path_coverage: String,
    /// Path to the BED-like region panel.
    #[arg(long)]
    pub path_panel: String,
    /// Path to the per-region coverage summary TSV file.
    #[arg(long)]
    pub path_summary: String,
    /// Path to the output findings TSV file.
    #[arg(long)]
    pub path_output_tsv: String,

    /// Sample identifier to write into the report.
    #[arg(long)]
    pub sample_id: String,
    /// Positions with lower depth count as uncovered.
    #[arg(long, default_value_t = 1)]
    pub min_depth: u32,
}

/// Run the detector on all regions of `panel`, in panel order.
///
/// Regions without summary statistics were not sequenced and are skipped.
pub fn detect_all<C>(
    detector: &DeletionDetector,
    panel: &RegionPanel,
    coverage: &C,
    summary: &CoverageSummary,
) -> Vec<DeletionFinding>
where
    C: CoverageProvider + ?Sized,
{
    panel
        .regions
        .iter()
        .filter_map(|region| {
            let Some(stats) = summary.get(&region.reference, &region.gene_name) else {
                tracing::debug!(
                    "no coverage summary for {} on {}, skipping",
                    &region.gene_name,
                    &region.reference
                );
                return None;
            };
            detector.detect(
                region,
                coverage,
                stats.average_depth,
                stats.percentage_coverage,
            )
        })
        .collect()
}

/// Write header and `findings` to `writer`.
pub fn write_findings<W>(
    writer: &mut csv::Writer<W>,
    sample_id: &str,
    findings: &[DeletionFinding],
) -> Result<(), Error>
where
    W: Write,
{
    writer.write_record(FINDING_COLUMNS)?;
    for finding in findings {
        writer.serialize(finding.to_row(sample_id))?;
    }
    writer.flush()?;
    Ok(())
}

/// Main entry point for `annotate strucvars` sub command.
pub fn run(common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &common);
    tracing::info!("args = {:?}", &args);

    tracing::info!("Loading region panel ...");
    let panel = RegionPanel::from_path(&args.path_panel)
        .with_context(|| format!("could not load panel from {}", &args.path_panel))?;
    tracing::info!("... done loading {} regions", panel.len());

    tracing::info!("Loading coverage summary ...");
    let summary = CoverageSummary::from_path(&args.path_summary)
        .with_context(|| format!("could not load summary from {}", &args.path_summary))?;

    tracing::info!("Loading coverage ...");
    let start = Instant::now();
    let coverage = CoverageMap::from_path(&args.path_coverage, &panel)
        .with_context(|| format!("could not load coverage from {}", &args.path_coverage))?;
    let metrics = coverage.metrics();
    tracing::info!(
        "... done loading coverage in {:?}: {} positions, {} with depth > 0, total depth {}, \
        {} retained",
        start.elapsed(),
        metrics.positions,
        metrics.covered_positions,
        metrics.total_depth,
        coverage.len()
    );

    let detector = DeletionDetector::new(ConfigBuilder::default().min_depth(args.min_depth).build()?);
    let findings = detect_all(&detector, &panel, &coverage, &summary);
    tracing::info!("{} findings for {} regions", findings.len(), panel.len());

    let mut writer = tsv_writer(
        open_write_maybe_gz(&args.path_output_tsv)
            .with_context(|| format!("could not open {} for writing", &args.path_output_tsv))?,
    );
    write_findings(&mut writer, &args.sample_id, &findings)?;
    finish_tsv_writer(writer)
        .with_context(|| format!("could not finish writing {}", &args.path_output_tsv))?;

    Ok(())
}
