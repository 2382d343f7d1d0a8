//! Sample summary report built from run statistics, target coverage and resolved annotation rows.
//!
//! The report is plain text with three sections, in this order, separated by two empty lines:
//!
//! - `Sample Summary:` with one `<header>: <value>` line per selected stats column;
//! - `Target Coverage Summary:` with the selected columns of every target coverage line;
//! - `Variant Summary:` with the report rows accepted by the summary rules.

pub mod predicate;

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use itertools::Itertools;

use crate::common::io::std::{open_write_maybe_gz, tsv_reader, tsv_writer};
use crate::error::Error;

use self::predicate::Registry;

/// Command line arguments for `report summary` sub command.
#[derive(Parser, Debug)]
#[command(about = "Write the sample summary report", long_about = None)]
pub struct Args {
    /// Path to the report TSV written by `annotate seqvars`.
    #[arg(long)]
    pub path_input_tsv: String,
    /// Path to the run statistics TSV file (header line and one value line).
    #[arg(long)]
    pub path_stats: String,
    /// Path to the target coverage TSV file.
    #[arg(long)]
    pub path_target_coverage: String,
    /// Path to the output summary file.
    #[arg(long)]
    pub path_output: String,
    /// Optional YAML file with rules replacing the built-in ones.
    #[arg(long)]
    pub path_rules: Option<String>,
}

/// The columns of a report row used by the summary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ReportLine {
    #[serde(rename = "POS")]
    pub pos: i32,
    #[serde(rename = "Gene Name")]
    pub gene_name: String,
    #[serde(rename = "Nucleotide Change")]
    pub nucleotide_change: String,
    #[serde(rename = "Amino acid Change")]
    pub amino_acid_change: String,
    #[serde(rename = "Read Depth")]
    pub read_depth: String,
    #[serde(rename = "Percent Alt Allele")]
    pub percent_alt_allele: String,
    #[serde(rename = "Annotation")]
    pub annotation: String,
    /// Kept as text, rules match on it literally.
    #[serde(rename = "Codon Position")]
    pub codon_position: String,
}

/// One row of the variant summary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SummaryRow<'a> {
    #[serde(rename = "POS")]
    pub pos: i32,
    #[serde(rename = "Gene Name")]
    pub gene_name: &'a str,
    #[serde(rename = "Nucleotide Change")]
    pub nucleotide_change: &'a str,
    #[serde(rename = "Amino acid Change")]
    pub amino_acid_change: &'a str,
    #[serde(rename = "Read Depth")]
    pub read_depth: &'a str,
    #[serde(rename = "Percent Alt Allele")]
    pub percent_alt_allele: &'a str,
    #[serde(rename = "Annotation")]
    pub annotation: &'a str,
}

impl<'a> From<&'a ReportLine> for SummaryRow<'a> {
    fn from(line: &'a ReportLine) -> Self {
        Self {
            pos: line.pos,
            gene_name: &line.gene_name,
            nucleotide_change: &line.nucleotide_change,
            amino_acid_change: &line.amino_acid_change,
            read_depth: &line.read_depth,
            percent_alt_allele: &line.percent_alt_allele,
            annotation: &line.annotation,
        }
    }
}

/// Columns of the stats file written to the sample summary, in output order.
pub const SAMPLE_SUMMARY_COLUMNS: &[usize] = &[0, 1, 5, 6, 7];

/// Columns of the target coverage file written to the summary, in output order.
pub const TARGET_COVERAGE_COLUMNS: &[usize] = &[4, 2, 3, 6];

/// Header and value pairs of the run statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleSummary {
    pub entries: Vec<(String, String)>,
}

impl SampleSummary {
    /// Load the `SAMPLE_SUMMARY_COLUMNS` of the header and first value line of `path`.
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let mut reader = tsv_reader(path, true)?;
        let headers = reader.headers()?.clone();
        let values = reader
            .records()
            .next()
            .ok_or_else(|| Error::MissingColumn(String::from("stats value line")))??;

        let entries = SAMPLE_SUMMARY_COLUMNS
            .iter()
            .map(|&idx| match (headers.get(idx), values.get(idx)) {
                (Some(header), Some(value)) => Ok((header.to_string(), value.to_string())),
                _ => Err(Error::MissingColumn(format!("stats column {}", idx + 1))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }
}

/// Selected columns of all target coverage lines, header line included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetCoverageSummary {
    pub lines: Vec<Vec<String>>,
}

impl TargetCoverageSummary {
    /// Load the `TARGET_COVERAGE_COLUMNS` of every line of `path`.
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let mut reader = tsv_reader(path, false)?;
        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = TARGET_COVERAGE_COLUMNS
                .iter()
                .map(|&idx| {
                    record.get(idx).map(str::to_string).ok_or_else(|| {
                        Error::MissingColumn(format!("target coverage column {}", idx + 1))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            lines.push(line);
        }
        Ok(Self { lines })
    }
}

/// Column names of the variant summary, in output order.
pub const SUMMARY_COLUMNS: &[&str] = &[
    "POS",
    "Gene Name",
    "Nucleotide Change",
    "Amino acid Change",
    "Read Depth",
    "Percent Alt Allele",
    "Annotation",
];

/// Load the report rows from `path`.
pub fn load_report<P>(path: P) -> Result<Vec<ReportLine>, Error>
where
    P: AsRef<Path>,
{
    let mut reader = tsv_reader(path, true)?;
    let mut result = Vec::new();
    for line in reader.deserialize() {
        result.push(line?);
    }
    Ok(result)
}

/// The lines accepted by `registry`, in input order.
pub fn summarize<'a>(
    registry: &Registry,
    lines: &'a [ReportLine],
) -> Result<Vec<&'a ReportLine>, Error> {
    let mut result = Vec::new();
    for line in lines {
        if registry.accepts(line)? {
            result.push(line);
        }
    }
    Ok(result)
}

/// Write the three report sections to `out`; `lines` are the accepted variants.
pub fn write_summary<W>(
    out: &mut W,
    sample: &SampleSummary,
    targets: &TargetCoverageSummary,
    lines: &[&ReportLine],
) -> Result<(), Error>
where
    W: Write,
{
    writeln!(out, "Sample Summary:")?;
    for (header, value) in &sample.entries {
        writeln!(out, "{}: {}", header, value)?;
    }

    write!(out, "\n\nTarget Coverage Summary:\n")?;
    for line in &targets.lines {
        writeln!(out, "{}", line.iter().join("\t"))?;
    }

    write!(out, "\n\nVariant Summary:\n")?;
    let mut writer = tsv_writer(&mut *out);
    writer.write_record(SUMMARY_COLUMNS)?;
    for line in lines {
        writer.serialize(SummaryRow::from(*line))?;
    }
    writer.flush()?;
    Ok(())
}

/// Main entry point for `report summary` sub command.
pub fn run(common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &common);
    tracing::info!("args = {:?}", &args);

    let registry = match &args.path_rules {
        Some(path_rules) => Registry::from_path(path_rules)
            .with_context(|| format!("could not load rules from {}", path_rules))?,
        None => Registry::default(),
    };
    tracing::info!("using {} summary rules", registry.rules.len());

    let sample = SampleSummary::from_path(&args.path_stats)
        .with_context(|| format!("could not load stats from {}", &args.path_stats))?;
    let targets = TargetCoverageSummary::from_path(&args.path_target_coverage).with_context(|| {
        format!(
            "could not load target coverage from {}",
            &args.path_target_coverage
        )
    })?;

    let lines = load_report(&args.path_input_tsv)
        .with_context(|| format!("could not load report from {}", &args.path_input_tsv))?;
    let accepted = summarize(&registry, &lines)?;
    tracing::info!("{} of {} variants in summary", accepted.len(), lines.len());

    let mut out = open_write_maybe_gz(&args.path_output)
        .with_context(|| format!("could not open {} for writing", &args.path_output))?;
    write_summary(&mut out, &sample, &targets, &accepted)?;
    out.finish()
        .with_context(|| format!("could not finish writing {}", &args.path_output))?;

    Ok(())
}
