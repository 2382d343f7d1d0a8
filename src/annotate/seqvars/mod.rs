//! Resolution of snpEff-annotated sequence variants into report rows.

pub mod ann;
pub mod csq;
pub mod hgvs;
pub mod vcf;

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use rayon::prelude::*;

use crate::common::io::std::{
    finish_tsv_writer, open_read_maybe_gz, open_write_maybe_gz, tsv_reader, tsv_writer,
};
use crate::error::Error;
use crate::loci::LociRegistry;

use self::ann::GeneAnnotation;
use self::csq::{AnnotationResolver, Config, ConfigBuilder, ReportRow, VariantRecord};

/// Command line arguments for `annotate seqvars` sub command.
#[derive(Parser, Debug)]
#[command(about = "Resolve snpEff-annotated variants into report rows", long_about = None)]
pub struct Args {
    /// Path to the input annotation TSV or snpEff VCF file.
    #[arg(long)]
    pub path_input: String,
    /// Path to the loci TSV file.
    #[arg(long)]
    pub path_loci: String,
    /// Path to the output report TSV file.
    #[arg(long)]
    pub path_output_tsv: String,

    /// Sample identifier to write into the report.
    #[arg(long)]
    pub sample_id: String,
    /// Minimal percentage of reads supporting the alternative allele.
    #[arg(long, default_value_t = 5.0)]
    pub min_percent_alt_allele: f64,
    /// Also resolve records whose FILTER is not PASS.
    #[arg(long, default_value_t = false)]
    pub keep_filtered: bool,
}

/// Value of `FILTER` for records that passed all filters.
pub const FILTER_PASS: &str = "PASS";

impl Config {
    fn accepts_filter(&self, filter: &str) -> bool {
        !self.pass_only || filter == FILTER_PASS
    }

    fn accepts_percent(&self, percent_alt_allele: f64) -> bool {
        percent_alt_allele >= self.min_percent_alt_allele
    }
}

/// A row of the annotation TSV; columns not listed here are ignored.
#[derive(Debug, Clone, serde::Deserialize)]
struct AnnotationRow {
    #[serde(rename = "CHROM")]
    chrom: String,
    #[serde(rename = "POS")]
    pos: i32,
    #[serde(rename = "REF")]
    reference: String,
    #[serde(rename = "ALT")]
    alternative: String,
    #[serde(rename = "FILTER")]
    filter: String,
    #[serde(rename = "AF")]
    allele_frequency: String,
    #[serde(rename = "DP")]
    read_depth: String,
    #[serde(rename = "ANN")]
    ann: String,
}

/// Whether `path` looks like a VCF file, possibly compressed.
fn is_vcf<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    let name = path.as_ref().to_string_lossy();
    [".vcf", ".vcf.gz", ".vcf.bgz"]
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

fn parse_number<T>(what: &str, value: &str) -> Result<T, Error>
where
    T: std::str::FromStr,
{
    value.parse().map_err(|_| Error::data_format(what, value))
}

/// Load the records to resolve, applying the filters of `config`.
///
/// Files ending in `.vcf` (optionally gzipped) are read as snpEff VCF, all others as annotation
/// TSV.
pub fn load_variant_records<P>(
    path: P,
    sample_id: &str,
    config: &Config,
) -> Result<Vec<VariantRecord>, Error>
where
    P: AsRef<Path>,
{
    let (total, records) = if is_vcf(path.as_ref()) {
        load_from_vcf(path, sample_id, config)?
    } else {
        load_from_tsv(path, sample_id, config)?
    };
    tracing::info!(
        "... kept {} of {} records after filtering",
        records.len(),
        total
    );
    Ok(records)
}

fn load_from_tsv<P>(
    path: P,
    sample_id: &str,
    config: &Config,
) -> Result<(usize, Vec<VariantRecord>), Error>
where
    P: AsRef<Path>,
{
    let mut reader = tsv_reader(path, true)?;
    let mut total = 0;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let row: AnnotationRow = result?;
        total += 1;
        if !config.accepts_filter(&row.filter) {
            continue;
        }
        let percent_alt_allele = parse_number::<f64>("AF", &row.allele_frequency)? * 100.0;
        if !config.accepts_percent(percent_alt_allele) {
            continue;
        }

        records.push(VariantRecord {
            sample_id: sample_id.to_string(),
            read_depth: parse_number("DP", &row.read_depth)?,
            annotations: GeneAnnotation::parse_all(&row.ann)?,
            chrom: row.chrom,
            pos: row.pos,
            reference: row.reference,
            alternative: row.alternative,
            filter: row.filter,
            percent_alt_allele,
        });
    }
    Ok((total, records))
}

fn load_from_vcf<P>(
    path: P,
    sample_id: &str,
    config: &Config,
) -> Result<(usize, Vec<VariantRecord>), Error>
where
    P: AsRef<Path>,
{
    let reader = open_read_maybe_gz(path)?;
    let mut total = 0;
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let Some(line) = vcf::VcfLine::parse(&line) else {
            continue;
        };
        total += 1;
        if !config.accepts_filter(line.filter) {
            continue;
        }
        let percent_alt_allele = line.allele_frequency()? * 100.0;
        if !config.accepts_percent(percent_alt_allele) {
            continue;
        }

        records.push(VariantRecord {
            sample_id: sample_id.to_string(),
            chrom: line.chrom.to_string(),
            pos: parse_number("POS", line.pos)?,
            reference: line.reference.to_string(),
            alternative: line.alternative.to_string(),
            filter: line.filter.to_string(),
            read_depth: line.read_depth()?,
            percent_alt_allele,
            annotations: GeneAnnotation::parse_all(line.ann()?)?,
        });
    }
    Ok((total, records))
}

/// Resolve all `records` in parallel, keeping their order.
pub fn resolve_all(
    resolver: &AnnotationResolver,
    records: &[VariantRecord],
) -> Result<Vec<ReportRow>, Error> {
    records
        .par_iter()
        .map(|record| resolver.resolve(record))
        .collect()
}

/// Write header and `rows` to `writer`.
pub fn write_report<W>(writer: &mut csv::Writer<W>, rows: &[ReportRow]) -> Result<(), Error>
where
    W: Write,
{
    writer.write_record(csq::REPORT_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Main entry point for `annotate seqvars` sub command.
pub fn run(common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &common);
    tracing::info!("args = {:?}", &args);

    tracing::info!("Loading loci ...");
    let loci = LociRegistry::from_path(&args.path_loci)
        .with_context(|| format!("could not load loci from {}", &args.path_loci))?;
    tracing::info!("... done loading {} loci", loci.len());

    let config = ConfigBuilder::default()
        .min_percent_alt_allele(args.min_percent_alt_allele)
        .pass_only(!args.keep_filtered)
        .build()?;

    tracing::info!("Loading variant records ...");
    let records = load_variant_records(&args.path_input, &args.sample_id, &config)
        .with_context(|| format!("could not load variants from {}", &args.path_input))?;

    tracing::info!("Resolving annotations ...");
    let start = Instant::now();
    let resolver = AnnotationResolver::new(loci, config);
    let rows = resolve_all(&resolver, &records)?;
    tracing::info!(
        "... done resolving {} records in {:?}",
        rows.len(),
        start.elapsed()
    );

    let mut writer = tsv_writer(
        open_write_maybe_gz(&args.path_output_tsv)
            .with_context(|| format!("could not open {} for writing", &args.path_output_tsv))?,
    );
    write_report(&mut writer, &rows)?;
    finish_tsv_writer(writer)
        .with_context(|| format!("could not finish writing {}", &args.path_output_tsv))?;

    Ok(())
}
