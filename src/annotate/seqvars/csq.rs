//! Resolution of annotated variant records into report rows.

use indexmap::IndexMap;
use parse_display::Display;

use crate::common::{na, percent, Span};
use crate::error::Error;
use crate::loci::{LociRegistry, Locus};

use super::ann::GeneAnnotation;
use super::hgvs::{self, ProteinChange};

/// Variant type as written to the report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    serde::Deserialize,
    serde::Serialize,
)]
pub enum VariantType {
    #[display("SNP")]
    #[serde(rename = "SNP")]
    Snp,
    #[display("MNP")]
    #[serde(rename = "MNP")]
    Mnp,
    Insertion,
    Deletion,
}

/// Markers in HGVS text selecting the variant type, checked in order.
const INDEL_MARKERS: &[(&str, VariantType)] = &[
    ("del", VariantType::Deletion),
    ("ins", VariantType::Insertion),
    ("dup", VariantType::Insertion),
];

impl VariantType {
    /// Type from allele lengths and the primary annotation's HGVS text.
    pub fn from_annotation(reference: &str, alternative: &str, ann: &GeneAnnotation) -> Self {
        if reference.len() > 1 && reference.len() == alternative.len() {
            return VariantType::Mnp;
        }
        let hgvs_c = ann.hgvs_c.as_deref().unwrap_or_default();
        let hgvs_p = ann.hgvs_p.as_deref().unwrap_or_default();
        INDEL_MARKERS
            .iter()
            .find(|(marker, _)| hgvs_c.contains(marker) || hgvs_p.contains(marker))
            .map(|(_, variant_type)| *variant_type)
            .unwrap_or(VariantType::Snp)
    }

    /// Type from allele lengths only.
    pub fn from_lengths(reference: &str, alternative: &str) -> Self {
        match reference.len().cmp(&alternative.len()) {
            std::cmp::Ordering::Equal if reference.len() > 1 => VariantType::Mnp,
            std::cmp::Ordering::Equal => VariantType::Snp,
            std::cmp::Ordering::Greater => VariantType::Deletion,
            std::cmp::Ordering::Less => VariantType::Insertion,
        }
    }
}

/// A called variant together with its candidate annotations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariantRecord {
    /// Sample identifier.
    pub sample_id: String,
    /// Chromosome name.
    pub chrom: String,
    /// 1-based position of first base of `reference`.
    pub pos: i32,
    /// Reference bases.
    pub reference: String,
    /// Alternative bases.
    pub alternative: String,
    /// Value of the `FILTER` column.
    pub filter: String,
    /// Read depth at the site.
    pub read_depth: u32,
    /// Percentage of reads supporting the alternative allele.
    pub percent_alt_allele: f64,
    /// Candidate annotations in `ANN` order.
    pub annotations: Vec<GeneAnnotation>,
}

/// One row of the annotation report.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReportRow {
    #[serde(rename = "Sample ID")]
    pub sample_id: String,
    #[serde(rename = "CHROM")]
    pub chrom: String,
    #[serde(rename = "POS")]
    pub pos: i32,
    #[serde(rename = "REF")]
    pub reference: String,
    #[serde(rename = "ALT")]
    pub alternative: String,
    #[serde(rename = "Read Depth")]
    pub read_depth: u32,
    #[serde(rename = "Percent Alt Allele", with = "percent")]
    pub percent_alt_allele: f64,
    #[serde(rename = "Annotation", with = "na")]
    pub annotation: Option<String>,
    #[serde(rename = "Variant Type")]
    pub variant_type: VariantType,
    #[serde(rename = "Nucleotide Change")]
    pub nucleotide_change: String,
    #[serde(rename = "Position within CDS", with = "na")]
    pub cds_position: Option<Span>,
    #[serde(rename = "Amino acid Change", with = "na")]
    pub amino_acid_change: Option<String>,
    #[serde(rename = "REF Amino acid", with = "na")]
    pub ref_amino_acid: Option<String>,
    #[serde(rename = "ALT Amino acid", with = "na")]
    pub alt_amino_acid: Option<String>,
    #[serde(rename = "Codon Position", with = "na")]
    pub codon_position: Option<Span>,
    #[serde(rename = "Gene Name")]
    pub gene_name: String,
    #[serde(rename = "Gene ID")]
    pub gene_id: String,
}

/// Column names of the annotation report, in output order.
pub const REPORT_COLUMNS: &[&str] = &[
    "Sample ID",
    "CHROM",
    "POS",
    "REF",
    "ALT",
    "Read Depth",
    "Percent Alt Allele",
    "Annotation",
    "Variant Type",
    "Nucleotide Change",
    "Position within CDS",
    "Amino acid Change",
    "REF Amino acid",
    "ALT Amino acid",
    "Codon Position",
    "Gene Name",
    "Gene ID",
];

/// Annotation written for intergenic calls.
pub const NON_CODING: &str = "Non-Coding";

impl ReportRow {
    /// Row with the call columns of `record` and all derived columns unset.
    fn new(record: &VariantRecord, variant_type: VariantType) -> Self {
        Self {
            sample_id: record.sample_id.clone(),
            chrom: record.chrom.clone(),
            pos: record.pos,
            reference: record.reference.clone(),
            alternative: record.alternative.clone(),
            read_depth: record.read_depth,
            percent_alt_allele: record.percent_alt_allele,
            annotation: None,
            variant_type,
            nucleotide_change: String::new(),
            cds_position: None,
            amino_acid_change: None,
            ref_amino_acid: None,
            alt_amino_acid: None,
            codon_position: None,
            gene_name: String::new(),
            gene_id: String::new(),
        }
    }
}

/// Configuration for the `AnnotationResolver` and record loading.
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(pattern = "immutable")]
pub struct Config {
    /// Gene names to rewrite on the coding path.
    #[builder(default = "default_gene_aliases()")]
    pub gene_aliases: IndexMap<String, String>,

    /// Records with a lower percentage of alternative allele reads are dropped.
    #[builder(default = "5.0")]
    pub min_percent_alt_allele: f64,

    /// Whether to drop records whose `FILTER` is not `PASS`.
    #[builder(default = "true")]
    pub pass_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gene_aliases: default_gene_aliases(),
            min_percent_alt_allele: 5.0,
            pass_only: true,
        }
    }
}

/// snpEff gene symbols that differ from the names used in reports.
pub fn default_gene_aliases() -> IndexMap<String, String> {
    [("erm_37_", "erm(37)")]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

/// Turns `VariantRecord`s into `ReportRow`s.
#[derive(Debug, Clone, Default)]
pub struct AnnotationResolver {
    loci: LociRegistry,
    config: Config,
}

impl AnnotationResolver {
    pub fn new(loci: LociRegistry, config: Config) -> Self {
        Self { loci, config }
    }

    /// Resolve `record` into a report row.
    ///
    /// The first annotation decides between the coding and the MODIFIER path.
    pub fn resolve(&self, record: &VariantRecord) -> Result<ReportRow, Error> {
        let primary = record.annotations.first().ok_or_else(|| {
            Error::data_format(
                "annotations",
                format!("no annotation for {}:{}", record.chrom, record.pos),
            )
        })?;
        let variant_type =
            VariantType::from_annotation(&record.reference, &record.alternative, primary);

        if !primary.is_modifier() {
            self.resolve_coding(record, primary, variant_type)
        } else if let Some(locus) = self.loci.find(record.pos) {
            Ok(synthesize_known_locus(record, locus))
        } else {
            tracing::trace!(
                "{}:{} is outside of known loci, using nearest annotation",
                record.chrom,
                record.pos
            );
            Ok(resolve_modifier(record, primary, variant_type))
        }
    }

    fn resolve_coding(
        &self,
        record: &VariantRecord,
        primary: &GeneAnnotation,
        variant_type: VariantType,
    ) -> Result<ReportRow, Error> {
        let mut row = ReportRow::new(record, variant_type);
        row.gene_name = self
            .config
            .gene_aliases
            .get(&primary.gene_name)
            .unwrap_or(&primary.gene_name)
            .clone();
        row.gene_id = primary.gene_id.clone();
        row.amino_acid_change = primary.hgvs_p.clone();

        let hgvs_c = primary.hgvs_c.as_deref().unwrap_or_default();
        row.nucleotide_change = hgvs_c.to_string();
        row.cds_position = Some(hgvs::span(hgvs_c, variant_type == VariantType::Mnp)?);

        if let Some(hgvs_p) = primary.hgvs_p.as_deref() {
            let mut codon = hgvs::span(hgvs_p, false)?;
            let change = ProteinChange::parse(hgvs_p)?;
            let first = codon.start().to_string();

            row.annotation = Some(
                if change.is_synonymous() {
                    "Synonymous"
                } else {
                    "Non-synonymous"
                }
                .to_string(),
            );
            row.ref_amino_acid = Some(non_empty_or(change.wild_type, &first));
            if change.is_multi_residue() && !codon.is_range() {
                codon = Span::Range(codon.start(), codon.start() + 1);
            }
            if hgvs::has_mutant_residue(hgvs_p) {
                row.alt_amino_acid = Some(non_empty_or(change.mutant, &first));
            }
            row.codon_position = Some(codon);
        }

        Ok(row)
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Report an intergenic call against the nearest upstream annotation.
///
/// Falls back to the first annotation, labelled downstream, if no candidate qualifies.
fn resolve_modifier(
    record: &VariantRecord,
    primary: &GeneAnnotation,
    variant_type: VariantType,
) -> ReportRow {
    // `min_by_key` keeps the first minimum; iterate reversed so later candidates win ties.
    let nearest = record
        .annotations
        .iter()
        .rev()
        .filter(|ann| !ann.is_downstream())
        .filter_map(|ann| ann.distance.map(|distance| (distance, ann)))
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, ann)| (ann, "upstream"));
    let (ann, label) = match nearest {
        Some(nearest) => nearest,
        None => (primary, "downstream"),
    };

    let mut row = ReportRow::new(record, variant_type);
    row.annotation = Some(NON_CODING.to_string());
    row.gene_name = format!("{} {}", ann.gene_name, label);
    row.gene_id = format!("{} {}", ann.gene_id, label);
    row.nucleotide_change = ann.hgvs_c.clone().unwrap_or_default();
    row
}

/// Build the report row for a call within a registered locus.
///
/// Coordinates are relative to the locus start and the variant type only considers the allele
/// lengths.
pub fn synthesize_known_locus(record: &VariantRecord, locus: &Locus) -> ReportRow {
    let variant_type = VariantType::from_lengths(&record.reference, &record.alternative);
    let offset = record.pos - locus.start + 1;
    let ref_len = record.reference.len() as i32;
    let alt_len = record.alternative.len() as i32;

    let (nucleotide_change, cds_position) = match variant_type {
        VariantType::Snp => (
            format!("c.{}{}>{}", offset, record.reference, record.alternative),
            Some(Span::Point(offset)),
        ),
        // No CDS position is reported for MNPs within known loci.
        VariantType::Mnp => (
            format!(
                "c.{}_{}del{}ins{}",
                offset,
                offset + 1,
                record.reference,
                record.alternative
            ),
            None,
        ),
        VariantType::Insertion => {
            let inserted = record
                .alternative
                .get(record.reference.len()..)
                .unwrap_or_default();
            (
                format!("c.{}_{}ins{}", offset, offset + 1, inserted),
                Some(Span::Range(offset, offset + 1)),
            )
        }
        VariantType::Deletion => {
            let deleted = record
                .reference
                .get(record.alternative.len()..)
                .unwrap_or_default();
            let start = offset + alt_len;
            if ref_len - alt_len == 1 {
                (
                    format!("c.{}del{}", start, deleted),
                    Some(Span::Point(start)),
                )
            } else {
                let end = offset + ref_len - 1;
                (
                    format!("c.{}_{}del{}", start, end, deleted),
                    Some(Span::Range(start, end)),
                )
            }
        }
    };

    let mut row = ReportRow::new(record, variant_type);
    row.annotation = Some(locus.feature_type.clone());
    row.nucleotide_change = nucleotide_change;
    row.cds_position = if locus.is_coding() {
        cds_position
    } else {
        None
    };
    row.gene_name = locus.gene_name.clone();
    row.gene_id = locus.gene_id.clone();
    row
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::annotate::seqvars::ann::PutativeImpact;

    fn ann(
        effect: &str,
        impact: PutativeImpact,
        gene: &str,
        hgvs_c: Option<&str>,
        hgvs_p: Option<&str>,
        distance: Option<i32>,
    ) -> GeneAnnotation {
        GeneAnnotation {
            allele: String::from("T"),
            effect: effect.to_string(),
            impact,
            gene_name: gene.to_string(),
            gene_id: format!("{}_id", gene),
            feature_type: String::from("transcript"),
            feature_id: format!("{}_id", gene),
            biotype: String::from("protein_coding"),
            rank: None,
            hgvs_c: hgvs_c.map(str::to_string),
            hgvs_p: hgvs_p.map(str::to_string),
            cdna_pos: None,
            cds_pos: None,
            protein_pos: None,
            distance,
            messages: None,
        }
    }

    fn coding(gene: &str, hgvs_c: &str, hgvs_p: Option<&str>) -> GeneAnnotation {
        ann(
            "missense_variant",
            PutativeImpact::Moderate,
            gene,
            Some(hgvs_c),
            hgvs_p,
            None,
        )
    }

    fn modifier(effect: &str, gene: &str, hgvs_c: &str, distance: Option<i32>) -> GeneAnnotation {
        ann(
            effect,
            PutativeImpact::Modifier,
            gene,
            Some(hgvs_c),
            None,
            distance,
        )
    }

    fn variant(
        pos: i32,
        reference: &str,
        alternative: &str,
        anns: Vec<GeneAnnotation>,
    ) -> VariantRecord {
        VariantRecord {
            sample_id: String::from("S1"),
            chrom: String::from("NC_000962.3"),
            pos,
            reference: reference.to_string(),
            alternative: alternative.to_string(),
            filter: String::from("PASS"),
            read_depth: 80,
            percent_alt_allele: 98.5,
            annotations: anns,
        }
    }

    fn locus(start: i32, stop: i32, feature_type: &str) -> Locus {
        Locus {
            gene_name: String::from("rrs"),
            gene_id: String::from("EBG00000313325"),
            feature_type: feature_type.to_string(),
            start,
            stop,
        }
    }

    fn resolver(loci: Vec<Locus>) -> AnnotationResolver {
        AnnotationResolver::new(LociRegistry::new(loci), Config::default())
    }

    #[rstest::rstest]
    #[case("AC", "GT", "c.1A>G", VariantType::Mnp)]
    #[case("ACG", "TTT", "c.1_2delinsTT", VariantType::Mnp)]
    #[case("A", "G", "c.1A>G", VariantType::Snp)]
    #[case("AC", "A", "c.2delC", VariantType::Deletion)]
    #[case("A", "AT", "c.1_2insT", VariantType::Insertion)]
    #[case("A", "AT", "c.1_2dupT", VariantType::Insertion)]
    #[case("AT", "GCC", "c.1_2delinsGCC", VariantType::Deletion)]
    fn variant_type_from_annotation(
        #[case] reference: &str,
        #[case] alternative: &str,
        #[case] hgvs_c: &str,
        #[case] expected: VariantType,
    ) {
        let ann = coding("rpoB", hgvs_c, None);
        assert_eq!(
            VariantType::from_annotation(reference, alternative, &ann),
            expected
        );
    }

    #[rstest::rstest]
    #[case("A", "G", VariantType::Snp)]
    #[case("AC", "GT", VariantType::Mnp)]
    #[case("AC", "A", VariantType::Deletion)]
    #[case("A", "AC", VariantType::Insertion)]
    fn variant_type_from_lengths(
        #[case] reference: &str,
        #[case] alternative: &str,
        #[case] expected: VariantType,
    ) {
        assert_eq!(VariantType::from_lengths(reference, alternative), expected);
    }

    #[test]
    fn variant_type_display() {
        assert_eq!(format!("{}", VariantType::Snp), "SNP");
        assert_eq!(format!("{}", VariantType::Mnp), "MNP");
        assert_eq!(format!("{}", VariantType::Insertion), "Insertion");
        assert_eq!(format!("{}", VariantType::Deletion), "Deletion");
    }

    #[test]
    fn resolve_missense() -> Result<(), anyhow::Error> {
        let record = variant(
            761155,
            "C",
            "T",
            vec![coding("rpoB", "c.1349C>T", Some("p.Ser450Leu"))],
        );
        let row = resolver(vec![]).resolve(&record)?;

        assert_eq!(row.variant_type, VariantType::Snp);
        assert_eq!(row.annotation.as_deref(), Some("Non-synonymous"));
        assert_eq!(row.nucleotide_change, "c.1349C>T");
        assert_eq!(row.cds_position, Some(Span::Point(1349)));
        assert_eq!(row.amino_acid_change.as_deref(), Some("p.Ser450Leu"));
        assert_eq!(row.ref_amino_acid.as_deref(), Some("Ser"));
        assert_eq!(row.alt_amino_acid.as_deref(), Some("Leu"));
        assert_eq!(row.codon_position, Some(Span::Point(450)));
        assert_eq!(row.gene_name, "rpoB");
        assert_eq!(row.gene_id, "rpoB_id");

        Ok(())
    }

    #[test]
    fn resolve_synonymous() -> Result<(), anyhow::Error> {
        let record = variant(
            2155168,
            "G",
            "A",
            vec![coding("katG", "c.3C>T", Some("p.Val1Val"))],
        );
        let row = resolver(vec![]).resolve(&record)?;

        assert_eq!(row.annotation.as_deref(), Some("Synonymous"));
        assert_eq!(row.codon_position, Some(Span::Point(1)));

        Ok(())
    }

    #[test]
    fn resolve_coding_without_protein_change() -> Result<(), anyhow::Error> {
        let record = variant(1473246, "A", "G", vec![coding("rrs", "n.1401A>G", None)]);
        let row = resolver(vec![]).resolve(&record)?;

        assert_eq!(row.annotation, None);
        assert_eq!(row.cds_position, Some(Span::Point(1401)));
        assert_eq!(row.amino_acid_change, None);
        assert_eq!(row.ref_amino_acid, None);
        assert_eq!(row.alt_amino_acid, None);
        assert_eq!(row.codon_position, None);

        Ok(())
    }

    #[test]
    fn resolve_mnp_widens_codon() -> Result<(), anyhow::Error> {
        let record = variant(
            7570,
            "CG",
            "TT",
            vec![coding("gyrA", "c.281_282delCGinsTT", Some("p.Ala94ValAsp"))],
        );
        let row = resolver(vec![]).resolve(&record)?;

        assert_eq!(row.variant_type, VariantType::Mnp);
        assert_eq!(row.cds_position, Some(Span::Point(281)));
        assert_eq!(row.codon_position, Some(Span::Range(94, 95)));
        assert_eq!(row.ref_amino_acid.as_deref(), Some("Ala"));
        assert_eq!(row.alt_amino_acid.as_deref(), Some("ValAsp"));

        Ok(())
    }

    #[test]
    fn resolve_frameshift_has_no_alt_residue() -> Result<(), anyhow::Error> {
        let record = variant(
            2156100,
            "AG",
            "A",
            vec![coding("katG", "c.100delC", Some("p.Leu34fs"))],
        );
        let row = resolver(vec![]).resolve(&record)?;

        assert_eq!(row.variant_type, VariantType::Deletion);
        assert_eq!(row.cds_position, Some(Span::Point(100)));
        assert_eq!(row.ref_amino_acid.as_deref(), Some("Leu"));
        assert_eq!(row.alt_amino_acid, None);
        assert_eq!(row.codon_position, Some(Span::Point(34)));

        Ok(())
    }

    #[test]
    fn resolve_inframe_deletion_range() -> Result<(), anyhow::Error> {
        let record = variant(
            2156100,
            "ACGTTT",
            "A",
            vec![coding("katG", "c.100_104delCGTTT", Some("p.Ala34_Val35del"))],
        );
        let row = resolver(vec![]).resolve(&record)?;

        assert_eq!(row.cds_position, Some(Span::Range(100, 104)));
        assert_eq!(row.codon_position, Some(Span::Range(34, 35)));
        assert_eq!(row.alt_amino_acid, None);

        Ok(())
    }

    #[test]
    fn resolve_applies_gene_alias() -> Result<(), anyhow::Error> {
        let record = variant(
            2230000,
            "G",
            "A",
            vec![coding("erm_37_", "c.10G>A", Some("p.Gly4Ser"))],
        );
        let row = resolver(vec![]).resolve(&record)?;

        assert_eq!(row.gene_name, "erm(37)");

        Ok(())
    }

    #[test]
    fn resolve_malformed_hgvs_is_error() {
        let record = variant(10, "A", "G", vec![coding("rpoB", "c.?", Some("p.?"))]);
        assert!(resolver(vec![]).resolve(&record).is_err());

        let record = variant(10, "A", "G", vec![coding("rpoB", "c.10A>G", Some("Ser4Leu"))]);
        assert!(resolver(vec![]).resolve(&record).is_err());
    }

    #[test]
    fn resolve_without_annotations_is_error() {
        let record = variant(10, "A", "G", vec![]);
        assert!(resolver(vec![]).resolve(&record).is_err());
    }

    #[test]
    fn resolve_modifier_picks_nearest_upstream() -> Result<(), anyhow::Error> {
        let record = variant(
            1673425,
            "C",
            "T",
            vec![
                modifier("downstream_gene_variant", "mabA", "c.*20C>T", Some(5)),
                modifier("upstream_gene_variant", "fabG1", "c.-15C>T", Some(15)),
                modifier("upstream_gene_variant", "inhA", "c.-777C>T", Some(777)),
                modifier("intergenic_region", "fabG1-inhA", "n.1673425C>T", None),
            ],
        );
        let row = resolver(vec![]).resolve(&record)?;

        assert_eq!(row.annotation.as_deref(), Some(NON_CODING));
        assert_eq!(row.gene_name, "fabG1 upstream");
        assert_eq!(row.gene_id, "fabG1_id upstream");
        assert_eq!(row.nucleotide_change, "c.-15C>T");
        assert_eq!(row.variant_type, VariantType::Snp);
        assert_eq!(row.cds_position, None);
        assert_eq!(row.codon_position, None);
        assert_eq!(row.ref_amino_acid, None);
        assert_eq!(row.alt_amino_acid, None);
        assert_eq!(row.amino_acid_change, None);

        Ok(())
    }

    #[test]
    fn resolve_modifier_later_candidate_wins_tie() -> Result<(), anyhow::Error> {
        let record = variant(
            100,
            "C",
            "T",
            vec![
                modifier("upstream_gene_variant", "first", "c.-15C>T", Some(15)),
                modifier("upstream_gene_variant", "second", "c.-15C>T", Some(15)),
            ],
        );
        let row = resolver(vec![]).resolve(&record)?;

        assert_eq!(row.gene_name, "second upstream");

        Ok(())
    }

    #[test]
    fn resolve_modifier_falls_back_to_downstream() -> Result<(), anyhow::Error> {
        let record = variant(
            100,
            "CA",
            "C",
            vec![
                modifier("downstream_gene_variant", "katG", "c.*30delA", Some(30)),
                modifier("intergenic_region", "katG-furA", "n.101delA", None),
            ],
        );
        let row = resolver(vec![]).resolve(&record)?;

        assert_eq!(row.gene_name, "katG downstream");
        assert_eq!(row.gene_id, "katG_id downstream");
        assert_eq!(row.nucleotide_change, "c.*30delA");
        // text-based typing on the MODIFIER path
        assert_eq!(row.variant_type, VariantType::Deletion);

        Ok(())
    }

    #[test]
    fn resolve_modifier_within_locus() -> Result<(), anyhow::Error> {
        let record = variant(
            150,
            "A",
            "G",
            vec![modifier("upstream_gene_variant", "x", "c.-5A>G", Some(5))],
        );
        let row = resolver(vec![locus(100, 200, "CDS")]).resolve(&record)?;

        assert_eq!(row.nucleotide_change, "c.51A>G");
        assert_eq!(row.cds_position, Some(Span::Point(51)));
        assert_eq!(row.annotation.as_deref(), Some("CDS"));
        assert_eq!(row.gene_name, "rrs");
        assert_eq!(row.gene_id, "EBG00000313325");

        Ok(())
    }

    #[test]
    fn resolve_coding_ignores_locus() -> Result<(), anyhow::Error> {
        let record = variant(150, "A", "G", vec![coding("rpoB", "c.7A>G", None)]);
        let row = resolver(vec![locus(100, 200, "CDS")]).resolve(&record)?;

        assert_eq!(row.nucleotide_change, "c.7A>G");
        assert_eq!(row.gene_name, "rpoB");

        Ok(())
    }

    #[rstest::rstest]
    #[case::snp(150, "A", "G", "CDS", "c.51A>G", Some(Span::Point(51)), VariantType::Snp)]
    #[case::snp_non_coding(150, "A", "G", "rRNA", "c.51A>G", None, VariantType::Snp)]
    #[case::mnp(150, "AC", "GT", "CDS", "c.51_52delACinsGT", None, VariantType::Mnp)]
    #[case::insertion(120, "A", "ATT", "CDS", "c.21_22insTT", Some(Span::Range(21, 22)), VariantType::Insertion)]
    #[case::deletion_single(150, "AC", "A", "CDS", "c.52delC", Some(Span::Point(52)), VariantType::Deletion)]
    #[case::deletion_multi(150, "ACGT", "A", "CDS", "c.52_54delCGT", Some(Span::Range(52, 54)), VariantType::Deletion)]
    fn known_locus(
        #[case] pos: i32,
        #[case] reference: &str,
        #[case] alternative: &str,
        #[case] feature_type: &str,
        #[case] nucleotide_change: &str,
        #[case] cds_position: Option<Span>,
        #[case] variant_type: VariantType,
    ) {
        let record = variant(pos, reference, alternative, vec![]);
        let row = synthesize_known_locus(&record, &locus(100, 200, feature_type));

        assert_eq!(row.nucleotide_change, nucleotide_change);
        assert_eq!(row.cds_position, cds_position);
        assert_eq!(row.variant_type, variant_type);
        assert_eq!(row.annotation.as_deref(), Some(feature_type));
        assert_eq!(row.amino_acid_change, None);
        assert_eq!(row.codon_position, None);
    }

    #[test]
    fn known_locus_insertion_offset() {
        let record = variant(520, "A", "ATT", vec![]);
        let row = synthesize_known_locus(&record, &locus(500, 900, "CDS"));

        assert_eq!(row.nucleotide_change, "c.21_22insTT");
        assert_eq!(row.cds_position, Some(Span::Range(21, 22)));
    }

    #[test]
    fn known_locus_overrides_text_based_type() -> Result<(), anyhow::Error> {
        // HGVS text says deletion, the allele lengths say SNP.
        let record = variant(
            150,
            "A",
            "G",
            vec![modifier("upstream_gene_variant", "x", "c.-5delA", Some(5))],
        );
        let row = resolver(vec![locus(100, 200, "CDS")]).resolve(&record)?;

        assert_eq!(row.variant_type, VariantType::Snp);

        Ok(())
    }

    #[test]
    fn resolve_is_idempotent() -> Result<(), anyhow::Error> {
        let record = variant(
            761155,
            "C",
            "T",
            vec![coding("rpoB", "c.1349C>T", Some("p.Ser450Leu"))],
        );
        let resolver = resolver(vec![]);
        assert_eq!(resolver.resolve(&record)?, resolver.resolve(&record)?);

        Ok(())
    }

    #[test]
    fn config_builder_defaults() -> Result<(), anyhow::Error> {
        let config = ConfigBuilder::default().pass_only(false).build()?;
        assert!(!config.pass_only);
        assert_eq!(config.min_percent_alt_allele, 5.0);
        assert_eq!(
            config.gene_aliases.get("erm_37_").map(String::as_str),
            Some("erm(37)")
        );

        Ok(())
    }
}
