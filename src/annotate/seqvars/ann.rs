//! Parsing of the snpEff `ANN` field.
//!
//! Each `ANN` value holds one pipe-delimited block per candidate annotation, with the fields
//! `Allele | Annotation | Annotation_Impact | Gene_Name | Gene_ID | Feature_Type | Feature_ID |
//! Transcript_BioType | Rank | HGVS.c | HGVS.p | cDNA.pos / cDNA.length | CDS.pos / CDS.length |
//! AA.pos / AA.length | Distance | ERRORS / WARNINGS / INFO`.
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::digit1,
    combinator::{all_consuming, map, map_res},
    IResult, Parser,
};
use parse_display::{Display, FromStr};

use crate::common::parse_signed;
use crate::error::Error;

/// Putative impact level.
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
)]
#[display(style = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PutativeImpact {
    High,
    Moderate,
    Low,
    Modifier,
}

/// Encode exon/intron rank.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    FromStr,
    Default,
    serde::Deserialize,
    serde::Serialize,
)]
#[display("{ord}/{total}")]
pub struct Rank {
    pub ord: i32,
    pub total: i32,
}

/// Position, optionally with total length.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default, serde::Deserialize, serde::Serialize,
)]
pub struct Pos {
    pub ord: i32,
    pub total: Option<i32>,
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(total) = self.total {
            write!(f, "{}/{}", self.ord, total)
        } else {
            write!(f, "{}", self.ord)
        }
    }
}

impl Pos {
    fn parse_with_total(input: &str) -> IResult<&str, Self> {
        map(
            (
                parse_signed,
                tag("/"),
                map_res(digit1, |s: &str| s.parse::<i32>()),
            ),
            |(ord, _, total)| Pos {
                ord,
                total: Some(total),
            },
        )
        .parse(input)
    }

    fn parse_no_total(input: &str) -> IResult<&str, Self> {
        map(parse_signed, |ord| Pos { ord, total: None }).parse(input)
    }
}

impl FromStr for Pos {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(alt((Self::parse_with_total, Self::parse_no_total)))
            .parse(s)
            .map(|(_, value)| value)
            .map_err(|_| Error::data_format("position", s))
    }
}

/// One candidate annotation from the `ANN` field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct GeneAnnotation {
    /// The alternative allele that this annotation refers to.
    pub allele: String,
    /// The effect, e.g., `missense_variant` or `upstream_gene_variant`; may be `&`-joined.
    pub effect: String,
    /// The putative impact.
    pub impact: PutativeImpact,
    /// The gene name.
    pub gene_name: String,
    /// The gene identifier.
    pub gene_id: String,
    /// The feature type.
    pub feature_type: String,
    /// The feature identifier.
    pub feature_id: String,
    /// The transcript biotype.
    pub biotype: String,
    /// The exon / intron rank.
    pub rank: Option<Rank>,
    /// HGVS c. notation.
    pub hgvs_c: Option<String>,
    /// HGVS p. notation.
    pub hgvs_p: Option<String>,
    /// cDNA position.
    pub cdna_pos: Option<Pos>,
    /// CDS position.
    pub cds_pos: Option<Pos>,
    /// Protein position.
    pub protein_pos: Option<Pos>,
    /// Distance to feature.
    pub distance: Option<i32>,
    /// Errors, warnings and info messages, unparsed.
    pub messages: Option<String>,
}

impl GeneAnnotation {
    /// Whether the effect is tagged as downstream of the feature.
    pub fn is_downstream(&self) -> bool {
        self.effect.contains("downstream")
    }

    /// Whether the annotation carries the `MODIFIER` impact.
    pub fn is_modifier(&self) -> bool {
        self.impact == PutativeImpact::Modifier
    }

    /// Parse the value of an `ANN` field into its comma-separated annotations.
    ///
    /// A leading `ANN=` is stripped.
    pub fn parse_all(value: &str) -> Result<Vec<Self>, Error> {
        let value = value.strip_prefix("ANN=").unwrap_or(value);
        if value.is_empty() {
            return Err(Error::data_format("ANN field", value));
        }
        value.split(',').map(|s| s.parse()).collect()
    }
}

/// Return `None` for empty fields, otherwise the parsed value.
fn non_empty<T>(value: &str) -> Result<Option<T>, Error>
where
    T: FromStr,
{
    if value.is_empty() {
        Ok(None)
    } else {
        value
            .parse()
            .map(Some)
            .map_err(|_| Error::data_format("annotation field", value))
    }
}

impl FromStr for GeneAnnotation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split('|');
        let mut next = |name: &'static str| {
            fields
                .next()
                .ok_or_else(|| Error::MissingColumn(format!("ANN/{}", name)))
        };

        let allele = next("Allele")?.to_string();
        let effect = next("Annotation")?.to_string();
        let impact = next("Annotation_Impact")?;
        let impact = impact
            .parse()
            .map_err(|_| Error::data_format("annotation impact", impact))?;
        let gene_name = next("Gene_Name")?.to_string();
        let gene_id = next("Gene_ID")?.to_string();
        let feature_type = next("Feature_Type")?.to_string();
        let feature_id = next("Feature_ID")?.to_string();
        let biotype = next("Transcript_BioType")?.to_string();
        let rank = non_empty(next("Rank")?)?;
        let hgvs_c = non_empty(next("HGVS_c")?)?;
        let hgvs_p = non_empty(next("HGVS_p")?)?;
        let cdna_pos = non_empty(next("cDNA_position")?)?;
        let cds_pos = non_empty(next("CDS_position")?)?;
        let protein_pos = non_empty(next("Protein_position")?)?;
        let distance = non_empty(next("Distance")?)?;
        let messages = non_empty(next("Errors_Warnings_Info")?)?;

        Ok(GeneAnnotation {
            allele,
            effect,
            impact,
            gene_name,
            gene_id,
            feature_type,
            feature_id,
            biotype,
            rank,
            hgvs_c,
            hgvs_p,
            cdna_pos,
            cds_pos,
            protein_pos,
            distance,
            messages,
        })
    }
}

impl std::fmt::Display for GeneAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn opt<T: std::fmt::Display>(value: &Option<T>) -> String {
            value.as_ref().map(|v| v.to_string()).unwrap_or_default()
        }

        write!(
            f,
            "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.allele,
            self.effect,
            self.impact,
            self.gene_name,
            self.gene_id,
            self.feature_type,
            self.feature_id,
            self.biotype,
            opt(&self.rank),
            opt(&self.hgvs_c),
            opt(&self.hgvs_p),
            opt(&self.cdna_pos),
            opt(&self.cds_pos),
            opt(&self.protein_pos),
            opt(&self.distance),
            opt(&self.messages),
        )
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn putative_impact_display() {
        assert_eq!(format!("{}", PutativeImpact::High), "HIGH");
        assert_eq!(format!("{}", PutativeImpact::Moderate), "MODERATE");
        assert_eq!(format!("{}", PutativeImpact::Low), "LOW");
        assert_eq!(format!("{}", PutativeImpact::Modifier), "MODIFIER");
    }

    #[test]
    fn putative_impact_from_str() -> Result<(), anyhow::Error> {
        assert_eq!(PutativeImpact::from_str("HIGH")?, PutativeImpact::High);
        assert_eq!(
            PutativeImpact::from_str("MODIFIER")?,
            PutativeImpact::Modifier
        );
        assert!(PutativeImpact::from_str("modifier").is_err());

        Ok(())
    }

    #[test]
    fn rank_from_str() -> Result<(), anyhow::Error> {
        assert_eq!(Rank::from_str("1/2")?, Rank { ord: 1, total: 2 });
        assert_eq!(format!("{}", Rank { ord: 1, total: 2 }), "1/2");

        Ok(())
    }

    #[rstest::rstest]
    #[case("1", Pos { ord: 1, total: None })]
    #[case("1/2", Pos { ord: 1, total: Some(2) })]
    #[case("-12/300", Pos { ord: -12, total: Some(300) })]
    fn pos_from_str(#[case] text: &str, #[case] expected: Pos) -> Result<(), anyhow::Error> {
        assert_eq!(Pos::from_str(text)?, expected);
        assert_eq!(format!("{}", expected), text);

        Ok(())
    }

    #[test]
    fn pos_from_str_malformed() {
        assert!(Pos::from_str("1/").is_err());
        assert!(Pos::from_str("x").is_err());
    }

    #[test]
    fn gene_annotation_from_str() -> Result<(), anyhow::Error> {
        let value = "T|missense_variant|MODERATE|rpoB|Rv0667|transcript|Rv0667|protein_coding\
        |1/1|c.1349C>T|p.Ser450Leu|1349/3519|1349/3519|450/1172||";

        let ann = GeneAnnotation::from_str(value)?;
        assert_eq!(ann.allele, "T");
        assert_eq!(ann.impact, PutativeImpact::Moderate);
        assert_eq!(ann.gene_name, "rpoB");
        assert_eq!(ann.rank, Some(Rank { ord: 1, total: 1 }));
        assert_eq!(ann.hgvs_c.as_deref(), Some("c.1349C>T"));
        assert_eq!(ann.hgvs_p.as_deref(), Some("p.Ser450Leu"));
        assert_eq!(
            ann.protein_pos,
            Some(Pos {
                ord: 450,
                total: Some(1172)
            })
        );
        assert_eq!(ann.distance, None);
        assert_eq!(ann.messages, None);
        assert!(!ann.is_modifier());
        assert!(!ann.is_downstream());

        assert_eq!(format!("{}", &ann), value);

        Ok(())
    }

    #[test]
    fn gene_annotation_modifier() -> Result<(), anyhow::Error> {
        let ann = GeneAnnotation::from_str(
            "A|downstream_gene_variant|MODIFIER|katG|Rv1908c|transcript|Rv1908c|protein_coding\
            ||c.*120G>T|||||120|",
        )?;
        assert!(ann.is_modifier());
        assert!(ann.is_downstream());
        assert_eq!(ann.distance, Some(120));

        Ok(())
    }

    #[test]
    fn gene_annotation_too_few_fields() {
        let err = GeneAnnotation::from_str("A|missense_variant|MODERATE").unwrap_err();
        assert_eq!(format!("{}", err), "missing column \"ANN/Gene_Name\"");
    }

    #[test]
    fn gene_annotation_bad_distance() {
        assert!(GeneAnnotation::from_str(
            "A|upstream_gene_variant|MODIFIER|katG|Rv1908c|transcript|Rv1908c|protein_coding\
            ||c.-12G>T|||||far|",
        )
        .is_err());
    }

    #[test]
    fn parse_all() -> Result<(), anyhow::Error> {
        let anns = GeneAnnotation::parse_all(
            "ANN=A|upstream_gene_variant|MODIFIER|fabG1|Rv1483|transcript|Rv1483|protein_coding\
            ||c.-15C>T|||||15|,A|downstream_gene_variant|MODIFIER|mabA|Rv1482c|transcript\
            |Rv1482c|protein_coding||c.*200G>A|||||200|",
        )?;
        assert_eq!(anns.len(), 2);
        assert_eq!(anns[0].gene_name, "fabG1");
        assert_eq!(anns[1].distance, Some(200));

        assert!(GeneAnnotation::parse_all("ANN=").is_err());

        Ok(())
    }
}
