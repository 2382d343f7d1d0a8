//! Declarative per-gene rules selecting the variants for the summary.
//!
//! Rules can be loaded from YAML, e.g.
//!
//! ```yaml
//! - genes: [gyrA]
//!   predicate:
//!     type: all
//!     predicates:
//!       - type: annotation_in
//!         values: [Non-synonymous]
//!       - type: codon_end_within
//!         above: 87
//!         below: 95
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ReportLine;
use crate::common::{Span, NA};
use crate::error::Error;

const NON_SYNONYMOUS: &str = "Non-synonymous";
const SYNONYMOUS: &str = "Synonymous";
const NON_CODING: &str = "Non-Coding";

/// A condition on one report line.
///
/// Codon conditions on `NA` codons are never met.  Other codon text that is not a position or
/// `a-b` range is an error once a numeric comparison needs it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    Always,
    /// Annotation is one of `values`.
    AnnotationIn { values: Vec<String> },
    /// Position lies outside of all inclusive `ranges`.
    PositionOutside { ranges: Vec<(i32, i32)> },
    /// Codon text equals `value`.
    CodonIs { value: String },
    /// Codon text contains any of `values`.
    CodonContains { values: Vec<String> },
    /// Nucleotide change contains any of `values`.
    NucleotideContains { values: Vec<String> },
    /// Single codon strictly between `above` and `below`.
    PointWithin { above: i32, below: i32 },
    /// Single codon or range end strictly between `above` and `below`.
    CodonEndWithin { above: i32, below: i32 },
    /// Range end strictly between `above` and `below`.
    RangeEndWithin { above: i32, below: i32 },
    /// Range with start < `value` < end.
    RangeSpans { value: i32 },
    /// Range with start < `start_below` and end > `end_above`.
    RangeCovers { start_below: i32, end_above: i32 },
    All { predicates: Vec<Predicate> },
    Any { predicates: Vec<Predicate> },
}

fn codon(line: &ReportLine) -> Result<Option<Span>, Error> {
    if line.codon_position == NA {
        Ok(None)
    } else {
        line.codon_position.parse().map(Some)
    }
}

fn strictly_within(value: i32, above: i32, below: i32) -> bool {
    above < value && value < below
}

impl Predicate {
    /// Evaluate on `line`; `All` and `Any` short-circuit.
    pub fn matches(&self, line: &ReportLine) -> Result<bool, Error> {
        Ok(match self {
            Predicate::Always => true,
            Predicate::AnnotationIn { values } => values.iter().any(|v| v == &line.annotation),
            Predicate::PositionOutside { ranges } => ranges
                .iter()
                .all(|(start, stop)| line.pos < *start || *stop < line.pos),
            Predicate::CodonIs { value } => &line.codon_position == value,
            Predicate::CodonContains { values } => values
                .iter()
                .any(|v| line.codon_position.contains(v.as_str())),
            Predicate::NucleotideContains { values } => values
                .iter()
                .any(|v| line.nucleotide_change.contains(v.as_str())),
            Predicate::PointWithin { above, below } => matches!(
                codon(line)?,
                Some(Span::Point(pos)) if strictly_within(pos, *above, *below)
            ),
            Predicate::CodonEndWithin { above, below } => codon(line)?
                .is_some_and(|span| strictly_within(span.end(), *above, *below)),
            Predicate::RangeEndWithin { above, below } => matches!(
                codon(line)?,
                Some(Span::Range(_, end)) if strictly_within(end, *above, *below)
            ),
            Predicate::RangeSpans { value } => matches!(
                codon(line)?,
                Some(Span::Range(start, end)) if start < *value && *value < end
            ),
            Predicate::RangeCovers {
                start_below,
                end_above,
            } => matches!(
                codon(line)?,
                Some(Span::Range(start, end)) if start < *start_below && end > *end_above
            ),
            Predicate::All { predicates } => {
                for predicate in predicates {
                    if !predicate.matches(line)? {
                        return Ok(false);
                    }
                }
                true
            }
            Predicate::Any { predicates } => {
                for predicate in predicates {
                    if predicate.matches(line)? {
                        return Ok(true);
                    }
                }
                false
            }
        })
    }
}

/// A predicate together with the genes it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rule {
    pub genes: Vec<String>,
    /// Match `genes` as substrings of the gene name instead of exactly.
    #[serde(default)]
    pub substring: bool,
    pub predicate: Predicate,
}

impl Rule {
    pub fn applies_to(&self, gene_name: &str) -> bool {
        if self.substring {
            self.genes.iter().any(|gene| gene_name.contains(gene.as_str()))
        } else {
            self.genes.iter().any(|gene| gene == gene_name)
        }
    }
}

/// Ordered rules; a line is accepted if any rule for its gene accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Registry {
    pub rules: Vec<Rule>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn rule(genes: &[&str], predicate: Predicate) -> Rule {
    Rule {
        genes: strings(genes),
        substring: false,
        predicate,
    }
}

fn annotation_in(values: &[&str]) -> Predicate {
    Predicate::AnnotationIn {
        values: strings(values),
    }
}

fn non_synonymous_and(predicate: Predicate) -> Predicate {
    Predicate::All {
        predicates: vec![annotation_in(&[NON_SYNONYMOUS]), predicate],
    }
}

/// Synonymous change in the start codon.
fn synonymous_start_codon() -> Predicate {
    Predicate::All {
        predicates: vec![
            annotation_in(&[SYNONYMOUS]),
            Predicate::CodonIs {
                value: String::from("1"),
            },
        ],
    }
}

impl Default for Registry {
    fn default() -> Self {
        let rules = vec![
            Rule {
                genes: strings(&["rplC"]),
                substring: true,
                predicate: annotation_in(&[NON_SYNONYMOUS]),
            },
            rule(&["rrl", "ahpC", "ahpC upstream"], Predicate::Always),
            rule(
                &["atpE", "pepQ", "mmpR", "inhA", "tlyA"],
                annotation_in(&[NON_SYNONYMOUS]),
            ),
            rule(
                &["embB"],
                non_synonymous_and(Predicate::PositionOutside {
                    ranges: vec![
                        (4246524, 4246586),
                        (4248314, 4248329),
                        (4249653, 4249692),
                    ],
                }),
            ),
            rule(
                &["gyrA"],
                non_synonymous_and(Predicate::CodonEndWithin {
                    above: 87,
                    below: 95,
                }),
            ),
            rule(
                &["gyrB"],
                non_synonymous_and(Predicate::CodonEndWithin {
                    above: 445,
                    below: 508,
                }),
            ),
            rule(
                &["ethA", "katG"],
                Predicate::Any {
                    predicates: vec![annotation_in(&[NON_SYNONYMOUS]), synonymous_start_codon()],
                },
            ),
            rule(
                &["eis", "eis upstream", "pncA", "pncA upstream"],
                Predicate::Any {
                    predicates: vec![
                        annotation_in(&[NON_SYNONYMOUS, NON_CODING]),
                        synonymous_start_codon(),
                    ],
                },
            ),
            rule(
                &["rrs"],
                Predicate::NucleotideContains {
                    values: strings(&["1401", "1402", "1484"]),
                },
            ),
            rule(
                &["fabG1", "fabG1 upstream"],
                Predicate::Any {
                    predicates: vec![
                        Predicate::NucleotideContains {
                            values: strings(&["c.-17", "c.-15", "c.-8"]),
                        },
                        Predicate::CodonIs {
                            value: String::from("203"),
                        },
                    ],
                },
            ),
            rule(
                &["rpoB"],
                Predicate::Any {
                    predicates: vec![
                        non_synonymous_and(Predicate::CodonContains {
                            values: strings(&["170"]),
                        }),
                        Predicate::PointWithin {
                            above: 425,
                            below: 453,
                        },
                        non_synonymous_and(Predicate::CodonContains {
                            values: strings(&["491"]),
                        }),
                        non_synonymous_and(Predicate::RangeSpans { value: 170 }),
                        Predicate::RangeEndWithin {
                            above: 426,
                            below: 453,
                        },
                        Predicate::RangeCovers {
                            start_below: 426,
                            end_above: 452,
                        },
                        non_synonymous_and(Predicate::RangeSpans { value: 491 }),
                    ],
                },
            ),
        ];
        Self { rules }
    }
}

impl Registry {
    /// Load rules from a YAML file.
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let yaml = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&yaml)?)
    }

    /// Whether any rule for the line's gene accepts the line.
    pub fn accepts(&self, line: &ReportLine) -> Result<bool, Error> {
        for rule in self.rules.iter().filter(|r| r.applies_to(&line.gene_name)) {
            if rule.predicate.matches(line)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
