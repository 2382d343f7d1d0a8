//! Extraction of coordinates and residues from snpEff HGVS text.
//!
//! Only the integer runs of `HGVS.c` / `HGVS.p` and the wild type / mutant residue codes around
//! the first codon number are extracted, the notation is not validated beyond that.

use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{char, digit1},
    combinator::{opt, recognize, rest},
    IResult, Parser,
};

use crate::common::Span;
use crate::error::Error;

/// Markers in `HGVS.p` for which no mutant residue is reported.
pub const NON_RESIDUE_MARKERS: &[&str] = &["del", "*", "?", "fs"];

fn signed_run(input: &str) -> IResult<&str, &str> {
    recognize((opt(char('-')), digit1)).parse(input)
}

/// Return all signed integer runs in `text`, left to right.
pub fn integer_runs(text: &str) -> Result<Vec<i32>, Error> {
    let mut result = Vec::new();
    let mut input = text;
    while !input.is_empty() {
        match signed_run(input) {
            Ok((remainder, run)) => {
                result.push(
                    run.parse::<i32>()
                        .map_err(|_| Error::data_format("HGVS position", text))?,
                );
                input = remainder;
            }
            Err(_) => {
                let mut chars = input.chars();
                chars.next();
                input = chars.as_str();
            }
        }
    }
    Ok(result)
}

/// Extract the coordinate span from HGVS text.
///
/// Text containing `_` is in range form and yields the first two integer runs, otherwise the
/// first run is returned.  With `first_only`, the first run is returned in any case.
pub fn span(text: &str, first_only: bool) -> Result<Span, Error> {
    let runs = integer_runs(text)?;
    match runs.as_slice() {
        [] => Err(Error::data_format("HGVS coordinates", text)),
        [start, ..] if first_only || !text.contains('_') => Ok(Span::Point(*start)),
        [start, end, ..] => Ok(Span::Range(*start, *end)),
        [_] => Err(Error::data_format("HGVS coordinate range", text)),
    }
}

/// A protein change `p.<wild type><codon><mutant>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProteinChange<'a> {
    /// Everything between `p.` and the first digit.
    pub wild_type: &'a str,
    /// The first digit run.
    pub codon: &'a str,
    /// Everything after the first digit run.
    pub mutant: &'a str,
}

impl<'a> ProteinChange<'a> {
    fn parse_inner(input: &'a str) -> IResult<&'a str, Self> {
        (
            tag("p."),
            take_till(|c: char| c.is_ascii_digit()),
            digit1,
            rest,
        )
            .map(|(_, wild_type, codon, mutant)| ProteinChange {
                wild_type,
                codon,
                mutant,
            })
            .parse(input)
    }

    /// Split `text` into wild type, codon number and mutant.
    pub fn parse(text: &'a str) -> Result<Self, Error> {
        Self::parse_inner(text)
            .map(|(_, value)| value)
            .map_err(|_| Error::data_format("HGVS.p", text))
    }

    /// Whether wild type and mutant residue codes are identical.
    pub fn is_synonymous(&self) -> bool {
        self.wild_type == self.mutant
    }

    /// Whether either residue code is longer than a single three-letter code.
    pub fn is_multi_residue(&self) -> bool {
        self.wild_type.chars().count() > 3 || self.mutant.chars().count() > 3
    }
}

/// Whether the mutant residue of `hgvs_p` is reportable.
pub fn has_mutant_residue(hgvs_p: &str) -> bool {
    !NON_RESIDUE_MARKERS
        .iter()
        .any(|marker| hgvs_p.contains(marker))
}
