//! Reading of raw snpEff-annotated VCF body lines.
//!
//! Only the single-sample layout written by Mutect2 is supported.  The `FORMAT` column itself is
//! ignored; the sample values are assigned to a fixed key list chosen by their count.

use indexmap::IndexMap;

use crate::error::Error;

/// Sample keys used when the sample column has exactly 8 values.
pub const FORMAT_SHORT_KEYS: &[&str] = &["GT", "AD", "AF", "DP", "F1R2", "F2R1", "FAD", "SB"];

/// Sample keys used otherwise.
pub const FORMAT_EXTENDED_KEYS: &[&str] = &[
    "GT", "AD", "AF", "DP", "F1R2", "F2R1", "FAD", "PGT", "PID", "PS", "SB",
];

/// Minimal number of tab-separated columns of a usable body line.
const MIN_COLUMNS: usize = 10;

/// The fields of one VCF body line needed for resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct VcfLine<'a> {
    pub chrom: &'a str,
    pub pos: &'a str,
    pub reference: &'a str,
    pub alternative: &'a str,
    pub filter: &'a str,
    /// `key=value` entries of `INFO`, flags are skipped.
    pub info: IndexMap<&'a str, &'a str>,
    /// Sample values keyed by `FORMAT_SHORT_KEYS` or `FORMAT_EXTENDED_KEYS`.
    pub sample: IndexMap<&'static str, &'a str>,
}

impl<'a> VcfLine<'a> {
    /// Split a body line; header lines and lines with too few columns give `None`.
    pub fn parse(line: &'a str) -> Option<Self> {
        if line.starts_with('#') {
            return None;
        }
        let columns = line.trim_end_matches(['\r', '\n']).split('\t').collect::<Vec<_>>();
        if columns.len() < MIN_COLUMNS {
            return None;
        }

        Some(Self {
            chrom: columns[0],
            pos: columns[1],
            reference: columns[3],
            alternative: columns[4],
            filter: columns[6],
            info: parse_info(columns[7]),
            sample: parse_sample(columns[9]),
        })
    }

    /// Read depth, the smaller of the sample and the `INFO` depth.
    pub fn read_depth(&self) -> Result<u32, Error> {
        let sample_dp = self.sample.get("DP").copied().unwrap_or_default();
        let sample_dp = sample_dp
            .parse::<u32>()
            .map_err(|_| Error::data_format("sample DP", sample_dp))?;
        match self.info.get("DP") {
            Some(info_dp) => {
                let info_dp = info_dp
                    .parse::<u32>()
                    .map_err(|_| Error::data_format("INFO DP", *info_dp))?;
                Ok(sample_dp.min(info_dp))
            }
            None => Ok(sample_dp),
        }
    }

    /// Allele frequency from the sample column.
    pub fn allele_frequency(&self) -> Result<f64, Error> {
        let af = self.sample.get("AF").copied().unwrap_or_default();
        af.parse().map_err(|_| Error::data_format("sample AF", af))
    }

    /// Value of the `ANN` entry in `INFO`.
    pub fn ann(&self) -> Result<&'a str, Error> {
        self.info
            .get("ANN")
            .copied()
            .ok_or_else(|| Error::MissingColumn(String::from("INFO/ANN")))
    }
}

fn parse_info(info: &str) -> IndexMap<&str, &str> {
    info.split(';')
        .filter_map(|entry| entry.split_once('='))
        .collect()
}

fn parse_sample(sample: &str) -> IndexMap<&'static str, &str> {
    let values = sample.split(':').collect::<Vec<_>>();
    let keys = if values.len() == FORMAT_SHORT_KEYS.len() {
        FORMAT_SHORT_KEYS
    } else {
        FORMAT_EXTENDED_KEYS
    };
    keys.iter().copied().zip(values).collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    const LINE: &str = "NC_000962.3\t761155\t.\tC\tT\t.\tPASS\tDP=52;ECNT=1;STR;\
    ANN=T|missense_variant|MODERATE|rpoB|Rv0667|transcript|Rv0667|protein_coding|1/1|c.1349C>T\
    |p.Ser450Leu|1349/3519|1349/3519|450/1172||\tGT:AD:AF:DP:F1R2:F2R1:FAD:SB\
    \t0/1:0,50:0.981:50:0,24:0,26:0,49:0,0,24,26";

    #[test]
    fn parse_short_sample() -> Result<(), anyhow::Error> {
        let line = VcfLine::parse(LINE).ok_or_else(|| anyhow::anyhow!("no line"))?;

        assert_eq!(line.chrom, "NC_000962.3");
        assert_eq!(line.pos, "761155");
        assert_eq!(line.reference, "C");
        assert_eq!(line.alternative, "T");
        assert_eq!(line.filter, "PASS");
        assert_eq!(line.info.get("ECNT"), Some(&"1"));
        assert_eq!(line.info.get("STR"), None);
        assert_eq!(line.sample.get("AF"), Some(&"0.981"));
        assert_eq!(line.sample.get("SB"), Some(&"0,0,24,26"));
        assert_eq!(line.read_depth()?, 50);
        assert_eq!(line.allele_frequency()?, 0.981);
        assert!(line.ann()?.starts_with("T|missense_variant"));

        Ok(())
    }

    #[test]
    fn parse_extended_sample() -> Result<(), anyhow::Error> {
        let text = "NC_000962.3\t7570\t.\tC\tT\t.\tPASS\tDP=30\tGT:AD:AF:DP:F1R2:F2R1:FAD:PGT:PID:PS:SB\
        \t0|1:0,44:0.97:44:0,20:0,24:0,40:0|1:7570_C_T:7570:0,0,20,24";
        let line = VcfLine::parse(text).ok_or_else(|| anyhow::anyhow!("no line"))?;

        assert_eq!(line.sample.get("PS"), Some(&"7570"));
        assert_eq!(line.sample.get("SB"), Some(&"0,0,20,24"));
        // INFO depth is lower
        assert_eq!(line.read_depth()?, 30);
        assert!(line.ann().is_err());

        Ok(())
    }

    #[rstest::rstest]
    #[case("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tsample")]
    #[case("##fileformat=VCFv4.2")]
    #[case("NC_000962.3\t7570\t.\tC\tT\t.\tPASS\tDP=30\tGT:AF:DP")]
    fn parse_skipped(#[case] text: &str) {
        assert_eq!(VcfLine::parse(text), None);
    }

    #[test]
    fn read_depth_malformed() -> Result<(), anyhow::Error> {
        let text = "NC_000962.3\t7570\t.\tC\tT\t.\tPASS\tDP=x\tGT:AD:AF:DP:F1R2:F2R1:FAD:SB\
        \t0/1:0,50:0.98:50:0,24:0,26:0,49:0,0,24,26";
        let line = VcfLine::parse(text).ok_or_else(|| anyhow::anyhow!("no line"))?;
        assert!(line.read_depth().is_err());

        Ok(())
    }
}
