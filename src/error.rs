//! Error types shared by the loaders and the two engines.

/// Errors raised while loading inputs or resolving records.
///
/// Everything in here halts the run.  Lookup misses (a gene without registered locus, a region
/// without coverage summary) are not errors and are expressed as `Option` instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed coordinate text, unparsable numeric or malformed annotation block.
    #[error("malformed {what}: {value:?}")]
    DataFormat { what: String, value: String },

    /// A required column or field is absent.
    #[error("missing column {0:?}")]
    MissingColumn(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed delimited input, including values that do not deserialize.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Malformed rules file.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Construct a new `Error::DataFormat`.
    pub fn data_format<W, V>(what: W, value: V) -> Self
    where
        W: Into<String>,
        V: Into<String>,
    {
        Error::DataFormat {
            what: what.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    #[test]
    fn data_format_display() {
        let err = super::Error::data_format("HGVS.c", "c.");
        assert_eq!(format!("{}", err), "malformed HGVS.c: \"c.\"");
    }

    #[test]
    fn missing_column_display() {
        let err = super::Error::MissingColumn(String::from("ANN"));
        assert_eq!(format!("{}", err), "missing column \"ANN\"");
    }
}
