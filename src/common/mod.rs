//! Commonly used code.
//!
//! Holds the coordinate vocabulary shared by the annotation resolver and the deletion detector.

use std::str::FromStr;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use nom::{
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt, recognize},
    sequence::preceded,
    IResult, Parser as _,
};

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug, Default)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// Text written for values that do not apply.
pub const NA: &str = "NA";

/// A 1-based coordinate or inclusive coordinate range, written as `a` or `a-b`.
///
/// Coordinates may be negative, e.g., for positions upstream of a CDS start, so `-20--18` is a
/// valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Span {
    Point(i32),
    Range(i32, i32),
}

impl Span {
    /// First coordinate of the span.
    pub fn start(&self) -> i32 {
        match self {
            Span::Point(pos) => *pos,
            Span::Range(start, _) => *start,
        }
    }

    /// Last coordinate of the span.
    pub fn end(&self) -> i32 {
        match self {
            Span::Point(pos) => *pos,
            Span::Range(_, end) => *end,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Span::Range(..))
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Span::Point(pos) => write!(f, "{}", pos),
            Span::Range(start, end) => write!(f, "{}-{}", start, end),
        }
    }
}

/// Parse a signed decimal integer such as `12` or `-15`.
pub(crate) fn parse_signed(input: &str) -> IResult<&str, i32> {
    map_res(recognize((opt(char('-')), digit1)), |s: &str| {
        s.parse::<i32>()
    })
    .parse(input)
}

impl FromStr for Span {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming((parse_signed, opt(preceded(char('-'), parse_signed))))
            .parse(s)
            .map(|(_, (start, end))| match end {
                Some(end) => Span::Range(start, end),
                None => Span::Point(start),
            })
            .map_err(|_| crate::error::Error::data_format("coordinate", s))
    }
}

/// Helper for serializing `Option<T>` where `"NA"` encodes `None`.
///
/// cf. https://github.com/serde-rs/serde/issues/1316#issue-332908452
pub mod na {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(value) => serializer.collect_str(value),
            None => serializer.collect_str(super::NA),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == super::NA {
            Ok(None)
        } else {
            s.parse().map(Some).map_err(de::Error::custom)
        }
    }
}

/// Helper for writing percentages with two decimals.
pub mod percent {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&format_args!("{:.2}", value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

/// The version of `varpipe` package.
#[cfg(not(test))]
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// This allows us to override the version to `0.0.0` in tests.
pub fn version() -> &'static str {
    #[cfg(test)]
    return "0.0.0";
    #[cfg(not(test))]
    return VERSION;
}

#[macro_export]
macro_rules! set_snapshot_suffix {
    ($($expr:expr),*) => {
        let mut settings = insta::Settings::clone_current();
        settings.set_snapshot_suffix(format!($($expr,)*));
        let _guard = settings.bind_to_scope();
    }
}

pub use set_snapshot_suffix;
