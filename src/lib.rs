//! Varpipe library main entry point.

pub mod annotate;
pub mod common;
pub mod error;
pub mod loci;
pub mod report;
