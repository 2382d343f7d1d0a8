//! Annotation of sequence variants and detection of large deletions.

pub mod seqvars;
pub mod strucvars;
