//! Input normalisation.
//!
//! - `GenomicPosition`: parses `chr-position-ref-alt` descriptors
//! - `GenomeBuild`: hg19 / hg38 reference tags

pub mod position;

pub use position::{GenomeBuild, GenomicPosition};
