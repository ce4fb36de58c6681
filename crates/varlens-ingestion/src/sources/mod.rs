//! Remote annotation sources.
//!
//! - `annotation`: local variant-annotation service (JSON over HTTP)
//! - `omim`: OMIM entry API (XML)

pub mod annotation;
pub mod omim;

pub use annotation::{decode_envelope, picked_consequence, AnnotationClient, DEFAULT_ANNOTATION_URL};
pub use omim::{phenotype_map, phenotypes_to_markdown, text_section, OmimClient, PhenotypeMapEntry, OMIM_ENTRY_URL};
