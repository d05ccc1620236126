//! Line-oriented résumé parsing: section segmentation, typed field
//! extraction, and the per-section entry parsers that feed the builder.

pub mod builder;
pub mod education;
pub mod experience;
pub mod fields;
pub mod lexicon;
pub mod projects;
pub mod sections;
pub mod skills;
