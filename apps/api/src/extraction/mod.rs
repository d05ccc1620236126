//! Document text extraction: format sniffing, quality gating and the
//! strategy cascade that turns uploaded bytes into trusted text.

pub mod cascade;
pub mod embedded;
pub mod ocr;
pub mod office;
pub mod quality;
pub mod sniff;
pub mod vision;
