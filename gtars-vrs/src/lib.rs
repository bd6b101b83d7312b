//! # GA4GH VRS objects, digests and translation
//!
//! This crate provides the variation-domain machinery used by `gtars-anyvar`:
//!
//! - VRS data models (Allele, SequenceLocation, Text, ...)
//! - VRS digest computation (canonical JSON serialization + SHA-512/24u)
//! - Allele normalization (port of bioutils `normalize()`)
//! - Reference sequence access (`DataProxy`, `SequenceRepository`)
//! - Format translation from HGVS, SPDI, beacon and gnomAD expressions

pub mod models;
pub mod digest;
pub mod normalize;
pub mod dataproxy;
pub mod translator;
pub mod errors;

pub use models::{Allele, AlleleState, ObjectRef, SequenceLocation, SequenceReference, Text, VrsObject};
pub use digest::{allele_digest, allele_identifier, ga4gh_identify, sequence_location_digest, sha512t24u};
pub use normalize::normalize;
pub use dataproxy::{DataProxy, SequenceMetadata, SequenceRepository};
pub use translator::{FormatTranslator, Translator, TranslatorBuilder, identify_allele};
pub use errors::{VrsError, VrsResult};
