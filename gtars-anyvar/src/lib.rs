//! # Translate, identify and register GA4GH VRS variation objects
//!
//! `gtars-anyvar` is a registrar over three collaborators: a
//! [`FormatTranslator`](gtars_vrs::FormatTranslator) turning beacon, HGVS,
//! gnomAD and SPDI expressions into VRS Alleles, the
//! [`DataProxy`](gtars_vrs::DataProxy) it resolves reference sequences with,
//! and an [`ObjectStore`](store::ObjectStore) holding registered objects under
//! their content-derived GA4GH identifiers.
//!
//! Objects are stored flattened: nested objects (an Allele's location) are
//! registered on their own and referenced by identifier, and re-inlined on
//! retrieval when expansion is requested.

pub mod anyvar;
pub mod consts;
pub mod enref;
pub mod errors;
pub mod format;
pub mod store;
pub mod utils;

pub use anyvar::{AnyVar, AnyVarBuilder};
pub use errors::{AnyVarError, AnyVarResult, StoreError, StoreResult};
pub use format::{Definition, Format};
