//! Constants for anyvar configuration and the command line interface.

// Environment variable names

/// Environment variable naming the reference sequence directory.
///
/// When set, this overrides the default location (`/usr/local/share/seqrepo/latest`).
///
/// # Example
///
/// ```bash
/// export SEQREPO_DIR=/data/seqrepo/2024-02-20
/// ```
pub const SEQREPO_DIR_ENV: &str = "SEQREPO_DIR";

/// Environment variable naming the SQLite object store file.
///
/// When set, this overrides the default location (`~/.anyvar/anyvar.sqlite`).
pub const ANYVAR_STORE_ENV: &str = "ANYVAR_STORE";

pub const DEFAULT_SEQREPO_DIR: &str = "/usr/local/share/seqrepo/latest";

/// Folder under the home directory holding the default object store.
pub const DEFAULT_STORE_FOLDER: &str = ".anyvar";

pub const DEFAULT_STORE_FILENAME: &str = "anyvar.sqlite";

// Command-line interface command names

/// Main anyvar command name.
pub const ANYVAR_CMD: &str = "anyvar";

/// Subcommand for translating a definition and printing the object.
pub const ANYVAR_TRANSLATE: &str = "translate";

/// Subcommand for translating and registering a definition.
pub const ANYVAR_REGISTER: &str = "register";

/// Subcommand for retrieving a registered object.
pub const ANYVAR_RETRIEVE: &str = "retrieve";

/// Subcommand for listing the identifiers in a store.
pub const ANYVAR_LIST: &str = "list";

/// Subcommand running the translate/register/retrieve round trip.
pub const ANYVAR_DEMO: &str = "demo";

/// HGVS expression translated by the demo.
pub const DEMO_HGVS: &str = "NM_000551.3:c.1A>T";
