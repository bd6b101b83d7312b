//! Reference sequence access for translation.
//!
//! [`DataProxy`] is the narrow interface the translator needs: fetch
//! (sub)sequences, fetch sequence metadata, and translate between sequence
//! identifier namespaces. [`SequenceRepository`] implements it over
//! sequences held in memory, optionally loaded from a directory:
//!
//! ```text
//! <root>/
//!   *.fa | *.fasta | *.fna      (optionally .gz) FASTA records
//!   aliases/<namespace>.tsv     alias<TAB>target, target is a record name or SQ. digest
//! ```
//!
//! The first word of a FASTA header is the record name. A `CDS=<start>..<end>`
//! token (1-based, inclusive) in the header description annotates the coding
//! region of a transcript.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use log::{debug, info, warn};

use crate::digest::sha512t24u;
use crate::errors::{VrsError, VrsResult};

/// Namespaces whose aliases are plain record names, so an unregistered
/// `refseq:NM_000551.3` still resolves to the record `NM_000551.3`.
const NAME_NAMESPACES: [&str; 3] = ["refseq", "ncbi", "ensembl"];

const FASTA_EXTENSIONS: [&str; 3] = ["fa", "fasta", "fna"];

/// Subdirectory of a repository root holding alias TSV files.
pub const ALIASES_SUBDIR: &str = "aliases";

/// Metadata for a single reference sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceMetadata {
    /// Name of the record the sequence was loaded from.
    pub name: String,
    pub length: u64,
    /// Every identifier of the sequence, as `namespace:alias`.
    pub aliases: Vec<String>,
    /// Coding region as a 0-based interbase `(start, end)`, for transcripts.
    pub cds: Option<(u64, u64)>,
}

/// Answers the sequence and accession queries needed during translation.
pub trait DataProxy {
    /// Return the sequence (or the `[start, end)` slice of it) for an identifier.
    fn get_sequence(&self, identifier: &str, start: Option<u64>, end: Option<u64>) -> VrsResult<String>;

    fn get_metadata(&self, identifier: &str) -> VrsResult<SequenceMetadata>;

    /// Return all identifiers of the sequence, optionally restricted to one namespace.
    fn translate_sequence_identifier(
        &self,
        identifier: &str,
        namespace: Option<&str>,
    ) -> VrsResult<Vec<String>>;
}

impl<P: DataProxy + ?Sized> DataProxy for &P {
    fn get_sequence(&self, identifier: &str, start: Option<u64>, end: Option<u64>) -> VrsResult<String> {
        (**self).get_sequence(identifier, start, end)
    }

    fn get_metadata(&self, identifier: &str) -> VrsResult<SequenceMetadata> {
        (**self).get_metadata(identifier)
    }

    fn translate_sequence_identifier(
        &self,
        identifier: &str,
        namespace: Option<&str>,
    ) -> VrsResult<Vec<String>> {
        (**self).translate_sequence_identifier(identifier, namespace)
    }
}

impl<P: DataProxy + ?Sized> DataProxy for Box<P> {
    fn get_sequence(&self, identifier: &str, start: Option<u64>, end: Option<u64>) -> VrsResult<String> {
        (**self).get_sequence(identifier, start, end)
    }

    fn get_metadata(&self, identifier: &str) -> VrsResult<SequenceMetadata> {
        (**self).get_metadata(identifier)
    }

    fn translate_sequence_identifier(
        &self,
        identifier: &str,
        namespace: Option<&str>,
    ) -> VrsResult<Vec<String>> {
        (**self).translate_sequence_identifier(identifier, namespace)
    }
}

#[derive(Debug)]
struct StoredSequence {
    name: String,
    digest: String,
    cds: Option<(u64, u64)>,
    sequence: Vec<u8>,
}

/// Parse a FASTA header line (without the leading '>') into name and description.
pub fn parse_fasta_header(header: &str) -> (String, Option<String>) {
    let header = header.trim();
    match header.split_once(char::is_whitespace) {
        Some((id, desc)) => (id.to_string(), Some(desc.trim().to_string())),
        None => (header.to_string(), None),
    }
}

/// Find a `CDS=<start>..<end>` annotation in a header description and
/// convert it to a 0-based interbase interval.
fn parse_cds(description: &str) -> Option<(u64, u64)> {
    description.split_whitespace().find_map(|token| {
        let range = token.strip_prefix("CDS=")?;
        let (start, end) = range.split_once("..")?;
        let start: u64 = start.parse().ok()?;
        let end: u64 = end.parse().ok()?;
        (start >= 1 && end >= start).then(|| (start - 1, end))
    })
}

fn is_fasta_path(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(name);
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| FASTA_EXTENSIONS.contains(&ext))
}

/// Gzip member header magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a file for reading, decompressing it when its content starts with the
/// gzip magic bytes, whatever its extension.
fn open_maybe_gzipped(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let is_gzipped = reader
        .fill_buf()
        .with_context(|| format!("Failed to read {}", path.display()))?
        .starts_with(&GZIP_MAGIC);
    if is_gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// In-memory sequence repository with namespaced aliases.
#[derive(Debug, Default)]
pub struct SequenceRepository {
    root_dir: Option<PathBuf>,
    sequences: Vec<StoredSequence>,
    by_digest: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    /// namespace -> { alias -> sequence index }
    aliases: HashMap<String, HashMap<String, usize>>,
}

impl SequenceRepository {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load every FASTA file in `root_dir` and every alias file in
    /// `root_dir/aliases`.
    pub fn open<P: AsRef<Path>>(root_dir: P) -> Result<Self> {
        let root_dir = root_dir.as_ref();
        if !root_dir.is_dir() {
            anyhow::bail!("Sequence repository directory not found: {}", root_dir.display());
        }

        let mut repo = SequenceRepository {
            root_dir: Some(root_dir.to_path_buf()),
            ..Default::default()
        };

        let mut fasta_paths: Vec<PathBuf> = fs::read_dir(root_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_fasta_path(path))
            .collect();
        fasta_paths.sort();
        for path in &fasta_paths {
            let n = repo.add_fasta(path)?;
            debug!("Loaded {} sequences from {}", n, path.display());
        }

        let alias_dir = root_dir.join(ALIASES_SUBDIR);
        if alias_dir.is_dir() {
            let mut alias_paths: Vec<PathBuf> = fs::read_dir(&alias_dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("tsv"))
                .collect();
            alias_paths.sort();
            for path in &alias_paths {
                let namespace = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .context("Invalid alias filename")?
                    .to_string();
                repo.load_aliases_tsv(&namespace, path)?;
            }
        }

        if repo.is_empty() {
            warn!("No sequences found in {}", root_dir.display());
        } else {
            info!(
                "Opened sequence repository at {} ({} sequences)",
                root_dir.display(),
                repo.len()
            );
        }
        Ok(repo)
    }

    pub fn root_dir(&self) -> Option<&Path> {
        self.root_dir.as_deref()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Add a sequence under `name`, returning its `SQ.` accession.
    ///
    /// The sequence is uppercased before digesting, so the accession matches
    /// the refget digest of the same FASTA record.
    pub fn add_sequence(&mut self, name: &str, description: Option<&str>, sequence: &[u8]) -> String {
        let sequence: Vec<u8> = sequence.iter().map(|b| b.to_ascii_uppercase()).collect();
        let digest = sha512t24u(&sequence);
        let index = match self.by_digest.get(&digest) {
            Some(&index) => index,
            None => {
                self.sequences.push(StoredSequence {
                    name: name.to_string(),
                    digest: digest.clone(),
                    cds: description.and_then(parse_cds),
                    sequence,
                });
                self.by_digest.insert(digest.clone(), self.sequences.len() - 1);
                self.sequences.len() - 1
            }
        };
        self.by_name.insert(name.to_string(), index);
        format!("SQ.{}", digest)
    }

    /// Register `namespace:alias` for the sequence identified by `target`.
    pub fn add_alias(&mut self, namespace: &str, alias: &str, target: &str) -> VrsResult<()> {
        let index = self.lookup(target)?;
        self.aliases
            .entry(namespace.to_string())
            .or_default()
            .insert(alias.to_string(), index);
        Ok(())
    }

    /// Read FASTA records from any reader.
    pub fn load_fasta_reader<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut count = 0;
        let mut header: Option<(String, Option<String>)> = None;
        let mut sequence: Vec<u8> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end();
            if let Some(h) = line.strip_prefix('>') {
                if let Some((name, desc)) = header.take() {
                    self.add_sequence(&name, desc.as_deref(), &sequence);
                    count += 1;
                }
                header = Some(parse_fasta_header(h));
                sequence.clear();
            } else if !line.is_empty() {
                if header.is_none() {
                    anyhow::bail!("FASTA sequence data found before the first header");
                }
                sequence.extend_from_slice(line.as_bytes());
            }
        }
        if let Some((name, desc)) = header {
            self.add_sequence(&name, desc.as_deref(), &sequence);
            count += 1;
        }
        Ok(count)
    }

    /// Load a (possibly gzipped) FASTA file.
    pub fn add_fasta<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let reader = open_maybe_gzipped(path)?;
        self.load_fasta_reader(reader)
            .with_context(|| format!("Failed to read FASTA {}", path.display()))
    }

    /// Load aliases from a TSV file into a namespace.
    /// Format: alias\ttarget per line. Lines starting with '#' are comments.
    pub fn load_aliases_tsv<P: AsRef<Path>>(&mut self, namespace: &str, path: P) -> Result<usize> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path).with_context(|| {
            format!("Failed to open alias file {}", path.display())
        })?);
        let mut count = 0;
        let mut skipped = 0;
        for line in reader.lines() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if let Some((alias, target)) = line.split_once('\t') {
                match self.add_alias(namespace, alias.trim(), target.trim()) {
                    Ok(()) => count += 1,
                    Err(_) => skipped += 1,
                }
            }
        }
        if skipped > 0 {
            warn!(
                "{}: skipped {} aliases pointing at unknown sequences",
                path.display(),
                skipped
            );
        }
        Ok(count)
    }

    fn lookup(&self, identifier: &str) -> VrsResult<usize> {
        let not_found = || VrsError::SequenceNotFound(identifier.to_string());
        let unprefixed = identifier.strip_prefix("ga4gh:").unwrap_or(identifier);
        if let Some(digest) = unprefixed.strip_prefix("SQ.") {
            return self.by_digest.get(digest).copied().ok_or_else(not_found);
        }

        match identifier.split_once(':') {
            Some((namespace, alias)) => self
                .aliases
                .get(namespace)
                .and_then(|ns| ns.get(alias))
                .or_else(|| {
                    NAME_NAMESPACES
                        .contains(&namespace)
                        .then(|| self.by_name.get(alias))
                        .flatten()
                })
                .copied()
                .ok_or_else(not_found),
            None => self.by_name.get(identifier).copied().ok_or_else(not_found),
        }
    }

    fn record(&self, identifier: &str) -> VrsResult<&StoredSequence> {
        Ok(&self.sequences[self.lookup(identifier)?])
    }

    fn aliases_of(&self, index: usize) -> Vec<String> {
        let record = &self.sequences[index];
        let mut aliases = vec![format!("ga4gh:SQ.{}", record.digest)];
        let mut namespaced: Vec<String> = self
            .aliases
            .iter()
            .flat_map(|(namespace, ns)| {
                ns.iter()
                    .filter(move |(_, i)| **i == index)
                    .map(move |(alias, _)| format!("{}:{}", namespace, alias))
            })
            .collect();
        namespaced.sort();
        aliases.extend(namespaced);
        aliases
    }
}

impl DataProxy for SequenceRepository {
    fn get_sequence(&self, identifier: &str, start: Option<u64>, end: Option<u64>) -> VrsResult<String> {
        let record = self.record(identifier)?;
        let length = record.sequence.len() as u64;
        let start = start.unwrap_or(0);
        let end = end.unwrap_or(length);
        if start > end || end > length {
            return Err(VrsError::OutOfRange {
                identifier: identifier.to_string(),
                start,
                end,
                length,
            });
        }
        let slice = &record.sequence[start as usize..end as usize];
        Ok(String::from_utf8_lossy(slice).into_owned())
    }

    fn get_metadata(&self, identifier: &str) -> VrsResult<SequenceMetadata> {
        let index = self.lookup(identifier)?;
        let record = &self.sequences[index];
        Ok(SequenceMetadata {
            name: record.name.clone(),
            length: record.sequence.len() as u64,
            aliases: self.aliases_of(index),
            cds: record.cds,
        })
    }

    fn translate_sequence_identifier(
        &self,
        identifier: &str,
        namespace: Option<&str>,
    ) -> VrsResult<Vec<String>> {
        let aliases = self.aliases_of(self.lookup(identifier)?);
        Ok(match namespace {
            Some(ns) => aliases
                .into_iter()
                .filter(|a| a.split_once(':').is_some_and(|(n, _)| n == ns))
                .collect(),
            None => aliases,
        })
    }
}
