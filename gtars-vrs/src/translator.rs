//! Translation of textual variation expressions into VRS Alleles.
//!
//! Every format is parsed into an intermediate interval on a named sequence,
//! then post-processed the same way: coordinates and any stated reference
//! bases are checked against the reference, the sequence name is resolved to
//! its refget accession, and the allele is optionally normalized and
//! identified.
//!
//! Supported expressions:
//!
//! | format | example |
//! |--------|---------|
//! | beacon | `13 : 32936732 G > C` |
//! | gnomAD | `13-32936732-G-C` |
//! | SPDI   | `NC_000013.11:32936731:1:C` |
//! | HGVS   | `NC_000013.11:g.32936732G>C`, `NM_000551.3:c.1A>T` |

use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;

use crate::dataproxy::DataProxy;
use crate::digest::{allele_identifier, ga4gh_identify};
use crate::errors::{VrsError, VrsResult};
use crate::models::{Allele, ObjectRef, SequenceLocation, VrsObject};
use crate::normalize::normalize;

pub const DEFAULT_ASSEMBLY_NAME: &str = "GRCh38";

static BEACON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<chrom>[^\s:]+)\s*:\s*(?P<pos>\d+)\s*(?P<ref>[ACGTNacgtn]+)\s*>\s*(?P<alt>[ACGTNacgtn]+)\s*$")
        .expect("valid beacon regex")
});

static GNOMAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<chrom>[^-]+)-(?P<pos>\d+)-(?P<ref>[ACGTURYKMSWBDHVN]+)-(?P<alt>[ACGTURYKMSWBDHVN]+)$")
        .expect("valid gnomAD regex")
});

static SPDI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<ds>[^:]+):(?P<pos>\d+):(?P<del>\w*):(?P<ins>\w*)$").expect("valid SPDI regex")
});

static HGVS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<ac>[^:\s]+):(?P<kind>[cgmn])\.(?P<start>[-*]?\d+(?:[+-]\d+)?)(?:_(?P<end>[-*]?\d+(?:[+-]\d+)?))?(?P<edit>.*)$")
        .expect("valid HGVS regex")
});

static HGVS_SUB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<ref>[ACGTN])>(?P<alt>[ACGTN])$").expect("valid regex"));
static HGVS_DELINS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^del(?P<ref>[ACGTN]*)ins(?P<alt>[ACGTN]+)$").expect("valid regex")
});
static HGVS_DEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^del(?P<ref>[ACGTN]*)$").expect("valid regex"));
static HGVS_DUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^dup(?P<ref>[ACGTN]*)$").expect("valid regex"));
static HGVS_INS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ins(?P<alt>[ACGTN]+)$").expect("valid regex"));
static HGVS_IDENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<ref>[ACGTN]*)=$").expect("valid regex"));

/// Converts format-specific definitions into VRS Alleles.
pub trait FormatTranslator {
    fn from_beacon(&self, expr: &str) -> VrsResult<Allele>;
    fn from_gnomad(&self, expr: &str) -> VrsResult<Allele>;
    fn from_hgvs(&self, expr: &str) -> VrsResult<Allele>;
    fn from_spdi(&self, expr: &str) -> VrsResult<Allele>;
}

/// The alternate state of an imported allele before it is resolved against
/// the reference.
#[derive(Debug, Clone, PartialEq)]
enum AltSpec {
    Literal(String),
    /// Two copies of the reference interval (HGVS `dup`).
    Duplicate,
    /// The reference interval itself (HGVS `=`).
    Reference,
}

/// A parsed expression: an interbase interval on a named sequence.
#[derive(Debug, Clone, PartialEq)]
struct ImportedAllele {
    sequence_id: String,
    start: u64,
    end: u64,
    stated_ref: Option<String>,
    alt: AltSpec,
}

/// A 1-based HGVS position, possibly UTR-relative and/or intronic.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HgvsPosition {
    base: i64,
    utr3: bool,
    offset: i64,
}

impl HgvsPosition {
    fn parse(text: &str) -> Option<Self> {
        let (utr3, rest) = match text.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        // a leading '-' is part of the base, a later '+'/'-' starts the offset
        let split = rest
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '+' || *c == '-')
            .map(|(i, _)| i);
        let (base, offset) = match split {
            Some(i) => (&rest[..i], rest[i..].trim_start_matches('+')),
            None => (rest, "0"),
        };
        Some(HgvsPosition {
            base: base.parse().ok()?,
            utr3,
            offset: offset.parse().ok()?,
        })
    }
}

#[derive(Debug, Default)]
pub struct TranslatorBuilder {
    default_assembly_name: Option<String>,
    normalize: Option<bool>,
    identify: Option<bool>,
}

impl TranslatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembly used to qualify bare chromosome names in beacon and gnomAD expressions.
    pub fn with_default_assembly_name(mut self, name: impl Into<String>) -> Self {
        self.default_assembly_name = Some(name.into());
        self
    }

    /// Whether translated alleles are fully-justified normalized (default: true).
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = Some(normalize);
        self
    }

    /// Whether translated alleles get their identifiers filled in (default: true).
    pub fn with_identify(mut self, identify: bool) -> Self {
        self.identify = Some(identify);
        self
    }

    pub fn finish<P: DataProxy>(self, data_proxy: P) -> Translator<P> {
        Translator {
            data_proxy,
            default_assembly_name: self
                .default_assembly_name
                .unwrap_or_else(|| DEFAULT_ASSEMBLY_NAME.to_string()),
            normalize: self.normalize.unwrap_or(true),
            identify: self.identify.unwrap_or(true),
        }
    }
}

/// Translator backed by a [`DataProxy`] for reference lookups.
#[derive(Debug)]
pub struct Translator<P> {
    data_proxy: P,
    default_assembly_name: String,
    normalize: bool,
    identify: bool,
}

impl<P: DataProxy> Translator<P> {
    pub fn new(data_proxy: P) -> Self {
        TranslatorBuilder::new().finish(data_proxy)
    }

    pub fn data_proxy(&self) -> &P {
        &self.data_proxy
    }

    pub fn default_assembly_name(&self) -> &str {
        &self.default_assembly_name
    }

    fn parse_error(format: &'static str, expr: &str) -> VrsError {
        VrsError::ParseError {
            format,
            expression: expr.to_string(),
        }
    }

    /// Shared parsing for `chrom:pos ref>alt` style expressions with a 1-based position.
    fn import_vcf_like(&self, chrom: &str, pos: &str, ref_seq: &str, alt: &str) -> Option<ImportedAllele> {
        let pos: u64 = pos.parse().ok()?;
        let start = pos.checked_sub(1)?;
        Some(ImportedAllele {
            sequence_id: format!("{}:{}", self.default_assembly_name, chrom.trim()),
            start,
            end: start.checked_add(ref_seq.len() as u64)?,
            stated_ref: Some(ref_seq.to_ascii_uppercase()),
            alt: AltSpec::Literal(alt.to_ascii_uppercase()),
        })
    }

    fn import_beacon(&self, expr: &str) -> VrsResult<ImportedAllele> {
        let caps = BEACON_RE
            .captures(expr)
            .ok_or_else(|| Self::parse_error("beacon", expr))?;
        self.import_vcf_like(&caps["chrom"], &caps["pos"], &caps["ref"], &caps["alt"])
            .ok_or_else(|| Self::parse_error("beacon", expr))
    }

    fn import_gnomad(&self, expr: &str) -> VrsResult<ImportedAllele> {
        let caps = GNOMAD_RE
            .captures(expr.trim())
            .ok_or_else(|| Self::parse_error("gnomad", expr))?;
        self.import_vcf_like(&caps["chrom"], &caps["pos"], &caps["ref"], &caps["alt"])
            .ok_or_else(|| Self::parse_error("gnomad", expr))
    }

    fn import_spdi(&self, expr: &str) -> VrsResult<ImportedAllele> {
        let caps = SPDI_RE
            .captures(expr.trim())
            .ok_or_else(|| Self::parse_error("spdi", expr))?;
        let start: u64 = caps["pos"]
            .parse()
            .map_err(|_| Self::parse_error("spdi", expr))?;
        let deletion = &caps["del"];
        // the deletion is either a length or the deleted bases
        let (del_len, stated_ref) =
            if !deletion.is_empty() && deletion.bytes().all(|b| b.is_ascii_digit()) {
                let n = deletion
                    .parse::<u64>()
                    .map_err(|_| Self::parse_error("spdi", expr))?;
                (n, None)
            } else {
                (deletion.len() as u64, Some(deletion.to_ascii_uppercase()))
            };
        let end = start
            .checked_add(del_len)
            .ok_or_else(|| Self::parse_error("spdi", expr))?;
        Ok(ImportedAllele {
            sequence_id: caps["ds"].to_string(),
            start,
            end,
            stated_ref,
            alt: AltSpec::Literal(caps["ins"].to_ascii_uppercase()),
        })
    }

    /// Convert a 1-based HGVS position to the 0-based index of that base.
    fn hgvs_index(
        &self,
        kind: &str,
        pos: HgvsPosition,
        cds: Option<(u64, u64)>,
        expr: &str,
    ) -> VrsResult<u64> {
        if pos.offset != 0 {
            return Err(VrsError::UnsupportedVariant(format!(
                "intronic HGVS positions are not supported ({})",
                expr
            )));
        }
        let out_of_range = || Self::parse_error("hgvs", expr);
        if kind != "c" {
            if pos.utr3 || pos.base < 1 {
                return Err(out_of_range());
            }
            return Ok(pos.base as u64 - 1);
        }

        let (cds_start, cds_end) = cds.unwrap_or((0, 0));
        let (anchor, shift) = if pos.utr3 {
            if cds.is_none() {
                return Err(VrsError::UnsupportedVariant(format!(
                    "3' UTR position without a CDS annotation ({})",
                    expr
                )));
            }
            (cds_end, pos.base.checked_sub(1))
        } else if pos.base > 0 {
            (cds_start, pos.base.checked_sub(1))
        } else if pos.base < 0 {
            (cds_start, Some(pos.base))
        } else {
            return Err(out_of_range());
        };
        i64::try_from(anchor)
            .ok()
            .zip(shift)
            .and_then(|(anchor, shift)| anchor.checked_add(shift))
            .and_then(|index| u64::try_from(index).ok())
            .ok_or_else(out_of_range)
    }

    fn import_hgvs(&self, expr: &str) -> VrsResult<ImportedAllele> {
        let expr = expr.trim();
        if let Some((_, posedit)) = expr.rsplit_once(':') {
            if posedit.starts_with("p.") || posedit.starts_with("r.") {
                return Err(VrsError::UnsupportedVariant(format!(
                    "protein and RNA HGVS expressions are not supported ({})",
                    expr
                )));
            }
        }
        let caps = HGVS_RE
            .captures(expr)
            .ok_or_else(|| Self::parse_error("hgvs", expr))?;
        let accession = &caps["ac"];
        let kind = &caps["kind"];

        let start_pos =
            HgvsPosition::parse(&caps["start"]).ok_or_else(|| Self::parse_error("hgvs", expr))?;
        let end_pos = match caps.name("end") {
            Some(end) => {
                HgvsPosition::parse(end.as_str()).ok_or_else(|| Self::parse_error("hgvs", expr))?
            }
            None => start_pos,
        };

        let cds = if kind == "c" {
            let cds = self.data_proxy.get_metadata(accession)?.cds;
            if cds.is_none() {
                warn!(
                    "{} has no CDS annotation; c. positions are taken relative to the sequence start",
                    accession
                );
            }
            cds
        } else {
            None
        };

        let first = self.hgvs_index(kind, start_pos, cds, expr)?;
        let last = self.hgvs_index(kind, end_pos, cds, expr)?;
        if last < first {
            return Err(Self::parse_error("hgvs", expr));
        }
        // interval covering both named bases
        let (start, end) = (first, last + 1);

        let edit = &caps["edit"];
        let stated = |r: &str| (!r.is_empty()).then(|| r.to_string());
        let (start, end, stated_ref, alt) = if let Some(c) = HGVS_SUB_RE.captures(edit) {
            (start, end, stated(&c["ref"]), AltSpec::Literal(c["alt"].to_string()))
        } else if let Some(c) = HGVS_DELINS_RE.captures(edit) {
            (start, end, stated(&c["ref"]), AltSpec::Literal(c["alt"].to_string()))
        } else if let Some(c) = HGVS_DEL_RE.captures(edit) {
            (start, end, stated(&c["ref"]), AltSpec::Literal(String::new()))
        } else if let Some(c) = HGVS_DUP_RE.captures(edit) {
            (start, end, stated(&c["ref"]), AltSpec::Duplicate)
        } else if let Some(c) = HGVS_INS_RE.captures(edit) {
            // inserted between the two flanking bases, which must be adjacent
            if last != first + 1 {
                return Err(Self::parse_error("hgvs", expr));
            }
            (last, last, None, AltSpec::Literal(c["alt"].to_string()))
        } else if let Some(c) = HGVS_IDENTITY_RE.captures(edit) {
            (start, end, stated(&c["ref"]), AltSpec::Reference)
        } else {
            return Err(VrsError::UnsupportedVariant(format!(
                "unsupported HGVS edit '{}' ({})",
                edit, expr
            )));
        };

        Ok(ImportedAllele {
            sequence_id: accession.to_string(),
            start,
            end,
            stated_ref,
            alt,
        })
    }

    /// Resolve an imported allele against the reference and build the VRS Allele.
    fn post_process(&self, imported: ImportedAllele) -> VrsResult<Allele> {
        let ImportedAllele {
            sequence_id,
            start,
            end,
            stated_ref,
            alt,
        } = imported;

        let reference = self.data_proxy.get_sequence(&sequence_id, None, None)?;
        let length = reference.len() as u64;
        if start > end || end > length {
            return Err(VrsError::OutOfRange {
                identifier: sequence_id,
                start,
                end,
                length,
            });
        }
        let ref_seq = &reference[start as usize..end as usize];
        if let Some(expected) = stated_ref {
            if !expected.eq_ignore_ascii_case(ref_seq) {
                return Err(VrsError::ReferenceMismatch {
                    identifier: sequence_id,
                    start,
                    end,
                    expected,
                    found: ref_seq.to_string(),
                });
            }
        }
        let alt = match alt {
            AltSpec::Literal(seq) => seq,
            AltSpec::Duplicate => ref_seq.repeat(2),
            AltSpec::Reference => ref_seq.to_string(),
        };

        let accession = self
            .data_proxy
            .translate_sequence_identifier(&sequence_id, Some("ga4gh"))?
            .into_iter()
            .next()
            .ok_or_else(|| VrsError::SequenceNotFound(sequence_id.clone()))?;
        let accession = accession.trim_start_matches("ga4gh:").to_string();

        let (start, end, alt) = if self.normalize && alt != ref_seq {
            let norm = normalize(reference.as_bytes(), start, ref_seq.as_bytes(), alt.as_bytes())?;
            let allele = String::from_utf8_lossy(&norm.allele).into_owned();
            (norm.start, norm.end, allele)
        } else {
            (start, end, alt)
        };

        let mut allele = Allele::literal(accession, start, end, alt);
        if self.identify {
            identify_allele(&mut allele)?;
        }
        debug!(
            "Translated {}:{}-{} to {:?}",
            sequence_id, start, end, allele.id
        );
        Ok(allele)
    }
}

/// Fill in the identifiers of an Allele and its inline location.
pub fn identify_allele(allele: &mut Allele) -> VrsResult<()> {
    if let ObjectRef::Inline(location) = &mut allele.location {
        let location: &mut SequenceLocation = location;
        let id = ga4gh_identify(&VrsObject::SequenceLocation(location.clone()))?;
        location.id = Some(id);
    }
    allele.id = Some(allele_identifier(allele)?);
    Ok(())
}

impl<P: DataProxy> FormatTranslator for Translator<P> {
    fn from_beacon(&self, expr: &str) -> VrsResult<Allele> {
        let imported = self.import_beacon(expr)?;
        self.post_process(imported)
    }

    fn from_gnomad(&self, expr: &str) -> VrsResult<Allele> {
        let imported = self.import_gnomad(expr)?;
        self.post_process(imported)
    }

    fn from_hgvs(&self, expr: &str) -> VrsResult<Allele> {
        let imported = self.import_hgvs(expr)?;
        self.post_process(imported)
    }

    fn from_spdi(&self, expr: &str) -> VrsResult<Allele> {
        let imported = self.import_spdi(expr)?;
        self.post_process(imported)
    }
}
