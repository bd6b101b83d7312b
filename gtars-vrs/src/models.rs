//! VRS data models.
//!
//! Structs representing GA4GH VRS objects: enough for canonical JSON
//! serialization, digest computation and storage. Every identifiable object
//! carries an optional `id` that is filled in when the object is identified
//! or registered. Identifiers are derived from content, so equality between
//! objects compares content only and ignores `id`.

use serde::{Deserialize, Serialize};

/// A reference to a specific sequence identified by its refget accession.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceReference {
    /// GA4GH refget accession, e.g. "SQ.F-LrL..."
    pub refget_accession: String,
}

/// A location on a sequence defined by start/end coordinates (interbase, 0-based).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub sequence_reference: SequenceReference,
    pub start: u64,
    pub end: u64,
}

impl SequenceLocation {
    pub fn new(refget_accession: impl Into<String>, start: u64, end: u64) -> Self {
        SequenceLocation {
            id: None,
            sequence_reference: SequenceReference {
                refget_accession: refget_accession.into(),
            },
            start,
            end,
        }
    }
}

impl PartialEq for SequenceLocation {
    fn eq(&self, other: &Self) -> bool {
        self.sequence_reference == other.sequence_reference
            && self.start == other.start
            && self.end == other.end
    }
}

/// The state (alternate allele) of a VRS Allele.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AlleleState {
    /// A literal sequence expression (SNV, indel, MNV).
    LiteralSequenceExpression { sequence: String },
    /// A reference-length expression (for CNVs/repeats).
    ReferenceLengthExpression {
        length: u64,
        #[serde(rename = "repeatSubunitLength")]
        repeat_subunit_length: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sequence: Option<String>,
    },
}

/// A nested object held either inline (owned) or as a reference to its
/// identifier in an object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectRef<T> {
    Id(String),
    Inline(Box<T>),
}

impl<T> ObjectRef<T> {
    pub fn as_inline(&self) -> Option<&T> {
        match self {
            ObjectRef::Inline(value) => Some(value),
            ObjectRef::Id(_) => None,
        }
    }

    pub fn as_id(&self) -> Option<&str> {
        match self {
            ObjectRef::Id(id) => Some(id),
            ObjectRef::Inline(_) => None,
        }
    }
}

impl From<SequenceLocation> for ObjectRef<SequenceLocation> {
    fn from(location: SequenceLocation) -> Self {
        ObjectRef::Inline(Box::new(location))
    }
}

/// A VRS Allele: a specific sequence state at a specific genomic location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allele {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub location: ObjectRef<SequenceLocation>,
    pub state: AlleleState,
}

impl Allele {
    pub fn new(location: impl Into<ObjectRef<SequenceLocation>>, state: AlleleState) -> Self {
        Allele {
            id: None,
            location: location.into(),
            state,
        }
    }

    /// Build an Allele with a LiteralSequenceExpression state.
    pub fn literal(
        refget_accession: impl Into<String>,
        start: u64,
        end: u64,
        sequence: impl Into<String>,
    ) -> Self {
        Allele::new(
            SequenceLocation::new(refget_accession, start, end),
            AlleleState::LiteralSequenceExpression {
                sequence: sequence.into(),
            },
        )
    }
}

impl PartialEq for Allele {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location && self.state == other.state
    }
}

/// Free-text description of a variation that cannot (yet) be expressed
/// structurally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub definition: String,
}

impl Text {
    pub fn new(definition: impl Into<String>) -> Self {
        Text {
            id: None,
            definition: definition.into(),
        }
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.definition == other.definition
    }
}

/// Any identifiable VRS object, tagged by its VRS `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VrsObject {
    Allele(Allele),
    SequenceLocation(SequenceLocation),
    Text(Text),
}

impl VrsObject {
    /// The VRS type name, as written in the `type` field.
    pub fn type_name(&self) -> &'static str {
        match self {
            VrsObject::Allele(_) => "Allele",
            VrsObject::SequenceLocation(_) => "SequenceLocation",
            VrsObject::Text(_) => "Text",
        }
    }

    /// The GA4GH type prefix used in identifiers (`ga4gh:<prefix>.<digest>`).
    pub fn type_prefix(&self) -> &'static str {
        match self {
            VrsObject::Allele(_) => "VA",
            VrsObject::SequenceLocation(_) => "SL",
            VrsObject::Text(_) => "VT",
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            VrsObject::Allele(a) => a.id.as_deref(),
            VrsObject::SequenceLocation(l) => l.id.as_deref(),
            VrsObject::Text(t) => t.id.as_deref(),
        }
    }

    pub fn set_id(&mut self, id: String) {
        match self {
            VrsObject::Allele(a) => a.id = Some(id),
            VrsObject::SequenceLocation(l) => l.id = Some(id),
            VrsObject::Text(t) => t.id = Some(id),
        }
    }
}

impl From<Allele> for VrsObject {
    fn from(allele: Allele) -> Self {
        VrsObject::Allele(allele)
    }
}

impl From<SequenceLocation> for VrsObject {
    fn from(location: SequenceLocation) -> Self {
        VrsObject::SequenceLocation(location)
    }
}

impl From<Text> for VrsObject {
    fn from(text: Text) -> Self {
        VrsObject::Text(text)
    }
}
