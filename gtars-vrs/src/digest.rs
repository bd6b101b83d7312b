//! GA4GH identifiers for VRS objects.
//!
//! An identifier is `ga4gh:<type prefix>.<digest>`, where the digest is the
//! SHA-512/24u of the object's canonical JSON serialization.
//!
//! Nested identifiable objects contribute their own digest (not their full
//! serialization) to the parent, so an Allele whose location is held as an
//! identifier reference digests identically to one holding it inline.

use serde_json::{Value, json};
use sha2::{Digest, Sha512};

use crate::errors::{VrsError, VrsResult};
use crate::models::{Allele, AlleleState, ObjectRef, SequenceLocation, Text, VrsObject};

/// Namespace of every identifier produced here.
pub const GA4GH_NAMESPACE: &str = "ga4gh";

/// SHA-512 truncated to 24 bytes, base64url-encoded.
///
/// The input is hashed in chunks so large sequences do not need to be copied.
pub fn sha512t24u<T: AsRef<[u8]>>(input: T) -> String {
    let mut hasher = Sha512::new();
    for chunk in input.as_ref().chunks(1024) {
        hasher.update(chunk);
    }
    base64_url::encode(&hasher.finalize()[..24])
}

/// Serialize a JSON value canonically: no whitespace, object keys sorted
/// lexicographically, strings escaped per JSON rules.
pub fn canonicalize_json(value: &Value) -> String {
    match value {
        Value::Array(arr) => {
            let elements: Vec<String> = arr.iter().map(canonicalize_json).collect();
            format!("[{}]", elements.join(","))
        }
        Value::Object(obj) => {
            let mut sorted_keys: Vec<&String> = obj.keys().collect();
            sorted_keys.sort();

            let pairs: Vec<String> = sorted_keys
                .iter()
                .map(|key| {
                    let key_str = Value::String((*key).clone()).to_string();
                    format!("{}:{}", key_str, canonicalize_json(&obj[*key]))
                })
                .collect();

            format!("{{{}}}", pairs.join(","))
        }
        // scalars already have a single compact rendering
        other => other.to_string(),
    }
}

/// Split a `ga4gh:<prefix>.<digest>` identifier into `(prefix, digest)`.
pub fn parse_ga4gh_identifier(identifier: &str) -> VrsResult<(&str, &str)> {
    let invalid = || VrsError::InvalidIdentifier(identifier.to_string());
    let rest = identifier
        .strip_prefix(GA4GH_NAMESPACE)
        .and_then(|r| r.strip_prefix(':'))
        .ok_or_else(invalid)?;
    let (prefix, digest) = rest.split_once('.').ok_or_else(invalid)?;
    if prefix.is_empty() || digest.is_empty() {
        return Err(invalid());
    }
    Ok((prefix, digest))
}

fn sequence_location_value(loc: &SequenceLocation) -> Value {
    json!({
        "end": loc.end,
        "sequenceReference": {
            "refgetAccession": loc.sequence_reference.refget_accession,
            "type": "SequenceReference"
        },
        "start": loc.start,
        "type": "SequenceLocation"
    })
}

fn allele_state_value(state: &AlleleState) -> Value {
    match state {
        AlleleState::LiteralSequenceExpression { sequence } => json!({
            "sequence": sequence,
            "type": "LiteralSequenceExpression"
        }),
        AlleleState::ReferenceLengthExpression {
            length,
            repeat_subunit_length,
            sequence,
        } => {
            let mut obj = json!({
                "length": length,
                "repeatSubunitLength": repeat_subunit_length,
                "type": "ReferenceLengthExpression"
            });
            if let Some(seq) = sequence {
                obj["sequence"] = Value::String(seq.clone());
            }
            obj
        }
    }
}

/// Digest of an Allele's location, whether held inline or by reference.
fn location_digest(location: &ObjectRef<SequenceLocation>) -> VrsResult<String> {
    match location {
        ObjectRef::Inline(loc) => Ok(sequence_location_digest(loc)),
        ObjectRef::Id(id) => {
            let (prefix, digest) = parse_ga4gh_identifier(id)?;
            if prefix != "SL" {
                return Err(VrsError::InvalidIdentifier(id.clone()));
            }
            Ok(digest.to_string())
        }
    }
}

fn allele_value(allele: &Allele) -> VrsResult<Value> {
    Ok(json!({
        "location": location_digest(&allele.location)?,
        "state": allele_state_value(&allele.state),
        "type": "Allele"
    }))
}

fn text_value(text: &Text) -> Value {
    json!({
        "definition": text.definition,
        "type": "Text"
    })
}

/// Canonical serialization of an object: the exact bytes that get digested.
pub fn ga4gh_serialize(object: &VrsObject) -> VrsResult<String> {
    let value = match object {
        VrsObject::Allele(a) => allele_value(a)?,
        VrsObject::SequenceLocation(l) => sequence_location_value(l),
        VrsObject::Text(t) => text_value(t),
    };
    Ok(canonicalize_json(&value))
}

/// Compute the GA4GH digest for any identifiable object.
pub fn ga4gh_digest(object: &VrsObject) -> VrsResult<String> {
    Ok(sha512t24u(ga4gh_serialize(object)?.as_bytes()))
}

/// Compute the full identifier (`ga4gh:<prefix>.<digest>`) for any identifiable object.
pub fn ga4gh_identify(object: &VrsObject) -> VrsResult<String> {
    Ok(format!(
        "{}:{}.{}",
        GA4GH_NAMESPACE,
        object.type_prefix(),
        ga4gh_digest(object)?
    ))
}

/// Compute the GA4GH digest for a SequenceLocation.
pub fn sequence_location_digest(loc: &SequenceLocation) -> String {
    sha512t24u(canonicalize_json(&sequence_location_value(loc)).as_bytes())
}

/// Compute the GA4GH digest for an Allele.
pub fn allele_digest(allele: &Allele) -> VrsResult<String> {
    Ok(sha512t24u(canonicalize_json(&allele_value(allele)?).as_bytes()))
}

/// Compute the full GA4GH VRS identifier for an Allele.
pub fn allele_identifier(allele: &Allele) -> VrsResult<String> {
    Ok(format!("{}:VA.{}", GA4GH_NAMESPACE, allele_digest(allele)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn egfr_allele() -> Allele {
        Allele::literal("SQ.F-LrLnMKIjgbR1HECnsl_VGjXfs3QHDE", 55181319, 55181320, "T")
    }

    #[test]
    fn test_sha512t24u_bytes_and_str_agree() {
        assert_eq!(sha512t24u(b"hello world"), "MJ7MSJwS1utMxA9QyQLytNDtd-5RGnx6");
        assert_eq!(sha512t24u("hello world"), "MJ7MSJwS1utMxA9QyQLytNDtd-5RGnx6");
    }

    #[test]
    fn test_canonicalize_json_sorts_keys_recursively() {
        let value = json!({"b": 1, "a": {"d": [true, null], "c": "x\"y"}});
        assert_eq!(
            canonicalize_json(&value),
            r#"{"a":{"c":"x\"y","d":[true,null]},"b":1}"#
        );
    }

    #[test]
    fn test_location_serialization_is_canonical() {
        let loc = SequenceLocation::new("SQ.F-LrLnMKIjgbR1HECnsl_VGjXfs3QHDE", 55181319, 55181320);
        let serialized = ga4gh_serialize(&VrsObject::SequenceLocation(loc.clone())).unwrap();
        assert_eq!(
            serialized,
            r#"{"end":55181320,"sequenceReference":{"refgetAccession":"SQ.F-LrLnMKIjgbR1HECnsl_VGjXfs3QHDE","type":"SequenceReference"},"start":55181319,"type":"SequenceLocation"}"#
        );
        assert_eq!(sequence_location_digest(&loc), sha512t24u(&serialized));
    }

    #[test]
    fn test_identifiers_are_namespaced_32_char_digests() {
        let id = allele_identifier(&egfr_allele()).unwrap();
        let (prefix, digest) = parse_ga4gh_identifier(&id).unwrap();
        assert_eq!(prefix, "VA");
        assert_eq!(digest.len(), 32);
        assert_eq!(digest, allele_digest(&egfr_allele()).unwrap());
    }

    #[test]
    fn test_referenced_location_digests_like_inline() {
        let inline = egfr_allele();
        let location = inline.location.as_inline().unwrap().clone();
        let sl_id = ga4gh_identify(&VrsObject::SequenceLocation(location)).unwrap();

        let mut referenced = inline.clone();
        referenced.location = ObjectRef::Id(sl_id);

        assert_eq!(
            allele_identifier(&inline).unwrap(),
            allele_identifier(&referenced).unwrap()
        );
    }

    #[test]
    fn test_id_field_does_not_affect_digest() {
        let mut allele = egfr_allele();
        let before = allele_identifier(&allele).unwrap();
        allele.id = Some(before.clone());
        assert_eq!(allele_identifier(&allele).unwrap(), before);
    }

    #[test]
    fn test_location_reference_must_be_sequence_location() {
        let mut allele = egfr_allele();
        allele.location = ObjectRef::Id("ga4gh:VA.not-a-location".to_string());
        assert!(matches!(
            allele_digest(&allele),
            Err(VrsError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_parse_ga4gh_identifier() {
        assert_eq!(parse_ga4gh_identifier("ga4gh:SL.abc").unwrap(), ("SL", "abc"));
        assert!(parse_ga4gh_identifier("SL.abc").is_err());
        assert!(parse_ga4gh_identifier("ga4gh:SLabc").is_err());
        assert!(parse_ga4gh_identifier("ga4gh:.abc").is_err());
    }

    #[test]
    fn test_text_identifier_prefix() {
        let text = VrsObject::Text(Text::new("some free text"));
        let id = ga4gh_identify(&text).unwrap();
        assert!(id.starts_with("ga4gh:VT."));
        assert_eq!(
            ga4gh_serialize(&text).unwrap(),
            r#"{"definition":"some free text","type":"Text"}"#
        );
    }
}
