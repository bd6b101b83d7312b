//! Flattening (enref) and re-inlining (deref) of VRS object graphs.
//!
//! [`enref`] identifies every nested object, stores it under its identifier
//! and replaces it in the parent by that identifier, children first.
//! [`deref`] reverses this by loading every referenced object from the store.

use std::collections::HashSet;

use gtars_vrs::{ObjectRef, VrsObject, ga4gh_identify};
use log::debug;

use crate::errors::{AnyVarError, AnyVarResult};
use crate::store::ObjectStore;

/// Load and deserialize the object stored under `id`.
pub fn load_object<S: ObjectStore + ?Sized>(store: &S, id: &str) -> AnyVarResult<VrsObject> {
    let json = store
        .get(id)?
        .ok_or_else(|| AnyVarError::NotFound(id.to_string()))?;
    Ok(serde_json::from_str(&json)?)
}

/// Store `object` and all of its nested objects in flattened form.
///
/// Returns the flattened root object, its `id` filled in.
pub fn enref<S: ObjectStore + ?Sized>(object: &VrsObject, store: &mut S) -> AnyVarResult<VrsObject> {
    let mut written = HashSet::new();
    enref_object(object.clone(), store, &mut written)
}

fn enref_object<S: ObjectStore + ?Sized>(
    mut object: VrsObject,
    store: &mut S,
    written: &mut HashSet<String>,
) -> AnyVarResult<VrsObject> {
    if let VrsObject::Allele(allele) = &mut object {
        if let ObjectRef::Inline(location) = &allele.location {
            let child = VrsObject::SequenceLocation((**location).clone());
            let child = enref_object(child, store, written)?;
            let child_id = child.id().unwrap_or_default().to_string();
            allele.location = ObjectRef::Id(child_id);
        }
    }

    let id = ga4gh_identify(&object)?;
    object.set_id(id.clone());
    if written.insert(id.clone()) {
        store.set(&id, &serde_json::to_string(&object)?)?;
        debug!("Stored {} {}", object.type_name(), id);
    }
    Ok(object)
}

/// Replace every identifier reference in `object` with the stored object.
///
/// Fails with [`AnyVarError::Cycle`] if an object is reached again through
/// its own references and with [`AnyVarError::TypeMismatch`] if a reference
/// resolves to an object of the wrong type.
pub fn deref<S: ObjectStore + ?Sized>(object: VrsObject, store: &S) -> AnyVarResult<VrsObject> {
    let mut visiting: HashSet<String> = object.id().map(str::to_string).into_iter().collect();
    deref_object(object, store, &mut visiting)
}

fn deref_object<S: ObjectStore + ?Sized>(
    object: VrsObject,
    store: &S,
    visiting: &mut HashSet<String>,
) -> AnyVarResult<VrsObject> {
    match object {
        VrsObject::Allele(mut allele) => {
            if let ObjectRef::Id(id) = &allele.location {
                let id = id.clone();
                if !visiting.insert(id.clone()) {
                    return Err(AnyVarError::Cycle(id));
                }
                let child = deref_object(load_object(store, &id)?, store, visiting)?;
                visiting.remove(&id);
                match child {
                    VrsObject::SequenceLocation(location) => {
                        allele.location = ObjectRef::Inline(Box::new(location));
                    }
                    other => {
                        return Err(AnyVarError::TypeMismatch {
                            id,
                            expected: "SequenceLocation",
                            found: other.type_name(),
                        });
                    }
                }
            }
            Ok(VrsObject::Allele(allele))
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryObjectStore;
    use gtars_vrs::{Allele, AlleleState, Text};
    use pretty_assertions::assert_eq;

    fn allele() -> VrsObject {
        Allele::literal("SQ.F-LrLMe1SRpfUZHkQmvkVKFEGaoDeHul", 55181319, 55181320, "T").into()
    }

    #[test]
    fn test_enref_stores_location_separately() {
        let mut store = MemoryObjectStore::new();
        let flat = enref(&allele(), &mut store).unwrap();

        assert_eq!(flat.id(), Some("ga4gh:VA.Hy2XU_-rp4IMh6I_1NXNecBo8Qx8n0oE"));
        match &flat {
            VrsObject::Allele(a) => assert_eq!(
                a.location.as_id(),
                Some("ga4gh:SL._G2K0qSioM74l_u3OaKR0mgLYdeTL7Xd")
            ),
            other => panic!("expected Allele, got {}", other.type_name()),
        }
        assert_eq!(store.len(), 2);
        let location = load_object(&store, "ga4gh:SL._G2K0qSioM74l_u3OaKR0mgLYdeTL7Xd").unwrap();
        assert_eq!(location.type_name(), "SequenceLocation");
    }

    #[test]
    fn test_deref_restores_inline_location() {
        let mut store = MemoryObjectStore::new();
        let flat = enref(&allele(), &mut store).unwrap();
        let expanded = deref(flat, &store).unwrap();
        assert_eq!(expanded, allele());
    }

    #[test]
    fn test_deref_of_text_is_identity() {
        let store = MemoryObjectStore::new();
        let text: VrsObject = Text::new("free text").into();
        assert_eq!(deref(text.clone(), &store).unwrap(), text);
    }

    #[test]
    fn test_dangling_reference_is_not_found() {
        let store = MemoryObjectStore::new();
        let dangling = VrsObject::Allele(Allele::new(
            ObjectRef::Id("ga4gh:SL.missing".to_string()),
            AlleleState::LiteralSequenceExpression { sequence: "T".to_string() },
        ));
        assert!(matches!(
            deref(dangling, &store),
            Err(AnyVarError::NotFound(id)) if id == "ga4gh:SL.missing"
        ));
    }

    #[test]
    fn test_wrongly_typed_reference_is_rejected() {
        let mut store = MemoryObjectStore::new();
        store
            .set("ga4gh:SL.text", &serde_json::to_string(&VrsObject::from(Text::new("x"))).unwrap())
            .unwrap();
        let allele = VrsObject::Allele(Allele::new(
            ObjectRef::Id("ga4gh:SL.text".to_string()),
            AlleleState::LiteralSequenceExpression { sequence: "T".to_string() },
        ));
        assert!(matches!(
            deref(allele, &store),
            Err(AnyVarError::TypeMismatch { found: "Text", .. })
        ));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let mut store = MemoryObjectStore::new();
        let mut looped = Allele::new(
            ObjectRef::Id("ga4gh:SL.loop".to_string()),
            AlleleState::LiteralSequenceExpression { sequence: "T".to_string() },
        );
        looped.id = Some("ga4gh:SL.loop".to_string());
        let looped = VrsObject::Allele(looped);
        store.set("ga4gh:SL.loop", &serde_json::to_string(&looped).unwrap()).unwrap();

        assert!(matches!(
            deref(looped, &store),
            Err(AnyVarError::Cycle(id)) if id == "ga4gh:SL.loop"
        ));
    }
}
