use std::fs;
use std::path::Path;

use gtars_anyvar::store::{MemoryObjectStore, ObjectStore, ReadOnlyStore, SqliteObjectStore};
use gtars_anyvar::{
    AnyVar, AnyVarBuilder, AnyVarError, Definition, Format, StoreError, StoreResult,
};
use gtars_vrs::{
    Allele, FormatTranslator, ObjectRef, SequenceLocation, SequenceRepository, Text, VrsError,
    VrsObject, VrsResult,
};
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::json;
use tempfile::TempDir;

// 5' UTR (3 bases), CDS ATGCCCGAGGCCTGA, 3' UTR
const VHL_TX: &str = "CGCATGCCCGAGGCCTGACCTT";
const CHR3: &str = "TTAGCCGATCGATTTTTGCA";

fn write_seqrepo(root: &Path) {
    fs::write(
        root.join("refseq.fa"),
        format!(">NM_000551.3 VHL CDS=4..18\n{}\n>NC_000003.12\n{}\n", VHL_TX, CHR3),
    )
    .unwrap();
    fs::create_dir(root.join("aliases")).unwrap();
    fs::write(root.join("aliases").join("GRCh38.tsv"), "3\tNC_000003.12\n").unwrap();
}

#[fixture]
fn seqrepo_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_seqrepo(dir.path());
    dir
}

#[fixture]
fn anyvar(seqrepo_dir: TempDir) -> AnyVar<gtars_vrs::Translator<SequenceRepository>, MemoryObjectStore> {
    let seqrepo = SequenceRepository::open(seqrepo_dir.path()).unwrap();
    AnyVar::new(seqrepo, MemoryObjectStore::new())
}

/// A translator that must never be consulted.
struct UnreachableTranslator;

impl FormatTranslator for UnreachableTranslator {
    fn from_beacon(&self, _: &str) -> VrsResult<Allele> {
        panic!("translator consulted")
    }
    fn from_gnomad(&self, _: &str) -> VrsResult<Allele> {
        panic!("translator consulted")
    }
    fn from_hgvs(&self, _: &str) -> VrsResult<Allele> {
        panic!("translator consulted")
    }
    fn from_spdi(&self, _: &str) -> VrsResult<Allele> {
        panic!("translator consulted")
    }
}

fn offline() -> AnyVar<UnreachableTranslator, MemoryObjectStore> {
    AnyVar::with_translator(UnreachableTranslator, MemoryObjectStore::new())
}

fn sample_objects() -> Vec<VrsObject> {
    vec![
        Allele::literal("SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl", 44908821, 44908822, "T").into(),
        Allele::literal("SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl", 44908821, 44908825, "").into(),
        SequenceLocation::new("SQ.F-LrLMe1SRpfUZHkQmvkVKFEGaoDeHul", 55181319, 55181320).into(),
        Text::new("some free text").into(),
    ]
}

#[rstest]
fn test_hgvs_round_trip(anyvar: AnyVar<gtars_vrs::Translator<SequenceRepository>, MemoryObjectStore>) {
    let mut av = anyvar;
    let allele = av.translate("NM_000551.3:c.1A>T", "hgvs").unwrap();
    assert_eq!(allele.type_name(), "Allele");

    let id1 = av.register(&allele).unwrap();
    assert!(!id1.is_empty());
    assert_eq!(Some(id1.as_str()), allele.id());

    let expanded = av.retrieve(&id1, true).unwrap();
    assert_eq!(expanded, allele);

    // the flattened form references the location by identifier
    match av.retrieve(&id1, false).unwrap() {
        VrsObject::Allele(a) => assert!(a.location.as_id().unwrap().starts_with("ga4gh:SL.")),
        other => panic!("expected Allele, got {}", other.type_name()),
    }
}

#[rstest]
fn test_register_retrieve_round_trip() {
    let mut av = offline();
    for object in sample_objects() {
        let id = av.register(&object).unwrap();
        assert_eq!(av.retrieve(&id, true).unwrap(), object);
    }
}

#[rstest]
fn test_register_is_idempotent() {
    let mut av = offline();
    let object: VrsObject =
        Allele::literal("SQ.KEO-4XBcm1cxeo_DIQ8_ofqGUkp4iZhI", 128325834, 128325835, "T").into();

    let first = av.register(&object).unwrap();
    let stored = av.object_store().get(&first).unwrap();
    let keys = av.list().unwrap();

    let second = av.register(&object).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "ga4gh:VA.SZIS2ua7AL-0YgUTAqyBsFPYK3vE8h_d");
    assert_eq!(av.object_store().get(&second).unwrap(), stored);
    assert_eq!(av.list().unwrap(), keys);
    assert_eq!(keys.len(), 2);
}

#[rstest]
fn test_equal_content_gets_equal_identifier() {
    let mut av = offline();
    let inline: VrsObject = Allele::literal("SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl", 44908821, 44908822, "T").into();

    let mut with_stale_id = inline.clone();
    with_stale_id.set_id("ga4gh:VA.something-else".to_string());

    let referenced: VrsObject = Allele::new(
        ObjectRef::Id("ga4gh:SL.wIlaGykfwHIpPY2Fcxtbx4TINbbODFVz".to_string()),
        gtars_vrs::AlleleState::LiteralSequenceExpression { sequence: "T".to_string() },
    )
    .into();

    let id = av.register(&inline).unwrap();
    assert_eq!(id, "ga4gh:VA.0AePZIWZUNsUlQTamyLrjm2HWUw2opLt");
    assert_eq!(av.register(&with_stale_id).unwrap(), id);
    assert_eq!(av.register(&referenced).unwrap(), id);
}

#[rstest]
#[case::text(Definition::from("NM_000551.3:c.1A>T"))]
#[case::empty(Definition::from(""))]
#[case::structured(Definition::from(json!({"location": "ga4gh:SL.x"})))]
fn test_unknown_format_is_rejected(#[case] definition: Definition) {
    let av = offline();
    assert!(matches!(
        av.translate(definition, "unknown"),
        Err(AnyVarError::UnsupportedFormat(f)) if f == "unknown"
    ));
}

#[rstest]
fn test_retrieve_absent_id_is_not_found() {
    let av = offline();
    assert!(matches!(
        av.retrieve("nonexistent-id", false),
        Err(AnyVarError::NotFound(id)) if id == "nonexistent-id"
    ));
    assert!(matches!(
        av.retrieve("nonexistent-id", true),
        Err(AnyVarError::NotFound(_))
    ));
}

#[rstest]
fn test_translate_text_makes_no_external_calls() {
    let av = offline();
    match av.translate_text("some free text") {
        VrsObject::Text(text) => assert_eq!(text.definition, "some free text"),
        other => panic!("expected Text, got {}", other.type_name()),
    }
}

#[rstest]
fn test_ga4gh_format_builds_allele_from_fields() {
    let av = offline();
    let fields = json!({
        "location": {
            "sequenceReference": {"refgetAccession": "SQ.F-LrLMe1SRpfUZHkQmvkVKFEGaoDeHul"},
            "start": 55181319,
            "end": 55181320
        },
        "state": {"type": "LiteralSequenceExpression", "sequence": "T"}
    });
    let expected: VrsObject =
        Allele::literal("SQ.F-LrLMe1SRpfUZHkQmvkVKFEGaoDeHul", 55181319, 55181320, "T").into();

    assert_eq!(av.translate(fields.clone(), "ga4gh").unwrap(), expected);
    assert_eq!(av.translate(fields.to_string(), "ga4gh").unwrap(), expected);
    assert!(matches!(
        av.translate(json!({"start": 1}), "ga4gh"),
        Err(AnyVarError::InvalidDefinition { format: "ga4gh", .. })
    ));
}

#[rstest]
#[case::malformed_json("{\"location\": ")]
#[case::not_json("NM_000551.3:c.1A>T")]
#[case::wrong_shape("[1, 2, 3]")]
fn test_ga4gh_text_that_is_not_an_allele_is_invalid(#[case] definition: &str) {
    assert!(matches!(
        offline().translate(definition, "ga4gh"),
        Err(AnyVarError::InvalidDefinition { format: "ga4gh", .. })
    ));
}

#[rstest]
fn test_every_format_dispatches_to_the_translator(
    anyvar: AnyVar<gtars_vrs::Translator<SequenceRepository>, MemoryObjectStore>,
) {
    // NC_000003.12 position 4 (1-based) is G
    let av = anyvar;
    let expected = av.translate("NC_000003.12:g.4G>A", "hgvs").unwrap();
    for (definition, format) in [
        ("3 : 4 G > A", Format::Beacon),
        ("3-4-G-A", Format::Gnomad),
        ("NC_000003.12:3:G:A", Format::Spdi),
    ] {
        let object = av.translate_as(Definition::from(definition), format).unwrap();
        assert_eq!(object, expected);
        assert_eq!(object.id(), expected.id());
    }
    assert!(matches!(
        av.translate(json!({"not": "a string"}), "hgvs"),
        Err(AnyVarError::InvalidDefinition { format: "hgvs", .. })
    ));
}

#[rstest]
fn test_collaborator_errors_pass_through(
    anyvar: AnyVar<gtars_vrs::Translator<SequenceRepository>, MemoryObjectStore>,
) {
    let av = anyvar;
    assert!(matches!(
        av.translate("NM_000551.3:c.1G>T", "hgvs"),
        Err(AnyVarError::Translation(VrsError::ReferenceMismatch { .. }))
    ));
    assert!(matches!(
        av.translate("NM_999999.1:c.1A>T", "hgvs"),
        Err(AnyVarError::Translation(VrsError::SequenceNotFound(_)))
    ));
    assert!(matches!(
        av.translate("13 : 4 G", "beacon"),
        Err(AnyVarError::Translation(VrsError::ParseError { .. }))
    ));
}

#[rstest]
fn test_read_only_store_still_retrieves() {
    let mut writable = MemoryObjectStore::new();
    let text: VrsObject = Text::new("already registered").into();
    let id = {
        let mut av = AnyVar::with_translator(UnreachableTranslator, &mut writable);
        av.register(&text).unwrap()
    };

    let mut av = AnyVar::with_translator(UnreachableTranslator, ReadOnlyStore::new(writable));
    assert_eq!(av.retrieve(&id, true).unwrap(), text);
    assert!(matches!(
        av.register(&Text::new("new").into()),
        Err(AnyVarError::Store(StoreError::ReadOnly))
    ));
}

/// A store offering only lookups and writes.
#[derive(Default)]
struct GetSetStore {
    objects: Vec<(String, String)>,
}

impl ObjectStore for GetSetStore {
    fn get(&self, id: &str) -> StoreResult<Option<String>> {
        Ok(self
            .objects
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, v)| v.clone()))
    }

    fn set(&mut self, id: &str, object: &str) -> StoreResult<()> {
        self.objects.retain(|(k, _)| k != id);
        self.objects.push((id.to_string(), object.to_string()));
        Ok(())
    }
}

#[rstest]
fn test_get_set_only_store_registers_but_cannot_list() {
    let store = GetSetStore::default();
    assert!(!store.capabilities().is_mutable_mapping());

    let mut av = AnyVar::with_translator(UnreachableTranslator, store);
    let allele: VrsObject =
        Allele::literal("SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl", 44908821, 44908822, "T").into();
    let id = av.register(&allele).unwrap();
    assert_eq!(av.retrieve(&id, true).unwrap(), allele);
    assert_eq!(av.object_store().objects.len(), 2);
    assert!(matches!(
        av.list(),
        Err(AnyVarError::Store(StoreError::Unsupported("keys")))
    ));
}

#[rstest]
fn test_sqlite_store_persists_registrations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anyvar.sqlite");
    let objects = sample_objects();

    let ids: Vec<String> = {
        let mut av = AnyVar::with_translator(UnreachableTranslator, SqliteObjectStore::open(&path).unwrap());
        objects.iter().map(|o| av.register(o).unwrap()).collect()
    };

    let av = AnyVar::with_translator(
        UnreachableTranslator,
        SqliteObjectStore::open_read_only(&path).unwrap(),
    );
    for (id, object) in ids.iter().zip(&objects) {
        assert_eq!(&av.retrieve(id, true).unwrap(), object);
    }
    let keys = av.list().unwrap();
    assert!(ids.iter().all(|id| keys.contains(id)));
}

#[rstest]
fn test_builder_opens_directory_and_store(seqrepo_dir: TempDir) {
    let store_dir = tempfile::tempdir().unwrap();
    let store_path = store_dir.path().join("store").join("anyvar.sqlite");

    let id = {
        let mut av = AnyVarBuilder::new()
            .with_seqrepo_dir(seqrepo_dir.path().to_path_buf())
            .with_store_path(store_path.clone())
            .finish()
            .unwrap();
        assert_eq!(av.data_proxy().len(), 2);
        let allele = av.translate("NM_000551.3:c.1A>T", "hgvs").unwrap();
        av.register(&allele).unwrap()
    };
    assert!(store_path.is_file());

    let av = AnyVarBuilder::new()
        .with_seqrepo_dir(seqrepo_dir.path().to_path_buf())
        .with_read_only_store_path(store_path)
        .finish()
        .unwrap();
    assert_eq!(av.retrieve(&id, false).unwrap().id(), Some(id.as_str()));
}

#[rstest]
fn test_builder_fails_on_missing_seqrepo() {
    let result = AnyVarBuilder::new()
        .with_seqrepo_dir("/definitely/not/a/seqrepo".into())
        .with_in_memory_store()
        .finish();
    assert!(result.is_err());
}
