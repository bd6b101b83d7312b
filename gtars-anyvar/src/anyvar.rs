//! The [`AnyVar`] registrar and its builder.

use std::path::PathBuf;

use anyhow::{Context, Result};
use gtars_vrs::{
    Allele, DataProxy, FormatTranslator, SequenceRepository, Text, Translator, TranslatorBuilder,
    VrsObject,
};
use log::{debug, info, warn};

use super::enref::{deref, enref, load_object};
use super::errors::{AnyVarError, AnyVarResult};
use super::format::{Definition, Format};
use super::store::{MemoryObjectStore, ObjectStore, SqliteObjectStore};
use super::utils::{expand_path, get_default_seqrepo_dir, get_default_store_path};

/// Translates variation definitions into VRS objects and registers them in an
/// object store under their GA4GH identifiers.
///
/// # Examples
///
/// ```rust,no_run
/// use gtars_anyvar::AnyVar;
/// use gtars_anyvar::store::MemoryObjectStore;
/// use gtars_vrs::SequenceRepository;
///
/// # fn main() -> anyhow::Result<()> {
/// let seqrepo = SequenceRepository::open("/usr/local/share/seqrepo/latest")?;
/// let mut av = AnyVar::new(seqrepo, MemoryObjectStore::new());
///
/// let allele = av.translate("NM_000551.3:c.1A>T", "hgvs")?;
/// let id = av.register(&allele)?;
/// assert_eq!(av.retrieve(&id, true)?, allele);
/// # Ok(())
/// # }
/// ```
pub struct AnyVar<T, S> {
    translator: T,
    object_store: S,
}

impl<P: DataProxy, S: ObjectStore> AnyVar<Translator<P>, S> {
    /// Create a registrar translating with the default [`Translator`] over `data_proxy`.
    pub fn new(data_proxy: P, object_store: S) -> Self {
        Self::with_translator(Translator::new(data_proxy), object_store)
    }

    pub fn data_proxy(&self) -> &P {
        self.translator.data_proxy()
    }
}

impl<T: FormatTranslator, S: ObjectStore> AnyVar<T, S> {
    pub fn with_translator(translator: T, object_store: S) -> Self {
        let capabilities = object_store.capabilities();
        if !capabilities.is_mutable_mapping() {
            warn!(
                "AnyVar object store is not a full mutable mapping ({:?}); some operations will fail",
                capabilities
            );
        }
        AnyVar {
            translator,
            object_store,
        }
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    pub fn object_store(&self) -> &S {
        &self.object_store
    }

    pub fn into_object_store(self) -> S {
        self.object_store
    }

    /// Translate a definition given as a format tag (`ga4gh`, `beacon`,
    /// `hgvs`, `gnomad` or `spdi`).
    pub fn translate(&self, definition: impl Into<Definition>, format: &str) -> AnyVarResult<VrsObject> {
        let format: Format = format.parse()?;
        self.translate_as(definition.into(), format)
    }

    pub fn translate_as(&self, definition: Definition, format: Format) -> AnyVarResult<VrsObject> {
        let t = &self.translator;
        let allele = match format {
            Format::Ga4gh => Self::allele_from_fields(definition)?,
            Format::Beacon => t.from_beacon(Self::expression(&definition, format)?)?,
            Format::Hgvs => t.from_hgvs(Self::expression(&definition, format)?)?,
            Format::Gnomad => t.from_gnomad(Self::expression(&definition, format)?)?,
            Format::Spdi => t.from_spdi(Self::expression(&definition, format)?)?,
        };
        debug!("Translated {} definition to {:?}", format, allele.id);
        Ok(VrsObject::Allele(allele))
    }

    fn expression(definition: &Definition, format: Format) -> AnyVarResult<&str> {
        definition.as_text().ok_or_else(|| AnyVarError::InvalidDefinition {
            format: format.as_str(),
            reason: "expected an expression string".to_string(),
        })
    }

    fn allele_from_fields(definition: Definition) -> AnyVarResult<Allele> {
        let invalid = |e: serde_json::Error| AnyVarError::InvalidDefinition {
            format: Format::Ga4gh.as_str(),
            reason: e.to_string(),
        };
        let value = match definition {
            Definition::Structured(value) => value,
            Definition::Text(text) => serde_json::from_str(&text).map_err(invalid)?,
        };
        serde_json::from_value(value).map_err(invalid)
    }

    /// Wrap free text in a VRS Text object.
    pub fn translate_text(&self, definition: &str) -> VrsObject {
        VrsObject::Text(Text::new(definition))
    }

    /// Store `object` (and any nested objects) and return its identifier.
    pub fn register(&mut self, object: &VrsObject) -> AnyVarResult<String> {
        let stored = enref(object, &mut self.object_store)?;
        let id = stored.id().unwrap_or_default().to_string();
        info!("Registered {} {}", stored.type_name(), id);
        Ok(id)
    }

    /// Fetch a registered object, re-inlining nested objects when `expand` is set.
    pub fn retrieve(&self, id: &str, expand: bool) -> AnyVarResult<VrsObject> {
        let object = load_object(&self.object_store, id)?;
        if expand {
            deref(object, &self.object_store)
        } else {
            Ok(object)
        }
    }

    /// Identifiers of every registered object, if the store can enumerate them.
    pub fn list(&self) -> AnyVarResult<Vec<String>> {
        Ok(self.object_store.keys()?)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum StoreTarget {
    Memory,
    Sqlite(PathBuf),
    SqliteReadOnly(PathBuf),
}

/// Builder for an [`AnyVar`] over a [`SequenceRepository`] directory and a
/// store chosen at runtime.
///
/// ```rust,no_run
/// use gtars_anyvar::AnyVarBuilder;
///
/// # fn main() -> anyhow::Result<()> {
/// let av = AnyVarBuilder::new()
///     .with_seqrepo_dir("/data/seqrepo/latest".into())
///     .with_store_path("~/anyvar.sqlite".into())
///     .finish()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct AnyVarBuilder {
    seqrepo_dir: Option<PathBuf>,
    store: Option<StoreTarget>,
    translator: TranslatorBuilder,
}

impl AnyVarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seqrepo_dir(mut self, path: PathBuf) -> Self {
        self.seqrepo_dir = Some(path);
        self
    }

    pub fn with_store_path(mut self, path: PathBuf) -> Self {
        self.store = Some(StoreTarget::Sqlite(path));
        self
    }

    pub fn with_read_only_store_path(mut self, path: PathBuf) -> Self {
        self.store = Some(StoreTarget::SqliteReadOnly(path));
        self
    }

    /// Keep registered objects in memory only.
    pub fn with_in_memory_store(mut self) -> Self {
        self.store = Some(StoreTarget::Memory);
        self
    }

    pub fn with_default_assembly_name(mut self, name: impl Into<String>) -> Self {
        self.translator = self.translator.with_default_assembly_name(name);
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.translator = self.translator.with_normalize(normalize);
        self
    }

    pub fn with_identify(mut self, identify: bool) -> Self {
        self.translator = self.translator.with_identify(identify);
        self
    }

    /// Consumes the builder, loading the sequence directory and opening the store.
    pub fn finish(
        self,
    ) -> Result<AnyVar<Translator<SequenceRepository>, Box<dyn ObjectStore>>> {
        let seqrepo_dir = expand_path(&self.seqrepo_dir.unwrap_or_else(get_default_seqrepo_dir));
        let seqrepo = SequenceRepository::open(&seqrepo_dir)
            .with_context(|| format!("Failed to open sequence directory {}", seqrepo_dir.display()))?;

        let target = self
            .store
            .unwrap_or_else(|| StoreTarget::Sqlite(get_default_store_path()));
        let store: Box<dyn ObjectStore> = match target {
            StoreTarget::Memory => Box::new(MemoryObjectStore::new()),
            StoreTarget::Sqlite(path) => {
                let path = expand_path(&path);
                Box::new(
                    SqliteObjectStore::open(&path)
                        .with_context(|| format!("Failed to open object store {}", path.display()))?,
                )
            }
            StoreTarget::SqliteReadOnly(path) => {
                let path = expand_path(&path);
                Box::new(SqliteObjectStore::open_read_only(&path).with_context(|| {
                    format!("Failed to open object store {} read-only", path.display())
                })?)
            }
        };

        Ok(AnyVar::with_translator(
            self.translator.finish(seqrepo),
            store,
        ))
    }
}
