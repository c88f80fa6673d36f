use crate::error::{Result, StoreError};
use crate::layer::{Layer, LayerInfo};
use crate::loader::load_source;
use crate::paths::{manifest_path, table_path};
use crate::scanner::SourceScanner;
use gis_geometry::{parse_geojson, to_feature_collection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    version: u32,
    layers: Vec<LayerInfo>,
}

/// Immutable view of every stored layer at one point in time.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    layers: BTreeMap<String, Arc<Layer>>,
    infos: BTreeMap<String, LayerInfo>,
}

impl StoreSnapshot {
    pub fn layer(&self, name: &str) -> Result<Arc<Layer>> {
        self.layers
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::LayerNotFound {
                name: name.to_string(),
                available: self.layer_names(),
            })
    }

    /// Sorted ascending.
    pub fn layer_names(&self) -> Vec<String> {
        self.layers.keys().cloned().collect()
    }

    pub fn infos(&self) -> Vec<LayerInfo> {
        self.infos.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn insert(&mut self, layer: Layer, info: LayerInfo) {
        self.infos.insert(layer.name.clone(), info);
        self.layers.insert(layer.name.clone(), Arc::new(layer));
    }
}

/// Persisted layer tables plus the in-memory snapshot readers query.
///
/// Readers take an `Arc<StoreSnapshot>` and keep it for as long as they need;
/// a reload builds a new snapshot and swaps it in without disturbing them.
pub struct LayerStore {
    dir: PathBuf,
    state: RwLock<Option<Arc<StoreSnapshot>>>,
}

impl LayerStore {
    /// Open the store at `dir`, reading the manifest and tables if present.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let manifest_file = manifest_path(&dir);

        let state = if manifest_file.is_file() {
            log::info!("Opening layer store at {}", dir.display());
            let manifest: Manifest = serde_json::from_slice(&fs::read(&manifest_file)?)?;
            if manifest.version != MANIFEST_VERSION {
                return Err(StoreError::InvalidPath(format!(
                    "{} has manifest version {}, expected {MANIFEST_VERSION}",
                    manifest_file.display(),
                    manifest.version
                )));
            }

            let mut snapshot = StoreSnapshot::default();
            for info in manifest.layers {
                let text = fs::read_to_string(table_path(&dir, &info.name))?;
                let parsed = parse_geojson(&text)?;
                let layer = Layer::new(info.name.clone(), parsed.features);
                snapshot.insert(layer, info);
            }
            log::info!("Loaded {} layers from store", snapshot.len());
            Some(Arc::new(snapshot))
        } else {
            log::debug!("No manifest at {}; store is uninitialized", dir.display());
            None
        };

        Ok(Self {
            dir,
            state: RwLock::new(state),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_initialized(&self) -> bool {
        self.current().is_some()
    }

    /// The current snapshot; reads across several layers should share one.
    pub fn snapshot(&self) -> Result<Arc<StoreSnapshot>> {
        self.current().ok_or(StoreError::StoreUninitialized)
    }

    pub fn get_layer(&self, name: &str) -> Result<Arc<Layer>> {
        self.snapshot()?.layer(name)
    }

    pub fn list_layer_names(&self) -> Result<Vec<String>> {
        Ok(self.snapshot()?.layer_names())
    }

    pub fn layer_infos(&self) -> Result<Vec<LayerInfo>> {
        Ok(self.snapshot()?.infos())
    }

    /// Scan `data_root`, ingest every source and persist it.
    ///
    /// Per-file failures are logged and skipped. Returns how many sources
    /// were loaded; a layer fed by two files counts twice and keeps the last.
    pub fn load_all(&self, data_root: impl AsRef<Path>) -> Result<usize> {
        let data_root = data_root.as_ref();
        fs::create_dir_all(&self.dir)?;

        let mut scanner = SourceScanner::new(data_root);
        if let Ok(store_dir) = self.dir.canonicalize() {
            let root = data_root
                .canonicalize()
                .unwrap_or_else(|_| data_root.to_path_buf());
            if let Ok(relative) = store_dir.strip_prefix(&root) {
                scanner = scanner.exclude(data_root.join(relative));
            }
        }

        let mut next = self.current().map(|s| (*s).clone()).unwrap_or_default();
        let mut loaded = 0usize;
        for source in scanner.scan() {
            let result = load_source(&source).and_then(|layer| {
                let info = LayerInfo::describe(&layer, Some(source.path.clone()));
                self.write_table(&layer)?;
                Ok((layer, info))
            });
            match result {
                Ok((layer, info)) => {
                    log::info!(
                        "Loaded layer '{}' ({} {} features)",
                        info.name,
                        info.feature_count,
                        info.geometry_type
                    );
                    next.insert(layer, info);
                    loaded += 1;
                }
                Err(err) => log::error!("Skipping {}: {err}", source.path.display()),
            }
        }

        self.write_manifest(&next)?;
        self.swap(next);

        if loaded == 0 {
            log::warn!("No geometry sources loaded from {}", data_root.display());
        } else {
            log::info!("Loaded {loaded} sources into {}", self.dir.display());
        }
        Ok(loaded)
    }

    /// Persist one layer, replacing any layer of the same name.
    pub fn put_layer(&self, layer: Layer) -> Result<LayerInfo> {
        fs::create_dir_all(&self.dir)?;
        let info = LayerInfo::describe(&layer, None);
        self.write_table(&layer)?;

        let mut next = self.current().map(|s| (*s).clone()).unwrap_or_default();
        next.insert(layer, info.clone());
        self.write_manifest(&next)?;
        self.swap(next);
        Ok(info)
    }

    fn current(&self) -> Option<Arc<StoreSnapshot>> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn swap(&self, next: StoreSnapshot) {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(Arc::new(next));
    }

    fn write_table(&self, layer: &Layer) -> Result<()> {
        let collection = to_feature_collection(&layer.features);
        write_atomic(
            &table_path(&self.dir, &layer.name),
            &serde_json::to_vec(&collection)?,
        )
    }

    fn write_manifest(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let manifest = Manifest {
            version: MANIFEST_VERSION,
            layers: snapshot.infos(),
        };
        write_atomic(
            &manifest_path(&self.dir),
            &serde_json::to_vec_pretty(&manifest)?,
        )
    }
}

impl std::fmt::Debug for LayerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerStore")
            .field("dir", &self.dir)
            .field("layers", &self.current().map(|s| s.len()))
            .finish()
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
