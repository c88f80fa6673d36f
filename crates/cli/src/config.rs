use anyhow::{Context, Result};
use gis_analysis::ProjectionChoice;
use gis_catalog::{SynonymTable, TokenizerConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

const BUILTIN_CONFIG: &str = include_str!("../../../config/default.toml");

pub const CONFIG_ENV: &str = "GIS_CONFIG";
pub const DATA_DIR_ENV: &str = "GIS_DATA_DIR";
pub const STORE_DIR_ENV: &str = "GIS_STORE_DIR";

/// Effective settings after merging the built-in defaults, an optional
/// config file and environment overrides.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub store_dir: PathBuf,
    pub tokenizer: TokenizerConfig,
    pub synonyms: SynonymTable,
    pub projection: ProjectionChoice,
}

impl AppConfig {
    /// `explicit` wins over `GIS_CONFIG`; with neither, the built-in
    /// defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                Self::from_toml(&text, base)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
            None => Self::builtin()?,
        };

        if let Some(dir) = env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env::var_os(STORE_DIR_ENV) {
            config.store_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn builtin() -> Result<Self> {
        let raw = parse_raw(BUILTIN_CONFIG).context("Built-in configuration is invalid")?;
        Self::from_raw(raw)
    }

    /// Merge `text` over the built-in defaults. Relative paths in `text`
    /// resolve against `base`.
    pub fn from_toml(text: &str, base: &Path) -> Result<Self> {
        let builtin = parse_raw(BUILTIN_CONFIG).context("Built-in configuration is invalid")?;
        let overlay = parse_raw(text)?;
        let overlay = overlay.resolve_paths(base);
        Self::from_raw(merge_raw(builtin, overlay))
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let store = raw.store.unwrap_or_default();
        let catalog = raw.catalog.unwrap_or_default();
        let analysis = raw.analysis.unwrap_or_default();

        let defaults = TokenizerConfig::default();
        let projection = match analysis.projected_crs {
            Some(value) => value
                .parse::<ProjectionChoice>()
                .with_context(|| format!("analysis.projected_crs = {value:?}"))?,
            None => ProjectionChoice::default(),
        };

        Ok(Self {
            data_dir: store.data_dir.unwrap_or_else(|| PathBuf::from("data")),
            store_dir: store.store_dir.unwrap_or_else(|| PathBuf::from("store")),
            tokenizer: TokenizerConfig {
                leading_markers: catalog.leading_markers.unwrap_or(defaults.leading_markers),
                trailing_markers: catalog.trailing_markers.unwrap_or(defaults.trailing_markers),
            },
            synonyms: SynonymTable::new(catalog.synonyms.unwrap_or_default()),
            projection,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    store: Option<RawStore>,
    catalog: Option<RawCatalog>,
    analysis: Option<RawAnalysis>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStore {
    data_dir: Option<PathBuf>,
    store_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    leading_markers: Option<Vec<String>>,
    trailing_markers: Option<Vec<String>>,
    synonyms: Option<HashMap<String, Vec<String>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnalysis {
    projected_crs: Option<String>,
}

impl RawConfig {
    fn resolve_paths(mut self, base: &Path) -> Self {
        if let Some(store) = self.store.as_mut() {
            for dir in [&mut store.data_dir, &mut store.store_dir].into_iter().flatten() {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        self
    }
}

fn parse_raw(text: &str) -> Result<RawConfig> {
    toml::from_str(text).map_err(Into::into)
}

/// Overlay values win; synonym tables merge per key.
fn merge_raw(base: RawConfig, overlay: RawConfig) -> RawConfig {
    let store = match (base.store, overlay.store) {
        (Some(base), Some(overlay)) => Some(RawStore {
            data_dir: overlay.data_dir.or(base.data_dir),
            store_dir: overlay.store_dir.or(base.store_dir),
        }),
        (base, overlay) => overlay.or(base),
    };

    let catalog = match (base.catalog, overlay.catalog) {
        (Some(base), Some(overlay)) => Some(RawCatalog {
            leading_markers: overlay.leading_markers.or(base.leading_markers),
            trailing_markers: overlay.trailing_markers.or(base.trailing_markers),
            synonyms: match (base.synonyms, overlay.synonyms) {
                (Some(mut base), Some(overlay)) => {
                    base.extend(overlay);
                    Some(base)
                }
                (base, overlay) => overlay.or(base),
            },
        }),
        (base, overlay) => overlay.or(base),
    };

    let analysis = match (base.analysis, overlay.analysis) {
        (Some(base), Some(overlay)) => Some(RawAnalysis {
            projected_crs: overlay.projected_crs.or(base.projected_crs),
        }),
        (base, overlay) => overlay.or(base),
    };

    RawConfig {
        store,
        catalog,
        analysis,
    }
}
