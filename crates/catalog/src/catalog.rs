use crate::synonyms::SynonymTable;
use crate::tokenizer::{Tokenizer, TokenizerConfig};
use gis_geometry::GeometryKind;
use gis_layer_store::{LayerInfo, LayerStore, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Matching vocabulary and metadata for one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    /// In name order.
    pub tokens: Vec<String>,
    /// Always a superset of `tokens`.
    pub aliases: BTreeSet<String>,
    pub geometry_type: GeometryKind,
    pub description: String,
}

/// Layer name -> entry, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `name: alias, alias` line per layer, for prompt context.
    pub fn vocabulary(&self) -> String {
        self.entries
            .values()
            .map(|entry| {
                let aliases: Vec<&str> = entry.aliases.iter().map(String::as_str).collect();
                format!("{}: {}", entry.name, aliases.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FromIterator<CatalogEntry> for Catalog {
    fn from_iter<T: IntoIterator<Item = CatalogEntry>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|entry| (entry.name.clone(), entry))
                .collect(),
        }
    }
}

/// Derives catalog entries from layer names; holds no state between builds.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    tokenizer: Tokenizer,
    synonyms: SynonymTable,
}

impl CatalogBuilder {
    pub fn new(tokenizer: &TokenizerConfig, synonyms: SynonymTable) -> Self {
        Self {
            tokenizer: Tokenizer::new(tokenizer),
            synonyms,
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Catalog of every layer currently in `store`.
    ///
    /// An uninitialized store yields an empty catalog.
    pub fn build(&self, store: &LayerStore) -> Catalog {
        match store.layer_infos() {
            Ok(infos) => self.build_from_infos(&infos),
            Err(StoreError::StoreUninitialized) => {
                log::warn!("Layer store is not initialized; catalog is empty");
                Catalog::default()
            }
            Err(err) => {
                log::error!("Failed to read layer store: {err}");
                Catalog::default()
            }
        }
    }

    pub fn build_from_infos(&self, infos: &[LayerInfo]) -> Catalog {
        let catalog: Catalog = infos
            .iter()
            .map(|info| self.entry(&info.name, info.geometry_type))
            .collect();
        log::debug!("Built catalog with {} entries", catalog.len());
        catalog
    }

    pub fn entry(&self, name: &str, geometry_type: GeometryKind) -> CatalogEntry {
        let tokens = self.tokenizer.tokenize(name);
        let aliases = self.synonyms.aliases_for(&tokens);
        CatalogEntry {
            name: name.to_string(),
            tokens,
            aliases,
            geometry_type,
            description: describe(name),
        }
    }
}

/// `oil_pipelines` -> `Oil Pipelines dataset`.
pub fn describe(name: &str) -> String {
    let words: Vec<String> = name
        .split('_')
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect();
    format!("{} dataset", words.join(" "))
}

fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_word_start = true;
    for c in word.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
