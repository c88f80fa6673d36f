use crate::paths::layer_name_for;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Shapefile,
    GeoJson,
}

impl SourceFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "shp" => Some(SourceFormat::Shapefile),
            "geojson" | "json" => Some(SourceFormat::GeoJson),
            _ => None,
        }
    }
}

/// A geometry file found under the data root, with the layer it feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub layer_name: String,
    pub format: SourceFormat,
}

/// Scanner for geometry sources under a data root
pub struct SourceScanner {
    root: PathBuf,
    excluded: Vec<PathBuf>,
}

impl SourceScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            excluded: Vec::new(),
        }
    }

    /// Skip everything below `dir` (the store's own output, typically).
    #[must_use]
    pub fn exclude(mut self, dir: impl AsRef<Path>) -> Self {
        self.excluded.push(dir.as_ref().to_path_buf());
        self
    }

    /// Walk the root; results are sorted by path so reloads are deterministic.
    pub fn scan(&self) -> Vec<SourceFile> {
        if !self.root.is_dir() {
            log::warn!("Data root {} is not a directory", self.root.display());
            return Vec::new();
        }

        let excluded = self.excluded.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .ignore(false)
            .parents(false)
            .sort_by_file_name(|a, b| a.cmp(b));
        builder.filter_entry(move |entry| {
            !excluded
                .iter()
                .any(|dir| entry.path().starts_with(dir))
        });

        let mut sources = Vec::new();
        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|kind| kind.is_file()) {
                        continue;
                    }
                    let path = entry.path();
                    let Some(format) = SourceFormat::from_path(path) else {
                        continue;
                    };
                    let Some(layer_name) = layer_name_for(path, &self.root) else {
                        log::debug!(
                            "Skipping {} (not inside a layer folder)",
                            path.display()
                        );
                        continue;
                    };
                    sources.push(SourceFile {
                        path: path.to_path_buf(),
                        layer_name,
                        format,
                    });
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        sources.sort_by(|a, b| a.path.cmp(&b.path));
        log::info!("Found {} geometry sources", sources.len());
        sources
    }
}
