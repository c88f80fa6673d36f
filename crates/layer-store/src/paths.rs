use std::path::{Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const TABLE_EXTENSION: &str = "geojson";

/// Lowercase; spaces and hyphens become underscores.
#[must_use]
pub fn normalize_layer_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Layer name for a source file: its immediate parent folder, normalized.
///
/// Files sitting directly in `root` have no folder to name them and yield
/// `None`.
#[must_use]
pub fn layer_name_for(path: &Path, root: &Path) -> Option<String> {
    let parent = path.parent()?;
    if parent == root {
        return None;
    }
    let folder = parent.file_name()?.to_str()?;
    let name = normalize_layer_name(folder);
    (!name.is_empty()).then_some(name)
}

#[must_use]
pub fn table_path(store_dir: &Path, layer_name: &str) -> PathBuf {
    store_dir.join(format!("{layer_name}.{TABLE_EXTENSION}"))
}

#[must_use]
pub fn manifest_path(store_dir: &Path) -> PathBuf {
    store_dir.join(MANIFEST_FILE_NAME)
}
