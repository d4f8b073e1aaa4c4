//! Naming of LOD variant files
//!
//! The processing backend writes one PCD file per LOD size next to the raw
//! upload: `<name>_lod_<size>.pcd`.

/// Marker between a file's base name and its LOD size
pub const LOD_MARKER: &str = "_lod_";

/// Extension of LOD variant files
pub const PCD_EXTENSION: &str = ".pcd";

/// File names of every LOD variant of `name`, one per size, in size order.
///
/// A trailing `.pcd` on `name` is ignored.
pub fn lod_variant_file_names(name: &str, sizes: &[u64]) -> Vec<String> {
    let stem = name.strip_suffix(PCD_EXTENSION).unwrap_or(name);
    sizes
        .iter()
        .map(|size| format!("{}{}{}{}", stem, LOD_MARKER, size, PCD_EXTENSION))
        .collect()
}

/// Absolute URLs of every LOD variant of `name` on the file server
pub fn lod_variant_urls(file_server_url: &str, name: &str, sizes: &[u64]) -> Vec<String> {
    lod_variant_file_names(name, sizes)
        .iter()
        .map(|file| join_url(file_server_url, file))
        .collect()
}

/// Join a base URL and a relative path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Final path segment of a URL, used as the display name of a loaded file
pub fn display_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Base name of an LOD variant file, `None` if the file is not an LOD variant
pub fn lod_base_name(file_name: &str) -> Option<&str> {
    file_name.split_once(LOD_MARKER).map(|(base, _)| base)
}
