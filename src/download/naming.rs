//! File naming for saved images and archive entries.

use image::ImageFormat;
use std::path::{Path, PathBuf};

/// Pick an extension for `bytes` fetched from `url`.
///
/// Sniffed content wins, then a recognised URL path extension, then `fallback`.
pub fn detect_extension(bytes: &[u8], url: &str, fallback: &str) -> String {
    if let Some(ext) = image::guess_format(bytes).ok().and_then(primary_extension) {
        return ext.to_string();
    }
    url_extension(url)
        .and_then(|ext| ImageFormat::from_extension(&ext).map(|_| ext))
        .unwrap_or_else(|| fallback.to_string())
}

fn primary_extension(format: ImageFormat) -> Option<&'static str> {
    format.extensions_str().first().copied()
}

/// Extension of the last path segment, ignoring query and fragment
fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// `image` + `png` -> `image.png`
pub fn single_file_name(stem: &str, ext: &str) -> String {
    format!("{}.{}", stem, ext)
}

/// Entry name for the `ordinal`-th (1-based) member of an archive
pub fn archive_entry_name(ordinal: usize, ext: &str) -> String {
    format!("image{}.{}", ordinal, ext)
}

/// First path in `dir` named `name` or `stem (N).ext` that does not exist yet
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
