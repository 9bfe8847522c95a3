//! File-system helpers shared by the compile modes.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Extension of Helios source files, without the dot.
pub const SOURCE_EXTENSION: &str = "hl";

/// Suffix of the parameter file paired with a source file in project mode.
pub const PARAMS_SUFFIX: &str = ".params.json";

/// Derive the artifact path for `path`.
///
/// The file name is cut at its *first* dot and `.json` is appended, so
/// `contracts/vault.v2.hl` becomes `contracts/vault.json`. The parent
/// directory is kept as given.
pub fn artifact_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    path.with_file_name(format!("{}.json", stem))
}

/// `<dir>/<name><suffix>`, where `suffix` carries its own leading dot.
pub fn join_name(dir: &Path, name: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}{}", name, suffix))
}

/// File name of `path` for display, falling back to the whole path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Regular files directly inside `dir` whose extension is `ext`, sorted.
pub fn files_in_dir(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_file() && path.extension().map_or(false, |e| e == ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Base names (extension removed) of the files [`files_in_dir`] returns.
pub fn file_names_in_dir(dir: &Path, ext: &str) -> Result<Vec<String>> {
    Ok(files_in_dir(dir, ext)?
        .iter()
        .filter_map(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .collect())
}

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Write `contents` to `path`, replacing any existing file.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| Error::io(path, e))
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Create `dir` and its parents. Returns `true` if anything was created.
pub fn ensure_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    Ok(true)
}
