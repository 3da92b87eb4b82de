//! Packaging matched photos: ZIP archive or directory of copies.
//!
//! Entries are flat, named by original basename; basename collisions get
//! a numeric suffix before the extension so nothing is overwritten.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("no matched photos to package")]
    EmptyMatchSet,
    #[error("failed to write {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Write a ZIP archive containing copies of the given files.
///
/// Fails with [`PackageError::EmptyMatchSet`] before touching the
/// filesystem when there is nothing to package. Returns the number of
/// entries written.
pub fn write_zip(paths: &[PathBuf], dest: &Path) -> Result<usize, PackageError> {
    if paths.is_empty() {
        return Err(PackageError::EmptyMatchSet);
    }

    let file = File::create(dest).map_err(|source| PackageError::WriteError {
        path: dest.to_path_buf(),
        source,
    })?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut taken = HashSet::new();
    for path in paths {
        let name = unique_entry_name(&mut taken, path);
        writer.start_file(&name, options)?;

        let mut source = File::open(path).map_err(|source| PackageError::WriteError {
            path: path.clone(),
            source,
        })?;
        io::copy(&mut source, &mut writer).map_err(|source| PackageError::WriteError {
            path: dest.to_path_buf(),
            source,
        })?;
    }

    writer.finish()?;
    tracing::info!(dest = %dest.display(), entries = paths.len(), "archive written");
    Ok(paths.len())
}

/// Copy the given files into a directory, creating it if necessary.
///
/// Same collision policy as [`write_zip`]. Returns the number of files
/// copied.
pub fn copy_to_dir(paths: &[PathBuf], dest_dir: &Path) -> Result<usize, PackageError> {
    if paths.is_empty() {
        return Err(PackageError::EmptyMatchSet);
    }

    std::fs::create_dir_all(dest_dir).map_err(|source| PackageError::WriteError {
        path: dest_dir.to_path_buf(),
        source,
    })?;

    let mut taken = HashSet::new();
    for path in paths {
        let name = unique_entry_name(&mut taken, path);
        let dest = dest_dir.join(&name);
        std::fs::copy(path, &dest).map_err(|source| PackageError::WriteError {
            path: dest.clone(),
            source,
        })?;
    }

    tracing::info!(dest = %dest_dir.display(), copied = paths.len(), "matches copied");
    Ok(paths.len())
}

/// Pick an entry name for `path`: its basename, or `stem_N.ext` when the
/// basename is already taken.
fn unique_entry_name(taken: &mut HashSet<String>, path: &Path) -> String {
    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());

    if taken.insert(basename.clone()) {
        return basename;
    }

    let (stem, ext) = match basename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), Some(ext.to_string())),
        _ => (basename, None),
    };

    for n in 1.. {
        let candidate = match &ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
    }
    unreachable!()
}
