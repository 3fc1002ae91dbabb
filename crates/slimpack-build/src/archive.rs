use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Zip every entry under `workspace_dir` into `output_path`.
///
/// Entry names are `/`-separated paths relative to the workspace root,
/// written in sorted order with a fixed timestamp, so the same tree always
/// yields the same bytes. Returns the size of the finished archive.
pub fn archive(workspace_dir: &Path, output_path: &Path) -> Result<u64, ArchiveError> {
    let file = File::create(output_path).map_err(|e| ArchiveError::Create {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut entries = 0usize;
    for entry in WalkDir::new(workspace_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ArchiveError::Walk {
            path: workspace_dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let Some(name) = entry_name(workspace_dir, path)? else {
            continue;
        };
        let file_type = entry.file_type();

        if file_type.is_dir() {
            zip.add_directory(name, options)
                .map_err(|e| ArchiveError::zip(path, e))?;
        } else if file_type.is_symlink() {
            let target = std::fs::read_link(path).map_err(|e| ArchiveError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
            zip.add_symlink(name, target.to_string_lossy().into_owned(), options)
                .map_err(|e| ArchiveError::zip(path, e))?;
        } else {
            zip.start_file(name, with_permissions(options, &entry))
                .map_err(|e| ArchiveError::zip(path, e))?;
            let mut src = File::open(path).map_err(|e| ArchiveError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
            std::io::copy(&mut src, &mut zip).map_err(|e| ArchiveError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        entries += 1;
    }

    let mut out = zip.finish().map_err(|e| ArchiveError::zip(output_path, e))?;
    out.flush().map_err(|e| ArchiveError::Flush {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    drop(out);

    let size = std::fs::metadata(output_path)
        .map_err(|e| ArchiveError::Flush {
            path: output_path.to_path_buf(),
            source: e,
        })?
        .len();
    tracing::info!(entries, bytes = size, path = %output_path.display(), "archive written");
    Ok(size)
}

/// `/`-joined path of `path` relative to `root`; `None` for the root itself.
///
/// Zip entry names are UTF-8, so a non-UTF-8 component is an error rather
/// than a lossy (and possibly colliding) rename.
fn entry_name(root: &Path, path: &Path) -> Result<Option<String>, ArchiveError> {
    let Ok(relative) = path.strip_prefix(root) else {
        return Ok(None);
    };
    let mut parts = Vec::new();
    for component in relative.components() {
        let part = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| ArchiveError::InvalidName {
                path: path.to_path_buf(),
            })?;
        parts.push(part);
    }
    if parts.is_empty() {
        Ok(None)
    } else {
        Ok(Some(parts.join("/")))
    }
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, entry: &walkdir::DirEntry) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;

    match entry.metadata() {
        Ok(meta) => options.unix_permissions(meta.permissions().mode() & 0o777),
        Err(_) => options,
    }
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _entry: &walkdir::DirEntry) -> SimpleFileOptions {
    options
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to create archive {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to walk workspace {path}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("{path} has a name that is not valid UTF-8")]
    InvalidName { path: PathBuf },
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write archive entry for {path}")]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },
    #[error("failed to finish archive {path}")]
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ArchiveError {
    fn zip(path: &Path, source: zip::result::ZipError) -> Self {
        Self::Zip {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_name_uses_forward_slashes() {
        let root = Path::new("/tmp/ws");
        assert_eq!(
            entry_name(root, Path::new("/tmp/ws/node_modules/left-pad/index.js"))
                .unwrap()
                .as_deref(),
            Some("node_modules/left-pad/index.js")
        );
        assert_eq!(entry_name(root, root).unwrap(), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn entry_name_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = Path::new("/tmp/ws");
        let path = root.join(OsStr::from_bytes(b"bad\xff.js"));
        assert!(matches!(
            entry_name(root, &path),
            Err(ArchiveError::InvalidName { .. })
        ));
    }
}
