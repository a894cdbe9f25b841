use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write output file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Write `value` as pretty JSON, replacing `path` in one step
///
/// The content goes to a uniquely named sibling first and is then renamed
/// over the target, so readers see either the old or the new file and
/// concurrent writers end with the last rename. The sibling is removed if
/// the write fails or the future is dropped before the rename.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), WriteError> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');

    let io_err = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(io_err)?;

    // Temp files start out owner-only; the output is an ordinary file
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(io_err)?;
    }

    // Only ever written through the handle, never reopened by path
    let mut file = tokio::fs::File::from_std(temp.reopen().map_err(io_err)?);
    file.write_all(content.as_bytes()).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)?;
    drop(file);

    persist(temp, path).map_err(io_err)
}

fn persist(temp: NamedTempFile, path: &Path) -> std::io::Result<()> {
    temp.persist(path).map(|_| ()).map_err(|e| e.error)
}
