//! Persists rendered pages to temporary files.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::PreviewError;

const PREFIX: &str = "mdp";
const SUFFIX: &str = ".html";

/// Writes `data` to a new uniquely named `mdp*.html` file inside `dir` and
/// returns its absolute path.
///
/// The file is persisted before the write, so it stays on disk even when
/// writing fails. Removing it is up to the caller.
pub fn save_page(dir: &Path, data: &[u8]) -> Result<PathBuf, PreviewError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(PREFIX).suffix(SUFFIX);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o644));
    }

    let create_error = |source: std::io::Error| PreviewError::TempFileCreate {
        dir: dir.to_path_buf(),
        source,
    };

    let temp_file = builder.tempfile_in(dir).map_err(create_error)?;
    let (file, path) = temp_file.keep().map_err(|err| create_error(err.error))?;
    drop(file);

    let path = std::path::absolute(&path).map_err(create_error)?;
    debug!("Created temporary file {}", path.display());

    write_page(&path, data)?;

    Ok(path)
}

fn write_page(path: &Path, data: &[u8]) -> Result<(), PreviewError> {
    fs::write(path, data).map_err(|source| PreviewError::TempFileWrite {
        path: path.to_path_buf(),
        source,
    })
}
