//! Whole-file loading of image containers.

use std::path::Path;

use super::{ContainerError, ImageBuffer};

/// Read the entire file at `path` into an [`ImageBuffer`].
///
/// The load is all-or-nothing: either the full file is returned or an error.
///
/// # Errors
///
/// - `ContainerError::Io` - the file does not exist or cannot be read
/// - `ContainerError::EmptyInput` - the file has zero length
pub fn load_buffer(path: impl AsRef<Path>) -> Result<ImageBuffer, ContainerError> {
    let path = path.as_ref();
    log::debug!("Loading container {}", path.display());

    let bytes = std::fs::read(path).map_err(|source| ContainerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.is_empty() {
        return Err(ContainerError::EmptyInput(path.to_path_buf()));
    }

    Ok(ImageBuffer::from_vec(bytes))
}

/// Like [`load_buffer`], but rejects files larger than `max_bytes` before reading them.
///
/// # Errors
///
/// Additionally returns `ContainerError::TooLarge` when the file metadata
/// reports more than `max_bytes`.
pub fn load_buffer_with_limit(
    path: impl AsRef<Path>,
    max_bytes: u64,
) -> Result<ImageBuffer, ContainerError> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|source| ContainerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.len() > max_bytes {
        return Err(ContainerError::TooLarge {
            size: metadata.len(),
            limit: max_bytes,
        });
    }

    load_buffer(path)
}
