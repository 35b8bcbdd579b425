//! Whole-file vault storage.
//!
//! Vault files are read and written in one piece.  Writes go to a temp
//! file in the same directory and are renamed over the target, so a
//! crash mid-save never leaves a half-written vault behind.  On Unix
//! the file is restricted to owner read/write before the rename.

use std::fs;
use std::path::Path;

use crate::errors::{Result, VaultError};

/// Read an entire vault file.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(VaultError::VaultNotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

/// Write an entire vault file atomically with owner-only permissions.
pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, data)?;

    // Restrict permissions on the temp file so the final file never
    // exists with a wider mode, even briefly.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    // Same-directory rename is atomic on the same filesystem.
    fs::rename(&tmp_path, path)?;

    Ok(())
}
