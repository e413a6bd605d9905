//! Temporary preview files

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use uuid::Uuid;

use crate::engine::WaveformBuffer;
use crate::error::{Result, SndfxError};

/// A WAV file written for playback by an external player
///
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct PreviewFile {
    path: PathBuf,
}

impl PreviewFile {
    /// Write `buffer` to a uniquely named WAV file inside `dir`
    ///
    /// The writer is finalized before this returns, so the file is complete.
    pub fn write(buffer: &WaveformBuffer, dir: &Path, float_target_bits: u16) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| SndfxError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;

        let path = dir.join(format!("preview-{}.wav", Uuid::new_v4()));
        if let Err(e) = buffer.save_with_depth(&path, float_target_bits) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        debug!("Wrote preview file {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PreviewFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed preview file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove preview file {}: {}", self.path.display(), e),
        }
    }
}
