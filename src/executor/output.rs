//! Writing response bodies to disk.

use std::fs;
use std::path::Path;

use log::info;

use crate::error_handling::OutputError;
use crate::transport::Transport;

use super::RequestExecutor;

impl<T: Transport> RequestExecutor<T> {
    /// Writes the body of the last response to `path`, creating missing
    /// parent directories. An existing file is overwritten.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `OutputError::NoResponse` if nothing was executed yet, or an
    /// I/O error if the directory or file cannot be written.
    pub fn response_to_file(&self, path: impl AsRef<Path>) -> Result<u64, OutputError> {
        let path = path.as_ref();
        let response = self.response().ok_or(OutputError::NoResponse)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, response.body()).map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        let written = response.body().len() as u64;
        info!("Wrote {written} bytes to {}", path.display());
        Ok(written)
    }
}
