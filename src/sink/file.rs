//! Append-only log file sink.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::sink::Sink;
use crate::{Frame, SinkError};

/// A sink that appends every frame's payload to a file.
///
/// The file is opened (and created if missing) on the first frame, so a
/// bridge can be built before the storage is ready. By default each entry
/// is flushed and synced to disk before `write` returns, which survives
/// power loss at the cost of throughput; turn that off with
/// [`FileSink::with_sync_every_entry()`] and rely on `on_stop()` instead.
///
/// # Example
///
/// ```no_run
/// use stream_log::FileSink;
///
/// let sink = FileSink::append("device.log").with_sync_every_entry(false);
/// // Use with StreamLog builder...
/// ```
pub struct FileSink {
    name: String,
    path: PathBuf,
    sync_every_entry: bool,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl FileSink {
    /// Creates a sink appending to the file at `path`.
    pub fn append(path: impl AsRef<Path>) -> Self {
        Self {
            name: format!("file:{}", path.as_ref().display()),
            path: path.as_ref().to_path_buf(),
            sync_every_entry: true,
            writer: Mutex::new(None),
        }
    }

    /// Whether to flush and sync the file after each entry. Default: `true`.
    #[must_use]
    pub fn with_sync_every_entry(mut self, sync: bool) -> Self {
        self.sync_every_entry = sync;
        self
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<BufWriter<File>, SinkError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SinkError::file_error(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "opened log file");
        Ok(BufWriter::new(file))
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, frame: &Frame<'_>) -> Result<(), SinkError> {
        let mut guard = self.writer.lock();
        if guard.is_none() {
            *guard = Some(self.open()?);
        }
        let Some(writer) = guard.as_mut() else {
            return Err(SinkError::NotInitialized);
        };

        writer
            .write_all(frame.payload())
            .map_err(|e| SinkError::file_error(&self.path, e))?;

        if self.sync_every_entry {
            writer
                .flush()
                .and_then(|()| writer.get_ref().sync_data())
                .map_err(|e| SinkError::file_error(&self.path, e))?;
        }
        Ok(())
    }

    fn on_stop(&self) -> Result<(), SinkError> {
        if let Some(writer) = self.writer.lock().as_mut() {
            writer
                .flush()
                .map_err(|e| SinkError::file_error(&self.path, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_creates_file_on_first_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("device.log");
        let sink = FileSink::append(&path);

        assert!(!path.exists());
        sink.write(&Frame::new(b"hello\n\0", 0)).unwrap();
        assert!(path.exists());

        assert_eq!(std::fs::read(&path).unwrap(), b"hello\n");
    }

    #[test]
    fn test_file_sink_appends_to_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("device.log");
        std::fs::write(&path, b"earlier\n").unwrap();

        let sink = FileSink::append(&path);
        sink.write(&Frame::new(b"later\n\0", 0)).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"earlier\nlater\n");
    }

    #[test]
    fn test_file_sink_without_sync_flushes_on_stop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("device.log");
        let sink = FileSink::append(&path).with_sync_every_entry(false);

        sink.write(&Frame::new(b"a\n\0", 0)).unwrap();
        sink.write(&Frame::new(b"b\n\0", 1)).unwrap();
        sink.on_stop().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"a\nb\n");
    }

    #[test]
    fn test_file_sink_invalid_path_error() {
        let path = PathBuf::from("/nonexistent/directory/device.log");
        let sink = FileSink::append(&path);

        let result = sink.write(&Frame::new(b"x\n\0", 0));
        assert!(matches!(result, Err(SinkError::FileError { .. })));
    }

    #[test]
    fn test_file_sink_on_stop_before_write() {
        let dir = tempdir().unwrap();
        let sink = FileSink::append(dir.path().join("unused.log"));
        assert!(sink.on_stop().is_ok());
    }

    #[test]
    fn test_file_sink_name() {
        let sink = FileSink::append("/tmp/device.log");
        assert_eq!(sink.name(), "file:/tmp/device.log");
        assert_eq!(sink.path(), Path::new("/tmp/device.log"));
    }
}
