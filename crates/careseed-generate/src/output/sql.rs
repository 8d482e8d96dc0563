use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::script::FixtureScript;

/// How an existing script file is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the file.
    Truncate,
    /// Add to the end of the file, after whatever earlier stages wrote.
    Append,
}

/// Write `script` to `path`, creating parent directories. Returns the
/// number of bytes written.
pub fn write_script(path: &Path, script: &FixtureScript, mode: WriteMode) -> std::io::Result<u64> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        WriteMode::Truncate => options.write(true).truncate(true),
        WriteMode::Append => options.append(true),
    };
    let file = options.open(path)?;

    let mut writer = CountingWriter::new(BufWriter::new(file));
    writer.write_all(script.render().as_bytes())?;
    writer.flush()?;

    debug!(path = %path.display(), ?mode, bytes = writer.bytes_written(), "script written");
    Ok(writer.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
