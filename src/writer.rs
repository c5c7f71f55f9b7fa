// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use serde::Serialize;

use crate::Error;
use crate::ErrorKind;
use crate::Value;
use crate::format::Join;
use crate::format::Printf;
use crate::format::encode_json;

/// A concurrent-safe, append-only writer for one log file.
///
/// Every write operation formats its payload first, then takes the writer's lock for exactly
/// one append. Payloads of concurrent writes therefore never interleave, while their relative
/// order is whatever order the callers acquire the lock in.
///
/// Share a `LogWriter` between threads by reference or through an [`Arc`](std::sync::Arc).
///
/// # Examples
///
/// ```no_run
/// use logwriter::LogWriter;
///
/// let writer = LogWriter::open("/var/log/my_service.log")?;
/// writer.write("service started\n")?;
/// logwriter::write_line!(writer, "listening on port", 8080)?;
/// logwriter::write_formatted!(writer, "%d workers, %s mode\n", 4, "release")?;
/// writer.close()?;
/// # Ok::<(), logwriter::Error>(())
/// ```
#[derive(Debug)]
pub struct LogWriter {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl LogWriter {
    /// Opens `path` for appending, creating the file if it does not exist.
    ///
    /// Existing content is never truncated. A newly created file gets permission bits `0644`
    /// (subject to the process umask) on unix.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Io`] error if the path is empty or the file cannot be opened,
    /// for example because the parent directory is missing or permission is denied.
    pub fn open(path: impl AsRef<Path>) -> Result<LogWriter, Error> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::new(ErrorKind::Io, "log file path is empty"));
        }

        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }

        let file = options.open(path).map_err(|err| {
            Error::new(ErrorKind::Io, "failed to open log file")
                .with_context("path", path.display())
                .with_source(err)
        })?;

        Ok(LogWriter {
            path: path.to_path_buf(),
            file: Mutex::new(Some(file)),
        })
    }

    /// The path this writer was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` once [`close`](LogWriter::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.file().is_none()
    }

    /// Closes the underlying file handle.
    ///
    /// Waits for any in-flight write to finish. After `close` returns, successfully or not, every
    /// further write fails with an [`ErrorKind::Io`] error.
    ///
    /// Closing is not idempotent: closing an already closed writer returns a
    /// `file already closed` error.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Io`] error if the writer was already closed or the OS reports a
    /// failure while closing the file.
    pub fn close(&self) -> Result<(), Error> {
        let mut file = self.file();
        let file = file.take().ok_or_else(|| self.closed())?;
        close_file(file).map_err(|err| {
            Error::new(ErrorKind::Io, "failed to close log file")
                .with_context("path", self.path.display())
                .with_source(err)
        })
    }

    /// Appends `text` verbatim.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Io`] error if the writer is closed or the OS rejects the write.
    pub fn write(&self, text: &str) -> Result<(), Error> {
        self.append(text.as_bytes())
    }

    /// Appends the default representation of each value, joined by the rule of
    /// [`Join`]: a space between adjacent values unless both are strings. No newline is added.
    ///
    /// See also the [`write_values!`](crate::write_values) macro.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Io`] error if the writer is closed or the OS rejects the write.
    pub fn write_values(&self, values: &[Value<'_>]) -> Result<(), Error> {
        let text = Join::new(values).to_string();
        self.write(&text)
    }

    /// Like [`write_values`](LogWriter::write_values), followed by exactly one `\n`.
    ///
    /// See also the [`write_line!`](crate::write_line) macro.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Io`] error if the writer is closed or the OS rejects the write.
    pub fn write_line(&self, values: &[Value<'_>]) -> Result<(), Error> {
        let mut text = Join::new(values).to_string();
        text.push('\n');
        self.write(&text)
    }

    /// Appends `format` with `args` substituted for its printf-style directives.
    ///
    /// The directive syntax is described on [`Printf`]. A newline is written only if the
    /// template contains one.
    ///
    /// See also the [`write_formatted!`](crate::write_formatted) macro.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Io`] error if the writer is closed or the OS rejects the write.
    pub fn write_formatted(&self, format: &str, args: &[Value<'_>]) -> Result<(), Error> {
        let text = Printf::new(format, args).to_string();
        self.write(&text)
    }

    /// Appends Rust-formatted arguments, which makes the [`write!`] and [`writeln!`] macros
    /// usable on a `LogWriter`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use logwriter::LogWriter;
    ///
    /// let writer = LogWriter::open("app.log")?;
    /// writeln!(writer, "{} requests in {:.1}s", 120, 2.54)?;
    /// # Ok::<(), logwriter::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Io`] error if the writer is closed or the OS rejects the write.
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        match args.as_str() {
            Some(text) => self.write(text),
            None => self.write(&args.to_string()),
        }
    }

    /// Appends `fields` with `message` under the `"message"` key as a single-line JSON object.
    ///
    /// `fields` must serialize to a JSON object; pass `&()` when there are no fields. No
    /// newline is added, so consecutive objects are not separated. Use
    /// [`write_json_line`](LogWriter::write_json_line) for newline-delimited JSON.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Serialization`] error, without writing anything, if `fields`
    /// cannot be encoded. Returns an [`ErrorKind::Io`] error if the writer is closed or the OS
    /// rejects the write.
    pub fn write_json<T>(&self, message: &str, fields: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let text = encode_json(message, fields)?;
        self.write(&text)
    }

    /// Like [`write_json`](LogWriter::write_json), followed by exactly one `\n`.
    ///
    /// # Errors
    ///
    /// See [`write_json`](LogWriter::write_json).
    pub fn write_json_line<T>(&self, message: &str, fields: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let mut text = encode_json(message, fields)?;
        text.push('\n');
        self.write(&text)
    }

    fn file(&self) -> MutexGuard<'_, Option<File>> {
        self.file.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn closed(&self) -> Error {
        Error::closed().with_context("path", self.path.display())
    }

    fn append(&self, bytes: &[u8]) -> Result<(), Error> {
        let mut file = self.file();
        let file = file.as_mut().ok_or_else(|| self.closed())?;
        file.write_all(bytes).map_err(|err| {
            Error::new(ErrorKind::Io, "failed to write log file")
                .with_context("path", self.path.display())
                .with_source(err)
        })
    }
}

impl Write for &LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // writes are unbuffered
        match self.file().as_ref() {
            Some(_) => Ok(()),
            None => Err(self.closed().into()),
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut &*self)
    }
}

#[cfg(unix)]
fn close_file(file: File) -> io::Result<()> {
    use std::os::fd::IntoRawFd;

    let fd = file.into_raw_fd();
    // SAFETY: `fd` was released by `into_raw_fd` from a `File` this function owned, so nothing
    // else holds it and it is closed exactly once.
    let result = unsafe { libc::close(fd) };
    if result < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(not(unix))]
fn close_file(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}
