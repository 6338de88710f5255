use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};

use crate::LoggerError;

pub const FILE_NAME_FORMAT: &str = "%Y%m%d%H%M%S";
pub const FILE_EXTENSION: &str = "log";
const MAX_NAME_SUFFIX: u32 = 999;

/// Destination for rendered lines. Owned by the writer thread only.
pub trait LogSink: Send {
    /// Called before every write attempt. Returns `true` when a new output
    /// was started.
    fn check_and_rotate(&mut self) -> Result<bool, LoggerError>;

    /// Appends one line; the sink adds the newline.
    fn write_line(&mut self,
                  line: &str
    ) -> Result<(), LoggerError>;

    fn close(&mut self) -> Result<(), LoggerError>;
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn check_and_rotate(&mut self) -> Result<bool, LoggerError> {
        (**self).check_and_rotate()
    }

    fn write_line(&mut self,
                  line: &str
    ) -> Result<(), LoggerError> {
        (**self).write_line(line)
    }

    fn close(&mut self) -> Result<(), LoggerError> {
        (**self).close()
    }
}

/// `<YYYYMMDDHHMMSS>.log`, or `<YYYYMMDDHHMMSS>_NNN.log` when the plain
/// name is already taken within the same second.
pub fn log_file_name(stamp: DateTime<Local>,
                     suffix: u32
) -> String {
    let stamp = stamp.format(FILE_NAME_FORMAT);
    if suffix == 0 {
        format!("{}.{}", stamp, FILE_EXTENSION)
    } else {
        format!("{}_{:03}.{}", stamp, suffix, FILE_EXTENSION)
    }
}

/// File sink that starts a fresh timestamped file once the current one
/// reaches `max_file_size` bytes.
pub struct RotatingSink {
    directory: PathBuf,
    max_file_size: u64,
    path: PathBuf,
    file: File,
}

impl RotatingSink {
    pub fn open(directory: impl Into<PathBuf>,
                max_file_size: u64
    ) -> Result<Self, LoggerError> {
        RotatingSink::open_at(directory, max_file_size, Local::now())
    }

    fn open_at(directory: impl Into<PathBuf>,
               max_file_size: u64,
               stamp: DateTime<Local>
    ) -> Result<Self, LoggerError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|source| LoggerError::SinkOpen {
            path: directory.clone(),
            source,
        })?;

        let path = directory.join(log_file_name(stamp, 0));
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|source| LoggerError::SinkOpen { path: path.clone(), source })?;

        Ok(RotatingSink { directory, max_file_size, path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Size as reported by the file system, not a running total.
    pub fn size(&self) -> io::Result<u64> {
        self.file.metadata().map(|meta| meta.len())
    }

    fn open_next(&self) -> Result<(PathBuf, File), LoggerError> {
        let stamp = Local::now();
        let mut last_taken = self.directory.join(log_file_name(stamp, 0));
        for suffix in 0..=MAX_NAME_SUFFIX {
            let path = self.directory.join(log_file_name(stamp, suffix));
            match OpenOptions::new().append(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => last_taken = path,
                Err(source) => return Err(LoggerError::SinkOpen { path, source }),
            }
        }
        Err(LoggerError::SinkOpen {
            path: last_taken,
            source: io::Error::new(io::ErrorKind::AlreadyExists, "no free log file name"),
        })
    }
}

impl LogSink for RotatingSink {
    fn check_and_rotate(&mut self) -> Result<bool, LoggerError> {
        // An unreadable size never forces a rotation; the write reports it.
        let size = match self.size() {
            Ok(size) => size,
            Err(_) => return Ok(false),
        };
        if size < self.max_file_size {
            return Ok(false);
        }

        // The old handle stays in place if the new file cannot be opened.
        let (path, file) = self.open_next()?;
        self.path = path;
        self.file = file;
        Ok(true)
    }

    fn write_line(&mut self,
                  line: &str
    ) -> Result<(), LoggerError> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        let write_err = |source| LoggerError::Write { path: self.path.clone(), source };
        let start = self.size().map_err(write_err)?;
        append_whole(&mut self.file, start, buf.as_bytes()).map_err(write_err)
    }

    fn close(&mut self) -> Result<(), LoggerError> {
        self.file
            .sync_all()
            .map_err(|source| LoggerError::Write { path: self.path.clone(), source })
    }
}

/// Output that can be cut back to an earlier length.
trait Truncate {
    fn truncate_to(&mut self,
                   len: u64
    ) -> io::Result<()>;
}

impl Truncate for File {
    fn truncate_to(&mut self,
                   len: u64
    ) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Writes all of `buf` or nothing: a failed write is cut back to `start`, so a
/// retried line never lands after a partial copy of itself.
fn append_whole<W: Write + Truncate>(out: &mut W,
                                     start: u64,
                                     buf: &[u8]
) -> io::Result<()> {
    match out.write_all(buf) {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = out.truncate_to(start);
            Err(err)
        }
    }
}

/// Writes every line to stdout and never rotates.
#[derive(Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn check_and_rotate(&mut self) -> Result<bool, LoggerError> {
        Ok(false)
    }

    fn write_line(&mut self,
                  line: &str
    ) -> Result<(), LoggerError> {
        writeln!(io::stdout().lock(), "{}", line)
            .map_err(|source| LoggerError::Write { path: PathBuf::from("<stdout>"), source })
    }

    fn close(&mut self) -> Result<(), LoggerError> {
        io::stdout()
            .flush()
            .map_err(|source| LoggerError::Write { path: PathBuf::from("<stdout>"), source })
    }
}
