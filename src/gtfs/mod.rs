use csv::{ByteRecord, ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

mod config;
pub mod models;
pub use config::*;
pub use models::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unable to locate necessary input file: {0}")]
    MissingFile(String),
    #[error("Missing or unreadable required field in {file}, line {line}: {reason}")]
    MissingRequiredField {
        file: String,
        line: u64,
        reason: String,
    },
    #[error("Invalid line encountered in {file}, line {line}: unterminated quotes")]
    MalformedQuoting { file: String, line: u64 },
}

impl Error {
    fn from_csv(file_name: &str, err: csv::Error, unbalanced_quote: bool) -> Self {
        let line = err.position().map(|pos| pos.line()).unwrap_or_default();
        let file = file_name.to_string();
        match err.kind() {
            // A dangling quote swallows the following separators, so the record
            // comes out shorter than the header.
            csv::ErrorKind::UnequalLengths { .. } if unbalanced_quote => {
                return Self::MalformedQuoting { file, line };
            }
            csv::ErrorKind::UnequalLengths {
                expected_len, len, ..
            } => {
                return Self::MissingRequiredField {
                    file,
                    line,
                    reason: format!("expected {expected_len} fields, found {len}"),
                };
            }
            csv::ErrorKind::Deserialize { err: de, .. } => {
                return Self::MissingRequiredField {
                    file,
                    line,
                    reason: de.to_string(),
                };
            }
            _ => {}
        }
        Self::Csv(err)
    }

    pub fn is_missing_file(&self) -> bool {
        matches!(self, Self::MissingFile(_))
    }
}

#[derive(Default, Debug, Clone)]
pub enum StorageType {
    #[default]
    None,
    Directory(PathBuf),
    Zip(PathBuf),
}

/// Streams typed records out of a feed stored as a directory or a zip archive.
#[derive(Default)]
pub struct GtfsReader {
    config: Config,
    storage: StorageType,
}

impl GtfsReader {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(mut self, config: self::Config) -> Self {
        self.config = config;
        self
    }

    pub fn from_dir<P: AsRef<Path>>(mut self, path: P) -> Result<Self, self::Error> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(self::Error::MissingFile(path.display().to_string()));
        }
        self.storage = StorageType::Directory(path.to_path_buf());
        Ok(self)
    }

    pub fn from_zip<P: AsRef<Path>>(mut self, path: P) -> Result<Self, self::Error> {
        let path = path.as_ref();
        // Fail early on a missing or corrupt archive
        let file = File::open(path)
            .map_err(|_| self::Error::MissingFile(path.display().to_string()))?;
        let _archive = ZipArchive::new(file)?;
        self.storage = StorageType::Zip(path.to_path_buf());
        Ok(self)
    }

    /// Picks directory or zip storage based on what `path` points at.
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<Self, self::Error> {
        if path.as_ref().is_dir() {
            self.from_dir(path)
        } else {
            self.from_zip(path)
        }
    }

    pub fn storage(&self) -> &StorageType {
        &self.storage
    }

    pub fn stream_agencies<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsAgency)),
    {
        self.stream(&self.config.agency_file_name, f)
    }

    pub fn stream_routes<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsRoute)),
    {
        self.stream(&self.config.routes_file_name, f)
    }

    pub fn stream_stops<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsStop)),
    {
        self.stream(&self.config.stops_file_name, f)
    }

    pub fn stream_trips<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsTrip)),
    {
        self.stream(&self.config.trips_file_name, f)
    }

    pub fn stream_stop_times<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsStopTime)),
    {
        self.stream(&self.config.stop_times_file_name, f)
    }

    fn stream<T, F>(&self, file_name: &str, f: F) -> Result<(), self::Error>
    where
        T: DeserializeOwned,
        F: FnMut((usize, T)),
    {
        match &self.storage {
            StorageType::None => Ok(()),
            StorageType::Directory(dir) => {
                let path = dir.join(file_name);
                let file = match File::open(&path) {
                    Ok(file) => file,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {
                        return Err(self::Error::MissingFile(path.display().to_string()));
                    }
                    Err(err) => return Err(err.into()),
                };
                debug!("Reading {}", path.display());
                stream_records(file, file_name, f)
            }
            StorageType::Zip(zip_path) => {
                let zip_file = File::open(zip_path)?;
                let mut archive = ZipArchive::new(zip_file)?;
                let index = archive
                    .index_for_name(file_name)
                    .ok_or(self::Error::MissingFile(file_name.to_string()))?;
                let file = archive.by_index(index)?;
                debug!("Reading {file_name} from {}", zip_path.display());
                stream_records(file, file_name, f)
            }
        }
    }
}

fn stream_records<R, T, F>(reader: R, file_name: &str, mut f: F) -> Result<(), self::Error>
where
    R: Read,
    T: DeserializeOwned,
    F: FnMut((usize, T)),
{
    // Some feeds pad fields with leading spaces
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(RawWindow::new(reader));
    let headers = reader
        .byte_headers()
        .map_err(|err| self::Error::from_csv(file_name, err, false))?
        .clone();

    let mut record = ByteRecord::new();
    let mut i = 0;
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(err) => {
                let start = err.position().map(|pos| pos.byte()).unwrap_or_default();
                let end = reader.position().byte();
                let unbalanced = reader.get_ref().quote_count(start, end) % 2 == 1;
                return Err(self::Error::from_csv(file_name, err, unbalanced));
            }
        }
        let value: T = record
            .deserialize(Some(&headers))
            .map_err(|err| self::Error::from_csv(file_name, err, false))?;
        f((i, value));
        i += 1;
        let consumed = reader.position().byte();
        reader.get_mut().discard_before(consumed);
    }
    Ok(())
}

const RAW_WINDOW_SLACK: usize = 1 << 16;

/// Keeps the bytes the csv parser has pulled but not yet finished with, so a
/// rejected record can be inspected as it was written.
struct RawWindow<R> {
    inner: R,
    bytes: Vec<u8>,
    /// Offset in the input of `bytes[0]`.
    start: u64,
}

impl<R: Read> RawWindow<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            bytes: Vec::new(),
            start: 0,
        }
    }

    /// Double quotes between two input offsets. Escaped quotes come in pairs,
    /// so an odd count means a quote was never closed.
    fn quote_count(&self, from: u64, to: u64) -> usize {
        let from = from.saturating_sub(self.start) as usize;
        let to = (to.saturating_sub(self.start) as usize).min(self.bytes.len());
        self.bytes
            .get(from..to)
            .map_or(0, |raw| raw.iter().filter(|&&byte| byte == b'"').count())
    }

    fn discard_before(&mut self, offset: u64) {
        let done = offset.saturating_sub(self.start) as usize;
        if done < RAW_WINDOW_SLACK {
            return;
        }
        let done = done.min(self.bytes.len());
        self.bytes.drain(..done);
        self.start += done as u64;
    }
}

impl<R: Read> Read for RawWindow<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bytes.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}
