//! Append-only docid/URL registry log
//!
//! One record per line, `<docid>\t<url>`. Appends flush immediately and any
//! write error is surfaced to the caller; a registration that is not on disk
//! must never look registered.

use crate::DocId;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub struct RegistryLog {
    file: File,
    path: PathBuf,
}

impl RegistryLog {
    /// Opens (creating if needed) the log for appending.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one registration record and flushes it to the OS.
    pub fn append(&mut self, docid: DocId, url: &str) -> io::Result<()> {
        writeln!(self.file, "{}\t{}", docid, url)?;
        self.file.flush()
    }

    /// Reads back every record in file order.
    ///
    /// Malformed lines are skipped with a warning rather than failing the
    /// whole replay; a torn final line from a crash must not keep the
    /// crawler from restarting.
    pub fn replay(path: &Path) -> io::Result<Vec<(DocId, String)>> {
        let mut entries = Vec::new();
        if !path.exists() {
            return Ok(entries);
        }
        let reader = BufReader::new(File::open(path)?);
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            match parse_record(&line) {
                Some(entry) => entries.push(entry),
                None => {
                    tracing::warn!(lineno = lineno + 1, "skipping malformed registry record");
                }
            }
        }
        Ok(entries)
    }
}

fn parse_record(line: &str) -> Option<(DocId, String)> {
    let (id_str, url) = line.split_once('\t')?;
    let docid = id_str.trim().parse::<DocId>().ok()?;
    if url.is_empty() {
        return None;
    }
    Some((docid, url.to_string()))
}
