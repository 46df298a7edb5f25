//! Filesystem document store
//!
//! Every fetched document lives in its own directory derived from the docid:
//! the id is rendered as fixed-width uppercase hex and split into 2-character
//! segments, so docid 1 maps to `<root>/00/00/00/01/`. The directory holds
//! `data.gz` (gzip-compressed body) and `meta` (plain key:value text).
//! Presence of `data.gz` is the "already downloaded" probe used by startup
//! recovery.

use crate::DocId;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Per-document metadata written next to the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub encoding: String,
    pub follow: bool,
    pub index: bool,
}

impl PageMeta {
    /// Metadata for payloads that are stored but never analyzed.
    pub fn opaque() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            follow: false,
            index: false,
        }
    }

    fn render(&self) -> String {
        let follow = if self.follow { "follow" } else { "nofollow" };
        let index = if self.index { "index" } else { "noindex" };
        format!("encoding: {}\nrobots: {},{}\n", self.encoding, follow, index)
    }
}

#[derive(Debug, Clone)]
pub struct DocStore {
    root: PathBuf,
}

impl DocStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the files of one document.
    pub fn doc_dir(&self, docid: DocId) -> PathBuf {
        let hex = format!("{:08X}", docid);
        let mut dir = self.root.clone();
        // Pad to an even length so every segment is exactly two characters;
        // ids above 32 bits simply grow more leading segments.
        let hex = if hex.len() % 2 == 0 {
            hex
        } else {
            format!("0{}", hex)
        };
        let digits: Vec<char> = hex.chars().collect();
        for pair in digits.chunks(2) {
            dir.push(pair.iter().collect::<String>());
        }
        dir
    }

    pub fn data_path(&self, docid: DocId) -> PathBuf {
        self.doc_dir(docid).join("data.gz")
    }

    pub fn meta_path(&self, docid: DocId) -> PathBuf {
        self.doc_dir(docid).join("meta")
    }

    /// Whether this document's body already sits on disk.
    pub fn page_exists(&self, docid: DocId) -> bool {
        self.data_path(docid).exists()
    }

    /// Persists body and metadata for a document.
    ///
    /// Creates the whole directory chain on demand. Any IO failure here is a
    /// crawl-fatal condition for the caller: a page counted as downloaded
    /// must actually be on disk.
    pub fn save(&self, docid: DocId, body: &[u8], meta: &PageMeta) -> io::Result<()> {
        let dir = self.doc_dir(docid);
        fs::create_dir_all(&dir)?;

        fs::write(self.meta_path(docid), meta.render())?;

        let data = fs::File::create(self.data_path(docid))?;
        let mut encoder = GzEncoder::new(data, Compression::default());
        encoder.write_all(body)?;
        encoder.finish()?.flush()
    }
}
