//! Durable crawl state
//!
//! Two pieces, both filesystem-backed under the store root:
//! - the registry log, an append-only `<docid>\t<url>` file that is the
//!   authoritative record of every URL ever registered;
//! - the document store, one directory per docid holding the compressed
//!   body and its metadata.
//!
//! Together they make the crawl restartable: replaying the log against the
//! store tells exactly which registered pages still need fetching.

mod docstore;
mod registry_log;

pub use docstore::{DocStore, PageMeta};
pub use registry_log::RegistryLog;
