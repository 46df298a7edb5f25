//! URL helpers consumed by the crawl core
//!
//! Normalization, host extraction, and the accepted-domain policy. The core
//! treats these as pure text transforms; nothing here touches the network or
//! any shared state.

mod domain;
mod filter;
mod normalize;

pub use domain::extract_domain;
pub use filter::DomainFilter;
pub use normalize::normalize_url;
