/// Accepted-domain policy.
///
/// The crawl is restricted to hosts matching one of the configured suffixes
/// (e.g. `[".br"]` to stay inside one country-code TLD). An empty suffix list
/// accepts every host.
#[derive(Debug, Clone)]
pub struct DomainFilter {
    suffixes: Vec<String>,
}

impl DomainFilter {
    pub fn new(suffixes: Vec<String>) -> Self {
        Self {
            suffixes: suffixes.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Accepts every host.
    pub fn accept_all() -> Self {
        Self {
            suffixes: Vec::new(),
        }
    }

    pub fn accepts(&self, host: &str) -> bool {
        if self.suffixes.is_empty() {
            return true;
        }
        let host = host.to_lowercase();
        self.suffixes.iter().any(|s| host.ends_with(s.as_str()))
    }
}
