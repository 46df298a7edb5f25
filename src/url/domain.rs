use url::Url;

/// Extracts the host of a URL, lowercased.
///
/// Returns None when the URL has no host, which valid http(s) URLs always do.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use aranha::url::extract_domain;
///
/// let url = Url::parse("https://Example.COM.br/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com.br".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
