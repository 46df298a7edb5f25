use crate::UrlError;
use url::Url;

/// Normalizes a URL before registration.
///
/// # Normalization steps
///
/// 1. Parse; reject if malformed
/// 2. Accept only `http` and `https` schemes
/// 3. Require a host (the url crate already lowercases it)
/// 4. Drop the fragment
/// 5. Drop the query string: dynamic pages are registered by path only,
///    so `?session=` style URLs collapse to one page
/// 6. Empty path becomes `/`
///
/// # Examples
///
/// ```
/// use aranha::url::normalize_url;
///
/// let url = normalize_url("http://example.br/page?sid=42#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.br/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    url.set_query(None);

    if url.path().is_empty() {
        url.set_path("/");
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_url() {
        let url = normalize_url("http://example.br/page").unwrap();
        assert_eq!(url.as_str(), "http://example.br/page");
    }

    #[test]
    fn test_normalize_adds_root_path() {
        let url = normalize_url("http://example.br").unwrap();
        assert_eq!(url.path(), "/");
    }

    #[test]
    fn test_normalize_drops_fragment() {
        let url = normalize_url("http://example.br/page#section").unwrap();
        assert_eq!(url.as_str(), "http://example.br/page");
    }

    #[test]
    fn test_normalize_drops_query() {
        let url = normalize_url("http://example.br/busca?q=abc&p=2").unwrap();
        assert_eq!(url.as_str(), "http://example.br/busca");
    }

    #[test]
    fn test_normalize_lowercases_host() {
        let url = normalize_url("http://WWW.Example.BR/").unwrap();
        assert_eq!(url.host_str(), Some("www.example.br"));
    }

    #[test]
    fn test_normalize_keeps_https() {
        let url = normalize_url("https://example.br/").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        assert!(matches!(
            normalize_url("ftp://example.br/file"),
            Err(UrlError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            normalize_url("mailto:someone@example.br"),
            Err(UrlError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(normalize_url("not a url"), Err(UrlError::Parse(_))));
    }
}
