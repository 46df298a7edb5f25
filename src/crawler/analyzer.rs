//! Page analysis: links, robots directives, encoding, title
//!
//! Pure text transform over a fetched HTML body; the scheduler consumes it
//! as a capability and never sees the HTML itself. Lenient by construction:
//! scraper parses anything, so analysis cannot fail, only come back empty.

use scraper::{Html, Selector};
use url::Url;

/// What the crawl core wants to know about a fetched page.
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    /// Absolute outgoing links, resolved against the base URL.
    pub links: Vec<String>,
    /// Whether links of this page may be followed (meta robots).
    pub follow: bool,
    /// Whether this page may be indexed (meta robots).
    pub index: bool,
    /// Declared character encoding, defaulting to utf-8.
    pub encoding: String,
    pub title: Option<String>,
}

const DEFAULT_ENCODING: &str = "utf-8";

/// Analyzes an HTML body.
///
/// `base_url` should be the URL the content was actually obtained from, so
/// relative links resolve correctly after redirects.
pub fn analyze(html: &str, base_url: &Url) -> PageAnalysis {
    let document = Html::parse_document(html);

    let (follow, index) = robots_directives(&document);

    PageAnalysis {
        links: extract_links(&document, base_url),
        follow,
        index,
        encoding: declared_encoding(&document),
        title: extract_title(&document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `<meta name="robots">`: nofollow/noindex/none, defaulting to allow both.
fn robots_directives(document: &Html) -> (bool, bool) {
    let Ok(selector) = Selector::parse(r#"meta[name="robots"]"#) else {
        return (true, true);
    };
    let mut follow = true;
    let mut index = true;
    for element in document.select(&selector) {
        if let Some(content) = element.value().attr("content") {
            let content = content.to_lowercase();
            if content.contains("nofollow") || content.contains("none") {
                follow = false;
            }
            if content.contains("noindex") || content.contains("none") {
                index = false;
            }
        }
    }
    (follow, index)
}

/// `<meta charset>` or the charset of a `http-equiv="Content-Type"` meta.
fn declared_encoding(document: &Html) -> String {
    if let Ok(selector) = Selector::parse("meta[charset]") {
        if let Some(element) = document.select(&selector).next() {
            if let Some(charset) = element.value().attr("charset") {
                let charset = charset.trim().to_lowercase();
                if !charset.is_empty() {
                    return charset;
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse(r#"meta[http-equiv="Content-Type" i]"#) {
        for element in document.select(&selector) {
            if let Some(content) = element.value().attr("content") {
                if let Some(charset) = content
                    .to_lowercase()
                    .split("charset=")
                    .nth(1)
                    .map(|s| s.trim_matches(|c: char| c == '"' || c.is_whitespace()).to_string())
                {
                    if !charset.is_empty() {
                        return charset;
                    }
                }
            }
        }
    }

    DEFAULT_ENCODING.to_string()
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute) = resolve_link(href, base_url) {
                    links.push(absolute);
                }
            }
        }
    }
    links
}

/// Resolves an href against the base, dropping anchors, special schemes and
/// anything that does not land on http(s).
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("http://example.br/dir/page").unwrap()
    }

    #[test]
    fn test_extract_title() {
        let analysis = analyze(
            "<html><head><title>  Pagina Inicial </title></head><body></body></html>",
            &base_url(),
        );
        assert_eq!(analysis.title, Some("Pagina Inicial".to_string()));
    }

    #[test]
    fn test_defaults_without_metadata() {
        let analysis = analyze("<html><body>oi</body></html>", &base_url());
        assert!(analysis.follow);
        assert!(analysis.index);
        assert_eq!(analysis.encoding, "utf-8");
        assert!(analysis.title.is_none());
        assert!(analysis.links.is_empty());
    }

    #[test]
    fn test_relative_and_absolute_links() {
        let html = r#"<body>
            <a href="/raiz">a</a>
            <a href="vizinha">b</a>
            <a href="http://outro.br/x">c</a>
        </body>"#;
        let analysis = analyze(html, &base_url());
        assert_eq!(
            analysis.links,
            vec![
                "http://example.br/raiz",
                "http://example.br/dir/vizinha",
                "http://outro.br/x",
            ]
        );
    }

    #[test]
    fn test_skips_special_schemes_and_anchors() {
        let html = r##"<body>
            <a href="#topo">a</a>
            <a href="javascript:void(0)">b</a>
            <a href="mailto:x@example.br">c</a>
            <a href="ftp://example.br/arquivo">d</a>
            <a href="/ok">e</a>
        </body>"##;
        let analysis = analyze(html, &base_url());
        assert_eq!(analysis.links, vec!["http://example.br/ok"]);
    }

    #[test]
    fn test_meta_robots_nofollow() {
        let html = r#"<head><meta name="robots" content="noindex, nofollow"></head>"#;
        let analysis = analyze(html, &base_url());
        assert!(!analysis.follow);
        assert!(!analysis.index);
    }

    #[test]
    fn test_meta_robots_none() {
        let html = r#"<head><meta name="robots" content="none"></head>"#;
        let analysis = analyze(html, &base_url());
        assert!(!analysis.follow);
        assert!(!analysis.index);
    }

    #[test]
    fn test_meta_charset() {
        let html = r#"<head><meta charset="ISO-8859-1"></head>"#;
        let analysis = analyze(html, &base_url());
        assert_eq!(analysis.encoding, "iso-8859-1");
    }

    #[test]
    fn test_http_equiv_charset() {
        let html =
            r#"<head><meta http-equiv="Content-Type" content="text/html; charset=windows-1252"></head>"#;
        let analysis = analyze(html, &base_url());
        assert_eq!(analysis.encoding, "windows-1252");
    }
}
