//! HTML link extraction
//!
//! Collects outbound links from a fetched page:
//! - `<a href="...">` anywhere in the document, except `download` anchors
//! - `<link rel="canonical" href="...">`
//!
//! Links are resolved against the page's final URL and returned in document
//! order. Non-HTTP schemes are kept; deciding what is crawlable is left to
//! [`crate::url::is_crawlable`].

use scraper::{Html, Selector};
use url::Url;

/// Extracts the outbound links of an HTML document
///
/// # Example
///
/// ```
/// use ripple_rank::crawler::extract_links;
/// use url::Url;
///
/// let html = r##"<html><body><a href="/page">Link</a><a href="#top">Top</a></body></html>"##;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(
///     extract_links(html, &base_url),
///     vec!["https://example.com/page".to_string()]
/// );
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    // One selector keeps anchors and canonical links in document order
    let selector = match Selector::parse("a[href], link[rel='canonical'][href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter(|element| {
            !(element.value().name() == "a" && element.value().attr("download").is_some())
        })
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves an href against the page URL
///
/// Returns `None` for empty and fragment-only hrefs, and for hrefs that
/// cannot be resolved at all.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    base_url.join(href).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_page_without_links() {
        let html = r#"<html><head><title>Empty</title></head><body><p>text</p></body></html>"#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_absolute_and_relative_links() {
        let html = r#"
            <html><body>
                <a href="https://other.com/page">Other</a>
                <a href="/rooted">Rooted</a>
                <a href="sibling">Sibling</a>
            </body></html>
        "#;
        let links = extract_links(html, &base_url());
        assert_eq!(
            links,
            vec![
                "https://other.com/page".to_string(),
                "https://example.com/rooted".to_string(),
                "https://example.com/sibling".to_string(),
            ]
        );
    }

    #[test]
    fn test_resolves_against_final_url() {
        let html = r#"<a href="next">Next</a>"#;
        let redirected = Url::parse("https://example.com/moved/here/").unwrap();
        assert_eq!(
            extract_links(html, &redirected),
            vec!["https://example.com/moved/here/next".to_string()]
        );
    }

    #[test]
    fn test_canonical_link_in_document_order() {
        let html = r#"
            <html>
            <head><link rel="canonical" href="https://example.com/canonical" /></head>
            <body><a href="/after">After</a></body>
            </html>
        "#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec![
                "https://example.com/canonical".to_string(),
                "https://example.com/after".to_string(),
            ]
        );
    }

    #[test]
    fn test_stylesheet_links_ignored() {
        let html = r#"<head><link rel="stylesheet" href="/style.css" /></head>"#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_skip_download_empty_and_fragment() {
        let html = r##"
            <body>
                <a href="/file.pdf" download>Download</a>
                <a href="">Empty</a>
                <a href="   ">Blank</a>
                <a href="#section">Jump</a>
            </body>
        "##;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_special_schemes_are_passed_through() {
        let html = r#"
            <body>
                <a href="mailto:test@example.com">Email</a>
                <a href="tel:+1234567890">Call</a>
            </body>
        "#;
        let links = extract_links(html, &base_url());
        assert_eq!(links.len(), 2);
        assert!(links[0].starts_with("mailto:"));
        assert!(links[1].starts_with("tel:"));
    }

    #[test]
    fn test_follow_nofollow_links() {
        let html = r#"<a href="/page" rel="nofollow">Link</a>"#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec!["https://example.com/page".to_string()]
        );
    }

    #[test]
    fn test_duplicate_links_kept() {
        let html = r#"<a href="/x">1</a><a href="/x">2</a>"#;
        assert_eq!(extract_links(html, &base_url()).len(), 2);
    }
}
