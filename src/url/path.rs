use url::Url;

/// Appends a well-known relative path to a home page
///
/// The home page is given a trailing `/` first, so `"example.com"` and
/// `"sitemap.xml"` become `"example.com/sitemap.xml"`.
pub fn join_home_page(home_page: &str, relative: &str) -> String {
    let mut joined = home_page.to_string();
    if !joined.ends_with('/') {
        joined.push('/');
    }
    joined.push_str(relative.trim_start_matches('/'));
    joined
}

/// Splits a URL into its path and optional query
///
/// Absolute URLs are parsed with the `url` crate. Anything it rejects (for
/// instance a scheme-less `"example.com/sitemap.xml"`) is split by hand: the path
/// starts at the first `/` after the authority, and an empty path becomes `/`.
/// Fragments are dropped in both cases.
pub fn split_path_query(raw: &str) -> (String, Option<String>) {
    if let Ok(url) = Url::parse(raw) {
        if url.has_host() {
            return (url.path().to_string(), url.query().map(str::to_string));
        }
    }

    let without_fragment = raw.split('#').next().unwrap_or_default();
    let after_scheme = match without_fragment.find("://") {
        Some(idx) => &without_fragment[idx + 3..],
        None => without_fragment,
    };

    let (before_query, query) = match after_scheme.split_once('?') {
        Some((head, q)) => (head, Some(q.to_string())),
        None => (after_scheme, None),
    };

    let path = match before_query.find('/') {
        Some(idx) => before_query[idx..].to_string(),
        None => "/".to_string(),
    };

    (path, query)
}
