//! URL helpers for user-entered links

use url::Url;

/// Normalize user input into an absolute http(s) URL.
///
/// Input without a scheme gets `https://`. Returns `None` for empty or
/// unparseable input.
pub fn normalize_url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&candidate).ok()?;
    parsed.host_str()?;
    Some(candidate)
}

/// Whether a URL points at a Wikipedia article page
pub fn is_wikipedia_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| is_wikipedia_article(&u))
        .unwrap_or(false)
}

fn is_wikipedia_article(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| host.contains("wikipedia.org"))
        && url.path().starts_with("/wiki/")
}

/// Derive a human-readable title from a URL.
///
/// Wikipedia articles use their page title; other URLs use the last path
/// segment, then the host, then `"Untitled"`.
pub fn derive_title(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return "Untitled".to_string();
    };

    if is_wikipedia_article(&parsed) {
        let page = parsed.path().trim_start_matches("/wiki/");
        let title = decode(page).replace('_', " ");
        return if title.is_empty() {
            "Untitled".to_string()
        } else {
            title
        };
    }

    let last_segment = parsed
        .path()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("");
    let segment = decode(last_segment);
    if !segment.is_empty() {
        return segment;
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => "Untitled".to_string(),
    }
}

/// Title of an article from its `/wiki/<Title>` URL, underscores as spaces
pub fn wiki_title(url: &str) -> Option<String> {
    url.split_once("/wiki/")
        .map(|(_, page)| page.replace('_', " "))
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}
