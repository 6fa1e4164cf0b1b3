use std::collections::BTreeSet;

/// Collapse grounding URIs into a set. Blank entries and surrounding
/// whitespace are dropped; otherwise URIs compare verbatim.
pub fn dedupe_citations<I, S>(uris: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    uris.into_iter()
        .map(|u| u.as_ref().trim().to_string())
        .filter(|u| !u.is_empty())
        .collect()
}

/// Short display label for a source: the host plus the last path segment.
pub fn citation_label(uri: &str) -> String {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);
    let without_query = without_scheme
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or(without_scheme);
    let mut segments = without_query.split('/').filter(|s| !s.is_empty());
    let host = segments.next().unwrap_or(uri);
    match segments.last() {
        Some(last) => format!("{}/…/{}", host, last),
        None => host.to_string(),
    }
}
