//! `Link` header parsing for pagination.
//!
//! Pagination is advisory: anything that does not parse is simply ignored and
//! the caller treats the page as the last one.

/// Returns every `(rel, target)` pair in a `Link` header value, in header
/// order. An entry carrying several relations (`rel="next last"`) yields one
/// pair per relation.
pub fn parse_links(header: &str) -> Vec<(String, String)> {
    let mut links = Vec::new();
    let mut rest = header;

    while let Some(open) = rest.find('<') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('>') else {
            break;
        };
        let target = after_open[..close].trim();
        let tail = &after_open[close + 1..];
        let params_end = tail.find('<').unwrap_or(tail.len());
        let params = &tail[..params_end];
        rest = &tail[params_end..];

        if target.is_empty() {
            continue;
        }

        for param in params.split([';', ',']) {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            if !key.trim().eq_ignore_ascii_case("rel") {
                continue;
            }
            for rel in value.trim().trim_matches('"').split_whitespace() {
                links.push((rel.to_ascii_lowercase(), target.to_string()));
            }
        }
    }

    links
}

/// Returns the `rel="next"` target, if the header has one.
pub fn next_link(header: &str) -> Option<String> {
    find_rel(header, "next")
}

/// Returns the target for an arbitrary relation.
pub fn find_rel(header: &str, rel: &str) -> Option<String> {
    parse_links(header)
        .into_iter()
        .find(|(r, _)| r == rel)
        .map(|(_, target)| target)
}
