//! HTML link rewriting for the generic proxy.
//!
//! Relative `href="…"` / `src="…"` values are rebased under
//! `/proxy/<base>/` so that follow-up browser navigation re-enters the
//! relay. Two passes run over the whole document:
//!
//! 1. root-relative values (`/path`) become `/proxy/<base>/path`;
//! 2. bare relative values (`img.png`) become `/proxy/<base>/img.png`.
//!
//! Values already under `/proxy/` (or `proxy/` in the second pass), absolute `http://` / `https://` URLs and
//! protocol-relative `//host/…` URLs are left alone in both passes.
//!
//! Matching is literal and case-sensitive on the attribute name followed by
//! `="`, and the value runs to the next `"`. A candidate that is rejected is
//! skipped by one byte only, so an attribute hidden inside another
//! attribute's value is still found.

/// (attribute name, opening needle)
const ATTRIBUTES: [(&str, &str); 2] = [("href", "href=\""), ("src", "src=\"")];
const PROXY_PREFIX: &str = "/proxy/";

/// Rewrite relative links in `html` against `base_url`.
pub fn rewrite_links(html: &str, base_url: &str) -> String {
    let rooted = rewrite_pass(html, base_url, root_relative);
    rewrite_pass(&rooted, base_url, bare_relative)
}

/// Pass 1: `/path` → `path`.
fn root_relative(value: &str) -> Option<&str> {
    if value.starts_with(PROXY_PREFIX) || value.starts_with("//") {
        return None;
    }
    value.strip_prefix('/')
}

/// Pass 2: anything not already absolute or proxied.
fn bare_relative(value: &str) -> Option<&str> {
    let skip = [PROXY_PREFIX, "proxy/", "http://", "https://", "//"];
    if skip.iter().any(|prefix| value.starts_with(prefix)) {
        None
    } else {
        Some(value)
    }
}

/// Next occurrence of each attribute needle.
///
/// Offsets only move forward, so every needle scans each byte of the
/// document at most once per pass.
struct AttributeScanner<'a> {
    html: &'a str,
    next: [Option<usize>; 2],
}

impl<'a> AttributeScanner<'a> {
    fn new(html: &'a str) -> Self {
        Self {
            html,
            next: ATTRIBUTES.map(|(_, needle)| html.find(needle)),
        }
    }

    /// Earliest `name="` at or after `from`, as (offset, name).
    fn next_from(&mut self, from: usize) -> Option<(usize, &'static str)> {
        for (slot, (_, needle)) in self.next.iter_mut().zip(ATTRIBUTES) {
            if slot.is_some_and(|pos| pos < from) {
                *slot = self.html[from..].find(needle).map(|idx| from + idx);
            }
        }

        self.next
            .iter()
            .zip(ATTRIBUTES)
            .filter_map(|(slot, (name, _))| slot.map(|pos| (pos, name)))
            .min_by_key(|(pos, _)| *pos)
    }
}

fn rewrite_pass<F>(html: &str, base_url: &str, select: F) -> String
where
    F: Fn(&str) -> Option<&str>,
{
    let mut out = String::with_capacity(html.len());
    let mut copied = 0;
    let mut cursor = 0;
    let mut scanner = AttributeScanner::new(html);

    while let Some((start, name)) = scanner.next_from(cursor) {
        let value_start = start + name.len() + 2;
        let Some(value_len) = html[value_start..].find('"') else {
            // No closing quote anywhere after this point.
            break;
        };
        let value_end = value_start + value_len;

        match select(&html[value_start..value_end]) {
            Some(path) => {
                out.push_str(&html[copied..start]);
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(PROXY_PREFIX);
                out.push_str(base_url);
                out.push('/');
                out.push_str(path);
                out.push('"');
                cursor = value_end + 1;
                copied = cursor;
            }
            // Attribute names are ASCII, so `start + 1` is a char boundary.
            None => cursor = start + 1,
        }
    }

    out.push_str(&html[copied..]);
    out
}
