//! Static prefix → upstream mapping.
//!
//! # Responsibilities
//! - Hold the ordered list of path prefixes and their upstream base URLs
//! - Validate entries once, at construction
//! - Return the first entry whose prefix matches a path
//!
//! # Design Decisions
//! - Immutable after construction (shared via `Arc`, read without locks)
//! - Declaration order is match order: first match wins
//! - Not loaded from the config file

use thiserror::Error;
use url::Url;

use crate::routing::matcher::{Matcher, PathPrefixMatcher};

/// Built-in upstream API hosts, in match order.
const BUILTIN_ROUTES: [(&str, &str); 15] = [
    ("/discord", "https://discord.com/api"),
    ("/telegram", "https://api.telegram.org"),
    ("/openai", "https://api.openai.com"),
    ("/claude", "https://api.anthropic.com"),
    ("/gemini", "https://generativelanguage.googleapis.com"),
    ("/meta", "https://www.meta.ai/api"),
    ("/groq", "https://api.groq.com/openai"),
    ("/xai", "https://api.x.ai"),
    ("/cohere", "https://api.cohere.ai"),
    ("/huggingface", "https://api-inference.huggingface.co"),
    ("/together", "https://api.together.xyz"),
    ("/novita", "https://api.novita.ai"),
    ("/portkey", "https://api.portkey.ai"),
    ("/fireworks", "https://api.fireworks.ai"),
    ("/openrouter", "https://openrouter.ai/api"),
];

/// Errors raised while building a [`RouteTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("prefix '{0}' must start with '/'")]
    PrefixWithoutSlash(String),

    #[error("prefix '{0}' is declared more than once")]
    DuplicatePrefix(String),

    #[error("upstream '{upstream}' for prefix '{prefix}' is not an absolute http(s) URL")]
    InvalidUpstream { prefix: String, upstream: String },
}

/// A single prefix mapping.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    matcher: PathPrefixMatcher,
    upstream: String,
}

impl RouteEntry {
    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }
}

/// Ordered, immutable prefix table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build a table from `(prefix, upstream base URL)` pairs, kept in order.
    pub fn new<I, P, U>(routes: I) -> Result<Self, RouteTableError>
    where
        I: IntoIterator<Item = (P, U)>,
        P: Into<String>,
        U: Into<String>,
    {
        let mut entries: Vec<RouteEntry> = Vec::new();

        for (prefix, upstream) in routes {
            let prefix = prefix.into();
            let upstream = upstream.into();

            if !prefix.starts_with('/') {
                return Err(RouteTableError::PrefixWithoutSlash(prefix));
            }
            if entries.iter().any(|e| e.prefix() == prefix) {
                return Err(RouteTableError::DuplicatePrefix(prefix));
            }
            let is_http = Url::parse(&upstream)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
                .unwrap_or(false);
            if !is_http {
                return Err(RouteTableError::InvalidUpstream { prefix, upstream });
            }

            entries.push(RouteEntry {
                matcher: PathPrefixMatcher::new(prefix),
                upstream,
            });
        }

        Ok(Self { entries })
    }

    /// The built-in table of chat/LLM provider APIs.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_ROUTES
                .iter()
                .map(|(prefix, upstream)| RouteEntry {
                    matcher: PathPrefixMatcher::new(*prefix),
                    upstream: (*upstream).to_string(),
                })
                .collect(),
        }
    }

    /// First entry whose prefix matches `path`.
    pub fn lookup(&self, path: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.matcher.matches(path))
    }

    /// Resolve `path_and_query` to `upstream + remainder`, where the
    /// remainder keeps its leading slash and query string.
    pub fn target_for(&self, path: &str, path_and_query: &str) -> Option<(&RouteEntry, String)> {
        let entry = self.lookup(path)?;
        let rest = entry.matcher.strip(path_and_query)?;
        Some((entry, format!("{}{}", entry.upstream, rest)))
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }
}
