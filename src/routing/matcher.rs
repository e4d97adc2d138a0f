//! Path prefix matching and rewriting.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A prefix only matches on a segment boundary: `/api/auth` matches
//!   `/api/auth` and `/api/auth/login`, never `/api/authx`
//! - No regex to guarantee O(n) matching

/// Matches and rewrites the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Length of the prefix, used to rank overlapping matches.
    pub fn len(&self) -> usize {
        self.prefix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Returns the part of `path` after the prefix if the prefix matches.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.prefix == "/" {
            return Some(path);
        }
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.strip(path).is_some()
    }
}

/// Join a rewrite prefix with the remainder left after stripping the inbound prefix.
pub fn rewrite_path(rewrite_prefix: &str, rest: &str) -> String {
    if rest.is_empty() || (rest == "/" && rewrite_prefix.ends_with('/')) {
        return rewrite_prefix.to_string();
    }
    match (rewrite_prefix.ends_with('/'), rest.starts_with('/')) {
        (true, true) => format!("{}{}", rewrite_prefix, &rest[1..]),
        (false, false) => format!("{}/{}", rewrite_prefix, rest),
        _ => format!("{}{}", rewrite_prefix, rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api/auth");

        assert_eq!(matcher.strip("/api/auth"), Some(""));
        assert_eq!(matcher.strip("/api/auth/register"), Some("/register"));
        assert_eq!(matcher.strip("/api/authx"), None);
        assert_eq!(matcher.strip("/api"), None);
        assert!(!matcher.matches("/API/auth"));
    }

    #[test]
    fn root_prefix_matches_everything() {
        let matcher = PathPrefixMatcher::new("/");
        assert_eq!(matcher.strip("/anything/here"), Some("/anything/here"));
    }

    #[test]
    fn test_rewrite() {
        assert_eq!(rewrite_path("/auth", "/register"), "/auth/register");
        assert_eq!(rewrite_path("/restaurants", ""), "/restaurants");
        assert_eq!(rewrite_path("/", "/x/y"), "/x/y");
        assert_eq!(rewrite_path("/", ""), "/");
        assert_eq!(rewrite_path("/svc/", "/"), "/svc/");
    }
}
